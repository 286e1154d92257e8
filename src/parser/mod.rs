//! Structured warning document parser
//!
//! [`FloodWarningParser`] wraps the raw text of one `<id>.amoc.xml`
//! document. The text is parsed on the first accessor call and the outcome,
//! success or failure, is kept for the lifetime of the parser.
//!
//! ```
//! use flood_warnings::parser::FloodWarningParser;
//!
//! let parser = FloodWarningParser::new(
//!     "<amoc><product-type>W</product-type><service>HFW</service></amoc>",
//! );
//! let info = parser.warning_info().unwrap();
//! assert_eq!(info.product_type, "Warning");
//! assert_eq!(info.service, "Flood Warning Service");
//! assert_eq!(info.expiry_time, "");
//! ```

pub mod codes;
pub mod tree;

use crate::error::ParseError;
use crate::types::WarningInfo;
use std::sync::OnceLock;
use tree::Element;

const PRODUCT_TYPE_PATH: [&str; 2] = ["amoc", "product-type"];
const SERVICE_PATH: [&str; 2] = ["amoc", "service"];
const ISSUE_TIME_PATH: [&str; 2] = ["amoc", "issue-time-utc"];
const EXPIRY_TIME_PATH: [&str; 2] = ["amoc", "expiry-time"];
const IDENTIFIER_PATH: [&str; 2] = ["amoc", "identifier"];

/// Memoized outcome of parsing; an empty cell means not yet parsed
#[derive(Debug)]
enum ParseState {
    Parsed(Element),
    Failed(ParseError),
}

/// Lazily-parsing reader for one structured warning document
#[derive(Debug)]
pub struct FloodWarningParser {
    document: String,
    state: OnceLock<ParseState>,
}

impl FloodWarningParser {
    /// Wrap raw document text; nothing is parsed yet
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            state: OnceLock::new(),
        }
    }

    /// Whether an accessor has already triggered parsing
    pub fn is_parsed(&self) -> bool {
        self.state.get().is_some()
    }

    /// Decode product type, service, issue and expiry time
    ///
    /// Missing fields decode to empty strings; unmapped codes to
    /// `Unknown (<code>)`.
    pub fn warning_info(&self) -> Result<WarningInfo, ParseError> {
        let root = self.root()?;

        Ok(WarningInfo {
            product_type: codes::decode_product_type(&field(root, &PRODUCT_TYPE_PATH)),
            service: codes::decode_service(&field(root, &SERVICE_PATH)),
            issue_time_utc: field(root, &ISSUE_TIME_PATH),
            expiry_time: field(root, &EXPIRY_TIME_PATH),
        })
    }

    /// The document's own product identifier, empty if absent
    pub fn identifier(&self) -> Result<String, ParseError> {
        Ok(field(self.root()?, &IDENTIFIER_PATH))
    }

    /// Text at an arbitrary key path, empty if any segment is missing
    pub fn value_at(&self, path: &[&str]) -> Result<String, ParseError> {
        Ok(field(self.root()?, path))
    }

    fn root(&self) -> Result<&Element, ParseError> {
        let state = self.state.get_or_init(|| {
            if self.document.trim().is_empty() {
                return ParseState::Failed(ParseError::EmptyDocument);
            }
            match tree::parse(&self.document) {
                Ok(root) => ParseState::Parsed(root),
                Err(e) => {
                    tracing::error!(error = %e, "Structured document could not be parsed");
                    ParseState::Failed(e)
                }
            }
        });

        match state {
            ParseState::Parsed(root) => Ok(root),
            ParseState::Failed(e) => Err(e.clone()),
        }
    }
}

fn field(root: &Element, path: &[&str]) -> String {
    root.find(path)
        .map(|element| element.text.clone())
        .unwrap_or_default()
}
