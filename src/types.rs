//! Core types for flood-warnings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// File name suffix of a structured warning document
pub const STRUCTURED_DOCUMENT_SUFFIX: &str = ".amoc.xml";

/// File name suffix of a free-text warning document
pub const FREE_TEXT_DOCUMENT_SUFFIX: &str = ".txt";

/// Identifier of one warning product, e.g. `IDV60000`
///
/// Derived from the structured document's file name by stripping
/// [`STRUCTURED_DOCUMENT_SUFFIX`]. Names one remote document pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct WarningId(String);

impl WarningId {
    /// Create a WarningId from a raw string, unchanged
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a WarningId in the upstream's canonical (upper) case
    pub fn normalized(id: &str) -> Self {
        Self(id.trim().to_uppercase())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Remote name of the structured document, `<id>.amoc.xml`
    pub fn structured_document_name(&self) -> String {
        format!("{}{}", self.0, STRUCTURED_DOCUMENT_SUFFIX)
    }

    /// Remote name of the free-text companion, `<id>.txt`
    pub fn free_text_document_name(&self) -> String {
        format!("{}{}", self.0, FREE_TEXT_DOCUMENT_SUFFIX)
    }
}

impl std::fmt::Display for WarningId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WarningId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl PartialEq<&str> for WarningId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// One entry of a remote directory listing
///
/// Produced by a single listing call and never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteEntry {
    /// File or directory name
    pub name: String,
    /// Size in bytes as reported by the server
    pub size_bytes: u64,
    /// Last modification time as reported by the server
    pub modified_at: DateTime<Utc>,
    /// Whether the entry is a directory
    pub is_directory: bool,
}

impl RemoteEntry {
    /// A regular file entry
    pub fn file(name: impl Into<String>, size_bytes: u64, modified_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            modified_at,
            is_directory: false,
        }
    }
}

/// Decoded metadata of a structured warning document
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WarningInfo {
    /// Product type description, e.g. "Warning" or "Unknown (Z)"
    pub product_type: String,
    /// Service description, e.g. "Flood Warning Service"
    pub service: String,
    /// Issue time as written upstream (UTC)
    pub issue_time_utc: String,
    /// Expiry time as written upstream
    pub expiry_time: String,
}

/// Warning metadata joined with its free-text narrative
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WarningDetail {
    /// Structured metadata
    #[serde(flatten)]
    pub info: WarningInfo,
    /// Free-text narrative; empty when the companion document is missing
    pub text: String,
}

impl WarningDetail {
    /// Pair structured metadata with its narrative
    pub fn new(info: WarningInfo, text: impl Into<String>) -> Self {
        Self {
            info,
            text: text.into(),
        }
    }
}
