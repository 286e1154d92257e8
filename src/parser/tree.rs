//! Minimal element tree built from a quick-xml event stream

use crate::error::ParseError;
use quick_xml::Reader;
use quick_xml::events::Event;

/// One element with its concatenated text and child elements
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name as written, including any namespace prefix
    pub name: String,
    /// Text and CDATA content directly inside this element
    pub text: String,
    /// Child elements in document order
    pub children: Vec<Element>,
}

impl Element {
    fn named(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            ..Default::default()
        }
    }

    /// First child with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Walk `path` one child at a time from this element
    pub fn find(&self, path: &[&str]) -> Option<&Element> {
        path.iter()
            .try_fold(self, |element, segment| element.child(segment))
    }
}

/// Parse `xml` into a synthetic root whose children are the top-level elements
pub fn parse(xml: &str) -> Result<Element, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<Element> = vec![Element::default()];

    loop {
        let event = reader.read_event().map_err(|e| {
            ParseError::Malformed(format!(
                "error at position {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(start) => stack.push(Element::named(start.name().as_ref())),
            Event::Empty(empty) => {
                let element = Element::named(empty.name().as_ref());
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(element);
                }
            }
            Event::End(_) => {
                // The synthetic root is never popped by a well-formed document
                if stack.len() < 2 {
                    return Err(ParseError::Malformed("unexpected closing tag".to_string()));
                }
                if let (Some(element), Some(parent)) = (stack.pop(), stack.last_mut()) {
                    parent.children.push(element);
                }
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| ParseError::Malformed(e.to_string()))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                let data = data.into_inner();
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(ParseError::Malformed(format!(
            "{} unclosed element(s)",
            stack.len() - 1
        )));
    }

    let root = stack.pop().unwrap_or_default();
    if root.children.is_empty() {
        return Err(ParseError::Malformed("no root element".to_string()));
    }
    Ok(root)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_elements() {
        let root = parse(
            r#"<?xml version="1.0"?>
            <amoc version="1.3">
              <identifier>IDQ20885</identifier>
              <expiry-time/>
              <note><![CDATA[a < b]]></note>
            </amoc>"#,
        )
        .unwrap();

        let amoc = root.child("amoc").unwrap();
        assert_eq!(amoc.children.len(), 3);
        assert_eq!(root.find(&["amoc", "identifier"]).unwrap().text, "IDQ20885");
        assert_eq!(root.find(&["amoc", "expiry-time"]).unwrap().text, "");
        assert_eq!(root.find(&["amoc", "note"]).unwrap().text, "a < b");
    }

    #[test]
    fn unescapes_entities() {
        let root = parse("<amoc><headline>Rain &amp; wind</headline></amoc>").unwrap();
        assert_eq!(root.find(&["amoc", "headline"]).unwrap().text, "Rain & wind");
    }

    #[test]
    fn missing_segment_yields_none() {
        let root = parse("<amoc><service>HFW</service></amoc>").unwrap();
        assert!(root.find(&["amoc", "product-type"]).is_none());
        assert!(root.find(&["other", "service"]).is_none());
    }

    #[test]
    fn mismatched_end_tag_is_malformed() {
        assert!(matches!(
            parse("<amoc><service>HFW</product-type></amoc>"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn unclosed_element_is_malformed() {
        assert!(matches!(
            parse("<amoc><service>HFW</service>"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn text_without_elements_is_malformed() {
        assert!(matches!(
            parse("not a document"),
            Err(ParseError::Malformed(_))
        ));
    }
}
