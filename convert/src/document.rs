//! XML document loading.

use std::path::Path;

use tracing::debug;
use xmltree::{Element, XMLNode};

use crate::error::XmlError;
use crate::selectors::Selectors;

/// An owned XML document.
///
/// # Examples
///
/// ```
/// use dyncli_convert::XmlDocument;
///
/// let doc = XmlDocument::parse(r#"<Cli><Commands/></Cli>"#).unwrap();
/// assert_eq!(doc.root().name, "Cli");
/// ```
#[derive(Debug, Clone)]
pub struct XmlDocument {
    root: Element,
}

impl XmlDocument {
    /// Parses XML text.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::ParseError`] if the text is not well-formed XML.
    pub fn parse(xml: &str) -> Result<Self, XmlError> {
        let root = Element::parse(xml.as_bytes())?;
        debug!(root = %root.name, "Parsed XML document");
        Ok(Self { root })
    }

    /// Reads and parses an XML file.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::IoError`] if the file cannot be read, or
    /// [`XmlError::ParseError`] if it is not well-formed XML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, XmlError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// The document element.
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// XPath selectors bound to this document.
    pub fn selectors(&self) -> Selectors<'_> {
        Selectors::new(self)
    }
}

/// Child elements of `element`, in document order.
pub fn child_elements(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(|node| match node {
        XMLNode::Element(child) => Some(child),
        _ => None,
    })
}

/// Non-blank text and CDATA segments of `element`, in document order.
pub fn text_segments(element: &Element) -> Vec<&str> {
    element
        .children
        .iter()
        .filter_map(|node| match node {
            XMLNode::Text(text) | XMLNode::CData(text) => Some(text.as_str()),
            _ => None,
        })
        .filter(|text| !text.trim().is_empty())
        .collect()
}
