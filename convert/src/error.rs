//! Error types for XML loading, selection and conversion.

use thiserror::Error;

/// Errors raised while reading an XML document.
#[derive(Debug, Error)]
pub enum XmlError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed XML.
    #[error("XML parse error: {0}")]
    ParseError(#[from] xmltree::ParseError),
}

/// Errors raised by the XPath selector layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The expression is not well formed.
    #[error("invalid XPath expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },

    /// The expression is well formed XPath outside the supported subset.
    #[error("unsupported XPath construct '{construct}' in '{expression}'")]
    Unsupported {
        expression: String,
        construct: String,
    },
}

/// Structural conversion failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// A descendant lacks the attribute it should be keyed by.
    #[error("'{element}' under '{parent}' has no identifying attribute '{attribute}'")]
    MissingId {
        element: String,
        parent: String,
        attribute: String,
    },

    /// Two descendants share an identifying attribute value.
    #[error("duplicate '{element}' with {attribute}='{id}' under '{parent}'")]
    Collision {
        element: String,
        parent: String,
        attribute: String,
        id: String,
    },

    /// An inherited element could not be found.
    #[error("'{element}' inherits from '{id}', which cannot be resolved: {reason}")]
    UnresolvedInheritance {
        element: String,
        id: String,
        reason: String,
    },

    /// Elements inherit from each other.
    #[error("inheritance cycle detected: {0}")]
    InheritanceCycle(String),
}
