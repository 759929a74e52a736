//! Conversion spec type definitions.
//!
//! A [`ConversionSpec`] tells the conversion engine which labels to use in
//! the produced JSON and how raw attribute and text values are coerced into
//! typed values. The types are designed for serialization with [`serde`] so
//! that a spec can live in the same settings file as the rest of the CLI
//! description.

use serde::{Deserialize, Serialize};

/// Label holding the tag name of a converted element in the default spec.
pub const DEFAULT_ELEMENT_LABEL: &str = "_";

/// Label holding converted child elements in the default spec.
pub const DEFAULT_DESCENDANTS_LABEL: &str = "_children";

/// Label holding the text content of an element in the default spec.
pub const DEFAULT_TEXT_LABEL: &str = "_text";

/// Prefix recognised by the [`Matcher::Symbol`] matcher when none is configured.
pub const DEFAULT_SYMBOL_PREFIX: &str = "$";

/// Where a raw value came from.
///
/// Attribute values and text node values are coerced independently, each
/// with its own [`NodeSettings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecContext {
    /// Value of an XML attribute.
    Attributes,
    /// Content of an XML text node.
    TextNodes,
}

impl SpecContext {
    /// Key of this context inside a serialized [`ConversionSpec`].
    pub fn key(self) -> &'static str {
        match self {
            Self::Attributes => "attributes",
            Self::TextNodes => "text_nodes",
        }
    }
}

/// Labels used in the resulting JSON.
///
/// `element`, `descendants` and `text` fall back to the default spec when
/// absent. `attributes` never falls back: when it is `None` attributes are
/// stored as members of the element object, when it is set they are
/// captured as an array of single-entry objects under that label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecLabels {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descendants: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Primitive types that can be coerced from a raw string without further
/// configuration.
///
/// `date` is absent: there is no sensible default format, so
/// dates are only available through [`Matcher::Date`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    Boolean,
    Number,
    Symbol,
}

/// Settings for the symbol matcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolSettings {
    /// Prefix that marks a value as a symbol (defaults to `$`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Accepted and validated but ignored: JSON has no symbol registry, so
    /// global and local symbols coerce to the same string.
    pub global: bool,
}

impl SymbolSettings {
    /// Returns the configured prefix or [`DEFAULT_SYMBOL_PREFIX`].
    pub fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or(DEFAULT_SYMBOL_PREFIX)
    }
}

/// Settings for the date matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSettings {
    /// `chrono` format string, e.g. `%Y-%m-%d`.
    pub format: String,
}

/// Key/value pairs inside a collection (`a=1,b=2`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssocSettings {
    /// Separator between key and value (defaults to `=`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delim: Option<String>,
    pub key_type: Vec<Primitive>,
    pub value_type: Vec<Primitive>,
}

impl AssocSettings {
    pub fn delim(&self) -> &str {
        self.delim.as_deref().unwrap_or("=")
    }
}

/// Settings for the collection matcher.
///
/// For attributes, a value wrapped in `open`…`close` is split on `delim`.
/// For text nodes, an element carrying several text segments is turned into
/// an array of those segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionSettings {
    /// Item separator (defaults to `,`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delim: Option<String>,
    /// Opening bracket (defaults to `[`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<String>,
    /// Closing bracket (defaults to `]`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assoc: Option<AssocSettings>,
    /// Coercions applied to each item.
    pub element_types: Vec<Primitive>,
}

impl CollectionSettings {
    pub fn delim(&self) -> &str {
        self.delim.as_deref().unwrap_or(",")
    }

    pub fn open(&self) -> &str {
        self.open.as_deref().unwrap_or("[")
    }

    pub fn close(&self) -> &str {
        self.close.as_deref().unwrap_or("]")
    }
}

/// A single coercion matcher.
///
/// Matchers are tried in declaration order and the first one that accepts
/// the raw value produces the result.
///
/// # Examples
///
/// ```
/// use dyncli_core::{Matcher, Primitive};
///
/// let matchers: Vec<Matcher> = serde_json::from_str(
///     r#"["number", {"primitives": ["boolean"]}, {"date": {"format": "%Y-%m-%d"}}, "string"]"#,
/// ).unwrap();
///
/// assert_eq!(matchers[0], Matcher::Number);
/// assert_eq!(matchers[1], Matcher::Primitives(vec![Primitive::Boolean]));
/// assert_eq!(matchers.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matcher {
    /// `true`/`false`, case-insensitive.
    Boolean,
    /// Finite decimal numbers.
    Number,
    /// Values carrying the symbol prefix.
    Symbol(SymbolSettings),
    /// Dates in a configured format.
    Date(DateSettings),
    /// Shorthand for a run of primitive matchers.
    Primitives(Vec<Primitive>),
    /// Delimited collections.
    Collection(CollectionSettings),
    /// Always matches; keeps the value as a string.
    String,
}

impl From<Primitive> for Matcher {
    fn from(primitive: Primitive) -> Self {
        match primitive {
            Primitive::Boolean => Self::Boolean,
            Primitive::Number => Self::Number,
            Primitive::Symbol => Self::Symbol(SymbolSettings::default()),
        }
    }
}

/// Coercion settings for one [`SpecContext`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coercion {
    pub matchers: Vec<Matcher>,
}

impl Coercion {
    pub fn new(matchers: Vec<Matcher>) -> Self {
        Self { matchers }
    }
}

/// Per-context settings: trimming and coercion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSettings {
    /// Trim raw values before coercion (defaults to `true`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trim: Option<bool>,
    /// Coercion is never taken from the default spec; absent means off.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coercion: Option<Coercion>,
}

/// Settings for the conversion process as a whole.
///
/// # Examples
///
/// ```
/// use dyncli_core::{ConversionSpec, DEFAULT_ELEMENT_LABEL};
///
/// let spec = ConversionSpec::default();
/// assert_eq!(spec.labels.element.as_deref(), Some(DEFAULT_ELEMENT_LABEL));
/// assert!(spec.labels.attributes.is_none());
///
/// let custom = ConversionSpec::named("cli");
/// assert_eq!(custom.name, "cli");
/// assert!(custom.labels.element.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub labels: SpecLabels,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<NodeSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_nodes: Option<NodeSettings>,
}

impl ConversionSpec {
    /// Creates an empty spec; every defaultable setting falls back to
    /// [`ConversionSpec::default`].
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            labels: SpecLabels::default(),
            attributes: None,
            text_nodes: None,
        }
    }

    /// Settings for the given context, if any.
    pub fn settings(&self, context: SpecContext) -> Option<&NodeSettings> {
        match context {
            SpecContext::Attributes => self.attributes.as_ref(),
            SpecContext::TextNodes => self.text_nodes.as_ref(),
        }
    }

    /// Replaces the matchers for the given context.
    pub fn with_matchers(mut self, context: SpecContext, matchers: Vec<Matcher>) -> Self {
        let settings = match context {
            SpecContext::Attributes => self.attributes.get_or_insert_with(NodeSettings::default),
            SpecContext::TextNodes => self.text_nodes.get_or_insert_with(NodeSettings::default),
        };
        settings.coercion = Some(Coercion::new(matchers));
        self
    }

    /// Sets the optional attributes label.
    pub fn with_attributes_label(mut self, label: &str) -> Self {
        self.labels.attributes = Some(label.to_string());
        self
    }
}

impl Default for ConversionSpec {
    fn default() -> Self {
        let settings = NodeSettings {
            trim: Some(true),
            coercion: Some(Coercion::new(vec![Matcher::Number, Matcher::Boolean])),
        };
        Self {
            name: "default".to_string(),
            labels: SpecLabels {
                attributes: None,
                element: Some(DEFAULT_ELEMENT_LABEL.to_string()),
                descendants: Some(DEFAULT_DESCENDANTS_LABEL.to_string()),
                text: Some(DEFAULT_TEXT_LABEL.to_string()),
            },
            attributes: Some(settings.clone()),
            text_nodes: Some(settings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matcher_order_is_preserved() {
        let matchers: Vec<Matcher> =
            serde_json::from_str(r##"["boolean", "number", {"symbol": {"prefix": "#"}}]"##)
                .unwrap();

        assert_eq!(matchers[0], Matcher::Boolean);
        assert_eq!(matchers[1], Matcher::Number);
        match &matchers[2] {
            Matcher::Symbol(settings) => assert_eq!(settings.prefix(), "#"),
            other => panic!("unexpected matcher {other:?}"),
        }
    }

    #[test]
    fn test_named_spec_has_no_coercion() {
        let spec = ConversionSpec::named("bare");
        assert!(spec.settings(SpecContext::Attributes).is_none());
        assert!(spec.settings(SpecContext::TextNodes).is_none());
    }

    #[test]
    fn test_with_matchers_creates_settings() {
        let spec = ConversionSpec::named("cli")
            .with_matchers(SpecContext::TextNodes, vec![Matcher::Boolean, Matcher::Number]);

        let coercion = spec
            .settings(SpecContext::TextNodes)
            .and_then(|s| s.coercion.as_ref())
            .unwrap();
        assert_eq!(coercion.matchers, vec![Matcher::Boolean, Matcher::Number]);
        assert!(spec.attributes.is_none());
    }

    #[test]
    fn test_collection_defaults() {
        let settings = CollectionSettings::default();
        assert_eq!(settings.open(), "[");
        assert_eq!(settings.close(), "]");
        assert_eq!(settings.delim(), ",");
    }
}
