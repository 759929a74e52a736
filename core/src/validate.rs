//! Spec, parse info and schema validation.
//!
//! Catches configuration mistakes such as colliding labels, empty
//! identifying attributes or collection matchers that can never match,
//! before they surface as confusing conversion output.
//!
//! # Examples
//!
//! ```
//! use dyncli_core::*;
//!
//! assert!(validate_spec(&ConversionSpec::default()).is_empty());
//!
//! // Invalid: element and text labels collide
//! let mut bad = ConversionSpec::named("bad");
//! bad.labels.element = Some("_x".into());
//! bad.labels.text = Some("_x".into());
//! assert!(!validate_spec(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{
    CliSchema, CollectionSettings, ConversionSpec, DescendantsInfo, ElementInfo, Matcher,
    ParseInfo, SpecContext,
};

/// Configuration validation errors.
///
/// Each variant describes a specific structural problem. The `Display`
/// impl provides a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A label resolves to an empty string.
    #[error("label '{0}' cannot be empty")]
    EmptyLabel(&'static str),
    /// Two labels resolve to the same string.
    #[error("labels collide on '{0}'")]
    DuplicateLabel(String),
    /// A date matcher has an empty format string.
    #[error("date matcher in {0} has an empty format")]
    EmptyDateFormat(&'static str),
    /// A symbol matcher has an empty prefix.
    #[error("symbol matcher in {0} has an empty prefix")]
    EmptySymbolPrefix(&'static str),
    /// A collection matcher has an empty delimiter or bracket.
    #[error("collection matcher in {0} has an empty {1}")]
    InvalidCollection(&'static str, &'static str),
    /// An element entry names an empty attribute.
    #[error("element '{0}' has an empty {1}")]
    EmptyElementAttribute(String, &'static str),
    /// Keyed descendants without any identifying attribute to key by.
    #[error("element '{0}' collects descendants by key but names no identifying attribute")]
    MissingDescendantsId(String),
    /// A schema entry is empty.
    #[error("schema field '{0}' cannot be empty")]
    EmptySchemaField(&'static str),
}

/// Validates a conversion spec.
///
/// Labels are checked after resolution against the default spec, so a
/// spec that sets no labels at all is valid.
pub fn validate_spec(spec: &ConversionSpec) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let defaults = ConversionSpec::default();

    let resolve = |own: &Option<String>, fallback: &Option<String>| {
        own.clone().or_else(|| fallback.clone()).unwrap_or_default()
    };
    let mut labels = vec![
        (
            "element",
            resolve(&spec.labels.element, &defaults.labels.element),
        ),
        (
            "descendants",
            resolve(&spec.labels.descendants, &defaults.labels.descendants),
        ),
        ("text", resolve(&spec.labels.text, &defaults.labels.text)),
    ];
    if let Some(attributes) = &spec.labels.attributes {
        labels.push(("attributes", attributes.clone()));
    }

    let mut seen = HashSet::new();
    for (name, label) in &labels {
        if label.trim().is_empty() {
            errors.push(ValidationError::EmptyLabel(*name));
            return errors;
        }
        if !seen.insert(label.as_str()) {
            errors.push(ValidationError::DuplicateLabel(label.clone()));
            return errors;
        }
    }

    for context in [SpecContext::Attributes, SpecContext::TextNodes] {
        let matchers = spec
            .settings(context)
            .and_then(|s| s.coercion.as_ref())
            .map(|c| c.matchers.as_slice())
            .unwrap_or_default();
        errors.extend(validate_matchers(matchers, context.key()));
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}

fn validate_matchers(matchers: &[Matcher], context: &'static str) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for matcher in matchers {
        match matcher {
            Matcher::Date(date) if date.format.trim().is_empty() => {
                errors.push(ValidationError::EmptyDateFormat(context));
            }
            Matcher::Symbol(symbol) if symbol.prefix().is_empty() => {
                errors.push(ValidationError::EmptySymbolPrefix(context));
            }
            Matcher::Collection(collection) => {
                if let Some(part) = empty_collection_part(collection) {
                    errors.push(ValidationError::InvalidCollection(context, part));
                }
            }
            _ => {}
        }
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}

fn empty_collection_part(collection: &CollectionSettings) -> Option<&'static str> {
    if collection.delim().is_empty() {
        return Some("delimiter");
    }
    if collection.open().is_empty() {
        return Some("opening bracket");
    }
    if collection.close().is_empty() {
        return Some("closing bracket");
    }
    if collection.assoc.as_ref().is_some_and(|a| a.delim().is_empty()) {
        return Some("assoc delimiter");
    }
    None
}

/// Validates parse info entries, including `common` and `def`.
///
/// # Examples
///
/// ```
/// use dyncli_core::*;
///
/// let info = ParseInfo::default()
///     .with_element("Arguments", ElementInfo::default().with_descendants(DescendantsBy::Index, "name"));
/// assert!(validate_parse_info(&info).is_empty());
///
/// let mut keyless = DescendantsInfo::default();
/// keyless.by = Some(DescendantsBy::Group);
/// let bad = ParseInfo::default().with_element(
///     "Arguments",
///     ElementInfo { descendants: Some(keyless), ..Default::default() },
/// );
/// assert_eq!(
///     validate_parse_info(&bad),
///     vec![ValidationError::MissingDescendantsId("Arguments".into())]
/// );
/// ```
pub fn validate_parse_info(info: &ParseInfo) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let entries: Vec<(&str, &ElementInfo)> = info
        .elements
        .iter()
        .map(|(tag, element)| (tag.as_str(), element))
        .chain(info.common.iter().map(|element| ("common", element)))
        .chain(info.def.iter().map(|element| ("def", element)))
        .collect();
    let any_id = entries.iter().any(|(_, element)| element.id.is_some());

    for (tag, element) in entries {
        errors.extend(validate_element(tag, element, any_id));
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}

/// Children are keyed by `descendants.id`, falling back to each child's own
/// identifying attribute, so keyed collection needs at least one of them.
fn validate_element(tag: &str, element: &ElementInfo, any_id: bool) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let named = [
        ("id", element.id.as_deref()),
        ("recurse attribute", element.recurse.as_deref()),
        (
            "descendants id",
            element.descendants.as_ref().and_then(|d| d.id.as_deref()),
        ),
    ];
    for (what, value) in named {
        if value.is_some_and(|v| v.trim().is_empty()) {
            errors.push(ValidationError::EmptyElementAttribute(tag.to_string(), what));
            return errors;
        }
    }

    if let Some(DescendantsInfo { by: Some(_), id, .. }) = &element.descendants {
        if id.is_none() && !any_id {
            errors.push(ValidationError::MissingDescendantsId(tag.to_string()));
        }
    }

    errors
}

/// Validates a CLI schema.
pub fn validate_schema(schema: &CliSchema) -> Vec<ValidationError> {
    let fields = [
        ("commands_path", &schema.commands_path),
        ("arguments_path", &schema.arguments_path),
        ("command_element", &schema.command_element),
        ("command_id", &schema.command_id),
        ("argument_element", &schema.argument_element),
        ("argument_ref", &schema.argument_ref),
        ("labels.options", &schema.labels.options),
        ("labels.validation_groups", &schema.labels.validation_groups),
    ];

    fields
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| vec![ValidationError::EmptySchemaField(name)])
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use crate::{DateSettings, DescendantsBy, SymbolSettings};

    use super::*;

    #[test]
    fn test_validate_spec_accepts_bare_spec() {
        assert!(validate_spec(&ConversionSpec::named("bare")).is_empty());
    }

    #[test]
    fn test_validate_spec_rejects_attributes_label_collision() {
        let spec = ConversionSpec::named("cli").with_attributes_label("_children");
        assert_eq!(
            validate_spec(&spec),
            vec![ValidationError::DuplicateLabel("_children".to_string())]
        );
    }

    #[test]
    fn test_validate_spec_rejects_empty_date_format() {
        let spec = ConversionSpec::named("cli").with_matchers(
            SpecContext::TextNodes,
            vec![Matcher::Date(DateSettings {
                format: " ".to_string(),
            })],
        );
        assert_eq!(
            validate_spec(&spec),
            vec![ValidationError::EmptyDateFormat("text_nodes")]
        );
    }

    #[test]
    fn test_validate_spec_rejects_empty_symbol_prefix() {
        let spec = ConversionSpec::named("cli").with_matchers(
            SpecContext::Attributes,
            vec![Matcher::Symbol(SymbolSettings {
                prefix: Some(String::new()),
                global: false,
            })],
        );
        assert_eq!(
            validate_spec(&spec),
            vec![ValidationError::EmptySymbolPrefix("attributes")]
        );
    }

    #[test]
    fn test_validate_parse_info_rejects_empty_id() {
        let info = ParseInfo::default().with_element("Argument", ElementInfo::identified_by(""));
        assert_eq!(
            validate_parse_info(&info),
            vec![ValidationError::EmptyElementAttribute(
                "Argument".to_string(),
                "id"
            )]
        );
    }

    #[test]
    fn test_validate_parse_info_accepts_child_ids_as_key() {
        let arguments = ElementInfo {
            descendants: Some(DescendantsInfo {
                by: Some(DescendantsBy::Index),
                ..Default::default()
            }),
            ..Default::default()
        };
        let parse_info = ParseInfo::default()
            .with_element("Arguments", arguments)
            .with_element("Argument", ElementInfo::identified_by("name"));
        assert!(validate_parse_info(&parse_info).is_empty());
    }

    #[test]
    fn test_validate_schema_rejects_empty_path() {
        let schema = CliSchema {
            commands_path: String::new(),
            ..Default::default()
        };
        assert_eq!(
            validate_schema(&schema),
            vec![ValidationError::EmptySchemaField("commands_path")]
        );
        assert!(validate_schema(&CliSchema::default()).is_empty());
    }
}
