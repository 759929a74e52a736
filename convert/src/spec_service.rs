//! Option lookup over a [`ConversionSpec`] with fallback to the default spec.

use dyncli_core::{
    ConversionSpec, DEFAULT_DESCENDANTS_LABEL, DEFAULT_ELEMENT_LABEL, DEFAULT_TEXT_LABEL, Matcher,
    SpecContext,
};
use serde_json::Value;

/// Resolves settings of a user spec, consulting the default spec for
/// everything the user left out that has a sensible default.
///
/// # Examples
///
/// ```
/// use dyncli_convert::SpecService;
/// use dyncli_core::{ConversionSpec, SpecContext};
///
/// let mut spec = ConversionSpec::named("cli");
/// spec.labels.element = Some("type".to_string());
/// let service = SpecService::new(spec);
///
/// assert_eq!(service.element_label(), "type");
/// assert_eq!(service.text_label(), "_text");
/// assert!(service.trim(SpecContext::Attributes));
/// assert!(service.fetch_option("labels/descendants", false).is_none());
/// assert_eq!(
///     service.fetch_option("labels/descendants", true).and_then(|v| v.as_str()),
///     Some("_children"),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SpecService {
    spec: ConversionSpec,
    defaults: ConversionSpec,
    spec_value: Value,
    defaults_value: Value,
}

impl SpecService {
    pub fn new(spec: ConversionSpec) -> Self {
        let defaults = ConversionSpec::default();
        let spec_value = serde_json::to_value(&spec).unwrap_or_default();
        let defaults_value = serde_json::to_value(&defaults).unwrap_or_default();
        Self {
            spec,
            defaults,
            spec_value,
            defaults_value,
        }
    }

    /// The user spec.
    pub fn spec(&self) -> &ConversionSpec {
        &self.spec
    }

    /// Looks up a `/`-separated path (e.g. `text_nodes/trim`) in the
    /// serialized user spec, then in the default spec when `fall_back` is set.
    pub fn fetch_option(&self, path: &str, fall_back: bool) -> Option<&Value> {
        let pointer = format!("/{}", path.trim_start_matches('/'));
        let found = self.spec_value.pointer(&pointer).filter(|v| !v.is_null());
        if found.is_some() || !fall_back {
            return found;
        }
        self.defaults_value.pointer(&pointer).filter(|v| !v.is_null())
    }

    pub fn element_label(&self) -> &str {
        self.spec
            .labels
            .element
            .as_deref()
            .or(self.defaults.labels.element.as_deref())
            .unwrap_or(DEFAULT_ELEMENT_LABEL)
    }

    pub fn descendants_label(&self) -> &str {
        self.spec
            .labels
            .descendants
            .as_deref()
            .or(self.defaults.labels.descendants.as_deref())
            .unwrap_or(DEFAULT_DESCENDANTS_LABEL)
    }

    pub fn text_label(&self) -> &str {
        self.spec
            .labels
            .text
            .as_deref()
            .or(self.defaults.labels.text.as_deref())
            .unwrap_or(DEFAULT_TEXT_LABEL)
    }

    /// Attribute capture label. Never taken from the default spec.
    pub fn attributes_label(&self) -> Option<&str> {
        self.spec.labels.attributes.as_deref()
    }

    /// Whether raw values of `context` are trimmed.
    pub fn trim(&self, context: SpecContext) -> bool {
        [&self.spec, &self.defaults]
            .into_iter()
            .find_map(|spec| spec.settings(context).and_then(|s| s.trim))
            .unwrap_or(true)
    }

    /// Matchers of `context`. Empty when the user spec configures none.
    pub fn matchers(&self, context: SpecContext) -> &[Matcher] {
        self.spec
            .settings(context)
            .and_then(|s| s.coercion.as_ref())
            .map(|c| c.matchers.as_slice())
            .unwrap_or_default()
    }
}
