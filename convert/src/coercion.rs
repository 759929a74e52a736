//! Coercion of raw attribute and text values into typed JSON values.
//!
//! Matchers are tried in declaration order; the first one that accepts the
//! raw value produces the result. When none accepts, the (trimmed) raw
//! string is kept.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use dyncli_core::{
    AssocSettings, CollectionSettings, DateSettings, Matcher, Primitive, SpecContext,
    SymbolSettings,
};
use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::spec_service::SpecService;

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("static regex must compile")
});

/// Applies the coercion settings of a [`SpecService`].
///
/// # Examples
///
/// ```
/// use dyncli_convert::{Coercer, SpecService};
/// use dyncli_core::{ConversionSpec, Matcher, SpecContext};
/// use serde_json::json;
///
/// let spec = ConversionSpec::named("cli")
///     .with_matchers(SpecContext::TextNodes, vec![Matcher::Boolean, Matcher::Number]);
/// let service = SpecService::new(spec);
/// let coercer = Coercer::new(&service);
///
/// assert_eq!(coercer.coerce("42", SpecContext::TextNodes), json!(42));
/// assert_eq!(coercer.coerce("true", SpecContext::TextNodes), json!(true));
/// assert_eq!(coercer.coerce(" hello ", SpecContext::TextNodes), json!("hello"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Coercer<'a> {
    service: &'a SpecService,
}

impl<'a> Coercer<'a> {
    pub fn new(service: &'a SpecService) -> Self {
        Self { service }
    }

    /// Coerces one raw value of the given context.
    pub fn coerce(&self, raw: &str, context: SpecContext) -> Value {
        let value = self.prepare(raw, context);
        self.service
            .matchers(context)
            .iter()
            .find_map(|matcher| apply_matcher(matcher, value))
            .unwrap_or_else(|| Value::String(value.to_string()))
    }

    /// Coerces the text segments of one element.
    ///
    /// Several segments become an array when a collection matcher is
    /// configured for text nodes; otherwise they are joined with a space and
    /// coerced as a single value. Returns `None` when there is no text.
    pub fn coerce_segments(&self, segments: &[&str], context: SpecContext) -> Option<Value> {
        let prepared: Vec<&str> = segments
            .iter()
            .map(|segment| self.prepare(segment, context))
            .filter(|segment| !segment.is_empty())
            .collect();

        match prepared.as_slice() {
            [] => None,
            [single] => Some(self.coerce(single, context)),
            many => {
                let collection = self.service.matchers(context).iter().find_map(|m| match m {
                    Matcher::Collection(settings) => Some(settings),
                    _ => None,
                });
                match collection {
                    Some(settings) => Some(Value::Array(
                        many.iter()
                            .map(|item| coerce_primitives(item, &settings.element_types))
                            .collect(),
                    )),
                    None => Some(self.coerce(&many.join(" "), context)),
                }
            }
        }
    }

    fn prepare<'r>(&self, raw: &'r str, context: SpecContext) -> &'r str {
        if self.service.trim(context) {
            raw.trim()
        } else {
            raw
        }
    }
}

fn apply_matcher(matcher: &Matcher, raw: &str) -> Option<Value> {
    match matcher {
        Matcher::Boolean => match_boolean(raw),
        Matcher::Number => match_number(raw),
        Matcher::Symbol(settings) => match_symbol(raw, settings),
        Matcher::Date(settings) => match_date(raw, settings),
        Matcher::Primitives(primitives) => primitives
            .iter()
            .find_map(|primitive| apply_matcher(&Matcher::from(*primitive), raw)),
        Matcher::Collection(settings) => match_collection(raw, settings),
        Matcher::String => Some(Value::String(raw.to_string())),
    }
}

fn match_boolean(raw: &str) -> Option<Value> {
    if raw.eq_ignore_ascii_case("true") {
        Some(Value::Bool(true))
    } else if raw.eq_ignore_ascii_case("false") {
        Some(Value::Bool(false))
    } else {
        None
    }
}

fn match_number(raw: &str) -> Option<Value> {
    if !NUMBER_RE.is_match(raw) {
        return None;
    }
    if !raw.contains(['.', 'e', 'E']) {
        if let Ok(integer) = raw.parse::<i64>() {
            return Some(Value::Number(integer.into()));
        }
    }
    let float: f64 = raw.parse().ok()?;
    Number::from_f64(float).map(Value::Number)
}

fn match_symbol(raw: &str, settings: &SymbolSettings) -> Option<Value> {
    raw.strip_prefix(settings.prefix())
        .filter(|name| !name.is_empty())
        .map(|name| Value::String(name.to_string()))
}

fn match_date(raw: &str, settings: &DateSettings) -> Option<Value> {
    let format = settings.format.as_str();
    if let Ok(date_time) = DateTime::parse_from_str(raw, format) {
        return Some(Value::String(date_time.to_rfc3339()));
    }
    if let Ok(date_time) = NaiveDateTime::parse_from_str(raw, format) {
        return Some(Value::String(
            date_time.format("%Y-%m-%dT%H:%M:%S").to_string(),
        ));
    }
    NaiveDate::parse_from_str(raw, format)
        .ok()
        .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
}

fn match_collection(raw: &str, settings: &CollectionSettings) -> Option<Value> {
    let inner = raw
        .strip_prefix(settings.open())?
        .strip_suffix(settings.close())?
        .trim();
    let items: Vec<&str> = if inner.is_empty() {
        Vec::new()
    } else {
        inner.split(settings.delim()).map(str::trim).collect()
    };

    match &settings.assoc {
        Some(assoc) => match_assoc(&items, assoc),
        None => Some(Value::Array(
            items
                .iter()
                .map(|item| coerce_primitives(item, &settings.element_types))
                .collect(),
        )),
    }
}

fn match_assoc(items: &[&str], assoc: &AssocSettings) -> Option<Value> {
    let mut map = Map::new();
    for item in items {
        let (key, value) = item.split_once(assoc.delim())?;
        let key = match coerce_primitives(key.trim(), &assoc.key_type) {
            Value::String(key) => key,
            other => other.to_string(),
        };
        map.insert(key, coerce_primitives(value.trim(), &assoc.value_type));
    }
    Some(Value::Object(map))
}

fn coerce_primitives(raw: &str, primitives: &[Primitive]) -> Value {
    primitives
        .iter()
        .find_map(|primitive| apply_matcher(&Matcher::from(*primitive), raw))
        .unwrap_or_else(|| Value::String(raw.to_string()))
}
