//! Typed views over command descriptors.

use dyncli_convert::SpecService;
use dyncli_core::{CliSchema, ConversionSpec};
use serde_json::{Map, Value};

use crate::error::AdapterError;

/// Descriptor keys with a fixed meaning.
///
/// Built from the schema and spec that produced the descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorKeys {
    /// Identifying attribute of commands and options.
    pub id: String,
    pub options: String,
    pub validation_groups: String,
    /// Labels written by the converter.
    pub reserved: Vec<String>,
    pub text: String,
    /// Label capturing attributes as single-entry objects, if any.
    pub attributes: Option<String>,
}

impl DescriptorKeys {
    pub fn new(schema: &CliSchema, service: &SpecService) -> Self {
        let mut reserved = vec![
            service.element_label().to_string(),
            service.descendants_label().to_string(),
            service.text_label().to_string(),
        ];
        reserved.extend(service.attributes_label().map(str::to_string));
        Self {
            id: schema.command_id.clone(),
            options: schema.labels.options.clone(),
            validation_groups: schema.labels.validation_groups.clone(),
            reserved,
            text: service.text_label().to_string(),
            attributes: service.attributes_label().map(str::to_string),
        }
    }

    /// Descriptor members, with captured attributes lifted to the top level.
    fn fields(&self, object: &Map<String, Value>) -> Map<String, Value> {
        let mut fields = object.clone();
        let captured = self
            .attributes
            .as_ref()
            .and_then(|label| object.get(label))
            .and_then(Value::as_array);
        for entry in captured.into_iter().flatten() {
            if let Some(entry) = entry.as_object() {
                for (key, value) in entry {
                    fields.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
        }
        fields
    }

    fn is_reserved(&self, key: &str) -> bool {
        self.reserved.iter().any(|r| r == key)
    }
}

impl Default for DescriptorKeys {
    fn default() -> Self {
        Self::new(
            &CliSchema::default(),
            &SpecService::new(ConversionSpec::default()),
        )
    }
}

/// Value type of an option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OptionKind {
    Boolean,
    Number,
    #[default]
    String,
    Array,
    /// Flag counted by occurrence (`-vvv`).
    Count,
}

impl OptionKind {
    fn parse(kind: &str) -> Option<Self> {
        match kind.to_ascii_lowercase().as_str() {
            "boolean" | "bool" | "flag" => Some(Self::Boolean),
            "number" => Some(Self::Number),
            "string" => Some(Self::String),
            "array" => Some(Self::Array),
            "count" => Some(Self::Count),
            _ => None,
        }
    }
}

/// One option of an [`AdaptedCommand`].
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDef<'d> {
    pub name: String,
    pub kind: OptionKind,
    pub alias: Vec<String>,
    pub describe: Option<String>,
    pub default: Option<Value>,
    pub choices: Vec<String>,
    pub positional: bool,
    pub required: bool,
    pub hidden: bool,
    /// Remaining descriptor members.
    pub extra: Map<String, Value>,
    /// The option descriptor this definition was read from.
    pub descriptor: &'d Value,
}

impl<'d> OptionDef<'d> {
    /// Reads an option descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidDescriptor`] if `descriptor` is not an
    /// object or names an unknown type.
    pub fn from_descriptor(
        name: &str,
        descriptor: &'d Value,
        keys: &DescriptorKeys,
    ) -> Result<Self, AdapterError> {
        let object = descriptor.as_object().ok_or_else(|| {
            AdapterError::InvalidDescriptor(format!("option '{name}' is not an object"))
        })?;
        let object = &keys.fields(object);

        let kind = match object.get("type") {
            None => OptionKind::default(),
            Some(kind) => {
                let text = scalar_text(kind);
                OptionKind::parse(&text).ok_or_else(|| {
                    AdapterError::InvalidDescriptor(format!(
                        "option '{name}' has unknown type '{text}'"
                    ))
                })?
            }
        };

        let known = [
            keys.id.as_str(),
            "type",
            "alias",
            "describe",
            "default",
            "choices",
            "positional",
            "required",
            "hidden",
        ];
        let extra = object
            .iter()
            .filter(|(key, _)| !known.contains(&key.as_str()) && !keys.is_reserved(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            name: name.to_string(),
            kind,
            alias: list(object.get("alias")),
            describe: object.get("describe").map(scalar_text),
            default: object.get("default").cloned(),
            choices: list(object.get("choices")),
            positional: truthy(object.get("positional")),
            required: truthy(object.get("required")),
            hidden: truthy(object.get("hidden")),
            extra,
            descriptor,
        })
    }

    /// Usage placeholder of a positional option.
    pub fn placeholder(&self) -> String {
        let name = if self.kind == OptionKind::Array {
            format!("{}..", self.name)
        } else {
            self.name.clone()
        };
        if self.required {
            format!("<{name}>")
        } else {
            format!("[{name}]")
        }
    }
}

/// A command descriptor read into typed form.
///
/// # Examples
///
/// ```
/// use dyncli_builder::{AdaptedCommand, DescriptorKeys, OptionKind};
/// use serde_json::json;
///
/// let descriptor = json!({
///     "_": "Command",
///     "name": "get",
///     "describe": "Get a shape",
///     "options": {
///         "shape": {"_": "Argument", "name": "shape", "type": "string", "alias": "s"},
///         "source": {"_": "Argument", "name": "source", "positional": true, "required": true}
///     },
///     "validation_groups": {"conflicts": [["shape", "source"]], "implies": []}
/// });
///
/// let command = AdaptedCommand::from_descriptor(&descriptor, &DescriptorKeys::default()).unwrap();
/// assert_eq!(command.name, "get");
/// assert_eq!(command.options[0].kind, OptionKind::String);
/// assert_eq!(command.usage(), "get <source>");
/// assert_eq!(command.conflicts, vec![vec!["shape".to_string(), "source".to_string()]]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptedCommand<'d> {
    pub name: String,
    pub describe: Option<String>,
    pub aliases: Vec<String>,
    pub hidden: bool,
    pub options: Vec<OptionDef<'d>>,
    pub conflicts: Vec<Vec<String>>,
    pub implies: Vec<Vec<String>>,
    pub descriptor: &'d Value,
}

impl<'d> AdaptedCommand<'d> {
    /// Reads a command descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidDescriptor`] if the descriptor is not
    /// an object, has no name, or holds a malformed option.
    pub fn from_descriptor(
        descriptor: &'d Value,
        keys: &DescriptorKeys,
    ) -> Result<Self, AdapterError> {
        let original = descriptor.as_object().ok_or_else(|| {
            AdapterError::InvalidDescriptor("command descriptor is not an object".to_string())
        })?;
        let object = &keys.fields(original);
        let name = object
            .get(&keys.id)
            .map(scalar_text)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                AdapterError::InvalidDescriptor(format!("command has no '{}'", keys.id))
            })?;

        let options = match original.get(&keys.options) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(options)) => options
                .iter()
                .map(|(option, value)| OptionDef::from_descriptor(option, value, keys))
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(AdapterError::InvalidDescriptor(format!(
                    "options of '{name}' are not an object"
                )));
            }
        };

        let groups = object.get(&keys.validation_groups);
        let describe = object
            .get("describe")
            .or_else(|| object.get(&keys.text))
            .map(scalar_text);

        Ok(Self {
            describe,
            aliases: list(object.get("alias")),
            hidden: truthy(object.get("hidden")),
            options,
            conflicts: group_lists(groups, "conflicts"),
            implies: group_lists(groups, "implies"),
            descriptor,
            name,
        })
    }

    /// Command name followed by positional placeholders, e.g. `get <source>`.
    pub fn usage(&self) -> String {
        std::iter::once(self.name.clone())
            .chain(
                self.options
                    .iter()
                    .filter(|option| option.positional)
                    .map(OptionDef::placeholder),
            )
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => text.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Comma-separated string or array of scalars.
fn list(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(scalar_text).collect(),
        Some(Value::String(text)) => text
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        Some(other) => vec![scalar_text(other)],
    }
}

fn group_lists(groups: Option<&Value>, kind: &str) -> Vec<Vec<String>> {
    groups
        .and_then(|groups| groups.get(kind))
        .and_then(Value::as_array)
        .map(|lists| {
            lists
                .iter()
                .map(|members| list(Some(members)))
                .filter(|members| !members.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
