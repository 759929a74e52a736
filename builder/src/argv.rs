//! Parsed argument vectors.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key of the positional arguments in [`ParsedArgv::to_value`].
pub const POSITIONAL_KEY: &str = "_";

/// Key of the invoked script name in [`ParsedArgv::to_value`].
pub const SCRIPT_KEY: &str = "$0";

/// Arguments resolved by the parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedArgv {
    /// Invoked command.
    pub command: Option<String>,
    /// Option values keyed by option name.
    pub values: Map<String, Value>,
    /// Command path followed by remaining positional tokens.
    pub positional: Vec<String>,
    /// Program or script name (first parsed token).
    pub script: String,
}

impl ParsedArgv {
    /// Flattens into `{ ..values, "_": [..], "$0": script }`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dyncli_builder::ParsedArgv;
    /// use serde_json::json;
    ///
    /// let mut argv = ParsedArgv {
    ///     command: Some("get".to_string()),
    ///     positional: vec!["get".to_string()],
    ///     script: "shapes".to_string(),
    ///     ..Default::default()
    /// };
    /// argv.values.insert("shape".to_string(), json!("square"));
    ///
    /// assert_eq!(
    ///     argv.to_value(),
    ///     json!({"shape": "square", "_": ["get"], "$0": "shapes"})
    /// );
    /// ```
    pub fn to_value(&self) -> Value {
        let mut object = self.values.clone();
        object.insert(
            POSITIONAL_KEY.to_string(),
            Value::Array(self.positional.iter().cloned().map(Value::String).collect()),
        );
        object.insert(SCRIPT_KEY.to_string(), Value::String(self.script.clone()));
        Value::Object(object)
    }

    /// Deserializes into a client-declared shape.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error if the values do not fit `C`.
    pub fn to_typed<C: DeserializeOwned>(&self) -> Result<Argv<C>, serde_json::Error> {
        serde_json::from_value(self.to_value())
    }
}

/// Parsed arguments typed to a client shape, plus the parser's reserved
/// fields.
///
/// # Examples
///
/// ```
/// use dyncli_builder::Argv;
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Deserialize)]
/// struct Shapes {
///     shape: String,
///     #[serde(default)]
///     all: bool,
/// }
///
/// let argv: Argv<Shapes> =
///     serde_json::from_value(json!({"shape": "square", "_": ["get"], "$0": "shapes"})).unwrap();
/// assert_eq!(argv.options.shape, "square");
/// assert!(!argv.options.all);
/// assert_eq!(argv.positional, vec!["get"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argv<C> {
    #[serde(rename = "_")]
    pub positional: Vec<String>,
    #[serde(rename = "$0")]
    pub script: String,
    #[serde(flatten)]
    pub options: C,
}
