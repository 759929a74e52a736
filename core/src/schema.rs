//! Shape of the commands XML document.
//!
//! A [`CliSchema`] names the elements, attributes and paths the command
//! builder looks for, and the labels it writes into each command
//! descriptor. The defaults describe documents of this form:
//!
//! ```xml
//! <Cli name="shapes">
//!   <Commands>
//!     <Command name="get" describe="Get a shape">
//!       <Arguments>
//!         <ArgumentRef name="shape"/>
//!       </Arguments>
//!       <ArgumentGroups>
//!         <Conflicts>
//!           <ArgumentRef name="shape"/>
//!           <ArgumentRef name="all"/>
//!         </Conflicts>
//!       </ArgumentGroups>
//!     </Command>
//!   </Commands>
//!   <Arguments>
//!     <Argument name="shape" alias="s" type="string" describe="Shape name"/>
//!   </Arguments>
//! </Cli>
//! ```

use serde::{Deserialize, Serialize};

/// Labels written into command descriptors by the command builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaLabels {
    /// Resolved option definitions, keyed by option name.
    pub options: String,
    /// Validation groups (`conflicts`, `implies`).
    pub validation_groups: String,
}

impl Default for SchemaLabels {
    fn default() -> Self {
        Self {
            options: "options".to_string(),
            validation_groups: "validation_groups".to_string(),
        }
    }
}

/// Description of the commands XML document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliSchema {
    /// XPath of the element holding all command elements.
    pub commands_path: String,
    /// XPath of the element holding shared argument definitions.
    pub arguments_path: String,
    pub command_element: String,
    /// Identifying attribute of commands, arguments and argument refs.
    pub command_id: String,
    pub argument_element: String,
    pub argument_ref: String,
    pub validation_groups_element: String,
    pub labels: SchemaLabels,
    /// Option names never registered with the argument parser.
    pub excluded_options: Vec<String>,
}

impl Default for CliSchema {
    fn default() -> Self {
        Self {
            commands_path: "/Cli/Commands".to_string(),
            arguments_path: "/Cli/Arguments".to_string(),
            command_element: "Command".to_string(),
            command_id: "name".to_string(),
            argument_element: "Argument".to_string(),
            argument_ref: "ArgumentRef".to_string(),
            validation_groups_element: "ArgumentGroups".to_string(),
            labels: SchemaLabels::default(),
            excluded_options: Vec::new(),
        }
    }
}

impl CliSchema {
    /// Returns `true` if the option must not be registered.
    pub fn is_excluded(&self, option: &str) -> bool {
        self.excluded_options.iter().any(|o| o == option)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_schema_uses_defaults() {
        let schema: CliSchema =
            serde_json::from_str(r#"{"commands_path": "/App/Commands", "excluded_options": ["debug"]}"#)
                .unwrap();

        assert_eq!(schema.commands_path, "/App/Commands");
        assert_eq!(schema.arguments_path, "/Cli/Arguments");
        assert_eq!(schema.labels.options, "options");
        assert!(schema.is_excluded("debug"));
        assert!(!schema.is_excluded("shape"));
    }
}
