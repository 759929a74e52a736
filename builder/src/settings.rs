//! Settings of a dynamic CLI.
//!
//! Bundles the application identity, the peek rules, the build policy and
//! the conversion configuration into one YAML file. Every section has a
//! default, so a minimal file only names the application.
//!
//! # Example YAML
//!
//! ```yaml
//! name: shapes
//! about: Work with shapes
//! default_command: get
//! positional_arguments:
//!   - source
//! argv_skip: 2
//! build_policy: named
//! schema:
//!   commands_path: /Cli/Commands
//!   arguments_path: /Cli/Arguments
//!   excluded_options:
//!     - debug
//! spec:
//!   name: shapes
//!   attributes:
//!     coercion:
//!       matchers:
//!         - boolean
//!         - number
//! parse_info:
//!   elements:
//!     Argument:
//!       id: name
//!       recurse: inherits
//!       discards: [inherits]
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use dyncli_core::{
    CliSchema, ConversionSpec, ElementInfo, ParseInfo, ValidationError, validate_parse_info,
    validate_schema, validate_spec,
};
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Which commands [`DynamicCli::build`](crate::DynamicCli::build) converts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildPolicy {
    /// Only the peeked command; every command when the name is unknown.
    #[default]
    Named,
    /// Every command.
    All,
}

/// Settings of a dynamic CLI.
///
/// # Examples
///
/// ```
/// use dyncli_builder::{BuildPolicy, CliSettings};
///
/// let settings: CliSettings = serde_yaml::from_str("name: shapes\ndefault_command: get\n").unwrap();
/// assert_eq!(settings.name, "shapes");
/// assert_eq!(settings.argv_skip, 2);
/// assert_eq!(settings.build_policy, BuildPolicy::Named);
/// assert!(settings.validate().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliSettings {
    /// Program name shown in help and usage.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    /// Command used when argv does not start with a command name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_command: Option<String>,
    /// Positional argument names that must not be mistaken for commands.
    pub positional_arguments: Vec<String>,
    /// Leading argv tokens to skip (program and script path).
    pub argv_skip: usize,
    pub build_policy: BuildPolicy,
    pub schema: CliSchema,
    pub spec: ConversionSpec,
    pub parse_info: ParseInfo,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            name: "cli".to_string(),
            about: None,
            default_command: None,
            positional_arguments: Vec::new(),
            argv_skip: 2,
            build_policy: BuildPolicy::default(),
            schema: CliSchema::default(),
            spec: ConversionSpec::default(),
            parse_info: default_parse_info(),
        }
    }
}

/// Parse info matching the default [`CliSchema`].
///
/// Commands drop their argument containers (options are resolved
/// separately) and arguments may inherit from sibling arguments.
pub fn default_parse_info() -> ParseInfo {
    ParseInfo::default()
        .with_element(
            "Command",
            ElementInfo::identified_by("name").with_discards(&["Arguments", "ArgumentGroups"]),
        )
        .with_element(
            "Argument",
            ElementInfo::identified_by("name")
                .with_recurse("inherits")
                .with_discards(&["inherits"]),
        )
}

impl CliSettings {
    /// Creates default settings for the named application.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::IoError`] if the file cannot be read, or
    /// [`SettingsError::YamlError`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let settings = serde_yaml::from_reader(reader)?;
        Ok(settings)
    }

    /// Saves the settings as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::IoError`] if the file cannot be written, or
    /// [`SettingsError::YamlError`] if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Validates the conversion spec, parse info and schema sections.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = validate_spec(&self.spec);
        errors.extend(validate_parse_info(&self.parse_info));
        errors.extend(validate_schema(&self.schema));
        errors
    }

    /// Returns `true` if `token` is a declared positional argument name.
    pub fn is_positional(&self, token: &str) -> bool {
        self.positional_arguments.iter().any(|p| p == token)
    }
}
