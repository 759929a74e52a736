//! Error types for command building, parser adaptation and the CLI facade.

use std::path::PathBuf;

use dyncli_convert::{ConvertError, SelectorError, XmlError};
use thiserror::Error;

use crate::dynamic::CliState;

/// Errors raised while reading or writing a settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Errors raised while turning command XML into descriptors.
///
/// Conversion failures are passed through unchanged.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// A schema path selects nothing.
    #[error("no element found at '{0}'")]
    MissingNode(String),

    /// An element lacks the attribute identifying it.
    #[error("'{element}' has no '{attribute}' attribute")]
    MissingAttribute { element: String, attribute: String },

    /// An argument reference names no argument definition.
    #[error("command '{command}' references unknown argument '{argument}'")]
    UnknownArgument { command: String, argument: String },
}

/// Errors raised while registering descriptors with clap or parsing.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// A descriptor does not have the expected shape.
    #[error("invalid command descriptor: {0}")]
    InvalidDescriptor(String),

    /// Commands cannot be registered once arguments were parsed.
    #[error("arguments were already parsed")]
    AlreadyParsed,

    /// Parse failure without a fail handler.
    #[error(transparent)]
    Parse(#[from] clap::Error),

    /// The fail handler rejected the parse.
    #[error("{0}")]
    Rejected(String),

    /// The fail handler requested termination with an exit code.
    #[error("argument parsing terminated with status {0}")]
    Exit(i32),
}

/// Errors raised by [`DynamicCli`](crate::DynamicCli).
#[derive(Debug, Error)]
pub enum DynamicCliError {
    /// The configuration file could not be read. Fatal to the facade.
    #[error("failed to load '{}': {source}", path.display())]
    LoadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The leading argv token could not name a command and no default is set.
    #[error("no command given and no default command configured")]
    NoDefaultCommand,

    /// An operation was called out of order.
    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: CliState,
    },

    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// Parsed argv does not fit the requested shape.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Convenience alias for results with [`DynamicCliError`].
pub type Result<T> = std::result::Result<T, DynamicCliError>;
