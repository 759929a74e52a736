//! The dynamic CLI facade.
//!
//! One [`DynamicCli`] drives a single build cycle:
//!
//! ```text
//! Unloaded --load--> Loaded --peek--> Peeked --build--> Built --argv--> ArgvAvailable
//! ```
//!
//! Peeking looks at the leading argv token before any parser exists, so that
//! [`BuildPolicy::Named`] only converts the command actually invoked.

use std::fmt;
use std::path::Path;

use clap::Command;
use dyncli_convert::{Converter, XmlDocument};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::adapter::ClapApiBuilder;
use crate::argv::{Argv, ParsedArgv};
use crate::commander::CommandBuilder;
use crate::descriptor::DescriptorKeys;
use crate::error::{DynamicCliError, Result};
use crate::handlers::BuildHandlers;
use crate::settings::{BuildPolicy, CliSettings};

/// Build cycle position of a [`DynamicCli`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliState {
    Unloaded,
    Loaded,
    Peeked,
    Built,
    ArgvAvailable,
}

impl fmt::Display for CliState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            Self::Unloaded => "unloaded",
            Self::Loaded => "loaded",
            Self::Peeked => "peeked",
            Self::Built => "built",
            Self::ArgvAvailable => "argv-available",
        };
        f.write_str(state)
    }
}

/// Builds and runs a command-line interface described by XML.
///
/// # Examples
///
/// ```no_run
/// use dyncli_builder::{CliSettings, DynamicCli};
///
/// let mut settings = CliSettings::named("shapes");
/// settings.default_command = Some("get".to_string());
///
/// let mut cli = DynamicCli::new(settings);
/// let xml = cli.load("shapes.xml").unwrap();
/// let argv: Vec<String> = std::env::args().collect();
/// cli.peek(Some(&argv)).unwrap();
/// cli.build(&xml, None).unwrap();
/// println!("{}", cli.argv().unwrap().to_value());
/// ```
#[derive(Debug)]
pub struct DynamicCli {
    settings: CliSettings,
    converter: Converter,
    handlers: Option<BuildHandlers>,
    state: CliState,
    argv: Vec<String>,
    peeked: Option<String>,
    substituted: bool,
    parse_args: Vec<String>,
    adapter: Option<ClapApiBuilder>,
}

impl DynamicCli {
    pub fn new(settings: CliSettings) -> Self {
        let converter = Converter::new(settings.spec.clone());
        Self {
            settings,
            converter,
            handlers: Some(BuildHandlers::new()),
            state: CliState::Unloaded,
            argv: Vec::new(),
            peeked: None,
            substituted: false,
            parse_args: Vec::new(),
            adapter: None,
        }
    }

    /// Replaces the hook bundle used when building.
    pub fn with_handlers(mut self, handlers: BuildHandlers) -> Self {
        self.handlers = Some(handlers);
        self
    }

    pub fn settings(&self) -> &CliSettings {
        &self.settings
    }

    pub fn state(&self) -> CliState {
        self.state
    }

    /// Reads the XML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicCliError::LoadFailed`] if the file cannot be read.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<String> {
        self.expect_state(CliState::Unloaded, "load")?;
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|source| DynamicCliError::LoadFailed {
                path: path.to_path_buf(),
                source,
            })?;

        info!(path = %path.display(), bytes = content.len(), "Loaded CLI configuration");
        self.state = CliState::Loaded;
        Ok(content)
    }

    /// Determines the invoked command from the leading argv token.
    ///
    /// The first `argv_skip` tokens are skipped. A missing token, a token
    /// starting with `-`, or a declared positional argument name selects
    /// the default command. `None` reads the process arguments.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicCliError::NoDefaultCommand`] when the default
    /// command is needed but not configured.
    pub fn peek(&mut self, argv: Option<&[String]>) -> Result<String> {
        self.expect_state(CliState::Loaded, "peek")?;
        self.argv = match argv {
            Some(argv) => argv.to_vec(),
            None => std::env::args().collect(),
        };

        let token = self.argv.get(self.settings.argv_skip);
        let (command, substituted) = match token {
            Some(token) if !token.starts_with('-') && !self.settings.is_positional(token) => {
                (token.clone(), false)
            }
            _ => {
                let default = self
                    .settings
                    .default_command
                    .clone()
                    .ok_or(DynamicCliError::NoDefaultCommand)?;
                (default, true)
            }
        };

        debug!(token = ?token, command = %command, substituted, "Peeked command");
        self.peeked = Some(command.clone());
        self.substituted = substituted;
        self.state = CliState::Peeked;
        Ok(command)
    }

    /// Converts the command descriptors and registers them with clap.
    ///
    /// `argv` replaces the tokens given to [`peek`](Self::peek) for parsing.
    ///
    /// # Errors
    ///
    /// Fails on malformed XML, conversion errors, unresolvable argument
    /// refs or malformed descriptors.
    pub fn build(&mut self, xml_content: &str, argv: Option<&[String]>) -> Result<&Command> {
        self.expect_state(CliState::Peeked, "build")?;
        if let Some(argv) = argv {
            self.argv = argv.to_vec();
        }
        let peeked = self.peeked.clone().unwrap_or_default();

        let document = XmlDocument::parse(xml_content)?;
        let builder = CommandBuilder::new(
            &self.converter,
            &self.settings.parse_info,
            &document,
            &self.settings.schema,
        );
        let commands_node = builder.commands_node()?;

        let descriptors = match self.settings.build_policy {
            BuildPolicy::Named => {
                let named = builder.build_named_command(&peeked, commands_node)?;
                if named.is_empty() {
                    debug!(command = %peeked, "Unknown command, building all commands");
                    builder.build_commands(commands_node)?
                } else {
                    named
                }
            }
            BuildPolicy::All => builder.build_commands(commands_node)?,
        };
        info!(commands = descriptors.len(), "Built command descriptors");

        let mut root = Command::new(self.settings.name.clone()).subcommand_required(true);
        if let Some(about) = &self.settings.about {
            root = root.about(about.clone());
        }
        let keys = DescriptorKeys::new(&self.settings.schema, self.converter.spec_service());
        let handlers = self.handlers.take().unwrap_or_default();
        let mut adapter = ClapApiBuilder::new(root, keys, handlers);
        adapter.commands(&Value::Array(descriptors), None)?;

        self.parse_args = self.clap_args(&peeked);
        self.state = CliState::Built;
        Ok(self.adapter.insert(adapter).parser())
    }

    /// Parses the arguments with the built parser.
    ///
    /// # Errors
    ///
    /// Returns the adapter's parse error or fail-handler outcome.
    pub fn argv(&mut self) -> Result<&ParsedArgv> {
        if !matches!(self.state, CliState::Built | CliState::ArgvAvailable) {
            return Err(DynamicCliError::InvalidState {
                operation: "read argv",
                state: self.state,
            });
        }
        let adapter = self.adapter.as_mut().ok_or(DynamicCliError::InvalidState {
            operation: "read argv",
            state: self.state,
        })?;
        let parsed = adapter.go(self.parse_args.iter().cloned())?;
        self.state = CliState::ArgvAvailable;
        Ok(parsed)
    }

    /// Parses the arguments into a client-declared shape.
    ///
    /// # Errors
    ///
    /// Fails like [`argv`](Self::argv), or with
    /// [`DynamicCliError::JsonError`] if the values do not fit `C`.
    pub fn argv_as<C: DeserializeOwned>(&mut self) -> Result<Argv<C>> {
        Ok(self.argv()?.to_typed()?)
    }

    /// Runs the whole cycle: load, peek, build and parse.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error.
    pub fn run(&mut self, path: impl AsRef<Path>, argv: &[String]) -> Result<&ParsedArgv> {
        let content = self.load(path)?;
        self.peek(Some(argv))?;
        self.build(&content, None)?;
        self.argv()
    }

    /// Tokens handed to clap: the script name, the default command when
    /// peeking substituted it, then the user's tokens.
    fn clap_args(&self, peeked: &str) -> Vec<String> {
        let skip = self.settings.argv_skip;
        let script = skip
            .checked_sub(1)
            .and_then(|index| self.argv.get(index))
            .cloned()
            .unwrap_or_else(|| self.settings.name.clone());

        let mut args = vec![script];
        if self.substituted {
            args.push(peeked.to_string());
        }
        args.extend(self.argv.iter().skip(skip).cloned());
        args
    }

    fn expect_state(&self, expected: CliState, operation: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(DynamicCliError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}
