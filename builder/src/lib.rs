//! Dynamic command-line interfaces built from XML configuration.
//!
//! The pipeline runs in one direction:
//!
//! 1. [`CommandBuilder`] selects command elements from the commands XML,
//!    converts them with a [`Converter`](dyncli_convert::Converter) and
//!    resolves their argument refs into command descriptors.
//! 2. [`ClapApiBuilder`] registers descriptors as clap subcommands, calling
//!    the hooks of a [`BuildHandlers`] bundle along the way, and parses argv
//!    exactly once in [`ClapApiBuilder::go`].
//! 3. [`DynamicCli`] orchestrates load, peek, build and argv with a
//!    [`CliSettings`] file.
//!
//! # Example
//!
//! ```
//! use dyncli_builder::{CliSettings, DynamicCli};
//!
//! let xml = r#"
//!     <Cli>
//!       <Commands>
//!         <Command name="get" describe="Get a shape">
//!           <Arguments><ArgumentRef name="shape"/></Arguments>
//!         </Command>
//!       </Commands>
//!       <Arguments>
//!         <Argument name="shape" alias="s" describe="Shape name"/>
//!       </Arguments>
//!     </Cli>"#;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("shapes.xml");
//! std::fs::write(&path, xml).unwrap();
//!
//! let mut settings = CliSettings::named("shapes");
//! settings.default_command = Some("get".to_string());
//!
//! let argv: Vec<String> = ["node", "shapes", "-s", "square"].map(String::from).to_vec();
//! let mut cli = DynamicCli::new(settings);
//! let parsed = cli.run(&path, &argv).unwrap();
//!
//! assert_eq!(parsed.command.as_deref(), Some("get"));
//! assert_eq!(parsed.values["shape"], "square");
//! ```

mod adapter;
mod argv;
mod commander;
mod descriptor;
mod dynamic;
mod error;
mod handlers;
mod settings;

pub use adapter::{ClapApiBuilder, build_arg, default_option};
pub use argv::{Argv, POSITIONAL_KEY, ParsedArgv, SCRIPT_KEY};
pub use commander::CommandBuilder;
pub use descriptor::{AdaptedCommand, DescriptorKeys, OptionDef, OptionKind};
pub use dynamic::{CliState, DynamicCli};
pub use error::{AdapterError, BuildError, DynamicCliError, Result, SettingsError};
pub use handlers::{
    AfterCommandHandler, BeforeCommandHandler, BuildHandlers, DefaultOptionCallback, FailContext,
    FailHandler, FailOutcome, OptionContext, OptionHandler,
};
pub use settings::{BuildPolicy, CliSettings, default_parse_info};
