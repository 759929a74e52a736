//! Hook points of the clap adapter.
//!
//! Every hook receives the parser-builder instance by value and returns it,
//! possibly modified, so later stages see the right [`Command`].

use clap::Command;

use crate::descriptor::{AdaptedCommand, DescriptorKeys, OptionDef};

/// What an option handler sees for one option.
#[derive(Debug, Clone, Copy)]
pub struct OptionContext<'a> {
    /// The command the option belongs to.
    pub command: &'a AdaptedCommand<'a>,
    pub option: &'a OptionDef<'a>,
    pub keys: &'a DescriptorKeys,
}

/// Default option registration, handed to option handlers as `next`.
pub type DefaultOptionCallback<'a> = &'a dyn Fn(Command, &OptionContext<'_>) -> Command;

/// Registers one option on a command.
///
/// The handler may call `next` to get the default registration and adjust
/// the result, or skip it and register the option itself.
pub type OptionHandler = dyn Fn(Command, &OptionContext<'_>, DefaultOptionCallback<'_>) -> Command;

/// Runs before a command is attached to the parser. Receives the usage
/// line (`get <source>`), the help text and the command.
pub type BeforeCommandHandler = dyn Fn(Command, &str, &str, &AdaptedCommand<'_>) -> Command;

/// Runs after a command is attached to the parser.
pub type AfterCommandHandler = dyn Fn(Command) -> Command;

/// Decides the outcome of a parse failure.
pub type FailHandler = dyn Fn(&FailContext<'_>) -> FailOutcome;

/// A parse failure as seen by the fail handler.
#[derive(Debug)]
pub struct FailContext<'a> {
    /// Rendered clap message, including usage.
    pub message: String,
    pub error: &'a clap::Error,
    /// The parser that failed.
    pub parser: &'a Command,
    /// Registered command named on the command line, if any.
    pub command: Option<&'a str>,
}

/// Result of a fail handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailOutcome {
    /// Terminate with this exit code.
    Exit(i32),
    /// Reject the command line with a message.
    Reject(String),
}

/// The four optional hooks of the adapter.
///
/// # Examples
///
/// ```
/// use dyncli_builder::{BuildHandlers, FailOutcome};
///
/// let handlers = BuildHandlers::new()
///     .on_after_command(|parser| parser.subcommand_required(true))
///     .on_fail(|ctx| FailOutcome::Reject(ctx.message.clone()));
/// assert!(handlers.has_fail_handler());
/// ```
#[derive(Default)]
pub struct BuildHandlers {
    pub(crate) option: Option<Box<OptionHandler>>,
    pub(crate) before_command: Option<Box<BeforeCommandHandler>>,
    pub(crate) after_command: Option<Box<AfterCommandHandler>>,
    pub(crate) fail: Option<Box<FailHandler>>,
}

impl BuildHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_option(
        mut self,
        handler: impl Fn(Command, &OptionContext<'_>, DefaultOptionCallback<'_>) -> Command + 'static,
    ) -> Self {
        self.option = Some(Box::new(handler));
        self
    }

    pub fn on_before_command(
        mut self,
        handler: impl Fn(Command, &str, &str, &AdaptedCommand<'_>) -> Command + 'static,
    ) -> Self {
        self.before_command = Some(Box::new(handler));
        self
    }

    pub fn on_after_command(mut self, handler: impl Fn(Command) -> Command + 'static) -> Self {
        self.after_command = Some(Box::new(handler));
        self
    }

    pub fn on_fail(mut self, handler: impl Fn(&FailContext<'_>) -> FailOutcome + 'static) -> Self {
        self.fail = Some(Box::new(handler));
        self
    }

    pub fn has_fail_handler(&self) -> bool {
        self.fail.is_some()
    }
}

impl std::fmt::Debug for BuildHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildHandlers")
            .field("option", &self.option.is_some())
            .field("before_command", &self.before_command.is_some())
            .field("after_command", &self.after_command.is_some())
            .field("fail", &self.fail.is_some())
            .finish()
    }
}
