//! Registration of command descriptors with clap.
//!
//! [`ClapApiBuilder`] owns the parser-builder instance (a root
//! [`clap::Command`]). Every descriptor becomes a subcommand; every option
//! goes through the option handler, which may compose with or bypass the
//! default registration. [`ClapApiBuilder::go`] is the single place where
//! parsing happens and where the fail handler is consulted.

use std::collections::{HashMap, HashSet};

use clap::builder::PossibleValuesParser;
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

use crate::argv::ParsedArgv;
use crate::descriptor::{AdaptedCommand, DescriptorKeys, OptionDef, OptionKind};
use crate::error::AdapterError;
use crate::handlers::{BuildHandlers, FailContext, FailOutcome, OptionContext, OptionHandler};

/// Builds a clap parser from command descriptors.
///
/// # Examples
///
/// ```
/// use clap::Command;
/// use dyncli_builder::{BuildHandlers, ClapApiBuilder, DescriptorKeys};
/// use serde_json::json;
///
/// let descriptor = json!({
///     "name": "get",
///     "describe": "Get a shape",
///     "options": {"shape": {"name": "shape", "alias": "s"}}
/// });
///
/// let mut builder = ClapApiBuilder::new(Command::new("shapes"), DescriptorKeys::default(), BuildHandlers::new());
/// builder.command(&descriptor, None).unwrap();
///
/// let argv = builder.go(["shapes", "get", "-s", "square"]).unwrap();
/// assert_eq!(argv.command.as_deref(), Some("get"));
/// assert_eq!(argv.values["shape"], "square");
/// ```
pub struct ClapApiBuilder {
    parser: Command,
    keys: DescriptorKeys,
    handlers: BuildHandlers,
    /// Option names and kinds per registered command.
    registered: HashMap<String, Vec<(String, OptionKind)>>,
    parsed: Option<ParsedArgv>,
    parse_passes: usize,
}

impl ClapApiBuilder {
    pub fn new(parser: Command, keys: DescriptorKeys, handlers: BuildHandlers) -> Self {
        Self {
            parser,
            keys,
            handlers,
            registered: HashMap::new(),
            parsed: None,
            parse_passes: 0,
        }
    }

    /// The parser-builder instance.
    pub fn parser(&self) -> &Command {
        &self.parser
    }

    /// Registers one command descriptor.
    ///
    /// `option_handler` takes precedence over the bundle's option handler.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidDescriptor`] for malformed descriptors,
    /// or [`AdapterError::AlreadyParsed`] once [`go`](Self::go) succeeded.
    pub fn command(
        &mut self,
        descriptor: &Value,
        option_handler: Option<&OptionHandler>,
    ) -> Result<&Command, AdapterError> {
        if self.parse_passes > 0 {
            return Err(AdapterError::AlreadyParsed);
        }
        let adapted = AdaptedCommand::from_descriptor(descriptor, &self.keys)?;
        check_options(&adapted)?;
        debug!(
            command = %adapted.name,
            options = adapted.options.len(),
            "Registering command"
        );

        let mut parser = std::mem::take(&mut self.parser);
        if let Some(before) = &self.handlers.before_command {
            let help = adapted.describe.clone().unwrap_or_default();
            parser = before(parser, &adapted.usage(), &help, &adapted);
        }

        let mut subcommand = Command::new(adapted.name.clone());
        if let Some(describe) = &adapted.describe {
            subcommand = subcommand.about(describe.clone());
        }
        if !adapted.aliases.is_empty() {
            subcommand = subcommand.visible_aliases(adapted.aliases.clone());
        }
        if adapted.hidden {
            subcommand = subcommand.hide(true);
        }

        let handler = option_handler.or(self.handlers.option.as_deref());
        for option in &adapted.options {
            let context = OptionContext {
                command: &adapted,
                option,
                keys: &self.keys,
            };
            subcommand = match handler {
                Some(handler) => handler(subcommand, &context, &default_option),
                None => default_option(subcommand, &context),
            };
        }
        subcommand = apply_validation_groups(subcommand, &adapted);

        self.registered.insert(
            adapted.name.clone(),
            adapted
                .options
                .iter()
                .map(|option| (option.name.clone(), option.kind))
                .collect(),
        );
        parser = parser.subcommand(subcommand);

        if let Some(after) = &self.handlers.after_command {
            parser = after(parser);
        }
        self.parser = parser;
        Ok(&self.parser)
    }

    /// Registers every command descriptor of `container`, an array of
    /// descriptors or an object whose values are descriptors.
    ///
    /// # Errors
    ///
    /// Fails like [`command`](Self::command), or with
    /// [`AdapterError::InvalidDescriptor`] if `container` holds no
    /// descriptors.
    pub fn commands(
        &mut self,
        container: &Value,
        option_handler: Option<&OptionHandler>,
    ) -> Result<&Command, AdapterError> {
        let descriptors: Vec<&Value> = match container {
            Value::Array(items) => items.iter().collect(),
            Value::Object(map) => map.values().collect(),
            _ => {
                return Err(AdapterError::InvalidDescriptor(
                    "command container must be an array or an object".to_string(),
                ));
            }
        };
        for descriptor in descriptors {
            self.command(descriptor, option_handler)?;
        }
        Ok(&self.parser)
    }

    /// Parses `args`, whose first item is the program name.
    ///
    /// Parsing happens once; later calls return the cached result without
    /// touching the parser or any hook. After a failed parse, later calls
    /// return [`AdapterError::AlreadyParsed`].
    ///
    /// # Errors
    ///
    /// Help and version requests, and every failure when no fail handler is
    /// installed, are returned as [`AdapterError::Parse`]. Otherwise the fail
    /// handler's outcome is returned as [`AdapterError::Exit`] or
    /// [`AdapterError::Rejected`].
    pub fn go<I, T>(&mut self, args: I) -> Result<&ParsedArgv, AdapterError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        if self.parse_passes > 0 {
            return self.parsed.as_ref().ok_or(AdapterError::AlreadyParsed);
        }

        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        self.parse_passes += 1;
        debug!(args = ?args, "Parsing arguments");

        match self.parser.try_get_matches_from_mut(args.iter()) {
            Ok(matches) => {
                let parsed = self.extract(&matches, &args);
                Ok(&*self.parsed.insert(parsed))
            }
            Err(error) if is_display_request(&error) => {
                debug!(kind = ?error.kind(), "Help or version requested");
                Err(AdapterError::Parse(error))
            }
            Err(error) => {
                let Some(fail) = &self.handlers.fail else {
                    return Err(AdapterError::Parse(error));
                };
                let command = args
                    .iter()
                    .skip(1)
                    .find(|arg| self.registered.contains_key(arg.as_str()))
                    .map(String::as_str);
                let context = FailContext {
                    message: error.to_string(),
                    error: &error,
                    parser: &self.parser,
                    command,
                };
                match fail(&context) {
                    FailOutcome::Exit(code) => Err(AdapterError::Exit(code)),
                    FailOutcome::Reject(message) => Err(AdapterError::Rejected(message)),
                }
            }
        }
    }

    /// The parsed arguments, once [`go`](Self::go) succeeded.
    pub fn parsed(&self) -> Option<&ParsedArgv> {
        self.parsed.as_ref()
    }

    /// Number of times the parser ran.
    pub fn parse_passes(&self) -> usize {
        self.parse_passes
    }

    fn extract(&self, matches: &ArgMatches, args: &[String]) -> ParsedArgv {
        let script = args.first().cloned().unwrap_or_default();
        let Some((name, sub_matches)) = matches.subcommand() else {
            return ParsedArgv {
                command: None,
                values: Map::new(),
                positional: Vec::new(),
                script,
            };
        };

        let mut values = Map::new();
        for (option, kind) in self.registered.get(name).into_iter().flatten() {
            if let Some(value) = option_value(sub_matches, option, *kind) {
                values.insert(option.clone(), value);
            }
        }

        ParsedArgv {
            command: Some(name.to_string()),
            values,
            positional: vec![name.to_string()],
            script,
        }
    }
}

impl std::fmt::Debug for ClapApiBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClapApiBuilder")
            .field("parser", &self.parser.get_name())
            .field("handlers", &self.handlers)
            .field("registered", &self.registered.keys().collect::<Vec<_>>())
            .field("parsed", &self.parsed)
            .finish()
    }
}

/// Registers an option the default way.
pub fn default_option(command: Command, context: &OptionContext<'_>) -> Command {
    command.arg(build_arg(context.option))
}

/// Builds the clap argument for an option definition.
pub fn build_arg(option: &OptionDef<'_>) -> Arg {
    let mut arg = Arg::new(option.name.clone());

    if !is_positional(option) {
        arg = arg.long(option.name.clone());
        for alias in &option.alias {
            let mut chars = alias.chars();
            match (chars.next(), chars.next()) {
                (Some(short), None) => arg = arg.short(short),
                _ => arg = arg.visible_alias(alias.clone()),
            }
        }
    }

    if let Some(describe) = &option.describe {
        arg = arg.help(describe.clone());
    }
    if option.required {
        arg = arg.required(true);
    }
    if option.hidden {
        arg = arg.hide(true);
    }

    arg = match option.kind {
        OptionKind::Boolean => arg.action(ArgAction::SetTrue),
        OptionKind::Count => arg.action(ArgAction::Count),
        OptionKind::Number => arg.action(ArgAction::Set).value_parser(value_parser!(f64)),
        OptionKind::String => arg.action(ArgAction::Set),
        OptionKind::Array => arg.action(ArgAction::Append).num_args(1..),
    };

    if !option.choices.is_empty()
        && matches!(option.kind, OptionKind::String | OptionKind::Array)
    {
        arg = arg.value_parser(PossibleValuesParser::new(option.choices.clone()));
    }

    match (&option.default, option.kind) {
        (_, OptionKind::Boolean | OptionKind::Count) | (None, _) => {}
        (Some(Value::Array(items)), _) => {
            arg = arg.default_values(items.iter().map(default_text).collect::<Vec<_>>());
        }
        (Some(default), _) => arg = arg.default_value(default_text(default)),
    }

    arg
}

/// Help and version output that clap reports as an error.
fn is_display_request(error: &clap::Error) -> bool {
    matches!(
        error.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

/// Rejects options clap would refuse to build: names clashing with the
/// generated help flag or with each other, and positionals clap cannot
/// order.
fn check_options(adapted: &AdaptedCommand<'_>) -> Result<(), AdapterError> {
    let invalid = |reason: String| {
        AdapterError::InvalidDescriptor(format!("command '{}': {reason}", adapted.name))
    };

    let mut ids = HashSet::new();
    let mut longs = HashSet::new();
    let mut shorts = HashSet::new();
    let mut positionals: Vec<&OptionDef<'_>> = Vec::new();

    for option in &adapted.options {
        if option.name.is_empty() {
            return Err(invalid("option with an empty name".to_string()));
        }
        if !ids.insert(option.name.as_str()) {
            return Err(invalid(format!("option '{}' is defined twice", option.name)));
        }

        if is_positional(option) {
            positionals.push(option);
            continue;
        }

        let mut names = vec![option.name.as_str()];
        for alias in &option.alias {
            let mut chars = alias.chars();
            match (chars.next(), chars.next()) {
                (Some(short), None) => {
                    if short == 'h' {
                        return Err(invalid(format!(
                            "option '{}' uses '-h', reserved for help",
                            option.name
                        )));
                    }
                    if !shorts.insert(short) {
                        return Err(invalid(format!("short flag '-{short}' is used twice")));
                    }
                }
                (None, _) => {
                    return Err(invalid(format!("option '{}' has an empty alias", option.name)));
                }
                _ => names.push(alias.as_str()),
            }
        }
        for long in names {
            if long == "help" {
                return Err(invalid(format!(
                    "option '{}' uses '--help', reserved for help",
                    option.name
                )));
            }
            if !longs.insert(long) {
                return Err(invalid(format!("flag '--{long}' is used twice")));
            }
        }
    }

    if let Some(index) = positionals.iter().position(|option| !option.required) {
        if let Some(required) = positionals[index..].iter().find(|option| option.required) {
            return Err(invalid(format!(
                "required positional '{}' follows optional positional '{}'",
                required.name, positionals[index].name
            )));
        }
    }
    if let Some((_, leading)) = positionals.split_last() {
        if let Some(array) = leading.iter().find(|option| option.kind == OptionKind::Array) {
            return Err(invalid(format!(
                "array positional '{}' must be the last positional",
                array.name
            )));
        }
    }

    Ok(())
}

fn is_positional(option: &OptionDef<'_>) -> bool {
    option.positional && !matches!(option.kind, OptionKind::Boolean | OptionKind::Count)
}

fn default_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn apply_validation_groups(mut command: Command, adapted: &AdaptedCommand<'_>) -> Command {
    let defined = |command: &Command, name: &str| command.get_arguments().any(|a| a.get_id() == name);

    for group in &adapted.conflicts {
        for (index, first) in group.iter().enumerate() {
            for second in &group[index + 1..] {
                if first == second {
                    continue;
                }
                if !defined(&command, first) || !defined(&command, second) {
                    warn!(
                        command = %adapted.name,
                        first = %first,
                        second = %second,
                        "Skipping conflict between undefined options"
                    );
                    continue;
                }
                let other = second.clone();
                command = command.mut_arg(first, |arg| arg.conflicts_with(other));
            }
        }
    }

    for group in &adapted.implies {
        let Some((first, implied)) = group.split_first() else {
            continue;
        };
        for target in implied.iter().filter(|target| *target != first) {
            if !defined(&command, first) || !defined(&command, target) {
                warn!(
                    command = %adapted.name,
                    option = %first,
                    implies = %target,
                    "Skipping implication between undefined options"
                );
                continue;
            }
            let other = target.clone();
            command = command.mut_arg(first, |arg| arg.requires(other));
        }
    }

    command
}

fn option_value(matches: &ArgMatches, name: &str, kind: OptionKind) -> Option<Value> {
    match kind {
        OptionKind::Boolean => matches
            .try_get_one::<bool>(name)
            .ok()
            .flatten()
            .map(|flag| Value::Bool(*flag)),
        OptionKind::Count => matches
            .try_get_one::<u8>(name)
            .ok()
            .flatten()
            .map(|count| Value::Number((*count).into())),
        OptionKind::Number => matches
            .try_get_one::<f64>(name)
            .ok()
            .flatten()
            .and_then(|number| number_value(*number)),
        OptionKind::String => matches
            .try_get_one::<String>(name)
            .ok()
            .flatten()
            .map(|text| Value::String(text.clone())),
        OptionKind::Array => matches
            .try_get_many::<String>(name)
            .ok()
            .flatten()
            .map(|items| Value::Array(items.cloned().map(Value::String).collect())),
    }
}

fn number_value(number: f64) -> Option<Value> {
    if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        return Some(Value::Number((number as i64).into()));
    }
    Number::from_f64(number).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn builder(handlers: BuildHandlers) -> ClapApiBuilder {
        ClapApiBuilder::new(
            Command::new("shapes").subcommand_required(true),
            DescriptorKeys::default(),
            handlers,
        )
    }

    fn get_descriptor() -> Value {
        json!({
            "_": "Command",
            "name": "get",
            "describe": "Get a shape",
            "options": {
                "shape": {"_": "Argument", "name": "shape", "alias": "s", "choices": "square,circle"},
                "sides": {"_": "Argument", "name": "sides", "type": "number", "default": 4},
                "verbose": {"_": "Argument", "name": "verbose", "type": "count", "alias": "v"},
                "all": {"_": "Argument", "name": "all", "type": "boolean"},
                "tag": {"_": "Argument", "name": "tag", "type": "array"},
                "source": {"_": "Argument", "name": "source", "positional": true}
            },
            "validation_groups": {"conflicts": [["shape", "all"]], "implies": [["tag", "shape"]]}
        })
    }

    #[test]
    fn test_values_by_kind() {
        let descriptor = get_descriptor();
        let mut builder = builder(BuildHandlers::new());
        builder.command(&descriptor, None).unwrap();

        let argv = builder
            .go([
                "shapes", "get", "-s", "circle", "-vv", "--tag", "a", "b", "--sides", "2.5", "src",
            ])
            .unwrap();
        assert_eq!(argv.command.as_deref(), Some("get"));
        assert_eq!(argv.positional, vec!["get"]);
        assert_eq!(argv.script, "shapes");
        assert_eq!(
            Value::Object(argv.values.clone()),
            json!({
                "shape": "circle",
                "sides": 2.5,
                "verbose": 2,
                "all": false,
                "tag": ["a", "b"],
                "source": "src"
            })
        );
    }

    #[test]
    fn test_defaults_and_integral_numbers() {
        let descriptor = get_descriptor();
        let mut builder = builder(BuildHandlers::new());
        builder.command(&descriptor, None).unwrap();

        let argv = builder.go(["shapes", "get"]).unwrap();
        assert_eq!(argv.values["sides"], json!(4));
        assert!(argv.values.get("shape").is_none());
    }

    #[test]
    fn test_validation_groups_are_enforced() {
        let descriptor = get_descriptor();

        let mut conflicting = builder(BuildHandlers::new());
        conflicting.command(&descriptor, None).unwrap();
        let err = conflicting
            .go(["shapes", "get", "--shape", "square", "--all"])
            .unwrap_err();
        assert!(matches!(err, AdapterError::Parse(e) if e.kind() == clap::error::ErrorKind::ArgumentConflict));

        let mut implying = builder(BuildHandlers::new());
        implying.command(&descriptor, None).unwrap();
        let err = implying.go(["shapes", "get", "--tag", "x"]).unwrap_err();
        assert!(matches!(err, AdapterError::Parse(e) if e.kind() == clap::error::ErrorKind::MissingRequiredArgument));
    }

    #[test]
    fn test_invalid_choice_goes_through_fail_handler() {
        let descriptor = get_descriptor();
        let handlers = BuildHandlers::new().on_fail(|ctx| {
            assert_eq!(ctx.command, Some("get"));
            assert_eq!(ctx.parser.get_name(), "shapes");
            FailOutcome::Reject(format!("rejected: {}", ctx.error.kind()))
        });
        let mut builder = builder(handlers);
        builder.command(&descriptor, None).unwrap();

        let err = builder.go(["shapes", "get", "--shape", "hexagon"]).unwrap_err();
        assert!(matches!(err, AdapterError::Rejected(msg) if msg.starts_with("rejected:")));
    }

    #[test]
    fn test_fail_handler_exit_code() {
        let handlers = BuildHandlers::new().on_fail(|_| FailOutcome::Exit(2));
        let mut builder = builder(handlers);
        builder.command(&get_descriptor(), None).unwrap();

        let err = builder.go(["shapes", "nope"]).unwrap_err();
        assert!(matches!(err, AdapterError::Exit(2)));
    }

    #[test]
    fn test_commands_accepts_object_container() {
        let container = json!({
            "get": {"name": "get"},
            "put": {"name": "put", "alias": "p"}
        });
        let mut builder = builder(BuildHandlers::new());
        let parser = builder.commands(&container, None).unwrap();
        let names: Vec<_> = parser.get_subcommands().map(|c| c.get_name().to_string()).collect();
        assert_eq!(names, vec!["get", "put"]);

        let argv = builder.go(["shapes", "p"]).unwrap();
        assert_eq!(argv.command.as_deref(), Some("put"));
    }

    #[test]
    fn test_register_after_parse_is_rejected() {
        let mut builder = builder(BuildHandlers::new());
        builder.command(&json!({"name": "get"}), None).unwrap();
        builder.go(["shapes", "get"]).unwrap();

        let err = builder.command(&json!({"name": "put"}), None).unwrap_err();
        assert!(matches!(err, AdapterError::AlreadyParsed));
    }

    #[test]
    fn test_help_request_bypasses_fail_handler() {
        let calls = std::rc::Rc::new(std::cell::Cell::new(0));
        let counter = std::rc::Rc::clone(&calls);
        let handlers = BuildHandlers::new().on_fail(move |_| {
            counter.set(counter.get() + 1);
            FailOutcome::Exit(1)
        });
        let mut builder = builder(handlers);
        builder.command(&get_descriptor(), None).unwrap();

        let err = builder.go(["shapes", "get", "--help"]).unwrap_err();
        assert!(
            matches!(&err, AdapterError::Parse(e) if e.kind() == clap::error::ErrorKind::DisplayHelp)
        );
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_failed_parse_is_not_retried() {
        let calls = std::rc::Rc::new(std::cell::Cell::new(0));
        let counter = std::rc::Rc::clone(&calls);
        let handlers = BuildHandlers::new().on_fail(move |ctx| {
            counter.set(counter.get() + 1);
            FailOutcome::Reject(ctx.message.clone())
        });
        let mut builder = builder(handlers);
        builder.command(&get_descriptor(), None).unwrap();

        assert!(matches!(builder.go(["shapes", "nope"]), Err(AdapterError::Rejected(_))));
        assert!(matches!(builder.go(["shapes", "get"]), Err(AdapterError::AlreadyParsed)));
        assert_eq!(builder.parse_passes(), 1);
        assert_eq!(calls.get(), 1);
        assert!(builder.parsed().is_none());
        assert!(matches!(
            builder.command(&json!({"name": "put"}), None),
            Err(AdapterError::AlreadyParsed)
        ));
    }

    fn register_error(options: Value) -> String {
        let mut builder = builder(BuildHandlers::new());
        let descriptor = json!({"name": "get", "options": options});
        match builder.command(&descriptor, None) {
            Err(AdapterError::InvalidDescriptor(reason)) => reason,
            other => panic!("expected an invalid descriptor, got {other:?}"),
        }
    }

    #[test]
    fn test_options_clashing_with_help_are_rejected() {
        let reason = register_error(json!({"height": {"name": "height", "alias": "h"}}));
        assert!(reason.contains("-h"), "{reason}");

        let reason = register_error(json!({"help": {"name": "help"}}));
        assert!(reason.contains("--help"), "{reason}");

        let reason = register_error(json!({"assist": {"name": "assist", "alias": "help"}}));
        assert!(reason.contains("--help"), "{reason}");
    }

    #[test]
    fn test_duplicate_flags_are_rejected() {
        let reason = register_error(json!({
            "shape": {"name": "shape", "alias": "s"},
            "size": {"name": "size", "alias": "s"}
        }));
        assert!(reason.contains("-s"), "{reason}");

        let reason = register_error(json!({
            "shape": {"name": "shape", "alias": "form"},
            "form": {"name": "form"}
        }));
        assert!(reason.contains("--form"), "{reason}");
    }

    #[test]
    fn test_positional_order_is_checked() {
        let reason = register_error(json!({
            "source": {"name": "source", "positional": true},
            "target": {"name": "target", "positional": true, "required": true}
        }));
        assert!(reason.contains("'target' follows optional positional 'source'"), "{reason}");

        let reason = register_error(json!({
            "files": {"name": "files", "positional": true, "type": "array"},
            "target": {"name": "target", "positional": true}
        }));
        assert!(reason.contains("'files'"), "{reason}");

        let mut builder = builder(BuildHandlers::new());
        let descriptor = json!({
            "name": "copy",
            "options": {
                "target": {"name": "target", "positional": true, "required": true},
                "files": {"name": "files", "positional": true, "type": "array"}
            }
        });
        builder.command(&descriptor, None).unwrap();
        let argv = builder.go(["shapes", "copy", "out", "a", "b"]).unwrap();
        assert_eq!(argv.values["target"], json!("out"));
        assert_eq!(argv.values["files"], json!(["a", "b"]));
    }

    #[test]
    fn test_self_referencing_groups_are_ignored() {
        let descriptor = json!({
            "name": "get",
            "options": {"shape": {"name": "shape"}},
            "validation_groups": {"conflicts": [["shape", "shape"]], "implies": [["shape", "shape"]]}
        });
        let mut builder = builder(BuildHandlers::new());
        builder.command(&descriptor, None).unwrap();
        let argv = builder.go(["shapes", "get", "--shape", "cube"]).unwrap();
        assert_eq!(argv.values["shape"], json!("cube"));
    }

    #[test]
    fn test_number_value() {
        assert_eq!(number_value(3.0), Some(json!(3)));
        assert_eq!(number_value(-0.5), Some(json!(-0.5)));
        assert_eq!(number_value(f64::NAN), None);
    }
}
