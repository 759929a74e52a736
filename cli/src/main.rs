use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use dyncli_builder::{
    AdapterError, CliSettings, CommandBuilder, DynamicCli, DynamicCliError,
};
use dyncli_convert::{Converter, XmlDocument};
use serde_json::Value;
use tracing::debug;

/// Output format for converted documents and descriptors.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum CliOutputFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "dyncli")]
#[command(about = "Build command-line interfaces from XML descriptions", version)]
struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. debug, dyncli_convert=trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert an XML document, or the elements an XPath selects, to JSON.
    Convert(ConvertArgs),
    /// Print the command descriptors built from a commands XML file.
    Describe(DescribeArgs),
    /// Validate a settings file.
    Validate(ValidateArgs),
    /// Build the CLI described by an XML file and parse ARGS with it.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// XML document to convert.
    #[arg(long)]
    input: PathBuf,
    /// Convert only the elements this XPath expression selects.
    #[arg(long)]
    xpath: Option<String>,
    /// Settings YAML supplying the conversion spec and parse info.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Write the result here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t)]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct DescribeArgs {
    /// Commands XML file.
    #[arg(long)]
    input: PathBuf,
    /// Describe only this command.
    #[arg(long)]
    command: Option<String>,
    /// Settings YAML.
    #[arg(long)]
    settings: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t)]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Settings YAML to check.
    #[arg(long)]
    settings: PathBuf,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Commands XML file.
    #[arg(long)]
    input: PathBuf,
    /// Settings YAML.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Arguments for the built CLI, after `--`.
    #[arg(last = true)]
    args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    let result = match cli.command {
        Command::Convert(args) => run_convert(args),
        Command::Describe(args) => run_describe(args),
        Command::Validate(args) => run_validate(args),
        Command::Run(args) => run_dynamic(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_convert(args: ConvertArgs) -> Result<(), String> {
    let settings = load_settings(args.settings.as_deref(), &args.input)?;
    let document = XmlDocument::load(&args.input)
        .map_err(|err| format!("Failed to read '{}': {err}", args.input.display()))?;
    let converter = Converter::new(settings.spec.clone());

    let value = match &args.xpath {
        None => converter
            .build(document.root(), &settings.parse_info)
            .map_err(|e| e.to_string())?,
        Some(expression) => {
            let selectors = document.selectors();
            let selected = selectors
                .select(expression, None)
                .map_err(|e| e.to_string())?;
            debug!(expression = %expression, count = selected.len(), "Converting selection");

            let mut values = Vec::with_capacity(selected.len());
            for element in selected {
                let parent = selectors
                    .select_single("..", Some(element))
                    .map_err(|e| e.to_string())?;
                values.push(
                    converter
                        .build_within(element, parent, &settings.parse_info)
                        .map_err(|e| e.to_string())?,
                );
            }
            Value::Array(values)
        }
    };

    let raw = render(&value, args.format)?;
    match &args.output {
        Some(output) => fs::write(output, raw)
            .map_err(|err| format!("Failed to write '{}': {err}", output.display())),
        None => {
            println!("{raw}");
            Ok(())
        }
    }
}

fn run_describe(args: DescribeArgs) -> Result<(), String> {
    let settings = load_settings(args.settings.as_deref(), &args.input)?;
    let document = XmlDocument::load(&args.input)
        .map_err(|err| format!("Failed to read '{}': {err}", args.input.display()))?;
    let converter = Converter::new(settings.spec.clone());
    let builder = CommandBuilder::new(
        &converter,
        &settings.parse_info,
        &document,
        &settings.schema,
    );

    let commands_node = builder.commands_node().map_err(|e| e.to_string())?;
    let descriptors = match &args.command {
        Some(name) => {
            let named = builder
                .build_named_command(name, commands_node)
                .map_err(|e| e.to_string())?;
            if named.is_empty() {
                return Err(format!(
                    "command '{name}' is not defined in '{}'",
                    args.input.display()
                ));
            }
            named
        }
        None => builder
            .build_commands(commands_node)
            .map_err(|e| e.to_string())?,
    };

    println!("{}", render(&Value::Array(descriptors), args.format)?);
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let settings = CliSettings::load(&args.settings)
        .map_err(|err| format!("Failed to load '{}': {err}", args.settings.display()))?;
    let errors = settings.validate();
    if errors.is_empty() {
        println!("Settings '{}' are valid.", args.settings.display());
        return Ok(());
    }

    for err in &errors {
        eprintln!("  {err}");
    }
    Err(format!(
        "{} problem(s) found in '{}'",
        errors.len(),
        args.settings.display()
    ))
}

fn run_dynamic(args: RunArgs) -> Result<(), String> {
    let settings = load_settings(args.settings.as_deref(), &args.input)?;
    let program = std::env::args().next().unwrap_or_else(|| "dyncli".to_string());
    let mut argv = vec![program, args.input.display().to_string()];
    argv.extend(args.args);

    let mut cli = DynamicCli::new(settings);
    match cli.run(&args.input, &argv) {
        Ok(parsed) => {
            let raw = serde_json::to_string_pretty(&parsed.to_value())
                .map_err(|err| format!("Failed to serialize arguments: {err}"))?;
            println!("{raw}");
            Ok(())
        }
        Err(DynamicCliError::Adapter(AdapterError::Parse(err))) => err.exit(),
        Err(err) => Err(err.to_string()),
    }
}

/// Settings from `path`, or defaults named after the input file.
fn load_settings(path: Option<&Path>, input: &Path) -> Result<CliSettings, String> {
    match path {
        Some(path) => CliSettings::load(path)
            .map_err(|err| format!("Failed to load '{}': {err}", path.display())),
        None => {
            let name = input
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("cli");
            Ok(CliSettings::named(name))
        }
    }
}

fn render(value: &Value, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|err| format!("Failed to serialize JSON: {err}")),
        CliOutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|err| format!("Failed to serialize YAML: {err}"))
        }
    }
}
