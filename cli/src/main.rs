mod config;
mod output;

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use argflat_core::{
    CallAdapter, FlatArguments, FlatSignature, ReconstructedArguments, SchemaBundle, flatten,
    frontend, validate_bundle,
};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;
use crate::output::{OutputFormat, format_signatures};

#[derive(Debug, Parser)]
#[command(name = "argflat")]
#[command(about = "Inspect, validate and call flattened command schemas")]
#[command(version)]
struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Enable debug logging (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the flat signature of one or all commands in a bundle.
    Inspect(InspectArgs),
    /// Validate one or more schema bundle files.
    Validate(ValidateArgs),
    /// Parse flat arguments for a command and print the rebuilt parameters.
    Call(CallArgs),
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Schema bundle (JSON or YAML).
    schema: PathBuf,
    /// Only inspect this command.
    #[arg(long)]
    command: Option<String>,
    /// Output format (default: from config, else json).
    #[arg(long)]
    format: Option<OutputFormat>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Schema bundle files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct CallArgs {
    /// Schema bundle (JSON or YAML).
    schema: PathBuf,
    /// Command to call.
    command: String,
    /// Prompt on stdin for required leaves that were not supplied.
    #[arg(long)]
    prompt: bool,
    /// Flat arguments for the command, e.g. `--r 1 --g 2`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = CliConfig::load_or_default(cli.config.as_deref()).and_then(|config| {
        match cli.command {
            Command::Inspect(args) => run_inspect(args, &config),
            Command::Validate(args) => run_validate(args),
            Command::Call(args) => run_call(args, &config),
        }
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_inspect(args: InspectArgs, config: &CliConfig) -> Result<(), String> {
    let bundle = load_bundle(&args.schema)?;
    let registry = bundle.registry();

    let commands = match &args.command {
        Some(name) => vec![find_command(&bundle, name)?],
        None => bundle.commands.iter().collect(),
    };

    let signatures = commands
        .into_iter()
        .map(|spec| flatten(spec, &registry, &config.flatten))
        .collect::<Result<Vec<FlatSignature>, _>>()
        .map_err(|err| err.to_string())?;

    let format = args.format.unwrap_or(config.format);
    println!("{}", format_signatures(&signatures, format)?);
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let mut commands = 0usize;
    for path in &args.inputs {
        let bundle = load_bundle(path)?;
        commands += bundle.commands.len();
    }
    println!(
        "Validated {} bundle file(s) with {} command(s).",
        args.inputs.len(),
        commands
    );
    Ok(())
}

fn run_call(args: CallArgs, config: &CliConfig) -> Result<(), String> {
    let bundle = load_bundle(&args.schema)?;
    let spec = find_command(&bundle, &args.command)?.clone();

    let mut options = config.flatten.clone();
    options.prompt_required |= args.prompt;

    let adapter = CallAdapter::new(
        spec,
        Arc::new(bundle.registry()),
        &options,
        |rebuilt: ReconstructedArguments| rebuilt,
    )
    .map_err(|err| format!("Cannot flatten '{}': {err}", args.command))?;

    let argv = std::iter::once(args.command.clone()).chain(args.args);
    let matches = match frontend::build_command(adapter.signature()).try_get_matches_from(argv) {
        Ok(matches) => matches,
        Err(err) if !err.use_stderr() => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => {
            return Err(format!(
                "Invalid arguments for '{}':\n{}",
                args.command,
                err.render().to_string().trim_end()
            ));
        }
    };

    let mut flat = frontend::matches_to_flat(adapter.signature(), &matches);
    prompt_missing(adapter.signature(), &mut flat)?;
    debug!(command = %args.command, supplied = flat.len(), "Calling command");

    let rebuilt = adapter.call(&flat).map_err(|err| err.to_string())?;
    let raw = serde_json::to_string_pretty(&rebuilt)
        .map_err(|err| format!("Failed to serialize arguments: {err}"))?;
    println!("{raw}");
    Ok(())
}

fn prompt_missing(signature: &FlatSignature, flat: &mut FlatArguments) -> Result<(), String> {
    let missing = frontend::missing_prompts(signature, flat);
    if missing.is_empty() {
        return Ok(());
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut answers = Vec::with_capacity(missing.len());
    for param in missing {
        eprint!("{} [{}]: ", param.name, param.type_name);
        std::io::stderr()
            .flush()
            .map_err(|err| format!("Failed to write prompt: {err}"))?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.map_err(|err| format!("Failed to read '{}': {err}", param.name))?;
        let answer = line.trim();
        if !answer.is_empty() {
            answers.push((param.name.clone(), Value::String(answer.to_string())));
        }
    }

    flat.extend(answers);
    Ok(())
}

fn find_command<'a>(
    bundle: &'a SchemaBundle,
    name: &str,
) -> Result<&'a argflat_core::CallableSpec, String> {
    bundle.command(name).ok_or_else(|| {
        let known: Vec<&str> = bundle.commands.iter().map(|c| c.name.as_str()).collect();
        format!(
            "Unknown command '{name}' (available: {})",
            if known.is_empty() {
                "none".to_string()
            } else {
                known.join(", ")
            }
        )
    })
}

fn load_bundle(path: &Path) -> Result<SchemaBundle, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    );
    let bundle: SchemaBundle = if is_yaml {
        serde_yaml::from_str(&raw)
            .map_err(|err| format!("Invalid YAML '{}': {err}", path.display()))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|err| format!("Invalid JSON '{}': {err}", path.display()))?
    };

    let errors = validate_bundle(&bundle);
    if !errors.is_empty() {
        let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(format!("'{}': {}", path.display(), details.join("; ")));
    }

    info!(
        path = %path.display(),
        records = bundle.record_count(),
        commands = bundle.commands.len(),
        "Loaded schema bundle"
    );
    Ok(bundle)
}
