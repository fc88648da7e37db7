//! Preflight CLI - database object name validation

use preflight_cli::cli;
use preflight_cli::convert;
use preflight_cli::output;
#[cfg(feature = "serve")]
use preflight_cli::server;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use is_terminal::IsTerminal;
use preflight_core::{
    api_schema, EnvironmentIndex, FileSnapshotSource, LoadError, RawMetadata, ValidationResponse,
    ValidationResult, Validator,
};

use cli::{Args, CheckArgs, Command, ConfigError, OutputFormat, SharedArgs, SuggestArgs};
use output::{format_json, format_stats, format_suggestions, format_validation, CheckSummary};

/// Name has close matches but no exact match, or a command failed.
const EXIT_FAILURE: u8 = 1;
/// Name not found and nothing similar.
const EXIT_NOT_FOUND: u8 = 2;
/// Configuration error: no environments configured, or the requested
/// environment's snapshot is missing or unreadable.
const EXIT_CONFIG_ERROR: u8 = 66;

fn main() -> ExitCode {
    let args = Args::parse();
    let shared = args.shared;

    let outcome = match args.command {
        Command::Check(check) => run_check(&shared, check),
        Command::Suggest(suggest) => run_suggest(&shared, suggest).map(|()| ExitCode::SUCCESS),
        Command::Stats { format } => run_stats(&shared, format),
        Command::Convert(convert) => run_convert(&shared, convert),
        Command::Schema => run_schema(),
        #[cfg(feature = "serve")]
        Command::Serve(serve) => return run_serve_mode(&shared, serve),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("preflight: error: {e:#}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}

/// Snapshot and environment resolution failures are configuration errors;
/// anything else is a failed command.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    let is_config = err
        .chain()
        .any(|cause| cause.is::<LoadError>() || cause.is::<ConfigError>());
    if is_config {
        EXIT_CONFIG_ERROR
    } else {
        EXIT_FAILURE
    }
}

fn use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Load one environment's index, from `snapshot` when given.
fn load_index(shared: &SharedArgs, env: &str, snapshot: Option<&Path>) -> Result<EnvironmentIndex> {
    match snapshot {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    LoadError::NotFound {
                        environment: env.to_string(),
                        path: path.to_path_buf(),
                    }
                } else {
                    LoadError::Io {
                        environment: env.to_string(),
                        source,
                    }
                }
            })?;
            let raw = RawMetadata::from_json(&content)
                .map_err(|source| LoadError::Malformed {
                    environment: env.to_string(),
                    source,
                })
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            Ok(EnvironmentIndex::build(env, &raw))
        }
        None => {
            let source = shared.source();
            EnvironmentIndex::load_from(env, &source).map_err(|e| {
                let hint = available_snapshots(&source);
                if hint.is_empty() {
                    anyhow::Error::new(e)
                } else {
                    anyhow::Error::new(e).context(format!("available environments: {hint}"))
                }
            })
        }
    }
}

/// Environments that have a snapshot file in the data directory.
fn available_snapshots(source: &FileSnapshotSource) -> String {
    let Ok(entries) = std::fs::read_dir(source.dir()) else {
        return String::new();
    };
    let mut envs: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            preflight_core::environment_from_path(&entry.path()).map(str::to_string)
        })
        .collect();
    envs.sort();
    envs.join(", ")
}

/// Validate one name; the exit code reflects the outcome.
fn run_check(shared: &SharedArgs, args: CheckArgs) -> Result<ExitCode> {
    let index = load_index(shared, &args.env, args.snapshot.as_deref())?;
    let context = preflight_core::ValidationContext {
        schema_name: args.schema.clone(),
        table_name: args.table.clone(),
    };

    let validator = Validator::new(&index, shared.matcher());
    let result = validator.validate(args.scope, &args.name, Some(&context));

    let code = match &result {
        ValidationResult::Valid { .. } => ExitCode::SUCCESS,
        ValidationResult::Suggestions { .. } => ExitCode::from(EXIT_FAILURE),
        ValidationResult::NotFound => ExitCode::from(EXIT_NOT_FOUND),
    };

    match args.format {
        OutputFormat::Json => {
            let response = ValidationResponse::from(result);
            println!("{}", format_json(&response, false)?);
        }
        OutputFormat::Text => {
            let summary = CheckSummary {
                environment: &args.env,
                scope: args.scope,
                name: &args.name,
                schema: args.schema.as_deref(),
                table: args.table.as_deref(),
            };
            print!("{}", format_validation(&summary, &result, use_colors()));
        }
    }

    Ok(code)
}

fn run_suggest(shared: &SharedArgs, args: SuggestArgs) -> Result<()> {
    let index = load_index(shared, &args.env, None)?;
    let options = preflight_core::SuggestOptions {
        schema: args.schema,
        table: args.table,
        ..Default::default()
    };
    let suggestions = Validator::new(&index, shared.matcher()).suggest(args.scope, &args.query, &options);

    match args.format {
        OutputFormat::Json if args.scores => println!("{}", format_json(&suggestions, false)?),
        OutputFormat::Json => {
            let names: Vec<&str> = suggestions.iter().map(|s| s.name.as_str()).collect();
            println!("{}", format_json(&names, false)?);
        }
        OutputFormat::Text => print!("{}", format_suggestions(&suggestions, args.scores, use_colors())),
    }
    Ok(())
}

fn run_stats(shared: &SharedArgs, format: OutputFormat) -> Result<ExitCode> {
    let registry = shared.registry()?;
    registry.load_all(&shared.source());
    let rows = output::EnvironmentRow::collect(&registry);

    match format {
        OutputFormat::Json => println!("{}", format_json(&rows, false)?),
        OutputFormat::Text => print!("{}", format_stats(&rows, use_colors())),
    }

    if registry.is_any_loaded() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_FAILURE))
    }
}

fn run_convert(shared: &SharedArgs, args: cli::ConvertArgs) -> Result<ExitCode> {
    let outcome = convert::convert(&args, &shared.data_dir)?;
    print!("{}", convert::format_outcome(&outcome));
    Ok(ExitCode::SUCCESS)
}

fn run_schema() -> Result<ExitCode> {
    println!("{}", format_json(&api_schema(), false)?);
    Ok(ExitCode::SUCCESS)
}

/// Run the HTTP validation service.
#[cfg(feature = "serve")]
fn run_serve_mode(shared: &SharedArgs, args: cli::ServeArgs) -> ExitCode {
    use server::ServerConfig;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    let environments = match shared.environment_names() {
        Ok(environments) => environments,
        Err(e) => {
            eprintln!("preflight: error: {e:#}");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        data_dir: shared.data_dir.clone(),
        environments,
        matcher: shared.matcher(),
        watch: args.watch,
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("preflight: error: failed to create tokio runtime: {e}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    match runtime.block_on(server::run_server(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("preflight: server error: {e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
