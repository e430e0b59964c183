use clap::Parser;
use std::process::ExitCode;

mod cli;
mod commands;
mod document;
mod output;

use cli::{Cli, Commands, ConfigCommands};
use commands::config::{load_config, Config};
use commands::explain::ExplainOptions;
use commands::search::SearchOptions;
use commands::{CommandContext, CommandError};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": error_code(&e),
                        "message": e.to_string(),
                    }
                });
                match serde_json::to_string_pretty(&error_json) {
                    Ok(json) => eprintln!("{json}"),
                    Err(_) => eprintln!("Error: {e}"),
                }
            } else {
                eprintln!("Error: {e}");
            }
            error_exit_code(&e)
        }
    }
}

fn run(cli: &Cli) -> commands::Result<()> {
    // `config` commands must keep working when the config file itself is broken.
    let config = match &cli.command {
        Some(Commands::Config { .. }) => Config::default(),
        _ => load_config()?,
    };
    let ctx = CommandContext::new(cli, &config);

    match &cli.command {
        Some(Commands::Search {
            query,
            first,
            limit,
            all,
        }) => {
            let opts = SearchOptions {
                query: query.clone(),
                first: *first,
                limit: *limit,
                all: *all,
            };
            commands::search::execute(&ctx, &opts)
        }
        Some(Commands::Explain { query, matching }) => {
            let opts = ExplainOptions {
                query: query.clone(),
                matching: *matching,
            };
            commands::explain::execute(&ctx, &opts)
        }
        Some(Commands::Parse { query, compact }) => {
            commands::parse::execute(&ctx, query, *compact)
        }
        Some(Commands::Completions { shell }) => {
            commands::completions::execute(shell).map_err(CommandError::Io)
        }
        Some(Commands::Config { command }) => match command {
            Some(ConfigCommands::Show) | None => commands::config::execute_show(&ctx),
            Some(ConfigCommands::Path) => commands::config::execute_path(&ctx),
            Some(ConfigCommands::Init { force }) => commands::config::execute_init(&ctx, *force),
        },
        None => {
            if !ctx.quiet {
                println!("oq - outline query CLI");
                println!("Use --help for usage information");
            }
            Ok(())
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Query(_) => "QUERY_ERROR",
        CommandError::Document(_) => "OUTLINE_ERROR",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the exit code for an error.
fn error_exit_code(e: &CommandError) -> ExitCode {
    match e {
        CommandError::Query(_) => ExitCode::from(1),
        CommandError::Json(_) => ExitCode::from(1),
        CommandError::Io(_) => ExitCode::from(3),
        CommandError::Document(_) => ExitCode::from(5),
        CommandError::Config(_) => ExitCode::from(5),
    }
}
