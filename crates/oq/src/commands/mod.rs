//! Command implementations for the oq CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod completions;
pub mod config;
pub mod explain;
pub mod parse;
pub mod search;

use std::env;
use std::path::PathBuf;

use outline_query_rs::{Outline, QueryError};

use crate::cli::Cli;
use crate::document::{self, DocumentError};
use config::Config;

/// Default number of search results when neither `--limit` nor config set one.
pub const DEFAULT_LIMIT: u32 = 50;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Query parsing error.
    #[error("query error: {0}")]
    Query(#[from] QueryError),

    /// Outline document error.
    #[error("outline error: {0}")]
    Document(#[from] DocumentError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Whether to be verbose.
    pub verbose: bool,
    /// Outline document to search, from `--outline` or config.
    pub outline_path: Option<PathBuf>,
    /// Default result limit from config.
    pub default_limit: Option<u32>,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments and the loaded config.
    ///
    /// Command-line flags win over config. Colors are also disabled when
    /// `NO_COLOR` is set.
    pub fn new(cli: &Cli, config: &Config) -> Self {
        let color_enabled = config.output.color.unwrap_or(true);
        let no_color_env = env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color && !no_color_env && color_enabled,
            quiet: cli.quiet,
            verbose: cli.verbose,
            outline_path: cli.outline.clone().or_else(|| config.outline.clone()),
            default_limit: config.search.limit,
        }
    }

    /// Loads the outline document this invocation searches.
    pub fn load_outline(&self) -> Result<Outline> {
        let path = self.outline_path.as_deref().ok_or_else(|| {
            CommandError::Config(
                "no outline file given; pass --outline or set `outline` in the config file"
                    .to_string(),
            )
        })?;
        Ok(document::load_outline(path)?)
    }
}
