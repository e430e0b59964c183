//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the oq CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// oq - search an outline with the outline query language
#[derive(Parser, Debug)]
#[command(name = "oq")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Force JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Outline document to search (default: `outline` from config)
    #[arg(short, long, global = true, env = "OQ_OUTLINE")]
    pub outline: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the items matching a query
    #[command(alias = "s")]
    Search {
        /// Query, e.g. "(task | project) d:>0 -@status=done"
        query: String,

        /// Print only the first match
        #[arg(long, conflicts_with_all = ["limit", "all"])]
        first: bool,

        /// Limit results (default: 50, or `search.limit` from config)
        #[arg(long)]
        limit: Option<u32>,

        /// Show all matches (no limit)
        #[arg(long, conflicts_with = "limit")]
        all: bool,
    },

    /// Explain how a query evaluates against each item
    #[command(alias = "x")]
    Explain {
        /// Query to explain
        query: String,

        /// Only explain items that match
        #[arg(long)]
        matching: bool,
    },

    /// Parse a query and print its expression tree
    #[command(alias = "p")]
    Parse {
        /// Query to parse
        query: String,

        /// Print the single-line form instead of the indented tree
        #[arg(long)]
        compact: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print config file path
    Path,

    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}
