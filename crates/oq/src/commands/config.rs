//! Config command implementation.
//!
//! View and manage configuration settings.
//! Config file is located at ~/.config/oq/config.toml.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use super::{CommandContext, CommandError, Result};

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 1;

/// Default config file contents.
const DEFAULT_CONFIG: &str = r#"# oq - outline query CLI configuration

# Config schema version (do not modify)
version = 1

# Outline document searched when --outline is not given.
# Relative paths are resolved against this file's directory.
# outline = "outline.json"

# Output preferences
[output]
# color = true              # Enable colors (respects NO_COLOR env)

# Search settings
[search]
# limit = 50                # Default number of results
"#;

/// Configuration file structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version for migrations.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Default outline document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline: Option<PathBuf>,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Search settings.
    #[serde(default)]
    pub search: SearchConfig,
}

/// Returns the current config version (used by serde default).
fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            outline: None,
            output: OutputConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
}

/// Search configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Default result limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Gets the config directory path.
/// Uses XDG-style paths: ~/.config/oq/ on all platforms.
fn get_config_dir() -> Result<PathBuf> {
    // Use XDG_CONFIG_HOME if set, otherwise ~/.config/oq
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("oq"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("oq"))
        .ok_or_else(|| CommandError::Config("Could not determine config directory".to_string()))
}

/// Gets the config file path.
pub fn get_config_path() -> Result<PathBuf> {
    // Check for override env var first
    if let Ok(path) = env::var("OQ_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    let config_dir = get_config_dir()?;
    Ok(config_dir.join("config.toml"))
}

/// Loads the configuration from disk.
///
/// A missing file yields the default configuration.
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {}", e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {}", e)))?;

    let config = migrate_config(config)?;
    Ok(resolve_outline_path(config, &path))
}

/// Migrates config to current version if needed.
/// Returns the config as-is if already at current version.
fn migrate_config(mut config: Config) -> Result<Config> {
    // Version 1 is the initial schema. A later schema bumps CONFIG_VERSION and
    // upgrades older files here, one version step at a time.
    if config.version > CONFIG_VERSION {
        tracing::warn!(
            version = config.version,
            supported = CONFIG_VERSION,
            "config file is newer than this oq; unknown settings are ignored"
        );
    }
    config.version = CONFIG_VERSION;
    Ok(config)
}

/// Makes a relative `outline` path relative to the config file's directory.
fn resolve_outline_path(mut config: Config, config_path: &Path) -> Config {
    if let (Some(outline), Some(dir)) = (&config.outline, config_path.parent()) {
        if outline.is_relative() {
            config.outline = Some(dir.join(outline));
        }
    }
    config
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let config = load_config()?;
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let location = format!("# {}", path.display());
        if ctx.use_colors {
            println!("{}", location.dimmed());
        } else {
            println!("{location}");
        }
        if !path.exists() {
            println!("# not created yet; `oq config init` writes the defaults");
        }

        // Effective settings, with relative paths already resolved.
        let rendered = toml::to_string_pretty(&config)
            .map_err(|e| CommandError::Config(format!("Failed to render config: {}", e)))?;
        print!("{rendered}");
    }

    Ok(())
}

/// Executes the config path command.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

/// Executes the config init command: writes the default config file.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn execute_init(ctx: &CommandContext, force: bool) -> Result<()> {
    let path = get_config_path()?;

    if path.exists() && !force {
        return Err(CommandError::Config(format!(
            "config file already exists at {} (use --force to overwrite)",
            path.display()
        )));
    }

    // Ensure directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CommandError::Config(format!("Failed to create config directory: {}", e))
        })?;
    }

    fs::write(&path, DEFAULT_CONFIG)
        .map_err(|e| CommandError::Config(format!("Failed to write config: {}", e)))?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "success",
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("Created default config at: {}", path.display());
    }

    Ok(())
}
