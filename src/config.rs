//! Configuration module for the countdown server.
//!
//! Supports both command-line arguments and TOML configuration file.
//! CLI arguments take precedence over config file values.

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

/// Which accept-loop variant to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerMode {
    /// Handle one connection at a time on the accept loop.
    Sequential,
    /// Dispatch each connection to a fixed-size worker pool.
    Pooled,
}

/// Command-line arguments for the countdown server
#[derive(Parser, Debug)]
#[command(name = "countdown")]
#[command(author = "countdown authors")]
#[command(version = "0.1.0")]
#[command(about = "A line-based TCP countdown server", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind to (e.g., 127.0.0.1:5000)
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Server variant to run
    #[arg(short, long, value_enum)]
    pub mode: Option<ServerMode>,

    /// Number of pool workers (pooled mode only)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Seconds to wait for in-flight connections during shutdown
    #[arg(short = 'g', long)]
    pub grace_period: Option<u64>,

    /// Serve at most this many clients before exiting
    #[arg(long)]
    pub max_clients: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub shutdown: ShutdownConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server-related configuration
#[derive(Debug, Deserialize, Default)]
pub struct ServerConfig {
    /// Address to bind to (defaults depend on the server mode)
    pub listen: Option<String>,
    /// Server variant to run
    pub mode: Option<ServerMode>,
    /// Number of pool workers
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Serve at most this many clients before exiting
    pub max_clients: Option<u64>,
}

/// Shutdown-related configuration
#[derive(Debug, Deserialize)]
pub struct ShutdownConfig {
    /// Seconds to wait for in-flight connections during shutdown
    #[serde(default = "default_grace_period")]
    pub grace_period: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period: default_grace_period(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_workers() -> usize {
    10
}

fn default_grace_period() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_listen(mode: ServerMode) -> String {
    match mode {
        ServerMode::Sequential => "127.0.0.1:5000".to_string(),
        ServerMode::Pooled => "127.0.0.1:5001".to_string(),
    }
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub listen: String,
    pub mode: ServerMode,
    pub workers: usize,
    pub grace_period: u64,
    pub max_clients: Option<u64>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from CLI args and optional TOML file.
    /// CLI arguments take precedence over TOML file values.
    pub fn load() -> Result<Self, ConfigError> {
        let cli = CliArgs::parse();

        // Load TOML config if specified
        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        Ok(Self::resolve(cli, toml_config))
    }

    /// Merge CLI args with TOML config (CLI takes precedence).
    fn resolve(cli: CliArgs, file: TomlConfig) -> Config {
        let mode = cli
            .mode
            .or(file.server.mode)
            .unwrap_or(ServerMode::Sequential);

        Config {
            listen: cli
                .listen
                .or(file.server.listen)
                .unwrap_or_else(|| default_listen(mode)),
            mode,
            workers: cli.workers.unwrap_or(file.server.workers),
            grace_period: cli.grace_period.unwrap_or(file.shutdown.grace_period),
            max_clients: cli.max_clients.or(file.server.max_clients),
            log_level: if cli.log_level != "info" {
                cli.log_level
            } else {
                file.logging.level
            },
        }
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
