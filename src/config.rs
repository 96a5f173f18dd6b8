//! Configuration management for shell-term.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::pty::PtySize;
use crate::stream::StreamConfig;

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Terminal buffer geometry.
    pub terminal: TerminalSection,
    /// Channel and read loop settings.
    pub stream: StreamSection,
    /// Session pool settings.
    pub pool: PoolSection,
    /// Command history settings.
    pub history: HistorySection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Terminal buffer section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalSection {
    /// Scrollback rows.
    pub rows: usize,
    /// Columns per row.
    pub cols: usize,
}

impl Default for TerminalSection {
    fn default() -> Self {
        Self { rows: 500, cols: 80 }
    }
}

/// Stream section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSection {
    /// PTY rows requested from the remote side.
    pub pty_rows: u16,
    /// PTY columns requested from the remote side.
    pub pty_cols: u16,
    /// Largest single read in bytes.
    pub chunk_size: usize,
    /// Idle poll interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for StreamSection {
    fn default() -> Self {
        Self {
            pty_rows: 24,
            pty_cols: 80,
            chunk_size: 4096,
            poll_interval_ms: 20,
        }
    }
}

/// Session pool section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSection {
    /// Seconds a pooled session may sit unused before eviction.
    pub max_idle_secs: u64,
}

impl Default for PoolSection {
    fn default() -> Self {
        Self { max_idle_secs: 300 }
    }
}

/// Command history section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySection {
    /// Commands retained per controller.
    pub max_entries: usize,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            max_entries: crate::input::DEFAULT_HISTORY_SIZE,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace) or a full filter.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    ///
    /// Unparseable numeric values are ignored.
    pub fn apply_env(&mut self) {
        if let Some(rows) = env_number("SHELL_TERM_ROWS") {
            self.terminal.rows = rows;
        }

        if let Some(cols) = env_number("SHELL_TERM_COLS") {
            self.terminal.cols = cols;
        }

        if let Some(secs) = env_number("SHELL_TERM_MAX_IDLE_SECS") {
            self.pool.max_idle_secs = secs;
        }

        if let Ok(level) = std::env::var("SHELL_TERM_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(rows) = args.rows {
            self.terminal.rows = rows;
        }

        if let Some(cols) = args.cols {
            self.terminal.cols = cols;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env();
        config.apply_args(args);
        config.validate()?;

        Ok(config)
    }

    /// Reject sizes the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.terminal.rows == 0 || self.terminal.cols == 0 {
            return Err(ConfigError::Invalid(
                "terminal rows and cols must be non-zero".into(),
            ));
        }
        if self.stream.pty_rows == 0 || self.stream.pty_cols == 0 {
            return Err(ConfigError::Invalid(
                "pty rows and cols must be non-zero".into(),
            ));
        }
        if self.stream.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk_size must be non-zero".into()));
        }
        Ok(())
    }

    /// Controller settings derived from this configuration.
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            pty_size: PtySize::new(self.stream.pty_rows, self.stream.pty_cols),
            buffer_rows: self.terminal.rows,
            buffer_cols: self.terminal.cols,
            chunk_size: self.stream.chunk_size,
            poll_interval: Duration::from_millis(self.stream.poll_interval_ms),
            history_size: self.history.max_entries,
        }
    }

    /// Idle timeout for the session registry.
    pub fn max_idle(&self) -> Duration {
        Duration::from_secs(self.pool.max_idle_secs)
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.trim().parse().ok()
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// A value out of range.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::Invalid(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
