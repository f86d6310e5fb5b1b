//! Diagnostic logging
//!
//! Logs always go to stderr: stdout may carry the exported document.
//! `NCDU_BOS_LOG` takes an `EnvFilter` directive string and overrides the
//! configured level; `NCDU_BOS_LOG_FORMAT` selects `text` or `json`.

use std::str::FromStr;

use clap::ValueEnum;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::Error;

const LOG_ENV: &str = "NCDU_BOS_LOG";
const LOG_FORMAT_ENV: &str = "NCDU_BOS_LOG_FORMAT";

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::Config(format!(
                "invalid log format '{}' (must be 'text' or 'json')",
                other
            ))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter when `NCDU_BOS_LOG` is unset: trace, debug, info, warn, error, off
    pub level: String,
    pub format: LogFormat,
    /// ANSI colors (text format only)
    pub color: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
            color: false,
        }
    }
}

/// Install the global subscriber. Call once, before any work starts.
pub fn init_logging(config: &LoggingConfig) -> Result<(), Error> {
    let filter = build_env_filter(config)?;
    let format = match std::env::var(LOG_FORMAT_ENV) {
        Ok(value) => value.parse()?,
        Err(_) => config.format,
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(std::io::stderr);

    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.with_ansi(config.color).try_init(),
    };
    result.map_err(|e| Error::Config(format!("failed to initialize logging: {}", e)))
}

fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, Error> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level)
        .map_err(|e| Error::Config(format!("invalid log level '{}': {}", config.level, e)))
}
