//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Reports go to stdout; logs always go to stderr so piping the report stays clean.
//!
//! # Log Levels
//!
//! - `warn`: skipped rows, empty loads (default)
//! - `info`: fetch and build summaries (`-v`)
//! - `debug`: per-row skips, lookup fallbacks (`-vv`)
//! - `trace`: everything (`-vvv`)
//!
//! `RUST_LOG` overrides the verbosity flags when set.

use std::io;

use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{AppError, EXIT_USAGE};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact single-line format.
    #[default]
    Compact,
    /// JSON lines for machine parsing.
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::default(),
            with_ansi: true,
        }
    }
}

impl LogConfig {
    /// Create a `LogConfig` from the `-v` count.
    #[must_use]
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }
}

/// Install the global subscriber. Call once at startup.
pub fn init_logging(config: &LogConfig) -> Result<(), AppError> {
    let filter = build_env_filter(config.level);

    let result = match config.format {
        LogFormat::Json => {
            let layer = fmt::layer().json().with_writer(io::stderr).with_target(false);
            tracing_subscriber::registry().with(filter).with(layer).try_init()
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_writer(io::stderr)
                .with_ansi(config.with_ansi)
                .with_target(false)
                .without_time();
            tracing_subscriber::registry().with(filter).with(layer).try_init()
        }
    };

    result.map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to initialize logging: {e}")))
}

/// `RUST_LOG` wins; otherwise our crate logs at `level` and dependencies stay at warn.
fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

fn default_directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    format!("warn,biomass_prices={level}")
}
