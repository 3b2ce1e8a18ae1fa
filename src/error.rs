use std::path::PathBuf;

use thiserror::Error;

/// Exit code for usage, configuration and output-file problems.
pub const EXIT_USAGE: u8 = 2;
/// Exit code when the source loaded but no usable rows survived normalization.
pub const EXIT_NO_DATA: u8 = 3;
/// Exit code when the data source could not be fetched or parsed.
pub const EXIT_LOAD_FAILED: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failure to obtain the raw table for a page load.
///
/// Any of these aborts the whole dataset build; callers get no partial data.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no data source configured: pass --url, --file or --snapshot, or set PRICE_SHEET_URL")]
    MissingSource,
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} failed with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON from {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("expected a JSON array of row objects from {origin}")]
    NotAnArray { origin: String },
}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        let code = match err {
            LoadError::MissingSource => EXIT_USAGE,
            _ => EXIT_LOAD_FAILED,
        };
        AppError::new(code, format!("Failed to load price data: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_failures_map_to_distinct_exit_codes() {
        let missing: AppError = LoadError::MissingSource.into();
        assert_eq!(missing.exit_code(), EXIT_USAGE);

        let shape: AppError = LoadError::NotAnArray {
            origin: "sheet".to_string(),
        }
        .into();
        assert_eq!(shape.exit_code(), EXIT_LOAD_FAILED);
        assert!(shape.to_string().contains("expected a JSON array"));
    }
}
