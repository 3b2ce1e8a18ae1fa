//! Data source selection and loading.
//!
//! One load produces one fresh dataset. A load either succeeds completely or
//! returns a `LoadError`; there is no partially-built result.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;

use crate::data::sheet::{SHEET_URL_ENV, SheetClient};
use crate::error::LoadError;
use crate::io::ingest::{Ingested, build_from_json_rows};
use crate::io::snapshot::read_snapshot_json;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// The sheet HTTP API.
    Sheet { url: String },
    /// A local file holding the same JSON array the API returns.
    RawFile(PathBuf),
    /// A pre-grouped snapshot document (skips field resolution).
    Snapshot(PathBuf),
}

impl DataSource {
    /// Pick a source: snapshot, then raw file, then URL, then `PRICE_SHEET_URL`.
    pub fn resolve(snapshot: Option<PathBuf>, file: Option<PathBuf>, url: Option<String>) -> Result<Self, LoadError> {
        if let Some(path) = snapshot {
            return Ok(DataSource::Snapshot(path));
        }
        if let Some(path) = file {
            return Ok(DataSource::RawFile(path));
        }
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            return Ok(DataSource::Sheet { url });
        }

        dotenvy::dotenv().ok();
        std::env::var(SHEET_URL_ENV)
            .ok()
            .filter(|u| !u.trim().is_empty())
            .map(|url| DataSource::Sheet { url })
            .ok_or(LoadError::MissingSource)
    }

    pub fn describe(&self) -> String {
        match self {
            DataSource::Sheet { url } => url.clone(),
            DataSource::RawFile(path) => path.display().to_string(),
            DataSource::Snapshot(path) => format!("{} (snapshot)", path.display()),
        }
    }
}

/// Load and normalize the table from `source`.
pub fn load(source: &DataSource, timeout: Duration) -> Result<Ingested, LoadError> {
    match source {
        DataSource::Sheet { url } => {
            let rows = SheetClient::new(url.clone(), timeout)?.fetch_rows()?;
            Ok(build_from_json_rows(&rows))
        }
        DataSource::RawFile(path) => {
            let rows = read_rows_file(path)?;
            Ok(build_from_json_rows(&rows))
        }
        DataSource::Snapshot(path) => read_snapshot_json(path),
    }
}

fn read_rows_file(path: &Path) -> Result<Vec<Value>, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_rows(&text, &path.display().to_string())
}

/// Parse a response body that must be a JSON array.
pub(crate) fn parse_rows(text: &str, origin: &str) -> Result<Vec<Value>, LoadError> {
    let value: Value = serde_json::from_str(text).map_err(|source| LoadError::Json {
        origin: origin.to_string(),
        source,
    })?;
    match value {
        Value::Array(rows) => Ok(rows),
        _ => Err(LoadError::NotAnArray {
            origin: origin.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_sources_take_precedence() {
        let got = DataSource::resolve(
            Some(PathBuf::from("snap.json")),
            Some(PathBuf::from("rows.json")),
            Some("https://example.test/sheet".to_string()),
        )
        .unwrap();
        assert_eq!(got, DataSource::Snapshot(PathBuf::from("snap.json")));

        let got = DataSource::resolve(None, None, Some("https://example.test/sheet".to_string())).unwrap();
        assert_eq!(
            got,
            DataSource::Sheet {
                url: "https://example.test/sheet".to_string()
            }
        );
    }

    #[test]
    fn body_must_be_an_array() {
        assert_eq!(parse_rows(r#"[{"State":"A"}, 3]"#, "t").unwrap().len(), 2);
        assert!(matches!(
            parse_rows(r#"{"rows": []}"#, "t"),
            Err(LoadError::NotAnArray { .. })
        ));
        assert!(matches!(parse_rows("<html>", "t"), Err(LoadError::Json { .. })));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = load(&DataSource::RawFile(PathBuf::from("does/not/exist.json")), Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
