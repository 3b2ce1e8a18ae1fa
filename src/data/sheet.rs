//! Spreadsheet API integration.
//!
//! The sheet service answers a plain GET with the whole table as a JSON array of
//! flat row objects. There is no auth and no pagination.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::LoadError;

/// Environment variable holding the sheet endpoint (a `.env` file is honoured).
pub const SHEET_URL_ENV: &str = "PRICE_SHEET_URL";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

pub struct SheetClient {
    client: Client,
    url: String,
}

impl SheetClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LoadError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LoadError::Client)?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Fetch the full table. Any transport, status or body problem is an error.
    pub fn fetch_rows(&self) -> Result<Vec<Value>, LoadError> {
        tracing::info!(url = %self.url, "fetching price sheet");

        let resp = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .map_err(|source| LoadError::Request {
                url: self.url.clone(),
                source,
            })?;

        if !resp.status().is_success() {
            return Err(LoadError::Status {
                url: self.url.clone(),
                status: resp.status(),
            });
        }

        let body = resp.text().map_err(|source| LoadError::Request {
            url: self.url.clone(),
            source,
        })?;

        let rows = crate::data::source::parse_rows(&body, &self.url)?;
        tracing::debug!(rows = rows.len(), "sheet response parsed");
        Ok(rows)
    }
}
