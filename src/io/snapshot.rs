//! Read/write the pre-grouped dataset document.
//!
//! Some deployments publish the table already grouped as
//! `location -> fuel type -> material -> { price, trend }`. Such a document
//! bypasses field resolution entirely; `bp export --json` writes the same shape,
//! so an exported file can be fed back in with `--snapshot`.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::domain::{FuelType, Location, Material, NormalizedEntry, QualityAttributes, Reading, Series};
use crate::error::{AppError, EXIT_USAGE, LoadError};
use crate::io::ingest::{BuildReport, Ingested, RowSkip, SkipReason};

const PRICE_CELL: &str = "price";
const TREND_CELLS: [&str; 4] = ["year", "six_month", "month", "week"];

/// location -> fuel type -> material -> entry.
pub type SnapshotDocument = BTreeMap<String, BTreeMap<String, BTreeMap<String, SnapshotEntry>>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    #[serde(default)]
    pub price: Option<i64>,
    /// Year, six-month, month, week. Short arrays are padded with `null`.
    #[serde(default)]
    pub trend: Vec<Option<i64>>,
    /// Cells that held unparseable text, by name (`price`, `year`, `six_month`,
    /// `month`, `week`). They are `null` above but reload as invalid, not missing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalid: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityAttributes>,
}

impl SnapshotEntry {
    fn cell(&self, name: &str, value: Option<i64>) -> Reading {
        match value {
            Some(v) => Reading::Value(v),
            None if self.invalid.iter().any(|n| n == name) => Reading::Invalid,
            None => Reading::Missing,
        }
    }
}

/// Read a snapshot file into a dataset.
pub fn read_snapshot_json(path: &Path) -> Result<Ingested, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let doc: SnapshotDocument = serde_json::from_reader(file).map_err(|source| LoadError::Json {
        origin: path.display().to_string(),
        source,
    })?;
    Ok(from_document(&doc))
}

/// Convert a parsed document. Entries under an unknown fuel type are skipped;
/// `index` in the report counts entries in document order.
pub fn from_document(doc: &SnapshotDocument) -> Ingested {
    let mut dataset = Dataset::default();
    let mut report = BuildReport::default();
    let mut index = 0usize;

    for (raw_location, fuels) in doc {
        for (raw_fuel, materials) in fuels {
            for (raw_material, item) in materials {
                let row = index;
                index += 1;
                report.rows_read += 1;

                let Some(location) = Location::new(raw_location) else {
                    report.skipped.push(RowSkip {
                        index: row,
                        reason: SkipReason::MissingLocation,
                    });
                    continue;
                };
                let Some(fuel_type) = FuelType::parse(raw_fuel) else {
                    report.skipped.push(RowSkip {
                        index: row,
                        reason: SkipReason::UnknownFuelType(raw_fuel.clone()),
                    });
                    continue;
                };

                let mut trend = [Reading::Missing; 4];
                for (i, slot) in trend.iter_mut().enumerate() {
                    *slot = item.cell(TREND_CELLS[i], item.trend.get(i).copied().flatten());
                }

                let entry = NormalizedEntry {
                    location,
                    fuel_type,
                    material: Material::new(Some(raw_material)),
                    price: item.cell(PRICE_CELL, item.price),
                    series: Series::from_readings(trend),
                    quality: item.quality.filter(|q| !q.is_empty()),
                    last_updated: item.updated.clone().filter(|s| !s.trim().is_empty()),
                    source_index: row,
                };
                report.rows_used += 1;
                if dataset.insert(entry) {
                    report.overwritten += 1;
                }
            }
        }
    }

    tracing::info!(
        entries = dataset.len(),
        rows_skipped = report.skipped.len(),
        "loaded pre-grouped snapshot"
    );

    Ingested { dataset, report }
}

/// Group a dataset back into the document shape.
pub fn to_document(dataset: &Dataset) -> SnapshotDocument {
    let mut doc = SnapshotDocument::new();
    for entry in dataset.entries() {
        let readings = entry.series.readings();
        let invalid = std::iter::once((PRICE_CELL, entry.price))
            .chain(TREND_CELLS.into_iter().zip(readings))
            .filter(|(_, reading)| *reading == Reading::Invalid)
            .map(|(name, _)| name.to_string())
            .collect();
        let item = SnapshotEntry {
            price: entry.price.value(),
            trend: readings.iter().map(|r| r.value()).collect(),
            invalid,
            updated: entry.last_updated.clone(),
            quality: entry.quality,
        };
        doc.entry(entry.location.label().to_string())
            .or_default()
            .entry(entry.fuel_type.as_str().to_string())
            .or_default()
            .insert(entry.material.label().to_string(), item);
    }
    doc
}

/// Write a dataset as a snapshot JSON file.
pub fn write_snapshot_json(path: &Path, dataset: &Dataset) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            EXIT_USAGE,
            format!("Failed to create snapshot JSON '{}': {e}", path.display()),
        )
    })?;

    serde_json::to_writer_pretty(BufWriter::new(file), &to_document(dataset))
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to write snapshot JSON: {e}")))?;

    Ok(())
}
