//! Raw sheet rows -> `Dataset`.
//!
//! Design goals:
//! - **Row-level tolerance** (a bad row is skipped and reported, never fatal)
//! - **Deterministic behavior** (same rows in, same dataset out; last write wins)
//! - **Separation of concerns**: no network or presentation logic here

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::dataset::Dataset;
use crate::domain::{FuelType, Location, Material, NormalizedEntry, QualityAttributes, Series};
use crate::io::fields::{
    self, ASH_KEYS, CALORIFIC_KEYS, FUEL_TYPE_KEYS, LOCATION_KEYS, MATERIAL_KEYS, MOISTURE_KEYS, MONTH_KEYS,
    PRICE_KEYS, RawRecord, SIX_MONTH_KEYS, UPDATED_KEYS, WEEK_KEYS, YEAR_KEYS,
};

/// Why a row did not make it into the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotAnObject,
    MissingLocation,
    MissingFuelType,
    UnknownFuelType(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotAnObject => f.write_str("row is not an object"),
            SkipReason::MissingLocation => f.write_str("no location column value"),
            SkipReason::MissingFuelType => f.write_str("no fuel type column value"),
            SkipReason::UnknownFuelType(raw) => write!(f, "unrecognized fuel type '{raw}'"),
        }
    }
}

/// A row that was skipped during the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSkip {
    /// 0-based position in the source array.
    pub index: usize,
    pub reason: SkipReason,
}

/// What happened while building a dataset.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub rows_read: usize,
    pub rows_used: usize,
    /// Rows that replaced an earlier row with the same key.
    pub overwritten: usize,
    pub skipped: Vec<RowSkip>,
}

/// Build output: the dataset plus the row-level report.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub dataset: Dataset,
    pub report: BuildReport,
}

/// Build a dataset from already-parsed records.
pub fn build_dataset(records: &[RawRecord]) -> Ingested {
    let rows: Vec<(usize, &RawRecord)> = records.iter().enumerate().collect();
    build(records.len(), &rows, Vec::new())
}

/// Build a dataset from a JSON array as returned by the sheet API.
///
/// Elements that are not objects are skipped like any other malformed row.
pub fn build_from_json_rows(rows: &[Value]) -> Ingested {
    let mut objects = Vec::with_capacity(rows.len());
    let mut skipped = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        match row {
            Value::Object(map) => objects.push((index, map)),
            _ => skipped.push(RowSkip {
                index,
                reason: SkipReason::NotAnObject,
            }),
        }
    }
    build(rows.len(), &objects, skipped)
}

/// Key fields of a row that passed the location / fuel-type checks.
struct RowKey {
    location: Location,
    fuel_type: FuelType,
    material: Material,
}

fn build(rows_read: usize, rows: &[(usize, &RawRecord)], mut skipped: Vec<RowSkip>) -> Ingested {
    let mut keyed = Vec::with_capacity(rows.len());
    for &(index, record) in rows {
        match resolve_key(record) {
            Ok(key) => keyed.push((index, record, key)),
            Err(reason) => {
                tracing::debug!(row = index, %reason, "skipping row");
                skipped.push(RowSkip { index, reason });
            }
        }
    }
    skipped.sort_by_key(|s| s.index);

    let quality = collect_quality(&keyed);

    let mut dataset = Dataset::default();
    let mut overwritten = 0usize;
    for (index, record, key) in keyed.iter() {
        let entry = normalize_row(*index, record, key, &quality);
        if dataset.insert(entry) {
            overwritten += 1;
        }
    }

    let report = BuildReport {
        rows_read,
        rows_used: keyed.len(),
        overwritten,
        skipped,
    };

    tracing::info!(
        rows_read = report.rows_read,
        rows_used = report.rows_used,
        rows_skipped = report.skipped.len(),
        overwritten = report.overwritten,
        entries = dataset.len(),
        "built price dataset"
    );

    Ingested { dataset, report }
}

fn resolve_key(record: &RawRecord) -> Result<RowKey, SkipReason> {
    let location = fields::resolve_text(record, LOCATION_KEYS)
        .and_then(|raw| Location::new(&raw))
        .ok_or(SkipReason::MissingLocation)?;

    let raw_type = fields::resolve_text(record, FUEL_TYPE_KEYS).ok_or(SkipReason::MissingFuelType)?;
    let fuel_type = FuelType::parse(&raw_type).ok_or(SkipReason::UnknownFuelType(raw_type))?;

    let material = Material::new(fields::resolve_text(record, MATERIAL_KEYS).as_deref());

    Ok(RowKey {
        location,
        fuel_type,
        material,
    })
}

/// Quality attributes from the aggregate reference rows, keyed by fuel type + material.
fn collect_quality(keyed: &[(usize, &RawRecord, RowKey)]) -> HashMap<(FuelType, Material), QualityAttributes> {
    let mut out = HashMap::new();
    for (_, record, key) in keyed.iter().filter(|(_, _, key)| key.location.is_aggregate()) {
        let attrs = QualityAttributes {
            ash_pct: fields::coerce_decimal(fields::resolve(record, ASH_KEYS)),
            moisture_pct: fields::coerce_decimal(fields::resolve(record, MOISTURE_KEYS)),
            calorific_value: fields::coerce_decimal(fields::resolve(record, CALORIFIC_KEYS)),
        };
        if !attrs.is_empty() {
            out.insert((key.fuel_type, key.material.clone()), attrs);
        }
    }
    out
}

fn normalize_row(
    index: usize,
    record: &RawRecord,
    key: &RowKey,
    quality: &HashMap<(FuelType, Material), QualityAttributes>,
) -> NormalizedEntry {
    let series = Series::from_readings([YEAR_KEYS, SIX_MONTH_KEYS, MONTH_KEYS, WEEK_KEYS].map(|aliases| {
        fields::coerce_int(fields::resolve(record, aliases))
    }));

    NormalizedEntry {
        location: key.location.clone(),
        fuel_type: key.fuel_type,
        material: key.material.clone(),
        price: fields::coerce_int(fields::resolve(record, PRICE_KEYS)),
        series,
        quality: quality.get(&(key.fuel_type, key.material.clone())).copied(),
        last_updated: fields::resolve_text(record, UPDATED_KEYS),
        source_index: index,
    }
}
