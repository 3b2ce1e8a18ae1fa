//! Shared domain types.
//!
//! These types are the typed side of the normalization boundary: everything
//! downstream of `io::ingest` works with them rather than with raw row maps.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Location name of the precomputed nationwide average rows.
pub const AVERAGE_LOCATION: &str = "AVERAGE";
/// Location name of the reference rows (also the source of quality attributes).
pub const GLOBAL_LOCATION: &str = "GLOBAL";
/// Material assumed when a row does not name one.
pub const DEFAULT_MATERIAL: &str = "Standard";

/// Labels of the four series slots, longest horizon first.
pub const SERIES_LABELS: [&str; 4] = ["Year", "6 Months", "Month", "Week"];

/// Top-level product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Pellet,
    Briquette,
}

impl FuelType {
    /// Pellet first: ties between fuel types resolve in this order.
    pub const ALL: [FuelType; 2] = [FuelType::Pellet, FuelType::Briquette];

    /// Parse a sheet value (`"Pellet"`, `" briquettes "`, ...).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pellet" | "pellets" => Some(FuelType::Pellet),
            "briquette" | "briquettes" => Some(FuelType::Briquette),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FuelType::Pellet => "pellet",
            FuelType::Briquette => "briquette",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            FuelType::Pellet => "Pellet",
            FuelType::Briquette => "Briquette",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equality, ordering and hashing on the normalized key; the label is only for display.
macro_rules! keyed_by_normalized_name {
    ($ty:ident) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.key == other.key
            }
        }

        impl Eq for $ty {}

        impl PartialOrd for $ty {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $ty {
            fn cmp(&self, other: &Self) -> Ordering {
                self.key.cmp(&other.key)
            }
        }

        impl Hash for $ty {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.key.hash(state);
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.label)
            }
        }
    };
}

/// A place (state, region, city) or one of the aggregate sentinels.
///
/// Compared case-insensitively: `"punjab "` and `"Punjab"` are the same location.
#[derive(Debug, Clone)]
pub struct Location {
    label: String,
    key: String,
}

keyed_by_normalized_name!(Location);

impl Location {
    /// Returns `None` for blank input.
    pub fn new(raw: &str) -> Option<Self> {
        let label = collapse_whitespace(raw);
        if label.is_empty() {
            return None;
        }
        let key = label.to_uppercase();
        Some(Self { label, key })
    }

    pub fn average() -> Self {
        Self {
            label: AVERAGE_LOCATION.to_string(),
            key: AVERAGE_LOCATION.to_string(),
        }
    }

    pub fn global() -> Self {
        Self {
            label: GLOBAL_LOCATION.to_string(),
            key: GLOBAL_LOCATION.to_string(),
        }
    }

    /// Sentinels in fallback order.
    pub fn aggregates() -> [Location; 2] {
        [Location::average(), Location::global()]
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// `true` for the `AVERAGE` / `GLOBAL` reference rows.
    pub fn is_aggregate(&self) -> bool {
        self.key == AVERAGE_LOCATION || self.key == GLOBAL_LOCATION
    }
}

/// A sub-variety within a fuel type (feedstock blend, grade).
#[derive(Debug, Clone)]
pub struct Material {
    label: String,
    key: String,
}

keyed_by_normalized_name!(Material);

impl Material {
    /// Blank or missing input becomes [`DEFAULT_MATERIAL`].
    pub fn new(raw: Option<&str>) -> Self {
        let label = raw.map(collapse_whitespace).unwrap_or_default();
        if label.is_empty() {
            return Self::standard();
        }
        let key = label.to_lowercase();
        Self { label, key }
    }

    pub fn standard() -> Self {
        Self {
            label: DEFAULT_MATERIAL.to_string(),
            key: DEFAULT_MATERIAL.to_lowercase(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// One numeric cell after coercion.
///
/// `Missing` (the source had no value) and `Invalid` (the source had text that
/// is not a number) are kept apart from a genuine `Value(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reading {
    Value(i64),
    #[default]
    Missing,
    Invalid,
}

impl Reading {
    pub fn value(self) -> Option<i64> {
        match self {
            Reading::Value(v) => Some(v),
            Reading::Missing | Reading::Invalid => None,
        }
    }

    /// Display/charting view: anything that is not a value counts as 0.
    pub fn or_zero(self) -> i64 {
        self.value().unwrap_or(0)
    }

    /// Strictly positive value, if any.
    pub fn positive(self) -> Option<i64> {
        self.value().filter(|v| *v > 0)
    }

    /// A slot counts as filled when it carries a non-zero value.
    pub fn is_filled(self) -> bool {
        matches!(self, Reading::Value(v) if v != 0)
    }
}

impl From<Option<i64>> for Reading {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Reading::Missing, Reading::Value)
    }
}

/// Four historical observations: year, six-month, month, week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Series {
    pub year: Reading,
    pub six_month: Reading,
    pub month: Reading,
    pub week: Reading,
}

impl Series {
    pub fn from_readings([year, six_month, month, week]: [Reading; 4]) -> Self {
        Self {
            year,
            six_month,
            month,
            week,
        }
    }

    pub fn readings(&self) -> [Reading; 4] {
        [self.year, self.six_month, self.month, self.week]
    }

    /// Chart values with absent slots as 0.
    pub fn values(&self) -> [i64; 4] {
        self.readings().map(Reading::or_zero)
    }

    pub fn filled_slots(&self) -> usize {
        self.readings().iter().filter(|r| r.is_filled()).count()
    }
}

/// Lab attributes published on the reference rows for a material.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ash_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moisture_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calorific_value: Option<f64>,
}

impl QualityAttributes {
    pub fn is_empty(&self) -> bool {
        self.ash_pct.is_none() && self.moisture_pct.is_none() && self.calorific_value.is_none()
    }
}

/// Which field provides the "current price" shown to users.
///
/// Sheets disagree on whether the explicit `Price` column or the week slot of the
/// series is authoritative, so both are kept and the caller chooses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PriceSource {
    /// The explicit price column.
    #[default]
    Column,
    /// The week slot of the series.
    Week,
    /// The price column when positive, else the week slot.
    ColumnThenWeek,
}

/// How a reference value is derived when no explicit `AVERAGE` row exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AverageStrategy {
    /// Arithmetic mean rounded to the nearest integer.
    #[default]
    Mean,
    /// Element at `floor(n / 2)` of the ascending values.
    Median,
}

impl AverageStrategy {
    pub fn display_name(self) -> &'static str {
        match self {
            AverageStrategy::Mean => "mean",
            AverageStrategy::Median => "median",
        }
    }
}

/// The canonical shape of one sheet row.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEntry {
    pub location: Location,
    pub fuel_type: FuelType,
    pub material: Material,
    /// Explicit price column.
    pub price: Reading,
    pub series: Series,
    /// Taken from the reference rows for the same fuel type and material.
    pub quality: Option<QualityAttributes>,
    /// Free-text timestamp as written in the sheet.
    pub last_updated: Option<String>,
    /// Index of the source row that produced this entry (last write).
    pub source_index: usize,
}

impl NormalizedEntry {
    pub fn current_price(&self, source: PriceSource) -> Option<i64> {
        match source {
            PriceSource::Column => self.price.value(),
            PriceSource::Week => self.series.week.value(),
            PriceSource::ColumnThenWeek => self
                .price
                .positive()
                .or_else(|| self.series.week.value()),
        }
    }

    /// `last_updated` parsed into a timestamp, when it is in a recognised format.
    pub fn updated_at(&self) -> Option<NaiveDateTime> {
        self.last_updated
            .as_deref()
            .and_then(crate::io::fields::parse_timestamp)
    }
}

fn collapse_whitespace(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
