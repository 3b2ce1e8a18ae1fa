//! Export the normalized dataset as a flat CSV table.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.
//! Absent cells stay empty so they are not confused with a real `0`.

use std::path::Path;

use serde::Serialize;

use crate::dataset::Dataset;
use crate::error::{AppError, EXIT_USAGE};

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    location: &'a str,
    fuel_type: &'a str,
    material: &'a str,
    price: Option<i64>,
    year: Option<i64>,
    six_month: Option<i64>,
    month: Option<i64>,
    week: Option<i64>,
    updated: Option<&'a str>,
    ash_pct: Option<f64>,
    moisture_pct: Option<f64>,
    calorific_value: Option<f64>,
}

/// Write every dataset entry to a CSV file, in key order.
pub fn write_dataset_csv(path: &Path, dataset: &Dataset) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        AppError::new(
            EXIT_USAGE,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })?;
    write_rows(&mut writer, dataset)?;
    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

fn write_rows<W: std::io::Write>(writer: &mut csv::Writer<W>, dataset: &Dataset) -> Result<(), AppError> {
    for entry in dataset.entries() {
        let quality = entry.quality.unwrap_or_default();
        let row = ExportRow {
            location: entry.location.label(),
            fuel_type: entry.fuel_type.as_str(),
            material: entry.material.label(),
            price: entry.price.value(),
            year: entry.series.year.value(),
            six_month: entry.series.six_month.value(),
            month: entry.series.month.value(),
            week: entry.series.week.value(),
            updated: entry.last_updated.as_deref(),
            ash_pct: quality.ash_pct,
            moisture_pct: quality.moisture_pct,
            calorific_value: quality.calorific_value,
        };
        writer
            .serialize(row)
            .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to write export CSV row: {e}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FuelType, Location, Material, NormalizedEntry, Reading, Series};

    #[test]
    fn absent_cells_are_left_empty() {
        let mut ds = Dataset::default();
        ds.insert(NormalizedEntry {
            location: Location::new("Punjab").unwrap(),
            fuel_type: FuelType::Pellet,
            material: Material::standard(),
            price: Reading::Value(0),
            series: Series {
                year: Reading::Value(7400),
                ..Series::default()
            },
            quality: None,
            last_updated: Some("2025-03-05".to_string()),
            source_index: 0,
        });

        let mut writer = csv::Writer::from_writer(Vec::new());
        write_rows(&mut writer, &ds).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("location,fuel_type,material,price,year,six_month,month,week,updated,ash_pct,moisture_pct,calorific_value")
        );
        assert_eq!(lines.next(), Some("Punjab,pellet,Standard,0,7400,,,,2025-03-05,,,"));
    }
}
