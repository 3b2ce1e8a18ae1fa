//! Shared "load -> query" pipeline used by every subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load source -> normalize rows -> dataset -> views
//!
//! The views are plain data; `report` turns them into text.

use std::time::Duration;

use crate::data::DataSource;
use crate::dataset::{Dataset, Lookup};
use crate::domain::{AverageStrategy, FuelType, Location, Material, PriceSource, QualityAttributes, Series};
use crate::error::{AppError, EXIT_NO_DATA};
use crate::io::ingest::Ingested;
use crate::stats::{
    self, BestDeals, Completeness, PricePoint, ReferencePrice, latest_update, location_completeness,
};

/// Display choices shared by the views.
#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub location: Location,
    pub pellet_material: Material,
    pub briquette_material: Material,
    pub price_source: PriceSource,
    pub strategy: AverageStrategy,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            location: Location::average(),
            pellet_material: Material::standard(),
            briquette_material: Material::standard(),
            price_source: PriceSource::default(),
            strategy: AverageStrategy::default(),
        }
    }
}

impl ViewOptions {
    pub fn material_for(&self, fuel_type: FuelType) -> &Material {
        match fuel_type {
            FuelType::Pellet => &self.pellet_material,
            FuelType::Briquette => &self.briquette_material,
        }
    }
}

/// Load the source and build a fresh dataset.
///
/// Fails on any load error, and when no row survived normalization.
pub fn load_dataset(source: &DataSource, timeout: Duration) -> Result<Ingested, AppError> {
    let ingested = crate::data::load(source, timeout)?;

    if !ingested.report.skipped.is_empty() {
        tracing::warn!(
            skipped = ingested.report.skipped.len(),
            source = %source.describe(),
            "some rows were skipped during normalization"
        );
    }

    if ingested.dataset.is_empty() {
        return Err(AppError::new(
            EXIT_NO_DATA,
            format!(
                "No usable rows in {} ({} read, {} skipped).",
                source.describe(),
                ingested.report.rows_read,
                ingested.report.skipped.len()
            ),
        ));
    }

    Ok(ingested)
}

/// What one fuel type shows for the selected location.
#[derive(Debug, Clone)]
pub struct FuelView<'a> {
    pub fuel_type: FuelType,
    pub requested_material: Material,
    /// The entry found for the location, with how it was found. When `derived`
    /// is set it only contributes quality attributes.
    pub lookup: Option<Lookup<'a>>,
    pub price: Option<i64>,
    pub series: Series,
    /// Set when the price was computed across real locations.
    pub derived: Option<AverageStrategy>,
}

impl FuelView<'_> {
    /// `true` when the shown price comes from a fallback row.
    pub fn is_fallback(&self) -> bool {
        self.derived.is_none() && self.lookup.is_some_and(|l| l.is_fallback())
    }

    pub fn quality(&self) -> Option<QualityAttributes> {
        self.lookup.and_then(|l| l.entry.quality)
    }
}

/// Everything the location page shows.
#[derive(Debug, Clone)]
pub struct LocationView<'a> {
    pub location: Location,
    pub pellet: FuelView<'a>,
    pub briquette: FuelView<'a>,
    pub completeness: Completeness,
    pub last_updated: Option<&'a str>,
}

pub fn location_view<'a>(dataset: &'a Dataset, options: &ViewOptions) -> LocationView<'a> {
    let pellet = fuel_view(dataset, FuelType::Pellet, options);
    let briquette = fuel_view(dataset, FuelType::Briquette, options);

    let completeness = location_completeness(
        dataset,
        &options.location,
        &options.pellet_material,
        &options.briquette_material,
    );
    let last_updated = latest_update([&pellet, &briquette].into_iter().filter_map(|v| v.lookup.map(|l| l.entry)));

    LocationView {
        location: options.location.clone(),
        pellet,
        briquette,
        completeness,
        last_updated,
    }
}

fn fuel_view<'a>(dataset: &'a Dataset, fuel_type: FuelType, options: &ViewOptions) -> FuelView<'a> {
    let material = options.material_for(fuel_type);
    let lookup = dataset.lookup(&options.location, fuel_type, material);

    if let Some(hit) = lookup {
        let price = hit.entry.current_price(options.price_source);
        let own_price = hit.entry.location == options.location && price.is_some();
        if own_price || !options.location.is_aggregate() {
            return FuelView {
                fuel_type,
                requested_material: material.clone(),
                lookup: Some(hit),
                price,
                series: hit.entry.series,
                derived: None,
            };
        }
    }

    // An aggregate view without a price of its own shows the reference figures,
    // the same ones the market page reports. The lookup hit still supplies quality.
    if options.location.is_aggregate() {
        let reference = stats::reference_price(dataset, fuel_type, material, options.price_source, options.strategy);
        let series = stats::reference_series(dataset, fuel_type, material, options.strategy);
        return FuelView {
            fuel_type,
            requested_material: material.clone(),
            lookup,
            price: reference.map(|r| r.price),
            series: series.series,
            derived: reference.and_then(|r| r.derived),
        };
    }

    FuelView {
        fuel_type,
        requested_material: material.clone(),
        lookup: None,
        price: None,
        series: Series::default(),
        derived: None,
    }
}

/// Dataset-wide market figures.
#[derive(Debug, Clone)]
pub struct MarketSummary {
    pub deals: BestDeals,
    pub references: Vec<(FuelType, Option<ReferencePrice>)>,
    pub cheapest: Vec<(FuelType, Vec<PricePoint>)>,
}

pub fn market_summary(dataset: &Dataset, options: &ViewOptions, top: usize) -> MarketSummary {
    let deals = stats::best_deals(dataset, options.price_source);

    let references = FuelType::ALL
        .into_iter()
        .map(|fuel_type| {
            let reference = stats::reference_price(
                dataset,
                fuel_type,
                options.material_for(fuel_type),
                options.price_source,
                options.strategy,
            );
            (fuel_type, reference)
        })
        .collect();

    let cheapest = FuelType::ALL
        .into_iter()
        .map(|fuel_type| {
            (
                fuel_type,
                stats::cheapest_locations(dataset, fuel_type, options.price_source, top),
            )
        })
        .collect();

    MarketSummary {
        deals,
        references,
        cheapest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Provenance;
    use crate::io::ingest::build_from_json_rows;
    use serde_json::json;

    fn dataset(rows: serde_json::Value) -> Dataset {
        let rows = rows.as_array().cloned().unwrap_or_default();
        build_from_json_rows(&rows).dataset
    }

    #[test]
    fn location_view_discloses_aggregate_fallback() {
        let ds = dataset(json!([
            { "State": "AVERAGE", "Type": "Pellet", "Price": 7500, "Year": 7300, "Week": 7500, "Updated": "2025-03-01" },
            { "State": "Kerala", "Type": "Briquette", "Price": "6,100", "Year": 6000, "6 Month": 6050, "Month": 6080, "Week": 6100, "Updated": "2025-03-04" }
        ]));
        let options = ViewOptions {
            location: Location::new("Kerala").unwrap(),
            ..ViewOptions::default()
        };

        let view = location_view(&ds, &options);
        assert_eq!(view.pellet.price, Some(7500));
        assert!(view.pellet.is_fallback());
        assert_eq!(
            view.pellet.lookup.unwrap().provenance,
            Provenance::Aggregate { exact_material: true }
        );
        assert!(!view.briquette.is_fallback());
        assert_eq!(view.briquette.price, Some(6100));
        assert_eq!(view.completeness.filled, 6);
        assert_eq!(view.last_updated, Some("2025-03-04"));
    }

    #[test]
    fn average_view_is_computed_without_sentinel_rows() {
        let ds = dataset(json!([
            { "State": "A", "Type": "Pellet", "Price": 7000, "Week": 7000 },
            { "State": "B", "Type": "Pellet", "Price": 8001, "Week": 8000 }
        ]));
        let view = location_view(&ds, &ViewOptions::default());

        assert!(view.pellet.lookup.is_none());
        assert_eq!(view.pellet.derived, Some(AverageStrategy::Mean));
        assert_eq!(view.pellet.price, Some(7501));
        assert_eq!(view.pellet.series.week.value(), Some(7500));
        assert_eq!(view.briquette.price, None);
    }

    #[test]
    fn average_view_computes_price_past_a_quality_only_global_row() {
        let ds = dataset(json!([
            { "State": "A", "Type": "Pellet", "Price": 7000 },
            { "State": "B", "Type": "Pellet", "Price": 8000 },
            { "State": "GLOBAL", "Type": "Pellet", "Ash": 8, "Moisture": 10 }
        ]));
        let options = ViewOptions::default();
        let view = location_view(&ds, &options);

        assert_eq!(view.pellet.price, Some(7500));
        assert_eq!(view.pellet.derived, Some(AverageStrategy::Mean));
        assert!(!view.pellet.is_fallback());
        assert_eq!(view.pellet.quality().and_then(|q| q.ash_pct), Some(8.0));

        let market = market_summary(&ds, &options, 1);
        assert_eq!(market.references[0].1.map(|r| r.price), view.pellet.price);
    }

    #[test]
    fn average_row_without_price_keeps_its_series() {
        let ds = dataset(json!([
            { "State": "A", "Type": "Pellet", "Price": 7000 },
            { "State": "B", "Type": "Pellet", "Price": 8000 },
            { "State": "AVERAGE", "Type": "Pellet", "Price": "", "Week": 7400 }
        ]));
        let view = location_view(&ds, &ViewOptions::default());

        assert_eq!(view.pellet.price, Some(7500));
        assert_eq!(view.pellet.derived, Some(AverageStrategy::Mean));
        assert_eq!(view.pellet.series.week.value(), Some(7400));
        assert_eq!(view.completeness.filled, 1);
    }

    #[test]
    fn priced_average_row_is_shown_as_is() {
        let ds = dataset(json!([
            { "State": "A", "Type": "Pellet", "Price": 7000 },
            { "State": "AVERAGE", "Type": "Pellet", "Price": 7200 }
        ]));
        let view = location_view(&ds, &ViewOptions::default());

        assert_eq!(view.pellet.price, Some(7200));
        assert_eq!(view.pellet.derived, None);
        assert_eq!(view.pellet.lookup.map(|l| l.provenance), Some(Provenance::Exact));
    }

    #[test]
    fn unknown_location_without_aggregates_shows_nothing() {
        let ds = dataset(json!([{ "State": "A", "Type": "Pellet", "Price": 7000 }]));
        let options = ViewOptions {
            location: Location::new("Goa").unwrap(),
            ..ViewOptions::default()
        };
        let view = location_view(&ds, &options);
        assert!(view.pellet.lookup.is_none());
        assert_eq!(view.pellet.price, None);
        assert_eq!(view.pellet.derived, None);
    }

    #[test]
    fn market_summary_collects_per_fuel_figures() {
        let ds = dataset(json!([
            { "State": "A", "Type": "Pellet", "Price": 7000 },
            { "State": "B", "Type": "Pellet", "Price": 8000 },
            { "State": "A", "Type": "Briquette", "Price": 6000 },
            { "State": "B", "Type": "Briquette", "Price": 6500 }
        ]));
        let summary = market_summary(&ds, &ViewOptions::default(), 1);

        assert_eq!(summary.deals.best_buy.as_ref().map(|p| p.price), Some(6000));
        assert_eq!(summary.deals.best_sell.as_ref().map(|p| p.price), Some(8000));
        assert_eq!(summary.references[0].1.map(|r| r.price), Some(7500));
        assert_eq!(summary.cheapest[1].1.len(), 1);
        assert_eq!(summary.cheapest[1].1[0].location.label(), "A");
    }
}
