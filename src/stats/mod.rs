//! Dataset-wide aggregates: best buy/sell, reference prices, data completeness.
//!
//! Averages, reference figures and location rankings exclude the aggregate
//! sentinel rows (`AVERAGE`, `GLOBAL`); price extremes and completeness do not.

use std::collections::BTreeMap;

use crate::dataset::Dataset;
use crate::domain::{AverageStrategy, FuelType, Location, Material, NormalizedEntry, PriceSource, Reading, Series};

/// A price attributed to one dataset entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricePoint {
    pub location: Location,
    pub fuel_type: FuelType,
    pub material: Material,
    pub price: i64,
}

impl PricePoint {
    fn from_entry(entry: &NormalizedEntry, price: i64) -> Self {
        Self {
            location: entry.location.clone(),
            fuel_type: entry.fuel_type,
            material: entry.material.clone(),
            price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceExtremes {
    pub min: PricePoint,
    pub max: PricePoint,
}

/// Lowest price overall ("best buy") and highest ("best sell").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BestDeals {
    pub best_buy: Option<PricePoint>,
    pub best_sell: Option<PricePoint>,
}

/// Min and max strictly positive price for one fuel type, over every entry
/// (the `AVERAGE` / `GLOBAL` rows included).
///
/// Ties keep the entry seen first in source order.
pub fn price_extremes(dataset: &Dataset, fuel_type: FuelType, source: PriceSource) -> Option<PriceExtremes> {
    let mut extremes: Option<PriceExtremes> = None;
    for entry in dataset.entries_in_source_order() {
        if entry.fuel_type != fuel_type {
            continue;
        }
        let Some(price) = entry.current_price(source).filter(|p| *p > 0) else {
            continue;
        };
        match &mut extremes {
            None => {
                let point = PricePoint::from_entry(entry, price);
                extremes = Some(PriceExtremes {
                    min: point.clone(),
                    max: point,
                });
            }
            Some(ext) => {
                if price < ext.min.price {
                    ext.min = PricePoint::from_entry(entry, price);
                }
                if price > ext.max.price {
                    ext.max = PricePoint::from_entry(entry, price);
                }
            }
        }
    }
    extremes
}

/// Combine per-fuel extremes; pellet wins ties against briquette.
pub fn best_deals(dataset: &Dataset, source: PriceSource) -> BestDeals {
    let mut deals = BestDeals::default();
    for fuel_type in FuelType::ALL {
        let Some(ext) = price_extremes(dataset, fuel_type, source) else {
            continue;
        };
        if deals.best_buy.as_ref().is_none_or(|b| ext.min.price < b.price) {
            deals.best_buy = Some(ext.min);
        }
        if deals.best_sell.as_ref().is_none_or(|s| ext.max.price > s.price) {
            deals.best_sell = Some(ext.max);
        }
    }
    deals
}

/// Present prices of real locations for one fuel type. A recorded `0` counts; a
/// missing or unparseable cell does not.
fn location_prices(dataset: &Dataset, fuel_type: FuelType, source: PriceSource) -> Vec<i64> {
    dataset
        .entries_in_source_order()
        .into_iter()
        .filter(|e| e.fuel_type == fuel_type && !e.location.is_aggregate())
        .filter_map(|e| e.current_price(source))
        .collect()
}

/// Reduce values with the given strategy. `None` for an empty input.
pub fn aggregate(values: &[i64], strategy: AverageStrategy) -> Option<i64> {
    if values.is_empty() {
        return None;
    }
    match strategy {
        AverageStrategy::Mean => {
            let sum: i128 = values.iter().map(|v| i128::from(*v)).sum();
            let mean = sum as f64 / values.len() as f64;
            Some(mean.round() as i64)
        }
        AverageStrategy::Median => {
            let mut sorted = values.to_vec();
            sorted.sort_unstable();
            Some(sorted[sorted.len() / 2])
        }
    }
}

/// Mean price across real locations, rounded to the nearest integer.
pub fn mean_price(dataset: &Dataset, fuel_type: FuelType, source: PriceSource) -> Option<i64> {
    aggregate(&location_prices(dataset, fuel_type, source), AverageStrategy::Mean)
}

/// Upper median (`floor(n / 2)`) price across real locations.
pub fn median_price(dataset: &Dataset, fuel_type: FuelType, source: PriceSource) -> Option<i64> {
    aggregate(&location_prices(dataset, fuel_type, source), AverageStrategy::Median)
}

/// A nationwide reference price and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferencePrice {
    pub price: i64,
    /// `None` when an explicit `AVERAGE` row supplied the price.
    pub derived: Option<AverageStrategy>,
}

/// Explicit `AVERAGE` row price when present, else computed across real locations.
pub fn reference_price(
    dataset: &Dataset,
    fuel_type: FuelType,
    material: &Material,
    source: PriceSource,
    strategy: AverageStrategy,
) -> Option<ReferencePrice> {
    let explicit = dataset
        .lookup_at(&Location::average(), fuel_type, material)
        .and_then(|hit| hit.entry.current_price(source));
    if let Some(price) = explicit {
        return Some(ReferencePrice { price, derived: None });
    }

    aggregate(&location_prices(dataset, fuel_type, source), strategy).map(|price| ReferencePrice {
        price,
        derived: Some(strategy),
    })
}

/// A nationwide trend series and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceSeries {
    pub series: Series,
    pub derived: Option<AverageStrategy>,
}

/// Explicit `AVERAGE` row series when present, else a per-slot aggregate over
/// the non-zero readings of real locations.
pub fn reference_series(
    dataset: &Dataset,
    fuel_type: FuelType,
    material: &Material,
    strategy: AverageStrategy,
) -> ReferenceSeries {
    if let Some(hit) = dataset.lookup_at(&Location::average(), fuel_type, material) {
        return ReferenceSeries {
            series: hit.entry.series,
            derived: None,
        };
    }

    let rows: Vec<&NormalizedEntry> = dataset
        .entries_in_source_order()
        .into_iter()
        .filter(|e| e.fuel_type == fuel_type && !e.location.is_aggregate())
        .collect();

    let mut slots = [Reading::Missing; 4];
    for (i, slot) in slots.iter_mut().enumerate() {
        let values: Vec<i64> = rows
            .iter()
            .filter_map(|e| e.series.readings()[i].value().filter(|v| *v != 0))
            .collect();
        *slot = Reading::from(aggregate(&values, strategy));
    }

    ReferenceSeries {
        series: Series::from_readings(slots),
        derived: Some(strategy),
    }
}

/// Heuristic data-completeness grade (how many series slots are filled).
///
/// This is a coverage signal, not a statistical confidence interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CompletenessLevel {
    Low,
    Medium,
    High,
}

impl CompletenessLevel {
    pub fn label(self) -> &'static str {
        match self {
            CompletenessLevel::Low => "Low",
            CompletenessLevel::Medium => "Medium",
            CompletenessLevel::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completeness {
    pub filled: usize,
    pub possible: usize,
    pub level: CompletenessLevel,
}

const COMPLETENESS_SLOTS: usize = 8;
const COMPLETENESS_HIGH: usize = 6;
const COMPLETENESS_MEDIUM: usize = 3;

/// Grade the pellet + briquette series shown for a location (8 slots in total).
pub fn data_completeness(pellet: Option<&NormalizedEntry>, briquette: Option<&NormalizedEntry>) -> Completeness {
    let filled = [pellet, briquette]
        .into_iter()
        .flatten()
        .map(|e| e.series.filled_slots())
        .sum();
    let level = if filled >= COMPLETENESS_HIGH {
        CompletenessLevel::High
    } else if filled >= COMPLETENESS_MEDIUM {
        CompletenessLevel::Medium
    } else {
        CompletenessLevel::Low
    };
    Completeness {
        filled,
        possible: COMPLETENESS_SLOTS,
        level,
    }
}

/// [`data_completeness`] for the entries a location view would show (fallbacks included).
pub fn location_completeness(
    dataset: &Dataset,
    location: &Location,
    pellet_material: &Material,
    briquette_material: &Material,
) -> Completeness {
    let pellet = dataset.lookup(location, FuelType::Pellet, pellet_material);
    let briquette = dataset.lookup(location, FuelType::Briquette, briquette_material);
    data_completeness(pellet.map(|l| l.entry), briquette.map(|l| l.entry))
}

/// Cheapest real locations for a fuel type: each location's lowest positive
/// price across materials, ascending, at most `n`. Equal prices sort by name.
pub fn cheapest_locations(dataset: &Dataset, fuel_type: FuelType, source: PriceSource, n: usize) -> Vec<PricePoint> {
    let mut per_location: BTreeMap<&Location, PricePoint> = BTreeMap::new();
    for entry in dataset.entries_in_source_order() {
        if entry.fuel_type != fuel_type || entry.location.is_aggregate() {
            continue;
        }
        let Some(price) = entry.current_price(source).filter(|p| *p > 0) else {
            continue;
        };
        let better = per_location
            .get(&entry.location)
            .is_none_or(|current| price < current.price);
        if better {
            per_location.insert(&entry.location, PricePoint::from_entry(entry, price));
        }
    }

    let mut ranked: Vec<PricePoint> = per_location.into_values().collect();
    ranked.sort_by(|a, b| a.price.cmp(&b.price).then_with(|| a.location.cmp(&b.location)));
    ranked.truncate(n);
    ranked
}

/// Most recent `last_updated` among `entries`.
///
/// Parseable timestamps win; otherwise the first non-empty text is returned as-is.
pub fn latest_update<'a>(entries: impl IntoIterator<Item = &'a NormalizedEntry>) -> Option<&'a str> {
    let mut first_text: Option<&'a str> = None;
    let mut newest: Option<(chrono::NaiveDateTime, &'a str)> = None;

    for entry in entries {
        let Some(text) = entry.last_updated.as_deref() else {
            continue;
        };
        first_text.get_or_insert(text);
        if let Some(at) = entry.updated_at() {
            if newest.is_none_or(|(best, _)| at > best) {
                newest = Some((at, text));
            }
        }
    }

    newest.map(|(_, text)| text).or(first_text)
}
