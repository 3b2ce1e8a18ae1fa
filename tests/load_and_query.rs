use std::fs;
use std::path::Path;
use std::time::Duration;

use biomass_prices::app::pipeline::{ViewOptions, load_dataset, location_view};
use biomass_prices::data::{DataSource, load};
use biomass_prices::dataset::Provenance;
use biomass_prices::domain::{FuelType, Location, Material, PriceSource, Reading};
use biomass_prices::error::{EXIT_LOAD_FAILED, EXIT_NO_DATA};
use biomass_prices::io::export::write_dataset_csv;
use biomass_prices::io::snapshot::write_snapshot_json;
use biomass_prices::stats::best_deals;
use tempfile::tempdir;

const TIMEOUT: Duration = Duration::from_secs(1);

const SHEET: &str = r#"[
    { "State": "Punjab", "Type": "Pellet", "Price": "7,600", "Year": "7400", "Week": "7650" },
    { "State": "Punjab", "Type": "Pellet", "Price": "7,650", "Year": "7400", "Week": "7700", "Updated": "2025-03-05" },
    { "State": "AVERAGE", "Type": "Pellet", "Price": 7500, "Ash": "8.5", "Calorific Value": 4200 },
    { "State": "Kerala", "Type": "Briquette", "Price": "6,100", "Week": "n/a" },
    { "State": "", "Type": "Pellet", "Price": 9999 },
    { "State": "Goa", "Type": "Charcoal", "Price": 100 }
]"#;

fn write(path: &Path, body: &str) {
    fs::write(path, body).expect("write fixture");
}

#[test]
fn raw_file_builds_one_entry_per_key() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("sheet.json");
    write(&path, SHEET);

    let ingested = load(&DataSource::RawFile(path), TIMEOUT).expect("load");
    let report = &ingested.report;
    assert_eq!(report.rows_read, 6);
    assert_eq!(report.rows_used, 4);
    assert_eq!(report.overwritten, 1);
    assert_eq!(report.skipped.len(), 2);

    let ds = &ingested.dataset;
    assert_eq!(ds.len(), 3);
    let punjab = ds
        .get(&Location::new("punjab").unwrap(), FuelType::Pellet, &Material::standard())
        .expect("punjab pellet");
    assert_eq!(punjab.price, Reading::Value(7650));
    assert_eq!(punjab.series.week, Reading::Value(7700));
    assert_eq!(punjab.series.year, Reading::Value(7400));

    let kerala = ds
        .get(&Location::new("Kerala").unwrap(), FuelType::Briquette, &Material::standard())
        .expect("kerala briquette");
    assert_eq!(kerala.series.week, Reading::Invalid);
    assert_eq!(kerala.current_price(PriceSource::Week), None);
}

#[test]
fn missing_location_falls_back_to_average_row() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("sheet.json");
    write(&path, SHEET);

    let ingested = load_dataset(&DataSource::RawFile(path), TIMEOUT).expect("load");
    let options = ViewOptions {
        location: Location::new("Kerala").unwrap(),
        ..ViewOptions::default()
    };
    let view = location_view(&ingested.dataset, &options);

    let hit = view.pellet.lookup.expect("fallback hit");
    assert_eq!(hit.entry.location, Location::average());
    assert_eq!(hit.provenance, Provenance::Aggregate { exact_material: true });
    assert_eq!(view.pellet.price, Some(7500));
    assert_eq!(view.pellet.quality().and_then(|q| q.calorific_value), Some(4200.0));
    assert_eq!(view.briquette.price, Some(6100));
}

#[test]
fn best_deals_span_fuel_types() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("sheet.json");
    write(
        &path,
        r#"[
            { "State": "A", "Type": "Pellet", "Price": 7000 },
            { "State": "B", "Type": "Pellet", "Price": 8000 },
            { "State": "A", "Type": "Briquette", "Price": 6000 },
            { "State": "B", "Type": "Briquette", "Price": 6500 }
        ]"#,
    );

    let ingested = load_dataset(&DataSource::RawFile(path), TIMEOUT).expect("load");
    let deals = best_deals(&ingested.dataset, PriceSource::Column);

    let buy = deals.best_buy.expect("best buy");
    assert_eq!((buy.price, buy.fuel_type, buy.location.label()), (6000, FuelType::Briquette, "A"));
    let sell = deals.best_sell.expect("best sell");
    assert_eq!((sell.price, sell.fuel_type, sell.location.label()), (8000, FuelType::Pellet, "B"));
}

#[test]
fn snapshot_round_trip_preserves_prices_and_quality() {
    let dir = tempdir().expect("tempdir");
    let raw = dir.path().join("sheet.json");
    let snap = dir.path().join("snapshot.json");
    let csv = dir.path().join("prices.csv");
    write(&raw, SHEET);

    let original = load_dataset(&DataSource::RawFile(raw), TIMEOUT).expect("load");
    write_snapshot_json(&snap, &original.dataset).expect("write snapshot");
    write_dataset_csv(&csv, &original.dataset).expect("write csv");

    let reloaded = load_dataset(&DataSource::Snapshot(snap), TIMEOUT).expect("reload");
    assert_eq!(reloaded.dataset.len(), original.dataset.len());

    let key = (Location::new("Punjab").unwrap(), FuelType::Pellet, Material::standard());
    let before = original.dataset.get(&key.0, key.1, &key.2).unwrap();
    let after = reloaded.dataset.get(&key.0, key.1, &key.2).unwrap();
    assert_eq!(after.price, before.price);
    assert_eq!(after.series, before.series);
    assert_eq!(after.last_updated.as_deref(), Some("2025-03-05"));

    let avg = reloaded
        .dataset
        .get(&Location::average(), FuelType::Pellet, &Material::standard())
        .unwrap();
    assert_eq!(avg.quality.and_then(|q| q.ash_pct), Some(8.5));

    let text = fs::read_to_string(&csv).expect("read csv");
    assert!(text.starts_with("location,fuel_type,material,price,"));
    assert_eq!(text.lines().count(), 4);
}

#[test]
fn empty_and_malformed_sources_fail_with_distinct_codes() {
    let dir = tempdir().expect("tempdir");

    let empty = dir.path().join("empty.json");
    write(&empty, "[]");
    let err = load_dataset(&DataSource::RawFile(empty), TIMEOUT).unwrap_err();
    assert_eq!(err.exit_code(), EXIT_NO_DATA);

    let object = dir.path().join("object.json");
    write(&object, r#"{ "rows": [] }"#);
    let err = load_dataset(&DataSource::RawFile(object), TIMEOUT).unwrap_err();
    assert_eq!(err.exit_code(), EXIT_LOAD_FAILED);
}
