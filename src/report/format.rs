//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the lookup/stats code stays clean and testable
//! - output changes are localized (golden tests live next to the formatters)

use crate::app::pipeline::{FuelView, LocationView, MarketSummary, ViewOptions};
use crate::dataset::{Dataset, Provenance};
use crate::domain::{AVERAGE_LOCATION, FuelType, PriceSource, QualityAttributes};
use crate::io::ingest::BuildReport;
use crate::plot::ascii::render_trend_chart;
use crate::stats::PricePoint;

/// Skipped rows listed individually before the rest are summarized.
const MAX_SKIPS_SHOWN: usize = 10;

/// Chart dimensions for the location view.
#[derive(Debug, Clone, Copy)]
pub struct ChartSize {
    pub width: usize,
    pub height: usize,
}

/// Format the location page: prices, fallback disclosure, charts, completeness.
pub fn format_location_view(
    view: &LocationView<'_>,
    options: &ViewOptions,
    chart: Option<ChartSize>,
    season_note: &str,
) -> String {
    let mut out = String::new();

    out.push_str("=== bp - Biomass Fuel Prices ===\n");
    out.push_str(&format!("Location: {}\n", view.location));
    out.push_str(&format!(
        "Price: {} | Average: {}\n",
        price_source_label(options),
        options.strategy.display_name()
    ));

    for fuel in [&view.pellet, &view.briquette] {
        out.push('\n');
        out.push_str(&format_fuel(fuel, &view.location.to_string()));
        if let Some(size) = chart.filter(|_| fuel.series.filled_slots() > 0) {
            let title = format!("{} trend", fuel.fuel_type.display_name());
            out.push_str(&render_trend_chart(&title, &fuel.series, size.width, size.height));
        }
    }

    out.push('\n');
    out.push_str(&format!(
        "Data completeness: {} ({}/{} series slots filled)\n",
        view.completeness.level.label(),
        view.completeness.filled,
        view.completeness.possible
    ));
    out.push_str(&format!("Last updated: {}\n", view.last_updated.unwrap_or("--")));
    out.push_str(&format!("Season: {season_note}\n"));

    out
}

fn format_fuel(fuel: &FuelView<'_>, location: &str) -> String {
    let mut out = String::new();
    let name = fuel.fuel_type.display_name();

    out.push_str(&format!(
        "{name} ({}): {}\n",
        fuel.requested_material,
        fmt_price(fuel.price)
    ));

    if let Some(strategy) = fuel.derived {
        out.push_str(&format!(
            "  note: {} across locations (no {AVERAGE_LOCATION} price)\n",
            strategy.display_name()
        ));
    } else if let Some(hit) = fuel.lookup {
        let entry = hit.entry;
        match hit.provenance {
            Provenance::Exact => {}
            Provenance::OtherMaterial => out.push_str(&format!(
                "  note: {} not listed for {location}; showing {}\n",
                fuel.requested_material, entry.material
            )),
            Provenance::Aggregate { exact_material: true } => out.push_str(&format!(
                "  note: no {} rows for {location}; showing {} figures\n",
                fuel.fuel_type, entry.location
            )),
            Provenance::Aggregate { exact_material: false } => out.push_str(&format!(
                "  note: no {} rows for {location}; showing {} {} figures\n",
                fuel.fuel_type, entry.location, entry.material
            )),
        }
        if let Some(updated) = &entry.last_updated {
            out.push_str(&format!("  updated: {updated}\n"));
        }
    } else {
        out.push_str(&format!("  note: no {} data for {location}\n", fuel.fuel_type));
    }

    if let Some(quality) = fuel.quality().filter(|q| !q.is_empty()) {
        out.push_str(&format!("  quality: {}\n", fmt_quality(&quality)));
    }

    out
}

fn price_source_label(options: &ViewOptions) -> &'static str {
    match options.price_source {
        PriceSource::Column => "price column",
        PriceSource::Week => "week slot",
        PriceSource::ColumnThenWeek => "price column, then week slot",
    }
}

/// Format the market page: best buy/sell, reference prices, cheapest locations.
pub fn format_market(summary: &MarketSummary, options: &ViewOptions) -> String {
    let mut out = String::new();

    out.push_str("=== bp - Market Overview ===\n");
    out.push_str(&format!(
        "Best buy : {}\n",
        summary.deals.best_buy.as_ref().map(fmt_point).unwrap_or_else(|| "--".to_string())
    ));
    out.push_str(&format!(
        "Best sell: {}\n",
        summary.deals.best_sell.as_ref().map(fmt_point).unwrap_or_else(|| "--".to_string())
    ));

    out.push_str("\nReference prices:\n");
    for (fuel_type, reference) in &summary.references {
        let label = format!("{} ({})", fuel_type.display_name(), options.material_for(*fuel_type));
        let line = match reference {
            Some(r) => {
                let origin = match r.derived {
                    None => format!("{AVERAGE_LOCATION} row"),
                    Some(strategy) => format!("{} across locations", strategy.display_name()),
                };
                format!("  {:<24} {:>14}  ({origin})", truncate(&label, 24), fmt_price(Some(r.price)))
            }
            None => format!("  {:<24} {:>14}", truncate(&label, 24), "--"),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }

    for (fuel_type, points) in &summary.cheapest {
        out.push_str(&format!("\nCheapest {} locations:\n", fuel_type));
        out.push_str(&format_price_table(points));
    }

    out
}

fn format_price_table(rows: &[PricePoint]) -> String {
    let mut out = String::new();
    if rows.is_empty() {
        out.push_str("(none)\n");
        return out;
    }

    out.push_str(format!("{:<24} {:<16} {:>12}", "location", "material", "price").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<24} {:-<16} {:-<12}", "", "", "").trim_end());
    out.push('\n');

    for p in rows {
        out.push_str(
            format!(
                "{:<24} {:<16} {:>12}",
                truncate(p.location.label(), 24),
                truncate(p.material.label(), 16),
                format_inr(p.price),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format the location and material catalog.
pub fn format_catalog(dataset: &Dataset) -> String {
    let mut out = String::new();

    let locations: Vec<&str> = dataset.locations().map(|l| l.label()).collect();
    out.push_str(&format!("Locations ({}):\n", locations.len()));
    for location in &locations {
        out.push_str(&format!("  {location}\n"));
    }

    let aggregates: Vec<String> = dataset
        .aggregate_locations()
        .iter()
        .map(|l| l.label().to_string())
        .collect();
    if !aggregates.is_empty() {
        out.push_str(&format!("Aggregate rows: {}\n", aggregates.join(", ")));
    }

    out.push_str("Materials:\n");
    for fuel_type in FuelType::ALL {
        let materials: Vec<&str> = dataset.materials(fuel_type).map(|m| m.label()).collect();
        let listed = if materials.is_empty() {
            "--".to_string()
        } else {
            materials.join(", ")
        };
        out.push_str(&format!("  {:<9}: {listed}\n", fuel_type.display_name()));
    }

    out
}

/// One-line summary of a build, plus the first skipped rows.
pub fn format_build_report(report: &BuildReport, origin: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Source: {origin} | rows read={} used={} overwritten={} skipped={}\n",
        report.rows_read,
        report.rows_used,
        report.overwritten,
        report.skipped.len()
    ));
    for skip in report.skipped.iter().take(MAX_SKIPS_SHOWN) {
        out.push_str(&format!("  row {}: {}\n", skip.index, skip.reason));
    }
    if report.skipped.len() > MAX_SKIPS_SHOWN {
        out.push_str(&format!("  ... {} more\n", report.skipped.len() - MAX_SKIPS_SHOWN));
    }
    out
}

fn fmt_point(p: &PricePoint) -> String {
    format!(
        "{} ({}) in {} at {}",
        p.fuel_type.display_name(),
        p.material,
        p.location,
        fmt_price(Some(p.price))
    )
}

fn fmt_price(price: Option<i64>) -> String {
    match price {
        Some(p) => format!("\u{20b9}{}/ton", format_inr(p)),
        None => "--".to_string(),
    }
}

fn fmt_quality(q: &QualityAttributes) -> String {
    let mut parts = Vec::new();
    if let Some(ash) = q.ash_pct {
        parts.push(format!("ash {ash}%"));
    }
    if let Some(moisture) = q.moisture_pct {
        parts.push(format!("moisture {moisture}%"));
    }
    if let Some(cv) = q.calorific_value {
        parts.push(format!("GCV {cv} kcal/kg"));
    }
    parts.join(" | ")
}

/// Indian digit grouping: the last three digits, then groups of two (`12,34,567`).
pub fn format_inr(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let (head, tail) = digits.split_at(digits.len().saturating_sub(3));

    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (front, group) = rest.split_at(rest.len() - 2);
        groups.push(group);
        rest = front;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();

    let mut out = String::new();
    if amount < 0 {
        out.push('-');
    }
    for group in groups {
        out.push_str(group);
        out.push(',');
    }
    out.push_str(tail);
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
