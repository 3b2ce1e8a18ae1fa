//! Field resolution and numeric coercion for loosely-typed sheet rows.
//!
//! Sheet exports rename columns freely (`"6 Month"`, `"6mo"`, `"SixMonth"`) and
//! format numbers for humans (`"7,500"`, `"₹ 7,500/-"`). Nothing in here fails:
//! an unusable cell is reported as absent or invalid and the caller decides.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::domain::Reading;

/// One row of the tabular API: column name -> cell.
pub type RawRecord = Map<String, Value>;

// Candidate column names per logical field, most canonical first.
pub const LOCATION_KEYS: &[&str] = &["State", "Location", "Region", "City"];
pub const FUEL_TYPE_KEYS: &[&str] = &["Type", "Fuel Type", "Fuel", "Product"];
pub const MATERIAL_KEYS: &[&str] = &["Material", "Grade", "Variety", "Feedstock"];
pub const PRICE_KEYS: &[&str] = &["Price", "Current Price", "Rate"];
pub const YEAR_KEYS: &[&str] = &["Year", "1 Year", "1y", "Yearly"];
pub const SIX_MONTH_KEYS: &[&str] = &["6 Month", "6 Months", "6mo", "SixMonth", "Six Month", "Six Months"];
pub const MONTH_KEYS: &[&str] = &["Month", "1 Month", "1mo", "Monthly"];
pub const WEEK_KEYS: &[&str] = &["Week", "1 Week", "1w", "Weekly"];
pub const UPDATED_KEYS: &[&str] = &["Updated", "Last Updated", "Timestamp", "Date"];
pub const ASH_KEYS: &[&str] = &["Ash", "Ash %", "Ash Content"];
pub const MOISTURE_KEYS: &[&str] = &["Moisture", "Moisture %", "Moisture Content"];
pub const CALORIFIC_KEYS: &[&str] = &["Calorific Value", "Calorific", "GCV", "CV", "Kcal"];

const CURRENCY_GLYPHS: [char; 6] = ['₹', '₨', '$', '€', '£', '¥'];
const CURRENCY_PREFIXES: [&str; 3] = ["INR", "Rs.", "Rs"];

/// Return the first present value among `aliases`.
///
/// Keys match case-insensitively, ignoring whitespace and underscores. A value is
/// present unless it is `null` or a blank string; `0` is present.
pub fn resolve<'a>(record: &'a RawRecord, aliases: &[&str]) -> Option<&'a Value> {
    for alias in aliases {
        let wanted = normalize_key(alias);
        let hit = record
            .iter()
            .find(|(key, value)| normalize_key(key) == wanted && is_present(value));
        if let Some((_, value)) = hit {
            return Some(value);
        }
    }
    None
}

/// [`resolve`] for text fields. Numbers and booleans are rendered as text.
pub fn resolve_text(record: &RawRecord, aliases: &[&str]) -> Option<String> {
    match resolve(record, aliases)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Coerce a cell into an integer reading.
///
/// `None`, `null` and blank strings are `Missing`; anything else that does not
/// parse is `Invalid`. Fractions round to the nearest integer.
pub fn coerce_int(value: Option<&Value>) -> Reading {
    let Some(value) = value.filter(|v| is_present(v)) else {
        return Reading::Missing;
    };
    if let Some(n) = value.as_i64() {
        return Reading::Value(n);
    }
    match coerce_number(value) {
        Some(v) => Reading::Value(v.round() as i64),
        None => Reading::Invalid,
    }
}

/// Coerce a cell into a finite float (used for percentages and calorific values).
pub fn coerce_decimal(value: Option<&Value>) -> Option<f64> {
    value.and_then(coerce_number)
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_numeric_text(s),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }
}

fn parse_numeric_text(raw: &str) -> Option<f64> {
    let mut text = raw.trim();
    for prefix in CURRENCY_PREFIXES {
        let matches = text
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
        if matches {
            text = &text[prefix.len()..];
            break;
        }
    }
    // Indian price lists often end amounts with "/-".
    let text = text.trim().trim_end_matches("/-");

    let cleaned: String = text.chars().filter(|c| !is_separator(*c)).collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_separator(c: char) -> bool {
    matches!(c, ',' | '_' | '\'' | '%') || c.is_whitespace() || CURRENCY_GLYPHS.contains(&c)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

fn normalize_key(name: &str) -> String {
    // Spreadsheet exports sometimes carry a BOM on the first header.
    name.trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Parse the free-text `Updated` cell.
///
/// Accepts RFC 3339 and a small set of day-first and ISO formats, with or
/// without a time of day. Date-only values are taken at midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    const DATETIME_FMTS: [&str; 6] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
        "%d-%m-%Y %H:%M",
    ];
    const DATE_FMTS: [&str; 7] = [
        "%Y-%m-%d",
        "%d/%m/%Y",
        "%d-%m-%Y",
        "%Y/%m/%d",
        "%d %b %Y",
        "%d %B %Y",
        "%b %d, %Y",
    ];

    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn resolve_matches_aliases_case_and_space_insensitively() {
        let row = record(json!({ "six month": "7,100", "STATE ": "Punjab" }));
        assert_eq!(resolve(&row, SIX_MONTH_KEYS), Some(&json!("7,100")));
        assert_eq!(resolve_text(&row, LOCATION_KEYS).as_deref(), Some("Punjab"));
    }

    #[test]
    fn resolve_skips_blank_values_but_keeps_zero() {
        let row = record(json!({ "6 Month": "", "6mo": 0, "Price": null }));
        assert_eq!(resolve(&row, SIX_MONTH_KEYS), Some(&json!(0)));
        assert_eq!(resolve(&row, PRICE_KEYS), None);
    }

    #[test]
    fn resolve_prefers_earlier_aliases() {
        let row = record(json!({ "Region": "North", "State": "Punjab" }));
        assert_eq!(resolve_text(&row, LOCATION_KEYS).as_deref(), Some("Punjab"));
    }

    #[test]
    fn coerce_strips_separators_and_currency() {
        assert_eq!(coerce_int(Some(&json!("7,500"))), Reading::Value(7500));
        assert_eq!(coerce_int(Some(&json!(" ₹ 7,650/- "))), Reading::Value(7650));
        assert_eq!(coerce_int(Some(&json!("Rs. 6 200"))), Reading::Value(6200));
        assert_eq!(coerce_int(Some(&json!("7500.6"))), Reading::Value(7501));
        assert_eq!(coerce_int(Some(&json!(7500))), Reading::Value(7500));
    }

    #[test]
    fn coerce_is_idempotent_on_integers() {
        for n in [0_i64, 1, 7500, -40, 1_000_000] {
            let once = coerce_int(Some(&json!(n)));
            assert_eq!(once, Reading::Value(n));
            let twice = coerce_int(Some(&json!(once.or_zero())));
            assert_eq!(twice, once);
        }
    }

    #[test]
    fn coerce_separates_absent_from_unparseable() {
        assert_eq!(coerce_int(None), Reading::Missing);
        assert_eq!(coerce_int(Some(&Value::Null)), Reading::Missing);
        assert_eq!(coerce_int(Some(&json!(""))), Reading::Missing);
        assert_eq!(coerce_int(Some(&json!("  "))), Reading::Missing);
        assert_eq!(coerce_int(Some(&json!("n/a"))), Reading::Invalid);
        assert_eq!(coerce_int(Some(&json!(true))), Reading::Invalid);
        assert_eq!(coerce_int(Some(&json!("₹"))), Reading::Invalid);
    }

    #[test]
    fn coerce_decimal_reads_percentages() {
        assert_eq!(coerce_decimal(Some(&json!("8.5 %"))), Some(8.5));
        assert_eq!(coerce_decimal(Some(&json!(4200))), Some(4200.0));
        assert_eq!(coerce_decimal(None), None);
    }

    #[test]
    fn timestamps_accept_common_sheet_formats() {
        let midnight = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2025-03-05"), Some(midnight(2025, 3, 5)));
        assert_eq!(parse_timestamp("05/03/2025"), Some(midnight(2025, 3, 5)));
        assert_eq!(parse_timestamp("5 Mar 2025"), Some(midnight(2025, 3, 5)));
        assert_eq!(
            parse_timestamp("2025-03-05T10:30:00Z"),
            NaiveDate::from_ymd_opt(2025, 3, 5).unwrap().and_hms_opt(10, 30, 0)
        );
        assert_eq!(parse_timestamp("last week"), None);
    }
}
