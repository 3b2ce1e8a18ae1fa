//! Month-keyed market notes shown under the location view.

use chrono::{Datelike, Local};

const RABI_HARVEST: &str = "Rabi harvest increases agri\u{2011}residue \u{2192} prices may soften regionally.";
const HOLIDAY_FREIGHT: &str = "Transport tightness around holidays \u{2192} freight can spike.";
const KHARIF_HARVEST: &str = "Kharif harvest brings fresh residue \u{2192} watch short\u{2011}term dips.";
const STABLE: &str = "Stable seasonality expected. Track freight & local availability.";

/// Note for a calendar month (1 = January). Unknown months get the default note.
pub fn seasonal_note(month: u32) -> &'static str {
    match month {
        4 => RABI_HARVEST,
        5 => HOLIDAY_FREIGHT,
        10 => KHARIF_HARVEST,
        _ => STABLE,
    }
}

/// Note for the current local month.
pub fn current_seasonal_note() -> &'static str {
    seasonal_note(Local::now().month())
}
