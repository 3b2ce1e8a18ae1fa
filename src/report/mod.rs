//! Reporting: formatted terminal output and seasonal market notes.

pub mod format;
pub mod season;

pub use format::{ChartSize, format_build_report, format_catalog, format_inr, format_location_view, format_market};
pub use season::{current_seasonal_note, seasonal_note};
