//! Where the raw price table comes from.
//!
//! - the spreadsheet-backed HTTP API (`sheet`)
//! - local files and source selection (`source`)

pub mod sheet;
pub mod source;

pub use sheet::{DEFAULT_TIMEOUT, SHEET_URL_ENV, SheetClient};
pub use source::{DataSource, load};
