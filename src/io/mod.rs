//! Input/output helpers.
//!
//! - field resolution + numeric coercion (`fields`)
//! - raw rows -> dataset (`ingest`)
//! - pre-grouped JSON read/write (`snapshot`)
//! - CSV export (`export`)

pub mod export;
pub mod fields;
pub mod ingest;
pub mod snapshot;

pub use export::*;
pub use ingest::*;
pub use snapshot::*;
