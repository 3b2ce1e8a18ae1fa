//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - the closed set of fuel types and the aggregate location sentinels
//! - case-insensitive `Location` / `Material` names
//! - coerced numeric cells (`Reading`) and the four-slot `Series`
//! - the normalized row shape (`NormalizedEntry`)

pub mod types;

pub use types::*;
