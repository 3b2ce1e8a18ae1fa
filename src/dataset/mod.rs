//! The in-memory, queryable price model built from one data load.
//!
//! A `Dataset` is only populated by `io::ingest` (or `io::snapshot`); consumers
//! get read-only views. Each load produces a fresh value.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{FuelType, Location, Material, NormalizedEntry};

pub mod lookup;

pub use lookup::{Lookup, Provenance};

type MaterialMap = BTreeMap<Material, NormalizedEntry>;

/// location -> fuel type -> material -> entry.
///
/// At most one entry per `(location, fuel type, material)`; a later insert for
/// the same key replaces the earlier one.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    entries: BTreeMap<Location, BTreeMap<FuelType, MaterialMap>>,
    materials: BTreeMap<FuelType, BTreeSet<Material>>,
    locations: BTreeSet<Location>,
}

impl Dataset {
    /// Insert or overwrite. Returns `true` when an existing entry was replaced.
    pub(crate) fn insert(&mut self, entry: NormalizedEntry) -> bool {
        self.materials
            .entry(entry.fuel_type)
            .or_default()
            .replace(entry.material.clone());
        // The label shown follows the latest row, like the entry itself.
        if !entry.location.is_aggregate() {
            self.locations.replace(entry.location.clone());
        }

        self.entries
            .entry(entry.location.clone())
            .or_default()
            .entry(entry.fuel_type)
            .or_default()
            .insert(entry.material.clone(), entry)
            .is_some()
    }

    /// Number of distinct `(location, fuel type, material)` entries.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Real locations, sorted by name. Aggregate sentinels are not included.
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    /// Aggregate sentinels that carry at least one entry, in fallback order.
    pub fn aggregate_locations(&self) -> Vec<Location> {
        Location::aggregates()
            .into_iter()
            .filter(|loc| self.entries.contains_key(loc))
            .collect()
    }

    /// Materials observed for `fuel_type` across all rows, sorted by name.
    pub fn materials(&self, fuel_type: FuelType) -> impl Iterator<Item = &Material> {
        self.materials.get(&fuel_type).into_iter().flatten()
    }

    pub fn get(&self, location: &Location, fuel_type: FuelType, material: &Material) -> Option<&NormalizedEntry> {
        self.fuel_entries(location, fuel_type)?.get(material)
    }

    /// All materials recorded for one location and fuel type.
    pub fn fuel_entries(&self, location: &Location, fuel_type: FuelType) -> Option<&MaterialMap> {
        self.entries.get(location)?.get(&fuel_type)
    }

    /// Every entry, in key order.
    pub fn entries(&self) -> impl Iterator<Item = &NormalizedEntry> {
        self.entries
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::values)
    }

    /// Every entry, ordered by the source row that produced it.
    pub fn entries_in_source_order(&self) -> Vec<&NormalizedEntry> {
        let mut out: Vec<&NormalizedEntry> = self.entries().collect();
        out.sort_by_key(|e| e.source_index);
        out
    }
}
