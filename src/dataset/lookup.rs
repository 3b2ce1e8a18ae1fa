//! Row lookup with fallback.
//!
//! Per-location sheets are often incomplete, so a lookup walks:
//! exact material -> any material at the location -> the same two steps at the
//! aggregate sentinels (`AVERAGE`, then `GLOBAL`). The returned `Provenance`
//! tells the caller how far it had to go.

use crate::domain::{FuelType, Location, Material, NormalizedEntry};

use super::Dataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// The requested location and material.
    Exact,
    /// The requested location, another material.
    OtherMaterial,
    /// An aggregate sentinel row stood in for the requested location.
    Aggregate { exact_material: bool },
}

#[derive(Debug, Clone, Copy)]
pub struct Lookup<'a> {
    pub entry: &'a NormalizedEntry,
    pub provenance: Provenance,
}

impl Lookup<'_> {
    /// `true` unless the entry matched all three keys.
    pub fn is_fallback(&self) -> bool {
        self.provenance != Provenance::Exact
    }
}

impl Dataset {
    /// Best entry for `(location, fuel_type, material)`, or `None` when neither the
    /// location nor any aggregate sentinel has the fuel type.
    pub fn lookup(&self, location: &Location, fuel_type: FuelType, material: &Material) -> Option<Lookup<'_>> {
        if let Some(found) = self.lookup_at(location, fuel_type, material) {
            return Some(found);
        }

        for aggregate in Location::aggregates() {
            if aggregate == *location {
                continue;
            }
            if let Some(found) = self.lookup_at(&aggregate, fuel_type, material) {
                tracing::debug!(
                    requested = location.label(),
                    fallback = aggregate.label(),
                    fuel = %fuel_type,
                    "lookup fell back to aggregate row"
                );
                return Some(Lookup {
                    entry: found.entry,
                    provenance: Provenance::Aggregate {
                        exact_material: found.provenance == Provenance::Exact,
                    },
                });
            }
        }

        None
    }

    /// Steps 1-2 at a single location. "Any material" means the earliest in source order.
    pub(crate) fn lookup_at(&self, location: &Location, fuel_type: FuelType, material: &Material) -> Option<Lookup<'_>> {
        let by_material = self.fuel_entries(location, fuel_type)?;
        if let Some(entry) = by_material.get(material) {
            return Some(Lookup {
                entry,
                provenance: Provenance::Exact,
            });
        }
        by_material
            .values()
            .min_by_key(|e| e.source_index)
            .map(|entry| Lookup {
                entry,
                provenance: Provenance::OtherMaterial,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::entry;
    use crate::domain::Reading;

    fn loc(name: &str) -> Location {
        Location::new(name).unwrap()
    }

    fn sample() -> Dataset {
        let mut ds = Dataset::default();
        ds.insert(entry("Punjab", FuelType::Pellet, "Husk", 7100, 0));
        ds.insert(entry("Punjab", FuelType::Pellet, "Standard", 7600, 1));
        ds.insert(entry("Kerala", FuelType::Briquette, "Standard", 6200, 2));
        ds.insert(entry("AVERAGE", FuelType::Pellet, "Standard", 7500, 3));
        ds.insert(entry("GLOBAL", FuelType::Briquette, "Sawdust", 6400, 4));
        ds
    }

    #[test]
    fn exact_match_is_not_a_fallback() {
        let ds = sample();
        let hit = ds.lookup(&loc("punjab"), FuelType::Pellet, &Material::new(Some("husk"))).unwrap();
        assert_eq!(hit.provenance, Provenance::Exact);
        assert!(!hit.is_fallback());
        assert_eq!(hit.entry.price, Reading::Value(7100));
    }

    #[test]
    fn other_material_prefers_earliest_source_row() {
        let ds = sample();
        let hit = ds.lookup(&loc("Punjab"), FuelType::Pellet, &Material::new(Some("Bamboo"))).unwrap();
        assert_eq!(hit.provenance, Provenance::OtherMaterial);
        assert_eq!(hit.entry.material.label(), "Husk");
    }

    #[test]
    fn missing_location_falls_back_to_average() {
        let ds = sample();
        let hit = ds.lookup(&loc("Kerala"), FuelType::Pellet, &Material::standard()).unwrap();
        assert_eq!(hit.provenance, Provenance::Aggregate { exact_material: true });
        assert!(hit.is_fallback());
        assert_eq!(hit.entry.location, Location::average());
        assert_eq!(hit.entry.price, Reading::Value(7500));
    }

    #[test]
    fn global_is_tried_after_average() {
        let ds = sample();
        let hit = ds.lookup(&loc("Goa"), FuelType::Briquette, &Material::standard()).unwrap();
        assert_eq!(hit.provenance, Provenance::Aggregate { exact_material: false });
        assert_eq!(hit.entry.location, Location::global());

        let avg = ds.lookup(&Location::average(), FuelType::Briquette, &Material::standard()).unwrap();
        assert_eq!(avg.entry.location, Location::global());
    }

    #[test]
    fn not_found_without_any_row_for_the_fuel_type() {
        let mut ds = Dataset::default();
        ds.insert(entry("Punjab", FuelType::Pellet, "Standard", 7600, 0));
        assert!(ds.lookup(&loc("Kerala"), FuelType::Briquette, &Material::standard()).is_none());
        assert!(ds.lookup(&loc("Kerala"), FuelType::Pellet, &Material::standard()).is_none());
    }
}
