// Entity Reference Model - the legal entities journal entries can post to
//
// Pure reference data: built once at process start, passed by reference into
// the batch, never mutated. The registry is injected rather than global so
// tests can substitute their own table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::vocab::{Division, Market};

// ============================================================================
// ENTITY
// ============================================================================

/// One legal entity in the group.
///
/// `business_unit_code` is the unique integer the ledger knows the entity by;
/// `abbreviation` is the short display name used in descriptions and export
/// file names. The major market/state/division are the dimensions stamped on
/// intercompany clearing lines for this entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub business_unit_code: u32,
    pub name: String,
    pub abbreviation: String,
    pub major_market: Market,
    pub major_state: String,
    pub major_division: Division,
}

impl Entity {
    pub fn new(
        business_unit_code: u32,
        name: &str,
        abbreviation: &str,
        major_market: Market,
        major_state: &str,
        major_division: Division,
    ) -> Self {
        Entity {
            business_unit_code,
            name: name.to_string(),
            abbreviation: abbreviation.to_string(),
            major_market,
            major_state: major_state.to_string(),
            major_division,
        }
    }
}

// ============================================================================
// ENTITY REGISTRY
// ============================================================================

/// Lookup table from entity code ("E1".."E18") to entity.
///
/// Immutable after construction. `EntityRegistry::default()` carries the
/// production table; `from_entries` lets tests build a fixture registry.
pub struct EntityRegistry {
    entities: HashMap<String, Entity>,
}

impl EntityRegistry {
    /// Build a registry from explicit (code, entity) pairs.
    pub fn from_entries(entries: Vec<(&str, Entity)>) -> Self {
        EntityRegistry {
            entities: entries
                .into_iter()
                .map(|(code, entity)| (code.to_string(), entity))
                .collect(),
        }
    }

    /// Look up an entity by its code.
    pub fn get(&self, code: &str) -> Option<&Entity> {
        self.entities.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entities.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All known entity codes, sorted for stable display.
    pub fn codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.entities.keys().cloned().collect();
        codes.sort();
        codes
    }
}

impl Default for EntityRegistry {
    /// The production entity table.
    ///
    /// States have no vocabulary type because they are universal and do not
    /// change.
    fn default() -> Self {
        EntityRegistry::from_entries(vec![
            (
                "E1",
                Entity::new(1007, "NebulaSolutions", "NS", Market::Phoenix, "AZ", Division::One),
            ),
            (
                "E2",
                Entity::new(1023, "StellarGlobe", "SG", Market::Pittsburgh, "PA", Division::Two),
            ),
            (
                "E3",
                Entity::new(1016, "DynamicHorizon", "HF", Market::DesMoines, "IA", Division::Three),
            ),
            (
                "E4",
                Entity::new(1015, "InfiniteVista", "IV", Market::Tampa, "FL", Division::Four),
            ),
            (
                "E5",
                Entity::new(1011, "FusionPulse", "FP", Market::Denver, "CO", Division::Three),
            ),
            (
                "E6",
                Entity::new(1001, "SynergyPeak", "SP", Market::SouthCalifornia, "CA", Division::One),
            ),
            (
                "E7",
                Entity::new(1003, "ZenithWave", "ZW", Market::LasVegas, "NV", Division::One),
            ),
            (
                "E8",
                Entity::new(1002, "PinnacleCrest", "PC", Market::NorthCalifornia, "CA", Division::One),
            ),
            (
                "E9",
                Entity::new(1008, "NexusStrive", "NS", Market::Boise, "ID", Division::One),
            ),
            (
                "E10",
                Entity::new(1021, "VisionaryVista", "VV", Market::Boston, "MA", Division::Two),
            ),
            (
                "E11",
                Entity::new(1022, "CatalystCore", "CC", Market::Corporate, "ALL", Division::Six),
            ),
            (
                "E12",
                Entity::new(1020, "ZenithQuotient", "ZQ", Market::NyUpstate, "NY", Division::Two),
            ),
            (
                "E13",
                Entity::new(1019, "ApexWave", "AW", Market::Philadelphia, "PA", Division::Two),
            ),
            (
                "E14",
                Entity::new(1018, "EclipticEdge", "EE", Market::Indiana, "IN", Division::Five),
            ),
            (
                "E15",
                Entity::new(1017, "MomentumStride", "MS", Market::Dallas, "TX", Division::Three),
            ),
            (
                "E16",
                Entity::new(1004, "FusionFlare", "FF", Market::SaltLake, "UT", Division::One),
            ),
            (
                "E17",
                Entity::new(1009, "EclipsePulse", "EP", Market::Corporate, "ALL", Division::Six),
            ),
            (
                "E18",
                Entity::new(1005, "NovaSphere", "NS", Market::Seattle, "WA", Division::One),
            ),
        ])
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_all_entities() {
        let registry = EntityRegistry::default();
        assert_eq!(registry.len(), 18);
        for n in 1..=18 {
            assert!(registry.contains(&format!("E{n}")));
        }
    }

    #[test]
    fn test_get_entity_fields() {
        let registry = EntityRegistry::default();
        let e1 = registry.get("E1").unwrap();
        assert_eq!(e1.business_unit_code, 1007);
        assert_eq!(e1.name, "NebulaSolutions");
        assert_eq!(e1.abbreviation, "NS");
        assert_eq!(e1.major_market, Market::Phoenix);
        assert_eq!(e1.major_state, "AZ");
        assert_eq!(e1.major_division, Division::One);
    }

    #[test]
    fn test_unknown_code_is_none() {
        let registry = EntityRegistry::default();
        assert!(registry.get("E99").is_none());
        assert!(registry.get("").is_none());
    }

    #[test]
    fn test_business_unit_codes_are_unique() {
        let registry = EntityRegistry::default();
        let mut codes: Vec<u32> = registry
            .codes()
            .iter()
            .map(|c| registry.get(c).unwrap().business_unit_code)
            .collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 18);
    }

    #[test]
    fn test_fixture_registry() {
        let registry = EntityRegistry::from_entries(vec![(
            "T1",
            Entity::new(9001, "TestCo", "TC", Market::Omaha, "NE", Division::Two),
        )]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("T1").unwrap().abbreviation, "TC");
        assert_eq!(registry.codes(), vec!["T1".to_string()]);
    }
}
