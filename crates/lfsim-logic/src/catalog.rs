//! Entity catalog — the row table the optimizer works on.
//!
//! A catalog is built once per lifeform/class pairing from raw dataset rows
//! (see [`crate::dataset`]), validated, then owned exclusively by one
//! simulator for the duration of a run. `level` is the only field that
//! changes afterwards.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lifeform::Lifeform;

/// Entity classification. Buildings are lifeform-specific and never receive
/// the technology amplifier; technologies occupy one of the shared slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Building,
    Technology { slot: u8 },
}

impl EntityKind {
    pub fn is_building(&self) -> bool {
        matches!(self, EntityKind::Building)
    }
}

/// One bonus definition: percent-per-level curve parameters and an optional
/// cap on the computed fraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonusSlot {
    pub base: f64,
    pub factor: f64,
    pub cap: Option<f64>,
}

/// Which resources an entity's bonus applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFlags {
    pub metal: bool,
    pub crystal: bool,
    pub deuterium: bool,
    pub expeditions: bool,
}

impl ResourceFlags {
    pub fn any(&self) -> bool {
        self.metal || self.crystal || self.deuterium || self.expeditions
    }
}

/// One upgradeable entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub kind: EntityKind,
    pub lifeform: Lifeform,
    /// Current level; the only field mutated during a simulation run.
    pub level: u32,
    /// Base cost per resource (metal, crystal, deuterium).
    pub base_cost: [f64; 3],
    /// Cost growth factor per level.
    pub cost_factor: f64,
    /// Primary bonus slot; read first.
    pub bonus: BonusSlot,
    /// Secondary slot for entities with two distinct resource bonuses.
    pub bonus2: Option<BonusSlot>,
    pub flags: ResourceFlags,
    /// The entity's value multiplies every non-building entity's bonus.
    pub tech_amplifier: bool,
    /// The entity's value multiplies every expedition-flagged entity's bonus.
    pub expo_amplifier: bool,
    /// Expedition bonus rewards ships rather than raw resources.
    pub ship_reward: bool,
    /// Base cost collapsed to deuterium standard units.
    pub dse_base_cost: f64,
}

impl Entity {
    pub fn is_amplifier(&self) -> bool {
        self.tech_amplifier || self.expo_amplifier
    }

    /// Bonus slot by index. A second flagged resource reuses the primary
    /// slot when no secondary slot exists.
    pub fn slot(&self, idx: usize) -> &BonusSlot {
        if idx == 0 {
            &self.bonus
        } else {
            self.bonus2.as_ref().unwrap_or(&self.bonus)
        }
    }
}

/// Validated, filtered entity table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<Entity>,
}

impl Catalog {
    /// Validate and seal a set of entries.
    ///
    /// Fails on duplicate names, on more than one expedition amplifier, on
    /// rows without any bonus to amortize and on an empty table. Degenerate
    /// rows are expected to have been dropped by the dataset builder before
    /// this point, so hitting one here is a caller error.
    pub fn new(entries: Vec<Entity>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        let mut expo_amplifier: Option<&str> = None;
        for entity in &entries {
            if !seen.insert(entity.name.as_str()) {
                return Err(CatalogError::DuplicateName(entity.name.clone()));
            }
            if entity.expo_amplifier {
                if let Some(first) = expo_amplifier {
                    return Err(CatalogError::DuplicateExpoAmplifier(
                        first.to_string(),
                        entity.name.clone(),
                    ));
                }
                expo_amplifier = Some(&entity.name);
            }
            if !entity.flags.any() && !entity.is_amplifier() {
                return Err(CatalogError::NoBonus(entity.name.clone()));
            }
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entity] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [Entity] {
        &mut self.entries
    }

    /// Per-entity level assignment, in catalog order.
    pub fn levels(&self) -> Vec<(String, u32)> {
        self.entries
            .iter()
            .map(|e| (e.name.clone(), e.level))
            .collect()
    }
}

/// Configuration-shape errors raised while building a catalog. All of them
/// are fatal to the run being configured; no partial catalog is ever
/// simulated.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog dataset is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown entity kind `{kind}` on row `{name}`")]
    UnknownKind { name: String, kind: String },
    #[error("unknown lifeform `{lifeform}` on row `{name}`")]
    UnknownLifeform { name: String, lifeform: String },
    #[error("row `{0}` is missing its first bonus slot")]
    MissingBonus(String),
    #[error("duplicate entity name `{0}`")]
    DuplicateName(String),
    #[error("two expedition amplifiers in one catalog: `{0}` and `{1}`")]
    DuplicateExpoAmplifier(String, String),
    #[error("entity `{0}` has no resource flags and is not an amplifier")]
    NoBonus(String),
    #[error("catalog is empty after filtering")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(name: &str) -> Entity {
        Entity {
            name: name.to_string(),
            kind: EntityKind::Building,
            lifeform: Lifeform::Human,
            level: 0,
            base_cost: [100.0, 0.0, 0.0],
            cost_factor: 1.2,
            bonus: BonusSlot {
                base: 1.0,
                factor: 1.0,
                cap: None,
            },
            bonus2: None,
            flags: ResourceFlags {
                metal: true,
                ..ResourceFlags::default()
            },
            tech_amplifier: false,
            expo_amplifier: false,
            ship_reward: false,
            dse_base_cost: 100.0 / 2.7,
        }
    }

    #[test]
    fn test_valid_catalog_is_accepted() {
        let catalog = Catalog::new(vec![entity("A"), entity("B")]).expect("valid");
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let err = Catalog::new(vec![entity("A"), entity("A")]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateName(name) if name == "A"));
    }

    #[test]
    fn test_two_expedition_amplifiers_are_rejected() {
        let mut a = entity("A");
        a.expo_amplifier = true;
        a.flags = ResourceFlags::default();
        let mut b = entity("B");
        b.expo_amplifier = true;
        b.flags = ResourceFlags::default();
        let err = Catalog::new(vec![a, b]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateExpoAmplifier(..)));
    }

    #[test]
    fn test_empty_catalog_is_rejected() {
        assert!(matches!(Catalog::new(Vec::new()), Err(CatalogError::Empty)));
    }

    #[test]
    fn test_flagless_non_amplifier_is_rejected() {
        let mut a = entity("A");
        a.flags = ResourceFlags::default();
        let err = Catalog::new(vec![a]).unwrap_err();
        assert!(matches!(err, CatalogError::NoBonus(name) if name == "A"));
    }

    #[test]
    fn test_levels_preserve_catalog_order() {
        let mut a = entity("A");
        a.level = 3;
        let catalog = Catalog::new(vec![a, entity("B")]).expect("valid");
        assert_eq!(
            catalog.levels(),
            vec![("A".to_string(), 3), ("B".to_string(), 0)]
        );
    }
}
