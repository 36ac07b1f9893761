//! Dataset loading — spreadsheet-shaped rows to a filtered, validated
//! catalog.
//!
//! The raw dataset mirrors the upstream spreadsheet: one JSON object per
//! entity with per-resource base costs, up to two bonus slot definitions and
//! a free-text description. Resource applicability is derived from
//! resource-name substrings in the description, a handful of known quirk
//! rows are fixed up, then the rows are filtered down to one lifeform/class
//! pairing.

use std::collections::HashMap;

use serde::Deserialize;

use crate::catalog::{BonusSlot, Catalog, CatalogError, Entity, EntityKind, ResourceFlags};
use crate::lifeform::{Lifeform, PlayerClass, TECH_SLOTS};
use crate::units::EconomyConfig;

/// Entities whose value multiplies every technology's bonus.
pub const TECH_AMPLIFIERS: [&str; 3] = [
    "Metropolis",
    "High-Performance Transformer",
    "Chip Mass Production",
];

/// The single entity whose value multiplies expedition gains.
pub const EXPO_AMPLIFIER: &str = "Telekinetic Tractor Beam";

/// Carries its amplification figures in slot 2; slot 1 is an energy bonus
/// the optimizer never reads.
const SLOT_TWO_AMPLIFIER: &str = "High-Performance Transformer";

/// Grants the flat collector production share. Applies to all three
/// resources at a quarter of the listed value; the crawler share is negated
/// by the crawler hard cap.
const COLLECTOR_ENHANCEMENT: &str = "Rock'tal Collector Enhancement";

/// One raw dataset row, as stored in `data/lifeform_catalog.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEntry {
    pub name: String,
    pub lifeform: String,
    /// `"Building"` or `"Technology <slot>"`.
    pub kind: String,
    pub description: String,
    pub metal_base_cost: f64,
    pub crystal_base_cost: f64,
    pub deut_base_cost: f64,
    pub cost_factor: f64,
    #[serde(default)]
    pub bonus1: Option<RawBonus>,
    #[serde(default)]
    pub bonus2: Option<RawBonus>,
}

/// Raw bonus slot figures.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawBonus {
    pub base_value: f64,
    pub increase_factor: f64,
    #[serde(default)]
    pub max: Option<f64>,
}

impl From<RawBonus> for BonusSlot {
    fn from(raw: RawBonus) -> Self {
        Self {
            base: raw.base_value,
            factor: raw.increase_factor,
            cap: raw.max,
        }
    }
}

/// Parse the JSON dataset into raw rows.
pub fn parse_entries(json: &str) -> Result<Vec<RawEntry>, CatalogError> {
    Ok(serde_json::from_str(json)?)
}

fn parse_kind(row: &RawEntry) -> Result<EntityKind, CatalogError> {
    if row.kind == "Building" {
        return Ok(EntityKind::Building);
    }
    if let Some(slot) = row.kind.strip_prefix("Technology ") {
        if let Ok(slot) = slot.parse::<u8>() {
            if (1..=TECH_SLOTS as u8).contains(&slot) {
                return Ok(EntityKind::Technology { slot });
            }
        }
    }
    Err(CatalogError::UnknownKind {
        name: row.name.clone(),
        kind: row.kind.clone(),
    })
}

fn derive_flags(description: &str) -> ResourceFlags {
    let text = description.to_ascii_lowercase();
    ResourceFlags {
        metal: text.contains("metal"),
        crystal: text.contains("crystal"),
        deuterium: text.contains("deuterium"),
        expeditions: text.contains("expedition"),
    }
}

/// Build the catalog for one lifeform/class pairing.
///
/// Keeps the lifeform's own buildings plus the technologies occupying the
/// class's slot layout, derives resource flags from descriptions, applies
/// the known quirk fixups, silently drops rows without any bonus and seals
/// the result. Malformed rows fail the build; no partial catalog is ever
/// returned.
pub fn build_catalog(
    rows: &[RawEntry],
    lifeform: Lifeform,
    class: PlayerClass,
    start_levels: &HashMap<String, u32>,
    econ: &EconomyConfig,
) -> Result<Catalog, CatalogError> {
    let slots = class.tech_slots();
    let mut entries = Vec::new();
    for row in rows {
        let kind = parse_kind(row)?;
        let row_lifeform: Lifeform =
            row.lifeform
                .parse()
                .map_err(|_| CatalogError::UnknownLifeform {
                    name: row.name.clone(),
                    lifeform: row.lifeform.clone(),
                })?;
        let keep = match kind {
            EntityKind::Building => row_lifeform == lifeform,
            EntityKind::Technology { slot } => slots[(slot - 1) as usize] == row_lifeform,
        };
        if !keep {
            continue;
        }

        let mut bonus = row.bonus1.map(BonusSlot::from);
        let mut bonus2 = row.bonus2.map(BonusSlot::from);
        if row.name == SLOT_TWO_AMPLIFIER {
            if let Some(second) = bonus2.take() {
                bonus = Some(second);
            }
        }

        let mut flags = derive_flags(&row.description);
        let tech_amplifier = TECH_AMPLIFIERS.contains(&row.name.as_str());
        let expo_amplifier = row.name == EXPO_AMPLIFIER;
        if tech_amplifier || expo_amplifier {
            // An amplifier's value is the amplification itself, never a
            // direct resource gain.
            flags = ResourceFlags::default();
        }

        if row.name == COLLECTOR_ENHANCEMENT && class == PlayerClass::Collector {
            flags.metal = true;
            flags.crystal = true;
            flags.deuterium = true;
            if let Some(slot) = bonus.as_mut() {
                slot.base *= 0.25;
            }
        }

        if !flags.any() && !tech_amplifier && !expo_amplifier {
            // Nothing to amortize; dropped, not an error.
            continue;
        }

        let bonus = bonus.ok_or_else(|| CatalogError::MissingBonus(row.name.clone()))?;
        let base_cost = [row.metal_base_cost, row.crystal_base_cost, row.deut_base_cost];
        entries.push(Entity {
            name: row.name.clone(),
            kind,
            lifeform: row_lifeform,
            level: start_levels.get(&row.name).copied().unwrap_or(0),
            base_cost,
            cost_factor: row.cost_factor,
            bonus,
            bonus2,
            flags,
            tech_amplifier,
            expo_amplifier,
            ship_reward: row.description.to_ascii_lowercase().contains("ship"),
            dse_base_cost: econ.dse(base_cost),
        });
    }
    Catalog::new(entries)
}

/// Parse and build in one call.
pub fn load_catalog(
    json: &str,
    lifeform: Lifeform,
    class: PlayerClass,
    start_levels: &HashMap<String, u32>,
    econ: &EconomyConfig,
) -> Result<Catalog, CatalogError> {
    let rows = parse_entries(json)?;
    build_catalog(&rows, lifeform, class, start_levels, econ)
}
