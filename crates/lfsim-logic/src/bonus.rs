//! Bonus and cost curves.
//!
//! Every function here is pure: it reads an entity snapshot plus the current
//! amplifier pair and returns numbers. The simulator calls these both for
//! the real catalog state and for hypothetical amplifier values during the
//! amplifier what-if evaluation, so nothing in this module may mutate
//! anything.

use crate::catalog::{BonusSlot, Entity};
use crate::units::EconomyConfig;

/// Cumulative cost/value curve shared by costs and bonus magnitudes.
///
/// `offset = 0` evaluates the value already reached at `level`; `offset = 1`
/// the value after one more purchase. Level 0 at offset 0 is exactly zero.
pub fn level_cost(base: f64, factor: f64, level: u32, offset: u32) -> f64 {
    let level = level as f64;
    let offset = offset as f64;
    base * factor.powf(level - 1.0 + offset) * (level + offset)
}

/// Capped bonus fraction contributed by one slot at `level + offset`.
///
/// Slot figures are percent-per-level, so the curve value is divided by 100
/// before the cap is applied.
fn slot_value(slot: &BonusSlot, level: u32, offset: u32) -> f64 {
    let raw = level_cost(slot.base, slot.factor, level, offset) / 100.0;
    match slot.cap {
        Some(cap) => raw.min(cap),
        None => raw,
    }
}

/// Current global amplifier values, as fractions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Amplifiers {
    pub tech: f64,
    pub expo: f64,
}

/// An amplifier entity's own capped value. Amplifiers always carry their
/// figures in the primary slot.
pub fn amplifier_value(entity: &Entity, offset: u32) -> f64 {
    slot_value(&entity.bonus, entity.level, offset)
}

/// Per-resource bonus fractions granted by `entity` at `level + offset`
/// under the given amplifier pair.
pub fn bonus_fractions(
    entity: &Entity,
    econ: &EconomyConfig,
    amps: &Amplifiers,
    offset: u32,
) -> [f64; 3] {
    let tech_mult = if entity.kind.is_building() {
        1.0
    } else {
        1.0 + amps.tech
    };
    let mut out = [0.0; 3];
    let mut slot_idx = 0;
    let flagged = [
        entity.flags.metal,
        entity.flags.crystal,
        entity.flags.deuterium,
    ];
    for (res, &has_bonus) in flagged.iter().enumerate() {
        if has_bonus {
            out[res] = slot_value(entity.slot(slot_idx), entity.level, offset) * tech_mult;
            if entity.bonus2.is_some() && slot_idx == 0 {
                slot_idx = 1;
            }
        }
    }
    if entity.flags.expeditions {
        // Expeditions grant a blended reward: one value broadcast across all
        // three base resources, raised further by the expedition amplifier.
        let value =
            slot_value(entity.slot(slot_idx), entity.level, offset) * tech_mult * (1.0 + amps.expo);
        out = [value, value, value];
    }
    if let Some(model) = &econ.expo_income {
        if entity.flags.expeditions {
            let ship = if entity.ship_reward {
                model.ship_share[0]
            } else {
                model.ship_share[1]
            };
            for (res, value) in out.iter_mut().enumerate() {
                *value *= model.resource_share[res] * ship;
            }
        } else {
            for (res, value) in out.iter_mut().enumerate() {
                *value *= 1.0 - model.resource_share[res];
            }
        }
    }
    out
}

/// DSE-valued bonus of one entity at `level + offset`.
pub fn dse_bonus(entity: &Entity, econ: &EconomyConfig, amps: &Amplifiers, offset: u32) -> f64 {
    econ.dse(bonus_fractions(entity, econ, amps, offset))
}
