//! Resource units — exchange rates and the deuterium standard unit (DSE).
//!
//! Costs and bonuses come in heterogeneous metal/crystal/deuterium triples.
//! Everything the optimizer compares is first collapsed to one scalar by
//! dividing each magnitude by its exchange rate and summing.

use serde::{Deserialize, Serialize};

/// Index order for per-resource arrays throughout the crate.
pub const METAL: usize = 0;
pub const CRYSTAL: usize = 1;
pub const DEUTERIUM: usize = 2;

/// Expedition income weighting, enabled for Discoverer-class runs.
///
/// Part of a discoverer's income arrives via expeditions rather than mines,
/// so expedition bonuses only touch the expedition share of each resource
/// and mine bonuses only touch the complement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpoIncomeModel {
    /// Share of each resource's total income earned through expeditions.
    pub resource_share: [f64; 3],
    /// Split of expedition value between ship rewards and resource finds.
    pub ship_share: [f64; 2],
}

/// Immutable economic configuration for one simulation run.
///
/// Passed in at construction so independent runs can carry independent
/// configurations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Metal/crystal/deuterium exchange rates used for DSE conversion.
    pub exchange: [f64; 3],
    /// Expedition income weighting; `None` disables it entirely.
    pub expo_income: Option<ExpoIncomeModel>,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self::collector()
    }
}

impl EconomyConfig {
    /// Collector-class economy: all income from mines.
    pub fn collector() -> Self {
        Self {
            exchange: [2.7, 1.7, 1.0],
            expo_income: None,
        }
    }

    /// Discoverer-class economy: part of the income arrives via expeditions.
    pub fn discoverer() -> Self {
        Self {
            exchange: [2.7, 1.7, 1.0],
            expo_income: Some(ExpoIncomeModel {
                resource_share: [0.5, 0.4, 0.25],
                ship_share: [0.4, 0.6],
            }),
        }
    }

    /// Collapse a metal/crystal/deuterium triple into deuterium standard
    /// units.
    pub fn dse(&self, amounts: [f64; 3]) -> f64 {
        amounts
            .iter()
            .zip(self.exchange.iter())
            .map(|(amount, rate)| amount / rate)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dse_divides_by_exchange_rates() {
        let econ = EconomyConfig::collector();
        assert!((econ.dse([2.7, 1.7, 1.0]) - 3.0).abs() < 1e-12);
        assert!((econ.dse([5.4, 0.0, 0.0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_dse_of_nothing_is_zero() {
        let econ = EconomyConfig::collector();
        assert_eq!(econ.dse([0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_collector_has_no_expedition_model() {
        assert!(EconomyConfig::collector().expo_income.is_none());
    }

    #[test]
    fn test_discoverer_shares_are_fractions() {
        let econ = EconomyConfig::discoverer();
        let model = econ.expo_income.expect("discoverer carries the model");
        for share in model.resource_share {
            assert!(share > 0.0 && share < 1.0);
        }
        assert!((model.ship_share[0] + model.ship_share[1] - 1.0).abs() < 1e-12);
    }
}
