//! Lifeform and class identity — which buildings and technology slots a run
//! uses.
//!
//! A run simulates one lifeform's buildings plus the 18 technologies the
//! account has slotted. Slot assignments depend on the account class: the
//! Collector layout is the proven mining setup, the Discoverer layout trades
//! part of the mining tail for Kaelesh expedition technologies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of technology slots an account can fill.
pub const TECH_SLOTS: usize = 18;

/// The four playable lifeforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifeform {
    Human,
    Rocktal,
    Mecha,
    Kaelesh,
}

impl Lifeform {
    /// All lifeforms, in the order runs are driven.
    pub const ALL: [Lifeform; 4] = [
        Lifeform::Human,
        Lifeform::Rocktal,
        Lifeform::Mecha,
        Lifeform::Kaelesh,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Lifeform::Human => "Human",
            Lifeform::Rocktal => "Rock'tal",
            Lifeform::Mecha => "Mecha",
            Lifeform::Kaelesh => "Kaelesh",
        }
    }
}

impl fmt::Display for Lifeform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
#[error("unknown lifeform `{0}`; expected human, rocktal, mecha or kaelesh")]
pub struct ParseLifeformError(String);

impl FromStr for Lifeform {
    type Err = ParseLifeformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" | "humans" => Ok(Lifeform::Human),
            "rocktal" | "rock'tal" => Ok(Lifeform::Rocktal),
            "mecha" | "mechas" => Ok(Lifeform::Mecha),
            "kaelesh" => Ok(Lifeform::Kaelesh),
            _ => Err(ParseLifeformError(s.to_string())),
        }
    }
}

/// Account class; selects the technology slot layout and whether the
/// expedition income model applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerClass {
    Collector,
    Discoverer,
}

impl PlayerClass {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerClass::Collector => "Collector",
            PlayerClass::Discoverer => "Discoverer",
        }
    }

    /// Which lifeform's technology occupies each of the 18 slots.
    pub fn tech_slots(&self) -> [Lifeform; TECH_SLOTS] {
        use Lifeform::*;
        match self {
            // The mining layout: Rock'tal production techs everywhere they
            // pay off, amplifiers kept.
            PlayerClass::Collector => [
                Mecha, Human, Rocktal, Rocktal, Rocktal, Mecha, Rocktal, Human, Rocktal, Rocktal,
                Rocktal, Kaelesh, Mecha, Kaelesh, Rocktal, Rocktal, Human, Rocktal,
            ],
            // Expedition layout: Kaelesh discovery techs replace the mining
            // tail, amplifiers and core production slots kept.
            PlayerClass::Discoverer => [
                Mecha, Human, Kaelesh, Rocktal, Kaelesh, Mecha, Rocktal, Human, Kaelesh, Rocktal,
                Kaelesh, Kaelesh, Mecha, Kaelesh, Rocktal, Kaelesh, Human, Kaelesh,
            ],
        }
    }
}

impl fmt::Display for PlayerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
#[error("unknown class `{0}`; expected collector or discoverer")]
pub struct ParseClassError(String);

impl FromStr for PlayerClass {
    type Err = ParseClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "collector" => Ok(PlayerClass::Collector),
            "discoverer" => Ok(PlayerClass::Discoverer),
            _ => Err(ParseClassError(s.to_string())),
        }
    }
}
