//! Energy status thresholds, movement cost and recovery.
use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::constants::{
    ADAPTED_COST_FACTOR, DESCENT_RECOVERY_PER_CELL, EXHAUSTED_MAX, SUMMIT_BONUS,
    TIRED_CARD_PENALTY, TIRED_MAX,
};
use crate::course::Terrain;
use crate::numbers::{clamp_energy, round_f64_to_i32};
use crate::rider::RiderType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnergyStatus {
    #[default]
    Normal,
    Tired,
    Exhausted,
    Fringale,
}

impl EnergyStatus {
    #[must_use]
    pub const fn from_energy(energy: u8) -> Self {
        if energy == 0 {
            Self::Fringale
        } else if energy <= EXHAUSTED_MAX {
            Self::Exhausted
        } else if energy <= TIRED_MAX {
            Self::Tired
        } else {
            Self::Normal
        }
    }

    /// Archetype terrain bonuses are disabled below the tired band.
    #[must_use]
    pub const fn terrain_bonus_enabled(self) -> bool {
        matches!(self, Self::Normal | Self::Tired)
    }

    /// Attack and specialty cards are unusable once exhausted.
    #[must_use]
    pub const fn can_use_power_cards(self) -> bool {
        matches!(self, Self::Normal | Self::Tired)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Tired => "tired",
            Self::Exhausted => "exhausted",
            Self::Fringale => "fringale",
        }
    }
}

/// Card value after the energy-status penalty, or `None` when the card cannot be played.
#[must_use]
pub fn adjusted_card_value(card: &Card, status: EnergyStatus) -> Option<u8> {
    if !card.is_power_card() {
        return Some(card.value());
    }
    match status {
        EnergyStatus::Normal => Some(card.value()),
        EnergyStatus::Tired => Some(card.value().saturating_sub(TIRED_CARD_PENALTY)),
        EnergyStatus::Exhausted | EnergyStatus::Fringale => None,
    }
}

/// Inputs to [`movement_cost`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveCost {
    pub terrain: Terrain,
    pub distance: u32,
    pub rider_type: Option<RiderType>,
    pub card_cost: u8,
    pub specialty_cost: u8,
    pub wind_surcharge: u8,
    pub event_penalty: u8,
    pub crossed_summit: bool,
}

/// Energy consumed by a move, rounded half away from zero and never negative.
#[must_use]
pub fn movement_cost(input: &MoveCost) -> u32 {
    let mut cost = input.terrain.base_energy_cost() * f64::from(input.distance);
    if input.rider_type.is_some_and(|rt| rt.is_adapted(input.terrain)) {
        cost *= ADAPTED_COST_FACTOR;
    }
    cost += f64::from(input.card_cost)
        + f64::from(input.specialty_cost)
        + f64::from(input.wind_surcharge)
        + f64::from(input.event_penalty);
    if input.crossed_summit && input.rider_type == Some(RiderType::Climber) {
        cost -= SUMMIT_BONUS;
    }
    u32::try_from(round_f64_to_i32(cost).max(0)).unwrap_or(0)
}

/// Energy regained when a move starts on descent terrain.
#[must_use]
pub fn descent_recovery(start_terrain: Terrain, distance: u32) -> u32 {
    if start_terrain == Terrain::Descent {
        distance * u32::from(DESCENT_RECOVERY_PER_CELL)
    } else {
        0
    }
}

/// Apply a signed delta and clamp into `[0, 100]`.
#[must_use]
pub fn apply_energy_delta(energy: u8, delta: i32) -> u8 {
    clamp_energy(i32::from(energy).saturating_add(delta))
}
