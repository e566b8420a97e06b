//! Qualitative risk cue and the probability gates built on it.
use serde::{Deserialize, Serialize};

use super::{Personality, TacticalModifiers};
use super::analysis::RacePhase;
use crate::constants::AI_COBBLE_LOOKAHEAD;
use crate::course::Terrain;
use crate::energy::EnergyStatus;
use crate::numbers::clamp_probability;
use crate::rider::Rider;
use crate::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    const fn from_score(score: u8) -> Self {
        match score {
            0..=1 => Self::Low,
            2..=3 => Self::Medium,
            _ => Self::High,
        }
    }

    /// Share of a gated probability kept at this level for a given risk tolerance.
    #[must_use]
    pub fn damping(self, tolerance: f64) -> f64 {
        match self {
            Self::Low => 1.0,
            Self::Medium => 0.5 + 0.4 * tolerance,
            Self::High => 0.15 + 0.35 * tolerance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskKind {
    Calm,
    Terrain,
    Cobbles,
    Exposure,
    Weather,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCue {
    pub level: RiskLevel,
    pub reason: String,
    pub kind: RiskKind,
}

/// Rider alone at the front of its cell with nobody ahead to follow.
#[must_use]
pub fn is_exposed(state: &GameState, rider: &Rider) -> bool {
    if rider.position == 0 || state.course.terrain_at(rider.position).always_sheltered() {
        return false;
    }
    state.occupants(rider.position).len() == 1 && state.occupants(rider.position + 1).is_empty()
}

/// Read the dangers around a rider. The dominant contributor names the cue.
#[must_use]
pub fn assess_risk(state: &GameState, rider: &Rider) -> RiskCue {
    let mut contributions: Vec<(u8, RiskKind, String)> = Vec::new();

    let terrain = state.course.terrain_at(rider.position.max(1));
    match terrain {
        Terrain::Descent => contributions.push((2, RiskKind::Terrain, "descent".into())),
        Terrain::Mountain => contributions.push((1, RiskKind::Terrain, "climb".into())),
        _ => {}
    }

    let horizon = rider.position + AI_COBBLE_LOOKAHEAD;
    if !state.course.cobbles_between(rider.position, horizon).is_empty() {
        contributions.push((2, RiskKind::Cobbles, "cobbles ahead".into()));
    }

    if rider.pending_wind_surcharge > 0 {
        contributions.push((2, RiskKind::Exposure, "carrying wind surcharge".into()));
    } else if is_exposed(state, rider) {
        contributions.push((1, RiskKind::Exposure, "riding solo".into()));
    }

    let weather = state.weather.current;
    if weather.is_extreme() {
        contributions.push((2, RiskKind::Weather, weather.as_str().to_string()));
    } else if weather.is_wet() {
        contributions.push((1, RiskKind::Weather, weather.as_str().to_string()));
    }

    let score: u8 = contributions.iter().map(|(points, _, _)| *points).sum();
    let level = RiskLevel::from_score(score);
    // First of the highest contributions wins ties.
    let dominant = contributions
        .iter()
        .fold(None::<&(u8, RiskKind, String)>, |best, entry| match best {
            Some(current) if current.0 >= entry.0 => Some(current),
            _ => Some(entry),
        });
    match dominant {
        Some((_, kind, reason)) => RiskCue {
            level,
            reason: reason.clone(),
            kind: *kind,
        },
        None => RiskCue {
            level,
            reason: "calm".into(),
            kind: RiskKind::Calm,
        },
    }
}

const fn base_attack_appetite(personality: Personality, phase: RacePhase) -> f64 {
    match (personality, phase.is_decisive()) {
        (Personality::Attacker, false) => 0.55,
        (Personality::Attacker, true) => 0.8,
        (Personality::Opportunist, false) => 0.25,
        (Personality::Opportunist, true) => 0.7,
        (Personality::Balanced, false) => 0.2,
        (Personality::Balanced, true) => 0.5,
        (Personality::Conservative, false) => 0.05,
        (Personality::Conservative, true) => 0.35,
    }
}

/// Chance of committing an attack card.
#[must_use]
pub fn attack_probability(
    cue: &RiskCue,
    modifiers: TacticalModifiers,
    personality: Personality,
    phase: RacePhase,
    favorable_terrain: bool,
    status: EnergyStatus,
) -> f64 {
    let mut chance = base_attack_appetite(personality, phase) + modifiers.attack_bias;
    chance *= cue.level.damping(modifiers.risk_tolerance);
    if !favorable_terrain {
        chance *= 0.5;
    }
    if status != EnergyStatus::Normal {
        chance *= 0.3;
    }
    clamp_probability(chance)
}

/// Chance of accepting a move that ends alone in the wind.
#[must_use]
pub fn wind_acceptance_probability(cue: &RiskCue, modifiers: TacticalModifiers, phase: RacePhase) -> f64 {
    let phase_push = if phase.is_decisive() { 0.25 } else { 0.0 };
    clamp_probability((modifiers.wind_acceptance + phase_push) * cue.level.damping(modifiers.risk_tolerance))
}

/// Chance of playing the strongest card rather than a steady mid-value one.
#[must_use]
pub fn high_card_probability(cue: &RiskCue, modifiers: TacticalModifiers, energy: u8) -> f64 {
    let reserve = f64::from(energy) / 100.0;
    clamp_probability((0.35 + 0.4 * reserve + modifiers.attack_bias) * cue.level.damping(modifiers.risk_tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::TacticalProfile;
    use crate::state::fixtures::{rider_at, state_with};
    use crate::rider::RiderType;
    use crate::weather::Weather;

    #[test]
    fn calm_flat_is_low_risk() {
        let state = state_with(
            &[Terrain::Flat; 20],
            vec![
                rider_at("a-1", "a", RiderType::Rouleur, 5),
                rider_at("b-1", "b", RiderType::Rouleur, 5),
            ],
        );
        let cue = assess_risk(&state, &state.riders[0]);
        assert_eq!(cue.level, RiskLevel::Low);
        assert_eq!(cue.kind, RiskKind::Calm);
    }

    #[test]
    fn descent_in_storm_is_high_risk() {
        let mut terrain = vec![Terrain::Flat; 5];
        terrain.extend([Terrain::Descent; 10]);
        let mut state = state_with(&terrain, vec![rider_at("a-1", "a", RiderType::Climber, 8)]);
        state.weather.current = Weather::Storm;
        let cue = assess_risk(&state, &state.riders[0]);
        assert_eq!(cue.level, RiskLevel::High);
        assert_eq!(cue.kind, RiskKind::Terrain);
    }

    #[test]
    fn solo_rider_and_cobbles_raise_risk() {
        let mut state = state_with(&[Terrain::Flat; 20], vec![rider_at("a-1", "a", RiderType::Rouleur, 5)]);
        assert!(is_exposed(&state, &state.riders[0]));
        assert_eq!(assess_risk(&state, &state.riders[0]).kind, RiskKind::Exposure);
        state.course.cells[7].is_cobblestone = true;
        let cue = assess_risk(&state, &state.riders[0]);
        assert_eq!(cue.kind, RiskKind::Cobbles);
        assert_eq!(cue.level, RiskLevel::Medium);
    }

    #[test]
    fn gates_shrink_with_risk() {
        let modifiers = TacticalProfile::Balanced.modifiers();
        let low = RiskCue { level: RiskLevel::Low, reason: "calm".into(), kind: RiskKind::Calm };
        let high = RiskCue { level: RiskLevel::High, reason: "storm".into(), kind: RiskKind::Weather };
        let calm = attack_probability(&low, modifiers, Personality::Attacker, RacePhase::Final, true, EnergyStatus::Normal);
        let risky = attack_probability(&high, modifiers, Personality::Attacker, RacePhase::Final, true, EnergyStatus::Normal);
        let tired = attack_probability(&low, modifiers, Personality::Attacker, RacePhase::Final, false, EnergyStatus::Tired);
        assert!(calm > risky);
        assert!(calm > tired);
        assert!(wind_acceptance_probability(&low, modifiers, RacePhase::Early)
            > wind_acceptance_probability(&high, modifiers, RacePhase::Early));
        for energy in [0, 50, 100] {
            let chance = high_card_probability(&high, TacticalProfile::Opportunistic.modifiers(), energy);
            assert!((0.0..=1.0).contains(&chance));
        }
    }
}
