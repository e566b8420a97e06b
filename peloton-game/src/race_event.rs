//! Transient race incidents attached to a single rider.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    COBBLE_PUNCTURE_BASE, COBBLE_PUNCTURE_CRITICAL_ENERGY, COBBLE_PUNCTURE_LOW_ENERGY,
    COBBLE_PUNCTURE_SHELTER_FACTOR, CRASH_DURATION, CRASH_ENERGY_PENALTY, CRASH_MOVEMENT_CAP,
    EVENT_BASE_CHANCE, EVENT_COBBLE_WEIGHT, EVENT_DESCENT_FACTOR, EVENT_DESCENT_WEIGHT,
    EVENT_EXPOSED_WEIGHT, EVENT_MOUNTAIN_FACTOR, EXHAUSTED_MAX, MECHANICAL_CARD_PENALTY,
    MECHANICAL_DURATION, PUNCTURE_DURATION, PUNCTURE_ENERGY_PENALTY, TIRED_MAX,
};
use crate::course::Terrain;
use crate::numbers::clamp_probability;
use crate::weather::Weather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaceEventKind {
    Puncture,
    Crash,
    Mechanical,
}

impl RaceEventKind {
    pub const ALL: [Self; 3] = [Self::Puncture, Self::Crash, Self::Mechanical];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Puncture => "puncture",
            Self::Crash => "crash",
            Self::Mechanical => "mechanical",
        }
    }

    /// Turns the event stays active after the turn it was granted.
    #[must_use]
    pub const fn duration(self) -> u8 {
        match self {
            Self::Puncture => PUNCTURE_DURATION,
            Self::Crash => CRASH_DURATION,
            Self::Mechanical => MECHANICAL_DURATION,
        }
    }

    /// Extra energy charged on every move while active.
    #[must_use]
    pub const fn energy_penalty(self) -> u8 {
        match self {
            Self::Puncture => PUNCTURE_ENERGY_PENALTY,
            Self::Crash => CRASH_ENERGY_PENALTY,
            Self::Mechanical => 0,
        }
    }

    /// Hard cap on movement while active.
    #[must_use]
    pub const fn movement_cap(self) -> Option<i32> {
        match self {
            Self::Crash => Some(CRASH_MOVEMENT_CAP),
            Self::Puncture | Self::Mechanical => None,
        }
    }

    /// Reduction applied to end-of-turn shelter cards.
    #[must_use]
    pub const fn card_penalty(self) -> u8 {
        match self {
            Self::Mechanical => MECHANICAL_CARD_PENALTY,
            Self::Puncture | Self::Crash => 0,
        }
    }

    fn base_weight(self, terrain: Terrain, on_cobbles: bool) -> u32 {
        match self {
            Self::Puncture => 4 + if on_cobbles { 3 } else { 0 },
            Self::Crash => 2 + if terrain == Terrain::Descent { 3 } else { 0 },
            Self::Mechanical => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RaceEventSource {
    #[default]
    Incident,
    Cobbles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRaceEvent {
    pub kind: RaceEventKind,
    pub turns_remaining: u8,
    pub started_turn: u32,
    #[serde(default)]
    pub source: RaceEventSource,
}

impl ActiveRaceEvent {
    #[must_use]
    pub const fn new(kind: RaceEventKind, turn: u32, source: RaceEventSource) -> Self {
        Self {
            kind,
            turns_remaining: kind.duration(),
            started_turn: turn,
            source,
        }
    }
}

/// Race-wide incident bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RaceEventState {
    pub cooldown: u8,
    pub last_event_turn: Option<u32>,
    pub last_cobble_puncture_turn: Option<u32>,
}

impl RaceEventState {
    #[must_use]
    pub fn cobble_puncture_granted(&self, turn: u32) -> bool {
        self.last_cobble_puncture_turn == Some(turn)
    }
}

/// Per-cell puncture odds while crossing cobblestones.
#[must_use]
pub fn cobble_puncture_chance(energy: u8, sheltered: bool, weather: Weather) -> f64 {
    let mut chance = COBBLE_PUNCTURE_BASE;
    if energy <= TIRED_MAX {
        chance += COBBLE_PUNCTURE_LOW_ENERGY;
    }
    if energy <= EXHAUSTED_MAX {
        chance += COBBLE_PUNCTURE_CRITICAL_ENERGY;
    }
    if sheltered {
        chance *= COBBLE_PUNCTURE_SHELTER_FACTOR;
    }
    clamp_probability(chance * weather.puncture_multiplier())
}

/// End-of-turn incident odds for a rider on `terrain`.
#[must_use]
pub fn incident_chance(terrain: Terrain, weather: Weather) -> f64 {
    let terrain_factor = match terrain {
        Terrain::Descent => EVENT_DESCENT_FACTOR,
        Terrain::Mountain => EVENT_MOUNTAIN_FACTOR,
        Terrain::Flat | Terrain::Hill | Terrain::Sprint => 1.0,
    };
    clamp_probability(EVENT_BASE_CHANCE * terrain_factor * weather.incident_multiplier())
}

/// Selection weight for an incident candidate.
#[must_use]
pub fn candidate_weight(exposed: bool, terrain: Terrain, on_cobbles: bool) -> f64 {
    let mut weight = 1.0;
    if exposed {
        weight *= EVENT_EXPOSED_WEIGHT;
    }
    if terrain == Terrain::Descent {
        weight *= EVENT_DESCENT_WEIGHT;
    }
    if on_cobbles {
        weight *= EVENT_COBBLE_WEIGHT;
    }
    weight
}

/// Weighted index pick; `None` when there is nothing to pick from.
pub fn pick_weighted_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    let total: f64 = weights.iter().filter(|w| w.is_finite() && **w > 0.0).sum();
    if total <= 0.0 {
        return None;
    }
    let mut roll = rng.r#gen::<f64>() * total;
    let mut last = None;
    for (index, weight) in weights.iter().enumerate() {
        if !weight.is_finite() || *weight <= 0.0 {
            continue;
        }
        last = Some(index);
        if roll < *weight {
            return Some(index);
        }
        roll -= weight;
    }
    last
}

/// Choose which incident strikes a rider.
pub fn roll_event_kind<R: Rng + ?Sized>(terrain: Terrain, on_cobbles: bool, rng: &mut R) -> RaceEventKind {
    let weights = RaceEventKind::ALL.map(|kind| f64::from(kind.base_weight(terrain, on_cobbles)));
    pick_weighted_index(&weights, rng)
        .and_then(|index| RaceEventKind::ALL.get(index).copied())
        .unwrap_or(RaceEventKind::Puncture)
}

/// Count down an active event. Events granted during `turn` are left untouched.
/// Returns the kind that expired, if any.
pub fn tick_event(slot: &mut Option<ActiveRaceEvent>, turn: u32) -> Option<RaceEventKind> {
    let event = slot.as_mut()?;
    if event.started_turn == turn {
        return None;
    }
    event.turns_remaining = event.turns_remaining.saturating_sub(1);
    if event.turns_remaining == 0 {
        slot.take().map(|expired| expired.kind)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn event_lasts_exactly_its_duration() {
        for kind in RaceEventKind::ALL {
            let granted_turn = 4;
            let mut slot = Some(ActiveRaceEvent::new(kind, granted_turn, RaceEventSource::Incident));
            assert_eq!(tick_event(&mut slot, granted_turn), None);
            let mut active_turns = 0;
            let mut turn = granted_turn;
            while slot.is_some() {
                turn += 1;
                active_turns += 1;
                tick_event(&mut slot, turn);
            }
            assert_eq!(active_turns, u32::from(kind.duration()), "{kind:?}");
        }
    }

    #[test]
    fn puncture_odds_follow_energy_and_shelter() {
        let fresh = cobble_puncture_chance(100, false, Weather::Clear);
        let tired = cobble_puncture_chance(40, false, Weather::Clear);
        let critical = cobble_puncture_chance(20, false, Weather::Clear);
        let sheltered = cobble_puncture_chance(100, true, Weather::Clear);
        let wet = cobble_puncture_chance(100, false, Weather::Rain);
        assert!((fresh - 0.10).abs() < 1e-9);
        assert!((tired - 0.15).abs() < 1e-9);
        assert!((critical - 0.25).abs() < 1e-9);
        assert!((sheltered - 0.05).abs() < 1e-9);
        assert!((wet - 0.15).abs() < 1e-9);
    }

    #[test]
    fn incident_odds_are_probabilities() {
        for terrain in Terrain::ALL {
            for weather in [Weather::Clear, Weather::Rain, Weather::Storm] {
                let chance = incident_chance(terrain, weather);
                assert!((0.0..=1.0).contains(&chance));
            }
        }
        assert!(incident_chance(Terrain::Descent, Weather::Clear) > incident_chance(Terrain::Flat, Weather::Clear));
    }

    #[test]
    fn weighted_pick_skips_zero_weights() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(pick_weighted_index(&[0.0, 2.0, 0.0], &mut rng), Some(1));
        }
        assert_eq!(pick_weighted_index(&[], &mut rng), None);
        assert_eq!(pick_weighted_index(&[0.0], &mut rng), None);
    }

    #[test]
    fn effects_are_per_variant() {
        assert_eq!(RaceEventKind::Crash.movement_cap(), Some(1));
        assert_eq!(RaceEventKind::Crash.energy_penalty(), 5);
        assert_eq!(RaceEventKind::Puncture.energy_penalty(), 2);
        assert_eq!(RaceEventKind::Mechanical.card_penalty(), 1);
        assert_eq!(RaceEventKind::Puncture.movement_cap(), None);
    }
}
