//! Race state aggregate and the records transitions emit.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use twox_hash::XxHash64;

use crate::card::CardId;
use crate::config::Controller;
use crate::course::{Course, PresetId};
use crate::race_event::{RaceEventKind, RaceEventState};
use crate::rider::Rider;
use crate::stage_race::StageRaceState;
use crate::weather::WeatherState;

const DIGEST_SEED: u64 = 0x7065_6c6f_746f_6e00;

/// Riders sharing one cell, front of the cell first.
pub type Occupants = SmallVec<[usize; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    #[default]
    SelectRider,
    SelectCard,
    RollDice,
    SelectSpecialty,
    Resolve,
    EndTurnEffects,
    Finished,
}

impl TurnPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SelectRider => "select_rider",
            Self::SelectCard => "select_card",
            Self::RollDice => "roll_dice",
            Self::SelectSpecialty => "select_specialty",
            Self::Resolve => "resolve",
            Self::EndTurnEffects => "end_turn_effects",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub controller: Controller,
}

/// Outcome of the last rider action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MovementResult {
    Moved {
        rider_id: String,
        from: u32,
        to: u32,
        movement: i32,
        energy_spent: u32,
        energy_recovered: u32,
        finished: bool,
        specialty_used: bool,
        cobble_puncture: bool,
    },
    /// Not enough energy; nothing was spent.
    Rejected {
        rider_id: String,
        required: u32,
        available: u8,
        movement: i32,
    },
    Fell {
        rider_id: String,
        from: u32,
        to: u32,
        fatigue_cards: u8,
    },
    Recovered {
        rider_id: String,
        energy_gained: u8,
    },
    Rested {
        rider_id: String,
        energy_gained: u8,
    },
}

impl MovementResult {
    #[must_use]
    pub fn rider_id(&self) -> &str {
        match self {
            Self::Moved { rider_id, .. }
            | Self::Rejected { rider_id, .. }
            | Self::Fell { rider_id, .. }
            | Self::Recovered { rider_id, .. }
            | Self::Rested { rider_id, .. } => rider_id,
        }
    }

    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// One record of the end-of-turn pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum EndTurnEffect {
    Aspiration {
        rider_ids: Vec<String>,
        from: u32,
        to: u32,
    },
    Wind {
        rider_id: String,
        position: u32,
        card_value: u8,
        surcharge: u8,
    },
    Shelter {
        rider_id: String,
        position: u32,
        /// `None` on mountain terrain where shelter carries no bonus.
        card_value: Option<u8>,
        recovery: u8,
    },
    RaceEvent {
        rider_id: String,
        kind: RaceEventKind,
    },
    EventExpired {
        rider_id: String,
        kind: RaceEventKind,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub rider_id: String,
    pub team: String,
    pub final_rank: u32,
    pub position: u32,
    pub finish_position: Option<u32>,
    pub finish_turn: Option<u32>,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub seed: u64,
    pub preset: PresetId,
    pub course: Course,
    pub riders: Vec<Rider>,
    pub teams: Vec<Team>,
    #[serde(default)]
    pub turn: u32,
    #[serde(default)]
    pub current_team: usize,
    #[serde(default)]
    pub turn_phase: TurnPhase,
    #[serde(default)]
    pub selected_rider: Option<String>,
    #[serde(default)]
    pub selected_card: Option<CardId>,
    #[serde(default)]
    pub selected_specialty: Option<CardId>,
    #[serde(default)]
    pub played_this_turn: Vec<String>,
    #[serde(default)]
    pub last_dice_roll: Option<u8>,
    #[serde(default)]
    pub last_movement: Option<MovementResult>,
    #[serde(default)]
    pub end_turn_effects: Vec<EndTurnEffect>,
    #[serde(default)]
    pub race_events: RaceEventState,
    #[serde(default)]
    pub weather: WeatherState,
    #[serde(default)]
    pub stage_race: Option<StageRaceState>,
    #[serde(default)]
    pub rankings: Vec<RankingEntry>,
    #[serde(default)]
    pub is_last_turn: bool,
    #[serde(default)]
    pub finish_counter: u32,
    #[serde(default)]
    pub arrival_counter: u64,
    #[serde(default)]
    pub logs: Vec<String>,
}

impl GameState {
    #[must_use]
    pub fn rider(&self, rider_id: &str) -> Option<&Rider> {
        self.riders.iter().find(|rider| rider.id == rider_id)
    }

    pub fn rider_mut(&mut self, rider_id: &str) -> Option<&mut Rider> {
        self.riders.iter_mut().find(|rider| rider.id == rider_id)
    }

    #[must_use]
    pub fn rider_index(&self, rider_id: &str) -> Option<usize> {
        self.riders.iter().position(|rider| rider.id == rider_id)
    }

    #[must_use]
    pub fn current_team_id(&self) -> Option<&str> {
        self.teams.get(self.current_team).map(|team| team.id.as_str())
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Rider> {
        self.selected_rider.as_deref().and_then(|id| self.rider(id))
    }

    #[must_use]
    pub fn has_played(&self, rider_id: &str) -> bool {
        self.played_this_turn.iter().any(|id| id == rider_id)
    }

    /// May act this turn: racing, not yet played.
    #[must_use]
    pub fn is_eligible(&self, rider: &Rider) -> bool {
        rider.can_race() && !self.has_played(&rider.id)
    }

    #[must_use]
    pub fn team_has_eligible(&self, team_index: usize) -> bool {
        self.teams.get(team_index).is_some_and(|team| {
            self.riders
                .iter()
                .any(|rider| rider.team == team.id && self.is_eligible(rider))
        })
    }

    /// Non-finished riders on a real cell, front of the cell first.
    #[must_use]
    pub fn occupants(&self, position: u32) -> Occupants {
        let mut found: Occupants = self
            .riders
            .iter()
            .enumerate()
            .filter(|(_, rider)| !rider.has_finished && rider.position == position)
            .map(|(index, _)| index)
            .collect();
        found.sort_by_key(|index| self.riders[*index].arrival_order);
        found
    }

    /// Distinct positions (excluding the start line) holding non-finished riders, ascending.
    #[must_use]
    pub fn occupied_positions(&self) -> Vec<u32> {
        let mut positions: Vec<u32> = self
            .riders
            .iter()
            .filter(|rider| !rider.has_finished && rider.position > 0)
            .map(|rider| rider.position)
            .collect();
        positions.sort_unstable();
        positions.dedup();
        positions
    }

    /// Next value of the race-wide arrival counter.
    pub fn next_arrival(&mut self) -> u64 {
        self.arrival_counter += 1;
        self.arrival_counter
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.turn_phase == TurnPhase::Finished
    }

    #[must_use]
    pub fn all_finished(&self) -> bool {
        self.riders.iter().all(|rider| rider.has_finished)
    }

    pub fn push_log(&mut self, key: impl Into<String>) {
        self.logs.push(key.into());
    }

    /// Stable fingerprint of the full snapshot.
    #[must_use]
    pub fn digest(&self) -> u64 {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        XxHash64::oneshot(DIGEST_SEED, &bytes)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{rider_at, state_with};
    use super::*;
    use crate::course::Terrain;
    use crate::rider::RiderType;

    fn sample_state() -> GameState {
        let mut state = state_with(
            &[Terrain::Flat; 10],
            vec![
                rider_at("a-1", "a", RiderType::Rouleur, 3),
                rider_at("a-2", "a", RiderType::Climber, 3),
                rider_at("b-1", "b", RiderType::Sprinter, 3),
            ],
        );
        for (order, rider) in state.riders.iter_mut().enumerate() {
            rider.arrival_order = 10 - order as u64;
        }
        state.arrival_counter = 10;
        state
    }

    #[test]
    fn occupants_are_ordered_by_arrival() {
        let state = sample_state();
        let occupants = state.occupants(3);
        let ids: Vec<&str> = occupants.iter().map(|i| state.riders[*i].id.as_str()).collect();
        assert_eq!(ids, vec!["b-1", "a-2", "a-1"]);
        assert!(state.occupants(4).is_empty());
        assert_eq!(state.occupied_positions(), vec![3]);
    }

    #[test]
    fn eligibility_tracks_play_and_skip() {
        let mut state = sample_state();
        assert!(state.team_has_eligible(0));
        state.played_this_turn.push("b-1".into());
        assert!(!state.team_has_eligible(1));
        state.riders[0].turns_to_skip = 1;
        assert!(state.team_has_eligible(0));
        state.riders[1].has_finished = true;
        assert!(!state.team_has_eligible(0));
    }

    #[test]
    fn digest_is_stable_and_sensitive() {
        let state = sample_state();
        assert_eq!(state.digest(), state.clone().digest());
        let mut moved = state.clone();
        moved.riders[0].position = 4;
        assert_ne!(state.digest(), moved.digest());
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let state = sample_state();
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
