//! Race reading recomputed before every AI decision.
use serde::{Deserialize, Serialize};

use crate::constants::{
    AI_CARD_WEIGHT, AI_EARLY_SHARE, AI_ENERGY_WEIGHT, AI_FINAL_CELLS, AI_MIDDLE_SHARE,
    AI_POSITION_WEIGHT,
};
use crate::numbers::usize_to_f64;
use crate::rider::Rider;
use crate::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RacePhase {
    Early,
    Middle,
    Final,
    Sprint,
}

impl RacePhase {
    /// Classify by the race leader's remaining distance.
    #[must_use]
    pub fn classify(remaining: u32, course_length: u32) -> Self {
        let share = if course_length == 0 {
            0.0
        } else {
            f64::from(remaining) / f64::from(course_length)
        };
        if share > AI_EARLY_SHARE {
            Self::Early
        } else if share > AI_MIDDLE_SHARE {
            Self::Middle
        } else if remaining > AI_FINAL_CELLS {
            Self::Final
        } else {
            Self::Sprint
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Early => "early",
            Self::Middle => "middle",
            Self::Final => "final",
            Self::Sprint => "sprint",
        }
    }

    #[must_use]
    pub const fn is_decisive(self) -> bool {
        matches!(self, Self::Final | Self::Sprint)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Leader,
    FreeRider,
    Domestique,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub rider_id: String,
    pub role: Role,
    pub potential: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceAnalysis {
    pub leader_position: u32,
    pub peloton_center: f64,
    pub best_own_rider: Option<String>,
    pub nearest_opponent: Option<String>,
    pub gap_to_leader: u32,
    pub phase: RacePhase,
}

/// Strength estimate from position, energy and cards left.
#[must_use]
pub fn rider_potential(rider: &Rider) -> f64 {
    let cards = rider.hand.len() + rider.attack_cards.len() + rider.specialty_cards.len();
    f64::from(rider.position) * AI_POSITION_WEIGHT
        + f64::from(rider.energy) * AI_ENERGY_WEIGHT
        + usize_to_f64(cards) * AI_CARD_WEIGHT
}

fn racing(state: &GameState) -> impl Iterator<Item = &Rider> {
    state.riders.iter().filter(|rider| !rider.has_finished)
}

/// Snapshot of the race from one team's point of view.
#[must_use]
pub fn analyze_race(state: &GameState, team: &str) -> RaceAnalysis {
    let finish = state.course.finish_line();
    let leader_position = racing(state)
        .map(|rider| rider.position)
        .max()
        .unwrap_or(finish);
    let count = racing(state).count();
    let peloton_center = if count == 0 {
        f64::from(finish)
    } else {
        racing(state).map(|rider| f64::from(rider.position)).sum::<f64>() / usize_to_f64(count)
    };

    let best = racing(state)
        .filter(|rider| rider.team == team)
        .max_by(|a, b| rider_potential(a).total_cmp(&rider_potential(b)).then(b.id.cmp(&a.id)));
    let nearest_opponent = best.and_then(|own| {
        racing(state)
            .filter(|rider| rider.team != team)
            .min_by_key(|rider| (rider.position.abs_diff(own.position), rider.arrival_order))
            .map(|rider| rider.id.clone())
    });

    RaceAnalysis {
        leader_position,
        peloton_center,
        best_own_rider: best.map(|rider| rider.id.clone()),
        nearest_opponent,
        gap_to_leader: best.map_or(0, |own| leader_position.saturating_sub(own.position)),
        phase: RacePhase::classify(finish.saturating_sub(leader_position), finish),
    }
}

/// Best potential leads, second rides free, everyone else works.
#[must_use]
pub fn assign_roles(state: &GameState, team: &str) -> Vec<RoleAssignment> {
    let mut ranked: Vec<(&Rider, f64)> = racing(state)
        .filter(|rider| rider.team == team)
        .map(|rider| (rider, rider_potential(rider)))
        .collect();
    ranked.sort_by(|(a, pa), (b, pb)| pb.total_cmp(pa).then(a.id.cmp(&b.id)));
    ranked
        .into_iter()
        .enumerate()
        .map(|(rank, (rider, potential))| RoleAssignment {
            rider_id: rider.id.clone(),
            role: match rank {
                0 => Role::Leader,
                1 => Role::FreeRider,
                _ => Role::Domestique,
            },
            potential,
        })
        .collect()
}

#[must_use]
pub fn role_of(roles: &[RoleAssignment], rider_id: &str) -> Role {
    roles
        .iter()
        .find(|assignment| assignment.rider_id == rider_id)
        .map_or(Role::Domestique, |assignment| assignment.role)
}
