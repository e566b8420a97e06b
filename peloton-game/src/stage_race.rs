//! Multi-stage classification: general, sprint and mountain ledgers.
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{STAGE_FATIGUE_STRIP, STAGE_POINTS, STAGE_RECOVERY_FLOOR};
use crate::course::PresetId;
use crate::rider::Rider;
use crate::state::RankingEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageType {
    Flat,
    Hilly,
    Mountain,
    Cobbles,
    Balanced,
}

impl StageType {
    #[must_use]
    pub const fn preset(self) -> PresetId {
        match self {
            Self::Flat => PresetId::Flat,
            Self::Hilly => PresetId::Hilly,
            Self::Mountain => PresetId::Mountain,
            Self::Cobbles => PresetId::Cobbles,
            Self::Balanced => PresetId::Balanced,
        }
    }

    /// Stages that feed the sprint ledger.
    #[must_use]
    pub const fn awards_sprint(self) -> bool {
        matches!(self, Self::Flat | Self::Cobbles)
    }

    /// Stages that feed the mountain ledger.
    #[must_use]
    pub const fn awards_mountain(self) -> bool {
        matches!(self, Self::Mountain | Self::Hilly)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSpec {
    pub stage_type: StageType,
    pub length: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ClassificationEntry {
    pub points: u32,
    pub stage_wins: u32,
    pub position_sum: u32,
}

pub type Ledger = BTreeMap<String, ClassificationEntry>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Jerseys {
    pub general: Option<String>,
    pub sprint: Option<String>,
    pub mountain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    pub stage_index: usize,
    pub stage_type: StageType,
    pub winner: Option<String>,
    pub order: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRaceState {
    pub stages: Vec<StageSpec>,
    pub current_stage: usize,
    #[serde(default)]
    pub general: Ledger,
    #[serde(default)]
    pub sprint: Ledger,
    #[serde(default)]
    pub mountain: Ledger,
    #[serde(default)]
    pub jerseys: Jerseys,
    #[serde(default)]
    pub history: Vec<StageResult>,
}

/// Points for a 1-based stage placing.
#[must_use]
pub fn stage_points(rank: u32) -> u32 {
    usize::try_from(rank)
        .ok()
        .and_then(|rank| rank.checked_sub(1))
        .and_then(|index| STAGE_POINTS.get(index).copied())
        .unwrap_or(0)
}

fn credit(ledger: &mut Ledger, entry: &RankingEntry) {
    let line = ledger.entry(entry.rider_id.clone()).or_default();
    line.points += stage_points(entry.final_rank);
    line.position_sum += entry.final_rank;
    if entry.final_rank == 1 {
        line.stage_wins += 1;
    }
}

/// Ledger leader: points desc, stage wins desc, position sum asc, id asc.
#[must_use]
pub fn ledger_leader(ledger: &Ledger) -> Option<String> {
    standings(ledger).into_iter().next().map(|(id, _)| id.to_string())
}

/// Ledger sorted by the jersey tie-break order.
#[must_use]
pub fn standings(ledger: &Ledger) -> Vec<(&str, &ClassificationEntry)> {
    let mut rows: Vec<(&str, &ClassificationEntry)> =
        ledger.iter().map(|(id, entry)| (id.as_str(), entry)).collect();
    rows.sort_by(|(id_a, a), (id_b, b)| {
        b.points
            .cmp(&a.points)
            .then(b.stage_wins.cmp(&a.stage_wins))
            .then(a.position_sum.cmp(&b.position_sum))
            .then(id_a.cmp(id_b))
    });
    rows
}

impl StageRaceState {
    #[must_use]
    pub fn new(stages: Vec<StageSpec>) -> Self {
        Self {
            stages,
            current_stage: 0,
            general: Ledger::new(),
            sprint: Ledger::new(),
            mountain: Ledger::new(),
            jerseys: Jerseys::default(),
            history: Vec::new(),
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<&StageSpec> {
        self.stages.get(self.current_stage)
    }

    /// All stages ran and were recorded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.history.len() >= self.stages.len()
    }

    /// Credit the finished stage to the ledgers and refresh the jerseys.
    /// A stage is only recorded once.
    pub fn record_stage(&mut self, rankings: &[RankingEntry]) {
        let Some(stage) = self.current().copied() else {
            return;
        };
        if self
            .history
            .iter()
            .any(|result| result.stage_index == self.current_stage)
        {
            return;
        }
        for entry in rankings {
            credit(&mut self.general, entry);
            if stage.stage_type.awards_sprint() {
                credit(&mut self.sprint, entry);
            }
            if stage.stage_type.awards_mountain() {
                credit(&mut self.mountain, entry);
            }
        }
        self.jerseys = Jerseys {
            general: ledger_leader(&self.general),
            sprint: ledger_leader(&self.sprint),
            mountain: ledger_leader(&self.mountain),
        };
        self.history.push(StageResult {
            stage_index: self.current_stage,
            stage_type: stage.stage_type,
            winner: rankings
                .iter()
                .find(|entry| entry.final_rank == 1)
                .map(|entry| entry.rider_id.clone()),
            order: rankings.iter().map(|entry| entry.rider_id.clone()).collect(),
        });
        debug!(
            "stage {} recorded; general leader {:?}",
            self.current_stage + 1,
            self.jerseys.general
        );
    }

    /// Step to the next stage once the current one is recorded.
    pub fn advance(&mut self) -> Option<StageSpec> {
        let recorded = self
            .history
            .iter()
            .any(|result| result.stage_index == self.current_stage);
        if !recorded || self.current_stage + 1 >= self.stages.len() {
            return None;
        }
        self.current_stage += 1;
        self.current().copied()
    }
}

/// Between stages: recover toward the floor, strip fatigue, rebuild the hand from
/// deck cards, refill pools and return to the start line.
pub fn prepare_rider_for_stage<R: Rng + ?Sized>(rider: &mut Rider, rng: &mut R) {
    rider.energy = rider.energy.max(STAGE_RECOVERY_FLOOR);
    rider.strip_fatigue(STAGE_FATIGUE_STRIP);
    rider.rebuild_hand(rng);
    rider.refill_power_cards();
    rider.position = 0;
    rider.has_finished = false;
    rider.finish_position = None;
    rider.finish_turn = None;
    rider.has_fallen_this_turn = false;
    rider.turns_to_skip = 0;
    rider.pending_wind_surcharge = 0;
    rider.sheltered = false;
    rider.race_event = None;
    rider.last_puncture_turn = None;
}
