//! Headless AI-only races driven to completion under turn and step budgets.
use log::debug;
use serde::Serialize;
use thiserror::Error;

use peloton_game::stage_race::Jerseys;
use peloton_game::{
    ConfigError, GameConfig, GameState, PresetId, RaceSession, StageSpec, StageType, StreamDraws,
};

use super::invariants::check_state;

pub const DEFAULT_TEAMS: usize = 3;
pub const DEFAULT_MAX_TURNS: u32 = 200;
pub const DEFAULT_MAX_STEPS: usize = 50_000;

/// One headless race to drive to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationPlan {
    pub preset: PresetId,
    pub seed: u64,
    pub race_code: Option<String>,
    pub max_turns: u32,
    pub max_steps: usize,
    pub stage_race: Option<Vec<StageSpec>>,
}

impl SimulationPlan {
    #[must_use]
    pub const fn new(preset: PresetId, seed: u64) -> Self {
        Self {
            preset,
            seed,
            race_code: None,
            max_turns: DEFAULT_MAX_TURNS,
            max_steps: DEFAULT_MAX_STEPS,
            stage_race: None,
        }
    }

    #[must_use]
    pub const fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    #[must_use]
    pub fn with_race_code(mut self, code: Option<String>) -> Self {
        self.race_code = code;
        self
    }

    /// Run a three-stage tour opening on the plan's preset.
    #[must_use]
    pub fn with_stage_race(mut self) -> Self {
        let opener = match self.preset {
            PresetId::Flat => StageType::Flat,
            PresetId::Hilly => StageType::Hilly,
            PresetId::Mountain => StageType::Mountain,
            PresetId::Balanced => StageType::Balanced,
            PresetId::Cobbles => StageType::Cobbles,
        };
        self.stage_race = Some(vec![
            StageSpec { stage_type: opener, length: 60 },
            StageSpec { stage_type: StageType::Mountain, length: 60 },
            StageSpec { stage_type: StageType::Flat, length: 60 },
        ]);
        self
    }

    #[must_use]
    pub fn label(&self) -> String {
        match &self.race_code {
            Some(code) => format!("{} {code}", self.preset),
            None => format!("{} seed {}", self.preset, self.seed),
        }
    }
}

/// Where a run was when it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureContext {
    pub preset: PresetId,
    pub seed: u64,
    pub turn: u32,
    pub last_action: String,
}

impl std::fmt::Display for FailureContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} seed {} turn {} after {}",
            self.preset, self.seed, self.turn, self.last_action
        )
    }
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("turn budget of {budget} exceeded ({context})")]
    TurnBudgetExceeded { budget: u32, context: FailureContext },
    #[error("step budget of {budget} exceeded ({context})")]
    StepBudgetExceeded { budget: usize, context: FailureContext },
    #[error("invariant violated: {detail} ({context})")]
    InvariantViolation { detail: String, context: FailureContext },
    #[error("no controller could act ({context})")]
    Stalemate { context: FailureContext },
}

/// Outcome of a completed race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaceSummary {
    pub preset: PresetId,
    pub seed: u64,
    pub race_code: Option<String>,
    pub turns: u32,
    pub steps: usize,
    pub stages: usize,
    pub winner: Option<String>,
    pub winning_team: Option<String>,
    pub finishers: usize,
    pub riders: usize,
    pub jerseys: Option<Jerseys>,
    pub digest: u64,
    pub draws: StreamDraws,
}

/// All-AI configuration for a preset and seed.
#[must_use]
pub fn build_game_from_preset(preset: PresetId, seed: u64) -> GameConfig {
    GameConfig::ai_race(preset, seed, DEFAULT_TEAMS)
}

fn plan_config(plan: &SimulationPlan) -> GameConfig {
    GameConfig {
        stage_race: plan.stage_race.clone(),
        ..build_game_from_preset(plan.preset, plan.seed)
    }
}

/// Drive a race with AI controllers until it finishes, checking invariants after every step.
///
/// # Errors
///
/// Returns `SimulationError` when a budget runs out, an invariant breaks or nobody can act.
pub fn run_full_game(plan: &SimulationPlan) -> Result<RaceSummary, SimulationError> {
    let mut session = RaceSession::new(plan_config(plan))?;
    let mut steps = 0_usize;
    let mut turns = 0_u32;
    let mut last_action = String::from("start");
    let context = |state: &GameState, last_action: &str| FailureContext {
        preset: plan.preset,
        seed: plan.seed,
        turn: state.turn,
        last_action: last_action.to_string(),
    };

    check_state(session.state()).map_err(|detail| SimulationError::InvariantViolation {
        detail,
        context: context(session.state(), &last_action),
    })?;

    loop {
        if session.state().is_finished() {
            turns += session.state().turn;
            let more_stages = session
                .state()
                .stage_race
                .as_ref()
                .is_some_and(|race| !race.is_complete());
            if !more_stages {
                break;
            }
            session.advance_stage();
            last_action = String::from("advance stage");
            debug!("{}: next stage", plan.label());
            continue;
        }
        if steps >= plan.max_steps {
            return Err(SimulationError::StepBudgetExceeded {
                budget: plan.max_steps,
                context: context(session.state(), &last_action),
            });
        }
        if session.state().turn > plan.max_turns {
            return Err(SimulationError::TurnBudgetExceeded {
                budget: plan.max_turns,
                context: context(session.state(), &last_action),
            });
        }
        let Some(outcome) = session.step_ai() else {
            return Err(SimulationError::Stalemate {
                context: context(session.state(), &last_action),
            });
        };
        steps += 1;
        last_action = outcome.decision.to_string();
        check_state(session.state()).map_err(|detail| SimulationError::InvariantViolation {
            detail,
            context: context(session.state(), &last_action),
        })?;
    }

    Ok(summarize(plan, &session, turns, steps))
}

fn summarize(plan: &SimulationPlan, session: &RaceSession, turns: u32, steps: usize) -> RaceSummary {
    let state = session.state();
    let (winner, jerseys, stages) = match &state.stage_race {
        Some(race) => (
            race.jerseys.general.clone(),
            Some(race.jerseys.clone()),
            race.history.len(),
        ),
        None => (
            state.rankings.first().map(|entry| entry.rider_id.clone()),
            None,
            1,
        ),
    };
    let winning_team = winner
        .as_deref()
        .and_then(|id| state.rider(id))
        .map(|rider| rider.team.clone());
    RaceSummary {
        preset: plan.preset,
        seed: plan.seed,
        race_code: plan.race_code.clone(),
        turns,
        steps,
        stages,
        winner,
        winning_team,
        finishers: state.riders.iter().filter(|rider| rider.has_finished).count(),
        riders: state.riders.len(),
        jerseys,
        digest: state.digest(),
        draws: session.rngs().draws(),
    }
}
