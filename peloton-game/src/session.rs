//! Owned race session: configuration, RNG streams and the live snapshot behind one handle.
use crate::ai::{self, AiConfig, AiOutcome};
use crate::card::CardId;
use crate::config::{ConfigError, GameConfig};
use crate::engine;
use crate::rng::RngBundle;
use crate::state::{GameState, TurnPhase};

/// Caller-owned race context binding a configuration, its RNG streams and the live snapshot.
#[derive(Debug, Clone)]
pub struct RaceSession {
    config: GameConfig,
    rngs: RngBundle,
    state: GameState,
}

impl RaceSession {
    /// Validate the configuration, seed the streams and build the opening state.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration is invalid.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let rngs = RngBundle::with_overrides(config.seed, config.stream_seeds);
        let state = engine::new_race(&config, &rngs)?;
        Ok(Self {
            config,
            rngs,
            state,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Borrow the current snapshot.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Borrow the RNG streams, e.g. to read draw counters.
    #[must_use]
    pub const fn rngs(&self) -> &RngBundle {
        &self.rngs
    }

    pub fn select_rider(&mut self, rider_id: &str) -> &GameState {
        self.state = engine::select_rider(&self.state, rider_id);
        &self.state
    }

    pub fn select_card(&mut self, card_id: CardId) -> &GameState {
        self.state = engine::select_card(&self.state, card_id);
        &self.state
    }

    pub fn roll_dice(&mut self) -> &GameState {
        self.state = engine::roll_dice(&self.state, &self.rngs);
        &self.state
    }

    pub fn choose_specialty(&mut self, use_it: bool) -> &GameState {
        self.state = engine::choose_specialty(&self.state, use_it);
        &self.state
    }

    pub fn resolve_movement(&mut self) -> &GameState {
        self.state = engine::resolve_movement(&self.state, &self.rngs);
        &self.state
    }

    pub fn rest_rider(&mut self) -> &GameState {
        self.state = engine::rest_rider(&self.state, &self.rngs);
        &self.state
    }

    pub fn acknowledge_end_turn(&mut self) -> &GameState {
        self.state = engine::acknowledge_end_turn(&self.state, &self.rngs);
        &self.state
    }

    /// Start the next stage of a finished stage race.
    pub fn advance_stage(&mut self) -> &GameState {
        self.state = engine::advance_stage(&self.state, &self.rngs);
        &self.state
    }

    /// Team and AI settings expected to act next, if an AI is up.
    /// Any AI team may close the end-of-turn phase.
    #[must_use]
    pub fn ai_in_control(&self) -> Option<(String, AiConfig)> {
        let team = match self.state.turn_phase {
            TurnPhase::Finished => None,
            TurnPhase::EndTurnEffects => self
                .state
                .teams
                .iter()
                .find(|team| team.controller.ai_config().is_some()),
            _ => self.state.teams.get(self.state.current_team),
        }?;
        let config = team.controller.ai_config().copied()?;
        Some((team.id.clone(), config))
    }

    /// Let the AI in control take one decision and apply it.
    pub fn step_ai(&mut self) -> Option<AiOutcome> {
        let (team, config) = self.ai_in_control()?;
        let outcome = ai::decide(&self.state, &team, &config, &self.rngs)?;
        self.state = outcome.decision.apply(&self.state, &self.rngs);
        Some(outcome)
    }

    /// Consume the session, returning the final snapshot.
    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }
}
