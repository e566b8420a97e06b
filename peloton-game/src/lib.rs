//! Peloton Race Engine
//!
//! Platform-agnostic core logic for the Peloton turn-based cycling race.
//! This crate provides course generation, the card and energy model, the turn
//! state machine, end-of-turn peloton effects, the AI and stage-race
//! classification without UI or platform-specific dependencies.

pub mod ai;
pub mod card;
pub mod config;
pub mod constants;
pub mod course;
pub mod energy;
pub mod engine;
pub mod numbers;
pub mod race_event;
pub mod rider;
pub mod rng;
pub mod seed;
pub mod session;
pub mod stage_race;
pub mod state;
pub mod weather;

// Re-export commonly used types
pub use ai::{
    AiConfig, AiDecision, AiOutcome, Difficulty, Personality, RaceAnalysis, RacePhase, RiskCue,
    RiskKind, RiskLevel, Role, RoleAssignment, TacticalProfile, decide,
};
pub use card::{Card, CardId, CardKind, MovementOrigin};
pub use config::{ConfigError, Controller, GameConfig, PlayerConfig, RiderSpec};
pub use course::{
    Cell, Course, CoursePreset, CourseViolation, PresetId, Terrain, generate_course,
    validate_course,
};
pub use energy::EnergyStatus;
pub use engine::{
    acknowledge_end_turn, advance_stage, choose_specialty, compute_rankings, new_race,
    resolve_movement, rest_rider, roll_dice, select_card, select_rider,
};
pub use race_event::{ActiveRaceEvent, RaceEventKind, RaceEventState};
pub use rider::{Rider, RiderType};
pub use rng::{RngBundle, StreamDraws, StreamSeeds};
pub use seed::{decode_race_code, encode_race_code, generate_race_code, parse_seed_token};
pub use session::RaceSession;
pub use stage_race::{StageRaceState, StageSpec, StageType};
pub use state::{EndTurnEffect, GameState, MovementResult, RankingEntry, Team, TurnPhase};
pub use weather::{Weather, WeatherState};
