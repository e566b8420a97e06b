//! Centralized balance and tuning constants for the Peloton race engine.
//!
//! These values define the deterministic math for the core simulation.
//! Keeping them together ensures that balance can only be adjusted via
//! code changes reviewed in version control.

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_RACE_START: &str = "log.race.start";
pub(crate) const LOG_MOVE: &str = "log.race.move";
pub(crate) const LOG_MOVE_REJECTED: &str = "log.race.move-rejected";
pub(crate) const LOG_FRINGALE_RECOVER: &str = "log.race.fringale";
pub(crate) const LOG_REST: &str = "log.race.rest";
pub(crate) const LOG_FALL: &str = "log.race.fall";
pub(crate) const LOG_FINISH: &str = "log.race.finish";
pub(crate) const LOG_LAST_TURN: &str = "log.race.last-turn";
pub(crate) const LOG_ASPIRATION: &str = "log.race.aspiration";
pub(crate) const LOG_WIND: &str = "log.race.wind";
pub(crate) const LOG_SHELTER: &str = "log.race.shelter";
pub(crate) const LOG_COBBLE_PUNCTURE: &str = "log.race.cobble-puncture";
pub(crate) const LOG_EVENT_PREFIX: &str = "log.event.";
pub(crate) const LOG_EVENT_EXPIRED_PREFIX: &str = "log.event.expired.";
pub(crate) const LOG_WEATHER_PREFIX: &str = "log.weather.";
pub(crate) const LOG_TURN_START: &str = "log.race.turn";
pub(crate) const LOG_RACE_FINISHED: &str = "log.race.finished";
pub(crate) const LOG_STAGE_START: &str = "log.stage.start";

// Energy -------------------------------------------------------------------
pub const ENERGY_MAX: u8 = 100;
pub const ENERGY_MIN: u8 = 0;
pub(crate) const TIRED_MAX: u8 = 50;
pub(crate) const EXHAUSTED_MAX: u8 = 25;
pub(crate) const TIRED_CARD_PENALTY: u8 = 1;
pub(crate) const COST_FLAT: f64 = 1.0;
pub(crate) const COST_HILL: f64 = 1.5;
pub(crate) const COST_MOUNTAIN: f64 = 2.0;
pub(crate) const COST_DESCENT: f64 = 0.0;
pub(crate) const COST_SPRINT: f64 = 1.0;
pub(crate) const ADAPTED_COST_FACTOR: f64 = 0.5;
pub(crate) const SUMMIT_BONUS: f64 = 1.0;
pub(crate) const DESCENT_RECOVERY_PER_CELL: u8 = 1;
pub(crate) const SHELTER_RECOVERY: i32 = 3;
pub(crate) const REFUEL_RECOVERY: u8 = 25;
pub(crate) const FRINGALE_RECOVERY: u8 = 10;
pub(crate) const REST_RECOVERY: u8 = 5;

// Cards --------------------------------------------------------------------
pub(crate) const STARTING_HAND: [u8; 6] = [2, 3, 3, 4, 4, 5];
pub(crate) const ATTACK_CARD_COUNT: usize = 2;
pub(crate) const ATTACK_CARD_VALUE: u8 = 6;
pub(crate) const ATTACK_ENERGY_COST: u8 = 5;
pub(crate) const SPECIALTY_CARD_COUNT: usize = 2;
pub(crate) const SPECIALTY_CARD_VALUE: u8 = 2;
pub(crate) const SPECIALTY_ENERGY_COST: u8 = 3;
pub(crate) const FALL_FATIGUE_VALUE: u8 = 2;
pub(crate) const FALL_FATIGUE_CARDS: usize = 2;

// Movement -----------------------------------------------------------------
pub const CELL_CAPACITY: usize = 4;
pub(crate) const DICE_FACES: u8 = 6;
pub(crate) const DESCENT_MIN_SPEED: i32 = 4;
pub(crate) const FRINGALE_MOVEMENT_CAP: i32 = 3;
pub(crate) const MIN_MOVEMENT: i32 = 1;
pub(crate) const FALL_PUSHBACK: u32 = 3;
pub(crate) const FALL_CHANCE: f64 = 0.3;
pub(crate) const FALL_RAIN_BONUS: f64 = 0.15;
pub(crate) const FALL_SKIP_TURNS: u8 = 1;

// Peloton effects ----------------------------------------------------------
pub(crate) const ASPIRATION_GAP: u32 = 2;
pub const ASPIRATION_MAX_PASSES: usize = 50;
pub(crate) const WIND_CARD_VALUE: u8 = 1;
pub(crate) const WIND_CARD_VALUE_ROULEUR: u8 = 2;
pub(crate) const WIND_SURCHARGE: u8 = 3;
pub(crate) const WIND_SURCHARGE_ROULEUR: u8 = 5;
pub(crate) const SHELTER_CARD_VALUE: u8 = 2;

// Race events --------------------------------------------------------------
pub(crate) const EVENT_BASE_CHANCE: f64 = 0.08;
pub(crate) const EVENT_COOLDOWN_TURNS: u8 = 1;
pub(crate) const EVENT_DESCENT_FACTOR: f64 = 1.5;
pub(crate) const EVENT_MOUNTAIN_FACTOR: f64 = 1.2;
pub(crate) const EVENT_EXPOSED_WEIGHT: f64 = 1.5;
pub(crate) const EVENT_DESCENT_WEIGHT: f64 = 1.5;
pub(crate) const EVENT_COBBLE_WEIGHT: f64 = 1.3;
pub(crate) const PUNCTURE_ENERGY_PENALTY: u8 = 2;
pub(crate) const PUNCTURE_DURATION: u8 = 2;
pub(crate) const CRASH_ENERGY_PENALTY: u8 = 5;
pub(crate) const CRASH_MOVEMENT_CAP: i32 = 1;
pub(crate) const CRASH_DURATION: u8 = 1;
pub(crate) const MECHANICAL_CARD_PENALTY: u8 = 1;
pub(crate) const MECHANICAL_DURATION: u8 = 2;
pub(crate) const COBBLE_PUNCTURE_BASE: f64 = 0.10;
pub(crate) const COBBLE_PUNCTURE_LOW_ENERGY: f64 = 0.05;
pub(crate) const COBBLE_PUNCTURE_CRITICAL_ENERGY: f64 = 0.10;
pub(crate) const COBBLE_PUNCTURE_SHELTER_FACTOR: f64 = 0.5;

// Course generation --------------------------------------------------------
pub const MIN_COURSE_LENGTH: u32 = 30;
pub const MAX_COURSE_LENGTH: u32 = 300;
pub const DEFAULT_COURSE_LENGTH: u32 = 80;
pub(crate) const MIN_CLIMB_LENGTH: usize = 15;
pub(crate) const MIN_HILL_LENGTH: usize = 6;
pub(crate) const REFUEL_ZONE_ANCHORS: [f64; 2] = [0.30, 0.65];
pub(crate) const REFUEL_ZONE_MIN: usize = 5;
pub(crate) const REFUEL_ZONE_MAX: usize = 6;
pub(crate) const COBBLE_SECTOR_MIN: usize = 4;
pub(crate) const COBBLE_SECTOR_MAX: usize = 6;
pub(crate) const COBBLE_SECTOR_LEN_MIN: usize = 4;
pub(crate) const COBBLE_SECTOR_LEN_MAX: usize = 6;
pub(crate) const CHUNK_MIN: usize = 3;
pub(crate) const CHUNK_MAX: usize = 10;

// Stage race ---------------------------------------------------------------
pub(crate) const STAGE_POINTS: [u32; 15] = [25, 20, 16, 13, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1];
pub(crate) const STAGE_RECOVERY_FLOOR: u8 = 70;
pub(crate) const STAGE_FATIGUE_STRIP: usize = 2;

// Weather ------------------------------------------------------------------
pub(crate) const MAX_EXTREME_STREAK: u8 = 3;
pub(crate) const WEATHER_PERSISTENCE: f64 = 0.7;

// AI -----------------------------------------------------------------------
/// Course share still ahead that marks the early and middle phases.
pub(crate) const AI_EARLY_SHARE: f64 = 0.60;
pub(crate) const AI_MIDDLE_SHARE: f64 = 0.25;
/// Cells from the line where the sprint phase starts.
pub(crate) const AI_FINAL_CELLS: u32 = 10;
pub(crate) const AI_POSITION_WEIGHT: f64 = 1.0;
pub(crate) const AI_ENERGY_WEIGHT: f64 = 0.3;
pub(crate) const AI_CARD_WEIGHT: f64 = 1.5;
/// Cells scanned ahead for cobblestones.
pub(crate) const AI_COBBLE_LOOKAHEAD: u32 = 6;
/// Dice face used when previewing a move.
pub(crate) const AI_AVERAGE_DICE: u8 = 4;

// Roster -------------------------------------------------------------------
pub const MAX_TEAMS: usize = 8;
pub const MAX_RIDERS_PER_TEAM: usize = 8;
pub const DEFAULT_RIDERS_PER_TEAM: usize = 5;
