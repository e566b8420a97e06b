pub mod invariants;
pub mod reports;
pub mod seeds;
pub mod simulation;
pub mod tester;

pub use seeds::resolve_seed_inputs;
pub use tester::{BatchOptions, RunResult, run_batch};
