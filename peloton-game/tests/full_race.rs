use std::collections::HashSet;

use peloton_game::constants::{CELL_CAPACITY, ENERGY_MAX};
use peloton_game::{GameConfig, GameState, PresetId, RaceSession, TurnPhase};

const STEP_BUDGET: usize = 20_000;

fn assert_invariants(state: &GameState, context: &str) {
    for rider in &state.riders {
        assert!(rider.energy <= ENERGY_MAX, "{context}: {} energy {}", rider.id, rider.energy);
        assert!(rider.position <= state.course.finish_line(), "{context}: {} past finish", rider.id);
    }
    for position in state.occupied_positions() {
        assert!(
            state.occupants(position).len() <= CELL_CAPACITY,
            "{context}: cell {position} over capacity"
        );
    }
    let orders: HashSet<u64> = state.riders.iter().map(|rider| rider.arrival_order).collect();
    assert_eq!(orders.len(), state.riders.len(), "{context}: duplicate arrival order");
    assert!(
        state.riders.iter().all(|rider| rider.arrival_order <= state.arrival_counter),
        "{context}: arrival order ahead of the counter"
    );
    let played: HashSet<&String> = state.played_this_turn.iter().collect();
    assert_eq!(played.len(), state.played_this_turn.len(), "{context}: rider played twice");
}

fn run_ai_race(preset: PresetId, seed: u64, teams: usize) -> GameState {
    let mut session = RaceSession::new(GameConfig::ai_race(preset, seed, teams)).unwrap();
    let mut last_turn = session.state().turn;
    for step in 0..STEP_BUDGET {
        if session.state().is_finished() {
            break;
        }
        let outcome = session.step_ai();
        let context = format!("{preset} seed {seed} step {step}");
        assert!(outcome.is_some(), "{context}: stalemate in {:?}", session.state().turn_phase);
        let state = session.state();
        assert_invariants(state, &context);
        assert!(state.turn >= last_turn, "{context}: turn went backwards");
        last_turn = state.turn;
    }
    let state = session.into_state();
    assert!(state.is_finished(), "{preset} seed {seed}: step budget exhausted");
    state
}

#[test]
fn ai_races_finish_on_every_preset() {
    for preset in PresetId::ALL {
        for seed in [1, 7, 2024] {
            let state = run_ai_race(preset, seed, 3);
            assert_eq!(state.turn_phase, TurnPhase::Finished);
            assert_eq!(state.rankings.len(), state.riders.len());
            let ranks: Vec<u32> = state.rankings.iter().map(|entry| entry.final_rank).collect();
            let expected: Vec<u32> = (1..=u32::try_from(state.riders.len()).unwrap()).collect();
            assert_eq!(ranks, expected);
            assert!(state.riders.iter().any(|rider| rider.has_finished));
            assert_eq!(
                state.rankings[0].finish_position,
                Some(1),
                "{preset} seed {seed}: winner must be the first finisher"
            );
        }
    }
}

#[test]
fn finishers_rank_ahead_of_the_field() {
    let state = run_ai_race(PresetId::Flat, 99, 4);
    let mut seen_unfinished = false;
    for entry in &state.rankings {
        if entry.finish_position.is_none() {
            seen_unfinished = true;
        } else {
            assert!(!seen_unfinished, "finisher ranked behind a non-finisher");
        }
    }
    let finish_turns: HashSet<u32> = state.rankings.iter().filter_map(|entry| entry.finish_turn).collect();
    // The first finish opens the last turn, so every finish lands in that one turn.
    assert!(finish_turns.len() <= 1);
}

#[test]
fn same_seed_same_race() {
    let first = run_ai_race(PresetId::Cobbles, 31, 2);
    let second = run_ai_race(PresetId::Cobbles, 31, 2);
    assert_eq!(first.digest(), second.digest());
    assert_eq!(first, second);
    let other = run_ai_race(PresetId::Cobbles, 32, 2);
    assert_ne!(first.digest(), other.digest());
}

#[test]
fn snapshots_survive_json() {
    let state = run_ai_race(PresetId::Mountain, 5, 2);
    let json = serde_json::to_string(&state).unwrap();
    let back: GameState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, state);
}
