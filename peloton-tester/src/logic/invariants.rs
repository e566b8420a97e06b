//! Structural invariants checked after every simulated step.
use std::collections::HashSet;

use peloton_game::constants::{CELL_CAPACITY, ENERGY_MAX};
use peloton_game::{GameState, TurnPhase};

/// Structural checks every snapshot must pass. Returns the first violation found.
pub fn check_state(state: &GameState) -> Result<(), String> {
    let finish = state.course.finish_line();
    for rider in &state.riders {
        if rider.energy > ENERGY_MAX {
            return Err(format!("{} energy {} above {ENERGY_MAX}", rider.id, rider.energy));
        }
        if rider.position > finish {
            return Err(format!("{} at {} past the finish {finish}", rider.id, rider.position));
        }
        if rider.has_finished && rider.finish_position.is_none() {
            return Err(format!("{} finished without a finish position", rider.id));
        }
    }

    for position in state.occupied_positions() {
        let count = state.occupants(position).len();
        if count > CELL_CAPACITY {
            return Err(format!("cell {position} holds {count} riders"));
        }
    }

    let mut orders = HashSet::new();
    for rider in &state.riders {
        if !orders.insert(rider.arrival_order) {
            return Err(format!("arrival order {} shared", rider.arrival_order));
        }
        if rider.arrival_order > state.arrival_counter {
            return Err(format!("{} arrival order ahead of the counter", rider.id));
        }
    }

    let mut played = HashSet::new();
    for rider_id in &state.played_this_turn {
        if !played.insert(rider_id.as_str()) {
            return Err(format!("{rider_id} played twice in turn {}", state.turn));
        }
    }

    if !state.teams.is_empty() && state.current_team >= state.teams.len() {
        return Err(format!("current team {} out of range", state.current_team));
    }

    let finished = state.turn_phase == TurnPhase::Finished;
    if finished != !state.rankings.is_empty() {
        return Err(format!(
            "rankings ({}) out of step with phase {:?}",
            state.rankings.len(),
            state.turn_phase
        ));
    }
    if finished {
        check_rankings(state)?;
    }
    Ok(())
}

/// A finished race ranks every rider once, with places 1..=N and no gaps.
fn check_rankings(state: &GameState) -> Result<(), String> {
    if state.rankings.len() != state.riders.len() {
        return Err(format!(
            "rankings list {} riders, field has {}",
            state.rankings.len(),
            state.riders.len()
        ));
    }
    let mut ranks: Vec<u32> = state.rankings.iter().map(|entry| entry.final_rank).collect();
    ranks.sort_unstable();
    for (expected, rank) in (1_u32..).zip(&ranks) {
        if *rank != expected {
            return Err(format!("final rank {rank} where {expected} was expected"));
        }
    }
    Ok(())
}
