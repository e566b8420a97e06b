//! Movement value, landing placement and move energy accounting.
use crate::card::Card;
use crate::constants::{
    CELL_CAPACITY, DESCENT_MIN_SPEED, FALL_CHANCE, FALL_RAIN_BONUS, FRINGALE_MOVEMENT_CAP,
    MIN_MOVEMENT, REFUEL_RECOVERY,
};
use crate::course::Terrain;
use crate::energy::{EnergyStatus, MoveCost, adjusted_card_value, descent_recovery, movement_cost};
use crate::numbers::clamp_probability;
use crate::rider::Rider;
use crate::state::GameState;
use crate::weather::Weather;

/// Cells a rider would move for a given card, dice and optional specialty card.
///
/// Returns `None` when the main card cannot be played at the rider's energy status.
#[must_use]
pub fn compute_movement(
    rider: &Rider,
    card: &Card,
    dice: u8,
    specialty: Option<&Card>,
    terrain: Terrain,
) -> Option<i32> {
    let status = rider.energy_status();
    let card_value = adjusted_card_value(card, status)?;
    let specialty_value = specialty
        .and_then(|card| adjusted_card_value(card, status))
        .unwrap_or(0);

    let mut movement = i32::from(dice)
        + i32::from(card_value)
        + rider.effective_terrain_bonus(terrain)
        + i32::from(specialty_value);
    if terrain == Terrain::Descent {
        movement = movement.max(DESCENT_MIN_SPEED);
    }
    if status == EnergyStatus::Fringale {
        movement = movement.min(FRINGALE_MOVEMENT_CAP);
    }
    if let Some(cap) = rider.race_event.and_then(|event| event.kind.movement_cap()) {
        movement = movement.min(cap);
    }
    Some(movement.max(MIN_MOVEMENT))
}

/// Walk back from `target` to the first cell with room for `rider_index`.
/// The start line has unlimited room.
#[must_use]
pub fn find_landing(state: &GameState, rider_index: usize, target: u32) -> u32 {
    let mut cell = target.min(state.course.finish_line());
    while cell > 0 {
        let others = state
            .occupants(cell)
            .iter()
            .filter(|index| **index != rider_index)
            .count();
        if others < CELL_CAPACITY {
            return cell;
        }
        cell -= 1;
    }
    0
}

/// Energy the rider spends moving from `from` to `to`.
#[must_use]
pub fn move_energy_cost(
    state: &GameState,
    rider: &Rider,
    card: &Card,
    specialty: Option<&Card>,
    from: u32,
    to: u32,
) -> u32 {
    movement_cost(&MoveCost {
        terrain: state.course.terrain_at(from),
        distance: to.saturating_sub(from),
        rider_type: Some(rider.rider_type),
        card_cost: card.energy_cost(),
        specialty_cost: specialty.map_or(0, Card::energy_cost),
        wind_surcharge: rider.pending_wind_surcharge,
        event_penalty: rider.race_event.map_or(0, |event| event.kind.energy_penalty()),
        crossed_summit: state.course.crosses_summit(from, to),
    })
}

/// Energy regained by the move: descent freewheeling plus a refuel-zone landing.
#[must_use]
pub fn move_energy_recovery(state: &GameState, from: u32, to: u32, finished: bool) -> u32 {
    let mut recovery = descent_recovery(state.course.terrain_at(from), to.saturating_sub(from));
    if !finished && state.course.is_refuel(to) {
        recovery += u32::from(REFUEL_RECOVERY);
    }
    recovery
}

/// Fall odds once the minimum dice face is rolled on a descent.
#[must_use]
pub fn fall_chance(weather: Weather) -> f64 {
    let bonus = if weather.is_wet() { FALL_RAIN_BONUS } else { 0.0 };
    clamp_probability(FALL_CHANCE + bonus)
}
