//! End-of-turn pipeline: aspiration, wind and shelter, incident roll, event tick.
//!
//! The order is fixed. Each step sees the positions left by the previous one.
use log::debug;
use rand::Rng;

use crate::card::MovementOrigin;
use crate::constants::{
    ASPIRATION_GAP, ASPIRATION_MAX_PASSES, CELL_CAPACITY, EVENT_COOLDOWN_TURNS,
    LOG_ASPIRATION, LOG_EVENT_EXPIRED_PREFIX, LOG_EVENT_PREFIX, LOG_SHELTER, LOG_WIND,
    SHELTER_CARD_VALUE, SHELTER_RECOVERY, WIND_CARD_VALUE, WIND_CARD_VALUE_ROULEUR, WIND_SURCHARGE,
    WIND_SURCHARGE_ROULEUR,
};
use crate::course::Terrain;
use crate::energy::apply_energy_delta;
use crate::numbers::scale_u8;
use crate::race_event::{
    ActiveRaceEvent, RaceEventSource, candidate_weight, incident_chance, pick_weighted_index,
    roll_event_kind, tick_event,
};
use crate::rider::RiderType;
use crate::rng::RngBundle;
use crate::state::{EndTurnEffect, GameState};

/// Run every end-of-turn step in order and record the effects on the state.
pub(crate) fn run_pipeline(state: &mut GameState, rngs: &RngBundle) {
    let mut effects = aspiration(state);
    effects.extend(wind_and_shelter(state));
    effects.extend(roll_race_event(state, rngs));
    effects.extend(tick_race_events(state));
    debug!(
        "turn {} end effects: {} records",
        state.turn,
        effects.len()
    );
    state.end_turn_effects = effects;
}

fn aspiration_allowed(state: &GameState, trailing: u32, ahead: u32) -> bool {
    (trailing..=ahead).all(|position| state.course.terrain_at(position).allows_aspiration())
}

/// Regroup trailing groups into the group two cells ahead until nothing moves.
pub fn aspiration(state: &mut GameState) -> Vec<EndTurnEffect> {
    let mut effects = Vec::new();
    for _ in 0..ASPIRATION_MAX_PASSES {
        let mut changed = false;
        // Back to front; positions only ever increase, so a stale snapshot is safe to skip over.
        for trailing in state.occupied_positions() {
            let ahead = trailing + ASPIRATION_GAP;
            if ahead >= state.course.finish_line()
                || !state.occupants(trailing + 1).is_empty()
                || !aspiration_allowed(state, trailing, ahead)
            {
                continue;
            }
            let waiting = state.occupants(trailing);
            let target = state.occupants(ahead);
            if waiting.is_empty() || target.is_empty() {
                continue;
            }
            let room = CELL_CAPACITY.saturating_sub(target.len());
            if room == 0 {
                continue;
            }
            let mut moved = Vec::new();
            for index in waiting.into_iter().take(room) {
                let order = state.next_arrival();
                let rider = &mut state.riders[index];
                rider.position = ahead;
                rider.arrival_order = order;
                moved.push(rider.id.clone());
            }
            state.push_log(LOG_ASPIRATION);
            effects.push(EndTurnEffect::Aspiration {
                rider_ids: moved,
                from: trailing,
                to: ahead,
            });
            changed = true;
        }
        if !changed {
            break;
        }
    }
    effects
}

fn shelter_rider(state: &mut GameState, index: usize, position: u32, bonus: bool) -> EndTurnEffect {
    let weather = state.weather.current;
    let rider = &mut state.riders[index];
    rider.sheltered = true;
    if !bonus {
        return EndTurnEffect::Shelter {
            rider_id: rider.id.clone(),
            position,
            card_value: None,
            recovery: 0,
        };
    }
    let penalty = rider.race_event.map_or(0, |event| event.kind.card_penalty());
    let card_value = SHELTER_CARD_VALUE.saturating_sub(penalty).max(1);
    rider.receive_movement_card(card_value, MovementOrigin::Shelter);
    let recovery = (SHELTER_RECOVERY + weather.shelter_recovery_modifier()).max(0);
    let before = rider.energy;
    rider.energy = apply_energy_delta(rider.energy, recovery);
    EndTurnEffect::Shelter {
        rider_id: rider.id.clone(),
        position,
        card_value: Some(card_value),
        recovery: rider.energy - before,
    }
}

/// Front to back: the arrival leader of an exposed cell takes wind, everyone else shelters.
pub fn wind_and_shelter(state: &mut GameState) -> Vec<EndTurnEffect> {
    for rider in &mut state.riders {
        rider.sheltered = false;
    }
    let mut effects = Vec::new();
    let weather = state.weather.current;
    let mut positions = state.occupied_positions();
    positions.reverse();
    for position in positions {
        let occupants = state.occupants(position);
        let terrain = state.course.terrain_at(position);
        if terrain.always_sheltered() {
            let bonus = terrain == Terrain::Descent;
            for index in occupants {
                effects.push(shelter_rider(state, index, position, bonus));
            }
            continue;
        }
        let exposed = state.occupants(position + 1).is_empty();
        for (slot, index) in occupants.into_iter().enumerate() {
            if exposed && slot == 0 {
                let rider = &mut state.riders[index];
                let rouleur = rider.rider_type == RiderType::Rouleur;
                let base = if rouleur { WIND_CARD_VALUE_ROULEUR } else { WIND_CARD_VALUE };
                let card_value = scale_u8(base, weather.wind_card_multiplier(), 1);
                let surcharge = if rouleur { WIND_SURCHARGE_ROULEUR } else { WIND_SURCHARGE };
                rider.receive_movement_card(card_value, MovementOrigin::Wind);
                rider.pending_wind_surcharge = surcharge;
                effects.push(EndTurnEffect::Wind {
                    rider_id: rider.id.clone(),
                    position,
                    card_value,
                    surcharge,
                });
                state.push_log(LOG_WIND);
            } else {
                effects.push(shelter_rider(state, index, position, true));
            }
        }
    }
    if effects
        .iter()
        .any(|effect| matches!(effect, EndTurnEffect::Shelter { .. }))
    {
        state.push_log(LOG_SHELTER);
    }
    effects
}

/// At most one incident per turn among riders who already acted.
pub fn roll_race_event(state: &mut GameState, rngs: &RngBundle) -> Vec<EndTurnEffect> {
    if state.race_events.cooldown > 0 {
        state.race_events.cooldown -= 1;
        return Vec::new();
    }
    if state.race_events.cobble_puncture_granted(state.turn) {
        return Vec::new();
    }
    let candidates: Vec<usize> = state
        .riders
        .iter()
        .enumerate()
        .filter(|(_, rider)| {
            !rider.has_finished && rider.race_event.is_none() && state.has_played(&rider.id)
        })
        .map(|(index, _)| index)
        .collect();
    let weights: Vec<f64> = candidates
        .iter()
        .map(|index| {
            let rider = &state.riders[*index];
            candidate_weight(
                rider.pending_wind_surcharge > 0,
                state.course.terrain_at(rider.position),
                state.course.is_cobblestone(rider.position),
            )
        })
        .collect();

    let mut rng = rngs.events();
    let Some(pick) = pick_weighted_index(&weights, &mut *rng) else {
        return Vec::new();
    };
    let index = candidates[pick];
    let position = state.riders[index].position;
    let terrain = state.course.terrain_at(position);
    let chance = incident_chance(terrain, state.weather.current);
    if rng.r#gen::<f64>() >= chance {
        return Vec::new();
    }
    let kind = roll_event_kind(terrain, state.course.is_cobblestone(position), &mut *rng);
    drop(rng);

    let turn = state.turn;
    let rider = &mut state.riders[index];
    rider.race_event = Some(ActiveRaceEvent::new(kind, turn, RaceEventSource::Incident));
    let rider_id = rider.id.clone();
    state.race_events.cooldown = EVENT_COOLDOWN_TURNS;
    state.race_events.last_event_turn = Some(turn);
    state.push_log(format!("{LOG_EVENT_PREFIX}{}", kind.as_str()));
    debug!("turn {turn}: {} strikes {rider_id}", kind.as_str());
    vec![EndTurnEffect::RaceEvent { rider_id, kind }]
}

/// Count down active events; those granted this turn are left alone.
pub fn tick_race_events(state: &mut GameState) -> Vec<EndTurnEffect> {
    let turn = state.turn;
    let mut effects = Vec::new();
    let mut expired_keys = Vec::new();
    for rider in &mut state.riders {
        if let Some(kind) = tick_event(&mut rider.race_event, turn) {
            expired_keys.push(format!("{LOG_EVENT_EXPIRED_PREFIX}{}", kind.as_str()));
            effects.push(EndTurnEffect::EventExpired {
                rider_id: rider.id.clone(),
                kind,
            });
        }
    }
    state.logs.extend(expired_keys);
    effects
}

/// Riders the aspiration pass could still move; used by invariant checks.
#[must_use]
pub fn pending_aspiration_groups(state: &GameState) -> usize {
    state
        .occupied_positions()
        .into_iter()
        .filter(|trailing| {
            let ahead = trailing + ASPIRATION_GAP;
            let target = state.occupants(ahead);
            ahead < state.course.finish_line()
                && state.occupants(trailing + 1).is_empty()
                && aspiration_allowed(state, *trailing, ahead)
                && !target.is_empty()
                && target.len() < CELL_CAPACITY
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race_event::RaceEventKind;
    use crate::rider::Rider;
    use crate::state::fixtures::{rider_at, state_with};
    use crate::weather::Weather;

    #[test]
    fn riders_two_cells_apart_regroup() {
        let mut state = state_with(
            &[Terrain::Flat; 12],
            vec![
                rider_at("front", "a", RiderType::Sprinter, 6),
                rider_at("back", "a", RiderType::Sprinter, 4),
            ],
        );
        let effects = aspiration(&mut state);
        assert_eq!(effects.len(), 1);
        assert_eq!(state.rider("back").unwrap().position, 6);
        assert!(state.rider("back").unwrap().arrival_order > state.rider("front").unwrap().arrival_order);
    }

    #[test]
    fn aspiration_respects_capacity_and_terrain() {
        let mut riders: Vec<Rider> = (0..3)
            .map(|i| rider_at(&format!("f{i}"), "a", RiderType::Rouleur, 6))
            .collect();
        riders.extend((0..2).map(|i| rider_at(&format!("b{i}"), "a", RiderType::Rouleur, 4)));
        let mut state = state_with(&[Terrain::Flat; 12], riders);
        aspiration(&mut state);
        assert_eq!(state.occupants(6).len(), 4);
        assert_eq!(state.occupants(4).len(), 1);
        // The earliest arrival moved first.
        assert_eq!(state.rider("b0").unwrap().position, 6);

        let mut mountain = [Terrain::Flat; 12];
        mountain[4] = Terrain::Mountain;
        let mut state = state_with(
            &mountain,
            vec![
                rider_at("front", "a", RiderType::Climber, 6),
                rider_at("back", "a", RiderType::Climber, 4),
            ],
        );
        assert!(aspiration(&mut state).is_empty());
        assert_eq!(state.rider("back").unwrap().position, 4);
    }

    #[test]
    fn aspiration_chains_to_fixed_point() {
        let riders = vec![
            rider_at("lead", "a", RiderType::Sprinter, 9),
            rider_at("mid", "a", RiderType::Sprinter, 7),
            rider_at("tail", "a", RiderType::Sprinter, 5),
        ];
        let mut state = state_with(&[Terrain::Flat; 15], riders);
        aspiration(&mut state);
        assert!(state.riders.iter().all(|r| r.position == 9));
        assert_eq!(pending_aspiration_groups(&state), 0);
    }

    #[test]
    fn solo_rider_on_flat_takes_wind() {
        let mut state = state_with(&[Terrain::Flat; 10], vec![rider_at("solo", "a", RiderType::Sprinter, 3)]);
        let effects = wind_and_shelter(&mut state);
        assert!(matches!(
            effects.as_slice(),
            [EndTurnEffect::Wind { card_value: 1, surcharge: 3, .. }]
        ));
        let rider = state.rider("solo").unwrap();
        assert_eq!(rider.pending_wind_surcharge, 3);
        assert!(!rider.sheltered);
        assert_eq!(rider.hand.last().map(|c| c.value()), Some(1));

        let mut state = state_with(&[Terrain::Flat; 10], vec![rider_at("solo", "a", RiderType::Rouleur, 3)]);
        wind_and_shelter(&mut state);
        let rider = state.rider("solo").unwrap();
        assert_eq!(rider.pending_wind_surcharge, 5);
        assert_eq!(rider.hand.last().map(|c| c.value()), Some(2));
    }

    #[test]
    fn group_behind_leader_is_sheltered() {
        let mut state = state_with(
            &[Terrain::Flat; 10],
            vec![
                rider_at("first", "a", RiderType::Sprinter, 3),
                rider_at("second", "a", RiderType::Sprinter, 3),
                rider_at("behind", "a", RiderType::Sprinter, 2),
            ],
        );
        state.weather.current = Weather::Rain;
        for rider in &mut state.riders {
            rider.energy = 99;
        }
        let effects = wind_and_shelter(&mut state);
        assert_eq!(effects.len(), 3);
        assert_eq!(state.rider("first").unwrap().pending_wind_surcharge, 3);
        let second = state.rider("second").unwrap();
        assert!(second.sheltered);
        assert_eq!(second.energy, 100);
        assert!(state.rider("behind").unwrap().sheltered);
        // Recovery reported is what fit under the cap.
        assert!(effects.iter().any(|effect| matches!(
            effect,
            EndTurnEffect::Shelter { rider_id, recovery: 1, .. } if rider_id == "second"
        )));
    }

    #[test]
    fn no_wind_on_mountain_or_descent() {
        let mut terrain = [Terrain::Mountain; 10];
        terrain[5] = Terrain::Descent;
        let mut state = state_with(
            &terrain,
            vec![
                rider_at("climb", "a", RiderType::Sprinter, 3),
                rider_at("drop", "a", RiderType::Sprinter, 6),
            ],
        );
        state.riders[0].energy = 50;
        state.riders[1].energy = 50;
        let effects = wind_and_shelter(&mut state);
        assert!(effects.iter().all(|e| !matches!(e, EndTurnEffect::Wind { .. })));
        assert_eq!(state.rider("climb").unwrap().energy, 50);
        assert!(state.rider("drop").unwrap().energy > 50);
    }

    #[test]
    fn mechanical_event_reduces_shelter_card() {
        let mut state = state_with(
            &[Terrain::Flat; 10],
            vec![rider_at("lead", "a", RiderType::Sprinter, 4), rider_at("wheel", "a", RiderType::Sprinter, 4)],
        );
        state.riders[1].race_event = Some(ActiveRaceEvent::new(
            RaceEventKind::Mechanical,
            0,
            RaceEventSource::Incident,
        ));
        let effects = wind_and_shelter(&mut state);
        assert!(effects.iter().any(|e| matches!(
            e,
            EndTurnEffect::Shelter { card_value: Some(1), .. }
        )));
    }

    #[test]
    fn one_incident_per_turn_with_cooldown() {
        let rngs = RngBundle::from_user_seed(5);
        let mut hits = 0;
        let mut state = state_with(
            &[Terrain::Descent; 10],
            (0..8).map(|i| rider_at(&format!("r{i}"), "a", RiderType::Rouleur, 1 + i)).collect(),
        );
        state.weather.current = Weather::Storm;
        for turn in 1..200 {
            state.turn = turn;
            state.played_this_turn = state.riders.iter().map(|r| r.id.clone()).collect();
            let before = state.race_events.cooldown;
            let effects = roll_race_event(&mut state, &rngs);
            assert!(effects.len() <= 1);
            if before > 0 {
                assert!(effects.is_empty());
            }
            if !effects.is_empty() {
                hits += 1;
                assert_eq!(state.race_events.cooldown, 1);
            }
            tick_race_events(&mut state);
        }
        assert!(hits > 0);
    }

    #[test]
    fn cobble_puncture_blocks_incident_roll() {
        let rngs = RngBundle::from_user_seed(5);
        let mut state = state_with(&[Terrain::Descent; 10], vec![rider_at("r", "a", RiderType::Rouleur, 2)]);
        state.played_this_turn = vec!["r".into()];
        state.race_events.last_cobble_puncture_turn = Some(1);
        assert!(roll_race_event(&mut state, &rngs).is_empty());
    }
}
