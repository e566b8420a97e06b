//! Turn state machine.
//!
//! Every transition borrows a snapshot and returns a fresh one. Invalid input
//! yields an unchanged clone; an unaffordable move yields
//! [`MovementResult::Rejected`] and rolls the phase back to card selection.
pub mod end_turn;
pub mod movement;

use log::{debug, warn};
use rand::Rng;

use crate::card::CardId;
use crate::config::{ConfigError, GameConfig};
use crate::constants::{
    DICE_FACES, FALL_FATIGUE_CARDS, FALL_FATIGUE_VALUE, FALL_PUSHBACK, FALL_SKIP_TURNS,
    FRINGALE_RECOVERY, LOG_COBBLE_PUNCTURE, LOG_FALL, LOG_FINISH, LOG_FRINGALE_RECOVER,
    LOG_LAST_TURN, LOG_MOVE, LOG_MOVE_REJECTED, LOG_RACE_FINISHED, LOG_RACE_START, LOG_REST,
    LOG_STAGE_START, LOG_TURN_START, LOG_WEATHER_PREFIX, REST_RECOVERY,
};
use crate::course::{Course, PresetId, Terrain, generate_course, validate_course};
use crate::energy::{EnergyStatus, apply_energy_delta};
use crate::numbers::usize_to_u32;
use crate::race_event::{ActiveRaceEvent, RaceEventKind, RaceEventSource, cobble_puncture_chance};
use crate::rider::Rider;
use crate::rng::RngBundle;
use crate::stage_race::{self, StageRaceState};
use crate::state::{GameState, MovementResult, RankingEntry, Team, TurnPhase};
use crate::weather::{WeatherState, evolve_weather};

pub use end_turn::{aspiration, pending_aspiration_groups, wind_and_shelter};
pub use movement::{compute_movement, fall_chance, find_landing, move_energy_cost};

/// Generate a course and log any structural violations. Generation never fails.
pub fn build_course(preset: PresetId, length: u32, rngs: &RngBundle) -> Course {
    let preset_def = preset.preset();
    let course = generate_course(length, &preset_def, &mut *rngs.course());
    for violation in validate_course(&course, &preset_def) {
        warn!("{preset} course: {violation}");
    }
    course
}

/// Build the opening state for a configuration.
///
/// # Errors
///
/// Returns `ConfigError` when the configuration fails validation.
pub fn new_race(config: &GameConfig, rngs: &RngBundle) -> Result<GameState, ConfigError> {
    config.validate()?;
    let stage_race = config.stage_race.clone().map(StageRaceState::new);
    let (preset, length) = stage_race
        .as_ref()
        .and_then(StageRaceState::current)
        .map_or((config.preset, config.course_length), |stage| {
            (stage.stage_type.preset(), stage.length)
        });

    let course = build_course(preset, length, rngs);
    let weather = WeatherState::initial(preset, &mut *rngs.weather());
    let teams: Vec<Team> = config
        .players
        .iter()
        .map(|player| Team {
            id: player.team_id.clone(),
            name: player.name.clone(),
            controller: player.controller.clone(),
        })
        .collect();
    let riders: Vec<Rider> = config
        .players
        .iter()
        .flat_map(|player| {
            config
                .roster_for(player)
                .into_iter()
                .enumerate()
                .map(|(index, spec)| {
                    Rider::new(
                        format!("{}-{}", player.team_id, index + 1),
                        spec.name,
                        player.team_id.clone(),
                        spec.rider_type,
                    )
                })
                .collect::<Vec<_>>()
        })
        .collect();

    let mut state = GameState {
        seed: config.seed,
        preset,
        course,
        riders,
        teams,
        turn: 1,
        current_team: 0,
        turn_phase: TurnPhase::SelectRider,
        selected_rider: None,
        selected_card: None,
        selected_specialty: None,
        played_this_turn: Vec::new(),
        last_dice_roll: None,
        last_movement: None,
        end_turn_effects: Vec::new(),
        race_events: Default::default(),
        weather,
        stage_race,
        rankings: Vec::new(),
        is_last_turn: false,
        finish_counter: 0,
        arrival_counter: 0,
        logs: Vec::new(),
    };
    for index in 0..state.riders.len() {
        let order = state.next_arrival();
        state.riders[index].arrival_order = order;
    }
    state.push_log(LOG_RACE_START);
    debug!(
        "race start: {} riders, {} cells, {} weather",
        state.riders.len(),
        state.course.finish_line(),
        state.weather.current.as_str()
    );
    start_turn(&mut state, rngs);
    Ok(state)
}

/// Pick a rider of the team in control.
#[must_use]
pub fn select_rider(state: &GameState, rider_id: &str) -> GameState {
    let mut next = state.clone();
    if !matches!(state.turn_phase, TurnPhase::SelectRider | TurnPhase::SelectCard) {
        return next;
    }
    let Some(rider) = state.rider(rider_id) else {
        return next;
    };
    if Some(rider.team.as_str()) != state.current_team_id() || !state.is_eligible(rider) {
        return next;
    }
    // Switching riders is only possible before any move was attempted.
    if state.turn_phase == TurnPhase::SelectCard
        && state.last_movement.as_ref().is_some_and(MovementResult::is_rejected)
    {
        return next;
    }
    next.selected_rider = Some(rider_id.to_string());
    next.selected_card = None;
    next.selected_specialty = None;
    next.turn_phase = TurnPhase::SelectCard;
    next
}

/// Pick the main card for the selected rider.
#[must_use]
pub fn select_card(state: &GameState, card_id: CardId) -> GameState {
    let mut next = state.clone();
    if state.turn_phase != TurnPhase::SelectCard {
        return next;
    }
    let Some(rider) = state.selected() else {
        return next;
    };
    if !rider.playable_cards().any(|card| card.id == card_id) {
        return next;
    }
    next.selected_card = Some(card_id);
    next.selected_specialty = None;
    next.turn_phase = TurnPhase::RollDice;
    next
}

/// A specialty card may be added on the rider's specialty terrain.
#[must_use]
pub fn specialty_available(state: &GameState, rider: &Rider) -> bool {
    let terrain = state.course.terrain_at(rider.position);
    rider.energy_status().can_use_power_cards() && rider.specialty_card_for(terrain).is_some()
}

/// Roll the movement die on the dice stream.
#[must_use]
pub fn roll_dice(state: &GameState, rngs: &RngBundle) -> GameState {
    let mut next = state.clone();
    if state.turn_phase != TurnPhase::RollDice {
        return next;
    }
    let Some(rider) = state.selected() else {
        return next;
    };
    let dice = rngs.dice().gen_range(1..=DICE_FACES);
    next.last_dice_roll = Some(dice);
    next.turn_phase = if specialty_available(state, rider) {
        TurnPhase::SelectSpecialty
    } else {
        TurnPhase::Resolve
    };
    next
}

/// Decide whether to add a specialty card to the move.
#[must_use]
pub fn choose_specialty(state: &GameState, use_it: bool) -> GameState {
    let mut next = state.clone();
    if state.turn_phase != TurnPhase::SelectSpecialty {
        return next;
    }
    let Some(rider) = state.selected() else {
        return next;
    };
    next.selected_specialty = if use_it {
        let terrain = state.course.terrain_at(rider.position);
        rider.specialty_card_for(terrain).map(|card| card.id)
    } else {
        None
    };
    next.turn_phase = TurnPhase::Resolve;
    next
}

/// Resolve the selected move: fringale recovery, descent fall, rejection or commit.
#[must_use]
pub fn resolve_movement(state: &GameState, rngs: &RngBundle) -> GameState {
    let mut next = state.clone();
    if state.turn_phase != TurnPhase::Resolve {
        return next;
    }
    let (Some(rider_id), Some(card_id), Some(dice)) = (
        state.selected_rider.clone(),
        state.selected_card,
        state.last_dice_roll,
    ) else {
        return next;
    };
    let Some(index) = state.rider_index(&rider_id) else {
        return next;
    };
    let rider = &state.riders[index];
    let Some(card) = rider.find_card(card_id).copied() else {
        return next;
    };

    if rider.energy_status() == EnergyStatus::Fringale {
        let before = next.riders[index].energy;
        let after = apply_energy_delta(before, i32::from(FRINGALE_RECOVERY));
        next.riders[index].energy = after;
        next.last_movement = Some(MovementResult::Recovered {
            rider_id: rider_id.clone(),
            energy_gained: after - before,
        });
        next.push_log(LOG_FRINGALE_RECOVER);
        finish_action(&mut next, &rider_id, rngs);
        return next;
    }

    let start = rider.position;
    let terrain = state.course.terrain_at(start);
    if dice == 1 && terrain == Terrain::Descent {
        let chance = fall_chance(state.weather.current);
        if rngs.events().r#gen::<f64>() < chance {
            apply_fall(&mut next, index, card_id, rngs);
            return next;
        }
    }

    let specialty = state
        .selected_specialty
        .and_then(|id| rider.specialty_cards.iter().find(|card| card.id == id))
        .copied();
    let Some(movement) = compute_movement(rider, &card, dice, specialty.as_ref(), terrain) else {
        return next;
    };
    let target = start.saturating_add(u32::try_from(movement).unwrap_or(0));
    let finish_line = state.course.finish_line();
    let finishing = target >= finish_line;
    let to = if finishing {
        finish_line
    } else {
        find_landing(state, index, target)
    };
    let cost = move_energy_cost(state, rider, &card, specialty.as_ref(), start, to);

    if cost > u32::from(rider.energy) {
        next.last_movement = Some(MovementResult::Rejected {
            rider_id,
            required: cost,
            available: rider.energy,
            movement,
        });
        next.selected_card = None;
        next.selected_specialty = None;
        next.last_dice_roll = None;
        next.turn_phase = TurnPhase::SelectCard;
        next.push_log(LOG_MOVE_REJECTED);
        return next;
    }

    let recovery = movement::move_energy_recovery(state, start, to, finishing);
    let turn = state.turn;
    let order = next.next_arrival();
    let finish_position = if finishing {
        next.finish_counter += 1;
        Some(next.finish_counter)
    } else {
        None
    };
    {
        let rider = &mut next.riders[index];
        if let Some(played) = rider.play_card(card_id) {
            rider.discard_played(played);
        }
        if let Some(id) = specialty.map(|card| card.id) {
            rider.play_specialty_card(id);
        }
        let delta = i64::from(recovery) - i64::from(cost);
        rider.energy = apply_energy_delta(rider.energy, i32::try_from(delta).unwrap_or(i32::MIN));
        rider.pending_wind_surcharge = 0;
        rider.position = to;
        rider.arrival_order = order;
        if finishing {
            rider.has_finished = true;
            rider.finish_position = finish_position;
            rider.finish_turn = Some(turn);
        }
    }
    next.push_log(LOG_MOVE);
    if finishing {
        next.push_log(LOG_FINISH);
        if !next.is_last_turn {
            next.is_last_turn = true;
            next.push_log(LOG_LAST_TURN);
        }
    }
    let cobble_puncture = !finishing && check_cobble_puncture(&mut next, index, start, to, rngs);

    next.last_movement = Some(MovementResult::Moved {
        rider_id: rider_id.clone(),
        from: start,
        to,
        movement,
        energy_spent: cost,
        energy_recovered: recovery,
        finished: finishing,
        specialty_used: specialty.is_some(),
        cobble_puncture,
    });
    finish_action(&mut next, &rider_id, rngs);
    next
}

fn apply_fall(state: &mut GameState, index: usize, card_id: CardId, rngs: &RngBundle) {
    let from = state.riders[index].position;
    let landing = find_landing(state, index, from.saturating_sub(FALL_PUSHBACK));
    let order = state.next_arrival();
    let rider = &mut state.riders[index];
    if let Some(played) = rider.play_card(card_id) {
        rider.discard_played(played);
    }
    for _ in 0..FALL_FATIGUE_CARDS {
        rider.add_fatigue(FALL_FATIGUE_VALUE);
    }
    rider.position = landing;
    rider.arrival_order = order;
    rider.has_fallen_this_turn = true;
    rider.turns_to_skip = FALL_SKIP_TURNS;
    let rider_id = rider.id.clone();
    state.last_movement = Some(MovementResult::Fell {
        rider_id: rider_id.clone(),
        from,
        to: landing,
        fatigue_cards: u8::try_from(FALL_FATIGUE_CARDS).unwrap_or(u8::MAX),
    });
    state.push_log(LOG_FALL);
    debug!("turn {}: {rider_id} fell on descent at {from}", state.turn);
    finish_action(state, &rider_id, rngs);
}

fn check_cobble_puncture(
    state: &mut GameState,
    index: usize,
    from: u32,
    to: u32,
    rngs: &RngBundle,
) -> bool {
    let turn = state.turn;
    let rider = &state.riders[index];
    if rider.race_event.is_some()
        || rider.last_puncture_turn == Some(turn)
        || state.race_events.cobble_puncture_granted(turn)
    {
        return false;
    }
    let chance = cobble_puncture_chance(rider.energy, rider.sheltered, state.weather.current);
    let cells = state.course.cobbles_between(from, to);
    let punctured = {
        let mut rng = rngs.events();
        cells.iter().any(|_| rng.r#gen::<f64>() < chance)
    };
    if !punctured {
        return false;
    }
    let rider = &mut state.riders[index];
    rider.race_event = Some(ActiveRaceEvent::new(
        RaceEventKind::Puncture,
        turn,
        RaceEventSource::Cobbles,
    ));
    rider.last_puncture_turn = Some(turn);
    state.race_events.last_cobble_puncture_turn = Some(turn);
    state.push_log(LOG_COBBLE_PUNCTURE);
    true
}

/// Sit up after a rejected move: no movement, a little energy back, the card is kept.
#[must_use]
pub fn rest_rider(state: &GameState, rngs: &RngBundle) -> GameState {
    let mut next = state.clone();
    if state.turn_phase != TurnPhase::SelectCard {
        return next;
    }
    let Some(rider_id) = state.selected_rider.clone() else {
        return next;
    };
    let rejected = state
        .last_movement
        .as_ref()
        .is_some_and(|result| result.is_rejected() && result.rider_id() == rider_id);
    if !rejected {
        return next;
    }
    let Some(rider) = next.rider_mut(&rider_id) else {
        return next;
    };
    let before = rider.energy;
    rider.energy = apply_energy_delta(before, i32::from(REST_RECOVERY));
    let gained = rider.energy - before;
    next.last_movement = Some(MovementResult::Rested {
        rider_id: rider_id.clone(),
        energy_gained: gained,
    });
    next.push_log(LOG_REST);
    finish_action(&mut next, &rider_id, rngs);
    next
}

/// Close the end-of-turn phase: finish the race or start the next turn.
#[must_use]
pub fn acknowledge_end_turn(state: &GameState, rngs: &RngBundle) -> GameState {
    let mut next = state.clone();
    if state.turn_phase != TurnPhase::EndTurnEffects {
        return next;
    }
    if next.is_last_turn || next.all_finished() {
        finish_race(&mut next);
        return next;
    }

    next.turn += 1;
    let played = std::mem::take(&mut next.played_this_turn);
    for rider in &mut next.riders {
        if rider.turns_to_skip > 0 && !played.contains(&rider.id) {
            rider.turns_to_skip -= 1;
        }
        rider.has_fallen_this_turn = false;
    }
    next.selected_rider = None;
    next.selected_card = None;
    next.selected_specialty = None;
    next.last_dice_roll = None;
    next.last_movement = None;
    next.end_turn_effects.clear();
    if let Some(weather) = evolve_weather(&mut next.weather, next.preset, &mut *rngs.weather()) {
        next.push_log(format!("{LOG_WEATHER_PREFIX}{}", weather.as_str()));
    }
    start_turn(&mut next, rngs);
    next
}

/// Final classification: finishers by finish order, then position, then arrival order.
#[must_use]
pub fn compute_rankings(state: &GameState) -> Vec<RankingEntry> {
    let mut order: Vec<&Rider> = state.riders.iter().collect();
    order.sort_by(|a, b| match (a.finish_position, b.finish_position) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => b
            .position
            .cmp(&a.position)
            .then(a.arrival_order.cmp(&b.arrival_order)),
    });
    order
        .into_iter()
        .enumerate()
        .map(|(rank, rider)| RankingEntry {
            rider_id: rider.id.clone(),
            team: rider.team.clone(),
            final_rank: usize_to_u32(rank + 1),
            position: rider.position,
            finish_position: rider.finish_position,
            finish_turn: rider.finish_turn,
        })
        .collect()
}

fn finish_race(state: &mut GameState) {
    state.rankings = compute_rankings(state);
    state.turn_phase = TurnPhase::Finished;
    state.selected_rider = None;
    state.selected_card = None;
    state.selected_specialty = None;
    state.push_log(LOG_RACE_FINISHED);
    if let Some(stage_race) = state.stage_race.as_mut() {
        stage_race.record_stage(&state.rankings);
    }
    debug!("race finished after {} turns", state.turn);
}

fn start_turn(state: &mut GameState, rngs: &RngBundle) {
    state.push_log(LOG_TURN_START);
    let team_count = state.teams.len();
    if team_count > 0 {
        let first = usize::try_from(state.turn.saturating_sub(1)).unwrap_or(0) % team_count;
        if let Some(team) = (0..team_count)
            .map(|offset| (first + offset) % team_count)
            .find(|team| state.team_has_eligible(*team))
        {
            state.current_team = team;
            state.turn_phase = TurnPhase::SelectRider;
            return;
        }
    }
    enter_end_turn(state, rngs);
}

fn finish_action(state: &mut GameState, rider_id: &str, rngs: &RngBundle) {
    if !state.has_played(rider_id) {
        state.played_this_turn.push(rider_id.to_string());
    }
    if let Some(rider) = state.rider_mut(rider_id) {
        rider.recycle_if_needed(&mut *rngs.dice());
    }
    state.selected_rider = None;
    state.selected_card = None;
    state.selected_specialty = None;
    state.last_dice_roll = None;

    let team_count = state.teams.len();
    if let Some(team) = (1..=team_count)
        .map(|offset| (state.current_team + offset) % team_count)
        .find(|team| state.team_has_eligible(*team))
    {
        state.current_team = team;
        state.turn_phase = TurnPhase::SelectRider;
    } else {
        enter_end_turn(state, rngs);
    }
}

fn enter_end_turn(state: &mut GameState, rngs: &RngBundle) {
    state.turn_phase = TurnPhase::EndTurnEffects;
    end_turn::run_pipeline(state, rngs);
}

/// Move a finished stage race on to its next stage. Returns an unchanged clone
/// unless the current stage is finished and another stage remains.
#[must_use]
pub fn advance_stage(state: &GameState, rngs: &RngBundle) -> GameState {
    let mut next = state.clone();
    if state.turn_phase != TurnPhase::Finished {
        return next;
    }
    let Some(stage) = next
        .stage_race
        .as_mut()
        .and_then(StageRaceState::advance)
    else {
        return next;
    };
    let preset = stage.stage_type.preset();
    next.preset = preset;
    next.course = build_course(preset, stage.length, rngs);
    next.weather = WeatherState::initial(preset, &mut *rngs.weather());
    {
        let mut dice = rngs.dice();
        for index in 0..next.riders.len() {
            let order = next.next_arrival();
            let rider = &mut next.riders[index];
            stage_race::prepare_rider_for_stage(rider, &mut *dice);
            rider.arrival_order = order;
        }
    }
    next.turn = 1;
    next.current_team = 0;
    next.played_this_turn.clear();
    next.last_dice_roll = None;
    next.last_movement = None;
    next.end_turn_effects.clear();
    next.race_events = Default::default();
    next.rankings.clear();
    next.is_last_turn = false;
    next.finish_counter = 0;
    next.push_log(LOG_STAGE_START);
    start_turn(&mut next, rngs);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, CardKind, MovementOrigin};
    use crate::rider::RiderType;
    use crate::state::fixtures::{rider_at, state_with};

    fn resolve_with(state: &GameState, rider_id: &str, card_id: CardId, dice: u8) -> GameState {
        let mut ready = select_rider(state, rider_id);
        ready = select_card(&ready, card_id);
        ready.last_dice_roll = Some(dice);
        ready.turn_phase = TurnPhase::Resolve;
        resolve_movement(&ready, &RngBundle::from_user_seed(1))
    }

    fn give_card(rider: &mut Rider, value: u8) -> CardId {
        rider.hand.clear();
        let id = CardId(400 + u32::from(value));
        rider.hand.push(Card::new(id, CardKind::Movement { value, origin: MovementOrigin::Deck }));
        id
    }

    #[test]
    fn invalid_selections_leave_state_unchanged() {
        let state = state_with(
            &[Terrain::Flat; 40],
            vec![rider_at("a-1", "a", RiderType::Sprinter, 0), rider_at("b-1", "b", RiderType::Sprinter, 0)],
        );
        assert_eq!(select_rider(&state, "b-1"), state);
        assert_eq!(select_rider(&state, "nobody"), state);
        let selected = select_rider(&state, "a-1");
        assert_eq!(selected.turn_phase, TurnPhase::SelectCard);
        assert_eq!(select_card(&selected, CardId(9_999)), selected);
        let attack = selected.riders[0].attack_cards[0].id;
        let mut tired = selected.clone();
        tired.riders[0].energy = 10;
        assert_eq!(select_card(&tired, attack), tired);
        assert_eq!(roll_dice(&state, &RngBundle::from_user_seed(1)), state);
    }

    #[test]
    fn two_cell_flat_move_costs_two() {
        let mut riders = vec![rider_at("a-1", "a", RiderType::Sprinter, 5)];
        riders.extend((0..4).map(|i| rider_at(&format!("b-{i}"), "b", RiderType::Sprinter, 8)));
        let mut state = state_with(&[Terrain::Flat; 40], riders);
        let card = give_card(&mut state.riders[0], 2);
        let next = resolve_with(&state, "a-1", card, 1);
        let rider = next.rider("a-1").unwrap();
        assert_eq!(rider.position, 7);
        assert_eq!(rider.energy, 98);
        assert!(matches!(
            next.last_movement,
            Some(MovementResult::Moved { from: 5, to: 7, energy_spent: 2, .. })
        ));
        assert_eq!(next.occupants(8).len(), 4);
    }

    #[test]
    fn unaffordable_move_is_rejected_without_side_effects() {
        let mut state = state_with(&[Terrain::Mountain; 40], vec![rider_at("a-1", "a", RiderType::Sprinter, 2)]);
        state.riders[0].energy = 3;
        let card = state.riders[0].hand[0].id;
        let hand_before = state.riders[0].hand.clone();
        let next = resolve_with(&state, "a-1", card, 6);
        let rider = next.rider("a-1").unwrap();
        assert_eq!(rider.position, 2);
        assert_eq!(rider.energy, 3);
        assert_eq!(rider.hand, hand_before);
        assert_eq!(next.turn_phase, TurnPhase::SelectCard);
        assert!(matches!(
            next.last_movement,
            Some(MovementResult::Rejected { available: 3, .. })
        ));
        assert!(next.played_this_turn.is_empty());

        let rested = rest_rider(&next, &RngBundle::from_user_seed(1));
        assert_eq!(rested.rider("a-1").unwrap().energy, 8);
        assert_eq!(rested.rider("a-1").unwrap().position, 2);
        assert!(rested.has_played("a-1"));
        assert_eq!(rested.turn_phase, TurnPhase::EndTurnEffects);
    }

    #[test]
    fn rest_requires_a_rejected_move() {
        let state = state_with(&[Terrain::Flat; 40], vec![rider_at("a-1", "a", RiderType::Sprinter, 2)]);
        let selected = select_rider(&state, "a-1");
        assert_eq!(rest_rider(&selected, &RngBundle::from_user_seed(1)), selected);
    }

    #[test]
    fn fringale_rider_recovers_in_place() {
        let mut state = state_with(&[Terrain::Flat; 40], vec![rider_at("a-1", "a", RiderType::Rouleur, 6)]);
        state.riders[0].energy = 0;
        let card = state.riders[0].hand[0].id;
        let hand_before = state.riders[0].hand.clone();
        let next = resolve_with(&state, "a-1", card, 6);
        let rider = next.rider("a-1").unwrap();
        assert_eq!(rider.position, 6);
        assert!(rider.hand.iter().any(|c| c.id == card));
        assert_eq!(rider.hand.len(), hand_before.len() + 1);
        assert!(matches!(
            next.last_movement,
            Some(MovementResult::Recovered { energy_gained: 10, .. })
        ));
        // End of turn ran; the solo rider took wind and the recovery stands.
        assert_eq!(next.turn_phase, TurnPhase::EndTurnEffects);
        assert!(rider.energy >= 10);
    }

    #[test]
    fn first_finisher_triggers_last_turn() {
        let mut state = state_with(
            &[Terrain::Flat; 30],
            vec![rider_at("a-1", "a", RiderType::Sprinter, 27), rider_at("b-1", "b", RiderType::Sprinter, 1)],
        );
        let card = give_card(&mut state.riders[0], 5);
        let next = resolve_with(&state, "a-1", card, 6);
        let rider = next.rider("a-1").unwrap();
        assert!(rider.has_finished);
        assert_eq!(rider.position, 30);
        assert_eq!(rider.finish_position, Some(1));
        assert!(next.is_last_turn);
        assert_eq!(next.current_team_id(), Some("b"));
        assert_eq!(next.turn_phase, TurnPhase::SelectRider);

        let card = next.riders[1].hand[0].id;
        let after = resolve_with(&next, "b-1", card, 3);
        assert_eq!(after.turn_phase, TurnPhase::EndTurnEffects);
        let done = acknowledge_end_turn(&after, &RngBundle::from_user_seed(1));
        assert_eq!(done.turn_phase, TurnPhase::Finished);
        let ranks: Vec<u32> = done.rankings.iter().map(|r| r.final_rank).collect();
        assert_eq!(ranks, vec![1, 2]);
        assert_eq!(done.rankings[0].rider_id, "a-1");
    }

    #[test]
    fn full_cell_pushes_landing_back() {
        let mut riders = vec![rider_at("a-1", "a", RiderType::Sprinter, 0)];
        riders.extend((0..4).map(|i| rider_at(&format!("b-{i}"), "b", RiderType::Sprinter, 7)));
        riders.extend((0..4).map(|i| rider_at(&format!("c-{i}"), "c", RiderType::Sprinter, 6)));
        let mut state = state_with(&[Terrain::Flat; 40], riders);
        let card = give_card(&mut state.riders[0], 3);
        let next = resolve_with(&state, "a-1", card, 4);
        assert_eq!(next.rider("a-1").unwrap().position, 5);
        for position in 1..=8 {
            assert!(next.occupants(position).len() <= 4);
        }
    }

    #[test]
    fn descent_fall_pushes_back_and_skips_a_turn() {
        let mut fell = None;
        for seed in 0..64 {
            let rngs = RngBundle::from_user_seed(seed);
            let state = state_with(
                &[Terrain::Descent; 40],
                vec![rider_at("a-1", "a", RiderType::Sprinter, 10), rider_at("b-1", "b", RiderType::Sprinter, 0)],
            );
            let card = state.riders[0].hand[0].id;
            let mut ready = select_card(&select_rider(&state, "a-1"), card);
            ready.last_dice_roll = Some(1);
            ready.turn_phase = TurnPhase::Resolve;
            let next = resolve_movement(&ready, &rngs);
            if matches!(next.last_movement, Some(MovementResult::Fell { .. })) {
                fell = Some(next);
                break;
            }
        }
        let next = fell.expect("a fall within 64 attempts");
        let rider = next.rider("a-1").unwrap();
        assert_eq!(rider.position, 7);
        assert_eq!(rider.turns_to_skip, 1);
        assert_eq!(rider.discard.iter().filter(|c| c.is_fatigue()).count(), 2);
        assert_eq!(rider.energy, 100);
        assert!(!next.team_has_eligible(0));
    }

    #[test]
    fn teams_rotate_and_turn_advances() {
        let state = state_with(
            &[Terrain::Flat; 60],
            vec![rider_at("a-1", "a", RiderType::Sprinter, 0), rider_at("b-1", "b", RiderType::Sprinter, 0)],
        );
        let rngs = RngBundle::from_user_seed(3);
        let mut current = state;
        for _ in 0..2 {
            let team = current.current_team_id().unwrap().to_string();
            let rider_id = format!("{team}-1");
            current = select_rider(&current, &rider_id);
            let card = current.rider(&rider_id).unwrap().hand[0].id;
            current = select_card(&current, card);
            current = roll_dice(&current, &rngs);
            if current.turn_phase == TurnPhase::SelectSpecialty {
                current = choose_specialty(&current, false);
            }
            current = resolve_movement(&current, &rngs);
        }
        assert_eq!(current.turn_phase, TurnPhase::EndTurnEffects);
        let next = acknowledge_end_turn(&current, &rngs);
        assert_eq!(next.turn, 2);
        assert_eq!(next.current_team_id(), Some("b"));
        assert!(next.played_this_turn.is_empty());
    }

    #[test]
    fn new_race_builds_rotating_rosters() {
        let config = GameConfig::ai_race(PresetId::Flat, 11, 3);
        let rngs = RngBundle::from_user_seed(config.seed);
        let state = new_race(&config, &rngs).unwrap();
        assert_eq!(state.riders.len(), 15);
        assert_eq!(state.turn, 1);
        assert_eq!(state.turn_phase, TurnPhase::SelectRider);
        assert_eq!(state.course.finish_line(), 80);
        let mut orders: Vec<u64> = state.riders.iter().map(|r| r.arrival_order).collect();
        orders.dedup();
        assert_eq!(orders.len(), 15);
        assert!(new_race(&GameConfig::default(), &rngs).is_err());
    }
}
