use peloton_game::stage_race::standings;
use peloton_game::{
    GameConfig, MovementOrigin, PresetId, RaceSession, StageSpec, StageType, TurnPhase,
    advance_stage,
};

fn three_stage_config(seed: u64) -> GameConfig {
    GameConfig {
        stage_race: Some(vec![
            StageSpec {
                stage_type: StageType::Flat,
                length: 40,
            },
            StageSpec {
                stage_type: StageType::Mountain,
                length: 40,
            },
            StageSpec {
                stage_type: StageType::Cobbles,
                length: 40,
            },
        ]),
        ..GameConfig::ai_race(PresetId::Balanced, seed, 2)
    }
}

fn finish_stage(session: &mut RaceSession) {
    for _ in 0..20_000 {
        if session.state().is_finished() {
            return;
        }
        assert!(session.step_ai().is_some(), "stalemate");
    }
    panic!("stage did not finish");
}

#[test]
fn stage_race_accumulates_ledgers_and_jerseys() {
    let mut session = RaceSession::new(three_stage_config(12)).unwrap();
    assert_eq!(session.state().preset, PresetId::Flat);
    assert_eq!(session.state().course.finish_line(), 40);

    finish_stage(&mut session);
    let stage_race = session.state().stage_race.clone().unwrap();
    assert_eq!(stage_race.history.len(), 1);
    assert!(!stage_race.sprint.is_empty());
    assert!(stage_race.mountain.is_empty());
    assert!(stage_race.jerseys.general.is_some());
    assert_eq!(stage_race.jerseys.general, stage_race.history[0].winner);

    let arrival_before = session.state().arrival_counter;
    let state = session.advance_stage();
    assert_eq!(state.turn_phase, TurnPhase::SelectRider);
    assert_eq!(state.turn, 1);
    assert_eq!(state.preset, PresetId::Mountain);
    assert!(state.arrival_counter > arrival_before);
    for rider in &state.riders {
        assert_eq!(rider.position, 0);
        assert!(rider.energy >= 70);
        assert!(!rider.has_finished);
        assert_eq!(rider.attack_cards.len(), 2);
        assert_eq!(rider.specialty_cards.len(), 2);
    }

    finish_stage(&mut session);
    session.advance_stage();
    finish_stage(&mut session);
    let stage_race = session.state().stage_race.clone().unwrap();
    assert!(stage_race.is_complete());
    assert_eq!(stage_race.history.len(), 3);
    assert!(!stage_race.mountain.is_empty());

    // General ledger: 3 stages of points for everyone, leader first.
    let table = standings(&stage_race.general);
    assert_eq!(table.len(), session.state().riders.len());
    assert_eq!(Some(table[0].0.to_string()), stage_race.jerseys.general);
    let wins: u32 = stage_race.general.values().map(|entry| entry.stage_wins).sum();
    assert_eq!(wins, 3);

    // No stage left: advancing is a no-op.
    let before = session.state().clone();
    assert_eq!(session.advance_stage(), &before);
}

#[test]
fn advancing_mid_stage_is_ignored() {
    let mut session = RaceSession::new(three_stage_config(3)).unwrap();
    let before = session.state().clone();
    assert_eq!(session.advance_stage(), &before);
}

fn assert_fresh_hands(state: &peloton_game::GameState) {
    for rider in &state.riders {
        assert!(
            rider.hand.iter().all(|card| !card.is_one_shot()),
            "{} kept a wind or shelter card",
            rider.id
        );
        assert!(rider.discard.iter().all(|card| !card.is_one_shot()));
        assert!(rider.discard.is_empty());
        assert!(rider.hand.iter().any(|card| !card.is_fatigue()));
    }
}

#[test]
fn new_stage_deals_deck_cards_only() {
    let flat = StageSpec {
        stage_type: StageType::Flat,
        length: 120,
    };
    let config = GameConfig {
        stage_race: Some(vec![flat, flat]),
        ..GameConfig::ai_race(PresetId::Flat, 7, 3)
    };
    let mut session = RaceSession::new(config).unwrap();
    finish_stage(&mut session);

    // Leftovers are forced onto every rider so the rebuild always has work to do.
    let mut finished = session.state().clone();
    for rider in &mut finished.riders {
        rider.receive_movement_card(1, MovementOrigin::Wind);
        rider.receive_movement_card(2, MovementOrigin::Shelter);
    }
    let next = advance_stage(&finished, session.rngs());
    assert_eq!(next.turn, 1);
    assert_fresh_hands(&next);

    assert_fresh_hands(session.advance_stage());
    finish_stage(&mut session);
    assert!(session.state().stage_race.as_ref().unwrap().is_complete());
}
