//! AI decision engine.
//!
//! Each call to [`decide`] rebuilds the race analysis and team roles from the
//! snapshot and returns them with the decision. Nothing is cached between calls;
//! all randomness comes from the `ai` stream of the caller's [`RngBundle`].
pub mod analysis;
pub mod risk;

use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::card::{Card, CardId};
use crate::constants::{AI_AVERAGE_DICE, DICE_FACES};
use crate::course::Terrain;
use crate::energy::EnergyStatus;
use crate::engine;
use crate::engine::movement::{compute_movement, find_landing, move_energy_cost};
use crate::rider::Rider;
use crate::rng::RngBundle;
use crate::state::{GameState, MovementResult, TurnPhase};

pub use analysis::{RaceAnalysis, RacePhase, Role, RoleAssignment, analyze_race, assign_roles};
pub use risk::{RiskCue, RiskKind, RiskLevel, assess_risk};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Normal, Self::Hard];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
        }
    }

    /// Share of choices taken at random instead of by heuristic.
    #[must_use]
    pub const fn random_pick_rate(self) -> f64 {
        match self {
            Self::Easy => 0.4,
            Self::Normal => 0.15,
            Self::Hard => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    Attacker,
    Conservative,
    Opportunist,
    #[default]
    Balanced,
}

impl Personality {
    pub const ALL: [Self; 4] = [
        Self::Attacker,
        Self::Conservative,
        Self::Opportunist,
        Self::Balanced,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attacker => "attacker",
            Self::Conservative => "conservative",
            Self::Opportunist => "opportunist",
            Self::Balanced => "balanced",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TacticalProfile {
    Conservative,
    #[default]
    Balanced,
    Opportunistic,
}

/// Numeric nudges applied on top of a personality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TacticalModifiers {
    pub attack_bias: f64,
    pub risk_tolerance: f64,
    pub wind_acceptance: f64,
}

impl TacticalProfile {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Balanced => "balanced",
            Self::Opportunistic => "opportunistic",
        }
    }

    #[must_use]
    pub const fn modifiers(self) -> TacticalModifiers {
        match self {
            Self::Conservative => TacticalModifiers {
                attack_bias: -0.15,
                risk_tolerance: 0.2,
                wind_acceptance: 0.15,
            },
            Self::Balanced => TacticalModifiers {
                attack_bias: 0.0,
                risk_tolerance: 0.5,
                wind_acceptance: 0.35,
            },
            Self::Opportunistic => TacticalModifiers {
                attack_bias: 0.15,
                risk_tolerance: 0.75,
                wind_acceptance: 0.55,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct AiConfig {
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub personality: Personality,
    #[serde(default)]
    pub tactical_profile: TacticalProfile,
}

impl fmt::Display for AiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.difficulty.as_str(),
            self.personality.as_str(),
            self.tactical_profile.as_str()
        )
    }
}

/// One engine input chosen by the AI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiDecision {
    SelectRider(String),
    SelectCard(CardId),
    RollDice,
    UseSpecialty(bool),
    Resolve,
    Rest,
    Acknowledge,
}

impl AiDecision {
    /// Feed the decision to the matching engine transition.
    #[must_use]
    pub fn apply(&self, state: &GameState, rngs: &RngBundle) -> GameState {
        match self {
            Self::SelectRider(rider_id) => engine::select_rider(state, rider_id),
            Self::SelectCard(card_id) => engine::select_card(state, *card_id),
            Self::RollDice => engine::roll_dice(state, rngs),
            Self::UseSpecialty(use_it) => engine::choose_specialty(state, *use_it),
            Self::Resolve => engine::resolve_movement(state, rngs),
            Self::Rest => engine::rest_rider(state, rngs),
            Self::Acknowledge => engine::acknowledge_end_turn(state, rngs),
        }
    }
}

impl fmt::Display for AiDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectRider(rider_id) => write!(f, "select rider {rider_id}"),
            Self::SelectCard(card_id) => write!(f, "select card {card_id}"),
            Self::RollDice => f.write_str("roll dice"),
            Self::UseSpecialty(true) => f.write_str("use specialty"),
            Self::UseSpecialty(false) => f.write_str("skip specialty"),
            Self::Resolve => f.write_str("resolve"),
            Self::Rest => f.write_str("rest"),
            Self::Acknowledge => f.write_str("acknowledge end of turn"),
        }
    }
}

/// A decision together with the reading of the race that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiOutcome {
    pub decision: AiDecision,
    pub analysis: RaceAnalysis,
    pub roles: Vec<RoleAssignment>,
    pub risk: Option<RiskCue>,
    pub rationale: String,
}

struct Context<'a> {
    state: &'a GameState,
    team: &'a str,
    config: &'a AiConfig,
    analysis: &'a RaceAnalysis,
    roles: &'a [RoleAssignment],
}

type Choice = (AiDecision, Option<RiskCue>, String);

/// Choose the next input for `team`.
///
/// Returns `None` when the team has nothing to decide: another team is in
/// control, the race is over, or the selected rider has no playable card.
/// Closing the end-of-turn phase is offered to any team.
#[must_use]
pub fn decide(state: &GameState, team: &str, config: &AiConfig, rngs: &RngBundle) -> Option<AiOutcome> {
    let analysis = analyze_race(state, team);
    let roles = assign_roles(state, team);
    let ctx = Context {
        state,
        team,
        config,
        analysis: &analysis,
        roles: &roles,
    };

    let (decision, risk, rationale) = match state.turn_phase {
        TurnPhase::Finished => return None,
        TurnPhase::EndTurnEffects => (AiDecision::Acknowledge, None, "close the turn".to_string()),
        _ if state.current_team_id() != Some(team) => return None,
        TurnPhase::SelectRider => pick_rider(&ctx, rngs)?,
        TurnPhase::SelectCard => pick_card(&ctx, rngs)?,
        TurnPhase::RollDice => (AiDecision::RollDice, None, "roll".to_string()),
        TurnPhase::SelectSpecialty => pick_specialty(&ctx, rngs)?,
        TurnPhase::Resolve => (AiDecision::Resolve, None, "resolve".to_string()),
    };
    debug!(
        "ai {team} [{config}] turn {} {}: {decision} ({rationale})",
        state.turn,
        analysis.phase.as_str()
    );
    Some(AiOutcome {
        decision,
        analysis,
        roles,
        risk,
        rationale,
    })
}

/// Energy a move would cost for a given dice face, or `None` if the card cannot be played.
#[must_use]
pub fn preview_cost(
    state: &GameState,
    rider: &Rider,
    card: &Card,
    specialty: Option<&Card>,
    dice: u8,
) -> Option<u32> {
    let index = state.rider_index(&rider.id)?;
    let start = rider.position;
    let terrain = state.course.terrain_at(start);
    let movement = compute_movement(rider, card, dice, specialty, terrain)?;
    let target = start.saturating_add(u32::try_from(movement).unwrap_or(0));
    let finish = state.course.finish_line();
    let to = if target >= finish {
        finish
    } else {
        find_landing(state, index, target)
    };
    Some(move_energy_cost(state, rider, card, specialty, start, to))
}

/// Whether an average roll would leave the rider alone in the wind.
#[must_use]
pub fn lands_exposed(state: &GameState, rider: &Rider, card: &Card) -> bool {
    let Some(index) = state.rider_index(&rider.id) else {
        return false;
    };
    let terrain = state.course.terrain_at(rider.position);
    let Some(movement) = compute_movement(rider, card, AI_AVERAGE_DICE, None, terrain) else {
        return false;
    };
    let target = rider.position.saturating_add(u32::try_from(movement).unwrap_or(0));
    if target >= state.course.finish_line() {
        return false;
    }
    let landing = find_landing(state, index, target);
    if landing == 0 || state.course.terrain_at(landing).always_sheltered() {
        return false;
    }
    let others = |position: u32| {
        state
            .occupants(position)
            .iter()
            .filter(|other| **other != index)
            .count()
    };
    others(landing) == 0 && others(landing + 1) == 0
}

fn was_rejected(state: &GameState, rider: &Rider) -> bool {
    matches!(
        &state.last_movement,
        Some(MovementResult::Rejected { rider_id, .. }) if *rider_id == rider.id
    )
}

fn affordable(state: &GameState, rider: &Rider, card: &Card, difficulty: Difficulty) -> bool {
    match difficulty {
        Difficulty::Hard => preview_cost(state, rider, card, None, AI_AVERAGE_DICE)
            .is_some_and(|cost| cost <= u32::from(rider.energy)),
        Difficulty::Normal => {
            u32::from(card.energy_cost()) + u32::from(rider.pending_wind_surcharge)
                <= u32::from(rider.energy)
        }
        Difficulty::Easy => true,
    }
}

fn rider_score(ctx: &Context<'_>, rider: &Rider) -> f64 {
    let state = ctx.state;
    let terrain = state.course.terrain_at(rider.position);
    let bonus = f64::from(rider.effective_terrain_bonus(terrain));
    let energy = f64::from(rider.energy);
    let role = analysis::role_of(ctx.roles, &rider.id);
    match ctx.config.personality {
        Personality::Attacker => {
            let role_weight = match role {
                Role::Leader => 6.0,
                Role::FreeRider => 3.0,
                Role::Domestique => 0.0,
            };
            role_weight + bonus * 2.0 + energy / 20.0
        }
        Personality::Conservative => {
            let risk_penalty = match assess_risk(state, rider).level {
                RiskLevel::Low => 0.0,
                RiskLevel::Medium => 3.0,
                RiskLevel::High => 6.0,
            };
            let spare_leader = if role == Role::Domestique { 2.0 } else { 0.0 };
            energy / 10.0 - risk_penalty + spare_leader + bonus
        }
        Personality::Opportunist => {
            let group_in_reach = (3..=9).any(|ahead| !state.occupants(rider.position + ahead).is_empty());
            let reach = if group_in_reach { 4.0 } else { 0.0 };
            reach + bonus * 3.0 + energy / 25.0
        }
        Personality::Balanced => {
            let gap = f64::from(ctx.analysis.leader_position.saturating_sub(rider.position));
            analysis::rider_potential(rider) / 10.0 + bonus * 2.0 - gap / 20.0
        }
    }
}

fn pick_rider(ctx: &Context<'_>, rngs: &RngBundle) -> Option<Choice> {
    let eligible: Vec<&Rider> = ctx
        .state
        .riders
        .iter()
        .filter(|rider| rider.team == ctx.team && ctx.state.is_eligible(rider))
        .collect();
    let mut rng = rngs.ai();
    if rng.r#gen::<f64>() < ctx.config.difficulty.random_pick_rate() {
        let rider = eligible.choose(&mut *rng)?;
        return Some((
            AiDecision::SelectRider(rider.id.clone()),
            Some(assess_risk(ctx.state, rider)),
            format!("random pick {}", rider.id),
        ));
    }
    let rider = eligible.iter().max_by(|a, b| {
        rider_score(ctx, a)
            .total_cmp(&rider_score(ctx, b))
            .then(b.id.cmp(&a.id))
    })?;
    let cue = assess_risk(ctx.state, rider);
    let role = analysis::role_of(ctx.roles, &rider.id);
    Some((
        AiDecision::SelectRider(rider.id.clone()),
        Some(cue),
        format!(
            "{} pick {:?} on {}",
            ctx.config.personality.as_str(),
            role,
            ctx.state.course.terrain_at(rider.position)
        ),
    ))
}

/// After a rejection: the strongest card that stays affordable even on a six, or rest.
fn recover_from_rejection(state: &GameState, rider: &Rider, cards: &[Card], cue: RiskCue) -> Choice {
    let energy = u32::from(rider.energy);
    let safe = cards
        .iter()
        .filter(|card| preview_cost(state, rider, card, None, DICE_FACES).is_some_and(|cost| cost <= energy))
        .max_by(|a, b| a.value().cmp(&b.value()).then(b.id.0.cmp(&a.id.0)));
    match safe {
        Some(card) => (
            AiDecision::SelectCard(card.id),
            Some(cue),
            format!("cheaper card {card} after rejection"),
        ),
        None => (AiDecision::Rest, Some(cue), "no affordable card; sit up".to_string()),
    }
}

fn pick_card(ctx: &Context<'_>, rngs: &RngBundle) -> Option<Choice> {
    let state = ctx.state;
    let rider = state.selected()?;
    let cue = assess_risk(state, rider);
    let cards: Vec<Card> = rider.playable_cards().copied().collect();
    if cards.is_empty() {
        return None;
    }
    if was_rejected(state, rider) {
        return Some(recover_from_rejection(state, rider, &cards, cue));
    }
    if rider.energy_status() == EnergyStatus::Fringale {
        let card = cards.iter().find(|card| !card.is_attack()).unwrap_or(&cards[0]);
        return Some((AiDecision::SelectCard(card.id), Some(cue), "fringale recovery".to_string()));
    }

    let difficulty = ctx.config.difficulty;
    let mut pool: Vec<Card> = cards
        .iter()
        .filter(|card| affordable(state, rider, card, difficulty))
        .copied()
        .collect();
    if pool.is_empty() {
        let cheapest = cards
            .iter()
            .min_by_key(|card| (card.energy_cost(), card.value(), card.id.0))
            .copied()?;
        pool.push(cheapest);
    }

    let mut rng = rngs.ai();
    if rng.r#gen::<f64>() < difficulty.random_pick_rate() {
        let card = pool.choose(&mut *rng)?;
        return Some((AiDecision::SelectCard(card.id), Some(cue), format!("random card {card}")));
    }

    let modifiers = ctx.config.tactical_profile.modifiers();
    let personality = ctx.config.personality;
    let terrain = state.course.terrain_at(rider.position);
    let role = analysis::role_of(ctx.roles, &rider.id);
    let favorable = rider.rider_type.terrain_bonus(terrain) > 0 || ctx.analysis.phase == RacePhase::Sprint;
    let attack_chance = risk::attack_probability(
        &cue,
        modifiers,
        personality,
        ctx.analysis.phase,
        favorable,
        rider.energy_status(),
    );
    let may_attack = role != Role::Domestique || personality == Personality::Attacker;
    if may_attack
        && let Some(attack) = pool.iter().find(|card| card.is_attack())
        && rng.r#gen::<f64>() < attack_chance
    {
        return Some((
            AiDecision::SelectCard(attack.id),
            Some(cue.clone()),
            format!("attack ({:.2}) with {} risk", attack_chance, cue.level.as_str()),
        ));
    }

    let mut steady: Vec<Card> = pool.iter().filter(|card| !card.is_attack()).copied().collect();
    if steady.is_empty() {
        steady = pool;
    }
    steady.sort_by_key(|card| (card.value(), card.id.0));

    let mut high_chance = risk::high_card_probability(&cue, modifiers, rider.energy);
    high_chance = match personality {
        Personality::Attacker => (high_chance * 1.3).min(1.0),
        Personality::Conservative => high_chance * 0.6,
        Personality::Opportunist if ctx.analysis.phase.is_decisive() => (high_chance * 1.2).min(1.0),
        _ => high_chance,
    };
    let go_high = rng.r#gen::<f64>() < high_chance;
    let mut choice = if go_high {
        steady[steady.len() - 1]
    } else {
        steady[(steady.len() - 1) / 2]
    };
    let mut rationale = format!(
        "{} card {choice} in {} phase",
        if go_high { "strong" } else { "steady" },
        ctx.analysis.phase.as_str()
    );

    if lands_exposed(state, rider, &choice) {
        let accept = risk::wind_acceptance_probability(&cue, modifiers, ctx.analysis.phase);
        if rng.r#gen::<f64>() >= accept
            && let Some(sheltered) = steady.iter().rev().find(|card| !lands_exposed(state, rider, card))
        {
            choice = *sheltered;
            rationale = format!("avoid the wind with {choice}");
        } else {
            rationale.push_str("; accepts the wind");
        }
    }
    Some((AiDecision::SelectCard(choice.id), Some(cue), rationale))
}

fn pick_specialty(ctx: &Context<'_>, rngs: &RngBundle) -> Option<Choice> {
    let state = ctx.state;
    let rider = state.selected()?;
    let cue = assess_risk(state, rider);
    let terrain: Terrain = state.course.terrain_at(rider.position);
    let Some(specialty) = rider.specialty_card_for(terrain).copied() else {
        return Some((AiDecision::UseSpecialty(false), Some(cue), "no specialty card".to_string()));
    };
    if was_rejected(state, rider) {
        return Some((
            AiDecision::UseSpecialty(false),
            Some(cue),
            "hold specialty after rejection".to_string(),
        ));
    }
    let card = state.selected_card.and_then(|id| rider.find_card(id)).copied()?;
    let dice = state.last_dice_roll.unwrap_or(AI_AVERAGE_DICE);
    let cost = preview_cost(state, rider, &card, Some(&specialty), dice);
    let fits = cost.is_some_and(|cost| cost <= u32::from(rider.energy));
    if ctx.config.difficulty == Difficulty::Hard && !fits {
        return Some((AiDecision::UseSpecialty(false), Some(cue), "specialty unaffordable".to_string()));
    }

    let mut rng = rngs.ai();
    if rng.r#gen::<f64>() < ctx.config.difficulty.random_pick_rate() {
        let use_it = rng.gen_bool(0.5);
        return Some((AiDecision::UseSpecialty(use_it), Some(cue), "coin flip".to_string()));
    }
    let appetite = match ctx.config.personality {
        Personality::Attacker => 0.9,
        Personality::Opportunist if ctx.analysis.phase.is_decisive() => 0.8,
        Personality::Opportunist => 0.4,
        Personality::Balanced => 0.6,
        Personality::Conservative if rider.energy > 60 => 0.4,
        Personality::Conservative => 0.1,
    };
    let chance = appetite * cue.level.damping(ctx.config.tactical_profile.modifiers().risk_tolerance);
    let use_it = fits && rng.r#gen::<f64>() < chance;
    Some((
        AiDecision::UseSpecialty(use_it),
        Some(cue),
        format!("specialty chance {chance:.2} on {terrain}"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rider::RiderType;
    use crate::state::fixtures::{rider_at, state_with};

    fn hard() -> AiConfig {
        AiConfig {
            difficulty: Difficulty::Hard,
            ..AiConfig::default()
        }
    }

    fn two_team_state() -> GameState {
        state_with(
            &[Terrain::Flat; 40],
            vec![
                rider_at("a-1", "a", RiderType::Rouleur, 2),
                rider_at("a-2", "a", RiderType::Sprinter, 2),
                rider_at("b-1", "b", RiderType::Climber, 2),
            ],
        )
    }

    #[test]
    fn only_the_team_in_control_decides() {
        let state = two_team_state();
        let rngs = RngBundle::from_user_seed(3);
        assert!(decide(&state, "b", &AiConfig::default(), &rngs).is_none());
        let outcome = decide(&state, "a", &AiConfig::default(), &rngs).expect("decision");
        match outcome.decision {
            AiDecision::SelectRider(id) => assert!(id.starts_with("a-")),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(outcome.roles.len(), 2);
    }

    #[test]
    fn end_of_turn_is_acknowledged_and_finished_is_idle() {
        let mut state = two_team_state();
        let rngs = RngBundle::from_user_seed(3);
        state.turn_phase = TurnPhase::EndTurnEffects;
        let outcome = decide(&state, "b", &AiConfig::default(), &rngs).expect("decision");
        assert_eq!(outcome.decision, AiDecision::Acknowledge);
        state.turn_phase = TurnPhase::Finished;
        assert!(decide(&state, "a", &AiConfig::default(), &rngs).is_none());
    }

    #[test]
    fn every_config_picks_eligible_riders() {
        let mut state = two_team_state();
        state.played_this_turn.push("a-1".into());
        for difficulty in Difficulty::ALL {
            for personality in Personality::ALL {
                let config = AiConfig {
                    difficulty,
                    personality,
                    tactical_profile: TacticalProfile::Opportunistic,
                };
                for seed in 0..8 {
                    let rngs = RngBundle::from_user_seed(seed);
                    let outcome = decide(&state, "a", &config, &rngs).expect("decision");
                    assert_eq!(outcome.decision, AiDecision::SelectRider("a-2".into()));
                }
            }
        }
    }

    fn rejected_state(energy: u8, terrain: Terrain) -> GameState {
        let mut state = state_with(&[terrain; 40], vec![rider_at("a-1", "a", RiderType::Versatile, 2)]);
        state.riders[0].energy = energy;
        state.turn_phase = TurnPhase::SelectCard;
        state.selected_rider = Some("a-1".into());
        state.last_movement = Some(MovementResult::Rejected {
            rider_id: "a-1".into(),
            required: 30,
            available: energy,
            movement: 11,
        });
        state
    }

    #[test]
    fn rejection_falls_back_to_a_safe_card() {
        let state = rejected_state(10, Terrain::Flat);
        let outcome = decide(&state, "a", &AiConfig::default(), &RngBundle::from_user_seed(1)).expect("decision");
        let AiDecision::SelectCard(card_id) = outcome.decision else {
            panic!("expected a card, got {:?}", outcome.decision);
        };
        assert_eq!(state.riders[0].find_card(card_id).map(Card::value), Some(4));
    }

    #[test]
    fn rejection_without_safe_card_rests() {
        let state = rejected_state(1, Terrain::Mountain);
        let outcome = decide(&state, "a", &AiConfig::default(), &RngBundle::from_user_seed(1)).expect("decision");
        assert_eq!(outcome.decision, AiDecision::Rest);
        let rested = outcome.decision.apply(&state, &RngBundle::from_user_seed(1));
        assert!(matches!(rested.last_movement, Some(MovementResult::Rested { .. })));
    }

    #[test]
    fn hard_ai_previews_cost_with_average_dice() {
        let mut state = state_with(&[Terrain::Flat; 40], vec![rider_at("a-1", "a", RiderType::Versatile, 2)]);
        state.riders[0].energy = 8;
        state.turn_phase = TurnPhase::SelectCard;
        state.selected_rider = Some("a-1".into());
        for seed in 0..32 {
            let outcome = decide(&state, "a", &hard(), &RngBundle::from_user_seed(seed)).expect("decision");
            let AiDecision::SelectCard(card_id) = outcome.decision else {
                panic!("expected a card");
            };
            let value = state.riders[0].find_card(card_id).map_or(0, Card::value);
            assert!(value <= 4, "seed {seed} picked {value}");
        }
    }

    #[test]
    fn preview_matches_engine_cost() {
        let state = two_team_state();
        let rider = &state.riders[1];
        let card = rider.hand[0];
        // Sprinter on flat: dice 4 + card 2 = 6 cells at 1 energy each.
        assert_eq!(preview_cost(&state, rider, &card, None, 4), Some(6));
    }

    #[test]
    fn solo_breakaway_is_exposed() {
        let state = state_with(&[Terrain::Flat; 40], vec![rider_at("a-1", "a", RiderType::Versatile, 2)]);
        let rider = &state.riders[0];
        assert!(lands_exposed(&state, rider, &rider.hand[0]));
        let sheltered = state_with(
            &[Terrain::Flat; 40],
            vec![
                rider_at("a-1", "a", RiderType::Versatile, 2),
                rider_at("b-1", "b", RiderType::Versatile, 9),
            ],
        );
        let rider = &sheltered.riders[0];
        // Card 2 with an average roll lands on 8, right behind b-1.
        assert!(!lands_exposed(&sheltered, rider, &rider.hand[0]));
    }
}
