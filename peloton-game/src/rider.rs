//! Rider archetypes and per-rider card pools.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::card::{Card, CardId, CardKind, MovementOrigin};
use crate::constants::{
    ATTACK_CARD_COUNT, ATTACK_CARD_VALUE, ATTACK_ENERGY_COST, ENERGY_MAX, SPECIALTY_CARD_COUNT,
    SPECIALTY_CARD_VALUE, SPECIALTY_ENERGY_COST, STARTING_HAND,
};
use crate::course::Terrain;
use crate::energy::EnergyStatus;
use crate::race_event::ActiveRaceEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiderType {
    Climber,
    Puncher,
    Rouleur,
    Sprinter,
    #[default]
    Versatile,
}

impl RiderType {
    pub const ALL: [Self; 5] = [
        Self::Climber,
        Self::Puncher,
        Self::Rouleur,
        Self::Sprinter,
        Self::Versatile,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Climber => "climber",
            Self::Puncher => "puncher",
            Self::Rouleur => "rouleur",
            Self::Sprinter => "sprinter",
            Self::Versatile => "versatile",
        }
    }

    /// Movement bonus from the archetype x terrain matrix.
    #[must_use]
    pub const fn terrain_bonus(self, terrain: Terrain) -> i32 {
        match (self, terrain) {
            (Self::Climber, Terrain::Hill) => 1,
            (Self::Climber, Terrain::Mountain) => 2,
            (Self::Climber, Terrain::Sprint) => -1,
            (Self::Puncher, Terrain::Hill) => 2,
            (Self::Puncher, Terrain::Mountain) => 1,
            (Self::Rouleur, Terrain::Flat | Terrain::Descent) => 1,
            (Self::Rouleur, Terrain::Mountain) => -1,
            (Self::Sprinter, Terrain::Hill) => -1,
            (Self::Sprinter, Terrain::Mountain) => -2,
            (Self::Sprinter, Terrain::Sprint) => 3,
            _ => 0,
        }
    }

    /// Terrain the specialty cards are gated to; `None` means any terrain.
    #[must_use]
    pub const fn specialty_terrain(self) -> Option<Terrain> {
        match self {
            Self::Climber => Some(Terrain::Mountain),
            Self::Puncher => Some(Terrain::Hill),
            Self::Rouleur => Some(Terrain::Flat),
            Self::Sprinter => Some(Terrain::Sprint),
            Self::Versatile => None,
        }
    }

    /// Adapted riders pay half the terrain energy cost.
    #[must_use]
    pub fn is_adapted(self, terrain: Terrain) -> bool {
        self.specialty_terrain() == Some(terrain)
    }
}

impl fmt::Display for RiderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiderType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|rt| rt.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

const fn default_energy() -> u8 {
    ENERGY_MAX
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rider {
    pub id: String,
    pub name: String,
    pub team: String,
    pub rider_type: RiderType,
    #[serde(default)]
    pub position: u32,
    #[serde(default = "default_energy")]
    pub energy: u8,
    #[serde(default)]
    pub hand: Vec<Card>,
    #[serde(default)]
    pub attack_cards: Vec<Card>,
    #[serde(default)]
    pub specialty_cards: Vec<Card>,
    #[serde(default)]
    pub discard: Vec<Card>,
    #[serde(default)]
    pub has_finished: bool,
    #[serde(default)]
    pub finish_position: Option<u32>,
    #[serde(default)]
    pub finish_turn: Option<u32>,
    #[serde(default)]
    pub arrival_order: u64,
    #[serde(default)]
    pub has_fallen_this_turn: bool,
    #[serde(default)]
    pub turns_to_skip: u8,
    #[serde(default)]
    pub pending_wind_surcharge: u8,
    #[serde(default)]
    pub sheltered: bool,
    #[serde(default)]
    pub race_event: Option<ActiveRaceEvent>,
    #[serde(default)]
    pub last_puncture_turn: Option<u32>,
    #[serde(default)]
    pub next_card_id: u32,
}

impl Rider {
    /// Fresh rider on the start line with the standard deck.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        team: impl Into<String>,
        rider_type: RiderType,
    ) -> Self {
        let mut rider = Self {
            id: id.into(),
            name: name.into(),
            team: team.into(),
            rider_type,
            position: 0,
            energy: ENERGY_MAX,
            hand: Vec::new(),
            attack_cards: Vec::new(),
            specialty_cards: Vec::new(),
            discard: Vec::new(),
            has_finished: false,
            finish_position: None,
            finish_turn: None,
            arrival_order: 0,
            has_fallen_this_turn: false,
            turns_to_skip: 0,
            pending_wind_surcharge: 0,
            sheltered: false,
            race_event: None,
            last_puncture_turn: None,
            next_card_id: 0,
        };
        for value in STARTING_HAND {
            let card = rider.mint(CardKind::Movement {
                value,
                origin: MovementOrigin::Deck,
            });
            rider.hand.push(card);
        }
        rider.refill_power_cards();
        rider
    }

    fn mint(&mut self, kind: CardKind) -> Card {
        let card = Card::new(CardId(self.next_card_id), kind);
        self.next_card_id += 1;
        card
    }

    /// Top attack and specialty pools back up to their starting size.
    pub fn refill_power_cards(&mut self) {
        while self.attack_cards.len() < ATTACK_CARD_COUNT {
            let card = self.mint(CardKind::Attack {
                value: ATTACK_CARD_VALUE,
                energy_cost: ATTACK_ENERGY_COST,
            });
            self.attack_cards.push(card);
        }
        let terrain = self.rider_type.specialty_terrain();
        while self.specialty_cards.len() < SPECIALTY_CARD_COUNT {
            let card = self.mint(CardKind::Specialty {
                value: SPECIALTY_CARD_VALUE,
                energy_cost: SPECIALTY_ENERGY_COST,
                terrain,
            });
            self.specialty_cards.push(card);
        }
    }

    #[must_use]
    pub const fn energy_status(&self) -> EnergyStatus {
        EnergyStatus::from_energy(self.energy)
    }

    /// Not finished and not serving a skipped turn.
    #[must_use]
    pub const fn can_race(&self) -> bool {
        !self.has_finished && self.turns_to_skip == 0
    }

    /// A card playable as the main card: from hand or the attack pool.
    #[must_use]
    pub fn find_card(&self, card_id: CardId) -> Option<&Card> {
        self.hand
            .iter()
            .chain(self.attack_cards.iter())
            .find(|card| card.id == card_id)
    }

    /// Cards the rider may pick as the main card this action.
    pub fn playable_cards(&self) -> impl Iterator<Item = &Card> {
        let power_ok = self.energy_status().can_use_power_cards();
        self.hand
            .iter()
            .chain(self.attack_cards.iter().filter(move |_| power_ok))
    }

    /// Remove a card from hand or the attack pool.
    pub fn play_card(&mut self, card_id: CardId) -> Option<Card> {
        if let Some(index) = self.hand.iter().position(|card| card.id == card_id) {
            return Some(self.hand.remove(index));
        }
        let index = self.attack_cards.iter().position(|card| card.id == card_id)?;
        Some(self.attack_cards.remove(index))
    }

    /// Remove a card from the specialty pool.
    pub fn play_specialty_card(&mut self, card_id: CardId) -> Option<Card> {
        let index = self
            .specialty_cards
            .iter()
            .position(|card| card.id == card_id)?;
        Some(self.specialty_cards.remove(index))
    }

    /// First specialty card usable on `terrain`.
    #[must_use]
    pub fn specialty_card_for(&self, terrain: Terrain) -> Option<&Card> {
        self.specialty_cards
            .iter()
            .find(|card| card.usable_on(terrain))
    }

    /// Route a played card: deck movement and fatigue go to discard, the rest are consumed.
    pub fn discard_played(&mut self, card: Card) {
        if card.returns_to_discard() {
            self.discard.push(card);
        }
    }

    /// Fatigue cards only ever land on the discard pile.
    pub fn add_fatigue(&mut self, value: u8) {
        let card = self.mint(CardKind::Fatigue { value });
        self.discard.push(card);
    }

    /// Hand a single-use wind or shelter card to the rider.
    pub fn receive_movement_card(&mut self, value: u8, origin: MovementOrigin) -> CardId {
        let card = self.mint(CardKind::Movement { value, origin });
        self.hand.push(card);
        card.id
    }

    /// Shuffle the discard pile back into an empty hand. Returns whether it happened.
    pub fn recycle_if_needed<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if !self.hand.is_empty() || self.discard.is_empty() {
            return false;
        }
        self.hand = std::mem::take(&mut self.discard);
        self.hand.shuffle(rng);
        true
    }

    /// Drop leftover wind and shelter cards, then shuffle hand and discard into one fresh hand.
    pub fn rebuild_hand<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.discard.retain(|card| !card.is_one_shot());
        self.hand.retain(|card| !card.is_one_shot());
        self.hand.append(&mut self.discard);
        self.hand.shuffle(rng);
    }

    /// Remove up to `limit` fatigue cards, discard pile first. Returns how many were removed.
    pub fn strip_fatigue(&mut self, limit: usize) -> usize {
        let mut removed = 0;
        for pile in [&mut self.discard, &mut self.hand] {
            while removed < limit {
                let Some(index) = pile.iter().position(Card::is_fatigue) else {
                    break;
                };
                pile.remove(index);
                removed += 1;
            }
        }
        removed
    }

    /// Every card the rider owns, across all pools.
    pub fn all_cards(&self) -> impl Iterator<Item = &Card> {
        self.hand
            .iter()
            .chain(&self.attack_cards)
            .chain(&self.specialty_cards)
            .chain(&self.discard)
    }

    /// Movement bonus from terrain, or zero once exhausted.
    #[must_use]
    pub const fn effective_terrain_bonus(&self, terrain: Terrain) -> i32 {
        if self.energy_status().terrain_bonus_enabled() {
            self.rider_type.terrain_bonus(terrain)
        } else {
            0
        }
    }
}
