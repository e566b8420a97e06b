//! Cards held by riders.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::course::Terrain;

/// Per-rider card identifier. Ids are never reused within one rider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a movement card came from. Wind and shelter cards are single-use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MovementOrigin {
    #[default]
    Deck,
    Wind,
    Shelter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CardKind {
    Movement {
        value: u8,
        #[serde(default)]
        origin: MovementOrigin,
    },
    Attack {
        value: u8,
        energy_cost: u8,
    },
    Specialty {
        value: u8,
        energy_cost: u8,
        /// `None` means the card works on any terrain.
        #[serde(default)]
        terrain: Option<Terrain>,
    },
    Fatigue {
        value: u8,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    #[serde(flatten)]
    pub kind: CardKind,
}

impl Card {
    #[must_use]
    pub const fn new(id: CardId, kind: CardKind) -> Self {
        Self { id, kind }
    }

    /// Face value before energy-status penalties.
    #[must_use]
    pub const fn value(&self) -> u8 {
        match self.kind {
            CardKind::Movement { value, .. }
            | CardKind::Attack { value, .. }
            | CardKind::Specialty { value, .. }
            | CardKind::Fatigue { value } => value,
        }
    }

    /// Flat energy surcharge for playing the card.
    #[must_use]
    pub const fn energy_cost(&self) -> u8 {
        match self.kind {
            CardKind::Attack { energy_cost, .. } | CardKind::Specialty { energy_cost, .. } => {
                energy_cost
            }
            CardKind::Movement { .. } | CardKind::Fatigue { .. } => 0,
        }
    }

    #[must_use]
    pub const fn is_attack(&self) -> bool {
        matches!(self.kind, CardKind::Attack { .. })
    }

    #[must_use]
    pub const fn is_specialty(&self) -> bool {
        matches!(self.kind, CardKind::Specialty { .. })
    }

    #[must_use]
    pub const fn is_fatigue(&self) -> bool {
        matches!(self.kind, CardKind::Fatigue { .. })
    }

    /// Attack and specialty cards are penalised by tiredness.
    #[must_use]
    pub const fn is_power_card(&self) -> bool {
        self.is_attack() || self.is_specialty()
    }

    /// Wind and shelter movement cards are spent once and never reshuffled.
    #[must_use]
    pub const fn is_one_shot(&self) -> bool {
        matches!(
            self.kind,
            CardKind::Movement {
                origin: MovementOrigin::Wind | MovementOrigin::Shelter,
                ..
            }
        )
    }

    /// Deck movement and fatigue cards cycle through the discard pile.
    #[must_use]
    pub const fn returns_to_discard(&self) -> bool {
        matches!(
            self.kind,
            CardKind::Movement {
                origin: MovementOrigin::Deck,
                ..
            } | CardKind::Fatigue { .. }
        )
    }

    #[must_use]
    pub fn usable_on(&self, terrain: Terrain) -> bool {
        match self.kind {
            CardKind::Specialty {
                terrain: Some(gate),
                ..
            } => gate == terrain,
            _ => true,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CardKind::Movement { value, origin } => match origin {
                MovementOrigin::Deck => write!(f, "move {value}"),
                MovementOrigin::Wind => write!(f, "wind {value}"),
                MovementOrigin::Shelter => write!(f, "shelter {value}"),
            },
            CardKind::Attack { value, .. } => write!(f, "attack {value}"),
            CardKind::Specialty { value, .. } => write!(f, "specialty +{value}"),
            CardKind::Fatigue { value } => write!(f, "fatigue {value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_deck_and_fatigue_cards_cycle() {
        let deck = Card::new(CardId(1), CardKind::Movement { value: 3, origin: MovementOrigin::Deck });
        let wind = Card::new(CardId(2), CardKind::Movement { value: 1, origin: MovementOrigin::Wind });
        let fatigue = Card::new(CardId(3), CardKind::Fatigue { value: 2 });
        let attack = Card::new(CardId(4), CardKind::Attack { value: 6, energy_cost: 5 });
        assert!(deck.returns_to_discard());
        assert!(fatigue.returns_to_discard());
        assert!(!wind.returns_to_discard());
        assert!(wind.is_one_shot());
        assert!(!deck.is_one_shot());
        assert!(!fatigue.is_one_shot());
        assert!(!attack.returns_to_discard());
        assert_eq!(attack.energy_cost(), 5);
        assert!(attack.is_power_card());
    }

    #[test]
    fn specialty_gate_checks_terrain() {
        let gated = Card::new(
            CardId(7),
            CardKind::Specialty { value: 2, energy_cost: 3, terrain: Some(Terrain::Mountain) },
        );
        let open = Card::new(CardId(8), CardKind::Specialty { value: 2, energy_cost: 3, terrain: None });
        assert!(gated.usable_on(Terrain::Mountain));
        assert!(!gated.usable_on(Terrain::Flat));
        assert!(open.usable_on(Terrain::Sprint));
    }

    #[test]
    fn cards_serialize_with_type_tag() {
        let card = Card::new(CardId(3), CardKind::Fatigue { value: 1 });
        let json = serde_json::to_string(&card).unwrap();
        assert!(json.contains("\"type\":\"fatigue\""));
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card);
    }
}
