//! Chance and Community Chest cards.
//!
//! This module contains:
//! - Card effects as a closed enum, applied by the turn engine
//! - The canonical 16-card sets for both decks
//! - Deck management with draw-and-recycle semantics

use crate::board::{Money, NearestKind, Position};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// Which of the two decks a card belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeckKind {
    Chance,
    CommunityChest,
}

/// What a card does when drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardEffect {
    /// Advance to a fixed space
    MoveAbsolute(Position),
    /// Move a number of spaces (negative moves backwards)
    MoveRelative(i8),
    /// Advance to the nearest space of a kind
    MoveNearest(NearestKind),
    ReceiveMoney(Money),
    PayMoney(Money),
    GrantJailCard,
    SendToJail,
    /// Pay per house and per hotel owned
    PayRepairs { per_house: Money, per_hotel: Money },
    /// Pay every other active player
    PayEachPlayer(Money),
    /// Every other active player pays you
    CollectFromEachPlayer(Money),
}

/// A single card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub text: String,
    pub effect: CardEffect,
}

impl Card {
    pub fn new(text: &str, effect: CardEffect) -> Self {
        Self {
            text: text.to_string(),
            effect,
        }
    }
}

impl DeckKind {
    /// The standard 16 cards of this deck, unshuffled
    pub fn canonical_cards(&self, repairs: (Money, Money)) -> Vec<Card> {
        use CardEffect::*;

        let (per_house, per_hotel) = repairs;
        match self {
            DeckKind::Chance => vec![
                Card::new("Advance to Go", MoveAbsolute(0)),
                Card::new("Advance to Illinois Avenue", MoveAbsolute(24)),
                Card::new("Advance to St. Charles Place", MoveAbsolute(11)),
                Card::new("Advance to nearest Utility", MoveNearest(NearestKind::Utility)),
                Card::new("Advance to nearest Railroad", MoveNearest(NearestKind::Railroad)),
                Card::new("Bank pays you dividend of $50", ReceiveMoney(50)),
                Card::new("Get Out of Jail Free", GrantJailCard),
                Card::new("Go Back 3 Spaces", MoveRelative(-3)),
                Card::new("Go to Jail", SendToJail),
                Card::new(
                    "Make general repairs on all your property",
                    PayRepairs { per_house, per_hotel },
                ),
                Card::new("Pay poor tax of $15", PayMoney(15)),
                Card::new("Take a trip to Reading Railroad", MoveAbsolute(5)),
                Card::new("Take a walk on the Boardwalk", MoveAbsolute(39)),
                Card::new(
                    "You have been elected Chairman of the Board",
                    PayEachPlayer(50),
                ),
                Card::new("Your building loan matures", ReceiveMoney(150)),
                Card::new("You have won a crossword competition", ReceiveMoney(100)),
            ],
            DeckKind::CommunityChest => vec![
                Card::new("Advance to Go", MoveAbsolute(0)),
                Card::new("Bank error in your favor", ReceiveMoney(200)),
                Card::new("Doctor's fee", PayMoney(50)),
                Card::new("From sale of stock you get $45", ReceiveMoney(45)),
                Card::new("Get Out of Jail Free", GrantJailCard),
                Card::new("Go to Jail", SendToJail),
                Card::new("Grand Opera Night", CollectFromEachPlayer(50)),
                Card::new("Holiday Fund matures", ReceiveMoney(100)),
                Card::new("Income tax refund", ReceiveMoney(20)),
                Card::new("Life insurance matures", ReceiveMoney(100)),
                Card::new("Pay hospital fees of $100", PayMoney(100)),
                Card::new("Pay school fees of $50", PayMoney(50)),
                Card::new("Receive $25 consultancy fee", ReceiveMoney(25)),
                Card::new(
                    "You are assessed for street repairs",
                    PayRepairs { per_house, per_hotel },
                ),
                Card::new(
                    "You have won second prize in a beauty contest",
                    ReceiveMoney(10),
                ),
                Card::new("You inherit $100", ReceiveMoney(100)),
            ],
        }
    }
}

/// A draw pile. The front of the queue is the top of the deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardDeck {
    pub kind: DeckKind,
    cards: VecDeque<Card>,
    /// The full set used to refill an exhausted deck
    canonical: Vec<Card>,
}

impl CardDeck {
    /// A freshly shuffled canonical deck
    pub fn new<R: Rng>(kind: DeckKind, repairs: (Money, Money), rng: &mut R) -> Self {
        let canonical = kind.canonical_cards(repairs);
        let mut deck = Self {
            kind,
            cards: VecDeque::new(),
            canonical,
        };
        deck.recycle(rng);
        deck
    }

    /// A deck in a known order: `cards[0]` is drawn first. Once exhausted it
    /// refills from the same cards.
    pub fn stacked(kind: DeckKind, cards: Vec<Card>) -> Self {
        Self {
            kind,
            cards: cards.iter().cloned().collect(),
            canonical: cards,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Refill from the canonical set and shuffle
    pub fn recycle<R: Rng>(&mut self, rng: &mut R) {
        let mut fresh = self.canonical.clone();
        fresh.shuffle(rng);
        self.cards = fresh.into();
        debug!(deck = ?self.kind, cards = self.cards.len(), "deck reshuffled");
    }

    /// Take the top card, reshuffling the full set first when exhausted.
    /// Only returns `None` if the canonical set itself is empty.
    pub fn draw<R: Rng>(&mut self, rng: &mut R) -> Option<Card> {
        if self.cards.is_empty() {
            self.recycle(rng);
        }
        let card = self.cards.pop_front();
        debug_assert!(card.is_some(), "deck empty after recycling");
        card
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_canonical_decks_have_16_unique_cards() {
        for kind in [DeckKind::Chance, DeckKind::CommunityChest] {
            let cards = kind.canonical_cards((25, 100));
            assert_eq!(cards.len(), 16);
            let texts: HashSet<_> = cards.iter().map(|c| c.text.clone()).collect();
            assert_eq!(texts.len(), 16);
        }
    }

    #[test]
    fn test_sixteen_draws_yield_each_card_once() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut deck = CardDeck::new(DeckKind::Chance, (25, 100), &mut rng);

        let mut seen = HashSet::new();
        for _ in 0..16 {
            let card = deck.draw(&mut rng).unwrap();
            assert!(seen.insert(card.text));
        }
        assert!(deck.is_empty());
    }

    #[test]
    fn test_seventeenth_draw_recycles() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut deck = CardDeck::new(DeckKind::CommunityChest, (25, 100), &mut rng);
        for _ in 0..16 {
            deck.draw(&mut rng);
        }

        assert!(deck.draw(&mut rng).is_some());
        assert_eq!(deck.len(), 15);
    }

    #[test]
    fn test_stacked_deck_draws_in_order() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut deck = CardDeck::stacked(
            DeckKind::Chance,
            vec![
                Card::new("first", CardEffect::ReceiveMoney(1)),
                Card::new("second", CardEffect::PayMoney(1)),
            ],
        );

        assert_eq!(deck.draw(&mut rng).unwrap().text, "first");
        assert_eq!(deck.draw(&mut rng).unwrap().text, "second");
        assert!(deck.draw(&mut rng).is_some());
    }

    #[test]
    fn test_shuffle_differs_between_seeds() {
        let order = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut deck = CardDeck::new(DeckKind::Chance, (25, 100), &mut rng);
            (0..16)
                .filter_map(|_| deck.draw(&mut rng))
                .map(|c| c.text)
                .collect::<Vec<_>>()
        };

        assert_ne!(order(1), order(2));
    }
}
