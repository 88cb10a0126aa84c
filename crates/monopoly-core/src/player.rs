//! Player state: money, position, deeds and jail status.
//!
//! Players know nothing about presentation. Deeds are stored as board
//! positions; the [`PropertyLedger`] stays the owner of the deed data.

use crate::board::{self, Money, PlayerId, Position, BOARD_SIZE, JAIL_POSITION};
use crate::property::PropertyLedger;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maximum seats at the table
pub const MAX_PLAYERS: u8 = 6;

/// Token color for UI rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenColor {
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
    Purple,
}

impl TokenColor {
    /// Get color for a player index
    pub fn for_player(id: PlayerId) -> Self {
        match id % MAX_PLAYERS {
            0 => TokenColor::Red,
            1 => TokenColor::Blue,
            2 => TokenColor::Green,
            3 => TokenColor::Yellow,
            4 => TokenColor::Orange,
            _ => TokenColor::Purple,
        }
    }

    /// Get hex color code for rendering
    pub fn hex_code(&self) -> u32 {
        match self {
            TokenColor::Red => 0xE74C3C,
            TokenColor::Blue => 0x3498DB,
            TokenColor::Green => 0x2ECC71,
            TokenColor::Yellow => 0xF1C40F,
            TokenColor::Orange => 0xE67E22,
            TokenColor::Purple => 0x9B59B6,
        }
    }
}

/// A single player's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Seat index
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Player color
    pub color: TokenColor,
    /// Cash on hand; negative only until bankruptcy is resolved
    pub money: Money,
    /// Board position (0-39)
    pub position: Position,
    /// Positions of owned deeds (mirrors the ledger's owner field)
    pub properties: BTreeSet<Position>,
    /// Get Out of Jail Free cards held
    pub jail_cards: u32,
    /// Rolls left to serve; 0 when not in jail
    pub jail_turns: u8,
    /// Out of the rotation for good
    pub bankrupt: bool,
}

impl Player {
    /// Create a new player on GO
    pub fn new(id: PlayerId, name: String, money: Money) -> Self {
        Self {
            id,
            name,
            color: TokenColor::for_player(id),
            money,
            position: 0,
            properties: BTreeSet::new(),
            jail_cards: 0,
            jail_turns: 0,
            bankrupt: false,
        }
    }

    pub fn in_jail(&self) -> bool {
        self.jail_turns > 0
    }

    pub fn is_active(&self) -> bool {
        !self.bankrupt
    }

    /// Advance `spaces` forward. Returns true when the move wrapped past GO.
    pub fn advance(&mut self, spaces: u8) -> bool {
        let from = self.position;
        self.position = board::advance(from, i32::from(spaces % BOARD_SIZE));
        self.position < from
    }

    /// Move forward to `target`. Returns true when the move wrapped past GO.
    pub fn advance_to(&mut self, target: Position) -> bool {
        let from = self.position;
        self.position = board::normalize(target);
        self.position < from
    }

    /// Step backwards; never passes GO
    pub fn step_back(&mut self, spaces: u8) {
        self.position = board::advance(self.position, -i32::from(spaces));
    }

    pub fn go_to_jail(&mut self, turns: u8) {
        self.position = JAIL_POSITION;
        self.jail_turns = turns;
    }

    pub fn release_from_jail(&mut self) {
        self.jail_turns = 0;
    }

    pub fn add_jail_card(&mut self) {
        self.jail_cards += 1;
    }

    /// Spend a Get Out of Jail Free card, if any
    pub fn use_jail_card(&mut self) -> bool {
        if self.jail_cards == 0 {
            return false;
        }
        self.jail_cards -= 1;
        true
    }

    pub fn receive(&mut self, amount: Money) {
        self.money += amount;
    }

    /// Debit unconditionally; the balance may go negative
    pub fn pay(&mut self, amount: Money) {
        self.money -= amount;
    }

    pub fn can_afford(&self, amount: Money) -> bool {
        self.money >= amount
    }

    pub fn owns(&self, position: Position) -> bool {
        self.properties.contains(&position)
    }

    /// Cash plus the face value of every deed (improvements ignored)
    pub fn net_worth(&self, ledger: &PropertyLedger) -> Money {
        let deeds: Money = self
            .properties
            .iter()
            .filter_map(|&pos| ledger.get(pos))
            .map(|p| p.price)
            .sum();
        self.money + deeds
    }

    /// Negative cash with nothing left to cover it
    pub fn is_insolvent(&self, ledger: &PropertyLedger) -> bool {
        self.money < 0 && self.net_worth(ledger) < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_starts_on_go() {
        let player = Player::new(2, "Test".to_string(), 500);
        assert_eq!(player.position, 0);
        assert_eq!(player.money, 500);
        assert_eq!(player.color, TokenColor::Green);
        assert!(!player.in_jail());
    }

    #[test]
    fn test_advance_without_wrap() {
        let mut player = Player::new(0, "Test".to_string(), 500);
        player.position = 5;
        assert!(!player.advance(7));
        assert_eq!(player.position, 12);
    }

    #[test]
    fn test_advance_wraps_past_go() {
        let mut player = Player::new(0, "Test".to_string(), 500);
        player.position = 35;
        assert!(player.advance(8));
        assert_eq!(player.position, 3);
    }

    #[test]
    fn test_step_back_wraps() {
        let mut player = Player::new(0, "Test".to_string(), 500);
        player.position = 2;
        player.step_back(3);
        assert_eq!(player.position, 39);
    }

    #[test]
    fn test_jail_card_usage() {
        let mut player = Player::new(0, "Test".to_string(), 500);
        assert!(!player.use_jail_card());
        player.add_jail_card();
        assert!(player.use_jail_card());
        assert_eq!(player.jail_cards, 0);
    }

    #[test]
    fn test_go_to_jail() {
        let mut player = Player::new(0, "Test".to_string(), 500);
        player.position = 30;
        player.go_to_jail(3);
        assert_eq!(player.position, JAIL_POSITION);
        assert!(player.in_jail());
    }

    #[test]
    fn test_insolvency_counts_deeds() {
        let mut ledger = PropertyLedger::standard();
        let mut player = Player::new(0, "Test".to_string(), -100);

        assert!(player.is_insolvent(&ledger));

        ledger.transfer_ownership(39, Some(0));
        player.properties.insert(39);
        assert_eq!(player.net_worth(&ledger), 300);
        assert!(!player.is_insolvent(&ledger));
    }
}
