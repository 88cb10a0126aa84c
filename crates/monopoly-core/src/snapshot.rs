//! Read-only views of the game for presentation layers.
//!
//! A [`GameSnapshot`] is plain data: everything a renderer needs to draw a
//! frame, with no way back into the engine.

use crate::board::{self, Money, PlayerId, Position, SpaceKind, BOARD_SIZE};
use crate::cards::{Card, DeckKind};
use crate::dice::DiceRoll;
use crate::game::{GameState, TurnPhase};
use crate::player::Player;
use crate::property::ColorGroup;
use serde::{Deserialize, Serialize};

/// One board space as it should be drawn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceView {
    pub position: Position,
    pub label: String,
    pub kind: SpaceKind,
    pub group: Option<ColorGroup>,
    /// Group color as `0xRRGGBB`
    pub color: Option<u32>,
    pub price: Option<Money>,
    /// What a visitor would pay right now
    pub rent: Money,
    pub owner: Option<PlayerId>,
    pub houses: u8,
    pub hotel: bool,
    pub mortgaged: bool,
    /// Tokens standing here
    pub occupants: Vec<PlayerId>,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub phase: TurnPhase,
    pub current_player: PlayerId,
    pub turn_number: u32,
    pub dice: Option<DiceRoll>,
    pub players: Vec<Player>,
    /// Token colors as `0xRRGGBB`, by seat
    pub token_colors: Vec<u32>,
    pub spaces: Vec<SpaceView>,
    pub last_card: Option<(DeckKind, Card)>,
}

/// Anything that can present a snapshot: a terminal log, a JSON stream, a
/// browser canvas.
pub trait Renderer {
    fn render(&mut self, snapshot: &GameSnapshot);
}

impl GameState {
    /// Capture the current state for rendering
    pub fn snapshot(&self) -> GameSnapshot {
        let spaces = (0..BOARD_SIZE).map(|position| self.space_view(position)).collect();

        GameSnapshot {
            phase: self.phase.clone(),
            current_player: self.current_player,
            turn_number: self.turn_number,
            dice: self.dice_roll,
            players: self.players.clone(),
            token_colors: self.players.iter().map(|p| p.color.hex_code()).collect(),
            spaces,
            last_card: self.last_card.clone(),
        }
    }

    fn space_view(&self, position: Position) -> SpaceView {
        let deed = self.ledger.get(position);
        let occupants = self
            .players
            .iter()
            .filter(|p| p.is_active() && p.position == position)
            .map(|p| p.id)
            .collect();

        SpaceView {
            position,
            label: deed.map_or_else(
                || board::space_label(position).to_string(),
                |p| p.name.clone(),
            ),
            kind: board::kind_of(position),
            group: deed.map(|p| p.group),
            color: deed.map(|p| p.group.hex_code()),
            price: deed.map(|p| p.price),
            rent: self.ledger.rent(position),
            owner: deed.and_then(|p| p.owner),
            houses: deed.map_or(0, |p| p.houses),
            hotel: deed.is_some_and(|p| p.hotel),
            mortgaged: deed.is_some_and(|p| p.mortgaged),
            occupants,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    #[test]
    fn test_snapshot_covers_board() {
        let game = GameState::with_players(
            GameConfig::default(),
            vec!["A".into(), "B".into()],
            3,
        )
        .unwrap();
        let snapshot = game.snapshot();

        assert_eq!(snapshot.spaces.len(), 40);
        assert_eq!(snapshot.spaces[0].occupants, vec![0, 1]);
        assert_eq!(snapshot.spaces[39].label, "Boardwalk");
        assert_eq!(snapshot.spaces[39].price, Some(400));
        assert_eq!(snapshot.spaces[4].price, None);
        assert_eq!(snapshot.phase, TurnPhase::AwaitingRoll);
    }

    #[test]
    fn test_snapshot_carries_colors_and_rent() {
        let mut game = GameState::with_players(
            GameConfig::default(),
            vec!["A".into(), "B".into()],
            3,
        )
        .unwrap();
        game.ledger.transfer_ownership(39, Some(1));
        game.players[1].properties.insert(39);
        let snapshot = game.snapshot();

        assert_eq!(snapshot.token_colors, vec![0xE74C3C, 0x3498DB]);
        assert_eq!(snapshot.spaces[39].color, Some(0x0000FF));
        assert_eq!(snapshot.spaces[39].rent, 40);
        assert_eq!(snapshot.spaces[37].rent, 0);
        assert_eq!(snapshot.spaces[0].color, None);
    }

    #[test]
    fn test_snapshot_serializes() {
        let game = GameState::new(GameConfig::default(), 3);
        let json = serde_json::to_string(&game.snapshot()).unwrap();
        assert!(json.contains("SelectingPlayers"));
    }
}
