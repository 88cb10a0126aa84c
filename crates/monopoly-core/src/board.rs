//! Static board topology.
//!
//! This module contains:
//! - Board positions and the fixed space layout (40 spaces)
//! - Space classification (corners, railroads, utilities, taxes, card spaces)
//! - Wrap-around arithmetic and nearest-of-kind queries

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Player identifier (seat index, 0-5)
pub type PlayerId = u8;

/// A board position (0-39)
pub type Position = u8;

/// Amount of money. Signed because a player may dip below zero before
/// bankruptcy is resolved.
pub type Money = i64;

/// Number of spaces on the board loop
pub const BOARD_SIZE: u8 = 40;

/// The GO corner
pub const GO_POSITION: Position = 0;

/// The jail corner (also where "go to jail" sends players)
pub const JAIL_POSITION: Position = 10;

/// The free parking corner
pub const FREE_PARKING_POSITION: Position = 20;

/// The "go to jail" corner
pub const GO_TO_JAIL_POSITION: Position = 30;

pub const CORNERS: [Position; 4] = [
    GO_POSITION,
    JAIL_POSITION,
    FREE_PARKING_POSITION,
    GO_TO_JAIL_POSITION,
];
pub const RAILROADS: [Position; 4] = [5, 15, 25, 35];
pub const UTILITIES: [Position; 2] = [12, 28];
pub const TAXES: [Position; 2] = [4, 38];
pub const CHANCE_SPACES: [Position; 3] = [7, 22, 36];
pub const COMMUNITY_CHEST_SPACES: [Position; 3] = [2, 17, 33];

const INCOME_TAX: Money = 200;
const LUXURY_TAX: Money = 100;

/// The four corner spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Corner {
    Go,
    Jail,
    FreeParking,
    GoToJail,
}

/// Classification of a board space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpaceKind {
    Corner(Corner),
    Railroad,
    Utility,
    /// Fixed deduction when landed on
    Tax(Money),
    Chance,
    CommunityChest,
    /// A street; its deed lives in the property ledger at the same position
    Property,
}

impl SpaceKind {
    /// Whether a deed for this space can be bought
    pub fn is_purchasable(&self) -> bool {
        matches!(
            self,
            SpaceKind::Property | SpaceKind::Railroad | SpaceKind::Utility
        )
    }
}

/// Space kinds that cards can send a player to "the nearest" of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NearestKind {
    Railroad,
    Utility,
}

impl NearestKind {
    fn positions(&self) -> &'static [Position] {
        match self {
            NearestKind::Railroad => &RAILROADS,
            NearestKind::Utility => &UTILITIES,
        }
    }
}

/// Bring an out-of-range position back onto the board.
///
/// Positions are always produced modulo [`BOARD_SIZE`]; anything else is a
/// bug, which trips in debug builds and wraps with a warning in release.
pub fn normalize(position: Position) -> Position {
    debug_assert!(position < BOARD_SIZE, "position {position} off the board");
    if position >= BOARD_SIZE {
        warn!(position, "position off the board, wrapping");
        return position % BOARD_SIZE;
    }
    position
}

/// Classify a board position
pub fn kind_of(position: Position) -> SpaceKind {
    let position = normalize(position);
    match position {
        GO_POSITION => SpaceKind::Corner(Corner::Go),
        JAIL_POSITION => SpaceKind::Corner(Corner::Jail),
        FREE_PARKING_POSITION => SpaceKind::Corner(Corner::FreeParking),
        GO_TO_JAIL_POSITION => SpaceKind::Corner(Corner::GoToJail),
        4 => SpaceKind::Tax(INCOME_TAX),
        38 => SpaceKind::Tax(LUXURY_TAX),
        p if RAILROADS.contains(&p) => SpaceKind::Railroad,
        p if UTILITIES.contains(&p) => SpaceKind::Utility,
        p if CHANCE_SPACES.contains(&p) => SpaceKind::Chance,
        p if COMMUNITY_CHEST_SPACES.contains(&p) => SpaceKind::CommunityChest,
        _ => SpaceKind::Property,
    }
}

/// Move `delta` spaces around the loop (negative moves backwards)
pub fn advance(from: Position, delta: i32) -> Position {
    (i32::from(normalize(from)) + delta).rem_euclid(i32::from(BOARD_SIZE)) as Position
}

/// Forward distance from `from` to `to`, in `0..40`
pub fn distance_forward(from: Position, to: Position) -> u8 {
    (i32::from(to) - i32::from(from)).rem_euclid(i32::from(BOARD_SIZE)) as u8
}

/// The first space of `kind` reached moving forward from `from`.
/// A space of that kind at `from` itself counts as distance zero.
pub fn nearest_of_kind(from: Position, kind: NearestKind) -> Position {
    let from = normalize(from);
    kind.positions()
        .iter()
        .copied()
        .min_by_key(|&candidate| distance_forward(from, candidate))
        .unwrap_or(from)
}

/// Display name of a space that has no deed
pub fn space_label(position: Position) -> &'static str {
    match kind_of(position) {
        SpaceKind::Corner(Corner::Go) => "Go",
        SpaceKind::Corner(Corner::Jail) => "Jail",
        SpaceKind::Corner(Corner::FreeParking) => "Free Parking",
        SpaceKind::Corner(Corner::GoToJail) => "Go To Jail",
        SpaceKind::Tax(_) if position == 4 => "Income Tax",
        SpaceKind::Tax(_) => "Luxury Tax",
        SpaceKind::Chance => "Chance",
        SpaceKind::CommunityChest => "Community Chest",
        SpaceKind::Railroad | SpaceKind::Utility | SpaceKind::Property => "Deed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_kind_lists_are_disjoint_and_cover_board() {
        let lists: [&[Position]; 6] = [
            &CORNERS,
            &RAILROADS,
            &UTILITIES,
            &TAXES,
            &CHANCE_SPACES,
            &COMMUNITY_CHEST_SPACES,
        ];

        let mut seen = HashSet::new();
        for list in lists {
            for &p in list {
                assert!(seen.insert(p), "position {p} listed twice");
            }
        }

        let streets: Vec<Position> = (0..BOARD_SIZE)
            .filter(|p| kind_of(*p) == SpaceKind::Property)
            .collect();
        assert_eq!(streets.len(), 22);
        for p in streets {
            assert!(seen.insert(p));
        }
        assert_eq!(seen.len(), BOARD_SIZE as usize);
    }

    #[test]
    fn test_kind_of_matches_lists() {
        assert_eq!(kind_of(0), SpaceKind::Corner(Corner::Go));
        assert_eq!(kind_of(10), SpaceKind::Corner(Corner::Jail));
        assert_eq!(kind_of(30), SpaceKind::Corner(Corner::GoToJail));
        assert_eq!(kind_of(5), SpaceKind::Railroad);
        assert_eq!(kind_of(28), SpaceKind::Utility);
        assert_eq!(kind_of(4), SpaceKind::Tax(200));
        assert_eq!(kind_of(38), SpaceKind::Tax(100));
        assert_eq!(kind_of(36), SpaceKind::Chance);
        assert_eq!(kind_of(17), SpaceKind::CommunityChest);
        assert_eq!(kind_of(39), SpaceKind::Property);
    }

    #[test]
    fn test_nearest_of_kind_wraps() {
        assert_eq!(nearest_of_kind(7, NearestKind::Railroad), 15);
        assert_eq!(nearest_of_kind(36, NearestKind::Railroad), 5);
        assert_eq!(nearest_of_kind(22, NearestKind::Utility), 28);
        assert_eq!(nearest_of_kind(36, NearestKind::Utility), 12);
        assert_eq!(nearest_of_kind(12, NearestKind::Utility), 12);
    }

    #[test]
    fn test_advance_wraps_both_ways() {
        assert_eq!(advance(35, 8), 3);
        assert_eq!(advance(2, -3), 39);
        assert_eq!(advance(39, 1), 0);
    }
}
