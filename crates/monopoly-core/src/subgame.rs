//! Short-lived sub-games that suspend the main turn cycle.
//!
//! Each controller owns its own clock, advanced once per engine tick, and
//! reaches a terminal state on its own. The turn engine applies the economic
//! result (bonus cash, deed transfer, jail release) once the player
//! acknowledges it.

use crate::board::{Money, PlayerId, Position};
use crate::dice::DiceRoll;
use crate::game::GameError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Bid step for auctions
pub const BID_INCREMENT: Money = 10;

/// Bonus cash per pip on the bonus dice
pub const BONUS_PER_PIP: Money = 10;

/// Area the jail key can be hidden in
pub const KEY_FIELD_X: (f32, f32) = (100.0, 700.0);
pub const KEY_FIELD_Y: (f32, f32) = (100.0, 500.0);

// ==================== Bonus Roll ====================

/// Spin the dice for a while, then pay out ten per pip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusRoll {
    pub ticks_remaining: u32,
    pub dice: Option<DiceRoll>,
}

impl BonusRoll {
    pub fn new(ticks: u32) -> Self {
        Self {
            ticks_remaining: ticks,
            dice: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.dice.is_some()
    }

    /// Returns the dice on the tick the spin settles
    pub fn tick<R: Rng>(&mut self, rng: &mut R) -> Option<DiceRoll> {
        if self.is_resolved() {
            return None;
        }
        self.ticks_remaining = self.ticks_remaining.saturating_sub(1);
        if self.ticks_remaining > 0 {
            return None;
        }
        let dice = DiceRoll::roll(rng);
        self.dice = Some(dice);
        Some(dice)
    }

    pub fn reward(&self) -> Option<Money> {
        self.dice.map(|d| Money::from(d.total()) * BONUS_PER_PIP)
    }
}

// ==================== Auction ====================

/// A timed auction for a deed the lander passed on.
///
/// The initiating player is the only bidder; when the clock runs out the
/// deed goes to them at the standing bid, if they can pay it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auction {
    pub position: Position,
    pub bidder: PlayerId,
    pub current_bid: Money,
    pub min_bid: Money,
    pub ticks_remaining: u32,
}

impl Auction {
    /// Opening bid is half the price, floor is a quarter. The auction is
    /// open for at least one tick.
    pub fn new(position: Position, price: Money, bidder: PlayerId, ticks: u32) -> Self {
        Self {
            position,
            bidder,
            current_bid: price / 2,
            min_bid: price / 4,
            ticks_remaining: ticks.max(1),
        }
    }

    pub fn is_open(&self) -> bool {
        self.ticks_remaining > 0
    }

    /// Raise or lower the standing bid by exactly one step
    pub fn adjust(&mut self, delta: Money) -> Result<Money, GameError> {
        if !self.is_open() {
            return Err(GameError::InvalidPhase);
        }
        if delta.abs() != BID_INCREMENT {
            return Err(GameError::InvalidBid);
        }

        let bid = self.current_bid + delta;
        if bid < self.min_bid {
            return Err(GameError::BidBelowMinimum { minimum: self.min_bid });
        }
        self.current_bid = bid;
        Ok(bid)
    }

    /// Returns true on the tick the auction closes
    pub fn tick(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.ticks_remaining -= 1;
        self.ticks_remaining == 0
    }
}

// ==================== Jail Escape ====================

/// A pointer location in the escape mini-game's field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscapeStatus {
    Searching,
    KeyFound,
    TimedOut,
}

/// Find the hidden key before the clock runs out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JailEscape {
    pub key: Point,
    pub tolerance: f32,
    pub ticks_remaining: u32,
    pub status: EscapeStatus,
}

impl JailEscape {
    /// Hide the key somewhere random in the field
    pub fn new<R: Rng>(rng: &mut R, ticks: u32, tolerance: f32) -> Self {
        let key = Point::new(
            rng.gen_range(KEY_FIELD_X.0..=KEY_FIELD_X.1),
            rng.gen_range(KEY_FIELD_Y.0..=KEY_FIELD_Y.1),
        );
        Self::with_key(key, ticks, tolerance)
    }

    pub fn with_key(key: Point, ticks: u32, tolerance: f32) -> Self {
        Self {
            key,
            tolerance,
            ticks_remaining: ticks,
            status: EscapeStatus::Searching,
        }
    }

    /// Try a pointer location. Returns true if it found the key.
    pub fn select(&mut self, point: Point) -> bool {
        if self.status != EscapeStatus::Searching {
            return false;
        }
        if point.distance_to(&self.key) < self.tolerance {
            self.status = EscapeStatus::KeyFound;
            return true;
        }
        false
    }

    /// Returns true on the tick the search times out. The clock stops once
    /// the key is found.
    pub fn tick(&mut self) -> bool {
        if self.status != EscapeStatus::Searching {
            return false;
        }
        self.ticks_remaining = self.ticks_remaining.saturating_sub(1);
        if self.ticks_remaining == 0 {
            self.status = EscapeStatus::TimedOut;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_bonus_roll_settles_after_spin() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut bonus = BonusRoll::new(3);

        assert!(bonus.tick(&mut rng).is_none());
        assert!(bonus.tick(&mut rng).is_none());
        let dice = bonus.tick(&mut rng).unwrap();

        assert!(bonus.is_resolved());
        assert_eq!(bonus.reward(), Some(Money::from(dice.total()) * 10));
        assert!(bonus.tick(&mut rng).is_none());
    }

    #[test]
    fn test_auction_bid_bounds() {
        let mut auction = Auction::new(39, 400, 0, 5);
        assert_eq!(auction.current_bid, 200);
        assert_eq!(auction.min_bid, 100);

        assert_eq!(auction.adjust(10), Ok(210));
        assert_eq!(auction.adjust(25), Err(GameError::InvalidBid));

        for _ in 0..11 {
            auction.adjust(-10).unwrap();
        }
        assert_eq!(auction.current_bid, 100);
        assert_eq!(
            auction.adjust(-10),
            Err(GameError::BidBelowMinimum { minimum: 100 })
        );
    }

    #[test]
    fn test_auction_closes_on_timer() {
        let mut auction = Auction::new(1, 60, 0, 2);
        assert!(!auction.tick());
        assert!(auction.tick());
        assert!(!auction.is_open());
        assert_eq!(auction.adjust(10), Err(GameError::InvalidPhase));
    }

    #[test]
    fn test_zero_length_auction_closes_on_first_tick() {
        let mut auction = Auction::new(1, 60, 0, 0);
        assert!(auction.is_open());
        assert!(auction.tick());
        assert!(!auction.is_open());
    }

    #[test]
    fn test_key_found_within_tolerance() {
        let mut escape = JailEscape::with_key(Point::new(200.0, 300.0), 10, 15.0);

        assert!(!escape.select(Point::new(250.0, 300.0)));
        assert!(escape.select(Point::new(210.0, 305.0)));
        assert_eq!(escape.status, EscapeStatus::KeyFound);

        // Clock stops once found
        assert!(!escape.tick());
        assert_eq!(escape.ticks_remaining, 10);
    }

    #[test]
    fn test_escape_times_out() {
        let mut escape = JailEscape::with_key(Point::new(200.0, 300.0), 2, 15.0);
        assert!(!escape.tick());
        assert!(escape.tick());
        assert_eq!(escape.status, EscapeStatus::TimedOut);
        assert!(!escape.select(Point::new(200.0, 300.0)));
    }

    #[test]
    fn test_random_key_inside_field() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let escape = JailEscape::new(&mut rng, 10, 15.0);
            assert!((KEY_FIELD_X.0..=KEY_FIELD_X.1).contains(&escape.key.x));
            assert!((KEY_FIELD_Y.0..=KEY_FIELD_Y.1).contains(&escape.key.y));
        }
    }
}
