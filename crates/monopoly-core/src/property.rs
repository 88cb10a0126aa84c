//! Property deeds and the ledger that owns them.
//!
//! The ledger is the single authority on who owns which deed; players only
//! keep the positions of their deeds. Primitives here never touch money:
//! they report success (or the amount owed/paid) and the turn engine moves
//! the cash.

use crate::board::{Money, PlayerId, Position};
use serde::{Deserialize, Serialize};

/// Maximum houses on a street before it must be upgraded to a hotel
pub const MAX_HOUSES: u8 = 4;

/// Deed color groups. Railroads and utilities are their own groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorGroup {
    Brown,
    LightBlue,
    Pink,
    Orange,
    Red,
    Yellow,
    Green,
    DarkBlue,
    Railroad,
    Utility,
}

impl ColorGroup {
    /// Cost of one house (and of the hotel upgrade). `None` for deeds that
    /// cannot be improved.
    pub fn building_cost(&self) -> Option<Money> {
        match self {
            ColorGroup::Brown | ColorGroup::LightBlue => Some(50),
            ColorGroup::Pink | ColorGroup::Orange => Some(100),
            ColorGroup::Red | ColorGroup::Yellow => Some(150),
            ColorGroup::Green | ColorGroup::DarkBlue => Some(200),
            ColorGroup::Railroad | ColorGroup::Utility => None,
        }
    }

    /// Get hex color code for rendering
    pub fn hex_code(&self) -> u32 {
        match self {
            ColorGroup::Brown => 0x8B4513,
            ColorGroup::LightBlue => 0xADD8E6,
            ColorGroup::Pink => 0xFFC0CB,
            ColorGroup::Orange => 0xFFA500,
            ColorGroup::Red => 0xFF0000,
            ColorGroup::Yellow => 0xFFFF00,
            ColorGroup::Green => 0x00FF00,
            ColorGroup::DarkBlue => 0x0000FF,
            ColorGroup::Railroad => 0x808080,
            ColorGroup::Utility => 0xFFFFFF,
        }
    }
}

/// A single deed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub price: Money,
    pub group: ColorGroup,
    pub position: Position,
    /// Current owner, `None` while the bank holds it
    pub owner: Option<PlayerId>,
    /// 0-4, always 0 once a hotel is built
    pub houses: u8,
    pub hotel: bool,
    pub mortgaged: bool,
}

impl Property {
    pub fn new(name: &str, price: Money, group: ColorGroup, position: Position) -> Self {
        Self {
            name: name.to_string(),
            price,
            group,
            position,
            owner: None,
            houses: 0,
            hotel: false,
            mortgaged: false,
        }
    }

    /// Rent due from a visitor: a tenth of the price, times the number of
    /// houses plus one, or times five with a hotel.
    pub fn rent(&self) -> Money {
        if self.owner.is_none() || self.mortgaged {
            return 0;
        }

        let base_rent = self.price / 10;
        if self.hotel {
            base_rent * 5
        } else {
            base_rent * (Money::from(self.houses) + 1)
        }
    }

    pub fn has_buildings(&self) -> bool {
        self.houses > 0 || self.hotel
    }

    pub fn can_build_house(&self) -> bool {
        self.owner.is_some()
            && self.group.building_cost().is_some()
            && !self.mortgaged
            && !self.hotel
            && self.houses < MAX_HOUSES
    }

    pub fn can_build_hotel(&self) -> bool {
        self.owner.is_some() && !self.mortgaged && !self.hotel && self.houses == MAX_HOUSES
    }

    pub fn build_house(&mut self) -> bool {
        if !self.can_build_house() {
            return false;
        }
        self.houses += 1;
        true
    }

    /// Replace four houses with a hotel
    pub fn build_hotel(&mut self) -> bool {
        if !self.can_build_hotel() {
            return false;
        }
        self.houses = 0;
        self.hotel = true;
        true
    }

    /// Remove one improvement level. A hotel goes back to four houses.
    pub fn demolish(&mut self) -> bool {
        if self.mortgaged {
            return false;
        }
        if self.hotel {
            self.hotel = false;
            self.houses = MAX_HOUSES;
            true
        } else if self.houses > 0 {
            self.houses -= 1;
            true
        } else {
            false
        }
    }

    pub fn mortgage_value(&self) -> Money {
        self.price / 2
    }

    /// Mortgage value plus 10% interest, rounded down
    pub fn unmortgage_cost(&self) -> Money {
        let value = self.mortgage_value();
        value + value / 10
    }

    /// Returns the payout, or 0 if the deed is already mortgaged or improved
    pub fn mortgage(&mut self) -> Money {
        if self.mortgaged || self.has_buildings() {
            return 0;
        }
        self.mortgaged = true;
        self.mortgage_value()
    }

    /// Returns the cost to lift the mortgage, or 0 if it was not mortgaged
    pub fn unmortgage(&mut self) -> Money {
        if !self.mortgaged {
            return 0;
        }
        self.mortgaged = false;
        self.unmortgage_cost()
    }

    /// Back to the bank with no improvements
    fn reset(&mut self) {
        self.owner = None;
        self.houses = 0;
        self.hotel = false;
        self.mortgaged = false;
    }
}

/// All deeds on the board, keyed by position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyLedger {
    properties: Vec<Property>,
}

impl PropertyLedger {
    /// The 28 deeds of the classic board
    pub fn standard() -> Self {
        use ColorGroup::*;

        let deeds = [
            ("Mediterranean Avenue", 60, Brown, 1),
            ("Baltic Avenue", 60, Brown, 3),
            ("Oriental Avenue", 100, LightBlue, 6),
            ("Vermont Avenue", 100, LightBlue, 8),
            ("Connecticut Avenue", 120, LightBlue, 9),
            ("St. Charles Place", 140, Pink, 11),
            ("States Avenue", 140, Pink, 13),
            ("Virginia Avenue", 160, Pink, 14),
            ("St. James Place", 180, Orange, 16),
            ("Tennessee Avenue", 180, Orange, 18),
            ("New York Avenue", 200, Orange, 19),
            ("Kentucky Avenue", 220, Red, 21),
            ("Indiana Avenue", 220, Red, 23),
            ("Illinois Avenue", 240, Red, 24),
            ("Atlantic Avenue", 260, Yellow, 26),
            ("Ventnor Avenue", 260, Yellow, 27),
            ("Marvin Gardens", 280, Yellow, 29),
            ("Pacific Avenue", 300, Green, 31),
            ("North Carolina Avenue", 300, Green, 32),
            ("Pennsylvania Avenue", 320, Green, 34),
            ("Park Place", 350, DarkBlue, 37),
            ("Boardwalk", 400, DarkBlue, 39),
            ("Reading Railroad", 200, Railroad, 5),
            ("Pennsylvania Railroad", 200, Railroad, 15),
            ("B&O Railroad", 200, Railroad, 25),
            ("Short Line", 200, Railroad, 35),
            ("Electric Company", 150, Utility, 12),
            ("Water Works", 150, Utility, 28),
        ];

        let mut properties: Vec<Property> = deeds
            .iter()
            .map(|&(name, price, group, position)| Property::new(name, price, group, position))
            .collect();
        properties.sort_by_key(|p| p.position);

        Self { properties }
    }

    pub fn get(&self, position: Position) -> Option<&Property> {
        self.properties.iter().find(|p| p.position == position)
    }

    pub fn get_mut(&mut self, position: Position) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.position == position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn owner_of(&self, position: Position) -> Option<PlayerId> {
        self.get(position).and_then(|p| p.owner)
    }

    /// Rent for the deed at `position` (0 for non-deed spaces)
    pub fn rent(&self, position: Position) -> Money {
        self.get(position).map_or(0, Property::rent)
    }

    /// Hand the deed to `new_owner` (or the bank). Payment is the caller's job.
    pub fn transfer_ownership(&mut self, position: Position, new_owner: Option<PlayerId>) -> bool {
        match self.get_mut(position) {
            Some(property) => {
                property.owner = new_owner;
                true
            }
            None => false,
        }
    }

    pub fn build_house(&mut self, position: Position) -> bool {
        self.get_mut(position).is_some_and(Property::build_house)
    }

    pub fn build_hotel(&mut self, position: Position) -> bool {
        self.get_mut(position).is_some_and(Property::build_hotel)
    }

    pub fn demolish(&mut self, position: Position) -> bool {
        self.get_mut(position).is_some_and(Property::demolish)
    }

    pub fn mortgage(&mut self, position: Position) -> Money {
        self.get_mut(position).map_or(0, Property::mortgage)
    }

    pub fn unmortgage(&mut self, position: Position) -> Money {
        self.get_mut(position).map_or(0, Property::unmortgage)
    }

    /// Positions of every deed held by `player`
    pub fn owned_by(&self, player: PlayerId) -> Vec<Position> {
        self.properties
            .iter()
            .filter(|p| p.owner == Some(player))
            .map(|p| p.position)
            .collect()
    }

    /// Return all of `player`'s deeds to the bank, unimproved and unmortgaged
    pub fn release_all(&mut self, player: PlayerId) -> Vec<Position> {
        let mut released = Vec::new();
        for property in self.properties.iter_mut().filter(|p| p.owner == Some(player)) {
            property.reset();
            released.push(property.position);
        }
        released
    }
}

impl Default for PropertyLedger {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{kind_of, BOARD_SIZE};

    fn owned(price: Money) -> Property {
        let mut property = Property::new("Test Avenue", price, ColorGroup::Orange, 16);
        property.owner = Some(0);
        property
    }

    #[test]
    fn test_standard_ledger_matches_board() {
        let ledger = PropertyLedger::standard();
        assert_eq!(ledger.len(), 28);

        for position in 0..BOARD_SIZE {
            assert_eq!(
                ledger.get(position).is_some(),
                kind_of(position).is_purchasable(),
                "deed presence mismatch at {position}"
            );
        }
    }

    #[test]
    fn test_rent_zero_when_unowned_or_mortgaged() {
        let mut property = Property::new("Boardwalk", 400, ColorGroup::DarkBlue, 39);
        assert_eq!(property.rent(), 0);

        property.owner = Some(1);
        assert_eq!(property.rent(), 40);

        property.mortgaged = true;
        assert_eq!(property.rent(), 0);
    }

    #[test]
    fn test_rent_non_decreasing_with_improvements() {
        let mut property = owned(200);
        let mut last = property.rent();
        assert_eq!(last, 20);

        for expected in [40, 60, 80, 100] {
            assert!(property.build_house());
            assert_eq!(property.rent(), expected);
            assert!(property.rent() >= last);
            last = property.rent();
        }

        assert!(property.build_hotel());
        assert_eq!(property.rent(), 100);
        assert!(property.rent() >= last);
    }

    #[test]
    fn test_house_limits() {
        let mut property = owned(180);
        for _ in 0..4 {
            assert!(property.build_house());
        }
        assert!(!property.build_house());
        assert!(property.build_hotel());
        assert!(property.hotel);
        assert_eq!(property.houses, 0);
        assert!(!property.build_house());
        assert!(!property.build_hotel());
    }

    #[test]
    fn test_cannot_build_unowned_mortgaged_or_railroad() {
        let mut unowned = Property::new("Test", 100, ColorGroup::Pink, 11);
        assert!(!unowned.build_house());

        let mut mortgaged = owned(100);
        mortgaged.mortgaged = true;
        assert!(!mortgaged.build_house());
        assert!(!mortgaged.demolish());

        let mut railroad = Property::new("Reading Railroad", 200, ColorGroup::Railroad, 5);
        railroad.owner = Some(0);
        assert!(!railroad.build_house());
    }

    #[test]
    fn test_demolish_hotel_returns_four_houses() {
        let mut property = owned(100);
        for _ in 0..4 {
            property.build_house();
        }
        property.build_hotel();

        assert!(property.demolish());
        assert!(!property.hotel);
        assert_eq!(property.houses, 4);
    }

    #[test]
    fn test_mortgage_cycle() {
        let mut property = owned(60);
        assert_eq!(property.mortgage(), 30);
        assert!(property.mortgaged);
        assert_eq!(property.mortgage(), 0);

        assert_eq!(property.unmortgage(), 33);
        assert!(!property.mortgaged);
        assert_eq!(property.unmortgage(), 0);
    }

    #[test]
    fn test_cannot_mortgage_improved() {
        let mut property = owned(100);
        property.build_house();
        assert_eq!(property.mortgage(), 0);
        assert!(!property.mortgaged);
    }

    #[test]
    fn test_unmortgage_cost_rounds_down() {
        let property = Property::new("Electric Company", 150, ColorGroup::Utility, 12);
        assert_eq!(property.unmortgage_cost(), 82);
    }

    #[test]
    fn test_release_all_resets_deeds() {
        let mut ledger = PropertyLedger::standard();
        ledger.transfer_ownership(1, Some(2));
        ledger.transfer_ownership(3, Some(2));
        ledger.build_house(1);
        ledger.mortgage(3);

        let mut released = ledger.release_all(2);
        released.sort();
        assert_eq!(released, vec![1, 3]);
        assert!(ledger.owned_by(2).is_empty());

        let deed = ledger.get(1).unwrap();
        assert_eq!(deed.houses, 0);
        assert!(!ledger.get(3).unwrap().mortgaged);
    }
}
