//! Commands the input layer can issue and the events the engine reports.
//!
//! Commands always act on behalf of the current player; raw device input
//! never reaches the engine.

use crate::board::{Money, PlayerId, Position};
use crate::cards::DeckKind;
use crate::dice::DiceRoll;
use crate::subgame::Point;
use serde::{Deserialize, Serialize};

/// All discrete commands the engine accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    // ==================== Setup ====================
    /// Seat 1-6 players and start the game
    SelectPlayerCount(u8),

    // ==================== Turn Actions ====================
    /// Roll the dice (or serve a jail turn)
    RollDice,
    /// Answer a purchase offer: buy (true) or decline (false)
    BuyDecision(bool),
    /// Put the offered deed up for auction instead of buying it
    StartAuction,
    /// Sell the deed under the current player's token back to the bank
    SellDecision,

    // ==================== Property Management ====================
    BuildHouse(Position),
    BuildHotel(Position),
    /// Remove one improvement level for half its cost
    SellBuilding(Position),
    Mortgage(Position),
    Unmortgage(Position),

    // ==================== Jail ====================
    PayJailFine,
    UseJailCard,
    StartJailEscape,

    // ==================== Sub-games ====================
    StartBonusRoll,
    /// Raise (+10) or lower (-10) the standing auction bid
    BidAdjust(Money),
    /// Point at a spot in the jail escape field
    KeySelect(Point),
    /// Confirm a finished sub-game and apply its result
    Acknowledge,

    /// Abandon the game
    Quit,
}

/// How a player got out of jail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JailRelease {
    PaidFine,
    UsedCard,
    FoundKey,
}

/// Events that occur as a result of commands and ticks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Players were seated and the first turn began
    GameStarted { players: u8 },

    /// Dice were rolled
    DiceRolled { player: PlayerId, roll: DiceRoll },

    /// A token finished moving
    PlayerMoved {
        player: PlayerId,
        from: Position,
        to: Position,
    },

    /// Salary paid for wrapping past GO
    PassedGo { player: PlayerId, salary: Money },

    /// An unowned deed is waiting for a buy/decline answer
    PurchaseOffered {
        player: PlayerId,
        position: Position,
        price: Money,
        money: Money,
    },

    PropertyBought {
        player: PlayerId,
        position: Position,
        price: Money,
    },

    PurchaseDeclined { player: PlayerId, position: Position },

    PropertySold {
        player: PlayerId,
        position: Position,
        proceeds: Money,
    },

    RentPaid {
        payer: PlayerId,
        owner: PlayerId,
        position: Position,
        amount: Money,
    },

    TaxPaid { player: PlayerId, amount: Money },

    CardDrawn {
        player: PlayerId,
        deck: DeckKind,
        text: String,
    },

    MoneyReceived { player: PlayerId, amount: Money },

    MoneyPaid { player: PlayerId, amount: Money },

    /// Cash moved directly between two players by a card
    MoneyTransferred {
        from: PlayerId,
        to: PlayerId,
        amount: Money,
    },

    JailCardGranted { player: PlayerId },

    SentToJail { player: PlayerId },

    /// A jailed player rolled and stayed put
    JailTurnServed {
        player: PlayerId,
        turns_remaining: u8,
    },

    ReleasedFromJail {
        player: PlayerId,
        method: JailRelease,
    },

    HouseBuilt {
        player: PlayerId,
        position: Position,
        houses: u8,
    },

    HotelBuilt { player: PlayerId, position: Position },

    BuildingSold {
        player: PlayerId,
        position: Position,
        refund: Money,
    },

    PropertyMortgaged {
        player: PlayerId,
        position: Position,
        payout: Money,
    },

    PropertyUnmortgaged {
        player: PlayerId,
        position: Position,
        cost: Money,
    },

    AuctionStarted {
        player: PlayerId,
        position: Position,
        opening_bid: Money,
    },

    BidChanged { bid: Money },

    AuctionClosed { position: Position, final_bid: Money },

    /// The auction result was applied; `winner` is `None` if nobody could pay
    AuctionSettled {
        position: Position,
        winner: Option<PlayerId>,
        amount: Money,
    },

    BonusRollStarted { player: PlayerId },

    BonusRollResolved { roll: DiceRoll },

    BonusAwarded { player: PlayerId, amount: Money },

    JailEscapeStarted { player: PlayerId },

    KeyFound { player: PlayerId },

    JailEscapeFailed { player: PlayerId },

    /// Doubles: the same player goes again
    ExtraTurn { player: PlayerId, doubles_streak: u8 },

    /// Turn ended
    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
    },

    /// Player is out; their deeds went back to the bank
    PlayerBankrupt {
        player: PlayerId,
        released: Vec<Position>,
    },

    GameOver { winner: Option<PlayerId> },

    GameQuit,

    /// A queued command was refused and had no effect
    CommandRejected { command: Command, reason: String },
}
