//! Core turn engine.
//!
//! This module contains the main `GameState` struct and all game logic:
//! rolling, movement, landing resolution, purchases, rent, cards, jail,
//! bankruptcy and the hand-off to and from sub-games.

use crate::actions::{Command, GameEvent, JailRelease};
use crate::board::{self, Corner, Money, PlayerId, Position, SpaceKind};
use crate::cards::{Card, CardDeck, CardEffect, DeckKind};
use crate::config::GameConfig;
use crate::dice::DiceRoll;
use crate::player::{Player, MAX_PLAYERS};
use crate::property::{Property, PropertyLedger};
use crate::subgame::{Auction, BonusRoll, EscapeStatus, JailEscape, BID_INCREMENT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Turn phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Waiting for the number of players
    SelectingPlayers,

    /// Current player must roll (or manage deeds, or leave jail)
    AwaitingRoll,

    /// Token is travelling; landing resolves when the clock runs out
    Moving { roll: DiceRoll, ticks_remaining: u32 },

    /// Landed on an unowned deed; buy, decline or auction
    AwaitingPurchaseDecision { position: Position },

    InAuction(Auction),

    /// Bonus dice mini-game
    InMinigame(BonusRoll),

    InJailEscape(JailEscape),

    /// Game is over; no winner when quit or when nobody is left
    Finished { winner: Option<PlayerId> },
}

/// Errors that can occur when applying commands. A rejected command never
/// changes the game state.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Invalid command for current phase")]
    InvalidPhase,

    #[error("Player count must be 1-6, got {0}")]
    InvalidPlayerCount(u8),

    #[error("Cannot afford this: need {needed}, have {available}")]
    CannotAfford { needed: Money, available: Money },

    #[error("No deed for sale here")]
    NotPurchasable,

    #[error("You don't own that property")]
    NotOwner,

    #[error("Property has buildings")]
    HasBuildings,

    #[error("Property is mortgaged")]
    PropertyMortgaged,

    #[error("Cannot build there")]
    BuildNotAllowed,

    #[error("Cannot mortgage that property")]
    MortgageNotAllowed,

    #[error("Property is not mortgaged")]
    NotMortgaged,

    #[error("Bids move in steps of 10")]
    InvalidBid,

    #[error("Bid cannot go below {minimum}")]
    BidBelowMinimum { minimum: Money },

    #[error("Not in jail")]
    NotInJail,

    #[error("Not allowed while in jail")]
    InJail,

    #[error("No Get Out of Jail Free card")]
    NoJailCard,

    #[error("Already tried to escape this turn")]
    EscapeAlreadyAttempted,

    #[error("Dice faces must be 1-6, got {first} and {second}")]
    InvalidRoll { first: u8, second: u8 },

    #[error("Game is over")]
    GameOver,
}

/// Where a landing left the turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Landing {
    Settled,
    AwaitingDecision(Position),
}

/// The complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    /// All players, indexed by seat
    pub players: Vec<Player>,
    /// Deed ownership and improvements
    pub ledger: PropertyLedger,
    pub chance_deck: CardDeck,
    pub community_chest_deck: CardDeck,
    /// Current player index
    pub current_player: PlayerId,
    /// Current turn phase
    pub phase: TurnPhase,
    /// Turn number (starts at 1 once players are seated)
    pub turn_number: u32,
    /// Last dice roll of the current turn
    pub dice_roll: Option<DiceRoll>,
    /// Consecutive doubles rolled by the current player
    pub doubles_streak: u8,
    /// Most recently drawn card, for display
    pub last_card: Option<(DeckKind, Card)>,
    /// Doubles earned another roll once this turn completes
    extra_turn: bool,
    /// One jail escape attempt per turn
    escape_attempted: bool,
    /// Commands waiting for the next tick
    queue: VecDeque<Command>,
    rng: StdRng,
    /// Random number generator seed (for deterministic replays)
    rng_seed: u64,
}

impl GameState {
    /// Create a game waiting for the player count, seeded for replays
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let repairs = config.repair_rates();
        let chance_deck = CardDeck::new(DeckKind::Chance, repairs, &mut rng);
        let community_chest_deck = CardDeck::new(DeckKind::CommunityChest, repairs, &mut rng);

        Self {
            config,
            players: Vec::new(),
            ledger: PropertyLedger::standard(),
            chance_deck,
            community_chest_deck,
            current_player: 0,
            phase: TurnPhase::SelectingPlayers,
            turn_number: 0,
            dice_roll: None,
            doubles_streak: 0,
            last_card: None,
            extra_turn: false,
            escape_attempted: false,
            queue: VecDeque::new(),
            rng,
            rng_seed: seed,
        }
    }

    /// Create a game with a random seed
    pub fn new_random(config: GameConfig) -> Self {
        Self::new(config, rand::thread_rng().gen())
    }

    /// Create a game with players already seated
    pub fn with_players(
        config: GameConfig,
        player_names: Vec<String>,
        seed: u64,
    ) -> Result<Self, GameError> {
        let mut game = Self::new(config, seed);
        game.seat_players(player_names)?;
        Ok(game)
    }

    pub fn seed(&self) -> u64 {
        self.rng_seed
    }

    /// Get the number of players (bankrupt ones included)
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Get a player by ID
    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id as usize]
    }

    fn current(&self) -> &Player {
        &self.players[self.current_player as usize]
    }

    /// Players still in the rotation
    pub fn active_players(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.id)
            .collect()
    }

    /// Check if the game is finished
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, TurnPhase::Finished { .. })
    }

    /// Get the winner if the game is finished
    pub fn get_winner(&self) -> Option<PlayerId> {
        if let TurnPhase::Finished { winner } = self.phase {
            winner
        } else {
            None
        }
    }

    /// Queue a command for the next tick
    pub fn enqueue(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    pub fn pending_commands(&self) -> usize {
        self.queue.len()
    }

    /// Advance the game one step: apply queued commands in arrival order,
    /// then move the active clock forward once.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();

        while let Some(command) = self.queue.pop_front() {
            match self.apply_command(command.clone()) {
                Ok(applied) => events.extend(applied),
                Err(err) => {
                    warn!(?command, %err, "command rejected");
                    events.push(GameEvent::CommandRejected {
                        command,
                        reason: err.to_string(),
                    });
                }
            }
        }

        events.extend(self.advance_clock());
        events
    }

    /// Run the clock until the travelling token has landed
    pub fn settle(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while matches!(self.phase, TurnPhase::Moving { .. }) {
            events.extend(self.advance_clock());
        }
        events
    }

    fn advance_clock(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();

        match &mut self.phase {
            TurnPhase::Moving {
                roll,
                ticks_remaining,
            } => {
                *ticks_remaining = ticks_remaining.saturating_sub(1);
                if *ticks_remaining == 0 {
                    let roll = *roll;
                    self.finish_move(roll, &mut events);
                }
            }

            TurnPhase::InAuction(auction) => {
                if auction.tick() {
                    debug!(position = auction.position, "auction closed");
                    events.push(GameEvent::AuctionClosed {
                        position: auction.position,
                        final_bid: auction.current_bid,
                    });
                }
            }

            TurnPhase::InMinigame(bonus) => {
                if let Some(roll) = bonus.tick(&mut self.rng) {
                    events.push(GameEvent::BonusRollResolved { roll });
                }
            }

            TurnPhase::InJailEscape(escape) => {
                if escape.tick() {
                    let player = self.current_player;
                    debug!(player, "jail escape timed out");
                    events.push(GameEvent::JailEscapeFailed { player });
                    self.phase = TurnPhase::AwaitingRoll;
                }
            }

            TurnPhase::SelectingPlayers
            | TurnPhase::AwaitingRoll
            | TurnPhase::AwaitingPurchaseDecision { .. }
            | TurnPhase::Finished { .. } => {}
        }

        events
    }

    /// Get all commands the current state would accept (pointer commands
    /// for the jail escape are not enumerable and are left out)
    pub fn valid_commands(&self) -> Vec<Command> {
        let mut commands = Vec::new();

        match &self.phase {
            TurnPhase::Finished { .. } => return commands,

            TurnPhase::SelectingPlayers => {
                for count in 1..=MAX_PLAYERS {
                    commands.push(Command::SelectPlayerCount(count));
                }
            }

            TurnPhase::AwaitingRoll => {
                let player = self.current();
                commands.push(Command::RollDice);

                if player.in_jail() {
                    if player.can_afford(self.config.jail_fine) {
                        commands.push(Command::PayJailFine);
                    }
                    if player.jail_cards > 0 {
                        commands.push(Command::UseJailCard);
                    }
                    if !self.escape_attempted {
                        commands.push(Command::StartJailEscape);
                    }
                } else {
                    commands.push(Command::StartBonusRoll);
                }

                if self.sell_price_here().is_ok() {
                    commands.push(Command::SellDecision);
                }
                commands.extend(self.management_commands());
            }

            TurnPhase::Moving { .. } => {}

            TurnPhase::AwaitingPurchaseDecision { position } => {
                let price = self.ledger.get(*position).map_or(0, |p| p.price);
                if self.current().can_afford(price) {
                    commands.push(Command::BuyDecision(true));
                }
                commands.push(Command::BuyDecision(false));
                commands.push(Command::StartAuction);
                commands.extend(self.management_commands());
            }

            TurnPhase::InAuction(auction) => {
                if auction.is_open() {
                    commands.push(Command::BidAdjust(BID_INCREMENT));
                    if auction.current_bid - BID_INCREMENT >= auction.min_bid {
                        commands.push(Command::BidAdjust(-BID_INCREMENT));
                    }
                } else {
                    commands.push(Command::Acknowledge);
                }
            }

            TurnPhase::InMinigame(bonus) => {
                if bonus.is_resolved() {
                    commands.push(Command::Acknowledge);
                }
            }

            TurnPhase::InJailEscape(escape) => {
                if escape.status == EscapeStatus::KeyFound {
                    commands.push(Command::Acknowledge);
                }
            }
        }

        commands.push(Command::Quit);
        commands
    }

    fn management_commands(&self) -> Vec<Command> {
        let player = self.current();
        let mut commands = Vec::new();

        for position in self.ledger.owned_by(player.id) {
            let Some(property) = self.ledger.get(position) else {
                continue;
            };
            let cost = property.group.building_cost().unwrap_or(0);

            if property.can_build_house() && player.can_afford(cost) {
                commands.push(Command::BuildHouse(position));
            }
            if property.can_build_hotel() && player.can_afford(cost) {
                commands.push(Command::BuildHotel(position));
            }
            if property.has_buildings() && !property.mortgaged {
                commands.push(Command::SellBuilding(position));
            }
            if !property.mortgaged && !property.has_buildings() {
                commands.push(Command::Mortgage(position));
            }
            if property.mortgaged && player.can_afford(property.unmortgage_cost()) {
                commands.push(Command::Unmortgage(position));
            }
        }

        commands
    }

    /// Apply a command on behalf of the current player
    pub fn apply_command(&mut self, command: Command) -> Result<Vec<GameEvent>, GameError> {
        // Check game not over
        if self.is_finished() {
            return Err(GameError::GameOver);
        }

        let mut events = Vec::new();
        let player = self.current_player;

        match command {
            // ==================== Setup ====================
            Command::SelectPlayerCount(count) => {
                if self.phase != TurnPhase::SelectingPlayers {
                    return Err(GameError::InvalidPhase);
                }
                if !(1..=MAX_PLAYERS).contains(&count) {
                    return Err(GameError::InvalidPlayerCount(count));
                }

                let names = (1..=count).map(|i| format!("Player {i}")).collect();
                self.seat_players(names)?;
                events.push(GameEvent::GameStarted { players: count });
            }

            Command::Quit => {
                info!("game quit");
                self.phase = TurnPhase::Finished { winner: None };
                events.push(GameEvent::GameQuit);
            }

            // ==================== Turn Actions ====================
            Command::RollDice => {
                self.expect_phase(TurnPhase::AwaitingRoll)?;
                let roll = DiceRoll::roll(&mut self.rng);
                return self.apply_roll(roll);
            }

            Command::BuyDecision(buy) => {
                let TurnPhase::AwaitingPurchaseDecision { position } = self.phase else {
                    return Err(GameError::InvalidPhase);
                };

                if buy {
                    let price = self
                        .ledger
                        .get(position)
                        .map(|p| p.price)
                        .ok_or(GameError::NotPurchasable)?;
                    self.expect_funds(price)?;

                    self.player_mut(player).pay(price);
                    self.assign_deed(position, Some(player));
                    info!(player, position, price, "property bought");
                    events.push(GameEvent::PropertyBought {
                        player,
                        position,
                        price,
                    });
                } else {
                    events.push(GameEvent::PurchaseDeclined { player, position });
                }

                self.complete_turn(&mut events);
            }

            Command::StartAuction => {
                let TurnPhase::AwaitingPurchaseDecision { position } = self.phase else {
                    return Err(GameError::InvalidPhase);
                };
                let price = self
                    .ledger
                    .get(position)
                    .map(|p| p.price)
                    .ok_or(GameError::NotPurchasable)?;

                let auction = Auction::new(position, price, player, self.config.auction_ticks);
                events.push(GameEvent::AuctionStarted {
                    player,
                    position,
                    opening_bid: auction.current_bid,
                });
                self.phase = TurnPhase::InAuction(auction);
            }

            Command::SellDecision => {
                self.expect_phase(TurnPhase::AwaitingRoll)?;
                let (position, proceeds) = self.sell_price_here()?;

                self.assign_deed(position, None);
                self.player_mut(player).receive(proceeds);
                info!(player, position, proceeds, "property sold to the bank");
                events.push(GameEvent::PropertySold {
                    player,
                    position,
                    proceeds,
                });
            }

            // ==================== Property Management ====================
            Command::BuildHouse(position) => {
                self.expect_management()?;
                let cost = self.building_cost(position)?;
                if !self.ledger.get(position).is_some_and(|p| p.can_build_house()) {
                    return Err(GameError::BuildNotAllowed);
                }
                self.expect_funds(cost)?;

                self.ledger.build_house(position);
                let houses = self.ledger.get(position).map_or(0, |p| p.houses);
                events.push(GameEvent::HouseBuilt {
                    player,
                    position,
                    houses,
                });
                self.debit(player, cost, &mut events);
            }

            Command::BuildHotel(position) => {
                self.expect_management()?;
                let cost = self.building_cost(position)?;
                if !self.ledger.get(position).is_some_and(|p| p.can_build_hotel()) {
                    return Err(GameError::BuildNotAllowed);
                }
                self.expect_funds(cost)?;

                self.ledger.build_hotel(position);
                events.push(GameEvent::HotelBuilt { player, position });
                self.debit(player, cost, &mut events);
            }

            Command::SellBuilding(position) => {
                self.expect_management()?;
                let cost = self.building_cost(position)?;
                if !self.ledger.demolish(position) {
                    return Err(GameError::BuildNotAllowed);
                }

                let refund = cost / 2;
                self.player_mut(player).receive(refund);
                events.push(GameEvent::BuildingSold {
                    player,
                    position,
                    refund,
                });
            }

            Command::Mortgage(position) => {
                self.expect_management()?;
                let property = self.owned_deed(position)?;
                if property.has_buildings() {
                    return Err(GameError::HasBuildings);
                }
                if property.mortgaged {
                    return Err(GameError::MortgageNotAllowed);
                }

                let payout = self.ledger.mortgage(position);
                self.player_mut(player).receive(payout);
                events.push(GameEvent::PropertyMortgaged {
                    player,
                    position,
                    payout,
                });
            }

            Command::Unmortgage(position) => {
                self.expect_management()?;
                let property = self.owned_deed(position)?;
                if !property.mortgaged {
                    return Err(GameError::NotMortgaged);
                }
                self.expect_funds(property.unmortgage_cost())?;

                let cost = self.ledger.unmortgage(position);
                events.push(GameEvent::PropertyUnmortgaged {
                    player,
                    position,
                    cost,
                });
                self.debit(player, cost, &mut events);
            }

            // ==================== Jail ====================
            Command::PayJailFine => {
                self.expect_jailed()?;
                let fine = self.config.jail_fine;
                self.expect_funds(fine)?;

                self.player_mut(player).release_from_jail();
                events.push(GameEvent::MoneyPaid {
                    player,
                    amount: fine,
                });
                events.push(GameEvent::ReleasedFromJail {
                    player,
                    method: JailRelease::PaidFine,
                });
                self.debit(player, fine, &mut events);
            }

            Command::UseJailCard => {
                self.expect_jailed()?;
                let p = self.player_mut(player);
                if !p.use_jail_card() {
                    return Err(GameError::NoJailCard);
                }
                p.release_from_jail();
                events.push(GameEvent::ReleasedFromJail {
                    player,
                    method: JailRelease::UsedCard,
                });
            }

            Command::StartJailEscape => {
                self.expect_jailed()?;
                if self.escape_attempted {
                    return Err(GameError::EscapeAlreadyAttempted);
                }

                self.escape_attempted = true;
                let escape = JailEscape::new(
                    &mut self.rng,
                    self.config.jail_escape_ticks,
                    self.config.key_tolerance,
                );
                events.push(GameEvent::JailEscapeStarted { player });
                self.phase = TurnPhase::InJailEscape(escape);
            }

            // ==================== Sub-games ====================
            Command::StartBonusRoll => {
                self.expect_phase(TurnPhase::AwaitingRoll)?;
                if self.current().in_jail() {
                    return Err(GameError::InJail);
                }

                // The bonus roll takes the place of this turn's movement
                self.extra_turn = false;
                events.push(GameEvent::BonusRollStarted { player });
                self.phase = TurnPhase::InMinigame(BonusRoll::new(self.config.bonus_roll_ticks));
            }

            Command::BidAdjust(delta) => {
                let TurnPhase::InAuction(auction) = &mut self.phase else {
                    return Err(GameError::InvalidPhase);
                };
                let bid = auction.adjust(delta)?;
                events.push(GameEvent::BidChanged { bid });
            }

            Command::KeySelect(point) => {
                let TurnPhase::InJailEscape(escape) = &mut self.phase else {
                    return Err(GameError::InvalidPhase);
                };
                if escape.status != EscapeStatus::Searching {
                    return Err(GameError::InvalidPhase);
                }
                if escape.select(point) {
                    events.push(GameEvent::KeyFound { player });
                }
            }

            Command::Acknowledge => {
                self.acknowledge_subgame(&mut events)?;
            }
        }

        Ok(events)
    }

    /// Apply a roll produced outside the engine (replays, tests). Jailed
    /// players serve a turn instead of moving.
    pub fn apply_roll(&mut self, roll: DiceRoll) -> Result<Vec<GameEvent>, GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver);
        }
        self.expect_phase(TurnPhase::AwaitingRoll)?;
        if !roll.is_valid() {
            warn!(?roll, "rejected out-of-range dice");
            return Err(GameError::InvalidRoll {
                first: roll.first(),
                second: roll.second(),
            });
        }

        let player = self.current_player;
        let mut events = vec![GameEvent::DiceRolled { player, roll }];
        self.dice_roll = Some(roll);

        if self.current().in_jail() {
            let p = self.player_mut(player);
            p.jail_turns -= 1;
            let turns_remaining = p.jail_turns;
            events.push(GameEvent::JailTurnServed {
                player,
                turns_remaining,
            });
            self.extra_turn = false;
            self.complete_turn(&mut events);
            return Ok(events);
        }

        if roll.is_doubles() {
            self.doubles_streak += 1;
            if self.config.three_doubles_to_jail && self.doubles_streak >= 3 {
                debug!(player, "third doubles in a row");
                self.send_to_jail(player, &mut events);
                self.complete_turn(&mut events);
                return Ok(events);
            }
            self.extra_turn = true;
        } else {
            self.extra_turn = false;
        }

        self.phase = TurnPhase::Moving {
            roll,
            ticks_remaining: self.config.move_ticks,
        };
        Ok(events)
    }

    // ==================== Helper Methods ====================

    fn seat_players(&mut self, player_names: Vec<String>) -> Result<(), GameError> {
        let count = player_names.len();
        if !(1..=MAX_PLAYERS as usize).contains(&count) {
            return Err(GameError::InvalidPlayerCount(count.min(u8::MAX as usize) as u8));
        }

        self.players = player_names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Player::new(i as PlayerId, name, self.config.starting_money))
            .collect();
        self.current_player = 0;
        self.turn_number = 1;
        self.phase = TurnPhase::AwaitingRoll;

        info!(players = count, seed = self.rng_seed, "game started");
        Ok(())
    }

    fn expect_phase(&self, phase: TurnPhase) -> Result<(), GameError> {
        if self.phase != phase {
            return Err(GameError::InvalidPhase);
        }
        Ok(())
    }

    /// Deeds can be managed before rolling or while a purchase is pending
    fn expect_management(&self) -> Result<(), GameError> {
        match self.phase {
            TurnPhase::AwaitingRoll | TurnPhase::AwaitingPurchaseDecision { .. } => Ok(()),
            _ => Err(GameError::InvalidPhase),
        }
    }

    fn expect_jailed(&self) -> Result<(), GameError> {
        self.expect_phase(TurnPhase::AwaitingRoll)?;
        if !self.current().in_jail() {
            return Err(GameError::NotInJail);
        }
        Ok(())
    }

    fn expect_funds(&self, amount: Money) -> Result<(), GameError> {
        let player = self.current();
        if !player.can_afford(amount) {
            return Err(GameError::CannotAfford {
                needed: amount,
                available: player.money,
            });
        }
        Ok(())
    }

    /// A deed the current player owns
    fn owned_deed(&self, position: Position) -> Result<&Property, GameError> {
        let property = self.ledger.get(position).ok_or(GameError::NotPurchasable)?;
        if property.owner != Some(self.current_player) {
            return Err(GameError::NotOwner);
        }
        Ok(property)
    }

    fn building_cost(&self, position: Position) -> Result<Money, GameError> {
        let property = self.owned_deed(position)?;
        if property.mortgaged {
            return Err(GameError::PropertyMortgaged);
        }
        property.group.building_cost().ok_or(GameError::BuildNotAllowed)
    }

    /// The deed under the current player's token and what the bank pays for it
    fn sell_price_here(&self) -> Result<(Position, Money), GameError> {
        let position = self.current().position;
        let property = self.owned_deed(position)?;
        if property.has_buildings() {
            return Err(GameError::HasBuildings);
        }
        if property.mortgaged {
            return Err(GameError::PropertyMortgaged);
        }
        Ok((position, property.price / 2))
    }

    /// Move a deed to a new owner, keeping the player's deed set and the
    /// ledger in agreement
    fn assign_deed(&mut self, position: Position, new_owner: Option<PlayerId>) {
        if let Some(previous) = self.ledger.owner_of(position) {
            self.player_mut(previous).properties.remove(&position);
        }
        self.ledger.transfer_ownership(position, new_owner);
        if let Some(owner) = new_owner {
            self.player_mut(owner).properties.insert(position);
        }
    }

    /// Take money from a player, then see whether that finished them
    fn debit(&mut self, player: PlayerId, amount: Money, events: &mut Vec<GameEvent>) {
        self.player_mut(player).pay(amount);
        self.check_bankruptcy(player, events);
    }

    fn check_bankruptcy(&mut self, player: PlayerId, events: &mut Vec<GameEvent>) {
        let p = &self.players[player as usize];
        if p.bankrupt || !p.is_insolvent(&self.ledger) {
            return;
        }

        let released = self.ledger.release_all(player);
        let p = self.player_mut(player);
        p.bankrupt = true;
        p.properties.clear();
        p.jail_turns = 0;

        info!(player, money = p.money, "player bankrupt");
        events.push(GameEvent::PlayerBankrupt { player, released });
        self.check_game_over(events);
    }

    fn check_game_over(&mut self, events: &mut Vec<GameEvent>) {
        let active = self.active_players();
        let over = if self.players.len() > 1 {
            active.len() <= 1
        } else {
            active.is_empty()
        };
        if !over {
            return;
        }

        let winner = if self.players.len() > 1 {
            active.first().copied()
        } else {
            None
        };
        info!(?winner, "game over");
        self.phase = TurnPhase::Finished { winner };
        events.push(GameEvent::GameOver { winner });
    }

    fn pay_salary(&mut self, player: PlayerId, events: &mut Vec<GameEvent>) {
        let salary = self.config.go_salary;
        self.player_mut(player).receive(salary);
        events.push(GameEvent::PassedGo { player, salary });
    }

    fn send_to_jail(&mut self, player: PlayerId, events: &mut Vec<GameEvent>) {
        let turns = self.config.jail_turns;
        self.player_mut(player).go_to_jail(turns);
        if player == self.current_player {
            self.extra_turn = false;
            self.doubles_streak = 0;
        }
        info!(player, "sent to jail");
        events.push(GameEvent::SentToJail { player });
    }

    fn finish_move(&mut self, roll: DiceRoll, events: &mut Vec<GameEvent>) {
        let player = self.current_player;
        let p = self.player_mut(player);
        let from = p.position;
        let passed_go = p.advance(roll.total());
        let to = p.position;

        debug!(player, from, to, "token moved");
        events.push(GameEvent::PlayerMoved { player, from, to });
        if passed_go {
            self.pay_salary(player, events);
        }

        let landing = self.resolve_landing(player, events);
        if self.is_finished() {
            return;
        }
        match landing {
            Landing::AwaitingDecision(position) => {
                self.phase = TurnPhase::AwaitingPurchaseDecision { position };
            }
            Landing::Settled => self.complete_turn(events),
        }
    }

    fn resolve_landing(&mut self, player: PlayerId, events: &mut Vec<GameEvent>) -> Landing {
        let position = self.players[player as usize].position;

        match board::kind_of(position) {
            SpaceKind::Property | SpaceKind::Railroad | SpaceKind::Utility => {
                return self.resolve_deed(player, position, events);
            }
            SpaceKind::Tax(amount) => {
                events.push(GameEvent::TaxPaid { player, amount });
                self.debit(player, amount, events);
            }
            SpaceKind::Chance => return self.draw_card(player, DeckKind::Chance, events),
            SpaceKind::CommunityChest => {
                return self.draw_card(player, DeckKind::CommunityChest, events);
            }
            SpaceKind::Corner(Corner::GoToJail) => self.send_to_jail(player, events),
            SpaceKind::Corner(Corner::Go | Corner::Jail | Corner::FreeParking) => {}
        }

        Landing::Settled
    }

    fn resolve_deed(
        &mut self,
        player: PlayerId,
        position: Position,
        events: &mut Vec<GameEvent>,
    ) -> Landing {
        let Some(property) = self.ledger.get(position) else {
            warn!(position, "no deed at purchasable space");
            return Landing::Settled;
        };
        let (owner, mortgaged, price) = (property.owner, property.mortgaged, property.price);
        let rent = self.ledger.rent(position);

        match owner {
            None => {
                events.push(GameEvent::PurchaseOffered {
                    player,
                    position,
                    price,
                    money: self.players[player as usize].money,
                });
                Landing::AwaitingDecision(position)
            }
            Some(owner) if owner == player || mortgaged => Landing::Settled,
            Some(owner) => {
                if rent > 0 {
                    debug!(player, owner, position, rent, "rent due");
                    events.push(GameEvent::RentPaid {
                        payer: player,
                        owner,
                        position,
                        amount: rent,
                    });
                    self.player_mut(owner).receive(rent);
                    self.debit(player, rent, events);
                }
                Landing::Settled
            }
        }
    }

    fn draw_card(&mut self, player: PlayerId, kind: DeckKind, events: &mut Vec<GameEvent>) -> Landing {
        let deck = match kind {
            DeckKind::Chance => &mut self.chance_deck,
            DeckKind::CommunityChest => &mut self.community_chest_deck,
        };
        let Some(card) = deck.draw(&mut self.rng) else {
            warn!(deck = ?kind, "deck empty after recycling");
            return Landing::Settled;
        };

        info!(player, deck = ?kind, card = %card.text, "card drawn");
        events.push(GameEvent::CardDrawn {
            player,
            deck: kind,
            text: card.text.clone(),
        });
        let effect = card.effect;
        self.last_card = Some((kind, card));
        self.apply_card(player, effect, events)
    }

    fn apply_card(
        &mut self,
        player: PlayerId,
        effect: CardEffect,
        events: &mut Vec<GameEvent>,
    ) -> Landing {
        match effect {
            CardEffect::MoveAbsolute(target) => {
                self.card_move_to(player, target, events);
                return self.resolve_landing(player, events);
            }

            CardEffect::MoveNearest(kind) => {
                let target = board::nearest_of_kind(self.players[player as usize].position, kind);
                self.card_move_to(player, target, events);
                return self.resolve_landing(player, events);
            }

            CardEffect::MoveRelative(delta) => {
                let p = self.player_mut(player);
                let from = p.position;
                let passed_go = if delta < 0 {
                    p.step_back(delta.unsigned_abs());
                    false
                } else {
                    p.advance(delta.unsigned_abs())
                };
                let to = p.position;

                events.push(GameEvent::PlayerMoved { player, from, to });
                if passed_go {
                    self.pay_salary(player, events);
                }
                return self.resolve_landing(player, events);
            }

            CardEffect::ReceiveMoney(amount) => {
                self.player_mut(player).receive(amount);
                events.push(GameEvent::MoneyReceived { player, amount });
            }

            CardEffect::PayMoney(amount) => {
                events.push(GameEvent::MoneyPaid { player, amount });
                self.debit(player, amount, events);
            }

            CardEffect::GrantJailCard => {
                self.player_mut(player).add_jail_card();
                events.push(GameEvent::JailCardGranted { player });
            }

            CardEffect::SendToJail => self.send_to_jail(player, events),

            CardEffect::PayRepairs {
                per_house,
                per_hotel,
            } => {
                let amount: Money = self
                    .ledger
                    .iter()
                    .filter(|p| p.owner == Some(player))
                    .map(|p| {
                        let hotel = if p.hotel { per_hotel } else { 0 };
                        Money::from(p.houses) * per_house + hotel
                    })
                    .sum();

                if amount > 0 {
                    events.push(GameEvent::MoneyPaid { player, amount });
                    self.debit(player, amount, events);
                }
            }

            CardEffect::PayEachPlayer(amount) => {
                let others: Vec<PlayerId> = self
                    .active_players()
                    .into_iter()
                    .filter(|&id| id != player)
                    .collect();

                for &other in &others {
                    self.player_mut(other).receive(amount);
                    events.push(GameEvent::MoneyTransferred {
                        from: player,
                        to: other,
                        amount,
                    });
                }
                self.debit(player, amount * others.len() as Money, events);
            }

            CardEffect::CollectFromEachPlayer(amount) => {
                let others: Vec<PlayerId> = self
                    .active_players()
                    .into_iter()
                    .filter(|&id| id != player)
                    .collect();

                for other in others {
                    self.player_mut(player).receive(amount);
                    events.push(GameEvent::MoneyTransferred {
                        from: other,
                        to: player,
                        amount,
                    });
                    self.debit(other, amount, events);
                }
            }
        }

        Landing::Settled
    }

    /// Forward card move; pays salary when it wraps past GO
    fn card_move_to(&mut self, player: PlayerId, target: Position, events: &mut Vec<GameEvent>) {
        let p = self.player_mut(player);
        let from = p.position;
        let passed_go = p.advance_to(target);

        events.push(GameEvent::PlayerMoved {
            player,
            from,
            to: target,
        });
        if passed_go {
            self.pay_salary(player, events);
        }
    }

    fn acknowledge_subgame(&mut self, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
        let player = self.current_player;

        match &self.phase {
            TurnPhase::InAuction(auction) if !auction.is_open() => {
                let (position, amount, bidder) =
                    (auction.position, auction.current_bid, auction.bidder);

                let winner = if self.players[bidder as usize].can_afford(amount) {
                    self.player_mut(bidder).pay(amount);
                    self.assign_deed(position, Some(bidder));
                    info!(player = bidder, position, amount, "auction won");
                    Some(bidder)
                } else {
                    None
                };
                events.push(GameEvent::AuctionSettled {
                    position,
                    winner,
                    amount,
                });
                self.complete_turn(events);
            }

            TurnPhase::InMinigame(bonus) if bonus.is_resolved() => {
                let amount = bonus.reward().unwrap_or(0);
                self.player_mut(player).receive(amount);
                events.push(GameEvent::BonusAwarded { player, amount });
                self.complete_turn(events);
            }

            TurnPhase::InJailEscape(escape) if escape.status == EscapeStatus::KeyFound => {
                self.player_mut(player).release_from_jail();
                events.push(GameEvent::ReleasedFromJail {
                    player,
                    method: JailRelease::FoundKey,
                });
                self.phase = TurnPhase::AwaitingRoll;
            }

            _ => return Err(GameError::InvalidPhase),
        }

        Ok(())
    }

    /// End the current turn: the same player goes again after doubles,
    /// otherwise the next player still in the game is up
    fn complete_turn(&mut self, events: &mut Vec<GameEvent>) {
        if self.is_finished() {
            return;
        }

        let player = self.current_player;
        let p = self.current();
        if self.extra_turn && p.is_active() && !p.in_jail() {
            self.extra_turn = false;
            self.phase = TurnPhase::AwaitingRoll;
            debug!(player, streak = self.doubles_streak, "extra turn");
            events.push(GameEvent::ExtraTurn {
                player,
                doubles_streak: self.doubles_streak,
            });
            return;
        }

        let next_player = self.next_active_player(player);
        self.current_player = next_player;
        self.turn_number += 1;
        self.dice_roll = None;
        self.doubles_streak = 0;
        self.extra_turn = false;
        self.escape_attempted = false;
        self.phase = TurnPhase::AwaitingRoll;

        events.push(GameEvent::TurnEnded {
            player,
            next_player,
        });
    }

    fn next_active_player(&self, from: PlayerId) -> PlayerId {
        let count = self.players.len();
        (1..=count)
            .map(|step| ((from as usize + step) % count) as PlayerId)
            .find(|&id| self.players[id as usize].is_active())
            .unwrap_or(from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_player_game() -> GameState {
        GameState::with_players(
            GameConfig::default(),
            vec!["A".into(), "B".into()],
            1,
        )
        .unwrap()
    }

    fn roll(first: u8, second: u8) -> DiceRoll {
        DiceRoll::new(first, second).unwrap()
    }

    #[test]
    fn test_new_game_waits_for_player_count() {
        let game = GameState::new(GameConfig::default(), 5);
        assert_eq!(game.phase, TurnPhase::SelectingPlayers);
        assert_eq!(game.chance_deck.len(), 16);
        assert_eq!(game.community_chest_deck.len(), 16);

        let commands = game.valid_commands();
        assert!(commands.contains(&Command::SelectPlayerCount(6)));
        assert!(!commands.contains(&Command::RollDice));
    }

    #[test]
    fn test_select_player_count_bounds() {
        let mut game = GameState::new(GameConfig::default(), 5);
        assert_eq!(
            game.apply_command(Command::SelectPlayerCount(7)),
            Err(GameError::InvalidPlayerCount(7))
        );
        assert_eq!(
            game.apply_command(Command::SelectPlayerCount(0)),
            Err(GameError::InvalidPlayerCount(0))
        );

        game.apply_command(Command::SelectPlayerCount(3)).unwrap();
        assert_eq!(game.player_count(), 3);
        assert_eq!(game.players[2].name, "Player 3");
        assert_eq!(game.players[2].money, 500);
        assert_eq!(game.phase, TurnPhase::AwaitingRoll);
    }

    #[test]
    fn test_roll_enters_moving_then_lands() {
        let mut game = two_player_game();
        game.apply_roll(roll(2, 3)).unwrap();
        assert!(matches!(game.phase, TurnPhase::Moving { .. }));

        let events = game.settle();
        assert!(events.contains(&GameEvent::PlayerMoved {
            player: 0,
            from: 0,
            to: 5
        }));
        assert_eq!(
            game.phase,
            TurnPhase::AwaitingPurchaseDecision { position: 5 }
        );
    }

    #[test]
    fn test_move_takes_configured_ticks() {
        let mut game = two_player_game();
        game.apply_roll(roll(1, 2)).unwrap();

        for _ in 0..game.config.move_ticks - 1 {
            game.tick();
            assert!(matches!(game.phase, TurnPhase::Moving { .. }));
        }
        game.tick();
        assert_eq!(game.players[0].position, 3);
    }

    #[test]
    fn test_out_of_range_roll_is_rejected() {
        let mut game = two_player_game();
        let bad: DiceRoll = serde_json::from_str(r#"{"first":200,"second":100}"#).unwrap();

        assert_eq!(
            game.apply_roll(bad),
            Err(GameError::InvalidRoll {
                first: 200,
                second: 100
            })
        );
        assert_eq!(game.phase, TurnPhase::AwaitingRoll);
        assert_eq!(game.dice_roll, None);
        assert!(game.settle().is_empty());
        assert_eq!(game.players[0].position, 0);
    }

    #[test]
    fn test_rejected_command_leaves_state_unchanged() {
        let mut game = two_player_game();
        let before = game.players.clone();

        assert_eq!(
            game.apply_command(Command::BuyDecision(true)),
            Err(GameError::InvalidPhase)
        );
        assert_eq!(game.apply_command(Command::PayJailFine), Err(GameError::NotInJail));
        assert_eq!(game.players, before);
        assert_eq!(game.phase, TurnPhase::AwaitingRoll);
    }

    #[test]
    fn test_tick_reports_rejections_in_order() {
        let mut game = two_player_game();
        game.enqueue(Command::Acknowledge);
        game.enqueue(Command::StartBonusRoll);
        let events = game.tick();

        assert!(matches!(
            events[0],
            GameEvent::CommandRejected {
                command: Command::Acknowledge,
                ..
            }
        ));
        assert_eq!(events[1], GameEvent::BonusRollStarted { player: 0 });
        assert_eq!(game.pending_commands(), 0);
    }

    #[test]
    fn test_next_active_player_skips_bankrupt() {
        let mut game = GameState::with_players(
            GameConfig::default(),
            vec!["A".into(), "B".into(), "C".into()],
            1,
        )
        .unwrap();
        game.players[1].bankrupt = true;
        assert_eq!(game.next_active_player(0), 2);
        assert_eq!(game.next_active_player(2), 0);
    }

    #[test]
    fn test_quit_finishes_without_winner() {
        let mut game = two_player_game();
        let events = game.apply_command(Command::Quit).unwrap();
        assert_eq!(events, vec![GameEvent::GameQuit]);
        assert!(game.is_finished());
        assert_eq!(game.get_winner(), None);
        assert_eq!(game.apply_command(Command::RollDice), Err(GameError::GameOver));
    }
}
