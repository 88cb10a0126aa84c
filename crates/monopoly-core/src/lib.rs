//! Monopoly - a tick-driven Monopoly-style board game engine
//!
//! This crate provides the core game logic, including:
//! - The 40-space board and its deeds
//! - Player money, movement and jail state
//! - Chance and Community Chest decks
//! - A turn state machine with full rule enforcement
//! - Timed sub-games: auctions, bonus rolls and the jail escape
//!
//! # Architecture
//!
//! The engine never reads devices and never draws. Callers translate input
//! into [`Command`]s, queue them, and call [`GameState::tick`] at a fixed
//! rate; presentation reads a [`GameSnapshot`]. It can be compiled to:
//! - Native Rust for the terminal front end
//! - WebAssembly for a browser front end
//!
//! # Modules
//!
//! - [`board`]: Space layout and movement arithmetic
//! - [`property`]: Deeds and the ownership ledger
//! - [`player`]: Player state
//! - [`cards`]: Card effects and decks
//! - [`subgame`]: Auction, bonus roll and jail escape controllers
//! - [`game`]: Turn engine

pub mod actions;
pub mod board;
pub mod cards;
pub mod config;
pub mod dice;
pub mod game;
pub mod player;
pub mod property;
pub mod snapshot;
pub mod subgame;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{Command, GameEvent, JailRelease};
pub use board::{Corner, Money, NearestKind, PlayerId, Position, SpaceKind, BOARD_SIZE};
pub use cards::{Card, CardDeck, CardEffect, DeckKind};
pub use config::GameConfig;
pub use dice::DiceRoll;
pub use game::{GameError, GameState, TurnPhase};
pub use player::{Player, TokenColor, MAX_PLAYERS};
pub use property::{ColorGroup, Property, PropertyLedger};
pub use snapshot::{GameSnapshot, Renderer, SpaceView};
pub use subgame::{Auction, BonusRoll, EscapeStatus, JailEscape, Point};
