//! Text input parsing.
//!
//! Each stdin line is either a short text command (`roll`, `house 39`,
//! `key 250 310`) or a JSON-encoded [`Command`].

use monopoly_core::{board::Position, subgame::BID_INCREMENT, Command, Point};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Empty input")]
    Empty,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Missing argument for {0}")]
    MissingArgument(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid command JSON: {0}")]
    InvalidJson(String),
}

/// Parse one line of input into a command
pub fn parse_line(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::Empty);
    }
    if line.starts_with('{') || line.starts_with('"') {
        return serde_json::from_str(line).map_err(|e| ParseError::InvalidJson(e.to_string()));
    }

    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Err(ParseError::Empty);
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "roll" => Command::RollDice,
        "buy" => Command::BuyDecision(true),
        "decline" => Command::BuyDecision(false),
        "auction" => Command::StartAuction,
        "sell" => Command::SellDecision,
        "bid+" => Command::BidAdjust(BID_INCREMENT),
        "bid-" => Command::BidAdjust(-BID_INCREMENT),
        "ok" => Command::Acknowledge,
        "fine" => Command::PayJailFine,
        "card" => Command::UseJailCard,
        "escape" => Command::StartJailEscape,
        "bonus" => Command::StartBonusRoll,
        "quit" => Command::Quit,
        "players" => Command::SelectPlayerCount(number(words.next(), "players")?),
        "house" => Command::BuildHouse(position(words.next(), "house")?),
        "hotel" => Command::BuildHotel(position(words.next(), "hotel")?),
        "demolish" => Command::SellBuilding(position(words.next(), "demolish")?),
        "mortgage" => Command::Mortgage(position(words.next(), "mortgage")?),
        "unmortgage" => Command::Unmortgage(position(words.next(), "unmortgage")?),
        "key" => {
            let x = coordinate(words.next(), "key")?;
            let y = coordinate(words.next(), "key")?;
            Command::KeySelect(Point::new(x, y))
        }
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };

    Ok(command)
}

fn number(arg: Option<&str>, command: &'static str) -> Result<u8, ParseError> {
    let arg = arg.ok_or(ParseError::MissingArgument(command))?;
    arg.parse()
        .map_err(|_| ParseError::InvalidArgument(arg.to_string()))
}

fn position(arg: Option<&str>, command: &'static str) -> Result<Position, ParseError> {
    number(arg, command)
}

fn coordinate(arg: Option<&str>, command: &'static str) -> Result<f32, ParseError> {
    let arg = arg.ok_or(ParseError::MissingArgument(command))?;
    arg.parse()
        .map_err(|_| ParseError::InvalidArgument(arg.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_line("roll"), Ok(Command::RollDice));
        assert_eq!(parse_line("  BUY \n"), Ok(Command::BuyDecision(true)));
        assert_eq!(parse_line("bid-"), Ok(Command::BidAdjust(-10)));
        assert_eq!(parse_line("ok"), Ok(Command::Acknowledge));
    }

    #[test]
    fn test_parse_commands_with_arguments() {
        assert_eq!(parse_line("players 3"), Ok(Command::SelectPlayerCount(3)));
        assert_eq!(parse_line("house 39"), Ok(Command::BuildHouse(39)));
        assert_eq!(parse_line("demolish 1"), Ok(Command::SellBuilding(1)));
        assert_eq!(
            parse_line("key 250 310.5"),
            Ok(Command::KeySelect(Point::new(250.0, 310.5)))
        );
    }

    #[test]
    fn test_parse_json_command() {
        assert_eq!(parse_line(r#""RollDice""#), Ok(Command::RollDice));
        assert_eq!(parse_line(r#"{"Mortgage":5}"#), Ok(Command::Mortgage(5)));
        assert!(matches!(
            parse_line(r#"{"Mortgage":"five"}"#),
            Err(ParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_line("   "), Err(ParseError::Empty));
        assert_eq!(
            parse_line("dance"),
            Err(ParseError::UnknownCommand("dance".to_string()))
        );
        assert_eq!(
            parse_line("house"),
            Err(ParseError::MissingArgument("house"))
        );
        assert_eq!(
            parse_line("key 10 north"),
            Err(ParseError::InvalidArgument("north".to_string()))
        );
    }
}
