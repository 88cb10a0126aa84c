//! Terminal presentation: readable log lines or a JSON stream.

use monopoly_core::board::{space_label, Position};
use monopoly_core::{GameEvent, GameSnapshot, Renderer, TurnPhase};
use serde::Serialize;
use std::io::Write;
use tracing::{error, info};

/// A renderer that also reports what happened during a tick
pub trait Presenter: Renderer {
    fn report(&mut self, events: &[GameEvent]);
}

/// Lines written in JSON mode
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
enum OutputMessage<'a> {
    Events(&'a [GameEvent]),
    Snapshot(&'a GameSnapshot),
}

// ==================== Log ====================

/// Writes a summary line whenever the table changes
#[derive(Default)]
pub struct LogRenderer {
    last: Option<GameSnapshot>,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for LogRenderer {
    fn render(&mut self, snapshot: &GameSnapshot) {
        if self.last.as_ref() == Some(snapshot) {
            return;
        }

        let phase = describe_phase(&snapshot.phase);
        let standings = snapshot
            .players
            .iter()
            .map(|p| {
                let status = if p.bankrupt {
                    " (bankrupt)"
                } else if p.in_jail() {
                    " (jail)"
                } else {
                    ""
                };
                format!("{} ${} @{}{}", p.name, p.money, p.position, status)
            })
            .collect::<Vec<_>>()
            .join(" | ");

        info!(
            turn = snapshot.turn_number,
            player = snapshot.current_player,
            "{} :: {}",
            phase,
            standings
        );
        self.last = Some(snapshot.clone());
    }
}

impl Presenter for LogRenderer {
    fn report(&mut self, events: &[GameEvent]) {
        for event in events {
            info!("{}", describe_event(event, self.last.as_ref()));
        }
    }
}

fn describe_phase(phase: &TurnPhase) -> String {
    match phase {
        TurnPhase::SelectingPlayers => "choose players (players N)".to_string(),
        TurnPhase::AwaitingRoll => "roll".to_string(),
        TurnPhase::Moving { roll, .. } => format!("moving {}", roll.total()),
        TurnPhase::AwaitingPurchaseDecision { position } => {
            format!("buy, decline or auction {}", position)
        }
        TurnPhase::InAuction(auction) if auction.is_open() => format!(
            "auction bid ${} (min ${}, {} ticks left)",
            auction.current_bid, auction.min_bid, auction.ticks_remaining
        ),
        TurnPhase::InAuction(auction) => format!("auction closed at ${}, ok", auction.current_bid),
        TurnPhase::InMinigame(bonus) => match bonus.dice {
            Some(dice) => format!("bonus rolled {}, ok", dice.total()),
            None => "bonus dice spinning".to_string(),
        },
        TurnPhase::InJailEscape(escape) => format!(
            "find the key (key X Y), {:?}, {} ticks left",
            escape.status, escape.ticks_remaining
        ),
        TurnPhase::Finished { winner: Some(id) } => format!("finished, player {} wins", id),
        TurnPhase::Finished { winner: None } => "finished".to_string(),
    }
}

/// Deed name from the last frame, falling back to the space kind
fn label(snapshot: Option<&GameSnapshot>, position: Position) -> String {
    snapshot
        .and_then(|s| s.spaces.get(position as usize))
        .map_or_else(|| space_label(position).to_string(), |space| space.label.clone())
}

fn describe_event(event: &GameEvent, snapshot: Option<&GameSnapshot>) -> String {
    match event {
        GameEvent::DiceRolled { player, roll } => format!(
            "Player {} rolled {} + {}",
            player,
            roll.first(),
            roll.second()
        ),
        GameEvent::PlayerMoved { player, to, .. } => {
            format!("Player {} moved to {}", player, label(snapshot, *to))
        }
        GameEvent::PurchaseOffered {
            position, price, money, ..
        } => format!(
            "{} for sale at ${} (cash ${})",
            label(snapshot, *position),
            price,
            money
        ),
        GameEvent::PropertyBought {
            player,
            position,
            price,
        } => format!(
            "Player {} bought {} for ${}",
            player,
            label(snapshot, *position),
            price
        ),
        GameEvent::RentPaid {
            payer,
            owner,
            amount,
            ..
        } => format!("Player {} paid ${} rent to player {}", payer, amount, owner),
        GameEvent::CardDrawn { player, text, .. } => {
            format!("Player {} drew \"{}\"", player, text)
        }
        GameEvent::TurnEnded { next_player, .. } => format!("Player {} is up", next_player),
        GameEvent::CommandRejected { command, reason } => {
            format!("Rejected {:?}: {}", command, reason)
        }
        other => format!("{:?}", other),
    }
}

// ==================== JSON ====================

/// Streams events and changed snapshots as tagged JSON lines
pub struct JsonRenderer<W: Write> {
    out: W,
    last: Option<GameSnapshot>,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }

    fn emit(&mut self, message: &OutputMessage<'_>) {
        let result = serde_json::to_writer(&mut self.out, message)
            .map_err(std::io::Error::from)
            .and_then(|_| writeln!(self.out))
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            error!("Failed to write output: {}", e);
        }
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn render(&mut self, snapshot: &GameSnapshot) {
        if self.last.as_ref() == Some(snapshot) {
            return;
        }
        self.emit(&OutputMessage::Snapshot(snapshot));
        self.last = Some(snapshot.clone());
    }
}

impl<W: Write> Presenter for JsonRenderer<W> {
    fn report(&mut self, events: &[GameEvent]) {
        if !events.is_empty() {
            self.emit(&OutputMessage::Events(events));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monopoly_core::{GameConfig, GameState};

    #[test]
    fn test_json_renderer_skips_unchanged_frames() {
        let game = GameState::new(GameConfig::default(), 1);
        let mut renderer = JsonRenderer::new(Vec::new());

        renderer.render(&game.snapshot());
        renderer.render(&game.snapshot());
        renderer.report(&[]);
        renderer.report(&[GameEvent::GameQuit]);

        let output = String::from_utf8(renderer.out).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "Snapshot");
        assert_eq!(lines[0]["payload"]["phase"], "SelectingPlayers");
        assert_eq!(lines[1]["type"], "Events");
        assert_eq!(lines[1]["payload"][0], "GameQuit");
    }

    #[test]
    fn test_describe_phase() {
        assert_eq!(describe_phase(&TurnPhase::AwaitingRoll), "roll");
        assert_eq!(
            describe_phase(&TurnPhase::Finished { winner: Some(2) }),
            "finished, player 2 wins"
        );
    }

    #[test]
    fn test_events_use_deed_names() {
        let game = GameState::new(GameConfig::default(), 1);
        let snapshot = game.snapshot();
        let event = GameEvent::PlayerMoved {
            player: 0,
            from: 35,
            to: 39,
        };

        assert_eq!(
            describe_event(&event, Some(&snapshot)),
            "Player 0 moved to Boardwalk"
        );
        assert_eq!(describe_event(&event, None), "Player 0 moved to Deed");
    }
}
