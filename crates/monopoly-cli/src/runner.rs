//! Fixed-rate game loop.
//!
//! Stdin is read on its own task and forwarded over a channel; the loop
//! queues whatever arrived and ticks the engine at the configured rate.

use crate::input::{parse_line, ParseError};
use crate::renderer::{JsonRenderer, LogRenderer, Presenter};
use crate::settings::{RenderMode, Settings};
use monopoly_core::subgame::EscapeStatus;
use monopoly_core::{Command, GameState, TurnPhase};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Run one game until it finishes or input runs dry
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let mut game = match settings.seed {
        Some(seed) => GameState::new(settings.config.clone(), seed),
        None => GameState::new_random(settings.config.clone()),
    };
    info!(seed = game.seed(), tick_hz = settings.tick_hz, "New game");

    if let Some(players) = settings.players {
        game.enqueue(Command::SelectPlayerCount(players));
    }

    let mut presenter: Box<dyn Presenter> = match settings.render {
        RenderMode::Log => Box::new(LogRenderer::new()),
        RenderMode::Json => Box::new(JsonRenderer::new(std::io::stdout())),
    };

    // Create channel for incoming commands
    let (tx, mut rx) = mpsc::unbounded_channel::<Command>();
    let input_task = tokio::spawn(read_input(tx));

    let mut interval = tokio::time::interval(settings.tick_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut input_open = true;

    presenter.render(&game.snapshot());

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let events = game.tick();
                presenter.report(&events);
                presenter.render(&game.snapshot());

                if game.is_finished() {
                    break;
                }
                if !input_open && game.pending_commands() == 0 && is_idle(&game) {
                    info!("Input closed, stopping");
                    break;
                }
            }

            command = rx.recv(), if input_open => match command {
                Some(command) => game.enqueue(command),
                None => input_open = false,
            },
        }
    }

    input_task.abort();
    info!(winner = ?game.get_winner(), turns = game.turn_number, "Game ended");
    Ok(())
}

/// Nothing left for the clock to do without more input
fn is_idle(game: &GameState) -> bool {
    match &game.phase {
        TurnPhase::Moving { .. } => false,
        TurnPhase::InAuction(auction) => !auction.is_open(),
        TurnPhase::InMinigame(bonus) => bonus.is_resolved(),
        TurnPhase::InJailEscape(escape) => escape.status != EscapeStatus::Searching,
        TurnPhase::SelectingPlayers
        | TurnPhase::AwaitingRoll
        | TurnPhase::AwaitingPurchaseDecision { .. }
        | TurnPhase::Finished { .. } => true,
    }
}

/// Forward parsed stdin lines until EOF or the loop goes away
async fn read_input(tx: mpsc::UnboundedSender<Command>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_line(&line) {
                Ok(command) => {
                    if tx.send(command).is_err() {
                        break;
                    }
                }
                Err(ParseError::Empty) => {}
                Err(e) => warn!("Ignoring input {:?}: {}", line, e),
            },
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monopoly_core::{DiceRoll, GameConfig};

    #[test]
    fn test_idle_phases() {
        let mut game =
            GameState::with_players(GameConfig::default(), vec!["A".into(), "B".into()], 1)
                .unwrap();
        assert!(is_idle(&game));

        game.apply_roll(DiceRoll::new(1, 2).unwrap()).unwrap();
        assert!(!is_idle(&game));

        game.settle();
        assert!(is_idle(&game));

        game.apply_command(Command::StartAuction).unwrap();
        assert!(!is_idle(&game));
    }
}
