//! Environment-driven settings for the terminal front end.

use anyhow::Context;
use monopoly_core::{config::DEFAULT_TICK_HZ, GameConfig};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("Unknown render mode: {0}")]
    UnknownRenderMode(String),

    #[error("Tick rate must be at least 1")]
    ZeroTickRate,
}

/// How frames and events are written out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Human-readable lines through `tracing`
    Log,
    /// One JSON object per line on stdout
    Json,
}

impl std::str::FromStr for RenderMode {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "log" => Ok(RenderMode::Log),
            "json" => Ok(RenderMode::Json),
            other => Err(SettingsError::UnknownRenderMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub config: GameConfig,
    /// Fixed seed for replays; random when unset
    pub seed: Option<u64>,
    pub tick_hz: u32,
    pub render: RenderMode,
    /// Seat this many players without waiting for input
    pub players: Option<u8>,
}

impl Settings {
    /// Read settings from `MONOPOLY_*` environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let config = match std::env::var("MONOPOLY_CONFIG") {
            Ok(path) => {
                let json = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {}", path))?;
                GameConfig::from_json_str(&json)
                    .with_context(|| format!("parsing config file {}", path))?
            }
            Err(_) => GameConfig::default(),
        };

        let seed = std::env::var("MONOPOLY_SEED")
            .ok()
            .map(|s| s.parse::<u64>())
            .transpose()
            .context("MONOPOLY_SEED must be an unsigned integer")?;

        let tick_hz: u32 = std::env::var("MONOPOLY_TICK_HZ")
            .unwrap_or_else(|_| DEFAULT_TICK_HZ.to_string())
            .parse()
            .context("MONOPOLY_TICK_HZ must be an unsigned integer")?;
        if tick_hz == 0 {
            return Err(SettingsError::ZeroTickRate.into());
        }

        let render: RenderMode = std::env::var("MONOPOLY_RENDER")
            .unwrap_or_else(|_| "log".into())
            .parse()?;

        let players = std::env::var("MONOPOLY_PLAYERS")
            .ok()
            .map(|s| s.parse::<u8>())
            .transpose()
            .context("MONOPOLY_PLAYERS must be a number from 1 to 6")?;

        Ok(Self {
            config,
            seed,
            tick_hz,
            render,
            players,
        })
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.tick_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_mode_parsing() {
        assert_eq!("log".parse::<RenderMode>(), Ok(RenderMode::Log));
        assert_eq!("JSON".parse::<RenderMode>(), Ok(RenderMode::Json));
        assert_eq!(
            "svg".parse::<RenderMode>(),
            Err(SettingsError::UnknownRenderMode("svg".to_string()))
        );
    }

    #[test]
    fn test_tick_interval() {
        let settings = Settings {
            config: GameConfig::default(),
            seed: None,
            tick_hz: 50,
            render: RenderMode::Log,
            players: None,
        };
        assert_eq!(settings.tick_interval(), Duration::from_millis(20));
    }
}
