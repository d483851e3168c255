pub mod arrows;
pub mod catch;
pub mod dots;
pub mod greater;
pub mod reaction;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::error::ConfigError;
use crate::generator::RoundGenerator;
use crate::session::{Session, SessionConfig};

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GameId {
    Reaction,
    Greater,
    Dots,
    Arrows,
    Catch,
}

pub struct GameInfo {
    pub id: GameId,
    pub name: &'static str,
    pub description: &'static str,
    /// Key hints shown while playing.
    pub controls: &'static str,
}

/// Per-invocation tweaks layered over a game's defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOverrides {
    pub rounds: Option<u32>,
    pub time_limit_ms: Option<Millis>,
    pub seed: Option<u64>,
}

impl GameId {
    pub const ALL: [GameId; 5] = [
        GameId::Reaction,
        GameId::Greater,
        GameId::Dots,
        GameId::Arrows,
        GameId::Catch,
    ];

    pub fn info(self) -> GameInfo {
        let (name, description, controls) = match self {
            GameId::Reaction => (
                "Wait for green",
                "tap as soon as the light turns green, not before",
                "space: tap",
            ),
            GameId::Greater => (
                "Over one hundred",
                "find the only number greater than 100",
                "1-9, a-g: pick cell",
            ),
            GameId::Dots => (
                "Count the dots",
                "type how many dots you see",
                "digits + enter: answer",
            ),
            GameId::Arrows => (
                "Swipe the arrow",
                "swipe the way the arrow points, as many as you can in 30 s",
                "arrow keys: swipe",
            ),
            GameId::Catch => (
                "Catch the ball",
                "pick the ball's lane before it lands; five misses and you're out",
                "1-5: pick lane",
            ),
        };
        GameInfo {
            id: self,
            name,
            description,
            controls,
        }
    }

    pub fn session_config(self) -> SessionConfig {
        let mut config = match self {
            GameId::Reaction => reaction::config(),
            GameId::Greater => greater::config(),
            GameId::Dots => dots::config(),
            GameId::Arrows => arrows::config(),
            GameId::Catch => catch::config(),
        };
        config.game_id = self.to_string();
        config
    }

    pub fn generator(self) -> Box<dyn RoundGenerator> {
        match self {
            GameId::Reaction => Box::new(reaction::SignalGenerator::default()),
            GameId::Greater => Box::new(greater::GreaterGenerator::default()),
            GameId::Dots => Box::new(dots::DotsGenerator::default()),
            GameId::Arrows => Box::new(arrows::ArrowGenerator::default()),
            GameId::Catch => Box::new(catch::CatchGenerator::default()),
        }
    }

    pub fn new_session(self, overrides: SessionOverrides) -> Result<Session, ConfigError> {
        let mut config = self.session_config();
        if let Some(rounds) = overrides.rounds {
            config.max_rounds = Some(rounds);
        }
        if let Some(limit) = overrides.time_limit_ms {
            config.time_limit_ms = Some(limit);
        }
        if overrides.seed.is_some() {
            config.seed = overrides.seed;
        }
        Session::new(config, self.generator())
    }
}

pub fn registry() -> Vec<GameInfo> {
    GameId::ALL.iter().map(|id| id.info()).collect()
}
