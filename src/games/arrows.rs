use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::benchmark::BenchmarkTable;
use crate::clock::Millis;
use crate::generator::{DifficultyContext, RoundGenerator, RoundStimulus};
use crate::scoring::ScoringRule;
use crate::session::SessionConfig;
use crate::stimulus::{Direction, Stimulus};

#[derive(Debug, Clone, Copy)]
pub struct ArrowGenerator {
    pub window_ms: Millis,
}

impl Default for ArrowGenerator {
    fn default() -> Self {
        Self { window_ms: 1_500 }
    }
}

impl RoundGenerator for ArrowGenerator {
    fn generate(&self, _ctx: &DifficultyContext, rng: &mut StdRng) -> RoundStimulus {
        let direction = *Direction::ALL.choose(rng).unwrap_or(&Direction::Up);
        RoundStimulus {
            stimulus: Stimulus::Arrow(direction),
            foreperiod_ms: 0,
            window_ms: Some(self.window_ms),
        }
    }
}

/// Tier upper bounds in milliseconds, best first
pub const BENCHMARK_MS: [u64; 6] = [250, 350, 450, 550, 700, 900];

/// Score attack: as many swipes as fit in 30 seconds.
pub fn config() -> SessionConfig {
    SessionConfig {
        max_rounds: None,
        time_limit_ms: Some(30_000),
        feedback_ms: 150,
        scoring: ScoringRule {
            base: 10,
            time_budget_ms: 1_000,
            weight: 0.05,
            penalty: 30,
            timeout_penalty: 30,
            floor_at_zero: true,
        },
        benchmark: BenchmarkTable::new(BENCHMARK_MS).unwrap_or_default(),
        ..SessionConfig::default()
    }
}
