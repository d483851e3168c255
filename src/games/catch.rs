use rand::rngs::StdRng;
use rand::Rng;

use crate::benchmark::BenchmarkTable;
use crate::clock::Millis;
use crate::generator::{DifficultyContext, RoundGenerator, RoundStimulus};
use crate::scoring::ScoringRule;
use crate::session::SessionConfig;
use crate::stimulus::Stimulus;

pub const MISS_LIMIT: u32 = 5;

/// A ball drops in a random lane; it falls faster every round.
#[derive(Debug, Clone, Copy)]
pub struct CatchGenerator {
    pub lanes: usize,
    pub start_window_ms: Millis,
    pub min_window_ms: Millis,
    pub speedup_ms: Millis,
}

impl Default for CatchGenerator {
    fn default() -> Self {
        Self {
            lanes: 5,
            start_window_ms: 2_500,
            min_window_ms: 600,
            speedup_ms: 150,
        }
    }
}

impl CatchGenerator {
    pub fn window_for(&self, round: u32) -> Millis {
        self.start_window_ms
            .saturating_sub(self.speedup_ms * round as Millis)
            .max(self.min_window_ms)
    }
}

impl RoundGenerator for CatchGenerator {
    fn generate(&self, ctx: &DifficultyContext, rng: &mut StdRng) -> RoundStimulus {
        RoundStimulus {
            stimulus: Stimulus::Ball {
                lane: rng.gen_range(0..self.lanes),
                lanes: self.lanes,
            },
            foreperiod_ms: 0,
            window_ms: Some(self.window_for(ctx.round)),
        }
    }
}

/// Tier upper bounds in milliseconds, best first
pub const BENCHMARK_MS: [u64; 6] = [300, 450, 600, 800, 1_000, 1_300];

pub fn config() -> SessionConfig {
    SessionConfig {
        max_rounds: None,
        miss_limit: Some(MISS_LIMIT),
        feedback_ms: 300,
        scoring: ScoringRule {
            base: 10,
            time_budget_ms: 2_500,
            weight: 0.01,
            penalty: 0,
            timeout_penalty: 0,
            floor_at_zero: true,
        },
        benchmark: BenchmarkTable::new(BENCHMARK_MS).unwrap_or_default(),
        ..SessionConfig::default()
    }
}
