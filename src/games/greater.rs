use rand::rngs::StdRng;
use rand::Rng;

use crate::benchmark::BenchmarkTable;
use crate::clock::Millis;
use crate::generator::{DifficultyContext, RoundGenerator, RoundStimulus};
use crate::scoring::ScoringRule;
use crate::session::SessionConfig;
use crate::stimulus::Stimulus;

/// A grid with exactly one number above the threshold. The grid grows by one
/// cell per round up to `max_cells`.
#[derive(Debug, Clone, Copy)]
pub struct GreaterGenerator {
    pub threshold: u32,
    pub start_cells: usize,
    pub max_cells: usize,
    pub window_ms: Millis,
}

impl Default for GreaterGenerator {
    fn default() -> Self {
        Self {
            threshold: 100,
            start_cells: 4,
            max_cells: 16,
            window_ms: 3_000,
        }
    }
}

impl RoundGenerator for GreaterGenerator {
    fn generate(&self, ctx: &DifficultyContext, rng: &mut StdRng) -> RoundStimulus {
        let cells = (self.start_cells + ctx.round as usize).clamp(2, self.max_cells);
        let mut values: Vec<u32> = (0..cells - 1)
            .map(|_| rng.gen_range(1..=self.threshold))
            .collect();
        let target = rng.gen_range(self.threshold + 1..=self.threshold + 99);
        values.insert(rng.gen_range(0..=values.len()), target);

        RoundStimulus {
            stimulus: Stimulus::Numbers {
                values,
                threshold: self.threshold,
            },
            foreperiod_ms: 0,
            window_ms: Some(self.window_ms),
        }
    }
}

/// Tier upper bounds in milliseconds, best first
pub const BENCHMARK_MS: [u64; 6] = [500, 750, 1_000, 1_500, 2_000, 3_000];

pub fn config() -> SessionConfig {
    SessionConfig {
        max_rounds: Some(10),
        feedback_ms: 400,
        scoring: ScoringRule {
            base: 50,
            time_budget_ms: 3_000,
            weight: 0.05,
            penalty: 25,
            timeout_penalty: 10,
            floor_at_zero: true,
        },
        benchmark: BenchmarkTable::new(BENCHMARK_MS).unwrap_or_default(),
        ..SessionConfig::default()
    }
}
