use rand::rngs::StdRng;
use rand::seq::index;
use rand::Rng;

use crate::benchmark::BenchmarkTable;
use crate::clock::Millis;
use crate::generator::{DifficultyContext, RoundGenerator, RoundStimulus};
use crate::scoring::ScoringRule;
use crate::session::SessionConfig;
use crate::stimulus::Stimulus;

pub const FIELD_WIDTH: u8 = 12;
pub const FIELD_HEIGHT: u8 = 6;

/// Distinct dots on a `FIELD_WIDTH` x `FIELD_HEIGHT` field; later rounds
/// allow more dots.
#[derive(Debug, Clone, Copy)]
pub struct DotsGenerator {
    pub min_dots: usize,
    pub max_dots: usize,
    pub window_ms: Millis,
}

impl Default for DotsGenerator {
    fn default() -> Self {
        Self {
            min_dots: 3,
            max_dots: 15,
            window_ms: 5_000,
        }
    }
}

impl RoundGenerator for DotsGenerator {
    fn generate(&self, ctx: &DifficultyContext, rng: &mut StdRng) -> RoundStimulus {
        let cells = FIELD_WIDTH as usize * FIELD_HEIGHT as usize;
        let upper = (self.min_dots + 6 + ctx.round as usize / 2).min(self.max_dots);
        let count = rng.gen_range(self.min_dots..=upper);
        let positions = index::sample(rng, cells, count)
            .into_iter()
            .map(|cell| ((cell % FIELD_WIDTH as usize) as u8, (cell / FIELD_WIDTH as usize) as u8))
            .collect();

        RoundStimulus {
            stimulus: Stimulus::Dots { positions },
            foreperiod_ms: 0,
            window_ms: Some(self.window_ms),
        }
    }
}

/// Tier upper bounds in milliseconds, best first
pub const BENCHMARK_MS: [u64; 6] = [800, 1_200, 1_600, 2_200, 3_000, 4_000];

pub fn config() -> SessionConfig {
    SessionConfig {
        max_rounds: Some(8),
        feedback_ms: 800,
        scoring: ScoringRule {
            base: 100,
            time_budget_ms: 5_000,
            weight: 0.02,
            penalty: 50,
            timeout_penalty: 0,
            floor_at_zero: true,
        },
        benchmark: BenchmarkTable::new(BENCHMARK_MS).unwrap_or_default(),
        ..SessionConfig::default()
    }
}
