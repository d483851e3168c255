use rand::rngs::StdRng;
use rand::Rng;

use crate::benchmark::BenchmarkTable;
use crate::clock::Millis;
use crate::generator::{DifficultyContext, RoundGenerator, RoundStimulus};
use crate::scoring::ScoringRule;
use crate::session::SessionConfig;
use crate::stimulus::Stimulus;

/// "Wait for green": a random foreperiod, then a go signal.
#[derive(Debug, Clone, Copy)]
pub struct SignalGenerator {
    pub min_foreperiod_ms: Millis,
    pub max_foreperiod_ms: Millis,
    pub window_ms: Millis,
}

impl Default for SignalGenerator {
    fn default() -> Self {
        Self {
            min_foreperiod_ms: 1_500,
            max_foreperiod_ms: 4_000,
            window_ms: 2_000,
        }
    }
}

impl RoundGenerator for SignalGenerator {
    fn generate(&self, _ctx: &DifficultyContext, rng: &mut StdRng) -> RoundStimulus {
        RoundStimulus {
            stimulus: Stimulus::Signal,
            foreperiod_ms: rng.gen_range(self.min_foreperiod_ms..=self.max_foreperiod_ms),
            window_ms: Some(self.window_ms),
        }
    }
}

pub fn config() -> SessionConfig {
    SessionConfig {
        max_rounds: Some(5),
        feedback_ms: 1_200,
        scoring: ScoringRule {
            base: 0,
            time_budget_ms: 500,
            weight: 2.0,
            penalty: 200,
            timeout_penalty: 0,
            floor_at_zero: true,
        },
        benchmark: BenchmarkTable::default(),
        ..SessionConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn foreperiod_stays_in_range() {
        let gen = SignalGenerator::default();
        let mut rng = StdRng::seed_from_u64(3);
        for round in 0..200 {
            let ctx = DifficultyContext {
                round,
                score: 0,
                correct: 0,
                misses: 0,
            };
            let planned = gen.generate(&ctx, &mut rng);
            assert!((1_500..=4_000).contains(&planned.foreperiod_ms));
            assert_eq!(planned.stimulus, Stimulus::Signal);
        }
    }

    #[test]
    fn instant_tap_earns_the_maximum() {
        assert_eq!(config().scoring.max_per_round(), 1_000);
    }
}
