use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::benchmark::Rating;
use crate::clock::Millis;
use crate::round::{Outcome, ReactionSample};
use crate::util::{as_f64, mean, median, std_dev};

/// Why a session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum EndReason {
    RoundLimit,
    TimeLimit,
    MissLimit,
    Aborted,
}

/// Aggregate over correct reaction samples. All fields are `None` when there
/// are no samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub count: usize,
    pub mean_ms: Option<f64>,
    pub median_ms: Option<f64>,
    pub best_ms: Option<Millis>,
    pub worst_ms: Option<Millis>,
    pub std_dev_ms: Option<f64>,
}

impl SampleSummary {
    pub fn from_samples(samples: &[ReactionSample]) -> Self {
        let ms = samples
            .iter()
            .filter(|s| s.correct)
            .map(|s| s.ms)
            .collect_vec();
        let values = as_f64(&ms);
        let (best_ms, worst_ms) = ms.iter().copied().minmax().into_option().unzip();
        Self {
            count: ms.len(),
            mean_ms: mean(&values),
            median_ms: median(&values),
            best_ms,
            worst_ms,
            std_dev_ms: std_dev(&values),
        }
    }
}

/// Final record of one play session, produced once when it ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub game_id: String,
    pub score: i64,
    pub elapsed_ms: Millis,
    pub rounds_played: u32,
    pub outcomes: Vec<Outcome>,
    pub samples: Vec<ReactionSample>,
    /// Sum of the per-round start-to-resolution spans.
    pub busy_ms: Millis,
    pub ended_by: EndReason,
    pub summary: SampleSummary,
    pub rating: Rating,
}

impl SessionResult {
    fn count(&self, outcome: Outcome) -> u32 {
        self.outcomes.iter().filter(|&&o| o == outcome).count() as u32
    }

    pub fn correct(&self) -> u32 {
        self.count(Outcome::Correct)
    }

    pub fn incorrect(&self) -> u32 {
        self.count(Outcome::Incorrect)
    }

    pub fn too_early(&self) -> u32 {
        self.count(Outcome::TooEarly)
    }

    pub fn timeouts(&self) -> u32 {
        self.count(Outcome::Timeout)
    }

    pub fn misses(&self) -> u32 {
        self.outcomes.iter().filter(|o| o.is_miss()).count() as u32
    }

    /// Percentage of rounds answered correctly, `None` before any round
    pub fn accuracy(&self) -> Option<f64> {
        if self.outcomes.is_empty() {
            None
        } else {
            Some((self.correct() as f64 / self.outcomes.len() as f64 * 100.0).round())
        }
    }

    pub fn completed(&self) -> bool {
        self.ended_by != EndReason::Aborted
    }
}
