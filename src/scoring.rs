use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::round::Outcome;

/// Per-game point formula.
///
/// A correct answer earns `base` plus a bonus that decays linearly with
/// reaction time until `time_budget_ms`. Wrong and too-early answers cost
/// `penalty`, timeouts cost `timeout_penalty`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringRule {
    pub base: i64,
    pub time_budget_ms: Millis,
    pub weight: f64,
    pub penalty: i64,
    pub timeout_penalty: i64,
    pub floor_at_zero: bool,
}

impl Default for ScoringRule {
    fn default() -> Self {
        Self {
            base: 100,
            time_budget_ms: 1_000,
            weight: 0.1,
            penalty: 0,
            timeout_penalty: 0,
            floor_at_zero: true,
        }
    }
}

impl ScoringRule {
    pub fn score_delta(&self, outcome: Outcome, reaction_ms: Millis) -> i64 {
        match outcome {
            Outcome::Correct => {
                let remaining = self.time_budget_ms.saturating_sub(reaction_ms);
                self.base + (remaining as f64 * self.weight).floor() as i64
            }
            Outcome::Incorrect | Outcome::TooEarly => -self.penalty,
            Outcome::Timeout => -self.timeout_penalty,
        }
    }

    /// Points for a correct answer in 0 ms
    pub fn max_per_round(&self) -> i64 {
        self.score_delta(Outcome::Correct, 0)
    }

    /// Apply `delta` to `score`, honouring the floor
    pub fn apply(&self, score: i64, delta: i64) -> i64 {
        let next = score.saturating_add(delta);
        if self.floor_at_zero {
            next.max(0)
        } else {
            next
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> ScoringRule {
        ScoringRule {
            base: 10,
            time_budget_ms: 2_000,
            weight: 0.05,
            penalty: 15,
            timeout_penalty: 5,
            floor_at_zero: true,
        }
    }

    #[test]
    fn bonus_decays_with_reaction_time() {
        let r = rule();
        assert_eq!(r.score_delta(Outcome::Correct, 0), 110);
        assert_eq!(r.score_delta(Outcome::Correct, 1_000), 60);
        assert_eq!(r.score_delta(Outcome::Correct, 2_000), 10);
        assert_eq!(r.score_delta(Outcome::Correct, 9_000), 10);
        assert_eq!(r.max_per_round(), 110);
    }

    #[test]
    fn penalties_are_negative() {
        let r = rule();
        assert_eq!(r.score_delta(Outcome::Incorrect, 100), -15);
        assert_eq!(r.score_delta(Outcome::TooEarly, 0), -15);
        assert_eq!(r.score_delta(Outcome::Timeout, 2_000), -5);
    }

    #[test]
    fn floor_clamps_only_when_enabled() {
        let mut r = rule();
        assert_eq!(r.apply(10, -15), 0);
        r.floor_at_zero = false;
        assert_eq!(r.apply(10, -15), -5);
    }
}
