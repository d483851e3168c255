use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::generator::RoundStimulus;
use crate::stimulus::Stimulus;

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Correct,
    Incorrect,
    TooEarly,
    Timeout,
}

impl Outcome {
    pub fn is_miss(self) -> bool {
        self != Outcome::Correct
    }
}

/// Time between stimulus shown and user responded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionSample {
    pub round: u32,
    pub ms: Millis,
    pub correct: bool,
}

/// One stimulus-response cycle. Sealed exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    pub index: u32,
    pub stimulus: Stimulus,
    pub started_at: Millis,
    /// When the stimulus is (or was) scheduled to appear.
    pub reveal_at: Millis,
    pub window_ms: Option<Millis>,
    shown: bool,
    resolved_at: Option<Millis>,
    outcome: Option<Outcome>,
}

impl Round {
    pub fn new(index: u32, planned: RoundStimulus, now: Millis) -> Self {
        Self {
            index,
            stimulus: planned.stimulus,
            started_at: now,
            reveal_at: now.saturating_add(planned.foreperiod_ms),
            window_ms: planned.window_ms,
            shown: false,
            resolved_at: None,
            outcome: None,
        }
    }

    pub fn expires_at(&self) -> Option<Millis> {
        self.window_ms.map(|w| self.reveal_at.saturating_add(w))
    }

    pub fn mark_shown(&mut self) {
        self.shown = true;
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn is_sealed(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn resolved_at(&self) -> Option<Millis> {
        self.resolved_at
    }

    /// Seal with `outcome`. A second seal is refused and returns false.
    pub fn seal(&mut self, outcome: Outcome, at: Millis) -> bool {
        if self.is_sealed() {
            return false;
        }
        self.outcome = Some(outcome);
        self.resolved_at = Some(at.max(self.started_at));
        true
    }

    /// Reaction sample for rounds answered after the stimulus appeared
    pub fn sample(&self) -> Option<ReactionSample> {
        let correct = match self.outcome? {
            Outcome::Correct => true,
            Outcome::Incorrect => false,
            Outcome::TooEarly | Outcome::Timeout => return None,
        };
        let at = self.resolved_at?;
        Some(ReactionSample {
            round: self.index,
            ms: at.saturating_sub(self.reveal_at),
            correct,
        })
    }

    /// Start-to-resolution span; zero while unsealed
    pub fn duration_ms(&self) -> Millis {
        self.resolved_at
            .map(|at| at.saturating_sub(self.started_at))
            .unwrap_or(0)
    }
}
