use crate::clock::Millis;
use crate::error::InputError;
use crate::round::{Outcome, Round};
use crate::stimulus::Action;

/// Classification of one user action against the current round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
    TooEarly,
    Timeout,
    /// No open round: the action is a no-op.
    AlreadyResolved,
}

impl Verdict {
    /// The outcome the round is sealed with, if the verdict resolves one
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            Verdict::Correct => Some(Outcome::Correct),
            Verdict::Incorrect => Some(Outcome::Incorrect),
            Verdict::TooEarly => Some(Outcome::TooEarly),
            Verdict::Timeout => Some(Outcome::Timeout),
            Verdict::AlreadyResolved => None,
        }
    }
}

/// Classify `action` taken at `now` against `round`.
///
/// Boundaries are decided by timestamp, not by delivery order: an action at or
/// after the expiry instant is a timeout even if the expiry tick has not been
/// processed yet, and an action exactly at the reveal instant counts as after
/// the reveal. Shape errors are only reported for rounds that are still open.
pub fn classify(action: &Action, round: Option<&Round>, now: Millis) -> Result<Verdict, InputError> {
    let Some(round) = round.filter(|r| !r.is_sealed()) else {
        return Ok(Verdict::AlreadyResolved);
    };
    if now < round.reveal_at {
        return Ok(Verdict::TooEarly);
    }
    if round.expires_at().is_some_and(|deadline| now >= deadline) {
        return Ok(Verdict::Timeout);
    }
    Ok(if round.stimulus.judge(action)? {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    })
}
