use crate::round::ReactionSample;

/// One reaction sample placed on the results chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactionPoint {
    /// One-based round number.
    pub round: f64,
    pub ms: f64,
}

impl ReactionPoint {
    pub fn new(round: f64, ms: f64) -> Self {
        Self { round, ms }
    }
}

impl From<&ReactionSample> for ReactionPoint {
    fn from(s: &ReactionSample) -> Self {
        ReactionPoint::new(f64::from(s.round) + 1.0, s.ms as f64)
    }
}

impl From<ReactionPoint> for (f64, f64) {
    fn from(p: ReactionPoint) -> Self {
        (p.round, p.ms)
    }
}

/// Split samples into (correct, incorrect) chart series
pub fn split_series(samples: &[ReactionSample]) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    let (correct, incorrect): (Vec<&ReactionSample>, Vec<&ReactionSample>) =
        samples.iter().partition(|s| s.correct);
    (to_points(correct), to_points(incorrect))
}

fn to_points(samples: Vec<&ReactionSample>) -> Vec<(f64, f64)> {
    samples
        .into_iter()
        .map(|s| ReactionPoint::from(s).into())
        .collect()
}
