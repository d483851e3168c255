use rand::rngs::StdRng;

use crate::clock::Millis;
use crate::stimulus::Stimulus;

/// What a generator may look at when producing the next round
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyContext {
    /// Zero-based index of the round being generated.
    pub round: u32,
    /// Score so far.
    pub score: i64,
    /// Correct answers so far.
    pub correct: u32,
    /// Misses so far (any outcome other than correct).
    pub misses: u32,
}

/// One round's content plus its timing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundStimulus {
    pub stimulus: Stimulus,
    /// Delay between round start and the stimulus appearing. Non-zero only for
    /// games with an anticipation phase.
    pub foreperiod_ms: Millis,
    /// How long the stimulus stays up before the round times out.
    pub window_ms: Option<Millis>,
}

/// Produces randomized stimuli for one game.
///
/// Implementations must never fail and must place the correct answer exactly
/// once among any distractors.
pub trait RoundGenerator {
    fn generate(&self, ctx: &DifficultyContext, rng: &mut StdRng) -> RoundStimulus;
}

impl<G: RoundGenerator + ?Sized> RoundGenerator for Box<G> {
    fn generate(&self, ctx: &DifficultyContext, rng: &mut StdRng) -> RoundStimulus {
        (**self).generate(ctx, rng)
    }
}

/// Generator that replays a fixed script, cycling when it runs out. Handy for
/// scenario tests that need exact stimuli.
#[derive(Debug, Clone)]
pub struct ScriptedGenerator {
    rounds: Vec<RoundStimulus>,
}

impl ScriptedGenerator {
    pub fn new(rounds: Vec<RoundStimulus>) -> Self {
        assert!(!rounds.is_empty(), "script needs at least one round");
        Self { rounds }
    }

    pub fn repeat(round: RoundStimulus) -> Self {
        Self::new(vec![round])
    }
}

impl RoundGenerator for ScriptedGenerator {
    fn generate(&self, ctx: &DifficultyContext, _rng: &mut StdRng) -> RoundStimulus {
        self.rounds[ctx.round as usize % self.rounds.len()].clone()
    }
}
