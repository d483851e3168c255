use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::benchmark::BenchmarkTable;
use crate::classifier::{classify, Verdict};
use crate::clock::Millis;
use crate::error::{ConfigError, InputError};
use crate::generator::{DifficultyContext, RoundGenerator};
use crate::report::Reporter;
use crate::result::{EndReason, SampleSummary, SessionResult};
use crate::round::{Outcome, ReactionSample, Round};
use crate::scoring::ScoringRule;
use crate::stimulus::{Action, Stimulus};
use crate::timer::{TimerKind, TimerSlot};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub game_id: String,
    pub max_rounds: Option<u32>,
    pub time_limit_ms: Option<Millis>,
    /// End the session once this many rounds were missed.
    pub miss_limit: Option<u32>,
    /// Pause between a round resolving and the next one starting.
    pub feedback_ms: Millis,
    /// Extra uniform random pause in `0..=feedback_jitter_ms`.
    pub feedback_jitter_ms: Millis,
    pub seed: Option<u64>,
    pub scoring: ScoringRule,
    pub benchmark: BenchmarkTable,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            game_id: "custom".to_string(),
            max_rounds: Some(10),
            time_limit_ms: None,
            miss_limit: None,
            feedback_ms: 600,
            feedback_jitter_ms: 0,
            seed: None,
            scoring: ScoringRule::default(),
            benchmark: BenchmarkTable::default(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.max_rounds, self.time_limit_ms, self.miss_limit) {
            (Some(0), _, _) => Err(ConfigError::NoRounds),
            (None, None, None) => Err(ConfigError::Unbounded),
            _ => Ok(()),
        }
    }
    /// Session length is comparable between runs only when every run plays
    /// the same number of rounds with no clock or miss limit cutting it short.
    pub fn tracks_best_time(&self) -> bool {
        self.max_rounds.is_some() && self.time_limit_ms.is_none() && self.miss_limit.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    /// Round started, stimulus not yet visible (anticipation phase).
    AwaitingStimulus,
    /// Stimulus visible, waiting for the user.
    Active,
    /// Round sealed, pausing before the next one.
    Resolving,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub round: u32,
    pub outcome: Outcome,
    pub delta: i64,
    pub score: i64,
    pub reaction_ms: Option<Millis>,
}

/// State transitions a presentation layer may want to render
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    RoundStarted {
        round: u32,
    },
    StimulusShown {
        round: u32,
        stimulus: Stimulus,
        expires_at: Option<Millis>,
    },
    StimulusHidden {
        round: u32,
    },
    Feedback(Feedback),
    Ended(Box<SessionResult>),
}

/// Everything that changes during a session
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub phase: Phase,
    pub started_at: Option<Millis>,
    pub ended_at: Option<Millis>,
    pub rounds_played: u32,
    pub score: i64,
    pub correct: u32,
    pub misses: u32,
    pub current: Option<Round>,
    pub rounds: Vec<Round>,
    pub samples: Vec<ReactionSample>,
    pub last_feedback: Option<Feedback>,
    pub result: Option<SessionResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActResult {
    pub verdict: Verdict,
    pub events: Vec<SessionEvent>,
}

/// Drives one game instance: rounds, timers, scoring and the end of play.
///
/// The controller never reads a clock. Callers feed it timestamps through
/// [`Session::start`], [`Session::tick`] and [`Session::act`], and it keeps at
/// most one pending timer at a time.
pub struct Session {
    config: SessionConfig,
    generator: Box<dyn RoundGenerator>,
    rng: StdRng,
    timer: TimerSlot,
    state: SessionState,
    reporter: Option<Reporter>,
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

impl Session {
    pub fn new(
        config: SessionConfig,
        generator: impl RoundGenerator + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            rng: seeded_rng(config.seed),
            config,
            generator: Box::new(generator),
            timer: TimerSlot::new(),
            state: SessionState::default(),
            reporter: None,
        })
    }

    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn score(&self) -> i64 {
        self.state.score
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.state.current.as_ref()
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.state.result.as_ref()
    }

    pub fn has_started(&self) -> bool {
        self.state.phase != Phase::Idle
    }

    pub fn has_finished(&self) -> bool {
        self.state.phase == Phase::Ended
    }

    fn session_deadline(&self) -> Option<Millis> {
        Some(
            self.state
                .started_at?
                .saturating_add(self.config.time_limit_ms?),
        )
    }

    /// Countdown value for timed sessions
    pub fn seconds_remaining(&self, now: Millis) -> Option<f64> {
        let limit = self.config.time_limit_ms?;
        let left = match (self.session_deadline(), self.state.ended_at) {
            (Some(deadline), None) => deadline.saturating_sub(now),
            (Some(deadline), Some(ended)) => deadline.saturating_sub(ended),
            (None, _) => limit,
        };
        Some(left as f64 / 1000.0)
    }

    /// Earliest instant at which [`Session::tick`] has work to do
    pub fn next_deadline(&self) -> Option<Millis> {
        if self.has_finished() {
            return None;
        }
        match (self.timer.deadline(), self.session_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Reset and begin the first round. Restarting a running session
    /// discards it without reporting.
    pub fn start(&mut self, now: Millis) -> Vec<SessionEvent> {
        self.timer.cancel();
        self.rng = seeded_rng(self.config.seed);
        self.state = SessionState {
            started_at: Some(now),
            ..SessionState::default()
        };
        if let Some(reporter) = self.reporter.as_mut() {
            reporter.rearm();
        }
        log::info!("session {} started at {now}", self.config.game_id);

        let mut events = Vec::new();
        self.begin_round(now, &mut events);
        events
    }

    /// Fire every timer due at or before `now`, in deadline order.
    pub fn tick(&mut self, now: Millis) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        self.run_due(now, &mut events);
        events
    }

    /// Fire timers and the session deadline due at or before `until`.
    /// The session deadline wins ties.
    fn run_due(&mut self, until: Millis, events: &mut Vec<SessionEvent>) {
        while matches!(
            self.state.phase,
            Phase::AwaitingStimulus | Phase::Active | Phase::Resolving
        ) {
            let session_due = self.session_deadline().filter(|&d| d <= until);
            let timer_due = self.timer.deadline().filter(|&d| d <= until);
            match (session_due, timer_due) {
                (Some(end), t) if t.map_or(true, |t| end <= t) => {
                    self.finish(EndReason::TimeLimit, end, events);
                }
                (_, Some(_)) => match self.timer.fire(until) {
                    Some((kind, at)) => self.on_timer(kind, at, events),
                    None => break,
                },
                _ => break,
            }
        }
    }

    /// Apply a user action taken at `now`.
    ///
    /// Everything due strictly before `now` is settled first, so the answer
    /// does not depend on whether the caller ticked. Malformed actions are
    /// rejected without touching the open round.
    pub fn act(&mut self, action: &Action, now: Millis) -> Result<ActResult, InputError> {
        let mut events = Vec::new();
        if let Some(before) = now.checked_sub(1) {
            self.run_due(before, &mut events);
        }
        if let Some(end) = self.session_deadline().filter(|&d| d <= now) {
            if !matches!(self.state.phase, Phase::Idle | Phase::Ended) {
                self.finish(EndReason::TimeLimit, end, &mut events);
            }
        }

        let verdict = classify(action, self.state.current.as_ref(), now)?;
        let Some(outcome) = verdict.outcome() else {
            log::debug!("{} ignored in {:?}", action.name(), self.state.phase);
            return Ok(ActResult { verdict, events });
        };
        let at = match outcome {
            // sealed at the expiry instant, however late the input arrived
            Outcome::Timeout => self
                .state
                .current
                .as_ref()
                .and_then(Round::expires_at)
                .unwrap_or(now),
            _ => now,
        };
        if outcome != Outcome::TooEarly {
            self.ensure_shown(&mut events);
        }
        self.resolve(outcome, at, &mut events);
        Ok(ActResult { verdict, events })
    }

    /// End the session early. No-op once ended.
    pub fn abort(&mut self, now: Millis) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if !self.has_finished() {
            self.finish(EndReason::Aborted, now, &mut events);
        }
        events
    }

    fn on_timer(&mut self, kind: TimerKind, at: Millis, events: &mut Vec<SessionEvent>) {
        match (kind, self.state.phase) {
            (TimerKind::Reveal, Phase::AwaitingStimulus) => self.reveal(events),
            (TimerKind::Expire, Phase::Active) => self.resolve(Outcome::Timeout, at, events),
            (TimerKind::NextRound, Phase::Resolving) => self.begin_round(at, events),
            (kind, phase) => log::warn!("stale {kind:?} timer fired in {phase:?}"),
        }
    }

    fn begin_round(&mut self, at: Millis, events: &mut Vec<SessionEvent>) {
        let ctx = DifficultyContext {
            round: self.state.rounds_played,
            score: self.state.score,
            correct: self.state.correct,
            misses: self.state.misses,
        };
        let planned = self.generator.generate(&ctx, &mut self.rng);
        let round = Round::new(ctx.round, planned, at);
        log::debug!(
            "round {} ({}) starts at {at}, reveal at {}",
            round.index,
            round.stimulus.name(),
            round.reveal_at
        );
        events.push(SessionEvent::RoundStarted { round: round.index });

        let reveal_at = round.reveal_at;
        self.state.current = Some(round);
        self.state.phase = Phase::AwaitingStimulus;
        if reveal_at <= at {
            self.reveal(events);
        } else {
            self.timer.arm(reveal_at, TimerKind::Reveal);
        }
    }

    fn reveal(&mut self, events: &mut Vec<SessionEvent>) {
        let Some(round) = self.state.current.as_mut() else {
            return;
        };
        round.mark_shown();
        let expires_at = round.expires_at();
        events.push(SessionEvent::StimulusShown {
            round: round.index,
            stimulus: round.stimulus.clone(),
            expires_at,
        });
        self.state.phase = Phase::Active;
        match expires_at {
            Some(deadline) => {
                self.timer.arm(deadline, TimerKind::Expire);
            }
            None => {
                self.timer.cancel();
            }
        }
    }

    /// Reveal a stimulus whose reveal tick has not been processed yet
    fn ensure_shown(&mut self, events: &mut Vec<SessionEvent>) {
        if self.state.current.as_ref().is_some_and(|r| !r.is_shown()) {
            self.reveal(events);
        }
    }

    fn resolve(&mut self, outcome: Outcome, at: Millis, events: &mut Vec<SessionEvent>) {
        let Some(mut round) = self.state.current.take() else {
            return;
        };
        self.timer.cancel();
        if !round.seal(outcome, at) {
            log::warn!("round {} was already sealed", round.index);
            return;
        }

        let sample = round.sample();
        let reaction_ms = sample.map(|s| s.ms);
        let raw = self
            .config
            .scoring
            .score_delta(outcome, reaction_ms.unwrap_or(0));
        let previous = self.state.score;
        self.state.score = self.config.scoring.apply(previous, raw);
        // what the player actually gained or lost after the floor
        let delta = self.state.score - previous;
        self.state.samples.extend(sample);
        if outcome.is_miss() {
            self.state.misses += 1;
        } else {
            self.state.correct += 1;
        }

        if round.is_shown() {
            events.push(SessionEvent::StimulusHidden { round: round.index });
        }
        let feedback = Feedback {
            round: round.index,
            outcome,
            delta,
            score: self.state.score,
            reaction_ms,
        };
        log::debug!("round {} sealed: {feedback:?}", round.index);
        self.state.last_feedback = Some(feedback);
        events.push(SessionEvent::Feedback(feedback));
        self.state.rounds.push(round);

        self.advance(at, events);
    }

    /// Count the sealed round and either end the session or schedule the next round.
    fn advance(&mut self, at: Millis, events: &mut Vec<SessionEvent>) {
        self.state.rounds_played += 1;

        let reason = if self
            .config
            .miss_limit
            .is_some_and(|limit| self.state.misses >= limit)
        {
            Some(EndReason::MissLimit)
        } else if self
            .config
            .max_rounds
            .is_some_and(|max| self.state.rounds_played >= max)
        {
            Some(EndReason::RoundLimit)
        } else {
            None
        };
        if let Some(reason) = reason {
            self.finish(reason, at, events);
            return;
        }

        let jitter = match self.config.feedback_jitter_ms {
            0 => 0,
            j => self.rng.gen_range(0..=j),
        };
        // at least 1 ms so tick() always makes progress
        let delay = (self.config.feedback_ms + jitter).max(1);
        self.state.phase = Phase::Resolving;
        self.timer
            .arm(at.saturating_add(delay), TimerKind::NextRound);
    }

    fn finish(&mut self, reason: EndReason, at: Millis, events: &mut Vec<SessionEvent>) {
        self.timer.cancel();
        if let Some(dropped) = self.state.current.take() {
            log::debug!("discarding unresolved round {}", dropped.index);
        }
        let started_at = self.state.started_at.unwrap_or(at);
        let at = at.max(started_at);
        self.state.phase = Phase::Ended;
        self.state.ended_at = Some(at);

        let summary = SampleSummary::from_samples(&self.state.samples);
        let result = SessionResult {
            game_id: self.config.game_id.clone(),
            score: self.state.score,
            elapsed_ms: at - started_at,
            rounds_played: self.state.rounds_played,
            outcomes: self.state.rounds.iter().filter_map(Round::outcome).collect(),
            samples: self.state.samples.clone(),
            busy_ms: self.state.rounds.iter().map(Round::duration_ms).sum(),
            ended_by: reason,
            summary,
            rating: self.config.benchmark.rate(summary.mean_ms),
        };
        log::info!(
            "session {} ended ({}): score {} in {} ms, {} rounds, rating {}",
            result.game_id,
            reason,
            result.score,
            result.elapsed_ms,
            result.rounds_played,
            result.rating.label()
        );

        if let Some(reporter) = self.reporter.as_mut() {
            reporter.report(&result);
        }
        self.state.result = Some(result.clone());
        events.push(SessionEvent::Ended(Box::new(result)));
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("timer", &self.timer)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::Rating;
    use crate::generator::{RoundStimulus, ScriptedGenerator};
    use crate::stimulus::Direction;
    use assert_matches::assert_matches;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn arrow(foreperiod_ms: Millis, window_ms: Option<Millis>) -> ScriptedGenerator {
        ScriptedGenerator::repeat(RoundStimulus {
            stimulus: Stimulus::Arrow(Direction::Right),
            foreperiod_ms,
            window_ms,
        })
    }

    fn config() -> SessionConfig {
        SessionConfig {
            game_id: "test".into(),
            max_rounds: Some(3),
            feedback_ms: 100,
            seed: Some(7),
            scoring: ScoringRule {
                base: 10,
                time_budget_ms: 1_000,
                weight: 0.1,
                penalty: 20,
                timeout_penalty: 5,
                floor_at_zero: true,
            },
            ..SessionConfig::default()
        }
    }

    const RIGHT: Action = Action::Swipe(Direction::Right);
    const LEFT: Action = Action::Swipe(Direction::Left);

    #[test]
    fn best_time_only_for_fixed_length_sessions() {
        assert!(config().tracks_best_time());
        let timed = SessionConfig {
            time_limit_ms: Some(30_000),
            ..config()
        };
        assert!(!timed.tracks_best_time());
        let sudden_death = SessionConfig {
            max_rounds: None,
            miss_limit: Some(3),
            ..config()
        };
        assert!(!sudden_death.tracks_best_time());
    }

    #[test]
    fn zero_foreperiod_reveals_on_start() {
        let mut s = Session::new(config(), arrow(0, None)).unwrap();
        let events = s.start(1_000);
        assert_eq!(s.phase(), Phase::Active);
        assert_matches!(events[0], SessionEvent::RoundStarted { round: 0 });
        assert_matches!(
            &events[1],
            SessionEvent::StimulusShown {
                round: 0,
                expires_at: None,
                ..
            }
        );
    }

    #[test]
    fn reveal_waits_for_foreperiod() {
        let mut s = Session::new(config(), arrow(500, Some(1_000))).unwrap();
        s.start(0);
        assert_eq!(s.phase(), Phase::AwaitingStimulus);
        assert!(s.tick(499).is_empty());
        let events = s.tick(500);
        assert_eq!(s.phase(), Phase::Active);
        assert_matches!(
            &events[0],
            SessionEvent::StimulusShown {
                expires_at: Some(1_500),
                ..
            }
        );
    }

    #[test]
    fn tap_during_foreperiod_is_too_early_and_floored() {
        let mut s = Session::new(config(), arrow(500, None)).unwrap();
        s.start(0);
        let r = s.act(&RIGHT, 200).unwrap();
        assert_eq!(r.verdict, Verdict::TooEarly);
        assert_eq!(s.score(), 0);
        // the penalty was fully absorbed by the floor
        assert_matches!(
            r.events.as_slice(),
            [SessionEvent::Feedback(Feedback { delta: 0, .. })]
        );
        assert_eq!(s.state().misses, 1);
        assert_eq!(s.phase(), Phase::Resolving);
        assert!(s.state().samples.is_empty());
    }

    #[test]
    fn correct_answer_scores_by_reaction_time() {
        let mut s = Session::new(config(), arrow(0, None)).unwrap();
        s.start(0);
        let r = s.act(&RIGHT, 400).unwrap();
        assert_eq!(r.verdict, Verdict::Correct);
        assert_eq!(s.score(), 10 + 60);
        assert_eq!(s.state().samples[0].ms, 400);
        assert_matches!(
            r.events.as_slice(),
            [
                SessionEvent::StimulusHidden { round: 0 },
                SessionEvent::Feedback(Feedback {
                    outcome: Outcome::Correct,
                    delta: 70,
                    ..
                })
            ]
        );
    }

    #[test]
    fn expiry_timer_times_out_and_later_input_is_ignored() {
        let mut s = Session::new(config(), arrow(0, Some(300))).unwrap();
        s.start(0);
        s.act(&RIGHT, 100).unwrap();
        s.tick(200);
        assert_eq!(s.phase(), Phase::Active);

        let score_before = s.score();
        s.tick(500);
        assert_eq!(s.state().rounds[1].outcome(), Some(Outcome::Timeout));
        assert_eq!(s.score(), score_before - 5);

        let again = s.act(&RIGHT, 510).unwrap();
        assert_eq!(again.verdict, Verdict::AlreadyResolved);
        assert!(again.events.is_empty());
        assert_eq!(s.score(), score_before - 5);
    }

    #[test]
    fn action_exactly_at_expiry_is_timeout() {
        let mut s = Session::new(config(), arrow(0, Some(300))).unwrap();
        s.start(0);
        let r = s.act(&RIGHT, 300).unwrap();
        assert_eq!(r.verdict, Verdict::Timeout);
        assert_eq!(s.state().rounds[0].resolved_at(), Some(300));

        let mut s = Session::new(config(), arrow(0, Some(300))).unwrap();
        s.start(0);
        assert_eq!(s.act(&RIGHT, 299).unwrap().verdict, Verdict::Correct);
    }

    #[test]
    fn late_action_settles_expired_rounds_first() {
        let mut s = Session::new(config(), arrow(0, Some(300))).unwrap();
        s.start(0);
        // round 0 expires at 300, round 1 runs 400..700
        let r = s.act(&RIGHT, 550).unwrap();
        assert_eq!(r.verdict, Verdict::Correct);
        assert_eq!(s.state().rounds[0].outcome(), Some(Outcome::Timeout));
        assert_eq!(s.state().rounds[0].resolved_at(), Some(300));
        assert_eq!(s.state().rounds[1].outcome(), Some(Outcome::Correct));
        assert_eq!(s.state().samples[0].ms, 150);
        assert_matches!(r.events[0], SessionEvent::StimulusHidden { round: 0 });
    }

    #[test]
    fn acting_without_ticking_matches_ticking_first() {
        let cfg = SessionConfig {
            max_rounds: None,
            time_limit_ms: Some(1_000),
            ..config()
        };
        let mut ticked = Session::new(cfg.clone(), arrow(0, Some(300))).unwrap();
        ticked.start(0);
        ticked.tick(1_200);
        let expected = ticked.act(&LEFT, 1_200).unwrap();

        let mut untouched = Session::new(cfg, arrow(0, Some(300))).unwrap();
        untouched.start(0);
        let acted = untouched.act(&LEFT, 1_200).unwrap();

        assert_eq!(acted.verdict, expected.verdict);
        assert_eq!(acted.verdict, Verdict::AlreadyResolved);
        let result = untouched.result().unwrap();
        assert_eq!(result, ticked.result().unwrap());
        assert_eq!(result.rounds_played, 2);
        assert_eq!(result.outcomes, vec![Outcome::Timeout, Outcome::Timeout]);
        assert_eq!(result.elapsed_ms, 1_000);
    }

    #[test]
    fn feedback_pause_jitters_within_bounds() {
        let cfg = SessionConfig {
            feedback_jitter_ms: 50,
            ..config()
        };
        let deadline = |cfg: SessionConfig| {
            let mut s = Session::new(cfg, arrow(0, None)).unwrap();
            s.start(0);
            s.act(&RIGHT, 100).unwrap();
            s.next_deadline().unwrap()
        };
        let first = deadline(cfg.clone());
        assert!((200..=250).contains(&first), "{first}");
        assert_eq!(deadline(cfg.clone()), first);

        let mut seen = std::collections::HashSet::new();
        for seed in 0..20 {
            let at = deadline(SessionConfig {
                seed: Some(seed),
                ..cfg.clone()
            });
            assert!((200..=250).contains(&at), "seed {seed}: {at}");
            seen.insert(at);
        }
        assert!(seen.len() > 1);
    }

    #[test]
    fn zero_feedback_still_waits_a_millisecond() {
        let cfg = SessionConfig {
            feedback_ms: 0,
            feedback_jitter_ms: 0,
            ..config()
        };
        let mut s = Session::new(cfg, arrow(0, None)).unwrap();
        s.start(0);
        s.act(&RIGHT, 100).unwrap();
        assert_eq!(s.phase(), Phase::Resolving);
        assert_eq!(s.next_deadline(), Some(101));
        assert_matches!(s.tick(101)[0], SessionEvent::RoundStarted { round: 1 });
    }

    #[test]
    fn huge_time_limit_does_not_overflow() {
        let cfg = SessionConfig {
            max_rounds: None,
            time_limit_ms: Some(u64::MAX - 10),
            ..config()
        };
        let mut s = Session::new(cfg, arrow(0, Some(300))).unwrap();
        s.start(100);
        assert_eq!(s.next_deadline(), Some(400));
        s.tick(400);
        assert!(!s.has_finished());
        assert!(s.seconds_remaining(400).unwrap() > 1e9);
    }

    #[test]
    fn second_action_on_resolved_round_is_noop() {
        let mut s = Session::new(config(), arrow(0, None)).unwrap();
        s.start(0);
        assert_eq!(s.act(&RIGHT, 50).unwrap().verdict, Verdict::Correct);
        let score = s.score();
        assert_eq!(
            s.act(&RIGHT, 60).unwrap().verdict,
            Verdict::AlreadyResolved
        );
        assert_eq!(s.score(), score);
        assert_eq!(s.state().rounds_played, 1);
    }

    #[test]
    fn malformed_input_leaves_round_open() {
        let mut s = Session::new(config(), arrow(0, None)).unwrap();
        s.start(0);
        assert_matches!(
            s.act(&Action::Answer("up".into()), 50),
            Err(InputError::WrongKind { .. })
        );
        assert_eq!(s.phase(), Phase::Active);
        assert_eq!(s.score(), 0);
        assert_eq!(s.act(&LEFT, 60).unwrap().verdict, Verdict::Incorrect);
    }

    #[test]
    fn next_round_starts_after_feedback_pause() {
        let mut s = Session::new(config(), arrow(0, None)).unwrap();
        s.start(0);
        s.act(&RIGHT, 100).unwrap();
        assert_eq!(s.next_deadline(), Some(200));
        assert!(s.tick(199).is_empty());
        let events = s.tick(200);
        assert_matches!(events[0], SessionEvent::RoundStarted { round: 1 });
        assert_eq!(s.current_round().unwrap().started_at, 200);
    }

    #[test]
    fn ends_after_max_rounds_and_reports_once() {
        let delivered = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&delivered);
        let mut s = Session::new(config(), arrow(0, None))
            .unwrap()
            .with_reporter(Reporter::new(move |_: &SessionResult| *seen.borrow_mut() += 1));
        let mut now = 0;
        s.start(now);
        for _ in 0..3 {
            now += 100;
            s.act(&RIGHT, now).unwrap();
            now += 100;
            s.tick(now);
        }
        assert!(s.has_finished());
        let result = s.result().unwrap();
        assert_eq!(result.rounds_played, 3);
        assert_eq!(result.ended_by, EndReason::RoundLimit);
        assert!(result.elapsed_ms >= result.busy_ms);
        assert_eq!(result.rating, Rating::Rated(crate::benchmark::Tier::WorldClass));
        assert_eq!(*delivered.borrow(), 1);

        assert!(s.abort(now + 1).is_empty());
        assert_eq!(s.act(&RIGHT, now + 2).unwrap().verdict, Verdict::AlreadyResolved);
        assert_eq!(*delivered.borrow(), 1);
    }

    #[test]
    fn time_limit_discards_in_flight_round() {
        let cfg = SessionConfig {
            max_rounds: None,
            time_limit_ms: Some(1_000),
            ..config()
        };
        let mut s = Session::new(cfg, arrow(0, None)).unwrap();
        s.start(0);
        s.act(&RIGHT, 300).unwrap();
        s.tick(400);
        assert_eq!(s.seconds_remaining(400), Some(0.6));
        let events = s.tick(5_000);
        assert_matches!(events.last(), Some(SessionEvent::Ended(r)) if r.ended_by == EndReason::TimeLimit);
        let result = s.result().unwrap();
        assert_eq!(result.rounds_played, 1);
        assert_eq!(result.elapsed_ms, 1_000);
        assert_eq!(s.seconds_remaining(6_000), Some(0.0));
    }

    #[test]
    fn action_after_time_limit_ends_session_first() {
        let cfg = SessionConfig {
            max_rounds: None,
            time_limit_ms: Some(1_000),
            ..config()
        };
        let mut s = Session::new(cfg, arrow(0, None)).unwrap();
        s.start(0);
        let r = s.act(&RIGHT, 1_000).unwrap();
        assert_eq!(r.verdict, Verdict::AlreadyResolved);
        assert!(s.has_finished());
        assert_eq!(s.result().unwrap().rounds_played, 0);
    }

    #[test]
    fn abort_without_rounds_has_no_rating() {
        let mut s = Session::new(config(), arrow(1_000, None)).unwrap();
        s.start(0);
        let events = s.abort(250);
        assert_matches!(events.as_slice(), [SessionEvent::Ended(_)]);
        let result = s.result().unwrap();
        assert_eq!(result.rating, Rating::NoData);
        assert_eq!(result.ended_by, EndReason::Aborted);
        assert_eq!(result.summary.mean_ms, None);
        assert!(!result.completed());
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn restart_resets_state() {
        let mut s = Session::new(config(), arrow(0, None)).unwrap();
        s.start(0);
        s.act(&RIGHT, 100).unwrap();
        s.start(1_000);
        assert_eq!(s.state().rounds_played, 0);
        assert_eq!(s.score(), 0);
        assert_eq!(s.state().started_at, Some(1_000));
        assert_eq!(s.phase(), Phase::Active);
    }

    #[test]
    fn input_before_start_is_ignored() {
        let mut s = Session::new(config(), arrow(0, None)).unwrap();
        assert_eq!(s.act(&RIGHT, 0).unwrap().verdict, Verdict::AlreadyResolved);
        assert!(s.tick(10_000).is_empty());
        assert!(!s.has_started());
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let zero = SessionConfig {
            max_rounds: Some(0),
            ..config()
        };
        assert_matches!(Session::new(zero, arrow(0, None)), Err(ConfigError::NoRounds));
        let unbounded = SessionConfig {
            max_rounds: None,
            ..config()
        };
        assert_matches!(
            Session::new(unbounded, arrow(0, None)),
            Err(ConfigError::Unbounded)
        );
    }
}
