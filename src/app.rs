use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::clock::Millis;
use crate::error::ConfigError;
use crate::games::{GameId, SessionOverrides};
use crate::report::{Reporter, ResultSink};
use crate::result::SessionResult;
use crate::score_log::ScoreLog;
use crate::session::{Phase, Session, SessionEvent};
use crate::stats::{ScoreRecord, ScoreStore, SharedStore, StoreSink};
use crate::stimulus::{Action, Direction};

/// Rows shown on the history screen
pub const HISTORY_LIMIT: usize = 20;
/// Longest answer the dots game will buffer
const MAX_ANSWER_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Playing,
    Results,
    History,
}

/// What the event loop should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Front-end state: the running session plus everything the screens show
pub struct App {
    pub game: GameId,
    pub overrides: SessionOverrides,
    pub session: Session,
    pub state: AppState,
    /// Digits typed so far for an `Answer` action
    pub answer: String,
    /// Last rejected input, cleared by the next accepted one
    pub notice: Option<String>,
    /// Latest timestamp seen, used for countdowns while rendering
    pub now: Millis,
    pub best_score: Option<i64>,
    pub best_time: Option<Millis>,
    pub history: Vec<ScoreRecord>,
    store: SharedStore,
    score_log: Option<ScoreLog>,
}

impl App {
    pub fn new(
        game: GameId,
        overrides: SessionOverrides,
        store: Box<dyn ScoreStore>,
        score_log: Option<ScoreLog>,
    ) -> Result<Self, ConfigError> {
        let store: SharedStore = Rc::new(RefCell::new(store));
        let session = build_session(game, overrides, &store, score_log.clone())?;
        Ok(Self {
            game,
            overrides,
            session,
            state: AppState::Playing,
            answer: String::new(),
            notice: None,
            now: 0,
            best_score: None,
            best_time: None,
            history: Vec::new(),
            store,
            score_log,
        })
    }

    pub fn start(&mut self, now: Millis) {
        self.now = now;
        self.state = AppState::Playing;
        self.answer.clear();
        self.notice = None;
        let events = self.session.start(now);
        self.handle_events(events);
    }

    /// Switch to `game` and start a fresh session
    pub fn reset(&mut self, game: GameId, now: Millis) -> Result<(), ConfigError> {
        if !self.session.has_finished() && self.session.has_started() {
            self.session.abort(now);
        }
        self.session = build_session(game, self.overrides, &self.store, self.score_log.clone())?;
        self.game = game;
        self.start(now);
        Ok(())
    }

    pub fn on_tick(&mut self, now: Millis) {
        self.now = self.now.max(now);
        let events = self.session.tick(now);
        self.handle_events(events);
    }

    pub fn on_key(&mut self, key: KeyEvent, at: Millis) -> Control {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            self.session.abort(at);
            return Control::Quit;
        }
        self.now = self.now.max(at);

        match self.state {
            AppState::Playing => self.on_playing_key(key, at),
            AppState::Results | AppState::History => match key.code {
                KeyCode::Char('r') => self.restart_with(self.game, at),
                KeyCode::Char('n') => self.restart_with(next_game(self.game), at),
                KeyCode::Char('h') if self.state == AppState::Results => {
                    self.refresh_history();
                    self.state = AppState::History;
                }
                KeyCode::Char('b') | KeyCode::Backspace if self.state == AppState::History => {
                    self.state = AppState::Results;
                }
                KeyCode::Char('q') => return Control::Quit,
                _ => {}
            },
        }
        Control::Continue
    }

    fn restart_with(&mut self, game: GameId, at: Millis) {
        if let Err(e) = self.reset(game, at) {
            log::error!("cannot start {game}: {e}");
            self.notice = Some(e.to_string());
        }
    }

    fn on_playing_key(&mut self, key: KeyEvent, at: Millis) {
        if self.game == GameId::Dots {
            match key.code {
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    if self.answer.len() < MAX_ANSWER_LEN {
                        self.answer.push(c);
                    }
                    return;
                }
                KeyCode::Backspace => {
                    self.answer.pop();
                    return;
                }
                _ => {}
            }
        }

        let Some(action) = map_key(self.game, key, &self.answer) else {
            return;
        };
        match self.session.act(&action, at) {
            Ok(acted) => {
                self.notice = None;
                self.handle_events(acted.events);
            }
            Err(e) => {
                log::debug!("rejected {}: {e}", action.name());
                self.notice = Some(e.to_string());
            }
        }
    }

    fn handle_events(&mut self, events: Vec<SessionEvent>) {
        for event in events {
            match event {
                SessionEvent::StimulusShown { .. } | SessionEvent::Feedback(_) => {
                    self.answer.clear();
                }
                SessionEvent::Ended(result) => self.on_ended(&result),
                SessionEvent::RoundStarted { .. } | SessionEvent::StimulusHidden { .. } => {}
            }
        }
    }

    fn on_ended(&mut self, result: &SessionResult) {
        self.state = AppState::Results;
        self.answer.clear();
        let store = self.store.borrow();
        self.best_score = store.query_best(&result.game_id).unwrap_or_else(|e| {
            log::warn!("best score lookup failed: {e}");
            None
        });
        self.best_time = if self.session.config().tracks_best_time() {
            store.query_best_time(&result.game_id).unwrap_or_else(|e| {
                log::warn!("best time lookup failed: {e}");
                None
            })
        } else {
            None
        };
    }

    pub fn refresh_history(&mut self) {
        self.history = self
            .store
            .recent(None, HISTORY_LIMIT)
            .unwrap_or_else(|e| {
                log::warn!("history lookup failed: {e}");
                Vec::new()
            });
    }

    /// Whether the stimulus is currently on screen
    pub fn stimulus_visible(&self) -> bool {
        self.session.phase() == Phase::Active
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("game", &self.game)
            .field("state", &self.state)
            .field("session", &self.session)
            .field("answer", &self.answer)
            .finish_non_exhaustive()
    }
}

fn build_session(
    game: GameId,
    overrides: SessionOverrides,
    store: &SharedStore,
    score_log: Option<ScoreLog>,
) -> Result<Session, ConfigError> {
    let mut store_sink = StoreSink::new(Rc::clone(store));
    let mut score_log = score_log;
    let reporter = Reporter::new(move |result: &SessionResult| {
        store_sink.deliver(result);
        if let Some(log) = score_log.as_mut() {
            log.deliver(result);
        }
    });
    Ok(game.new_session(overrides)?.with_reporter(reporter))
}

/// The game after `game` in registry order, wrapping around
pub fn next_game(game: GameId) -> GameId {
    let idx = GameId::ALL.iter().position(|g| *g == game).unwrap_or(0);
    GameId::ALL[(idx + 1) % GameId::ALL.len()]
}

/// Translate a key press into a game action.
///
/// `answer` is the buffered text submitted by Enter in games that take typed answers.
pub fn map_key(game: GameId, key: KeyEvent, answer: &str) -> Option<Action> {
    match (game, key.code) {
        (GameId::Reaction, KeyCode::Char(' ') | KeyCode::Enter) => Some(Action::Tap),
        (GameId::Greater, KeyCode::Char(c)) => cell_index(c).map(Action::Pick),
        (GameId::Dots, KeyCode::Enter) => Some(Action::Answer(answer.to_string())),
        (GameId::Arrows, code) => arrow_direction(code).map(Action::Swipe),
        (GameId::Catch, KeyCode::Char(c)) => match c.to_digit(10) {
            Some(d @ 1..=9) => Some(Action::Pick(d as usize - 1)),
            _ => None,
        },
        _ => None,
    }
}

/// `1`-`9` pick cells 0-8, `a`-`g` pick cells 9-15
fn cell_index(c: char) -> Option<usize> {
    match c {
        '1'..='9' => Some(c as usize - '1' as usize),
        'a'..='g' => Some(c as usize - 'a' as usize + 9),
        _ => None,
    }
}

fn arrow_direction(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up => Some(Direction::Up),
        KeyCode::Down => Some(Direction::Down),
        KeyCode::Left => Some(Direction::Left),
        KeyCode::Right => Some(Direction::Right),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::EndReason;
    use crate::stats::MemoryStore;
    use assert_matches::assert_matches;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app(game: GameId) -> App {
        let overrides = SessionOverrides {
            seed: Some(7),
            ..SessionOverrides::default()
        };
        App::new(game, overrides, Box::new(MemoryStore::new()), None).unwrap()
    }

    #[test]
    fn key_mapping_per_game() {
        assert_eq!(
            map_key(GameId::Reaction, key(KeyCode::Char(' ')), ""),
            Some(Action::Tap)
        );
        assert_eq!(
            map_key(GameId::Greater, key(KeyCode::Char('1')), ""),
            Some(Action::Pick(0))
        );
        assert_eq!(
            map_key(GameId::Greater, key(KeyCode::Char('g')), ""),
            Some(Action::Pick(15))
        );
        assert_eq!(
            map_key(GameId::Dots, key(KeyCode::Enter), "12"),
            Some(Action::Answer("12".into()))
        );
        assert_eq!(
            map_key(GameId::Arrows, key(KeyCode::Left), ""),
            Some(Action::Swipe(Direction::Left))
        );
        assert_eq!(
            map_key(GameId::Catch, key(KeyCode::Char('3')), ""),
            Some(Action::Pick(2))
        );
        assert_eq!(map_key(GameId::Catch, key(KeyCode::Char('0')), ""), None);
        assert_eq!(map_key(GameId::Reaction, key(KeyCode::Left), ""), None);
    }

    #[test]
    fn next_game_wraps() {
        assert_eq!(next_game(GameId::Reaction), GameId::Greater);
        assert_eq!(next_game(GameId::Catch), GameId::Reaction);
    }

    #[test]
    fn early_tap_is_penalised_not_ignored() {
        let mut app = app(GameId::Reaction);
        app.start(0);
        assert!(!app.stimulus_visible());
        app.on_key(key(KeyCode::Char(' ')), 10);
        let fb = app.session.state().last_feedback.unwrap();
        assert_eq!(fb.outcome, crate::round::Outcome::TooEarly);
    }

    #[test]
    fn dots_answer_is_buffered_until_enter() {
        let mut app = app(GameId::Dots);
        app.start(0);
        let reveal = app.session.current_round().unwrap().reveal_at;
        app.on_tick(reveal);
        assert!(app.stimulus_visible());

        app.on_key(key(KeyCode::Char('1')), reveal + 10);
        app.on_key(key(KeyCode::Char('2')), reveal + 20);
        app.on_key(key(KeyCode::Backspace), reveal + 30);
        assert_eq!(app.answer, "1");
        assert_eq!(app.session.state().rounds_played, 0);

        // empty answers are rejected without touching the round
        app.on_key(key(KeyCode::Backspace), reveal + 40);
        app.on_key(key(KeyCode::Enter), reveal + 50);
        assert!(app.notice.is_some());
        assert_eq!(app.session.state().rounds_played, 0);

        app.on_key(key(KeyCode::Char('3')), reveal + 60);
        app.on_key(key(KeyCode::Enter), reveal + 70);
        assert!(app.notice.is_none());
        assert!(app.answer.is_empty());
        assert_eq!(app.session.state().rounds_played, 1);
    }

    #[test]
    fn finished_session_shows_results_and_records() {
        let mut app = app(GameId::Catch);
        app.start(0);
        let mut now = 0;
        while app.state == AppState::Playing && now < 600_000 {
            now += 50;
            app.on_tick(now);
        }
        assert_eq!(app.state, AppState::Results);
        assert_matches!(
            app.session.result().map(|r| r.ended_by),
            Some(EndReason::MissLimit)
        );
        assert_eq!(app.best_score, Some(0));
        // catch ends on misses, so its session length is not a record
        assert_eq!(app.best_time, None);

        app.on_key(key(KeyCode::Char('h')), now);
        assert_eq!(app.state, AppState::History);
        assert_eq!(app.history.len(), 1);
        assert_eq!(app.history[0].game_id, "catch");

        app.on_key(key(KeyCode::Char('b')), now);
        assert_eq!(app.state, AppState::Results);

        app.on_key(key(KeyCode::Char('n')), now);
        assert_eq!(app.game, GameId::Reaction);
        assert_eq!(app.state, AppState::Playing);
    }

    #[test]
    fn escape_quits_and_aborts() {
        let mut app = app(GameId::Arrows);
        app.start(0);
        assert_eq!(app.on_key(key(KeyCode::Esc), 100), Control::Quit);
        assert_matches!(
            app.session.result().map(|r| r.ended_by),
            Some(EndReason::Aborted)
        );
        app.refresh_history();
        assert!(app.history.is_empty());
    }
}
