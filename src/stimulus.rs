use serde::{Deserialize, Serialize};

use crate::error::InputError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn glyph(self) -> char {
        match self {
            Direction::Up => '↑',
            Direction::Down => '↓',
            Direction::Left => '←',
            Direction::Right => '→',
        }
    }
}

/// The randomized content a round presents. One variant per stimulus family;
/// the games module decides which one a given game produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stimulus {
    /// "Go" signal after an anticipation phase; any tap is correct.
    Signal,
    /// A grid of numbers where exactly one exceeds `threshold`.
    Numbers { values: Vec<u32>, threshold: u32 },
    /// Dots scattered on a small field; the answer is how many there are.
    Dots { positions: Vec<(u8, u8)> },
    /// Swipe in the direction the arrow points.
    Arrow(Direction),
    /// A ball falling in one of `lanes`; pick its lane before it lands.
    Ball { lane: usize, lanes: usize },
}

/// A discrete user action, timestamped by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Tap,
    Pick(usize),
    Swipe(Direction),
    Answer(String),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Tap => "tap",
            Action::Pick(_) => "pick",
            Action::Swipe(_) => "swipe",
            Action::Answer(_) => "answer",
        }
    }
}

impl Stimulus {
    pub fn name(&self) -> &'static str {
        match self {
            Stimulus::Signal => "signal",
            Stimulus::Numbers { .. } => "numbers",
            Stimulus::Dots { .. } => "dots",
            Stimulus::Arrow(_) => "arrow",
            Stimulus::Ball { .. } => "ball",
        }
    }

    /// Whether `action` answers this stimulus correctly.
    ///
    /// Errors mean the action has the wrong shape for this stimulus and must be
    /// ignored rather than scored.
    pub fn judge(&self, action: &Action) -> Result<bool, InputError> {
        match (self, action) {
            (Stimulus::Signal, Action::Tap) => Ok(true),
            (Stimulus::Numbers { values, threshold }, Action::Pick(i)) => values
                .get(*i)
                .map(|v| v > threshold)
                .ok_or(InputError::OutOfRange {
                    index: *i,
                    len: values.len(),
                }),
            (Stimulus::Dots { positions }, Action::Answer(text)) => {
                let trimmed = text.trim();
                let n = trimmed
                    .parse::<usize>()
                    .map_err(|_| InputError::NotANumber(trimmed.to_string()))?;
                Ok(n == positions.len())
            }
            (Stimulus::Arrow(expected), Action::Swipe(got)) => Ok(expected == got),
            (Stimulus::Ball { lane, lanes }, Action::Pick(i)) => {
                if i >= lanes {
                    Err(InputError::OutOfRange {
                        index: *i,
                        len: *lanes,
                    })
                } else {
                    Ok(i == lane)
                }
            }
            (stimulus, action) => Err(InputError::WrongKind {
                action: action.name(),
                stimulus: stimulus.name(),
            }),
        }
    }

    /// The action that answers this stimulus correctly
    pub fn correct_action(&self) -> Action {
        match self {
            Stimulus::Signal => Action::Tap,
            Stimulus::Numbers { values, threshold } => {
                Action::Pick(values.iter().position(|v| v > threshold).unwrap_or(0))
            }
            Stimulus::Dots { positions } => Action::Answer(positions.len().to_string()),
            Stimulus::Arrow(d) => Action::Swipe(*d),
            Stimulus::Ball { lane, .. } => Action::Pick(*lane),
        }
    }

    /// A well-formed but wrong action, if the stimulus admits one
    pub fn wrong_action(&self) -> Option<Action> {
        match self {
            Stimulus::Signal => None,
            Stimulus::Numbers { values, threshold } => {
                values.iter().position(|v| v <= threshold).map(Action::Pick)
            }
            Stimulus::Dots { positions } => Some(Action::Answer((positions.len() + 1).to_string())),
            Stimulus::Arrow(d) => Direction::ALL
                .into_iter()
                .find(|other| other != d)
                .map(Action::Swipe),
            Stimulus::Ball { lane, lanes } => (0..*lanes).find(|l| l != lane).map(Action::Pick),
        }
    }
}
