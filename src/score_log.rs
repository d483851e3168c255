use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::StoreError;
use crate::report::ResultSink;
use crate::result::SessionResult;

/// One line of the CSV score log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRow {
    pub date: String,
    pub game: String,
    pub score: i64,
    pub elapsed_ms: u64,
    pub rounds: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub too_early: u32,
    pub timeouts: u32,
    pub avg_ms: Option<f64>,
    pub tier: String,
}

impl LogRow {
    pub fn from_result(result: &SessionResult, at: DateTime<Local>) -> Self {
        Self {
            date: at.to_rfc3339(),
            game: result.game_id.clone(),
            score: result.score,
            elapsed_ms: result.elapsed_ms,
            rounds: result.rounds_played,
            correct: result.correct(),
            incorrect: result.rounds_played - result.correct(),
            too_early: result.too_early(),
            timeouts: result.timeouts(),
            avg_ms: result.summary.mean_ms.map(|ms| (ms * 100.0).round() / 100.0),
            tier: result.rating.label().to_string(),
        }
    }
}

/// Append-only CSV log of finished sessions
#[derive(Debug, Clone)]
pub struct ScoreLog {
    path: PathBuf,
}

impl ScoreLog {
    pub fn new() -> Option<Self> {
        AppDirs::score_log_path().map(Self::with_path)
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, row: &LogRow) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // header only for a brand new file
        let needs_header = !self.path.exists();
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(row)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_all(&self) -> Result<Vec<LogRow>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let rows = reader.deserialize().collect::<Result<Vec<LogRow>, _>>()?;
        Ok(rows)
    }
}

impl ResultSink for ScoreLog {
    fn deliver(&mut self, result: &SessionResult) {
        if !result.completed() {
            return;
        }
        if let Err(e) = self.append(&LogRow::from_result(result, Local::now())) {
            log::error!("failed to append to {}: {e}", self.path().display());
        }
    }
}
