use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::cmp::Reverse;
use std::path::Path;
use std::rc::Rc;

use crate::app_dirs::AppDirs;
use crate::clock::Millis;
use crate::error::StoreError;
use crate::report::ResultSink;
use crate::result::SessionResult;

/// One stored session, as shown in the history view
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub game_id: String,
    pub score: i64,
    pub time_ms: Millis,
    pub timestamp: DateTime<Local>,
    pub avg_reaction_ms: Option<f64>,
    pub rating: Option<String>,
}

impl ScoreRecord {
    pub fn new(game_id: &str, score: i64, time_ms: Millis, timestamp: DateTime<Local>) -> Self {
        Self {
            game_id: game_id.to_string(),
            score,
            time_ms,
            timestamp,
            avg_reaction_ms: None,
            rating: None,
        }
    }

    pub fn from_result(result: &SessionResult, timestamp: DateTime<Local>) -> Self {
        Self {
            avg_reaction_ms: result.summary.mean_ms,
            rating: result.rating.tier().map(|t| t.label().to_string()),
            ..Self::new(&result.game_id, result.score, result.elapsed_ms, timestamp)
        }
    }
}

/// Durable home for finished sessions and high scores
pub trait ScoreStore {
    fn record(&mut self, rec: &ScoreRecord) -> Result<(), StoreError>;
    /// Highest score ever recorded for the game
    fn query_best(&self, game_id: &str) -> Result<Option<i64>, StoreError>;
    /// Elapsed time of the best-scoring session, the shorter one on ties
    fn query_best_time(&self, game_id: &str) -> Result<Option<Millis>, StoreError>;
    /// Most recent sessions first. `None` means every game.
    fn recent(&self, game_id: Option<&str>, limit: usize) -> Result<Vec<ScoreRecord>, StoreError>;
}

impl<S: ScoreStore + ?Sized> ScoreStore for Box<S> {
    fn record(&mut self, rec: &ScoreRecord) -> Result<(), StoreError> {
        (**self).record(rec)
    }

    fn query_best(&self, game_id: &str) -> Result<Option<i64>, StoreError> {
        (**self).query_best(game_id)
    }

    fn query_best_time(&self, game_id: &str) -> Result<Option<Millis>, StoreError> {
        (**self).query_best_time(game_id)
    }

    fn recent(&self, game_id: Option<&str>, limit: usize) -> Result<Vec<ScoreRecord>, StoreError> {
        (**self).recent(game_id, limit)
    }
}

/// A store shared between the front end (queries) and a result sink (writes)
pub type SharedStore = Rc<RefCell<Box<dyn ScoreStore>>>;

impl<S: ScoreStore + ?Sized> ScoreStore for Rc<RefCell<S>> {
    fn record(&mut self, rec: &ScoreRecord) -> Result<(), StoreError> {
        self.borrow_mut().record(rec)
    }

    fn query_best(&self, game_id: &str) -> Result<Option<i64>, StoreError> {
        self.borrow().query_best(game_id)
    }

    fn query_best_time(&self, game_id: &str) -> Result<Option<Millis>, StoreError> {
        self.borrow().query_best_time(game_id)
    }

    fn recent(&self, game_id: Option<&str>, limit: usize) -> Result<Vec<ScoreRecord>, StoreError> {
        self.borrow().recent(game_id, limit)
    }
}

/// Open the on-disk database, falling back to memory when it cannot be opened
pub fn open_default_store() -> Box<dyn ScoreStore> {
    match ScoreDb::new() {
        Ok(db) => Box::new(db),
        Err(e) => {
            log::warn!("score database unavailable, scores kept in memory: {e}");
            Box::new(MemoryStore::new())
        }
    }
}

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS scores (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        game_id TEXT NOT NULL,
        score INTEGER NOT NULL,
        time_ms INTEGER NOT NULL,
        avg_reaction_ms REAL,
        rating TEXT,
        timestamp TEXT NOT NULL,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    );
    CREATE INDEX IF NOT EXISTS idx_scores_game ON scores(game_id);
    CREATE INDEX IF NOT EXISTS idx_scores_timestamp ON scores(timestamp);
"#;

/// SQLite-backed score store
#[derive(Debug)]
pub struct ScoreDb {
    conn: Connection,
}

impl ScoreDb {
    /// Open the default database under the state dir, creating it if needed
    pub fn new() -> Result<Self, StoreError> {
        let path = AppDirs::db_path().unwrap_or_else(|| "reflex_scores.db".into());
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path.as_ref())?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

fn parse_timestamp(raw: String) -> Result<DateTime<Local>, StoreError> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Local))
        .map_err(|_| StoreError::Timestamp(raw))
}

impl ScoreStore for ScoreDb {
    fn record(&mut self, rec: &ScoreRecord) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO scores (game_id, score, time_ms, avg_reaction_ms, rating, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                rec.game_id,
                rec.score,
                rec.time_ms as i64,
                rec.avg_reaction_ms,
                rec.rating,
                rec.timestamp.to_rfc3339(),
            ],
        )?;
        log::debug!("recorded {} score {}", rec.game_id, rec.score);
        Ok(())
    }

    fn query_best(&self, game_id: &str) -> Result<Option<i64>, StoreError> {
        let best = self
            .conn
            .query_row(
                "SELECT MAX(score) FROM scores WHERE game_id = ?1",
                [game_id],
                |row| row.get::<_, Option<i64>>(0),
            )
            .optional()?;
        Ok(best.flatten())
    }

    fn query_best_time(&self, game_id: &str) -> Result<Option<Millis>, StoreError> {
        let best = self
            .conn
            .query_row(
                r#"
                SELECT time_ms FROM scores
                WHERE game_id = ?1
                ORDER BY score DESC, time_ms ASC
                LIMIT 1
                "#,
                [game_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(best.map(|ms| ms.max(0) as Millis))
    }

    fn recent(&self, game_id: Option<&str>, limit: usize) -> Result<Vec<ScoreRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT game_id, score, time_ms, avg_reaction_ms, rating, timestamp
            FROM scores
            WHERE ?1 IS NULL OR game_id = ?1
            ORDER BY id DESC
            LIMIT ?2
            "#,
        )?;
        let rows = stmt.query_map(params![game_id, limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, Option<f64>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (game_id, score, time_ms, avg_reaction_ms, rating, raw_ts) = row?;
            records.push(ScoreRecord {
                game_id,
                score,
                time_ms: time_ms.max(0) as Millis,
                timestamp: parse_timestamp(raw_ts)?,
                avg_reaction_ms,
                rating,
            });
        }
        Ok(records)
    }
}

/// In-process store used when the database is unavailable, and in tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<ScoreRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn for_game<'a>(&'a self, game_id: &'a str) -> impl Iterator<Item = &'a ScoreRecord> + 'a {
        self.records.iter().filter(move |r| r.game_id == game_id)
    }
}

impl ScoreStore for MemoryStore {
    fn record(&mut self, rec: &ScoreRecord) -> Result<(), StoreError> {
        self.records.push(rec.clone());
        Ok(())
    }

    fn query_best(&self, game_id: &str) -> Result<Option<i64>, StoreError> {
        Ok(self.for_game(game_id).map(|r| r.score).max())
    }

    fn query_best_time(&self, game_id: &str) -> Result<Option<Millis>, StoreError> {
        Ok(self
            .for_game(game_id)
            .max_by_key(|r| (r.score, Reverse(r.time_ms)))
            .map(|r| r.time_ms))
    }

    fn recent(&self, game_id: Option<&str>, limit: usize) -> Result<Vec<ScoreRecord>, StoreError> {
        Ok(self
            .records
            .iter()
            .rev()
            .filter(|r| game_id.map_or(true, |g| r.game_id == g))
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Adapts a store into a session result sink. Failures are logged, not fatal.
pub struct StoreSink<S: ScoreStore> {
    store: S,
}

impl<S: ScoreStore> StoreSink<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: ScoreStore> ResultSink for StoreSink<S> {
    fn deliver(&mut self, result: &SessionResult) {
        if !result.completed() {
            log::debug!("not storing aborted {} session", result.game_id);
            return;
        }
        let rec = ScoreRecord::from_result(result, Local::now());
        if let Err(e) = self.store.record(&rec) {
            log::error!("failed to store {} result: {e}", result.game_id);
        }
    }
}
