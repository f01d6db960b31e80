//! Local persistence for missions, completions, and users.
//!
//! Everything lives in one `SQLite` database:
//!
//! ```text
//! user        # id, username (unique), display name
//! mission     # metadata, location, moderation status
//! task        # one per mission, payload as JSON; cascades with its mission
//! completion  # (user_id, mission_id) primary key; cascades with either side
//! ```
//!
//! Each operation opens its own connection, so concurrent callers contend
//! in the database rather than in this process.

mod completion;
mod mission;
mod user;

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use jiff::Timestamp;
use rusqlite::Connection;
use uuid::Uuid;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("mission not found: {0}")]
    MissionNotFound(Uuid),

    #[error("user not found: {0}")]
    UserNotFound(Uuid),

    #[error("username already taken: {0}")]
    UsernameTaken(String),

    #[error("corrupt data: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS user (
    id          TEXT PRIMARY KEY,
    username    TEXT NOT NULL UNIQUE,
    name        TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS mission (
    id           TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    description  TEXT NOT NULL,
    longitude    REAL NOT NULL,
    latitude     REAL NOT NULL,
    status       TEXT NOT NULL CHECK (status IN ('pending', 'approved', 'rejected')),
    created_by   TEXT NOT NULL,
    decided_by   TEXT,
    decided_at   TEXT,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL,
    CHECK ((status = 'pending') = (decided_by IS NULL AND decided_at IS NULL))
);

CREATE INDEX IF NOT EXISTS mission_status_position
    ON mission (status, latitude, longitude);

CREATE TABLE IF NOT EXISTS task (
    mission_id  TEXT PRIMARY KEY REFERENCES mission (id) ON DELETE CASCADE,
    kind        TEXT NOT NULL,
    payload     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS completion (
    user_id       TEXT NOT NULL REFERENCES user (id) ON DELETE CASCADE,
    mission_id    TEXT NOT NULL REFERENCES mission (id) ON DELETE CASCADE,
    completed_at  TEXT NOT NULL,
    PRIMARY KEY (user_id, mission_id)
);

CREATE INDEX IF NOT EXISTS completion_mission ON completion (mission_id);
";

/// `SQLite`-backed storage for the mission core.
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    /// Opens (creating if needed) the database at `path` and applies the schema.
    ///
    /// Parent directories are created if they don't exist.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let storage = Self { path };
        let conn = storage.open_db()?;
        // journal_mode returns a row, so it can't go through execute.
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
        conn.execute_batch(SCHEMA)?;
        tracing::debug!(path = %storage.path().display(), "storage ready");
        Ok(storage)
    }

    /// Returns the default database path: `~/.geoquest/geoquest.sqlite`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".geoquest").join("geoquest.sqlite"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens a fresh connection with foreign keys enforced.
    fn open_db(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }
}

fn parse_uuid(value: &str, column: &str) -> Result<Uuid> {
    value
        .parse::<Uuid>()
        .map_err(|e| StorageError::Corrupt(format!("invalid {column}: {e}")))
}

fn parse_timestamp(value: &str, column: &str) -> Result<Timestamp> {
    value
        .parse::<Timestamp>()
        .map_err(|e| StorageError::Corrupt(format!("invalid {column}: {e}")))
}
