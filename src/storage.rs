use crate::api::models::ChatSummary;
use crate::session::rolls::Source;
use directories::ProjectDirs;
use rusqlite::{Connection, params};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cache database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("cache encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cache directory error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no data directory available")]
    NoDataDir,
}

fn db_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("com", "example", "MessengerGtk")?;
    Some(proj.data_dir().join("cache.sqlite"))
}

// Caching rolls so the chat list renders before the first fetch returns
pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn open_default() -> Result<Self, StorageError> {
        let path = db_path().ok_or(StorageError::NoDataDir)?;
        Self::open(&path)
    }

    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS chats (
                roll TEXT NOT NULL,
                phone TEXT NOT NULL,
                position INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                raw_json TEXT NOT NULL,
                PRIMARY KEY (roll, phone)
            );
            "#,
        )?;
        Ok(Self { conn })
    }

    /// Replace the cached contents of one roll, keeping server order.
    pub fn replace_roll(&mut self, roll: Source, chats: &[ChatSummary]) -> Result<(), StorageError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM chats WHERE roll = ?1", params![roll.as_str()])?;
        for (idx, c) in chats.iter().enumerate() {
            let raw = serde_json::to_string(c)?;
            tx.execute(
                r#"
                INSERT INTO chats (roll, phone, position, updated_at, raw_json)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(roll, phone) DO UPDATE SET
                    position=excluded.position,
                    updated_at=excluded.updated_at,
                    raw_json=excluded.raw_json
                "#,
                params![roll.as_str(), c.phone, idx as i64, now, raw],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn roll(&self, roll: Source) -> Result<Vec<ChatSummary>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT raw_json FROM chats WHERE roll = ?1 ORDER BY position ASC")?;
        let rows = stmt.query_map(params![roll.as_str()], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for raw in rows {
            out.push(serde_json::from_str(&raw?)?);
        }
        Ok(out)
    }
}
