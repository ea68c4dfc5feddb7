use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use super::{decode, encode, HistoryStore, HISTORY_KEY};
use crate::error::StoreError;
use crate::scan::HistoryEntry;

const DB_FILE: &str = "encode.db";

/// Get the default data directory (~/.local/share/encode or platform equivalent)
pub fn default_data_dir() -> Result<PathBuf, StoreError> {
    let data_dir = directories::ProjectDirs::from("", "", "encode")
        .ok_or(StoreError::NoDataDir)?
        .data_dir()
        .to_path_buf();

    Ok(data_dir)
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS storage (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// Key/value storage in a local SQLite file. Open once per process.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open `encode.db` inside `data_dir`, creating the directory if needed.
    pub fn open_in(data_dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(data_dir)?;
        SqliteStore::open(&data_dir.join(DB_FILE))
    }

    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(db_path)?;
        init_schema(&conn)?;
        Ok(SqliteStore { conn })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(SqliteStore { conn })
    }
}

impl HistoryStore for SqliteStore {
    fn load(&self) -> Result<Option<Vec<HistoryEntry>>, StoreError> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM storage WHERE key = ?1",
                params![HISTORY_KEY],
                |row| row.get(0),
            )
            .optional()?;

        value.as_deref().map(decode).transpose()
    }

    fn save(&mut self, entries: &[HistoryEntry]) -> Result<(), StoreError> {
        let value = encode(entries)?;

        self.conn.execute(
            "INSERT INTO storage (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![HISTORY_KEY, value],
        )?;

        Ok(())
    }

    fn remove(&mut self) -> Result<(), StoreError> {
        self.conn.execute(
            "DELETE FROM storage WHERE key = ?1",
            params![HISTORY_KEY],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::catalog;
    use chrono::Utc;

    #[test]
    fn missing_key_loads_as_none() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_overwrites_previous_value() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let first = HistoryEntry::new(catalog::pick(0), Utc::now(), None);
        let second = HistoryEntry::new(catalog::pick(1), Utc::now(), Some(first.id));

        store.save(&[first.clone()]).unwrap();
        store.save(&[second.clone(), first.clone()]).unwrap();

        assert_eq!(store.load().unwrap(), Some(vec![second, first]));
    }

    #[test]
    fn remove_deletes_the_key() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.save(&[]).unwrap();
        assert_eq!(store.load().unwrap(), Some(vec![]));

        store.remove().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn malformed_value_is_an_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO storage (key, value) VALUES (?1, ?2)",
                params![HISTORY_KEY, "not json"],
            )
            .unwrap();

        assert!(matches!(store.load(), Err(StoreError::Json(_))));
    }

    #[test]
    fn reopening_the_file_keeps_history() {
        let dir = tempfile::tempdir().unwrap();
        let entry = HistoryEntry::new(catalog::pick(2), Utc::now(), None);

        {
            let mut store = SqliteStore::open_in(dir.path()).unwrap();
            store.save(&[entry.clone()]).unwrap();
        }

        let store = SqliteStore::open_in(dir.path()).unwrap();
        assert_eq!(store.load().unwrap(), Some(vec![entry]));
    }
}
