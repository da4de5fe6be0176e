use crate::{
    error::{KanbanError, Result},
    storage::Storage,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite-backed key-value storage
pub struct SqliteStorage {
    connection: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `database_path`
    pub fn new(database_path: impl AsRef<Path>) -> Result<Self> {
        Self::from_connection(Connection::open(database_path).map_err(storage_error)?)
    }

    /// Opens a private in-memory database
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory().map_err(storage_error)?)
    }

    fn from_connection(connection: Connection) -> Result<Self> {
        connection
            .execute(
                "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
                [],
            )
            .map_err(storage_error)?;
        Ok(Self { connection })
    }
}

fn storage_error(err: rusqlite::Error) -> KanbanError {
    KanbanError::Storage(err.to_string())
}

impl Storage for SqliteStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.connection
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(storage_error)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.connection
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(storage_error)?;
        Ok(())
    }
}
