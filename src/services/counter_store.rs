use crate::error::AppError;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub const ITEMS_SORTED_KEY: &str = "items_sorted";

/// Get/set capability for the running "items sorted" counter.
pub trait CounterStore {
    fn get(&self) -> Result<u64, AppError>;
    fn set(&self, value: u64) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct SqliteCounterStore {
    conn: Arc<Mutex<Connection>>,
    key: String,
}

impl SqliteCounterStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, AppError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, AppError> {
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS stats (
                key TEXT PRIMARY KEY,
                value INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            key: ITEMS_SORTED_KEY.to_string(),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, AppError> {
        self.conn
            .lock()
            .map_err(|_| AppError::Storage("counter store lock poisoned".to_string()))
    }
}

impl CounterStore for SqliteCounterStore {
    fn get(&self) -> Result<u64, AppError> {
        let conn = self.lock()?;
        let value: Option<i64> = conn
            .query_row(
                "SELECT value FROM stats WHERE key = ?1",
                params![self.key],
                |row| row.get(0),
            )
            .optional()?;
        // Negative values can only come from outside tampering.
        Ok(value.map(|v| v.max(0) as u64).unwrap_or(0))
    }

    fn set(&self, value: u64) -> Result<(), AppError> {
        let stored = i64::try_from(value)
            .map_err(|_| AppError::Storage(format!("counter value {} out of range", value)))?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO stats (key, value) VALUES (?1, ?2)",
            params![self.key, stored],
        )?;
        Ok(())
    }
}

/// Process-local store, used when nothing should touch disk.
#[derive(Clone, Default)]
pub struct MemoryCounterStore {
    value: Arc<Mutex<u64>>,
}

impl MemoryCounterStore {
    pub fn new(initial: u64) -> Self {
        Self {
            value: Arc::new(Mutex::new(initial)),
        }
    }
}

impl CounterStore for MemoryCounterStore {
    fn get(&self) -> Result<u64, AppError> {
        self.value
            .lock()
            .map(|v| *v)
            .map_err(|_| AppError::Storage("counter store lock poisoned".to_string()))
    }

    fn set(&self, value: u64) -> Result<(), AppError> {
        let mut guard = self
            .value
            .lock()
            .map_err(|_| AppError::Storage("counter store lock poisoned".to_string()))?;
        *guard = value;
        Ok(())
    }
}

impl<T: CounterStore + ?Sized> CounterStore for Arc<T> {
    fn get(&self) -> Result<u64, AppError> {
        (**self).get()
    }

    fn set(&self, value: u64) -> Result<(), AppError> {
        (**self).set(value)
    }
}
