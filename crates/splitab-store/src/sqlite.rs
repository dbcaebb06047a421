use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection};
use splitab_core::{AbError, ErrorInfo, KeyValueStore};
use tracing::debug;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS set_members (
    key TEXT NOT NULL,
    member TEXT NOT NULL,
    PRIMARY KEY (key, member)
);
CREATE TABLE IF NOT EXISTS counters (
    key TEXT NOT NULL PRIMARY KEY,
    value INTEGER NOT NULL
);
"#;

/// Connection tuning for [`SqliteStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct SqliteOptions {
    /// How long a writer waits on a lock held by another process.
    pub busy_timeout: Duration,
    /// Switch the database to write-ahead logging.
    pub wal: bool,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
            wal: true,
        }
    }
}

/// SQLite-backed store shared by every process that opens the same file.
///
/// Each trait operation is a single SQL statement, which SQLite executes
/// atomically, so concurrent workers observe consistent sets and counters.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path` with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AbError> {
        Self::open_with(path, &SqliteOptions::default())
    }

    /// Opens the database at `path` with explicit options.
    pub fn open_with(path: impl AsRef<Path>, options: &SqliteOptions) -> Result<Self, AbError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|err| {
                    AbError::Store(
                        ErrorInfo::new("splitab_store.sqlite_dir", "failed to create store directory")
                            .with_context("path", parent.display().to_string())
                            .with_hint(err.to_string()),
                    )
                })?;
            }
        }
        let conn = Connection::open(path).map_err(|err| {
            AbError::Store(
                ErrorInfo::new("splitab_store.sqlite_open", "failed to open sqlite store")
                    .with_context("path", path.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;
        let store = Self::prepare(conn, options, Some(path.to_path_buf()))?;
        debug!(path = %path.display(), wal = options.wal, "opened sqlite store");
        Ok(store)
    }

    /// Opens a private in-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self, AbError> {
        let conn = Connection::open_in_memory().map_err(|err| {
            AbError::Store(
                ErrorInfo::new("splitab_store.sqlite_open", "failed to open in-memory sqlite store")
                    .with_hint(err.to_string()),
            )
        })?;
        let options = SqliteOptions {
            wal: false,
            ..SqliteOptions::default()
        };
        Self::prepare(conn, &options, None)
    }

    /// Returns the database file path, or `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn prepare(
        conn: Connection,
        options: &SqliteOptions,
        path: Option<PathBuf>,
    ) -> Result<Self, AbError> {
        conn.busy_timeout(options.busy_timeout).map_err(|err| {
            AbError::Store(
                ErrorInfo::new("splitab_store.sqlite_pragma", "failed to set busy timeout")
                    .with_hint(err.to_string()),
            )
        })?;
        if options.wal {
            conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get::<_, String>(0))
                .map_err(|err| {
                    AbError::Store(
                        ErrorInfo::new("splitab_store.sqlite_pragma", "failed to enable WAL")
                            .with_hint(err.to_string()),
                    )
                })?;
        }
        conn.execute_batch(SCHEMA).map_err(|err| {
            AbError::Store(
                ErrorInfo::new("splitab_store.sqlite_schema", "failed to ensure store schema")
                    .with_hint(err.to_string()),
            )
        })?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    fn conn(&self, key: &str) -> Result<MutexGuard<'_, Connection>, AbError> {
        self.conn
            .lock()
            .map_err(|err| AbError::store("splitab_store.sqlite_poisoned", key, err))
    }
}

impl KeyValueStore for SqliteStore {
    fn set_add(&self, key: &str, member: &str) -> Result<(), AbError> {
        let conn = self.conn(key)?;
        conn.execute(
            "INSERT OR IGNORE INTO set_members (key, member) VALUES (?1, ?2)",
            params![key, member],
        )
        .map_err(|err| AbError::store("splitab_store.sqlite_set_add", key, err))?;
        Ok(())
    }

    fn set_is_member(&self, key: &str, member: &str) -> Result<bool, AbError> {
        let conn = self.conn(key)?;
        conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM set_members WHERE key = ?1 AND member = ?2)",
            params![key, member],
            |row| row.get::<_, bool>(0),
        )
        .map_err(|err| AbError::store("splitab_store.sqlite_set_is_member", key, err))
    }

    fn set_cardinality(&self, key: &str) -> Result<u64, AbError> {
        let conn = self.conn(key)?;
        let count = conn
            .query_row(
                "SELECT COUNT(*) FROM set_members WHERE key = ?1",
                params![key],
                |row| row.get::<_, i64>(0),
            )
            .map_err(|err| AbError::store("splitab_store.sqlite_set_cardinality", key, err))?;
        Ok(count.max(0) as u64)
    }

    fn counter_increment(&self, key: &str) -> Result<u64, AbError> {
        let conn = self.conn(key)?;
        let value = conn
            .query_row(
                "INSERT INTO counters (key, value) VALUES (?1, 1)
                 ON CONFLICT(key) DO UPDATE SET value = value + 1
                 RETURNING value",
                params![key],
                |row| row.get::<_, i64>(0),
            )
            .map_err(|err| AbError::store("splitab_store.sqlite_counter_increment", key, err))?;
        Ok(value.max(0) as u64)
    }

    fn counter_get(&self, key: &str) -> Result<u64, AbError> {
        let conn = self.conn(key)?;
        let value = conn
            .query_row(
                "SELECT COALESCE((SELECT value FROM counters WHERE key = ?1), 0)",
                params![key],
                |row| row.get::<_, i64>(0),
            )
            .map_err(|err| AbError::store("splitab_store.sqlite_counter_get", key, err))?;
        Ok(value.max(0) as u64)
    }

    fn delete(&self, key: &str) -> Result<(), AbError> {
        let conn = self.conn(key)?;
        conn.execute("DELETE FROM set_members WHERE key = ?1", params![key])
            .map_err(|err| AbError::store("splitab_store.sqlite_delete", key, err))?;
        conn.execute("DELETE FROM counters WHERE key = ?1", params![key])
            .map_err(|err| AbError::store("splitab_store.sqlite_delete", key, err))?;
        Ok(())
    }
}
