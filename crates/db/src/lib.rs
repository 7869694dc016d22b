//! Embedded SQLite storage for SHELF.
//!
//! The [`Database`] handle owns a single connection behind a mutex and is
//! cloned into every module that needs storage. With the default
//! `":memory:"` path the data lives exactly as long as the process.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

/// Path value that selects a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Errors raised by the storage layer.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database connection lock poisoned")]
    Poisoned,

    #[error("migration {module}/{id} failed: {source}")]
    Migration {
        module: String,
        id: String,
        #[source]
        source: rusqlite::Error,
    },
}

/// Cloneable handle to the embedded database.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open the database at `path`, or an in-memory one for [`IN_MEMORY`].
    pub fn open(path: &str) -> Result<Self, DbError> {
        let conn = if path == IN_MEMORY {
            Connection::open_in_memory()?
        } else {
            Connection::open(Path::new(path))?
        };

        tracing::info!(target: "shelf-db", path, "database opened");

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Open a fresh private in-memory database.
    pub fn in_memory() -> Result<Self, DbError> {
        Self::open(IN_MEMORY)
    }

    /// Run `f` with exclusive access to the connection.
    pub fn with_conn<T, F>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&mut Connection) -> Result<T, rusqlite::Error>,
    {
        let mut conn = self.conn.lock().map_err(|_| DbError::Poisoned)?;
        f(&mut conn).map_err(DbError::from)
    }

    /// Apply `(module, id, sql)` migrations that have not run yet.
    ///
    /// Each migration runs in its own transaction together with the row that
    /// records it, so a failed script leaves no trace. Returns the number of
    /// migrations applied by this call.
    pub fn apply_migrations<'a, I>(&self, migrations: I) -> Result<usize, DbError>
    where
        I: IntoIterator<Item = (&'a str, &'a str, &'a str)>,
    {
        let mut conn = self.conn.lock().map_err(|_| DbError::Poisoned)?;
        let mut applied = 0;

        for (module, id, sql) in migrations {
            let seen = conn
                .query_row(
                    "SELECT 1 FROM _migrations WHERE module = ?1 AND id = ?2",
                    params![module, id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if seen {
                tracing::debug!(target: "shelf-db", module, id, "migration already applied");
                continue;
            }

            let wrap = |source| DbError::Migration {
                module: module.to_string(),
                id: id.to_string(),
                source,
            };

            let tx = conn.transaction()?;
            tx.execute_batch(sql).map_err(wrap)?;
            tx.execute(
                "INSERT INTO _migrations (module, id) VALUES (?1, ?2)",
                params![module, id],
            )
            .map_err(wrap)?;
            tx.commit()?;

            tracing::info!(target: "shelf-db", module, id, "migration applied");
            applied += 1;
        }

        Ok(applied)
    }

    fn init_schema(&self) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS _migrations (
                    module TEXT NOT NULL,
                    id TEXT NOT NULL,
                    applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                    PRIMARY KEY (module, id)
                );
                "#,
            )
        })
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}
