//! bb8 connection manager for rusqlite.
//!
//! rusqlite is blocking, so every statement runs on tokio's blocking pool
//! while holding the connection's mutex.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rusqlite::Connection;
use tokio::sync::Mutex;

use super::error::{StoreError, StoreResult};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where connections point.
#[derive(Clone, Debug)]
pub enum SqliteTarget {
    File(PathBuf),
    /// Private in-memory database; only meaningful with a single-connection pool.
    Memory,
}

pub struct SqliteConnectionManager {
    target: SqliteTarget,
}

impl SqliteConnectionManager {
    pub fn new(target: SqliteTarget) -> Self {
        Self { target }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(SqliteTarget::File(path.into()))
    }

    pub fn memory() -> Self {
        Self::new(SqliteTarget::Memory)
    }

    fn open(target: &SqliteTarget) -> StoreResult<Connection> {
        let conn = match target {
            SqliteTarget::File(path) => Connection::open(path)?,
            SqliteTarget::Memory => Connection::open_in_memory()?,
        };

        // Busy timeout first: switching to WAL takes a lock.
        conn.busy_timeout(BUSY_TIMEOUT)?;
        if let SqliteTarget::File(_) = target {
            let mode: String =
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
            tracing::trace!(journal_mode = %mode, "SQLite connection opened");
        }
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(conn)
    }
}

/// A pooled rusqlite connection.
pub struct PooledConnection {
    inner: Arc<Mutex<Connection>>,
}

impl PooledConnection {
    fn new(conn: Connection) -> Self {
        Self {
            inner: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs `f` against the connection on the blocking pool.
    pub async fn with_connection<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let guard = conn.blocking_lock();
            f(&guard)
        })
        .await?
    }

    /// Like [`with_connection`](Self::with_connection), for work that needs a transaction.
    pub async fn with_connection_mut<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.blocking_lock();
            f(&mut guard)
        })
        .await?
    }
}

impl bb8::ManageConnection for SqliteConnectionManager {
    type Connection = PooledConnection;
    type Error = StoreError;

    fn connect(&self) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send {
        let target = self.target.clone();
        async move {
            tokio::task::spawn_blocking(move || Self::open(&target).map(PooledConnection::new))
                .await?
        }
    }

    fn is_valid(
        &self,
        conn: &mut Self::Connection,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        let inner = Arc::clone(&conn.inner);
        async move {
            tokio::task::spawn_blocking(move || {
                let guard = inner.blocking_lock();
                guard.execute_batch("SELECT 1").map_err(StoreError::from)
            })
            .await?
        }
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}
