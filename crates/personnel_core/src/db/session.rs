//! Process-lifetime store session.
//!
//! # Responsibility
//! - Hold the single SQLite connection shared by every store operation.
//! - Degrade to a sentinel state when the connection cannot be opened.
//!
//! # Invariants
//! - A sentinel session never reconnects; every access fails fast.
//! - The connection is released on `close` or on drop, whichever comes first.

use super::{open_db, open_db_in_memory, DbError, DbResult};
use log::{info, warn};
use rusqlite::Connection;
use std::path::Path;

enum SessionState {
    Open(Connection),
    Unavailable(String),
}

/// Explicit store handle injected into repositories.
pub struct StoreSession {
    state: SessionState,
}

impl StoreSession {
    /// Opens a file-backed session.
    ///
    /// Open or migration failure is not returned: the session enters the
    /// sentinel state and reports `DbError::Unavailable` on every access.
    pub fn open(path: impl AsRef<Path>) -> Self {
        match open_db(path) {
            Ok(conn) => Self::from_connection(conn),
            Err(err) => Self::unavailable(err.to_string()),
        }
    }

    /// Opens an in-memory session with the same sentinel semantics as `open`.
    pub fn open_in_memory() -> Self {
        match open_db_in_memory() {
            Ok(conn) => Self::from_connection(conn),
            Err(err) => Self::unavailable(err.to_string()),
        }
    }

    /// Wraps an already bootstrapped connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            state: SessionState::Open(conn),
        }
    }

    /// Builds a sentinel session that fails every operation.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        warn!("event=session_unavailable module=db status=degraded");
        Self {
            state: SessionState::Unavailable(reason),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, SessionState::Open(_))
    }

    /// Borrows the live connection, or fails with `DbError::Unavailable`.
    pub fn connection(&self) -> DbResult<&Connection> {
        match &self.state {
            SessionState::Open(conn) => Ok(conn),
            SessionState::Unavailable(reason) => Err(DbError::Unavailable(reason.clone())),
        }
    }

    /// Closes the session and surfaces close errors.
    ///
    /// Closing a sentinel session is a no-op.
    pub fn close(self) -> DbResult<()> {
        match self.state {
            SessionState::Open(conn) => {
                conn.close().map_err(|(_, err)| DbError::Sqlite(err))?;
                info!("event=db_close module=db status=ok");
                Ok(())
            }
            SessionState::Unavailable(_) => Ok(()),
        }
    }
}

/// Runs `work` with a file-backed session and closes it afterwards.
///
/// Close failures are logged, not returned, so the closure result is never
/// masked. Panics inside `work` still release the connection via drop.
pub fn with_session<T>(path: impl AsRef<Path>, work: impl FnOnce(&StoreSession) -> T) -> T {
    let session = StoreSession::open(path);
    let output = work(&session);
    if let Err(err) = session.close() {
        warn!("event=db_close module=db status=error error={err}");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::{with_session, StoreSession};
    use crate::db::DbError;

    #[test]
    fn in_memory_session_is_available() {
        let session = StoreSession::open_in_memory();
        assert!(session.is_available());
        assert!(session.connection().is_ok());
        session.close().unwrap();
    }

    #[test]
    fn sentinel_session_fails_fast() {
        let session = StoreSession::unavailable("connection refused");
        assert!(!session.is_available());
        let err = session.connection().unwrap_err();
        assert!(matches!(err, DbError::Unavailable(reason) if reason == "connection refused"));
        session.close().unwrap();
    }

    #[test]
    fn open_on_unreachable_path_degrades_to_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("nested").join("db.sqlite3");
        let session = StoreSession::open(&path);
        assert!(!session.is_available());
    }

    #[test]
    fn with_session_returns_closure_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scoped.sqlite3");
        let available = with_session(&path, StoreSession::is_available);
        assert!(available);
        assert!(path.exists());
    }
}
