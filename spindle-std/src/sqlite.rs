//! SQLite-backed sessions.
//!
//! Every context that asks for [`HookArg::Db`](spindle_core::HookArg::Db)
//! gets its own [`rusqlite::Connection`], opened and closed on the thread
//! running the hook.

use rusqlite::Connection;
use spindle_core::{BoxError, Session, SessionFactory};
use std::{any::Any, path::PathBuf};

enum Target {
    Memory,
    File(PathBuf),
}

/// A [`SessionFactory`] opening one SQLite connection per session.
pub struct SqliteSessions {
    target: Target,
    init_sql: Option<String>,
}

impl SqliteSessions {
    /// Sessions on a private in-memory database each.
    pub fn in_memory() -> Self {
        Self {
            target: Target::Memory,
            init_sql: None,
        }
    }

    /// Sessions on the database file at `path`, created if missing.
    pub fn open_path(path: impl Into<PathBuf>) -> Self {
        Self {
            target: Target::File(path.into()),
            init_sql: None,
        }
    }

    /// SQL batch run on every new connection, e.g. `CREATE TABLE IF NOT EXISTS`.
    pub fn with_init_sql(mut self, sql: impl Into<String>) -> Self {
        self.init_sql = Some(sql.into());
        self
    }
}

impl SessionFactory for SqliteSessions {
    fn open(&self) -> Result<Box<dyn Session>, BoxError> {
        let conn = match &self.target {
            Target::Memory => Connection::open_in_memory()?,
            Target::File(path) => {
                if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                    std::fs::create_dir_all(dir)?;
                }
                let conn = Connection::open(path)?;
                // WAL lets offloaded hooks read while another writes.
                conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
                conn
            }
        };
        if let Some(sql) = &self.init_sql {
            conn.execute_batch(sql)?;
        }
        Ok(Box::new(SqliteSession { conn }))
    }
}

/// An open SQLite connection bound to one event context.
pub struct SqliteSession {
    conn: Connection,
}

impl SqliteSession {
    /// The underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Session for SqliteSession {
    fn close(self: Box<Self>) -> Result<(), BoxError> {
        self.conn.close().map_err(|(_, e)| Box::new(e) as BoxError)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
