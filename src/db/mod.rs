//! SQLite bootstrap: the process-wide database handle.
//!
//! `Database` is created once at startup and threaded through the store.
//! It never keeps a connection open between operations; each unit of work
//! asks for a fresh [`Database::session`] and drops it when done, so no
//! handle outlives a single menu action.

use log::{error, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

pub mod migrations;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("cannot create database directory `{path}`: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the SQLite file backing the country store.
#[derive(Debug)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Open (creating if needed) the database file and apply pending migrations.
    ///
    /// Missing parent directories are created. The bootstrap connection is
    /// closed before returning.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        let started_at = Instant::now();
        info!("event=db_open module=db status=start path={}", path.display());

        match Self::bootstrap(&path) {
            Ok(()) => {
                info!(
                    "event=db_open module=db status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(Self { path })
            }
            Err(err) => {
                error!(
                    "event=db_open module=db status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn bootstrap(path: &Path) -> DbResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| DbError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let mut conn = connect(path)?;
        migrations::apply_migrations(&mut conn)?;
        conn.close().map_err(|(_, err)| DbError::Sqlite(err))
    }

    /// A fresh connection for one unit of work. Dropping it releases the handle.
    pub fn session(&self) -> DbResult<Connection> {
        connect(&self.path)
    }

    /// Shut the handle down. No further sessions can be opened afterwards.
    pub fn close(self) {
        info!("event=db_close module=db status=ok path={}", self.path.display());
    }
}

fn connect(path: &Path) -> DbResult<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::migrations::{current_version, latest_version};
    use super::*;

    #[test]
    fn open_creates_parent_dirs_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("wb.db");
        let db = Database::open(&path).unwrap();
        assert!(path.exists());

        let conn = db.session().unwrap();
        assert_eq!(current_version(&conn).unwrap(), latest_version());
        let tables: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = 'country'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn reopening_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wb.db");
        Database::open(&path).unwrap().close();
        let db = Database::open(&path).unwrap();
        assert_eq!(
            current_version(&db.session().unwrap()).unwrap(),
            latest_version()
        );
    }

    #[test]
    fn newer_schema_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("PRAGMA user_version = 99;").unwrap();
        drop(conn);

        match Database::open(&path).unwrap_err() {
            DbError::UnsupportedSchemaVersion { db_version, .. } => assert_eq!(db_version, 99),
            other => panic!("unexpected error: {other}"),
        }
    }
}
