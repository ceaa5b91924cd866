#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Residual polymorphic row cleanup for morphsweep
//!
//! Polymorphic children store the owning entity as a `(type, id)` pair with
//! no foreign key behind it, so deleting a parent (or retiring a whole type)
//! leaves rows behind. This crate removes them in two ways:
//!
//! - [`Sweeper::sweep`] scans every relation of every cascade participant and
//!   removes rows whose parent is gone or whose type label no longer resolves.
//! - [`Sweeper::delete`] removes the dependents of one persisted record.

pub mod cascade;
mod queries;
pub mod scanner;
pub mod sql;
pub mod sweeper;

pub use cascade::CascadeDeleter;
pub use scanner::{ResidualScanner, ScanOutcome};
pub use sweeper::Sweeper;

use morphsweep_errors::{Error, SweepError};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;

/// Connection pool settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub busy_timeout: Duration,
    pub create_if_missing: bool,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 1,
            busy_timeout: Duration::from_secs(30),
            create_if_missing: false,
        }
    }
}

/// Create a `SQLite` connection pool
///
/// `url` may be a `sqlite:` URL or a plain file path.
///
/// # Errors
///
/// Returns an error if the URL is malformed or the database cannot be opened.
pub async fn create_pool(url: &str, settings: &PoolSettings) -> Result<Pool<Sqlite>, Error> {
    let connect_failed = |e: sqlx::Error| -> Error {
        SweepError::ConnectFailed {
            url: url.to_string(),
            message: e.to_string(),
        }
        .into()
    };

    let options = if url.starts_with("sqlite:") {
        SqliteConnectOptions::from_str(url).map_err(connect_failed)?
    } else {
        SqliteConnectOptions::new().filename(url)
    };
    let options = options
        .create_if_missing(settings.create_if_missing)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(settings.busy_timeout);

    SqlitePoolOptions::new()
        .max_connections(settings.max_connections.max(1))
        .connect_with(options)
        .await
        .map_err(connect_failed)
}
