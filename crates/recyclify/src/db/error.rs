//! Database error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the action ledger database.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQLite error from rusqlite.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error when creating the database directory.
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An action with this id is already in the log.
    #[error("Action '{0}' is already recorded")]
    DuplicateAction(String),

    /// A migration failed to apply.
    #[error("Migration failed at version {version}: {reason}")]
    Migration { version: u32, reason: String },

    /// An action's `details` column could not be encoded or decoded.
    #[error("Invalid action details: {0}")]
    Details(#[from] serde_json::Error),

    /// The database lock was poisoned.
    #[error("Database lock poisoned")]
    LockPoisoned,
}
