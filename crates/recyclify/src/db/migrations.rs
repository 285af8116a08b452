//! Schema migrations for the action ledger.
//!
//! Applied migrations are tracked in a `_migrations` table; pending ones run
//! in order, each at most once.

use rusqlite::Connection;

use super::error::DatabaseError;

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create_profiles_table",
        sql: "CREATE TABLE profiles (
                user_id TEXT PRIMARY KEY,
                total_points INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL
            );",
    },
    Migration {
        version: 2,
        description: "create_actions_table",
        sql: "CREATE TABLE actions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                action_type TEXT NOT NULL,
                points INTEGER NOT NULL,
                co2_saved_kg REAL NOT NULL DEFAULT 0,
                verified INTEGER NOT NULL DEFAULT 0,
                outcome TEXT NOT NULL,
                details TEXT NOT NULL,
                image_ref TEXT,
                created_at TEXT NOT NULL
            );
            CREATE INDEX idx_actions_user ON actions (user_id, created_at);",
    },
];

/// Runs all pending migrations on the given connection.
pub fn run_all(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let current_version: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM _migrations",
        [],
        |r| r.get(0),
    )?;

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        log::info!(
            "Running migration v{}: {}",
            migration.version,
            migration.description
        );

        conn.execute_batch(migration.sql)
            .map_err(|e| DatabaseError::Migration {
                version: migration.version,
                reason: e.to_string(),
            })?;

        conn.execute(
            "INSERT INTO _migrations (version, description) VALUES (?1, ?2)",
            rusqlite::params![migration.version, migration.description],
        )?;
    }

    Ok(())
}
