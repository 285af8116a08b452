//! Profile repository: the cached point total per user.
//!
//! The action log is the source of truth; this row is a denormalized total
//! refreshed after each completed disposal.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::{Database, DatabaseError};

/// Sets the user's point total, creating the profile row if needed.
pub fn set_points(db: &Database, user_id: &str, total_points: i64) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO profiles (user_id, total_points, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET
               total_points = excluded.total_points,
               updated_at = excluded.updated_at",
            params![user_id, total_points, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    })
}

/// Returns the cached total, or `None` for a user with no profile row.
pub fn get_points(db: &Database, user_id: &str) -> Result<Option<i64>, DatabaseError> {
    db.with_conn(|conn| {
        let points = conn
            .query_row(
                "SELECT total_points FROM profiles WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(points)
    })
}
