//! Action repository: the append-only log of completed actions.

use rusqlite::{params, Row};
use serde::Serialize;

use super::{Database, DatabaseError};

/// A raw action row from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRow {
    pub id: String,
    pub user_id: String,
    pub action_type: String,
    pub points: i64,
    pub co2_saved_kg: f64,
    pub verified: bool,
    pub outcome: String,
    /// JSON object.
    pub details: String,
    pub image_ref: Option<String>,
    pub created_at: String,
}

impl ActionRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            action_type: row.get("action_type")?,
            points: row.get("points")?,
            co2_saved_kg: row.get("co2_saved_kg")?,
            verified: row.get("verified")?,
            outcome: row.get("outcome")?,
            details: row.get("details")?,
            image_ref: row.get("image_ref")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Appends an action. Ids are unique, so a replayed insert fails with
/// [`DatabaseError::DuplicateAction`] instead of awarding the points twice.
pub fn insert(db: &Database, action: &ActionRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        let inserted = conn.execute(
            "INSERT INTO actions (id, user_id, action_type, points, co2_saved_kg, verified,
             outcome, details, image_ref, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                action.id,
                action.user_id,
                action.action_type,
                action.points,
                action.co2_saved_kg,
                action.verified,
                action.outcome,
                action.details,
                action.image_ref,
                action.created_at,
            ],
        );
        match inserted {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if is_duplicate_key(e.extended_code) => {
                Err(DatabaseError::DuplicateAction(action.id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    })
}

fn is_duplicate_key(extended_code: std::os::raw::c_int) -> bool {
    extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        || extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
}

/// Lists a user's actions, newest first.
pub fn list_for_user(
    db: &Database,
    user_id: &str,
    limit: Option<u64>,
) -> Result<Vec<ActionRow>, DatabaseError> {
    db.with_conn(|conn| {
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let mut stmt = conn.prepare(
            "SELECT * FROM actions WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![user_id, limit], ActionRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Sum of all points in the user's log.
pub fn total_points(db: &Database, user_id: &str) -> Result<i64, DatabaseError> {
    db.with_conn(|conn| {
        let total = conn.query_row(
            "SELECT COALESCE(SUM(points), 0) FROM actions WHERE user_id = ?1",
            params![user_id],
            |r| r.get(0),
        )?;
        Ok(total)
    })
}

/// Aggregates over a user's log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionStats {
    pub total_points: i64,
    pub total_co2_saved_kg: f64,
    pub action_count: i64,
    pub verified_count: i64,
    /// Actions completed while the labeling service was unreachable.
    pub fail_open_count: i64,
    /// Actions completed without a proof photo.
    pub skipped_proof_count: i64,
    pub energy_count: i64,
    pub donation_count: i64,
}

pub fn stats(db: &Database, user_id: &str) -> Result<ActionStats, DatabaseError> {
    db.with_conn(|conn| {
        let stats = conn.query_row(
            "SELECT COALESCE(SUM(points), 0),
                    COALESCE(SUM(co2_saved_kg), 0.0),
                    COUNT(*),
                    COALESCE(SUM(verified), 0),
                    COALESCE(SUM(outcome = 'unavailable'), 0),
                    COALESCE(SUM(outcome = 'skipped'), 0),
                    COALESCE(SUM(action_type = 'energy'), 0),
                    COALESCE(SUM(action_type = 'donate'), 0)
             FROM actions WHERE user_id = ?1",
            params![user_id],
            |r| {
                Ok(ActionStats {
                    total_points: r.get(0)?,
                    total_co2_saved_kg: r.get(1)?,
                    action_count: r.get(2)?,
                    verified_count: r.get(3)?,
                    fail_open_count: r.get(4)?,
                    skipped_proof_count: r.get(5)?,
                    energy_count: r.get(6)?,
                    donation_count: r.get(7)?,
                })
            },
        )?;
        Ok(stats)
    })
}
