//! The persistence collaborator: photo blobs, the action log, and the
//! per-user point total.

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::verifier::OutcomeKind;

pub use local::LocalActionStore;

/// Kind of logged action. `Recycle` comes from the disposal workflow,
/// `Energy` and `Donate` from [`crate::ledger::ActivityLogger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Recycle,
    Energy,
    Donate,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Recycle => "recycle",
            ActionType::Energy => "energy",
            ActionType::Donate => "donate",
        }
    }
}

/// Opaque reference to an uploaded blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlobRef(pub String);

impl BlobRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlobRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One line of the append-only action log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionLogEntry {
    pub id: Uuid,
    pub user_id: String,
    pub action_type: ActionType,
    pub points: i64,
    pub co2_saved_kg: f64,
    pub verified: bool,
    pub outcome: OutcomeKind,
    /// Free-form JSON object describing the action.
    pub details: serde_json::Value,
    pub image_ref: Option<BlobRef>,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait ActionStore: Send + Sync {
    /// Stores a blob at a store-relative path. The returned reference may
    /// differ from `path` if the store had to pick a free name.
    async fn upload_blob(&self, path: &str, bytes: &[u8]) -> Result<BlobRef, PersistenceError>;

    /// Appends to the log. An entry whose id is already logged fails with
    /// [`PersistenceError::AlreadyRecorded`] and changes nothing.
    async fn insert_action_log(&self, entry: &ActionLogEntry) -> Result<(), PersistenceError>;

    /// Overwrites the user's cached point total.
    async fn update_points(&self, user_id: &str, new_total: i64) -> Result<(), PersistenceError>;

    /// Total derived from the action log.
    async fn total_points(&self, user_id: &str) -> Result<i64, PersistenceError>;
}
