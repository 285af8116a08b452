use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::StorageConfig;
use crate::db::action_repo::{self, ActionRow, ActionStats};
use crate::db::{profile_repo, Database, DatabaseError};
use crate::error::PersistenceError;
use crate::storage::BlobStorage;

use super::{ActionLogEntry, ActionStore, BlobRef};

/// [`ActionStore`] backed by a local SQLite ledger and a photo directory.
///
/// Database and filesystem work is synchronous and runs on tokio's blocking
/// pool.
#[derive(Clone)]
pub struct LocalActionStore {
    db: Database,
    blobs: Arc<BlobStorage>,
}

impl LocalActionStore {
    pub fn new(db: Database, blobs: BlobStorage) -> Self {
        Self {
            db,
            blobs: Arc::new(blobs),
        }
    }

    pub fn open(config: &StorageConfig) -> Result<Self, PersistenceError> {
        let db = Database::open(Path::new(&config.database_path))?;
        Ok(Self::new(db, BlobStorage::new(&config.blob_directory)))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn blob_root(&self) -> &Path {
        self.blobs.root()
    }

    pub async fn stats(&self, user_id: &str) -> Result<ActionStats, PersistenceError> {
        let user_id = user_id.to_string();
        self.with_db(move |db| action_repo::stats(db, &user_id))
            .await
    }

    pub async fn recent_actions(
        &self,
        user_id: &str,
        limit: u64,
    ) -> Result<Vec<ActionRow>, PersistenceError> {
        let user_id = user_id.to_string();
        self.with_db(move |db| action_repo::list_for_user(db, &user_id, Some(limit)))
            .await
    }

    /// Cached total from the profile row, `None` before the first award.
    pub async fn cached_points(&self, user_id: &str) -> Result<Option<i64>, PersistenceError> {
        let user_id = user_id.to_string();
        self.with_db(move |db| profile_repo::get_points(db, &user_id))
            .await
    }

    async fn with_db<F, T>(&self, f: F) -> Result<T, PersistenceError>
    where
        F: FnOnce(&Database) -> Result<T, DatabaseError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?
            .map_err(PersistenceError::from)
    }
}

fn to_row(entry: &ActionLogEntry) -> Result<ActionRow, DatabaseError> {
    Ok(ActionRow {
        id: entry.id.to_string(),
        user_id: entry.user_id.clone(),
        action_type: entry.action_type.as_str().to_string(),
        points: entry.points,
        co2_saved_kg: entry.co2_saved_kg,
        verified: entry.verified,
        outcome: entry.outcome.as_str().to_string(),
        details: serde_json::to_string(&entry.details)?,
        image_ref: entry.image_ref.as_ref().map(|r| r.0.clone()),
        created_at: entry.created_at.to_rfc3339(),
    })
}

#[async_trait]
impl ActionStore for LocalActionStore {
    async fn upload_blob(&self, path: &str, bytes: &[u8]) -> Result<BlobRef, PersistenceError> {
        let blobs = Arc::clone(&self.blobs);
        let path = path.to_string();
        let bytes = bytes.to_vec();
        let stored = tokio::task::spawn_blocking(move || blobs.store(&path, &bytes))
            .await
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))??;
        log::debug!("Stored blob {}", stored);
        Ok(BlobRef(stored))
    }

    async fn insert_action_log(&self, entry: &ActionLogEntry) -> Result<(), PersistenceError> {
        let row = to_row(entry)?;
        self.with_db(move |db| action_repo::insert(db, &row))
            .await
            .map_err(|e| match e {
                PersistenceError::Database(DatabaseError::DuplicateAction(id)) => {
                    PersistenceError::AlreadyRecorded(id)
                }
                other => other,
            })
    }

    async fn update_points(&self, user_id: &str, new_total: i64) -> Result<(), PersistenceError> {
        let user_id = user_id.to_string();
        self.with_db(move |db| profile_repo::set_points(db, &user_id, new_total))
            .await
    }

    async fn total_points(&self, user_id: &str) -> Result<i64, PersistenceError> {
        let user_id = user_id.to_string();
        self.with_db(move |db| action_repo::total_points(db, &user_id))
            .await
    }
}
