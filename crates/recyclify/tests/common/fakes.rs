//! In-memory stand-ins for the labeling service and the persistence
//! collaborator.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use recyclify::error::{PerceptionError, PersistenceError};
use recyclify::perception::{PerceptionResult, PerceptionService, Photo};
use recyclify::store::{ActionLogEntry, ActionStore, BlobRef};
use tokio::sync::Notify;

/// Answers by photo name. Unknown photos get a provider error.
#[derive(Default)]
pub struct FakePerception {
    responses: Mutex<HashMap<String, PerceptionResult>>,
    failing: Mutex<HashMap<String, usize>>,
    calls: AtomicUsize,
}

impl FakePerception {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, photo: &str, result: PerceptionResult) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(photo.to_string(), result);
        self
    }

    /// The next `times` calls for `photo` fail with a 503.
    pub fn fail(self, photo: &str, times: usize) -> Self {
        self.failing.lock().unwrap().insert(photo.to_string(), times);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PerceptionService for FakePerception {
    async fn annotate(&self, photo: &Photo) -> Result<PerceptionResult, PerceptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(remaining) = self.failing.lock().unwrap().get_mut(&photo.name) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(PerceptionError::Status {
                    status: 503,
                    body: "service unavailable".to_string(),
                });
            }
        }

        self.responses
            .lock()
            .unwrap()
            .get(&photo.name)
            .cloned()
            .ok_or_else(|| PerceptionError::Provider {
                code: 3,
                message: format!("no response scripted for {}", photo.name),
            })
    }
}

/// Records every call; each operation can be made to fail.
#[derive(Default)]
pub struct RecordingStore {
    pub uploads: Mutex<Vec<String>>,
    pub entries: Mutex<Vec<ActionLogEntry>>,
    pub point_updates: Mutex<Vec<(String, i64)>>,
    pub fail_uploads: AtomicBool,
    pub fail_log: AtomicBool,
    pub fail_total: AtomicBool,
    pub fail_update: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_uploads(self) -> Self {
        self.fail_uploads.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_log(self) -> Self {
        self.fail_log.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_total(self) -> Self {
        self.fail_total.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_update(self) -> Self {
        self.fail_update.store(true, Ordering::SeqCst);
        self
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn last_update(&self) -> Option<(String, i64)> {
        self.point_updates.lock().unwrap().last().cloned()
    }

    fn logged_points(&self, user_id: &str) -> i64 {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.points)
            .sum()
    }
}

fn offline(what: &str) -> PersistenceError {
    PersistenceError::Unavailable(format!("{} offline", what))
}

#[async_trait]
impl ActionStore for RecordingStore {
    async fn upload_blob(&self, path: &str, _bytes: &[u8]) -> Result<BlobRef, PersistenceError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(offline("blob storage"));
        }
        self.uploads.lock().unwrap().push(path.to_string());
        Ok(BlobRef(format!("memory://{}", path)))
    }

    async fn insert_action_log(&self, entry: &ActionLogEntry) -> Result<(), PersistenceError> {
        if self.fail_log.load(Ordering::SeqCst) {
            return Err(offline("action log"));
        }
        let mut entries = self.entries.lock().unwrap();
        if entries.iter().any(|e| e.id == entry.id) {
            return Err(PersistenceError::AlreadyRecorded(entry.id.to_string()));
        }
        entries.push(entry.clone());
        Ok(())
    }

    async fn update_points(&self, user_id: &str, new_total: i64) -> Result<(), PersistenceError> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(offline("profiles"));
        }
        self.point_updates
            .lock()
            .unwrap()
            .push((user_id.to_string(), new_total));
        Ok(())
    }

    async fn total_points(&self, user_id: &str) -> Result<i64, PersistenceError> {
        if self.fail_total.load(Ordering::SeqCst) {
            return Err(offline("action log"));
        }
        Ok(self.logged_points(user_id))
    }
}

/// Delegates to `inner`, except that the first `total_points` call never
/// returns. Lets a test drop a completion after the log append.
pub struct StallingTotal<S> {
    inner: S,
    stalled: AtomicBool,
    reached: Notify,
}

impl<S: ActionStore> StallingTotal<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            stalled: AtomicBool::new(false),
            reached: Notify::new(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Resolves once the stalled call has been reached.
    pub async fn stalled(&self) {
        self.reached.notified().await
    }
}

#[async_trait]
impl<S: ActionStore> ActionStore for StallingTotal<S> {
    async fn upload_blob(&self, path: &str, bytes: &[u8]) -> Result<BlobRef, PersistenceError> {
        self.inner.upload_blob(path, bytes).await
    }

    async fn insert_action_log(&self, entry: &ActionLogEntry) -> Result<(), PersistenceError> {
        self.inner.insert_action_log(entry).await
    }

    async fn update_points(&self, user_id: &str, new_total: i64) -> Result<(), PersistenceError> {
        self.inner.update_points(user_id, new_total).await
    }

    async fn total_points(&self, user_id: &str) -> Result<i64, PersistenceError> {
        if !self.stalled.swap(true, Ordering::SeqCst) {
            self.reached.notify_one();
            std::future::pending::<()>().await;
        }
        self.inner.total_points(user_id).await
    }
}
