use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use crate::classifier::MaterialClassifier;
use crate::config::{Config, MaterialProfile};
use crate::error::WorkflowError;
use crate::ledger::award_points;
use crate::perception::{PerceptionService, Photo};
use crate::sanitize;
use crate::store::{ActionLogEntry, ActionStore, ActionType, BlobRef};
use crate::verifier::{BinVerifier, OutcomeKind, VerificationOutcome};

use super::attempt::{CompletionReceipt, CompletionWarning, DisposalAttempt};
use super::stage::Stage;

/// Drives one user's disposal attempts: item photo, classification, proof
/// photo, bin verification, and the point award.
///
/// One workflow serves one user serially, so it needs no locking. Only the
/// collaborator calls suspend; if one of those futures is dropped the attempt
/// stays in `Classifying`/`Verifying` until [`recover`](Self::recover) is
/// called. A dropped completion leaves the stage untouched and can simply be
/// run again; the ledger entry reuses the attempt id, so points land once.
pub struct DisposalWorkflow {
    user_id: String,
    classifier: Arc<MaterialClassifier>,
    verifier: Arc<BinVerifier>,
    perception: Arc<dyn PerceptionService>,
    store: Arc<dyn ActionStore>,
    attempt: Option<DisposalAttempt>,
    span: Span,
}

fn attempt_at<'a>(
    attempt: &'a mut Option<DisposalAttempt>,
    allowed: &[Stage],
    action: &'static str,
) -> Result<&'a mut DisposalAttempt, WorkflowError> {
    let stage = attempt.as_ref().map_or(Stage::Idle, |a| a.stage);
    let invalid = WorkflowError::InvalidTransition {
        from: stage,
        action,
    };
    if !allowed.contains(&stage) {
        return Err(invalid);
    }
    let Some(attempt) = attempt.as_mut() else {
        return Err(invalid);
    };
    Ok(attempt)
}

impl DisposalWorkflow {
    pub fn new(
        user_id: impl Into<String>,
        classifier: Arc<MaterialClassifier>,
        verifier: Arc<BinVerifier>,
        perception: Arc<dyn PerceptionService>,
        store: Arc<dyn ActionStore>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            classifier,
            verifier,
            perception,
            store,
            attempt: None,
            span: Span::none(),
        }
    }

    pub fn from_config(
        config: &Config,
        user_id: impl Into<String>,
        perception: Arc<dyn PerceptionService>,
        store: Arc<dyn ActionStore>,
    ) -> Self {
        Self::new(
            user_id,
            Arc::new(MaterialClassifier::from_config(config)),
            Arc::new(BinVerifier::from_config(config)),
            perception,
            store,
        )
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn stage(&self) -> Stage {
        self.attempt.as_ref().map_or(Stage::Idle, |a| a.stage)
    }

    pub fn attempt(&self) -> Option<&DisposalAttempt> {
        self.attempt.as_ref()
    }

    /// Starts a new attempt. Allowed when idle or after a completed attempt.
    pub fn capture_item(&mut self, photo: Photo) -> Result<Uuid, WorkflowError> {
        let stage = self.stage();
        if !matches!(stage, Stage::Idle | Stage::Completed) {
            return Err(WorkflowError::InvalidTransition {
                from: stage,
                action: "capture_item",
            });
        }

        let attempt = DisposalAttempt::new(photo);
        self.span = info_span!(
            "disposal",
            attempt_id = %attempt.id,
            user = %sanitize::hash_identifier(&self.user_id)
        );
        info!(parent: &self.span, photo = %attempt.item_photo.name, "Item photo captured");

        let id = attempt.id;
        self.attempt = Some(attempt);
        Ok(id)
    }

    /// Labels the item photo and classifies it. `Ok(None)` means the item was
    /// not recognized; the only way on from there is [`reset`](Self::reset).
    pub async fn classify_item(&mut self) -> Result<Option<MaterialProfile>, WorkflowError> {
        let parent = self.span.clone();
        let attempt = attempt_at(&mut self.attempt, &[Stage::ItemCaptured], "classify_item")?;
        attempt.stage = Stage::Classifying;

        let span = info_span!(parent: &parent, "classify_item", photo = %attempt.item_photo.name);
        let perception = match self
            .perception
            .annotate(&attempt.item_photo)
            .instrument(span.clone())
            .await
        {
            Ok(perception) => perception,
            Err(e) => {
                warn!(parent: &span, error = %e, "Labeling service failed during classification");
                attempt.stage = Stage::Unavailable;
                return Err(WorkflowError::ClassificationUnavailable(e));
            }
        };

        let classification = self.classifier.classify_detailed(&perception);
        match &classification {
            Some(c) => info!(
                parent: &span,
                material = %c.material.id,
                tier = c.tier.as_str(),
                recyclable = c.material.is_recyclable,
                "Item classified"
            ),
            None => info!(parent: &span, "Item not recognized"),
        }

        let material = classification.as_ref().map(|c| c.material.clone());
        attempt.classification = classification;
        attempt.stage = Stage::Classified;
        Ok(material)
    }

    /// Re-submits the same item photo after the labeling service failed.
    pub fn retry_classification(&mut self) -> Result<(), WorkflowError> {
        let attempt = attempt_at(
            &mut self.attempt,
            &[Stage::Unavailable],
            "retry_classification",
        )?;
        attempt.stage = Stage::ItemCaptured;
        Ok(())
    }

    /// Attaches the proof photo. Also used to retake it after a rejected
    /// verification.
    pub fn capture_proof(&mut self, photo: Photo) -> Result<(), WorkflowError> {
        let span = self.span.clone();
        let attempt = attempt_at(
            &mut self.attempt,
            &[Stage::Classified, Stage::VerificationFailed],
            "capture_proof",
        )?;

        match attempt.material() {
            Some(material) if material.is_recyclable => {}
            Some(material) => {
                return Err(WorkflowError::NotRecyclable {
                    material: material.id.clone(),
                })
            }
            None => {
                return Err(WorkflowError::InvalidTransition {
                    from: attempt.stage,
                    action: "capture_proof",
                })
            }
        }

        info!(
            parent: &span,
            photo = %photo.name,
            retake = attempt.stage == Stage::VerificationFailed,
            "Proof photo captured"
        );
        attempt.proof_photo = Some(photo);
        attempt.verification = None;
        attempt.stage = Stage::ProofCaptured;
        Ok(())
    }

    /// Labels the proof photo and scores it for recycling-bin evidence.
    ///
    /// A labeling failure does not block the user: the outcome is
    /// [`VerificationOutcome::Unavailable`] and the attempt moves on to
    /// `Verified`.
    pub async fn verify_proof(&mut self) -> Result<VerificationOutcome, WorkflowError> {
        let parent = self.span.clone();
        let attempt = attempt_at(&mut self.attempt, &[Stage::ProofCaptured], "verify_proof")?;
        let Some(proof) = attempt.proof_photo.as_ref() else {
            return Err(WorkflowError::InvalidTransition {
                from: attempt.stage,
                action: "verify_proof",
            });
        };
        attempt.stage = Stage::Verifying;

        let span = info_span!(parent: &parent, "verify_proof", photo = %proof.name);
        let outcome = match self.perception.annotate(proof).instrument(span.clone()).await {
            Ok(perception) => {
                let result = self.verifier.verify(&perception);
                info!(
                    parent: &span,
                    score = result.score,
                    threshold = self.verifier.threshold(),
                    verified = result.verified,
                    "Proof scored"
                );
                VerificationOutcome::from_result(result)
            }
            Err(e) => {
                warn!(
                    parent: &span,
                    error = %e,
                    "Labeling service failed during verification, failing open"
                );
                VerificationOutcome::Unavailable {
                    reason: e.to_string(),
                }
            }
        };

        attempt.stage = if outcome.passes() {
            Stage::Verified
        } else {
            Stage::VerificationFailed
        };
        attempt.verification = Some(outcome.clone());
        Ok(outcome)
    }

    /// Completes without verifying the proof photo. Points are awarded in
    /// full and the ledger records the attempt as unverified.
    pub async fn skip_proof(&mut self) -> Result<CompletionReceipt, WorkflowError> {
        self.finish(Stage::ProofCaptured, "skip_proof").await
    }

    /// Persists a verified attempt and awards its points.
    pub async fn complete(&mut self) -> Result<CompletionReceipt, WorkflowError> {
        self.finish(Stage::Verified, "complete").await
    }

    async fn finish(
        &mut self,
        from: Stage,
        action: &'static str,
    ) -> Result<CompletionReceipt, WorkflowError> {
        let parent = self.span.clone();
        let attempt = attempt_at(&mut self.attempt, &[from], action)?;
        let Some(material) = attempt.material().cloned() else {
            return Err(WorkflowError::InvalidTransition { from, action });
        };
        let outcome = match &attempt.verification {
            Some(verification) if from == Stage::Verified => verification.kind(),
            _ => OutcomeKind::Skipped,
        };

        let span = info_span!(
            parent: &parent,
            "complete",
            material = %material.id,
            outcome = outcome.as_str()
        );
        let receipt = record_completion(
            self.store.as_ref(),
            &self.user_id,
            attempt,
            &material,
            outcome,
        )
        .instrument(span)
        .await;

        attempt.stage = Stage::Completed;
        Ok(receipt)
    }

    /// Discards the current attempt without any side effects.
    pub fn abandon(&mut self) -> Option<DisposalAttempt> {
        let attempt = self.attempt.take();
        if let Some(a) = attempt.as_ref().filter(|a| !a.stage.is_terminal()) {
            info!(parent: &self.span, stage = %a.stage, "Attempt abandoned");
        }
        self.span = Span::none();
        attempt
    }

    /// Returns to `Idle` from any stage.
    pub fn reset(&mut self) {
        self.abandon();
    }

    /// Rolls an interrupted `Classifying`/`Verifying` step back to the photo
    /// it was working on and returns the resulting stage.
    pub fn recover(&mut self) -> Stage {
        let span = self.span.clone();
        if let Some(attempt) = self.attempt.as_mut() {
            let rolled_back = match attempt.stage {
                Stage::Classifying => Some(Stage::ItemCaptured),
                Stage::Verifying => Some(Stage::ProofCaptured),
                _ => None,
            };
            if let Some(stage) = rolled_back {
                info!(
                    parent: &span,
                    from = %attempt.stage,
                    to = %stage,
                    "Recovered interrupted step"
                );
                attempt.stage = stage;
            }
        }
        self.stage()
    }
}

async fn record_completion(
    store: &dyn ActionStore,
    user_id: &str,
    attempt: &DisposalAttempt,
    material: &MaterialProfile,
    outcome: OutcomeKind,
) -> CompletionReceipt {
    let mut warnings = Vec::new();

    // Uploads are best-effort; a missing image never blocks the award.
    let item_image = upload_photo(
        store,
        user_id,
        attempt.id,
        "item",
        &attempt.item_photo,
        &mut warnings,
    )
    .await;
    let proof_image = match &attempt.proof_photo {
        Some(photo) => {
            upload_photo(store, user_id, attempt.id, "proof", photo, &mut warnings).await
        }
        None => None,
    };

    let points = material.point_value;
    let entry = ActionLogEntry {
        id: attempt.id,
        user_id: user_id.to_string(),
        action_type: ActionType::Recycle,
        points,
        co2_saved_kg: material.co2_saved_kg,
        verified: attempt.verified(),
        outcome,
        details: json!({
            "material_id": material.id,
            "material_name": material.display_name,
            "material_type": material.category.as_str(),
            "code": material.code,
            "co2_saved_kg": material.co2_saved_kg,
            "verified": attempt.verified(),
            "verification": outcome.as_str(),
            "verification_score": attempt.verification_score(),
            "classification_tier": attempt.classification().map(|c| c.tier.as_str()),
            "proof_image": proof_image.as_ref().map(BlobRef::as_str),
        }),
        image_ref: item_image.clone(),
        created_at: Utc::now(),
    };

    let award = award_points(store, &entry, &mut warnings).await;

    CompletionReceipt {
        attempt_id: attempt.id,
        material_id: material.id.clone(),
        points_awarded: points,
        co2_saved_kg: material.co2_saved_kg,
        outcome,
        item_image,
        proof_image,
        new_total: award.new_total,
        points_recorded: award.points_recorded,
        warnings,
    }
}

async fn upload_photo(
    store: &dyn ActionStore,
    user_id: &str,
    attempt_id: Uuid,
    role: &'static str,
    photo: &Photo,
    warnings: &mut Vec<CompletionWarning>,
) -> Option<BlobRef> {
    let path = format!("{}/{}/{}.{}", user_id, attempt_id, role, photo.extension());
    match store.upload_blob(&path, &photo.bytes).await {
        Ok(blob) => Some(blob),
        Err(e) => {
            warn!(photo = role, error = %e, "Photo upload failed, continuing without image");
            warnings.push(CompletionWarning::UploadFailed {
                photo: role,
                error: e.to_string(),
            });
            None
        }
    }
}
