use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::classifier::Classification;
use crate::config::MaterialProfile;
use crate::perception::Photo;
use crate::store::BlobRef;
use crate::verifier::{OutcomeKind, VerificationOutcome};

use super::stage::Stage;

/// One user's pass through the workflow. Lives only in memory; what reaches
/// the ledger is the [`CompletionReceipt`] content.
#[derive(Debug, Clone)]
pub struct DisposalAttempt {
    pub(super) id: Uuid,
    pub(super) stage: Stage,
    pub(super) item_photo: Photo,
    pub(super) proof_photo: Option<Photo>,
    pub(super) classification: Option<Classification>,
    pub(super) verification: Option<VerificationOutcome>,
    pub(super) started_at: DateTime<Utc>,
}

impl DisposalAttempt {
    pub(super) fn new(item_photo: Photo) -> Self {
        Self {
            id: Uuid::new_v4(),
            stage: Stage::ItemCaptured,
            item_photo,
            proof_photo: None,
            classification: None,
            verification: None,
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn item_photo(&self) -> &Photo {
        &self.item_photo
    }

    pub fn proof_photo(&self) -> Option<&Photo> {
        self.proof_photo.as_ref()
    }

    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    /// `None` before classification and for unrecognized items.
    pub fn material(&self) -> Option<&MaterialProfile> {
        self.classification.as_ref().map(|c| &c.material)
    }

    pub fn verification(&self) -> Option<&VerificationOutcome> {
        self.verification.as_ref()
    }

    pub fn verification_score(&self) -> Option<f32> {
        self.verification.as_ref().and_then(|v| v.score())
    }

    /// True only when bin evidence cleared the threshold. A fail-open pass is
    /// not counted as verified.
    pub fn verified(&self) -> bool {
        matches!(self.verification, Some(VerificationOutcome::Verified(_)))
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

/// Non-fatal side-effect failure during completion.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionWarning {
    UploadFailed { photo: &'static str, error: String },
    ActionLogFailed { error: String },
    TotalUnavailable { error: String },
    PointsUpdateFailed { error: String },
}

impl std::fmt::Display for CompletionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletionWarning::UploadFailed { photo, error } => {
                write!(f, "Failed to upload {} photo: {}", photo, error)
            }
            CompletionWarning::ActionLogFailed { error } => {
                write!(f, "Failed to append action log: {}", error)
            }
            CompletionWarning::TotalUnavailable { error } => {
                write!(f, "Failed to read point total: {}", error)
            }
            CompletionWarning::PointsUpdateFailed { error } => {
                write!(f, "Failed to update point total: {}", error)
            }
        }
    }
}

/// What a completed attempt handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionReceipt {
    pub attempt_id: Uuid,
    pub material_id: String,
    pub points_awarded: i64,
    pub co2_saved_kg: f64,
    pub outcome: OutcomeKind,
    pub item_image: Option<BlobRef>,
    pub proof_image: Option<BlobRef>,
    /// Total written to the profile, if the update went through.
    pub new_total: Option<i64>,
    /// Whether the award reached the ledger or the profile total.
    pub points_recorded: bool,
    pub warnings: Vec<CompletionWarning>,
}

impl CompletionReceipt {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
