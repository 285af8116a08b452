pub mod bin;

pub use bin::{BinVerifier, ScoreBreakdown, VerificationResult};

use serde::Serialize;

/// How a proof step ended.
///
/// `Unavailable` is the fail-open case: the labeling service could not be
/// reached, the attempt is treated as verified, and the outcome is recorded
/// so it can be audited later.
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationOutcome {
    Verified(VerificationResult),
    Rejected(VerificationResult),
    Unavailable { reason: String },
}

impl VerificationOutcome {
    pub fn from_result(result: VerificationResult) -> Self {
        if result.verified {
            Self::Verified(result)
        } else {
            Self::Rejected(result)
        }
    }

    /// Whether the workflow may proceed to completion.
    pub fn passes(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }

    pub fn is_fail_open(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    pub fn score(&self) -> Option<f32> {
        match self {
            Self::Verified(r) | Self::Rejected(r) => Some(r.score),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Verified(_) => OutcomeKind::Verified,
            Self::Rejected(_) => OutcomeKind::Rejected,
            Self::Unavailable { .. } => OutcomeKind::Unavailable,
        }
    }
}

/// Stable tag for persisted outcomes.
///
/// `SelfReported` marks ledger entries that never had a proof step, such as
/// energy habits and food donations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Verified,
    Rejected,
    Unavailable,
    Skipped,
    SelfReported,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Verified => "verified",
            OutcomeKind::Rejected => "rejected",
            OutcomeKind::Unavailable => "unavailable",
            OutcomeKind::Skipped => "skipped",
            OutcomeKind::SelfReported => "self_reported",
        }
    }
}
