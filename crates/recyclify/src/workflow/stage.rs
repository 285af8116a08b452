use std::fmt;

/// Where a disposal attempt currently is.
///
/// `Classifying` and `Verifying` are never committed: an interrupted call
/// leaves the attempt in one of them and [`recover`](super::DisposalWorkflow::recover)
/// rolls it back to the last captured photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Idle,
    ItemCaptured,
    Classifying,
    Classified,
    ProofCaptured,
    Verifying,
    Verified,
    VerificationFailed,
    Completed,
    /// The labeling service failed while classifying the item photo.
    Unavailable,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::ItemCaptured => "item_captured",
            Stage::Classifying => "classifying",
            Stage::Classified => "classified",
            Stage::ProofCaptured => "proof_captured",
            Stage::Verifying => "verifying",
            Stage::Verified => "verified",
            Stage::VerificationFailed => "verification_failed",
            Stage::Completed => "completed",
            Stage::Unavailable => "unavailable",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Completed)
    }

    /// A collaborator call is in flight (or was interrupted).
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Stage::Classifying | Stage::Verifying)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
