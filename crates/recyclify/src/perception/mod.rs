//! Perception signals produced by the external image-labeling service.
//!
//! Everything downstream (classifier, verifier, workflow) consumes a
//! [`PerceptionResult`]; the service itself sits behind
//! [`PerceptionService`] so tests and alternative providers can stand in.

pub mod vision;

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PerceptionError;

pub use vision::{decode_annotate_response, VisionClient};

/// A label and the detector's confidence in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredLabel {
    pub text: String,
    pub confidence: f32,
}

impl ScoredLabel {
    /// Confidence is clamped into `0.0..=1.0`; NaN becomes 0.
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Normalized output of one labeling call on one photo.
///
/// Text fields keep the provider's casing; consumers compare
/// case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerceptionResult {
    labels: Vec<ScoredLabel>,
    object_names: Vec<String>,
    text_tokens: Vec<String>,
    logo_names: Vec<String>,
}

impl PerceptionResult {
    pub fn new(
        labels: Vec<ScoredLabel>,
        object_names: Vec<String>,
        text_tokens: Vec<String>,
        logo_names: Vec<String>,
    ) -> Self {
        Self {
            labels,
            object_names,
            text_tokens,
            logo_names,
        }
    }

    pub fn labels(&self) -> &[ScoredLabel] {
        &self.labels
    }

    pub fn object_names(&self) -> &[String] {
        &self.object_names
    }

    pub fn text_tokens(&self) -> &[String] {
        &self.text_tokens
    }

    pub fn logo_names(&self) -> &[String] {
        &self.logo_names
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
            && self.object_names.is_empty()
            && self.text_tokens.is_empty()
            && self.logo_names.is_empty()
    }
}

/// A captured photo handed to the labeling service and, later, to blob
/// storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Photo {
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, PerceptionError> {
        let bytes = std::fs::read(path).map_err(|e| PerceptionError::ReadPhoto {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            name: crate::sanitize::redact_path(path),
            bytes,
        })
    }

    /// File extension used when the photo is uploaded, defaulting to `jpg`.
    pub fn extension(&self) -> &str {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .unwrap_or("jpg")
    }
}

/// The image-labeling collaborator.
#[async_trait]
pub trait PerceptionService: Send + Sync {
    async fn annotate(&self, photo: &Photo) -> Result<PerceptionResult, PerceptionError>;
}
