//! Builder patterns for creating test data programmatically.

#![allow(dead_code)]

use std::path::Path;

use recyclify::config::schema::{
    BinEvidenceRule, ClassificationRule, Config, MaterialCategory, MaterialProfile,
};
use recyclify::perception::{PerceptionResult, Photo, ScoredLabel};

/// Builder for `PerceptionResult` values.
#[derive(Default, Clone)]
pub struct PerceptionBuilder {
    labels: Vec<ScoredLabel>,
    objects: Vec<String>,
    text: Vec<String>,
    logos: Vec<String>,
}

impl PerceptionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, text: &str, confidence: f32) -> Self {
        self.labels.push(ScoredLabel::new(text, confidence));
        self
    }

    pub fn labels(mut self, labels: &[(&str, f32)]) -> Self {
        for (text, confidence) in labels {
            self.labels.push(ScoredLabel::new(*text, *confidence));
        }
        self
    }

    pub fn object(mut self, name: &str) -> Self {
        self.objects.push(name.to_string());
        self
    }

    pub fn text(mut self, fragment: &str) -> Self {
        self.text.push(fragment.to_string());
        self
    }

    pub fn logo(mut self, name: &str) -> Self {
        self.logos.push(name.to_string());
        self
    }

    pub fn build(self) -> PerceptionResult {
        PerceptionResult::new(self.labels, self.objects, self.text, self.logos)
    }
}

/// Builder for `Config` instances, starting from the built-in tables.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn min_score(mut self, min_score: u32) -> Self {
        self.config.classifier.min_score = min_score;
        self
    }

    pub fn rule(mut self, keyword: &str, material: &str, weight: u32) -> Self {
        self.config.classifier.rules.push(ClassificationRule {
            keyword: keyword.to_string(),
            material_id: material.to_string(),
            weight,
        });
        self
    }

    pub fn clear_rules(mut self) -> Self {
        self.config.classifier.rules.clear();
        self
    }

    pub fn material(
        mut self,
        id: &str,
        category: MaterialCategory,
        recyclable: bool,
        points: i64,
    ) -> Self {
        self.config.materials.push(MaterialProfile {
            id: id.to_string(),
            code: String::new(),
            display_name: id.to_string(),
            category,
            is_recyclable: recyclable,
            co2_saved_kg: 0.1,
            point_value: points,
            disposal_instructions: String::new(),
            fun_fact: String::new(),
        });
        self
    }

    pub fn threshold(mut self, threshold: f32) -> Self {
        self.config.verifier.threshold = threshold;
        self
    }

    pub fn bin_evidence(mut self, keyword: &str, weight: f32) -> Self {
        self.config.verifier.positive.push(BinEvidenceRule {
            keyword: keyword.to_string(),
            weight,
        });
        self
    }

    pub fn object_confidence(mut self, confidence: f32) -> Self {
        self.config.verifier.object_confidence = confidence;
        self
    }

    /// Points database and blob storage into `dir`.
    pub fn storage_in(mut self, dir: &Path) -> Self {
        self.config.storage.database_path = dir.join("ledger.db").display().to_string();
        self.config.storage.blob_directory = dir.join("photos").display().to_string();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.config).expect("config serializes")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn photo(name: &str) -> Photo {
    Photo::from_bytes(name, vec![0xFF, 0xD8, 0xFF, 0xE0])
}
