use tracing::debug;

use crate::config::schema::{BinEvidenceRule, Config, VerifierConfig};
use crate::perception::PerceptionResult;

/// Where the score of a proof photo came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreBreakdown {
    /// Confidence-weighted evidence from labels and object names.
    pub label_score: f32,
    /// Flat bonuses from OCR fragments.
    pub ocr_score: f32,
    /// Flat bonuses from detected logos.
    pub logo_score: f32,
    /// Amount subtracted for trash-only evidence (0 when not applied).
    pub penalty: f32,
    pub saw_trash: bool,
    pub saw_recycling: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    pub score: f32,
    pub verified: bool,
    pub breakdown: ScoreBreakdown,
}

/// Scores a proof photo for evidence that the receptacle is a recycling bin
/// rather than generic trash.
///
/// Unlike [`MaterialClassifier`](crate::classifier::MaterialClassifier), label
/// evidence here is discounted by detector confidence. OCR and logo matches
/// are flat bonuses.
pub struct BinVerifier {
    positive: Vec<BinEvidenceRule>,
    trash_keywords: Vec<String>,
    recycling_keywords: Vec<String>,
    ocr_keywords: Vec<String>,
    logo_keywords: Vec<String>,
    ocr_bonus: f32,
    logo_bonus: f32,
    trash_penalty: f32,
    threshold: f32,
    object_confidence: f32,
}

fn lowercase_all(keywords: &[String]) -> Vec<String> {
    keywords.iter().map(|k| k.to_lowercase()).collect()
}

impl BinVerifier {
    pub fn new(config: &VerifierConfig) -> Self {
        Self {
            positive: config
                .positive
                .iter()
                .map(|r| BinEvidenceRule {
                    keyword: r.keyword.to_lowercase(),
                    weight: r.weight,
                })
                .collect(),
            trash_keywords: lowercase_all(&config.trash_keywords),
            recycling_keywords: lowercase_all(&config.recycling_keywords),
            ocr_keywords: lowercase_all(&config.ocr_keywords),
            logo_keywords: lowercase_all(&config.logo_keywords),
            ocr_bonus: config.ocr_bonus,
            logo_bonus: config.logo_bonus,
            trash_penalty: config.trash_penalty,
            threshold: config.threshold,
            object_confidence: config.object_confidence,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.verifier)
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn verify(&self, perception: &PerceptionResult) -> VerificationResult {
        let mut breakdown = ScoreBreakdown::default();

        let detections = perception
            .labels()
            .iter()
            .map(|l| (l.text.to_lowercase(), l.confidence))
            .chain(
                perception
                    .object_names()
                    .iter()
                    .map(|n| (n.to_lowercase(), self.object_confidence)),
            );

        for (text, confidence) in detections {
            for rule in &self.positive {
                if text.contains(rule.keyword.as_str()) {
                    breakdown.label_score += rule.weight * confidence;
                }
            }
            if contains_any(&text, &self.trash_keywords) {
                breakdown.saw_trash = true;
            }
            if contains_any(&text, &self.recycling_keywords) {
                breakdown.saw_recycling = true;
            }
        }

        for fragment in perception.text_tokens() {
            let fragment = fragment.to_lowercase();
            let hits = self
                .ocr_keywords
                .iter()
                .filter(|k| fragment.contains(k.as_str()))
                .count();
            breakdown.ocr_score += self.ocr_bonus * hits as f32;
        }

        for logo in perception.logo_names() {
            if contains_any(&logo.to_lowercase(), &self.logo_keywords) {
                breakdown.logo_score += self.logo_bonus;
            }
        }

        // A generic waste bin with nothing marking it as recycling.
        if breakdown.saw_trash && !breakdown.saw_recycling {
            breakdown.penalty = self.trash_penalty;
        }

        let score = breakdown.label_score + breakdown.ocr_score + breakdown.logo_score
            - breakdown.penalty;
        let verified = score >= self.threshold;

        debug!(
            score,
            verified,
            label_score = breakdown.label_score,
            ocr_score = breakdown.ocr_score,
            logo_score = breakdown.logo_score,
            penalty = breakdown.penalty,
            "Bin verification scored"
        );

        VerificationResult {
            score,
            verified,
            breakdown,
        }
    }
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| text.contains(k.as_str()))
}
