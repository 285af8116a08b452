use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::config::schema::{ClassificationRule, ClassifierConfig, Config, MaterialProfile};
use crate::perception::PerceptionResult;

/// A digit 1-7 with no digit on either side.
static STANDALONE_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^0-9])([1-7])(?:[^0-9]|$)").unwrap());

/// Which evidence produced a classification, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// A resin abbreviation such as `HDPE` read from the item.
    ResinToken,
    /// A lone resin digit read from a short OCR fragment.
    SymbolDigit,
    /// Accumulated keyword weights over labels and object names.
    KeywordScore,
}

impl MatchTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResinToken => "resin_token",
            Self::SymbolDigit => "symbol_digit",
            Self::KeywordScore => "keyword_score",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub material: MaterialProfile,
    pub tier: MatchTier,
    /// Winning accumulated weight; only set for `KeywordScore`.
    pub score: Option<u32>,
}

/// Infers a disposal material from the perception signals of an item photo.
///
/// Tiers are consulted in order and the first hit wins: resin tokens, then a
/// standalone resin digit, then keyword scoring. Label confidence is not used
/// here, unlike in the bin verifier.
pub struct MaterialClassifier {
    materials: HashMap<String, MaterialProfile>,
    /// Rules with lowercased keywords, in table order.
    rules: Vec<ClassificationRule>,
    resin_tokens: HashMap<String, String>,
    resin_codes: HashMap<u8, String>,
    min_score: u32,
    max_symbol_fragment_len: usize,
}

impl MaterialClassifier {
    pub fn new(materials: &[MaterialProfile], config: &ClassifierConfig) -> Self {
        let materials = materials
            .iter()
            .map(|m| (m.id.clone(), m.clone()))
            .collect();

        let rules = config
            .rules
            .iter()
            .map(|r| ClassificationRule {
                keyword: r.keyword.to_lowercase(),
                material_id: r.material_id.clone(),
                weight: r.weight,
            })
            .collect();

        let resin_tokens = config
            .resin_tokens
            .iter()
            .map(|t| (t.token.to_lowercase(), t.material_id.clone()))
            .collect();

        let resin_codes = config
            .resin_codes
            .iter()
            .map(|c| (c.digit, c.material_id.clone()))
            .collect();

        Self {
            materials,
            rules,
            resin_tokens,
            resin_codes,
            min_score: config.min_score,
            max_symbol_fragment_len: config.max_symbol_fragment_len,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.materials, &config.classifier)
    }

    pub fn material(&self, id: &str) -> Option<&MaterialProfile> {
        self.materials.get(id)
    }

    /// Returns the most likely material, or `None` when the item is not
    /// recognized.
    pub fn classify(&self, perception: &PerceptionResult) -> Option<MaterialProfile> {
        self.classify_detailed(perception).map(|c| c.material)
    }

    pub fn classify_detailed(&self, perception: &PerceptionResult) -> Option<Classification> {
        if let Some(material) = self.match_resin_token(perception.text_tokens()) {
            debug!(material = %material.id, "Classified by resin token");
            return Some(Classification {
                material: material.clone(),
                tier: MatchTier::ResinToken,
                score: None,
            });
        }

        if let Some(material) = self.match_symbol_digit(perception.text_tokens()) {
            debug!(material = %material.id, "Classified by standalone resin digit");
            return Some(Classification {
                material: material.clone(),
                tier: MatchTier::SymbolDigit,
                score: None,
            });
        }

        if let Some((material, score)) = self.match_keywords(perception) {
            debug!(material = %material.id, score, "Classified by keyword score");
            return Some(Classification {
                material: material.clone(),
                tier: MatchTier::KeywordScore,
                score: Some(score),
            });
        }

        debug!(
            labels = perception.labels().len(),
            text = perception.text_tokens().len(),
            "Item not recognized"
        );
        None
    }

    fn match_resin_token(&self, fragments: &[String]) -> Option<&MaterialProfile> {
        for fragment in fragments {
            let cleaned: String = fragment
                .to_lowercase()
                .chars()
                .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
                .collect();

            for word in cleaned.split_whitespace() {
                if let Some(material) = self
                    .resin_tokens
                    .get(word)
                    .and_then(|id| self.materials.get(id))
                {
                    return Some(material);
                }
            }
        }
        None
    }

    fn match_symbol_digit(&self, fragments: &[String]) -> Option<&MaterialProfile> {
        for fragment in fragments {
            let Some(captures) = STANDALONE_DIGIT.captures(fragment) else {
                continue;
            };

            // Prices, dates and addresses produce long fragments; the symbol
            // itself reads as a short snippet like "1" or "2 HDPE".
            if fragment.trim().chars().count() > self.max_symbol_fragment_len {
                continue;
            }

            let digit = captures[1].parse::<u8>().ok()?;
            if let Some(material) = self
                .resin_codes
                .get(&digit)
                .and_then(|id| self.materials.get(id))
            {
                return Some(material);
            }
        }
        None
    }

    fn match_keywords(&self, perception: &PerceptionResult) -> Option<(&MaterialProfile, u32)> {
        // Insertion-ordered so ties resolve to the material scored first.
        let mut scores: Vec<(&str, u32)> = Vec::new();

        let texts = perception
            .labels()
            .iter()
            .map(|l| l.text.to_lowercase())
            .chain(perception.object_names().iter().map(|n| n.to_lowercase()));

        for text in texts {
            for rule in &self.rules {
                if !text.contains(rule.keyword.as_str()) {
                    continue;
                }
                match scores
                    .iter_mut()
                    .find(|(id, _)| *id == rule.material_id.as_str())
                {
                    Some((_, score)) => *score += rule.weight,
                    None => scores.push((rule.material_id.as_str(), rule.weight)),
                }
            }
        }

        let mut best: Option<(&str, u32)> = None;
        for (id, score) in scores {
            if score > best.map_or(0, |(_, s)| s) {
                best = Some((id, score));
            }
        }

        let (id, score) = best?;
        if score < self.min_score {
            debug!(material = id, score, "Best keyword score below threshold");
            return None;
        }
        self.materials.get(id).map(|m| (m, score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::ScoredLabel;

    fn classifier() -> MaterialClassifier {
        MaterialClassifier::from_config(&Config::default())
    }

    fn labels(items: &[(&str, f32)]) -> PerceptionResult {
        PerceptionResult::new(
            items.iter().map(|(t, c)| ScoredLabel::new(*t, *c)).collect(),
            vec![],
            vec![],
            vec![],
        )
    }

    fn text(fragments: &[&str]) -> PerceptionResult {
        PerceptionResult::new(
            vec![],
            vec![],
            fragments.iter().map(|s| s.to_string()).collect(),
            vec![],
        )
    }

    #[test]
    fn test_resin_token_match() {
        let result = classifier().classify_detailed(&text(&["HDPE"])).unwrap();
        assert_eq!(result.material.id, "hdpe");
        assert_eq!(result.tier, MatchTier::ResinToken);
    }

    #[test]
    fn test_resin_token_strips_punctuation() {
        let result = classifier().classify(&text(&["Made of P.E.T.E!"])).unwrap();
        assert_eq!(result.id, "pet");

        let result = classifier().classify(&text(&["(LDPE)"])).unwrap();
        assert_eq!(result.id, "ldpe");
    }

    #[test]
    fn test_resin_token_requires_whole_word() {
        // "pets" and "apple" contain tokens but are not tokens themselves
        assert!(classifier().classify(&text(&["pets apple"])).is_none());
    }

    #[test]
    fn test_resin_token_beats_labels() {
        let perception = PerceptionResult::new(
            vec![
                ScoredLabel::new("Glass bottle", 0.95),
                ScoredLabel::new("Glass", 0.9),
            ],
            vec![],
            vec!["PP 5".to_string()],
            vec![],
        );
        let result = classifier().classify_detailed(&perception).unwrap();
        assert_eq!(result.material.id, "pp");
        assert_eq!(result.tier, MatchTier::ResinToken);
    }

    #[test]
    fn test_first_token_in_fragment_order_wins() {
        let result = classifier()
            .classify(&text(&["nothing here", "PS then PVC"]))
            .unwrap();
        assert_eq!(result.id, "ps");
    }

    #[test]
    fn test_standalone_digit_in_short_fragment() {
        let result = classifier().classify_detailed(&text(&["2"])).unwrap();
        assert_eq!(result.material.id, "hdpe");
        assert_eq!(result.tier, MatchTier::SymbolDigit);

        let result = classifier().classify(&text(&[" <7> "])).unwrap();
        assert_eq!(result.id, "mixed_plastic");
    }

    #[test]
    fn test_digit_in_longer_number_ignored() {
        assert!(classifier().classify(&text(&["12"])).is_none());
        assert!(classifier().classify(&text(&["2024"])).is_none());
        assert!(classifier().classify(&text(&["8"])).is_none());
        assert!(classifier().classify(&text(&["0"])).is_none());
    }

    #[test]
    fn test_digit_in_long_fragment_ignored() {
        assert!(classifier()
            .classify(&text(&["Price 3 dollars today"]))
            .is_none());
        assert!(classifier().classify(&text(&["Aisle 5"])).is_none());
    }

    #[test]
    fn test_fragment_length_boundary() {
        // Up to six characters after trimming still reads as a symbol snippet
        let result = classifier().classify(&text(&["  abc 4  "])).unwrap();
        assert_eq!(result.id, "ldpe");
        assert!(classifier().classify(&text(&["abcde 4 "])).is_none());
    }

    #[test]
    fn test_first_standalone_digit_in_fragment_is_used() {
        let result = classifier().classify(&text(&["10 3 1"])).unwrap();
        assert_eq!(result.id, "pvc");
    }

    #[test]
    fn test_keyword_scoring() {
        let result = classifier()
            .classify_detailed(&labels(&[("Plastic bottle", 0.9)]))
            .unwrap();
        assert_eq!(result.material.id, "bottle");
        assert_eq!(result.tier, MatchTier::KeywordScore);
        // plastic bottle (3) + bottle (2) + plastic (1)
        assert_eq!(result.score, Some(6));
    }

    #[test]
    fn test_single_weak_keyword_below_threshold() {
        assert!(classifier().classify(&labels(&[("Plastic", 0.9)])).is_none());
        assert!(classifier().classify(&labels(&[("Box", 0.99)])).is_none());
    }

    #[test]
    fn test_weak_keywords_accumulate_to_threshold() {
        let result = classifier()
            .classify(&labels(&[("Plastic", 0.5), ("Polystyrene", 0.5)]))
            .unwrap();
        assert_eq!(result.id, "bottle");
    }

    #[test]
    fn test_confidence_ignored_by_scoring() {
        let low = classifier().classify_detailed(&labels(&[("Tin can", 0.01)]));
        let high = classifier().classify_detailed(&labels(&[("Tin can", 1.0)]));
        assert_eq!(low, high);
        assert_eq!(low.unwrap().material.id, "can");
    }

    #[test]
    fn test_label_substring_of_keyword_does_not_match() {
        // "bott" is inside "bottle" but only keyword-in-label counts
        assert!(classifier().classify(&labels(&[("bott", 1.0)])).is_none());
        assert!(classifier().classify(&labels(&[("alumin", 1.0)])).is_none());
    }

    #[test]
    fn test_object_names_are_scored() {
        let perception = PerceptionResult::new(
            vec![],
            vec!["Glass jar".to_string()],
            vec![],
            vec![],
        );
        assert_eq!(classifier().classify(&perception).unwrap().id, "glass");
    }

    #[test]
    fn test_tie_keeps_first_scored_material() {
        // "jar" -> glass 2, "carton" -> cardboard 2
        let result = classifier()
            .classify(&labels(&[("Jar", 0.5), ("Carton", 0.9)]))
            .unwrap();
        assert_eq!(result.id, "glass");

        let result = classifier()
            .classify(&labels(&[("Carton", 0.9), ("Jar", 0.5)]))
            .unwrap();
        assert_eq!(result.id, "cardboard");
    }

    #[test]
    fn test_highest_score_wins() {
        let result = classifier()
            .classify(&labels(&[
                ("Box", 0.9),
                ("Aluminum can", 0.8),
                ("Beverage can", 0.7),
            ]))
            .unwrap();
        assert_eq!(result.id, "aluminum");
    }

    #[test]
    fn test_empty_input_unrecognized() {
        assert!(classifier().classify(&PerceptionResult::default()).is_none());
    }

    #[test]
    fn test_unknown_material_target_is_skipped() {
        let mut config = Config::default();
        config.classifier.rules = vec![ClassificationRule {
            keyword: "mug".to_string(),
            material_id: "ceramic".to_string(),
            weight: 5,
        }];
        let classifier = MaterialClassifier::from_config(&config);
        assert!(classifier.classify(&labels(&[("Mug", 1.0)])).is_none());
    }

    #[test]
    fn test_classification_is_deterministic() {
        let perception = PerceptionResult::new(
            vec![
                ScoredLabel::new("Jar", 0.7),
                ScoredLabel::new("Carton", 0.7),
                ScoredLabel::new("Paper", 0.6),
            ],
            vec!["Box".to_string()],
            vec!["Best before 2025".to_string()],
            vec![],
        );
        let classifier = classifier();
        let first = classifier.classify(&perception).map(|m| m.id);
        for _ in 0..10 {
            assert_eq!(classifier.classify(&perception).map(|m| m.id), first);
        }
    }
}
