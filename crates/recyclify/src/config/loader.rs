use std::collections::HashSet;
use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../schema/config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

/// Semantic checks the schema cannot express: cross references between
/// tables, uniqueness, and numeric sanity.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let mut material_ids = HashSet::new();
    for material in &config.materials {
        if material.id.trim().is_empty() {
            return Err(ConfigError::InvalidMaterial {
                id: material.id.clone(),
                reason: "Material id must not be empty".to_string(),
            });
        }
        if !material_ids.insert(material.id.as_str()) {
            return Err(ConfigError::InvalidMaterial {
                id: material.id.clone(),
                reason: "Duplicate material ID".to_string(),
            });
        }
        if material.point_value < 0
            || material.co2_saved_kg.is_nan()
            || material.co2_saved_kg < 0.0
        {
            return Err(ConfigError::InvalidMaterial {
                id: material.id.clone(),
                reason: "Points and CO2 savings must be non-negative".to_string(),
            });
        }
    }

    let known = |id: &str| material_ids.contains(id);

    for rule in &config.classifier.rules {
        if rule.keyword.trim().is_empty() {
            return Err(ConfigError::InvalidRule {
                keyword: rule.keyword.clone(),
                reason: "Keyword must not be empty".to_string(),
            });
        }
        if rule.weight == 0 {
            return Err(ConfigError::InvalidRule {
                keyword: rule.keyword.clone(),
                reason: "Weight must be positive".to_string(),
            });
        }
        if !known(&rule.material_id) {
            return Err(ConfigError::InvalidRule {
                keyword: rule.keyword.clone(),
                reason: format!("Unknown material '{}'", rule.material_id),
            });
        }
    }

    for token in &config.classifier.resin_tokens {
        if token.token.trim().is_empty() || !known(&token.material_id) {
            return Err(ConfigError::InvalidRule {
                keyword: token.token.clone(),
                reason: format!(
                    "Resin token must be non-empty and target a known material (got '{}')",
                    token.material_id
                ),
            });
        }
    }

    for code in &config.classifier.resin_codes {
        if !(1..=7).contains(&code.digit) || !known(&code.material_id) {
            return Err(ConfigError::InvalidRule {
                keyword: code.digit.to_string(),
                reason: format!(
                    "Resin code must be 1-7 and target a known material (got '{}')",
                    code.material_id
                ),
            });
        }
    }

    let verifier = &config.verifier;
    for rule in &verifier.positive {
        if rule.keyword.trim().is_empty() || !(rule.weight.is_finite() && rule.weight > 0.0) {
            return Err(ConfigError::InvalidRule {
                keyword: rule.keyword.clone(),
                reason: "Bin evidence needs a keyword and a positive weight".to_string(),
            });
        }
    }
    for (name, value) in [
        ("ocr_bonus", verifier.ocr_bonus),
        ("logo_bonus", verifier.logo_bonus),
        ("trash_penalty", verifier.trash_penalty),
        ("threshold", verifier.threshold),
    ] {
        if !value.is_finite() {
            return Err(ConfigError::Validation {
                message: format!("verifier.{} must be a finite number", name),
            });
        }
    }
    if !(0.0..=1.0).contains(&verifier.object_confidence) {
        return Err(ConfigError::Validation {
            message: "verifier.object_confidence must be between 0 and 1".to_string(),
        });
    }

    if config.levels.is_empty() {
        return Err(ConfigError::Validation {
            message: "At least one level must be defined".to_string(),
        });
    }
    if !config
        .levels
        .windows(2)
        .all(|w| w[0].min_points < w[1].min_points)
    {
        return Err(ConfigError::Validation {
            message: "Levels must be sorted by strictly increasing min_points".to_string(),
        });
    }

    let energy = &config.energy;
    if !(energy.co2_per_kwh.is_finite() && energy.co2_per_kwh > 0.0)
        || !(energy.points_per_kg_co2.is_finite() && energy.points_per_kg_co2 >= 0.0)
    {
        return Err(ConfigError::Validation {
            message: "Energy conversion factors must be positive".to_string(),
        });
    }
    let mut action_ids = HashSet::new();
    for action in &energy.actions {
        if action.id.trim().is_empty() || !action_ids.insert(action.id.as_str()) {
            return Err(ConfigError::Validation {
                message: format!("Duplicate or empty energy action id '{}'", action.id),
            });
        }
        if action.points < 0 || action.co2_saved_kg.is_nan() || action.co2_saved_kg < 0.0 {
            return Err(ConfigError::Validation {
                message: format!("Energy action '{}' has negative points or CO2", action.id),
            });
        }
    }

    let donation = &config.donation;
    if donation.points < 0 || donation.co2_saved_kg.is_nan() || donation.co2_saved_kg < 0.0 {
        return Err(ConfigError::Validation {
            message: "donation.points and donation.co2_saved_kg must be non-negative".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_minimal_config_uses_builtin_tables() {
        let config = load_config_from_str(r#"{"version": "1.0"}"#).unwrap();
        assert_eq!(config.materials.len(), 13);
        assert_eq!(config.classifier.min_score, 2);
        assert_eq!(config.verifier.threshold, 5.0);
        assert_eq!(config.levels.len(), 10);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_invalid_version() {
        let result = load_config_from_str(r#"{"version": "2.0"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_version_fails_schema() {
        let result = load_config_from_str(r#"{"materials": []}"#);
        assert!(matches!(result, Err(ConfigError::SchemaValidation { .. })));
    }

    #[test]
    fn test_invalid_json() {
        let result = load_config_from_str("{ not json");
        assert!(matches!(result, Err(ConfigError::ParseJson(_))));
    }

    #[test]
    fn test_rule_with_unknown_material() {
        let config_json = r#"
        {
            "version": "1.0",
            "classifier": {
                "rules": [
                    {"keyword": "mug", "material": "ceramic", "weight": 2}
                ]
            }
        }
        "#;

        match load_config_from_str(config_json) {
            Err(ConfigError::InvalidRule { keyword, reason }) => {
                assert_eq!(keyword, "mug");
                assert!(reason.contains("ceramic"));
            }
            other => panic!("Expected InvalidRule, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_material_id() {
        let mut config = Config::default();
        let duplicate = config.materials[0].clone();
        config.materials.push(duplicate);

        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidMaterial { .. })
        ));
    }

    #[test]
    fn test_resin_code_out_of_range() {
        let mut config = Config::default();
        config.classifier.resin_codes[0].digit = 9;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidRule { .. })
        ));
    }

    #[test]
    fn test_unsorted_levels_rejected() {
        let mut config = Config::default();
        config.levels.swap(1, 2);
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn test_custom_verifier_section() {
        let config_json = r#"
        {
            "version": "1.0",
            "verifier": {
                "threshold": 7.5,
                "positive": [{"keyword": "wertstoff", "weight": 4.0}]
            }
        }
        "#;

        let config = load_config_from_str(config_json).unwrap();
        assert_eq!(config.verifier.threshold, 7.5);
        assert_eq!(config.verifier.positive.len(), 1);
        assert_eq!(config.verifier.ocr_bonus, 6.0);
    }

    #[test]
    fn test_negative_weight_rejected_by_schema() {
        let config_json = r#"
        {
            "version": "1.0",
            "classifier": {
                "rules": [{"keyword": "can", "material": "can", "weight": -1}]
            }
        }
        "#;
        assert!(load_config_from_str(config_json).is_err());
    }

    #[test]
    fn test_energy_and_donation_sections() {
        let config = load_config_from_str(
            r#"{
                "version": "1.0",
                "energy": {"co2_per_kwh": 0.5, "actions": [
                    {"id": "bike", "name": "Biked", "co2_saved_kg": 1.0, "points": 4}
                ]},
                "donation": {"points": 10}
            }"#,
        )
        .unwrap();
        assert_eq!(config.energy.co2_per_kwh, 0.5);
        assert_eq!(config.energy.points_per_kg_co2, 1.0);
        assert_eq!(config.energy.actions.len(), 1);
        assert_eq!(config.donation.points, 10);
        assert_eq!(config.donation.meals_provided, 5);
    }

    #[test]
    fn test_duplicate_energy_action_rejected() {
        let mut config = Config::default();
        let first = config.energy.actions[0].clone();
        config.energy.actions.push(first);
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("/nonexistent/recyclify.json");
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }
}
