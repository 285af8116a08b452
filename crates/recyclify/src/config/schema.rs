use serde::{Deserialize, Serialize};

use super::catalog;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default = "catalog::default_materials")]
    pub materials: Vec<MaterialProfile>,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub verifier: VerifierConfig,
    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default = "catalog::default_levels")]
    pub levels: Vec<LevelDefinition>,
    #[serde(default)]
    pub energy: EnergyConfig,
    #[serde(default)]
    pub donation: DonationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            materials: catalog::default_materials(),
            classifier: ClassifierConfig::default(),
            verifier: VerifierConfig::default(),
            vision: VisionConfig::default(),
            storage: StorageConfig::default(),
            levels: catalog::default_levels(),
            energy: EnergyConfig::default(),
            donation: DonationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialCategory {
    Plastic,
    Metal,
    Glass,
    Paper,
    Other,
}

impl MaterialCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plastic => "plastic",
            Self::Metal => "metal",
            Self::Glass => "glass",
            Self::Paper => "paper",
            Self::Other => "other",
        }
    }
}

/// A disposal material and what recycling it is worth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialProfile {
    pub id: String,
    /// Short code printed to users, e.g. the resin number or "AL".
    #[serde(default)]
    pub code: String,
    pub display_name: String,
    pub category: MaterialCategory,
    pub is_recyclable: bool,
    pub co2_saved_kg: f64,
    pub point_value: i64,
    #[serde(default)]
    pub disposal_instructions: String,
    #[serde(default)]
    pub fun_fact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub keyword: String,
    #[serde(rename = "material")]
    pub material_id: String,
    pub weight: u32,
}

/// OCR word that identifies a plastic directly, e.g. `hdpe`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResinCodeToken {
    pub token: String,
    #[serde(rename = "material")]
    pub material_id: String,
}

/// Resin identification digit printed inside the chasing-arrows symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResinCode {
    pub digit: u8,
    #[serde(rename = "material")]
    pub material_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "catalog::default_rules")]
    pub rules: Vec<ClassificationRule>,
    #[serde(default = "catalog::default_resin_tokens")]
    pub resin_tokens: Vec<ResinCodeToken>,
    #[serde(default = "catalog::default_resin_codes")]
    pub resin_codes: Vec<ResinCode>,
    #[serde(default = "default_min_score")]
    pub min_score: u32,
    #[serde(default = "default_max_symbol_fragment_len")]
    pub max_symbol_fragment_len: usize,
}

fn default_min_score() -> u32 {
    2
}

fn default_max_symbol_fragment_len() -> usize {
    6
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rules: catalog::default_rules(),
            resin_tokens: catalog::default_resin_tokens(),
            resin_codes: catalog::default_resin_codes(),
            min_score: default_min_score(),
            max_symbol_fragment_len: default_max_symbol_fragment_len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinEvidenceRule {
    pub keyword: String,
    pub weight: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    #[serde(default = "catalog::default_bin_evidence")]
    pub positive: Vec<BinEvidenceRule>,
    #[serde(default = "catalog::default_trash_keywords")]
    pub trash_keywords: Vec<String>,
    #[serde(default = "catalog::default_recycling_keywords")]
    pub recycling_keywords: Vec<String>,
    #[serde(default = "catalog::default_ocr_keywords")]
    pub ocr_keywords: Vec<String>,
    #[serde(default = "catalog::default_logo_keywords")]
    pub logo_keywords: Vec<String>,
    #[serde(default = "default_ocr_bonus")]
    pub ocr_bonus: f32,
    #[serde(default = "default_logo_bonus")]
    pub logo_bonus: f32,
    #[serde(default = "default_trash_penalty")]
    pub trash_penalty: f32,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    /// Confidence applied to object-detection names, which carry none.
    #[serde(default = "default_object_confidence")]
    pub object_confidence: f32,
}

fn default_ocr_bonus() -> f32 {
    6.0
}

fn default_logo_bonus() -> f32 {
    8.0
}

fn default_trash_penalty() -> f32 {
    10.0
}

fn default_threshold() -> f32 {
    5.0
}

fn default_object_confidence() -> f32 {
    1.0
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            positive: catalog::default_bin_evidence(),
            trash_keywords: catalog::default_trash_keywords(),
            recycling_keywords: catalog::default_recycling_keywords(),
            ocr_keywords: catalog::default_ocr_keywords(),
            logo_keywords: catalog::default_logo_keywords(),
            ocr_bonus: default_ocr_bonus(),
            logo_bonus: default_logo_bonus(),
            trash_penalty: default_trash_penalty(),
            threshold: default_threshold(),
            object_confidence: default_object_confidence(),
        }
    }
}

/// Vision API client settings. The API key is resolved from the first
/// non-empty source: `api_key`, `api_key_file`, then `api_key_env`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_file: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,
    #[serde(default = "default_max_labels")]
    pub max_labels: u32,
    #[serde(default = "default_max_text")]
    pub max_text: u32,
    #[serde(default = "default_max_objects")]
    pub max_objects: u32,
    #[serde(default = "default_max_logos")]
    pub max_logos: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://vision.googleapis.com/v1/images:annotate".to_string()
}

fn default_api_key_env() -> Option<String> {
    Some("GOOGLE_VISION_API_KEY".to_string())
}

fn default_max_labels() -> u32 {
    15
}

fn default_max_text() -> u32 {
    5
}

fn default_max_objects() -> u32 {
    10
}

fn default_max_logos() -> u32 {
    5
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            api_key_file: None,
            api_key_env: default_api_key_env(),
            max_labels: default_max_labels(),
            max_text: default_max_text(),
            max_objects: default_max_objects(),
            max_logos: default_max_logos(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_blob_directory")]
    pub blob_directory: String,
}

fn data_root() -> std::path::PathBuf {
    dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
        .unwrap_or_else(std::env::temp_dir)
        .join("recyclify")
}

fn default_database_path() -> String {
    data_root()
        .join("recyclify.db")
        .to_string_lossy()
        .to_string()
}

fn default_blob_directory() -> String {
    data_root().join("photos").to_string_lossy().to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            blob_directory: default_blob_directory(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    pub level: u32,
    pub title: String,
    pub min_points: i64,
}

/// A one-tap energy-saving habit and its fixed award.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyAction {
    pub id: String,
    pub name: String,
    pub co2_saved_kg: f64,
    pub points: i64,
}

/// Conversion factors for meter readings plus the quick-action catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyConfig {
    /// Grid emission factor.
    #[serde(default = "default_co2_per_kwh")]
    pub co2_per_kwh: f64,
    #[serde(default = "default_points_per_kg_co2")]
    pub points_per_kg_co2: f64,
    #[serde(default = "catalog::default_energy_actions")]
    pub actions: Vec<EnergyAction>,
}

fn default_co2_per_kwh() -> f64 {
    0.372
}

fn default_points_per_kg_co2() -> f64 {
    1.0
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            co2_per_kwh: default_co2_per_kwh(),
            points_per_kg_co2: default_points_per_kg_co2(),
            actions: catalog::default_energy_actions(),
        }
    }
}

/// Flat award for dropping surplus food at a donation site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationConfig {
    #[serde(default = "default_donation_points")]
    pub points: i64,
    #[serde(default = "default_donation_co2")]
    pub co2_saved_kg: f64,
    #[serde(default = "default_meals_provided")]
    pub meals_provided: u32,
}

fn default_donation_points() -> i64 {
    30
}

fn default_donation_co2() -> f64 {
    2.5
}

fn default_meals_provided() -> u32 {
    5
}

impl Default for DonationConfig {
    fn default() -> Self {
        Self {
            points: default_donation_points(),
            co2_saved_kg: default_donation_co2(),
            meals_provided: default_meals_provided(),
        }
    }
}
