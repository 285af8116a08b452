pub mod catalog;
pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_from_str};
pub use schema::{
    BinEvidenceRule, ClassificationRule, ClassifierConfig, Config, DonationConfig, EnergyAction,
    EnergyConfig, LevelDefinition, MaterialCategory, MaterialProfile, ResinCode, ResinCodeToken,
    StorageConfig, VerifierConfig, VisionConfig,
};
