pub mod classifier;
pub mod config;
pub mod db;
pub mod error;
pub mod ledger;
pub mod levels;
pub mod perception;
pub mod sanitize;
pub mod secrets;
pub mod storage;
pub mod store;
pub mod telemetry;
pub mod verifier;
pub mod workflow;

pub use classifier::{Classification, MatchTier, MaterialClassifier};
pub use config::{load_config, load_config_from_str, Config, MaterialProfile};
pub use error::{
    ConfigError, LedgerError, PerceptionError, PersistenceError, RecyclifyError, Result,
    StorageError, WorkflowError,
};
pub use ledger::{ActivityLogger, AwardReceipt, DonationSiteType, MeterReading};
pub use levels::LevelTable;
pub use perception::{PerceptionResult, PerceptionService, Photo, ScoredLabel, VisionClient};
pub use secrets::{resolve_secret, resolve_vision_api_key, SecretError};
pub use store::{ActionLogEntry, ActionStore, ActionType, BlobRef, LocalActionStore};
pub use verifier::{BinVerifier, OutcomeKind, VerificationOutcome, VerificationResult};
pub use workflow::{CompletionReceipt, CompletionWarning, DisposalAttempt, DisposalWorkflow, Stage};
