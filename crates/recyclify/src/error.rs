use std::path::PathBuf;
use thiserror::Error;

use crate::workflow::Stage;

#[derive(Error, Debug)]
pub enum RecyclifyError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Perception error: {0}")]
    Perception(#[from] PerceptionError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid material '{id}': {reason}")]
    InvalidMaterial { id: String, reason: String },

    #[error("Invalid rule '{keyword}': {reason}")]
    InvalidRule { keyword: String, reason: String },

    #[error("Failed to resolve secret: {0}")]
    Secret(#[from] crate::secrets::SecretError),
}

/// Failures of the external image-labeling collaborator.
///
/// `Provider` is distinct from `Status`: the service can answer 200 OK and
/// still report a per-image error inside the body.
#[derive(Error, Debug)]
pub enum PerceptionError {
    #[error("Failed to read photo '{path}': {source}")]
    ReadPhoto {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Request to labeling service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Labeling service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Labeling service reported error {code}: {message}")]
    Provider { code: i64, message: String },

    #[error("Failed to decode labeling response: {0}")]
    Decode(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File already exists: {0}")]
    FileExists(PathBuf),

    #[error("Invalid blob path: {0}")]
    InvalidPath(String),
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Blob storage error: {0}")]
    Blob(#[from] StorageError),

    #[error("Persistence collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("Action '{0}' is already recorded")]
    AlreadyRecorded(String),
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Cannot {action} while in stage {from}")]
    InvalidTransition { from: Stage, action: &'static str },

    #[error("Material '{material}' is not recyclable")]
    NotRecyclable { material: String },

    #[error("Item classification unavailable: {0}")]
    ClassificationUnavailable(#[source] PerceptionError),
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Unknown energy action '{0}'")]
    UnknownEnergyAction(String),

    #[error("Invalid meter reading: {0} kWh")]
    InvalidReading(f64),
}

pub type Result<T> = std::result::Result<T, RecyclifyError>;
