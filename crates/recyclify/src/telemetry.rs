//! Process-wide tracing setup for binaries and test harnesses embedding the
//! engine.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Filter used when neither `RUST_LOG` nor an explicit filter is given.
pub const DEFAULT_FILTER: &str = "recyclify=info";

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("Failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Builds the filter: an explicit directive wins, then `RUST_LOG`, then
/// [`DEFAULT_FILTER`].
pub fn build_filter(filter: Option<&str>) -> Result<EnvFilter, TelemetryError> {
    match filter {
        Some(directives) => {
            EnvFilter::try_new(directives).map_err(|e| TelemetryError::InvalidFilter {
                filter: directives.to_string(),
                reason: e.to_string(),
            })
        }
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Installs the global subscriber. `log` records from the database layer are
/// bridged into tracing so everything ends up in one stream.
///
/// Fails if a subscriber is already installed.
pub fn init_tracing(filter: Option<&str>, json: bool) -> Result<(), TelemetryError> {
    let filter = build_filter(filter)?;

    tracing_log::LogTracer::init().map_err(|e| TelemetryError::Install(e.to_string()))?;

    let registry = Registry::default().with(filter);
    let installed = if json {
        tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().with_current_span(true)),
        )
    } else {
        tracing::subscriber::set_global_default(registry.with(fmt::layer().with_target(true)))
    };
    installed.map_err(|e| TelemetryError::Install(e.to_string()))
}
