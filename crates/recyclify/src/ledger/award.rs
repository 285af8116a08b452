use tracing::{info, warn};

use crate::error::PersistenceError;
use crate::store::{ActionLogEntry, ActionStore};
use crate::workflow::CompletionWarning;

/// What became of one award.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AwardOutcome {
    /// Total written to the profile, if the update went through.
    pub new_total: Option<i64>,
    /// Whether the award reached the ledger or the profile total.
    pub points_recorded: bool,
}

/// Appends `entry` to the action log and refreshes the user's cached total.
///
/// The log is the source of truth. An entry whose id is already logged
/// counts as logged, so replaying an interrupted award never counts the
/// points twice. When the append itself fails, the award is carried by the
/// profile total alone. Failures become warnings, never errors.
pub async fn award_points(
    store: &dyn ActionStore,
    entry: &ActionLogEntry,
    warnings: &mut Vec<CompletionWarning>,
) -> AwardOutcome {
    let user_id = entry.user_id.as_str();
    let points = entry.points;

    let logged = match store.insert_action_log(entry).await {
        Ok(()) => true,
        Err(PersistenceError::AlreadyRecorded(id)) => {
            info!(action_id = %id, "Action already in the log, resuming award");
            true
        }
        Err(e) => {
            warn!(error = %e, "Failed to append action log");
            warnings.push(CompletionWarning::ActionLogFailed {
                error: e.to_string(),
            });
            false
        }
    };

    let new_total = match store.total_points(user_id).await {
        Ok(derived) => {
            let total = if logged { derived } else { derived + points };
            match store.update_points(user_id, total).await {
                Ok(()) => Some(total),
                Err(e) => {
                    warn!(error = %e, "Failed to update point total");
                    warnings.push(CompletionWarning::PointsUpdateFailed {
                        error: e.to_string(),
                    });
                    None
                }
            }
        }
        Err(e) => {
            warn!(error = %e, "Failed to read point total");
            warnings.push(CompletionWarning::TotalUnavailable {
                error: e.to_string(),
            });
            None
        }
    };

    let points_recorded = logged || new_total.is_some();
    if points_recorded {
        info!(points, new_total = ?new_total, warnings = warnings.len(), "Points awarded");
    } else {
        warn!(points, "Points could not be recorded");
    }

    AwardOutcome {
        new_total,
        points_recorded,
    }
}
