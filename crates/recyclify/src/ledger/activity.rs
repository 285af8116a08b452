use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::config::{Config, DonationConfig, EnergyConfig};
use crate::error::LedgerError;
use crate::store::{ActionLogEntry, ActionStore, ActionType};
use crate::verifier::OutcomeKind;
use crate::workflow::CompletionWarning;

use super::award::award_points;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonationSiteType {
    FoodBank,
    CommunityFridge,
    Shelter,
    Pantry,
}

impl DonationSiteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FoodBank => "food_bank",
            Self::CommunityFridge => "community_fridge",
            Self::Shelter => "shelter",
            Self::Pantry => "pantry",
        }
    }
}

/// What one self-reported activity handed to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct AwardReceipt {
    pub action_id: Uuid,
    pub action_type: ActionType,
    pub points_awarded: i64,
    pub co2_saved_kg: f64,
    pub new_total: Option<i64>,
    pub points_recorded: bool,
    pub warnings: Vec<CompletionWarning>,
}

/// A monthly meter reading compared against the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct MeterReading {
    pub kwh: f64,
    /// Emissions of this reading, rounded to 0.01 kg.
    pub co2_kg: f64,
    pub points: i64,
    /// Present only when the reading earned points.
    pub award: Option<AwardReceipt>,
}

/// Logs energy habits, meter readings and food donations for one user.
///
/// These never have a proof photo, so entries are unverified and tagged
/// [`OutcomeKind::SelfReported`].
pub struct ActivityLogger {
    user_id: String,
    store: Arc<dyn ActionStore>,
    energy: EnergyConfig,
    donation: DonationConfig,
}

impl ActivityLogger {
    pub fn new(
        user_id: impl Into<String>,
        store: Arc<dyn ActionStore>,
        energy: EnergyConfig,
        donation: DonationConfig,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            store,
            energy,
            donation,
        }
    }

    pub fn from_config(
        config: &Config,
        user_id: impl Into<String>,
        store: Arc<dyn ActionStore>,
    ) -> Self {
        Self::new(
            user_id,
            store,
            config.energy.clone(),
            config.donation.clone(),
        )
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Awards a quick action from the configured catalog.
    pub async fn log_energy_action(&self, action_id: &str) -> Result<AwardReceipt, LedgerError> {
        let action = self
            .energy
            .actions
            .iter()
            .find(|a| a.id == action_id)
            .ok_or_else(|| LedgerError::UnknownEnergyAction(action_id.to_string()))?;

        let details = json!({
            "action_id": action.id,
            "action_name": action.name,
            "co2_saved_kg": action.co2_saved_kg,
        });
        let span = info_span!("energy_action", user = %self.user_id, action = %action.id);
        Ok(self
            .award(ActionType::Energy, action.points, action.co2_saved_kg, details)
            .instrument(span)
            .await)
    }

    /// Records a meter reading. Only a drop from `previous_kwh` earns points,
    /// and a reading that earns nothing is not logged.
    pub async fn log_meter_reading(
        &self,
        kwh: f64,
        previous_kwh: Option<f64>,
    ) -> Result<MeterReading, LedgerError> {
        if !kwh.is_finite() || kwh <= 0.0 {
            return Err(LedgerError::InvalidReading(kwh));
        }

        let co2_kg = reading_co2(&self.energy, kwh);
        let points = previous_kwh.map_or(0, |prev| reading_points(&self.energy, kwh, prev));
        if points == 0 {
            info!(user = %self.user_id, kwh, "Meter reading earned no points");
            return Ok(MeterReading {
                kwh,
                co2_kg,
                points,
                award: None,
            });
        }

        let saved_kwh = previous_kwh.unwrap_or(kwh) - kwh;
        let details = json!({
            "kwh": kwh,
            "co2_kg": co2_kg,
            "previous_kwh": previous_kwh,
        });
        let span = info_span!("meter_reading", user = %self.user_id, kwh);
        let award = self
            .award(
                ActionType::Energy,
                points,
                reading_co2(&self.energy, saved_kwh),
                details,
            )
            .instrument(span)
            .await;

        Ok(MeterReading {
            kwh,
            co2_kg,
            points,
            award: Some(award),
        })
    }

    pub async fn log_donation(&self, site_name: &str, site_type: DonationSiteType) -> AwardReceipt {
        let donation = &self.donation;
        let details = json!({
            "site_name": site_name,
            "site_type": site_type.as_str(),
            "co2_saved_kg": donation.co2_saved_kg,
            "meals_provided": donation.meals_provided,
        });
        let span = info_span!("donation", user = %self.user_id, site_type = site_type.as_str());
        self.award(ActionType::Donate, donation.points, donation.co2_saved_kg, details)
            .instrument(span)
            .await
    }

    async fn award(
        &self,
        action_type: ActionType,
        points: i64,
        co2_saved_kg: f64,
        details: serde_json::Value,
    ) -> AwardReceipt {
        let entry = ActionLogEntry {
            id: Uuid::new_v4(),
            user_id: self.user_id.clone(),
            action_type,
            points,
            co2_saved_kg,
            verified: false,
            outcome: OutcomeKind::SelfReported,
            details,
            image_ref: None,
            created_at: Utc::now(),
        };

        let mut warnings = Vec::new();
        let award = award_points(self.store.as_ref(), &entry, &mut warnings).await;

        AwardReceipt {
            action_id: entry.id,
            action_type,
            points_awarded: points,
            co2_saved_kg,
            new_total: award.new_total,
            points_recorded: award.points_recorded,
            warnings,
        }
    }
}

/// Emissions for `kwh`, rounded to 0.01 kg.
fn reading_co2(energy: &EnergyConfig, kwh: f64) -> f64 {
    (kwh * energy.co2_per_kwh * 100.0).round() / 100.0
}

/// Points for a drop from `previous` to `current`. Any real saving is worth
/// at least one point; no previous reading or no saving is worth nothing.
fn reading_points(energy: &EnergyConfig, current: f64, previous: f64) -> i64 {
    if previous <= 0.0 {
        return 0;
    }
    let saved = previous - current;
    if saved <= 0.0 {
        return 0;
    }
    let points = (saved * energy.co2_per_kwh * energy.points_per_kg_co2).round() as i64;
    points.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistenceError;
    use crate::store::BlobRef;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        entries: Mutex<Vec<ActionLogEntry>>,
        totals: Mutex<Vec<i64>>,
    }

    #[async_trait]
    impl ActionStore for MemoryStore {
        async fn upload_blob(
            &self,
            path: &str,
            _bytes: &[u8],
        ) -> Result<BlobRef, PersistenceError> {
            Ok(BlobRef(path.to_string()))
        }

        async fn insert_action_log(&self, entry: &ActionLogEntry) -> Result<(), PersistenceError> {
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }

        async fn update_points(
            &self,
            _user_id: &str,
            new_total: i64,
        ) -> Result<(), PersistenceError> {
            self.totals.lock().unwrap().push(new_total);
            Ok(())
        }

        async fn total_points(&self, _user_id: &str) -> Result<i64, PersistenceError> {
            Ok(self.entries.lock().unwrap().iter().map(|e| e.points).sum())
        }
    }

    fn logger(store: Arc<MemoryStore>) -> ActivityLogger {
        ActivityLogger::from_config(&Config::default(), "user-1", store)
    }

    #[test]
    fn test_reading_points() {
        let energy = EnergyConfig::default();
        assert_eq!(reading_points(&energy, 400.0, 450.0), 19);
        // A tiny saving still earns a point.
        assert_eq!(reading_points(&energy, 449.5, 450.0), 1);
        assert_eq!(reading_points(&energy, 450.0, 450.0), 0);
        assert_eq!(reading_points(&energy, 500.0, 450.0), 0);
        assert_eq!(reading_points(&energy, 400.0, 0.0), 0);
    }

    #[test]
    fn test_reading_co2_rounds_to_cents() {
        let energy = EnergyConfig::default();
        assert_eq!(reading_co2(&energy, 450.0), 167.4);
        assert_eq!(reading_co2(&energy, 1.0), 0.37);
    }

    #[tokio::test]
    async fn test_energy_action_awards_catalog_points() {
        let store = Arc::new(MemoryStore::default());
        let receipt = logger(store.clone())
            .log_energy_action("line_dry")
            .await
            .unwrap();

        assert_eq!(receipt.action_type, ActionType::Energy);
        assert_eq!(receipt.points_awarded, 5);
        assert_eq!(receipt.new_total, Some(5));
        assert!(receipt.warnings.is_empty());

        let entry = store.entries.lock().unwrap()[0].clone();
        assert!(!entry.verified);
        assert_eq!(entry.outcome, OutcomeKind::SelfReported);
        assert_eq!(entry.details["action_name"], "Air-Dried Clothes");
        assert_eq!(entry.co2_saved_kg, 2.0);
    }

    #[tokio::test]
    async fn test_unknown_energy_action() {
        let store = Arc::new(MemoryStore::default());
        let err = logger(store.clone())
            .log_energy_action("solar_roof")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnknownEnergyAction(id) if id == "solar_roof"));
        assert!(store.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_first_meter_reading_is_not_logged() {
        let store = Arc::new(MemoryStore::default());
        let reading = logger(store.clone())
            .log_meter_reading(450.0, None)
            .await
            .unwrap();

        assert_eq!(reading.points, 0);
        assert_eq!(reading.co2_kg, 167.4);
        assert!(reading.award.is_none());
        assert!(store.entries.lock().unwrap().is_empty());
        assert!(store.totals.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lower_meter_reading_awards_points() {
        let store = Arc::new(MemoryStore::default());
        let reading = logger(store.clone())
            .log_meter_reading(400.0, Some(450.0))
            .await
            .unwrap();

        assert_eq!(reading.points, 19);
        let award = reading.award.unwrap();
        assert_eq!(award.new_total, Some(19));
        assert_eq!(award.co2_saved_kg, 18.6);

        let entry = store.entries.lock().unwrap()[0].clone();
        assert_eq!(entry.details["kwh"], 400.0);
        assert_eq!(entry.details["previous_kwh"], 450.0);
    }

    #[tokio::test]
    async fn test_invalid_meter_reading() {
        let store = Arc::new(MemoryStore::default());
        let logger = logger(store);
        for kwh in [0.0, -3.0, f64::NAN] {
            assert!(matches!(
                logger.log_meter_reading(kwh, Some(100.0)).await,
                Err(LedgerError::InvalidReading(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_donation_awards_flat_points() {
        let store = Arc::new(MemoryStore::default());
        let receipt = logger(store.clone())
            .log_donation("Eastside Fridge", DonationSiteType::CommunityFridge)
            .await;

        assert_eq!(receipt.action_type, ActionType::Donate);
        assert_eq!(receipt.points_awarded, 30);
        assert_eq!(receipt.co2_saved_kg, 2.5);
        assert_eq!(receipt.new_total, Some(30));

        let entry = store.entries.lock().unwrap()[0].clone();
        assert_eq!(entry.details["site_type"], "community_fridge");
        assert_eq!(entry.details["meals_provided"], 5);
    }
}
