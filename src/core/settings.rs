use crate::models::Preferences;
use crate::services::recs_api::{km_to_miles, CallError, RecsApi};
use crate::services::transport::Transport;
use thiserror::Error;

/// The four discovery updates, in the order they are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsStage {
    Location,
    AgeRange,
    Distance,
    GenderInterest,
}

impl std::fmt::Display for SettingsStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SettingsStage::Location => "location",
            SettingsStage::AgeRange => "age range",
            SettingsStage::Distance => "distance",
            SettingsStage::GenderInterest => "gender interest",
        };
        f.write_str(label)
    }
}

/// A settings update failed; later stages were not attempted
#[derive(Debug, Error)]
#[error("Failed to update {stage}: {cause}")]
pub struct SettingsError {
    pub stage: SettingsStage,
    #[source]
    pub cause: CallError,
}

/// Applies discovery preferences to the account before polling
pub struct SettingsApplier<'a, T> {
    api: &'a RecsApi<T>,
    auto_expand_age: bool,
}

impl<'a, T: Transport> SettingsApplier<'a, T> {
    pub fn new(api: &'a RecsApi<T>) -> Self {
        Self {
            api,
            auto_expand_age: true,
        }
    }

    /// Let the remote service widen the age range when it runs out of profiles
    pub fn with_age_auto_expansion(mut self, enabled: bool) -> Self {
        self.auto_expand_age = enabled;
        self
    }

    /// Run location, age, distance and gender updates in that order
    ///
    /// Stops at the first failure without retrying.
    pub async fn apply(&self, prefs: &Preferences) -> Result<(), SettingsError> {
        tracing::info!(
            "Updating location to lat={}, lon={}",
            prefs.latitude,
            prefs.longitude
        );
        self.api
            .update_location(prefs)
            .await
            .map_err(|cause| failed(SettingsStage::Location, cause))?;
        tracing::info!("Successfully updated location");

        tracing::info!(
            "Updating age filter to {}-{} (auto expansion: {})",
            prefs.min_age,
            prefs.max_age,
            self.auto_expand_age
        );
        self.api
            .update_age_filter(prefs, self.auto_expand_age)
            .await
            .map_err(|cause| failed(SettingsStage::AgeRange, cause))?;
        tracing::info!("Successfully updated age filter");

        tracing::info!(
            "Updating distance filter to {} km ({:.2} miles)",
            prefs.distance_km,
            km_to_miles(prefs.distance_km)
        );
        self.api
            .update_distance_filter(prefs)
            .await
            .map_err(|cause| failed(SettingsStage::Distance, cause))?;
        tracing::info!("Successfully updated distance filter");

        tracing::info!("Updating gender interest to {}", prefs.gender_interest);
        self.api
            .update_gender_interest(prefs)
            .await
            .map_err(|cause| failed(SettingsStage::GenderInterest, cause))?;
        tracing::info!("Successfully updated gender interest");

        tracing::info!("Discovery settings applied");
        Ok(())
    }
}

fn failed(stage: SettingsStage, cause: CallError) -> SettingsError {
    tracing::error!("Failed to update {}: {}", stage, cause);
    SettingsError { stage, cause }
}
