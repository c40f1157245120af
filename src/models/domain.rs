use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

/// Youngest age the discovery filter accepts
pub const MIN_DISCOVERY_AGE: u8 = 18;

/// Errors raised while building discovery preferences
#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("Invalid preferences: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// Which profiles the account wants to be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderInterest {
    Men,
    Women,
}

impl GenderInterest {
    /// Numeric code the remote API expects in `interested_in_genders`
    pub fn wire_code(self) -> u8 {
        match self {
            GenderInterest::Men => 0,
            GenderInterest::Women => 1,
        }
    }
}

impl std::fmt::Display for GenderInterest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenderInterest::Men => write!(f, "men"),
            GenderInterest::Women => write!(f, "women"),
        }
    }
}

/// Discovery preferences applied to the account before polling starts
///
/// Distances are kept in kilometers; conversion to the API's miles happens
/// only when the request payload is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_discovery", skip_on_field_errors = false))]
pub struct Preferences {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "minAge")]
    #[validate(range(min = 18))]
    pub min_age: u8,
    #[serde(rename = "maxAge")]
    pub max_age: u8,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
    #[serde(rename = "genderInterest")]
    pub gender_interest: GenderInterest,
}

fn validate_discovery(prefs: &Preferences) -> Result<(), ValidationError> {
    if !(-90.0..=90.0).contains(&prefs.latitude) {
        return Err(ValidationError::new("latitude_out_of_range"));
    }
    if !(-180.0..=180.0).contains(&prefs.longitude) {
        return Err(ValidationError::new("longitude_out_of_range"));
    }
    if prefs.max_age < prefs.min_age {
        return Err(ValidationError::new("max_age_below_min_age"));
    }
    // Also rejects NaN
    if !(prefs.distance_km > 0.0) {
        return Err(ValidationError::new("distance_not_positive"));
    }
    Ok(())
}

impl Preferences {
    /// Build a validated set of preferences
    pub fn new(
        latitude: f64,
        longitude: f64,
        min_age: u8,
        max_age: u8,
        distance_km: f64,
        gender_interest: GenderInterest,
    ) -> Result<Self, PreferencesError> {
        let prefs = Self {
            latitude,
            longitude,
            min_age,
            max_age,
            distance_km,
            gender_interest,
        };
        prefs.validate()?;
        Ok(prefs)
    }
}

/// Normalized profile ready to be written to the sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub user_id: String,
    pub name: String,
    /// Whole years, `None` when the birth date could not be read
    pub age: Option<u32>,
    pub bio: String,
    /// Birth date exactly as the API sent it
    pub birth_date: String,
    pub photo_count: usize,
    /// Photo URLs in profile display order
    pub photo_urls: Vec<String>,
}
