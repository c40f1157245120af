use crate::core::age::age_from_birth_date;
use crate::models::{RawProfile, RecEnvelope, Record};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Whole-response parse failures
///
/// A single unreadable birth date is not one of these: it only blanks the age.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Missing results collection: {0}")]
    MissingResults(String),
}

/// Maps recommendation responses to normalized records
#[derive(Debug, Clone, Default)]
pub struct RecordExtractor;

impl RecordExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract records, deriving ages relative to today's local date
    pub fn extract(&self, body: &str) -> Result<Vec<Record>, ParseError> {
        self.extract_at(body, Local::now().date_naive())
    }

    /// Extract records with ages computed relative to `today`
    ///
    /// Output order follows the order of `data.results`.
    pub fn extract_at(&self, body: &str, today: NaiveDate) -> Result<Vec<Record>, ParseError> {
        let json: Value = serde_json::from_str(body)?;

        let results = json
            .get("data")
            .ok_or_else(|| ParseError::MissingResults("no `data` object".into()))?
            .get("results")
            .ok_or_else(|| ParseError::MissingResults("no `data.results` field".into()))?
            .as_array()
            .ok_or_else(|| ParseError::MissingResults("`data.results` is not an array".into()))?;

        let records = results
            .iter()
            .enumerate()
            .filter_map(|(idx, element)| {
                match RecEnvelope::deserialize(element) {
                    Ok(envelope) => Some(envelope),
                    Err(e) => {
                        tracing::warn!("Skipping malformed result #{}: {}", idx, e);
                        None
                    }
                }
            })
            .filter(RecEnvelope::is_user)
            .filter_map(|envelope| envelope.user)
            .filter_map(|profile| to_record(profile, today))
            .collect();

        Ok(records)
    }
}

fn to_record(profile: RawProfile, today: NaiveDate) -> Option<Record> {
    let user_id = match profile.id {
        Some(id) if !id.is_empty() => id,
        _ => {
            tracing::debug!("Skipping profile without an id");
            return None;
        }
    };

    let birth_date = profile.birth_date.unwrap_or_default();
    let age = age_from_birth_date(&birth_date, today);

    let bio = profile
        .bio
        .unwrap_or_default()
        .replace(['\n', '\r'], " ");

    let photo_count = profile.photos.len();
    let photo_urls = profile
        .photos
        .into_iter()
        .filter_map(|photo| photo.url)
        .filter(|url| !url.is_empty())
        .collect();

    Some(Record {
        user_id,
        name: profile.name.unwrap_or_default(),
        age,
        bio,
        birth_date,
        photo_count,
        photo_urls,
    })
}
