use crate::models::{ErrorKind, Preferences};
use crate::services::transport::{Headers, Transport, TransportError, TransportResponse};
use serde_json::{json, Value};
use thiserror::Error;

/// Header carrying the session token on every call
pub const AUTH_HEADER: &str = "X-Auth-Token";

pub const DEFAULT_BASE_URL: &str = "https://api.gotinder.com";
pub const DEFAULT_USER_AGENT: &str = "Tinder/16.14.0 (iPhone; iOS 18.5; Scale/3.00)";
pub const DEFAULT_LOCALE: &str = "en-GB";

const KM_PER_MILE: f64 = 1.60934;

const META_PATH: &str = "/v2/meta";
const PROFILE_PATH: &str = "/v2/profile/user";
const RECS_PATH: &str = "/v2/recs/core";

/// Errors from a single remote call
#[derive(Debug, Error)]
pub enum CallError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Unauthorized: status {status}")]
    Unauthorized { status: u16, body: String },

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },
}

impl CallError {
    /// Only authentication failures end a run; everything else may clear up
    pub fn kind(&self) -> ErrorKind {
        match self {
            CallError::Unauthorized { .. } => ErrorKind::Fatal,
            CallError::Transport(_) | CallError::Status { .. } => ErrorKind::Transient,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            CallError::Unauthorized { status, .. } | CallError::Status { status, .. } => {
                Some(*status)
            }
            CallError::Transport(_) => None,
        }
    }
}

#[inline]
pub fn is_auth_failure(status: u16) -> bool {
    status == 401 || status == 403
}

/// Convert kilometers to the miles the distance filter expects
#[inline]
pub fn km_to_miles(km: f64) -> f64 {
    km / KM_PER_MILE
}

pub fn location_payload(prefs: &Preferences) -> Value {
    json!({
        "force_fetch_resources": true,
        "background": false,
        "lat": prefs.latitude,
        "lon": prefs.longitude,
    })
}

pub fn age_filter_payload(prefs: &Preferences, auto_expand: bool) -> Value {
    json!({
        "age_filter_min": prefs.min_age,
        "age_filter_max": prefs.max_age,
        "auto_expansion": { "age_toggle": auto_expand },
    })
}

pub fn distance_payload(prefs: &Preferences) -> Value {
    json!({ "distance_filter": km_to_miles(prefs.distance_km) })
}

pub fn gender_interest_payload(prefs: &Preferences) -> Value {
    json!({ "interested_in_genders": [prefs.gender_interest.wire_code()] })
}

/// Connection details for the recommendation API
#[derive(Clone)]
pub struct ApiOptions {
    pub base_url: String,
    pub auth_token: String,
    pub user_agent: String,
    pub locale: String,
}

impl ApiOptions {
    pub fn new(auth_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_token: auth_token.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Recommendation API client
///
/// Builds every URL, header set and payload the harvester sends:
/// - discovery settings updates (location, age, distance, gender)
/// - the recommendation feed fetch
pub struct RecsApi<T> {
    transport: T,
    options: ApiOptions,
}

impl<T: Transport> RecsApi<T> {
    pub fn new(transport: T, options: ApiOptions) -> Self {
        Self { transport, options }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.options.base_url.trim_end_matches('/'), path)
    }

    /// Feed URL including the locale query parameter
    pub fn recs_url(&self) -> String {
        format!(
            "{}?locale={}",
            self.url(RECS_PATH),
            urlencoding::encode(&self.options.locale)
        )
    }

    fn base_headers(&self) -> Headers {
        vec![
            (AUTH_HEADER, self.options.auth_token.clone()),
            ("User-Agent", self.options.user_agent.clone()),
        ]
    }

    async fn post_json(&self, path: &str, payload: Value) -> Result<TransportResponse, CallError> {
        let url = self.url(path);
        let mut headers = self.base_headers();
        headers.push(("Content-Type", "application/json".to_string()));

        tracing::debug!("POST {} {}", url, payload);

        let response = self.transport.post(&url, &headers, &payload).await?;
        ensure_success(response)
    }

    pub async fn update_location(&self, prefs: &Preferences) -> Result<(), CallError> {
        self.post_json(META_PATH, location_payload(prefs)).await?;
        Ok(())
    }

    pub async fn update_age_filter(
        &self,
        prefs: &Preferences,
        auto_expand: bool,
    ) -> Result<(), CallError> {
        self.post_json(PROFILE_PATH, age_filter_payload(prefs, auto_expand))
            .await?;
        Ok(())
    }

    pub async fn update_distance_filter(&self, prefs: &Preferences) -> Result<(), CallError> {
        self.post_json(PROFILE_PATH, distance_payload(prefs)).await?;
        Ok(())
    }

    pub async fn update_gender_interest(&self, prefs: &Preferences) -> Result<(), CallError> {
        self.post_json(PROFILE_PATH, gender_interest_payload(prefs))
            .await?;
        Ok(())
    }

    /// Fetch one page of recommendations
    pub async fn fetch_recommendations(&self) -> Result<TransportResponse, CallError> {
        let url = self.recs_url();
        let mut headers = self.base_headers();
        headers.push(("Accept", "application/json".to_string()));

        tracing::debug!("GET {}", url);

        let response = self.transport.get(&url, &headers).await?;
        ensure_success(response)
    }
}

fn ensure_success(response: TransportResponse) -> Result<TransportResponse, CallError> {
    if response.is_success() {
        return Ok(response);
    }

    let TransportResponse { status, body, .. } = response;
    if is_auth_failure(status) {
        Err(CallError::Unauthorized { status, body })
    } else {
        Err(CallError::Status { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GenderInterest;

    fn lyon() -> Preferences {
        Preferences::new(45.766684, 4.742095, 18, 25, 15.0, GenderInterest::Women).unwrap()
    }

    #[test]
    fn test_km_to_miles() {
        let miles = km_to_miles(15.0);
        assert!((miles - 9.32).abs() < 0.01);
    }

    #[test]
    fn test_distance_payload_is_in_miles() {
        let payload = distance_payload(&lyon());
        let miles = payload["distance_filter"].as_f64().unwrap();
        assert!((miles - 9.3206).abs() < 0.001);
    }

    #[test]
    fn test_location_payload() {
        let payload = location_payload(&lyon());
        assert_eq!(payload["lat"], 45.766684);
        assert_eq!(payload["lon"], 4.742095);
        assert_eq!(payload["force_fetch_resources"], true);
        assert_eq!(payload["background"], false);
    }

    #[test]
    fn test_age_filter_payload() {
        let payload = age_filter_payload(&lyon(), true);
        assert_eq!(payload["age_filter_min"], 18);
        assert_eq!(payload["age_filter_max"], 25);
        assert_eq!(payload["auto_expansion"]["age_toggle"], true);
    }

    #[test]
    fn test_gender_payload() {
        let payload = gender_interest_payload(&lyon());
        assert_eq!(payload, json!({ "interested_in_genders": [1] }));
    }

    #[test]
    fn test_status_classification() {
        let unauthorized = ensure_success(TransportResponse::new(401, "nope")).unwrap_err();
        assert_eq!(unauthorized.kind(), ErrorKind::Fatal);

        let forbidden = ensure_success(TransportResponse::new(403, "")).unwrap_err();
        assert_eq!(forbidden.kind(), ErrorKind::Fatal);

        let throttled = ensure_success(TransportResponse::new(429, "")).unwrap_err();
        assert_eq!(throttled.kind(), ErrorKind::Transient);
        assert_eq!(throttled.status(), Some(429));

        let timeout = CallError::from(TransportError::Timeout("30s".into()));
        assert_eq!(timeout.kind(), ErrorKind::Transient);
        assert_eq!(timeout.status(), None);
    }
}
