use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One element of `data.results` in a recommendation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecEnvelope {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub user: Option<RawProfile>,
}

impl RecEnvelope {
    /// Ads and promos share the results array with profiles
    pub fn is_user(&self) -> bool {
        self.kind.as_deref() == Some("user")
    }
}

/// Profile payload as returned by the recommendation endpoint
///
/// Every field degrades to its default when it is null or of an unexpected
/// type, so one bad field never costs the whole profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawProfile {
    #[serde(rename = "_id", default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub birth_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_photos")]
    pub photos: Vec<PhotoDescriptor>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhotoDescriptor {
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Non-array becomes empty; an unreadable entry still counts as a photo without a URL
fn lenient_photos<'de, D>(deserializer: D) -> Result<Vec<PhotoDescriptor>, D::Error>
where
    D: Deserializer<'de>,
{
    let photos = match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| PhotoDescriptor::deserialize(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    };
    Ok(photos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_and_mistyped_fields_degrade() {
        let profile: RawProfile = serde_json::from_value(json!({
            "_id": "keep",
            "name": null,
            "bio": 42,
            "birth_date": ["1999"],
            "photos": null
        }))
        .unwrap();

        assert_eq!(profile.id.as_deref(), Some("keep"));
        assert_eq!(profile.name, None);
        assert_eq!(profile.bio, None);
        assert_eq!(profile.birth_date, None);
        assert!(profile.photos.is_empty());
    }

    #[test]
    fn test_non_object_photo_entry_kept_without_url() {
        let profile: RawProfile = serde_json::from_value(json!({
            "_id": "p",
            "photos": [ "oops", { "url": 7 }, { "url": "https://p/1" } ]
        }))
        .unwrap();

        assert_eq!(profile.photos.len(), 3);
        assert_eq!(profile.photos[0].url, None);
        assert_eq!(profile.photos[1].url, None);
        assert_eq!(profile.photos[2].url.as_deref(), Some("https://p/1"));
    }

    #[test]
    fn test_mistyped_user_is_not_a_profile() {
        let envelope: RecEnvelope =
            serde_json::from_value(json!({ "type": "user", "user": "nope" })).unwrap();
        assert!(envelope.is_user());
        assert!(envelope.user.is_none());
    }
}
