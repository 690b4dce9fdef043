use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Response structure for the `/get_timezone` endpoint
/// Only the `timezone` field is read, everything else is ignored
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct TimezoneResponse {
    /// IANA timezone name (e.g., "America/New_York"), absent when the service has none
    #[serde(default, deserialize_with = "string_or_absent")]
    pub timezone: Option<String>,
}

impl TimezoneResponse {
    /// Parse a response body.
    ///
    /// Any JSON document is accepted: a body that is not an object, or whose
    /// `timezone` is missing, `null` or not a string, yields an absent timezone.
    /// Only a body that is not JSON at all is an error.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(body)?;
        if value.is_object() {
            serde_json::from_value(value)
        } else {
            Ok(Self::default())
        }
    }

    /// Text to show in the display element.
    pub fn display_text(&self) -> &str {
        self.timezone.as_deref().unwrap_or_default()
    }
}

fn string_or_absent<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(name)) => Some(name),
        _ => None,
    })
}
