//! Geolocation lookup providers.
//!
//! Each third-party service is described by a type implementing [`Provider`]:
//! a name, a URL builder, a success predicate over the parsed JSON body, and a
//! normalizer into [`LocationRecord`]. The [`ProviderRegistry`] holds the fixed
//! set shared by every call site, and the [`RotationSelector`] decides which
//! provider goes first.

mod ip_api_com;
mod ipapi_co;
mod ipinfo;
mod registry;
mod rotation;

use std::fmt;

use serde_json::Value;

use crate::error_handling::ProviderError;
use crate::models::LocationRecord;
use crate::validate::Ipv4;

pub use ip_api_com::IpApiCom;
pub use ipapi_co::IpApiCo;
pub use ipinfo::IpInfo;
pub use registry::ProviderRegistry;
pub use rotation::RotationSelector;

/// A third-party service that maps an IPv4 address to geolocation data.
///
/// Adding a provider means implementing this trait and appending the type to
/// the registry.
pub trait Provider: Send + Sync + fmt::Debug {
    /// Stable identifier, also stored in [`LocationRecord::provider`].
    fn name(&self) -> &'static str;

    /// Request URL for `ip`.
    fn url(&self, ip: &Ipv4) -> String;

    /// Whether the parsed body reports success.
    fn validate(&self, body: &Value) -> bool;

    /// Maps a successful body into the shared record schema.
    fn normalize(&self, body: &Value) -> Result<LocationRecord, ProviderError>;

    /// The provider's own explanation for a rejected body.
    fn rejection_reason(&self, body: &Value) -> String {
        rejection_reason(body)
    }
}

/// Picks the first usable of `error`, `message`, `reason` from a body.
///
/// `error` may be a string or an object carrying `message`/`title` (ipinfo.io),
/// or a bare `true` flag (ipapi.co), in which case the other fields are used.
pub(crate) fn rejection_reason(body: &Value) -> String {
    for key in ["error", "message", "reason"] {
        match body.get(key) {
            Some(Value::String(text)) if !text.is_empty() => return text.clone(),
            Some(Value::Object(map)) => {
                let nested = map
                    .get("message")
                    .or_else(|| map.get("title"))
                    .and_then(Value::as_str);
                if let Some(text) = nested {
                    return text.to_string();
                }
            }
            _ => {}
        }
    }
    "Unknown error".to_string()
}

/// JavaScript-style truthiness, which is how the providers' error flags behave.
pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Strips trailing slashes so URL templates can append `/{ip}`.
pub(crate) fn trim_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Field deserializer for provider responses: a value of the wrong type reads
/// as `None` instead of failing the whole body.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = <Value as serde::Deserialize>::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Deserializes a provider-specific response shape, mapping failures to a
/// normalization error for `provider`.
///
/// Response fields are declared with [`lenient`], so this only fails when the
/// body is not an object at all.
pub(crate) fn decode_body<T: serde::de::DeserializeOwned>(
    provider: &str,
    body: &Value,
) -> Result<T, ProviderError> {
    serde_json::from_value(body.clone()).map_err(|e| ProviderError::Normalization {
        provider: provider.to_string(),
        message: e.to_string(),
    })
}

/// Fails with a normalization error when the answered address is missing.
pub(crate) fn require_ip(provider: &str, ip: Option<String>) -> Result<String, ProviderError> {
    match ip {
        Some(ip) if !ip.is_empty() => Ok(ip),
        _ => Err(ProviderError::Normalization {
            provider: provider.to_string(),
            message: "response does not contain an IP address".to_string(),
        }),
    }
}

/// Treats empty strings as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
