use serde::{Deserialize, Serialize};

/// Geolocation metadata for one IPv4 address, normalized from any provider.
///
/// Fields a provider does not report are `None`. Substituting "Unknown" is left
/// to the presentation layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocationRecord {
    pub ip: String,
    pub country_name: Option<String>,
    pub country_code: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub org: Option<String>,
    /// Name of the provider that produced this record
    pub provider: String,
    /// Autonomous system, e.g. "AS15169" or "AS15169 Google LLC"
    #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
    pub asn: Option<String>,
    #[serde(rename = "asname", default, skip_serializing_if = "Option::is_none")]
    pub as_name: Option<String>,
    /// Postal or ZIP code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosting: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threat: Option<String>,
}

impl LocationRecord {
    /// Creates a record with only the address and provider set.
    pub fn new(ip: impl Into<String>, provider: impl Into<String>) -> Self {
        LocationRecord {
            ip: ip.into(),
            provider: provider.into(),
            ..Default::default()
        }
    }

    /// Both coordinates, if the provider reported them.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}
