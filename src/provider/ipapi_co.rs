//! ipapi.co provider.

use serde::Deserialize;
use serde_json::Value;

use super::{decode_body, is_truthy, lenient, non_empty, require_ip, trim_base_url, Provider};
use crate::config::IPAPI_CO_BASE_URL;
use crate::error_handling::ProviderError;
use crate::models::LocationRecord;
use crate::validate::Ipv4;

const NAME: &str = "ipapi.co";

/// ipapi.co: failures come back as `{"error": true, "reason": ...}`, often
/// with HTTP 200.
#[derive(Debug, Clone)]
pub struct IpApiCo {
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct IpApiCoResponse {
    #[serde(default, deserialize_with = "lenient")]
    ip: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    city: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    region: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    country_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    country_code: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    postal: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    timezone: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    currency: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    languages: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    asn: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    org: Option<String>,
}

impl IpApiCo {
    pub fn new() -> Self {
        Self::with_base_url(IPAPI_CO_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        IpApiCo {
            base_url: trim_base_url(base_url),
        }
    }
}

impl Default for IpApiCo {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for IpApiCo {
    fn name(&self) -> &'static str {
        NAME
    }

    fn url(&self, ip: &Ipv4) -> String {
        format!("{}/{}/json/", self.base_url, ip)
    }

    fn validate(&self, body: &Value) -> bool {
        !is_truthy(body.get("error")) && is_truthy(body.get("ip"))
    }

    fn normalize(&self, body: &Value) -> Result<LocationRecord, ProviderError> {
        let data: IpApiCoResponse = decode_body(NAME, body)?;
        let org = non_empty(data.org);

        Ok(LocationRecord {
            ip: require_ip(NAME, data.ip)?,
            country_name: non_empty(data.country_name),
            country_code: non_empty(data.country_code),
            region: non_empty(data.region),
            city: non_empty(data.city),
            latitude: data.latitude,
            longitude: data.longitude,
            timezone: non_empty(data.timezone),
            org: org.clone(),
            asn: non_empty(data.asn),
            as_name: org,
            postal: non_empty(data.postal),
            currency: non_empty(data.currency),
            languages: non_empty(data.languages),
            ..LocationRecord::new(String::new(), NAME)
        })
    }
}
