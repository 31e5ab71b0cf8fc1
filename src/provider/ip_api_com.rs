//! ip-api.com provider.

use serde::Deserialize;
use serde_json::Value;

use super::{decode_body, is_truthy, lenient, non_empty, require_ip, trim_base_url, Provider};
use crate::config::{IP_API_COM_BASE_URL, IP_API_COM_FIELDS};
use crate::error_handling::ProviderError;
use crate::models::LocationRecord;
use crate::validate::Ipv4;

const NAME: &str = "ip-api.com";

/// ip-api.com: success is signalled by `"status": "success"`; the answered
/// address is in `query`.
#[derive(Debug, Clone)]
pub struct IpApiCom {
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiComResponse {
    #[serde(default, deserialize_with = "lenient")]
    query: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    country: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    country_code: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    region_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    city: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    zip: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    lon: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    timezone: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    isp: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    org: Option<String>,
    #[serde(rename = "as", default, deserialize_with = "lenient")]
    asn: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    asname: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    mobile: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    proxy: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    hosting: Option<bool>,
}

impl IpApiCom {
    pub fn new() -> Self {
        Self::with_base_url(IP_API_COM_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        IpApiCom {
            base_url: trim_base_url(base_url),
        }
    }
}

impl Default for IpApiCom {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for IpApiCom {
    fn name(&self) -> &'static str {
        NAME
    }

    fn url(&self, ip: &Ipv4) -> String {
        format!("{}/json/{}?fields={}", self.base_url, ip, IP_API_COM_FIELDS)
    }

    fn validate(&self, body: &Value) -> bool {
        body.get("status").and_then(Value::as_str) == Some("success")
            && is_truthy(body.get("query"))
    }

    fn normalize(&self, body: &Value) -> Result<LocationRecord, ProviderError> {
        let data: IpApiComResponse = decode_body(NAME, body)?;

        Ok(LocationRecord {
            ip: require_ip(NAME, data.query)?,
            country_name: non_empty(data.country),
            country_code: non_empty(data.country_code),
            region: non_empty(data.region_name),
            city: non_empty(data.city),
            latitude: data.lat,
            longitude: data.lon,
            timezone: non_empty(data.timezone),
            org: non_empty(data.org).or_else(|| non_empty(data.isp)),
            asn: non_empty(data.asn),
            as_name: non_empty(data.asname),
            postal: non_empty(data.zip),
            mobile: data.mobile,
            proxy: data.proxy,
            hosting: data.hosting,
            ..LocationRecord::new(String::new(), NAME)
        })
    }
}
