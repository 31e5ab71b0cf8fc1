//! ipinfo.io provider.

use serde::Deserialize;
use serde_json::Value;

use super::{decode_body, is_truthy, lenient, non_empty, require_ip, trim_base_url, Provider};
use crate::config::IPINFO_BASE_URL;
use crate::error_handling::ProviderError;
use crate::models::LocationRecord;
use crate::validate::Ipv4;

const NAME: &str = "ipinfo.io";

/// ipinfo.io: success is an `ip` field without an `error` field. Coordinates
/// arrive as a single `"lat,lon"` string.
#[derive(Debug, Clone)]
pub struct IpInfo {
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    #[serde(default, deserialize_with = "lenient")]
    ip: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    city: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    region: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    country: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    loc: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    org: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    postal: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    timezone: Option<String>,
}

impl IpInfo {
    pub fn new() -> Self {
        Self::with_base_url(IPINFO_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        IpInfo {
            base_url: trim_base_url(base_url),
        }
    }
}

impl Default for IpInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits `"37.4056,-122.0775"` into two coordinates. Either half that does
/// not parse is left unset.
fn parse_loc(loc: Option<&str>) -> (Option<f64>, Option<f64>) {
    let Some(loc) = loc else {
        return (None, None);
    };
    let mut halves = loc.splitn(2, ',');
    let lat = halves.next().and_then(|s| s.trim().parse::<f64>().ok());
    let lon = halves.next().and_then(|s| s.trim().parse::<f64>().ok());
    (lat, lon)
}

impl Provider for IpInfo {
    fn name(&self) -> &'static str {
        NAME
    }

    fn url(&self, ip: &Ipv4) -> String {
        format!("{}/{}/json", self.base_url, ip)
    }

    fn validate(&self, body: &Value) -> bool {
        !is_truthy(body.get("error")) && is_truthy(body.get("ip"))
    }

    fn normalize(&self, body: &Value) -> Result<LocationRecord, ProviderError> {
        let data: IpInfoResponse = decode_body(NAME, body)?;
        let (latitude, longitude) = parse_loc(data.loc.as_deref());
        let country = non_empty(data.country);

        Ok(LocationRecord {
            ip: require_ip(NAME, data.ip)?,
            // ipinfo.io only reports the ISO code
            country_name: country.clone(),
            country_code: country,
            region: non_empty(data.region),
            city: non_empty(data.city),
            latitude,
            longitude,
            timezone: non_empty(data.timezone),
            org: non_empty(data.org),
            postal: non_empty(data.postal),
            ..LocationRecord::new(String::new(), NAME)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "ip": "8.8.8.8",
            "hostname": "dns.google",
            "city": "Mountain View",
            "region": "California",
            "country": "US",
            "loc": "37.4056,-122.0775",
            "org": "AS15169 Google LLC",
            "postal": "94043",
            "timezone": "America/Los_Angeles"
        })
    }

    #[test]
    fn test_url_template() {
        let ip: Ipv4 = "8.8.8.8".parse().expect("valid ip");
        assert_eq!(IpInfo::new().url(&ip), "https://ipinfo.io/8.8.8.8/json");
        assert_eq!(
            IpInfo::with_base_url("http://localhost:1234/").url(&ip),
            "http://localhost:1234/8.8.8.8/json"
        );
    }

    #[test]
    fn test_validate() {
        let provider = IpInfo::new();
        assert!(provider.validate(&sample()));
        assert!(!provider.validate(&json!({"error": {"title": "Wrong ip"}})));
        assert!(!provider.validate(&json!({"ip": "8.8.8.8", "error": "x"})));
        assert!(!provider.validate(&json!({"city": "Nowhere"})));
    }

    #[test]
    fn test_normalize_splits_loc() {
        let record = IpInfo::new().normalize(&sample()).expect("normalizes");
        assert_eq!(record.ip, "8.8.8.8");
        assert_eq!(record.country_code.as_deref(), Some("US"));
        assert_eq!(record.country_name.as_deref(), Some("US"));
        assert_eq!(record.latitude, Some(37.4056));
        assert_eq!(record.longitude, Some(-122.0775));
        assert_eq!(record.postal.as_deref(), Some("94043"));
        assert_eq!(record.org.as_deref(), Some("AS15169 Google LLC"));
        assert_eq!(record.provider, "ipinfo.io");
        assert_eq!(record.asn, None);
    }

    #[test]
    fn test_normalize_tolerates_bad_loc() {
        let body = json!({"ip": "10.0.0.1", "bogon": true, "loc": "garbage"});
        let record = IpInfo::new().normalize(&body).expect("normalizes");
        assert_eq!(record.latitude, None);
        assert_eq!(record.longitude, None);
        assert_eq!(record.country_code, None);
    }

    #[test]
    fn test_normalize_ignores_mistyped_optional_fields() {
        let mut body = sample();
        body["postal"] = json!(94043);
        body["loc"] = json!([37.4, -122.0]);
        body["org"] = json!({"name": "Google"});
        let record = IpInfo::new().normalize(&body).expect("normalizes");
        assert_eq!(record.ip, "8.8.8.8");
        assert_eq!(record.postal, None);
        assert_eq!(record.latitude, None);
        assert_eq!(record.org, None);
        assert_eq!(record.city.as_deref(), Some("Mountain View"));
    }

    #[test]
    fn test_normalize_requires_ip() {
        let err = IpInfo::new()
            .normalize(&json!({"city": "Paris"}))
            .expect_err("missing ip");
        assert!(matches!(err, ProviderError::Normalization { .. }));
    }

    #[test]
    fn test_parse_loc_halves() {
        assert_eq!(parse_loc(Some("1.5,2.5")), (Some(1.5), Some(2.5)));
        assert_eq!(parse_loc(Some(",")), (None, None));
        assert_eq!(parse_loc(Some("1.5")), (Some(1.5), None));
        assert_eq!(parse_loc(None), (None, None));
    }
}
