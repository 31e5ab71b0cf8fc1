// Shared mock providers for integration tests.
//
// Each provider gets its own wiremock server; the registry keeps the standard
// rotation order (ipinfo.io, ipapi.co, ip-api.com).

use std::sync::{Arc, Mutex};

use ipeed::provider::{ProviderRegistry, RotationSelector};
use ipeed::{ProviderUrls, Resolver};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate, Times};

pub struct MockProviders {
    pub ipinfo: MockServer,
    pub ipapi_co: MockServer,
    pub ip_api_com: MockServer,
}

#[allow(dead_code)]
impl MockProviders {
    pub async fn start() -> Self {
        MockProviders {
            ipinfo: MockServer::start().await,
            ipapi_co: MockServer::start().await,
            ip_api_com: MockServer::start().await,
        }
    }

    pub fn urls(&self) -> ProviderUrls {
        ProviderUrls {
            ipinfo: Some(self.ipinfo.uri()),
            ipapi_co: Some(self.ipapi_co.uri()),
            ip_api_com: Some(self.ip_api_com.uri()),
        }
    }

    pub fn resolver(&self, seed: u64) -> Resolver {
        let registry =
            Arc::new(ProviderRegistry::with_urls(&self.urls()).expect("mock urls are valid"));
        Resolver::new(reqwest::Client::new(), RotationSelector::seeded(registry, seed))
    }

    /// Mounts a response for `ip` on ipinfo.io's lookup path.
    pub async fn ipinfo_responds(
        &self,
        ip: &str,
        response: impl Respond + 'static,
        times: impl Into<Times>,
    ) {
        Mock::given(method("GET"))
            .and(path(format!("/{}/json", ip)))
            .respond_with(response)
            .expect(times)
            .mount(&self.ipinfo)
            .await;
    }

    pub async fn ipapi_co_responds(
        &self,
        ip: &str,
        response: impl Respond + 'static,
        times: impl Into<Times>,
    ) {
        Mock::given(method("GET"))
            .and(path(format!("/{}/json/", ip)))
            .respond_with(response)
            .expect(times)
            .mount(&self.ipapi_co)
            .await;
    }

    pub async fn ip_api_com_responds(
        &self,
        ip: &str,
        response: impl Respond + 'static,
        times: impl Into<Times>,
    ) {
        Mock::given(method("GET"))
            .and(path(format!("/json/{}", ip)))
            .respond_with(response)
            .expect(times)
            .mount(&self.ip_api_com)
            .await;
    }
}

/// Provider names in the order their servers received requests.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct RequestLog(Arc<Mutex<Vec<&'static str>>>);

#[allow(dead_code)]
impl RequestLog {
    /// Wraps `response` so that every request it answers is logged as `name`.
    pub fn recording(&self, name: &'static str, response: ResponseTemplate) -> Recorded {
        Recorded {
            name,
            log: self.clone(),
            response,
        }
    }

    pub fn order(&self) -> Vec<&'static str> {
        self.0.lock().expect("request log poisoned").clone()
    }
}

/// A responder that appends its provider name to a [`RequestLog`].
#[allow(dead_code)]
pub struct Recorded {
    name: &'static str,
    log: RequestLog,
    response: ResponseTemplate,
}

impl Respond for Recorded {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.log
            .0
            .lock()
            .expect("request log poisoned")
            .push(self.name);
        self.response.clone()
    }
}

pub fn ok(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

pub fn ipinfo_body(ip: &str) -> Value {
    json!({
        "ip": ip,
        "city": "Mountain View",
        "region": "California",
        "country": "US",
        "loc": "37.4056,-122.0775",
        "org": "AS15169 Google LLC",
        "postal": "94043",
        "timezone": "America/Los_Angeles"
    })
}

pub fn ipapi_co_body(ip: &str) -> Value {
    json!({
        "ip": ip,
        "city": "Mountain View",
        "region": "California",
        "country_name": "United States",
        "country_code": "US",
        "latitude": 37.42,
        "longitude": -122.08,
        "timezone": "America/Los_Angeles",
        "asn": "AS15169",
        "org": "GOOGLE",
        "currency": "USD",
        "languages": "en-US,es-US,haw,fr"
    })
}

pub fn ip_api_com_body(ip: &str) -> Value {
    json!({
        "status": "success",
        "query": ip,
        "country": "United States",
        "countryCode": "US",
        "regionName": "Virginia",
        "city": "Ashburn",
        "lat": 39.03,
        "lon": -77.5,
        "timezone": "America/New_York",
        "isp": "Google LLC",
        "org": "Google Public DNS",
        "as": "AS15169 Google LLC",
        "asname": "GOOGLE",
        "hosting": true
    })
}
