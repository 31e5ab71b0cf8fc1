//! The shared, read-only list of lookup providers.

use std::sync::Arc;

use super::{IpApiCo, IpApiCom, IpInfo, Provider};
use crate::config::ProviderUrls;
use crate::error_handling::InitializationError;

/// Ordered set of providers. The order defines the rotation sequence.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Builds a registry from an explicit provider list.
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Self {
        ProviderRegistry { providers }
    }

    /// Builds the standard registry, replacing base URLs where `urls` has an
    /// override.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::ProviderUrlError` if an override is not an
    /// absolute http(s) URL.
    pub fn with_urls(urls: &ProviderUrls) -> Result<Self, InitializationError> {
        let ipinfo = match urls.ipinfo.as_deref() {
            Some(url) => IpInfo::with_base_url(checked_base_url(url)?),
            None => IpInfo::new(),
        };
        let ipapi_co = match urls.ipapi_co.as_deref() {
            Some(url) => IpApiCo::with_base_url(checked_base_url(url)?),
            None => IpApiCo::new(),
        };
        let ip_api_com = match urls.ip_api_com.as_deref() {
            Some(url) => IpApiCom::with_base_url(checked_base_url(url)?),
            None => IpApiCom::new(),
        };

        Ok(Self::new(vec![
            Arc::new(ipinfo),
            Arc::new(ipapi_co),
            Arc::new(ip_api_com),
        ]))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Provider at `index` in rotation order.
    pub fn get(&self, index: usize) -> Option<&Arc<dyn Provider>> {
        self.providers.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Provider>> {
        self.providers.iter()
    }

    /// Provider names in rotation order.
    pub fn names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }
}

impl Default for ProviderRegistry {
    /// ipinfo.io, ipapi.co, ip-api.com against their public endpoints.
    fn default() -> Self {
        Self::new(vec![
            Arc::new(IpInfo::new()),
            Arc::new(IpApiCo::new()),
            Arc::new(IpApiCom::new()),
        ])
    }
}

fn checked_base_url(raw: &str) -> Result<&str, InitializationError> {
    let parsed = url::Url::parse(raw).map_err(|e| InitializationError::ProviderUrlError {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(raw),
        other => Err(InitializationError::ProviderUrlError {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}
