//! Multi-provider resolution of an IPv4 address to a location record.
//!
//! One resolution tries the rotation-selected primary provider and, if that
//! attempt fails for any reason, every other provider once in a random order,
//! stopping at the first success. There is no backoff, no delay between
//! attempts, and no retry against the same provider.
//!
//! Concurrent resolutions of the same address are coalesced: the first caller
//! starts the provider attempts and later callers await the same outcome.

mod fetch;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, info, warn};

use crate::config::Config;
use crate::error_handling::{InitializationError, ResolutionError, ResolutionStats};
use crate::initialization::init_client;
use crate::models::LocationRecord;
use crate::provider::{ProviderRegistry, RotationSelector};
use crate::validate::Ipv4;

pub use fetch::fetch_and_normalize;

type SharedResolution = Shared<BoxFuture<'static, Result<LocationRecord, ResolutionError>>>;

/// Resolves addresses against a provider registry.
///
/// Cloning is cheap and clones share the rotation cursor, the in-flight map,
/// and the statistics.
#[derive(Clone)]
pub struct Resolver {
    inner: Arc<ResolverInner>,
}

struct ResolverInner {
    client: reqwest::Client,
    registry: Arc<ProviderRegistry>,
    selector: Mutex<RotationSelector>,
    in_flight: Mutex<HashMap<Ipv4, SharedResolution>>,
    stats: Arc<ResolutionStats>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl Resolver {
    /// Creates a resolver using `selector` for rotation and fallback order.
    pub fn new(client: reqwest::Client, selector: RotationSelector) -> Self {
        let registry = Arc::clone(selector.registry());
        Resolver {
            inner: Arc::new(ResolverInner {
                client,
                registry,
                selector: Mutex::new(selector),
                in_flight: Mutex::new(HashMap::new()),
                stats: Arc::new(ResolutionStats::new()),
            }),
        }
    }

    /// Builds the HTTP client, registry, and selector described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or a provider URL
    /// override is invalid.
    pub fn from_config(config: &Config) -> Result<Self, InitializationError> {
        let client = init_client(config)?;
        let registry = Arc::new(ProviderRegistry::with_urls(&config.provider_urls)?);
        let selector = match config.fallback_seed {
            Some(seed) => RotationSelector::seeded(registry, seed),
            None => RotationSelector::new(registry),
        };
        Ok(Self::new(client, selector))
    }

    /// The providers this resolver rotates over.
    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.inner.registry
    }

    /// Attempt statistics accumulated by this resolver and its clones.
    pub fn stats(&self) -> &Arc<ResolutionStats> {
        &self.inner.stats
    }

    /// Resolves `ip` to a location record.
    ///
    /// # Errors
    ///
    /// - `ResolutionError::InvalidInput` if `ip` is not a canonical IPv4
    ///   address (no provider is contacted)
    /// - `ResolutionError::AllProvidersFailed` with the last provider failure
    ///   if every provider failed
    pub async fn resolve(&self, ip: &str) -> Result<LocationRecord, ResolutionError> {
        let ip: Ipv4 = ip.parse()?;
        self.resolve_ipv4(&ip).await
    }

    /// Resolves an already validated address.
    pub async fn resolve_ipv4(&self, ip: &Ipv4) -> Result<LocationRecord, ResolutionError> {
        self.resolve_shared(ip, false).await
    }

    /// Resolves `ip` after moving the rotation cursor one extra step, so the
    /// primary differs from the one the next plain resolution would use.
    pub async fn resolve_with_next_provider(
        &self,
        ip: &Ipv4,
    ) -> Result<LocationRecord, ResolutionError> {
        self.resolve_shared(ip, true).await
    }

    async fn resolve_shared(
        &self,
        ip: &Ipv4,
        skip_one: bool,
    ) -> Result<LocationRecord, ResolutionError> {
        let shared = {
            let mut in_flight = lock(&self.inner.in_flight);
            match in_flight.get(ip) {
                Some(existing) => {
                    debug!("Joining in-flight resolution for {}", ip);
                    existing.clone()
                }
                None => {
                    let inner = Arc::clone(&self.inner);
                    let key = ip.clone();
                    let resolution = async move {
                        let result = inner.run(&key, skip_one).await;
                        lock(&inner.in_flight).remove(&key);
                        result
                    }
                    .boxed()
                    .shared();
                    in_flight.insert(ip.clone(), resolution.clone());
                    resolution
                }
            }
        };
        shared.await
    }
}

impl ResolverInner {
    async fn run(&self, ip: &Ipv4, skip_one: bool) -> Result<LocationRecord, ResolutionError> {
        let primary = {
            let mut selector = lock(&self.selector);
            if skip_one {
                selector.skip();
            }
            selector.next()
        };
        let primary = primary.ok_or(ResolutionError::NoProviders)?;

        debug!("Resolving {} with primary provider {}", ip, primary.name());
        let mut last = match fetch_and_normalize(&self.client, primary.as_ref(), ip).await {
            Ok(record) => {
                self.stats.record_success(false);
                return Ok(record);
            }
            Err(e) => {
                warn!("Primary provider failed for {}: {}", ip, e);
                self.stats.record_failure(&e);
                e
            }
        };

        let fallback = lock(&self.selector).shuffled_except(primary.name());
        let mut attempts = 1;
        for provider in fallback {
            attempts += 1;
            info!("Falling back to {} for {}", provider.name(), ip);
            match fetch_and_normalize(&self.client, provider.as_ref(), ip).await {
                Ok(record) => {
                    self.stats.record_success(true);
                    return Ok(record);
                }
                Err(e) => {
                    warn!("Fallback provider failed for {}: {}", ip, e);
                    self.stats.record_failure(&e);
                    last = e;
                }
            }
        }

        self.stats.record_exhausted();
        warn!("All {} providers failed for {}", attempts, ip);
        Err(ResolutionError::AllProvidersFailed { attempts, last })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> Resolver {
        let registry = Arc::new(ProviderRegistry::default());
        Resolver::new(reqwest::Client::new(), RotationSelector::seeded(registry, 3))
    }

    #[tokio::test]
    async fn test_invalid_input_contacts_no_provider() {
        let resolver = resolver();
        let err = resolver.resolve("192.168.01.1").await.expect_err("invalid");
        assert_eq!(err, ResolutionError::InvalidInput("192.168.01.1".to_string()));
        assert_eq!(resolver.stats().total_errors(), 0);
        assert_eq!(lock(&resolver.inner.selector).cursor(), 0);
    }

    #[tokio::test]
    async fn test_empty_registry_fails_without_attempts() {
        let registry = Arc::new(ProviderRegistry::new(vec![]));
        let resolver = Resolver::new(reqwest::Client::new(), RotationSelector::seeded(registry, 1));
        let err = resolver.resolve("1.1.1.1").await.expect_err("no providers");
        assert_eq!(err, ResolutionError::NoProviders);
        assert!(lock(&resolver.inner.in_flight).is_empty());
    }

    #[test]
    fn test_from_config_rejects_bad_provider_url() {
        let mut config = Config::default();
        config.provider_urls.ipinfo = Some("::nope".to_string());
        assert!(Resolver::from_config(&config).is_err());
    }
}
