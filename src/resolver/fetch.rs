//! A single provider attempt: request, parse, validate, normalize, verify.

use serde_json::Value;

use crate::error_handling::{status_error, transport_error, ProviderError};
use crate::models::LocationRecord;
use crate::provider::Provider;
use crate::validate::Ipv4;

/// Queries `provider` for `ip` and returns its normalized record.
///
/// The steps fail in order with:
/// 1. `Transport`: the request failed or the status was not 2xx
/// 2. `Parse`: the body was not JSON
/// 3. `Rejected`: the provider's success predicate did not hold
/// 4. `Normalization`: the record's address could not be recovered
/// 5. `IdentityMismatch`: the record is for a different address
pub async fn fetch_and_normalize(
    client: &reqwest::Client,
    provider: &dyn Provider,
    ip: &Ipv4,
) -> Result<LocationRecord, ProviderError> {
    let name = provider.name();
    let url = provider.url(ip);
    log::debug!("Requesting {}", url);

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| transport_error(name, &e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(status_error(name, status));
    }

    let body = response
        .text()
        .await
        .map_err(|e| transport_error(name, &e))?;

    let data: Value = serde_json::from_str(&body).map_err(|e| ProviderError::Parse {
        provider: name.to_string(),
        message: e.to_string(),
    })?;

    if !provider.validate(&data) {
        return Err(ProviderError::Rejected {
            provider: name.to_string(),
            reason: provider.rejection_reason(&data),
        });
    }

    let record = provider.normalize(&data)?;

    if record.ip != ip.as_str() {
        return Err(ProviderError::IdentityMismatch {
            provider: name.to_string(),
            requested: ip.to_string(),
            returned: record.ip,
        });
    }

    Ok(record)
}
