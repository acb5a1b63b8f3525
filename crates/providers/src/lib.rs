//! Text-generation providers for Altitude.
//!
//! All backends implement `altitude_core::Provider`. The router selects the
//! configured one, and [`ProviderGenerator`] wraps it into the
//! `altitude_core::TextGenerator` capability the refinement engine consumes.

pub mod anthropic;
pub mod chain;
pub mod mock;
pub mod openai_compat;
pub mod router;
pub mod service;

pub use anthropic::AnthropicProvider;
pub use chain::ProviderChain;
pub use mock::MockProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::ProviderRouter;
pub use service::ProviderGenerator;

use altitude_core::error::ProviderError;

/// Seconds a single HTTP request may take before reqwest gives up.
///
/// The refinement timeout is enforced above this, in the service or chain.
const HTTP_TIMEOUT_SECS: u64 = 120;

/// Build the shared HTTP client.
///
/// Falls back to reqwest's default client if the builder fails (it only
/// fails when the TLS backend cannot initialize).
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to build HTTP client, using defaults");
            reqwest::Client::new()
        })
}

/// Send `request` and map every non-200 answer to a [`ProviderError`].
pub(crate) async fn send_checked(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::Network(format!("{provider}: {e}")))?;

    let status = response.status().as_u16();
    if status == 200 {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(provider, status, body = %body, "Provider returned error");
    Err(status_error(provider, status, body))
}

fn status_error(provider: &str, status: u16, body: String) -> ProviderError {
    match status {
        429 => ProviderError::RateLimited { retry_after_secs: 5 },
        401 | 403 => ProviderError::AuthenticationFailed(format!(
            "{provider} rejected the API key (status {status})"
        )),
        _ => ProviderError::ApiError {
            status_code: status,
            message: body,
        },
    }
}

/// Decode a 200 response body, reporting shape mismatches as API errors.
pub(crate) async fn decode<T: serde::de::DeserializeOwned>(
    provider: &str,
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    response.json().await.map_err(|e| ProviderError::ApiError {
        status_code: 200,
        message: format!("Failed to parse {provider} response: {e}"),
    })
}
