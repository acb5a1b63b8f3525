//! Ordered provider chain: the default provider first, then the configured
//! fallbacks, each attempt bounded by the same refinement timeout.

use std::sync::Arc;
use std::time::Duration;

use altitude_core::error::ProviderError;
use altitude_core::provider::{Provider, ProviderRequest, ProviderResponse};
use async_trait::async_trait;
use tracing::{info, warn};

/// A provider that tries each link in order until one answers.
pub struct ProviderChain {
    links: Vec<Arc<dyn Provider>>,
    timeout: Duration,
}

impl ProviderChain {
    pub fn new(timeout: Duration) -> Self {
        Self {
            links: Vec::new(),
            timeout,
        }
    }

    /// Append `provider` unless a provider with the same name is already
    /// linked.
    pub fn push(&mut self, provider: Arc<dyn Provider>) -> bool {
        if self.links.iter().any(|p| p.name() == provider.name()) {
            return false;
        }
        self.links.push(provider);
        true
    }

    /// Names of the linked providers, in attempt order.
    pub fn names(&self) -> Vec<&str> {
        self.links.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    async fn attempt(&self, provider: &dyn Provider, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        tokio::time::timeout(self.timeout, provider.complete(request))
            .await
            .unwrap_or_else(|_| {
                Err(ProviderError::Timeout(format!(
                    "Provider '{}' timed out after {}s",
                    provider.name(),
                    self.timeout.as_secs()
                )))
            })
    }
}

#[async_trait]
impl Provider for ProviderChain {
    fn name(&self) -> &str {
        "chain"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut failures = Vec::new();
        let mut last_error = ProviderError::NotConfigured("No providers in chain".into());

        for (i, provider) in self.links.iter().enumerate() {
            match self.attempt(provider.as_ref(), request.clone()).await {
                Ok(response) => {
                    if i > 0 {
                        info!(provider = %provider.name(), attempt = i + 1, "Chain answered from fallback provider");
                    }
                    return Ok(response);
                }
                Err(e) => {
                    warn!(provider = %provider.name(), error = %e, "Chain link failed, trying next");
                    failures.push(provider.name().to_string());
                    last_error = e;
                }
            }
        }

        if !failures.is_empty() {
            warn!(failed = ?failures, "Every provider in the chain failed");
        }
        Err(last_error)
    }
}
