//! The text-generation service: a provider plus per-call options.
//!
//! [`ProviderGenerator`] is the one place where timeouts and the mock
//! fallback are enforced. The refinement engine only sees the
//! `TextGenerator` trait and never retries.

use std::sync::Arc;
use std::time::Duration;

use altitude_core::error::ProviderError;
use altitude_core::message::Message;
use altitude_core::provider::{GenerationOptions, Provider, ProviderRequest, TextGenerator};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::mock::MockProvider;

const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Adapts a [`Provider`] to the [`TextGenerator`] contract.
pub struct ProviderGenerator {
    provider: Arc<dyn Provider>,
    model: String,
    mock: MockProvider,
}

impl ProviderGenerator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            mock: MockProvider::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, system: &str, user: &str, options: &GenerationOptions) -> ProviderRequest {
        ProviderRequest {
            model: self.model.clone(),
            messages: vec![Message::system(system), Message::user(user)],
            temperature: options.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: options.max_tokens,
        }
    }

    async fn call_provider(&self, request: ProviderRequest, options: &GenerationOptions) -> Result<String, ProviderError> {
        let call = self.provider.complete(request);
        let response = match options.timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), call)
                .await
                .map_err(|_| {
                    ProviderError::Timeout(format!(
                        "Provider '{}' timed out after {secs}s",
                        self.provider.name()
                    ))
                })??,
            None => call.await?,
        };
        Ok(response.message.content)
    }
}

#[async_trait]
impl TextGenerator for ProviderGenerator {
    fn name(&self) -> &str {
        self.provider.name()
    }

    async fn generate(
        &self,
        system: &str,
        user: &str,
        options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        let request = self.request(system, user, options);
        debug!(provider = %self.provider.name(), model = %self.model, "Generating text");

        match self.call_provider(request.clone(), options).await {
            Ok(text) => Ok(text),
            Err(e) if options.fallback_to_mock => {
                warn!(provider = %self.provider.name(), error = %e, "Provider failed, answering from mock");
                let response = self.mock.complete(request).await?;
                Ok(response.message.content)
            }
            Err(e) => Err(e),
        }
    }
}
