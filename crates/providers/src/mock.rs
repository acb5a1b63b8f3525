//! Offline stand-in used when no real provider can answer.
//!
//! The mock never pretends to refine anything: its reply is a plain notice
//! that does not decode as a refinement, so callers that parse structured
//! replies fall through to their own local handling.

use altitude_core::error::ProviderError;
use altitude_core::message::Message;
use altitude_core::provider::*;
use async_trait::async_trait;

pub const MOCK_NOTICE: &str =
    "[mock] No text-generation provider is reachable; this reply was produced offline.";

/// A provider that answers every request with [`MOCK_NOTICE`].
#[derive(Debug, Default)]
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl altitude_core::Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        Ok(ProviderResponse {
            message: Message::assistant(MOCK_NOTICE),
            usage: None,
            model: request.model,
        })
    }
}
