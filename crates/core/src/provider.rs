//! Provider and text-generation traits — the abstraction over LLM backends.
//!
//! Two levels:
//! - [`Provider`] knows how to send a conversation to one LLM backend.
//! - [`TextGenerator`] is the capability the refinement engine consumes:
//!   "turn a system instruction and a user instruction into text". It is
//!   implemented on top of providers (with timeouts, fallback chains and an
//!   optional mock) in `altitude-providers`, and by hand in tests.

use crate::error::ProviderError;
use crate::message::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Configuration for a provider request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "anthropic/claude-sonnet-4", "gpt-4o")
    pub model: String,

    /// The conversation messages
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated message
    pub message: Message,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// Every LLM backend (OpenAI-compatible, Anthropic, mock) implements this
/// trait.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openrouter", "anthropic").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: ProviderRequest) -> std::result::Result<ProviderResponse, ProviderError>;
}

/// Per-call options for a [`TextGenerator`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Abort the call after this many seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Answer from a mock backend instead of failing when no provider works
    #[serde(default)]
    pub fallback_to_mock: bool,
}

/// The text-generation capability consumed by the refinement engine.
///
/// Implementations must return `Err` on transport, auth or timeout failure
/// rather than a sentinel string.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// A human-readable name for logging.
    fn name(&self) -> &str;

    /// Generate text for a system/user instruction pair.
    async fn generate(
        &self,
        system: &str,
        user: &str,
        options: &GenerationOptions,
    ) -> std::result::Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_request_defaults() {
        let req: ProviderRequest = serde_json::from_str(r#"{"model":"gpt-4o","messages":[]}"#).unwrap();
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
        assert!(req.max_tokens.is_none());
    }

    #[test]
    fn generation_options_default_has_no_mock() {
        let options = GenerationOptions::default();
        assert!(!options.fallback_to_mock);
        assert!(options.timeout_secs.is_none());
    }

    struct Echo;

    #[async_trait]
    impl TextGenerator for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(
            &self,
            _system: &str,
            user: &str,
            _options: &GenerationOptions,
        ) -> std::result::Result<String, ProviderError> {
            Ok(user.to_string())
        }
    }

    #[tokio::test]
    async fn text_generator_is_object_safe() {
        let generator: Box<dyn TextGenerator> = Box::new(Echo);
        let out = generator
            .generate("sys", "hello", &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(out, "hello");
        assert_eq!(generator.name(), "echo");
    }
}
