//! Provider router — selects the correct LLM provider based on config.
//!
//! Handles provider creation and assembles the fallback chain that backs the
//! text-generation service.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use altitude_config::AppConfig;
use altitude_core::provider::Provider;

use crate::anthropic::AnthropicProvider;
use crate::chain::ProviderChain;
use crate::mock::MockProvider;
use crate::openai_compat::OpenAiCompatProvider;
use crate::service::ProviderGenerator;

/// Routes LLM requests to the correct provider.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// List all registered provider names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// The default provider followed by `fallbacks`, as one chain.
    ///
    /// Unknown and repeated names are skipped.
    pub fn chain(&self, fallbacks: &[String], timeout: Duration) -> ProviderChain {
        let mut chain = ProviderChain::new(timeout);
        let names = std::iter::once(&self.default_provider).chain(fallbacks.iter());
        for name in names {
            match self.get(name) {
                Some(provider) => {
                    chain.push(provider);
                }
                None => tracing::warn!(provider = %name, "Unknown provider in fallback chain, skipping"),
            }
        }
        chain
    }
}

/// Build providers from configuration.
pub fn build_from_config(config: &AppConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new(&config.default_provider);

    for (name, provider_config) in &config.providers {
        let api_key = provider_config
            .api_key
            .clone()
            .or_else(|| config.api_key.clone())
            .unwrap_or_default();

        let base_url = provider_config
            .api_url
            .clone()
            .unwrap_or_else(|| default_base_url(name));

        router.register(name.clone(), build_provider(name, &api_key, Some(&base_url)));
    }

    // The default and fallback providers exist even when not configured explicitly.
    let api_key = config.api_key.clone().unwrap_or_default();
    for name in std::iter::once(&config.default_provider).chain(&config.fallback_providers) {
        if router.get(name).is_none() {
            router.register(name.clone(), build_provider(name, &api_key, None));
        }
    }

    router.register("mock", Arc::new(MockProvider::new()));
    router
}

/// Build the text-generation service described by `config`.
pub fn build_generator(config: &AppConfig) -> ProviderGenerator {
    let router = build_from_config(config);
    let timeout = Duration::from_secs(config.refinement.timeout_secs);
    let provider = if config.fallback_providers.is_empty() {
        router
            .default()
            .unwrap_or_else(|| Arc::new(MockProvider::new()))
    } else {
        Arc::new(router.chain(&config.fallback_providers, timeout))
    };
    let model = config
        .providers
        .get(&config.default_provider)
        .and_then(|p| p.default_model.clone())
        .unwrap_or_else(|| config.default_model.clone());
    ProviderGenerator::new(provider, model)
}

fn build_provider(name: &str, api_key: &str, base_url: Option<&str>) -> Arc<dyn Provider> {
    match name {
        "anthropic" => {
            let provider = AnthropicProvider::new(api_key);
            match base_url {
                Some(url) if url != crate::anthropic::DEFAULT_BASE_URL => Arc::new(provider.with_base_url(url)),
                _ => Arc::new(provider),
            }
        }
        "mock" => Arc::new(MockProvider::new()),
        _ => {
            let url = base_url.map(String::from).unwrap_or_else(|| default_base_url(name));
            Arc::new(OpenAiCompatProvider::new(name, url, api_key))
        }
    }
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "anthropic" => crate::anthropic::DEFAULT_BASE_URL.into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "deepseek" => "https://api.deepseek.com/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "fireworks" => "https://api.fireworks.ai/inference/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}
