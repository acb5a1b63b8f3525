//! Configuration loading, validation, and management for Altitude.
//!
//! Loads configuration from `~/.altitude/config.toml` with environment
//! variable overrides. Validates all settings at load time.

use altitude_core::GenerationOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.altitude/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Providers tried, in order, after the default one fails
    #[serde(default)]
    pub fallback_providers: Vec<String>,

    /// Refinement call settings
    #[serde(default)]
    pub refinement: RefinementConfig,

    /// Template settings
    #[serde(default)]
    pub templates: TemplatesConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

const ENV_API_KEYS: [&str; 3] = ["ALTITUDE_API_KEY", "OPENROUTER_API_KEY", "OPENAI_API_KEY"];

fn default_provider() -> String {
    "openrouter".into()
}
fn default_model() -> String {
    "anthropic/claude-sonnet-4".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("fallback_providers", &self.fallback_providers)
            .field("refinement", &self.refinement)
            .field("templates", &self.templates)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// Settings for each call to the text-generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinementConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Overrides `default_max_tokens` for refinement calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Overrides `default_temperature` for refinement calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Answer from the mock provider when every real provider fails
    #[serde(default = "default_true")]
    pub fallback_to_mock: bool,
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_tokens: None,
            temperature: None,
            fallback_to_mock: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatesConfig {
    /// Directory of extra blueprints (`*.json`, `*.toml`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,

    /// Template used when none is requested
    #[serde(default = "default_template")]
    pub default: String,
}

fn default_template() -> String {
    "altitude".into()
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: None,
            default: default_template(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load `~/.altitude/config.toml`, then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_dir().join("config.toml"))?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override settings from the environment.
    ///
    /// The API key is taken from the first of `ALTITUDE_API_KEY`,
    /// `OPENROUTER_API_KEY` and `OPENAI_API_KEY` that is set, unless the file
    /// already carries one. `ALTITUDE_PROVIDER` and `ALTITUDE_MODEL` always
    /// win over the file.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = ENV_API_KEYS.iter().find_map(|key| lookup(*key));
        }
        if let Some(provider) = lookup("ALTITUDE_PROVIDER") {
            self.default_provider = provider;
        }
        if let Some(model) = lookup("ALTITUDE_MODEL") {
            self.default_model = model;
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".altitude")
    }

    /// Directory searched for extra blueprints.
    pub fn templates_dir(&self) -> PathBuf {
        match &self.templates.dir {
            Some(dir) => PathBuf::from(dir),
            None => Self::config_dir().join("templates"),
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let temperatures = [Some(self.default_temperature), self.refinement.temperature];
        if temperatures.iter().flatten().any(|t| !(0.0..=2.0).contains(t)) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.refinement.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "refinement.timeout_secs must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Per-call options for the text-generation service.
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            timeout_secs: Some(self.refinement.timeout_secs),
            max_tokens: Some(self.refinement.max_tokens.unwrap_or(self.default_max_tokens)),
            temperature: Some(self.refinement.temperature.unwrap_or(self.default_temperature)),
            fallback_to_mock: self.refinement.fallback_to_mock,
        }
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            fallback_providers: vec![],
            refinement: RefinementConfig::default(),
            templates: TemplatesConfig::default(),
            providers: HashMap::new(),
        }
    }
}

fn dirs_home() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.default_provider, "openrouter");
        assert_eq!(config.templates.default, "altitude");
        assert!(config.refinement.fallback_to_mock);
        assert!(config.validate().is_ok());
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| pairs.get(key).cloned()
    }

    #[test]
    fn env_key_priority() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("OPENAI_API_KEY", "sk-openai"), ("OPENROUTER_API_KEY", "sk-or")]));
        assert_eq!(config.api_key.as_deref(), Some("sk-or"));
        assert!(config.has_api_key());
    }

    #[test]
    fn env_does_not_replace_file_key() {
        let mut config = AppConfig {
            api_key: Some("sk-file".into()),
            ..AppConfig::default()
        };
        config.apply_env(env(&[("ALTITUDE_API_KEY", "sk-env"), ("ALTITUDE_MODEL", "openai/gpt-4o-mini")]));
        assert_eq!(config.api_key.as_deref(), Some("sk-file"));
        assert_eq!(config.default_model, "openai/gpt-4o-mini");
    }

    #[test]
    fn env_provider_override() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("ALTITUDE_PROVIDER", "anthropic")]));
        assert_eq!(config.default_provider, "anthropic");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.refinement.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().default_provider, "openrouter");
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_provider = "anthropic"
fallback_providers = ["openrouter"]

[refinement]
timeout_secs = 5
temperature = 0.2
fallback_to_mock = false

[templates]
dir = "/srv/blueprints"
default = "feature-spec"

[providers.anthropic]
api_key = "sk-ant-test"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.default_provider, "anthropic");
        assert_eq!(config.fallback_providers, vec!["openrouter".to_string()]);
        assert_eq!(config.templates_dir(), PathBuf::from("/srv/blueprints"));
        assert_eq!(config.templates.default, "feature-spec");

        let options = config.generation_options();
        assert_eq!(options.timeout_secs, Some(5));
        assert_eq!(options.temperature, Some(0.2));
        assert_eq!(options.max_tokens, Some(1024));
        assert!(!options.fallback_to_mock);
    }

    #[test]
    fn unparseable_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_provider = [").unwrap();
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("openrouter"));
        assert!(toml_str.contains("timeout_secs"));
    }
}
