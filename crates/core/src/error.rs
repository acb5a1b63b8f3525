//! Error types for the Altitude domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Altitude operations.
///
/// Text-generation failures never reach callers of the refinement engine
/// (they trigger the local fallback); `Provider` exists for callers that talk
/// to a provider directly.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Template errors ---
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    // --- Tree / history errors ---
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    // --- Input errors ---
    #[error("Input text is empty")]
    EmptyInput,
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Duplicate layer id '{0}' in blueprint")]
    DuplicateLayer(String),

    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Invalid blueprint '{name}': {reason}")]
    InvalidBlueprint { name: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("Malformed branch at index {index}: {reason}")]
    MalformedBranch { index: usize, reason: String },

    #[error("Layer '{layer_id}' is not part of template '{template}'")]
    UnknownLayer { layer_id: String, template: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn tree_error_displays_correctly() {
        let err = Error::Tree(TreeError::MalformedBranch {
            index: 2,
            reason: "missing value".into(),
        });
        assert!(err.to_string().contains("index 2"));
        assert!(err.to_string().contains("missing value"));
    }

    #[test]
    fn template_error_converts() {
        let err: Error = TemplateError::DuplicateLayer("vision".into()).into();
        assert!(matches!(err, Error::Template(TemplateError::DuplicateLayer(_))));
    }
}
