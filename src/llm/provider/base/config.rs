//! Provider configuration extraction tool
//!
//! Provides helper functions to extract various parameters from ProviderConfig

use crate::config::{ProviderConfig, ProviderKind};
use crate::constants::llm::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::error::{FolioError, Result};

use super::super::utils::complete_endpoint;

/// Extract API key
///
/// Fails with `MissingCredential` before any request is built, so a provider
/// without a key never touches the network.
///
/// # Arguments
/// * `api_key` - Key read from the environment at startup
/// * `provider_name` - Provider name (used for error prompts)
pub fn extract_api_key<'a>(api_key: Option<&'a str>, provider_name: &str) -> Result<&'a str> {
    api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| FolioError::MissingCredential {
            provider: provider_name.to_string(),
        })
}

/// Build a complete endpoint
///
/// Read the endpoint from the configuration file, and use the default value if not configured.
///
/// # Arguments
/// * `config` - Provider configuration
/// * `default_base` - default base URL
/// * `suffix` - API path suffix
pub fn build_endpoint(config: &ProviderConfig, default_base: &str, suffix: &str) -> String {
    let base = config.endpoint.as_deref().unwrap_or(default_base);
    complete_endpoint(base, suffix)
}

/// Base URL without trailing slashes (for providers whose path depends on the model)
pub fn base_url(config: &ProviderConfig, default_base: &str) -> String {
    config
        .endpoint
        .as_deref()
        .unwrap_or(default_base)
        .trim_end_matches('/')
        .to_string()
}

/// Get model from configuration, falling back to the tier default
pub fn get_model(config: &ProviderConfig, kind: ProviderKind) -> String {
    config
        .model
        .clone()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| kind.default_model().to_string())
}

/// Get the alternate model (an empty string disables the second attempt)
pub fn get_alternate_model(config: &ProviderConfig, kind: ProviderKind) -> Option<String> {
    match &config.alternate_model {
        Some(model) if model.trim().is_empty() => None,
        Some(model) => Some(model.clone()),
        None => kind.default_alternate_model().map(str::to_string),
    }
}

/// Get max_tokens from configuration (default when unset)
pub fn get_max_tokens(config: &ProviderConfig) -> u32 {
    config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
}

/// Get temperature from configuration (default when unset)
pub fn get_temperature(config: &ProviderConfig) -> f32 {
    config.temperature.unwrap_or(DEFAULT_TEMPERATURE)
}
