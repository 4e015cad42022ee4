//! Test utilities for provider tests
//!
//! Provides common test configuration builders to reduce duplication
//! across provider test suites.

use crate::config::{NetworkConfig, ProviderConfig};

/// 在测试中安装 rustls crypto provider
///
/// reqwest 0.13 + rustls-no-provider 需要手动安装 crypto provider，
/// 生产代码在 main.rs 中完成，测试需要单独调用。
/// 多次调用是安全的（install_default 失败时忽略即可）。
pub fn ensure_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// Create a `NetworkConfig` with short timeouts for mock servers
pub fn test_network_config() -> NetworkConfig {
    NetworkConfig {
        request_timeout: 5,
        connect_timeout: 2,
    }
}

/// Create a `ProviderConfig` pointing at a mock server
///
/// # Parameters
/// - `base_url` - Mock server URL (e.g., from `mockito::Server`)
/// - `model` - Model name (e.g., `"gemini-2.5-flash"`, `"llama-3.3-70b-versatile"`)
pub fn test_provider_config(base_url: String, model: &str) -> ProviderConfig {
    ProviderConfig {
        endpoint: Some(base_url),
        model: Some(model.to_string()),
        alternate_model: None,
        max_tokens: None,
        temperature: None,
        api_key_env: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_config_points_at_server() {
        let config = test_provider_config("http://test.com".to_string(), "test-model");
        assert_eq!(config.endpoint, Some("http://test.com".to_string()));
        assert_eq!(config.model.as_deref(), Some("test-model"));
    }
}
