pub mod base;
pub mod fallback;
pub mod gemini;
pub mod groq;
pub mod huggingface;
pub mod offline;
pub mod selector;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use reqwest::Client;

use crate::config::{AppConfig, Credentials, NetworkConfig, ProviderKind};
use crate::error::{FolioError, Result};
use crate::llm::BookAssistant;

/// 全局 HTTP 客户端（共享连接池）
static HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

/// 全局 HTTP 客户端初始化错误信息
///
/// 如果第一次创建失败，保存错误字符串以避免后续重复创建与潜在 panic。
static HTTP_CLIENT_ERROR: OnceLock<String> = OnceLock::new();

/// 获取或创建全局 HTTP 客户端
///
/// 使用 OnceLock 确保只创建一次，所有 provider 共享同一个连接池。
/// 第一次调用时的 NetworkConfig 决定 timeout 配置。
pub(crate) fn create_http_client(network_config: &NetworkConfig) -> Result<Client> {
    if let Some(client) = HTTP_CLIENT.get() {
        return Ok(client.clone());
    }

    if let Some(err_msg) = HTTP_CLIENT_ERROR.get() {
        return Err(FolioError::Llm(
            rust_i18n::t!("provider.http_client_init_failed", error = err_msg.as_str()).to_string(),
        ));
    }

    let user_agent = format!(
        "{}/{} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    );

    match Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(network_config.request_timeout))
        .connect_timeout(Duration::from_secs(network_config.connect_timeout))
        .build()
    {
        Ok(client) => {
            let _ = HTTP_CLIENT.set(client.clone());
            Ok(client)
        }
        Err(e) => {
            let err_msg = e.to_string();
            let _ = HTTP_CLIENT_ERROR.set(err_msg.clone());
            Err(FolioError::Llm(
                rust_i18n::t!(
                    "provider.http_client_create_failed",
                    error = err_msg.as_str()
                )
                .to_string(),
            ))
        }
    }
}

/// 创建某一层级的 live provider
///
/// 凭据缺失不会在这里报错：adapter 在调用时返回 `MissingCredential`，且不发送请求。
pub fn create_assistant(
    kind: ProviderKind,
    config: &AppConfig,
    credentials: &Credentials,
) -> Result<Arc<dyn BookAssistant>> {
    build_assistant(kind, config, credentials, None)
}

/// 创建使用备用模型的 provider（用于第二次 live 尝试）
///
/// 该层级没有配置备用模型时返回 `None`。
pub fn create_alternate_assistant(
    kind: ProviderKind,
    config: &AppConfig,
    credentials: &Credentials,
) -> Result<Option<Arc<dyn BookAssistant>>> {
    let Some(provider_config) = config.llm.providers.get(kind) else {
        return Ok(None);
    };
    match base::get_alternate_model(provider_config, kind) {
        Some(model) => build_assistant(kind, config, credentials, Some(model)).map(Some),
        None => Ok(None),
    }
}

fn build_assistant(
    kind: ProviderKind,
    config: &AppConfig,
    credentials: &Credentials,
    model: Option<String>,
) -> Result<Arc<dyn BookAssistant>> {
    let provider_config = config
        .llm
        .providers
        .get(kind)
        .ok_or_else(|| not_a_live_provider(kind))?;
    let api_key = credentials.get(kind).map(str::to_string);
    let network = &config.network;

    let assistant: Arc<dyn BookAssistant> = match kind {
        ProviderKind::Primary => {
            let provider = gemini::GeminiProvider::new(provider_config, api_key, network)?;
            Arc::new(match model {
                Some(model) => provider.with_model(model),
                None => provider,
            })
        }
        ProviderKind::Secondary => {
            let provider = groq::GroqProvider::new(provider_config, api_key, network)?;
            Arc::new(match model {
                Some(model) => provider.with_model(model),
                None => provider,
            })
        }
        ProviderKind::Tertiary => {
            let provider = huggingface::HuggingFaceProvider::new(provider_config, api_key, network)?;
            Arc::new(match model {
                Some(model) => provider.with_model(model),
                None => provider,
            })
        }
        ProviderKind::Static => return Err(not_a_live_provider(kind)),
    };
    Ok(assistant)
}

fn not_a_live_provider(kind: ProviderKind) -> FolioError {
    FolioError::Config(rust_i18n::t!("provider.not_a_live_provider", name = kind.name()).to_string())
}
