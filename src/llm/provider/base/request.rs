//! HTTP 请求发送
//!
//! 单次发送，不做重试：失败直接交给 fallback 链处理。

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::response::truncate_for_preview;
use crate::error::{FolioError, Result};

/// 发送一次 HTTP 请求（只处理网络层错误）
async fn try_send_request<Req: Serialize>(
    client: &Client,
    endpoint: &str,
    headers: &[(&str, &str)],
    request_body: &Req,
    provider_name: &str,
) -> Result<reqwest::Response> {
    let mut req = client
        .post(endpoint)
        .header("Content-Type", "application/json");

    for (key, value) in headers {
        req = req.header(*key, *value);
    }

    tracing::debug!("Sending request to: {}", endpoint);

    req.json(request_body).send().await.map_err(|e| {
        let error_details = format!("{}", e);
        let error_type = if e.is_timeout() {
            "timeout"
        } else if e.is_connect() {
            "connection failed"
        } else if e.is_request() {
            "request error"
        } else {
            "unknown"
        };

        tracing::debug!(
            "{} API request failed [{}]: {}",
            provider_name,
            error_type,
            error_details
        );

        // 为不同类型的网络错误提供更详细的错误信息
        if e.is_timeout() {
            FolioError::Llm(
                rust_i18n::t!(
                    "provider.api_request_timeout",
                    provider = provider_name,
                    detail = error_details.as_str()
                )
                .to_string(),
            )
        } else if e.is_connect() {
            FolioError::Llm(
                rust_i18n::t!(
                    "provider.api_connection_failed",
                    provider = provider_name,
                    detail = error_details.as_str()
                )
                .to_string(),
            )
        } else {
            FolioError::Network(e)
        }
    })
}

/// 发送 LLM API 请求的通用函数
///
/// 非 2xx 状态码返回 `LlmApi`，响应体无法反序列化返回 `MalformedResponse`。
///
/// # Arguments
/// * `client` - HTTP 客户端
/// * `endpoint` - API 端点
/// * `headers` - 额外的请求头
/// * `request_body` - 请求体
/// * `provider_name` - Provider 名称（用于日志和错误信息）
pub async fn send_llm_request<Req, Resp>(
    client: &Client,
    endpoint: &str,
    headers: &[(&str, &str)],
    request_body: &Req,
    provider_name: &str,
) -> Result<Resp>
where
    Req: Serialize,
    Resp: DeserializeOwned,
{
    let response = try_send_request(client, endpoint, headers, request_body, provider_name).await?;
    let status = response.status();
    let response_text = response.text().await?;

    tracing::debug!("{} API response status: {}", provider_name, status);
    tracing::debug!("{} API response body: {}", provider_name, response_text);

    if !status.is_success() {
        return Err(FolioError::LlmApi {
            status: status.as_u16(),
            message: format!("{}: {}", provider_name, truncate_for_preview(&response_text)),
        });
    }

    serde_json::from_str(&response_text).map_err(|e| {
        tracing::debug!("{} response envelope parse failed: {}", provider_name, e);
        FolioError::MalformedResponse {
            provider: provider_name.to_string(),
            preview: truncate_for_preview(&response_text),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::test_utils::ensure_crypto_provider;
    use mockito::Server;
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    struct Echo {
        value: String,
    }

    #[tokio::test]
    async fn test_send_llm_request_success_sends_headers() {
        ensure_crypto_provider();
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/echo")
            .match_header("authorization", "Bearer k")
            .with_status(200)
            .with_body(r#"{"value":"ok"}"#)
            .create_async()
            .await;

        let client = Client::new();
        let endpoint = format!("{}/echo", server.url());
        let echo: Echo = send_llm_request(
            &client,
            &endpoint,
            &[("Authorization", "Bearer k")],
            &serde_json::json!({"q": 1}),
            "test",
        )
        .await
        .unwrap();
        assert_eq!(echo.value, "ok");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_llm_request_error_status_is_not_retried() {
        ensure_crypto_provider();
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/echo")
            .with_status(503)
            .with_body("overloaded")
            .expect(1)
            .create_async()
            .await;

        let client = Client::new();
        let endpoint = format!("{}/echo", server.url());
        let err = send_llm_request::<_, Echo>(
            &client,
            &endpoint,
            &[],
            &serde_json::json!({}),
            "test",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FolioError::LlmApi { status: 503, .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_llm_request_bad_envelope_is_malformed() {
        ensure_crypto_provider();
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/echo")
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let client = Client::new();
        let endpoint = format!("{}/echo", server.url());
        let err = send_llm_request::<_, Echo>(
            &client,
            &endpoint,
            &[],
            &serde_json::json!({}),
            "test",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FolioError::MalformedResponse { .. }));
    }
}
