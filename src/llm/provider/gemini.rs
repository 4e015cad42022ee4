use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::base::{
    ApiBackend, base_url, extract_api_key, get_max_tokens, get_model, get_temperature,
    send_llm_request,
};
use super::utils::{DEFAULT_GEMINI_BASE, complete_endpoint, gemini_suffix};
use crate::config::{NetworkConfig, ProviderConfig, ProviderKind};
use crate::error::{FolioError, Result};
use crate::llm::ChatRole;
use crate::llm::prompt::PromptParts;

/// Google Gemini API provider (primary tier)
///
/// Structured shapes are requested with `responseMimeType = "application/json"`
/// and a `responseSchema`, so the model is constrained to the expected fields.
///
/// # Configuration example
/// ```toml
/// [llm.providers.primary]
/// model = "gemini-2.5-flash"
/// alternate_model = "gemini-2.5-flash-lite"
/// endpoint = "https://generativelanguage.googleapis.com" # Optional
/// max_tokens = 2048 # optional
/// temperature = 0.7 # optional
/// ```
///
/// The API key is read from `GEMINI_API_KEY`.
pub struct GeminiProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_output_tokens: u32,
    temperature: f32,
}

// ============================================================================
// Request/response structure
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Option<Vec<GeminiResponsePart>>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: String,
}

// ============================================================================
// accomplish
// ============================================================================

impl GeminiProvider {
    /// Builds a Gemini provider from runtime configuration.
    pub fn new(
        config: &ProviderConfig,
        api_key: Option<String>,
        network_config: &NetworkConfig,
    ) -> Result<Self> {
        Ok(Self {
            client: super::create_http_client(network_config)?,
            api_key,
            base_url: base_url(config, DEFAULT_GEMINI_BASE),
            model: get_model(config, ProviderKind::Primary),
            max_output_tokens: get_max_tokens(config),
            temperature: get_temperature(config),
        })
    }

    /// Same provider bound to another model.
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Endpoint: /v1beta/models/{model}:generateContent
    fn generate_content_url(&self) -> String {
        complete_endpoint(&self.base_url, &gemini_suffix(&self.model))
    }

    fn build_request(&self, parts: &PromptParts) -> GeminiRequest {
        let mut contents: Vec<GeminiContent> = parts
            .history
            .iter()
            .map(|turn| GeminiContent {
                role: Some(
                    match turn.role {
                        ChatRole::User => "user",
                        ChatRole::Model => "model",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart {
                    text: turn.text.clone(),
                }],
            })
            .collect();
        contents.push(GeminiContent {
            role: Some("user".to_string()),
            parts: vec![GeminiPart {
                text: parts.user.clone(),
            }],
        });

        let response_schema = parts.shape.json_schema();
        GeminiRequest {
            system_instruction: Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: parts.system.clone(),
                }],
            }),
            contents,
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
                response_mime_type: response_schema
                    .as_ref()
                    .map(|_| "application/json".to_string()),
                response_schema,
            },
        }
    }
}

#[async_trait]
impl ApiBackend for GeminiProvider {
    fn name(&self) -> &str {
        ProviderKind::Primary.name()
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn call_api(&self, parts: &PromptParts) -> Result<String> {
        let api_key = extract_api_key(self.api_key.as_deref(), self.name())?;
        let request = self.build_request(parts);

        tracing::debug!(
            "Gemini API request: model={}, temperature={}, max_output_tokens={}, structured={}, history={}",
            self.model,
            self.temperature,
            self.max_output_tokens,
            parts.shape.is_structured(),
            parts.history.len()
        );

        let endpoint = self.generate_content_url();
        let response: GeminiResponse = send_llm_request(
            &self.client,
            &endpoint,
            &[("x-goog-api-key", api_key)],
            &request,
            self.name(),
        )
        .await?;

        let Some(candidate) = response.candidates.and_then(|c| c.into_iter().next()) else {
            if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
                return Err(FolioError::LlmContentBlocked {
                    provider: self.name().to_string(),
                    reason,
                });
            }
            return Err(FolioError::Llm(
                rust_i18n::t!("provider.gemini_no_candidates").to_string(),
            ));
        };

        // Check the reasons for abnormal end (SAFETY, RECITATION, etc.)
        if let Some(reason) = &candidate.finish_reason {
            match reason.as_str() {
                "STOP" => {}
                "MAX_TOKENS" => {
                    tracing::warn!("Gemini response truncated (MAX_TOKENS)");
                }
                _ => {
                    tracing::warn!("Gemini response finished with reason: {}", reason);
                    return Err(FolioError::LlmContentBlocked {
                        provider: self.name().to_string(),
                        reason: reason.clone(),
                    });
                }
            }
        }

        let text: String = candidate
            .content
            .and_then(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .map(|p| p.text)
            .collect();

        if text.is_empty() {
            return Err(FolioError::Llm(
                rust_i18n::t!("provider.gemini_no_candidates").to_string(),
            ));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use pretty_assertions::assert_eq;

    use crate::llm::prompt::build_prompt;
    use crate::llm::provider::test_utils::{
        ensure_crypto_provider, test_network_config, test_provider_config,
    };
    use crate::llm::{BookAssistant, CapabilityRequest, ChatTurn};

    const PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

    fn provider(url: String, api_key: Option<&str>) -> GeminiProvider {
        GeminiProvider::new(
            &test_provider_config(url, "gemini-2.5-flash"),
            api_key.map(str::to_string),
            &test_network_config(),
        )
        .unwrap()
    }

    fn candidate_body(text: &str) -> String {
        serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": text}], "role": "model"},
                "finishReason": "STOP"
            }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_gemini_search_books_success() {
        ensure_crypto_provider();
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_header("x-goog-api-key", "AIza-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(candidate_body(
                r##"[{"title":"Moby-Dick","author":"Herman Melville","description":"Whales.","publishedYear":"1851","categories":["Adventure"],"fallbackColor":"#1E3A8A"}]"##,
            ))
            .create_async()
            .await;

        let provider = provider(server.url(), Some("AIza-test"));
        let books = provider
            .invoke(&CapabilityRequest::SearchBooks {
                query: "whale".to_string(),
            })
            .await
            .unwrap()
            .into_books()
            .unwrap();

        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Moby-Dick");
        assert_eq!(books[0].published_year, "1851");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_gemini_translate_plain_text() {
        ensure_crypto_provider();
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(candidate_body("Hello\n"))
            .create_async()
            .await;

        let provider = provider(server.url(), Some("AIza-test"));
        let text = provider
            .invoke(&CapabilityRequest::Translate {
                text: "Bonjour".to_string(),
                target_lang: "English".to_string(),
            })
            .await
            .unwrap()
            .into_text()
            .unwrap();
        assert_eq!(text, "Hello");
    }

    #[test]
    fn test_gemini_request_structured_has_schema() {
        ensure_crypto_provider();
        let provider = provider("http://localhost".to_string(), Some("k"));
        let parts = build_prompt(&CapabilityRequest::GenerateReviews {
            title: "Emma".to_string(),
            author: "Jane Austen".to_string(),
        });
        let body = serde_json::to_value(provider.build_request(&parts)).unwrap();

        let config = &body["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(config["responseSchema"]["type"], "ARRAY");
        assert!(body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("reviews"));
    }

    #[test]
    fn test_gemini_request_text_maps_history() {
        ensure_crypto_provider();
        let provider = provider("http://localhost".to_string(), Some("k"));
        let parts = build_prompt(&CapabilityRequest::ChatAboutBook {
            title: "Emma".to_string(),
            message: "And Mr. Knightley?".to_string(),
            history: vec![ChatTurn::user("Who is Emma?"), ChatTurn::model("A matchmaker.")],
        });
        let body = serde_json::to_value(provider.build_request(&parts)).unwrap();

        let contents = body["contents"].as_array().unwrap();
        let roles: Vec<&str> = contents
            .iter()
            .map(|c| c["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["user", "model", "user"]);
        assert_eq!(contents[2]["parts"][0]["text"], "And Mr. Knightley?");
        assert!(body["generationConfig"].get("responseSchema").is_none());
        assert!(body["generationConfig"].get("responseMimeType").is_none());
    }

    #[tokio::test]
    async fn test_gemini_api_error_401() {
        ensure_crypto_provider();
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .with_status(401)
            .with_body("Unauthorized")
            .create_async()
            .await;

        let provider = provider(server.url(), Some("AIza-test"));
        let parts = build_prompt(&CapabilityRequest::Summarize {
            title: "Emma".to_string(),
        });
        let err = provider.call_api(&parts).await.unwrap_err();
        assert!(matches!(err, FolioError::LlmApi { status: 401, .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_gemini_safety_block() {
        ensure_crypto_provider();
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#)
            .create_async()
            .await;

        let provider = provider(server.url(), Some("AIza-test"));
        let parts = build_prompt(&CapabilityRequest::Recap {
            title: "Emma".to_string(),
        });
        let err = provider.call_api(&parts).await.unwrap_err();
        assert!(matches!(err, FolioError::LlmContentBlocked { ref reason, .. } if reason == "SAFETY"));
    }

    #[tokio::test]
    async fn test_gemini_prompt_blocked_without_candidates() {
        ensure_crypto_provider();
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(r#"{"promptFeedback":{"blockReason":"OTHER"}}"#)
            .create_async()
            .await;

        let provider = provider(server.url(), Some("AIza-test"));
        let parts = build_prompt(&CapabilityRequest::Recap {
            title: "Emma".to_string(),
        });
        let err = provider.call_api(&parts).await.unwrap_err();
        assert!(matches!(err, FolioError::LlmContentBlocked { .. }));
    }

    #[tokio::test]
    async fn test_gemini_missing_credential_sends_nothing() {
        ensure_crypto_provider();
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .expect(0)
            .create_async()
            .await;

        let provider = provider(server.url(), None);
        let err = provider
            .invoke(&CapabilityRequest::SearchBooks {
                query: "x".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::MissingCredential { .. }));
        mock.assert_async().await;
    }

    #[test]
    fn test_gemini_with_model_changes_endpoint() {
        ensure_crypto_provider();
        let provider = provider("http://localhost:1".to_string(), Some("k"))
            .with_model("gemini-2.5-flash-lite".to_string());
        assert_eq!(
            provider.generate_content_url(),
            "http://localhost:1/v1beta/models/gemini-2.5-flash-lite:generateContent"
        );
    }
}
