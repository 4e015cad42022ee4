use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::base::{
    ApiBackend, base_url, extract_api_key, get_max_tokens, get_model, get_temperature,
    send_llm_request,
};
use super::utils::{DEFAULT_HUGGINGFACE_BASE, complete_endpoint, huggingface_suffix};
use crate::config::{NetworkConfig, ProviderConfig, ProviderKind};
use crate::error::{FolioError, Result};
use crate::llm::ChatRole;
use crate::llm::prompt::PromptParts;

/// Hugging Face Inference API provider (tertiary tier)
///
/// A single text-generation model without chat or schema support: the prompt
/// is flattened into one string and the expected fields are described in
/// plain language. Also used by the static provider as its last-resort
/// endpoint for free-text operations.
///
/// # Configuration example
/// ```toml
/// [llm.providers.tertiary]
/// model = "mistralai/Mistral-7B-Instruct-v0.3"
/// endpoint = "https://api-inference.huggingface.co" # Optional
/// max_tokens = 1024 # optional, sent as max_new_tokens
/// ```
///
/// The API token is read from `HF_API_TOKEN`.
pub struct HuggingFaceProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_new_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct InferenceRequest {
    inputs: String,
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    temperature: f32,
    return_full_text: bool,
}

#[derive(Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

impl HuggingFaceProvider {
    /// Builds a Hugging Face provider from runtime configuration.
    pub fn new(
        config: &ProviderConfig,
        api_key: Option<String>,
        network_config: &NetworkConfig,
    ) -> Result<Self> {
        Ok(Self {
            client: super::create_http_client(network_config)?,
            api_key,
            base_url: base_url(config, DEFAULT_HUGGINGFACE_BASE),
            model: get_model(config, ProviderKind::Tertiary),
            max_new_tokens: get_max_tokens(config),
            temperature: get_temperature(config),
        })
    }

    /// Same provider bound to another model.
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Endpoint: /models/{model}
    fn model_url(&self) -> String {
        complete_endpoint(&self.base_url, &huggingface_suffix(&self.model))
    }

    /// Flattens system prompt, transcript and user message into one prompt.
    fn build_inputs(parts: &PromptParts) -> String {
        let mut inputs = parts.system_with_instructions(false);
        inputs.push_str("\n\n");

        if !parts.history.is_empty() {
            inputs.push_str("Conversation so far:\n");
            for turn in &parts.history {
                let speaker = match turn.role {
                    ChatRole::User => "Reader",
                    ChatRole::Model => "Assistant",
                };
                inputs.push_str(&format!("{}: {}\n", speaker, turn.text));
            }
            inputs.push('\n');
        }

        inputs.push_str(&format!("Reader: {}\nAssistant:", parts.user));
        inputs
    }

    fn build_request(&self, parts: &PromptParts) -> InferenceRequest {
        InferenceRequest {
            inputs: Self::build_inputs(parts),
            parameters: InferenceParameters {
                max_new_tokens: self.max_new_tokens,
                temperature: self.temperature,
                return_full_text: false,
            },
            options: InferenceOptions {
                wait_for_model: true,
            },
        }
    }

    /// Accepts `[{"generated_text": ...}]` and `{"generated_text": ...}`;
    /// `{"error": ...}` is an API error.
    fn extract_generated_text(&self, response: Value) -> Result<String> {
        if let Some(error) = response.get("error") {
            let message = error
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(FolioError::Llm(
                rust_i18n::t!(
                    "provider.api_error_body",
                    provider = self.name(),
                    error = message.as_str()
                )
                .to_string(),
            ));
        }

        let generated = match &response {
            Value::Array(items) => items.first().and_then(|item| item.get("generated_text")),
            Value::Object(_) => response.get("generated_text"),
            _ => None,
        };

        generated
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                FolioError::Llm(
                    rust_i18n::t!("provider.no_choices", provider = self.name()).to_string(),
                )
            })
    }
}

#[async_trait]
impl ApiBackend for HuggingFaceProvider {
    fn name(&self) -> &str {
        ProviderKind::Tertiary.name()
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn call_api(&self, parts: &PromptParts) -> Result<String> {
        let api_key = extract_api_key(self.api_key.as_deref(), self.name())?;
        let request = self.build_request(parts);

        tracing::debug!(
            "Hugging Face API request: model={}, temperature={}, max_new_tokens={}, inputs_len={}",
            self.model,
            self.temperature,
            self.max_new_tokens,
            request.inputs.len()
        );

        let auth_header = format!("Bearer {}", api_key);
        let response: Value = send_llm_request(
            &self.client,
            &self.model_url(),
            &[("Authorization", auth_header.as_str())],
            &request,
            self.name(),
        )
        .await?;

        self.extract_generated_text(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;

    use crate::llm::prompt::build_prompt;
    use crate::llm::provider::test_utils::{
        ensure_crypto_provider, test_network_config, test_provider_config,
    };
    use crate::llm::{BookAssistant, CapabilityRequest, ChatTurn};

    const MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.3";
    const PATH: &str = "/models/mistralai/Mistral-7B-Instruct-v0.3";

    fn provider(url: String, api_key: Option<&str>) -> HuggingFaceProvider {
        HuggingFaceProvider::new(
            &test_provider_config(url, MODEL),
            api_key.map(str::to_string),
            &test_network_config(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_huggingface_explain_success() {
        ensure_crypto_provider();
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_header("authorization", "Bearer hf_test")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "parameters": {"return_full_text": false}
            })))
            .with_status(200)
            .with_body(r#"[{"generated_text": " The line mocks the narrator's pride. "}]"#)
            .create_async()
            .await;

        let text = provider(server.url(), Some("hf_test"))
            .invoke(&CapabilityRequest::ExplainContext {
                text: "It is a truth universally acknowledged".to_string(),
                title: "Pride and Prejudice".to_string(),
            })
            .await
            .unwrap()
            .into_text()
            .unwrap();
        assert_eq!(text, "The line mocks the narrator's pride.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_huggingface_object_response_with_embedded_json() {
        ensure_crypto_provider();
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "generated_text": "Here you go:\n[{\"title\": \"Frankenstein\", \"author\": \"Mary Shelley\"}]"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let books = provider(server.url(), Some("hf_test"))
            .invoke(&CapabilityRequest::SearchBooks {
                query: "monster".to_string(),
            })
            .await
            .unwrap()
            .into_books()
            .unwrap();
        assert_eq!(books[0].title, "Frankenstein");
        assert_eq!(books[0].fallback_color, "#6366F1");
    }

    #[tokio::test]
    async fn test_huggingface_error_body() {
        ensure_crypto_provider();
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(r#"{"error": "Model is currently loading"}"#)
            .create_async()
            .await;

        let parts = build_prompt(&CapabilityRequest::Recap {
            title: "Emma".to_string(),
        });
        let err = provider(server.url(), Some("hf_test"))
            .call_api(&parts)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Model is currently loading"));
    }

    #[tokio::test]
    async fn test_huggingface_server_error() {
        ensure_crypto_provider();
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(503)
            .with_body(r#"{"error": "unavailable"}"#)
            .create_async()
            .await;

        let parts = build_prompt(&CapabilityRequest::Recap {
            title: "Emma".to_string(),
        });
        let err = provider(server.url(), Some("hf_test"))
            .call_api(&parts)
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::LlmApi { status: 503, .. }));
    }

    #[test]
    fn test_huggingface_inputs_flatten_history() {
        let parts = build_prompt(&CapabilityRequest::ChatAboutBook {
            title: "Dracula".to_string(),
            message: "Why Whitby?".to_string(),
            history: vec![ChatTurn::user("Hi"), ChatTurn::model("Hello, reader.")],
        });
        let inputs = HuggingFaceProvider::build_inputs(&parts);
        assert!(inputs.contains("Reader: Hi\nAssistant: Hello, reader.\n"));
        assert!(inputs.ends_with("Reader: Why Whitby?\nAssistant:"));
    }

    #[test]
    fn test_huggingface_inputs_describe_fields() {
        let parts = build_prompt(&CapabilityRequest::Onboarding {
            genres: vec!["Horror".to_string()],
            goal: "be scared".to_string(),
        });
        let inputs = HuggingFaceProvider::build_inputs(&parts);
        assert!(inputs.contains("a JSON array"));
        assert!(inputs.contains("\"matchReason\""));
        assert!(inputs.contains("Output JSON only"));
    }

    #[tokio::test]
    async fn test_huggingface_missing_credential_sends_nothing() {
        ensure_crypto_provider();
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", PATH).expect(0).create_async().await;

        let err = provider(server.url(), None)
            .invoke(&CapabilityRequest::Recap {
                title: "Emma".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.is_configuration());
        mock.assert_async().await;
    }
}
