use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::base::{
    ApiBackend, build_endpoint, extract_api_key, get_max_tokens, get_model, get_temperature,
    send_llm_request,
};
use super::utils::{DEFAULT_GROQ_BASE, GROQ_API_SUFFIX};
use crate::config::{NetworkConfig, ProviderConfig, ProviderKind};
use crate::error::{FolioError, Result};
use crate::llm::ChatRole;
use crate::llm::prompt::PromptParts;

/// Groq API provider (secondary tier)
///
/// OpenAI-compatible chat completions. Structured shapes use JSON mode
/// (`response_format = json_object`), which only accepts an object at the
/// root, so lists are requested wrapped as `{"books": [...]}`.
///
/// # Configuration example
/// ```toml
/// [llm.providers.secondary]
/// model = "llama-3.3-70b-versatile"
/// alternate_model = "llama-3.1-8b-instant"
/// endpoint = "https://api.groq.com/openai" # Optional
/// ```
///
/// The API key is read from `GROQ_API_KEY`.
pub struct GroqProvider {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<MessagePayload>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct MessagePayload {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct MessageContent {
    content: Option<String>,
}

impl GroqProvider {
    /// Builds a Groq provider from runtime configuration.
    pub fn new(
        config: &ProviderConfig,
        api_key: Option<String>,
        network_config: &NetworkConfig,
    ) -> Result<Self> {
        Ok(Self {
            client: super::create_http_client(network_config)?,
            api_key,
            endpoint: build_endpoint(config, DEFAULT_GROQ_BASE, GROQ_API_SUFFIX),
            model: get_model(config, ProviderKind::Secondary),
            max_tokens: get_max_tokens(config),
            temperature: get_temperature(config),
        })
    }

    /// Same provider bound to another model.
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    fn build_request(&self, parts: &PromptParts) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(parts.history.len() + 2);
        messages.push(MessagePayload {
            role: "system",
            content: parts.system_with_instructions(true),
        });
        messages.extend(parts.history.iter().map(|turn| MessagePayload {
            role: match turn.role {
                ChatRole::User => "user",
                ChatRole::Model => "assistant",
            },
            content: turn.text.clone(),
        }));
        messages.push(MessagePayload {
            role: "user",
            content: parts.user.clone(),
        });

        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: parts
                .shape
                .is_structured()
                .then_some(ResponseFormat {
                    kind: "json_object",
                }),
        }
    }
}

#[async_trait]
impl ApiBackend for GroqProvider {
    fn name(&self) -> &str {
        ProviderKind::Secondary.name()
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn call_api(&self, parts: &PromptParts) -> Result<String> {
        let api_key = extract_api_key(self.api_key.as_deref(), self.name())?;
        let request = self.build_request(parts);

        tracing::debug!(
            "Groq API request: model={}, temperature={}, max_tokens={}, json_mode={}, messages={}",
            self.model,
            self.temperature,
            self.max_tokens,
            request.response_format.is_some(),
            request.messages.len()
        );

        let auth_header = format!("Bearer {}", api_key);
        let response: ChatCompletionResponse = send_llm_request(
            &self.client,
            &self.endpoint,
            &[("Authorization", auth_header.as_str())],
            &request,
            self.name(),
        )
        .await?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            FolioError::Llm(rust_i18n::t!("provider.no_choices", provider = self.name()).to_string())
        })?;

        if choice.finish_reason.as_deref() == Some("length") {
            tracing::warn!("Groq response truncated (length)");
        }

        choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                FolioError::Llm(
                    rust_i18n::t!("provider.no_choices", provider = self.name()).to_string(),
                )
            })
    }
}
