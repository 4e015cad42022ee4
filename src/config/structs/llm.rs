//! LLM provider configuration structures.

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

/// Provider tier.
///
/// The three live tiers are bound to concrete APIs; `Static` is the
/// network-optional fallback that always answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Google Gemini, structured output with a response schema.
    #[serde(rename = "gemini", alias = "primary")]
    Primary,
    /// Groq, OpenAI-compatible chat completions.
    #[serde(rename = "groq", alias = "secondary")]
    Secondary,
    /// Hugging Face Inference API, single-model text generation.
    #[serde(rename = "huggingface", alias = "tertiary")]
    Tertiary,
    /// Built-in literals, no network.
    #[serde(rename = "static", alias = "offline")]
    Static,
}

impl ProviderKind {
    /// Live tiers, in declaration order.
    pub const LIVE: [ProviderKind; 3] = [Self::Primary, Self::Secondary, Self::Tertiary];

    /// Provider identifier used in logs and `active_provider()`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Primary => "gemini",
            Self::Secondary => "groq",
            Self::Tertiary => "huggingface",
            Self::Static => "static",
        }
    }

    pub fn is_live(&self) -> bool {
        !matches!(self, Self::Static)
    }

    /// Returns the default model name for this tier.
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Primary => "gemini-2.5-flash",
            Self::Secondary => "llama-3.3-70b-versatile",
            Self::Tertiary => "mistralai/Mistral-7B-Instruct-v0.3",
            Self::Static => "",
        }
    }

    /// Lighter model used for the second live attempt.
    pub fn default_alternate_model(&self) -> Option<&'static str> {
        match self {
            Self::Primary => Some("gemini-2.5-flash-lite"),
            Self::Secondary => Some("llama-3.1-8b-instant"),
            Self::Tertiary | Self::Static => None,
        }
    }

    /// Environment variable holding the credential.
    pub fn default_api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::Primary => Some("GEMINI_API_KEY"),
            Self::Secondary => Some("GROQ_API_KEY"),
            Self::Tertiary => Some("HF_API_TOKEN"),
            Self::Static => None,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "primary" => Ok(Self::Primary),
            "groq" | "secondary" => Ok(Self::Secondary),
            "huggingface" | "hf" | "tertiary" => Ok(Self::Tertiary),
            "static" | "offline" => Ok(Self::Static),
            _ => Err(format!("Unknown provider: '{}'", s)),
        }
    }
}

/// Provider configuration.
///
/// Settings for one entry under `[llm.providers.<tier>]`. Every field is
/// optional; unset fields use the tier's defaults.
///
/// The credential itself is never stored here: `api_key_env` only names the
/// environment variable it is read from.
///
/// # Example
/// ```toml
/// [llm.providers.secondary]
/// model = "llama-3.3-70b-versatile"
/// alternate_model = "llama-3.1-8b-instant"
/// max_tokens = 2048
/// temperature = 0.7
/// endpoint = "https://api.groq.com/openai" # optional
/// api_key_env = "GROQ_API_KEY"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// API endpoint (base URL or full path).
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Model name.
    #[serde(default)]
    pub model: Option<String>,

    /// Model used for the second live attempt. An empty string disables it.
    #[serde(default)]
    pub alternate_model: Option<String>,

    /// Maximum generated token count.
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Sampling temperature in `0.0..=2.0`.
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Environment variable holding the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

impl ProviderConfig {
    /// Validates provider configuration.
    pub fn validate(&self, kind: ProviderKind) -> Result<()> {
        if let Some(temp) = self.temperature
            && !(0.0..=2.0).contains(&temp)
        {
            return Err(FolioError::Config(format!(
                "Provider '{}': temperature {} out of range [0.0, 2.0]",
                kind, temp
            )));
        }
        if let Some(model) = &self.model
            && model.trim().is_empty()
        {
            return Err(FolioError::Config(format!(
                "Provider '{}': model is empty",
                kind
            )));
        }
        if self.max_tokens == Some(0) {
            return Err(FolioError::Config(format!(
                "Provider '{}': max_tokens cannot be 0",
                kind
            )));
        }
        Ok(())
    }
}

/// Per-tier provider tables.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub primary: ProviderConfig,
    #[serde(default)]
    pub secondary: ProviderConfig,
    #[serde(default)]
    pub tertiary: ProviderConfig,
}

impl ProvidersConfig {
    /// Returns the table for a live tier.
    pub fn get(&self, kind: ProviderKind) -> Option<&ProviderConfig> {
        match kind {
            ProviderKind::Primary => Some(&self.primary),
            ProviderKind::Secondary => Some(&self.secondary),
            ProviderKind::Tertiary => Some(&self.tertiary),
            ProviderKind::Static => None,
        }
    }
}

/// LLM configuration.
///
/// # Fields
/// - `preferred_provider`: force a tier when its credential is present (optional)
/// - `call_timeout_secs`: upper bound for one live attempt (default: `45`)
/// - `providers`: per-tier settings
///
/// # Example
/// ```toml
/// [llm]
/// preferred_provider = "gemini"
/// call_timeout_secs = 30
///
/// [llm.providers.primary]
/// model = "gemini-2.5-flash"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LLMConfig {
    /// Tier to use instead of the default priority, if credentialed.
    #[serde(default)]
    pub preferred_provider: Option<ProviderKind>,

    /// Timeout for one live attempt, in seconds.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Provider settings keyed by tier.
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            preferred_provider: None,
            call_timeout_secs: default_call_timeout_secs(),
            providers: ProvidersConfig::default(),
        }
    }
}

impl LLMConfig {
    /// Environment variable holding the credential of a tier.
    pub fn api_key_env(&self, kind: ProviderKind) -> Option<String> {
        self.providers
            .get(kind)
            .and_then(|p| p.api_key_env.clone())
            .filter(|name| !name.trim().is_empty())
            .or_else(|| kind.default_api_key_env().map(str::to_string))
    }

    /// Validates LLM configuration.
    pub fn validate(&self) -> Result<()> {
        if self.call_timeout_secs == 0 {
            return Err(FolioError::Config(
                "llm.call_timeout_secs cannot be 0".into(),
            ));
        }
        for kind in ProviderKind::LIVE {
            if let Some(provider) = self.providers.get(kind) {
                provider.validate(kind)?;
            }
        }
        Ok(())
    }
}

fn default_call_timeout_secs() -> u64 {
    crate::constants::llm::DEFAULT_CALL_TIMEOUT_SECS
}
