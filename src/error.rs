use thiserror::Error;

pub type Result<T> = std::result::Result<T, FolioError>;

/// Errors raised inside the provider layer.
///
/// None of these reach callers of the capability surface: the fallback chain
/// turns every variant into a static result. They exist for logging and for
/// the adapters' own tests.
#[derive(Error, Debug)]
pub enum FolioError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration parsing error: {0}")]
    ConfigParse(#[from] config::ConfigError),

    #[error("No credential configured for {provider}")]
    MissingCredential { provider: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status from a provider API.
    #[error("LLM API error ({status}): {message}")]
    LlmApi { status: u16, message: String },

    #[error("{provider} request timed out after {secs}s")]
    Timeout { provider: String, secs: u64 },

    /// The provider answered but the payload could not be normalized.
    #[error("Failed to parse {provider} response: {preview}")]
    MalformedResponse { provider: String, preview: String },

    #[error("{provider} blocked the response ({reason})")]
    LlmContentBlocked { provider: String, reason: String },

    #[error("LLM provider error: {0}")]
    Llm(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl FolioError {
    /// Coarse classification used in logs and JSON error output.
    pub fn code(&self) -> &'static str {
        match self {
            FolioError::Config(_) | FolioError::ConfigParse(_) => "CONFIG_ERROR",
            FolioError::MissingCredential { .. } => "MISSING_CREDENTIAL",
            FolioError::Network(_) => "NETWORK_ERROR",
            FolioError::LlmApi { .. } => "LLM_API_ERROR",
            FolioError::Timeout { .. } => "TIMEOUT",
            FolioError::MalformedResponse { .. } => "MALFORMED_RESPONSE",
            FolioError::LlmContentBlocked { .. } => "CONTENT_BLOCKED",
            FolioError::Llm(_) => "LLM_ERROR",
            FolioError::Io(_) => "IO_ERROR",
            FolioError::Serde(_) => "SERDE_ERROR",
            FolioError::InvalidInput(_) => "INVALID_INPUT",
        }
    }

    /// Whether this error happened before anything was sent over the network.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            FolioError::Config(_) | FolioError::ConfigParse(_) | FolioError::MissingCredential { .. }
        )
    }

    /// 获取错误的解决建议
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            FolioError::MissingCredential { provider } if provider == "gemini" => {
                Some("Set GEMINI_API_KEY to enable the primary provider")
            }
            FolioError::MissingCredential { provider } if provider == "groq" => {
                Some("Set GROQ_API_KEY to enable the secondary provider")
            }
            FolioError::MissingCredential { provider } if provider == "huggingface" => {
                Some("Set HF_API_TOKEN to enable the tertiary provider")
            }
            FolioError::MissingCredential { .. } => {
                Some("Set the provider's api_key_env variable in the environment")
            }
            FolioError::Network(_) => {
                Some("Check your network connection, proxy settings, or API endpoint configuration")
            }
            FolioError::Timeout { .. } => Some(
                "The provider did not answer in time. Raise llm.call_timeout_secs or try again later",
            ),
            FolioError::LlmApi { status: 401, .. } | FolioError::LlmApi { status: 403, .. } => {
                Some("Check if your API key is valid and has not expired")
            }
            FolioError::LlmApi { status: 429, .. } => {
                Some("Rate limit exceeded. Wait a moment and try again, or upgrade your API plan")
            }
            FolioError::LlmApi { status, .. } if *status >= 500 => {
                Some("API service is temporarily unavailable. Try again in a few moments")
            }
            FolioError::MalformedResponse { .. } => {
                Some("Try using --verbose flag to see the full LLM response and debug the issue")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestion_missing_credential_per_provider() {
        let err = FolioError::MissingCredential {
            provider: "groq".to_string(),
        };
        assert!(err.suggestion().unwrap().contains("GROQ_API_KEY"));

        let err = FolioError::MissingCredential {
            provider: "gemini".to_string(),
        };
        assert!(err.suggestion().unwrap().contains("GEMINI_API_KEY"));

        let err = FolioError::MissingCredential {
            provider: "custom".to_string(),
        };
        assert!(err.suggestion().unwrap().contains("api_key_env"));
    }

    #[test]
    fn test_suggestion_llm_api_statuses() {
        let unauthorized = FolioError::LlmApi {
            status: 401,
            message: "groq: Unauthorized".to_string(),
        };
        assert!(unauthorized.suggestion().unwrap().contains("API key"));

        let limited = FolioError::LlmApi {
            status: 429,
            message: "groq: slow down".to_string(),
        };
        assert!(limited.suggestion().unwrap().contains("Rate limit"));

        let unavailable = FolioError::LlmApi {
            status: 503,
            message: "gemini: overloaded".to_string(),
        };
        assert!(
            unavailable
                .suggestion()
                .unwrap()
                .contains("temporarily unavailable")
        );

        let bad_request = FolioError::LlmApi {
            status: 400,
            message: "bad".to_string(),
        };
        assert!(bad_request.suggestion().is_none());
    }

    #[test]
    fn test_suggestion_timeout_and_malformed() {
        let timeout = FolioError::Timeout {
            provider: "gemini".to_string(),
            secs: 45,
        };
        assert!(timeout.suggestion().unwrap().contains("call_timeout_secs"));

        let malformed = FolioError::MalformedResponse {
            provider: "huggingface".to_string(),
            preview: "oops".to_string(),
        };
        assert!(malformed.suggestion().unwrap().contains("--verbose"));
    }

    #[test]
    fn test_is_configuration() {
        assert!(
            FolioError::MissingCredential {
                provider: "groq".to_string()
            }
            .is_configuration()
        );
        assert!(FolioError::Config("bad".to_string()).is_configuration());
        assert!(!FolioError::Llm("boom".to_string()).is_configuration());
    }

    #[test]
    fn test_codes() {
        assert_eq!(
            FolioError::Timeout {
                provider: "groq".into(),
                secs: 1
            }
            .code(),
            "TIMEOUT"
        );
        assert_eq!(
            FolioError::InvalidInput("x".into()).code(),
            "INVALID_INPUT"
        );
    }
}
