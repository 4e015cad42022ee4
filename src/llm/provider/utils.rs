//! Provider utility functions
//!
//! Contains common functions such as URL processing and endpoint completion

/// Groq (OpenAI-compatible) API endpoint suffix
pub const GROQ_API_SUFFIX: &str = "/v1/chat/completions";

/// Gemini default base URL
pub const DEFAULT_GEMINI_BASE: &str = "https://generativelanguage.googleapis.com";

/// Groq default base URL
pub const DEFAULT_GROQ_BASE: &str = "https://api.groq.com/openai";

/// Hugging Face Inference API default base URL
pub const DEFAULT_HUGGINGFACE_BASE: &str = "https://api-inference.huggingface.co";

/// Gemini endpoint suffix for a model: `/v1beta/models/{model}:generateContent`
pub fn gemini_suffix(model: &str) -> String {
    format!("/v1beta/models/{}:generateContent", model)
}

/// Hugging Face endpoint suffix for a model: `/models/{model}`
pub fn huggingface_suffix(model: &str) -> String {
    format!("/models/{}", model)
}

/// Smart completion API endpoint
///
/// # Behavior
/// 1. Remove trailing slashes
/// 2. Check whether the URL contains the full path
/// 3. If incomplete, automatically complete suffix
///
/// # Example
/// ```
/// use folio::llm::provider::utils::complete_endpoint;
///
/// assert_eq!(
///     complete_endpoint("https://api.groq.com/openai", "/v1/chat/completions"),
///     "https://api.groq.com/openai/v1/chat/completions"
/// );
///
/// assert_eq!(
///     complete_endpoint("https://api.groq.com/openai/v1/chat/completions", "/v1/chat/completions"),
///     "https://api.groq.com/openai/v1/chat/completions"
/// );
///
/// assert_eq!(
///     complete_endpoint("https://api.groq.com/openai/", "/v1/chat/completions"),
///     "https://api.groq.com/openai/v1/chat/completions"
/// );
/// ```
pub fn complete_endpoint(base_url: &str, expected_suffix: &str) -> String {
    // 1. Clean URLs: Remove trailing slashes
    let url = base_url.trim_end_matches('/');
    let suffix = expected_suffix.trim_start_matches('/');

    // 2. If the expected suffix is already included, return directly
    if url.ends_with(suffix) {
        return url.to_string();
    }

    // 3. The URL may already hold a leading part of the suffix
    // ("https://api.com/v1" + "v1/chat/completions" -> only "/chat/completions" is added)
    let suffix_parts: Vec<&str> = suffix.split('/').collect();
    for i in 0..suffix_parts.len() {
        let partial_suffix = suffix_parts[..=i].join("/");
        if url.ends_with(&partial_suffix) {
            let remaining_suffix = &suffix_parts[i + 1..].join("/");
            if remaining_suffix.is_empty() {
                return url.to_string();
            }
            return format!("{}/{}", url, remaining_suffix);
        }
    }

    // 4. Check whether it is a customized complete API path
    if is_complete_api_path(url) {
        return url.to_string();
    }

    // 5. Complete the complete suffix
    format!("{}/{}", url, suffix)
}

/// Check if the URL is already a full API path
///
/// Path depth >= 2 is considered a user-defined complete path.
fn is_complete_api_path(url: &str) -> bool {
    let path = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .and_then(|rest| rest.split_once('/'))
        .map(|(_, path)| path)
        .unwrap_or("");

    if path.is_empty() {
        return false;
    }

    path.split('/').filter(|s| !s.is_empty()).count() >= 2
}

/// Mask API key to prevent log leaks
///
/// # rule
/// - length > 8: display first 4 characters + `...` + last 4 characters
/// - length <= 8: display `****`
///
/// # Example
/// ```
/// use folio::llm::provider::utils::mask_api_key;
///
/// assert_eq!(mask_api_key("gsk_abcdefghijklmnop"), "gsk_...mnop");
/// assert_eq!(mask_api_key("short"), "****");
/// assert_eq!(mask_api_key(""), "****");
/// ```
pub fn mask_api_key(key: &str) -> String {
    if key.len() > 8 && key.is_char_boundary(4) && key.is_char_boundary(key.len() - 4) {
        format!("{}...{}", &key[..4], &key[key.len() - 4..])
    } else {
        "****".to_string()
    }
}
