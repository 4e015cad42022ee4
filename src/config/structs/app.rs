//! Top-level application configuration and UI settings.

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::llm::LLMConfig;
use super::network::NetworkConfig;

/// Application configuration.
///
/// Effective configuration is merged from multiple sources (low to high):
/// 1. Rust defaults (`Default` + `serde(default)`)
/// 2. User-level config file (platform-specific config directory)
/// 3. `FOLIO__*` environment variables
///
/// API keys are not part of it; see [`Credentials`](super::super::Credentials).
///
/// # Configuration File Locations
/// - Linux: `~/.config/folio/config.toml`
/// - macOS: `~/Library/Application Support/folio/config.toml`
/// - Windows: `%APPDATA%\folio\config\config.toml`
///
/// # Example
/// ```toml
/// [llm]
/// preferred_provider = "groq"
/// call_timeout_secs = 45
///
/// [llm.providers.primary]
/// model = "gemini-2.5-flash"
///
/// [ui]
/// colored = true
/// min_display_ms = 600
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AppConfig {
    /// Provider selection and per-tier settings.
    #[serde(default)]
    pub llm: LLMConfig,

    /// HTTP timeout settings.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Terminal UI behavior.
    #[serde(default)]
    pub ui: UIConfig,
}

impl AppConfig {
    /// Validates configuration consistency.
    pub fn validate(&self) -> Result<()> {
        self.llm.validate()?;
        self.network.validate()?;
        Ok(())
    }
}

/// UI configuration.
///
/// # Fields
/// - `colored`: enable colored output (default: `true`)
/// - `language`: UI language in BCP 47 format (for example `"en"`, `"zh-CN"`), auto-detected by default
/// - `min_display_ms`: minimum time the loading spinner stays visible (default: `600`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UIConfig {
    /// Whether to enable color output.
    #[serde(default = "default_true")]
    pub colored: bool,

    /// UI language in BCP 47 format (for example `"en"`, `"zh-CN"`).
    /// `None` means auto-detect from system locale.
    #[serde(default)]
    pub language: Option<String>,

    /// Minimum spinner display duration in milliseconds.
    #[serde(default = "default_min_display_ms")]
    pub min_display_ms: u64,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            colored: true,
            language: None,
            min_display_ms: default_min_display_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_min_display_ms() -> u64 {
    crate::constants::ui::DEFAULT_MIN_DISPLAY_MS
}
