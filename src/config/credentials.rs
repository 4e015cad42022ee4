// 凭据读取
//
// API key 只从环境变量读取，启动时读取一次，之后不再变化。

use std::collections::HashMap;

use super::structs::{LLMConfig, ProviderKind};

/// API keys of the live tiers.
///
/// Empty or whitespace-only values count as absent. `Debug` output masks the
/// keys.
#[derive(Clone, Default)]
pub struct Credentials {
    keys: HashMap<ProviderKind, String>,
}

impl Credentials {
    /// No credentials at all (offline mode).
    pub fn none() -> Self {
        Self::default()
    }

    /// Reads every live tier's key from the process environment.
    pub fn from_env(llm: &LLMConfig) -> Self {
        Self::from_lookup(llm, |name| std::env::var(name).ok())
    }

    /// Reads every live tier's key through `lookup` (variable name -> value).
    pub fn from_lookup<F>(llm: &LLMConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut credentials = Self::none();
        for kind in ProviderKind::LIVE {
            let Some(var) = llm.api_key_env(kind) else {
                continue;
            };
            if let Some(value) = lookup(&var) {
                credentials = credentials.with_key(kind, value);
            }
        }
        tracing::debug!("Credentials loaded: {:?}", credentials);
        credentials
    }

    /// Adds a key for a live tier (ignored when blank or for `Static`).
    pub fn with_key(mut self, kind: ProviderKind, key: impl Into<String>) -> Self {
        let key = key.into();
        let trimmed = key.trim();
        if kind.is_live() && !trimmed.is_empty() {
            self.keys.insert(kind, trimmed.to_string());
        }
        self
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&str> {
        self.keys.get(&kind).map(String::as_str)
    }

    /// Whether `kind` can be used. `Static` needs no credential.
    pub fn has(&self, kind: ProviderKind) -> bool {
        !kind.is_live() || self.keys.contains_key(&kind)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use crate::llm::provider::utils::mask_api_key;
        let mut map = f.debug_map();
        for kind in ProviderKind::LIVE {
            let masked = self.get(kind).map(mask_api_key);
            map.entry(&kind.name(), &masked);
        }
        map.finish()
    }
}
