use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::{AppConfig, Credentials, ProviderKind};
use crate::constants::capability::{DEFAULT_CHAPTER, DEFAULT_TARGET_LANG};
use crate::error::{FolioError, Result};
use crate::llm::{
    BookAssistant, BookSuggestion, CapabilityRequest, CapabilityResult, ChatTurn,
    ConciergeReply, ReviewEntry,
};

use super::offline::{OfflineProvider, STATIC_PROVIDER_NAME};
use super::selector::ActiveProvider;
use super::{create_alternate_assistant, create_assistant};

/// Capability surface with the failure chain built in
///
/// Each call walks `live -> live with alternate model -> static` and stops at
/// the first provider that answers with the right shape. Every state runs at
/// most once per call. Nothing here returns an error.
pub struct FallbackChain {
    active: ActiveProvider,
    live: Option<Arc<dyn BookAssistant>>,
    second: Option<Arc<dyn BookAssistant>>,
    offline: OfflineProvider,
    call_timeout: Duration,
}

impl FallbackChain {
    /// Creates a chain from prepared parts.
    ///
    /// `second` is only used for operations that allow a second live attempt.
    pub fn new(
        active: ActiveProvider,
        live: Option<Arc<dyn BookAssistant>>,
        second: Option<Arc<dyn BookAssistant>>,
        offline: OfflineProvider,
        call_timeout: Duration,
    ) -> Self {
        Self {
            active,
            live,
            second,
            offline,
            call_timeout,
        }
    }

    /// Chain that never touches the network.
    pub fn offline_only() -> Self {
        Self::new(
            ProviderKind::Static.into(),
            None,
            None,
            OfflineProvider::new(),
            Duration::from_secs(crate::constants::llm::DEFAULT_CALL_TIMEOUT_SECS),
        )
    }

    /// Create FallbackChain from configuration
    ///
    /// Selects the active provider once. A provider that fails to build is
    /// logged and skipped, leaving the chain on the static provider.
    pub fn from_config(config: &AppConfig, credentials: &Credentials) -> Self {
        let call_timeout = Duration::from_secs(config.llm.call_timeout_secs);
        let mut active = ActiveProvider::select(credentials, config.llm.preferred_provider);

        let mut live = None;
        let mut second = None;
        if active.is_live() {
            match create_assistant(active.kind(), config, credentials) {
                Ok(assistant) => {
                    live = Some(assistant);
                    second = create_alternate_assistant(active.kind(), config, credentials)
                        .unwrap_or_else(|e| {
                            debug!("Alternate model for '{}' unavailable: {}", active.name(), e);
                            None
                        });
                }
                Err(e) => {
                    warn!("Provider '{}' failed to create: {}", active.name(), e);
                    active = ProviderKind::Static.into();
                }
            }
        }

        let offline = Self::build_offline(active, config, credentials, call_timeout);
        debug!(
            "Active provider: {} (alternate model: {}, last resort: {})",
            active.name(),
            second.is_some(),
            offline.has_last_resort()
        );

        Self::new(active, live, second, offline, call_timeout)
    }

    /// Static provider, with the tertiary endpoint as last resort when it has a
    /// credential of its own and is not the active provider.
    fn build_offline(
        active: ActiveProvider,
        config: &AppConfig,
        credentials: &Credentials,
        call_timeout: Duration,
    ) -> OfflineProvider {
        if active.kind() == ProviderKind::Tertiary || !credentials.has(ProviderKind::Tertiary) {
            return OfflineProvider::new();
        }
        match create_assistant(ProviderKind::Tertiary, config, credentials) {
            Ok(assistant) => OfflineProvider::with_last_resort(assistant, call_timeout),
            Err(e) => {
                debug!("Last-resort provider failed to create: {}", e);
                OfflineProvider::new()
            }
        }
    }

    /// Identifier of the provider bound at startup.
    pub fn active_provider(&self) -> &str {
        if self.live.is_some() {
            self.active.name()
        } else {
            STATIC_PROVIDER_NAME
        }
    }

    /// `false` when every call goes straight to the static provider.
    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    /// Runs one capability through the chain.
    pub async fn run(&self, request: &CapabilityRequest) -> CapabilityResult {
        let kind = request.kind();

        let mut attempts: Vec<&Arc<dyn BookAssistant>> = Vec::with_capacity(2);
        if let Some(live) = &self.live {
            attempts.push(live);
            if kind.has_second_attempt()
                && let Some(second) = &self.second
            {
                attempts.push(second);
            }
        }

        for (i, assistant) in attempts.iter().copied().enumerate() {
            match self.attempt(assistant.as_ref(), request).await {
                Ok(result) => return result,
                Err(e) => {
                    warn!(
                        "Provider '{}' failed {} (attempt {}/{}): {}",
                        assistant.name(),
                        kind,
                        i + 1,
                        attempts.len(),
                        e
                    );
                    // 凭据缺失时第二次尝试也必然失败，直接进入静态 provider
                    if e.is_configuration() {
                        break;
                    }
                }
            }
        }

        if !attempts.is_empty() {
            debug!("Falling back to static provider for {}", kind);
        }
        self.offline.respond(request).await
    }

    /// One bounded live attempt; a result of the wrong shape counts as malformed.
    async fn attempt(
        &self,
        assistant: &dyn BookAssistant,
        request: &CapabilityRequest,
    ) -> Result<CapabilityResult> {
        let kind = request.kind();
        let result = tokio::time::timeout(self.call_timeout, assistant.invoke(request))
            .await
            .map_err(|_| FolioError::Timeout {
                provider: assistant.name(),
                secs: self.call_timeout.as_secs(),
            })??;

        if !result.matches(kind) {
            return Err(FolioError::MalformedResponse {
                provider: assistant.name(),
                preview: format!("expected a {} result", kind),
            });
        }
        Ok(result)
    }

    pub async fn search_books(&self, query: &str) -> Vec<BookSuggestion> {
        let request = CapabilityRequest::SearchBooks {
            query: query.to_string(),
        };
        let result = self.run(&request).await;
        books_or_placeholder(result, &request)
    }

    pub async fn consult_concierge(&self, message: &str, history: &[ChatTurn]) -> ConciergeReply {
        let request = CapabilityRequest::Concierge {
            message: message.to_string(),
            history: history.to_vec(),
        };
        let result = self.run(&request).await;
        result
            .into_concierge()
            .or_else(|| OfflineProvider::placeholder(&request).into_concierge())
            .unwrap_or_else(|| ConciergeReply {
                reply: String::new(),
                suggestions: Vec::new(),
            })
    }

    pub async fn get_onboarding_recommendations(
        &self,
        genres: &[String],
        reading_goal: &str,
    ) -> Vec<BookSuggestion> {
        let request = CapabilityRequest::Onboarding {
            genres: genres.to_vec(),
            goal: reading_goal.to_string(),
        };
        let result = self.run(&request).await;
        books_or_placeholder(result, &request)
    }

    pub async fn generate_reviews(&self, title: &str, author: &str) -> Vec<ReviewEntry> {
        let request = CapabilityRequest::GenerateReviews {
            title: title.to_string(),
            author: author.to_string(),
        };
        let result = self.run(&request).await;
        result
            .into_reviews()
            .or_else(|| OfflineProvider::placeholder(&request).into_reviews())
            .unwrap_or_default()
    }

    pub async fn chat_about_book(&self, title: &str, message: &str, history: &[ChatTurn]) -> String {
        self.text(CapabilityRequest::ChatAboutBook {
            title: title.to_string(),
            message: message.to_string(),
            history: history.to_vec(),
        })
        .await
    }

    /// `target_lang` defaults to English.
    pub async fn translate_text(&self, text: &str, target_lang: Option<&str>) -> String {
        self.text(CapabilityRequest::Translate {
            text: text.to_string(),
            target_lang: target_lang.unwrap_or(DEFAULT_TARGET_LANG).to_string(),
        })
        .await
    }

    pub async fn explain_context(&self, text: &str, title: &str) -> String {
        self.text(CapabilityRequest::ExplainContext {
            text: text.to_string(),
            title: title.to_string(),
        })
        .await
    }

    /// Chapter as an HTML fragment of `<h3>`/`<p>` blocks. `chapter` defaults to 1.
    pub async fn generate_book_content(
        &self,
        title: &str,
        author: &str,
        chapter: Option<u32>,
    ) -> String {
        self.text(CapabilityRequest::GenerateChapter {
            title: title.to_string(),
            author: author.to_string(),
            chapter: chapter.unwrap_or(DEFAULT_CHAPTER),
        })
        .await
    }

    pub async fn get_book_summary(&self, title: &str) -> String {
        self.text(CapabilityRequest::Summarize {
            title: title.to_string(),
        })
        .await
    }

    pub async fn get_book_recap(&self, title: &str) -> String {
        self.text(CapabilityRequest::Recap {
            title: title.to_string(),
        })
        .await
    }

    async fn text(&self, request: CapabilityRequest) -> String {
        let result = self.run(&request).await;
        result
            .into_text()
            .or_else(|| OfflineProvider::placeholder(&request).into_text())
            .unwrap_or_default()
    }
}

fn books_or_placeholder(result: CapabilityResult, request: &CapabilityRequest) -> Vec<BookSuggestion> {
    result
        .into_books()
        .or_else(|| OfflineProvider::placeholder(request).into_books())
        .unwrap_or_default()
}
