//! Capability types and the provider interface.
//!
//! Every AI-backed reading aid is one [`CapabilityRequest`] variant answered by
//! one [`CapabilityResult`] shape. Providers implement [`BookAssistant`]; the
//! [`FallbackChain`](provider::fallback::FallbackChain) turns those fallible
//! calls into the infallible capability surface used by the application.

/// Chapter HTML parsing and re-rendering.
pub mod chapter;
/// Prompt construction for each capability.
pub mod prompt;
/// Built-in providers, normalizer, selector and fallback chain.
pub mod provider;
/// Response shapes, JSON schemas and field instructions.
pub mod schema;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Speaker of one conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The reader.
    User,
    /// The assistant. `"assistant"` is accepted on input.
    #[serde(alias = "assistant")]
    Model,
}

/// One turn of a conversation history, passed in by value by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// A book recommended, found or suggested by a provider.
///
/// `id` is generated per call; two calls for the same book yield different ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSuggestion {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    /// Free text, not validated ("1851", "c. 1600", "").
    pub published_year: String,
    /// Set-like; order carries no meaning.
    pub categories: Vec<String>,
    /// Cover color used when no artwork is available.
    pub fallback_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    /// Only present for personalized operations (concierge, onboarding).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_reason: Option<String>,
}

/// A generated reader review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry {
    pub reviewer: String,
    /// Always within `1..=5`.
    pub rating: u8,
    pub text: String,
    pub date: String,
    pub avatar_color: String,
}

/// Reply of the reading concierge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConciergeReply {
    pub reply: String,
    pub suggestions: Vec<BookSuggestion>,
}

/// Operation kind, without its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    SearchBooks,
    Concierge,
    Onboarding,
    GenerateReviews,
    ChatAboutBook,
    Translate,
    ExplainContext,
    GenerateChapter,
    Summarize,
    Recap,
}

impl CapabilityKind {
    /// Stable identifier used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SearchBooks => "search_books",
            Self::Concierge => "concierge",
            Self::Onboarding => "onboarding",
            Self::GenerateReviews => "generate_reviews",
            Self::ChatAboutBook => "chat_about_book",
            Self::Translate => "translate",
            Self::ExplainContext => "explain_context",
            Self::GenerateChapter => "generate_chapter",
            Self::Summarize => "summarize",
            Self::Recap => "recap",
        }
    }

    /// Operations that get one extra attempt with the provider's alternate
    /// model before dropping to the static provider.
    pub fn has_second_attempt(&self) -> bool {
        matches!(
            self,
            Self::Concierge | Self::ChatAboutBook | Self::GenerateChapter
        )
    }

    /// Free-text operations the static provider may forward to the
    /// last-resort endpoint.
    pub fn is_free_text(&self) -> bool {
        matches!(
            self,
            Self::ChatAboutBook
                | Self::Translate
                | Self::ExplainContext
                | Self::GenerateChapter
                | Self::Summarize
                | Self::Recap
        )
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One capability call with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityRequest {
    SearchBooks {
        query: String,
    },
    Concierge {
        message: String,
        history: Vec<ChatTurn>,
    },
    Onboarding {
        genres: Vec<String>,
        goal: String,
    },
    GenerateReviews {
        title: String,
        author: String,
    },
    ChatAboutBook {
        title: String,
        message: String,
        history: Vec<ChatTurn>,
    },
    Translate {
        text: String,
        target_lang: String,
    },
    ExplainContext {
        text: String,
        title: String,
    },
    GenerateChapter {
        title: String,
        author: String,
        chapter: u32,
    },
    Summarize {
        title: String,
    },
    Recap {
        title: String,
    },
}

impl CapabilityRequest {
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Self::SearchBooks { .. } => CapabilityKind::SearchBooks,
            Self::Concierge { .. } => CapabilityKind::Concierge,
            Self::Onboarding { .. } => CapabilityKind::Onboarding,
            Self::GenerateReviews { .. } => CapabilityKind::GenerateReviews,
            Self::ChatAboutBook { .. } => CapabilityKind::ChatAboutBook,
            Self::Translate { .. } => CapabilityKind::Translate,
            Self::ExplainContext { .. } => CapabilityKind::ExplainContext,
            Self::GenerateChapter { .. } => CapabilityKind::GenerateChapter,
            Self::Summarize { .. } => CapabilityKind::Summarize,
            Self::Recap { .. } => CapabilityKind::Recap,
        }
    }

    /// Conversation history carried by the request (empty for one-shot operations).
    pub fn history(&self) -> &[ChatTurn] {
        match self {
            Self::Concierge { history, .. } | Self::ChatAboutBook { history, .. } => history,
            _ => &[],
        }
    }
}

/// Canonical result of a capability call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CapabilityResult {
    Books(Vec<BookSuggestion>),
    Concierge(ConciergeReply),
    Reviews(Vec<ReviewEntry>),
    Text(String),
}

impl CapabilityResult {
    /// Whether this result has the shape declared for `kind`.
    pub fn matches(&self, kind: CapabilityKind) -> bool {
        match self {
            Self::Books(_) => matches!(
                kind,
                CapabilityKind::SearchBooks | CapabilityKind::Onboarding
            ),
            Self::Concierge(_) => kind == CapabilityKind::Concierge,
            Self::Reviews(_) => kind == CapabilityKind::GenerateReviews,
            Self::Text(_) => kind.is_free_text(),
        }
    }

    pub fn into_books(self) -> Option<Vec<BookSuggestion>> {
        match self {
            Self::Books(books) => Some(books),
            _ => None,
        }
    }

    pub fn into_concierge(self) -> Option<ConciergeReply> {
        match self {
            Self::Concierge(reply) => Some(reply),
            _ => None,
        }
    }

    pub fn into_reviews(self) -> Option<Vec<ReviewEntry>> {
        match self {
            Self::Reviews(reviews) => Some(reviews),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Interface implemented by every provider.
///
/// Implementations report every failure (missing credential, transport,
/// HTTP status, unparseable payload) as `Err`; they never return a partially
/// valid result. Adapters get this trait for free by implementing
/// [`ApiBackend`](provider::base::ApiBackend); the static provider does not
/// implement it because it cannot fail.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BookAssistant: Send + Sync {
    /// Runs one capability against this provider.
    async fn invoke(&self, request: &CapabilityRequest) -> Result<CapabilityResult>;

    /// Provider identifier (used for logs and `active_provider()`).
    fn name(&self) -> String;
}
