//! Static provider
//!
//! Network-free answers for every capability. Book lists come from a small
//! catalogue of public-domain classics; free-text operations first try one
//! last-resort call to the tertiary endpoint (when it has a credential and is
//! not already the active provider) and otherwise return a localized
//! placeholder. [`OfflineProvider::respond`] cannot fail.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::llm::chapter::{ChapterBlock, render_chapter};
use crate::llm::{
    BookAssistant, BookSuggestion, CapabilityRequest, CapabilityResult, ConciergeReply,
    ReviewEntry,
};

/// Name reported by [`FallbackChain::active_provider`](super::fallback::FallbackChain::active_provider).
pub const STATIC_PROVIDER_NAME: &str = "static";

struct CatalogueEntry {
    slug: &'static str,
    title: &'static str,
    author: &'static str,
    description: &'static str,
    year: &'static str,
    categories: &'static [&'static str],
    color: &'static str,
}

const CATALOGUE: &[CatalogueEntry] = &[
    CatalogueEntry {
        slug: "pride-and-prejudice",
        title: "Pride and Prejudice",
        author: "Jane Austen",
        description: "Elizabeth Bennet spars with the proud Mr. Darcy in a sharp comedy of manners about first impressions.",
        year: "1813",
        categories: &["Classic", "Romance"],
        color: "#BE185D",
    },
    CatalogueEntry {
        slug: "moby-dick",
        title: "Moby-Dick",
        author: "Herman Melville",
        description: "Captain Ahab drives the Pequod across the oceans in pursuit of the white whale that took his leg.",
        year: "1851",
        categories: &["Classic", "Adventure"],
        color: "#1E3A8A",
    },
    CatalogueEntry {
        slug: "frankenstein",
        title: "Frankenstein",
        author: "Mary Shelley",
        description: "A young scientist gives life to a creature and flees from what he has made.",
        year: "1818",
        categories: &["Classic", "Horror", "Science Fiction"],
        color: "#065F46",
    },
    CatalogueEntry {
        slug: "dracula",
        title: "Dracula",
        author: "Bram Stoker",
        description: "Letters and diaries trace the Count's journey from Transylvania to England and the hunt that follows.",
        year: "1897",
        categories: &["Classic", "Horror"],
        color: "#7F1D1D",
    },
    CatalogueEntry {
        slug: "adventures-of-sherlock-holmes",
        title: "The Adventures of Sherlock Holmes",
        author: "Arthur Conan Doyle",
        description: "Twelve cases for the detective of Baker Street, narrated by his friend Dr. Watson.",
        year: "1892",
        categories: &["Classic", "Mystery"],
        color: "#78350F",
    },
    CatalogueEntry {
        slug: "jane-eyre",
        title: "Jane Eyre",
        author: "Charlotte Brontë",
        description: "An orphaned governess finds love and a dark secret at Thornfield Hall.",
        year: "1847",
        categories: &["Classic", "Romance", "Gothic"],
        color: "#4C1D95",
    },
    CatalogueEntry {
        slug: "picture-of-dorian-gray",
        title: "The Picture of Dorian Gray",
        author: "Oscar Wilde",
        description: "A portrait ages in the attic while its subject stays young and grows cruel.",
        year: "1890",
        categories: &["Classic", "Philosophical Fiction"],
        color: "#374151",
    },
    CatalogueEntry {
        slug: "alices-adventures-in-wonderland",
        title: "Alice's Adventures in Wonderland",
        author: "Lewis Carroll",
        description: "Alice follows a white rabbit underground into a world of riddles and nonsense.",
        year: "1865",
        categories: &["Classic", "Fantasy", "Children"],
        color: "#0E7490",
    },
];

/// Onboarding picks are the first entries of the catalogue.
const ONBOARDING_PICKS: usize = 6;
const CONCIERGE_PICKS: usize = 3;

struct CannedReview {
    reviewer: &'static str,
    rating: u8,
    text: &'static str,
    date: &'static str,
    color: &'static str,
}

const REVIEWS: &[CannedReview] = &[
    CannedReview {
        reviewer: "Margaret H.",
        rating: 5,
        text: "I could not put it down. The characters stayed with me for weeks.",
        date: "2024-03-12",
        color: "#10B981",
    },
    CannedReview {
        reviewer: "Tom R.",
        rating: 4,
        text: "A slow start, but the second half more than makes up for it.",
        date: "2024-05-28",
        color: "#3B82F6",
    },
    CannedReview {
        reviewer: "Priya S.",
        rating: 4,
        text: "Beautifully written. Some passages are worth reading twice.",
        date: "2024-08-02",
        color: "#F59E0B",
    },
    CannedReview {
        reviewer: "Jonas K.",
        rating: 3,
        text: "Not quite what I expected, but I am glad I read it.",
        date: "2024-10-19",
        color: "#EF4444",
    },
];

/// 静态 provider
///
/// 不实现 [`BookAssistant`]：它永远返回结果，没有失败路径。
pub struct OfflineProvider {
    last_resort: Option<Arc<dyn BookAssistant>>,
    call_timeout: Duration,
}

impl OfflineProvider {
    /// Static answers only.
    pub fn new() -> Self {
        Self {
            last_resort: None,
            call_timeout: Duration::from_secs(crate::constants::llm::DEFAULT_CALL_TIMEOUT_SECS),
        }
    }

    /// Static answers, with `assistant` tried first for free-text operations.
    pub fn with_last_resort(assistant: Arc<dyn BookAssistant>, call_timeout: Duration) -> Self {
        Self {
            last_resort: Some(assistant),
            call_timeout,
        }
    }

    pub fn has_last_resort(&self) -> bool {
        self.last_resort.is_some()
    }

    /// Answers `request`; never fails.
    pub async fn respond(&self, request: &CapabilityRequest) -> CapabilityResult {
        let kind = request.kind();

        if kind.is_free_text()
            && let Some(assistant) = &self.last_resort
        {
            let name = assistant.name();
            match tokio::time::timeout(self.call_timeout, assistant.invoke(request)).await {
                Ok(Ok(result)) if result.matches(kind) => {
                    debug!("Last-resort provider '{}' answered {}", name, kind);
                    return result;
                }
                Ok(Ok(_)) => warn!(
                    "Last-resort provider '{}' returned the wrong shape for {}",
                    name, kind
                ),
                Ok(Err(e)) => warn!("Last-resort provider '{}' failed for {}: {}", name, kind, e),
                Err(_) => warn!(
                    "Last-resort provider '{}' timed out after {}s for {}",
                    name,
                    self.call_timeout.as_secs(),
                    kind
                ),
            }
        }

        Self::placeholder(request)
    }

    /// Canned answer for `request`. Pure and deterministic.
    pub fn placeholder(request: &CapabilityRequest) -> CapabilityResult {
        match request {
            CapabilityRequest::SearchBooks { query } => CapabilityResult::Books(search(query)),
            CapabilityRequest::Onboarding { .. } => CapabilityResult::Books(
                CATALOGUE
                    .iter()
                    .take(ONBOARDING_PICKS)
                    .map(|entry| suggestion(entry, Some(matched_reason())))
                    .collect(),
            ),
            CapabilityRequest::Concierge { .. } => CapabilityResult::Concierge(ConciergeReply {
                reply: rust_i18n::t!("offline.concierge_reply").to_string(),
                suggestions: CATALOGUE
                    .iter()
                    .take(CONCIERGE_PICKS)
                    .map(|entry| suggestion(entry, Some(matched_reason())))
                    .collect(),
            }),
            CapabilityRequest::GenerateReviews { .. } => CapabilityResult::Reviews(
                REVIEWS
                    .iter()
                    .map(|review| ReviewEntry {
                        reviewer: review.reviewer.to_string(),
                        rating: review.rating,
                        text: review.text.to_string(),
                        date: review.date.to_string(),
                        avatar_color: review.color.to_string(),
                    })
                    .collect(),
            ),
            CapabilityRequest::ChatAboutBook { title, .. } => CapabilityResult::Text(
                rust_i18n::t!("offline.chat", title = title.as_str()).to_string(),
            ),
            CapabilityRequest::Translate { .. } => {
                CapabilityResult::Text(rust_i18n::t!("offline.translate").to_string())
            }
            CapabilityRequest::ExplainContext { .. } => {
                CapabilityResult::Text(rust_i18n::t!("offline.explain").to_string())
            }
            CapabilityRequest::GenerateChapter { .. } => CapabilityResult::Text(render_chapter(&[
                ChapterBlock::Heading(rust_i18n::t!("offline.chapter_heading").to_string()),
                ChapterBlock::Paragraph(rust_i18n::t!("offline.chapter_body").to_string()),
            ])),
            CapabilityRequest::Summarize { title } => CapabilityResult::Text(
                rust_i18n::t!("offline.summary", title = title.as_str()).to_string(),
            ),
            CapabilityRequest::Recap { title } => CapabilityResult::Text(
                rust_i18n::t!("offline.recap", title = title.as_str()).to_string(),
            ),
        }
    }
}

impl Default for OfflineProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Catalogue entries whose title or author contains `query` (case-insensitive);
/// the whole catalogue when nothing matches.
fn search(query: &str) -> Vec<BookSuggestion> {
    let needle = query.trim().to_lowercase();
    let hits: Vec<&CatalogueEntry> = CATALOGUE
        .iter()
        .filter(|entry| {
            !needle.is_empty()
                && (entry.title.to_lowercase().contains(&needle)
                    || entry.author.to_lowercase().contains(&needle))
        })
        .collect();

    let entries: Vec<&CatalogueEntry> = if hits.is_empty() {
        CATALOGUE.iter().collect()
    } else {
        hits
    };
    entries
        .into_iter()
        .map(|entry| suggestion(entry, None))
        .collect()
}

fn suggestion(entry: &CatalogueEntry, match_reason: Option<String>) -> BookSuggestion {
    BookSuggestion {
        id: format!("static-{}", entry.slug),
        title: entry.title.to_string(),
        author: entry.author.to_string(),
        description: entry.description.to_string(),
        published_year: entry.year.to_string(),
        categories: entry.categories.iter().map(|c| c.to_string()).collect(),
        fallback_color: entry.color.to_string(),
        isbn: None,
        match_reason,
    }
}

fn matched_reason() -> String {
    rust_i18n::t!("offline.match_reason").to_string()
}
