//! Response normalizer
//!
//! Turns raw provider text into the canonical capability shapes. Models wrap
//! JSON in markdown fences, prepend prose, rename fields or leave them out;
//! everything here is tolerant of that and fills per-field defaults in one
//! place. Pure and synchronous.

use std::fmt;

use serde_json::{Map, Value};

use crate::constants::ui::ERROR_PREVIEW_LENGTH;
use crate::error::FolioError;
use crate::llm::chapter::{parse_chapter, render_chapter};
use crate::llm::schema::ResponseShape;
use crate::llm::{BookSuggestion, CapabilityResult, ConciergeReply, ReviewEntry};

const DEFAULT_AUTHOR: &str = "Unknown Author";
const DEFAULT_CATEGORY: &str = "General";
const DEFAULT_FALLBACK_COLOR: &str = "#6366F1";
const DEFAULT_MATCH_REASON: &str = "Picked to match your reading interests";
const DEFAULT_REVIEWER: &str = "Anonymous Reader";
const DEFAULT_RATING: u8 = 4;
const DEFAULT_AVATAR_COLOR: &str = "#F59E0B";

/// Keys under which providers wrap a list of books.
const BOOK_LIST_KEYS: &[&str] = &["books", "results", "suggestions", "recommendations", "items"];

/// Keys a JSON-happy model uses when asked for plain text.
const TEXT_KEYS: &[&str] = &[
    "text",
    "translation",
    "reply",
    "summary",
    "explanation",
    "recap",
    "content",
];

/// The payload could not be mapped into the requested shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unparseable {
    pub reason: String,
    /// Truncated raw payload, for logs.
    pub preview: String,
}

impl Unparseable {
    fn new(reason: impl Into<String>, raw: &str) -> Self {
        Self {
            reason: reason.into(),
            preview: truncate_for_preview(raw),
        }
    }

    /// Converts into the provider-layer error.
    pub fn into_error(self, provider: &str) -> FolioError {
        FolioError::MalformedResponse {
            provider: provider.to_string(),
            preview: format!("{} ({})", self.reason, self.preview),
        }
    }
}

impl fmt::Display for Unparseable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.reason, self.preview)
    }
}

impl std::error::Error for Unparseable {}

/// Truncate string for error preview (safe handling of multibyte characters)
pub fn truncate_for_preview(s: &str) -> String {
    if s.len() <= ERROR_PREVIEW_LENGTH {
        return s.to_string();
    }
    // Find the last char boundary that does not exceed max_len
    let boundary = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= ERROR_PREVIEW_LENGTH)
        .last()
        .unwrap_or(0);
    format!("{}...", &s[..boundary])
}

/// Strips one surrounding markdown code fence, with or without a language tag.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        // Skip optional language tag (e.g., "json", "html", etc.)
        let after_lang = match rest.find('\n') {
            Some(newline_pos) => {
                let lang_part = &rest[..newline_pos];
                if lang_part.trim().len() <= 20 && !lang_part.contains(' ') {
                    &rest[newline_pos + 1..]
                } else {
                    rest
                }
            }
            None => rest,
        };

        if let Some(inner) = after_lang.trim_end().strip_suffix("```") {
            return inner.trim();
        }
    }

    trimmed
}

/// Byte ranges of every balanced `{...}`/`[...]` span, ordered by start.
///
/// One pass over the text. Brackets inside string literals of an open span
/// are ignored; a mismatched closer discards every open bracket before it.
fn balanced_spans(text: &str) -> Vec<(usize, usize)> {
    let mut open: Vec<(usize, char)> = Vec::new();
    let mut spans = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' if !open.is_empty() => in_string = true,
            '{' => open.push((i, '}')),
            '[' => open.push((i, ']')),
            '}' | ']' => match open.pop() {
                Some((start, expected)) if expected == c => spans.push((start, i + c.len_utf8())),
                Some(_) => open.clear(),
                None => {}
            },
            _ => {}
        }
    }

    spans.sort_unstable_by_key(|&(start, _)| start);
    spans
}

/// Parses the first balanced JSON span embedded in prose.
fn parse_embedded_json(text: &str) -> Option<Value> {
    balanced_spans(text)
        .into_iter()
        .find_map(|(start, end)| serde_json::from_str(&text[start..end]).ok())
}

/// Lenient JSON parse.
///
/// Tries, in order: the whole text, the text inside one markdown fence, and
/// the first balanced `{...}`/`[...]` span.
pub fn parse_lenient_json(raw: &str) -> Result<Value, Unparseable> {
    let trimmed = raw.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    let unfenced = strip_code_fence(trimmed);
    if unfenced.len() != trimmed.len()
        && let Ok(value) = serde_json::from_str(unfenced)
    {
        return Ok(value);
    }

    parse_embedded_json(unfenced).ok_or_else(|| Unparseable::new("no JSON value found", raw))
}

/// Maps a raw provider reply into the canonical shape, filling defaults.
pub fn normalize(raw: &str, shape: ResponseShape) -> Result<CapabilityResult, Unparseable> {
    match shape {
        ResponseShape::Books { personalized } => {
            let value = parse_lenient_json(raw)?;
            books_from_value(&value, personalized, raw).map(CapabilityResult::Books)
        }
        ResponseShape::Concierge => {
            let value = parse_lenient_json(raw)?;
            concierge_from_value(&value, raw).map(CapabilityResult::Concierge)
        }
        ResponseShape::Reviews => {
            let value = parse_lenient_json(raw)?;
            reviews_from_value(&value, raw).map(CapabilityResult::Reviews)
        }
        ResponseShape::Text => normalize_text(raw).map(CapabilityResult::Text),
        ResponseShape::Chapter => {
            let text = normalize_text(raw)?;
            let blocks = parse_chapter(&text);
            if blocks.is_empty() {
                return Err(Unparseable::new("chapter has no readable content", raw));
            }
            Ok(CapabilityResult::Text(render_chapter(&blocks)))
        }
    }
}

/// Cleans a free-text reply.
pub fn normalize_text(raw: &str) -> Result<String, Unparseable> {
    let cleaned = strip_code_fence(raw);

    let unwrapped = match serde_json::from_str::<Value>(cleaned) {
        Ok(Value::String(text)) => Some(text),
        Ok(Value::Object(map)) => TEXT_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    };

    let text = unwrapped.as_deref().unwrap_or(cleaned).trim();
    if text.is_empty() {
        return Err(Unparseable::new("empty text", raw));
    }
    Ok(text.to_string())
}

fn books_from_value(
    value: &Value,
    personalized: bool,
    raw: &str,
) -> Result<Vec<BookSuggestion>, Unparseable> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => match BOOK_LIST_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
        {
            Some(items) => items.iter().collect(),
            // A single book object instead of a list
            None if map.contains_key("title") => vec![value],
            None => return Err(Unparseable::new("expected a list of books", raw)),
        },
        _ => return Err(Unparseable::new("expected a list of books", raw)),
    };

    items
        .into_iter()
        .map(|item| {
            item.as_object()
                .and_then(|obj| book_from_object(obj, personalized))
                .ok_or_else(|| Unparseable::new("book entry without a title", raw))
        })
        .collect()
}

fn book_from_object(obj: &Map<String, Value>, personalized: bool) -> Option<BookSuggestion> {
    let title = text_field(obj, &["title", "name"])?;

    let categories = match first_present(obj, &["categories", "genres", "category", "genre"]) {
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(scalar_to_string)
            .collect::<Vec<_>>(),
        Some(Value::String(joined)) => joined
            .split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect(),
        _ => Vec::new(),
    };
    let categories = if categories.is_empty() {
        vec![DEFAULT_CATEGORY.to_string()]
    } else {
        categories
    };

    let match_reason = personalized.then(|| {
        text_field(obj, &["matchReason", "match_reason", "reason"])
            .unwrap_or_else(|| DEFAULT_MATCH_REASON.to_string())
    });

    Some(BookSuggestion {
        id: text_field(obj, &["id"]).unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        title,
        author: text_field(obj, &["author", "authors", "writer"])
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        description: text_field(obj, &["description", "summary", "synopsis"]).unwrap_or_default(),
        published_year: text_field(obj, &["publishedYear", "published_year", "year"])
            .unwrap_or_default(),
        categories,
        fallback_color: text_field(obj, &["fallbackColor", "fallback_color", "color"])
            .unwrap_or_else(|| DEFAULT_FALLBACK_COLOR.to_string()),
        isbn: text_field(obj, &["isbn", "ISBN"]),
        match_reason,
    })
}

fn concierge_from_value(value: &Value, raw: &str) -> Result<ConciergeReply, Unparseable> {
    let obj = value
        .as_object()
        .ok_or_else(|| Unparseable::new("expected a concierge object", raw))?;
    let reply = text_field(obj, &["reply", "message", "response"])
        .ok_or_else(|| Unparseable::new("concierge reply is missing", raw))?;

    let suggestions = match first_present(obj, &["suggestions", "books", "recommendations"]) {
        Some(list @ Value::Array(_)) => books_from_value(list, true, raw)?,
        _ => Vec::new(),
    };

    Ok(ConciergeReply { reply, suggestions })
}

fn reviews_from_value(value: &Value, raw: &str) -> Result<Vec<ReviewEntry>, Unparseable> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => map
            .get("reviews")
            .and_then(Value::as_array)
            .ok_or_else(|| Unparseable::new("expected a list of reviews", raw))?,
        _ => return Err(Unparseable::new("expected a list of reviews", raw)),
    };

    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    items
        .iter()
        .map(|item| {
            let obj = item
                .as_object()
                .ok_or_else(|| Unparseable::new("review entry is not an object", raw))?;
            Ok(ReviewEntry {
                reviewer: text_field(obj, &["reviewer", "name", "author"])
                    .unwrap_or_else(|| DEFAULT_REVIEWER.to_string()),
                rating: parse_rating(first_present(obj, &["rating", "stars", "score"])),
                text: text_field(obj, &["text", "review", "content"]).unwrap_or_default(),
                date: text_field(obj, &["date"]).unwrap_or_else(|| today.clone()),
                avatar_color: text_field(obj, &["avatarColor", "avatar_color", "color"])
                    .unwrap_or_else(|| DEFAULT_AVATAR_COLOR.to_string()),
            })
        })
        .collect()
}

/// Rating from a number or numeric string ("4", "4.6", "4/5"), rounded and
/// clamped to `1..=5`.
fn parse_rating(value: Option<&Value>) -> u8 {
    let rating = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.split('/').next().and_then(|r| r.trim().parse().ok()),
        _ => None,
    };
    match rating {
        Some(r) if r.is_finite() => r.round().clamp(1.0, 5.0) as u8,
        _ => DEFAULT_RATING,
    }
}

fn first_present<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| obj.get(*key).filter(|v| !v.is_null()))
}

/// First non-empty string (or stringified number) among `keys`. A list of
/// strings is joined with ", ".
fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key)? {
        Value::Array(values) => {
            let joined = values
                .iter()
                .filter_map(scalar_to_string)
                .collect::<Vec<_>>()
                .join(", ");
            (!joined.is_empty()).then_some(joined)
        }
        other => scalar_to_string(other),
    })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
