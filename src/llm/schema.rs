//! Expected response shapes.
//!
//! The same shape description is rendered two ways: a JSON schema for providers
//! with native structured output, and plain-language field requirements for
//! providers that only take a prompt.

use serde_json::{Value, json};

use super::CapabilityKind;

/// Shape the normalizer expects for a capability's raw reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// List of book suggestions; `personalized` adds a match reason.
    Books { personalized: bool },
    /// `{reply, suggestions}`.
    Concierge,
    /// List of reviews.
    Reviews,
    /// Free text.
    Text,
    /// HTML fragment restricted to headings and paragraphs.
    Chapter,
}

impl ResponseShape {
    pub fn for_kind(kind: CapabilityKind) -> Self {
        match kind {
            CapabilityKind::SearchBooks => Self::Books {
                personalized: false,
            },
            CapabilityKind::Onboarding => Self::Books { personalized: true },
            CapabilityKind::Concierge => Self::Concierge,
            CapabilityKind::GenerateReviews => Self::Reviews,
            CapabilityKind::GenerateChapter => Self::Chapter,
            CapabilityKind::ChatAboutBook
            | CapabilityKind::Translate
            | CapabilityKind::ExplainContext
            | CapabilityKind::Summarize
            | CapabilityKind::Recap => Self::Text,
        }
    }

    /// Whether the reply must be JSON.
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Books { .. } | Self::Concierge | Self::Reviews)
    }

    /// Key under which list shapes are wrapped when the provider requires an
    /// object at the JSON root.
    pub fn wrapper_key(&self) -> Option<&'static str> {
        match self {
            Self::Books { .. } => Some("books"),
            Self::Reviews => Some("reviews"),
            _ => None,
        }
    }

    /// Schema in the `responseSchema` dialect (OpenAPI subset, upper-case types).
    pub fn json_schema(&self) -> Option<Value> {
        match self {
            Self::Books { personalized } => Some(json!({
                "type": "ARRAY",
                "items": book_schema(*personalized),
            })),
            Self::Concierge => Some(json!({
                "type": "OBJECT",
                "properties": {
                    "reply": { "type": "STRING" },
                    "suggestions": { "type": "ARRAY", "items": book_schema(true) },
                },
                "required": ["reply", "suggestions"],
            })),
            Self::Reviews => Some(json!({
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "reviewer": { "type": "STRING" },
                        "rating": { "type": "INTEGER" },
                        "text": { "type": "STRING" },
                        "date": { "type": "STRING" },
                        "avatarColor": { "type": "STRING" },
                    },
                    "required": ["reviewer", "rating", "text", "date", "avatarColor"],
                },
            })),
            Self::Text | Self::Chapter => None,
        }
    }

    /// Field requirements as prompt text.
    ///
    /// With `object_root` the list shapes are requested wrapped in an object
    /// (`{"books": [...]}`), as JSON modes reject a bare array.
    pub fn field_instructions(&self, object_root: bool) -> Option<String> {
        let book_fields = |personalized: bool| {
            let mut fields = String::from(
                "\"title\" (string), \"author\" (string), \"description\" (one or two sentences), \
                 \"publishedYear\" (string), \"categories\" (array of strings), \
                 \"fallbackColor\" (hex color such as \"#1E3A8A\"), \"isbn\" (string, optional)",
            );
            if personalized {
                fields.push_str(", \"matchReason\" (why this book fits the reader)");
            }
            fields
        };

        let root = match self.wrapper_key() {
            Some(key) if object_root => format!("a JSON object of the form {{\"{}\": [...]}}", key),
            _ => "a JSON array".to_string(),
        };

        let text = match self {
            Self::Books { personalized } => {
                format!(
                    "Respond with {} where every element is an object with the fields {}. \
                     If nothing matches, return an empty list instead of guessing.",
                    root,
                    book_fields(*personalized)
                )
            }
            Self::Concierge => format!(
                "Respond with a JSON object {{\"reply\": string, \"suggestions\": [...]}} where \
                 every suggestion has the fields {}.",
                book_fields(true)
            ),
            Self::Reviews => {
                format!(
                    "Respond with {} where every element has the fields \"reviewer\" (string), \
                     \"rating\" (integer 1-5), \"text\" (string), \"date\" (string), \
                     \"avatarColor\" (hex color).",
                    root
                )
            }
            Self::Text | Self::Chapter => return None,
        };
        Some(text)
    }
}

fn book_schema(personalized: bool) -> Value {
    let mut properties = json!({
        "title": { "type": "STRING" },
        "author": { "type": "STRING" },
        "description": { "type": "STRING" },
        "publishedYear": { "type": "STRING" },
        "categories": { "type": "ARRAY", "items": { "type": "STRING" } },
        "fallbackColor": { "type": "STRING" },
        "isbn": { "type": "STRING" },
    });
    let mut required = vec![
        "title",
        "author",
        "description",
        "publishedYear",
        "categories",
        "fallbackColor",
    ];
    if personalized {
        properties["matchReason"] = json!({ "type": "STRING" });
        required.push("matchReason");
    }
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
    })
}
