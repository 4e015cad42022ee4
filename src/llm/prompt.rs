use super::schema::ResponseShape;
use super::{CapabilityRequest, ChatTurn};

/// Shared persona for every operation.
const LIBRARIAN_PERSONA: &str = r#"You are Folio, a well-read literary assistant inside an e-reading app.
Be accurate about real books and authors. Never invent books that do not exist."#;

/// Chapter output constraints (HTML fragment only).
const CHAPTER_FORMAT_RULES: &str = r#"
Format rules:
- Output an HTML fragment using only <h3> and <p> tags
- Start with an <h3> chapter heading
- No markdown, no code fences, no <html> or <body> wrappers"#;

/// Provider-independent prompt for one capability call.
///
/// Adapters decide how to transport it: as chat messages, as Gemini contents
/// with a response schema, or flattened into one prompt string.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptParts {
    /// System instruction.
    pub system: String,
    /// Final user message.
    pub user: String,
    /// Prior conversation turns, oldest first.
    pub history: Vec<ChatTurn>,
    /// Shape the reply must have.
    pub shape: ResponseShape,
}

impl PromptParts {
    /// System prompt with the shape's field requirements appended, for
    /// providers without schema support.
    pub fn system_with_instructions(&self, object_root: bool) -> String {
        match self.shape.field_instructions(object_root) {
            Some(instructions) => format!(
                "{}\n\n{}\nOutput JSON only: no commentary before or after it.",
                self.system, instructions
            ),
            None => self.system.clone(),
        }
    }
}

/// Builds the prompt for a capability request.
pub fn build_prompt(request: &CapabilityRequest) -> PromptParts {
    let shape = ResponseShape::for_kind(request.kind());
    let history = request.history().to_vec();

    let (task, user) = match request {
        CapabilityRequest::SearchBooks { query } => (
            "Find real, published books matching the reader's search. Return at most 8 results, \
             best match first. If the query is nonsensical or matches nothing, return an empty list."
                .to_string(),
            format!("Search query: {}", query),
        ),
        CapabilityRequest::Concierge { message, .. } => (
            "You are a book concierge. Answer the reader conversationally in a few sentences and \
             suggest up to 4 books that fit what they asked for."
                .to_string(),
            message.clone(),
        ),
        CapabilityRequest::Onboarding { genres, goal } => {
            let genres = if genres.is_empty() {
                "no particular genre".to_string()
            } else {
                genres.join(", ")
            };
            (
                "Recommend 6 books to a new reader based on their favourite genres and reading goal. \
                 Explain each pick in the match reason."
                    .to_string(),
                format!("Favourite genres: {}\nReading goal: {}", genres, goal),
            )
        }
        CapabilityRequest::GenerateReviews { title, author } => (
            "Write 3 short, varied reader reviews of the book, as different readers would post them \
             on a reading community. Ratings must be integers from 1 to 5."
                .to_string(),
            format!("Book: \"{}\" by {}", title, author),
        ),
        CapabilityRequest::ChatAboutBook { title, message, .. } => (
            format!(
                "The reader is reading \"{}\". Discuss it helpfully and concisely. Avoid spoilers \
                 beyond what the reader asks about.",
                title
            ),
            message.clone(),
        ),
        CapabilityRequest::Translate { text, target_lang } => (
            format!(
                "Translate the passage into {}. Output only the translation, without quotes or notes.",
                target_lang
            ),
            text.clone(),
        ),
        CapabilityRequest::ExplainContext { text, title } => (
            format!(
                "The reader highlighted a passage of \"{}\". Explain its meaning and its historical \
                 or literary context in one short paragraph.",
                title
            ),
            format!("Passage: {}", text),
        ),
        CapabilityRequest::GenerateChapter {
            title,
            author,
            chapter,
        } => (
            format!(
                "Reproduce chapter {} of \"{}\" by {} as readable text. For works still under \
                 copyright, write a faithful prose summary of the chapter instead.{}",
                chapter, title, author, CHAPTER_FORMAT_RULES
            ),
            format!("Chapter {} of \"{}\"", chapter, title),
        ),
        CapabilityRequest::Summarize { title } => (
            "Summarize the book in one or two paragraphs: premise, main characters, themes. \
             No spoilers for the ending."
                .to_string(),
            format!("Book: \"{}\"", title),
        ),
        CapabilityRequest::Recap { title } => (
            "The reader is returning to a book after a break. Give a short 'previously on' recap \
             of the opening of the book to help them pick up again."
                .to_string(),
            format!("Book: \"{}\"", title),
        ),
    };

    tracing::debug!(
        "Prompt for {} - task ({} chars), user ({} chars), history {} turns",
        request.kind(),
        task.len(),
        user.len(),
        history.len()
    );

    PromptParts {
        system: format!("{}\n\n{}", LIBRARIAN_PERSONA, task),
        user,
        history,
        shape,
    }
}
