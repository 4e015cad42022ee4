//! Chapter HTML trust boundary.
//!
//! Model output is never handed to a renderer as-is. It is parsed into a
//! heading/paragraph tree and re-emitted with escaped text, so only `<h3>` and
//! `<p>` ever leave this module.

/// One structural node of a generated chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterBlock {
    Heading(String),
    Paragraph(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Loose,
    Heading,
    Paragraph,
}

/// Tags whose content is discarded, not just the tag.
const DISCARDED_TAGS: &[&str] = &["script", "style", "head", "title", "template"];

/// Tags that end the current block without starting a new one.
const BREAKING_TAGS: &[&str] = &[
    "div",
    "section",
    "article",
    "blockquote",
    "li",
    "ul",
    "ol",
    "hr",
    "body",
    "html",
];

/// Parses model output into heading and paragraph blocks.
///
/// `<h1>`..`<h6>` become headings and `<p>` paragraphs. Other tags are
/// dropped while their text is kept. Text outside any block is split into
/// paragraphs on blank lines.
pub fn parse_chapter(raw: &str) -> Vec<ChapterBlock> {
    let mut parser = ChapterParser::default();
    let mut rest = raw;

    while let Some(open) = rest.find('<') {
        parser.push_text(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('>') else {
            // Unterminated tag: the remainder is text.
            parser.push_text(&rest[open..]);
            rest = "";
            break;
        };
        parser.handle_tag(&after[..close]);
        rest = &after[close + 1..];
    }
    parser.push_text(rest);
    parser.finish()
}

/// Renders blocks as `<h3>`/`<p>` HTML with escaped text.
pub fn render_chapter(blocks: &[ChapterBlock]) -> String {
    blocks
        .iter()
        .map(|block| match block {
            ChapterBlock::Heading(text) => format!("<h3>{}</h3>", escape_html(text)),
            ChapterBlock::Paragraph(text) => format!("<p>{}</p>", escape_html(text)),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Default)]
struct ChapterParser {
    blocks: Vec<ChapterBlock>,
    buffer: String,
    kind: Option<BlockKind>,
    discarding: Option<String>,
}

impl ChapterParser {
    fn push_text(&mut self, text: &str) {
        if self.discarding.is_none() {
            self.buffer.push_str(text);
        }
    }

    fn handle_tag(&mut self, tag: &str) {
        let tag = tag.trim();
        if tag.starts_with('!') || tag.starts_with('?') {
            return;
        }
        let (closing, body) = match tag.strip_prefix('/') {
            Some(body) => (true, body),
            None => (false, tag),
        };
        let name: String = body
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        if let Some(discarded) = &self.discarding {
            if closing && *discarded == name {
                self.discarding = None;
            }
            return;
        }

        if DISCARDED_TAGS.contains(&name.as_str()) {
            if !closing && !body.trim_end().ends_with('/') {
                self.discarding = Some(name);
            }
            return;
        }

        if is_heading(&name) {
            self.flush();
            if !closing {
                self.kind = Some(BlockKind::Heading);
            }
        } else if name == "p" {
            self.flush();
            if !closing {
                self.kind = Some(BlockKind::Paragraph);
            }
        } else if name == "br" {
            self.buffer.push(' ');
        } else if BREAKING_TAGS.contains(&name.as_str()) {
            self.flush();
        }
    }

    fn flush(&mut self) {
        let kind = self.kind.take().unwrap_or(BlockKind::Loose);
        let raw = std::mem::take(&mut self.buffer);

        match kind {
            BlockKind::Heading => {
                let text = clean_text(&raw);
                if !text.is_empty() {
                    self.blocks.push(ChapterBlock::Heading(text));
                }
            }
            BlockKind::Paragraph => {
                let text = clean_text(&raw);
                if !text.is_empty() {
                    self.blocks.push(ChapterBlock::Paragraph(text));
                }
            }
            BlockKind::Loose => {
                let normalized = raw.replace("\r\n", "\n");
                for chunk in normalized.split("\n\n") {
                    let text = clean_text(chunk);
                    if !text.is_empty() {
                        self.blocks.push(ChapterBlock::Paragraph(text));
                    }
                }
            }
        }
    }

    fn finish(mut self) -> Vec<ChapterBlock> {
        self.flush();
        self.blocks
    }
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Decodes entities and collapses whitespace.
fn clean_text(raw: &str) -> String {
    decode_entities(raw)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&after[..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &after[end + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "mdash" => Some('\u{2014}'),
        "ndash" => Some('\u{2013}'),
        "hellip" => Some('\u{2026}'),
        "lsquo" => Some('\u{2018}'),
        "rsquo" => Some('\u{2019}'),
        "ldquo" => Some('\u{201C}'),
        "rdquo" => Some('\u{201D}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
