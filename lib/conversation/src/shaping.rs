//! Response shaping.
//!
//! Turns raw generated text into what the calling channel displays. Shaping
//! is presentation-only: sessions always keep the raw text.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};
use serde::{Deserialize, Serialize};

/// How generated text is presented to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapingMode {
    /// Returned unchanged.
    #[default]
    Passthrough,
    /// Paragraph breaks become `<br><br>`, single newlines become spaces.
    LineBreaks,
    /// HTML-escaped, newlines become `<br>`.
    EscapedHtml,
    /// Markdown rendered to HTML, headings rendered as bold paragraphs.
    Markdown,
    /// List markers become bullets, headings become bold, newlines `<br>`.
    Bullets,
}

/// Shapes raw generated text for the caller.
#[must_use]
pub fn shape(mode: ShapingMode, raw: &str) -> String {
    match mode {
        ShapingMode::Passthrough => raw.to_string(),
        ShapingMode::LineBreaks => line_breaks(raw),
        ShapingMode::EscapedHtml => escape_html(raw.trim()).replace('\n', "<br>"),
        ShapingMode::Markdown => markdown_without_headings(raw),
        ShapingMode::Bullets => bullets(raw),
    }
}

fn line_breaks(raw: &str) -> String {
    raw.trim().replace("\n\n", "<br><br>").replace('\n', " ")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    html::push_html(&mut out, std::iter::once(Event::Text(text.into())));
    out
}

fn markdown_without_headings(raw: &str) -> String {
    let parser = Parser::new_ext(raw, Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES);
    let events = parser.flat_map(|event| match event {
        Event::Start(Tag::Heading { .. }) => {
            vec![Event::Start(Tag::Paragraph), Event::Start(Tag::Strong)]
        }
        Event::End(TagEnd::Heading(_)) => {
            vec![Event::End(TagEnd::Strong), Event::End(TagEnd::Paragraph)]
        }
        other => vec![other],
    });

    let mut out = String::with_capacity(raw.len() * 3 / 2);
    html::push_html(&mut out, events);
    out.trim_end().to_string()
}

fn bullets(raw: &str) -> String {
    raw.trim()
        .lines()
        .map(|line| {
            let line = line.replace("**", "");
            let trimmed = line.trim_start();
            if let Some(item) = trimmed
                .strip_prefix("- ")
                .or_else(|| trimmed.strip_prefix("* "))
            {
                format!("• {item}")
            } else if let Some(hashes) = heading_hashes(trimmed) {
                format!("<strong>{}</strong>", trimmed[hashes..].trim())
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Number of leading `#` if the line is an ATX heading (one to six hashes
/// followed by a space).
fn heading_hashes(line: &str) -> Option<usize> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    ((1..=6).contains(&hashes) && line[hashes..].starts_with(' ')).then_some(hashes)
}
