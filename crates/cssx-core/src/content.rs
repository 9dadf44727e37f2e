//! Turns `content` values into HTML fragments.

use crate::scope::unescape_quotes;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};

/// Tags whose content is literal text rather than markdown.
pub const PREFORMATTED_TAGS: &[&str] = &["pre", "code"];

/// Two-character line-break marker used inside quoted values.
const BREAK_MARKER: &str = "\\n";

pub fn is_preformatted(tag: &str) -> bool {
    PREFORMATTED_TAGS.contains(&tag)
}

/// Render resolved content for an element with the given tag.
pub fn render(content: &str, tag: &str) -> String {
    if content.trim().is_empty() {
        return String::new();
    }
    if is_preformatted(tag) {
        render_preformatted(content, tag == "code")
    } else {
        render_markdown(content)
    }
}

/// Escape, convert break markers, collapse whitespace. In `code`, a line
/// ending in `\` continues on the next line without a break.
pub fn render_preformatted(content: &str, continuations: bool) -> String {
    let mut text = escape_code(content);
    if continuations {
        text = join_continuations(&text);
    }
    let text = unescape_quotes(&text).replace(BREAK_MARKER, "<br />");
    collapse_whitespace(&text).trim().to_string()
}

/// Inline markdown: no paragraph wrapping, raw HTML kept, newlines become `<br />`.
pub fn render_markdown(content: &str) -> String {
    let source = content.trim().replace(BREAK_MARKER, "\n");

    let mut paragraphs = 0usize;
    let events = Parser::new_ext(
        &source,
        Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES,
    )
    .filter_map(|event| match event {
        Event::Start(Tag::Paragraph) => {
            paragraphs += 1;
            (paragraphs > 1).then_some(Event::HardBreak)
        }
        Event::End(TagEnd::Paragraph) => None,
        Event::SoftBreak => Some(Event::HardBreak),
        other => Some(other),
    });

    let mut out = String::new();
    html::push_html(&mut out, events);
    out.trim_end().to_string()
}

fn escape_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn join_continuations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut lines = text.split('\n').peekable();
    while let Some(line) = lines.next() {
        let trimmed = line.trim_end();
        match trimmed.strip_suffix('\\') {
            Some(continued) => out.push_str(continued),
            None => {
                out.push_str(line);
                if lines.peek().is_some() {
                    out.push('\n');
                }
            }
        }
    }
    out
}

/// Runs of two or more whitespace characters become one space.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = String::new();
    for ch in text.chars() {
        if ch.is_whitespace() {
            run.push(ch);
            continue;
        }
        flush_run(&mut out, &mut run);
        out.push(ch);
    }
    flush_run(&mut out, &mut run);
    out
}

fn flush_run(out: &mut String, run: &mut String) {
    match run.chars().count() {
        0 => {}
        1 => out.push_str(run),
        _ => out.push(' '),
    }
    run.clear();
}

/// Escape a value for use inside a double-quoted attribute or head text.
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
