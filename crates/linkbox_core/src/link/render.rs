//! Display rewriting of reference tokens.
//!
//! Normal references become markdown anchors pointing at the note's location
//! fragment; escaped references lose their marker and show as plain bracketed
//! text. Replacement is a single left-to-right pass over the source, so the
//! output of one replacement is never rescanned by another.

use super::parser::{LinkRef, RawToken, OPEN};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped in an anchor target, mirroring URI-safe fragment text.
const FRAGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Markdown anchor referencing note `name`, e.g. `[My Note](#My%20Note)`.
pub fn anchor(name: &str) -> String {
    format!("[{name}](#{})", utf8_percent_encode(name, FRAGMENT))
}

/// Rewrites every occurrence of `tokens` in `text`.
///
/// Tokens are matched by their full literal form; at any position the longest
/// matching token wins. Tokens that do not classify are left untouched.
pub fn render(text: &str, tokens: &[RawToken]) -> String {
    let mut replacements: Vec<(&str, String)> = tokens
        .iter()
        .filter_map(|token| {
            let replacement = match token.classify()? {
                LinkRef::Normal(name) => anchor(&name),
                LinkRef::Escaped(name) => format!("[[{name}]]"),
            };
            Some((token.as_str(), replacement))
        })
        .collect();
    if replacements.is_empty() {
        return text.to_string();
    }
    replacements.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut rendered = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(OPEN) {
        rendered.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match replacements
            .iter()
            .find(|(literal, _)| candidate.starts_with(literal))
        {
            Some((literal, replacement)) => {
                rendered.push_str(replacement);
                rest = &candidate[literal.len()..];
            }
            None => {
                // Step one byte: a token may begin inside `[[[`.
                rendered.push('[');
                rest = &candidate[1..];
            }
        }
    }
    rendered.push_str(rest);
    rendered
}

/// Renders `text` against its own extracted references.
pub fn render_text(text: &str) -> String {
    render(text, &super::parser::extract_references(text))
}
