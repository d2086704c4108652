//! Reference token extraction and classification.
//!
//! Tokens are found with a non-greedy `[[...]]` scan that does not cross line
//! breaks (`\n` or a lone `\r`), so `[[a]] and [[b]]` yields two tokens.
//! Classification is a separate step: the escape marker only counts when it
//! immediately follows the opening delimiter.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::fmt::{Display, Formatter};

pub const OPEN: &str = "[[";
pub const CLOSE: &str = "]]";
pub const ESCAPE_MARKER: char = '~';

static REFERENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\r\n]*?)\]\]").expect("valid reference regex"));

/// Literal bracketed substring as it appears in note text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawToken(String);

impl RawToken {
    pub fn new(literal: impl Into<String>) -> Self {
        Self(literal.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn classify(&self) -> Option<LinkRef> {
        classify(&self.0)
    }
}

impl Display for RawToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Classified reference carrying its bare target name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LinkRef {
    /// Active reference to another note.
    Normal(String),
    /// Reference written with the escape marker; displayed literally.
    Escaped(String),
}

impl LinkRef {
    pub fn bare_name(&self) -> &str {
        match self {
            Self::Normal(name) | Self::Escaped(name) => name,
        }
    }
}

/// Returns distinct reference tokens in order of first appearance.
pub fn extract_references(text: &str) -> Vec<RawToken> {
    let mut seen = HashSet::new();
    REFERENCE_RE
        .find_iter(text)
        .map(|found| found.as_str())
        .filter(|literal| seen.insert(*literal))
        .map(RawToken::new)
        .collect()
}

/// Classifies one literal token.
///
/// Returns `None` for anything that is not a well-formed token or whose bare
/// name is empty (`[[]]`, `[[~]]`).
pub fn classify(token: &str) -> Option<LinkRef> {
    let inner = token.strip_prefix(OPEN)?.strip_suffix(CLOSE)?;
    if inner.contains(CLOSE) || inner.contains(['\n', '\r']) {
        return None;
    }

    let link = match inner.strip_prefix(ESCAPE_MARKER) {
        Some(escaped) => LinkRef::Escaped(escaped.to_string()),
        None => LinkRef::Normal(inner.to_string()),
    };
    if link.bare_name().is_empty() {
        return None;
    }
    Some(link)
}

/// Distinct bare names of the normal references in `text`.
///
/// This is the outgoing link set persisted on a note and diffed by
/// backlink synchronization.
pub fn bare_links(text: &str) -> BTreeSet<String> {
    extract_references(text)
        .iter()
        .filter_map(RawToken::classify)
        .filter_map(|link| match link {
            LinkRef::Normal(name) => Some(name),
            LinkRef::Escaped(_) => None,
        })
        .collect()
}
