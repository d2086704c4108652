//! Wiki-link tokenizer, classifier and display rewriter.
//!
//! # Invariants
//! - A reference token is `[[name]]`; `[[~name]]` is its escaped form.
//! - Only normal references contribute outgoing links.
//! - Rendering never touches storage.

pub mod parser;
pub mod render;

pub use parser::{bare_links, classify, extract_references, LinkRef, RawToken};
pub use render::{anchor, render, render_text};
