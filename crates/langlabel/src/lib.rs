//! Language labels for syntax-highlighted code blocks.
//!
//! Highlighters such as Rouge or arborium emit wrappers like
//! `<div class="language-yaml highlighter-rouge">`. This crate derives the
//! language name from that class and stores it in a `data-lang` attribute, so a
//! stylesheet can render a visible label:
//!
//! ```css
//! div[data-lang]::before { content: attr(data-lang); }
//! ```
//!
//! The rule lives here once and is shared by two surfaces:
//!
//! - `langlabel-host`: WASM, runs on `DOMContentLoaded` against the live DOM
//! - `langlabel-rewrite`: post-processes rendered HTML files on disk
//!
//! # Example
//!
//! ```rust
//! use langlabel::language_label;
//!
//! assert_eq!(language_label("language-yaml highlighter-rouge"), Some("yaml"));
//! assert_eq!(language_label("language-c++"), Some("c"));
//! assert_eq!(language_label("highlighter-rouge"), None);
//! ```

mod annotate;
mod label;

pub use annotate::{Annotate, Annotation, annotate_all, annotate_element};
pub use label::{CLASS_PREFIX, DEFAULT_SELECTOR, LABEL_ATTRIBUTE, language_label};
