//! Post-process rendered HTML to add `data-lang` labels to highlighted code blocks.
//!
//! Static site generators leave highlighted code in wrappers such as
//! `<div class="language-yaml highlighter-rouge">`. This crate walks the
//! generated site and writes the language into `data-lang`, so the labels are
//! present without running any script in the browser.
//!
//! # Usage
//!
//! ```bash
//! langlabel-rewrite ./_site
//! langlabel-rewrite ./_site ./_site-labelled --config langlabel.toml
//! ```
//!
//! # How it works
//!
//! 1. **Collection**: walks the (optionally cloned) output directory for
//!    `*.html` files.
//!
//! 2. **HTML Transformation**: uses lol_html to stream through each file,
//!    applying the shared [`langlabel`] rule to every element matching the
//!    configured selector (`div[class*="language-"]` by default). Files are
//!    only rewritten when their content changes.

mod config;
mod html;
mod processor;

pub use config::{Config, ConfigError};
pub use html::{TransformError, TransformResult, transform_html};
pub use processor::{ProcessError, ProcessOptions, Processor, ProcessorStats};
