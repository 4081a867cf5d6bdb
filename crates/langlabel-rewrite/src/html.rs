//! Streaming HTML transformation.
//!
//! Uses lol_html to find candidate code-block wrappers and label them in a
//! single pass, leaving the rest of the document byte-for-byte intact.

use std::borrow::Cow;

use html_escape::decode_html_entities;
use langlabel::{Annotate, CLASS_PREFIX, annotate_element};
use lol_html::errors::{AttributeNameError, RewritingError, SelectorError};
use lol_html::html_content::Element;
use lol_html::{ElementContentHandlers, HandlerResult, RewriteStrSettings, Selector, rewrite_str};
use thiserror::Error;
use tracing::trace;

use crate::config::Config;

/// A candidate element seen by the rewriter.
struct RewriteElement<'a, 'r, 't>(&'a mut Element<'r, 't>);

impl Annotate for RewriteElement<'_, '_, '_> {
    type Error = AttributeNameError;

    // lol_html hands back the raw attribute text, while the DOM decodes
    // character references before a script reads `className`.
    fn class_name(&self) -> Option<String> {
        let raw = self.0.get_attribute("class")?;
        if !raw.contains('&') {
            return Some(raw);
        }
        Some(decode_html_entities(&raw).into_owned())
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), AttributeNameError> {
        self.0.set_attribute(name, value)
    }
}

/// Counts from transforming one document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransformResult {
    /// Candidate elements that received a label.
    pub blocks_labelled: usize,
    /// Candidate elements without a `language-<name>` class.
    pub blocks_skipped: usize,
    /// Distinct labels, in first-seen order.
    pub languages: Vec<String>,
}

/// Label every candidate element in `html`.
///
/// Documents without any `language-` substring are returned unchanged
/// without being parsed.
pub fn transform_html(
    html: &str,
    config: &Config,
) -> Result<(String, TransformResult), TransformError> {
    let mut result = TransformResult::default();

    if !html.contains(CLASS_PREFIX) {
        return Ok((html.to_string(), result));
    }

    let selector: Selector = config.selector.parse()?;
    let attribute = config.attribute.as_str();

    let handler = |el: &mut Element<'_, '_>| -> HandlerResult {
        let labelled = annotate_element(&mut RewriteElement(el), attribute)?;
        match labelled {
            Some(label) => {
                trace!(tag = %el.tag_name(), %label, "labelled");
                result.blocks_labelled += 1;
                if !result.languages.contains(&label) {
                    result.languages.push(label);
                }
            }
            None => result.blocks_skipped += 1,
        }
        Ok(())
    };

    let settings: RewriteStrSettings<'_, '_> = RewriteStrSettings {
        element_content_handlers: vec![(
            Cow::Owned(selector),
            ElementContentHandlers::default().element(handler),
        )],
        ..RewriteStrSettings::default()
    };
    let output = rewrite_str(html, settings)?;

    Ok((output, result))
}

/// Errors that can occur while transforming a document.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("invalid selector: {0}")]
    Selector(#[from] SelectorError),

    #[error("rewriting failed: {0}")]
    Rewrite(#[from] RewritingError),
}
