//! The `language-<name>` class rule.

use std::sync::LazyLock;

use regex::Regex;

/// Class token prefix written by highlighters in front of the language name.
pub const CLASS_PREFIX: &str = "language-";

/// Attribute the label is stored in.
pub const LABEL_ATTRIBUTE: &str = "data-lang";

/// Elements considered for labelling.
pub const DEFAULT_SELECTOR: &str = r#"div[class*="language-"]"#;

// ASCII word characters only, same as `\w` in a browser regex.
static LANGUAGE_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"language-([A-Za-z0-9_]+)").expect("language class pattern is valid")
});

/// Extract the language label from a raw class attribute value.
///
/// The attribute is matched as a plain string, not split into tokens, and the
/// leftmost match wins. The label stops at the first non-word character, so
/// `"language-c++"` yields `"c"`.
pub fn language_label(class_name: &str) -> Option<&str> {
    LANGUAGE_CLASS
        .captures(class_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
