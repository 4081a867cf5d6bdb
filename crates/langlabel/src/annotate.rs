//! The annotation pass over document elements.
//!
//! The pass only needs two things from an element: its raw class attribute and
//! a way to set an attribute. [`Annotate`] abstracts over those so the same
//! pass runs against the live browser DOM, the streaming HTML rewriter, and
//! plain structs in tests.

use tracing::trace;

use crate::label::language_label;

/// An element the annotator can read and label.
pub trait Annotate {
    /// Error returned by the host when setting an attribute fails.
    type Error;

    /// The raw `class` attribute, or `None` if the element has none.
    fn class_name(&self) -> Option<String>;

    /// Set `name` to `value`, replacing any existing value.
    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), Self::Error>;
}

impl<T: Annotate + ?Sized> Annotate for &mut T {
    type Error = T::Error;

    fn class_name(&self) -> Option<String> {
        (**self).class_name()
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), Self::Error> {
        (**self).set_attribute(name, value)
    }
}

/// Outcome of one annotation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Elements that received a label.
    pub labelled: usize,
    /// Elements that were scanned but had no `language-<name>` class.
    pub skipped: usize,
}

impl Annotation {
    /// Number of elements scanned.
    pub fn scanned(&self) -> usize {
        self.labelled + self.skipped
    }
}

/// Label a single element.
///
/// Returns the label that was written, or `None` if the element does not
/// qualify, in which case it is left untouched.
pub fn annotate_element<E: Annotate + ?Sized>(
    element: &mut E,
    attribute: &str,
) -> Result<Option<String>, E::Error> {
    let Some(class_name) = element.class_name() else {
        return Ok(None);
    };
    let Some(label) = language_label(&class_name) else {
        return Ok(None);
    };

    trace!(%class_name, label, "labelling element");
    element.set_attribute(attribute, label)?;
    Ok(Some(label.to_owned()))
}

/// Label every element in `elements`.
///
/// Elements are independent, so iteration order does not affect the result,
/// and running the pass again writes the same values.
pub fn annotate_all<I>(elements: I, attribute: &str) -> Result<Annotation, <I::Item as Annotate>::Error>
where
    I: IntoIterator,
    I::Item: Annotate,
{
    let mut annotation = Annotation::default();
    for mut element in elements {
        match annotate_element(&mut element, attribute)? {
            Some(_) => annotation.labelled += 1,
            None => annotation.skipped += 1,
        }
    }
    Ok(annotation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LABEL_ATTRIBUTE;
    use std::collections::BTreeMap;
    use std::convert::Infallible;

    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    struct Node {
        attributes: BTreeMap<String, String>,
    }

    impl Node {
        fn with_class(class: &str) -> Self {
            let mut node = Self::default();
            node.attributes.insert("class".into(), class.into());
            node
        }

        fn label(&self) -> Option<&str> {
            self.attributes.get(LABEL_ATTRIBUTE).map(String::as_str)
        }
    }

    impl Annotate for Node {
        type Error = Infallible;

        fn class_name(&self) -> Option<String> {
            self.attributes.get("class").cloned()
        }

        fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), Infallible> {
            self.attributes.insert(name.into(), value.into());
            Ok(())
        }
    }

    /// Host whose attribute setter always fails.
    struct ReadOnly(&'static str);

    impl Annotate for ReadOnly {
        type Error = String;

        fn class_name(&self) -> Option<String> {
            Some(self.0.into())
        }

        fn set_attribute(&mut self, name: &str, _value: &str) -> Result<(), String> {
            Err(format!("cannot set {name}"))
        }
    }

    fn document() -> Vec<Node> {
        vec![
            Node::with_class("language-yaml highlighter-rouge"),
            Node::with_class("language-js"),
            Node::with_class("highlighter-rouge"),
            Node::with_class("language-c++"),
            Node::default(),
        ]
    }

    #[test]
    fn test_annotate_scenarios() {
        let mut doc = document();
        let annotation = annotate_all(doc.iter_mut(), LABEL_ATTRIBUTE).unwrap();

        assert_eq!(annotation, Annotation { labelled: 3, skipped: 2 });
        assert_eq!(annotation.scanned(), 5);
        assert_eq!(doc[0].label(), Some("yaml"));
        assert_eq!(doc[1].label(), Some("js"));
        assert_eq!(doc[2].label(), None);
        assert_eq!(doc[3].label(), Some("c"));
        assert_eq!(doc[4].label(), None);
    }

    #[test]
    fn test_non_qualifying_left_untouched() {
        let mut node = Node::with_class("highlight");
        let before = node.clone();
        assert_eq!(annotate_element(&mut node, LABEL_ATTRIBUTE).unwrap(), None);
        assert_eq!(node, before);
    }

    #[test]
    fn test_existing_label_overwritten() {
        let mut node = Node::with_class("language-toml");
        node.attributes.insert(LABEL_ATTRIBUTE.into(), "stale".into());
        let label = annotate_element(&mut node, LABEL_ATTRIBUTE).unwrap();
        assert_eq!(label.as_deref(), Some("toml"));
        assert_eq!(node.label(), Some("toml"));
    }

    #[test]
    fn test_custom_attribute() {
        let mut node = Node::with_class("language-rust");
        annotate_element(&mut node, "data-language").unwrap();
        assert_eq!(node.attributes.get("data-language").map(String::as_str), Some("rust"));
        assert_eq!(node.label(), None);
    }

    #[test]
    fn test_idempotent() {
        let mut once = document();
        annotate_all(once.iter_mut(), LABEL_ATTRIBUTE).unwrap();

        let mut twice = document();
        annotate_all(twice.iter_mut(), LABEL_ATTRIBUTE).unwrap();
        annotate_all(twice.iter_mut(), LABEL_ATTRIBUTE).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_order_independent() {
        let mut forward = document();
        annotate_all(forward.iter_mut(), LABEL_ATTRIBUTE).unwrap();

        let mut backward = document();
        annotate_all(backward.iter_mut().rev(), LABEL_ATTRIBUTE).unwrap();

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_no_candidates_is_noop() {
        let mut doc = vec![Node::with_class("highlight"), Node::default()];
        let before = doc.clone();
        let annotation = annotate_all(doc.iter_mut(), LABEL_ATTRIBUTE).unwrap();
        assert_eq!(annotation.labelled, 0);
        assert_eq!(doc, before);

        let empty: Vec<Node> = Vec::new();
        assert_eq!(
            annotate_all(empty, LABEL_ATTRIBUTE).unwrap(),
            Annotation::default()
        );
    }

    #[test]
    fn test_setter_error_propagates() {
        let err = annotate_all([ReadOnly("language-go")], LABEL_ATTRIBUTE).unwrap_err();
        assert_eq!(err, "cannot set data-lang");

        // Non-qualifying elements never reach the setter.
        let annotation = annotate_all([ReadOnly("highlight")], LABEL_ATTRIBUTE).unwrap();
        assert_eq!(annotation.skipped, 1);
    }
}
