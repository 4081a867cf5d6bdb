//! langlabel WASM host for the browser.
//!
//! Labels highlighted code blocks in the live DOM once the document structure
//! is ready. Include the generated module on a page and it runs by itself:
//!
//! ```html
//! <script type="module">
//!   import init from "./langlabel_host.js";
//!   await init();
//! </script>
//! ```
//!
//! Every `div[class*="language-"]` whose class contains `language-<name>`
//! gets `data-lang="<name>"`. If the module loads after `DOMContentLoaded`
//! has already fired, the pass runs immediately instead.
//!
//! ## JS Interface
//!
//! ```javascript
//! // Re-run the pass by hand, e.g. after injecting new code blocks.
//! // Returns the number of blocks labelled.
//! annotateCodeBlocks();
//! ```

use langlabel::{Annotate, DEFAULT_SELECTOR, LABEL_ATTRIBUTE, annotate_all};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Document, Element, Event};

/// A live DOM element.
struct DomElement(Element);

impl Annotate for DomElement {
    type Error = JsValue;

    fn class_name(&self) -> Option<String> {
        self.0.get_attribute("class")
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), JsValue> {
        self.0.set_attribute(name, value)
    }
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document available"))
}

/// Candidate elements, in document order.
fn candidates(document: &Document) -> Result<Vec<DomElement>, JsValue> {
    let nodes = document.query_selector_all(DEFAULT_SELECTOR)?;
    let elements = (0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .map(DomElement)
        .collect();
    Ok(elements)
}

/// Label every code block in the current document.
///
/// Returns the number of blocks labelled.
#[wasm_bindgen(js_name = annotateCodeBlocks)]
pub fn annotate_code_blocks() -> Result<u32, JsValue> {
    let document = document()?;
    let annotation = annotate_all(candidates(&document)?, LABEL_ATTRIBUTE)?;
    Ok(label_count(annotation.labelled))
}

// Saturates rather than wrapping on pages with more than u32::MAX blocks.
fn label_count(labelled: usize) -> u32 {
    u32::try_from(labelled).unwrap_or(u32::MAX)
}

fn annotate_or_warn() {
    if let Err(err) = annotate_code_blocks() {
        web_sys::console::warn_2(&"langlabel: failed to label code blocks:".into(), &err);
    }
}

/// Run the pass once the document structure is complete.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let document = document()?;

    if document.ready_state() != "loading" {
        annotate_or_warn();
        return Ok(());
    }

    let callback = Closure::once_into_js(move |_event: Event| annotate_or_warn());
    let options = AddEventListenerOptions::new();
    options.set_once(true);
    document.add_event_listener_with_callback_and_add_event_listener_options(
        "DOMContentLoaded",
        callback.unchecked_ref::<js_sys::Function>(),
        &options,
    )?;

    Ok(())
}
