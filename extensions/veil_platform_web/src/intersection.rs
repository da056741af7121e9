//! `IntersectionObserver` bridge
//!
//! DOM nodes are linked to [`ElementId`]s with [`bind_element`], which stamps a
//! `data-veil-id` attribute on the node. The facility looks nodes up by that
//! attribute when asked to watch them, so the host must insert bound nodes into
//! the document before mounting. Observer entries are mapped back to ids
//! through the same attribute.
//!
//! Only nodes currently watched are held, and each is dropped on `unobserve`.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Array;
use rustc_hash::FxHashMap;
use veil_platform::{
    ElementId, IntersectionBatch, IntersectionCallback, IntersectionEntry, IntersectionFacility,
    IntersectionProvider,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, IntersectionObserver, IntersectionObserverEntry, Window};

/// Attribute carrying the element id on bound DOM nodes
pub const ELEMENT_ID_ATTR: &str = "data-veil-id";

/// Attribute value for `id`
pub fn element_id_value(id: ElementId) -> String {
    id.as_raw().to_string()
}

/// Parse an attribute value written by [`element_id_value`]
pub fn parse_element_id(value: &str) -> Option<ElementId> {
    value.trim().parse::<u64>().ok().map(ElementId::from_raw)
}

/// CSS selector matching the node bound to `id`
pub fn element_selector(id: ElementId) -> String {
    format!("[{}=\"{}\"]", ELEMENT_ID_ATTR, element_id_value(id))
}

/// Link `id` to a DOM node so it can be observed
pub fn bind_element(id: ElementId, element: &Element) {
    if let Err(err) = element.set_attribute(ELEMENT_ID_ATTR, &element_id_value(id)) {
        tracing::warn!(?err, %id, "could not tag element");
    }
}

/// Remove the id tag from a DOM node
pub fn unbind_element(element: &Element) {
    if let Err(err) = element.remove_attribute(ELEMENT_ID_ATTR) {
        tracing::warn!(?err, "could not untag element");
    }
}

fn element_id(element: &Element) -> Option<ElementId> {
    parse_element_id(&element.get_attribute(ELEMENT_ID_ATTR)?)
}

/// Whether the window exposes a native `IntersectionObserver`
pub fn has_native_intersection_observer(window: &Window) -> bool {
    js_sys::Reflect::has(window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
}

pub struct WebIntersectionProvider {
    document: Document,
}

impl WebIntersectionProvider {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl IntersectionProvider for WebIntersectionProvider {
    fn create(&self, callback: IntersectionCallback) -> Rc<dyn IntersectionFacility> {
        Rc::new(WebFacility::new(self.document.clone(), callback))
    }
}

struct WebFacility {
    document: Document,
    observer: Option<IntersectionObserver>,
    watching: RefCell<FxHashMap<ElementId, Element>>,
    _on_entries: Closure<dyn FnMut(Array)>,
}

impl WebFacility {
    fn new(document: Document, callback: IntersectionCallback) -> Self {
        let on_entries = Closure::<dyn FnMut(Array)>::new(move |entries: Array| {
            let batch: IntersectionBatch = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .filter_map(|entry| {
                    let target = element_id(&entry.target())?;
                    Some(if entry.is_intersecting() {
                        IntersectionEntry::visible(target)
                    } else {
                        IntersectionEntry::hidden(target)
                    })
                })
                .collect();
            if !batch.is_empty() {
                callback(&batch);
            }
        });

        let observer = match IntersectionObserver::new(on_entries.as_ref().unchecked_ref()) {
            Ok(observer) => Some(observer),
            Err(err) => {
                tracing::warn!(?err, "IntersectionObserver construction failed");
                None
            }
        };

        Self {
            document,
            observer,
            watching: RefCell::new(FxHashMap::default()),
            _on_entries: on_entries,
        }
    }

    fn find(&self, target: ElementId) -> Option<Element> {
        self.document
            .query_selector(&element_selector(target))
            .ok()
            .flatten()
    }
}

impl IntersectionFacility for WebFacility {
    fn observe(&self, target: ElementId) {
        let (Some(observer), Some(element)) = (&self.observer, self.find(target)) else {
            tracing::debug!(%target, "no bound DOM node in the document, not observed");
            return;
        };
        observer.observe(&element);
        self.watching.borrow_mut().insert(target, element);
    }

    fn unobserve(&self, target: ElementId) {
        let element = self.watching.borrow_mut().remove(&target);
        if let (Some(observer), Some(element)) = (&self.observer, element) {
            observer.unobserve(&element);
        }
    }
}

impl Drop for WebFacility {
    fn drop(&mut self) {
        if let Some(observer) = &self.observer {
            observer.disconnect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_value_round_trip() {
        let id = ElementId::next();
        assert_eq!(parse_element_id(&element_id_value(id)), Some(id));
        assert_eq!(parse_element_id(" 42 "), Some(ElementId::from_raw(42)));
    }

    #[test]
    fn test_foreign_attribute_values_rejected() {
        assert_eq!(parse_element_id(""), None);
        assert_eq!(parse_element_id("#7"), None);
        assert_eq!(parse_element_id("-1"), None);
    }

    #[test]
    fn test_selector() {
        assert_eq!(
            element_selector(ElementId::from_raw(9)),
            "[data-veil-id=\"9\"]"
        );
    }
}
