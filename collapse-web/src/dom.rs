use collapse_core::{CollapseDom, SectionEvent};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{
    CustomEvent, CustomEventInit, Document, Element, Event, EventTarget, HtmlElement, Node, Storage,
    Window,
};

/// Retrieve the global `window` object, if running in a browser.
#[must_use]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Retrieve the document object for DOM interactions.
#[must_use]
pub fn document() -> Option<Document> {
    window().and_then(|win| win.document())
}

/// Convert a JavaScript value into a readable string for error reporting.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| err.message().into())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Log an error message straight to the browser console.
pub fn console_error(message: &str) {
    web_sys::console::error_1(&JsValue::from_str(message));
}

/// Access the browser `localStorage` handle.
///
/// # Errors
/// Returns an error if the browser window cannot be accessed or `localStorage` is unavailable.
pub fn local_storage() -> Result<Storage, JsValue> {
    window()
        .ok_or_else(|| JsValue::from_str("window unavailable"))?
        .local_storage()?
        .ok_or_else(|| JsValue::from_str("localStorage unavailable"))
}

/// Register `handler` for `event` on `target` for the lifetime of the page.
///
/// # Errors
/// Returns an error if the listener cannot be registered.
pub fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Dispatch a bubbling `CustomEvent` named `name` at `target`.
///
/// # Errors
/// Returns an error if the event cannot be created or dispatched.
pub fn dispatch(target: &EventTarget, name: &str, detail: Option<&JsValue>) -> Result<bool, JsValue> {
    let init = CustomEventInit::new();
    init.set_bubbles(true);
    if let Some(detail) = detail {
        init.set_detail(detail);
    }
    let event = CustomEvent::new_with_event_init_dict(name, &init)?;
    target.dispatch_event(&event)
}

/// Every element under `root` matching `selector`; invalid selectors match nothing.
#[must_use]
pub fn select_all(root: &Element, selector: &str) -> Vec<Element> {
    match root.query_selector_all(selector) {
        Ok(list) => (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect(),
        Err(err) => {
            log::debug!("selector `{selector}` rejected: {}", js_error_message(&err));
            Vec::new()
        }
    }
}

/// Set (`Some`) or clear (`None`) an inline style property.
pub fn set_style(element: &Element, property: &str, value: Option<&str>) {
    let Some(html) = element.dyn_ref::<HtmlElement>() else {
        return;
    };
    let style = html.style();
    let result = match value {
        Some(value) => style.set_property(property, value),
        None => style.remove_property(property).map(|_| ()),
    };
    if let Err(err) = result {
        log::warn!("failed to set `{property}`: {}", js_error_message(&err));
    }
}

/// True when the element currently generates no layout box.
#[must_use]
pub fn is_hidden(element: &Element) -> bool {
    element
        .dyn_ref::<HtmlElement>()
        .is_none_or(|html| html.offset_width() == 0 && html.offset_height() == 0)
}

/// [`CollapseDom`] over live browser elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebDom;

impl CollapseDom for WebDom {
    type Node = Element;

    fn children(&self, node: &Element) -> Vec<Element> {
        let children = node.children();
        (0..children.length())
            .filter_map(|i| children.item(i))
            .collect()
    }

    fn select_all(&self, root: &Element, selector: &str) -> Vec<Element> {
        select_all(root, selector)
    }

    fn next_element(&self, node: &Element) -> Option<Element> {
        node.next_element_sibling()
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        let node: &Node = node;
        ancestor.contains(Some(node))
    }

    fn closest(&self, node: &Element, selector: &str) -> Option<Element> {
        node.closest(selector).ok().flatten()
    }

    fn id(&self, node: &Element) -> Option<String> {
        let id = node.id();
        (!id.is_empty()).then_some(id)
    }

    fn has_attribute(&self, node: &Element, name: &str) -> bool {
        node.has_attribute(name)
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) {
        if let Err(err) = node.set_attribute(name, value) {
            log::warn!("failed to set `{name}`: {}", js_error_message(&err));
        }
    }

    fn set_class(&mut self, node: &Element, class: &str, enabled: bool) {
        if let Err(err) = node.class_list().toggle_with_force(class, enabled) {
            log::warn!("failed to toggle `{class}`: {}", js_error_message(&err));
        }
    }

    fn wrap_in_link(&mut self, node: &Element) {
        let already_link = node.child_nodes().length() == 1
            && node
                .first_element_child()
                .is_some_and(|child| child.tag_name().eq_ignore_ascii_case("a"));
        if already_link {
            return;
        }
        if let Err(err) = wrap_children(node) {
            log::warn!("failed to wrap header: {}", js_error_message(&err));
        }
    }

    fn show(&mut self, node: &Element) {
        set_style(node, "display", None);
    }

    fn hide(&mut self, node: &Element) {
        set_style(node, "display", Some("none"));
    }

    fn notify(&mut self, node: &Element, event: SectionEvent) {
        let detail = serde_wasm_bindgen::to_value(&event).ok();
        if let Err(err) = dispatch(node, event.name(), detail.as_ref()) {
            log::warn!("failed to dispatch `{}`: {}", event.name(), js_error_message(&err));
        }
    }
}

fn wrap_children(node: &Element) -> Result<(), JsValue> {
    let doc = node
        .owner_document()
        .ok_or_else(|| JsValue::from_str("detached element"))?;
    let link = doc.create_element("a")?;
    link.set_attribute("href", "#")?;
    while let Some(child) = node.first_child() {
        link.append_child(&child)?;
    }
    node.append_child(&link)?;
    Ok(())
}
