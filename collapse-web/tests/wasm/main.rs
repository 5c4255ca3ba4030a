#![cfg(target_arch = "wasm32")]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use collapse_core::CollapseConfig;
use collapse_web::page::install_search_toggle;
use collapse_web::reveal::slide_reveal;
use collapse_web::storage::STATE_KEY;
use collapse_web::{auto_bind, bind, bound, collapse, dom, unbind};
use gloo::timers::future::TimeoutFuture;
use js_sys::{Function, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;
use web_sys::{Element, Event, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

fn fixture(id: &str, pairs: usize) -> Element {
    let doc = dom::document().expect("document");
    if let Some(old) = doc.get_element_by_id(id) {
        old.remove();
    }
    let container = doc.create_element("div").expect("create container");
    container.set_id(id);
    let markup: String = (0..pairs)
        .map(|n| format!("<h3>Section {n}</h3><div>Body {n}</div>"))
        .collect();
    container.set_inner_html(&markup);
    doc.body()
        .expect("document body")
        .append_child(&container)
        .expect("append container");
    container
}

fn options(pairs: &[(&str, JsValue)]) -> JsValue {
    let object = Object::new();
    for (key, value) in pairs {
        Reflect::set(&object, &JsValue::from_str(key), value).expect("set option");
    }
    object.into()
}

fn details(container: &Element, index: u32) -> HtmlElement {
    container
        .children()
        .item(index * 2 + 1)
        .expect("details element")
        .dyn_into()
        .expect("html element")
}

fn header_link(container: &Element, index: u32) -> HtmlElement {
    container
        .children()
        .item(index * 2)
        .and_then(|header| header.first_element_child())
        .expect("header link")
        .dyn_into()
        .expect("html element")
}

fn display(element: &HtmlElement) -> String {
    element.style().get_property_value("display").expect("display")
}

#[wasm_bindgen_test]
fn clicking_a_header_link_toggles_its_section() {
    let container = fixture("w-click", 2);
    let handle = collapse(&container, JsValue::UNDEFINED).expect("bind");
    assert_eq!(handle.section_count().unwrap(), 2);

    let link = header_link(&container, 1);
    assert_eq!(link.get_attribute("href").as_deref(), Some("#"));
    assert_eq!(display(&details(&container, 1)), "none");

    link.click();
    assert!(handle.is_open(1).unwrap());
    assert_eq!(display(&details(&container, 1)), "");
    link.click();
    assert!(!handle.is_open(1).unwrap());
}

#[wasm_bindgen_test]
fn accordion_option_keeps_one_section_open() {
    let container = fixture("w-accordion", 3);
    let handle = collapse(&container, options(&[("accordion", JsValue::TRUE)])).expect("bind");
    handle.open(Some(0)).unwrap();
    handle.open(Some(2)).unwrap();
    assert_eq!(handle.open_indices().unwrap(), vec![2]);
    assert!(handle.open(Some(9)).is_err());
    assert_eq!(handle.open_indices().unwrap(), vec![2]);
}

#[wasm_bindgen_test]
fn container_events_drive_every_section_and_notifications_bubble() {
    let container = fixture("w-events", 3);
    let handle = collapse(&container, JsValue::UNDEFINED).expect("bind");

    let opened = Rc::new(Cell::new(0));
    let counter = Rc::clone(&opened);
    dom::listen(&container, "opened", move |_: Event| counter.set(counter.get() + 1))
        .expect("listen");

    dom::dispatch(&container, "open", None).expect("dispatch");
    assert_eq!(handle.open_indices().unwrap(), vec![0, 1, 2]);
    assert_eq!(opened.get(), 3);

    dom::dispatch(&header_link(&container, 0), "close", None).expect("dispatch");
    assert_eq!(handle.open_indices().unwrap(), vec![1, 2]);
}

#[wasm_bindgen_test]
fn custom_open_handler_runs_with_details_as_this() {
    let container = fixture("w-custom", 2);
    let open = Function::new_no_args("this.setAttribute('data-revealed', 'yes');");
    let handle = collapse(&container, options(&[("open", open.into())])).expect("bind");

    handle.open(Some(1)).unwrap();
    let second = details(&container, 1);
    assert_eq!(second.get_attribute("data-revealed").as_deref(), Some("yes"));
    // The handler owns the reveal, so the default effect left it hidden.
    assert_eq!(display(&second), "none");
    assert!(handle.is_open(1).unwrap());
}

#[wasm_bindgen_test]
fn non_function_handler_is_rejected() {
    let container = fixture("w-bad-handler", 1);
    let result = collapse(&container, options(&[("close", JsValue::from_f64(3.0))]));
    assert!(result.is_err());
}

#[wasm_bindgen_test]
fn persisted_state_survives_a_rebind() {
    let storage = dom::local_storage().expect("localStorage");
    storage.remove_item(STATE_KEY).expect("clear state");

    let container = fixture("w-persist", 2);
    let handle = collapse(&container, options(&[("persist", JsValue::TRUE)])).expect("bind");
    assert!(handle.is_persistent().unwrap());
    handle.open(Some(1)).unwrap();
    let saved = storage.get_item(STATE_KEY).unwrap().expect("state saved");
    assert_eq!(saved, r#"{"w-persist":[0,1]}"#);

    let fresh = fixture("w-persist", 2);
    let reloaded = collapse(&fresh, options(&[("persist", JsValue::TRUE)])).expect("rebind");
    assert_eq!(reloaded.open_indices().unwrap(), vec![1]);
    storage.remove_item(STATE_KEY).expect("clear state");
}

#[wasm_bindgen_test]
fn marked_containers_bind_once() {
    let container = fixture("w-auto", 2);
    container
        .set_attribute("data-collapse", "accordion")
        .expect("marker");
    let root = container.parent_element().expect("parent");

    let handles = auto_bind(&root);
    assert!(handles.iter().any(|handle| handle.container() == &container));
    assert!(auto_bind(&root).iter().all(|handle| handle.container() != &container));
    assert!(collapse_web::bound(&container).is_some());
}

#[wasm_bindgen_test]
fn calls_from_notification_listeners_are_rejected() {
    let container = fixture("w-reentrant", 2);
    let handle = collapse(&container, JsValue::UNDEFINED).expect("bind");

    let outcomes: Rc<RefCell<Vec<bool>>> = Rc::default();
    let record = Rc::clone(&outcomes);
    let inner = handle.clone();
    let second_link = header_link(&container, 1);
    dom::listen(&container, "opened", move |_: Event| {
        record.borrow_mut().push(inner.toggle(Some(0)).is_err());
        // Dropped: the controller is still mid-transition.
        second_link.click();
    })
    .expect("listen");

    handle.open(Some(0)).unwrap();
    assert_eq!(outcomes.borrow().as_slice(), &[true]);
    assert_eq!(handle.open_indices().unwrap(), vec![0]);
    assert!(!handle.is_open(1).unwrap());
}

#[wasm_bindgen_test]
async fn overlapping_slides_leave_reopened_content_visible() {
    let container = fixture("w-slide", 1);
    let handle = bind(&container, CollapseConfig::default(), slide_reveal(60).into());
    let body = details(&container, 0);

    handle.open(Some(0)).unwrap();
    TimeoutFuture::new(120).await;
    assert_ne!(display(&body), "none");

    handle.close(Some(0)).unwrap();
    handle.open(Some(0)).unwrap();
    TimeoutFuture::new(120).await;
    assert!(handle.is_open(0).unwrap());
    assert_ne!(display(&body), "none");
    assert_eq!(body.get_attribute("aria-hidden").as_deref(), Some("false"));

    handle.close(Some(0)).unwrap();
    TimeoutFuture::new(120).await;
    assert_eq!(display(&body), "none");
}

#[wasm_bindgen_test]
fn unbinding_releases_the_container() {
    let container = fixture("w-unbind", 2);
    let handle = collapse(&container, JsValue::UNDEFINED).expect("bind");
    drop(handle);
    assert!(bound(&container).is_some());

    assert!(unbind(&container).is_some());
    assert!(bound(&container).is_none());
    assert!(!container.has_attribute("data-collapse-bound"));
    // With the last handle gone its click listener is removed.
    header_link(&container, 0).click();
    assert_eq!(display(&details(&container, 0)), "none");

    let rebound = collapse(&container, JsValue::UNDEFINED).expect("rebind");
    assert_eq!(rebound.section_count().unwrap(), 2);
}

#[wasm_bindgen_test]
fn search_toggle_slides_forms_anywhere_on_the_page() {
    let doc = dom::document().expect("document");
    let root = doc.create_element("div").expect("root");
    root.set_inner_html(
        r#"<div class="header"><a class="header-search-toggle"><i class="zmdi-search"></i></a></div>
           <section><form class="header-search-form" style="display: none"></form></section>"#,
    );
    doc.body().expect("body").append_child(&root).expect("append root");
    install_search_toggle(&root).expect("install");

    let prevented = Rc::new(Cell::new(None));
    let seen = Rc::clone(&prevented);
    dom::listen(&root, "click", move |event: Event| {
        seen.set(Some(event.default_prevented()));
    })
    .expect("listen");

    let toggle: HtmlElement = root
        .query_selector(".header-search-toggle")
        .unwrap()
        .expect("toggle")
        .dyn_into()
        .expect("html element");
    let form: HtmlElement = root
        .query_selector(".header-search-form")
        .unwrap()
        .expect("form")
        .dyn_into()
        .expect("html element");

    toggle.click();
    assert_eq!(prevented.get(), Some(false));
    assert!(toggle.class_list().contains("open"));
    assert_ne!(display(&form), "none");
    let icon = toggle.first_element_child().expect("icon");
    assert!(icon.class_list().contains("zmdi-close"));
    root.remove();
}
