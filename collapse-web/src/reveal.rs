//! Reveal effects for browser sections: host-supplied JS handlers and a sliding transition.
use collapse_core::RevealHandler;
use collapse_core::constants::ARIA_HIDDEN;
use gloo::timers::callback::Timeout;
use js_sys::{Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlElement};

use crate::dom::{is_hidden, js_error_message, set_style};
use crate::error::WebCollapseError;

/// Attribute counting slides started on an element; only the latest one finishes.
pub const SLIDE_GENERATION_ATTR: &str = "data-collapse-slide";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    Down,
    Up,
}

/// Build handlers from the `open`/`close` functions of a host options object.
///
/// Each function is called with the details element as `this`. Missing entries leave
/// that direction to the default effect.
///
/// # Errors
/// Fails when an entry is present but not callable.
pub fn js_reveal(options: &JsValue) -> Result<RevealHandler<Element>, WebCollapseError> {
    let mut handler = RevealHandler::new();
    if !options.is_object() {
        return Ok(handler);
    }
    if let Some(open) = js_handler(options, "open")? {
        handler = handler.on_open(move |details: &Element| call_with_this(&open, details));
    }
    if let Some(close) = js_handler(options, "close")? {
        handler = handler.on_close(move |details: &Element| call_with_this(&close, details));
    }
    Ok(handler)
}

fn js_handler(options: &JsValue, name: &'static str) -> Result<Option<Function>, WebCollapseError> {
    let value = Reflect::get(options, &JsValue::from_str(name))
        .map_err(|err| WebCollapseError::Options(js_error_message(&err)))?;
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    value
        .dyn_into::<Function>()
        .map(Some)
        .map_err(|_| WebCollapseError::NotAFunction(name))
}

fn call_with_this(function: &Function, details: &Element) {
    if let Err(err) = function.call0(details.as_ref()) {
        log::error!("reveal handler threw: {}", js_error_message(&err));
    }
}

/// Handlers sliding details open and closed over `duration_ms`.
#[must_use]
pub fn slide_reveal(duration_ms: u32) -> RevealHandler<Element> {
    RevealHandler::new()
        .on_open(move |details: &Element| slide(details, SlideDirection::Down, duration_ms))
        .on_close(move |details: &Element| slide(details, SlideDirection::Up, duration_ms))
}

/// Slide `element` down when hidden, up otherwise.
pub fn slide_toggle(element: &Element, duration_ms: u32) {
    let direction = if is_hidden(element) {
        SlideDirection::Down
    } else {
        SlideDirection::Up
    };
    slide(element, direction, duration_ms);
}

/// Animate the element's height. Starting a new slide supersedes an unfinished one.
pub fn slide(element: &Element, direction: SlideDirection, duration_ms: u32) {
    let Some(html) = element.dyn_ref::<HtmlElement>() else {
        set_style(
            element,
            "display",
            (direction == SlideDirection::Up).then_some("none"),
        );
        return;
    };
    let generation = next_generation(element);

    let start_height = match direction {
        SlideDirection::Down => {
            set_style(element, "display", None);
            if is_hidden(element) {
                // Hidden by a stylesheet rather than inline.
                set_style(element, "display", Some("block"));
            }
            0
        }
        SlideDirection::Up => html.offset_height(),
    };
    set_style(element, "overflow", Some("hidden"));
    set_style(element, "transition", None);
    set_style(element, "height", Some(&format!("{start_height}px")));
    // Reading layout commits the start height before the transition is applied.
    let full_height = html.scroll_height();
    set_style(
        element,
        "transition",
        Some(&format!("height {duration_ms}ms ease")),
    );
    let end_height = match direction {
        SlideDirection::Down => full_height,
        SlideDirection::Up => 0,
    };
    set_style(element, "height", Some(&format!("{end_height}px")));

    let target = element.clone();
    Timeout::new(duration_ms, move || {
        if current_generation(&target) == generation {
            finish_slide(&target, direction);
        }
    })
    .forget();
}

fn finish_slide(element: &Element, direction: SlideDirection) {
    for property in ["height", "overflow", "transition"] {
        set_style(element, property, None);
    }
    // Content re-opened since the slide started stays visible.
    let reopened = element.get_attribute(ARIA_HIDDEN).as_deref() == Some("false");
    if direction == SlideDirection::Up && !reopened {
        set_style(element, "display", Some("none"));
    }
}

fn current_generation(element: &Element) -> u32 {
    element
        .get_attribute(SLIDE_GENERATION_ATTR)
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

fn next_generation(element: &Element) -> u32 {
    let next = current_generation(element).wrapping_add(1);
    if let Err(err) = element.set_attribute(SLIDE_GENERATION_ATTR, &next.to_string()) {
        log::debug!("slide generation not recorded: {}", js_error_message(&err));
    }
    next
}
