//! Storefront page behaviors wired once at startup.
use collapse_core::CollapseConfig;
use wasm_bindgen::JsValue;
use web_sys::{Document, Element, Event};

use crate::binding::bind;
use crate::dom::{self, select_all, set_style};
use crate::reveal::{SlideDirection, slide, slide_reveal, slide_toggle};

/// Scroll offset at which the sticky header pins.
pub const STICKY_THRESHOLD_PX: f64 = 300.0;
pub const STICKY_CLASS: &str = "is-sticky";
pub const SEARCH_ICON: &str = "zmdi-search";
pub const CLOSE_ICON: &str = "zmdi-close";
pub const SEARCH_SLIDE_MS: u32 = 400;
pub const PAYMENT_SLIDE_MS: u32 = 550;

/// A control that slides a panel open and shut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideToggle {
    pub trigger: &'static str,
    pub event: &'static str,
    pub target: &'static str,
    pub duration_ms: u32,
}

pub const SLIDE_TOGGLES: [SlideToggle; 4] = [
    SlideToggle {
        trigger: "#showlogin",
        event: "click",
        target: "#checkout-login",
        duration_ms: 500,
    },
    SlideToggle {
        trigger: "#showcoupon",
        event: "click",
        target: "#checkout-coupon",
        duration_ms: 500,
    },
    SlideToggle {
        trigger: "#chekout-box",
        event: "change",
        target: ".account-create",
        duration_ms: 100,
    },
    SlideToggle {
        trigger: "#chekout-box-2",
        event: "change",
        target: ".ship-box-info",
        duration_ms: 100,
    },
];

#[must_use]
pub fn sticky_active(scroll_y: f64) -> bool {
    scroll_y >= STICKY_THRESHOLD_PX
}

/// Icon class to show for the search toggle in the given state.
#[must_use]
pub const fn search_icon(open: bool) -> &'static str {
    if open { CLOSE_ICON } else { SEARCH_ICON }
}

/// Direction the search forms slide once the toggle is `open`.
#[must_use]
pub const fn search_slide(open: bool) -> SlideDirection {
    if open {
        SlideDirection::Down
    } else {
        SlideDirection::Up
    }
}

#[must_use]
pub fn background_image_css(url: &str) -> String {
    format!("url({})", url.trim())
}

/// Install every page behavior under the document element.
///
/// # Errors
/// Returns an error if a listener cannot be registered.
pub fn install(document: &Document) -> Result<(), JsValue> {
    let Some(root) = document.document_element() else {
        return Ok(());
    };
    apply_background_images(&root);
    install_sticky_header(&root)?;
    install_search_toggle(&root)?;
    install_color_swatches(&root)?;
    for toggle in SLIDE_TOGGLES {
        install_slide_toggle(&root, toggle)?;
    }
    for container in select_all(&root, ".payment-accordion") {
        bind(
            &container,
            CollapseConfig::accordion(),
            slide_reveal(PAYMENT_SLIDE_MS).into(),
        );
    }
    log::debug!("page behaviors installed");
    Ok(())
}

fn apply_background_images(root: &Element) {
    for element in select_all(root, "[data-bgimage]") {
        if let Some(url) = element.get_attribute("data-bgimage") {
            set_style(&element, "background-image", Some(&background_image_css(&url)));
        }
    }
}

fn install_sticky_header(root: &Element) -> Result<(), JsValue> {
    let headers = select_all(root, ".header-sticky");
    if headers.is_empty() {
        return Ok(());
    }
    let Some(window) = dom::window() else {
        return Ok(());
    };
    let target = window.clone();
    dom::listen(&target, "scroll", move |_: Event| {
        let active = sticky_active(window.scroll_y().unwrap_or(0.0));
        for header in &headers {
            if let Err(err) = header.class_list().toggle_with_force(STICKY_CLASS, active) {
                log::warn!("sticky header: {}", dom::js_error_message(&err));
            }
        }
    })
}

/// Swap the icon of each `.header-search-toggle` and slide every search form under `root`.
///
/// # Errors
/// Fails when a click listener cannot be registered.
pub fn install_search_toggle(root: &Element) -> Result<(), JsValue> {
    for toggle in select_all(root, ".header-search-toggle") {
        let element = toggle.clone();
        let root = root.clone();
        dom::listen(&toggle, "click", move |_: Event| {
            let open = element.class_list().toggle("open").unwrap_or(false);
            for icon in select_all(&element, "i") {
                let list = icon.class_list();
                let swapped = list
                    .remove_1(search_icon(!open))
                    .and_then(|()| list.add_1(search_icon(open)));
                if let Err(err) = swapped {
                    log::warn!("search icon: {}", dom::js_error_message(&err));
                }
            }
            // Every search form on the page follows the toggle.
            for form in select_all(&root, ".header-search-form") {
                slide(&form, search_slide(open), SEARCH_SLIDE_MS);
            }
        })?;
    }
    Ok(())
}

fn install_color_swatches(root: &Element) -> Result<(), JsValue> {
    for swatch in select_all(root, ".product-color ul li") {
        let element = swatch.clone();
        dom::listen(&swatch, "click", move |_: Event| {
            let Some(list) = element.parent_element() else {
                return;
            };
            let siblings = list.children();
            for sibling in (0..siblings.length()).filter_map(|i| siblings.item(i)) {
                let checked = sibling == element;
                if let Err(err) = sibling.class_list().toggle_with_force("checked", checked) {
                    log::warn!("colour swatch: {}", dom::js_error_message(&err));
                }
            }
        })?;
    }
    Ok(())
}

fn install_slide_toggle(root: &Element, toggle: SlideToggle) -> Result<(), JsValue> {
    for trigger in select_all(root, toggle.trigger) {
        let scope = root.clone();
        dom::listen(&trigger, toggle.event, move |_: Event| {
            for panel in select_all(&scope, toggle.target) {
                slide_toggle(&panel, toggle.duration_ms);
            }
        })?;
    }
    Ok(())
}
