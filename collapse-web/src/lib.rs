#![forbid(unsafe_code)]
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod binding;
pub mod components;
pub mod dom;
pub mod error;
pub mod page;
pub mod reveal;
pub mod scan;
pub mod storage;

pub use binding::{CollapseHandle, WebController, bind, bound, collapse, unbind};
pub use error::WebCollapseError;
pub use scan::auto_bind;
pub use storage::LocalStateStorage;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Info) {
        dom::console_error(&format!("console logger not installed: {err}"));
    }

    let Some(document) = dom::document() else {
        log::error!("no document, collapse bindings skipped");
        return;
    };
    if let Some(body) = document.body() {
        let handles = scan::auto_bind(&body);
        log::debug!("auto-bound {} containers", handles.len());
    }
    if let Err(err) = page::install(&document) {
        dom::console_error(&format!(
            "page behaviors failed: {}",
            dom::js_error_message(&err)
        ));
    }
}
