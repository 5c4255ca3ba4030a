use collapse_core::CollapseError;
use wasm_bindgen::JsValue;

/// Failures surfaced to JavaScript callers of the collapse bindings.
#[derive(Debug, thiserror::Error)]
pub enum WebCollapseError {
    #[error("Invalid options: {0}")]
    Options(String),
    #[error("`{0}` option must be a function")]
    NotAFunction(&'static str),
    #[error("Controller is busy with another transition")]
    Busy,
    #[error(transparent)]
    Collapse(#[from] CollapseError),
}

impl From<serde_wasm_bindgen::Error> for WebCollapseError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        Self::Options(err.to_string())
    }
}

impl From<WebCollapseError> for JsValue {
    fn from(err: WebCollapseError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}
