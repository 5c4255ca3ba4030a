//! The narrow DOM capability set a controller depends on.
//!
//! Browser builds implement [`CollapseDom`] over `web_sys::Element`; tests and the tester
//! binary use the headless [`MemoryDom`](crate::memory::MemoryDom).
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::section::SectionState;

/// Notification fired on a section header after every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionEvent {
    pub index: usize,
    pub state: SectionState,
}

impl SectionEvent {
    /// Event name dispatched on the header (`opened` or `closed`).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.state.event_name()
    }
}

/// Element lookup, attribute/class access, reveal primitives and event dispatch.
///
/// Lookups take `&self`; anything that changes the document takes `&mut self`.
pub trait CollapseDom {
    type Node: Clone + PartialEq + Debug;

    /// Direct element children in document order.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Descendants of `root` matching `selector`, in document order.
    fn select_all(&self, root: &Self::Node, selector: &str) -> Vec<Self::Node>;

    /// The element immediately following `node`.
    fn next_element(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Whether `node` is `ancestor` or lies beneath it.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;

    /// Nearest inclusive ancestor of `node` matching `selector`.
    fn closest(&self, node: &Self::Node, selector: &str) -> Option<Self::Node>;

    /// The element id, if it has a non-empty one.
    fn id(&self, node: &Self::Node) -> Option<String>;

    fn has_attribute(&self, node: &Self::Node, name: &str) -> bool;

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    fn set_class(&mut self, node: &Self::Node, class: &str, enabled: bool);

    /// Wrap the content of `node` in an `<a href="#">` unless it already is a single link.
    fn wrap_in_link(&mut self, node: &Self::Node);

    /// Default reveal effect.
    fn show(&mut self, node: &Self::Node);

    /// Default conceal effect.
    fn hide(&mut self, node: &Self::Node);

    /// Dispatch an `opened`/`closed` notification on a header.
    fn notify(&mut self, node: &Self::Node, event: SectionEvent);
}
