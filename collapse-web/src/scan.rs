//! Automatic binding of containers flagged with `data-collapse`.
use collapse_core::constants::{BOUND_ATTR, MARKER_ATTR};
use collapse_core::{CollapseConfig, RevealStrategy};
use web_sys::Element;

use crate::binding::{CollapseHandle, bind};
use crate::dom::select_all;

/// Bind every unbound `[data-collapse]` container inside `root` (and `root` itself).
///
/// The marker value is a flag list: `data-collapse="accordion persist"`.
pub fn auto_bind(root: &Element) -> Vec<CollapseHandle> {
    let selector = format!("[{MARKER_ATTR}]");
    let mut containers = Vec::new();
    if root.has_attribute(MARKER_ATTR) {
        containers.push(root.clone());
    }
    containers.extend(select_all(root, &selector));

    containers
        .into_iter()
        .filter(|container| !container.has_attribute(BOUND_ATTR))
        .map(|container| {
            let flags = container.get_attribute(MARKER_ATTR).unwrap_or_default();
            let config = CollapseConfig::from_flags(&flags);
            bind(&container, config, RevealStrategy::DefaultToggle)
        })
        .collect()
}
