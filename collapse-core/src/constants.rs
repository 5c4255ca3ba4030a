//! Attribute, class and event names shared by every DOM backend.

/// Marker attribute flagging a container for automatic binding.
pub const MARKER_ATTR: &str = "data-collapse";
/// Attribute stamped on every header once it belongs to a section.
pub const SUMMARY_ATTR: &str = "data-collapse-summary";
/// Attribute stamped on a container once a controller owns it.
pub const BOUND_ATTR: &str = "data-collapse-bound";
/// Header class marking an open section (also read as the initial state).
pub const OPEN_CLASS: &str = "open";
pub const ARIA_EXPANDED: &str = "aria-expanded";
pub const ARIA_HIDDEN: &str = "aria-hidden";
/// Notification fired on a header after it opens.
pub const OPENED_EVENT: &str = "opened";
/// Notification fired on a header after it closes.
pub const CLOSED_EVENT: &str = "closed";
/// Spelling of the default pair query.
pub const EVEN_CHILDREN_QUERY: &str = "> :even";
