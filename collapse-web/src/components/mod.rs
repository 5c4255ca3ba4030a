pub mod collapse_group;

pub use collapse_group::{CollapseGroup, CollapseGroupProps, CollapseItem};
