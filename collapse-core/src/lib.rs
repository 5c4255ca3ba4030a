//! Collapse core
//!
//! Platform-agnostic state management for collapsible header/content sections:
//! per-container controllers, single-open accordion mode and persisted open state.
//! The DOM is reached only through the [`CollapseDom`] capability trait, so the same
//! controller drives browser elements and the headless [`MemoryDom`].

pub mod config;
pub mod constants;
pub mod controller;
pub mod dom;
pub mod error;
pub mod memory;
pub mod reveal;
pub mod section;
pub mod storage;

// Re-export commonly used types
pub use config::{CollapseConfig, PairQuery};
pub use controller::{Action, CollapseBuilder, Controller, EventScope};
pub use dom::{CollapseDom, SectionEvent};
pub use error::{CollapseError, StorageError};
pub use memory::{MemoryDom, NodeId, SharedDom};
pub use reveal::{RevealFn, RevealHandler, RevealStrategy};
pub use section::{InitialState, Section, SectionState};
pub use storage::{CollapseStorage, MemoryStorage, NoStorage, StateTable};
