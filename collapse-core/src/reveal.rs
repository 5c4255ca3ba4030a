//! How a section's content becomes visible or hidden.
use std::fmt;
use std::rc::Rc;

use crate::section::SectionState;

/// Callback receiving the details node of the section being changed.
pub type RevealFn<N> = Rc<dyn Fn(&N)>;

/// Custom open/close handlers. A direction without a handler uses the default effect.
pub struct RevealHandler<N> {
    open: Option<RevealFn<N>>,
    close: Option<RevealFn<N>>,
}

impl<N> RevealHandler<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            open: None,
            close: None,
        }
    }

    #[must_use]
    pub fn on_open(mut self, handler: impl Fn(&N) + 'static) -> Self {
        self.open = Some(Rc::new(handler));
        self
    }

    #[must_use]
    pub fn on_close(mut self, handler: impl Fn(&N) + 'static) -> Self {
        self.close = Some(Rc::new(handler));
        self
    }

    #[must_use]
    pub fn handler_for(&self, state: SectionState) -> Option<&RevealFn<N>> {
        match state {
            SectionState::Open => self.open.as_ref(),
            SectionState::Closed => self.close.as_ref(),
        }
    }

    /// True when neither direction has a handler.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.open.is_none() && self.close.is_none()
    }
}

impl<N> Default for RevealHandler<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Clone for RevealHandler<N> {
    fn clone(&self) -> Self {
        Self {
            open: self.open.clone(),
            close: self.close.clone(),
        }
    }
}

impl<N> fmt::Debug for RevealHandler<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevealHandler")
            .field("open", &self.open.is_some())
            .field("close", &self.close.is_some())
            .finish()
    }
}

/// Reveal strategy chosen when a controller is built.
pub enum RevealStrategy<N> {
    /// Show or hide the details node through the DOM backend.
    DefaultToggle,
    /// Hand the details node to user handlers. The handler owns the visual change entirely.
    CustomToggle(RevealHandler<N>),
}

impl<N> RevealStrategy<N> {
    /// Handler responsible for a non-bypass transition into `state`, if any.
    #[must_use]
    pub fn handler_for(&self, state: SectionState) -> Option<&RevealFn<N>> {
        match self {
            Self::DefaultToggle => None,
            Self::CustomToggle(handler) => handler.handler_for(state),
        }
    }
}

impl<N> Default for RevealStrategy<N> {
    fn default() -> Self {
        Self::DefaultToggle
    }
}

impl<N> Clone for RevealStrategy<N> {
    fn clone(&self) -> Self {
        match self {
            Self::DefaultToggle => Self::DefaultToggle,
            Self::CustomToggle(handler) => Self::CustomToggle(handler.clone()),
        }
    }
}

impl<N> fmt::Debug for RevealStrategy<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DefaultToggle => f.write_str("DefaultToggle"),
            Self::CustomToggle(handler) => f.debug_tuple("CustomToggle").field(handler).finish(),
        }
    }
}

impl<N> From<RevealHandler<N>> for RevealStrategy<N> {
    fn from(handler: RevealHandler<N>) -> Self {
        if handler.is_empty() {
            Self::DefaultToggle
        } else {
            Self::CustomToggle(handler)
        }
    }
}
