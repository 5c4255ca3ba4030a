//! One header/content pair and its open/closed state machine.
use serde::{Deserialize, Serialize};

use crate::constants::{ARIA_EXPANDED, ARIA_HIDDEN, CLOSED_EVENT, OPEN_CLASS, OPENED_EVENT};
use crate::dom::{CollapseDom, SectionEvent};
use crate::reveal::RevealStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionState {
    Open,
    #[default]
    Closed,
}

impl SectionState {
    #[must_use]
    pub const fn from_open(open: bool) -> Self {
        if open { Self::Open } else { Self::Closed }
    }

    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Open => Self::Closed,
            Self::Closed => Self::Open,
        }
    }

    #[must_use]
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::Open => OPENED_EVENT,
            Self::Closed => CLOSED_EVENT,
        }
    }
}

/// Where a section's initial state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialState {
    Persisted(bool),
    Marked,
    Default,
}

impl InitialState {
    /// Resolve the starting state: saved state, then the header's `open` class, then closed.
    #[must_use]
    pub const fn resolve(persisted: Option<bool>, marked_open: bool) -> Self {
        match persisted {
            Some(open) => Self::Persisted(open),
            None if marked_open => Self::Marked,
            None => Self::Default,
        }
    }

    #[must_use]
    pub const fn state(self) -> SectionState {
        match self {
            Self::Persisted(open) => SectionState::from_open(open),
            Self::Marked => SectionState::Open,
            Self::Default => SectionState::Closed,
        }
    }
}

/// A header (`summary`) and the content it reveals (`details`).
///
/// The state only changes through the owning [`Controller`](crate::Controller).
#[derive(Debug, Clone, PartialEq)]
pub struct Section<N> {
    index: usize,
    state: SectionState,
    summary: N,
    details: N,
}

impl<N: Clone + PartialEq + std::fmt::Debug> Section<N> {
    pub(crate) const fn new(index: usize, summary: N, details: N) -> Self {
        Self {
            index,
            state: SectionState::Closed,
            summary,
            details,
        }
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn state(&self) -> SectionState {
        self.state
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.state.is_open()
    }

    #[must_use]
    pub const fn summary(&self) -> &N {
        &self.summary
    }

    #[must_use]
    pub const fn details(&self) -> &N {
        &self.details
    }

    /// Commit `state` and sync the `open` class and ARIA markers on the DOM.
    pub(crate) fn commit<D>(&mut self, dom: &mut D, state: SectionState)
    where
        D: CollapseDom<Node = N>,
    {
        self.state = state;
        let open = state.is_open();
        dom.set_class(&self.summary, OPEN_CLASS, open);
        dom.set_attribute(&self.details, ARIA_HIDDEN, if open { "false" } else { "true" });
        dom.set_attribute(&self.summary, ARIA_EXPANDED, if open { "true" } else { "false" });
    }

    /// Run the reveal effect for the committed state.
    ///
    /// With `bypass` set, or when the strategy has no handler for this direction, the
    /// backend's show/hide runs directly. Otherwise the handler alone changes the visuals.
    pub(crate) fn reveal<D>(&self, dom: &mut D, reveal: &RevealStrategy<N>, bypass: bool)
    where
        D: CollapseDom<Node = N>,
    {
        match reveal.handler_for(self.state).filter(|_| !bypass) {
            Some(handler) => handler(&self.details),
            None if self.is_open() => dom.show(&self.details),
            None => dom.hide(&self.details),
        }
    }

    /// Fire `opened`/`closed` on the header.
    pub(crate) fn notify<D>(&self, dom: &mut D) -> SectionEvent
    where
        D: CollapseDom<Node = N>,
    {
        let event = SectionEvent {
            index: self.index,
            state: self.state,
        };
        dom.notify(&self.summary, event);
        event
    }
}
