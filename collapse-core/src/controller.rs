//! The per-container collapse controller.
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::{CollapseConfig, PairQuery};
use crate::constants::{BOUND_ATTR, OPEN_CLASS, SUMMARY_ATTR};
use crate::dom::{CollapseDom, SectionEvent};
use crate::error::CollapseError;
use crate::reveal::RevealStrategy;
use crate::section::{InitialState, Section, SectionState};
use crate::storage::{CollapseStorage, NoStorage};

/// Commands accepted by a controller, as methods or as container events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Open,
    Close,
    Toggle,
}

impl Action {
    pub const ALL: [Self; 3] = [Self::Toggle, Self::Open, Self::Close];

    /// Name of the DOM event carrying this command.
    #[must_use]
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Toggle => "toggle",
        }
    }
}

impl FromStr for Action {
    type Err = CollapseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "close" => Ok(Self::Close),
            "toggle" => Ok(Self::Toggle),
            other => Err(CollapseError::UnknownAction(other.to_string())),
        }
    }
}

/// What a dispatched event ended up applying to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventScope {
    /// Dispatched at the container itself: applied to every section.
    Container,
    /// Dispatched inside the header of this section.
    Section(usize),
    /// No section header of this container owns the target.
    Unowned,
}

struct Persistence<S> {
    container_id: String,
    store: S,
}

/// Collects the inputs of a [`Controller`]; sections are built by [`CollapseBuilder::build`].
pub struct CollapseBuilder<D: CollapseDom, S = NoStorage> {
    dom: D,
    container: D::Node,
    config: CollapseConfig,
    reveal: RevealStrategy<D::Node>,
    storage: Option<S>,
}

impl<D: CollapseDom> CollapseBuilder<D, NoStorage> {
    pub fn new(dom: D, container: D::Node, config: CollapseConfig) -> Self {
        Self {
            dom,
            container,
            config,
            reveal: RevealStrategy::DefaultToggle,
            storage: None,
        }
    }
}

impl<D: CollapseDom, S: CollapseStorage> CollapseBuilder<D, S> {
    #[must_use]
    pub fn reveal(mut self, reveal: impl Into<RevealStrategy<D::Node>>) -> Self {
        self.reveal = reveal.into();
        self
    }

    /// Storage backend consulted when the configuration asks for persistence.
    pub fn storage<T: CollapseStorage>(self, storage: T) -> CollapseBuilder<D, T> {
        CollapseBuilder {
            dom: self.dom,
            container: self.container,
            config: self.config,
            reveal: self.reveal,
            storage: Some(storage),
        }
    }

    /// Scan the container and initialise one section per header/content pair.
    ///
    /// Malformed pairs and storage failures are logged, kept in
    /// [`Controller::issues`] and skipped. A container that already carries a controller
    /// yields one with no sections.
    pub fn build(self) -> Controller<D, S> {
        let Self {
            dom,
            container,
            config,
            reveal,
            storage,
        } = self;

        let mut controller = Controller {
            dom,
            container,
            config,
            reveal,
            sections: Vec::new(),
            persistence: None,
            issues: Vec::new(),
        };

        if controller.dom.has_attribute(&controller.container, BOUND_ATTR) {
            log::debug!("container {:?} already bound, skipping", controller.container);
            return controller;
        }
        controller
            .dom
            .set_attribute(&controller.container, BOUND_ATTR, "");

        let saved = controller.attach_storage(storage);
        let initial = controller.scan_sections(&saved);
        for (index, state) in initial.into_iter().enumerate() {
            controller.transition(index, state, true);
        }
        controller
    }
}

/// Owns the sections of one container and every transition applied to them.
pub struct Controller<D: CollapseDom, S = NoStorage> {
    dom: D,
    container: D::Node,
    config: CollapseConfig,
    reveal: RevealStrategy<D::Node>,
    sections: Vec<Section<D::Node>>,
    persistence: Option<Persistence<S>>,
    issues: Vec<CollapseError>,
}

impl<D: CollapseDom> Controller<D, NoStorage> {
    /// Build a non-persistent controller with the default reveal effect.
    pub fn new(dom: D, container: D::Node, config: CollapseConfig) -> Self {
        CollapseBuilder::new(dom, container, config).build()
    }
}

impl<D: CollapseDom, S: CollapseStorage> Controller<D, S> {
    /// Open one section, or every section when `index` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CollapseError::IndexOutOfRange`] without changing any state.
    pub fn open(&mut self, index: Option<usize>) -> Result<(), CollapseError> {
        self.apply(Action::Open, index)
    }

    /// Close one section, or every section when `index` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CollapseError::IndexOutOfRange`] without changing any state.
    pub fn close(&mut self, index: Option<usize>) -> Result<(), CollapseError> {
        self.apply(Action::Close, index)
    }

    /// Toggle one section, or every section when `index` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CollapseError::IndexOutOfRange`] without changing any state.
    pub fn toggle(&mut self, index: Option<usize>) -> Result<(), CollapseError> {
        self.apply(Action::Toggle, index)
    }

    /// # Errors
    ///
    /// Returns [`CollapseError::IndexOutOfRange`] without changing any state.
    pub fn apply(&mut self, action: Action, index: Option<usize>) -> Result<(), CollapseError> {
        match index {
            Some(index) => {
                self.check_index(index)?;
                self.apply_one(action, index);
            }
            None => {
                for index in 0..self.sections.len() {
                    self.apply_one(action, index);
                }
            }
        }
        Ok(())
    }

    /// Route a click to the section whose header owns `target`.
    ///
    /// The target must sit inside a summary (and inside `clickQuery` when configured).
    /// Headers are searched last to first so the nearest enclosing one wins; headers of
    /// nested controllers never match because they are not in this container's list.
    /// Returns the toggled section.
    pub fn handle_click(&mut self, target: &D::Node) -> Option<usize> {
        let trigger = self
            .dom
            .closest(target, &self.config.trigger_selector())?;
        if !self.dom.contains(&self.container, &trigger) {
            return None;
        }
        let index = self.owning_section(target)?;
        self.apply_one(Action::Toggle, index);
        Some(index)
    }

    /// Apply a `toggle`/`open`/`close` event dispatched at `target`.
    pub fn handle_event(&mut self, target: &D::Node, action: Action) -> EventScope {
        if *target == self.container {
            for index in 0..self.sections.len() {
                self.apply_one(action, index);
            }
            return EventScope::Container;
        }
        match self.owning_section(target) {
            Some(index) => {
                self.apply_one(action, index);
                EventScope::Section(index)
            }
            None => EventScope::Unowned,
        }
    }

    /// # Errors
    ///
    /// Returns [`CollapseError::IndexOutOfRange`] for an unknown index.
    pub fn is_open(&self, index: usize) -> Result<bool, CollapseError> {
        self.check_index(index)?;
        Ok(self.sections[index].is_open())
    }

    #[must_use]
    pub fn open_indices(&self) -> SmallVec<[usize; 4]> {
        self.sections
            .iter()
            .filter(|s| s.is_open())
            .map(Section::index)
            .collect()
    }

    #[must_use]
    pub fn states(&self) -> Vec<SectionState> {
        self.sections.iter().map(Section::state).collect()
    }

    #[must_use]
    pub fn sections(&self) -> &[Section<D::Node>] {
        &self.sections
    }

    #[must_use]
    pub fn section(&self, index: usize) -> Option<&Section<D::Node>> {
        self.sections.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    #[must_use]
    pub const fn is_accordion(&self) -> bool {
        self.config.accordion
    }

    /// Whether state is still being written to storage.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        self.persistence.is_some()
    }

    #[must_use]
    pub const fn config(&self) -> &CollapseConfig {
        &self.config
    }

    /// Problems found while building or persisting, each reported once.
    #[must_use]
    pub fn issues(&self) -> &[CollapseError] {
        &self.issues
    }

    #[must_use]
    pub const fn container(&self) -> &D::Node {
        &self.container
    }

    #[must_use]
    pub const fn dom(&self) -> &D {
        &self.dom
    }

    /// Release the DOM backend and storage, e.g. to rebuild over a fresh page.
    pub fn into_parts(self) -> (D, Option<S>) {
        (self.dom, self.persistence.map(|p| p.store))
    }

    fn check_index(&self, index: usize) -> Result<(), CollapseError> {
        if index < self.sections.len() {
            Ok(())
        } else {
            Err(CollapseError::IndexOutOfRange {
                index,
                len: self.sections.len(),
            })
        }
    }

    fn owning_section(&self, target: &D::Node) -> Option<usize> {
        self.sections
            .iter()
            .rev()
            .find(|section| self.dom.contains(section.summary(), target))
            .map(Section::index)
    }

    fn apply_one(&mut self, action: Action, index: usize) {
        match action {
            Action::Open => self.open_section(index),
            Action::Close => {
                self.transition(index, SectionState::Closed, false);
            }
            Action::Toggle if self.sections[index].is_open() => {
                self.transition(index, SectionState::Closed, false);
            }
            Action::Toggle => self.open_section(index),
        }
    }

    /// In accordion mode every other section closes before `index` opens.
    fn open_section(&mut self, index: usize) {
        if self.config.accordion {
            for other in (0..self.sections.len()).filter(|other| *other != index) {
                self.transition(other, SectionState::Closed, false);
            }
        }
        self.transition(index, SectionState::Open, false);
    }

    fn transition(&mut self, index: usize, state: SectionState, bypass: bool) -> SectionEvent {
        self.sections[index].commit(&mut self.dom, state);
        self.persist(index, state.is_open());
        self.sections[index].reveal(&mut self.dom, &self.reveal, bypass);
        let event = self.sections[index].notify(&mut self.dom);
        log::debug!("section {index} {}", event.name());
        event
    }

    fn persist(&mut self, index: usize, open: bool) {
        let Some(persistence) = self.persistence.as_mut() else {
            return;
        };
        if let Err(err) = persistence
            .store
            .write(&persistence.container_id, index, open)
        {
            let issue = CollapseError::StorageUnavailable {
                container: persistence.container_id.clone(),
                reason: err.to_string(),
            };
            self.persistence = None;
            self.report(issue);
        }
    }

    fn report(&mut self, issue: CollapseError) {
        log::warn!("{issue}");
        self.issues.push(issue);
    }

    /// Bind storage when persistence is requested and return the saved states.
    fn attach_storage(&mut self, storage: Option<S>) -> Vec<Option<bool>> {
        if !self.config.persist {
            return Vec::new();
        }
        let container_id = self.dom.id(&self.container);
        let (store, container_id) = match (storage, container_id) {
            (Some(store), Some(id)) => (store, id),
            (None, id) => {
                self.report(CollapseError::StorageUnavailable {
                    container: id.unwrap_or_default(),
                    reason: "no storage backend".into(),
                });
                return Vec::new();
            }
            (Some(_), None) => {
                self.report(CollapseError::StorageUnavailable {
                    container: String::new(),
                    reason: "container has no id".into(),
                });
                return Vec::new();
            }
        };
        match store.read(&container_id) {
            Ok(saved) => {
                self.persistence = Some(Persistence {
                    container_id,
                    store,
                });
                saved
            }
            Err(err) => {
                self.report(CollapseError::StorageUnavailable {
                    container: container_id,
                    reason: err.to_string(),
                });
                Vec::new()
            }
        }
    }

    /// Create the sections and resolve the state each one starts in.
    fn scan_sections(&mut self, saved: &[Option<bool>]) -> Vec<SectionState> {
        let headers = match &self.config.query {
            PairQuery::EvenChildren => self
                .dom
                .children(&self.container)
                .into_iter()
                .step_by(2)
                .collect(),
            PairQuery::Selector(selector) => self.dom.select_all(&self.container, selector),
        };

        let mut initial = Vec::with_capacity(headers.len());
        for (position, header) in headers.into_iter().enumerate() {
            let Some(details) = self.dom.next_element(&header) else {
                self.report(CollapseError::MalformedSection { position });
                continue;
            };
            if self.config.click_query.is_none() {
                self.dom.wrap_in_link(&header);
            }
            self.dom.set_attribute(&header, SUMMARY_ATTR, "");

            let index = self.sections.len();
            let persisted = saved.get(index).copied().flatten();
            let marked = self.dom.has_class(&header, OPEN_CLASS);
            initial.push(InitialState::resolve(persisted, marked).state());
            self.sections.push(Section::new(index, header, details));
        }

        if self.config.accordion {
            let mut seen_open = false;
            for state in &mut initial {
                if state.is_open() && std::mem::replace(&mut seen_open, true) {
                    *state = SectionState::Closed;
                }
            }
        }
        initial
    }
}
