//! Controllers bound to live containers and the handle exported to JavaScript.
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use collapse_core::constants::BOUND_ATTR;
use collapse_core::{
    Action, CollapseBuilder, CollapseConfig, CollapseError, Controller, RevealStrategy,
};
use gloo::events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event};

use crate::dom::{WebDom, js_error_message};
use crate::error::WebCollapseError;
use crate::reveal::js_reveal;
use crate::storage::LocalStateStorage;

pub type WebController = Controller<WebDom, LocalStateStorage>;

thread_local! {
    static HANDLES: RefCell<Vec<CollapseHandle>> = const { RefCell::new(Vec::new()) };
}

/// Shared handle on one container's controller.
///
/// Calls made while the controller is mid-transition (from a reveal handler or an
/// `opened`/`closed` listener) are rejected with a "busy" error.
#[wasm_bindgen]
#[derive(Clone)]
pub struct CollapseHandle {
    container: Element,
    controller: Rc<RefCell<WebController>>,
    // Removed from the container once the last handle is dropped.
    listeners: Rc<[EventListener]>,
}

impl CollapseHandle {
    #[must_use]
    pub const fn container(&self) -> &Element {
        &self.container
    }

    /// Problems found while binding or persisting.
    #[must_use]
    pub fn issues(&self) -> Vec<CollapseError> {
        self.controller
            .try_borrow()
            .map(|controller| controller.issues().to_vec())
            .unwrap_or_default()
    }

    /// Run `f` against the controller unless a transition is already in progress.
    ///
    /// # Errors
    /// Returns [`WebCollapseError::Busy`] on re-entrant calls, or whatever `f` fails with.
    pub fn with_controller<T>(
        &self,
        f: impl FnOnce(&mut WebController) -> Result<T, CollapseError>,
    ) -> Result<T, WebCollapseError> {
        let mut controller = self.controller.try_borrow_mut().map_err(|_| {
            log::warn!("ignoring re-entrant call on #{}", self.container.id());
            WebCollapseError::Busy
        })?;
        Ok(f(&mut controller)?)
    }

    fn apply(&self, action: Action, index: Option<u32>) -> Result<(), JsValue> {
        let index = index.map(to_index);
        Ok(self.with_controller(|controller| controller.apply(action, index))?)
    }
}

#[wasm_bindgen]
impl CollapseHandle {
    /// Open section `index`, or every section when omitted.
    pub fn open(&self, index: Option<u32>) -> Result<(), JsValue> {
        self.apply(Action::Open, index)
    }

    /// Close section `index`, or every section when omitted.
    pub fn close(&self, index: Option<u32>) -> Result<(), JsValue> {
        self.apply(Action::Close, index)
    }

    /// Toggle section `index`, or every section when omitted.
    pub fn toggle(&self, index: Option<u32>) -> Result<(), JsValue> {
        self.apply(Action::Toggle, index)
    }

    #[wasm_bindgen(js_name = isOpen)]
    pub fn is_open(&self, index: u32) -> Result<bool, JsValue> {
        Ok(self.with_controller(|controller| controller.is_open(to_index(index)))?)
    }

    #[wasm_bindgen(js_name = openIndices)]
    pub fn open_indices(&self) -> Result<Vec<u32>, JsValue> {
        Ok(self.with_controller(|controller| {
            Ok(controller
                .open_indices()
                .into_iter()
                .map(|index| u32::try_from(index).unwrap_or(u32::MAX))
                .collect())
        })?)
    }

    #[wasm_bindgen(js_name = sectionCount)]
    pub fn section_count(&self) -> Result<u32, JsValue> {
        Ok(self.with_controller(|controller| {
            Ok(u32::try_from(controller.len()).unwrap_or(u32::MAX))
        })?)
    }

    #[wasm_bindgen(js_name = isPersistent)]
    pub fn is_persistent(&self) -> Result<bool, JsValue> {
        Ok(self.with_controller(|controller| Ok(controller.is_persistent()))?)
    }
}

fn to_index(index: u32) -> usize {
    usize::try_from(index).unwrap_or(usize::MAX)
}

/// Bind a controller to `container` and route its click and command events.
///
/// A container that is already bound keeps its original controller; the existing
/// handle is returned when one is known.
pub fn bind(
    container: &Element,
    config: CollapseConfig,
    reveal: RevealStrategy<Element>,
) -> CollapseHandle {
    if container.has_attribute(BOUND_ATTR)
        && let Some(existing) = bound(container)
    {
        log::debug!("#{} already bound", container.id());
        return existing;
    }

    let controller = CollapseBuilder::new(WebDom, container.clone(), config)
        .reveal(reveal)
        .storage(LocalStateStorage)
        .build();
    let controller = Rc::new(RefCell::new(controller));
    let handle = CollapseHandle {
        container: container.clone(),
        listeners: attach_listeners(container, &controller).into(),
        controller,
    };
    HANDLES.with(|handles| handles.borrow_mut().push(handle.clone()));
    log::info!(
        "bound {} sections in #{}",
        handle.controller.borrow().len(),
        container.id()
    );
    handle
}

/// Forget the controller bound to `container` so it can be bound again.
///
/// Its listeners are removed once no other handle on it is alive.
pub fn unbind(container: &Element) -> Option<CollapseHandle> {
    let removed = HANDLES.with(|handles| {
        let mut handles = handles.borrow_mut();
        let position = handles
            .iter()
            .position(|handle| handle.container == *container)?;
        Some(handles.swap_remove(position))
    })?;
    if let Err(err) = container.remove_attribute(BOUND_ATTR) {
        log::debug!("bound marker kept: {}", js_error_message(&err));
    }
    log::debug!("unbound #{}", container.id());
    Some(removed)
}

fn attach_listeners(
    container: &Element,
    controller: &Rc<RefCell<WebController>>,
) -> Vec<EventListener> {
    let mut listeners = Vec::with_capacity(Action::ALL.len() + 1);

    let on_click = Rc::downgrade(controller);
    listeners.push(EventListener::new_with_options(
        container,
        "click",
        EventListenerOptions::enable_prevent_default(),
        move |event: &Event| {
            let (Some(controller), Some(target)) = (on_click.upgrade(), event_target(event)) else {
                return;
            };
            match controller.try_borrow_mut() {
                Ok(mut controller) => {
                    if controller.handle_click(&target).is_some() {
                        event.prevent_default();
                    }
                }
                Err(_) => log::warn!("click ignored during a transition"),
            }
        },
    ));

    for action in Action::ALL {
        let on_action: Weak<RefCell<WebController>> = Rc::downgrade(controller);
        listeners.push(EventListener::new(
            container,
            action.event_name(),
            move |event: &Event| {
                let (Some(controller), Some(target)) = (on_action.upgrade(), event_target(event))
                else {
                    return;
                };
                match controller.try_borrow_mut() {
                    Ok(mut controller) => {
                        let scope = controller.handle_event(&target, action);
                        log::trace!("{} event applied to {scope:?}", action.event_name());
                    }
                    Err(_) => {
                        log::warn!("`{}` event ignored during a transition", action.event_name());
                    }
                }
            },
        ));
    }
    listeners
}

fn event_target(event: &Event) -> Option<Element> {
    event.target().and_then(|target| target.dyn_into::<Element>().ok())
}

/// Handle of the controller bound to `container`, if any.
#[must_use]
pub fn bound(container: &Element) -> Option<CollapseHandle> {
    HANDLES.with(|handles| {
        handles
            .borrow()
            .iter()
            .find(|handle| handle.container == *container)
            .cloned()
    })
}

/// `collapse(element, options)`: bind a container from JavaScript.
///
/// `options` accepts `accordion`, `persist`, `query` and `clickQuery`, plus optional
/// `open`/`close` functions that replace the default show/hide effect.
#[wasm_bindgen(js_name = collapse)]
pub fn collapse(element: &Element, options: JsValue) -> Result<CollapseHandle, JsValue> {
    let config = parse_options(&options)?;
    let reveal = js_reveal(&options)?;
    Ok(bind(element, config, reveal.into()))
}

/// `unbindCollapse(element)`: release the controller bound to `element`.
#[wasm_bindgen(js_name = unbindCollapse)]
pub fn unbind_collapse(element: &Element) -> bool {
    unbind(element).is_some()
}

/// `boundCollapse(element)`: the handle created for `element`, if bound.
#[wasm_bindgen(js_name = boundCollapse)]
#[must_use]
pub fn bound_collapse(element: &Element) -> Option<CollapseHandle> {
    bound(element)
}

fn parse_options(options: &JsValue) -> Result<CollapseConfig, WebCollapseError> {
    if options.is_undefined() || options.is_null() {
        return Ok(CollapseConfig::default());
    }
    Ok(serde_wasm_bindgen::from_value(options.clone())?)
}
