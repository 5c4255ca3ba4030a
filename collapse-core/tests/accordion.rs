use std::cell::RefCell;
use std::rc::Rc;

use collapse_core::{
    CollapseBuilder, CollapseConfig, CollapseDom, CollapseError, CollapseStorage, Controller,
    MemoryDom, NodeId, RevealHandler, SectionState, SharedDom, StorageError,
};

/// `aria-hidden` of the details, notifications fired and writes saved, as seen by a handler.
type Observation = (Option<String>, usize, Vec<(usize, bool)>);

fn observe(
    sink: Rc<RefCell<Vec<Observation>>>,
    dom: SharedDom,
    writes: Rc<RefCell<Vec<(usize, bool)>>>,
) -> impl Fn(&NodeId) + 'static {
    move |details: &NodeId| {
        let page = dom.borrow();
        let hidden = page.attribute(*details, "aria-hidden").map(str::to_owned);
        sink.borrow_mut()
            .push((hidden, page.events().len(), writes.borrow().clone()));
    }
}

/// Storage recording every write in a log the test can read from a reveal handler.
struct LoggedStorage(Rc<RefCell<Vec<(usize, bool)>>>);

impl CollapseStorage for LoggedStorage {
    fn read(&self, _container_id: &str) -> Result<Vec<Option<bool>>, StorageError> {
        Ok(Vec::new())
    }

    fn write(&mut self, _container_id: &str, index: usize, open: bool) -> Result<(), StorageError> {
        self.0.borrow_mut().push((index, open));
        Ok(())
    }
}

fn accordion(count: usize) -> Controller<MemoryDom> {
    let (dom, container) = MemoryDom::with_pairs("payment", count);
    Controller::new(dom, container, CollapseConfig::accordion())
}

#[test]
fn toggling_in_accordion_keeps_exactly_one_open() {
    let mut controller = accordion(3);
    assert_eq!(controller.states(), vec![SectionState::Closed; 3]);

    controller.toggle(Some(1)).unwrap();
    assert_eq!(controller.open_indices().as_slice(), &[1]);

    controller.toggle(Some(2)).unwrap();
    assert_eq!(controller.open_indices().as_slice(), &[2]);
    assert!(!controller.is_open(0).unwrap());
    assert!(!controller.is_open(1).unwrap());
}

#[test]
fn open_in_accordion_leaves_only_target_open() {
    let mut controller = accordion(4);
    for index in [0, 3, 1, 2, 2] {
        controller.open(Some(index)).unwrap();
        assert_eq!(controller.open_indices().as_slice(), &[index]);
        for section in controller.sections() {
            let visible = controller.dom().is_visible(*section.details());
            assert_eq!(visible, section.index() == index);
        }
    }
}

#[test]
fn open_all_in_accordion_ends_on_last_section() {
    let mut controller = accordion(3);
    controller.open(None).unwrap();
    assert_eq!(controller.open_indices().as_slice(), &[2]);

    controller.close(None).unwrap();
    assert!(controller.open_indices().is_empty());
}

#[test]
fn open_all_without_accordion_opens_everything() {
    let (dom, container) = MemoryDom::with_pairs("faq", 3);
    let mut controller = Controller::new(dom, container, CollapseConfig::default());
    controller.open(None).unwrap();
    assert_eq!(controller.open_indices().as_slice(), &[0, 1, 2]);
    controller.toggle(None).unwrap();
    assert!(controller.open_indices().is_empty());
}

#[test]
fn double_toggle_restores_state_with_one_notification_per_call() {
    let (dom, container) = MemoryDom::with_pairs("faq", 3);
    let mut controller = Controller::new(dom, container, CollapseConfig::default());
    let before = controller.states();
    let dom_events = |controller: &Controller<MemoryDom>| {
        controller
            .dom()
            .events()
            .iter()
            .filter(|(_, event)| event.index == 1)
            .map(|(_, event)| event.name())
            .collect::<Vec<_>>()
    };
    let initial = dom_events(&controller).len();

    controller.toggle(Some(1)).unwrap();
    assert_eq!(dom_events(&controller)[initial..], ["opened"]);
    controller.toggle(Some(1)).unwrap();
    assert_eq!(dom_events(&controller)[initial..], ["opened", "closed"]);
    assert_eq!(controller.states(), before);
}

#[test]
fn notifications_fire_on_the_section_header() {
    let (dom, container) = MemoryDom::with_pairs("faq", 2);
    let mut controller = Controller::new(dom, container, CollapseConfig::default());
    let header = *controller.section(1).unwrap().summary();
    controller.open(Some(1)).unwrap();
    let (node, event) = *controller.dom().events().last().unwrap();
    assert_eq!(node, header);
    assert_eq!(event.index, 1);
    assert_eq!(event.state, SectionState::Open);
}

#[test]
fn out_of_range_index_changes_nothing() {
    let mut controller = accordion(3);
    controller.open(Some(0)).unwrap();
    let before = controller.states();
    let events_before = controller.dom().events().len();

    let err = controller.open(Some(999)).unwrap_err();
    assert_eq!(err, CollapseError::IndexOutOfRange { index: 999, len: 3 });
    assert!(controller.toggle(Some(3)).is_err());
    assert!(controller.is_open(3).is_err());

    assert_eq!(controller.states(), before);
    assert_eq!(controller.dom().events().len(), events_before);
}

#[test]
fn transitions_sync_aria_and_open_class() {
    let (dom, container) = MemoryDom::with_pairs("faq", 1);
    let mut controller = Controller::new(dom, container, CollapseConfig::default());
    let summary = *controller.section(0).unwrap().summary();
    let details = *controller.section(0).unwrap().details();

    let dom = controller.dom();
    assert_eq!(dom.attribute(summary, "aria-expanded"), Some("false"));
    assert_eq!(dom.attribute(details, "aria-hidden"), Some("true"));
    assert!(!dom.is_marked_open(summary));
    assert!(!dom.is_visible(details));

    controller.open(Some(0)).unwrap();
    let dom = controller.dom();
    assert_eq!(dom.attribute(summary, "aria-expanded"), Some("true"));
    assert_eq!(dom.attribute(details, "aria-hidden"), Some("false"));
    assert!(dom.is_marked_open(summary));
    assert!(dom.is_visible(details));
}

#[test]
fn marked_headers_start_open_and_accordion_keeps_the_first() {
    let (mut dom, container) = MemoryDom::with_pairs("faq", 3);
    let headers: Vec<NodeId> = dom.children(&container).into_iter().step_by(2).collect();
    dom.add_class(headers[1], "open");
    dom.add_class(headers[2], "open");

    let plain = Controller::new(dom.clone(), container, CollapseConfig::default());
    assert_eq!(plain.open_indices().as_slice(), &[1, 2]);

    let exclusive = Controller::new(dom, container, CollapseConfig::accordion());
    assert_eq!(exclusive.open_indices().as_slice(), &[1]);
}

#[test]
fn custom_handler_owns_visuals_except_during_initialisation() {
    let (mut dom, container) = MemoryDom::with_pairs("payment", 2);
    let first_header = dom.children(&container)[0];
    dom.add_class(first_header, "open");

    let opened: Rc<RefCell<Vec<NodeId>>> = Rc::default();
    let sink = Rc::clone(&opened);
    let handler = RevealHandler::new().on_open(move |details: &NodeId| sink.borrow_mut().push(*details));

    let mut controller = CollapseBuilder::new(dom, container, CollapseConfig::accordion())
        .reveal(handler)
        .build();

    // Initialisation bypasses the handler and uses the default effect.
    assert!(opened.borrow().is_empty());
    let first_details = *controller.section(0).unwrap().details();
    assert!(controller.dom().is_visible(first_details));

    controller.open(Some(1)).unwrap();
    let second_details = *controller.section(1).unwrap().details();
    assert_eq!(opened.borrow().as_slice(), &[second_details]);
    // The handler did not reveal anything itself, so the default effect never ran.
    assert!(!controller.dom().is_visible(second_details));
    // No close handler: closing falls back to the default effect.
    assert!(!controller.dom().is_visible(first_details));
    assert!(controller.is_open(1).unwrap());
}

#[test]
fn handlers_see_committed_markers_and_storage() {
    let (page, container) = MemoryDom::with_pairs("faq", 2);
    let dom: SharedDom = Rc::new(RefCell::new(page));
    let writes: Rc<RefCell<Vec<(usize, bool)>>> = Rc::default();

    let seen: Rc<RefCell<Vec<Observation>>> = Rc::default();
    let handler = RevealHandler::new()
        .on_open(observe(Rc::clone(&seen), Rc::clone(&dom), Rc::clone(&writes)))
        .on_close(observe(Rc::clone(&seen), Rc::clone(&dom), Rc::clone(&writes)));

    let config = CollapseConfig::default().with_persist(true);
    let mut controller = CollapseBuilder::new(Rc::clone(&dom), container, config)
        .storage(LoggedStorage(Rc::clone(&writes)))
        .reveal(handler)
        .build();
    let events_before = dom.borrow().events().len();
    writes.borrow_mut().clear();

    controller.open(Some(0)).unwrap();
    controller.close(Some(0)).unwrap();

    let seen = seen.borrow();
    assert_eq!(
        seen.as_slice(),
        &[
            (Some("false".to_string()), events_before, vec![(0, true)]),
            (
                Some("true".to_string()),
                events_before + 1,
                vec![(0, true), (0, false)]
            ),
        ]
    );
    // The notification follows the reveal.
    assert_eq!(dom.borrow().events().len(), events_before + 2);
    let summary = *controller.section(0).unwrap().summary();
    assert!(!dom.borrow().is_marked_open(summary));
}
