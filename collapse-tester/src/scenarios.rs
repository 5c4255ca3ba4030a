//! Behavioral scenarios run against the headless DOM.
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, ensure};
use collapse_core::{
    CollapseBuilder, CollapseConfig, CollapseDom, CollapseError, CollapseStorage, Controller,
    MemoryDom, MemoryStorage, NodeId, PairQuery, RevealHandler, SectionState, SharedDom,
    StorageError,
};
use serde::{Deserialize, Serialize};

/// A named check over one or more controllers.
#[derive(Clone, Copy)]
pub struct Scenario {
    pub key: &'static str,
    pub description: &'static str,
    run: fn() -> Result<()>,
}

impl Scenario {
    /// # Errors
    /// Returns the first failed expectation.
    pub fn run(&self) -> Result<()> {
        (self.run)().with_context(|| format!("scenario `{}`", self.key))
    }
}

/// Outcome of running one scenario for several iterations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub average_duration: Duration,
    pub failures: Vec<String>,
}

pub fn catalog() -> Vec<Scenario> {
    vec![
        Scenario {
            key: "accordion-exclusive",
            description: "Opening any section of an accordion leaves only that section open",
            run: accordion_exclusive,
        },
        Scenario {
            key: "double-toggle",
            description: "Toggling twice restores state and notifies once per call",
            run: double_toggle,
        },
        Scenario {
            key: "open-close-all",
            description: "Index-less commands apply to every section",
            run: open_close_all,
        },
        Scenario {
            key: "persistence-round-trip",
            description: "Persisted containers restore their open sections on rebuild",
            run: persistence_round_trip,
        },
        Scenario {
            key: "out-of-range",
            description: "Bad indices fail without touching state or firing events",
            run: out_of_range,
        },
        Scenario {
            key: "nested-click",
            description: "A click inside a nested container toggles only the inner section",
            run: nested_click,
        },
        Scenario {
            key: "storage-degrade",
            description: "Write failures disable persistence once and keep sections working",
            run: storage_degrade,
        },
        Scenario {
            key: "custom-reveal",
            description: "Custom handlers run for transitions but not during initialisation",
            run: custom_reveal,
        },
        Scenario {
            key: "malformed-pair",
            description: "A header without content is skipped and reported",
            run: malformed_pair,
        },
        Scenario {
            key: "marker-flags",
            description: "Marker flags and JSON options produce the expected configuration",
            run: marker_flags,
        },
    ]
}

#[must_use]
pub fn find(key: &str) -> Option<Scenario> {
    catalog().into_iter().find(|scenario| scenario.key == key)
}

#[must_use]
pub fn list() -> Vec<(&'static str, &'static str)> {
    catalog()
        .iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

/// Run `scenario` `iterations` times, collecting failures.
#[must_use]
pub fn run_scenario(scenario: &Scenario, iterations: usize, verbose: bool) -> ScenarioResult {
    let iterations = iterations.max(1);
    let mut failures = Vec::new();
    let mut total = Duration::ZERO;
    for iteration in 0..iterations {
        let start = Instant::now();
        let outcome = scenario.run();
        total += start.elapsed();
        match outcome {
            Ok(()) if verbose => log::info!("{} iteration {iteration} passed", scenario.key),
            Ok(()) => {}
            Err(err) => failures.push(format!("iteration {iteration}: {err:#}")),
        }
    }
    let divisor = u32::try_from(iterations).unwrap_or(u32::MAX);
    ScenarioResult {
        scenario_name: scenario.key.to_string(),
        passed: failures.is_empty(),
        iterations_run: iterations,
        successful_iterations: iterations - failures.len(),
        average_duration: total / divisor,
        failures,
    }
}

fn accordion_exclusive() -> Result<()> {
    let (dom, container) = MemoryDom::with_pairs("payment", 4);
    let mut controller = Controller::new(dom, container, CollapseConfig::accordion());
    for index in [2, 0, 3, 3, 1] {
        controller.open(Some(index))?;
        ensure!(
            controller.open_indices().as_slice() == [index],
            "expected only {index} open, got {:?}",
            controller.open_indices()
        );
        controller.toggle(Some(index))?;
        ensure!(controller.open_indices().is_empty(), "toggle did not close {index}");
        controller.toggle(Some(index))?;
    }
    controller.open(None)?;
    ensure!(
        controller.open_indices().as_slice() == [3],
        "open-all should end on the last section"
    );
    Ok(())
}

fn double_toggle() -> Result<()> {
    let (dom, container) = MemoryDom::with_pairs("faq", 3);
    let mut controller = Controller::new(dom, container, CollapseConfig::default());
    let before = controller.states();
    let initial = controller.dom().events().len();

    controller.toggle(Some(1))?;
    controller.toggle(Some(1))?;
    ensure!(controller.states() == before, "state not restored");
    let names: Vec<&str> = controller.dom().events()[initial..]
        .iter()
        .map(|(_, event)| event.name())
        .collect();
    ensure!(names == ["opened", "closed"], "unexpected events {names:?}");
    Ok(())
}

fn open_close_all() -> Result<()> {
    let (dom, container) = MemoryDom::with_pairs("faq", 5);
    let mut controller = Controller::new(dom, container, CollapseConfig::default());
    controller.open(None)?;
    ensure!(controller.open_indices().len() == 5, "not every section opened");
    controller.toggle(None)?;
    ensure!(controller.open_indices().is_empty(), "toggle-all left sections open");
    controller.open(Some(4))?;
    controller.close(None)?;
    ensure!(controller.open_indices().is_empty(), "close-all left sections open");
    Ok(())
}

fn persistence_round_trip() -> Result<()> {
    let config = CollapseConfig::accordion().with_persist(true);
    let mut storage = MemoryStorage::new();

    let (dom, container) = MemoryDom::with_pairs("faq", 3);
    let mut controller = CollapseBuilder::new(dom, container, config.clone())
        .storage(&mut storage)
        .build();
    ensure!(controller.is_persistent(), "persistence not attached");
    controller.open(Some(2))?;
    drop(controller);

    let saved = storage.read("faq")?;
    ensure!(
        saved == [Some(false), Some(false), Some(true)],
        "unexpected saved states {saved:?}"
    );
    let json = storage.table().to_json()?;
    ensure!(json == r#"{"faq":[0,0,1]}"#, "unexpected document {json}");

    let (dom, container) = MemoryDom::with_pairs("faq", 3);
    let reloaded = CollapseBuilder::new(dom, container, config)
        .storage(&mut storage)
        .build();
    ensure!(
        reloaded.open_indices().as_slice() == [2],
        "restored {:?}",
        reloaded.open_indices()
    );
    Ok(())
}

fn out_of_range() -> Result<()> {
    let (dom, container) = MemoryDom::with_pairs("faq", 3);
    let mut controller = Controller::new(dom, container, CollapseConfig::accordion());
    controller.open(Some(1))?;
    let states = controller.states();
    let events = controller.dom().events().len();

    let err = controller
        .open(Some(999))
        .err()
        .context("index 999 was accepted")?;
    ensure!(
        err == CollapseError::IndexOutOfRange { index: 999, len: 3 },
        "unexpected error {err}"
    );
    ensure!(controller.close(Some(3)).is_err(), "index 3 was accepted");
    ensure!(controller.states() == states, "state changed");
    ensure!(controller.dom().events().len() == events, "events fired");
    Ok(())
}

fn nested_click() -> Result<()> {
    let dom: SharedDom = Rc::new(RefCell::new(MemoryDom::new()));
    let (outer, inner) = {
        let mut page = dom.borrow_mut();
        let body = page.body();
        let outer = page.append(body, "div");
        page.append_pairs(outer, 2);
        let outer_details = page.children(&outer)[1];
        let inner = page.append(outer_details, "div");
        page.append_pairs(inner, 2);
        (outer, inner)
    };
    let mut outer_controller = Controller::new(Rc::clone(&dom), outer, CollapseConfig::default());
    let mut inner_controller = Controller::new(Rc::clone(&dom), inner, CollapseConfig::default());

    let inner_summary = *inner_controller.section(1).context("inner section")?.summary();
    let link = dom.borrow().children(&inner_summary)[0];
    ensure!(inner_controller.handle_click(&link) == Some(1), "inner did not toggle");
    ensure!(outer_controller.handle_click(&link).is_none(), "outer reacted");
    ensure!(
        outer_controller.open_indices().is_empty(),
        "outer sections changed"
    );
    ensure!(inner_controller.is_open(1)?, "inner section closed");
    Ok(())
}

struct FullStorage;

impl CollapseStorage for FullStorage {
    fn read(&self, _container_id: &str) -> Result<Vec<Option<bool>>, StorageError> {
        Ok(Vec::new())
    }

    fn write(&mut self, _container_id: &str, _index: usize, _open: bool) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("quota exceeded".into()))
    }
}

fn storage_degrade() -> Result<()> {
    let (dom, container) = MemoryDom::with_pairs("faq", 2);
    let mut controller = CollapseBuilder::new(dom, container, CollapseConfig::default().with_persist(true))
        .storage(FullStorage)
        .build();
    ensure!(!controller.is_persistent(), "persistence survived a failed write");
    controller.toggle(Some(0))?;
    controller.toggle(Some(1))?;
    ensure!(
        controller.open_indices().as_slice() == [0, 1],
        "sections stopped working"
    );
    ensure!(
        controller.issues().len() == 1,
        "expected one issue, got {:?}",
        controller.issues()
    );
    Ok(())
}

fn custom_reveal() -> Result<()> {
    let (mut dom, container) = MemoryDom::with_pairs("payment", 3);
    let first = dom.children(&container)[0];
    dom.add_class(first, "open");

    let calls: Rc<RefCell<Vec<(SectionState, NodeId)>>> = Rc::default();
    let (on_open, on_close) = (Rc::clone(&calls), Rc::clone(&calls));
    let handler = RevealHandler::new()
        .on_open(move |details: &NodeId| on_open.borrow_mut().push((SectionState::Open, *details)))
        .on_close(move |details: &NodeId| {
            on_close.borrow_mut().push((SectionState::Closed, *details));
        });
    let mut controller = CollapseBuilder::new(dom, container, CollapseConfig::accordion())
        .reveal(handler)
        .build();
    ensure!(calls.borrow().is_empty(), "handlers ran during initialisation");

    controller.open(Some(2))?;
    let details: Vec<NodeId> = controller
        .sections()
        .iter()
        .map(|section| *section.details())
        .collect();
    let recorded = calls.borrow().clone();
    ensure!(
        recorded.contains(&(SectionState::Closed, details[0]))
            && recorded.last() == Some(&(SectionState::Open, details[2])),
        "unexpected handler calls {recorded:?}"
    );
    Ok(())
}

fn malformed_pair() -> Result<()> {
    let (mut dom, container) = MemoryDom::with_pairs("faq", 2);
    dom.append(container, "h3");
    let controller = Controller::new(dom, container, CollapseConfig::default());
    ensure!(controller.len() == 2, "expected two sections");
    ensure!(
        controller.issues() == [CollapseError::MalformedSection { position: 2 }],
        "unexpected issues {:?}",
        controller.issues()
    );
    Ok(())
}

fn marker_flags() -> Result<()> {
    let config = CollapseConfig::from_flags("accordion persist");
    ensure!(config.accordion && config.persist, "flags not applied");
    ensure!(CollapseConfig::from_flags("") == CollapseConfig::default(), "blank flags");

    let parsed = CollapseConfig::from_json(r#"{"query": "h4", "clickQuery": ".title"}"#)?;
    ensure!(parsed.query == PairQuery::Selector("h4".into()), "query not parsed");
    ensure!(
        parsed.trigger_selector() == "[data-collapse-summary] .title",
        "trigger {}",
        parsed.trigger_selector()
    );
    Ok(())
}
