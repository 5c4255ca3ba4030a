use collapse_core::{
    CollapseBuilder, CollapseConfig, CollapseDom, CollapseError, CollapseStorage, MemoryDom,
    MemoryStorage, StorageError,
};

/// Storage whose writes always fail, optionally failing reads too.
struct BrokenStorage {
    fail_reads: bool,
}

impl CollapseStorage for BrokenStorage {
    fn read(&self, _container_id: &str) -> Result<Vec<Option<bool>>, StorageError> {
        if self.fail_reads {
            Err(StorageError::Unavailable("private mode".into()))
        } else {
            Ok(vec![Some(true)])
        }
    }

    fn write(&mut self, _container_id: &str, _index: usize, _open: bool) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("quota exceeded".into()))
    }
}

fn persistent_accordion() -> CollapseConfig {
    CollapseConfig::accordion().with_persist(true)
}

#[test]
fn reopening_restores_saved_sections() {
    let mut storage = MemoryStorage::new();

    let (dom, container) = MemoryDom::with_pairs("faq", 3);
    let mut controller = CollapseBuilder::new(dom, container, persistent_accordion())
        .storage(&mut storage)
        .build();
    assert!(controller.is_persistent());
    controller.open(Some(2)).unwrap();
    controller.open(Some(1)).unwrap();
    drop(controller);

    assert_eq!(
        storage.read("faq").unwrap(),
        vec![Some(false), Some(true), Some(false)]
    );

    let (dom, container) = MemoryDom::with_pairs("faq", 3);
    let reloaded = CollapseBuilder::new(dom, container, persistent_accordion())
        .storage(&mut storage)
        .build();
    assert_eq!(reloaded.open_indices().as_slice(), &[1]);
    assert!(reloaded.issues().is_empty());
}

#[test]
fn saved_closed_state_overrides_open_marker() {
    let mut storage = MemoryStorage::new();
    storage.write("faq", 0, false).unwrap();

    let (mut dom, container) = MemoryDom::with_pairs("faq", 2);
    let header = dom.children(&container)[0];
    dom.add_class(header, "open");
    let second = dom.children(&container)[2];
    dom.add_class(second, "open");

    let controller = CollapseBuilder::new(dom, container, CollapseConfig::default().with_persist(true))
        .storage(storage)
        .build();
    assert_eq!(controller.open_indices().as_slice(), &[1]);
}

#[test]
fn initialisation_writes_every_resolved_state() {
    let (dom, container) = MemoryDom::with_pairs("faq", 3);
    let controller = CollapseBuilder::new(dom, container, persistent_accordion())
        .storage(MemoryStorage::new())
        .build();
    let (_, storage) = controller.into_parts();
    let storage = storage.expect("persistence stays active");
    assert_eq!(
        storage.table().states("faq"),
        vec![Some(false), Some(false), Some(false)]
    );
}

#[test]
fn failed_writes_disable_persistence_once() {
    let (dom, container) = MemoryDom::with_pairs("faq", 3);
    let mut controller = CollapseBuilder::new(dom, container, persistent_accordion())
        .storage(BrokenStorage { fail_reads: false })
        .build();

    // The saved state still applied before the first write failed.
    assert_eq!(controller.open_indices().as_slice(), &[0]);
    assert!(!controller.is_persistent());
    assert_eq!(controller.issues().len(), 1);
    assert!(matches!(
        &controller.issues()[0],
        CollapseError::StorageUnavailable { container, reason }
            if container == "faq" && reason.contains("quota exceeded")
    ));

    controller.open(Some(2)).unwrap();
    assert_eq!(controller.open_indices().as_slice(), &[2]);
    assert_eq!(controller.issues().len(), 1);
    let (_, storage) = controller.into_parts();
    assert!(storage.is_none());
}

#[test]
fn unreadable_storage_degrades_to_plain_sections() {
    let (dom, container) = MemoryDom::with_pairs("faq", 2);
    let mut controller = CollapseBuilder::new(dom, container, persistent_accordion())
        .storage(BrokenStorage { fail_reads: true })
        .build();
    assert_eq!(controller.len(), 2);
    assert!(!controller.is_persistent());
    assert_eq!(controller.issues().len(), 1);
    controller.toggle(Some(0)).unwrap();
    assert!(controller.is_open(0).unwrap());
}

#[test]
fn persistence_needs_a_container_id_and_a_backend() {
    let mut dom = MemoryDom::new();
    let container = dom.append(dom.body(), "div");
    dom.append_pairs(container, 2);
    let anonymous = CollapseBuilder::new(dom, container, persistent_accordion())
        .storage(MemoryStorage::new())
        .build();
    assert!(!anonymous.is_persistent());
    assert_eq!(
        anonymous.issues(),
        &[CollapseError::StorageUnavailable {
            container: String::new(),
            reason: "container has no id".into(),
        }]
    );

    let (dom, container) = MemoryDom::with_pairs("faq", 2);
    let without_backend = CollapseBuilder::new(dom, container, persistent_accordion()).build();
    assert_eq!(without_backend.len(), 2);
    assert!(matches!(
        &without_backend.issues()[..],
        [CollapseError::StorageUnavailable { container, .. }] if container == "faq"
    ));
}

#[test]
fn persistence_is_ignored_unless_requested() {
    let mut storage = MemoryStorage::new();
    storage.write("faq", 0, true).unwrap();
    let (dom, container) = MemoryDom::with_pairs("faq", 2);
    let controller = CollapseBuilder::new(dom, container, CollapseConfig::accordion())
        .storage(&mut storage)
        .build();
    assert!(controller.open_indices().is_empty());
    assert!(!controller.is_persistent());
    drop(controller);
    assert_eq!(storage.read("faq").unwrap(), vec![Some(true)]);
}
