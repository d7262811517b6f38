use ferrous_locator::{
    DiError, Key, Lifetime, LoggingObserver, MetricsObserver, Registry, RegistryObserver, ResolveMode, Resolver,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

#[derive(Default)]
struct EventLog {
    events: RefCell<Vec<String>>,
}

impl EventLog {
    fn push(&self, event: String) {
        self.events.borrow_mut().push(event);
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

impl RegistryObserver for EventLog {
    fn registered(&self, key: &Key, _lifetime: Lifetime, in_overlay: bool) {
        self.push(format!("register {} overlay={}", key, in_overlay));
    }

    fn resolving(&self, key: &Key, mode: ResolveMode) {
        self.push(format!("{:?} {}", mode, key));
    }

    fn resolved(&self, key: &Key, mode: ResolveMode, _duration: Duration) {
        self.push(format!("{:?} {} ok", mode, key));
    }

    fn resolution_failed(&self, key: &Key, mode: ResolveMode, error: &DiError) {
        self.push(format!("{:?} {} failed: {}", mode, key, error));
    }

    fn transaction_committed(&self, merged: usize) {
        self.push(format!("commit {}", merged));
    }

    fn transaction_rolled_back(&self, discarded: usize) {
        self.push(format!("rollback {}", discarded));
    }
}

#[test]
fn test_override_call_event_sequence() {
    let log = Rc::new(EventLog::default());
    let mut registry = Registry::new();
    registry.add_observer(log.clone());

    registry.register_keyed("Outer", "", Lifetime::Shared, |r| {
        r.resolve_keyed::<u8>("Inner", "").map(|inner| *inner)
    });
    assert_eq!(log.take(), vec!["register Outer# overlay=false"]);

    registry
        .create_keyed_with::<u8>("Outer", "", |r| {
            r.register_keyed("Inner", "", Lifetime::Shared, |_| Ok(5u8))
        })
        .unwrap();

    assert_eq!(
        log.take(),
        vec![
            "Create Outer#",
            "register Inner# overlay=true",
            "Resolve Inner#",
            "Resolve Inner# ok",
            "rollback 1",
            "Create Outer# ok",
        ]
    );
}

#[test]
fn test_failures_are_reported_at_every_level() {
    let log = Rc::new(EventLog::default());
    let mut registry = Registry::new();
    registry.add_observer(log.clone());

    registry.register_keyed("Outer", "", Lifetime::Shared, |r| {
        r.resolve_keyed::<u8>("Missing", "").map(|inner| *inner)
    });
    log.take();

    assert!(registry.resolve_keyed::<u8>("Outer", "").is_err());
    assert_eq!(
        log.take(),
        vec![
            "Resolve Outer#",
            "Resolve Missing#",
            "Resolve Missing# failed: Missing# is not registered",
            "Resolve Outer# failed: Missing# is not registered",
        ]
    );
}

#[test]
fn test_explicit_transaction_events() {
    let log = Rc::new(EventLog::default());
    let mut registry = Registry::new();
    registry.add_observer(log.clone());

    registry.begin_transaction();
    registry.register::<u8, _>(|_| Ok(1));
    registry.register::<u16, _>(|_| Ok(2));
    registry.commit_transaction();

    let events = log.take();
    assert_eq!(events.len(), 3);
    assert_eq!(events[2], "commit 2");
}

#[test]
fn test_metrics_observer_counts() {
    let metrics = Rc::new(MetricsObserver::new());
    let mut registry = Registry::new();
    registry.add_observer(metrics.clone());
    registry.add_observer(Rc::new(LoggingObserver::new()));

    registry.register::<Vec<u8>, _>(|_| Ok(vec![1]));
    registry.register::<String, _>(|r| Ok(format!("{:?}", r.resolve::<Vec<u8>>()?)));

    registry.create::<String>().unwrap();
    registry.create_with::<String>(|r| r.register::<Vec<u8>, _>(|_| Ok(vec![2]))).unwrap();
    let _ = registry.resolve::<u64>();

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.registrations, 3);
    assert_eq!(snapshot.creates, 2);
    assert_eq!(snapshot.resolves, 2);
    assert_eq!(snapshot.failures, 1);
    assert_eq!(snapshot.rollbacks, 1);
    assert_eq!(snapshot.commits, 0);
}

#[test]
fn test_closing_without_transaction_notifies_nothing() {
    let log = Rc::new(EventLog::default());
    let metrics = Rc::new(MetricsObserver::new());
    let mut registry = Registry::new();
    registry.add_observer(log.clone());
    registry.add_observer(metrics.clone());

    registry.commit_transaction();
    registry.rollback_transaction();
    assert!(log.take().is_empty());

    registry.begin_transaction();
    registry.rollback_transaction();
    registry.rollback_transaction();
    assert_eq!(log.take(), vec!["rollback 0"]);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.commits, 0);
    assert_eq!(snapshot.rollbacks, 1);
}
