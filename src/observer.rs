//! Diagnostic observers for registry events.
//!
//! Observers receive every registration, lookup and transaction boundary of
//! the registry they are attached to. The registry emits `tracing` events on
//! its own; observers are for callers that want the events as values
//! (metrics, test assertions, custom log formats).

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::error::DiError;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::registry::ResolveMode;

/// Observer trait for registry events.
///
/// Every method has an empty default, so implementors only override what
/// they care about. Calls are made synchronously from inside the operation
/// being observed; an observer must not call back into the registry.
///
/// # Examples
///
/// ```
/// use ferrous_locator::{Key, Registry, RegistryObserver, ResolveMode, Resolver};
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Trail(RefCell<Vec<String>>);
///
/// impl RegistryObserver for Trail {
///     fn resolved(&self, key: &Key, mode: ResolveMode, _duration: Duration) {
///         self.0.borrow_mut().push(format!("{:?} {}", mode, key));
///     }
/// }
///
/// let trail = Rc::new(Trail::default());
/// let mut registry = Registry::new();
/// registry.add_observer(trail.clone());
/// registry.register_keyed("S", "", Default::default(), |_| Ok("Test"));
/// registry.resolve_keyed::<&'static str>("S", "").unwrap();
///
/// assert_eq!(trail.0.borrow().as_slice(), ["Resolve S#"]);
/// ```
pub trait RegistryObserver {
    /// An entry was stored, in the overlay when a transaction is open.
    fn registered(&self, _key: &Key, _lifetime: Lifetime, _in_overlay: bool) {}

    /// A `resolve` or `create` call is starting.
    fn resolving(&self, _key: &Key, _mode: ResolveMode) {}

    /// A `resolve` or `create` call produced an instance.
    fn resolved(&self, _key: &Key, _mode: ResolveMode, _duration: Duration) {}

    /// A `resolve` or `create` call failed.
    fn resolution_failed(&self, _key: &Key, _mode: ResolveMode, _error: &DiError) {}

    fn transaction_committed(&self, _merged: usize) {}

    fn transaction_rolled_back(&self, _discarded: usize) {}
}

/// Collection of observers attached to one registry.
#[derive(Default)]
pub(crate) struct Observers {
    observers: Vec<Rc<dyn RegistryObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Rc<dyn RegistryObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn registered(&self, key: &Key, lifetime: Lifetime, in_overlay: bool) {
        for observer in &self.observers {
            observer.registered(key, lifetime, in_overlay);
        }
    }

    pub(crate) fn resolving(&self, key: &Key, mode: ResolveMode) {
        for observer in &self.observers {
            observer.resolving(key, mode);
        }
    }

    pub(crate) fn resolved(&self, key: &Key, mode: ResolveMode, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(key, mode, duration);
        }
    }

    pub(crate) fn resolution_failed(&self, key: &Key, mode: ResolveMode, error: &DiError) {
        for observer in &self.observers {
            observer.resolution_failed(key, mode, error);
        }
    }

    pub(crate) fn transaction_committed(&self, merged: usize) {
        for observer in &self.observers {
            observer.transaction_committed(merged);
        }
    }

    pub(crate) fn transaction_rolled_back(&self, discarded: usize) {
        for observer in &self.observers {
            observer.transaction_rolled_back(discarded);
        }
    }
}

/// Built-in observer that forwards events to `tracing` at info level.
///
/// ```
/// use ferrous_locator::{LoggingObserver, Registry};
/// use std::rc::Rc;
///
/// let mut registry = Registry::new();
/// registry.add_observer(Rc::new(LoggingObserver::with_prefix("[app-di]")));
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self {
            prefix: "[ferrous-locator]".to_string(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryObserver for LoggingObserver {
    fn registered(&self, key: &Key, lifetime: Lifetime, in_overlay: bool) {
        tracing::info!(%key, ?lifetime, in_overlay, "{} Registered", self.prefix);
    }

    fn resolving(&self, key: &Key, mode: ResolveMode) {
        tracing::info!(%key, ?mode, "{} Resolving", self.prefix);
    }

    fn resolved(&self, key: &Key, mode: ResolveMode, duration: Duration) {
        tracing::info!(%key, ?mode, ?duration, "{} Resolved", self.prefix);
    }

    fn resolution_failed(&self, key: &Key, mode: ResolveMode, error: &DiError) {
        tracing::warn!(%key, ?mode, %error, "{} Resolution failed", self.prefix);
    }

    fn transaction_committed(&self, merged: usize) {
        tracing::info!(merged, "{} Transaction committed", self.prefix);
    }

    fn transaction_rolled_back(&self, discarded: usize) {
        tracing::info!(discarded, "{} Transaction rolled back", self.prefix);
    }
}

/// Counters over registry events.
///
/// ```
/// use ferrous_locator::{MetricsObserver, Registry, Resolver};
/// use std::rc::Rc;
///
/// let metrics = Rc::new(MetricsObserver::new());
/// let mut registry = Registry::new();
/// registry.add_observer(metrics.clone());
///
/// registry.register::<u32, _>(|_| Ok(7));
/// registry.resolve::<u32>().unwrap();
/// registry.create::<u32>().unwrap();
/// let _ = registry.resolve::<u64>();
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.registrations, 1);
/// assert_eq!(snapshot.resolves, 1);
/// assert_eq!(snapshot.creates, 1);
/// assert_eq!(snapshot.failures, 1);
/// ```
#[derive(Default)]
pub struct MetricsObserver {
    registrations: Cell<u64>,
    resolves: Cell<u64>,
    creates: Cell<u64>,
    failures: Cell<u64>,
    commits: Cell<u64>,
    rollbacks: Cell<u64>,
}

/// Point-in-time copy of a [`MetricsObserver`]'s counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub registrations: u64,
    /// Successful `resolve` calls, nested ones included
    pub resolves: u64,
    /// Successful `create` calls, nested ones included
    pub creates: u64,
    pub failures: u64,
    pub commits: u64,
    pub rollbacks: u64,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            registrations: self.registrations.get(),
            resolves: self.resolves.get(),
            creates: self.creates.get(),
            failures: self.failures.get(),
            commits: self.commits.get(),
            rollbacks: self.rollbacks.get(),
        }
    }
}

fn bump(counter: &Cell<u64>) {
    counter.set(counter.get() + 1);
}

impl RegistryObserver for MetricsObserver {
    fn registered(&self, _key: &Key, _lifetime: Lifetime, _in_overlay: bool) {
        bump(&self.registrations);
    }

    fn resolved(&self, _key: &Key, mode: ResolveMode, _duration: Duration) {
        match mode {
            ResolveMode::Resolve => bump(&self.resolves),
            ResolveMode::Create => bump(&self.creates),
        }
    }

    fn resolution_failed(&self, _key: &Key, _mode: ResolveMode, _error: &DiError) {
        bump(&self.failures);
    }

    fn transaction_committed(&self, _merged: usize) {
        bump(&self.commits);
    }

    fn transaction_rolled_back(&self, _discarded: usize) {
        bump(&self.rollbacks);
    }
}
