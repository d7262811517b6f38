//! The registry: permanent entries, the override overlay and the resolution
//! protocol layered on top of them.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

use crate::config::RegistryConfig;
use crate::error::{DiError, DiResult};
use crate::internal::ResolutionStack;
use crate::key::{Key, TypeKey};
use crate::lifetime::Lifetime;
use crate::observer::{Observers, RegistryObserver};
use crate::registration::{AnyRc, Entry, EntrySet, Factory};
use crate::traits::{downcast, ResolverCore};

mod transaction;

use transaction::OverrideScope;

/// Which operation a lookup serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Return the cached instance, building it on first use
    Resolve,
    /// Build a fresh instance and make it the cached one
    Create,
}

/// Runtime dependency registry.
///
/// Holds factories keyed by [`Key`] and hands out instances on demand.
/// Factories receive the registry itself, so dependencies are wired by
/// resolving them from inside a factory; there is no separate graph.
///
/// Registrations normally land in the permanent set. While a transaction is
/// open they land in the overlay instead, which shadows the permanent set
/// for lookups until the transaction is committed (merged) or rolled back
/// (discarded). The `*_with` resolution methods use exactly this to apply
/// per-call overrides.
///
/// # Thread Safety
///
/// The registry mutates its state through `&self` so factories can call back
/// into it. It is neither `Send` nor `Sync`; share it across threads only by
/// wrapping every access in external synchronization.
///
/// # Examples
///
/// ```
/// use ferrous_locator::{Registry, Resolver};
/// use std::rc::Rc;
///
/// struct Config { port: u16 }
/// struct Server { config: Rc<Config> }
///
/// let registry = Registry::new();
/// registry.register::<Config, _>(|_| Ok(Config { port: 8080 }));
/// registry.register::<Server, _>(|r| Ok(Server { config: r.resolve::<Config>()? }));
///
/// let server = registry.resolve::<Server>().unwrap();
/// assert_eq!(server.config.port, 8080);
///
/// // Override the config for one call only
/// let custom = registry
///     .create_with::<Server>(|r| r.register::<Config, _>(|_| Ok(Config { port: 9090 })))
///     .unwrap();
/// assert_eq!(custom.config.port, 9090);
/// assert_eq!(registry.resolve::<Config>().unwrap().port, 8080);
/// assert_eq!(registry.overlay_len(), 0);
/// ```
pub struct Registry {
    permanent: RefCell<EntrySet>,
    overlay: RefCell<EntrySet>,
    in_transaction: Cell<bool>,
    stack: ResolutionStack,
    observers: Observers,
    config: RegistryConfig,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            permanent: RefCell::new(EntrySet::default()),
            overlay: RefCell::new(EntrySet::default()),
            in_transaction: Cell::new(false),
            stack: ResolutionStack::new(config.max_depth, config.detect_cycles),
            observers: Observers::default(),
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Attaches an observer that sees every later event of this registry.
    pub fn add_observer(&mut self, observer: Rc<dyn RegistryObserver>) {
        self.observers.add(observer);
    }

    #[inline]
    pub(crate) fn stack(&self) -> &ResolutionStack {
        &self.stack
    }

    // ----- Registration -----

    /// Registers a factory under an explicit type key and name.
    ///
    /// The factory's output is stored type-erased; resolve it back with the
    /// same `T`, or the lookup fails with `DiError::TypeMismatch`.
    ///
    /// ```
    /// use ferrous_locator::{DiError, Lifetime, Registry};
    ///
    /// let registry = Registry::new();
    /// registry.register_keyed("S", "", Lifetime::Shared, |_| Ok(String::from("Test")));
    ///
    /// assert_eq!(*registry.resolve_keyed::<String>("S", "").unwrap(), "Test");
    /// assert!(matches!(registry.resolve_keyed::<String>("F", ""), Err(DiError::NotRegistered(_))));
    /// assert!(matches!(registry.resolve_keyed::<u8>("S", ""), Err(DiError::TypeMismatch { .. })));
    /// ```
    pub fn register_keyed<T, F>(
        &self,
        type_key: impl Into<TypeKey>,
        name: impl Into<Cow<'static, str>>,
        lifetime: Lifetime,
        factory: F,
    ) where
        T: 'static,
        F: Fn(&Registry) -> DiResult<T> + 'static,
    {
        self.insert(Key::new(type_key, name), lifetime, erase(factory));
    }

    /// Registers an unnamed, shared factory for `T`.
    pub fn register<T, F>(&self, factory: F)
    where
        T: 'static,
        F: Fn(&Registry) -> DiResult<T> + 'static,
    {
        self.insert(Key::of::<T>(), Lifetime::Shared, erase(factory));
    }

    /// Registers a named, shared factory for `T`.
    pub fn register_named<T, F>(&self, name: impl Into<Cow<'static, str>>, factory: F)
    where
        T: 'static,
        F: Fn(&Registry) -> DiResult<T> + 'static,
    {
        self.insert(Key::named::<T>(name), Lifetime::Shared, erase(factory));
    }

    pub fn register_with<T, F>(&self, lifetime: Lifetime, factory: F)
    where
        T: 'static,
        F: Fn(&Registry) -> DiResult<T> + 'static,
    {
        self.insert(Key::of::<T>(), lifetime, erase(factory));
    }

    pub fn register_named_with<T, F>(
        &self,
        name: impl Into<Cow<'static, str>>,
        lifetime: Lifetime,
        factory: F,
    ) where
        T: 'static,
        F: Fn(&Registry) -> DiResult<T> + 'static,
    {
        self.insert(Key::named::<T>(name), lifetime, erase(factory));
    }

    /// Registers a factory for a trait object (or any unsized type).
    ///
    /// ```
    /// use ferrous_locator::{Registry, Resolver};
    /// use std::rc::Rc;
    ///
    /// trait Greeter {
    ///     fn greet(&self) -> String;
    /// }
    ///
    /// struct English;
    /// impl Greeter for English {
    ///     fn greet(&self) -> String { "hello".into() }
    /// }
    ///
    /// let registry = Registry::new();
    /// registry.register_trait::<dyn Greeter, _>(|_| Ok(Rc::new(English) as Rc<dyn Greeter>));
    ///
    /// let greeter = registry.resolve_trait::<dyn Greeter>().unwrap();
    /// assert_eq!(greeter.greet(), "hello");
    /// ```
    pub fn register_trait<T, F>(&self, factory: F)
    where
        T: ?Sized + 'static,
        F: Fn(&Registry) -> DiResult<Rc<T>> + 'static,
    {
        self.insert(Key::of::<T>(), Lifetime::Shared, erase(factory));
    }

    pub fn register_trait_with<T, F>(
        &self,
        name: impl Into<Cow<'static, str>>,
        lifetime: Lifetime,
        factory: F,
    ) where
        T: ?Sized + 'static,
        F: Fn(&Registry) -> DiResult<Rc<T>> + 'static,
    {
        self.insert(Key::named::<T>(name), lifetime, erase(factory));
    }

    fn insert(&self, key: Key, lifetime: Lifetime, factory: Factory) {
        let in_overlay = self.in_transaction.get();
        tracing::debug!(%key, ?lifetime, in_overlay, "registering entry");
        self.observers.registered(&key, lifetime, in_overlay);

        let entry = Entry::new(key, lifetime, factory);
        let target = if in_overlay { &self.overlay } else { &self.permanent };
        target.borrow_mut().insert(entry);
    }

    // ----- Transactions -----

    /// Routes subsequent registrations into the overlay. Idempotent: calling
    /// it again while open keeps the same transaction.
    pub fn begin_transaction(&self) {
        if !self.in_transaction.replace(true) {
            tracing::debug!("transaction opened");
        }
    }

    /// Closes the transaction and merges the overlay into the permanent set.
    /// Overlay entries replace permanent entries with the same key. Does
    /// nothing, and notifies no observer, when no transaction is open.
    pub fn commit_transaction(&self) {
        if !self.in_transaction.replace(false) {
            return;
        }
        let overlay = std::mem::take(&mut *self.overlay.borrow_mut());
        let merged = overlay.len();
        self.permanent.borrow_mut().merge(overlay);

        tracing::debug!(merged, "transaction committed");
        self.observers.transaction_committed(merged);
    }

    /// Closes the transaction and discards the overlay. A no-op when no
    /// transaction is open.
    pub fn rollback_transaction(&self) {
        if !self.in_transaction.replace(false) {
            return;
        }
        let discarded = std::mem::take(&mut *self.overlay.borrow_mut());
        let count = discarded.len();
        drop(discarded);

        tracing::debug!(discarded = count, "transaction rolled back");
        self.observers.transaction_rolled_back(count);
    }

    pub fn is_in_transaction(&self) -> bool {
        self.in_transaction.get()
    }

    pub(crate) fn snapshot_overlay(&self) -> EntrySet {
        self.overlay.borrow().clone()
    }

    pub(crate) fn restore_overlay(&self, saved: EntrySet) {
        let replaced = std::mem::replace(&mut *self.overlay.borrow_mut(), saved);
        tracing::trace!(discarded = replaced.len(), "overlay restored");
    }

    // ----- Lookup and resolution -----

    /// Overlay first, then the permanent set.
    pub(crate) fn find_entry(&self, key: &Key) -> DiResult<Rc<Entry>> {
        let overlay_hit = self.overlay.borrow().get(key);
        if let Some(entry) = overlay_hit {
            tracing::trace!(%key, lifetime = ?entry.lifetime(), "overlay hit");
            return Ok(entry);
        }

        let permanent_hit = self.permanent.borrow().get(key);
        match permanent_hit {
            Some(entry) => {
                tracing::trace!(%key, lifetime = ?entry.lifetime(), "permanent hit");
                Ok(entry)
            }
            None => Err(DiError::NotRegistered(key.clone())),
        }
    }

    /// Runs one `resolve` or `create`, with the overrides (if any) applied
    /// for the whole call and undone before returning.
    pub(crate) fn locate(
        &self,
        key: &Key,
        mode: ResolveMode,
        overrides: Option<&dyn Fn(&Registry)>,
    ) -> DiResult<AnyRc> {
        let started = self.observers.has_observers().then(Instant::now);
        if started.is_some() {
            self.observers.resolving(key, mode);
        }

        let result = match overrides {
            Some(overrides) => {
                let _scope = OverrideScope::open(self);
                overrides(self);
                self.instantiate(key, mode)
            }
            None => self.instantiate(key, mode),
        };

        if let Some(started) = started {
            match &result {
                Ok(_) => self.observers.resolved(key, mode, started.elapsed()),
                Err(error) => self.observers.resolution_failed(key, mode, error),
            }
        }
        result
    }

    fn instantiate(&self, key: &Key, mode: ResolveMode) -> DiResult<AnyRc> {
        let entry = self.find_entry(key)?;
        match mode {
            ResolveMode::Resolve => entry.resolve(self),
            ResolveMode::Create => entry.create(self),
        }
    }

    /// Resolves the instance bound at an explicit type key and name.
    pub fn resolve_keyed<T: 'static>(
        &self,
        type_key: impl Into<TypeKey>,
        name: impl Into<Cow<'static, str>>,
    ) -> DiResult<Rc<T>> {
        let key = Key::new(type_key, name);
        downcast(self.locate(&key, ResolveMode::Resolve, None)?, &key)
    }

    /// Creates a fresh instance bound at an explicit type key and name.
    pub fn create_keyed<T: 'static>(
        &self,
        type_key: impl Into<TypeKey>,
        name: impl Into<Cow<'static, str>>,
    ) -> DiResult<Rc<T>> {
        let key = Key::new(type_key, name);
        downcast(self.locate(&key, ResolveMode::Create, None)?, &key)
    }

    pub fn resolve_keyed_with<T: 'static>(
        &self,
        type_key: impl Into<TypeKey>,
        name: impl Into<Cow<'static, str>>,
        overrides: impl Fn(&Registry),
    ) -> DiResult<Rc<T>> {
        let key = Key::new(type_key, name);
        downcast(self.locate(&key, ResolveMode::Resolve, Some(&overrides))?, &key)
    }

    pub fn create_keyed_with<T: 'static>(
        &self,
        type_key: impl Into<TypeKey>,
        name: impl Into<Cow<'static, str>>,
        overrides: impl Fn(&Registry),
    ) -> DiResult<Rc<T>> {
        let key = Key::new(type_key, name);
        downcast(self.locate(&key, ResolveMode::Create, Some(&overrides))?, &key)
    }

    // ----- Introspection -----

    /// Number of entries in the permanent set.
    pub fn len(&self) -> usize {
        self.permanent.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.permanent.borrow().is_empty()
    }

    /// Number of entries in the overlay; zero whenever no transaction is open.
    pub fn overlay_len(&self) -> usize {
        self.overlay.borrow().len()
    }

    /// True if a lookup for `key` would currently find an entry.
    pub fn contains(&self, key: &Key) -> bool {
        self.overlay.borrow().contains(key) || self.permanent.borrow().contains(key)
    }

    /// Keys of the permanent set, sorted.
    pub fn keys(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = self.permanent.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl ResolverCore for Registry {
    fn resolve_any(&self, key: &Key, overrides: Option<&dyn Fn(&Registry)>) -> DiResult<AnyRc> {
        self.locate(key, ResolveMode::Resolve, overrides)
    }

    fn create_any(&self, key: &Key, overrides: Option<&dyn Fn(&Registry)>) -> DiResult<AnyRc> {
        self.locate(key, ResolveMode::Create, overrides)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.len())
            .field("overlay", &self.overlay_len())
            .field("in_transaction", &self.is_in_transaction())
            .field("config", &self.config)
            .finish()
    }
}

fn erase<T, F>(factory: F) -> Factory
where
    T: 'static,
    F: Fn(&Registry) -> DiResult<T> + 'static,
{
    Box::new(move |registry: &Registry| factory(registry).map(|instance| Rc::new(instance) as AnyRc))
}
