//! Entry storage: one factory, its policy and its cached instance.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::registry::Registry;

// Type-erased instance handle
pub(crate) type AnyRc = Rc<dyn Any>;

pub(crate) type Factory = Box<dyn Fn(&Registry) -> DiResult<AnyRc>>;

#[cfg(feature = "ahash")]
type EntryHasher = ahash::RandomState;
#[cfg(not(feature = "ahash"))]
type EntryHasher = std::collections::hash_map::RandomState;

/// A registered factory plus its lifetime policy and cache slot.
pub(crate) struct Entry {
    key: Key,
    lifetime: Lifetime,
    factory: Factory,
    instance: RefCell<Option<AnyRc>>,
}

impl Entry {
    pub(crate) fn new(key: Key, lifetime: Lifetime, factory: Factory) -> Self {
        Self {
            key,
            lifetime,
            factory,
            instance: RefCell::new(None),
        }
    }

    pub(crate) fn key(&self) -> &Key {
        &self.key
    }

    pub(crate) fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Invokes the factory regardless of the cache. The new instance replaces
    /// whatever was cached, so the last `create` wins for later `resolve`s.
    pub(crate) fn create(self: &Rc<Self>, registry: &Registry) -> DiResult<AnyRc> {
        if self.lifetime.is_singleton_only() {
            return Err(DiError::SingletonOnlyViolation(self.key.clone()));
        }
        self.instantiate(registry)
    }

    /// Returns the cached instance, invoking the factory on first use.
    pub(crate) fn resolve(self: &Rc<Self>, registry: &Registry) -> DiResult<AnyRc> {
        let cached = self.instance.borrow().clone();
        match cached {
            Some(instance) => Ok(instance),
            None => self.instantiate(registry),
        }
    }

    fn instantiate(self: &Rc<Self>, registry: &Registry) -> DiResult<AnyRc> {
        // The factory may re-enter the registry, so no borrow of the cache
        // slot is held while it runs.
        let _frame = registry.stack().enter(self)?;
        tracing::trace!(key = %self.key, depth = registry.stack().depth(), "invoking factory");
        let instance = (self.factory)(registry)?;
        *self.instance.borrow_mut() = Some(instance.clone());
        Ok(instance)
    }

    #[cfg(test)]
    pub(crate) fn is_cached(&self) -> bool {
        self.instance.borrow().is_some()
    }
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("key", &self.key)
            .field("lifetime", &self.lifetime)
            .field("cached", &self.instance.borrow().is_some())
            .finish()
    }
}

/// Composite key to entry mapping. Entries are shared out as `Rc` so a
/// located entry stays alive even if its set is cleared mid-resolution.
#[derive(Default, Clone)]
pub(crate) struct EntrySet {
    entries: HashMap<Key, Rc<Entry>, EntryHasher>,
}

impl EntrySet {
    /// Inserts, replacing any entry at the same key.
    pub(crate) fn insert(&mut self, entry: Entry) {
        self.entries.insert(entry.key().clone(), Rc::new(entry));
    }

    #[inline]
    pub(crate) fn get(&self, key: &Key) -> Option<Rc<Entry>> {
        self.entries.get(key).cloned()
    }

    #[inline]
    pub(crate) fn contains(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.keys()
    }

    /// Moves every entry of `other` into `self`; `other`'s entries win.
    pub(crate) fn merge(&mut self, other: EntrySet) {
        self.entries.extend(other.entries);
    }
}
