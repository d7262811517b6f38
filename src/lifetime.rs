//! Entry lifetime policies.

/// Policy attached to every registered entry.
///
/// Both policies cache: the first `resolve` stores the produced instance and
/// later `resolve` calls return it. The policy only decides whether `create`
/// may bypass the cache.
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::{DiError, Lifetime, Registry, Resolver};
/// use std::rc::Rc;
///
/// struct Clock;
/// struct Request;
///
/// let registry = Registry::new();
/// registry.register_with::<Clock, _>(Lifetime::SingletonOnly, |_| Ok(Clock));
/// registry.register::<Request, _>(|_| Ok(Request));
///
/// // Shared: resolve caches, create builds a fresh instance
/// let a = registry.resolve::<Request>().unwrap();
/// let b = registry.create::<Request>().unwrap();
/// assert!(!Rc::ptr_eq(&a, &b));
///
/// // SingletonOnly: resolve works, create is refused
/// assert!(registry.resolve::<Clock>().is_ok());
/// assert!(matches!(registry.create::<Clock>(), Err(DiError::SingletonOnlyViolation(_))));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifetime {
    /// `resolve` caches, `create` always invokes the factory
    #[default]
    Shared,
    /// Only ever resolved; `create` fails with `SingletonOnlyViolation`
    SingletonOnly,
}

impl Lifetime {
    #[inline]
    pub fn is_singleton_only(self) -> bool {
        matches!(self, Lifetime::SingletonOnly)
    }
}

impl From<bool> for Lifetime {
    /// Maps a `singleton_only` flag onto a policy.
    fn from(singleton_only: bool) -> Self {
        if singleton_only {
            Lifetime::SingletonOnly
        } else {
            Lifetime::Shared
        }
    }
}
