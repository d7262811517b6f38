//! Resolver traits for instance resolution.

use std::any::Any;
use std::borrow::Cow;
use std::rc::Rc;

use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::registry::Registry;

/// Core resolver trait for object-safe resolution.
///
/// This is the read-only face of a registry: it can resolve and create, but
/// not register. Hosts can hand out `&dyn ResolverCore` to code that should
/// consume bindings without changing them; the typed methods of
/// [`Resolver`] are available on it too.
///
/// ```
/// use ferrous_locator::{Registry, Resolver, ResolverCore};
///
/// let registry = Registry::new();
/// registry.register::<u32, _>(|_| Ok(10));
///
/// let view: &dyn ResolverCore = &registry;
/// assert_eq!(*view.resolve::<u32>().unwrap(), 10);
/// ```
pub trait ResolverCore {
    /// Returns the cached instance at `key`, building it on first use.
    ///
    /// When `overrides` is given it runs first, inside a transaction; its
    /// registrations shadow the permanent bindings for this call only.
    fn resolve_any(&self, key: &Key, overrides: Option<&dyn Fn(&Registry)>) -> DiResult<Rc<dyn Any>>;

    /// Builds a fresh instance at `key`, replacing the cached one.
    ///
    /// Fails with `SingletonOnlyViolation` for singleton-only bindings.
    fn create_any(&self, key: &Key, overrides: Option<&dyn Fn(&Registry)>) -> DiResult<Rc<dyn Any>>;
}

/// High-level resolver interface with generic, type-keyed methods.
///
/// Keys are derived with [`Key::of`], so `resolve::<T>()` finds what
/// `register::<T, _>()` stored. Every method has a `_named` variant for
/// named bindings and a `_with` variant that applies per-call overrides.
///
/// # Examples
///
/// ```
/// use ferrous_locator::{Registry, Resolver};
/// use std::rc::Rc;
///
/// struct Value<T>(Rc<T>);
///
/// let registry = Registry::new();
/// registry.register::<Value<String>, _>(|r| Ok(Value(r.resolve::<String>()?)));
///
/// // No String is bound permanently; supply one for this call
/// let value = registry
///     .resolve_with::<Value<String>>(|r| r.register::<String, _>(|_| Ok("a".to_string())))
///     .unwrap();
/// assert_eq!(*value.0, "a");
///
/// // The override is gone, but Value<String> stays cached
/// assert!(registry.resolve::<String>().is_err());
/// assert!(Rc::ptr_eq(&value, &registry.resolve::<Value<String>>().unwrap()));
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves the unnamed binding for `T`.
    ///
    /// Repeated calls return the same instance until a `create` for the same
    /// key replaces it.
    fn resolve<T: 'static>(&self) -> DiResult<Rc<T>> {
        let key = Key::of::<T>();
        downcast(self.resolve_any(&key, None)?, &key)
    }

    fn resolve_named<T: 'static>(&self, name: impl Into<Cow<'static, str>>) -> DiResult<Rc<T>> {
        let key = Key::named::<T>(name);
        downcast(self.resolve_any(&key, None)?, &key)
    }

    /// Resolves `T` with `overrides` registered for the duration of the call.
    fn resolve_with<T: 'static>(&self, overrides: impl Fn(&Registry)) -> DiResult<Rc<T>> {
        let key = Key::of::<T>();
        downcast(self.resolve_any(&key, Some(&overrides))?, &key)
    }

    fn resolve_named_with<T: 'static>(
        &self,
        name: impl Into<Cow<'static, str>>,
        overrides: impl Fn(&Registry),
    ) -> DiResult<Rc<T>> {
        let key = Key::named::<T>(name);
        downcast(self.resolve_any(&key, Some(&overrides))?, &key)
    }

    /// Builds a fresh `T`. Dependencies the factory obtains through
    /// `resolve` keep their singleton semantics.
    fn create<T: 'static>(&self) -> DiResult<Rc<T>> {
        let key = Key::of::<T>();
        downcast(self.create_any(&key, None)?, &key)
    }

    fn create_named<T: 'static>(&self, name: impl Into<Cow<'static, str>>) -> DiResult<Rc<T>> {
        let key = Key::named::<T>(name);
        downcast(self.create_any(&key, None)?, &key)
    }

    fn create_with<T: 'static>(&self, overrides: impl Fn(&Registry)) -> DiResult<Rc<T>> {
        let key = Key::of::<T>();
        downcast(self.create_any(&key, Some(&overrides))?, &key)
    }

    fn create_named_with<T: 'static>(
        &self,
        name: impl Into<Cow<'static, str>>,
        overrides: impl Fn(&Registry),
    ) -> DiResult<Rc<T>> {
        let key = Key::named::<T>(name);
        downcast(self.create_any(&key, Some(&overrides))?, &key)
    }

    /// Resolves a binding registered with `register_trait`.
    fn resolve_trait<T: ?Sized + 'static>(&self) -> DiResult<Rc<T>> {
        let key = Key::of::<T>();
        downcast::<Rc<T>>(self.resolve_any(&key, None)?, &key).map(|outer| (*outer).clone())
    }

    fn create_trait<T: ?Sized + 'static>(&self) -> DiResult<Rc<T>> {
        let key = Key::of::<T>();
        downcast::<Rc<T>>(self.create_any(&key, None)?, &key).map(|outer| (*outer).clone())
    }

    fn resolve_trait_with<T: ?Sized + 'static>(&self, overrides: impl Fn(&Registry)) -> DiResult<Rc<T>> {
        let key = Key::of::<T>();
        downcast::<Rc<T>>(self.resolve_any(&key, Some(&overrides))?, &key).map(|outer| (*outer).clone())
    }

    /// Builds a fresh trait-object binding with per-call overrides.
    ///
    /// ```
    /// use ferrous_locator::{Registry, Resolver};
    /// use std::rc::Rc;
    ///
    /// trait Named {
    ///     fn name(&self) -> String;
    /// }
    ///
    /// struct Screen(String);
    /// struct Presenter(Rc<Screen>);
    ///
    /// impl Named for Presenter {
    ///     fn name(&self) -> String { self.0 .0.clone() }
    /// }
    ///
    /// let registry = Registry::new();
    /// registry.register_trait::<dyn Named, _>(|r| {
    ///     Ok(Rc::new(Presenter(r.resolve_trait::<Screen>()?)) as Rc<dyn Named>)
    /// });
    ///
    /// let screen = Rc::new(Screen("main".into()));
    /// let presenter = registry
    ///     .create_trait_with::<dyn Named>(|r| {
    ///         let screen = screen.clone();
    ///         r.register_trait::<Screen, _>(move |_| Ok(screen.clone()));
    ///     })
    ///     .unwrap();
    /// assert_eq!(presenter.name(), "main");
    /// ```
    fn create_trait_with<T: ?Sized + 'static>(&self, overrides: impl Fn(&Registry)) -> DiResult<Rc<T>> {
        let key = Key::of::<T>();
        downcast::<Rc<T>>(self.create_any(&key, Some(&overrides))?, &key).map(|outer| (*outer).clone())
    }

    /// Resolves a named trait-object binding, see `Registry::register_trait_with`.
    fn resolve_trait_named<T: ?Sized + 'static>(&self, name: impl Into<Cow<'static, str>>) -> DiResult<Rc<T>> {
        let key = Key::named::<T>(name);
        downcast::<Rc<T>>(self.resolve_any(&key, None)?, &key).map(|outer| (*outer).clone())
    }

    fn create_trait_named<T: ?Sized + 'static>(&self, name: impl Into<Cow<'static, str>>) -> DiResult<Rc<T>> {
        let key = Key::named::<T>(name);
        downcast::<Rc<T>>(self.create_any(&key, None)?, &key).map(|outer| (*outer).clone())
    }

    fn resolve_trait_named_with<T: ?Sized + 'static>(
        &self,
        name: impl Into<Cow<'static, str>>,
        overrides: impl Fn(&Registry),
    ) -> DiResult<Rc<T>> {
        let key = Key::named::<T>(name);
        downcast::<Rc<T>>(self.resolve_any(&key, Some(&overrides))?, &key).map(|outer| (*outer).clone())
    }

    fn create_trait_named_with<T: ?Sized + 'static>(
        &self,
        name: impl Into<Cow<'static, str>>,
        overrides: impl Fn(&Registry),
    ) -> DiResult<Rc<T>> {
        let key = Key::named::<T>(name);
        downcast::<Rc<T>>(self.create_any(&key, Some(&overrides))?, &key).map(|outer| (*outer).clone())
    }

    /// Resolves `T`, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered or its factory fails.
    fn resolve_required<T: 'static>(&self) -> Rc<T> {
        self.resolve::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", std::any::type_name::<T>(), e))
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}

/// Recovers the concrete type at the erased-storage boundary.
pub(crate) fn downcast<T: 'static>(any: Rc<dyn Any>, key: &Key) -> DiResult<Rc<T>> {
    any.downcast::<T>().map_err(|_| DiError::TypeMismatch {
        key: key.clone(),
        expected: std::any::type_name::<T>(),
    })
}
