//! Key types for entry storage and lookup.

use std::borrow::Cow;
use std::fmt;

/// Opaque identity of a bindable contract.
///
/// The registry never parses a type key; it only compares them. Keys can be
/// spelled out by hand or derived from a Rust type with [`TypeKey::of`],
/// which uses `std::any::type_name` and therefore includes generic
/// arguments (`Vec<u8>` and `Vec<u16>` get different keys).
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::TypeKey;
///
/// let explicit = TypeKey::new("app::Clock");
/// assert_eq!(explicit.as_str(), "app::Clock");
///
/// assert_ne!(TypeKey::of::<Vec<u8>>(), TypeKey::of::<Vec<u16>>());
/// assert_eq!(TypeKey::of::<Vec<u8>>(), TypeKey::of::<Vec<u8>>());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(Cow<'static, str>);

impl TypeKey {
    /// Creates a type key from an explicit identifier.
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        TypeKey(id.into())
    }

    /// Derives the type key for `T`, including unsized trait objects.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeKey(Cow::Borrowed(std::any::type_name::<T>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for TypeKey {
    fn from(id: &'static str) -> Self {
        TypeKey(Cow::Borrowed(id))
    }
}

impl From<String> for TypeKey {
    fn from(id: String) -> Self {
        TypeKey(Cow::Owned(id))
    }
}

/// Composite lookup key: type key plus name.
///
/// Unnamed bindings use the empty name. The two parts are stored and hashed
/// separately, so no choice of type key or name can make two different
/// bindings collide. For diagnostics the key renders as `type#name`.
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::Key;
///
/// let unnamed = Key::of::<String>();
/// assert_eq!(unnamed.name(), "");
/// assert_eq!(unnamed.to_string(), "alloc::string::String#");
///
/// let named = Key::named::<String>("greeting");
/// assert_eq!(named.name(), "greeting");
/// assert_ne!(unnamed, named);
///
/// assert_ne!(Key::new("a#", "b"), Key::new("a", "#b"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key {
    type_key: TypeKey,
    name: Cow<'static, str>,
}

impl Key {
    pub fn new(type_key: impl Into<TypeKey>, name: impl Into<Cow<'static, str>>) -> Self {
        Key {
            type_key: type_key.into(),
            name: name.into(),
        }
    }

    /// Unnamed key for `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Key::new(TypeKey::of::<T>(), "")
    }

    /// Named key for `T`.
    #[inline]
    pub fn named<T: ?Sized + 'static>(name: impl Into<Cow<'static, str>>) -> Self {
        Key::new(TypeKey::of::<T>(), name)
    }

    pub fn type_key(&self) -> &TypeKey {
        &self.type_key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.type_key, self.name)
    }
}
