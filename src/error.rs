//! Error types for the registry.

use thiserror::Error;

use crate::key::Key;

/// Registry errors
///
/// Every failure a caller of `resolve`/`create` can observe. Errors raised
/// inside a nested factory call propagate unchanged through every enclosing
/// resolution, so the variant reaching the outermost caller names the key
/// that actually failed.
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::{DiError, Registry, Resolver};
///
/// let registry = Registry::new();
/// match registry.resolve::<String>() {
///     Err(DiError::NotRegistered(key)) => {
///         assert_eq!(key.to_string(), "alloc::string::String#");
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Error)]
pub enum DiError {
    /// No entry for the composite key in the overlay or the permanent set
    #[error("{0} is not registered")]
    NotRegistered(Key),
    /// `create` was called on an entry registered as singleton-only
    #[error("{0} is singleton-only and cannot be created")]
    SingletonOnlyViolation(Key),
    /// The cached or produced instance is not of the requested type
    #[error("Type mismatch for {key}: expected {expected}")]
    TypeMismatch {
        key: Key,
        expected: &'static str,
    },
    /// An entry was re-entered while it was still being instantiated
    #[error("Circular dependency: {}", join_path(.0))]
    Circular(Vec<Key>),
    /// Nested resolution went deeper than the configured limit
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// A factory failed for a reason of its own
    #[error("Factory for {key} failed: {source}")]
    Factory {
        key: Key,
        #[source]
        source: Box<dyn std::error::Error + 'static>,
    },
}

impl DiError {
    /// Wraps an arbitrary error raised by the factory bound at `key`.
    ///
    /// ```rust
    /// use ferrous_locator::{DiError, Key};
    ///
    /// let err = DiError::factory(Key::of::<u16>(), "port out of range");
    /// assert_eq!(err.to_string(), "Factory for u16# failed: port out of range");
    /// ```
    pub fn factory<E>(key: Key, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + 'static>>,
    {
        DiError::Factory {
            key,
            source: source.into(),
        }
    }

    /// The composite key the error refers to, if it names one.
    pub fn key(&self) -> Option<&Key> {
        match self {
            DiError::NotRegistered(key)
            | DiError::SingletonOnlyViolation(key)
            | DiError::TypeMismatch { key, .. }
            | DiError::Factory { key, .. } => Some(key),
            DiError::Circular(path) => path.last(),
            DiError::DepthExceeded(_) => None,
        }
    }
}

fn join_path(path: &[Key]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Result type for registry operations
pub type DiResult<T> = Result<T, DiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_not_registered() {
        let err = DiError::NotRegistered(Key::new("F", ""));
        assert_eq!(err.to_string(), "F# is not registered");
    }

    #[test]
    fn display_circular_joins_path() {
        let err = DiError::Circular(vec![
            Key::new("A", ""),
            Key::new("B", "x"),
            Key::new("A", ""),
        ]);
        assert_eq!(err.to_string(), "Circular dependency: A# -> B#x -> A#");
        assert_eq!(err.key(), Some(&Key::new("A", "")));
    }

    #[test]
    fn factory_keeps_source() {
        let err = DiError::factory(Key::new("S", ""), "boom");
        assert!(err.source().is_some());
        assert_eq!(err.key(), Some(&Key::new("S", "")));
        assert!(DiError::DepthExceeded(3).key().is_none());
    }
}
