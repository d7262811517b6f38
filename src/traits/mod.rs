//! Core traits for the registry.

mod resolver;

pub use resolver::{Resolver, ResolverCore};
pub(crate) use resolver::downcast;
