//! # ferrous-locator
//!
//! A minimal runtime dependency registry: register factories keyed by a type
//! identity (plus an optional name), then resolve shared instances or create
//! fresh ones. Factories receive the registry and resolve their own
//! dependencies from it, so the dependency graph is simply the call graph of
//! the factories.
//!
//! ## Features
//!
//! - **Singleton by default**: `resolve` caches the first instance per binding
//! - **Fresh on demand**: `create` always runs the factory (unless the binding
//!   is singleton-only)
//! - **Named bindings**: several independent bindings per type
//! - **Per-call overrides**: temporarily rebind dependencies for a single
//!   resolution without touching the permanent registry
//! - **Resolution-time diagnostics**: cycle and depth detection, observers,
//!   `tracing` events
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_locator::{Registry, Resolver};
//! use std::rc::Rc;
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct UserService {
//!     db: Rc<Database>,
//! }
//!
//! let registry = Registry::new();
//! registry.register::<Database, _>(|_| Ok(Database {
//!     url: "postgres://localhost".to_string(),
//! }));
//! registry.register::<UserService, _>(|r| Ok(UserService {
//!     db: r.resolve::<Database>()?,
//! }));
//!
//! let a = registry.create::<UserService>().unwrap();
//! let b = registry.create::<UserService>().unwrap();
//! assert!(!Rc::ptr_eq(&a, &b)); // fresh services
//! assert!(Rc::ptr_eq(&a.db, &b.db)); // shared database
//! assert_eq!(a.db.url, "postgres://localhost");
//! ```
//!
//! ## Per-call overrides
//!
//! ```rust
//! use ferrous_locator::{Registry, Resolver};
//!
//! struct Presenter {
//!     screen: String,
//! }
//!
//! let registry = Registry::new();
//! registry.register::<Presenter, _>(|r| Ok(Presenter {
//!     screen: r.resolve::<String>()?.to_string(),
//! }));
//!
//! let presenter = registry
//!     .create_with::<Presenter>(|r| r.register::<String, _>(|_| Ok("main".to_string())))
//!     .unwrap();
//! assert_eq!(presenter.screen, "main");
//!
//! // The String binding existed only for that call
//! assert_eq!(registry.len(), 1);
//! assert!(registry.create::<Presenter>().is_err());
//! ```

pub mod config;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod traits;

mod internal;
mod registration;
mod registry;

pub use config::RegistryConfig;
pub use error::{DiError, DiResult};
pub use key::{Key, TypeKey};
pub use lifetime::Lifetime;
pub use observer::{LoggingObserver, MetricsObserver, MetricsSnapshot, RegistryObserver};
pub use registry::{Registry, ResolveMode};
pub use traits::{Resolver, ResolverCore};
