//! # wirebox
//!
//! A small inversion-of-control container: register component definitions,
//! build a container, and let it construct and wire the object graph.
//!
//! ## Features
//!
//! - **Singleton and prototype lifetimes**: one shared instance, or a fresh one per lookup
//! - **Trait capabilities**: resolve `dyn Trait` to whichever implementation was registered
//! - **Qualifiers and primaries**: pick among several implementations of one capability
//! - **Deferred providers**: inject a [`Provider<T>`] to resolve lazily and repeatedly
//! - **Lifecycle hooks**: post-construct and pre-destroy, with reverse-order teardown
//! - **Cycle detection**: a cyclic graph fails with the full path instead of overflowing
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use wirebox::{ComponentDefinition, Registry, Resolver};
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let mut registry = Registry::new();
//! registry.register(ComponentDefinition::singleton::<Database, _>(|_| {
//!     Ok(Arc::new(Database { url: "postgres://localhost".to_string() }))
//! }))?;
//! registry.register(
//!     ComponentDefinition::prototype::<UserService, _>(|args| Ok(Arc::new(UserService { db: args.next()? })))
//!         .depends_on::<Database>(),
//! )?;
//!
//! let container = registry.build();
//! let service = container.resolve::<UserService>()?;
//! assert_eq!(service.db.url, "postgres://localhost");
//!
//! // Prototypes are fresh, their singleton dependency is shared
//! let other = container.resolve::<UserService>()?;
//! assert!(!Arc::ptr_eq(&service, &other));
//! assert!(Arc::ptr_eq(&service.db, &other.db));
//!
//! container.teardown();
//! # Ok::<(), wirebox::DiError>(())
//! ```
//!
//! ## Trait Capabilities
//!
//! ```rust
//! use std::sync::Arc;
//! use wirebox::{ComponentDefinition, Registry, Resolver};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! registry.register(ComponentDefinition::singleton::<dyn Greeter, _>(|_| {
//!     Ok(Arc::new(English) as Arc<dyn Greeter>)
//! }))?;
//!
//! let container = registry.build();
//! assert_eq!(container.resolve::<dyn Greeter>()?.greet(), "hello");
//! # Ok::<(), wirebox::DiError>(())
//! ```
//!
//! ## Starting With Options
//!
//! [`Registry::start`] validates the wiring and constructs every singleton up
//! front, so configuration mistakes surface before the first request.
//!
//! ```rust
//! use std::sync::Arc;
//! use wirebox::{ComponentDefinition, ContainerOptions, Registry};
//!
//! struct Cache;
//!
//! let mut registry = Registry::new();
//! registry.register(ComponentDefinition::singleton::<Cache, _>(|_| Ok(Arc::new(Cache))))?;
//!
//! let container = registry.start(&ContainerOptions::default())?;
//! assert_eq!(container.cached_singletons(), 1);
//! # Ok::<(), wirebox::DiError>(())
//! ```

pub mod config;
pub mod container;
pub mod definition;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod registry;
pub mod traits;
pub mod validation;

mod internal;

pub use config::ContainerOptions;
pub use container::{Args, Container, Provider};
pub use definition::{ComponentDefinition, DefinitionBuilder, Dependency, DependencyKind};
pub use error::{DiError, DiResult, HookError, HookResult};
pub use key::{Key, Qualifier};
pub use lifetime::Lifetime;
pub use registry::Registry;
pub use traits::{Lifecycle, Resolver, ResolverCore};
pub use validation::{ValidationIssue, ValidationReport};
