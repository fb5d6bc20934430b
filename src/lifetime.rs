//! Component lifetimes.

use std::fmt;

/// Component lifetimes controlling instance caching
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use wirebox::{ComponentDefinition, Registry, Resolver};
///
/// struct Clock;
/// struct Ticket;
///
/// let mut registry = Registry::new();
/// registry.register(ComponentDefinition::singleton::<Clock, _>(|_| Ok(Arc::new(Clock))))?;
/// registry.register(ComponentDefinition::prototype::<Ticket, _>(|_| Ok(Arc::new(Ticket))))?;
/// let container = registry.build();
///
/// // Singleton: the same instance on every lookup
/// assert!(Arc::ptr_eq(&container.resolve::<Clock>()?, &container.resolve::<Clock>()?));
///
/// // Prototype: a new instance on every lookup
/// assert!(!Arc::ptr_eq(&container.resolve::<Ticket>()?, &container.resolve::<Ticket>()?));
/// # Ok::<(), wirebox::DiError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// One instance per container, created on first lookup (or at start
    /// when eager) and kept until teardown. Pre-destroy hooks run at teardown.
    Singleton,
    /// A new instance on every lookup, never cached. The container does not
    /// track prototype instances, so their pre-destroy hooks never run.
    Prototype,
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Singleton => f.write_str("singleton"),
            Lifetime::Prototype => f.write_str("prototype"),
        }
    }
}
