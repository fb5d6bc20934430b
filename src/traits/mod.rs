//! Core traits for the container.

mod lifecycle;
mod resolver;

pub use lifecycle::Lifecycle;
pub use resolver::{Resolver, ResolverCore};
