//! Resolved constructor arguments.

use std::sync::Arc;

use super::deferred::{AnyProvider, Provider};
use crate::definition::{downcast_instance, AnyArc};
use crate::error::{DiError, DiResult};

pub(crate) enum Argument {
    Instance(AnyArc),
    Provider(AnyProvider),
}

/// Arguments passed to a constructor, one per declared dependency.
///
/// Take them in declaration order: [`next`](Args::next) for
/// `depends_on*` dependencies and [`provider`](Args::provider) for
/// `provider_of*` dependencies. Asking for the wrong type, or for more
/// arguments than were declared, yields [`DiError::TypeMismatch`].
///
/// ```
/// use std::sync::Arc;
/// use wirebox::{ComponentDefinition, Provider, Registry, Resolver};
///
/// struct Clock;
/// struct Ticket;
/// struct Booth {
///     clock: Arc<Clock>,
///     tickets: Provider<Ticket>,
/// }
///
/// let mut registry = Registry::new();
/// registry.register(ComponentDefinition::singleton::<Clock, _>(|_| Ok(Arc::new(Clock))))?;
/// registry.register(ComponentDefinition::prototype::<Ticket, _>(|_| Ok(Arc::new(Ticket))))?;
/// registry.register(
///     ComponentDefinition::singleton::<Booth, _>(|args| {
///         Ok(Arc::new(Booth { clock: args.next()?, tickets: args.provider()? }))
///     })
///     .depends_on::<Clock>()
///     .provider_of::<Ticket>(),
/// )?;
///
/// let container = registry.build();
/// let booth = container.resolve::<Booth>()?;
/// assert!(!Arc::ptr_eq(&booth.tickets.get()?, &booth.tickets.get()?));
/// # Ok::<(), wirebox::DiError>(())
/// ```
pub struct Args {
    values: std::vec::IntoIter<Argument>,
}

impl Args {
    pub(crate) fn new(values: Vec<Argument>) -> Self {
        Self { values: values.into_iter() }
    }

    /// Takes the next eagerly resolved dependency.
    pub fn next<T: ?Sized + Send + Sync + 'static>(&mut self) -> DiResult<Arc<T>> {
        match self.values.next() {
            Some(Argument::Instance(any)) => downcast_instance(any),
            _ => Err(mismatch::<T>()),
        }
    }

    /// Takes the next deferred dependency as a `Provider<T>`.
    pub fn provider<T: ?Sized + Send + Sync + 'static>(&mut self) -> DiResult<Provider<T>> {
        match self.values.next() {
            Some(Argument::Provider(provider)) => Provider::from_any(provider),
            _ => Err(mismatch::<Provider<T>>()),
        }
    }

    /// Arguments not taken yet.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

fn mismatch<T: ?Sized>() -> DiError {
    DiError::TypeMismatch { expected: std::any::type_name::<T>() }
}
