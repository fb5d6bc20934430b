//! Constructor injection.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use super::args::{Argument, Args};
use super::deferred::AnyProvider;
use super::scope_store::panic_message;
use super::ContainerInner;
use crate::definition::{AnyArc, DependencyKind};
use crate::error::{DiError, DiResult};
use crate::internal::ConstructionGuard;

/// Builds instances of one container's definitions.
pub(crate) struct Instantiator<'a> {
    container: &'a Arc<ContainerInner>,
}

impl<'a> Instantiator<'a> {
    pub(crate) fn new(container: &'a Arc<ContainerInner>) -> Self {
        Self { container }
    }

    /// Marks definition `index` as under construction on this thread.
    ///
    /// Must be held across the whole construction, and taken before any
    /// singleton lock so a same-thread cycle fails instead of deadlocking.
    pub(crate) fn enter(&self, index: usize) -> DiResult<ConstructionGuard> {
        ConstructionGuard::enter(self.container.id, index).map_err(|cycle| {
            DiError::CyclicDependency(
                cycle
                    .into_iter()
                    .map(|i| self.container.catalog.get(i).name().to_string())
                    .collect(),
            )
        })
    }

    /// Resolves the dependencies of definition `index` in declaration order,
    /// invokes its constructor and runs its post-construct hook.
    ///
    /// The first failing dependency aborts construction with its error. A
    /// failing or panicking hook discards the instance.
    pub(crate) fn construct(&self, index: usize) -> DiResult<AnyArc> {
        let definition = self.container.catalog.get(index);
        let started = Instant::now();

        let mut arguments = Vec::with_capacity(definition.dependencies().len());
        for dependency in definition.dependencies() {
            let argument = match dependency.kind() {
                DependencyKind::Instance => {
                    Argument::Instance(self.container.resolve_any(dependency.key(), dependency.qualifier())?)
                }
                DependencyKind::Provider => Argument::Provider(AnyProvider::bind(
                    Arc::downgrade(self.container),
                    *dependency.key(),
                    dependency.qualifier().cloned(),
                )),
            };
            arguments.push(argument);
        }

        let instance = (definition.ctor)(&mut Args::new(arguments))?;

        if let Some(hook) = &definition.post_construct {
            match catch_unwind(AssertUnwindSafe(|| hook(&instance))) {
                Ok(result) => result.map_err(|err| DiError::initialization_failed(definition.name(), err))?,
                Err(payload) => {
                    let message = format!("post-construct hook panicked: {}", panic_message(payload.as_ref()));
                    return Err(DiError::initialization_failed(definition.name(), message.into()));
                }
            }
        }

        debug!(
            component = %definition.name(),
            lifetime = %definition.lifetime(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "constructed component"
        );
        Ok(instance)
    }
}
