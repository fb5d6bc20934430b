//! The built container.
//!
//! A [`Container`] owns the registered definitions, the singleton cache and
//! the teardown state. It is cheap to clone and can be shared across threads.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::definition::{AnyArc, ComponentDefinition};
use crate::error::{DiError, DiResult};
use crate::key::{Key, Qualifier};
use crate::lifetime::Lifetime;
use crate::registry::Catalog;
use crate::traits::ResolverCore;
use crate::validation::cycle_paths;

mod args;
mod deferred;
mod instantiator;
mod resolver;
mod scope_store;

pub use args::Args;
pub use deferred::Provider;
pub(crate) use resolver::select;

use instantiator::Instantiator;
use scope_store::ScopeStore;

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// Container resolving registered components.
///
/// Obtained from [`Registry::build`](crate::Registry::build) or
/// [`Registry::start`](crate::Registry::start). Lookups go through the
/// [`Resolver`](crate::Resolver) methods; [`get_provider`](Container::get_provider)
/// hands out deferred handles; [`teardown`](Container::teardown) releases the
/// singletons.
///
/// # Thread Safety
///
/// Lookups may run concurrently from any number of threads. The first
/// lookups of a singleton race on a per-definition lock and exactly one
/// construction happens. `teardown` must not run concurrently with lookups.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use wirebox::{ComponentDefinition, Registry, Resolver};
///
/// struct Database;
/// struct Repository { _db: Arc<Database> }
///
/// let destroyed = Arc::new(Mutex::new(Vec::new()));
/// let (log_db, log_repo) = (destroyed.clone(), destroyed.clone());
///
/// let mut registry = Registry::new();
/// registry.register(
///     ComponentDefinition::singleton::<Database, _>(|_| Ok(Arc::new(Database)))
///         .pre_destroy(move |_| { log_db.lock().unwrap().push("database"); Ok(()) }),
/// )?;
/// registry.register(
///     ComponentDefinition::singleton::<Repository, _>(|args| Ok(Arc::new(Repository { _db: args.next()? })))
///         .depends_on::<Database>()
///         .pre_destroy(move |_| { log_repo.lock().unwrap().push("repository"); Ok(()) }),
/// )?;
///
/// let container = registry.build();
/// container.resolve::<Repository>()?;
/// container.teardown();
///
/// // Dependents go first
/// assert_eq!(*destroyed.lock().unwrap(), vec!["repository", "database"]);
/// # Ok::<(), wirebox::DiError>(())
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

pub(crate) struct ContainerInner {
    id: u64,
    catalog: Catalog,
    store: ScopeStore,
    // Per definition, the eager construction cycle it lies on
    cycles: Box<[Option<Vec<String>>]>,
    disposed: AtomicBool,
}

impl Container {
    pub(crate) fn new(catalog: Catalog) -> Self {
        let store = ScopeStore::new(&catalog);
        let cycles = cycle_paths(&catalog).into_boxed_slice();
        let cyclic = cycles.iter().filter(|path| path.is_some()).count();
        if cyclic > 0 {
            debug!(cyclic, "definitions on a construction cycle");
        }
        Self {
            inner: Arc::new(ContainerInner {
                id: NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed),
                catalog,
                store,
                cycles,
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// A deferred handle for capability `T`. Nothing is resolved until
    /// [`Provider::get`] is called.
    pub fn get_provider<T: ?Sized + Send + Sync + 'static>(&self) -> Provider<T> {
        self.bind_provider::<T>(None)
    }

    /// A deferred handle for the implementation of `T` tagged `qualifier`.
    pub fn get_provider_qualified<T: ?Sized + Send + Sync + 'static>(
        &self,
        qualifier: impl Into<Qualifier>,
    ) -> Provider<T> {
        self.bind_provider::<T>(Some(qualifier.into()))
    }

    fn bind_provider<T: ?Sized + Send + Sync + 'static>(&self, qualifier: Option<Qualifier>) -> Provider<T> {
        Provider::bound(Arc::downgrade(&self.inner), qualifier)
    }

    /// All definitions advertising capability `T`, in registration order.
    pub fn definitions_for<T: ?Sized + 'static>(&self) -> Vec<&ComponentDefinition> {
        self.inner.catalog.definitions_for(&Key::of::<T>())
    }

    /// All definitions advertising `key`, in registration order.
    pub fn definitions_for_key(&self, key: &Key) -> Vec<&ComponentDefinition> {
        self.inner.catalog.definitions_for(key)
    }

    /// Constructs every singleton that is not cached yet, in registration
    /// order. Stops at the first failure.
    pub fn preinstantiate_singletons(&self) -> DiResult<()> {
        for (index, definition) in self.inner.catalog.iter() {
            if definition.lifetime() == Lifetime::Singleton {
                self.inner.ensure_live()?;
                self.inner.instance(index)?;
            }
        }
        Ok(())
    }

    /// Number of singletons currently cached.
    pub fn cached_singletons(&self) -> usize {
        self.inner.store.len()
    }

    /// Whether [`teardown`](Container::teardown) has run.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    /// Disposes all cached singletons in reverse construction order.
    ///
    /// Each pre-destroy hook runs exactly once; a failing or panicking hook is
    /// logged and the remaining singletons are still disposed. Afterwards every
    /// lookup, including through providers, fails with [`DiError::Disposed`].
    /// Calling `teardown` again does nothing.
    pub fn teardown(&self) {
        if self.inner.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let released = self.inner.store.dispose_all(&self.inner.catalog);
        info!(released, "container torn down");
    }
}

impl ResolverCore for Container {
    fn resolve_any(&self, key: &Key, qualifier: Option<&Qualifier>) -> DiResult<AnyArc> {
        self.inner.resolve_any(key, qualifier)
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.inner.id)
            .field("components", &self.inner.catalog.len())
            .field("cached_singletons", &self.inner.store.len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl ContainerInner {
    fn ensure_live(&self) -> DiResult<()> {
        if self.disposed.load(Ordering::Acquire) {
            Err(DiError::Disposed)
        } else {
            Ok(())
        }
    }

    pub(crate) fn resolve_any(self: &Arc<Self>, key: &Key, qualifier: Option<&Qualifier>) -> DiResult<AnyArc> {
        self.ensure_live()?;
        let index = select(&self.catalog, key, qualifier)?;
        self.instance(index)
    }

    fn instance(self: &Arc<Self>, index: usize) -> DiResult<AnyArc> {
        // Fails before any construction lock, so racing threads cannot deadlock
        if let Some(path) = &self.cycles[index] {
            return Err(DiError::CyclicDependency(path.clone()));
        }

        let definition = self.catalog.get(index);
        let instantiator = Instantiator::new(self);

        match definition.lifetime() {
            Lifetime::Singleton => {
                if let Some(cached) = self.store.cached(index) {
                    trace!(component = %definition.name(), "singleton cache hit");
                    return Ok(cached);
                }
                let _guard = instantiator.enter(index)?;
                self.store.get_or_init(index, || instantiator.construct(index))
            }
            Lifetime::Prototype => {
                let _guard = instantiator.enter(index)?;
                instantiator.construct(index)
            }
        }
    }
}

impl Drop for ContainerInner {
    fn drop(&mut self) {
        if !self.disposed.load(Ordering::Acquire) && self.store.len() > 0 {
            warn!(
                cached = self.store.len(),
                "container dropped with undisposed singletons; call teardown() before dropping"
            );
        }
    }
}
