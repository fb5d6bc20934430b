//! Deferred resolution handles.

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use super::ContainerInner;
use crate::definition::{downcast_instance, AnyArc};
use crate::error::{DiError, DiResult};
use crate::key::{Key, Qualifier};

/// Type-erased binding of a provider.
#[derive(Clone)]
pub(crate) struct AnyProvider {
    container: Weak<ContainerInner>,
    key: Key,
    qualifier: Option<Qualifier>,
}

impl AnyProvider {
    pub(crate) fn bind(container: Weak<ContainerInner>, key: Key, qualifier: Option<Qualifier>) -> Self {
        Self { container, key, qualifier }
    }

    fn resolve(&self) -> DiResult<AnyArc> {
        let container = self.container.upgrade().ok_or(DiError::Disposed)?;
        container.resolve_any(&self.key, self.qualifier.as_ref())
    }
}

/// Lazy handle that resolves `T` anew on every [`get`](Provider::get).
///
/// A provider is bound to a capability and optional qualifier when it is
/// injected, and holds no instance. For a prototype target every `get`
/// returns a fresh instance; for a singleton target it returns the one cached
/// instance. This is how a singleton consumer gets successive prototype
/// instances instead of the single one it would receive by direct injection.
///
/// The provider holds only a weak reference to the container. After the
/// container is torn down or dropped, `get` fails with [`DiError::Disposed`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use wirebox::{ComponentDefinition, Registry};
///
/// #[derive(Default)]
/// struct Counter(AtomicUsize);
///
/// let mut registry = Registry::new();
/// registry.register(ComponentDefinition::prototype::<Counter, _>(|_| Ok(Arc::new(Counter::default()))))?;
/// let container = registry.build();
///
/// let counters = container.get_provider::<Counter>();
/// let first = counters.get()?;
/// first.0.fetch_add(1, Ordering::SeqCst);
/// assert_eq!(counters.get()?.0.load(Ordering::SeqCst), 0);
/// # Ok::<(), wirebox::DiError>(())
/// ```
pub struct Provider<T: ?Sized> {
    inner: AnyProvider,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T> Provider<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    pub(crate) fn bound(container: Weak<ContainerInner>, qualifier: Option<Qualifier>) -> Self {
        Self {
            inner: AnyProvider::bind(container, Key::of::<T>(), qualifier),
            _marker: PhantomData,
        }
    }

    pub(crate) fn from_any(inner: AnyProvider) -> DiResult<Self> {
        if inner.key != Key::of::<T>() {
            return Err(DiError::TypeMismatch { expected: std::any::type_name::<Provider<T>>() });
        }
        Ok(Self { inner, _marker: PhantomData })
    }

    /// Resolves the bound capability. Every call is an independent resolution.
    pub fn get(&self) -> DiResult<Arc<T>> {
        downcast_instance(self.inner.resolve()?)
    }

    /// The bound capability.
    pub fn key(&self) -> &Key {
        &self.inner.key
    }

    /// The bound qualifier, if any.
    pub fn qualifier(&self) -> Option<&Qualifier> {
        self.inner.qualifier.as_ref()
    }
}

impl<T: ?Sized> Clone for Provider<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> fmt::Debug for Provider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("capability", &self.inner.key.display_name())
            .field("qualifier", &self.inner.qualifier)
            .finish()
    }
}
