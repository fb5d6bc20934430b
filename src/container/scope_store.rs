//! Singleton cache and teardown bookkeeping.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::definition::AnyArc;
use crate::error::DiResult;
use crate::lifetime::Lifetime;
use crate::registry::Catalog;

/// Cache slot of one singleton definition.
///
/// `value` is read on every lookup; `init` serializes the first construction
/// so concurrent callers build at most one instance.
struct Slot {
    value: RwLock<Option<AnyArc>>,
    init: Mutex<()>,
}

/// Per-definition instance cache.
///
/// Only singleton definitions get a slot. Prototype lookups never touch the
/// store.
pub(crate) struct ScopeStore {
    slots: Box<[Option<Slot>]>,
    // Definition indices in the order their instances were cached
    constructed: Mutex<Vec<usize>>,
}

impl ScopeStore {
    pub(crate) fn new(catalog: &Catalog) -> Self {
        let slots = catalog
            .iter()
            .map(|(_, definition)| match definition.lifetime() {
                Lifetime::Singleton => Some(Slot {
                    value: RwLock::new(None),
                    init: Mutex::new(()),
                }),
                Lifetime::Prototype => None,
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            slots,
            constructed: Mutex::new(Vec::new()),
        }
    }

    /// The cached instance, if the singleton has been constructed.
    #[inline]
    pub(crate) fn cached(&self, index: usize) -> Option<AnyArc> {
        self.slots[index].as_ref()?.value.read().clone()
    }

    /// Returns the cached instance or constructs, caches and returns a new one.
    ///
    /// Double-checked: the slot is re-read under the construction lock, so a
    /// caller that lost the race returns the winner's instance. A failed
    /// construction leaves the slot empty. Definitions without a slot are
    /// constructed on every call.
    pub(crate) fn get_or_init<F>(&self, index: usize, construct: F) -> DiResult<AnyArc>
    where
        F: FnOnce() -> DiResult<AnyArc>,
    {
        let Some(slot) = self.slots[index].as_ref() else {
            return construct();
        };

        let _init = slot.init.lock();
        if let Some(existing) = slot.value.read().clone() {
            return Ok(existing);
        }

        let instance = construct()?;
        *slot.value.write() = Some(instance.clone());
        self.constructed.lock().push(index);
        Ok(instance)
    }

    /// Number of cached singletons.
    pub(crate) fn len(&self) -> usize {
        self.constructed.lock().len()
    }

    /// Disposes every cached singleton, last constructed first.
    ///
    /// Each pre-destroy hook runs exactly once. Hook errors and panics are
    /// logged and do not stop the remaining disposals. Returns how many
    /// instances were released.
    pub(crate) fn dispose_all(&self, catalog: &Catalog) -> usize {
        let order = std::mem::take(&mut *self.constructed.lock());
        let mut released = 0;
        for index in order.into_iter().rev() {
            if self.dispose(index, catalog) {
                released += 1;
            }
        }
        released
    }

    fn dispose(&self, index: usize, catalog: &Catalog) -> bool {
        let Some(slot) = self.slots[index].as_ref() else {
            return false;
        };
        let Some(instance) = slot.value.write().take() else {
            return false;
        };

        let definition = catalog.get(index);
        if let Some(hook) = &definition.pre_destroy {
            match catch_unwind(AssertUnwindSafe(|| hook(&instance))) {
                Ok(Ok(())) => debug!(component = %definition.name(), "pre-destroy hook completed"),
                Ok(Err(err)) => warn!(
                    component = %definition.name(),
                    error = %err,
                    "pre-destroy hook failed; continuing teardown"
                ),
                Err(payload) => warn!(
                    component = %definition.name(),
                    panic = panic_message(payload.as_ref()),
                    "pre-destroy hook panicked; continuing teardown"
                ),
            }
        }
        true
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ComponentDefinition, Registry};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Thing;

    fn store_with(lifetimes: &[Lifetime]) -> (ScopeStore, Catalog) {
        let mut registry = Registry::new();
        for (i, lifetime) in lifetimes.iter().enumerate() {
            registry
                .register(
                    ComponentDefinition::with_lifetime::<Thing, _>(*lifetime, |_| Ok(Arc::new(Thing)))
                        .qualifier(format!("thing-{}", i)),
                )
                .unwrap();
        }
        let catalog = registry.into_catalog();
        (ScopeStore::new(&catalog), catalog)
    }

    fn thing() -> DiResult<AnyArc> {
        Ok(crate::definition::erase(Arc::new(Thing)))
    }

    #[test]
    fn singleton_slot_constructs_once() {
        let (store, _catalog) = store_with(&[Lifetime::Singleton]);
        let calls = AtomicUsize::new(0);

        let first = store.get_or_init(0, || { calls.fetch_add(1, Ordering::SeqCst); thing() }).unwrap();
        let second = store.get_or_init(0, || { calls.fetch_add(1, Ordering::SeqCst); thing() }).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(store.cached(0).is_some());
    }

    #[test]
    fn prototype_has_no_slot() {
        let (store, _catalog) = store_with(&[Lifetime::Prototype]);
        let first = store.get_or_init(0, thing).unwrap();
        let second = store.get_or_init(0, thing).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(store.cached(0).is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn failed_construction_leaves_slot_empty() {
        let (store, _catalog) = store_with(&[Lifetime::Singleton]);
        let err = store.get_or_init(0, || Err(crate::DiError::Disposed));
        assert!(err.is_err());
        assert!(store.cached(0).is_none());
        assert!(store.get_or_init(0, thing).is_ok());
    }

    #[test]
    fn dispose_all_empties_the_store() {
        let (store, catalog) = store_with(&[Lifetime::Singleton, Lifetime::Singleton]);
        store.get_or_init(1, thing).unwrap();
        store.get_or_init(0, thing).unwrap();

        assert_eq!(store.dispose_all(&catalog), 2);
        assert!(store.cached(0).is_none());
        assert_eq!(store.dispose_all(&catalog), 0);
    }
}
