//! Lifecycle callbacks for components.

use crate::error::HookResult;

/// Post-construct and pre-destroy callbacks.
///
/// Implement this trait and register the component with
/// [`DefinitionBuilder::with_lifecycle`](crate::DefinitionBuilder::with_lifecycle)
/// to have `init` run right after construction and `destroy` run at teardown.
/// Both default to doing nothing. A trait used as a capability can list
/// `Lifecycle` as a supertrait so `dyn Capability` gets the callbacks too.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use wirebox::{ComponentDefinition, HookResult, Lifecycle, Registry, Resolver};
///
/// struct Connection {
///     opened: AtomicUsize,
/// }
///
/// impl Lifecycle for Connection {
///     fn init(&self) -> HookResult {
///         self.opened.fetch_add(1, Ordering::SeqCst);
///         Ok(())
///     }
///
///     fn destroy(&self) -> HookResult {
///         self.opened.fetch_sub(1, Ordering::SeqCst);
///         Ok(())
///     }
/// }
///
/// let mut registry = Registry::new();
/// registry.register(
///     ComponentDefinition::singleton::<Connection, _>(|_| {
///         Ok(Arc::new(Connection { opened: AtomicUsize::new(0) }))
///     })
///     .with_lifecycle(),
/// )?;
///
/// let container = registry.build();
/// let connection = container.resolve::<Connection>()?;
/// assert_eq!(connection.opened.load(Ordering::SeqCst), 1);
///
/// container.teardown();
/// assert_eq!(connection.opened.load(Ordering::SeqCst), 0);
/// # Ok::<(), wirebox::DiError>(())
/// ```
pub trait Lifecycle: Send + Sync + 'static {
    /// Runs once the instance is constructed, before anyone else sees it.
    fn init(&self) -> HookResult {
        Ok(())
    }

    /// Runs once per cached singleton when the container is torn down.
    fn destroy(&self) -> HookResult {
        Ok(())
    }
}
