//! Resolver traits for component lookup.

use std::sync::Arc;

use crate::definition::{downcast_instance, AnyArc};
use crate::error::DiResult;
use crate::key::{Key, Qualifier};

/// Object-safe lookup by key.
///
/// This is the type-erased entry point. Most callers use the generic
/// methods of [`Resolver`] instead, which every `ResolverCore` gets for free.
pub trait ResolverCore: Send + Sync {
    /// Selects exactly one definition for `key` (and `qualifier`, when given)
    /// and returns its instance according to the definition's lifetime.
    ///
    /// # Returns
    ///
    /// * `Ok(AnyArc)` - The instance, type-erased
    /// * `Err(DiError)` - No match, ambiguous match, construction failure or disposed container
    fn resolve_any(&self, key: &Key, qualifier: Option<&Qualifier>) -> DiResult<AnyArc>;
}

/// Typed lookup methods built on [`ResolverCore`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use wirebox::{ComponentDefinition, Registry, Resolver};
///
/// trait DiscountPolicy: Send + Sync {
///     fn discount(&self, price: u32) -> u32;
/// }
///
/// struct FixDiscountPolicy;
/// impl DiscountPolicy for FixDiscountPolicy {
///     fn discount(&self, _price: u32) -> u32 { 1000 }
/// }
///
/// struct RateDiscountPolicy;
/// impl DiscountPolicy for RateDiscountPolicy {
///     fn discount(&self, price: u32) -> u32 { price / 10 }
/// }
///
/// let mut registry = Registry::new();
/// registry.register(
///     ComponentDefinition::singleton::<dyn DiscountPolicy, _>(|_| {
///         Ok(Arc::new(FixDiscountPolicy) as Arc<dyn DiscountPolicy>)
///     })
///     .qualifier("fixDiscountPolicy"),
/// )?;
/// registry.register(
///     ComponentDefinition::singleton::<dyn DiscountPolicy, _>(|_| {
///         Ok(Arc::new(RateDiscountPolicy) as Arc<dyn DiscountPolicy>)
///     })
///     .qualifier("mainDiscountPolicy"),
/// )?;
///
/// let container = registry.build();
/// let main = container.resolve_qualified::<dyn DiscountPolicy>("mainDiscountPolicy")?;
/// assert_eq!(main.discount(20000), 2000);
/// assert!(container.resolve::<dyn DiscountPolicy>().is_err());
/// # Ok::<(), wirebox::DiError>(())
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves capability `T`.
    fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        downcast_instance(self.resolve_any(&Key::of::<T>(), None)?)
    }

    /// Resolves the implementation of `T` tagged `qualifier`.
    fn resolve_qualified<T: ?Sized + Send + Sync + 'static>(
        &self,
        qualifier: impl Into<Qualifier>,
    ) -> DiResult<Arc<T>> {
        let qualifier = qualifier.into();
        downcast_instance(self.resolve_any(&Key::of::<T>(), Some(&qualifier))?)
    }

    /// Resolves capability `T`, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics if the capability cannot be resolved. Use it where a missing
    /// component is a programming error.
    fn resolve_required<T: ?Sized + Send + Sync + 'static>(&self) -> Arc<T> {
        self.resolve::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", std::any::type_name::<T>(), e))
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
