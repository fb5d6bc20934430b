//! Component definitions and their builder.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::container::Args;
use crate::error::{DiError, DiResult, HookResult};
use crate::key::{Key, Qualifier};
use crate::lifetime::Lifetime;
use crate::traits::Lifecycle;

// Type-erased instance. The payload is always an `Arc<T>` for the capability `T`,
// which keeps `?Sized` capabilities (trait objects) storable and preserves identity.
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

pub(crate) type Constructor = Arc<dyn Fn(&mut Args) -> DiResult<AnyArc> + Send + Sync>;
pub(crate) type Hook = Arc<dyn Fn(&AnyArc) -> HookResult + Send + Sync>;

pub(crate) fn erase<T: ?Sized + Send + Sync + 'static>(instance: Arc<T>) -> AnyArc {
    Arc::new(instance)
}

pub(crate) fn downcast_instance<T: ?Sized + Send + Sync + 'static>(any: AnyArc) -> DiResult<Arc<T>> {
    any.downcast::<Arc<T>>()
        .map(|boxed| (*boxed).clone())
        .map_err(|_| DiError::TypeMismatch { expected: std::any::type_name::<T>() })
}

/// How a dependency is handed to the constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// Resolved before the constructor runs
    Instance,
    /// Injected as a [`Provider`](crate::Provider) that resolves on every `get()`
    Provider,
}

/// A dependency specification: required capability plus optional qualifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    key: Key,
    qualifier: Option<Qualifier>,
    kind: DependencyKind,
}

impl Dependency {
    /// An eagerly resolved dependency on `T`.
    pub fn instance<T: ?Sized + 'static>() -> Self {
        Self { key: Key::of::<T>(), qualifier: None, kind: DependencyKind::Instance }
    }

    /// A deferred dependency on `T`.
    pub fn provider<T: ?Sized + 'static>() -> Self {
        Self { key: Key::of::<T>(), qualifier: None, kind: DependencyKind::Provider }
    }

    /// Restricts the dependency to components carrying `qualifier`.
    pub fn qualified(mut self, qualifier: impl Into<Qualifier>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn qualifier(&self) -> Option<&Qualifier> {
        self.qualifier.as_ref()
    }

    pub fn kind(&self) -> DependencyKind {
        self.kind
    }
}

/// A registered unit of construction.
///
/// Definitions are immutable once registered. Build one with
/// [`ComponentDefinition::singleton`] or [`ComponentDefinition::prototype`]
/// and pass the builder (or the finished definition) to
/// [`Registry::register`](crate::Registry::register).
pub struct ComponentDefinition {
    key: Key,
    name: Cow<'static, str>,
    lifetime: Lifetime,
    qualifier: Option<Qualifier>,
    primary: bool,
    dependencies: Vec<Dependency>,
    pub(crate) ctor: Constructor,
    pub(crate) post_construct: Option<Hook>,
    pub(crate) pre_destroy: Option<Hook>,
}

impl ComponentDefinition {
    /// Starts a singleton definition for capability `T`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use wirebox::{ComponentDefinition, Registry, Resolver};
    ///
    /// trait MemberRepository: Send + Sync {
    ///     fn name_of(&self, id: u64) -> Option<String>;
    /// }
    ///
    /// struct MemoryMemberRepository;
    /// impl MemberRepository for MemoryMemberRepository {
    ///     fn name_of(&self, id: u64) -> Option<String> {
    ///         (id == 1).then(|| "memberA".to_string())
    ///     }
    /// }
    ///
    /// struct MemberService {
    ///     repository: Arc<dyn MemberRepository>,
    /// }
    ///
    /// let mut registry = Registry::new();
    /// registry.register(ComponentDefinition::singleton::<dyn MemberRepository, _>(|_| {
    ///     Ok(Arc::new(MemoryMemberRepository) as Arc<dyn MemberRepository>)
    /// }))?;
    /// registry.register(
    ///     ComponentDefinition::singleton::<MemberService, _>(|args| {
    ///         Ok(Arc::new(MemberService { repository: args.next()? }))
    ///     })
    ///     .depends_on::<dyn MemberRepository>(),
    /// )?;
    ///
    /// let container = registry.build();
    /// let service = container.resolve::<MemberService>()?;
    /// assert_eq!(service.repository.name_of(1).as_deref(), Some("memberA"));
    /// # Ok::<(), wirebox::DiError>(())
    /// ```
    pub fn singleton<T, F>(ctor: F) -> DefinitionBuilder<T>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&mut Args) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        DefinitionBuilder::new(Lifetime::Singleton, ctor)
    }

    /// Starts a prototype definition for capability `T`.
    pub fn prototype<T, F>(ctor: F) -> DefinitionBuilder<T>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&mut Args) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        DefinitionBuilder::new(Lifetime::Prototype, ctor)
    }

    /// Starts a definition with an explicit lifetime.
    pub fn with_lifetime<T, F>(lifetime: Lifetime, ctor: F) -> DefinitionBuilder<T>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&mut Args) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        DefinitionBuilder::new(lifetime, ctor)
    }

    /// The capability this component provides.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Diagnostic name, defaults to the capability type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn qualifier(&self) -> Option<&Qualifier> {
        self.qualifier.as_ref()
    }

    /// Whether this is the default among several unqualified candidates.
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// Dependencies in declaration order.
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn has_post_construct(&self) -> bool {
        self.post_construct.is_some()
    }

    pub fn has_pre_destroy(&self) -> bool {
        self.pre_destroy.is_some()
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("lifetime", &self.lifetime)
            .field("qualifier", &self.qualifier)
            .field("primary", &self.primary)
            .field("dependencies", &self.dependencies)
            .field("post_construct", &self.post_construct.is_some())
            .field("pre_destroy", &self.pre_destroy.is_some())
            .finish()
    }
}

/// Typed builder for a [`ComponentDefinition`] of capability `T`.
///
/// The builder keeps `T` so lifecycle hooks can be written against the
/// capability type; the finished definition is type-erased.
pub struct DefinitionBuilder<T: ?Sized> {
    definition: ComponentDefinition,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T> DefinitionBuilder<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    fn new<F>(lifetime: Lifetime, ctor: F) -> Self
    where
        F: Fn(&mut Args) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        let ctor: Constructor = Arc::new(move |args: &mut Args| ctor(args).map(erase::<T>));
        Self {
            definition: ComponentDefinition {
                key: Key::of::<T>(),
                name: Cow::Borrowed(std::any::type_name::<T>()),
                lifetime,
                qualifier: None,
                primary: false,
                dependencies: Vec::new(),
                ctor,
                post_construct: None,
                pre_destroy: None,
            },
            _marker: PhantomData,
        }
    }

    /// Overrides the diagnostic name.
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.definition.name = name.into();
        self
    }

    /// Tags the component with a qualifier.
    pub fn qualifier(mut self, qualifier: impl Into<Qualifier>) -> Self {
        self.definition.qualifier = Some(qualifier.into());
        self
    }

    /// Marks the component as the default when several share the capability.
    pub fn primary(mut self) -> Self {
        self.definition.primary = true;
        self
    }

    /// Appends an eagerly resolved dependency on `D`.
    pub fn depends_on<D: ?Sized + 'static>(self) -> Self {
        self.dependency(Dependency::instance::<D>())
    }

    /// Appends an eagerly resolved dependency on the `D` tagged `qualifier`.
    pub fn depends_on_qualified<D: ?Sized + 'static>(self, qualifier: impl Into<Qualifier>) -> Self {
        self.dependency(Dependency::instance::<D>().qualified(qualifier))
    }

    /// Appends a deferred dependency: the constructor receives a `Provider<D>`.
    pub fn provider_of<D: ?Sized + 'static>(self) -> Self {
        self.dependency(Dependency::provider::<D>())
    }

    /// Appends a deferred dependency on the `D` tagged `qualifier`.
    pub fn provider_of_qualified<D: ?Sized + 'static>(self, qualifier: impl Into<Qualifier>) -> Self {
        self.dependency(Dependency::provider::<D>().qualified(qualifier))
    }

    /// Appends a prepared dependency specification.
    pub fn dependency(mut self, dependency: Dependency) -> Self {
        self.definition.dependencies.push(dependency);
        self
    }

    /// Hook run right after construction. An error or a panic aborts the
    /// lookup with [`DiError::InitializationFailed`] and the instance is
    /// discarded.
    pub fn post_construct<F>(mut self, hook: F) -> Self
    where
        F: Fn(&T) -> HookResult + Send + Sync + 'static,
    {
        self.definition.post_construct = Some(typed_hook(hook));
        self
    }

    /// Hook run once per cached singleton at teardown.
    pub fn pre_destroy<F>(mut self, hook: F) -> Self
    where
        F: Fn(&T) -> HookResult + Send + Sync + 'static,
    {
        self.definition.pre_destroy = Some(typed_hook(hook));
        self
    }

    /// Uses [`Lifecycle::init`] and [`Lifecycle::destroy`] as the hooks.
    pub fn with_lifecycle(self) -> Self
    where
        T: Lifecycle,
    {
        self.post_construct(|component: &T| component.init())
            .pre_destroy(|component: &T| component.destroy())
    }

    /// Finishes the definition.
    pub fn build(self) -> ComponentDefinition {
        self.definition
    }
}

impl<T: ?Sized> From<DefinitionBuilder<T>> for ComponentDefinition {
    fn from(builder: DefinitionBuilder<T>) -> Self {
        builder.definition
    }
}

fn typed_hook<T, F>(hook: F) -> Hook
where
    T: ?Sized + Send + Sync + 'static,
    F: Fn(&T) -> HookResult + Send + Sync + 'static,
{
    Arc::new(move |any: &AnyArc| match any.downcast_ref::<Arc<T>>() {
        Some(instance) => hook(instance),
        None => Err(DiError::TypeMismatch { expected: std::any::type_name::<T>() }.into()),
    })
}
