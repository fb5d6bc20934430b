//! Component registration.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::config::ContainerOptions;
use crate::container::Container;
use crate::definition::ComponentDefinition;
use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::validation::{self, ValidationReport};

/// Definitions in registration order, indexed by capability.
pub(crate) struct Catalog {
    definitions: Vec<ComponentDefinition>,
    by_key: HashMap<Key, Vec<usize>>,
}

impl Catalog {
    fn new() -> Self {
        Self {
            definitions: Vec::new(),
            by_key: HashMap::new(),
        }
    }

    fn insert(&mut self, definition: ComponentDefinition) -> DiResult<usize> {
        let candidates = self.by_key.entry(*definition.key()).or_default();
        if let Some(qualifier) = definition.qualifier() {
            let taken = candidates
                .iter()
                .any(|&i| self.definitions[i].qualifier() == Some(qualifier));
            if taken {
                return Err(DiError::DuplicateDefinition {
                    capability: definition.key().display_name(),
                    qualifier: qualifier.clone(),
                });
            }
        }

        let index = self.definitions.len();
        candidates.push(index);
        self.definitions.push(definition);
        Ok(index)
    }

    /// Indices of the definitions advertising `key`, in registration order.
    pub(crate) fn candidates(&self, key: &Key) -> &[usize] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn get(&self, index: usize) -> &ComponentDefinition {
        &self.definitions[index]
    }

    pub(crate) fn definitions_for(&self, key: &Key) -> Vec<&ComponentDefinition> {
        self.candidates(key).iter().map(|&i| &self.definitions[i]).collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &ComponentDefinition)> {
        self.definitions.iter().enumerate()
    }

    pub(crate) fn len(&self) -> usize {
        self.definitions.len()
    }
}

/// Mutable set of component definitions.
///
/// Register every component here, then turn the registry into a
/// [`Container`] with [`build`](Registry::build) (lazy) or
/// [`start`](Registry::start) (validated, singletons created up front).
/// Registration is only possible before the container exists.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use wirebox::{ComponentDefinition, ContainerOptions, Registry, Resolver};
///
/// struct Config { port: u16 }
/// struct Server { config: Arc<Config> }
///
/// let mut registry = Registry::new();
/// registry
///     .register(ComponentDefinition::singleton::<Config, _>(|_| Ok(Arc::new(Config { port: 8080 }))))?
///     .register(
///         ComponentDefinition::singleton::<Server, _>(|args| Ok(Arc::new(Server { config: args.next()? })))
///             .depends_on::<Config>(),
///     )?;
///
/// let container = registry.start(&ContainerOptions::default())?;
/// assert_eq!(container.resolve::<Server>()?.config.port, 8080);
/// container.teardown();
/// # Ok::<(), wirebox::DiError>(())
/// ```
pub struct Registry {
    catalog: Catalog,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self { catalog: Catalog::new() }
    }

    /// Adds a definition.
    ///
    /// Fails with [`DiError::DuplicateDefinition`] when a definition with the
    /// same capability and the same qualifier is already registered. Several
    /// unqualified definitions of one capability are accepted; resolving the
    /// capability without a qualifier then needs a `primary` one.
    pub fn register(&mut self, definition: impl Into<ComponentDefinition>) -> DiResult<&mut Self> {
        let definition = definition.into();
        let index = self.catalog.insert(definition)?;
        let definition = self.catalog.get(index);
        debug!(
            component = %definition.name(),
            capability = definition.key().display_name(),
            lifetime = %definition.lifetime(),
            qualifier = definition.qualifier().map(|q| q.as_str()),
            "registered component"
        );
        Ok(self)
    }

    /// All definitions advertising capability `T`, in registration order.
    pub fn definitions_for<T: ?Sized + 'static>(&self) -> Vec<&ComponentDefinition> {
        self.catalog.definitions_for(&Key::of::<T>())
    }

    /// All definitions advertising `key`, in registration order.
    pub fn definitions_for_key(&self, key: &Key) -> Vec<&ComponentDefinition> {
        self.catalog.definitions_for(key)
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.len() == 0
    }

    /// Checks the wiring without constructing anything.
    pub fn validate(&self) -> ValidationReport {
        validation::validate(&self.catalog)
    }

    /// Builds a lazy container: nothing is validated or constructed until
    /// the first lookup.
    pub fn build(self) -> Container {
        Container::new(self.catalog)
    }

    #[cfg(test)]
    pub(crate) fn into_catalog(self) -> Catalog {
        self.catalog
    }

    /// Builds a container according to `options`.
    ///
    /// With `validate_on_start` the first wiring issue is returned before any
    /// construction. With `eager_singletons` every singleton is created in
    /// registration order; if one fails, the singletons created so far are
    /// torn down and the error is returned.
    pub fn start(self, options: &ContainerOptions) -> DiResult<Container> {
        if options.validate_on_start {
            self.validate().into_result()?;
        }

        let components = self.catalog.len();
        let container = Container::new(self.catalog);
        if options.eager_singletons {
            if let Err(err) = container.preinstantiate_singletons() {
                container.teardown();
                return Err(err);
            }
        }

        info!(components, eager = options.eager_singletons, "container started");
        Ok(container)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    trait Policy: Send + Sync {}
    struct Fixed;
    impl Policy for Fixed {}

    fn policy() -> crate::definition::DefinitionBuilder<dyn Policy> {
        ComponentDefinition::singleton::<dyn Policy, _>(|_| Ok(Arc::new(Fixed) as Arc<dyn Policy>))
    }

    #[test]
    fn duplicate_qualifier_is_rejected() {
        let mut registry = Registry::new();
        registry.register(policy().qualifier("fix")).unwrap();

        let err = registry.register(policy().qualifier("fix")).err().expect("duplicate must be rejected");
        assert!(matches!(err, DiError::DuplicateDefinition { ref qualifier, .. } if qualifier.as_str() == "fix"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unqualified_duplicates_are_competing_defaults() {
        let mut registry = Registry::new();
        registry.register(policy()).unwrap();
        registry.register(policy()).unwrap();
        registry.register(policy().qualifier("rate")).unwrap();

        assert_eq!(registry.definitions_for::<dyn Policy>().len(), 3);
        assert!(registry.definitions_for::<String>().is_empty());
    }

    #[test]
    fn lookup_by_key_matches_typed_lookup() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());

        registry.register(policy().named("fixed")).unwrap();
        assert!(!registry.is_empty());

        let by_key = registry.definitions_for_key(&Key::of::<dyn Policy>());
        assert_eq!(by_key.len(), 1);
        assert_eq!(by_key[0].name(), "fixed");
        assert_eq!(registry.definitions_for::<dyn Policy>()[0].key(), by_key[0].key());
    }

    #[test]
    fn same_qualifier_on_different_capabilities_is_fine() {
        struct Other;
        let mut registry = Registry::new();
        registry.register(policy().qualifier("main")).unwrap();
        registry
            .register(ComponentDefinition::singleton::<Other, _>(|_| Ok(Arc::new(Other))).qualifier("main"))
            .unwrap();
        assert_eq!(registry.len(), 2);
    }
}
