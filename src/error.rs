//! Error types for the container.

use std::sync::Arc;

use thiserror::Error;

use crate::key::Qualifier;

/// Error returned by a lifecycle hook.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for lifecycle hooks.
pub type HookResult = Result<(), HookError>;

/// Container errors
///
/// Every variant except [`DiError::Disposed`] describes a wiring defect in the
/// registration graph. None of them are transient, so the container never
/// retries.
///
/// # Examples
///
/// ```rust
/// use wirebox::{DiError, Registry, Resolver};
///
/// let container = Registry::new().build();
/// match container.resolve::<String>() {
///     Err(DiError::NoSuchComponent { capability, .. }) => {
///         assert_eq!(capability, "alloc::string::String");
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// No definition provides the capability (after applying the qualifier)
    #[error("no component provides {capability}{}", describe(.qualifier))]
    NoSuchComponent {
        capability: &'static str,
        qualifier: Option<Qualifier>,
    },
    /// Several definitions match and the qualifier did not pick one
    #[error(
        "ambiguous dependency {capability}{}: candidates [{}]",
        describe(.qualifier),
        .candidates.join(", ")
    )]
    AmbiguousDependency {
        capability: &'static str,
        qualifier: Option<Qualifier>,
        candidates: Vec<String>,
    },
    /// Capability and qualifier already registered
    #[error("duplicate definition for {capability} qualified '{qualifier}'")]
    DuplicateDefinition {
        capability: &'static str,
        qualifier: Qualifier,
    },
    /// Construction re-entered a definition already being built (includes path)
    #[error("cyclic dependency: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),
    /// Post-construct hook failed
    #[error("initialization of {component} failed: {source}")]
    InitializationFailed {
        component: String,
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync + 'static>,
    },
    /// A value could not be downcast to the requested capability
    #[error("type mismatch: expected {expected}")]
    TypeMismatch { expected: &'static str },
    /// The container was torn down or dropped
    #[error("container has been disposed")]
    Disposed,
}

impl DiError {
    /// Wraps a failure raised while building `component`.
    pub fn initialization_failed(component: &str, source: HookError) -> Self {
        DiError::InitializationFailed {
            component: component.to_string(),
            source: Arc::from(source),
        }
    }
}

fn describe(qualifier: &Option<Qualifier>) -> String {
    match qualifier {
        Some(q) => format!(" qualified '{}'", q),
        None => String::new(),
    }
}

/// Result type for container operations
pub type DiResult<T> = Result<T, DiError>;
