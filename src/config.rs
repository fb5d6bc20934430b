//! Container start-up options.

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Options consumed by [`Registry::start`](crate::Registry::start).
///
/// The defaults match a conventional application context: the wiring is
/// validated and every singleton is created before the container is handed
/// out.
///
/// ```rust
/// use wirebox::ContainerOptions;
///
/// let options = ContainerOptions::default();
/// assert!(options.eager_singletons);
/// assert!(options.validate_on_start);
///
/// let lazy = ContainerOptions::lazy();
/// assert!(!lazy.eager_singletons);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    /// Create all singletons at start, in registration order
    pub eager_singletons: bool,
    /// Run [`Registry::validate`](crate::Registry::validate) before anything is constructed
    pub validate_on_start: bool,
}

impl ContainerOptions {
    /// No validation, no eager construction.
    pub fn lazy() -> Self {
        Self {
            eager_singletons: false,
            validate_on_start: false,
        }
    }

    pub fn eager_singletons(mut self, eager: bool) -> Self {
        self.eager_singletons = eager;
        self
    }

    pub fn validate_on_start(mut self, validate: bool) -> Self {
        self.validate_on_start = validate;
        self
    }

    /// Parses options from JSON; missing fields keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            eager_singletons: true,
            validate_on_start: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_methods_override_defaults() {
        let options = ContainerOptions::default().eager_singletons(false);
        assert_eq!(
            options,
            ContainerOptions { eager_singletons: false, validate_on_start: true }
        );
    }

    #[cfg(feature = "config")]
    #[test]
    fn json_fills_missing_fields_from_defaults() {
        let options = ContainerOptions::from_json(r#"{ "eager_singletons": false }"#).unwrap();
        assert!(!options.eager_singletons);
        assert!(options.validate_on_start);
    }
}
