//! Capability keys and qualifiers.

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Key identifying a capability.
///
/// A capability is any `'static` type a component is looked up by: a concrete
/// struct or a trait object such as `dyn DiscountPolicy`. The `TypeId` decides
/// equality; the type name is kept for diagnostics only.
///
/// # Examples
///
/// ```rust
/// use wirebox::Key;
///
/// trait Policy: Send + Sync {}
///
/// let key = Key::of::<dyn Policy>();
/// assert_eq!(key, Key::of::<dyn Policy>());
/// assert_ne!(key, Key::of::<String>());
/// assert!(key.display_name().ends_with("Policy"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Key {
    id: TypeId,
    name: &'static str,
}

impl Key {
    /// Key for the capability `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The `TypeId` of the capability.
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// The capability type name, for diagnostics.
    pub fn display_name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Disambiguating tag for components sharing a capability.
///
/// Matching is exact string equality.
///
/// ```rust
/// use wirebox::Qualifier;
///
/// let main: Qualifier = "mainDiscountPolicy".into();
/// assert_eq!(main, Qualifier::new("mainDiscountPolicy"));
/// assert_ne!(main, Qualifier::new("maindiscountpolicy"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Qualifier(Cow<'static, str>);

impl Qualifier {
    /// Creates a qualifier from a static or owned string.
    pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
        Self(tag.into())
    }

    /// The tag text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Qualifier {
    fn from(tag: &'static str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for Qualifier {
    fn from(tag: String) -> Self {
        Self::new(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    trait Greeter: Send + Sync {}

    #[test]
    fn trait_object_and_concrete_keys_differ() {
        struct English;
        assert_ne!(Key::of::<dyn Greeter>(), Key::of::<English>());
    }

    #[test]
    fn keys_hash_by_type_id() {
        let mut set = HashSet::new();
        set.insert(Key::of::<u32>());
        set.insert(Key::of::<u32>());
        set.insert(Key::of::<dyn Greeter>());
        assert_eq!(set.len(), 2);
        assert_eq!(Key::of::<u32>().type_id(), TypeId::of::<u32>());
    }

    #[test]
    fn owned_and_static_qualifiers_compare_equal() {
        assert_eq!(Qualifier::from("fast"), Qualifier::from(String::from("fast")));
        assert_eq!(Qualifier::new("fast").as_str(), "fast");
    }
}
