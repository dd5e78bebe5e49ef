//! Identifier management using string interning for efficient storage and comparison
//!
//! This module provides the [`Id`] type used for elements, relationships,
//! clusters and diagrams.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use serde::{Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for identifier storage.
///
/// The interner is append-only, so identifiers created while optimizing one
/// diagram never affect another.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Opaque identifier backed by an interned string.
///
/// `Id` is `Copy`, cheap to hash and compares by symbol.
///
/// # Examples
///
/// ```
/// use archgraph_core::identifier::Id;
///
/// let system = Id::new("system");
/// let billing = Id::new("Billing");
///
/// let nested = system.create_nested(billing);
/// assert_eq!(nested, "system::Billing");
///
/// let rel = Id::from_sequence("rel", 3);
/// assert_eq!(rel, "rel_3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from its string representation.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Creates a sequential identifier such as `rel_0` or `cluster_4`.
    pub fn from_sequence(prefix: &str, idx: usize) -> Self {
        Self::new(&format!("{prefix}_{idx}"))
    }

    /// Creates a nested ID by combining this ID and a child ID with a `::` separator.
    pub fn create_nested(&self, child_id: Id) -> Self {
        let mut interner = interner();
        let parent_str = interner
            .resolve(self.0)
            .map(str::to_owned)
            .unwrap_or_default();
        let child_str = interner.resolve(child_id.0).unwrap_or_default();
        let nested_name = format!("{parent_str}::{child_str}");
        Self(interner.get_or_intern(nested_name))
    }

    /// Returns an owned copy of the string this identifier stands for.
    pub fn as_string(&self) -> String {
        interner().resolve(self.0).unwrap_or_default().to_owned()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.as_string();
        f.write_str(&value)
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        interner().resolve(self.0) == Some(other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_string())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_new_interns_equal_strings() {
        let id1 = Id::new("Services Component");
        let id2 = Id::new("Services Component");
        let id3 = Id::new("Models Component");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(id1, "Services Component");
    }

    #[test]
    fn test_from_sequence() {
        assert_eq!(Id::from_sequence("rel", 0), "rel_0");
        assert_ne!(Id::from_sequence("rel", 0), Id::from_sequence("rel", 1));
        assert_eq!(Id::from_sequence("cluster", 2), Id::new("cluster_2"));
    }

    #[test]
    fn test_create_nested() {
        let kind = Id::new("container");
        let nested = kind.create_nested(Id::new("Postgresql Database"));

        assert_eq!(nested, "container::Postgresql Database");
        assert_eq!(
            nested.create_nested(Id::new("x")),
            "container::Postgresql Database::x"
        );
    }

    #[test]
    fn test_display_and_hash() {
        let id = Id::new("display_test");
        assert_eq!(format!("{id}"), "display_test");

        let mut map = HashMap::new();
        map.insert(id, 1);
        assert_eq!(map.get(&Id::new("display_test")), Some(&1));
    }

    #[test]
    fn test_partial_eq_str() {
        let id = Id::new("Web Frontend");
        assert!(id == "Web Frontend");
        assert!(id != "Web");

        let empty = Id::new("");
        assert!(empty == "");
    }
}
