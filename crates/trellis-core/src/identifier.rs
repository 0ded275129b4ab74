//! Identifier management using string interning for efficient string storage and comparison
//!
//! Node identifiers handed out by a persistence backend are opaque strings.
//! This module interns them into the [`Id`] type so they can be copied,
//! hashed and compared cheaply by the diagram model.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for efficient identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    f(&mut interner)
}

/// Efficient identifier type using string interning
///
/// # Examples
///
/// ```
/// use trellis_core::identifier::Id;
///
/// let alice = Id::new("k57a3bq9x0");
/// let generated = Id::from_sequence(7);
///
/// assert_eq!(alice, "k57a3bq9x0");
/// assert_eq!(generated, "staff-7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    ///
    /// # Arguments
    ///
    /// * `name` - The string representation of the identifier
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Creates a locally generated identifier for a freshly created node.
    ///
    /// # Arguments
    ///
    /// * `idx` - A sequence number, unique within the owning diagram.
    pub fn from_sequence(idx: usize) -> Self {
        Self::new(&format!("staff-{idx}"))
    }

    /// Returns the interned string of this identifier.
    pub fn as_string(self) -> String {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                .to_string()
        })
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl std::str::FromStr for Id {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    /// Creates an `Id` from a string slice
    ///
    /// This is a convenience implementation that calls `Id::new`.
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| interner.resolve(self.0) == Some(other))
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

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let id1 = Id::new("j97abc");
        let id2 = Id::new("j97abc");
        let id3 = Id::new("j97xyz");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(id1, "j97abc");
    }

    #[test]
    fn test_from_sequence() {
        let id1 = Id::from_sequence(0);
        let id2 = Id::from_sequence(1);
        let id3 = Id::from_sequence(0);

        assert_ne!(id1, id2);
        assert_eq!(id1, id3);
        assert_eq!(id2, "staff-1");
    }

    #[test]
    fn test_display_trait() {
        let id = Id::new("display_test");
        assert_eq!(format!("{}", id), "display_test");
    }

    #[test]
    fn test_from_trait() {
        let id1: Id = "test_string".into();
        let id2 = Id::new("test_string");

        assert_eq!(id1, id2);
    }

    #[test]
    fn test_hash_and_eq() {
        use std::collections::HashMap;

        let id1 = Id::new("key1");
        let id2 = Id::new("key1");
        let id3 = Id::new("key2");

        let mut map = HashMap::new();
        map.insert(id1, "value1");
        map.insert(id3, "value2");

        assert_eq!(map.get(&id2), Some(&"value1"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_partial_eq_str() {
        let id = Id::new("Manager");

        assert!(id == "Manager");
        assert!(id != "Director");

        let empty = Id::new("");
        assert!(empty == "");
    }

    #[test]
    fn test_serde_as_plain_string() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            id: Id,
        }

        let text = toml::to_string(&Wrapper {
            id: Id::new("staff-42"),
        })
        .unwrap();
        assert_eq!(text.trim(), r#"id = "staff-42""#);

        let parsed: Wrapper = toml::from_str(&text).unwrap();
        assert_eq!(parsed.id, "staff-42");
    }
}
