//! Identifier management using string interning for efficient string storage and comparison
//!
//! This module provides the [`Id`] type with an efficient string-interner based approach,
//! and the [`gen_id!`](crate::gen_id) macro used to derive identifiers of generated resources.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for efficient identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Efficient resource identifier type using string interning
///
/// Every resource of a model is keyed by one of these. Comparing, hashing and
/// copying an `Id` never touches the underlying string.
///
/// # Examples
///
/// ```
/// use apinatomy_core::identifier::Id;
///
/// let lyph = Id::new("L1");
/// let subtype = Id::new("S1");
///
/// // Generated identifiers join their parts with '_'
/// let layer = lyph.join(subtype);
/// assert_eq!(layer, "L1_S1");
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
        Self(interner().get_or_intern(name))
    }

    /// Creates an identifier for a generated resource from a class prefix and a counter.
    ///
    /// # Examples
    ///
    /// ```
    /// use apinatomy_core::identifier::Id;
    ///
    /// let id = Id::from_counter("lnk", 7);
    /// assert_eq!(id, "lnk_7");
    /// ```
    pub fn from_counter(prefix: &str, idx: usize) -> Self {
        Self::new(&format!("{prefix}_{idx}"))
    }

    /// Creates a new ID by combining this ID and another with the '_' separator.
    pub fn join(&self, other: Id) -> Self {
        let mut interner = interner();
        let joined = match (interner.resolve(self.0), interner.resolve(other.0)) {
            (Some(left), Some(right)) => format!("{left}_{right}"),
            (Some(left), None) => left.to_string(),
            (None, Some(right)) => right.to_string(),
            (None, None) => String::new(),
        };
        Self(interner.get_or_intern(joined))
    }

    /// Creates a new ID by prefixing this ID with `prefix` and no separator.
    ///
    /// Used for the synthesized endpoints of generated axes (`s<lyph>`, `t<lyph>`).
    pub fn prefixed(&self, prefix: &str) -> Self {
        Self::new(&format!("{prefix}{self}"))
    }

    /// Creates a new ID by appending `suffix` to this ID with no separator.
    pub fn suffixed(&self, suffix: &str) -> Self {
        Self::new(&format!("{self}{suffix}"))
    }

    /// Returns `true` if the identifier has no characters.
    pub fn is_empty(&self) -> bool {
        interner().resolve(self.0).is_none_or(str::is_empty)
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new("")
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = interner().resolve(self.0).map(str::to_string);
        write!(f, "{}", value.unwrap_or_default())
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

impl From<&String> for Id {
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
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
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(&name))
    }
}

/// Builds the identifier of a generated resource by joining the display form
/// of every part with `_`.
///
/// # Examples
///
/// ```
/// use apinatomy_core::{gen_id, identifier::Id};
///
/// let chain = Id::new("C1");
/// assert_eq!(gen_id!(chain, "node", 2), "C1_node_2");
/// ```
#[macro_export]
macro_rules! gen_id {
    ($($part:expr),+ $(,)?) => {
        $crate::identifier::Id::new(&[$($part.to_string()),+].join("_"))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_equality_and_display() {
        let a = Id::new("lyph1");
        let b: Id = "lyph1".into();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "lyph1");
        assert!(a == "lyph1");
    }

    #[test]
    fn test_join_and_prefix() {
        let layer = Id::new("L2").join(Id::new("S1"));
        assert_eq!(layer, "L2_S1");
        assert_eq!(Id::new("lyph").prefixed("s"), "slyph");
        assert_eq!(Id::new("lyph").suffixed("-lnk"), "lyph-lnk");
    }

    #[test]
    fn test_gen_id_macro() {
        let chain = Id::new("C1");
        assert_eq!(gen_id!(chain, "lnk", 1), "C1_lnk_1");
        assert_eq!(gen_id!("s", "b_0"), "s_b_0");
    }

    #[test]
    fn test_serde_as_string() {
        let id = Id::new("n0");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"n0\"");
        let back: Id = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_empty_default() {
        assert!(Id::default().is_empty());
        assert!(!Id::new("x").is_empty());
    }
}
