//! Identifier management using string interning for efficient storage and comparison
//!
//! Node ids are compared and hashed on every layout pass, so they are interned
//! once and passed around as a `Copy` symbol.

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
        .expect("Failed to acquire interner lock")
}

/// Efficient identifier type using string interning
///
/// # Examples
///
/// ```
/// use agentmap_core::identifier::Id;
///
/// let category = Id::new("skills");
/// let member = Id::new("web-search");
///
/// let nested = category.create_nested(member);
/// assert_eq!(nested, "skills::web-search");
/// assert!(nested.starts_with("skills::"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Creates a nested ID by combining parent ID and child ID with '::' separator.
    ///
    /// # Examples
    ///
    /// ```
    /// use agentmap_core::identifier::Id;
    ///
    /// let skill = Id::new("skills::web-search");
    /// let provider = skill.create_nested(Id::new("provider"));
    /// assert_eq!(provider, "skills::web-search::provider");
    /// ```
    pub fn create_nested(&self, child_id: Id) -> Self {
        let mut interner = interner();
        let parent_str = interner
            .resolve(self.0)
            .expect("Parent ID should exist in interner");
        let child_str = interner
            .resolve(child_id.0)
            .expect("Child ID should exist in interner");
        let nested_name = format!("{parent_str}::{child_str}");
        Self(interner.get_or_intern(&nested_name))
    }

    /// Returns true if this id contains the `::` separator.
    pub fn is_nested(&self) -> bool {
        interner()
            .resolve(self.0)
            .is_some_and(|name| name.contains("::"))
    }

    /// Returns true if the string form of this id begins with `prefix`.
    pub fn starts_with(&self, prefix: &str) -> bool {
        interner()
            .resolve(self.0)
            .is_some_and(|name| name.starts_with(prefix))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = interner();
        let str_value = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        write!(f, "{str_value}")
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        interner()
            .resolve(self.0)
            .is_some_and(|name| name == other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(&name))
    }
}
