//! ID types for resources, currencies and generic categories.

use serde::{Deserialize, Serialize};

/// Unique identifier for an item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(u32);

impl ItemId {
    /// Creates an item ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Unique identifier for a weapon type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeaponId(u32);

impl WeaponId {
    /// Creates a weapon ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Unique identifier for an armor type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArmorId(u32);

impl ArmorId {
    /// Creates an armor ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// A concrete, countable resource: the key type for ledger storage.
///
/// Currency pools and generic categories are not `ResourceId`s — they are
/// resolved to amounts or to sets of concrete resources at lookup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceId {
    /// An item type.
    Item(ItemId),
    /// A weapon type.
    Weapon(WeaponId),
    /// An armor type.
    Armor(ArmorId),
}

impl ResourceId {
    /// Convenience constructor for an item resource.
    #[must_use]
    pub const fn item(id: u32) -> Self {
        Self::Item(ItemId::new(id))
    }

    /// Convenience constructor for a weapon resource.
    #[must_use]
    pub const fn weapon(id: u32) -> Self {
        Self::Weapon(WeaponId::new(id))
    }

    /// Convenience constructor for an armor resource.
    #[must_use]
    pub const fn armor(id: u32) -> Self {
        Self::Armor(ArmorId::new(id))
    }
}

/// Name of a currency pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CurrencyId(String);

impl CurrencyId {
    /// Creates a currency ID from a pool name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the pool name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Tag identifying a generic item category.
///
/// Concrete resources declare membership in zero or more categories; a
/// requirement referencing a tag is satisfiable by any member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryTag(String);

impl CategoryTag {
    /// Creates a category tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the tag text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
