//! # Artisan Common
//!
//! Common types and shared abstractions for Project Artisan.
//!
//! This crate provides foundational types used across all Artisan subsystems:
//! - ID types (ItemId, WeaponId, ArmorId, ResourceId, CurrencyId, CategoryTag)
//! - Version information for schemas
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod ids;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::version::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_id_ordering_is_stable() {
        let mut ids = vec![
            ResourceId::armor(1),
            ResourceId::item(2),
            ResourceId::weapon(1),
            ResourceId::item(1),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                ResourceId::item(1),
                ResourceId::item(2),
                ResourceId::weapon(1),
                ResourceId::armor(1),
            ]
        );
    }

    #[test]
    fn test_version_compatibility() {
        let v1 = SchemaVersion::new(1, 0, 0);
        let v2 = SchemaVersion::new(1, 1, 0);
        let v3 = SchemaVersion::new(2, 0, 0);

        // v2 can read v1 data (newer version reading older data)
        assert!(v2.is_compatible_with(&v1));
        // Different major versions are incompatible
        assert!(!v1.is_compatible_with(&v3));
        assert!(v1.can_read(&v2));
        assert!(!v3.can_read(&v1));
    }

    #[test]
    fn test_version_parse_round_trip() {
        let v: SchemaVersion = "1.2.3".parse().unwrap();
        assert_eq!(v, SchemaVersion::new(1, 2, 3));
        assert_eq!(v.to_string(), "1.2.3");

        assert!("1.2".parse::<SchemaVersion>().is_err());
        assert!("1.2.3.4".parse::<SchemaVersion>().is_err());
        assert!("one.two.three".parse::<SchemaVersion>().is_err());
    }

    #[test]
    fn test_category_tag_display() {
        let tag = CategoryTag::new("Cooking");
        assert_eq!(tag.to_string(), "Cooking");
        assert_eq!(tag.as_str(), "Cooking");
    }
}
