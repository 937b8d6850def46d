//! Crafting persistence.
//!
//! Only the recipe state collection survives save/load; definitions are
//! rebuilt from the catalog. The blob is magic-byte framed and carries a
//! schema version checked on read.

use artisan_common::{MagicBytes, SchemaVersion};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::book::{RecipeBook, RecipeState};

/// Errors that can occur during crafting persistence.
#[derive(Debug, Error)]
pub enum CraftSaveError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// The blob does not start with the expected magic bytes.
    #[error("Not a crafting save blob")]
    BadMagic,

    /// Version mismatch.
    #[error("Incompatible crafting save version: expected {expected}, found {found}")]
    VersionMismatch {
        /// Version this build reads.
        expected: SchemaVersion,
        /// Version found in the blob.
        found: SchemaVersion,
    },

    /// Truncated or otherwise unusable data.
    #[error("Corrupted crafting data: {0}")]
    Corrupted(String),
}

/// Result type for crafting save operations.
pub type CraftSaveResult<T> = Result<T, CraftSaveError>;

/// Serialized crafting state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CraftSave {
    /// Format version of the blob.
    pub version: SchemaVersion,
    /// All recipe states at save time.
    pub states: Vec<RecipeState>,
}

impl CraftSave {
    /// Snapshot a book into a save payload.
    #[must_use]
    pub fn from_book(book: &RecipeBook) -> Self {
        Self {
            version: SchemaVersion::CRAFT_SAVE,
            states: book.states().cloned().collect(),
        }
    }

    /// Encode into a framed blob.
    pub fn encode(&self) -> CraftSaveResult<Vec<u8>> {
        let mut bytes = Vec::from(MagicBytes::SAVE.0);
        bincode::serialize_into(&mut bytes, self)?;
        debug!(states = self.states.len(), size = bytes.len(), "crafting save encoded");
        Ok(bytes)
    }

    /// Decode a framed blob, checking magic and version.
    pub fn decode(bytes: &[u8]) -> CraftSaveResult<Self> {
        if bytes.len() < 4 {
            return Err(CraftSaveError::Corrupted("blob shorter than header".into()));
        }
        let (magic, payload) = bytes.split_at(4);
        if magic != &MagicBytes::SAVE.0[..] {
            return Err(CraftSaveError::BadMagic);
        }
        let save: Self = bincode::deserialize(payload)?;
        if !SchemaVersion::CRAFT_SAVE.can_read(&save.version) {
            return Err(CraftSaveError::VersionMismatch {
                expected: SchemaVersion::CRAFT_SAVE,
                found: save.version,
            });
        }
        Ok(save)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book() -> RecipeBook {
        let mut book = RecipeBook::new();
        let mut potion = RecipeState::new("Potion", true);
        potion.times_crafted = 4;
        potion.description = Some("strong stuff".into());
        book.merge_saved([potion, RecipeState::new("Elixir", false)]);
        book
    }

    #[test]
    fn test_round_trip() {
        let book = sample_book();
        let blob = CraftSave::from_book(&book).encode().unwrap();
        let restored = CraftSave::decode(&blob).unwrap();

        let mut book2 = RecipeBook::new();
        book2.merge_saved(restored.states);
        assert!(book2.is_discovered("Potion"));
        assert_eq!(book2.state("Potion").map(|s| s.times_crafted), Some(4));
        assert!(!book2.is_discovered("Elixir"));
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut blob = CraftSave::from_book(&sample_book()).encode().unwrap();
        blob[0] = b'X';
        assert!(matches!(
            CraftSave::decode(&blob),
            Err(CraftSaveError::BadMagic)
        ));
    }

    #[test]
    fn test_truncated_blob_rejected() {
        assert!(CraftSave::decode(&[b'A', b'R']).is_err());
        let blob = CraftSave::from_book(&sample_book()).encode().unwrap();
        assert!(CraftSave::decode(&blob[..6]).is_err());
    }

    #[test]
    fn test_future_major_version_rejected() {
        let mut save = CraftSave::from_book(&sample_book());
        save.version = SchemaVersion::new(2, 0, 0);
        let blob = save.encode().unwrap();
        assert!(matches!(
            CraftSave::decode(&blob),
            Err(CraftSaveError::VersionMismatch { .. })
        ));
    }
}
