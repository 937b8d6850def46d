//! Per-player recipe state: discovery, craft counts, description overrides.
//!
//! The book is the only crafting state that survives save/load. Definitions
//! stay in the catalog; the book tracks what the player knows and has done.

use crate::catalog::RecipeCatalog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Mutable per-player state for one recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeState {
    /// Recipe name, matching [`crate::recipe::RecipeDef::name`].
    pub name: String,
    /// Whether the player knows this recipe.
    pub discovered: bool,
    /// Successful units crafted.
    pub times_crafted: u32,
    /// Player-specific description override, if any.
    pub description: Option<String>,
}

impl RecipeState {
    /// Create state for a recipe with the given starting discovery.
    #[must_use]
    pub fn new(name: impl Into<String>, discovered: bool) -> Self {
        Self {
            name: name.into(),
            discovered,
            times_crafted: 0,
            description: None,
        }
    }
}

/// Collection of recipe states, keyed by recipe name.
#[derive(Debug, Clone, Default)]
pub struct RecipeBook {
    states: BTreeMap<String, RecipeState>,
}

impl RecipeBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a state for every catalog recipe the book does not know yet.
    ///
    /// Existing states are never touched or removed, so re-loading an
    /// expanded catalog mid-save only adds the new entries.
    pub fn initialize(&mut self, catalog: &RecipeCatalog) {
        let mut added = 0usize;
        for def in catalog.recipes() {
            if !self.states.contains_key(&def.name) {
                self.states.insert(
                    def.name.clone(),
                    RecipeState::new(&def.name, def.discovered_by_default),
                );
                added += 1;
            }
        }
        if added > 0 {
            debug!(added, "recipe book gained new entries");
        }
    }

    /// Drop all states and rebuild from the catalog defaults.
    pub fn reinitialize(&mut self, catalog: &RecipeCatalog) {
        self.states.clear();
        self.initialize(catalog);
    }

    /// Merge previously saved states into the book.
    ///
    /// Saved entries replace their defaults; saved entries for recipes no
    /// longer in any catalog are kept so nothing is silently lost.
    pub fn merge_saved(&mut self, saved: impl IntoIterator<Item = RecipeState>) {
        for state in saved {
            self.states.insert(state.name.clone(), state);
        }
    }

    /// Look up a recipe's state.
    #[must_use]
    pub fn state(&self, name: &str) -> Option<&RecipeState> {
        self.states.get(name)
    }

    /// Whether the recipe is known to the player. Unknown names read false.
    #[must_use]
    pub fn is_discovered(&self, name: &str) -> bool {
        self.states.get(name).is_some_and(|s| s.discovered)
    }

    /// Set a recipe's discovered flag. Unknown names are ignored.
    pub fn discover(&mut self, name: &str, discovered: bool) {
        if let Some(state) = self.states.get_mut(name) {
            state.discovered = discovered;
        }
    }

    /// Bump the craft counter for a recipe. Unknown names are ignored.
    pub fn record_craft(&mut self, name: &str) {
        if let Some(state) = self.states.get_mut(name) {
            state.times_crafted = state.times_crafted.saturating_add(1);
        }
    }

    /// Override a recipe's description. Unknown names are ignored.
    pub fn set_description(&mut self, name: &str, description: impl Into<String>) {
        if let Some(state) = self.states.get_mut(name) {
            state.description = Some(description.into());
        }
    }

    /// All states in name order.
    pub fn states(&self) -> impl Iterator<Item = &RecipeState> {
        self.states.values()
    }

    /// Number of tracked recipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the book is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::RecipeDef;

    fn catalog_with(names: &[(&str, bool)]) -> RecipeCatalog {
        let mut catalog = RecipeCatalog::new();
        for (name, discovered) in names {
            catalog.insert(
                RecipeDef::builder(*name, "Alchemy")
                    .discovered_by_default(*discovered)
                    .build(),
            );
        }
        catalog
    }

    #[test]
    fn test_initialize_uses_defaults() {
        let catalog = catalog_with(&[("Potion", true), ("Elixir", false)]);
        let mut book = RecipeBook::new();
        book.initialize(&catalog);

        assert_eq!(book.len(), 2);
        assert!(book.is_discovered("Potion"));
        assert!(!book.is_discovered("Elixir"));
    }

    #[test]
    fn test_initialize_is_idempotent_and_additive() {
        let catalog = catalog_with(&[("Potion", false)]);
        let mut book = RecipeBook::new();
        book.initialize(&catalog);
        book.discover("Potion", true);
        book.record_craft("Potion");

        // Re-initializing with a grown catalog keeps existing state.
        let grown = catalog_with(&[("Potion", false), ("Elixir", true)]);
        book.initialize(&grown);

        assert_eq!(book.len(), 2);
        assert!(book.is_discovered("Potion"));
        assert_eq!(book.state("Potion").map(|s| s.times_crafted), Some(1));
        assert!(book.is_discovered("Elixir"));
    }

    #[test]
    fn test_reinitialize_resets() {
        let catalog = catalog_with(&[("Potion", false)]);
        let mut book = RecipeBook::new();
        book.initialize(&catalog);
        book.discover("Potion", true);

        book.reinitialize(&catalog);
        assert!(!book.is_discovered("Potion"));
    }

    #[test]
    fn test_merge_saved_overrides_defaults() {
        let catalog = catalog_with(&[("Potion", false)]);
        let mut book = RecipeBook::new();
        book.initialize(&catalog);

        let mut saved = RecipeState::new("Potion", true);
        saved.times_crafted = 9;
        saved.description = Some("my notes".into());
        book.merge_saved([saved, RecipeState::new("Retired", true)]);

        assert!(book.is_discovered("Potion"));
        assert_eq!(book.state("Potion").map(|s| s.times_crafted), Some(9));
        // Orphaned saved entries survive the merge.
        assert!(book.is_discovered("Retired"));
    }

    #[test]
    fn test_unknown_names_are_ignored() {
        let mut book = RecipeBook::new();
        book.discover("Missing", true);
        book.record_craft("Missing");
        book.set_description("Missing", "text");
        assert!(book.is_empty());
    }
}
