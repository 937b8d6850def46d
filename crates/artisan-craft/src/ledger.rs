//! Resource ledger: owned quantities, currency pools and the category index.
//!
//! The ledger is the crafting core's only view of player wealth. All lookups
//! are total: missing resources read as zero, debits saturate at zero, and
//! no operation returns an error.

use crate::recipe::ResourceTarget;
use artisan_common::{CategoryTag, CurrencyId, ResourceId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::warn;

/// Owned resources, currency pools and category-tag membership.
///
/// Concrete resources are stored in an ordered map so generic debits walk
/// members in a stable order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    resources: BTreeMap<ResourceId, u32>,
    gold: u32,
    currencies: BTreeMap<CurrencyId, u32>,
    tags: HashMap<ResourceId, HashSet<CategoryTag>>,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Owned count of a concrete resource.
    #[must_use]
    pub fn count(&self, id: ResourceId) -> u32 {
        self.resources.get(&id).copied().unwrap_or(0)
    }

    /// Credit a concrete resource.
    pub fn add(&mut self, id: ResourceId, amount: u32) {
        if amount == 0 {
            return;
        }
        *self.resources.entry(id).or_insert(0) += amount;
    }

    /// Debit a concrete resource, saturating at zero.
    pub fn remove(&mut self, id: ResourceId, amount: u32) {
        if let Some(owned) = self.resources.get_mut(&id) {
            *owned = owned.saturating_sub(amount);
        }
    }

    /// Balance of the default currency pool.
    #[must_use]
    pub fn gold(&self) -> u32 {
        self.gold
    }

    /// Credit the default currency pool.
    pub fn add_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Balance of a named currency pool.
    #[must_use]
    pub fn currency(&self, pool: &CurrencyId) -> u32 {
        self.currencies.get(pool).copied().unwrap_or(0)
    }

    /// Credit a named currency pool.
    pub fn add_currency(&mut self, pool: CurrencyId, amount: u32) {
        *self.currencies.entry(pool).or_insert(0) += amount;
    }

    /// Replace the category tags of a concrete resource.
    pub fn set_tags(&mut self, id: ResourceId, tags: impl IntoIterator<Item = CategoryTag>) {
        let set: HashSet<CategoryTag> = tags.into_iter().collect();
        if set.is_empty() {
            self.tags.remove(&id);
        } else {
            self.tags.insert(id, set);
        }
    }

    /// Whether a concrete resource carries a category tag.
    #[must_use]
    pub fn has_tag(&self, id: ResourceId, tag: &CategoryTag) -> bool {
        self.tags.get(&id).is_some_and(|set| set.contains(tag))
    }

    /// Concrete resources carrying a tag, in stable ledger order.
    pub fn members_of(&self, tag: &CategoryTag) -> impl Iterator<Item = (ResourceId, u32)> + '_ {
        let tag = tag.clone();
        self.resources
            .iter()
            .filter(move |(id, _)| self.has_tag(**id, &tag))
            .map(|(id, owned)| (*id, *owned))
    }

    /// Owned amount satisfying a requirement target.
    ///
    /// Generic targets sum every owned member of the category; a resource
    /// tagged into two categories referenced by one recipe is counted once
    /// per category.
    #[must_use]
    pub fn amount_owned(&self, target: &ResourceTarget) -> u32 {
        match target {
            ResourceTarget::Item(_) | ResourceTarget::Weapon(_) | ResourceTarget::Armor(_) => {
                // as_resource is total for concrete targets
                target.as_resource().map_or(0, |id| self.count(id))
            }
            ResourceTarget::Currency(None) => self.gold,
            ResourceTarget::Currency(Some(pool)) => self.currency(pool),
            ResourceTarget::Generic(tag) => self.members_of(tag).map(|(_, owned)| owned).sum(),
        }
    }

    /// Debit `amount` of a requirement target, saturating at zero.
    ///
    /// Generic debits walk category members in stable order, taking partial
    /// amounts from each until the debit is covered or members run out.
    pub fn take(&mut self, target: &ResourceTarget, amount: u32) {
        match target {
            ResourceTarget::Item(_) | ResourceTarget::Weapon(_) | ResourceTarget::Armor(_) => {
                if let Some(id) = target.as_resource() {
                    self.remove(id, amount);
                }
            }
            ResourceTarget::Currency(None) => {
                self.gold = self.gold.saturating_sub(amount);
            }
            ResourceTarget::Currency(Some(pool)) => {
                if let Some(balance) = self.currencies.get_mut(pool) {
                    *balance = balance.saturating_sub(amount);
                }
            }
            ResourceTarget::Generic(tag) => {
                let mut remaining = amount;
                let members: Vec<ResourceId> =
                    self.members_of(tag).map(|(id, _)| id).collect();
                for id in members {
                    if remaining == 0 {
                        break;
                    }
                    let owned = self.count(id);
                    let debit = owned.min(remaining);
                    self.remove(id, debit);
                    remaining -= debit;
                }
            }
        }
    }

    /// Credit `amount` of a requirement target.
    ///
    /// Generic targets cannot be credited; catalog validation rejects them
    /// as products, so a runtime hit is a logged no-op.
    pub fn give(&mut self, target: &ResourceTarget, amount: u32) {
        match target {
            ResourceTarget::Item(_) | ResourceTarget::Weapon(_) | ResourceTarget::Armor(_) => {
                if let Some(id) = target.as_resource() {
                    self.add(id, amount);
                }
            }
            ResourceTarget::Currency(None) => self.add_gold(amount),
            ResourceTarget::Currency(Some(pool)) => self.add_currency(pool.clone(), amount),
            ResourceTarget::Generic(tag) => {
                warn!(category = %tag, "cannot credit a generic category, ignoring");
            }
        }
    }
}
