//! Recipe definitions and data structures.
//!
//! This module provides:
//! - Resource requirement targets (concrete, currency, generic category)
//! - Recipe definitions with ingredients, tools, products and outcome rates
//! - Learn/unlearn cascades triggered by successful crafts
//! - A builder for assembling recipes in code and tests

use artisan_common::{ArmorId, CategoryTag, CurrencyId, ItemId, ResourceId, WeaponId};
use serde::{Deserialize, Serialize};

/// What a resource requirement refers to.
///
/// Generic targets are valid for ingredients and tools only; products must
/// be concrete resources or currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceTarget {
    /// A concrete item type.
    Item(ItemId),
    /// A concrete weapon type.
    Weapon(WeaponId),
    /// A concrete armor type.
    Armor(ArmorId),
    /// A currency pool; `None` is the default (gold) pool.
    Currency(Option<CurrencyId>),
    /// Any resource carrying the category tag.
    Generic(CategoryTag),
}

impl ResourceTarget {
    /// The concrete resource id, if this target names one.
    #[must_use]
    pub fn as_resource(&self) -> Option<ResourceId> {
        match self {
            Self::Item(id) => Some(ResourceId::Item(*id)),
            Self::Weapon(id) => Some(ResourceId::Weapon(*id)),
            Self::Armor(id) => Some(ResourceId::Armor(*id)),
            Self::Currency(_) | Self::Generic(_) => None,
        }
    }

    /// Whether this target names a concrete item, weapon or armor.
    #[must_use]
    pub fn is_concrete(&self) -> bool {
        self.as_resource().is_some()
    }
}

/// A quantity of some resource target required or produced by a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirement {
    /// What the requirement refers to.
    pub target: ResourceTarget,
    /// Quantity required or produced. Always positive after validation.
    pub amount: u32,
}

impl ResourceRequirement {
    /// Create a new requirement.
    #[must_use]
    pub const fn new(target: ResourceTarget, amount: u32) -> Self {
        Self { target, amount }
    }

    /// Requirement for a concrete item.
    #[must_use]
    pub const fn item(id: u32, amount: u32) -> Self {
        Self::new(ResourceTarget::Item(ItemId::new(id)), amount)
    }

    /// Requirement for a concrete weapon.
    #[must_use]
    pub const fn weapon(id: u32, amount: u32) -> Self {
        Self::new(ResourceTarget::Weapon(WeaponId::new(id)), amount)
    }

    /// Requirement for a concrete armor.
    #[must_use]
    pub const fn armor(id: u32, amount: u32) -> Self {
        Self::new(ResourceTarget::Armor(ArmorId::new(id)), amount)
    }

    /// Requirement against the default currency pool.
    #[must_use]
    pub const fn gold(amount: u32) -> Self {
        Self::new(ResourceTarget::Currency(None), amount)
    }

    /// Requirement against a named currency pool.
    #[must_use]
    pub fn currency(pool: impl Into<String>, amount: u32) -> Self {
        Self::new(
            ResourceTarget::Currency(Some(CurrencyId::new(pool))),
            amount,
        )
    }

    /// Requirement satisfiable by any member of a generic category.
    #[must_use]
    pub fn generic(tag: impl Into<String>, amount: u32) -> Self {
        Self::new(ResourceTarget::Generic(CategoryTag::new(tag)), amount)
    }
}

/// A chance-based recipe learn or unlearn triggered by a successful craft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cascade {
    /// Name of the recipe to learn or unlearn.
    pub recipe: String,
    /// Percent chance (0-100) the cascade fires.
    pub chance: f64,
}

impl Cascade {
    /// Create a new cascade entry.
    #[must_use]
    pub fn new(recipe: impl Into<String>, chance: f64) -> Self {
        Self {
            recipe: recipe.into(),
            chance,
        }
    }
}

/// Immutable definition of a craftable recipe.
///
/// Built once at catalog load and never mutated; per-player state lives in
/// [`crate::book::RecipeState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDef {
    /// Unique recipe name, the key used everywhere.
    pub name: String,
    /// Optional display name shown instead of `name`.
    pub display_name: Option<String>,
    /// Profession this recipe belongs to.
    pub profession: String,
    /// Optional subcategory within the profession.
    pub subcategory: String,
    /// Optional quality label.
    pub quality: String,
    /// Icon index for the host UI.
    pub icon: i32,
    /// Default description; players may override it at runtime.
    pub description: String,
    /// Time in ticks a successful craft takes.
    pub craft_time: u32,
    /// Base success percentage (0-100).
    pub success_rate: f64,
    /// Success percentage added per profession level above the requirement.
    pub success_per_level: f64,
    /// Base high-quality percentage (0-100), rolled only on success.
    pub hq_chance: f64,
    /// High-quality percentage added per level above the requirement.
    pub hq_per_level: f64,
    /// Profession experience awarded per successful unit.
    pub experience: u32,
    /// Minimum profession level to craft.
    pub level_requirement: u32,
    /// Per-product ownership cap for concrete products; 0 = unlimited.
    pub unique_cap: u32,
    /// Resources consumed per unit.
    pub ingredients: Vec<ResourceRequirement>,
    /// Resources that must be owned but are not consumed.
    pub tools: Vec<ResourceRequirement>,
    /// Resources granted per successful normal-quality unit.
    pub products: Vec<ResourceRequirement>,
    /// Resources granted per failed unit.
    pub fail_products: Vec<ResourceRequirement>,
    /// Resources granted per successful high-quality unit.
    pub hq_products: Vec<ResourceRequirement>,
    /// Recipes a successful unit may teach.
    pub learn_on_craft: Vec<Cascade>,
    /// Recipes a successful unit may remove.
    pub unlearn_on_craft: Vec<Cascade>,
    /// Whether the recipe starts discovered.
    pub discovered_by_default: bool,
    /// Excludes the recipe from requirement-based autodiscovery.
    pub disable_autodiscover: bool,
    /// Suppress the learn notification for this recipe.
    pub disable_learn_toast: bool,
    /// Suppress the craft-complete notification for this recipe.
    pub disable_complete_toast: bool,
    /// Host-resolved sound cue played when a craft starts.
    pub craft_cue: Option<String>,
    /// Host-resolved sound cue for a successful unit or batch.
    pub success_cue: Option<String>,
    /// Host-resolved sound cue for a failed unit or batch.
    pub fail_cue: Option<String>,
    /// Host counter id bumped once per successful unit.
    pub success_counter: Option<String>,
}

impl RecipeDef {
    /// Create a new recipe builder.
    #[must_use]
    pub fn builder(name: impl Into<String>, profession: impl Into<String>) -> RecipeDefBuilder {
        RecipeDefBuilder::new(name, profession)
    }

    /// Display label: the display name when set, the unique name otherwise.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Sound cue for an outcome: the success cue when the unit or batch
    /// succeeded, the fail cue otherwise.
    #[must_use]
    pub fn cue_for(&self, success: bool) -> Option<&str> {
        if success {
            self.success_cue.as_deref()
        } else {
            self.fail_cue.as_deref()
        }
    }

    /// Products granted for an outcome: hq products on a high-quality
    /// success (when any are defined), fail products on failure.
    #[must_use]
    pub fn products_for(&self, success: bool, hq: bool) -> &[ResourceRequirement] {
        if !success {
            &self.fail_products
        } else if hq && !self.hq_products.is_empty() {
            &self.hq_products
        } else {
            &self.products
        }
    }

}

/// Builder for [`RecipeDef`].
#[derive(Debug)]
pub struct RecipeDefBuilder {
    def: RecipeDef,
}

impl RecipeDefBuilder {
    /// Create new builder with required fields and workable defaults.
    fn new(name: impl Into<String>, profession: impl Into<String>) -> Self {
        Self {
            def: RecipeDef {
                name: name.into(),
                display_name: None,
                profession: profession.into(),
                subcategory: String::new(),
                quality: String::new(),
                icon: 0,
                description: String::new(),
                craft_time: 60,
                success_rate: 100.0,
                success_per_level: 0.0,
                hq_chance: 0.0,
                hq_per_level: 0.0,
                experience: 0,
                level_requirement: 0,
                unique_cap: 0,
                ingredients: Vec::new(),
                tools: Vec::new(),
                products: Vec::new(),
                fail_products: Vec::new(),
                hq_products: Vec::new(),
                learn_on_craft: Vec::new(),
                unlearn_on_craft: Vec::new(),
                discovered_by_default: false,
                disable_autodiscover: false,
                disable_learn_toast: false,
                disable_complete_toast: false,
                craft_cue: None,
                success_cue: None,
                fail_cue: None,
                success_counter: None,
            },
        }
    }

    /// Set display name.
    #[must_use]
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.def.display_name = Some(name.into());
        self
    }

    /// Set subcategory.
    #[must_use]
    pub fn subcategory(mut self, sub: impl Into<String>) -> Self {
        self.def.subcategory = sub.into();
        self
    }

    /// Set quality label.
    #[must_use]
    pub fn quality(mut self, quality: impl Into<String>) -> Self {
        self.def.quality = quality.into();
        self
    }

    /// Set icon index.
    #[must_use]
    pub const fn icon(mut self, icon: i32) -> Self {
        self.def.icon = icon;
        self
    }

    /// Set description.
    #[must_use]
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.def.description = desc.into();
        self
    }

    /// Set craft time in ticks.
    #[must_use]
    pub const fn craft_time(mut self, ticks: u32) -> Self {
        self.def.craft_time = ticks;
        self
    }

    /// Set base and per-level success rates.
    #[must_use]
    pub const fn success(mut self, rate: f64, per_level: f64) -> Self {
        self.def.success_rate = rate;
        self.def.success_per_level = per_level;
        self
    }

    /// Set base and per-level high-quality rates.
    #[must_use]
    pub const fn high_quality(mut self, chance: f64, per_level: f64) -> Self {
        self.def.hq_chance = chance;
        self.def.hq_per_level = per_level;
        self
    }

    /// Set experience awarded per successful unit.
    #[must_use]
    pub const fn experience(mut self, exp: u32) -> Self {
        self.def.experience = exp;
        self
    }

    /// Set the minimum profession level.
    #[must_use]
    pub const fn level_requirement(mut self, level: u32) -> Self {
        self.def.level_requirement = level;
        self
    }

    /// Set the per-product ownership cap (0 = unlimited).
    #[must_use]
    pub const fn unique_cap(mut self, cap: u32) -> Self {
        self.def.unique_cap = cap;
        self
    }

    /// Add an ingredient.
    #[must_use]
    pub fn ingredient(mut self, req: ResourceRequirement) -> Self {
        self.def.ingredients.push(req);
        self
    }

    /// Add a tool.
    #[must_use]
    pub fn tool(mut self, req: ResourceRequirement) -> Self {
        self.def.tools.push(req);
        self
    }

    /// Add a product.
    #[must_use]
    pub fn product(mut self, req: ResourceRequirement) -> Self {
        self.def.products.push(req);
        self
    }

    /// Add a fail product.
    #[must_use]
    pub fn fail_product(mut self, req: ResourceRequirement) -> Self {
        self.def.fail_products.push(req);
        self
    }

    /// Add a high-quality product.
    #[must_use]
    pub fn hq_product(mut self, req: ResourceRequirement) -> Self {
        self.def.hq_products.push(req);
        self
    }

    /// Add a learn cascade.
    #[must_use]
    pub fn learns(mut self, recipe: impl Into<String>, chance: f64) -> Self {
        self.def.learn_on_craft.push(Cascade::new(recipe, chance));
        self
    }

    /// Add an unlearn cascade.
    #[must_use]
    pub fn unlearns(mut self, recipe: impl Into<String>, chance: f64) -> Self {
        self.def.unlearn_on_craft.push(Cascade::new(recipe, chance));
        self
    }

    /// Set whether the recipe starts discovered.
    #[must_use]
    pub const fn discovered_by_default(mut self, discovered: bool) -> Self {
        self.def.discovered_by_default = discovered;
        self
    }

    /// Exclude from requirement-based autodiscovery.
    #[must_use]
    pub const fn disable_autodiscover(mut self, disable: bool) -> Self {
        self.def.disable_autodiscover = disable;
        self
    }

    /// Set the cue played when a craft starts.
    #[must_use]
    pub fn craft_cue(mut self, cue: impl Into<String>) -> Self {
        self.def.craft_cue = Some(cue.into());
        self
    }

    /// Set the cue for successful units and batches.
    #[must_use]
    pub fn success_cue(mut self, cue: impl Into<String>) -> Self {
        self.def.success_cue = Some(cue.into());
        self
    }

    /// Set the cue for failed units and batches.
    #[must_use]
    pub fn fail_cue(mut self, cue: impl Into<String>) -> Self {
        self.def.fail_cue = Some(cue.into());
        self
    }

    /// Set the host counter bumped per successful unit.
    #[must_use]
    pub fn success_counter(mut self, counter: impl Into<String>) -> Self {
        self.def.success_counter = Some(counter.into());
        self
    }

    /// Build the recipe.
    #[must_use]
    pub fn build(self) -> RecipeDef {
        self.def
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let recipe = RecipeDef::builder("Potion", "Alchemy").build();
        assert_eq!(recipe.name, "Potion");
        assert_eq!(recipe.profession, "Alchemy");
        assert_eq!(recipe.label(), "Potion");
        assert!((recipe.success_rate - 100.0).abs() < f64::EPSILON);
        assert_eq!(recipe.craft_time, 60);
        assert!(!recipe.discovered_by_default);
    }

    #[test]
    fn test_label_prefers_display_name() {
        let recipe = RecipeDef::builder("potion_1", "Alchemy")
            .display_name("Potion")
            .build();
        assert_eq!(recipe.label(), "Potion");
    }

    #[test]
    fn test_products_for_outcomes() {
        let recipe = RecipeDef::builder("Sword", "Smithing")
            .product(ResourceRequirement::weapon(3, 1))
            .fail_product(ResourceRequirement::item(9, 2))
            .hq_product(ResourceRequirement::weapon(4, 1))
            .build();

        assert_eq!(recipe.products_for(true, false), &recipe.products[..]);
        assert_eq!(recipe.products_for(true, true), &recipe.hq_products[..]);
        assert_eq!(recipe.products_for(false, false), &recipe.fail_products[..]);
        // HQ without dedicated products falls back to normal products.
        let plain = RecipeDef::builder("Plain", "Smithing")
            .product(ResourceRequirement::item(1, 1))
            .build();
        assert_eq!(plain.products_for(true, true), &plain.products[..]);
    }

    #[test]
    fn test_target_concreteness() {
        assert!(ResourceTarget::Item(ItemId::new(1)).is_concrete());
        assert!(!ResourceTarget::Currency(None).is_concrete());
        assert!(!ResourceTarget::Generic(CategoryTag::new("Ore")).is_concrete());
        assert_eq!(
            ResourceTarget::Weapon(WeaponId::new(2)).as_resource(),
            Some(ResourceId::weapon(2))
        );
    }
}
