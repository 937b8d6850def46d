//! Recipe catalog loading and lookup.
//!
//! This module provides:
//! - Loading recipes and generic categories from assets/crafting/*.toml
//! - Per-record validation with skip-on-failure diagnostics
//! - The in-memory catalog with lookup by name and by profession

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use artisan_common::{CategoryTag, SchemaVersion};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::recipe::{Cascade, RecipeDef, ResourceRequirement, ResourceTarget};

/// Default asset path for crafting catalogs.
pub const DEFAULT_CATALOG_PATH: &str = "assets/crafting";

/// Errors that can occur during catalog loading.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Failed to read file.
    #[error("Failed to read catalog file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML.
    #[error("Failed to parse catalog TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error.
    #[error("Catalog validation error: {0}")]
    ValidationError(String),

    /// Duplicate recipe name.
    #[error("Duplicate recipe name: {0}")]
    DuplicateName(String),

    /// Failed to encode a debug dump.
    #[error("Failed to encode catalog dump: {0}")]
    DumpError(#[from] serde_json::Error),
}

/// Result type for catalog loading operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// A generic ingredient category for display and grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericCategory {
    /// Tag concrete resources declare membership in.
    pub tag: CategoryTag,
    /// Display name shown by the host UI.
    pub display_name: String,
    /// Icon index for the host UI.
    pub icon: i32,
}

/// Parsed-once catalog of recipe definitions and generic categories.
#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    by_name: BTreeMap<String, RecipeDef>,
    categories: BTreeMap<String, GenericCategory>,
}

impl RecipeCatalog {
    /// Creates a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recipes in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns true if the catalog holds no recipes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Adds a recipe, replacing any previous definition with the same name.
    pub fn insert(&mut self, def: RecipeDef) {
        self.by_name.insert(def.name.clone(), def);
    }

    /// Adds a recipe, rejecting duplicate names.
    pub fn register(&mut self, def: RecipeDef) -> CatalogResult<()> {
        if self.by_name.contains_key(&def.name) {
            return Err(CatalogError::DuplicateName(def.name));
        }
        self.insert(def);
        Ok(())
    }

    /// Looks up a recipe by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RecipeDef> {
        self.by_name.get(name)
    }

    /// Iterates all recipes in name order.
    pub fn recipes(&self) -> impl Iterator<Item = &RecipeDef> {
        self.by_name.values()
    }

    /// Recipes belonging to any of the given professions.
    ///
    /// The returned iterator borrows only the catalog; the profession list
    /// is copied so callers may pass a short-lived slice.
    pub fn by_professions(&self, professions: &[&str]) -> impl Iterator<Item = &RecipeDef> + '_ {
        let wanted: Vec<String> = professions.iter().map(|p| (*p).to_owned()).collect();
        self.by_name
            .values()
            .filter(move |def| wanted.iter().any(|p| *p == def.profession))
    }

    /// Registers a generic category, replacing any previous one for the tag.
    pub fn insert_category(&mut self, category: GenericCategory) {
        self.categories
            .insert(category.tag.as_str().to_owned(), category);
    }

    /// Looks up a generic category by tag.
    #[must_use]
    pub fn category(&self, tag: &CategoryTag) -> Option<&GenericCategory> {
        self.categories.get(tag.as_str())
    }

    /// Iterates all generic categories.
    pub fn categories(&self) -> impl Iterator<Item = &GenericCategory> {
        self.categories.values()
    }

    /// Renders every recipe as pretty JSON, for debugging catalog content.
    pub fn debug_dump(&self) -> CatalogResult<String> {
        let recipes: Vec<&RecipeDef> = self.by_name.values().collect();
        Ok(serde_json::to_string_pretty(&recipes)?)
    }
}

/// A resource requirement from file.
///
/// Exactly one target field must be set: `item`, `weapon`, `armor`,
/// `generic`, `currency` (named pool) or `gold` (default pool).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequirementSpec {
    /// Concrete item ID.
    #[serde(default)]
    pub item: Option<u32>,
    /// Concrete weapon ID.
    #[serde(default)]
    pub weapon: Option<u32>,
    /// Concrete armor ID.
    #[serde(default)]
    pub armor: Option<u32>,
    /// Generic category tag.
    #[serde(default)]
    pub generic: Option<String>,
    /// Named currency pool.
    #[serde(default)]
    pub currency: Option<String>,
    /// Default currency pool.
    #[serde(default)]
    pub gold: bool,
    /// Quantity required or produced.
    pub amount: u32,
}

impl RequirementSpec {
    /// Resolves into a requirement, checking the target and amount.
    fn resolve(&self, generics_allowed: bool, context: &str) -> CatalogResult<ResourceRequirement> {
        if self.amount == 0 {
            return Err(CatalogError::ValidationError(format!(
                "{context} has zero amount"
            )));
        }
        let target = if let Some(id) = self.item {
            ResourceTarget::Item(artisan_common::ItemId::new(id))
        } else if let Some(id) = self.weapon {
            ResourceTarget::Weapon(artisan_common::WeaponId::new(id))
        } else if let Some(id) = self.armor {
            ResourceTarget::Armor(artisan_common::ArmorId::new(id))
        } else if let Some(tag) = &self.generic {
            if !generics_allowed {
                return Err(CatalogError::ValidationError(format!(
                    "{context} uses a generic category where only concrete resources or currency are allowed"
                )));
            }
            ResourceTarget::Generic(CategoryTag::new(tag))
        } else if let Some(pool) = &self.currency {
            ResourceTarget::Currency(Some(artisan_common::CurrencyId::new(pool)))
        } else if self.gold {
            ResourceTarget::Currency(None)
        } else {
            return Err(CatalogError::ValidationError(format!(
                "{context} names no target"
            )));
        };
        Ok(ResourceRequirement::new(target, self.amount))
    }
}

/// A learn/unlearn cascade from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeSpec {
    /// Name of the recipe to learn or unlearn.
    pub recipe: String,
    /// Percent chance (0-100).
    pub chance: f64,
}

/// A recipe definition from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeSpec {
    /// Unique recipe name.
    pub name: String,
    /// Optional display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Profession the recipe belongs to.
    pub profession: String,
    /// Subcategory within the profession.
    #[serde(default)]
    pub subcategory: String,
    /// Quality label.
    #[serde(default)]
    pub quality: String,
    /// Icon index.
    #[serde(default)]
    pub icon: i32,
    /// Default description.
    #[serde(default)]
    pub description: String,
    /// Craft time in ticks.
    #[serde(default = "default_craft_time")]
    pub craft_time: u32,
    /// Base success percentage.
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,
    /// Success percentage per level above the requirement.
    #[serde(default)]
    pub success_per_level: f64,
    /// Base high-quality percentage.
    #[serde(default)]
    pub hq_chance: f64,
    /// High-quality percentage per level above the requirement.
    #[serde(default)]
    pub hq_per_level: f64,
    /// Experience per successful unit.
    #[serde(default)]
    pub experience: u32,
    /// Minimum profession level.
    #[serde(default)]
    pub level_requirement: u32,
    /// Per-product ownership cap; 0 = unlimited.
    #[serde(default)]
    pub unique_cap: u32,
    /// Resources consumed per unit.
    #[serde(default)]
    pub ingredients: Vec<RequirementSpec>,
    /// Resources that must be owned but are not consumed.
    #[serde(default)]
    pub tools: Vec<RequirementSpec>,
    /// Resources granted per successful unit.
    #[serde(default)]
    pub products: Vec<RequirementSpec>,
    /// Resources granted per failed unit.
    #[serde(default)]
    pub fail_products: Vec<RequirementSpec>,
    /// Resources granted per high-quality unit.
    #[serde(default)]
    pub hq_products: Vec<RequirementSpec>,
    /// Recipes a success may teach.
    #[serde(default)]
    pub learn_on_craft: Vec<CascadeSpec>,
    /// Recipes a success may remove.
    #[serde(default)]
    pub unlearn_on_craft: Vec<CascadeSpec>,
    /// Whether the recipe starts discovered.
    #[serde(default)]
    pub discovered_by_default: bool,
    /// Excluded from requirement-based autodiscovery.
    #[serde(default)]
    pub disable_autodiscover: bool,
    /// Suppress the learn notification.
    #[serde(default)]
    pub disable_learn_toast: bool,
    /// Suppress the craft-complete notification.
    #[serde(default)]
    pub disable_complete_toast: bool,
    /// Cue played when a craft starts.
    #[serde(default)]
    pub craft_cue: Option<String>,
    /// Cue for successful units and batches.
    #[serde(default)]
    pub success_cue: Option<String>,
    /// Cue for failed units and batches.
    #[serde(default)]
    pub fail_cue: Option<String>,
    /// Host counter bumped per successful unit.
    #[serde(default)]
    pub success_counter: Option<String>,
}

fn default_success_rate() -> f64 {
    100.0
}

const fn default_craft_time() -> u32 {
    60 // 1 second at 60 ticks/second
}

impl RecipeSpec {
    /// Validates the spec and converts it into a definition.
    pub fn resolve(&self) -> CatalogResult<RecipeDef> {
        if self.name.is_empty() {
            return Err(CatalogError::ValidationError(
                "Recipe has empty name".to_owned(),
            ));
        }

        let resolve_list =
            |specs: &[RequirementSpec], list: &str, generics: bool| -> CatalogResult<Vec<ResourceRequirement>> {
                specs
                    .iter()
                    .enumerate()
                    .map(|(i, spec)| {
                        spec.resolve(generics, &format!("Recipe {} {list} {i}", self.name))
                    })
                    .collect()
            };

        Ok(RecipeDef {
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            profession: self.profession.clone(),
            subcategory: self.subcategory.clone(),
            quality: self.quality.clone(),
            icon: self.icon,
            description: self.description.clone(),
            craft_time: self.craft_time,
            success_rate: self.success_rate,
            success_per_level: self.success_per_level,
            hq_chance: self.hq_chance,
            hq_per_level: self.hq_per_level,
            experience: self.experience,
            level_requirement: self.level_requirement,
            unique_cap: self.unique_cap,
            ingredients: resolve_list(&self.ingredients, "ingredient", true)?,
            tools: resolve_list(&self.tools, "tool", true)?,
            products: resolve_list(&self.products, "product", false)?,
            fail_products: resolve_list(&self.fail_products, "fail_product", false)?,
            hq_products: resolve_list(&self.hq_products, "hq_product", false)?,
            learn_on_craft: self
                .learn_on_craft
                .iter()
                .map(|c| Cascade::new(&c.recipe, c.chance))
                .collect(),
            unlearn_on_craft: self
                .unlearn_on_craft
                .iter()
                .map(|c| Cascade::new(&c.recipe, c.chance))
                .collect(),
            discovered_by_default: self.discovered_by_default,
            disable_autodiscover: self.disable_autodiscover,
            disable_learn_toast: self.disable_learn_toast,
            disable_complete_toast: self.disable_complete_toast,
            success_counter: self.success_counter.clone(),
            craft_cue: self.craft_cue.clone(),
            success_cue: self.success_cue.clone(),
            fail_cue: self.fail_cue.clone(),
        })
    }
}

/// A generic category definition from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySpec {
    /// Tag concrete resources declare membership in.
    pub tag: String,
    /// Display name; defaults to the tag text.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Icon index.
    #[serde(default)]
    pub icon: i32,
}

/// A collection of recipes and categories from a single file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    /// File format version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Recipes in this file.
    #[serde(default)]
    pub recipes: Vec<RecipeSpec>,
    /// Generic categories in this file.
    #[serde(default)]
    pub categories: Vec<CategorySpec>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

/// Statistics for the catalog loader.
#[derive(Debug, Default, Clone)]
pub struct CatalogLoaderStats {
    /// Number of files loaded.
    pub files_loaded: u32,
    /// Number of recipes loaded.
    pub recipes_loaded: u32,
    /// Number of categories loaded.
    pub categories_loaded: u32,
    /// Number of records skipped for validation errors.
    pub validation_errors: u32,
}

/// Catalog asset loader: scans a directory of TOML files.
pub struct CatalogLoader {
    /// Base path for catalog files.
    base_path: PathBuf,
    /// The catalog being built.
    catalog: RecipeCatalog,
    /// Statistics.
    stats: CatalogLoaderStats,
}

impl CatalogLoader {
    /// Creates a new catalog loader.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let base_path = base_path.into();
        info!("Initializing catalog loader at: {:?}", base_path);

        Self {
            base_path,
            catalog: RecipeCatalog::new(),
            stats: CatalogLoaderStats::default(),
        }
    }

    /// Creates a loader with the default path.
    #[must_use]
    pub fn with_default_path() -> Self {
        Self::new(DEFAULT_CATALOG_PATH)
    }

    /// Returns the base path.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns the catalog built so far.
    #[must_use]
    pub fn catalog(&self) -> &RecipeCatalog {
        &self.catalog
    }

    /// Returns loader statistics.
    #[must_use]
    pub fn stats(&self) -> &CatalogLoaderStats {
        &self.stats
    }

    /// Consumes the loader, returning the catalog.
    #[must_use]
    pub fn into_catalog(self) -> RecipeCatalog {
        self.catalog
    }

    /// Loads all catalog files from the base path.
    pub fn load_all(&mut self) -> CatalogResult<()> {
        if !self.base_path.exists() {
            info!(
                "Catalog directory does not exist, creating: {:?}",
                self.base_path
            );
            fs::create_dir_all(&self.base_path)?;
            return Ok(());
        }

        let entries = fs::read_dir(&self.base_path)?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "toml") {
                if let Err(e) = self.load_file(&path) {
                    warn!("Failed to load catalog file {:?}: {}", path, e);
                    self.stats.validation_errors += 1;
                }
            }
        }

        info!(
            "Loaded {} recipes and {} categories from {} files",
            self.stats.recipes_loaded, self.stats.categories_loaded, self.stats.files_loaded
        );

        Ok(())
    }

    /// Loads recipes and categories from a single file.
    pub fn load_file(&mut self, path: &Path) -> CatalogResult<()> {
        debug!("Loading catalog file: {:?}", path);

        let content = fs::read_to_string(path)?;
        let file: CatalogFile = toml::from_str(&content)?;

        let version: SchemaVersion = file.version.parse().map_err(|_| {
            CatalogError::ValidationError(format!("malformed version string: {}", file.version))
        })?;
        if !SchemaVersion::RECIPE_CATALOG.can_read(&version) {
            return Err(CatalogError::ValidationError(format!(
                "unsupported catalog version {} (current: {})",
                version,
                SchemaVersion::RECIPE_CATALOG
            )));
        }

        let mut loaded = 0u32;
        for spec in &file.recipes {
            let def = match spec.resolve() {
                Ok(def) => def,
                Err(e) => {
                    warn!("Invalid recipe in {:?}: {}", path, e);
                    self.stats.validation_errors += 1;
                    continue;
                }
            };
            match self.catalog.register(def) {
                Ok(()) => loaded += 1,
                Err(e) => {
                    warn!("Failed to register recipe from {:?}: {}", path, e);
                    self.stats.validation_errors += 1;
                }
            }
        }

        for spec in &file.categories {
            if spec.tag.is_empty() {
                warn!("Category with empty tag in {:?}, skipping", path);
                self.stats.validation_errors += 1;
                continue;
            }
            self.catalog.insert_category(GenericCategory {
                tag: CategoryTag::new(&spec.tag),
                display_name: spec
                    .display_name
                    .clone()
                    .unwrap_or_else(|| spec.tag.clone()),
                icon: spec.icon,
            });
            self.stats.categories_loaded += 1;
        }

        self.stats.files_loaded += 1;
        self.stats.recipes_loaded += loaded;
        debug!("Loaded {} recipes from {:?}", loaded, path);

        Ok(())
    }
}
