//! Top-level crafting session.
//!
//! The session owns the catalog, book, ledger, scheduler, RNG, settings and
//! host hooks, and exposes the command surface hosts drive crafting
//! through. There is no ambient state; everything reachable from here is
//! reachable only from here.

use tracing::info;

use crate::book::RecipeBook;
use crate::catalog::RecipeCatalog;
use crate::events::{CraftEvent, EventBus};
use crate::host::{NoProfessions, ProfessionHost};
use crate::ledger::Ledger;
use crate::recipe::RecipeDef;
use crate::resolve;
use crate::rng::CraftRng;
use crate::save::{CraftSave, CraftSaveResult};
use crate::scheduler::{CraftContext, CraftScheduler, StartOutcome};

/// Session-wide crafting behavior toggles.
#[derive(Debug, Clone, Copy, Default)]
pub struct CraftSettings {
    /// Resolve whole batches synchronously instead of scheduling jobs.
    pub instant_crafting: bool,
    /// Award recipe experience on failed units too.
    pub always_award_exp: bool,
    /// Flag job completion events when the profession leveled mid-job.
    pub pop_scene_on_level: bool,
}

/// Owns all crafting state and exposes the command surface.
pub struct CraftingSession {
    catalog: RecipeCatalog,
    book: RecipeBook,
    ledger: Ledger,
    scheduler: CraftScheduler,
    host: Box<dyn ProfessionHost>,
    rng: CraftRng,
    events: EventBus,
    settings: CraftSettings,
}

impl CraftingSession {
    /// Create a session over a loaded catalog.
    ///
    /// The book starts at catalog defaults; the host is [`NoProfessions`]
    /// until replaced.
    #[must_use]
    pub fn new(catalog: RecipeCatalog, seed: u64) -> Self {
        let mut book = RecipeBook::new();
        book.initialize(&catalog);
        info!(recipes = catalog.len(), "crafting session created");
        Self {
            catalog,
            book,
            ledger: Ledger::new(),
            scheduler: CraftScheduler::new(),
            host: Box::new(NoProfessions),
            rng: CraftRng::new(seed),
            events: EventBus::default(),
            settings: CraftSettings::default(),
        }
    }

    /// Replace the profession host.
    #[must_use]
    pub fn with_host(mut self, host: impl ProfessionHost + 'static) -> Self {
        self.host = Box::new(host);
        self
    }

    /// Replace the settings.
    #[must_use]
    pub fn with_settings(mut self, settings: CraftSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The resource ledger.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The resource ledger, mutably. Hosts sync inventory through this.
    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// The recipe book.
    #[must_use]
    pub fn book(&self) -> &RecipeBook {
        &self.book
    }

    /// The recipe catalog.
    #[must_use]
    pub fn catalog(&self) -> &RecipeCatalog {
        &self.catalog
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> CraftSettings {
        self.settings
    }

    /// Update settings in place.
    pub fn set_settings(&mut self, settings: CraftSettings) {
        self.settings = settings;
    }

    fn context(&mut self) -> CraftContext<'_> {
        CraftContext {
            catalog: &self.catalog,
            book: &mut self.book,
            ledger: &mut self.ledger,
            host: &mut *self.host,
            rng: &mut self.rng,
            events: &self.events,
            settings: &self.settings,
        }
    }

    /// Set a recipe's discovered flag. Unknown names are no-ops; newly
    /// learned recipes emit a learn event.
    pub fn discover(&mut self, name: &str, discovered: bool) {
        let was = self.book.is_discovered(name);
        self.book.discover(name, discovered);
        if discovered && !was && self.book.is_discovered(name) {
            let show_toast = self
                .catalog
                .get(name)
                .map_or(true, |def| !def.disable_learn_toast);
            self.events.publish(CraftEvent::RecipeLearned {
                recipe: name.to_owned(),
                show_toast,
            });
        }
    }

    /// Override a recipe's description. Unknown names are no-ops.
    pub fn set_description(&mut self, name: &str, description: impl Into<String>) {
        self.book.set_description(name, description);
    }

    /// Rebuild the book from catalog defaults, discarding all progress.
    pub fn reinitialize(&mut self) {
        info!("reinitializing crafting state from catalog defaults");
        self.book.reinitialize(&self.catalog);
    }

    /// Merge another catalog in: new recipes and categories are added,
    /// existing definitions and all book state stay untouched.
    pub fn merge_catalog(&mut self, other: RecipeCatalog) {
        let mut added = 0usize;
        for def in other.recipes() {
            if self.catalog.get(&def.name).is_none() {
                self.catalog.insert(def.clone());
                added += 1;
            }
        }
        for category in other.categories() {
            if self.catalog.category(&category.tag).is_none() {
                self.catalog.insert_category(category.clone());
            }
        }
        self.book.initialize(&self.catalog);
        info!(added, "catalog merged into session");
    }

    /// Whether a craft job bound to the given scene is in flight.
    #[must_use]
    pub fn is_key_crafting(&self, scene: &str) -> bool {
        self.scheduler.is_scene_crafting(scene)
    }

    /// Whether this exact recipe/scene slot has a job in flight.
    #[must_use]
    pub fn is_crafting(&self, recipe: &str, scene: Option<&str>) -> bool {
        self.scheduler.is_crafting(recipe, scene)
    }

    /// Discovered recipes belonging to any of the given professions.
    #[must_use]
    pub fn recipes_of(&self, professions: &[&str]) -> Vec<&RecipeDef> {
        self.catalog
            .by_professions(professions)
            .filter(|def| self.book.is_discovered(&def.name))
            .collect()
    }

    /// Whether one unit of the recipe can be crafted right now. Unknown
    /// names read false.
    #[must_use]
    pub fn can_craft(&self, name: &str) -> bool {
        self.catalog
            .get(name)
            .is_some_and(|def| resolve::can_craft(def, &self.book, &self.ledger, &*self.host))
    }

    /// Maximum units craftable back to back. Unknown names read 0.
    #[must_use]
    pub fn max_repeatable(&self, name: &str) -> u32 {
        self.catalog
            .get(name)
            .map_or(0, |def| resolve::max_repeatable(def, &self.ledger))
    }

    /// Effective success percentage for display. Unknown names read `None`.
    #[must_use]
    pub fn success_rate(&self, name: &str) -> Option<f64> {
        self.catalog.get(name).map(|def| {
            let level = self.host.level(&def.profession);
            let bonus = self.host.success_bonus(&def.profession);
            resolve::effective_success_rate(def, level, bonus)
        })
    }

    /// Start crafting `count` units, timed or instant per settings.
    pub fn craft(
        &mut self,
        name: &str,
        scene: Option<&str>,
        count: u32,
        now: u64,
    ) -> StartOutcome {
        let mut scheduler = std::mem::take(&mut self.scheduler);
        let outcome = scheduler.start(&mut self.context(), name, scene, count, now);
        self.scheduler = scheduler;
        outcome
    }

    /// Advance timed jobs to the given tick.
    pub fn tick(&mut self, now: u64) {
        let mut scheduler = std::mem::take(&mut self.scheduler);
        scheduler.tick(&mut self.context(), now);
        self.scheduler = scheduler;
    }

    /// Learn every undiscovered, autodiscovery-eligible recipe whose
    /// ingredients and tools are currently in stock. Unique caps do not
    /// block discovery, only crafting. Returns how many were learned.
    pub fn autodiscover(&mut self) -> u32 {
        let eligible: Vec<String> = self
            .catalog
            .recipes()
            .filter(|def| {
                !def.disable_autodiscover
                    && !self.book.is_discovered(&def.name)
                    && resolve::stocks_met(def, &self.ledger)
            })
            .map(|def| def.name.clone())
            .collect();
        let learned = eligible.len() as u32;
        for name in eligible {
            self.discover(&name, true);
        }
        learned
    }

    /// Drain pending crafting events.
    pub fn drain_events(&mut self) -> Vec<CraftEvent> {
        self.events.drain()
    }

    /// Encode the persisted slice of session state.
    pub fn save_state(&self) -> CraftSaveResult<Vec<u8>> {
        CraftSave::from_book(&self.book).encode()
    }

    /// Decode a save blob and merge its recipe states into the book.
    pub fn load_state(&mut self, bytes: &[u8]) -> CraftSaveResult<()> {
        let save = CraftSave::decode(bytes)?;
        self.book.merge_saved(save.states);
        Ok(())
    }
}

impl std::fmt::Debug for CraftingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CraftingSession")
            .field("recipes", &self.catalog.len())
            .field("book", &self.book.len())
            .field("active_jobs", &self.scheduler.active_jobs())
            .finish_non_exhaustive()
    }
}
