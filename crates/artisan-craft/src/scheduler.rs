//! Timed and instant craft execution.
//!
//! One job per key; a job holds the already-rolled outcome of the unit in
//! progress plus the count still queued behind it. Completion is driven by
//! the host calling [`CraftScheduler::tick`] with the current tick count.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, info};

use crate::book::RecipeBook;
use crate::catalog::RecipeCatalog;
use crate::events::{CraftEvent, EventBus};
use crate::host::ProfessionHost;
use crate::ledger::Ledger;
use crate::recipe::RecipeDef;
use crate::resolve::{self, RolledOutcome, MAX_MULTICRAFT};
use crate::rng::CraftRng;
use crate::session::CraftSettings;

/// Identifies one craft slot: a recipe, optionally bound to a scene.
///
/// Distinct keys run concurrently; starting a key that already has a job is
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobKey {
    /// Recipe name.
    pub recipe: String,
    /// Scene the job is bound to, if any.
    pub scene: Option<String>,
}

impl JobKey {
    /// Create a job key.
    #[must_use]
    pub fn new(recipe: impl Into<String>, scene: Option<&str>) -> Self {
        Self {
            recipe: recipe.into(),
            scene: scene.map(str::to_owned),
        }
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scene {
            Some(scene) => write!(f, "crafting-{}-{}", self.recipe, scene),
            None => write!(f, "crafting-{}", self.recipe),
        }
    }
}

/// Phase of a running job. A job not in the table is idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    /// Counting down to the current unit's completion.
    Running,
    /// The current unit is being applied.
    Completing,
}

/// A craft job in flight.
#[derive(Debug, Clone)]
pub struct CraftJob {
    /// Rolled outcome of the unit in progress.
    outcome: RolledOutcome,
    /// Units queued behind the one in progress.
    remaining: u32,
    /// Tick the job started at.
    started_at: u64,
    /// Tick the current unit completes at.
    due_at: u64,
    /// Profession level when the job started, if the host levels it.
    level_snapshot: Option<u32>,
    /// Whether every completed unit so far succeeded.
    all_succeeded: bool,
    /// Current phase.
    phase: JobPhase,
}

impl CraftJob {
    /// Units queued behind the one in progress.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Tick the current unit completes at.
    #[must_use]
    pub fn due_at(&self) -> u64 {
        self.due_at
    }

    /// Tick the job started at.
    #[must_use]
    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> JobPhase {
        self.phase
    }
}

/// Shared state a scheduler operation works against.
///
/// Assembled per call by the session so the scheduler itself holds nothing
/// but the job table.
pub struct CraftContext<'a> {
    /// Loaded recipe catalog.
    pub catalog: &'a RecipeCatalog,
    /// Per-player recipe state.
    pub book: &'a mut RecipeBook,
    /// Owned resources.
    pub ledger: &'a mut Ledger,
    /// Profession hooks.
    pub host: &'a mut dyn ProfessionHost,
    /// Outcome roll source.
    pub rng: &'a mut CraftRng,
    /// Notification sink.
    pub events: &'a EventBus,
    /// Session settings.
    pub settings: &'a CraftSettings,
}

/// Result of a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A timed job was created.
    Started,
    /// The key already has a job in flight. Nothing happened.
    Busy,
    /// The recipe is undiscovered, under-leveled or unaffordable.
    NotEligible,
    /// No such recipe in the catalog.
    UnknownRecipe,
    /// Instant mode: the whole batch resolved synchronously.
    InstantDone {
        /// Whether every unit of the batch succeeded.
        all_succeeded: bool,
    },
}

/// Job table driving timed craft completion.
#[derive(Debug, Default)]
pub struct CraftScheduler {
    jobs: HashMap<JobKey, CraftJob>,
}

impl CraftScheduler {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a job is in flight for this exact key.
    #[must_use]
    pub fn is_crafting(&self, recipe: &str, scene: Option<&str>) -> bool {
        self.jobs.contains_key(&JobKey::new(recipe, scene))
    }

    /// Whether any job is bound to the given scene.
    #[must_use]
    pub fn is_scene_crafting(&self, scene: &str) -> bool {
        self.jobs
            .keys()
            .any(|key| key.scene.as_deref() == Some(scene))
    }

    /// Look up a job by key.
    #[must_use]
    pub fn job(&self, recipe: &str, scene: Option<&str>) -> Option<&CraftJob> {
        self.jobs.get(&JobKey::new(recipe, scene))
    }

    /// Number of jobs in flight.
    #[must_use]
    pub fn active_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Start crafting `count` units of a recipe.
    ///
    /// Ineligibility and busy keys are reported, not errors. In instant
    /// mode the batch resolves before returning; otherwise ingredients for
    /// the first unit are taken, its outcome rolled, and a job enters the
    /// table.
    pub fn start(
        &mut self,
        ctx: &mut CraftContext<'_>,
        recipe: &str,
        scene: Option<&str>,
        count: u32,
        now: u64,
    ) -> StartOutcome {
        let Some(def) = ctx.catalog.get(recipe) else {
            debug!(recipe, "start request for unknown recipe ignored");
            return StartOutcome::UnknownRecipe;
        };
        let count = count.clamp(1, MAX_MULTICRAFT);

        if !resolve::can_craft(def, ctx.book, ctx.ledger, &*ctx.host) {
            return StartOutcome::NotEligible;
        }

        if ctx.settings.instant_crafting {
            return Self::run_instant(ctx, def, count);
        }

        let key = JobKey::new(recipe, scene);
        if self.jobs.contains_key(&key) {
            debug!(key = %key, "craft slot busy, start ignored");
            return StartOutcome::Busy;
        }

        resolve::take_ingredients(def, ctx.ledger);
        let level = ctx.host.level(&def.profession);
        let bonus = ctx.host.success_bonus(&def.profession);
        let outcome = resolve::roll_outcome(def, level, bonus, ctx.rng);

        info!(key = %key, queued = count, due = now + u64::from(outcome.duration), "craft started");
        self.jobs.insert(
            key,
            CraftJob {
                outcome,
                remaining: count - 1,
                started_at: now,
                due_at: now + u64::from(outcome.duration),
                level_snapshot: level,
                all_succeeded: true,
                phase: JobPhase::Running,
            },
        );
        ctx.events.publish(CraftEvent::CraftStarted {
            recipe: recipe.to_owned(),
            scene: scene.map(str::to_owned),
            queued: count,
            cue: def.craft_cue.clone(),
        });
        StartOutcome::Started
    }

    /// Resolve a whole batch synchronously.
    ///
    /// Units are debited and applied one at a time without re-checking
    /// eligibility in between; the stocks were checked for one unit up
    /// front and debits saturate.
    fn run_instant(ctx: &mut CraftContext<'_>, def: &RecipeDef, count: u32) -> StartOutcome {
        let mut all_succeeded = true;
        for _ in 0..count {
            resolve::take_ingredients(def, ctx.ledger);
            let level = ctx.host.level(&def.profession);
            let bonus = ctx.host.success_bonus(&def.profession);
            let outcome = resolve::roll_outcome(def, level, bonus, ctx.rng);
            all_succeeded &= outcome.success;
            resolve::apply_outcome(
                def,
                outcome,
                ctx.catalog,
                ctx.book,
                ctx.ledger,
                ctx.host,
                ctx.rng,
                ctx.events,
                ctx.settings.always_award_exp,
            );
        }
        ctx.events.publish(CraftEvent::JobFinished {
            recipe: def.name.clone(),
            all_succeeded,
            level_up: false,
            show_toast: !def.disable_complete_toast,
            cue: def.cue_for(all_succeeded).map(str::to_owned),
        });
        StartOutcome::InstantDone { all_succeeded }
    }

    /// Complete every job whose current unit is due.
    ///
    /// A completed unit applies its stored outcome; the job then either
    /// debits and rolls the next queued unit or leaves the table.
    pub fn tick(&mut self, ctx: &mut CraftContext<'_>, now: u64) {
        let due: Vec<JobKey> = self
            .jobs
            .iter()
            .filter(|(_, job)| job.phase == JobPhase::Running && job.due_at <= now)
            .map(|(key, _)| key.clone())
            .collect();

        for key in due {
            let Some(def) = ctx.catalog.get(&key.recipe).cloned() else {
                // Catalog shrank underneath a running job; drop it.
                self.jobs.remove(&key);
                continue;
            };
            let Some(job) = self.jobs.get_mut(&key) else {
                continue;
            };
            job.phase = JobPhase::Completing;
            job.all_succeeded &= job.outcome.success;

            resolve::apply_outcome(
                &def,
                job.outcome,
                ctx.catalog,
                ctx.book,
                ctx.ledger,
                ctx.host,
                ctx.rng,
                ctx.events,
                ctx.settings.always_award_exp,
            );
            ctx.events.publish(CraftEvent::UnitCompleted {
                recipe: key.recipe.clone(),
                success: job.outcome.success,
                hq: job.outcome.hq,
                remaining: job.remaining,
                cue: def.cue_for(job.outcome.success).map(str::to_owned),
            });

            let continue_queue = job.remaining > 0
                && resolve::can_craft(&def, ctx.book, ctx.ledger, &*ctx.host);
            if continue_queue {
                resolve::take_ingredients(&def, ctx.ledger);
                let level = ctx.host.level(&def.profession);
                let bonus = ctx.host.success_bonus(&def.profession);
                let outcome = resolve::roll_outcome(&def, level, bonus, ctx.rng);
                job.remaining -= 1;
                job.outcome = outcome;
                job.due_at = now + u64::from(outcome.duration);
                job.phase = JobPhase::Running;
                debug!(key = %key, "craft continued to next queued unit");
            } else {
                let job = match self.jobs.remove(&key) {
                    Some(job) => job,
                    None => continue,
                };
                let level_up = ctx.settings.pop_scene_on_level
                    && match (job.level_snapshot, ctx.host.level(&def.profession)) {
                        (Some(before), Some(after)) => after > before,
                        _ => false,
                    };
                info!(key = %key, all_succeeded = job.all_succeeded, "craft finished");
                ctx.events.publish(CraftEvent::JobFinished {
                    recipe: key.recipe.clone(),
                    all_succeeded: job.all_succeeded,
                    level_up,
                    show_toast: !def.disable_complete_toast,
                    cue: def.cue_for(job.all_succeeded).map(str::to_owned),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NoProfessions;
    use crate::recipe::{RecipeDef, ResourceRequirement};
    use artisan_common::ResourceId;

    struct Fixture {
        catalog: RecipeCatalog,
        book: RecipeBook,
        ledger: Ledger,
        host: NoProfessions,
        rng: CraftRng,
        events: EventBus,
        settings: CraftSettings,
        scheduler: CraftScheduler,
    }

    impl Fixture {
        fn new(defs: Vec<RecipeDef>) -> Self {
            let mut catalog = RecipeCatalog::new();
            for def in defs {
                catalog.insert(def);
            }
            let mut book = RecipeBook::new();
            book.initialize(&catalog);
            Self {
                catalog,
                book,
                ledger: Ledger::new(),
                host: NoProfessions,
                rng: CraftRng::new(42),
                events: EventBus::default(),
                settings: CraftSettings::default(),
                scheduler: CraftScheduler::new(),
            }
        }

        fn start(&mut self, recipe: &str, scene: Option<&str>, count: u32, now: u64) -> StartOutcome {
            let mut ctx = CraftContext {
                catalog: &self.catalog,
                book: &mut self.book,
                ledger: &mut self.ledger,
                host: &mut self.host,
                rng: &mut self.rng,
                events: &self.events,
                settings: &self.settings,
            };
            self.scheduler.start(&mut ctx, recipe, scene, count, now)
        }

        fn tick(&mut self, now: u64) {
            let mut ctx = CraftContext {
                catalog: &self.catalog,
                book: &mut self.book,
                ledger: &mut self.ledger,
                host: &mut self.host,
                rng: &mut self.rng,
                events: &self.events,
                settings: &self.settings,
            };
            self.scheduler.tick(&mut ctx, now);
        }
    }

    fn sure_potion() -> RecipeDef {
        RecipeDef::builder("Potion", "Alchemy")
            .ingredient(ResourceRequirement::item(1, 2))
            .product(ResourceRequirement::item(10, 1))
            .success(100.0, 0.0)
            .craft_time(60)
            .discovered_by_default(true)
            .build()
    }

    #[test]
    fn test_job_key_display() {
        assert_eq!(JobKey::new("Potion", None).to_string(), "crafting-Potion");
        assert_eq!(
            JobKey::new("Potion", Some("menu")).to_string(),
            "crafting-Potion-menu"
        );
    }

    #[test]
    fn test_timed_craft_full_cycle() {
        let mut fx = Fixture::new(vec![sure_potion()]);
        fx.ledger.add(ResourceId::item(1), 4);

        assert_eq!(fx.start("Potion", None, 1, 0), StartOutcome::Started);
        // Ingredients taken up front.
        assert_eq!(fx.ledger.count(ResourceId::item(1)), 2);
        assert_eq!(fx.ledger.count(ResourceId::item(10)), 0);

        // Not due yet.
        fx.tick(59);
        assert!(fx.scheduler.is_crafting("Potion", None));

        fx.tick(60);
        assert!(!fx.scheduler.is_crafting("Potion", None));
        assert_eq!(fx.ledger.count(ResourceId::item(10)), 1);

        let events = fx.events.drain();
        assert!(matches!(events[0], CraftEvent::CraftStarted { .. }));
        assert!(matches!(
            events[1],
            CraftEvent::UnitCompleted { success: true, remaining: 0, .. }
        ));
        assert!(matches!(
            events[2],
            CraftEvent::JobFinished { all_succeeded: true, .. }
        ));
    }

    #[test]
    fn test_cues_ride_along_on_events() {
        let def = RecipeDef::builder("Potion", "Alchemy")
            .ingredient(ResourceRequirement::item(1, 1))
            .product(ResourceRequirement::item(10, 1))
            .success(100.0, 0.0)
            .craft_time(60)
            .discovered_by_default(true)
            .craft_cue("bubble")
            .success_cue("chime")
            .fail_cue("fizzle")
            .build();
        let mut fx = Fixture::new(vec![def]);
        fx.ledger.add(ResourceId::item(1), 1);

        assert_eq!(fx.start("Potion", None, 1, 0), StartOutcome::Started);
        fx.tick(60);

        let events = fx.events.drain();
        assert!(matches!(
            &events[0],
            CraftEvent::CraftStarted { cue: Some(c), .. } if c == "bubble"
        ));
        assert!(matches!(
            &events[1],
            CraftEvent::UnitCompleted { cue: Some(c), .. } if c == "chime"
        ));
        assert!(matches!(
            &events[2],
            CraftEvent::JobFinished { cue: Some(c), .. } if c == "chime"
        ));
    }

    #[test]
    fn test_instant_failure_uses_fail_cue() {
        let def = RecipeDef::builder("Dud", "Alchemy")
            .ingredient(ResourceRequirement::item(1, 1))
            .product(ResourceRequirement::item(10, 1))
            .success(0.0, 0.0)
            .discovered_by_default(true)
            .success_cue("chime")
            .fail_cue("fizzle")
            .build();
        let mut fx = Fixture::new(vec![def]);
        fx.settings.instant_crafting = true;
        fx.ledger.add(ResourceId::item(1), 1);

        assert_eq!(
            fx.start("Dud", None, 1, 0),
            StartOutcome::InstantDone { all_succeeded: false }
        );
        let events = fx.events.drain();
        assert!(matches!(
            events.last(),
            Some(CraftEvent::JobFinished { cue: Some(c), .. }) if c == "fizzle"
        ));
    }

    #[test]
    fn test_duplicate_key_rejected_distinct_keys_run() {
        let mut fx = Fixture::new(vec![sure_potion()]);
        fx.ledger.add(ResourceId::item(1), 10);

        assert_eq!(fx.start("Potion", Some("menu"), 1, 0), StartOutcome::Started);
        assert_eq!(fx.start("Potion", Some("menu"), 1, 0), StartOutcome::Busy);
        // Same recipe, different scene: its own slot.
        assert_eq!(fx.start("Potion", Some("field"), 1, 0), StartOutcome::Started);
        assert_eq!(fx.scheduler.active_jobs(), 2);
        assert!(fx.scheduler.is_scene_crafting("menu"));
        assert!(fx.scheduler.is_scene_crafting("field"));
        assert!(!fx.scheduler.is_scene_crafting("shop"));

        fx.tick(60);
        assert_eq!(fx.scheduler.active_jobs(), 0);
        assert_eq!(fx.ledger.count(ResourceId::item(10)), 2);
    }

    #[test]
    fn test_queue_continues_and_stops_when_starved() {
        let mut fx = Fixture::new(vec![sure_potion()]);
        // Stock for exactly two units.
        fx.ledger.add(ResourceId::item(1), 4);

        assert_eq!(fx.start("Potion", None, 3, 0), StartOutcome::Started);
        fx.tick(60);
        // Second unit started, third will starve.
        assert!(fx.scheduler.is_crafting("Potion", None));
        assert_eq!(fx.ledger.count(ResourceId::item(1)), 0);

        fx.tick(120);
        assert!(!fx.scheduler.is_crafting("Potion", None));
        assert_eq!(fx.ledger.count(ResourceId::item(10)), 2);

        let finished: Vec<_> = fx
            .events
            .drain()
            .into_iter()
            .filter(|e| matches!(e, CraftEvent::JobFinished { .. }))
            .collect();
        assert_eq!(finished.len(), 1);
    }

    #[test]
    fn test_start_not_eligible_when_undiscovered_or_poor() {
        let mut fx = Fixture::new(vec![RecipeDef::builder("Secret", "Alchemy")
            .ingredient(ResourceRequirement::item(1, 1))
            .success(100.0, 0.0)
            .build()]);
        fx.ledger.add(ResourceId::item(1), 5);

        assert_eq!(fx.start("Secret", None, 1, 0), StartOutcome::NotEligible);
        fx.book.discover("Secret", true);
        fx.ledger.remove(ResourceId::item(1), 5);
        assert_eq!(fx.start("Secret", None, 1, 0), StartOutcome::NotEligible);
        assert_eq!(fx.start("Missing", None, 1, 0), StartOutcome::UnknownRecipe);
    }

    #[test]
    fn test_failed_unit_grants_nothing_but_consumes() {
        let mut fx = Fixture::new(vec![RecipeDef::builder("Doomed", "Alchemy")
            .ingredient(ResourceRequirement::item(1, 1))
            .product(ResourceRequirement::item(10, 1))
            .success(0.0, 0.0)
            .craft_time(100)
            .discovered_by_default(true)
            .build()]);
        fx.ledger.add(ResourceId::item(1), 1);

        assert_eq!(fx.start("Doomed", None, 1, 0), StartOutcome::Started);
        let due = fx.scheduler.job("Doomed", None).map(CraftJob::due_at);
        // Failed units finish early but never before half time.
        let due = due.expect("job exists");
        assert!((50..=100).contains(&due));

        fx.tick(due);
        assert_eq!(fx.ledger.count(ResourceId::item(1)), 0);
        assert_eq!(fx.ledger.count(ResourceId::item(10)), 0);
        assert!(fx.events.drain().iter().any(|e| matches!(
            e,
            CraftEvent::JobFinished { all_succeeded: false, .. }
        )));
    }

    #[test]
    fn test_instant_batch_is_and_of_units() {
        let mut fx = Fixture::new(vec![sure_potion()]);
        fx.settings.instant_crafting = true;
        fx.ledger.add(ResourceId::item(1), 6);

        let outcome = fx.start("Potion", None, 3, 0);
        assert_eq!(outcome, StartOutcome::InstantDone { all_succeeded: true });
        assert_eq!(fx.ledger.count(ResourceId::item(10)), 3);
        assert_eq!(fx.ledger.count(ResourceId::item(1)), 0);
        assert_eq!(fx.scheduler.active_jobs(), 0);

        // A certain-failure batch reports failure.
        let mut fx = Fixture::new(vec![RecipeDef::builder("Doomed", "Alchemy")
            .ingredient(ResourceRequirement::item(1, 1))
            .success(0.0, 0.0)
            .discovered_by_default(true)
            .build()]);
        fx.settings.instant_crafting = true;
        fx.ledger.add(ResourceId::item(1), 3);
        assert_eq!(
            fx.start("Doomed", None, 3, 0),
            StartOutcome::InstantDone { all_succeeded: false }
        );
    }

    #[test]
    fn test_level_up_flag_is_advisory() {
        struct LevelingHost {
            level: u32,
        }
        impl crate::host::ProfessionHost for LevelingHost {
            fn level(&self, _profession: &str) -> Option<u32> {
                Some(self.level)
            }
            fn grant_exp(&mut self, _profession: &str, _exp: u32) {
                self.level += 1;
            }
        }

        let catalog = {
            let mut c = RecipeCatalog::new();
            c.insert(
                RecipeDef::builder("Potion", "Alchemy")
                    .ingredient(ResourceRequirement::item(1, 1))
                    .success(100.0, 0.0)
                    .experience(1)
                    .craft_time(60)
                    .discovered_by_default(true)
                    .build(),
            );
            c
        };
        let mut book = RecipeBook::new();
        book.initialize(&catalog);
        let mut ledger = Ledger::new();
        ledger.add(ResourceId::item(1), 1);
        let mut host = LevelingHost { level: 3 };
        let mut rng = CraftRng::new(1);
        let events = EventBus::default();
        let settings = CraftSettings {
            pop_scene_on_level: true,
            ..CraftSettings::default()
        };
        let mut scheduler = CraftScheduler::new();

        let mut ctx = CraftContext {
            catalog: &catalog,
            book: &mut book,
            ledger: &mut ledger,
            host: &mut host,
            rng: &mut rng,
            events: &events,
            settings: &settings,
        };
        assert_eq!(
            scheduler.start(&mut ctx, "Potion", None, 1, 0),
            StartOutcome::Started
        );
        scheduler.tick(&mut ctx, 60);

        assert!(events.drain().iter().any(|e| matches!(
            e,
            CraftEvent::JobFinished { level_up: true, .. }
        )));
        assert_eq!(host.level, 4);
    }

    #[test]
    fn test_count_is_clamped() {
        let mut fx = Fixture::new(vec![sure_potion()]);
        fx.settings.instant_crafting = true;
        fx.ledger.add(ResourceId::item(1), 2);

        // Zero is treated as one unit.
        assert_eq!(
            fx.start("Potion", None, 0, 0),
            StartOutcome::InstantDone { all_succeeded: true }
        );
        assert_eq!(fx.ledger.count(ResourceId::item(10)), 1);
    }
}
