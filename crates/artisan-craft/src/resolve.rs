//! Craft resolution: eligibility, repeat counts, outcome rolls and their
//! application to the ledger and book.
//!
//! Everything here is a pure function over explicitly passed state; the
//! scheduler and session decide when these run.

use tracing::debug;

use crate::book::RecipeBook;
use crate::catalog::RecipeCatalog;
use crate::events::{CraftEvent, EventBus};
use crate::host::ProfessionHost;
use crate::ledger::Ledger;
use crate::recipe::RecipeDef;
use crate::rng::CraftRng;

/// Hard cap on units per multicraft batch.
pub const MAX_MULTICRAFT: u32 = 99;

/// Outcome of a single unit, rolled once at commit time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RolledOutcome {
    /// Whether the unit succeeds.
    pub success: bool,
    /// Whether the unit comes out high quality. Only set on success.
    pub hq: bool,
    /// Ticks until the unit completes.
    pub duration: u32,
}

fn clamp_rate(rate: f64) -> f64 {
    rate.clamp(0.0, 100.0)
}

/// Success percentage after level scaling and host bonuses, clamped 0-100.
///
/// The per-level term only applies when the host levels the profession.
#[must_use]
pub fn effective_success_rate(def: &RecipeDef, level: Option<u32>, bonus: f64) -> f64 {
    let scaled = match level {
        Some(level) => {
            def.success_per_level * (f64::from(level) - f64::from(def.level_requirement))
        }
        None => 0.0,
    };
    clamp_rate(def.success_rate + scaled + bonus)
}

/// High-quality percentage after level scaling, clamped 0-100.
#[must_use]
pub fn effective_hq_rate(def: &RecipeDef, level: Option<u32>) -> f64 {
    let scaled = match level {
        Some(level) => def.hq_per_level * (f64::from(level) - f64::from(def.level_requirement)),
        None => 0.0,
    };
    clamp_rate(def.hq_chance + scaled)
}

/// Whether one unit of the recipe can be crafted right now.
///
/// True when the recipe is discovered, the profession level (if the host
/// levels it) meets the requirement, every ingredient and tool is owned in
/// sufficient quantity, and no concrete product already sits at its unique
/// cap.
#[must_use]
pub fn can_craft(
    def: &RecipeDef,
    book: &RecipeBook,
    ledger: &Ledger,
    host: &dyn ProfessionHost,
) -> bool {
    if !book.is_discovered(&def.name) {
        return false;
    }
    if let Some(level) = host.level(&def.profession) {
        if level < def.level_requirement {
            return false;
        }
    }
    requirements_met(def, ledger)
}

/// Whether the ledger covers one unit's ingredients and tools and no
/// concrete product sits at its unique cap. Ignores discovery and level.
#[must_use]
pub fn requirements_met(def: &RecipeDef, ledger: &Ledger) -> bool {
    if unique_headroom(def, ledger) == Some(0) {
        return false;
    }
    stocks_met(def, ledger)
}

/// Whether the ledger covers one unit's ingredients and tools. Unlike
/// [`requirements_met`] this ignores unique caps, so a recipe whose
/// product is maxed out still counts as stocked.
#[must_use]
pub fn stocks_met(def: &RecipeDef, ledger: &Ledger) -> bool {
    def.ingredients
        .iter()
        .chain(def.tools.iter())
        .all(|req| ledger.amount_owned(&req.target) >= req.amount)
}

/// Smallest remaining unique-cap headroom across concrete products, or
/// `None` when the recipe has no cap.
fn unique_headroom(def: &RecipeDef, ledger: &Ledger) -> Option<u32> {
    if def.unique_cap == 0 {
        return None;
    }
    def.products
        .iter()
        .filter_map(|req| req.target.as_resource())
        .map(|id| def.unique_cap.saturating_sub(ledger.count(id)))
        .min()
}

/// Maximum units craftable back to back, from ingredient stocks and unique
/// headroom. Capped at [`MAX_MULTICRAFT`]; 0 when any factor bottoms out.
#[must_use]
pub fn max_repeatable(def: &RecipeDef, ledger: &Ledger) -> u32 {
    let mut max = MAX_MULTICRAFT;
    for req in &def.ingredients {
        // Zero-amount requirements constrain nothing. The loader rejects
        // them, but definitions built in code can still carry one.
        if req.amount == 0 {
            continue;
        }
        let owned = ledger.amount_owned(&req.target);
        max = max.min(owned / req.amount);
    }
    if let Some(headroom) = unique_headroom(def, ledger) {
        max = max.min(headroom);
    }
    max
}

/// Roll one unit's outcome.
///
/// Success is a single uniform roll against the effective rate. A failed
/// unit still takes at least half the full craft time; high quality is
/// rolled only on success.
pub fn roll_outcome(
    def: &RecipeDef,
    level: Option<u32>,
    bonus: f64,
    rng: &mut CraftRng,
) -> RolledOutcome {
    let success = rng.range(0.0, 100.0) < effective_success_rate(def, level, bonus);
    let hq = success && rng.range(0.0, 100.0) < effective_hq_rate(def, level);
    let duration = if success {
        def.craft_time
    } else {
        let partial = (rng.next_f64() * f64::from(def.craft_time)) as u32;
        partial.max(def.craft_time / 2)
    };
    RolledOutcome {
        success,
        hq,
        duration,
    }
}

/// Debit one unit's ingredients. This is the irreversible commit point; a
/// later failure does not refund them.
pub fn take_ingredients(def: &RecipeDef, ledger: &mut Ledger) {
    for req in &def.ingredients {
        ledger.take(&req.target, req.amount);
    }
}

/// Apply one rolled unit: experience, craft counters, cascades and product
/// grants. Ingredients must already have been taken.
#[allow(clippy::too_many_arguments)]
pub fn apply_outcome(
    def: &RecipeDef,
    outcome: RolledOutcome,
    catalog: &RecipeCatalog,
    book: &mut RecipeBook,
    ledger: &mut Ledger,
    host: &mut dyn ProfessionHost,
    rng: &mut CraftRng,
    events: &EventBus,
    always_award_exp: bool,
) {
    if outcome.success || always_award_exp {
        host.grant_exp(&def.profession, def.experience);
    }
    if outcome.success {
        book.record_craft(&def.name);
        run_cascades(def, catalog, book, rng, events);
        if let Some(counter) = &def.success_counter {
            host.increment_counter(counter);
        }
    }
    for req in def.products_for(outcome.success, outcome.hq) {
        ledger.give(&req.target, req.amount);
    }
    debug!(
        recipe = %def.name,
        success = outcome.success,
        hq = outcome.hq,
        "craft unit applied"
    );
}

/// Roll learn cascades, then unlearn cascades.
///
/// Each entry rolls independently; entries naming unknown recipes or
/// recipes already in the target state do nothing.
fn run_cascades(
    def: &RecipeDef,
    catalog: &RecipeCatalog,
    book: &mut RecipeBook,
    rng: &mut CraftRng,
    events: &EventBus,
) {
    for cascade in &def.learn_on_craft {
        if book.state(&cascade.recipe).map_or(true, |s| s.discovered) {
            continue;
        }
        if rng.range(0.0, 100.0) <= cascade.chance {
            book.discover(&cascade.recipe, true);
            let show_toast = catalog
                .get(&cascade.recipe)
                .map_or(true, |d| !d.disable_learn_toast);
            events.publish(CraftEvent::RecipeLearned {
                recipe: cascade.recipe.clone(),
                show_toast,
            });
        }
    }
    for cascade in &def.unlearn_on_craft {
        if !book.is_discovered(&cascade.recipe) {
            continue;
        }
        if rng.range(0.0, 100.0) <= cascade.chance {
            book.discover(&cascade.recipe, false);
            events.publish(CraftEvent::RecipeUnlearned {
                recipe: cascade.recipe.clone(),
            });
        }
    }
}
