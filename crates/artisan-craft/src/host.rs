//! Profession host abstraction.
//!
//! Leveling, equipment bonuses, experience and counter variables live in the
//! host game. The crafting core reaches them through this trait; hosts
//! without a leveling system use [`NoProfessions`].

/// Host-side profession and bookkeeping hooks.
pub trait ProfessionHost {
    /// Current level of a profession, or `None` if the host does not level
    /// it. Level-gated checks are skipped for unleveled professions.
    fn level(&self, profession: &str) -> Option<u32>;

    /// Flat success-percentage bonus from equipment or buffs.
    fn success_bonus(&self, _profession: &str) -> f64 {
        0.0
    }

    /// Grant profession experience for a successful unit.
    fn grant_exp(&mut self, _profession: &str, _exp: u32) {}

    /// Bump a host-side counter variable by one.
    fn increment_counter(&mut self, _counter: &str) {}
}

/// Null host: no professions, no experience, no counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProfessions;

impl ProfessionHost for NoProfessions {
    fn level(&self, _profession: &str) -> Option<u32> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_professions_is_inert() {
        let mut host = NoProfessions;
        assert_eq!(host.level("Smithing"), None);
        assert!((host.success_bonus("Smithing")).abs() < f64::EPSILON);
        host.grant_exp("Smithing", 10);
        host.increment_counter("crafts");
    }
}
