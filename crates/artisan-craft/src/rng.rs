//! Deterministic random number generation for craft outcome rolls.

/// Simple LCG random number generator for deterministic crafting.
#[derive(Debug, Clone)]
pub struct CraftRng {
    state: u64,
}

impl CraftRng {
    /// Create a new RNG with seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Get next random u64.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.state
    }

    /// Get random f64 in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Get random value in range [min, max).
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Get random u32 in range [min, max].
    pub fn range_u32(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        min + (self.next_u64() % u64::from(max - min + 1)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_for_seed() {
        let mut a = CraftRng::new(42);
        let mut b = CraftRng::new(42);
        for _ in 0..16 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_next_f64_in_unit_range() {
        let mut rng = CraftRng::new(7);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_range_bounds() {
        let mut rng = CraftRng::new(99);
        for _ in 0..1000 {
            let v = rng.range(0.0, 100.0);
            assert!((0.0..100.0).contains(&v));
        }
        for _ in 0..100 {
            let v = rng.range_u32(3, 9);
            assert!((3..=9).contains(&v));
        }
        assert_eq!(rng.range_u32(5, 5), 5);
        assert_eq!(rng.range_u32(9, 3), 9);
    }
}
