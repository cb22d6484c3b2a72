#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod heat;
pub mod item;
pub mod material;
pub mod registry;
pub mod stats;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use heat::{TemperatureBand, MAX_FORGE_TEMPERATURE, MIN_SMITHING_TEMP};
pub use item::ItemStack;
pub use material::{Material, MaterialBuildError, MaterialBuilder, PhysicalProperties};
pub use registry::{RegistryKey, RegistryKeyError};
pub use stats::{PartStats, PartType, QualityGrade, ToolStats, QUALITY_MAX, QUALITY_NEUTRAL};

/// Nominal simulation rate.
pub const TICKS_PER_SECOND: u64 = 20;

/// Fixed tick type (20 TPS => 50 ms per tick).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any deterministic timeline.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }

    /// Whether this tick falls on a multiple of `interval`.
    pub fn is_multiple_of(self, interval: u64) -> bool {
        interval != 0 && self.0 % interval == 0
    }
}

/// Helper to derive a reproducible RNG seeded by session + tick domains.
pub fn scoped_rng(session_seed: u64, tick: SimTick) -> StdRng {
    let seed = session_seed ^ tick.0.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    StdRng::seed_from_u64(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn tick_cadence() {
        assert!(SimTick::ZERO.is_multiple_of(4));
        assert!(!SimTick(3).is_multiple_of(4));
        assert!(SimTick(8).is_multiple_of(4));
        assert!(!SimTick(8).is_multiple_of(0));
        assert_eq!(SimTick(8).advance(2), SimTick(10));
    }

    #[test]
    fn scoped_rng_is_reproducible() {
        let a: f32 = scoped_rng(7, SimTick(12)).gen();
        let b: f32 = scoped_rng(7, SimTick(12)).gen();
        let c: f32 = scoped_rng(7, SimTick(13)).gen();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
