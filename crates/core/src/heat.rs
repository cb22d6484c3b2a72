//! Metal temperature thresholds and display bands.
//!
//! Temperatures are whole degrees carried on items and held by forges and
//! anvils. All rates are expressed per tick at [`crate::TICKS_PER_SECOND`].

use serde::{Deserialize, Serialize};

/// Hottest a forge will drive its held item.
pub const MAX_FORGE_TEMPERATURE: i32 = 1400;

/// Coldest metal that can still be worked on an anvil.
pub const MIN_SMITHING_TEMP: i32 = 800;

/// Degrees gained per tick while a lit forge holds an item (20 °/s at 20 TPS).
pub const FORGE_HEAT_PER_TICK: i32 = 1;

/// Degrees lost each time an anvil cools its held item.
pub const ANVIL_COOLING_STEP: i32 = 1;

/// Anvils cool once every this many ticks (net 5 °/s at 20 TPS).
pub const ANVIL_COOLING_INTERVAL_TICKS: u64 = 4;

/// Start of the ideal working band.
pub const IDEAL_TEMP: i32 = 1200;

/// Coarse classification of a metal temperature for display and feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TemperatureBand {
    /// Below [`MIN_SMITHING_TEMP`]; must be reheated.
    TooCold,
    /// Hot enough to smith.
    Workable,
    /// Best working heat.
    Ideal,
    /// Above the forge cap.
    VeryHot,
}

impl TemperatureBand {
    /// Classify a temperature in degrees.
    pub fn classify(temperature: i32) -> Self {
        if temperature < MIN_SMITHING_TEMP {
            TemperatureBand::TooCold
        } else if temperature < IDEAL_TEMP {
            TemperatureBand::Workable
        } else if temperature <= MAX_FORGE_TEMPERATURE {
            TemperatureBand::Ideal
        } else {
            TemperatureBand::VeryHot
        }
    }

    /// Whether metal in this band accepts hammer strikes.
    pub fn is_workable(self) -> bool {
        !matches!(self, TemperatureBand::TooCold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges() {
        assert_eq!(TemperatureBand::classify(0), TemperatureBand::TooCold);
        assert_eq!(TemperatureBand::classify(799), TemperatureBand::TooCold);
        assert_eq!(TemperatureBand::classify(800), TemperatureBand::Workable);
        assert_eq!(TemperatureBand::classify(1199), TemperatureBand::Workable);
        assert_eq!(TemperatureBand::classify(1200), TemperatureBand::Ideal);
        assert_eq!(TemperatureBand::classify(1400), TemperatureBand::Ideal);
        assert_eq!(TemperatureBand::classify(1401), TemperatureBand::VeryHot);
    }

    #[test]
    fn only_too_cold_is_unworkable() {
        assert!(!TemperatureBand::TooCold.is_workable());
        assert!(TemperatureBand::Workable.is_workable());
        assert!(TemperatureBand::Ideal.is_workable());
        assert!(TemperatureBand::VeryHot.is_workable());
    }
}
