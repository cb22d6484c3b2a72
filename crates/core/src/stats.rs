//! Per-part material statistics and quality scaling.
//!
//! The same material contributes different stats depending on the part it is
//! smithed into: a bronze blade brings damage, a bronze handle brings swing
//! speed. Smithing quality then scales the offensive and durability stats of
//! that part. Attack speed and mining level are never affected by quality.

use crate::RegistryKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest possible smithing quality.
pub const QUALITY_MIN: i32 = 0;

/// Highest possible smithing quality (master work).
pub const QUALITY_MAX: i32 = 120;

/// Quality every smithing attempt starts from.
pub const QUALITY_NEUTRAL: i32 = 50;

/// Clamp a raw quality value into `[QUALITY_MIN, QUALITY_MAX]`.
pub fn clamp_quality(quality: i32) -> i32 {
    quality.clamp(QUALITY_MIN, QUALITY_MAX)
}

/// Role a crafted component plays, used alongside the material as a stats key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartType(RegistryKey);

impl PartType {
    /// Wrap an arbitrary part-type key (data packs may add their own).
    pub fn new(key: RegistryKey) -> Self {
        Self(key)
    }

    /// Cutting element.
    pub fn blade() -> Self {
        Self(RegistryKey::builtin("blade"))
    }

    /// Grip.
    pub fn handle() -> Self {
        Self(RegistryKey::builtin("handle"))
    }

    /// Bracing element between blade and handle.
    pub fn guard() -> Self {
        Self(RegistryKey::builtin("guard"))
    }

    /// Underlying registry key.
    pub fn key(&self) -> &RegistryKey {
        &self.0
    }
}

impl From<RegistryKey> for PartType {
    fn from(key: RegistryKey) -> Self {
        Self(key)
    }
}

impl fmt::Display for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Base statistics a material contributes to one part type.
///
/// Immutable once registered; [`PartStats::with_quality`] produces scaled
/// copies on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartStats {
    material: RegistryKey,
    part_type: PartType,
    durability: u32,
    attack_damage: f32,
    mining_speed: f32,
    attack_speed: f32,
    mining_level: u32,
}

impl PartStats {
    /// Stats for a head-style part (blade), with the default attack speed of 1.0.
    pub fn new(
        material: RegistryKey,
        part_type: PartType,
        durability: u32,
        attack_damage: f32,
        mining_speed: f32,
        mining_level: u32,
    ) -> Self {
        Self::full(
            material,
            part_type,
            durability,
            attack_damage,
            mining_speed,
            1.0,
            mining_level,
        )
    }

    /// Stats with every field supplied. Negative floats are floored at zero.
    pub fn full(
        material: RegistryKey,
        part_type: PartType,
        durability: u32,
        attack_damage: f32,
        mining_speed: f32,
        attack_speed: f32,
        mining_level: u32,
    ) -> Self {
        Self {
            material,
            part_type,
            durability,
            attack_damage: attack_damage.max(0.0),
            mining_speed: mining_speed.max(0.0),
            attack_speed: attack_speed.max(0.0),
            mining_level,
        }
    }

    /// Material these stats belong to.
    pub fn material(&self) -> &RegistryKey {
        &self.material
    }

    /// Part type these stats apply to.
    pub fn part_type(&self) -> &PartType {
        &self.part_type
    }

    /// Base durability contribution.
    pub fn durability(&self) -> u32 {
        self.durability
    }

    /// Attack damage contribution.
    pub fn attack_damage(&self) -> f32 {
        self.attack_damage
    }

    /// Mining speed contribution.
    pub fn mining_speed(&self) -> f32 {
        self.mining_speed
    }

    /// Attack speed multiplier (1.0 = normal).
    pub fn attack_speed(&self) -> f32 {
        self.attack_speed
    }

    /// Mining level tier (0 = wood .. 4 = netherite).
    pub fn mining_level(&self) -> u32 {
        self.mining_level
    }

    /// Scale these stats by a quality percentage.
    ///
    /// Durability is rounded to the nearest integer; attack damage and mining
    /// speed scale linearly; attack speed and mining level pass through
    /// unchanged. Callers clamp `quality_percent` into `[0, 120]` first.
    pub fn with_quality(&self, quality_percent: f32) -> PartStats {
        let multiplier = quality_percent / 100.0;
        let durability = (f64::from(self.durability) * f64::from(quality_percent) / 100.0).round();

        PartStats {
            material: self.material.clone(),
            part_type: self.part_type.clone(),
            durability: durability as u32,
            attack_damage: self.attack_damage * multiplier,
            mining_speed: self.mining_speed * multiplier,
            attack_speed: self.attack_speed,
            mining_level: self.mining_level,
        }
    }
}

impl fmt::Display for PartStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}: dur={}, dmg={:.1}, speed={:.1}",
            self.material, self.part_type, self.durability, self.attack_damage, self.mining_speed
        )
    }
}

/// Stats of a finished tool assembled from a blade, a handle and a guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolStats {
    /// Blade + guard durability.
    pub durability: u32,
    /// Blade + guard attack damage.
    pub attack_damage: f32,
    /// Blade mining speed.
    pub mining_speed: f32,
    /// Handle attack speed multiplier.
    pub attack_speed: f32,
    /// Blade mining level.
    pub mining_level: u32,
}

impl ToolStats {
    /// Combine already quality-scaled part stats into tool stats.
    pub fn assemble(blade: &PartStats, handle: &PartStats, guard: &PartStats) -> Self {
        Self {
            durability: blade.durability.saturating_add(guard.durability),
            attack_damage: blade.attack_damage + guard.attack_damage,
            mining_speed: blade.mining_speed,
            attack_speed: handle.attack_speed,
            mining_level: blade.mining_level,
        }
    }
}

/// Coarse classification of a quality percentage for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityGrade {
    /// Below 40%.
    Poor,
    /// 40% to 59%.
    Mediocre,
    /// 60% to 79%.
    Good,
    /// 80% to 99%.
    Great,
    /// 100% and above.
    Masterwork,
}

impl QualityGrade {
    /// Classify a quality percentage.
    pub fn classify(quality: i32) -> Self {
        match quality {
            q if q < 40 => QualityGrade::Poor,
            q if q < 60 => QualityGrade::Mediocre,
            q if q < 80 => QualityGrade::Good,
            q if q < 100 => QualityGrade::Great,
            _ => QualityGrade::Masterwork,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn steel_blade() -> PartStats {
        PartStats::new(
            RegistryKey::builtin("steel"),
            PartType::blade(),
            600,
            5.0,
            8.0,
            3,
        )
    }

    #[test]
    fn head_constructor_defaults_attack_speed() {
        assert_eq!(steel_blade().attack_speed(), 1.0);
    }

    #[test]
    fn negative_floats_are_floored() {
        let stats = PartStats::full(
            RegistryKey::builtin("odd"),
            PartType::guard(),
            10,
            -1.0,
            -2.0,
            -0.5,
            0,
        );
        assert_eq!(stats.attack_damage(), 0.0);
        assert_eq!(stats.mining_speed(), 0.0);
        assert_eq!(stats.attack_speed(), 0.0);
    }

    #[test]
    fn full_quality_is_identity() {
        assert_eq!(steel_blade().with_quality(100.0), steel_blade());
    }

    #[test]
    fn bronze_blade_at_85_percent() {
        let bronze = PartStats::new(
            RegistryKey::builtin("bronze"),
            PartType::blade(),
            250,
            2.5,
            5.0,
            1,
        );
        let scaled = bronze.with_quality(85.0);
        // 212.5 rounds up
        assert_eq!(scaled.durability(), 213);
        assert!((scaled.attack_damage() - 2.125).abs() < 1e-5);
        assert!((scaled.mining_speed() - 4.25).abs() < 1e-5);
        assert_eq!(scaled.mining_level(), 1);
    }

    #[test]
    fn master_work_exceeds_base() {
        let scaled = steel_blade().with_quality(120.0);
        assert_eq!(scaled.durability(), 720);
        assert!((scaled.attack_damage() - 6.0).abs() < 1e-5);
    }

    #[test]
    fn assemble_sums_blade_and_guard() {
        let blade = steel_blade().with_quality(85.0);
        let handle = PartStats::full(
            RegistryKey::builtin("bronze"),
            PartType::handle(),
            0,
            0.0,
            0.0,
            1.1,
            0,
        )
        .with_quality(70.0);
        let guard = PartStats::full(
            RegistryKey::builtin("iron"),
            PartType::guard(),
            150,
            1.0,
            0.0,
            1.0,
            0,
        )
        .with_quality(90.0);

        let tool = ToolStats::assemble(&blade, &handle, &guard);
        assert_eq!(tool.durability, 510 + 135);
        assert!((tool.attack_damage - (4.25 + 0.9)).abs() < 1e-4);
        assert!((tool.attack_speed - 1.1).abs() < 1e-6);
        assert_eq!(tool.mining_level, 3);
    }

    #[test]
    fn quality_grades() {
        assert_eq!(QualityGrade::classify(0), QualityGrade::Poor);
        assert_eq!(QualityGrade::classify(39), QualityGrade::Poor);
        assert_eq!(QualityGrade::classify(40), QualityGrade::Mediocre);
        assert_eq!(QualityGrade::classify(50), QualityGrade::Mediocre);
        assert_eq!(QualityGrade::classify(60), QualityGrade::Good);
        assert_eq!(QualityGrade::classify(80), QualityGrade::Great);
        assert_eq!(QualityGrade::classify(100), QualityGrade::Masterwork);
        assert_eq!(QualityGrade::classify(120), QualityGrade::Masterwork);
    }

    proptest! {
        #[test]
        fn scaling_rounds_durability_and_preserves_ergonomics(
            durability in 0u32..5000,
            damage in 0.0f32..50.0,
            speed in 0.0f32..50.0,
            attack_speed in 0.5f32..2.0,
            level in 0u32..5,
            quality in 0i32..=120,
        ) {
            let base = PartStats::full(
                RegistryKey::builtin("alloy"),
                PartType::blade(),
                durability,
                damage,
                speed,
                attack_speed,
                level,
            );
            let scaled = base.with_quality(quality as f32);

            let expected = (f64::from(durability) * f64::from(quality) / 100.0).round() as u32;
            prop_assert_eq!(scaled.durability(), expected);
            prop_assert_eq!(scaled.attack_speed(), attack_speed);
            prop_assert_eq!(scaled.mining_level(), level);
            prop_assert!((scaled.attack_damage() - damage * quality as f32 / 100.0).abs() < 1e-3);
            prop_assert_eq!(scaled.material(), base.material());
        }
    }
}
