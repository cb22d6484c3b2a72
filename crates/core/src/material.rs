//! Smithable materials and their intrinsic physical properties.

use crate::RegistryKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Upper bound of every physical property scale.
pub const PROPERTY_MAX: f32 = 10.0;

/// Default render tint for materials that do not set one.
pub const DEFAULT_COLOR: u32 = 0xFF_FFFF;

/// Intrinsic physical properties, each clamped to `[0, 10]`.
///
/// These are not tool stats; they describe the metal itself (edge hardness,
/// impact toughness, flex, weight).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalProperties {
    hardness: f32,
    toughness: f32,
    flexibility: f32,
    density: f32,
}

impl PhysicalProperties {
    /// Create properties, clamping each value into `[0, 10]`.
    pub fn new(hardness: f32, toughness: f32, flexibility: f32, density: f32) -> Self {
        Self {
            hardness: clamp_property(hardness),
            toughness: clamp_property(toughness),
            flexibility: clamp_property(flexibility),
            density: clamp_property(density),
        }
    }

    /// Edge hardness.
    pub fn hardness(&self) -> f32 {
        self.hardness
    }

    /// Impact toughness.
    pub fn toughness(&self) -> f32 {
        self.toughness
    }

    /// Flexibility.
    pub fn flexibility(&self) -> f32 {
        self.flexibility
    }

    /// Density / weight.
    pub fn density(&self) -> f32 {
        self.density
    }
}

impl fmt::Display for PhysicalProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Props{{H:{:.1} T:{:.1} F:{:.1} D:{:.1}}}",
            self.hardness, self.toughness, self.flexibility, self.density
        )
    }
}

fn clamp_property(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, PROPERTY_MAX)
}

/// A registered material (bronze, iron, steel, ...). Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    id: RegistryKey,
    display_name: String,
    tier: u32,
    properties: PhysicalProperties,
    color: u32,
}

impl Material {
    /// Start building a material with the given id.
    pub fn builder(id: RegistryKey) -> MaterialBuilder {
        MaterialBuilder::new(id)
    }

    /// Unique id (e.g. `emberforge:bronze`).
    pub fn id(&self) -> &RegistryKey {
        &self.id
    }

    /// Display name for UIs.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Progression tier (0 = wood, 1 = copper/bronze, 2 = iron, ...).
    pub fn tier(&self) -> u32 {
        self.tier
    }

    /// Physical properties.
    pub fn properties(&self) -> &PhysicalProperties {
        &self.properties
    }

    /// RGB tint.
    pub fn color(&self) -> u32 {
        self.color
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Material{{{}, tier={}}}", self.id, self.tier)
    }
}

/// Error returned by [`MaterialBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaterialBuildError {
    /// `properties(..)` was never called.
    #[error("material {0} has no physical properties")]
    MissingProperties(RegistryKey),
}

/// Builder for [`Material`].
///
/// Display name defaults to the id path, tier to 0 and color to white.
#[derive(Debug, Clone)]
pub struct MaterialBuilder {
    id: RegistryKey,
    display_name: String,
    tier: u32,
    properties: Option<PhysicalProperties>,
    color: u32,
}

impl MaterialBuilder {
    fn new(id: RegistryKey) -> Self {
        let display_name = id.path().to_string();
        Self {
            id,
            display_name,
            tier: 0,
            properties: None,
            color: DEFAULT_COLOR,
        }
    }

    /// Set the display name.
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Set the progression tier.
    pub fn tier(mut self, tier: u32) -> Self {
        self.tier = tier;
        self
    }

    /// Set the physical properties (clamped into `[0, 10]`).
    pub fn properties(mut self, hardness: f32, toughness: f32, flexibility: f32, density: f32) -> Self {
        self.properties = Some(PhysicalProperties::new(
            hardness,
            toughness,
            flexibility,
            density,
        ));
        self
    }

    /// Set the RGB tint.
    pub fn color(mut self, rgb: u32) -> Self {
        self.color = rgb & 0xFF_FFFF;
        self
    }

    /// Finish the material. Fails if properties were never set.
    pub fn build(self) -> Result<Material, MaterialBuildError> {
        let properties = self
            .properties
            .ok_or_else(|| MaterialBuildError::MissingProperties(self.id.clone()))?;
        Ok(Material {
            id: self.id,
            display_name: self.display_name,
            tier: self.tier,
            properties,
            color: self.color,
        })
    }
}
