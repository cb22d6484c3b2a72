#![warn(missing_docs)]
//! Material pack schema, loading, and the shared material stat registry.

mod builtin;
mod loader;
mod registry;

pub use builtin::{starter_pack, STARTER_MATERIALS_JSON};
pub use loader::{pack_from_file, pack_from_str, MaterialPack};
pub use registry::{MaterialRegistry, RegistrySummary};

use emberforge_core::{MaterialBuildError, RegistryKeyError};
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Top-level JSON document of a material pack.
#[derive(Debug, Deserialize)]
pub struct MaterialPackFile {
    /// Materials declared by this pack.
    pub materials: Vec<MaterialDefinition>,
}

/// One material entry in a pack.
#[derive(Debug, Deserialize)]
pub struct MaterialDefinition {
    /// Namespaced id (`emberforge:bronze`, or bare `bronze`).
    pub id: String,
    /// Display name (defaults to the id path).
    #[serde(default)]
    pub display_name: Option<String>,
    /// Progression tier.
    #[serde(default)]
    pub tier: u32,
    /// Physical properties, each clamped into `[0, 10]`.
    pub properties: PropertiesDefinition,
    /// RGB tint (defaults to white).
    #[serde(default)]
    pub color: Option<u32>,
    /// Stats keyed by part type id (`blade`, `emberforge:handle`, ...).
    #[serde(default)]
    pub parts: BTreeMap<String, PartStatsDefinition>,
}

/// Physical property block of a [`MaterialDefinition`].
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PropertiesDefinition {
    /// Edge hardness.
    pub hardness: f32,
    /// Impact toughness.
    pub toughness: f32,
    /// Flexibility.
    pub flexibility: f32,
    /// Density / weight.
    pub density: f32,
}

/// Stats a material contributes to one part type.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PartStatsDefinition {
    /// Base durability.
    #[serde(default)]
    pub durability: u32,
    /// Base attack damage.
    #[serde(default)]
    pub attack_damage: f32,
    /// Base mining speed bonus.
    #[serde(default)]
    pub mining_speed: f32,
    /// Attack speed multiplier.
    #[serde(default = "default_attack_speed")]
    pub attack_speed: f32,
    /// Mining level tier.
    #[serde(default)]
    pub mining_level: u32,
}

fn default_attack_speed() -> f32 {
    1.0
}

/// Errors emitted during pack loading.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Wrap IO errors when reading packs.
    #[error("failed to read material pack: {0}")]
    Io(#[from] std::io::Error),
    /// Wrap serde parsing issues.
    #[error("failed to parse material pack: {0}")]
    Parse(#[from] serde_json::Error),
    /// A material or part id is not a valid registry key.
    #[error("invalid id in material pack: {0}")]
    InvalidKey(#[from] RegistryKeyError),
    /// A material could not be built.
    #[error("invalid material in pack: {0}")]
    Build(#[from] MaterialBuildError),
    /// The same material id appears twice in one pack.
    #[error("duplicate material {0} in pack")]
    Duplicate(String),
}

/// Parse a JSON string into raw material definitions.
pub fn load_materials_from_str(input: &str) -> Result<Vec<MaterialDefinition>, AssetError> {
    let file: MaterialPackFile = serde_json::from_str(input)?;
    Ok(file.materials)
}
