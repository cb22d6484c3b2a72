use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use emberforge_core::{Material, PartStats, PartType, RegistryKey};

use crate::{AssetError, MaterialDefinition};

/// Validated materials and stats ready to be registered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialPack {
    /// Materials in declaration order.
    pub materials: Vec<Material>,
    /// Per-part stats in declaration order.
    pub stats: Vec<PartStats>,
}

impl MaterialPack {
    /// Validate raw definitions into a pack.
    ///
    /// Part ids without a namespace take the default one (`blade` ->
    /// `emberforge:blade`). A material id declared twice is an error.
    pub fn from_definitions(defs: Vec<MaterialDefinition>) -> Result<Self, AssetError> {
        let mut pack = MaterialPack::default();
        let mut seen: BTreeSet<RegistryKey> = BTreeSet::new();

        for def in defs {
            let id = RegistryKey::parse(&def.id)?;
            if !seen.insert(id.clone()) {
                return Err(AssetError::Duplicate(id.to_string()));
            }

            let props = def.properties;
            let mut builder = Material::builder(id.clone()).tier(def.tier).properties(
                props.hardness,
                props.toughness,
                props.flexibility,
                props.density,
            );
            if let Some(name) = def.display_name {
                builder = builder.display_name(name);
            }
            if let Some(color) = def.color {
                builder = builder.color(color);
            }
            pack.materials.push(builder.build()?);

            for (part, stats) in def.parts {
                let part_type = PartType::new(RegistryKey::parse(&part)?);
                pack.stats.push(PartStats::full(
                    id.clone(),
                    part_type,
                    stats.durability,
                    stats.attack_damage,
                    stats.mining_speed,
                    stats.attack_speed,
                    stats.mining_level,
                ));
            }
        }

        Ok(pack)
    }
}

/// Load a material pack from the provided JSON file path.
pub fn pack_from_file(path: &Path) -> Result<MaterialPack, AssetError> {
    let data = fs::read_to_string(path)?;
    pack_from_str(&data)
}

/// Load a material pack from an in-memory JSON string.
pub fn pack_from_str(input: &str) -> Result<MaterialPack, AssetError> {
    let defs = crate::load_materials_from_str(input)?;
    MaterialPack::from_definitions(defs)
}
