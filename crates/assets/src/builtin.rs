//! Starter materials shipped with the crate.

use crate::{pack_from_str, AssetError, MaterialPack};

/// Bronze, iron and steel with blade/handle/guard stats.
pub const STARTER_MATERIALS_JSON: &str = include_str!("../data/starter_materials.json");

/// Parse the built-in starter pack.
pub fn starter_pack() -> Result<MaterialPack, AssetError> {
    pack_from_str(STARTER_MATERIALS_JSON)
}
