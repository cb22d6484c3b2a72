use std::collections::BTreeMap;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use emberforge_core::{stats::clamp_quality, ItemStack, Material, PartStats, PartType, RegistryKey};
use tracing::{debug, info, warn};

use crate::MaterialPack;

#[derive(Debug, Default)]
struct Tables {
    materials: BTreeMap<RegistryKey, Material>,
    stats: BTreeMap<RegistryKey, BTreeMap<PartType, PartStats>>,
}

impl Tables {
    fn insert_material(&mut self, material: Material) {
        let id = material.id().clone();
        info!(
            "Registered material {} (tier {})",
            material.display_name(),
            material.tier()
        );
        if self.materials.insert(id.clone(), material).is_some() {
            warn!("Material {} was already registered; overwriting", id);
        }
    }

    fn insert_stats(&mut self, stats: PartStats) {
        let material = stats.material().clone();
        let part_type = stats.part_type().clone();
        let for_material = self.stats.entry(material.clone()).or_default();
        if for_material.insert(part_type.clone(), stats).is_some() {
            warn!(
                "Stats for {}/{} already exist; overwriting",
                material, part_type
            );
        } else {
            debug!("Registered stats {}/{}", material, part_type);
        }
    }

    fn clear(&mut self) {
        self.materials.clear();
        self.stats.clear();
    }
}

/// Counts reported by [`MaterialRegistry::summary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrySummary {
    /// Registered materials.
    pub materials: usize,
    /// Registered (material, part type) stat entries.
    pub stats: usize,
}

impl fmt::Display for RegistrySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Materials: {}, Total Stats: {}", self.materials, self.stats)
    }
}

/// Process-wide store of materials and their per-part base stats.
///
/// Construct once at startup and share it behind an `Arc`. Reads take a
/// shared lock and return owned snapshots; writes (registration, reload) take
/// the exclusive lock, so a reader never observes a half-applied update.
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    tables: RwLock<Tables>,
}

impl MaterialRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        info!("Initializing material registry");
        Self::default()
    }

    /// Create a registry pre-filled with `pack`.
    pub fn with_pack(pack: MaterialPack) -> Self {
        let registry = Self::new();
        registry.register_pack(pack);
        registry
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register (or overwrite, with a warning) a material.
    pub fn register_material(&self, material: Material) {
        self.write().insert_material(material);
    }

    /// Register (or overwrite, with a warning) stats for a (material, part type) pair.
    pub fn register_stats(&self, stats: PartStats) {
        self.write().insert_stats(stats);
    }

    /// Register every material and stat entry of `pack` under one write lock.
    pub fn register_pack(&self, pack: MaterialPack) {
        let mut tables = self.write();
        for material in pack.materials {
            tables.insert_material(material);
        }
        for stats in pack.stats {
            tables.insert_stats(stats);
        }
    }

    /// Replace the whole registry contents with `pack` atomically (full reload).
    pub fn replace_all(&self, pack: MaterialPack) {
        let mut tables = self.write();
        info!("Reloading material registry");
        tables.clear();
        for material in pack.materials {
            tables.insert_material(material);
        }
        for stats in pack.stats {
            tables.insert_stats(stats);
        }
    }

    /// Look up a material by id.
    pub fn material(&self, id: &RegistryKey) -> Option<Material> {
        self.read().materials.get(id).cloned()
    }

    /// Look up base stats for a material and part type.
    pub fn stats(&self, material: &RegistryKey, part_type: &PartType) -> Option<PartStats> {
        self.read()
            .stats
            .get(material)
            .and_then(|parts| parts.get(part_type))
            .cloned()
    }

    /// Snapshot of all materials, ordered by id.
    pub fn all_materials(&self) -> Vec<Material> {
        self.read().materials.values().cloned().collect()
    }

    /// Snapshot of every part's stats for one material (empty if unknown).
    pub fn all_stats_for_material(&self, material: &RegistryKey) -> BTreeMap<PartType, PartStats> {
        self.read()
            .stats
            .get(material)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether a material is registered.
    pub fn has_material(&self, id: &RegistryKey) -> bool {
        self.read().materials.contains_key(id)
    }

    /// Whether stats exist for a material and part type.
    pub fn has_stats(&self, material: &RegistryKey, part_type: &PartType) -> bool {
        self.read()
            .stats
            .get(material)
            .is_some_and(|parts| parts.contains_key(part_type))
    }

    /// Empty both tables atomically.
    pub fn clear(&self) {
        info!("Clearing material registry");
        self.write().clear();
    }

    /// Material and stat entry counts.
    pub fn summary(&self) -> RegistrySummary {
        let tables = self.read();
        RegistrySummary {
            materials: tables.materials.len(),
            stats: tables.stats.values().map(BTreeMap::len).sum(),
        }
    }

    /// Resolve the effective stats of a tool part item.
    ///
    /// Uses the item's material tag and its item id as the part type, then
    /// scales by its quality (100% if never smithed). Returns `None` for
    /// untagged items or unknown (material, part) pairs.
    pub fn scaled_stats_for(&self, stack: &ItemStack) -> Option<PartStats> {
        let material = stack.material()?;
        let part_type = PartType::new(stack.item.clone());
        let base = self.stats(material, &part_type)?;
        let quality = stack.quality().map(clamp_quality).unwrap_or(100);
        Some(base.with_quality(quality as f32))
    }
}
