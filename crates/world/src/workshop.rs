//! A set of forges and anvils driven by one simulation clock.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use emberforge_core::SimTick;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::anvil::Anvil;
use crate::container::SlotContainer;
use crate::forge::{Forge, FORGE_ITEM_SLOT};
use crate::persist::{read_record, write_record, PersistError, StationRecord};

/// Identifier of a station within a workshop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StationId(pub u32);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a forge-to-anvil transfer did not happen. Nothing moves on error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("no forge {0}")]
    UnknownForge(StationId),
    #[error("no anvil {0}")]
    UnknownAnvil(StationId),
    #[error("forge {0} holds nothing")]
    ForgeEmpty(StationId),
    #[error("anvil {0} already holds a workpiece")]
    AnvilOccupied(StationId),
    #[error("workpiece at {0} degrees is too cold to smith")]
    TooCold(i32),
}

/// Forges and anvils ticked together in id order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workshop {
    now: SimTick,
    next_id: u32,
    forges: BTreeMap<StationId, Forge>,
    anvils: BTreeMap<StationId, Anvil>,
}

impl Workshop {
    /// Empty workshop at tick zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation tick.
    pub fn now(&self) -> SimTick {
        self.now
    }

    fn allocate_id(&mut self) -> StationId {
        let id = StationId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a forge and return its id.
    pub fn add_forge(&mut self) -> StationId {
        let id = self.allocate_id();
        self.forges.insert(id, Forge::new());
        debug!(%id, "Added forge");
        id
    }

    /// Add an anvil and return its id.
    pub fn add_anvil(&mut self) -> StationId {
        let id = self.allocate_id();
        self.anvils.insert(id, Anvil::new());
        debug!(%id, "Added anvil");
        id
    }

    pub fn forge(&self, id: StationId) -> Option<&Forge> {
        self.forges.get(&id)
    }

    pub fn forge_mut(&mut self, id: StationId) -> Option<&mut Forge> {
        self.forges.get_mut(&id)
    }

    pub fn anvil(&self, id: StationId) -> Option<&Anvil> {
        self.anvils.get(&id)
    }

    pub fn anvil_mut(&mut self, id: StationId) -> Option<&mut Anvil> {
        self.anvils.get_mut(&id)
    }

    /// Forges in id order.
    pub fn forges(&self) -> impl Iterator<Item = (StationId, &Forge)> {
        self.forges.iter().map(|(id, forge)| (*id, forge))
    }

    /// Anvils in id order.
    pub fn anvils(&self) -> impl Iterator<Item = (StationId, &Anvil)> {
        self.anvils.iter().map(|(id, anvil)| (*id, anvil))
    }

    /// Tick every station once at the current time, then advance the clock.
    pub fn tick(&mut self) {
        let now = self.now;
        for forge in self.forges.values_mut() {
            forge.tick();
        }
        for anvil in self.anvils.values_mut() {
            anvil.tick(now);
        }
        self.now = now.advance(1);
    }

    /// Run `count` ticks.
    pub fn run(&mut self, count: u64) {
        for _ in 0..count {
            self.tick();
        }
    }

    /// Move the forge's item onto the anvil's input slot.
    pub fn move_forge_item_to_anvil(
        &mut self,
        forge_id: StationId,
        anvil_id: StationId,
    ) -> Result<(), TransferError> {
        let anvil = self
            .anvils
            .get_mut(&anvil_id)
            .ok_or(TransferError::UnknownAnvil(anvil_id))?;
        let forge = self
            .forges
            .get_mut(&forge_id)
            .ok_or(TransferError::UnknownForge(forge_id))?;

        if anvil.input().is_some() {
            return Err(TransferError::AnvilOccupied(anvil_id));
        }
        let item = forge.item().ok_or(TransferError::ForgeEmpty(forge_id))?;
        if !item.is_hot() {
            return Err(TransferError::TooCold(item.temperature().unwrap_or(0)));
        }

        let item = forge.take_item().ok_or(TransferError::ForgeEmpty(forge_id))?;
        if let Err(rejected) = anvil.place_input(item) {
            warn!(%forge_id, %anvil_id, "Anvil refused workpiece; returning it to the forge");
            forge.set(FORGE_ITEM_SLOT, Some(rejected));
            return Err(TransferError::AnvilOccupied(anvil_id));
        }
        info!(%forge_id, %anvil_id, temperature = anvil.temperature(), "Moved workpiece to anvil");
        Ok(())
    }

    /// Encode the whole workshop.
    pub fn save(&self) -> Value {
        let forges: Vec<Value> = self
            .forges
            .iter()
            .map(|(id, forge)| json!({ "id": id.0, "state": forge.save() }))
            .collect();
        let anvils: Vec<Value> = self
            .anvils
            .iter()
            .map(|(id, anvil)| json!({ "id": id.0, "state": anvil.save() }))
            .collect();
        json!({
            "tick": self.now.0,
            "next_id": self.next_id,
            "forges": forges,
            "anvils": anvils,
        })
    }

    /// Decode a workshop, skipping station entries without a usable id.
    pub fn load(record: &Value) -> Self {
        let mut workshop = Workshop {
            now: SimTick(record.get("tick").and_then(Value::as_u64).unwrap_or(0)),
            ..Workshop::default()
        };
        for (id, state) in station_entries(record, "forges") {
            workshop.forges.insert(id, Forge::load(state));
        }
        for (id, state) in station_entries(record, "anvils") {
            workshop.anvils.insert(id, Anvil::load(state));
        }

        let highest = workshop
            .forges
            .keys()
            .chain(workshop.anvils.keys())
            .map(|id| id.0.saturating_add(1))
            .max()
            .unwrap_or(0);
        let stored = record
            .get("next_id")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0);
        workshop.next_id = stored.max(highest);
        workshop
    }

    /// Save to a JSON file.
    pub fn save_to_path(&self, path: &Path) -> Result<(), PersistError> {
        write_record(path, &self.save())?;
        info!(path = %path.display(), "Saved workshop");
        Ok(())
    }

    /// Load from a JSON file.
    pub fn load_from_path(path: &Path) -> Result<Self, PersistError> {
        let workshop = Self::load(&read_record(path)?);
        info!(
            path = %path.display(),
            forges = workshop.forges.len(),
            anvils = workshop.anvils.len(),
            "Loaded workshop"
        );
        Ok(workshop)
    }
}

fn station_entries<'a>(record: &'a Value, key: &str) -> Vec<(StationId, &'a Value)> {
    let Some(entries) = record.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let id = entry
                .get("id")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok());
            match (id, entry.get("state")) {
                (Some(id), Some(state)) => Some((StationId(id), state)),
                _ => {
                    warn!(%entry, "Skipping malformed {} entry", key);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use emberforge_core::{ItemStack, PartType, RegistryKey};

    fn iron_handle() -> ItemStack {
        ItemStack::part(&PartType::handle(), RegistryKey::builtin("iron"))
    }

    #[test]
    fn ids_are_unique_across_station_kinds() {
        let mut workshop = Workshop::new();
        let forge = workshop.add_forge();
        let anvil = workshop.add_anvil();
        assert_ne!(forge, anvil);
        assert!(workshop.forge(anvil).is_none());
        assert!(workshop.anvil(forge).is_none());
    }

    #[test]
    fn transfer_requires_heat() {
        let mut workshop = Workshop::new();
        let forge = workshop.add_forge();
        let anvil = workshop.add_anvil();

        assert_eq!(
            workshop.move_forge_item_to_anvil(forge, anvil),
            Err(TransferError::ForgeEmpty(forge))
        );

        workshop.forge_mut(forge).unwrap().place_item(iron_handle()).unwrap();
        workshop.forge_mut(forge).unwrap().light();
        workshop.run(100);
        assert_eq!(
            workshop.move_forge_item_to_anvil(forge, anvil),
            Err(TransferError::TooCold(100))
        );
        assert!(workshop.forge(forge).unwrap().item().is_some());

        workshop.run(700);
        workshop.move_forge_item_to_anvil(forge, anvil).unwrap();
        assert!(workshop.forge(forge).unwrap().item().is_none());
        assert_eq!(workshop.anvil(anvil).unwrap().temperature(), 800);
    }

    #[test]
    fn occupied_anvil_leaves_workpiece_in_forge() {
        let mut workshop = Workshop::new();
        let forge = workshop.add_forge();
        let anvil = workshop.add_anvil();

        workshop
            .anvil_mut(anvil)
            .unwrap()
            .place_input(iron_handle().with_temperature(900))
            .unwrap();
        workshop
            .forge_mut(forge)
            .unwrap()
            .place_item(iron_handle().with_temperature(1000))
            .unwrap();

        assert_eq!(
            workshop.move_forge_item_to_anvil(forge, anvil),
            Err(TransferError::AnvilOccupied(anvil))
        );
        let forge = workshop.forge(forge).unwrap();
        assert_eq!(forge.item().unwrap().temperature(), Some(1000));
        assert_eq!(forge.temperature(), 1000);
        assert_eq!(workshop.anvil(anvil).unwrap().temperature(), 900);
    }

    #[test]
    fn unknown_stations_are_reported() {
        let mut workshop = Workshop::new();
        let forge = workshop.add_forge();
        assert_eq!(
            workshop.move_forge_item_to_anvil(forge, StationId(99)),
            Err(TransferError::UnknownAnvil(StationId(99)))
        );
    }

    #[test]
    fn save_and_load_preserve_stations_and_clock() {
        let mut workshop = Workshop::new();
        let forge = workshop.add_forge();
        let anvil = workshop.add_anvil();
        workshop.forge_mut(forge).unwrap().place_item(iron_handle()).unwrap();
        workshop.forge_mut(forge).unwrap().light();
        workshop.run(850);
        workshop.move_forge_item_to_anvil(forge, anvil).unwrap();
        assert!(workshop.anvil_mut(anvil).unwrap().start_smithing());

        let restored = Workshop::load(&workshop.save());
        assert_eq!(restored, workshop);
        assert_eq!(restored.now(), SimTick(850));

        let mut restored = restored;
        assert_eq!(restored.add_forge(), StationId(2));
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let record = json!({
            "tick": 12,
            "forges": [{"state": {}}, {"id": 3, "state": {"lit": true}}],
            "anvils": "nope"
        });
        let workshop = Workshop::load(&record);
        assert_eq!(workshop.forges().count(), 1);
        assert!(workshop.forge(StationId(3)).unwrap().is_lit());
        assert_eq!(workshop.anvils().count(), 0);
        assert_eq!(workshop.now(), SimTick(12));
    }
}
