//! Forge heating simulation.
//!
//! A lit forge raises the temperature of the item it holds by a fixed step
//! every tick up to [`MAX_FORGE_TEMPERATURE`]. An empty forge goes out.

use emberforge_core::heat::FORGE_HEAT_PER_TICK;
use emberforge_core::{ItemStack, MAX_FORGE_TEMPERATURE};
use tracing::debug;

use crate::change::ChangeFlags;
use crate::container::SlotContainer;
use crate::replication::{PropertyRegisters, FORGE_LIT, FORGE_REGISTER_COUNT, FORGE_TEMPERATURE};

/// Slot holding the item being heated.
pub const FORGE_ITEM_SLOT: usize = 0;
/// Slot holding fuel.
pub const FORGE_FUEL_SLOT: usize = 1;
/// Number of forge slots.
pub const FORGE_SLOT_COUNT: usize = 2;

/// Authoritative state of one forge.
#[derive(Debug, Clone)]
pub struct Forge {
    pub(crate) slots: [Option<ItemStack>; FORGE_SLOT_COUNT],
    pub(crate) temperature: i32,
    pub(crate) lit: bool,
    changes: ChangeFlags,
    registers: PropertyRegisters<FORGE_REGISTER_COUNT>,
}

impl Default for Forge {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Forge {
    fn eq(&self, other: &Self) -> bool {
        self.slots == other.slots && self.temperature == other.temperature && self.lit == other.lit
    }
}

impl Forge {
    /// Create a cold, empty, unlit forge.
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            temperature: 0,
            lit: false,
            changes: ChangeFlags::empty(),
            registers: PropertyRegisters::new(),
        }
    }

    /// Rebuild a forge from decoded fields, clamping out-of-range values.
    pub(crate) fn from_parts(
        slots: [Option<ItemStack>; FORGE_SLOT_COUNT],
        temperature: i32,
        lit: bool,
    ) -> Self {
        let mut forge = Self {
            slots,
            temperature: temperature.clamp(0, MAX_FORGE_TEMPERATURE),
            lit,
            changes: ChangeFlags::empty(),
            registers: PropertyRegisters::new(),
        };
        forge.sync_registers();
        forge
    }

    /// Current temperature in degrees.
    pub fn temperature(&self) -> i32 {
        self.temperature
    }

    /// Whether the forge is lit.
    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Light the forge. Idempotent.
    pub fn light(&mut self) {
        self.lit = true;
        self.mark_changed(ChangeFlags::STATE);
    }

    /// Put the forge out. Idempotent.
    pub fn extinguish(&mut self) {
        self.lit = false;
        self.mark_changed(ChangeFlags::STATE);
    }

    /// Advance one tick.
    pub fn tick(&mut self) {
        match self.slots[FORGE_ITEM_SLOT].as_mut() {
            None => {
                if self.temperature != 0 || self.lit {
                    debug!(temperature = self.temperature, "Empty forge went out");
                    self.temperature = 0;
                    self.lit = false;
                    self.mark_changed(ChangeFlags::STATE);
                }
            }
            Some(item) if self.lit => {
                self.temperature = (self.temperature + FORGE_HEAT_PER_TICK).min(MAX_FORGE_TEMPERATURE);
                item.set_temperature(self.temperature);
                self.mark_changed(ChangeFlags::STATE | ChangeFlags::SLOTS);
            }
            Some(_) => {}
        }
        self.sync_registers();
    }

    /// Item being heated.
    pub fn item(&self) -> Option<&ItemStack> {
        self.get(FORGE_ITEM_SLOT)
    }

    /// Put `stack` into the empty item slot, or hand it back if occupied.
    ///
    /// An item that already carries heat brings it with it, so reheating a
    /// cooled part continues from its own temperature.
    pub fn place_item(&mut self, stack: ItemStack) -> Result<(), ItemStack> {
        if self.slots[FORGE_ITEM_SLOT].is_some() {
            return Err(stack);
        }
        if let Some(carried) = stack.temperature() {
            self.temperature = carried.clamp(0, MAX_FORGE_TEMPERATURE);
            self.mark_changed(ChangeFlags::STATE);
        }
        self.slots[FORGE_ITEM_SLOT] = Some(stack);
        self.mark_changed(ChangeFlags::SLOTS);
        self.sync_registers();
        Ok(())
    }

    /// Remove the item being heated. It keeps its carried temperature.
    pub fn take_item(&mut self) -> Option<ItemStack> {
        self.remove(FORGE_ITEM_SLOT)
    }

    /// Put fuel into the empty fuel slot, or hand it back if occupied.
    pub fn place_fuel(&mut self, stack: ItemStack) -> Result<(), ItemStack> {
        if self.slots[FORGE_FUEL_SLOT].is_some() {
            return Err(stack);
        }
        self.set(FORGE_FUEL_SLOT, Some(stack));
        Ok(())
    }

    /// Remove the fuel.
    pub fn take_fuel(&mut self) -> Option<ItemStack> {
        self.remove(FORGE_FUEL_SLOT)
    }

    /// Registers mirrored to observers.
    pub fn registers(&self) -> &PropertyRegisters<FORGE_REGISTER_COUNT> {
        &self.registers
    }

    /// Changes since the last call, clearing them.
    pub fn take_changes(&mut self) -> ChangeFlags {
        std::mem::take(&mut self.changes)
    }

    /// Changes accumulated so far.
    pub fn pending_changes(&self) -> ChangeFlags {
        self.changes
    }

    fn mark_changed(&mut self, flags: ChangeFlags) {
        self.changes.insert(flags);
        self.sync_registers();
    }

    fn sync_registers(&mut self) {
        self.registers.set(FORGE_TEMPERATURE, self.temperature);
        self.registers.set(FORGE_LIT, i32::from(self.lit));
    }
}

impl SlotContainer for Forge {
    fn slots(&self) -> &[Option<ItemStack>] {
        &self.slots
    }

    fn slots_mut(&mut self) -> &mut [Option<ItemStack>] {
        &mut self.slots
    }

    fn on_slots_changed(&mut self) {
        self.mark_changed(ChangeFlags::SLOTS);
    }
}
