//! Anvil smithing simulation.
//!
//! A hot part placed on the anvil cools slowly. While it is hot enough the
//! smith can start a session and land strikes; each strike is scored by its
//! accuracy and moves progress and quality. At 100 progress the part is
//! finished into the output slot with the accumulated quality stamped on it.

use emberforge_core::heat::{ANVIL_COOLING_INTERVAL_TICKS, ANVIL_COOLING_STEP};
use emberforge_core::stats::clamp_quality;
use emberforge_core::{ItemStack, SimTick, MIN_SMITHING_TEMP, QUALITY_NEUTRAL};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::change::ChangeFlags;
use crate::container::SlotContainer;
use crate::replication::{
    PropertyRegisters, ANVIL_PROGRESS, ANVIL_QUALITY, ANVIL_REGISTER_COUNT, ANVIL_SMITHING,
    ANVIL_TEMPERATURE,
};

/// Slot holding the hot workpiece.
pub const ANVIL_INPUT_SLOT: usize = 0;
/// Slot holding the hammer.
pub const ANVIL_HAMMER_SLOT: usize = 1;
/// Slot receiving the finished part.
pub const ANVIL_OUTPUT_SLOT: usize = 2;
/// Number of anvil slots.
pub const ANVIL_SLOT_COUNT: usize = 3;

/// Progress at which the part is finished.
pub const PROGRESS_COMPLETE: i32 = 100;
/// Quality lost once when the workpiece cools below smithing heat mid-session.
pub const OVERCOOL_PENALTY: i32 = 1;

/// Accuracy band of one strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrikeGrade {
    /// `[0.9, 1.0]`
    Perfect,
    /// `[0.7, 0.9)`
    Good,
    /// `[0.4, 0.7)`
    Okay,
    /// `[0.0, 0.4)`
    Miss,
}

impl StrikeGrade {
    /// Classify an accuracy, clamped into `[0, 1]`. NaN counts as a miss.
    pub fn classify(accuracy: f32) -> Self {
        if accuracy.is_nan() {
            return StrikeGrade::Miss;
        }
        match accuracy.clamp(0.0, 1.0) {
            a if a >= 0.9 => StrikeGrade::Perfect,
            a if a >= 0.7 => StrikeGrade::Good,
            a if a >= 0.4 => StrikeGrade::Okay,
            _ => StrikeGrade::Miss,
        }
    }

    /// Progress added by a strike of this grade.
    pub fn progress_delta(self) -> i32 {
        match self {
            StrikeGrade::Perfect => 10,
            StrikeGrade::Good => 7,
            StrikeGrade::Okay => 3,
            StrikeGrade::Miss => 0,
        }
    }

    /// Quality change from a strike of this grade.
    pub fn quality_delta(self) -> i32 {
        match self {
            StrikeGrade::Perfect => 5,
            StrikeGrade::Good => 3,
            StrikeGrade::Okay => 1,
            StrikeGrade::Miss => -2,
        }
    }
}

/// Authoritative state of one anvil.
#[derive(Debug, Clone)]
pub struct Anvil {
    pub(crate) slots: [Option<ItemStack>; ANVIL_SLOT_COUNT],
    pub(crate) temperature: i32,
    pub(crate) progress: i32,
    pub(crate) quality: i32,
    pub(crate) smithing: bool,
    changes: ChangeFlags,
    registers: PropertyRegisters<ANVIL_REGISTER_COUNT>,
}

impl Default for Anvil {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Anvil {
    fn eq(&self, other: &Self) -> bool {
        self.slots == other.slots
            && self.temperature == other.temperature
            && self.progress == other.progress
            && self.quality == other.quality
            && self.smithing == other.smithing
    }
}

impl Anvil {
    /// Create an idle anvil: cold, no progress, neutral quality.
    pub fn new() -> Self {
        let mut anvil = Self {
            slots: std::array::from_fn(|_| None),
            temperature: 0,
            progress: 0,
            quality: QUALITY_NEUTRAL,
            smithing: false,
            changes: ChangeFlags::empty(),
            registers: PropertyRegisters::new(),
        };
        anvil.sync_registers();
        anvil
    }

    /// Rebuild an anvil from decoded fields, clamping out-of-range values.
    pub(crate) fn from_parts(
        slots: [Option<ItemStack>; ANVIL_SLOT_COUNT],
        temperature: i32,
        progress: i32,
        quality: i32,
        smithing: bool,
    ) -> Self {
        let mut anvil = Self {
            slots,
            temperature: temperature.max(0),
            progress: progress.clamp(0, PROGRESS_COMPLETE),
            quality: clamp_quality(quality),
            smithing,
            changes: ChangeFlags::empty(),
            registers: PropertyRegisters::new(),
        };
        anvil.sync_registers();
        anvil
    }

    pub fn temperature(&self) -> i32 {
        self.temperature
    }

    pub fn progress(&self) -> i32 {
        self.progress
    }

    pub fn quality(&self) -> i32 {
        self.quality
    }

    pub fn is_smithing(&self) -> bool {
        self.smithing
    }

    /// Advance one tick at world time `now`.
    ///
    /// The workpiece cools by one degree on every fourth world tick. Falling
    /// below smithing heat ends an active session with a one-off penalty.
    pub fn tick(&mut self, now: SimTick) {
        if self.slots[ANVIL_INPUT_SLOT].is_some()
            && self.temperature > 0
            && now.is_multiple_of(ANVIL_COOLING_INTERVAL_TICKS)
        {
            self.temperature = (self.temperature - ANVIL_COOLING_STEP).max(0);
            self.mark_changed(ChangeFlags::STATE);
        }

        if self.smithing && self.temperature < MIN_SMITHING_TEMP {
            self.smithing = false;
            self.quality = clamp_quality(self.quality - OVERCOOL_PENALTY);
            debug!(
                temperature = self.temperature,
                quality = self.quality,
                "Workpiece cooled below smithing heat"
            );
            self.mark_changed(ChangeFlags::STATE);
        }

        self.sync_registers();
    }

    /// Begin a smithing session.
    ///
    /// Requires a workpiece and at least [`MIN_SMITHING_TEMP`]. Resets progress
    /// and quality. Returns `false` without touching state when not ready or
    /// when a session is already running.
    pub fn start_smithing(&mut self) -> bool {
        if self.smithing
            || self.slots[ANVIL_INPUT_SLOT].is_none()
            || self.temperature < MIN_SMITHING_TEMP
        {
            return false;
        }
        self.smithing = true;
        self.progress = 0;
        self.quality = QUALITY_NEUTRAL;
        debug!(temperature = self.temperature, "Smithing started");
        self.mark_changed(ChangeFlags::STATE);
        true
    }

    /// Score one strike. Ignored (returns `None`) while idle.
    pub fn handle_strike(&mut self, accuracy: f32) -> Option<StrikeGrade> {
        if !self.smithing {
            return None;
        }
        let grade = StrikeGrade::classify(accuracy);
        self.progress = (self.progress + grade.progress_delta()).clamp(0, PROGRESS_COMPLETE);
        self.quality = clamp_quality(self.quality + grade.quality_delta());
        self.mark_changed(ChangeFlags::STATE);

        if self.progress >= PROGRESS_COMPLETE {
            self.complete_smithing();
        }
        Some(grade)
    }

    /// Adopt the workpiece's carried temperature, if it has one.
    pub fn load_temperature_from_item(&mut self) {
        let carried = self.slots[ANVIL_INPUT_SLOT]
            .as_ref()
            .and_then(ItemStack::temperature);
        if let Some(temperature) = carried {
            self.temperature = temperature.max(0);
            self.mark_changed(ChangeFlags::STATE);
        }
    }

    fn complete_smithing(&mut self) {
        let Some(mut finished) = self.slots[ANVIL_INPUT_SLOT].take() else {
            return;
        };
        finished.set_quality(self.quality);
        finished.clear_temperature();
        debug!(item = %finished.item, quality = self.quality, "Smithing complete");

        self.slots[ANVIL_OUTPUT_SLOT] = Some(finished);
        self.reset_session();
        self.mark_changed(ChangeFlags::STATE | ChangeFlags::SLOTS);
    }

    fn reset_session(&mut self) {
        self.temperature = 0;
        self.progress = 0;
        self.quality = QUALITY_NEUTRAL;
        self.smithing = false;
    }

    /// Workpiece on the anvil.
    pub fn input(&self) -> Option<&ItemStack> {
        self.get(ANVIL_INPUT_SLOT)
    }

    /// Finished part waiting to be collected.
    pub fn output(&self) -> Option<&ItemStack> {
        self.get(ANVIL_OUTPUT_SLOT)
    }

    /// Place a hot workpiece and load its temperature.
    ///
    /// Hands the stack back if the input slot is taken or the item is below
    /// smithing heat.
    pub fn place_input(&mut self, stack: ItemStack) -> Result<(), ItemStack> {
        if self.slots[ANVIL_INPUT_SLOT].is_some() || !stack.is_hot() {
            return Err(stack);
        }
        self.set(ANVIL_INPUT_SLOT, Some(stack));
        self.load_temperature_from_item();
        self.sync_registers();
        Ok(())
    }

    /// Lift the workpiece off the anvil.
    ///
    /// The item leaves carrying the anvil's current temperature and any
    /// session in progress is abandoned without penalty.
    pub fn take_input(&mut self) -> Option<ItemStack> {
        let mut taken = self.slots[ANVIL_INPUT_SLOT].take()?;
        taken.set_temperature(self.temperature);
        self.reset_session();
        self.mark_changed(ChangeFlags::STATE | ChangeFlags::SLOTS);
        Some(taken)
    }

    /// Collect the finished part.
    pub fn take_output(&mut self) -> Option<ItemStack> {
        self.remove(ANVIL_OUTPUT_SLOT)
    }

    /// Put a hammer on the anvil, or hand it back if one is there.
    pub fn place_hammer(&mut self, stack: ItemStack) -> Result<(), ItemStack> {
        if self.slots[ANVIL_HAMMER_SLOT].is_some() {
            return Err(stack);
        }
        self.set(ANVIL_HAMMER_SLOT, Some(stack));
        Ok(())
    }

    /// Registers mirrored to observers.
    pub fn registers(&self) -> &PropertyRegisters<ANVIL_REGISTER_COUNT> {
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
        self.registers.set(ANVIL_TEMPERATURE, self.temperature);
        self.registers.set(ANVIL_PROGRESS, self.progress);
        self.registers.set(ANVIL_QUALITY, self.quality);
        self.registers.set(ANVIL_SMITHING, i32::from(self.smithing));
    }
}

impl SlotContainer for Anvil {
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

#[cfg(test)]
mod tests {
    use super::*;
    use emberforge_core::{PartType, RegistryKey};
    use proptest::prelude::*;

    fn hot_blade(temperature: i32) -> ItemStack {
        ItemStack::part(&PartType::blade(), RegistryKey::builtin("steel")).with_temperature(temperature)
    }

    fn smithing_anvil(temperature: i32) -> Anvil {
        let mut anvil = Anvil::new();
        anvil.place_input(hot_blade(temperature)).unwrap();
        assert!(anvil.start_smithing());
        anvil
    }

    #[test]
    fn new_anvil_is_idle() {
        let anvil = Anvil::new();
        assert_eq!(
            (anvil.temperature(), anvil.progress(), anvil.quality(), anvil.is_smithing()),
            (0, 0, 50, false)
        );
        assert_eq!(anvil.registers().values(), &[0, 0, 50, 0]);
    }

    #[test]
    fn strike_grades_cover_the_unit_interval() {
        assert_eq!(StrikeGrade::classify(1.0), StrikeGrade::Perfect);
        assert_eq!(StrikeGrade::classify(0.9), StrikeGrade::Perfect);
        assert_eq!(StrikeGrade::classify(0.89), StrikeGrade::Good);
        assert_eq!(StrikeGrade::classify(0.7), StrikeGrade::Good);
        assert_eq!(StrikeGrade::classify(0.69), StrikeGrade::Okay);
        assert_eq!(StrikeGrade::classify(0.4), StrikeGrade::Okay);
        assert_eq!(StrikeGrade::classify(0.39), StrikeGrade::Miss);
        assert_eq!(StrikeGrade::classify(0.0), StrikeGrade::Miss);
        assert_eq!(StrikeGrade::classify(3.0), StrikeGrade::Perfect);
        assert_eq!(StrikeGrade::classify(-1.0), StrikeGrade::Miss);
        assert_eq!(StrikeGrade::classify(f32::NAN), StrikeGrade::Miss);
    }

    #[test]
    fn start_requires_heat_and_workpiece() {
        let mut anvil = Anvil::new();
        assert!(!anvil.start_smithing());

        let mut anvil = Anvil::new();
        anvil.place_input(hot_blade(900)).unwrap();
        assert_eq!(anvil.temperature(), 900);
        assert!(anvil.start_smithing());
        assert_eq!((anvil.progress(), anvil.quality(), anvil.is_smithing()), (0, 50, true));
    }

    #[test]
    fn start_while_smithing_changes_nothing() {
        let mut anvil = smithing_anvil(1000);
        anvil.handle_strike(0.95);
        anvil.take_changes();

        assert!(!anvil.start_smithing());
        assert_eq!((anvil.progress(), anvil.quality()), (10, 55));
        assert!(!anvil.take_changes().any());
    }

    #[test]
    fn cold_items_are_refused() {
        let mut anvil = Anvil::new();
        let cold = hot_blade(799);
        assert_eq!(anvil.place_input(cold.clone()), Err(cold));
        let unheated = ItemStack::part(&PartType::blade(), RegistryKey::builtin("iron"));
        assert!(anvil.place_input(unheated).is_err());
        assert!(anvil.input().is_none());
    }

    #[test]
    fn ten_perfect_strikes_finish_the_part() {
        let mut anvil = smithing_anvil(1200);
        assert_eq!(anvil.handle_strike(0.95), Some(StrikeGrade::Perfect));
        assert_eq!((anvil.progress(), anvil.quality()), (10, 55));

        for _ in 0..9 {
            anvil.handle_strike(0.95);
        }

        let finished = anvil.output().expect("finished part");
        assert_eq!(finished.quality(), Some(100));
        assert_eq!(finished.temperature(), None);
        assert_eq!(finished.material(), Some(&RegistryKey::builtin("steel")));
        assert!(anvil.input().is_none());
        assert_eq!(
            (anvil.temperature(), anvil.progress(), anvil.quality(), anvil.is_smithing()),
            (0, 0, 50, false)
        );
        assert_eq!(anvil.registers().values(), &[0, 0, 50, 0]);
    }

    #[test]
    fn quality_saturates_at_maximum() {
        let mut anvil = smithing_anvil(1200);
        for _ in 0..9 {
            anvil.handle_strike(1.0);
        }
        assert_eq!(anvil.quality(), 95);
        anvil.handle_strike(0.75);
        assert_eq!(anvil.quality(), 98);
        for _ in 0..20 {
            anvil.handle_strike(0.5);
        }
        assert!(anvil.quality() <= 120);
    }

    #[test]
    fn completion_overwrites_previous_output() {
        let mut anvil = smithing_anvil(1200);
        for _ in 0..10 {
            anvil.handle_strike(1.0);
        }
        anvil.place_input(hot_blade(1100)).unwrap();
        assert!(anvil.start_smithing());
        for _ in 0..15 {
            anvil.handle_strike(0.75);
        }
        assert_eq!(anvil.output().unwrap().quality(), Some(95));
    }

    #[test]
    fn strikes_while_idle_are_ignored() {
        let mut anvil = Anvil::new();
        anvil.place_input(hot_blade(900)).unwrap();
        anvil.take_changes();

        assert_eq!(anvil.handle_strike(1.0), None);
        assert_eq!((anvil.progress(), anvil.quality(), anvil.is_smithing()), (0, 50, false));
        assert!(!anvil.take_changes().any());
    }

    #[test]
    fn cools_one_degree_every_fourth_tick() {
        let mut anvil = Anvil::new();
        anvil.place_input(hot_blade(1000)).unwrap();
        for t in 0..8 {
            anvil.tick(SimTick(t));
        }
        assert_eq!(anvil.temperature(), 998);
    }

    #[test]
    fn empty_anvil_does_not_cool() {
        let mut anvil = Anvil::new();
        anvil.place_input(hot_blade(1000)).unwrap();
        let lifted = anvil.take_input().unwrap();
        assert_eq!(lifted.temperature(), Some(1000));
        assert_eq!(anvil.temperature(), 0);
        for t in 0..16 {
            anvil.tick(SimTick(t));
        }
        assert_eq!(anvil.temperature(), 0);
    }

    #[test]
    fn overcooling_stops_session_with_single_penalty() {
        let mut anvil = smithing_anvil(801);
        anvil.handle_strike(0.95);
        assert_eq!(anvil.quality(), 55);

        anvil.tick(SimTick(4));
        assert_eq!(anvil.temperature(), 800);
        assert!(anvil.is_smithing());

        anvil.tick(SimTick(8));
        assert_eq!(anvil.temperature(), 799);
        assert!(!anvil.is_smithing());
        assert_eq!(anvil.quality(), 54);

        for t in 9..40 {
            anvil.tick(SimTick(t));
        }
        assert_eq!(anvil.quality(), 54);
        assert_eq!(anvil.handle_strike(1.0), None);
    }

    #[test]
    fn completion_without_workpiece_is_a_no_op() {
        let mut anvil = smithing_anvil(1200);
        for _ in 0..9 {
            anvil.handle_strike(1.0);
        }
        // Pull the workpiece out from under the session through the raw slots.
        anvil.remove(ANVIL_INPUT_SLOT);
        anvil.handle_strike(1.0);
        assert!(anvil.output().is_none());
        assert_eq!(anvil.progress(), 100);
        assert!(anvil.is_smithing());
    }

    #[test]
    fn hammer_slot_holds_one_hammer() {
        let mut anvil = Anvil::new();
        let hammer = ItemStack::new(RegistryKey::builtin("hammer"), 1);
        anvil.place_hammer(hammer.clone()).unwrap();
        assert!(anvil.place_hammer(hammer.clone()).is_err());
        assert_eq!(anvil.get(ANVIL_HAMMER_SLOT), Some(&hammer));
    }

    proptest! {
        #[test]
        fn strike_sequences_keep_invariants(accuracies in proptest::collection::vec(0.0f32..=1.0, 0..40)) {
            let mut anvil = smithing_anvil(1400);
            let mut last_progress = anvil.progress();
            for accuracy in accuracies {
                let was_smithing = anvil.is_smithing();
                anvil.handle_strike(accuracy);
                prop_assert!((0..=120).contains(&anvil.quality()));
                prop_assert!(anvil.progress() <= 100);
                if was_smithing && anvil.is_smithing() {
                    prop_assert!(anvil.progress() >= last_progress);
                }
                last_progress = anvil.progress();
            }
        }
    }
}
