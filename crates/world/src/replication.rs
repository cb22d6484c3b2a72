//! Indexed integer registers mirrored to observers.
//!
//! A station writes its numeric state into a [`PropertyRegisters`] after every
//! mutation and tick. The transport is external: it ships `(index, value)`
//! pairs, usually the delta from [`RegisterSync`], into an observer-side view
//! ([`AnvilView`], [`ForgeView`]) that only ever reads through indices.

use emberforge_core::{QualityGrade, TemperatureBand, MAX_FORGE_TEMPERATURE, QUALITY_NEUTRAL};

/// Anvil register: current temperature.
pub const ANVIL_TEMPERATURE: usize = 0;
/// Anvil register: smithing progress `0..=100`.
pub const ANVIL_PROGRESS: usize = 1;
/// Anvil register: working quality `0..=120`.
pub const ANVIL_QUALITY: usize = 2;
/// Anvil register: 1 while smithing, else 0.
pub const ANVIL_SMITHING: usize = 3;
/// Anvil register count.
pub const ANVIL_REGISTER_COUNT: usize = 4;

/// Forge register: current temperature.
pub const FORGE_TEMPERATURE: usize = 0;
/// Forge register: 1 while lit, else 0.
pub const FORGE_LIT: usize = 1;
/// Forge register count.
pub const FORGE_REGISTER_COUNT: usize = 2;

/// Fixed-length array of replicated integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyRegisters<const N: usize> {
    values: [i32; N],
}

impl<const N: usize> Default for PropertyRegisters<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PropertyRegisters<N> {
    /// All registers zeroed.
    pub fn new() -> Self {
        Self { values: [0; N] }
    }

    /// Value at `index`, or 0 when out of range.
    pub fn get(&self, index: usize) -> i32 {
        self.values.get(index).copied().unwrap_or(0)
    }

    /// Write `value` at `index`; out-of-range writes are ignored.
    pub fn set(&mut self, index: usize, value: i32) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    /// Register count.
    pub fn size(&self) -> usize {
        N
    }

    /// Raw values in index order.
    pub fn values(&self) -> &[i32; N] {
        &self.values
    }

    /// `(index, value)` for every register that differs from `previous`.
    pub fn changes_since(&self, previous: &Self) -> Vec<(usize, i32)> {
        self.values
            .iter()
            .zip(previous.values.iter())
            .enumerate()
            .filter(|(_, (now, before))| now != before)
            .map(|(index, (now, _))| (index, *now))
            .collect()
    }
}

/// Sender-side bookkeeping for delta replication of one register array.
#[derive(Debug, Clone, Default)]
pub struct RegisterSync<const N: usize> {
    last_sent: Option<PropertyRegisters<N>>,
}

impl<const N: usize> RegisterSync<N> {
    /// Nothing sent yet.
    pub fn new() -> Self {
        Self { last_sent: None }
    }

    /// Pairs to ship for `current`: everything on first use, then deltas only.
    pub fn collect(&mut self, current: &PropertyRegisters<N>) -> Vec<(usize, i32)> {
        let updates = match &self.last_sent {
            Some(previous) => current.changes_since(previous),
            None => current.values().iter().copied().enumerate().collect(),
        };
        self.last_sent = Some(*current);
        updates
    }

    /// Forget what was sent so the next collect resends everything.
    pub fn reset(&mut self) {
        self.last_sent = None;
    }
}

/// Observer replica of an anvil's registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnvilView {
    registers: PropertyRegisters<ANVIL_REGISTER_COUNT>,
}

impl Default for AnvilView {
    fn default() -> Self {
        let mut registers = PropertyRegisters::new();
        registers.set(ANVIL_QUALITY, QUALITY_NEUTRAL);
        Self { registers }
    }
}

impl AnvilView {
    /// Replica matching a freshly built anvil.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replica seeded from a full register snapshot.
    pub fn from_registers(registers: &PropertyRegisters<ANVIL_REGISTER_COUNT>) -> Self {
        Self {
            registers: *registers,
        }
    }

    /// Apply one update received from the transport.
    pub fn apply(&mut self, index: usize, value: i32) {
        self.registers.set(index, value);
    }

    /// Apply a batch of updates in order.
    pub fn apply_all(&mut self, updates: &[(usize, i32)]) {
        for &(index, value) in updates {
            self.apply(index, value);
        }
    }

    /// Replicated registers.
    pub fn registers(&self) -> &PropertyRegisters<ANVIL_REGISTER_COUNT> {
        &self.registers
    }

    pub fn temperature(&self) -> i32 {
        self.registers.get(ANVIL_TEMPERATURE)
    }

    pub fn progress(&self) -> i32 {
        self.registers.get(ANVIL_PROGRESS)
    }

    pub fn quality(&self) -> i32 {
        self.registers.get(ANVIL_QUALITY)
    }

    pub fn is_smithing(&self) -> bool {
        self.registers.get(ANVIL_SMITHING) != 0
    }

    /// Heat band for the temperature gauge.
    pub fn temperature_band(&self) -> TemperatureBand {
        TemperatureBand::classify(self.temperature())
    }

    /// Grade for the quality readout.
    pub fn quality_grade(&self) -> QualityGrade {
        QualityGrade::classify(self.quality())
    }

    /// Progress bar fill in `[0, 1]`.
    pub fn progress_fraction(&self) -> f32 {
        (self.progress() as f32 / 100.0).clamp(0.0, 1.0)
    }

    /// Temperature gauge fill in `[0, 1]` relative to the forge ceiling.
    pub fn temperature_fraction(&self) -> f32 {
        (self.temperature() as f32 / MAX_FORGE_TEMPERATURE as f32).clamp(0.0, 1.0)
    }
}

/// Observer replica of a forge's registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForgeView {
    registers: PropertyRegisters<FORGE_REGISTER_COUNT>,
}

impl ForgeView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_registers(registers: &PropertyRegisters<FORGE_REGISTER_COUNT>) -> Self {
        Self {
            registers: *registers,
        }
    }

    pub fn apply(&mut self, index: usize, value: i32) {
        self.registers.set(index, value);
    }

    pub fn apply_all(&mut self, updates: &[(usize, i32)]) {
        for &(index, value) in updates {
            self.apply(index, value);
        }
    }

    pub fn temperature(&self) -> i32 {
        self.registers.get(FORGE_TEMPERATURE)
    }

    pub fn is_lit(&self) -> bool {
        self.registers.get(FORGE_LIT) != 0
    }

    pub fn temperature_band(&self) -> TemperatureBand {
        TemperatureBand::classify(self.temperature())
    }

    pub fn temperature_fraction(&self) -> f32 {
        (self.temperature() as f32 / MAX_FORGE_TEMPERATURE as f32).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_access_is_inert() {
        let mut registers = PropertyRegisters::<4>::new();
        registers.set(9, 77);
        assert_eq!(registers.get(9), 0);
        assert_eq!(registers.values(), &[0, 0, 0, 0]);
        assert_eq!(registers.size(), 4);
    }

    #[test]
    fn changes_since_lists_differing_indices() {
        let before = PropertyRegisters::<4>::new();
        let mut after = before;
        after.set(0, 900);
        after.set(3, 1);
        assert_eq!(after.changes_since(&before), vec![(0, 900), (3, 1)]);
        assert!(after.changes_since(&after).is_empty());
    }

    #[test]
    fn sync_sends_full_snapshot_then_deltas() {
        let mut registers = PropertyRegisters::<2>::new();
        registers.set(FORGE_TEMPERATURE, 40);
        let mut sync = RegisterSync::new();

        assert_eq!(sync.collect(&registers), vec![(0, 40), (1, 0)]);
        assert!(sync.collect(&registers).is_empty());

        registers.set(FORGE_LIT, 1);
        assert_eq!(sync.collect(&registers), vec![(1, 1)]);

        sync.reset();
        assert_eq!(sync.collect(&registers).len(), 2);
    }

    #[test]
    fn anvil_view_tracks_applied_updates() {
        let mut view = AnvilView::new();
        assert_eq!(view.quality(), 50);
        assert!(!view.is_smithing());

        view.apply_all(&[(ANVIL_TEMPERATURE, 1250), (ANVIL_PROGRESS, 40), (ANVIL_SMITHING, 1)]);
        assert_eq!(view.temperature_band(), TemperatureBand::Ideal);
        assert!(view.is_smithing());
        assert!((view.progress_fraction() - 0.4).abs() < 1e-6);
        assert_eq!(view.quality_grade(), QualityGrade::Mediocre);

        view.apply(42, 5);
        assert_eq!(view.registers().size(), ANVIL_REGISTER_COUNT);
    }

    #[test]
    fn forge_view_reads_lit_flag() {
        let mut view = ForgeView::new();
        view.apply(FORGE_LIT, 1);
        view.apply(FORGE_TEMPERATURE, 1400);
        assert!(view.is_lit());
        assert_eq!(view.temperature_fraction(), 1.0);
        assert_eq!(view.temperature_band(), TemperatureBand::Ideal);
    }
}
