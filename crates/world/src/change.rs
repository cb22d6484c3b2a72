//! Change tracking shared by the forge and anvil simulations.

use bitflags::bitflags;

bitflags! {
    /// What a station touched since the last time its changes were taken.
    ///
    /// Persistence and observer refresh live outside the simulation; they poll
    /// [`ChangeFlags`] through `take_changes` instead of being called back.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChangeFlags: u8 {
        /// A simulation scalar (temperature, progress, quality, lit, smithing).
        const STATE = 0b0000_0001;
        /// Slot contents or an attribute of a held item.
        const SLOTS = 0b0000_0010;
    }
}

impl Default for ChangeFlags {
    fn default() -> Self {
        ChangeFlags::empty()
    }
}

impl ChangeFlags {
    /// Whether anything at all changed.
    pub fn any(self) -> bool {
        !self.is_empty()
    }

    /// Whether the change needs to reach an observer.
    pub fn needs_replication(self) -> bool {
        self.contains(ChangeFlags::STATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_clean() {
        let flags = ChangeFlags::default();
        assert!(!flags.any());
        assert!(!flags.needs_replication());
    }

    #[test]
    fn slot_only_change_skips_replication() {
        let flags = ChangeFlags::SLOTS;
        assert!(flags.any());
        assert!(!flags.needs_replication());
        assert!((flags | ChangeFlags::STATE).needs_replication());
    }
}
