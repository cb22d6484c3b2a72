//! Fixed-size item slot storage.

use emberforge_core::ItemStack;

/// Indexed, fixed-size slots where `None` is the empty sentinel.
///
/// Implementors only expose their backing array; every other operation has a
/// default. Out-of-range indices read as empty and writes to them are dropped.
/// [`SlotContainer::on_slots_changed`] runs after every write so owners can
/// record the mutation.
pub trait SlotContainer {
    /// Backing slots.
    fn slots(&self) -> &[Option<ItemStack>];

    /// Mutable backing slots.
    fn slots_mut(&mut self) -> &mut [Option<ItemStack>];

    /// Hook invoked after a slot write.
    fn on_slots_changed(&mut self) {}

    /// Number of slots.
    fn size(&self) -> usize {
        self.slots().len()
    }

    /// Item in `slot`, if any.
    fn get(&self, slot: usize) -> Option<&ItemStack> {
        self.slots().get(slot).and_then(Option::as_ref)
    }

    /// Whether `slot` holds nothing (or does not exist).
    fn is_slot_empty(&self, slot: usize) -> bool {
        self.get(slot).is_none()
    }

    /// Replace the contents of `slot`, returning what was there.
    fn set(&mut self, slot: usize, stack: Option<ItemStack>) -> Option<ItemStack> {
        let entry = self.slots_mut().get_mut(slot)?;
        let previous = std::mem::replace(entry, stack);
        self.on_slots_changed();
        previous
    }

    /// Empty `slot`, returning its item.
    fn remove(&mut self, slot: usize) -> Option<ItemStack> {
        let taken = self.slots_mut().get_mut(slot)?.take();
        if taken.is_some() {
            self.on_slots_changed();
        }
        taken
    }

    /// Whether every slot is empty.
    fn is_empty(&self) -> bool {
        self.slots().iter().all(Option::is_none)
    }

    /// Empty all slots.
    fn clear(&mut self) {
        if self.is_empty() {
            return;
        }
        self.slots_mut().iter_mut().for_each(|slot| *slot = None);
        self.on_slots_changed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emberforge_core::RegistryKey;

    #[derive(Default)]
    struct Rack {
        slots: [Option<ItemStack>; 2],
        writes: u32,
    }

    impl SlotContainer for Rack {
        fn slots(&self) -> &[Option<ItemStack>] {
            &self.slots
        }

        fn slots_mut(&mut self) -> &mut [Option<ItemStack>] {
            &mut self.slots
        }

        fn on_slots_changed(&mut self) {
            self.writes += 1;
        }
    }

    fn ingot() -> ItemStack {
        ItemStack::new(RegistryKey::builtin("iron_ingot"), 1)
    }

    #[test]
    fn set_get_remove() {
        let mut rack = Rack::default();
        assert_eq!(rack.size(), 2);
        assert!(rack.is_empty());

        assert!(rack.set(1, Some(ingot())).is_none());
        assert_eq!(rack.get(1), Some(&ingot()));
        assert!(rack.is_slot_empty(0));
        assert!(!rack.is_empty());

        assert_eq!(rack.remove(1), Some(ingot()));
        assert!(rack.remove(1).is_none());
        assert_eq!(rack.writes, 2);
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut rack = Rack::default();
        assert!(rack.get(5).is_none());
        assert!(rack.is_slot_empty(5));
        assert!(rack.set(5, Some(ingot())).is_none());
        assert!(rack.remove(5).is_none());
        assert!(rack.is_empty());
        assert_eq!(rack.writes, 0);
    }

    #[test]
    fn clear_only_notifies_when_something_was_held() {
        let mut rack = Rack::default();
        rack.clear();
        assert_eq!(rack.writes, 0);

        rack.set(0, Some(ingot()));
        rack.clear();
        assert!(rack.is_empty());
        assert_eq!(rack.writes, 2);
    }
}
