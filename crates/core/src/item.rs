//! Item stacks and the attributes they carry between stations.
//!
//! Heat and smithing quality live on the stack itself, not on the forge or
//! anvil holding it, so a part keeps its temperature when moved between
//! slots and keeps its quality forever after.

use crate::heat::MIN_SMITHING_TEMP;
use crate::stats::{clamp_quality, PartType};
use crate::RegistryKey;
use serde::{Deserialize, Serialize};

/// An item stack in a station slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item id. For tool parts this is also the part type (e.g. `emberforge:blade`).
    pub item: RegistryKey,
    /// Quantity in stack.
    #[serde(default = "default_count")]
    pub count: u32,
    /// Material the item is made of.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<RegistryKey>,
    /// Smithing quality percentage in `[0, 120]`; absent until first smithed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<i32>,
    /// Carried temperature in degrees; absent when the item is cold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<i32>,
}

fn default_count() -> u32 {
    1
}

impl ItemStack {
    /// Create a new item stack with no attributes.
    pub fn new(item: RegistryKey, count: u32) -> Self {
        Self {
            item,
            count,
            material: None,
            quality: None,
            temperature: None,
        }
    }

    /// Create a single tool part of `part` made from `material`.
    pub fn part(part: &PartType, material: RegistryKey) -> Self {
        let mut stack = Self::new(part.key().clone(), 1);
        stack.material = Some(material);
        stack
    }

    /// Builder-style helper that attaches a temperature.
    pub fn with_temperature(mut self, temperature: i32) -> Self {
        self.set_temperature(temperature);
        self
    }

    /// Builder-style helper that attaches a quality.
    pub fn with_quality(mut self, quality: i32) -> Self {
        self.set_quality(quality);
        self
    }

    /// Material tag, if any.
    pub fn material(&self) -> Option<&RegistryKey> {
        self.material.as_ref()
    }

    /// Set the material tag.
    pub fn set_material(&mut self, material: RegistryKey) {
        self.material = Some(material);
    }

    /// Quality percentage, if the item has been smithed.
    pub fn quality(&self) -> Option<i32> {
        self.quality
    }

    /// Stamp a quality percentage, clamped to `[0, 120]`.
    pub fn set_quality(&mut self, quality: i32) {
        self.quality = Some(clamp_quality(quality));
    }

    /// Carried temperature, if any.
    pub fn temperature(&self) -> Option<i32> {
        self.temperature
    }

    /// Set the carried temperature (floored at 0).
    pub fn set_temperature(&mut self, temperature: i32) {
        self.temperature = Some(temperature.max(0));
    }

    /// Remove the carried temperature attribute.
    pub fn clear_temperature(&mut self) {
        self.temperature = None;
    }

    /// Pull decoded attributes back into range: quality into `[0, 120]`,
    /// temperature floored at 0.
    pub fn sanitize(&mut self) {
        self.quality = self.quality.map(clamp_quality);
        self.temperature = self.temperature.map(|t| t.max(0));
    }

    /// Whether the item is hot enough to go on an anvil.
    pub fn is_hot(&self) -> bool {
        self.temperature
            .map(|t| t >= MIN_SMITHING_TEMP)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blade() -> ItemStack {
        ItemStack::part(&PartType::blade(), RegistryKey::builtin("iron"))
    }

    #[test]
    fn new_part_has_material_and_no_heat_or_quality() {
        let stack = blade();
        assert_eq!(stack.item, RegistryKey::builtin("blade"));
        assert_eq!(stack.count, 1);
        assert_eq!(stack.material(), Some(&RegistryKey::builtin("iron")));
        assert_eq!(stack.quality(), None);
        assert_eq!(stack.temperature(), None);
        assert!(!stack.is_hot());
    }

    #[test]
    fn quality_is_clamped() {
        let mut stack = blade();
        stack.set_quality(150);
        assert_eq!(stack.quality(), Some(120));
        stack.set_quality(-4);
        assert_eq!(stack.quality(), Some(0));
    }

    #[test]
    fn temperature_floors_at_zero_and_can_be_cleared() {
        let mut stack = blade().with_temperature(-10);
        assert_eq!(stack.temperature(), Some(0));

        stack.set_temperature(800);
        assert!(stack.is_hot());
        stack.set_temperature(799);
        assert!(!stack.is_hot());

        stack.clear_temperature();
        assert_eq!(stack.temperature(), None);
    }

    #[test]
    fn missing_count_decodes_as_one() {
        let stack: ItemStack = serde_json::from_value(serde_json::json!({
            "item": "emberforge:blade",
            "material": "emberforge:steel",
            "temperature": 950
        }))
        .unwrap();
        assert_eq!(stack.count, 1);
        assert_eq!(stack.temperature(), Some(950));
    }

    #[test]
    fn sanitize_pulls_decoded_attributes_into_range() {
        let mut stack: ItemStack = serde_json::from_value(serde_json::json!({
            "item": "emberforge:guard",
            "count": 1,
            "quality": 500,
            "temperature": -40
        }))
        .unwrap();
        assert_eq!(stack.quality(), Some(500));
        stack.sanitize();
        assert_eq!(stack.quality(), Some(120));
        assert_eq!(stack.temperature(), Some(0));

        let mut plain = blade();
        plain.sanitize();
        assert_eq!(plain, blade());
    }

    #[test]
    fn absent_attributes_are_omitted_from_json() {
        let json = serde_json::to_value(blade()).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("material"));
        assert!(!obj.contains_key("quality"));
        assert!(!obj.contains_key("temperature"));

        let hot = blade().with_temperature(1000).with_quality(90);
        let back: ItemStack = serde_json::from_value(serde_json::to_value(&hot).unwrap()).unwrap();
        assert_eq!(back, hot);
    }
}
