//! Host item interface.
//!
//! The scaling core only needs a narrow view of an item: its identity,
//! classification and rarity, the modifiers the host considers active per
//! slot, and the persisted modifier storage. `ItemStack` is a plain
//! implementation of that view for hosts that keep items as data.

use crate::context::{ItemKind, Rarity};
use crate::modifier::{ActiveModifier, Modifier};
use crate::slot::EquipmentSlot;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The narrow item contract scaling depends on.
pub trait HostItem {
    /// Registry identifier of the item type, e.g. `minecraft:iron_sword`.
    fn item_id(&self) -> &str;

    fn kind(&self) -> ItemKind;

    fn rarity(&self) -> Rarity;

    /// Modifiers the host currently applies for `slot`, before any scaling.
    fn active_modifiers(&self, slot: EquipmentSlot) -> Vec<ActiveModifier>;

    /// Persisted modifier storage, if any has been written.
    fn persisted_modifiers(&self) -> Option<&Value>;

    /// Replace the persisted modifier storage.
    fn set_persisted_modifiers(&mut self, storage: Value);
}

/// An item kept as plain data.
///
/// Once persisted storage exists, it replaces the default modifiers as the
/// active set, mirroring how the host reads item attributes.
///
/// # Examples
///
/// ```rust
/// use itemscale::{ActiveModifier, AttributeId, EquipmentSlot, HostItem, ItemKind, ItemStack};
///
/// let sword = ItemStack::new("minecraft:iron_sword", ItemKind::Tool).with_default_modifier(
///     EquipmentSlot::MainHand,
///     ActiveModifier::additive(AttributeId::attack_damage(), "Weapon modifier", 5.0),
/// );
/// assert_eq!(sword.active_modifiers(EquipmentSlot::MainHand).len(), 1);
/// assert!(sword.persisted_modifiers().is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_id: String,
    #[serde(default)]
    pub kind: ItemKind,
    #[serde(default)]
    pub rarity: Rarity,
    /// Host defaults per slot, never written by scaling.
    #[serde(skip)]
    pub default_modifiers: BTreeMap<EquipmentSlot, Vec<ActiveModifier>>,
    /// Persisted attribute modifier list.
    #[serde(rename = "AttributeModifiers", skip_serializing_if = "Option::is_none")]
    pub attribute_modifiers: Option<Value>,
}

impl ItemStack {
    pub fn new(item_id: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            item_id: item_id.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }

    pub fn with_default_modifier(mut self, slot: EquipmentSlot, modifier: ActiveModifier) -> Self {
        self.default_modifiers.entry(slot).or_default().push(modifier);
        self
    }
}

impl HostItem for ItemStack {
    fn item_id(&self) -> &str {
        &self.item_id
    }

    fn kind(&self) -> ItemKind {
        self.kind
    }

    fn rarity(&self) -> Rarity {
        self.rarity
    }

    fn active_modifiers(&self, slot: EquipmentSlot) -> Vec<ActiveModifier> {
        match self.attribute_modifiers.as_ref().and_then(Value::as_array) {
            Some(entries) => entries
                .iter()
                .filter_map(|entry| {
                    serde_json::from_value::<Modifier>(entry.clone()).ok()
                })
                .filter(|modifier| modifier.slot == slot)
                .map(|modifier| ActiveModifier {
                    attribute: modifier.attribute,
                    id: modifier.id,
                    name: modifier.name,
                    amount: modifier.amount,
                    operation: modifier.operation,
                })
                .collect(),
            None => self.default_modifiers.get(&slot).cloned().unwrap_or_default(),
        }
    }

    fn persisted_modifiers(&self) -> Option<&Value> {
        self.attribute_modifiers.as_ref()
    }

    fn set_persisted_modifiers(&mut self, storage: Value) {
        self.attribute_modifiers = Some(storage);
    }
}
