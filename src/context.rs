//! Context value objects handed to rule resolution.
//!
//! `ItemData` and `LocationData` describe the item being generated and where
//! it is being generated. The scaling core does not interpret them; they are
//! passed through to the [`RuleResolver`](crate::rule::RuleResolver).

use crate::slot::EquipmentSlot;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Item rarity tier as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rarity::Common => "COMMON",
            Rarity::Uncommon => "UNCOMMON",
            Rarity::Rare => "RARE",
            Rarity::Epic => "EPIC",
        };
        f.write_str(name)
    }
}

/// Host-side classification of an item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Swords, axes and other melee tools.
    Tool,
    /// Bows, crossbows.
    RangedWeapon,
    /// Wearable armor piece for a single slot.
    Armor(EquipmentSlot),
    /// Anything scaling ignores.
    #[default]
    Other,
}

/// Scaling classification, derived once from [`ItemKind`].
///
/// # Examples
///
/// ```rust
/// use itemscale::{EquipmentSlot, ItemClass, ItemKind};
///
/// assert_eq!(ItemClass::of(ItemKind::RangedWeapon), ItemClass::Weapon);
/// assert_eq!(
///     ItemClass::of(ItemKind::Armor(EquipmentSlot::Head)).slots(),
///     vec![EquipmentSlot::Head]
/// );
/// assert!(ItemClass::of(ItemKind::Other).slots().is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemClass {
    Weapon,
    Armor(EquipmentSlot),
    Other,
}

impl ItemClass {
    pub fn of(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Tool | ItemKind::RangedWeapon => ItemClass::Weapon,
            ItemKind::Armor(slot) => ItemClass::Armor(slot),
            ItemKind::Other => ItemClass::Other,
        }
    }

    /// Slots whose modifiers scaling rewrites for this class.
    pub fn slots(self) -> Vec<EquipmentSlot> {
        match self {
            ItemClass::Weapon => EquipmentSlot::hands().to_vec(),
            ItemClass::Armor(slot) => vec![slot],
            ItemClass::Other => Vec::new(),
        }
    }

    /// The rule category for this class, if it scales at all.
    pub fn category(self) -> Option<ItemCategory> {
        match self {
            ItemClass::Weapon => Some(ItemCategory::Weapons),
            ItemClass::Armor(_) => Some(ItemCategory::Armor),
            ItemClass::Other => None,
        }
    }
}

/// Category of rules an item is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Weapons,
    Armor,
}

/// Description of the item being scaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    pub category: ItemCategory,
    /// Loot table the item was rolled from.
    pub loot_table_id: String,
    pub item_id: String,
    pub rarity: Rarity,
}

impl ItemData {
    pub fn new(
        category: ItemCategory,
        loot_table_id: impl Into<String>,
        item_id: impl Into<String>,
        rarity: Rarity,
    ) -> Self {
        Self {
            category,
            loot_table_id: loot_table_id.into(),
            item_id: item_id.into(),
            rarity,
        }
    }
}

/// Integer block position in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The block containing a precise position.
    pub fn containing(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: x.floor() as i32,
            y: y.floor() as i32,
            z: z.floor() as i32,
        }
    }
}

/// Where the item is being generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationData {
    /// World or dimension identifier.
    pub dimension_id: String,
    /// Generation origin, when the loot context has one.
    pub position: Option<BlockPos>,
}

impl LocationData {
    pub fn new(dimension_id: impl Into<String>, position: Option<BlockPos>) -> Self {
        Self {
            dimension_id: dimension_id.into(),
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weapon_kinds_scale_both_hands() {
        for kind in [ItemKind::Tool, ItemKind::RangedWeapon] {
            let class = ItemClass::of(kind);
            assert_eq!(class.slots(), EquipmentSlot::hands().to_vec());
            assert_eq!(class.category(), Some(ItemCategory::Weapons));
        }
    }

    #[test]
    fn test_armor_scales_single_slot() {
        let class = ItemClass::of(ItemKind::Armor(EquipmentSlot::Legs));
        assert_eq!(class.slots(), vec![EquipmentSlot::Legs]);
        assert_eq!(class.category(), Some(ItemCategory::Armor));
        assert_eq!(ItemClass::of(ItemKind::Other).category(), None);
    }

    #[test]
    fn test_block_pos_containing_floors() {
        assert_eq!(BlockPos::containing(1.7, -0.2, -3.5), BlockPos::new(1, -1, -4));
    }

    #[test]
    fn test_rarity_display_matches_host() {
        assert_eq!(Rarity::Epic.to_string(), "EPIC");
        assert_eq!(Rarity::default(), Rarity::Common);
    }
}
