//! Identity policy for written modifiers.
//!
//! The host's display layer recognizes the base attack damage and attack
//! speed of a held item by fixed ids. Modifiers written for those pairs must
//! reuse the same ids, so rescaling replaces them instead of stacking a
//! second entry next to them.

use crate::attribute::{AttributeId, ATTACK_DAMAGE, ATTACK_SPEED};
use crate::modifier::ModifierId;
use crate::slot::EquipmentSlot;
use uuid::Uuid;

/// The host's id for an item's base attack damage modifier.
pub const ATTACK_DAMAGE_MODIFIER_ID: Uuid = Uuid::from_u128(0xCB3F55D3_645C_4F38_A497_9C13A33DB5CF);

/// The host's id for an item's base attack speed modifier.
pub const ATTACK_SPEED_MODIFIER_ID: Uuid = Uuid::from_u128(0xFA233E1C_4180_4865_B01B_BCCE9785ACA3);

/// The identity assigned to a newly written modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierIdentity {
    /// Fixed id shared by every item, for well-known (slot, attribute) pairs.
    Stable(ModifierId),
    /// A newly generated id.
    Fresh(ModifierId),
}

impl ModifierIdentity {
    pub fn id(self) -> ModifierId {
        match self {
            ModifierIdentity::Stable(id) | ModifierIdentity::Fresh(id) => id,
        }
    }

    pub fn is_stable(self) -> bool {
        matches!(self, ModifierIdentity::Stable(_))
    }
}

/// The well-known id for `attribute`, if it has one.
pub fn well_known_id(attribute: &AttributeId) -> Option<ModifierId> {
    match attribute.as_str() {
        ATTACK_DAMAGE => Some(ModifierId(ATTACK_DAMAGE_MODIFIER_ID)),
        ATTACK_SPEED => Some(ModifierId(ATTACK_SPEED_MODIFIER_ID)),
        _ => None,
    }
}

/// Pick the identity for a modifier about to be written.
///
/// Hand slots with a well-known attribute get the stable id; everything else
/// gets a fresh one.
///
/// # Examples
///
/// ```rust
/// use itemscale::{identity_for, AttributeId, EquipmentSlot};
///
/// let damage = AttributeId::attack_damage();
/// assert!(identity_for(EquipmentSlot::MainHand, &damage).is_stable());
/// assert!(!identity_for(EquipmentSlot::Head, &damage).is_stable());
/// ```
pub fn identity_for(slot: EquipmentSlot, attribute: &AttributeId) -> ModifierIdentity {
    if slot.is_hand() {
        if let Some(id) = well_known_id(attribute) {
            return ModifierIdentity::Stable(id);
        }
    }
    ModifierIdentity::Fresh(ModifierId::fresh())
}
