//! Attribute modifiers attached to an item slot.

use crate::attribute::AttributeId;
use crate::slot::EquipmentSlot;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// How the host combines a modifier into an attribute value.
///
/// Persisted as the host's numeric operation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Operation {
    /// Summed into the base value (code 0). The only operation merged by scaling.
    Addition,
    /// Multiplies the base value (code 1).
    MultiplyBase,
    /// Multiplies the total value (code 2).
    MultiplyTotal,
}

impl Operation {
    pub fn code(self) -> u8 {
        match self {
            Operation::Addition => 0,
            Operation::MultiplyBase => 1,
            Operation::MultiplyTotal => 2,
        }
    }
}

impl From<Operation> for u8 {
    fn from(operation: Operation) -> u8 {
        operation.code()
    }
}

impl TryFrom<u8> for Operation {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Operation::Addition),
            1 => Ok(Operation::MultiplyBase),
            2 => Ok(Operation::MultiplyTotal),
            other => Err(format!("unknown modifier operation code {other}")),
        }
    }
}

/// Identity of a stored modifier.
///
/// The host recognizes "the same" modifier across rewrites by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifierId(pub Uuid);

impl ModifierId {
    /// A new random identity.
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ModifierId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for ModifierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One numeric contribution to one attribute, on one slot of one item.
///
/// Field names follow the host's persisted compound layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    #[serde(rename = "UUID")]
    pub id: ModifierId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Amount")]
    pub amount: f64,
    #[serde(rename = "Operation")]
    pub operation: Operation,
    #[serde(rename = "Slot")]
    pub slot: EquipmentSlot,
    #[serde(rename = "AttributeName")]
    pub attribute: AttributeId,
}

impl Modifier {
    pub fn new(
        id: ModifierId,
        name: impl Into<String>,
        amount: f64,
        operation: Operation,
        slot: EquipmentSlot,
        attribute: AttributeId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            amount,
            operation,
            slot,
            attribute,
        }
    }

    pub fn is_additive(&self) -> bool {
        self.operation == Operation::Addition
    }

    /// Whether this modifier applies to `attribute` on `slot`.
    pub fn targets(&self, attribute: &AttributeId, slot: EquipmentSlot) -> bool {
        self.slot == slot && &self.attribute == attribute
    }

    /// Whether `other` denotes the same stored entry as this one.
    ///
    /// Stable ids repeat across hands and operations, so the id alone does
    /// not pick out one entry; slot, attribute and operation must match too.
    pub fn is_same_entry(&self, other: &Modifier) -> bool {
        self.id == other.id
            && self.operation == other.operation
            && self.targets(&other.attribute, other.slot)
    }
}

/// A modifier as the host reports it before scaling: no slot, since the
/// host hands them out per slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveModifier {
    pub attribute: AttributeId,
    pub id: ModifierId,
    pub name: String,
    pub amount: f64,
    pub operation: Operation,
}

impl ActiveModifier {
    pub fn additive(attribute: AttributeId, name: impl Into<String>, amount: f64) -> Self {
        Self {
            attribute,
            id: ModifierId::fresh(),
            name: name.into(),
            amount,
            operation: Operation::Addition,
        }
    }
}
