//! Per-item modifier storage.
//!
//! `ModifierStore` is the decoded, in-memory form of an item's persisted
//! modifier list. Scaling loads it once, works on it, and writes it back in
//! one piece with [`ModifierStore::to_persisted`].
//!
//! A store starts either *unsnapshotted* (the item has no persisted list and
//! the host serves its built-in modifiers) or *snapshotted*. The transition
//! happens exactly once, in [`ModifierStore::snapshot_baseline`].

use crate::attribute::AttributeId;
use crate::error::ScaleError;
use crate::identity::identity_for;
use crate::item::HostItem;
use crate::modifier::Modifier;
use crate::slot::EquipmentSlot;
use serde_json::{Map, Value};

/// Host fields `Modifier` models; everything else in a compound is carried over.
const MODELLED_FIELDS: [&str; 6] = ["UUID", "Name", "Amount", "Operation", "Slot", "AttributeName"];

/// One entry of the persisted list.
#[derive(Debug, Clone, PartialEq)]
enum StoredEntry {
    Modifier {
        modifier: Modifier,
        /// Host fields outside the modelled set, written back unchanged.
        extra: Map<String, Value>,
    },
    /// Entry this crate cannot decode; kept verbatim and never matched.
    Opaque(Value),
}

impl StoredEntry {
    fn new(modifier: Modifier) -> Self {
        StoredEntry::Modifier {
            modifier,
            extra: Map::new(),
        }
    }

    fn decode(value: Value) -> Self {
        match serde_json::from_value::<Modifier>(value.clone()) {
            Ok(modifier) => {
                let extra = match value {
                    Value::Object(mut fields) => {
                        fields.retain(|key, _| !MODELLED_FIELDS.contains(&key.as_str()));
                        fields
                    }
                    _ => Map::new(),
                };
                StoredEntry::Modifier { modifier, extra }
            }
            Err(_) => StoredEntry::Opaque(value),
        }
    }

    fn encode(&self) -> Result<Value, serde_json::Error> {
        match self {
            StoredEntry::Modifier { modifier, extra } => {
                let mut value = serde_json::to_value(modifier)?;
                if let Value::Object(fields) = &mut value {
                    for (key, field) in extra {
                        fields.entry(key.clone()).or_insert_with(|| field.clone());
                    }
                }
                Ok(value)
            }
            StoredEntry::Opaque(value) => Ok(value.clone()),
        }
    }

    fn as_modifier(&self) -> Option<&Modifier> {
        match self {
            StoredEntry::Modifier { modifier, .. } => Some(modifier),
            StoredEntry::Opaque(_) => None,
        }
    }
}

/// Decoded modifier storage of one item.
///
/// # Examples
///
/// ```rust
/// use itemscale::{ActiveModifier, AttributeId, EquipmentSlot, ItemKind, ItemStack, ModifierStore};
///
/// let sword = ItemStack::new("minecraft:iron_sword", ItemKind::Tool).with_default_modifier(
///     EquipmentSlot::MainHand,
///     ActiveModifier::additive(AttributeId::attack_damage(), "Weapon modifier", 5.0),
/// );
///
/// let mut store = ModifierStore::load(&sword);
/// assert!(!store.is_snapshotted());
///
/// store.snapshot_baseline(&sword);
/// let damage = store.query_additive(&AttributeId::attack_damage(), EquipmentSlot::MainHand);
/// assert_eq!(damage.len(), 1);
/// assert_eq!(damage[0].amount, 5.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifierStore {
    entries: Option<Vec<StoredEntry>>,
}

impl ModifierStore {
    /// An unsnapshotted store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the persisted storage of `item`.
    ///
    /// Storage that is not a list counts as absent, so the item will be
    /// snapshotted again from its active modifiers.
    pub fn load<I: HostItem + ?Sized>(item: &I) -> Self {
        Self::from_persisted(item.persisted_modifiers())
    }

    pub fn from_persisted(storage: Option<&Value>) -> Self {
        match storage {
            Some(Value::Array(entries)) => Self {
                entries: Some(entries.iter().cloned().map(StoredEntry::decode).collect()),
            },
            Some(other) => {
                tracing::warn!(
                    "Persisted attribute modifiers are not a list ({}), treating item as unscaled",
                    kind_of(other)
                );
                Self { entries: None }
            }
            None => Self { entries: None },
        }
    }

    /// Encode for writing back, or `None` if nothing was ever persisted.
    pub fn to_persisted(&self) -> Result<Option<Value>, ScaleError> {
        let Some(entries) = &self.entries else {
            return Ok(None);
        };
        let encoded = entries
            .iter()
            .map(StoredEntry::encode)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(Value::Array(encoded)))
    }

    pub fn is_snapshotted(&self) -> bool {
        self.entries.is_some()
    }

    /// Copy every active modifier of `item` into persisted storage.
    ///
    /// Does nothing once the store is snapshotted; copying twice would
    /// double the item's baseline stats. Ids are reassigned through the
    /// identity policy; names, amounts and operations are kept.
    ///
    /// Returns the number of modifiers copied.
    pub fn snapshot_baseline<I: HostItem + ?Sized>(&mut self, item: &I) -> usize {
        if self.is_snapshotted() {
            return 0;
        }
        let mut entries = Vec::new();
        for &slot in EquipmentSlot::all() {
            for active in item.active_modifiers(slot) {
                let id = identity_for(slot, &active.attribute).id();
                entries.push(StoredEntry::new(Modifier::new(
                    id,
                    active.name,
                    active.amount,
                    active.operation,
                    slot,
                    active.attribute,
                )));
            }
        }
        tracing::debug!(
            "Snapshotted {} baseline modifiers of {}",
            entries.len(),
            item.item_id()
        );
        let copied = entries.len();
        self.entries = Some(entries);
        copied
    }

    /// Additive modifiers for `attribute` on `slot`, in insertion order.
    pub fn query_additive(&self, attribute: &AttributeId, slot: EquipmentSlot) -> Vec<Modifier> {
        self.modifiers()
            .filter(|m| m.is_additive() && m.targets(attribute, slot))
            .cloned()
            .collect()
    }

    /// Every decodable modifier, in insertion order.
    pub fn modifiers(&self) -> impl Iterator<Item = &Modifier> {
        self.entries
            .iter()
            .flatten()
            .filter_map(StoredEntry::as_modifier)
    }

    /// Modifiers stored for `slot`.
    pub fn modifiers_for(&self, slot: EquipmentSlot) -> Vec<&Modifier> {
        self.modifiers().filter(|m| m.slot == slot).collect()
    }

    /// Remove the first stored entry that is `modifier`.
    ///
    /// Entries match on id, slot, attribute and operation (see
    /// [`Modifier::is_same_entry`]), so a shared hand id never removes the
    /// other hand's entry or a multiplier.
    ///
    /// Returns whether one was removed. Removing a modifier that is not
    /// stored is not an error; removing from a store that has no persisted
    /// list is.
    pub fn remove(&mut self, modifier: &Modifier) -> Result<bool, ScaleError> {
        let entries = self.entries.as_mut().ok_or_else(|| {
            ScaleError::MalformedModifierStorage(format!(
                "no persisted modifier list to remove {} from",
                modifier.id
            ))
        })?;
        let position = entries.iter().position(|entry| {
            entry
                .as_modifier()
                .is_some_and(|stored| stored.is_same_entry(modifier))
        });
        Ok(match position {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        })
    }

    /// Append a modifier, creating the persisted list if needed.
    pub fn write(&mut self, modifier: Modifier) {
        self.entries
            .get_or_insert_with(Vec::new)
            .push(StoredEntry::new(modifier));
    }

    /// Number of persisted entries, including ones this crate cannot decode.
    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "compound",
    }
}
