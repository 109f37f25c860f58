//! Merge engine.
//!
//! Applying a rule to a slot folds every additive modifier of the rule's
//! attribute into one: the stored additive amounts are summed, the rule's
//! value is added to (or multiplies) that sum, and the result replaces the
//! modifiers it was computed from. Modifiers with other operations never
//! take part, so multipliers from other sources keep their own effect.
//!
//! A rule either applies to every requested slot or to none: the merge runs
//! on a working copy of the store that is only committed on success.

use crate::attribute::{AttributeId, AttributeRegistry};
use crate::error::ScaleError;
use crate::identity::identity_for;
use crate::modifier::{Modifier, Operation};
use crate::rule::ScalingRule;
use crate::slot::EquipmentSlot;
use crate::store::ModifierStore;
use rand::Rng;

/// Display name given to merged modifiers unless configured otherwise.
pub const SCALED_MODIFIER_NAME: &str = "Scaled attribute modifier";

/// What a merge did to one slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotMerge {
    /// `replaced` modifiers were folded into one modifier worth `amount`.
    Written {
        slot: EquipmentSlot,
        amount: f64,
        replaced: usize,
    },
    /// The merged sum was zero; the slot was left as it was.
    Unchanged { slot: EquipmentSlot },
}

impl SlotMerge {
    pub fn slot(&self) -> EquipmentSlot {
        match self {
            SlotMerge::Written { slot, .. } | SlotMerge::Unchanged { slot } => *slot,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, SlotMerge::Written { .. })
    }
}

/// Result of applying one rule.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub attribute: AttributeId,
    /// The value drawn for the rule, shared by all slots.
    pub value: f64,
    pub slots: Vec<SlotMerge>,
}

/// Applies scaling rules to a [`ModifierStore`].
///
/// # Examples
///
/// ```rust
/// use itemscale::{AttributeId, AttributeTable, EquipmentSlot, Merger, ModifierStore, ScalingRule};
///
/// let registry = AttributeTable::vanilla();
/// let merger = Merger::new(&registry);
/// let mut store = ModifierStore::new();
/// let mut rng = rand::thread_rng();
///
/// let rule = ScalingRule::add("generic.attack_damage", 3.0);
/// let outcome = merger
///     .merge(&mut store, &rule, &[EquipmentSlot::MainHand], "minecraft:iron_sword", &mut rng)
///     .unwrap();
/// assert_eq!(outcome.value, 3.0);
///
/// let damage = store.query_additive(&AttributeId::attack_damage(), EquipmentSlot::MainHand);
/// assert_eq!(damage[0].amount, 3.0);
/// ```
pub struct Merger<'a> {
    registry: &'a dyn AttributeRegistry,
    modifier_name: &'a str,
}

impl<'a> Merger<'a> {
    pub fn new(registry: &'a dyn AttributeRegistry) -> Self {
        Self {
            registry,
            modifier_name: SCALED_MODIFIER_NAME,
        }
    }

    /// Use `name` as the display name of merged modifiers.
    pub fn with_modifier_name(mut self, name: &'a str) -> Self {
        self.modifier_name = name;
        self
    }

    /// Apply `rule` to each of `slots` independently.
    ///
    /// On error `store` is left exactly as it was.
    pub fn merge<R: Rng>(
        &self,
        store: &mut ModifierStore,
        rule: &ScalingRule,
        slots: &[EquipmentSlot],
        item_id: &str,
        rng: &mut R,
    ) -> Result<MergeOutcome, ScaleError> {
        let attribute =
            self.registry
                .resolve(&rule.attribute)
                .ok_or_else(|| ScaleError::UnknownAttribute {
                    attribute: rule.attribute.clone(),
                })?;
        let value = rule.value.sample(attribute.as_str(), rng)?;
        tracing::trace!("Sampled {} for rule {} on {}", value, rule, item_id);

        let mut working = store.clone();
        let mut merged = Vec::with_capacity(slots.len());
        for &slot in slots {
            merged.push(self.merge_slot(&mut working, rule, &attribute, value, slot, item_id)?);
        }
        *store = working;

        Ok(MergeOutcome {
            attribute,
            value,
            slots: merged,
        })
    }

    fn merge_slot(
        &self,
        store: &mut ModifierStore,
        rule: &ScalingRule,
        attribute: &AttributeId,
        value: f64,
        slot: EquipmentSlot,
        item_id: &str,
    ) -> Result<SlotMerge, ScaleError> {
        let existing = store.query_additive(attribute, slot);
        let sum: f64 = existing.iter().map(|m| m.amount).sum();
        let combined = rule.operation.combine(sum, value);

        if !combined.is_finite() {
            return Err(ScaleError::NonFiniteValue {
                attribute: attribute.to_string(),
                slot,
            });
        }
        if combined == 0.0 {
            tracing::debug!(
                "Merged {} on {} of {} is zero, leaving {} modifiers in place",
                attribute,
                slot,
                item_id,
                existing.len()
            );
            return Ok(SlotMerge::Unchanged { slot });
        }

        for modifier in &existing {
            if let Err(err) = store.remove(modifier) {
                tracing::warn!(
                    "Could not remove modifier {} from {}: {}",
                    modifier.id,
                    item_id,
                    err
                );
            }
        }
        store.write(Modifier::new(
            identity_for(slot, attribute).id(),
            self.modifier_name,
            combined,
            Operation::Addition,
            slot,
            attribute.clone(),
        ));
        tracing::debug!(
            "Merged {} additive {} modifiers on {} of {} into {}",
            existing.len(),
            attribute,
            slot,
            item_id,
            combined
        );

        Ok(SlotMerge::Written {
            slot,
            amount: combined,
            replaced: existing.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeTable;
    use crate::identity::ATTACK_DAMAGE_MODIFIER_ID;
    use crate::modifier::ModifierId;
    use crate::rule::RuleValue;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ITEM: &str = "minecraft:iron_sword";

    fn damage() -> AttributeId {
        AttributeId::attack_damage()
    }

    fn additive(amount: f64, slot: EquipmentSlot, attribute: AttributeId) -> Modifier {
        Modifier::new(
            ModifierId::fresh(),
            "Weapon modifier",
            amount,
            Operation::Addition,
            slot,
            attribute,
        )
    }

    fn store_with(modifiers: Vec<Modifier>) -> ModifierStore {
        let mut store = ModifierStore::new();
        for modifier in modifiers {
            store.write(modifier);
        }
        store
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_additive_rule_folds_existing_sum() {
        let registry = AttributeTable::vanilla();
        let mut store = store_with(vec![
            additive(4.0, EquipmentSlot::MainHand, damage()),
            additive(1.5, EquipmentSlot::MainHand, damage()),
        ]);
        let outcome = Merger::new(&registry)
            .merge(
                &mut store,
                &ScalingRule::add("generic.attack_damage", 2.0),
                &[EquipmentSlot::MainHand],
                ITEM,
                &mut rng(),
            )
            .unwrap();

        let merged = store.query_additive(&damage(), EquipmentSlot::MainHand);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].amount, 7.5);
        assert_eq!(merged[0].name, SCALED_MODIFIER_NAME);
        assert_eq!(
            outcome.slots,
            vec![SlotMerge::Written {
                slot: EquipmentSlot::MainHand,
                amount: 7.5,
                replaced: 2
            }]
        );
    }

    #[test]
    fn test_multiplicative_rule_scales_existing_sum() {
        let registry = AttributeTable::vanilla();
        let mut store = store_with(vec![additive(4.0, EquipmentSlot::MainHand, damage())]);
        Merger::new(&registry)
            .merge(
                &mut store,
                &ScalingRule::multiply("generic.attack_damage", 1.5),
                &[EquipmentSlot::MainHand],
                ITEM,
                &mut rng(),
            )
            .unwrap();

        let merged = store.query_additive(&damage(), EquipmentSlot::MainHand);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].amount, 6.0);
    }

    #[test]
    fn test_multiplicative_modifiers_are_not_merged() {
        let registry = AttributeTable::vanilla();
        let mut multiplier = additive(0.25, EquipmentSlot::MainHand, damage());
        multiplier.operation = Operation::MultiplyTotal;
        let mut store = store_with(vec![
            additive(4.0, EquipmentSlot::MainHand, damage()),
            multiplier.clone(),
        ]);
        Merger::new(&registry)
            .merge(
                &mut store,
                &ScalingRule::add("generic.attack_damage", 1.0),
                &[EquipmentSlot::MainHand],
                ITEM,
                &mut rng(),
            )
            .unwrap();

        assert!(store.modifiers().any(|m| *m == multiplier));
        assert_eq!(
            store.query_additive(&damage(), EquipmentSlot::MainHand)[0].amount,
            5.0
        );
    }

    #[test]
    fn test_zero_sum_leaves_modifiers_in_place() {
        let registry = AttributeTable::vanilla();
        let original = vec![
            additive(2.0, EquipmentSlot::MainHand, damage()),
            additive(1.0, EquipmentSlot::MainHand, damage()),
        ];
        let mut store = store_with(original.clone());
        let outcome = Merger::new(&registry)
            .merge(
                &mut store,
                &ScalingRule::add("generic.attack_damage", -3.0),
                &[EquipmentSlot::MainHand],
                ITEM,
                &mut rng(),
            )
            .unwrap();

        assert_eq!(store.query_additive(&damage(), EquipmentSlot::MainHand), original);
        assert_eq!(
            outcome.slots,
            vec![SlotMerge::Unchanged {
                slot: EquipmentSlot::MainHand
            }]
        );
    }

    #[test]
    fn test_slots_are_merged_independently() {
        let registry = AttributeTable::vanilla();
        let mut store = store_with(vec![additive(4.0, EquipmentSlot::MainHand, damage())]);
        Merger::new(&registry)
            .merge(
                &mut store,
                &ScalingRule::add("generic.attack_damage", 3.0),
                EquipmentSlot::hands(),
                ITEM,
                &mut rng(),
            )
            .unwrap();

        let main = store.query_additive(&damage(), EquipmentSlot::MainHand);
        let off = store.query_additive(&damage(), EquipmentSlot::OffHand);
        assert_eq!(main.len(), 1);
        assert_eq!(main[0].amount, 7.0);
        assert_eq!(off.len(), 1);
        assert_eq!(off[0].amount, 3.0);
    }

    #[test]
    fn test_range_sampled_once_for_all_slots() {
        let registry = AttributeTable::vanilla();
        let mut store = ModifierStore::new();
        let rule = ScalingRule::add(
            "generic.attack_damage",
            RuleValue::Range { min: 1.0, max: 10.0 },
        );
        let outcome = Merger::new(&registry)
            .merge(&mut store, &rule, EquipmentSlot::hands(), ITEM, &mut rng())
            .unwrap();

        let main = store.query_additive(&damage(), EquipmentSlot::MainHand);
        let off = store.query_additive(&damage(), EquipmentSlot::OffHand);
        assert_eq!(main[0].amount, outcome.value);
        assert_eq!(off[0].amount, outcome.value);
    }

    #[test]
    fn test_other_attributes_untouched() {
        let registry = AttributeTable::vanilla();
        let speed = additive(-2.4, EquipmentSlot::MainHand, AttributeId::attack_speed());
        let mut store = store_with(vec![
            additive(4.0, EquipmentSlot::MainHand, damage()),
            speed.clone(),
        ]);
        Merger::new(&registry)
            .merge(
                &mut store,
                &ScalingRule::add("generic.attack_damage", 1.0),
                &[EquipmentSlot::MainHand],
                ITEM,
                &mut rng(),
            )
            .unwrap();

        assert_eq!(
            store.query_additive(&AttributeId::attack_speed(), EquipmentSlot::MainHand),
            vec![speed]
        );
    }

    #[test]
    fn test_stable_identity_in_hand() {
        let registry = AttributeTable::vanilla();
        let mut store = ModifierStore::new();
        let merger = Merger::new(&registry);
        let rule = ScalingRule::add("generic.attack_damage", 2.0);
        for _ in 0..2 {
            merger
                .merge(&mut store, &rule, &[EquipmentSlot::MainHand], ITEM, &mut rng())
                .unwrap();
            let merged = store.query_additive(&damage(), EquipmentSlot::MainHand);
            assert_eq!(merged.len(), 1);
            assert_eq!(merged[0].id, ModifierId(ATTACK_DAMAGE_MODIFIER_ID));
        }
        assert_eq!(
            store.query_additive(&damage(), EquipmentSlot::MainHand)[0].amount,
            4.0
        );
    }

    fn hand_damage(slot: EquipmentSlot, operation: Operation, amount: f64) -> Modifier {
        Modifier::new(
            ModifierId(ATTACK_DAMAGE_MODIFIER_ID),
            "Weapon modifier",
            amount,
            operation,
            slot,
            damage(),
        )
    }

    #[test]
    fn test_shared_hand_id_merges_each_hand_separately() {
        let registry = AttributeTable::vanilla();
        let mut store = store_with(vec![
            hand_damage(EquipmentSlot::OffHand, Operation::Addition, 1.0),
            hand_damage(EquipmentSlot::MainHand, Operation::Addition, 4.0),
        ]);
        Merger::new(&registry)
            .merge(
                &mut store,
                &ScalingRule::add("generic.attack_damage", 2.0),
                EquipmentSlot::hands(),
                ITEM,
                &mut rng(),
            )
            .unwrap();

        let main = store.query_additive(&damage(), EquipmentSlot::MainHand);
        let off = store.query_additive(&damage(), EquipmentSlot::OffHand);
        assert_eq!(main.iter().map(|m| m.amount).collect::<Vec<_>>(), [6.0]);
        assert_eq!(off.iter().map(|m| m.amount).collect::<Vec<_>>(), [3.0]);
    }

    #[test]
    fn test_multiplier_sharing_hand_id_survives_merge() {
        let registry = AttributeTable::vanilla();
        let multiplier = hand_damage(EquipmentSlot::MainHand, Operation::MultiplyTotal, 0.1);
        let mut store = store_with(vec![
            multiplier.clone(),
            hand_damage(EquipmentSlot::MainHand, Operation::Addition, 4.0),
        ]);
        Merger::new(&registry)
            .merge(
                &mut store,
                &ScalingRule::add("generic.attack_damage", 2.0),
                &[EquipmentSlot::MainHand],
                ITEM,
                &mut rng(),
            )
            .unwrap();

        let stored: Vec<_> = store
            .modifiers_for(EquipmentSlot::MainHand)
            .into_iter()
            .map(|m| (m.operation, m.amount))
            .collect();
        assert_eq!(
            stored,
            [(Operation::MultiplyTotal, 0.1), (Operation::Addition, 6.0)]
        );
        assert!(store.modifiers().any(|m| *m == multiplier));
    }

    #[test]
    fn test_unknown_attribute_is_rejected_without_changes() {
        let registry = AttributeTable::vanilla();
        let mut store = store_with(vec![additive(4.0, EquipmentSlot::MainHand, damage())]);
        let before = store.clone();
        let err = Merger::new(&registry)
            .merge(
                &mut store,
                &ScalingRule::add("generic.mana", 1.0),
                &[EquipmentSlot::MainHand],
                ITEM,
                &mut rng(),
            )
            .unwrap_err();

        assert!(matches!(err, ScaleError::UnknownAttribute { .. }));
        assert_eq!(store, before);
    }

    #[test]
    fn test_failure_on_second_slot_rolls_back_first() {
        let registry = AttributeTable::vanilla();
        let mut store = store_with(vec![
            additive(2.0, EquipmentSlot::MainHand, damage()),
            additive(f64::MAX, EquipmentSlot::OffHand, damage()),
        ]);
        let before = store.clone();
        let err = Merger::new(&registry)
            .merge(
                &mut store,
                &ScalingRule::multiply("generic.attack_damage", 10.0),
                EquipmentSlot::hands(),
                ITEM,
                &mut rng(),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            ScaleError::NonFiniteValue {
                slot: EquipmentSlot::OffHand,
                ..
            }
        ));
        assert_eq!(store, before);
    }

    #[test]
    fn test_unsnapshotted_store_gets_a_list() {
        let registry = AttributeTable::vanilla();
        let mut store = ModifierStore::new();
        Merger::new(&registry)
            .with_modifier_name("Loot scaling")
            .merge(
                &mut store,
                &ScalingRule::add("generic.armor", 2.0),
                &[EquipmentSlot::Chest],
                "minecraft:iron_chestplate",
                &mut rng(),
            )
            .unwrap();

        assert!(store.is_snapshotted());
        let stored: Vec<_> = store.modifiers().collect();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "Loot scaling");
    }
}
