//! Scaling orchestrator.
//!
//! Provides the `Scaler` type, the entry point for scaling a freshly
//! generated item. It classifies the item, asks the rule resolver for
//! rules, snapshots the item's baseline modifiers, merges every rule and
//! writes the resulting storage back to the item in one piece.

use crate::attribute::AttributeRegistry;
use crate::context::{BlockPos, ItemClass, ItemData, LocationData};
use crate::error::ScaleError;
use crate::item::HostItem;
use crate::merge::{Merger, SCALED_MODIFIER_NAME};
use crate::report::ScaleReport;
use crate::rule::RuleResolver;
use crate::store::ModifierStore;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Scaler settings.
///
/// # Examples
///
/// ```rust
/// use itemscale::ScalerConfig;
///
/// let config = ScalerConfig::from_json_str(r#"{ "scaled_modifier_name": "Loot scaling" }"#).unwrap();
/// assert_eq!(config.scaled_modifier_name, "Loot scaling");
///
/// let config = ScalerConfig::from_json_str("{}").unwrap();
/// assert_eq!(config.scaled_modifier_name, "Scaled attribute modifier");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalerConfig {
    /// Display name written on merged modifiers.
    pub scaled_modifier_name: String,
}

impl Default for ScalerConfig {
    fn default() -> Self {
        Self {
            scaled_modifier_name: SCALED_MODIFIER_NAME.to_string(),
        }
    }
}

impl ScalerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Scales items as they are generated.
///
/// A `Scaler` holds no per-item state and can be shared between threads
/// that generate different items.
///
/// # Examples
///
/// ```rust
/// use itemscale::*;
///
/// let scaler = Scaler::new(
///     StaticRules(vec![ScalingRule::add("generic.attack_damage", 3.0)]),
///     AttributeTable::vanilla(),
/// );
///
/// let mut sword = ItemStack::new("minecraft:iron_sword", ItemKind::Tool).with_default_modifier(
///     EquipmentSlot::MainHand,
///     ActiveModifier::additive(AttributeId::attack_damage(), "Weapon modifier", 4.0),
/// );
///
/// let location = LocationData::new("minecraft:overworld", None);
/// let report = scaler
///     .scale(&mut sword, &location, "minecraft:chests/simple_dungeon")
///     .unwrap();
/// assert_eq!(report.applied_count(), 1);
///
/// let store = ModifierStore::load(&sword);
/// let damage = store.query_additive(&AttributeId::attack_damage(), EquipmentSlot::MainHand);
/// assert_eq!(damage[0].amount, 7.0);
/// ```
pub struct Scaler<P, A> {
    resolver: P,
    registry: A,
    config: ScalerConfig,
}

impl<P, A> Scaler<P, A>
where
    P: RuleResolver,
    A: AttributeRegistry,
{
    pub fn new(resolver: P, registry: A) -> Self {
        Self {
            resolver,
            registry,
            config: ScalerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ScalerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ScalerConfig {
        &self.config
    }

    /// Scale `item` using the thread-local random generator.
    pub fn scale<I: HostItem + ?Sized>(
        &self,
        item: &mut I,
        location: &LocationData,
        loot_table_id: &str,
    ) -> Result<ScaleReport, ScaleError> {
        self.scale_with_rng(item, location, loot_table_id, &mut rand::thread_rng())
    }

    /// Scale an item rolled from a loot table, with an optional precise origin.
    pub fn scale_loot<I: HostItem + ?Sized>(
        &self,
        item: &mut I,
        dimension_id: &str,
        origin: Option<(f64, f64, f64)>,
        loot_table_id: &str,
    ) -> Result<ScaleReport, ScaleError> {
        let position = origin.map(|(x, y, z)| BlockPos::containing(x, y, z));
        let location = LocationData::new(dimension_id, position);
        self.scale(item, &location, loot_table_id)
    }

    /// Scale `item`, drawing rule values from `rng`.
    ///
    /// Fails only when the rule resolver fails or the merged storage cannot
    /// be encoded, and then leaves `item` untouched. Rules that cannot be applied are skipped and listed in
    /// the report.
    pub fn scale_with_rng<I, R>(
        &self,
        item: &mut I,
        location: &LocationData,
        loot_table_id: &str,
        rng: &mut R,
    ) -> Result<ScaleReport, ScaleError>
    where
        I: HostItem + ?Sized,
        R: Rng,
    {
        let item_id = item.item_id().to_string();
        let mut report = ScaleReport::new(item_id.clone());

        let class = ItemClass::of(item.kind());
        let Some(category) = class.category() else {
            return Ok(report);
        };
        let slots = class.slots();

        let item_data = ItemData::new(category, loot_table_id, item_id.clone(), item.rarity());
        tracing::debug!(
            "Item scaling start. dimension: {} position: {:?}, loot table: {}, item: {}, rarity: {}",
            location.dimension_id,
            location.position,
            loot_table_id,
            item_id,
            item_data.rarity
        );

        let rules = self
            .resolver
            .rules_for(location, &item_data)
            .map_err(|source| {
                tracing::error!("Failed to resolve scaling rules for {}: {}", item_id, source);
                ScaleError::RuleResolution {
                    item_id: item_id.clone(),
                    source,
                }
            })?;
        tracing::debug!("Found {} scaling rules for {}", rules.len(), item_id);

        let mut store = ModifierStore::load(&*item);
        report.snapshotted = !store.is_snapshotted();
        store.snapshot_baseline(&*item);

        let merger = Merger::new(&self.registry).with_modifier_name(&self.config.scaled_modifier_name);
        for rule in rules {
            let result = merger.merge(&mut store, &rule, &slots, &item_id, rng);
            if let Err(err) = &result {
                tracing::warn!("Failed to apply rule {} to {}: {}", rule, item_id, err);
            }
            report.record(rule, result);
        }

        let storage = store.to_persisted().map_err(|err| {
            tracing::error!("Failed to write scaled modifiers back to {}: {}", item_id, err);
            err
        })?;
        if let Some(storage) = storage {
            item.set_persisted_modifiers(storage);
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttributeId, AttributeTable};
    use crate::context::{ItemCategory, ItemKind};
    use crate::error::ResolverError;
    use crate::modifier::ActiveModifier;
    use crate::rule::{ScalingRule, StaticRules};
    use crate::slot::EquipmentSlot;
    use crate::item::ItemStack;
    use std::sync::Mutex;

    fn overworld() -> LocationData {
        LocationData::new("minecraft:overworld", Some(BlockPos::new(0, 64, 0)))
    }

    #[test]
    fn test_other_items_are_ignored() {
        let resolver = |_: &LocationData, _: &ItemData| -> Result<Vec<ScalingRule>, ResolverError> {
            panic!("resolver must not be consulted for unscalable items")
        };
        let scaler = Scaler::new(resolver, AttributeTable::vanilla());
        let mut stick = ItemStack::new("minecraft:stick", ItemKind::Other);
        let report = scaler.scale(&mut stick, &overworld(), "t").unwrap();
        assert!(report.rules.is_empty());
        assert!(stick.persisted_modifiers().is_none());
    }

    #[test]
    fn test_resolver_sees_item_description() {
        let seen = Mutex::new(Vec::new());
        let resolver = |location: &LocationData, item: &ItemData| -> Result<Vec<ScalingRule>, ResolverError> {
            seen.lock().unwrap().push((location.clone(), item.clone()));
            Ok(Vec::new())
        };
        let scaler = Scaler::new(&resolver, AttributeTable::vanilla());
        let mut helmet = ItemStack::new("minecraft:iron_helmet", ItemKind::Armor(EquipmentSlot::Head))
            .with_rarity(crate::context::Rarity::Rare);
        scaler
            .scale(&mut helmet, &overworld(), "minecraft:chests/stronghold_corridor")
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, overworld());
        assert_eq!(
            seen[0].1,
            ItemData::new(
                ItemCategory::Armor,
                "minecraft:chests/stronghold_corridor",
                "minecraft:iron_helmet",
                crate::context::Rarity::Rare
            )
        );
    }

    #[test]
    fn test_resolver_failure_leaves_item_untouched() {
        let resolver = |_: &LocationData, _: &ItemData| -> Result<Vec<ScalingRule>, ResolverError> {
            Err("no patterns loaded".into())
        };
        let scaler = Scaler::new(resolver, AttributeTable::vanilla());
        let mut sword = ItemStack::new("minecraft:iron_sword", ItemKind::Tool).with_default_modifier(
            EquipmentSlot::MainHand,
            ActiveModifier::additive(AttributeId::attack_damage(), "Weapon modifier", 5.0),
        );
        let err = scaler.scale(&mut sword, &overworld(), "t").unwrap_err();
        assert!(matches!(err, ScaleError::RuleResolution { .. }));
        assert!(sword.persisted_modifiers().is_none());
    }

    #[test]
    fn test_configured_modifier_name_is_written() {
        let scaler = Scaler::new(
            StaticRules(vec![ScalingRule::add("generic.armor", 1.0)]),
            AttributeTable::vanilla(),
        )
        .with_config(ScalerConfig {
            scaled_modifier_name: "Dungeon scaling".to_string(),
        });
        let mut boots = ItemStack::new("minecraft:iron_boots", ItemKind::Armor(EquipmentSlot::Feet));
        scaler.scale(&mut boots, &overworld(), "t").unwrap();

        let store = ModifierStore::load(&boots);
        let armor = store.query_additive(&AttributeId::parse("generic.armor"), EquipmentSlot::Feet);
        assert_eq!(armor[0].name, "Dungeon scaling");
    }

    #[test]
    fn test_scale_loot_floors_origin() {
        let seen = Mutex::new(None);
        let resolver = |location: &LocationData, _: &ItemData| -> Result<Vec<ScalingRule>, ResolverError> {
            *seen.lock().unwrap() = Some(location.clone());
            Ok(Vec::new())
        };
        let scaler = Scaler::new(&resolver, AttributeTable::vanilla());
        let mut bow = ItemStack::new("minecraft:bow", ItemKind::RangedWeapon);
        scaler
            .scale_loot(&mut bow, "minecraft:the_nether", Some((10.5, 70.2, -3.1)), "t")
            .unwrap();
        assert_eq!(
            seen.lock().unwrap().clone(),
            Some(LocationData::new(
                "minecraft:the_nether",
                Some(BlockPos::new(10, 70, -4))
            ))
        );
    }

    #[test]
    fn test_scaler_is_shareable_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Scaler<StaticRules, AttributeTable>>();
    }
}
