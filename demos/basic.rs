//! Basic example: scaling a freshly generated sword
//!
//! This example demonstrates:
//! - Describing an item and its built-in modifiers
//! - Scaling it with a fixed rule set
//! - Reading the merged modifiers back

use itemscale::*;

fn main() -> Result<(), ScaleError> {
    // One rule: +3 attack damage, written to both hands
    let rules = StaticRules(vec![ScalingRule::add("generic.attack_damage", 3.0)]);
    let scaler = Scaler::new(rules, AttributeTable::vanilla());

    // An iron sword with its built-in 4 attack damage in the main hand
    let mut sword = ItemStack::new("minecraft:iron_sword", ItemKind::Tool)
        .with_rarity(Rarity::Uncommon)
        .with_default_modifier(
            EquipmentSlot::MainHand,
            ActiveModifier::additive(AttributeId::attack_damage(), "Weapon modifier", 4.0),
        );

    let location = LocationData::new("minecraft:overworld", Some(BlockPos::new(120, 40, -64)));
    println!("Scaling {}...", sword.item_id());
    let report = scaler.scale(&mut sword, &location, "minecraft:chests/simple_dungeon")?;

    println!("\n=== Report ===");
    println!("Snapshotted baseline: {}", report.snapshotted);
    for (rule, outcome) in &report.rules {
        match outcome {
            RuleOutcome::Applied(merged) => println!("  {}: applied (value {:.2})", rule, merged.value),
            RuleOutcome::Skipped(err) => println!("  {}: skipped ({})", rule, err),
        }
    }

    println!("\n=== Stored Modifiers ===");
    for modifier in ModifierStore::load(&sword).modifiers() {
        println!(
            "  {} {}: {:.2} ({})",
            modifier.slot, modifier.attribute, modifier.amount, modifier.name
        );
    }

    println!("\nMain hand: 4 + 3 = 7, off hand: 0 + 3 = 3");

    Ok(())
}
