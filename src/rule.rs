//! Scaling rules and the rule resolution seam.
//!
//! A `ScalingRule` says "adjust this attribute by this operation and value".
//! Rules are produced outside this crate by a [`RuleResolver`] from the item
//! and location descriptions; this module only defines their shape and how
//! their values are sampled.

use crate::context::{ItemData, LocationData};
use crate::error::{ResolverError, ScaleError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a rule's value combines with the summed additive modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOperation {
    /// `sum + value`
    Add,
    /// `sum * value`
    Multiply,
}

impl RuleOperation {
    /// Combine the existing additive sum with a sampled rule value.
    pub fn combine(self, sum: f64, value: f64) -> f64 {
        match self {
            RuleOperation::Add => sum + value,
            RuleOperation::Multiply => sum * value,
        }
    }
}

/// Fixed value or inclusive range sampled uniformly.
///
/// Deserializes from either a bare number or `{ "min": .., "max": .. }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Fixed(f64),
    Range { min: f64, max: f64 },
}

impl RuleValue {
    /// Draw one value.
    ///
    /// `attribute` is only used to describe a failure.
    pub fn sample<R: Rng>(&self, attribute: &str, rng: &mut R) -> Result<f64, ScaleError> {
        let invalid = |reason: String| ScaleError::InvalidRuleValue {
            attribute: attribute.to_string(),
            reason,
        };
        match *self {
            RuleValue::Fixed(value) if value.is_finite() => Ok(value),
            RuleValue::Fixed(value) => Err(invalid(format!("value {value} is not finite"))),
            RuleValue::Range { min, max } if !min.is_finite() || !max.is_finite() => {
                Err(invalid(format!("range {min}..={max} is not finite")))
            }
            RuleValue::Range { min, max } if min > max => {
                Err(invalid(format!("range minimum {min} exceeds maximum {max}")))
            }
            RuleValue::Range { min, max } if min == max => Ok(min),
            RuleValue::Range { min, max } => Ok(rng.gen_range(min..=max)),
        }
    }
}

impl From<f64> for RuleValue {
    fn from(value: f64) -> Self {
        RuleValue::Fixed(value)
    }
}

impl fmt::Display for RuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleValue::Fixed(value) => write!(f, "{value}"),
            RuleValue::Range { min, max } => write!(f, "{min}..={max}"),
        }
    }
}

/// One externally supplied scaling instruction.
///
/// # Examples
///
/// ```rust
/// use itemscale::{RuleOperation, ScalingRule};
///
/// let rule: ScalingRule = serde_json::from_str(
///     r#"{ "attribute": "generic.attack_damage", "operation": "add", "value": { "min": 1.0, "max": 3.0 } }"#,
/// ).unwrap();
/// assert_eq!(rule.operation, RuleOperation::Add);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingRule {
    /// Textual attribute identifier, resolved through the registry.
    pub attribute: String,
    pub operation: RuleOperation,
    pub value: RuleValue,
}

impl ScalingRule {
    pub fn new(
        attribute: impl Into<String>,
        operation: RuleOperation,
        value: impl Into<RuleValue>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            operation,
            value: value.into(),
        }
    }

    pub fn add(attribute: impl Into<String>, value: impl Into<RuleValue>) -> Self {
        Self::new(attribute, RuleOperation::Add, value)
    }

    pub fn multiply(attribute: impl Into<String>, value: impl Into<RuleValue>) -> Self {
        Self::new(attribute, RuleOperation::Multiply, value)
    }
}

impl fmt::Display for ScalingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.operation {
            RuleOperation::Add => "+",
            RuleOperation::Multiply => "*",
        };
        write!(f, "{} {} {}", self.attribute, op, self.value)
    }
}

/// Produces the ordered rules for an item in a location.
///
/// Called once per `scale` call. Implementations must not depend on being
/// called from a particular thread.
pub trait RuleResolver: Send + Sync {
    fn rules_for(
        &self,
        location: &LocationData,
        item: &ItemData,
    ) -> Result<Vec<ScalingRule>, ResolverError>;
}

impl<F> RuleResolver for F
where
    F: Fn(&LocationData, &ItemData) -> Result<Vec<ScalingRule>, ResolverError> + Send + Sync,
{
    fn rules_for(
        &self,
        location: &LocationData,
        item: &ItemData,
    ) -> Result<Vec<ScalingRule>, ResolverError> {
        self(location, item)
    }
}

/// Returns the same rules for every item.
#[derive(Debug, Clone, Default)]
pub struct StaticRules(pub Vec<ScalingRule>);

impl RuleResolver for StaticRules {
    fn rules_for(
        &self,
        _location: &LocationData,
        _item: &ItemData,
    ) -> Result<Vec<ScalingRule>, ResolverError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_combine() {
        assert_eq!(RuleOperation::Add.combine(4.0, 3.0), 7.0);
        assert_eq!(RuleOperation::Multiply.combine(4.0, 1.5), 6.0);
    }

    #[test]
    fn test_fixed_value_samples_itself() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(RuleValue::Fixed(2.5).sample("a", &mut rng).unwrap(), 2.5);
    }

    #[test]
    fn test_range_samples_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let value = RuleValue::Range { min: 1.0, max: 2.0 };
        for _ in 0..100 {
            let v = value.sample("a", &mut rng).unwrap();
            assert!((1.0..=2.0).contains(&v));
        }
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = RuleValue::Range { min: 3.0, max: 1.0 }
            .sample("minecraft:generic.armor", &mut rng)
            .unwrap_err();
        assert!(matches!(err, ScaleError::InvalidRuleValue { .. }));
        assert!(err.to_string().contains("generic.armor"));
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(RuleValue::Fixed(f64::NAN).sample("a", &mut rng).is_err());
        assert!(RuleValue::Range { min: 0.0, max: f64::INFINITY }
            .sample("a", &mut rng)
            .is_err());
    }

    #[test]
    fn test_rule_value_deserializes_both_forms() {
        let fixed: RuleValue = serde_json::from_str("2.0").unwrap();
        assert_eq!(fixed, RuleValue::Fixed(2.0));
        let range: RuleValue = serde_json::from_str(r#"{"min": 1.0, "max": 4.0}"#).unwrap();
        assert_eq!(range, RuleValue::Range { min: 1.0, max: 4.0 });
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |_: &LocationData, item: &ItemData| -> Result<Vec<ScalingRule>, ResolverError> {
            Ok(vec![ScalingRule::add("generic.attack_damage", item.rarity as u8 as f64)])
        };
        let item = ItemData::new(
            crate::context::ItemCategory::Weapons,
            "minecraft:chests/simple_dungeon",
            "minecraft:iron_sword",
            crate::context::Rarity::Rare,
        );
        let rules = resolver
            .rules_for(&LocationData::new("minecraft:overworld", None), &item)
            .unwrap();
        assert_eq!(rules, vec![ScalingRule::add("generic.attack_damage", 2.0)]);
    }

    #[test]
    fn test_rule_display() {
        let rule = ScalingRule::multiply("generic.attack_speed", RuleValue::Range { min: 1.0, max: 1.2 });
        assert_eq!(rule.to_string(), "generic.attack_speed * 1..=1.2");
    }
}
