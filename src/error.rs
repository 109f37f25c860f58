//! Error types for item scaling.
//!
//! All errors that can occur while scaling an item are represented
//! by the `ScaleError` enum. Most of them are recovered at the rule
//! boundary and end up in a [`ScaleReport`](crate::report::ScaleReport);
//! only [`ScaleError::RuleResolution`] and [`ScaleError::Encode`] fail a
//! whole `scale` call.

use crate::slot::EquipmentSlot;
use thiserror::Error;

/// Boxed error returned by a [`RuleResolver`](crate::rule::RuleResolver).
pub type ResolverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during item scaling.
///
/// # Examples
///
/// ```rust
/// use itemscale::ScaleError;
///
/// let err = ScaleError::UnknownAttribute {
///     attribute: "mymod:mana".to_string(),
/// };
/// assert_eq!(err.to_string(), "Unknown attribute: mymod:mana");
/// ```
#[derive(Debug, Error)]
pub enum ScaleError {
    /// A rule names an attribute the registry cannot resolve.
    #[error("Unknown attribute: {attribute}")]
    UnknownAttribute { attribute: String },

    /// Persisted modifier storage did not have the expected shape.
    #[error("Malformed modifier storage: {0}")]
    MalformedModifierStorage(String),

    /// The external rule resolver failed for this item.
    #[error("Rule resolution failed for item {item_id}: {source}")]
    RuleResolution {
        item_id: String,
        #[source]
        source: ResolverError,
    },

    /// A rule value could not be sampled (bad range, NaN, infinity).
    #[error("Invalid value for attribute {attribute}: {reason}")]
    InvalidRuleValue { attribute: String, reason: String },

    /// Merging produced a value that cannot be stored.
    #[error("Merged value for attribute {attribute} in slot {slot} is not finite")]
    NonFiniteValue {
        attribute: String,
        slot: EquipmentSlot,
    },

    /// Modifier storage could not be encoded for writing back.
    #[error("Failed to encode modifier storage: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ScaleError {
    /// Whether this error only skips a single rule.
    ///
    /// Rule resolution and encode failures abort the item; everything else
    /// is recovered locally.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ScaleError::RuleResolution { .. } | ScaleError::Encode(_))
    }
}
