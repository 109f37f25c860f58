//! Per-item scaling report.
//!
//! Contains the `ScaleReport` type, which records what happened to each
//! rule while scaling one item: applied, or skipped with the reason.

use crate::error::ScaleError;
use crate::merge::MergeOutcome;
use crate::rule::ScalingRule;

/// What happened to a single rule.
#[derive(Debug)]
pub enum RuleOutcome {
    Applied(MergeOutcome),
    Skipped(ScaleError),
}

impl RuleOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RuleOutcome::Applied(_))
    }
}

/// The result of scaling one item.
///
/// Rules are listed in the order they were resolved.
///
/// # Examples
///
/// ```rust
/// use itemscale::{ScaleError, ScaleReport, ScalingRule};
///
/// let mut report = ScaleReport::new("minecraft:iron_sword");
/// report.record(
///     ScalingRule::add("generic.mana", 1.0),
///     Err(ScaleError::UnknownAttribute { attribute: "generic.mana".to_string() }),
/// );
///
/// assert_eq!(report.applied_count(), 0);
/// assert_eq!(report.skipped().count(), 1);
/// assert!(!report.is_clean());
/// ```
#[derive(Debug)]
pub struct ScaleReport {
    pub item_id: String,
    /// Whether the item was snapshotted by this call.
    pub snapshotted: bool,
    pub rules: Vec<(ScalingRule, RuleOutcome)>,
}

impl ScaleReport {
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            snapshotted: false,
            rules: Vec::new(),
        }
    }

    /// Record the result of merging `rule`.
    pub fn record(&mut self, rule: ScalingRule, result: Result<MergeOutcome, ScaleError>) {
        let outcome = match result {
            Ok(merged) => RuleOutcome::Applied(merged),
            Err(err) => RuleOutcome::Skipped(err),
        };
        self.rules.push((rule, outcome));
    }

    pub fn applied_count(&self) -> usize {
        self.rules.iter().filter(|(_, o)| o.is_applied()).count()
    }

    /// Skipped rules with their reasons.
    pub fn skipped(&self) -> impl Iterator<Item = (&ScalingRule, &ScaleError)> {
        self.rules.iter().filter_map(|(rule, outcome)| match outcome {
            RuleOutcome::Skipped(err) => Some((rule, err)),
            RuleOutcome::Applied(_) => None,
        })
    }

    /// True when no rule was skipped.
    pub fn is_clean(&self) -> bool {
        self.skipped().next().is_none()
    }
}
