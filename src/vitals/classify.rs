use serde::{Deserialize, Serialize};

use crate::models::{SeverityTier, VitalType};

use super::profile::{ProfileTable, VitalTypeProfile};

/// What to return for a vital type with no profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTypePolicy {
    /// Classify as normal so new types never block the pipeline.
    #[default]
    FailOpen,
    /// Classify as elevated so a human looks at it.
    RequireReview,
}

impl UnknownTypePolicy {
    pub fn fallback_tier(self) -> SeverityTier {
        match self {
            UnknownTypePolicy::FailOpen => SeverityTier::Normal,
            UnknownTypePolicy::RequireReview => SeverityTier::Elevated,
        }
    }
}

/// Tier of a reading plus the out-of-range flag alerting keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub tier: SeverityTier,
    pub out_of_range: bool,
}

impl From<SeverityTier> for Classification {
    fn from(tier: SeverityTier) -> Self {
        Self {
            tier,
            out_of_range: tier != SeverityTier::Normal,
        }
    }
}

/// Outside critical is critical, outside normal is elevated, otherwise
/// normal. Boundary values are inside their range.
///
/// Callers must pass a finite value. A NaN falls outside every range and
/// comes back critical.
pub fn classify_against(profile: &VitalTypeProfile, value: f64) -> SeverityTier {
    if !profile.critical.contains(value) {
        SeverityTier::Critical
    } else if !profile.normal.contains(value) {
        SeverityTier::Elevated
    } else {
        SeverityTier::Normal
    }
}

/// Classify a reading value. Types missing from the table get `normal`.
pub fn classify(table: &ProfileTable, vital_type: VitalType, value: f64) -> SeverityTier {
    classify_with_policy(table, vital_type, value, UnknownTypePolicy::FailOpen)
}

pub fn classify_with_policy(
    table: &ProfileTable,
    vital_type: VitalType,
    value: f64,
    policy: UnknownTypePolicy,
) -> SeverityTier {
    match table.get(vital_type) {
        Some(profile) => classify_against(profile, value),
        None => {
            tracing::warn!(
                vital_type = vital_type.as_str(),
                ?policy,
                "No profile for vital type, using fallback tier"
            );
            policy.fallback_tier()
        }
    }
}

/// Classify by type name, for callers holding untyped data.
pub fn classify_named(
    table: &ProfileTable,
    name: &str,
    value: f64,
    policy: UnknownTypePolicy,
) -> SeverityTier {
    match VitalType::from_str(name) {
        Some(vt) => classify_with_policy(table, vt, value, policy),
        None => {
            tracing::warn!(vital_type = name, ?policy, "Unrecognized vital type");
            policy.fallback_tier()
        }
    }
}
