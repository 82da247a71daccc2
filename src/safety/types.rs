use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result of scanning one reply. Built fresh per call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyFlags {
    pub emergency_guidance: bool,
    pub provider_escalation: bool,
    /// Descriptions in pattern-table order, duplicates kept.
    pub policy_violations: Vec<String>,
}

impl SafetyFlags {
    pub fn has_policy_violations(&self) -> bool {
        !self.policy_violations.is_empty()
    }

    pub fn has_any_safety_signal(&self) -> bool {
        self.emergency_guidance || self.provider_escalation || self.has_policy_violations()
    }
}

/// Safety scanner errors. Only building a custom pattern table can fail.
#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("Regex compilation failed for '{pattern}': {reason}")]
    RegexCompilation { pattern: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_flags_carry_no_signal() {
        let flags = SafetyFlags::default();
        assert!(!flags.has_policy_violations());
        assert!(!flags.has_any_safety_signal());
    }

    #[test]
    fn each_category_is_a_signal() {
        let emergency = SafetyFlags {
            emergency_guidance: true,
            ..Default::default()
        };
        let escalation = SafetyFlags {
            provider_escalation: true,
            ..Default::default()
        };
        let policy = SafetyFlags {
            policy_violations: vec!["x".into()],
            ..Default::default()
        };
        assert!(emergency.has_any_safety_signal());
        assert!(escalation.has_any_safety_signal());
        assert!(policy.has_any_safety_signal());
        assert!(policy.has_policy_violations());
        assert!(!emergency.has_policy_violations());
    }

    #[test]
    fn flags_serialize() {
        let json = serde_json::to_string(&SafetyFlags::default()).unwrap();
        assert_eq!(
            json,
            r#"{"emergency_guidance":false,"provider_escalation":false,"policy_violations":[]}"#
        );
    }
}
