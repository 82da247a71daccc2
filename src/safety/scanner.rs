use std::sync::Arc;

use super::patterns::{PatternTable, PatternTableSpec};
use super::types::{SafetyError, SafetyFlags};

/// Scanner bound to one compiled pattern table.
#[derive(Debug, Clone)]
pub struct SafetyScanner {
    table: Arc<PatternTable>,
}

impl Default for SafetyScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl SafetyScanner {
    /// Scanner over the built-in tables.
    pub fn new() -> Self {
        Self {
            table: PatternTable::builtin(),
        }
    }

    pub fn with_table(table: Arc<PatternTable>) -> Self {
        Self { table }
    }

    pub fn from_spec(spec: &PatternTableSpec) -> Result<Self, SafetyError> {
        Ok(Self::with_table(Arc::new(PatternTable::compile(spec)?)))
    }

    /// Classify `text`. Total over every input, including empty and
    /// non-ASCII strings; regex matching is linear in the input length.
    pub fn scan(&self, text: &str) -> SafetyFlags {
        let table = &*self.table;
        let flags = SafetyFlags {
            emergency_guidance: table.emergency.iter().any(|re| re.is_match(text)),
            provider_escalation: table.escalation.iter().any(|re| re.is_match(text)),
            policy_violations: table
                .policy
                .iter()
                .filter(|p| p.regex.is_match(text))
                .map(|p| p.description.clone())
                .collect(),
        };

        tracing::debug!(
            text_len = text.len(),
            emergency = flags.emergency_guidance,
            escalation = flags.provider_escalation,
            violations = flags.policy_violations.len(),
            "Scanned AI response"
        );
        flags
    }
}

/// Scan with the built-in tables.
pub fn scan(text: &str) -> SafetyFlags {
    SafetyScanner::new().scan(text)
}

pub fn has_policy_violations(flags: &SafetyFlags) -> bool {
    flags.has_policy_violations()
}

pub fn has_any_safety_signal(flags: &SafetyFlags) -> bool {
    flags.has_any_safety_signal()
}
