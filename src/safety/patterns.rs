use std::sync::{Arc, LazyLock};

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use super::types::SafetyError;

/// Replies telling the patient to get emergency help.
const EMERGENCY_PATTERNS: &[&str] = &[
    r"\bcall\s+(?:911|999|112|an\s+ambulance|emergency\s+services)\b",
    r"\bgo\s+to\s+(?:the\s+)?(?:nearest\s+)?(?:emergency\s+(?:room|department)|ER|A&E)\b",
    r"\bseek\s+(?:immediate|emergency|urgent)\s+(?:medical\s+)?(?:help|attention|care)\b",
    r"\bthis\s+(?:is|could\s+be|may\s+be)\s+(?:a\s+)?(?:medical\s+)?emergency\b",
    r"\bemergency\s+(?:medical\s+)?(?:care|services|help)\s+(?:immediately|right\s+away|now)\b",
];

/// Replies steering the patient to their care team.
const ESCALATION_PATTERNS: &[&str] = &[
    r"\b(?:contact|call|notify|message)\s+your\s+(?:doctor|provider|physician|care\s+team|nurse|clinician|cardiologist)\b",
    r"\b(?:talk|speak)\s+(?:to|with)\s+your\s+(?:doctor|provider|physician|care\s+team|nurse|clinician|pharmacist)\b",
    r"\blet\s+your\s+(?:doctor|provider|physician|care\s+team|nurse)\s+know\b",
    r"\breach\s+out\s+to\s+your\s+(?:doctor|provider|physician|care\s+team|nurse)\b",
    r"\bschedule\s+(?:an\s+appointment|a\s+visit|a\s+follow[- ]up)\s+with\b",
];

/// Clinical-safety breaches, each with the description reported for it.
const POLICY_PATTERNS: &[(&str, &str)] = &[
    (
        r"\b(?:increase|decrease|double|halve|reduce|lower|raise|adjust)\s+(?:your\s+|the\s+)?(?:dose|dosage|medication|insulin)\b",
        "Dosage adjustment instruction",
    ),
    (
        r"\b(?:take|use|inject)\s+\d+(?:\.\d+)?\s*(?:mg|mcg|g|ml|units?|tablets?|pills?)\b",
        "Specific dosage instruction",
    ),
    (
        r"\b(?:dose|dosage)\s+(?:to|of)\s+\d+(?:\.\d+)?\s*(?:mg|mcg|g|ml|units?)\b",
        "Specific dosage instruction",
    ),
    (
        r"\b(?:stop|discontinue|quit)\s+(?:taking\s+)?(?:your\s+|the\s+)?(?:medication|medicine|meds|prescription|pills?)\b",
        "Instruction to discontinue medication",
    ),
    (
        r"\b(?:start|begin)\s+taking\s+[a-z]",
        "Prescribing a medication",
    ),
    (
        r"\bI\s+(?:recommend|prescribe)\s+(?:taking|that\s+you\s+take|you\s+take)\b",
        "Prescribing a medication",
    ),
    (
        r"\byou\s+(?:definitely|certainly|clearly|likely|probably)\s+have\b",
        "Diagnostic claim",
    ),
    (
        r"\b(?:this|that|these\s+readings?|your\s+readings?)\s+(?:means|mean|indicates?|confirms?)\s+(?:that\s+)?you\s+have\b",
        "Diagnostic claim",
    ),
    (
        r"\byou\s+(?:don'?t|do\s+not)\s+need\s+to\s+(?:see|call|contact|visit)\s+(?:a|your)\s+(?:doctor|provider|physician|nurse)\b",
        "Discouraging care-seeking",
    ),
    (
        r"\bno\s+need\s+to\s+(?:see|call|contact|visit)\s+(?:a|your)\s+(?:doctor|provider|physician|nurse)\b",
        "Discouraging care-seeking",
    ),
    (
        r"\b(?:you\s+can|it'?s\s+(?:safe|fine|ok(?:ay)?)\s+to)\s+ignore\s+(?:this|these|it|the)\b",
        "Dismissing a clinical concern",
    ),
    (
        r"\bnothing\s+to\s+worry\s+about\b",
        "Dismissing a clinical concern",
    ),
];

/// Uncompiled table, the shape a rule file or test supplies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternTableSpec {
    pub emergency: Vec<String>,
    pub escalation: Vec<String>,
    pub policy: Vec<PolicyPatternSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyPatternSpec {
    pub pattern: String,
    pub description: String,
}

impl PatternTableSpec {
    /// The built-in table.
    pub fn builtin() -> Self {
        Self {
            emergency: EMERGENCY_PATTERNS.iter().map(|p| p.to_string()).collect(),
            escalation: ESCALATION_PATTERNS.iter().map(|p| p.to_string()).collect(),
            policy: POLICY_PATTERNS
                .iter()
                .map(|(pattern, description)| PolicyPatternSpec {
                    pattern: pattern.to_string(),
                    description: description.to_string(),
                })
                .collect(),
        }
    }
}

/// A compiled policy pattern with the description it reports.
#[derive(Debug, Clone)]
pub struct PolicyPattern {
    pub regex: Regex,
    pub description: String,
}

/// Compiled, case-insensitive pattern table. Immutable once built.
#[derive(Debug, Clone)]
pub struct PatternTable {
    pub emergency: Vec<Regex>,
    pub escalation: Vec<Regex>,
    pub policy: Vec<PolicyPattern>,
}

impl PatternTable {
    pub fn compile(spec: &PatternTableSpec) -> Result<Self, SafetyError> {
        fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, SafetyError> {
            patterns.iter().map(|p| compile_pattern(p)).collect()
        }
        Ok(Self {
            emergency: compile_all(&spec.emergency)?,
            escalation: compile_all(&spec.escalation)?,
            policy: spec
                .policy
                .iter()
                .map(|p| {
                    Ok(PolicyPattern {
                        regex: compile_pattern(&p.pattern)?,
                        description: p.description.clone(),
                    })
                })
                .collect::<Result<_, SafetyError>>()?,
        })
    }

    /// Shared built-in table, compiled on first use.
    pub fn builtin() -> Arc<PatternTable> {
        Arc::clone(&BUILTIN_TABLE)
    }
}

static BUILTIN_TABLE: LazyLock<Arc<PatternTable>> = LazyLock::new(|| {
    Arc::new(
        PatternTable::compile(&PatternTableSpec::builtin())
            .expect("Invalid built-in safety regex pattern"),
    )
});

fn compile_pattern(pattern: &str) -> Result<Regex, SafetyError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| SafetyError::RegexCompilation {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_compiles() {
        let table = PatternTable::builtin();
        assert_eq!(table.emergency.len(), EMERGENCY_PATTERNS.len());
        assert_eq!(table.escalation.len(), ESCALATION_PATTERNS.len());
        assert_eq!(table.policy.len(), POLICY_PATTERNS.len());
    }

    #[test]
    fn builtin_table_is_shared() {
        assert!(Arc::ptr_eq(&PatternTable::builtin(), &PatternTable::builtin()));
    }

    #[test]
    fn compiled_patterns_ignore_case() {
        let spec = PatternTableSpec {
            emergency: vec![r"\bcall 911\b".into()],
            ..Default::default()
        };
        let table = PatternTable::compile(&spec).unwrap();
        assert!(table.emergency[0].is_match("CALL 911 now"));
    }

    #[test]
    fn invalid_custom_pattern_is_reported() {
        let spec = PatternTableSpec {
            policy: vec![PolicyPatternSpec {
                pattern: "(unclosed".into(),
                description: "broken".into(),
            }],
            ..Default::default()
        };
        let err = PatternTable::compile(&spec).unwrap_err();
        assert!(matches!(err, SafetyError::RegexCompilation { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn spec_deserializes_from_json() {
        let spec: PatternTableSpec = serde_json::from_str(
            r#"{"emergency": ["call 911"], "escalation": [], "policy": [
                {"pattern": "stop your meds", "description": "Discontinuation"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(spec.policy[0].description, "Discontinuation");
        assert!(PatternTable::compile(&spec).is_ok());
    }
}
