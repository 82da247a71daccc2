use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{AlertSeverity, AlertStatus};
use super::vital_sign::{VitalSnapshot, VitalType};

/// A surfaced clinical condition. Never deleted; changes only through
/// `alerts::transition`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub severity: AlertSeverity,
    pub status: AlertStatus,
    pub rule_id: String,
    pub rule_name: String,
    /// Vital type the triggering rule watched, if any.
    pub vital_type: Option<VitalType>,
    pub title: String,
    pub description: String,
    pub vitals_snapshot: Vec<VitalSnapshot>,
    pub created_at: NaiveDateTime,
    pub resolved_at: Option<NaiveDateTime>,
    pub resolved_by: Option<String>,
    /// Absent when no note was given; an empty string is a note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_note: Option<String>,
}

impl Alert {
    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }

    /// Identity of the open condition this alert tracks.
    pub fn condition_key(&self) -> ConditionKey {
        ConditionKey {
            patient_id: self.patient_id,
            rule_id: self.rule_id.clone(),
            vital_type: self.vital_type,
        }
    }
}

/// At most one active alert may exist per key. The rule id is part of the
/// key, so each rule tracks its own condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConditionKey {
    pub patient_id: Uuid,
    pub rule_id: String,
    pub vital_type: Option<VitalType>,
}
