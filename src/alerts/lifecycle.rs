use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{Alert, AlertStatus};

use super::AlertError;

/// Requested status change, as received from the operator dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub status: AlertStatus,
    /// Operator performing the change. Required whenever the transition
    /// stamps `resolved_by`: resolved, dismissed, or acknowledged with a note.
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl TransitionRequest {
    pub fn new(status: AlertStatus) -> Self {
        Self {
            status,
            actor: None,
            note: None,
        }
    }

    pub fn by(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Move an active alert to a terminal status, returning the updated copy.
///
/// Resolved and dismissed stamp `resolved_at`/`resolved_by`. Acknowledged
/// stamps them only when a note accompanies it. A stamping transition
/// without a non-blank actor fails with `MissingActor`. The note is kept
/// verbatim. On error the input alert is untouched.
pub fn transition(
    alert: &Alert,
    request: &TransitionRequest,
    now: NaiveDateTime,
) -> Result<Alert, AlertError> {
    if alert.status.is_terminal() || !request.status.is_terminal() {
        tracing::warn!(
            alert_id = %alert.id,
            from = alert.status.as_str(),
            to = request.status.as_str(),
            "Rejected alert transition"
        );
        return Err(AlertError::InvalidTransition {
            id: alert.id,
            from: alert.status,
            to: request.status,
        });
    }

    let stamps_resolution = match request.status {
        AlertStatus::Resolved | AlertStatus::Dismissed => true,
        AlertStatus::Acknowledged => request.note.is_some(),
        AlertStatus::Active => false,
    };
    let actor = request
        .actor
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());
    if stamps_resolution && actor.is_none() {
        tracing::warn!(
            alert_id = %alert.id,
            to = request.status.as_str(),
            "Rejected alert transition without actor"
        );
        return Err(AlertError::MissingActor {
            id: alert.id,
            to: request.status,
        });
    }

    let mut updated = alert.clone();
    updated.status = request.status;
    if stamps_resolution {
        updated.resolved_at = Some(now);
        updated.resolved_by = actor.map(str::to_string);
        updated.resolution_note = request.note.clone();
    }

    tracing::info!(
        alert_id = %updated.id,
        rule_id = %updated.rule_id,
        status = updated.status.as_str(),
        has_note = updated.resolution_note.is_some(),
        "Alert transitioned"
    );

    Ok(updated)
}

/// `transition` stamped with the current UTC time.
pub fn transition_now(alert: &Alert, request: &TransitionRequest) -> Result<Alert, AlertError> {
    transition(alert, request, chrono::Utc::now().naive_utc())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;
    use crate::models::AlertSeverity;

    fn ts(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 4, 2)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn active_alert() -> Alert {
        Alert {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            severity: AlertSeverity::Critical,
            status: AlertStatus::Active,
            rule_id: "vital-critical".into(),
            rule_name: "Critical vital reading".into(),
            vital_type: None,
            title: "Heart Rate critical".into(),
            description: String::new(),
            vitals_snapshot: vec![],
            created_at: ts(8),
            resolved_at: None,
            resolved_by: None,
            resolution_note: None,
        }
    }

    fn resolve_by(actor: &str) -> TransitionRequest {
        TransitionRequest::new(AlertStatus::Resolved).by(actor)
    }

    #[test]
    fn resolve_with_note_then_reject_second_transition() {
        let alert = active_alert();
        let request = TransitionRequest::new(AlertStatus::Resolved)
            .by("nurse-7")
            .with_note("follow-up scheduled");
        let resolved = transition(&alert, &request, ts(10)).unwrap();

        assert_eq!(resolved.status, AlertStatus::Resolved);
        assert_eq!(resolved.resolved_at, Some(ts(10)));
        assert_eq!(resolved.resolved_by.as_deref(), Some("nurse-7"));
        assert_eq!(resolved.resolution_note.as_deref(), Some("follow-up scheduled"));

        let again = transition(
            &resolved,
            &TransitionRequest::new(AlertStatus::Dismissed).by("nurse-7"),
            ts(11),
        );
        assert_eq!(
            again.unwrap_err(),
            AlertError::InvalidTransition {
                id: alert.id,
                from: AlertStatus::Resolved,
                to: AlertStatus::Dismissed,
            }
        );
    }

    #[test]
    fn resolve_without_note_leaves_note_absent() {
        let resolved =
            transition(&active_alert(), &resolve_by("nurse-7"), ts(9)).unwrap();
        assert_eq!(resolved.resolved_at, Some(ts(9)));
        assert_eq!(resolved.resolution_note, None);
    }

    #[test]
    fn empty_note_is_kept_distinct_from_no_note() {
        let resolved = transition(
            &active_alert(),
            &resolve_by("nurse-7").with_note(""),
            ts(9),
        )
        .unwrap();
        assert_eq!(resolved.resolution_note.as_deref(), Some(""));
    }

    #[test]
    fn dismiss_stamps_resolution() {
        let dismissed = transition(
            &active_alert(),
            &TransitionRequest::new(AlertStatus::Dismissed).by("dr-lee"),
            ts(12),
        )
        .unwrap();
        assert_eq!(dismissed.status, AlertStatus::Dismissed);
        assert_eq!(dismissed.resolved_at, Some(ts(12)));
        assert_eq!(dismissed.resolved_by.as_deref(), Some("dr-lee"));
    }

    #[test]
    fn acknowledge_without_note_stamps_nothing() {
        let acked = transition(
            &active_alert(),
            &TransitionRequest::new(AlertStatus::Acknowledged).by("nurse-7"),
            ts(9),
        )
        .unwrap();
        assert_eq!(acked.status, AlertStatus::Acknowledged);
        assert_eq!(acked.resolved_at, None);
        assert_eq!(acked.resolved_by, None);
        assert_eq!(acked.resolution_note, None);
    }

    #[test]
    fn acknowledge_with_note_stamps_resolution() {
        let acked = transition(
            &active_alert(),
            &TransitionRequest::new(AlertStatus::Acknowledged)
                .by("nurse-7")
                .with_note("called patient"),
            ts(9),
        )
        .unwrap();
        assert_eq!(acked.resolved_at, Some(ts(9)));
        assert_eq!(acked.resolution_note.as_deref(), Some("called patient"));
    }

    #[test]
    fn stamping_transitions_require_an_actor() {
        let alert = active_alert();
        for request in [
            TransitionRequest::new(AlertStatus::Resolved),
            TransitionRequest::new(AlertStatus::Dismissed).with_note("duplicate"),
            TransitionRequest::new(AlertStatus::Acknowledged).with_note("called patient"),
            TransitionRequest::new(AlertStatus::Resolved).by("   "),
        ] {
            assert_eq!(
                transition(&alert, &request, ts(9)).unwrap_err(),
                AlertError::MissingActor {
                    id: alert.id,
                    to: request.status,
                },
                "{request:?}"
            );
        }
        // acknowledging without a note stamps nothing, so no actor is needed
        assert!(transition(&alert, &TransitionRequest::new(AlertStatus::Acknowledged), ts(9)).is_ok());
    }

    #[test]
    fn active_to_active_rejected() {
        let alert = active_alert();
        let err = transition(&alert, &TransitionRequest::new(AlertStatus::Active), ts(9));
        assert!(err.is_err());
    }

    #[test]
    fn every_terminal_status_is_final() {
        for terminal in [AlertStatus::Acknowledged, AlertStatus::Resolved, AlertStatus::Dismissed] {
            let closed = transition(
                &active_alert(),
                &TransitionRequest::new(terminal).by("nurse-7"),
                ts(9),
            )
            .unwrap();
            for target in [
                AlertStatus::Active,
                AlertStatus::Acknowledged,
                AlertStatus::Resolved,
                AlertStatus::Dismissed,
            ] {
                assert!(
                    transition(&closed, &TransitionRequest::new(target).by("nurse-7"), ts(10))
                        .is_err(),
                    "{terminal:?} -> {target:?}"
                );
            }
        }
    }

    #[test]
    fn failed_transition_leaves_alert_unchanged() {
        let alert = active_alert();
        let resolved = transition(&alert, &resolve_by("nurse-7"), ts(9)).unwrap();
        let snapshot = resolved.clone();
        let _ = transition(&resolved, &resolve_by("nurse-7"), ts(10));
        assert_eq!(resolved, snapshot);
    }

    #[test]
    fn note_absent_from_json_when_none() {
        let json = serde_json::to_string(&active_alert()).unwrap();
        assert!(!json.contains("resolution_note"));
    }
}
