use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    Alert, AlertSeverity, AlertStatus, ConditionKey, SeverityTier, TrendDirection, VitalReading,
    VitalSnapshot, VitalType,
};
use crate::vitals::profile::VitalTypeProfile;

/// When a rule fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleTrigger {
    /// Reading classified at exactly this tier.
    Tier { tier: SeverityTier },
    /// Trend in this direction while the reading is at least `min_tier`.
    TrendWhile {
        direction: TrendDirection,
        min_tier: SeverityTier,
    },
}

/// One row of the alert rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRule {
    pub id: String,
    pub name: String,
    /// Restrict to one vital type; `None` matches every type.
    #[serde(default)]
    pub vital_type: Option<VitalType>,
    pub trigger: RuleTrigger,
    /// Fixed alert severity; `None` derives it from the reading tier.
    #[serde(default)]
    pub severity: Option<AlertSeverity>,
}

/// Built-in rule table.
pub fn default_rules() -> Vec<AlertRule> {
    vec![
        AlertRule {
            id: "vital-critical".into(),
            name: "Critical vital reading".into(),
            vital_type: None,
            trigger: RuleTrigger::Tier {
                tier: SeverityTier::Critical,
            },
            severity: None,
        },
        AlertRule {
            id: "vital-elevated".into(),
            name: "Elevated vital reading".into(),
            vital_type: None,
            trigger: RuleTrigger::Tier {
                tier: SeverityTier::Elevated,
            },
            severity: None,
        },
        AlertRule {
            id: "vital-rising-while-elevated".into(),
            name: "Rising trend on elevated vital".into(),
            vital_type: None,
            trigger: RuleTrigger::TrendWhile {
                direction: TrendDirection::Up,
                min_tier: SeverityTier::Elevated,
            },
            severity: Some(AlertSeverity::Informational),
        },
    ]
}

/// Everything a rule may look at for one reading.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub reading: &'a VitalReading,
    pub tier: SeverityTier,
    pub trend: Option<TrendDirection>,
    pub profile: Option<&'a VitalTypeProfile>,
}

/// An alert the rules want raised, before duplicate suppression.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertDraft {
    pub patient_id: Uuid,
    pub rule_id: String,
    pub rule_name: String,
    pub vital_type: Option<VitalType>,
    pub severity: AlertSeverity,
    pub title: String,
    pub description: String,
    pub snapshot: VitalSnapshot,
}

impl AlertDraft {
    fn condition_key(&self) -> ConditionKey {
        ConditionKey {
            patient_id: self.patient_id,
            rule_id: self.rule_id.clone(),
            vital_type: self.vital_type,
        }
    }
}

/// Outcome of offering a draft to the alert book.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AlertDecision {
    Created(Alert),
    /// An active alert already covers this condition.
    Suppressed { existing_id: Uuid, rule_id: String },
}

impl AlertRule {
    pub fn matches(&self, ctx: &RuleContext<'_>) -> bool {
        if let Some(vt) = self.vital_type {
            if vt != ctx.reading.vital_type {
                return false;
            }
        }
        match &self.trigger {
            RuleTrigger::Tier { tier } => ctx.tier == *tier,
            RuleTrigger::TrendWhile {
                direction,
                min_tier,
            } => ctx.trend == Some(*direction) && ctx.tier >= *min_tier,
        }
    }
}

/// Run the rule table over one classified reading.
pub fn evaluate_rules(rules: &[AlertRule], ctx: &RuleContext<'_>) -> Vec<AlertDraft> {
    rules
        .iter()
        .filter(|rule| rule.matches(ctx))
        .map(|rule| draft_for(rule, ctx))
        .collect()
}

fn draft_for(rule: &AlertRule, ctx: &RuleContext<'_>) -> AlertDraft {
    let reading = ctx.reading;
    let severity = rule
        .severity
        .unwrap_or_else(|| AlertSeverity::from_tier(ctx.tier));
    let name = reading.vital_type.display_name();

    let title = match &rule.trigger {
        RuleTrigger::Tier { .. } => format!("{name} {}", ctx.tier),
        RuleTrigger::TrendWhile { direction, .. } => format!("{name} trending {direction}"),
    };

    let mut description = format!(
        "{name} reading of {} {} recorded {} is {}.",
        reading.value,
        reading.unit,
        reading.recorded_at.format("%Y-%m-%d %H:%M"),
        ctx.tier
    );
    if let Some(profile) = ctx.profile {
        description.push_str(&format!(
            " Normal range {}-{}, critical outside {}-{}.",
            profile.normal.min, profile.normal.max, profile.critical.min, profile.critical.max
        ));
    }

    AlertDraft {
        patient_id: reading.patient_id,
        rule_id: rule.id.clone(),
        rule_name: rule.name.clone(),
        vital_type: Some(reading.vital_type),
        severity,
        title,
        description,
        snapshot: VitalSnapshot::of(reading, ctx.tier),
    }
}

/// Turn drafts into alerts, keeping at most one active alert per
/// condition. `existing` is whatever the caller has loaded for the
/// patient(s); closed alerts in it do not block a new one.
///
/// A condition is one rule firing for one patient and vital type. Each
/// rule is its own condition, so a vital that climbs from elevated to
/// critical keeps its elevated alert and gains a critical one; the
/// critical alert sorts first and the older one is closed by the operator.
/// Narrower or broader conditions come from the rule table itself.
pub fn open_alerts(
    existing: &[Alert],
    drafts: Vec<AlertDraft>,
    now: NaiveDateTime,
) -> Vec<AlertDecision> {
    let mut open: HashMap<ConditionKey, Uuid> = existing
        .iter()
        .filter(|a| a.is_active())
        .map(|a| (a.condition_key(), a.id))
        .collect();

    drafts
        .into_iter()
        .map(|draft| {
            let key = draft.condition_key();
            if let Some(existing_id) = open.get(&key) {
                tracing::debug!(
                    rule_id = %draft.rule_id,
                    existing_id = %existing_id,
                    "Suppressed duplicate active alert"
                );
                return AlertDecision::Suppressed {
                    existing_id: *existing_id,
                    rule_id: draft.rule_id,
                };
            }

            let alert = Alert {
                id: Uuid::new_v4(),
                patient_id: draft.patient_id,
                severity: draft.severity,
                status: AlertStatus::Active,
                rule_id: draft.rule_id,
                rule_name: draft.rule_name,
                vital_type: draft.vital_type,
                title: draft.title,
                description: draft.description,
                vitals_snapshot: vec![draft.snapshot],
                created_at: now,
                resolved_at: None,
                resolved_by: None,
                resolution_note: None,
            };
            open.insert(key, alert.id);
            tracing::info!(
                alert_id = %alert.id,
                rule_id = %alert.rule_id,
                severity = alert.severity.as_str(),
                "Alert created"
            );
            AlertDecision::Created(alert)
        })
        .collect()
}
