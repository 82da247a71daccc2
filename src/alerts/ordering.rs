use std::cmp::Ordering;

use serde::Serialize;

use crate::models::{Alert, AlertSeverity};

/// Severity rank ascending, then newest first, then id.
pub fn compare_alerts(a: &Alert, b: &Alert) -> Ordering {
    a.severity
        .rank()
        .cmp(&b.severity.rank())
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort in place into presentation order.
pub fn sort_alerts(alerts: &mut [Alert]) {
    alerts.sort_by(compare_alerts);
}

/// Active alerts split by severity, each bucket in presentation order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AlertGroups {
    pub critical: Vec<Alert>,
    pub elevated: Vec<Alert>,
    pub informational: Vec<Alert>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AlertCounts {
    pub critical: usize,
    pub elevated: usize,
    pub informational: usize,
}

impl AlertGroups {
    pub fn bucket(&self, severity: AlertSeverity) -> &[Alert] {
        match severity {
            AlertSeverity::Critical => &self.critical,
            AlertSeverity::Elevated => &self.elevated,
            AlertSeverity::Informational => &self.informational,
        }
    }

    pub fn counts(&self) -> AlertCounts {
        AlertCounts {
            critical: self.critical.len(),
            elevated: self.elevated.len(),
            informational: self.informational.len(),
        }
    }

    /// Buckets worth displaying, critical first.
    pub fn non_empty(&self) -> Vec<(AlertSeverity, &[Alert])> {
        [
            AlertSeverity::Critical,
            AlertSeverity::Elevated,
            AlertSeverity::Informational,
        ]
        .into_iter()
        .map(|s| (s, self.bucket(s)))
        .filter(|(_, bucket)| !bucket.is_empty())
        .collect()
    }
}

/// Partition the active alerts into the three severity buckets.
pub fn group_active(alerts: &[Alert]) -> AlertGroups {
    let mut groups = AlertGroups::default();
    for alert in alerts.iter().filter(|a| a.is_active()) {
        let bucket = match alert.severity {
            AlertSeverity::Critical => &mut groups.critical,
            AlertSeverity::Elevated => &mut groups.elevated,
            AlertSeverity::Informational => &mut groups.informational,
        };
        bucket.push(alert.clone());
    }
    sort_alerts(&mut groups.critical);
    sort_alerts(&mut groups.elevated);
    sort_alerts(&mut groups.informational);
    groups
}
