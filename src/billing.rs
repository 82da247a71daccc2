//! Remote-monitoring billing eligibility.
//!
//! Each code has one hard threshold over a monthly counter. Progress toward
//! the threshold is informational only; eligibility never depends on it.

use std::collections::{BTreeSet, HashSet};

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::VitalReading;

/// Monthly counter a billing requirement is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    ReadingDays,
    InteractiveMinutes,
    DataReviewMinutes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub counter: Counter,
    pub required: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingCode {
    pub code: String,
    pub description: String,
    pub requirement: Requirement,
    pub reimbursement_cents: u64,
}

/// Built-in RPM code table.
pub fn default_codes() -> Vec<BillingCode> {
    let code = |code: &str, description: &str, counter, required, cents| BillingCode {
        code: code.into(),
        description: description.into(),
        requirement: Requirement { counter, required },
        reimbursement_cents: cents,
    };
    vec![
        code(
            "99453",
            "Remote monitoring setup and patient education",
            Counter::ReadingDays,
            16,
            1973,
        ),
        code(
            "99454",
            "Remote monitoring device supply with daily recordings",
            Counter::ReadingDays,
            16,
            5015,
        ),
        code(
            "99457",
            "Remote monitoring treatment management, first 20 minutes",
            Counter::InteractiveMinutes,
            20,
            4829,
        ),
        code(
            "99458",
            "Remote monitoring treatment management, additional 20 minutes",
            Counter::InteractiveMinutes,
            40,
            3879,
        ),
        code(
            "99091",
            "Collection and interpretation of physiologic data",
            Counter::DataReviewMinutes,
            30,
            5480,
        ),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub year: i32,
    pub month: u32,
}

impl BillingPeriod {
    pub fn of(at: NaiveDateTime) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at.year() == self.year && at.month() == self.month
    }
}

/// One patient's counters for one billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodCounters {
    pub patient_id: Uuid,
    pub period: BillingPeriod,
    pub reading_days: u32,
    pub interactive_minutes: u32,
    pub data_review_minutes: u32,
}

impl PeriodCounters {
    pub fn get(&self, counter: Counter) -> u32 {
        match counter {
            Counter::ReadingDays => self.reading_days,
            Counter::InteractiveMinutes => self.interactive_minutes,
            Counter::DataReviewMinutes => self.data_review_minutes,
        }
    }
}

/// Distinct calendar days with at least one reading in `period`.
pub fn reading_days(readings: &[VitalReading], period: BillingPeriod) -> u32 {
    readings
        .iter()
        .filter(|r| period.contains(r.recorded_at))
        .map(|r| r.recorded_at.date())
        .collect::<HashSet<_>>()
        .len() as u32
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEligibility {
    pub code: String,
    pub eligible: bool,
    /// 0..=100, for display.
    pub progress: u8,
    pub observed: u32,
    pub required: u32,
    pub reimbursement_cents: u64,
}

/// `min(100, 100 * observed / required)`, rounded half-up. A zero
/// requirement is already met.
pub fn progress(observed: u32, required: u32) -> u8 {
    if required == 0 {
        return 100;
    }
    let pct = (200 * u64::from(observed) + u64::from(required)) / (2 * u64::from(required));
    pct.min(100) as u8
}

/// Resolve every code independently against one patient's counters.
pub fn evaluate_codes(codes: &[BillingCode], counters: &PeriodCounters) -> Vec<CodeEligibility> {
    codes
        .iter()
        .map(|c| {
            let observed = counters.get(c.requirement.counter);
            CodeEligibility {
                code: c.code.clone(),
                eligible: observed >= c.requirement.required,
                progress: progress(observed, c.requirement.required),
                observed,
                required: c.requirement.required,
                reimbursement_cents: c.reimbursement_cents,
            }
        })
        .collect()
}

/// Sum of eligible reimbursements times the active patient count. Each
/// code counts once even if it appears twice in `results`. Saturates at
/// `u64::MAX` rather than wrapping.
pub fn projected_revenue(results: &[CodeEligibility], active_patients: u32) -> u64 {
    let mut seen = BTreeSet::new();
    let per_patient: u64 = results
        .iter()
        .filter(|r| r.eligible && seen.insert(r.code.as_str()))
        .fold(0u64, |acc, r| acc.saturating_add(r.reimbursement_cents));
    per_patient.saturating_mul(u64::from(active_patients))
}

/// Revenue across many patients. A (patient, period, code) triple bills at
/// most once, so repeated counter rows are harmless.
pub fn period_revenue(codes: &[BillingCode], counters: &[PeriodCounters]) -> u64 {
    let mut billed: HashSet<(Uuid, BillingPeriod, &str)> = HashSet::new();
    let mut total = 0u64;
    for row in counters {
        for c in codes {
            if row.get(c.requirement.counter) >= c.requirement.required
                && billed.insert((row.patient_id, row.period, c.code.as_str()))
            {
                total = total.saturating_add(c.reimbursement_cents);
            }
        }
    }
    tracing::debug!(rows = counters.len(), billed = billed.len(), total, "Computed period revenue");
    total
}
