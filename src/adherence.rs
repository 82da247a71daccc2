//! Medication adherence rates.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Percent of scheduled doses taken, rounded half-up.
///
/// No scheduled doses counts as fully adherent. `taken` above `total`
/// is clamped so the rate stays within 0..=100.
pub fn adherence(taken: u32, total: u32) -> u8 {
    if total == 0 {
        return 100;
    }
    let taken = if taken > total {
        tracing::warn!(taken, total, "More doses taken than scheduled, clamping");
        total
    } else {
        taken
    };
    // round(100 * taken / total) with halves rounded up, in integers.
    let rate = (200 * u64::from(taken) + u64::from(total)) / (2 * u64::from(total));
    rate.min(100) as u8
}

/// Adherence over one query window. Recomputed, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdherenceSample {
    pub taken: u32,
    pub total: u32,
    pub rate: u8,
}

/// A scheduled dose and when, if ever, it was marked taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoseEvent {
    pub scheduled_at: NaiveDateTime,
    pub taken_at: Option<NaiveDateTime>,
}

impl AdherenceSample {
    pub fn new(taken: u32, total: u32) -> Self {
        Self {
            taken,
            total,
            rate: adherence(taken, total),
        }
    }

    /// Sample doses scheduled in `[from, to)`.
    pub fn from_doses(events: &[DoseEvent], from: NaiveDateTime, to: NaiveDateTime) -> Self {
        let (taken, total) = events
            .iter()
            .filter(|e| e.scheduled_at >= from && e.scheduled_at < to)
            .fold((0u32, 0u32), |(taken, total), e| {
                (taken + u32::from(e.taken_at.is_some()), total + 1)
            });
        Self::new(taken, total)
    }
}
