use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::{TrendDirection, VitalReading, VitalType};

use super::VitalsError;

/// Noise threshold shipped in the default configuration.
pub fn default_noise_threshold(vital_type: VitalType) -> f64 {
    match vital_type {
        VitalType::BloodPressureSystolic | VitalType::BloodPressureDiastolic => 2.0,
        VitalType::Temperature => 0.1,
        _ => 0.0,
    }
}

/// `|current - previous| <= noise_threshold` is stable, otherwise the sign
/// of the delta decides.
pub fn trend(
    current: f64,
    previous: f64,
    noise_threshold: f64,
) -> Result<TrendDirection, VitalsError> {
    require_finite("current", current)?;
    require_finite("previous", previous)?;
    if !noise_threshold.is_finite() || noise_threshold < 0.0 {
        return Err(VitalsError::invalid(
            "noise_threshold",
            "must be a finite, non-negative number",
        ));
    }

    let delta = current - previous;
    Ok(if delta.abs() <= noise_threshold {
        TrendDirection::Stable
    } else if delta > 0.0 {
        TrendDirection::Up
    } else {
        TrendDirection::Down
    })
}

/// Means of two adjacent windows and the direction between them.
/// Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendWindow {
    pub this_window_avg: Option<f64>,
    pub prior_window_avg: Option<f64>,
    /// Absent when either window is empty.
    pub direction: Option<TrendDirection>,
    pub this_window_count: usize,
    pub prior_window_count: usize,
}

/// Arithmetic mean, absent for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Compare the window ending at `now` with the one immediately before it.
///
/// This window is `(now - window, now]`, the prior window is
/// `(now - 2*window, now - window]`. Readings outside both are ignored.
/// `readings` is one vital type's series, in any order.
pub fn window_trend(
    readings: &[VitalReading],
    now: NaiveDateTime,
    window: Duration,
    noise_threshold: f64,
) -> Result<TrendWindow, VitalsError> {
    if window <= Duration::zero() {
        return Err(VitalsError::invalid("window", "must be positive"));
    }
    let out_of_range = || VitalsError::invalid("window", "out of range");
    let this_start = now.checked_sub_signed(window).ok_or_else(out_of_range)?;
    let prior_start = this_start
        .checked_sub_signed(window)
        .ok_or_else(out_of_range)?;

    let mut this_values = Vec::new();
    let mut prior_values = Vec::new();
    for r in readings {
        require_finite("value", r.value)?;
        if r.recorded_at > this_start && r.recorded_at <= now {
            this_values.push(r.value);
        } else if r.recorded_at > prior_start && r.recorded_at <= this_start {
            prior_values.push(r.value);
        }
    }

    let this_window_avg = mean(&this_values);
    let prior_window_avg = mean(&prior_values);
    let direction = match (this_window_avg, prior_window_avg) {
        (Some(current), Some(previous)) => Some(trend(current, previous, noise_threshold)?),
        _ => None,
    };

    tracing::debug!(
        this_count = this_values.len(),
        prior_count = prior_values.len(),
        ?direction,
        "Computed window trend"
    );

    Ok(TrendWindow {
        this_window_avg,
        prior_window_avg,
        direction,
        this_window_count: this_values.len(),
        prior_window_count: prior_values.len(),
    })
}

/// Compare the first and last of the `n` most recent readings.
/// Returns `None` with fewer than two readings or `n < 2`.
pub fn recent_trend(
    readings: &[VitalReading],
    n: usize,
    noise_threshold: f64,
) -> Result<Option<TrendDirection>, VitalsError> {
    if n < 2 || readings.len() < 2 {
        return Ok(None);
    }
    let mut ordered: Vec<&VitalReading> = readings.iter().collect();
    ordered.sort_by_key(|r| r.recorded_at);

    let recent = &ordered[ordered.len().saturating_sub(n)..];
    let (first, last) = match (recent.first(), recent.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Ok(None),
    };
    trend(last.value, first.value, noise_threshold).map(Some)
}

fn require_finite(field: &str, value: f64) -> Result<(), VitalsError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(VitalsError::invalid(field, "value must be a finite number"))
    }
}
