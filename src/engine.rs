//! Facade wiring classifier, trends, alert rules, adherence, billing and the
//! safety scanner over one immutable configuration.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::adherence::AdherenceSample;
use crate::alerts::{self, AlertDecision, AlertError, RuleContext, TransitionRequest};
use crate::billing::{self, CodeEligibility, PeriodCounters};
use crate::config::{ConfigError, EngineConfig};
use crate::models::{Alert, TrendDirection, VitalReading, VitalReadingInput, VitalType};
use crate::safety::{PatternTableSpec, SafetyError, SafetyFlags, SafetyScanner};
use crate::vitals::{self, Classification, ProfileTable, TrendWindow, VitalsError};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Vitals(#[from] VitalsError),

    #[error(transparent)]
    Alert(#[from] AlertError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Safety(#[from] SafetyError),
}

/// Classification, or a request for human review when the input could not
/// be classified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClassificationOutcome {
    Classified {
        reading: VitalReading,
        classification: Classification,
    },
    NeedsReview {
        reason: String,
    },
}

/// Everything derived from one reading against its history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingEvaluation {
    pub reading_id: Uuid,
    pub classification: Classification,
    pub trend: Option<TrendDirection>,
    pub decisions: Vec<AlertDecision>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSummary {
    pub codes: Vec<CodeEligibility>,
    pub projected_revenue_cents: u64,
}

/// Requests accepted at the engine boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineRequest {
    Classify {
        reading: VitalReadingInput,
    },
    Trend {
        current: f64,
        previous: f64,
        /// Selects the configured noise threshold.
        #[serde(default)]
        vital_type: Option<VitalType>,
        /// Overrides the configured threshold.
        #[serde(default)]
        noise_threshold: Option<f64>,
    },
    Adherence {
        taken: u32,
        total: u32,
    },
    Billing {
        counters: PeriodCounters,
        active_patients: u32,
    },
    Scan {
        text: String,
    },
    Transition {
        alert: Alert,
        request: TransitionRequest,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineResponse {
    Classification { outcome: ClassificationOutcome },
    Trend { direction: TrendDirection },
    Adherence { sample: AdherenceSample },
    Billing { summary: BillingSummary },
    Safety { flags: SafetyFlags },
    Alert { alert: Alert },
}

/// Stateless engine. Shares nothing mutable, so one instance may serve any
/// number of threads.
#[derive(Debug, Clone)]
pub struct ClinicalEngine {
    config: EngineConfig,
    profiles: ProfileTable,
    scanner: SafetyScanner,
}

impl Default for ClinicalEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            profiles: ProfileTable::default(),
            scanner: SafetyScanner::new(),
        }
    }
}

impl ClinicalEngine {
    /// Build from a configuration, validating its profile overrides.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let profiles = ProfileTable::with_overrides(&config.profiles)?;
        Ok(Self {
            config,
            profiles,
            scanner: SafetyScanner::new(),
        })
    }

    /// Swap the built-in safety tables for an operator-supplied set.
    pub fn with_patterns(mut self, spec: &PatternTableSpec) -> Result<Self, EngineError> {
        self.scanner = SafetyScanner::from_spec(spec)?;
        Ok(self)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn profiles(&self) -> &ProfileTable {
        &self.profiles
    }

    pub fn validate_reading(&self, input: &VitalReadingInput) -> Result<VitalReading, EngineError> {
        Ok(vitals::validate_reading(input)?)
    }

    pub fn classify_reading(&self, reading: &VitalReading) -> Classification {
        vitals::classify_with_policy(
            &self.profiles,
            reading.vital_type,
            reading.value,
            self.config.unknown_type_policy,
        )
        .into()
    }

    /// Validate then classify. Input that fails validation is routed to
    /// review instead of being guessed at.
    pub fn classify_or_review(&self, input: &VitalReadingInput) -> ClassificationOutcome {
        match vitals::validate_reading(input) {
            Ok(reading) => {
                let classification = self.classify_reading(&reading);
                ClassificationOutcome::Classified {
                    reading,
                    classification,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Reading rejected, routing to review");
                ClassificationOutcome::NeedsReview {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn trend(
        &self,
        current: f64,
        previous: f64,
        vital_type: VitalType,
    ) -> Result<TrendDirection, EngineError> {
        Ok(vitals::trend(
            current,
            previous,
            self.config.noise_threshold(vital_type),
        )?)
    }

    /// Window trend over one type's readings ending at `now`.
    pub fn window_trend(
        &self,
        vital_type: VitalType,
        readings: &[VitalReading],
        now: NaiveDateTime,
    ) -> Result<TrendWindow, EngineError> {
        let series: Vec<VitalReading> = readings
            .iter()
            .filter(|r| r.vital_type == vital_type)
            .cloned()
            .collect();
        let window = Duration::try_days(self.config.trend_window_days)
            .ok_or_else(|| VitalsError::invalid("trend_window_days", "out of range"))?;
        Ok(vitals::window_trend(
            &series,
            now,
            window,
            self.config.noise_threshold(vital_type),
        )?)
    }

    /// Classify `reading`, compare it with recent history of the same type
    /// and patient, and open alerts the rule table asks for.
    ///
    /// `history` may include the reading itself. `open` is the caller's
    /// current alert list; the engine never reads storage itself.
    pub fn evaluate_reading(
        &self,
        reading: &VitalReading,
        history: &[VitalReading],
        open: &[Alert],
        now: NaiveDateTime,
    ) -> Result<ReadingEvaluation, EngineError> {
        if !reading.value.is_finite() {
            return Err(VitalsError::invalid("value", "value must be a finite number").into());
        }

        let classification = self.classify_reading(reading);

        let mut series: Vec<VitalReading> = history
            .iter()
            .filter(|r| {
                r.patient_id == reading.patient_id
                    && r.vital_type == reading.vital_type
                    && r.id != reading.id
                    && r.recorded_at <= reading.recorded_at
            })
            .cloned()
            .collect();
        series.push(reading.clone());
        let trend = vitals::recent_trend(
            &series,
            self.config.short_sequence_len,
            self.config.noise_threshold(reading.vital_type),
        )?;

        let ctx = RuleContext {
            reading,
            tier: classification.tier,
            trend,
            profile: self.profiles.get(reading.vital_type),
        };
        let drafts = alerts::evaluate_rules(&self.config.alert_rules, &ctx);
        let decisions = alerts::open_alerts(open, drafts, now);

        tracing::debug!(
            reading_id = %reading.id,
            vital_type = reading.vital_type.as_str(),
            tier = classification.tier.as_str(),
            ?trend,
            decisions = decisions.len(),
            "Evaluated reading"
        );

        Ok(ReadingEvaluation {
            reading_id: reading.id,
            classification,
            trend,
            decisions,
        })
    }

    /// Evaluate a batch in time order. Each reading sees the ones before it
    /// as history, and alerts opened earlier in the batch suppress repeats.
    pub fn evaluate_readings(
        &self,
        readings: &[VitalReading],
        history: &[VitalReading],
        open: &[Alert],
        now: NaiveDateTime,
    ) -> Result<Vec<ReadingEvaluation>, EngineError> {
        let mut ordered: Vec<&VitalReading> = readings.iter().collect();
        ordered.sort_by_key(|r| r.recorded_at);

        let mut seen = history.to_vec();
        let mut open = open.to_vec();
        let mut evaluations = Vec::with_capacity(ordered.len());
        for reading in ordered {
            let evaluation = self.evaluate_reading(reading, &seen, &open, now)?;
            open.extend(evaluation.decisions.iter().filter_map(|d| match d {
                AlertDecision::Created(alert) => Some(alert.clone()),
                AlertDecision::Suppressed { .. } => None,
            }));
            seen.push(reading.clone());
            evaluations.push(evaluation);
        }
        Ok(evaluations)
    }

    pub fn billing_summary(&self, counters: &PeriodCounters, active_patients: u32) -> BillingSummary {
        let codes = billing::evaluate_codes(&self.config.billing_codes, counters);
        let projected_revenue_cents = billing::projected_revenue(&codes, active_patients);
        BillingSummary {
            codes,
            projected_revenue_cents,
        }
    }

    /// Must complete before the reply is stored or displayed.
    pub fn scan_response(&self, text: &str) -> SafetyFlags {
        self.scanner.scan(text)
    }

    pub fn handle(&self, request: EngineRequest) -> Result<EngineResponse, EngineError> {
        match request {
            EngineRequest::Classify { reading } => Ok(EngineResponse::Classification {
                outcome: self.classify_or_review(&reading),
            }),
            EngineRequest::Trend {
                current,
                previous,
                vital_type,
                noise_threshold,
            } => {
                let threshold = noise_threshold.unwrap_or_else(|| {
                    vital_type.map_or(0.0, |vt| self.config.noise_threshold(vt))
                });
                Ok(EngineResponse::Trend {
                    direction: vitals::trend(current, previous, threshold)?,
                })
            }
            EngineRequest::Adherence { taken, total } => Ok(EngineResponse::Adherence {
                sample: AdherenceSample::new(taken, total),
            }),
            EngineRequest::Billing {
                counters,
                active_patients,
            } => Ok(EngineResponse::Billing {
                summary: self.billing_summary(&counters, active_patients),
            }),
            EngineRequest::Scan { text } => Ok(EngineResponse::Safety {
                flags: self.scan_response(&text),
            }),
            EngineRequest::Transition { alert, request } => Ok(EngineResponse::Alert {
                alert: alerts::transition_now(&alert, &request)?,
            }),
        }
    }
}
