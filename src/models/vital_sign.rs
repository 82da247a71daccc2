use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::SeverityTier;

/// Kind of vital sign reading. Blood pressure is split into its two
/// components so every reading carries a single numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalType {
    BloodPressureSystolic,
    BloodPressureDiastolic,
    HeartRate,
    OxygenSaturation,
    Temperature,
    Weight,
    BloodGlucose,
}

impl VitalType {
    pub const ALL: [VitalType; 7] = [
        VitalType::BloodPressureSystolic,
        VitalType::BloodPressureDiastolic,
        VitalType::HeartRate,
        VitalType::OxygenSaturation,
        VitalType::Temperature,
        VitalType::Weight,
        VitalType::BloodGlucose,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VitalType::BloodPressureSystolic => "blood_pressure_systolic",
            VitalType::BloodPressureDiastolic => "blood_pressure_diastolic",
            VitalType::HeartRate => "heart_rate",
            VitalType::OxygenSaturation => "oxygen_saturation",
            VitalType::Temperature => "temperature",
            VitalType::Weight => "weight",
            VitalType::BloodGlucose => "blood_glucose",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "blood_pressure_systolic" => Some(VitalType::BloodPressureSystolic),
            "blood_pressure_diastolic" => Some(VitalType::BloodPressureDiastolic),
            "heart_rate" => Some(VitalType::HeartRate),
            "oxygen_saturation" => Some(VitalType::OxygenSaturation),
            "temperature" => Some(VitalType::Temperature),
            "weight" => Some(VitalType::Weight),
            "blood_glucose" => Some(VitalType::BloodGlucose),
            _ => None,
        }
    }

    /// Default unit for this vital type.
    pub fn default_unit(self) -> &'static str {
        match self {
            VitalType::BloodPressureSystolic | VitalType::BloodPressureDiastolic => "mmHg",
            VitalType::HeartRate => "bpm",
            VitalType::OxygenSaturation => "%",
            VitalType::Temperature => "°C",
            VitalType::Weight => "kg",
            VitalType::BloodGlucose => "mg/dL",
        }
    }

    /// Label for dashboards and alert titles.
    pub fn display_name(self) -> &'static str {
        match self {
            VitalType::BloodPressureSystolic => "Systolic Blood Pressure",
            VitalType::BloodPressureDiastolic => "Diastolic Blood Pressure",
            VitalType::HeartRate => "Heart Rate",
            VitalType::OxygenSaturation => "Oxygen Saturation",
            VitalType::Temperature => "Temperature",
            VitalType::Weight => "Weight",
            VitalType::BloodGlucose => "Blood Glucose",
        }
    }

    /// Chart color.
    pub fn color(self) -> &'static str {
        match self {
            VitalType::BloodPressureSystolic => "#dc2626",
            VitalType::BloodPressureDiastolic => "#f97316",
            VitalType::HeartRate => "#db2777",
            VitalType::OxygenSaturation => "#2563eb",
            VitalType::Temperature => "#d97706",
            VitalType::Weight => "#059669",
            VitalType::BloodGlucose => "#7c3aed",
        }
    }
}

/// Source of the vital sign measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalSource {
    Device,
    Manual,
    Imported,
}

impl VitalSource {
    pub fn as_str(self) -> &'static str {
        match self {
            VitalSource::Device => "device",
            VitalSource::Manual => "manual",
            VitalSource::Imported => "imported",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "device" => Some(VitalSource::Device),
            "manual" => Some(VitalSource::Manual),
            "imported" => Some(VitalSource::Imported),
            _ => None,
        }
    }
}

/// A validated vital sign reading. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalReading {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub vital_type: VitalType,
    pub value: f64,
    pub unit: String,
    pub recorded_at: NaiveDateTime,
    pub source: VitalSource,
}

/// Reading as it arrives from the ingestion path, before boundary validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalReadingInput {
    #[serde(default)]
    pub id: Option<String>,
    pub patient_id: String,
    pub vital_type: String,
    pub value: f64,
    #[serde(default)]
    pub unit: Option<String>,
    pub recorded_at: String,
    #[serde(default)]
    pub source: Option<String>,
}

/// Copy of the triggering reading stored on an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalSnapshot {
    pub vital_type: VitalType,
    pub value: f64,
    pub unit: String,
    pub recorded_at: NaiveDateTime,
    pub tier: SeverityTier,
}

impl VitalSnapshot {
    pub fn of(reading: &VitalReading, tier: SeverityTier) -> Self {
        Self {
            vital_type: reading.vital_type,
            value: reading.value,
            unit: reading.unit.clone(),
            recorded_at: reading.recorded_at,
            tier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vital_type_round_trip() {
        for vt in VitalType::ALL {
            assert_eq!(VitalType::from_str(vt.as_str()), Some(vt));
        }
        assert_eq!(VitalType::from_str("respiratory_rate"), None);
    }

    #[test]
    fn vital_type_serializes_as_str() {
        for vt in VitalType::ALL {
            let json = serde_json::to_string(&vt).unwrap();
            assert_eq!(json, format!("\"{}\"", vt.as_str()));
        }
    }

    #[test]
    fn blood_pressure_components_share_unit() {
        assert_eq!(VitalType::BloodPressureSystolic.default_unit(), "mmHg");
        assert_eq!(VitalType::BloodPressureDiastolic.default_unit(), "mmHg");
    }

    #[test]
    fn vital_source_round_trip() {
        for src in [VitalSource::Device, VitalSource::Manual, VitalSource::Imported] {
            assert_eq!(VitalSource::from_str(src.as_str()), Some(src));
        }
        assert_eq!(VitalSource::from_str("fax"), None);
    }

    #[test]
    fn input_optional_fields_default() {
        let input: VitalReadingInput = serde_json::from_str(
            r#"{"patient_id":"p","vital_type":"heart_rate","value":72,"recorded_at":"2026-01-01 08:00:00"}"#,
        )
        .unwrap();
        assert!(input.unit.is_none());
        assert!(input.source.is_none());
        assert!(input.id.is_none());
    }
}
