use chrono::{DateTime, NaiveDateTime};
use uuid::Uuid;

use crate::models::{VitalReading, VitalReadingInput, VitalSource, VitalType};

use super::VitalsError;

/// Timestamp layouts accepted besides RFC 3339.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse an ingestion timestamp. Offsets are normalized to UTC.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, VitalsError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| VitalsError::invalid("recorded_at", format!("malformed timestamp '{raw}'")))
}

/// Canonical unit of a type plus the alternates converted into it.
/// Each alternate maps a value in that unit onto the canonical one.
fn unit_conversion(vital_type: VitalType, unit: &str) -> Option<fn(f64) -> f64> {
    fn same(v: f64) -> f64 {
        v
    }
    fn fahrenheit_to_celsius(v: f64) -> f64 {
        (v - 32.0) * 5.0 / 9.0
    }
    fn pounds_to_kg(v: f64) -> f64 {
        v * 0.453_592_37
    }
    fn mmol_to_mg_dl(v: f64) -> f64 {
        v * 18.0
    }

    let unit = unit.to_ascii_lowercase();
    let conversion: fn(f64) -> f64 = match (vital_type, unit.as_str()) {
        (VitalType::BloodPressureSystolic | VitalType::BloodPressureDiastolic, "mmhg") => same,
        (VitalType::HeartRate, "bpm" | "/min") => same,
        (VitalType::OxygenSaturation, "%") => same,
        (VitalType::Temperature, "°c" | "c" | "celsius") => same,
        (VitalType::Temperature, "°f" | "f" | "fahrenheit") => fahrenheit_to_celsius,
        (VitalType::Weight, "kg") => same,
        (VitalType::Weight, "lb" | "lbs") => pounds_to_kg,
        (VitalType::BloodGlucose, "mg/dl") => same,
        (VitalType::BloodGlucose, "mmol/l") => mmol_to_mg_dl,
        _ => return None,
    };
    Some(conversion)
}

/// Reject anything the classifier must never see: non-finite values,
/// unknown types, units or sources, bad ids, malformed timestamps.
///
/// Readings in a known alternate unit are converted to the type's
/// canonical unit, the one its ranges are written in. Any other unit is
/// rejected.
pub fn validate_reading(input: &VitalReadingInput) -> Result<VitalReading, VitalsError> {
    if !input.value.is_finite() {
        return Err(VitalsError::invalid("value", "value must be a finite number"));
    }

    let vital_type = VitalType::from_str(input.vital_type.trim()).ok_or_else(|| {
        VitalsError::invalid("vital_type", format!("unrecognized type '{}'", input.vital_type))
    })?;

    let patient_id = Uuid::parse_str(input.patient_id.trim())
        .map_err(|e| VitalsError::invalid("patient_id", e.to_string()))?;

    let id = match input.id.as_deref() {
        Some(raw) => {
            Uuid::parse_str(raw.trim()).map_err(|e| VitalsError::invalid("id", e.to_string()))?
        }
        None => Uuid::new_v4(),
    };

    let source = match input.source.as_deref() {
        Some(raw) => VitalSource::from_str(raw.trim()).ok_or_else(|| {
            VitalsError::invalid("source", format!("unrecognized source '{raw}'"))
        })?,
        None => VitalSource::Device,
    };

    let value = match input.unit.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        Some(unit) => {
            let convert = unit_conversion(vital_type, unit).ok_or_else(|| {
                VitalsError::invalid(
                    "unit",
                    format!("unsupported unit '{unit}' for {}", vital_type.as_str()),
                )
            })?;
            convert(input.value)
        }
        None => input.value,
    };
    if !value.is_finite() {
        return Err(VitalsError::invalid("value", "value out of range after unit conversion"));
    }

    Ok(VitalReading {
        id,
        patient_id,
        vital_type,
        value,
        unit: vital_type.default_unit().to_string(),
        recorded_at: parse_timestamp(&input.recorded_at)?,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(vital_type: &str, value: f64, recorded_at: &str) -> VitalReadingInput {
        VitalReadingInput {
            id: None,
            patient_id: "6f1c2a64-3c4e-4e59-9a7e-1d2b3c4d5e6f".into(),
            vital_type: vital_type.into(),
            value,
            unit: None,
            recorded_at: recorded_at.into(),
            source: None,
        }
    }

    #[test]
    fn valid_reading_gets_defaults() {
        let r = validate_reading(&input("heart_rate", 72.0, "2026-02-01 08:30:00")).unwrap();
        assert_eq!(r.vital_type, VitalType::HeartRate);
        assert_eq!(r.unit, "bpm");
        assert_eq!(r.source, VitalSource::Device);
        assert_eq!(r.recorded_at.to_string(), "2026-02-01 08:30:00");
    }

    #[test]
    fn rfc3339_is_normalized_to_utc() {
        let r = validate_reading(&input("weight", 80.0, "2026-02-01T10:00:00+02:00")).unwrap();
        assert_eq!(r.recorded_at.to_string(), "2026-02-01 08:00:00");
    }

    #[test]
    fn non_finite_values_rejected() {
        for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = validate_reading(&input("heart_rate", v, "2026-02-01 08:30:00")).unwrap_err();
            assert!(matches!(err, VitalsError::InvalidInput { ref field, .. } if field == "value"));
        }
    }

    #[test]
    fn unknown_type_rejected_at_boundary() {
        let err = validate_reading(&input("mood", 5.0, "2026-02-01 08:30:00")).unwrap_err();
        assert!(matches!(err, VitalsError::InvalidInput { ref field, .. } if field == "vital_type"));
    }

    #[test]
    fn malformed_timestamp_rejected() {
        for ts in ["yesterday", "", "2026-13-01 00:00:00", "01/02/2026"] {
            let err = validate_reading(&input("heart_rate", 70.0, ts)).unwrap_err();
            assert!(
                matches!(err, VitalsError::InvalidInput { ref field, .. } if field == "recorded_at"),
                "{ts}"
            );
        }
    }

    #[test]
    fn bad_patient_id_and_source_rejected() {
        let mut i = input("heart_rate", 70.0, "2026-02-01 08:30:00");
        i.patient_id = "not-a-uuid".into();
        assert!(validate_reading(&i).is_err());

        let mut i = input("heart_rate", 70.0, "2026-02-01 08:30:00");
        i.source = Some("carrier_pigeon".into());
        assert!(validate_reading(&i).is_err());
    }

    #[test]
    fn explicit_id_preserved() {
        let mut i = input("heart_rate", 72.0, "2026-02-01 08:30:00");
        i.id = Some("0b7a4d7e-2f3c-4b5a-8c9d-0e1f2a3b4c5d".into());
        let r = validate_reading(&i).unwrap();
        assert_eq!(r.id.to_string(), "0b7a4d7e-2f3c-4b5a-8c9d-0e1f2a3b4c5d");
    }

    #[test]
    fn alternate_units_are_converted_to_canonical() {
        let cases = [
            ("temperature", 98.6, "°F", 37.0, "°C"),
            ("temperature", 212.0, "fahrenheit", 100.0, "°C"),
            ("weight", 220.0, "lbs", 99.790_321_4, "kg"),
            ("blood_glucose", 5.5, "mmol/L", 99.0, "mg/dL"),
            ("blood_glucose", 110.0, "MG/DL", 110.0, "mg/dL"),
            ("heart_rate", 72.0, " bpm ", 72.0, "bpm"),
        ];
        for (vital_type, value, unit, expected, canonical) in cases {
            let mut i = input(vital_type, value, "2026-02-01 08:30:00");
            i.unit = Some(unit.into());
            let r = validate_reading(&i).unwrap();
            assert!((r.value - expected).abs() < 1e-6, "{vital_type} {value} {unit} -> {}", r.value);
            assert_eq!(r.unit, canonical);
        }
    }

    #[test]
    fn fahrenheit_body_temperature_classifies_normal() {
        let mut i = input("temperature", 98.6, "2026-02-01 08:30:00");
        i.unit = Some("°F".into());
        let r = validate_reading(&i).unwrap();
        let tier = crate::vitals::classify(&crate::vitals::ProfileTable::default(), r.vital_type, r.value);
        assert_eq!(tier, crate::models::SeverityTier::Normal);
    }

    #[test]
    fn unsupported_unit_rejected() {
        for (vital_type, unit) in [
            ("temperature", "K"),
            ("heart_rate", "mmHg"),
            ("weight", "stone"),
            ("oxygen_saturation", "ratio"),
        ] {
            let mut i = input(vital_type, 50.0, "2026-02-01 08:30:00");
            i.unit = Some(unit.into());
            let err = validate_reading(&i).unwrap_err();
            assert!(
                matches!(err, VitalsError::InvalidInput { ref field, .. } if field == "unit"),
                "{vital_type} {unit}"
            );
        }
    }

    #[test]
    fn conversion_overflow_rejected() {
        let mut i = input("blood_glucose", f64::MAX, "2026-02-01 08:30:00");
        i.unit = Some("mmol/L".into());
        assert!(validate_reading(&i).is_err());
    }
}
