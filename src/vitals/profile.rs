use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::models::VitalType;

/// Gray used for vital types the dashboard does not know.
pub const NEUTRAL_COLOR: &str = "#6b7280";

/// Closed interval. Boundaries are inside the range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const ZERO: Range = Range { min: 0.0, max: 0.0 };

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// True when `other` lies entirely within `self`.
    pub fn covers(&self, other: &Range) -> bool {
        self.min <= other.min && self.max >= other.max
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

/// Normal and critical bands for one vital type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalTypeProfile {
    pub normal: Range,
    pub critical: Range,
}

impl VitalTypeProfile {
    pub const fn new(normal: Range, critical: Range) -> Self {
        Self { normal, critical }
    }

    fn validate(&self, vital_type: VitalType) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidProfile {
            vital_type: vital_type.as_str().into(),
            reason: reason.into(),
        };
        for range in [&self.normal, &self.critical] {
            if !range.min.is_finite() || !range.max.is_finite() {
                return Err(invalid("range bounds must be finite"));
            }
            if range.min > range.max {
                return Err(invalid("range min exceeds max"));
            }
        }
        if !self.critical.covers(&self.normal) {
            return Err(invalid("critical range must contain the normal range"));
        }
        Ok(())
    }
}

/// Built-in ranges for adult remote monitoring.
pub fn default_profile(vital_type: VitalType) -> VitalTypeProfile {
    match vital_type {
        VitalType::BloodPressureSystolic => {
            VitalTypeProfile::new(Range::new(90.0, 140.0), Range::new(70.0, 180.0))
        }
        VitalType::BloodPressureDiastolic => {
            VitalTypeProfile::new(Range::new(60.0, 90.0), Range::new(40.0, 120.0))
        }
        VitalType::HeartRate => {
            VitalTypeProfile::new(Range::new(60.0, 100.0), Range::new(40.0, 150.0))
        }
        VitalType::OxygenSaturation => {
            VitalTypeProfile::new(Range::new(95.0, 100.0), Range::new(88.0, 100.0))
        }
        VitalType::Temperature => {
            VitalTypeProfile::new(Range::new(36.1, 37.5), Range::new(35.0, 39.5))
        }
        VitalType::Weight => {
            VitalTypeProfile::new(Range::new(40.0, 150.0), Range::new(30.0, 200.0))
        }
        VitalType::BloodGlucose => {
            VitalTypeProfile::new(Range::new(70.0, 140.0), Range::new(54.0, 250.0))
        }
    }
}

/// Immutable profile table, built once and shared by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileTable {
    profiles: BTreeMap<VitalType, VitalTypeProfile>,
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self {
            profiles: VitalType::ALL
                .iter()
                .map(|vt| (*vt, default_profile(*vt)))
                .collect(),
        }
    }
}

impl ProfileTable {
    /// A table holding only the given profiles. Types left out classify
    /// through the unknown-type policy.
    pub fn from_profiles(
        profiles: BTreeMap<VitalType, VitalTypeProfile>,
    ) -> Result<Self, ConfigError> {
        for (vt, profile) in &profiles {
            profile.validate(*vt)?;
        }
        Ok(Self { profiles })
    }

    /// Defaults with `overrides` replacing individual types.
    pub fn with_overrides(
        overrides: &BTreeMap<VitalType, VitalTypeProfile>,
    ) -> Result<Self, ConfigError> {
        let mut table = Self::default();
        for (vt, profile) in overrides {
            profile.validate(*vt)?;
            table.profiles.insert(*vt, *profile);
        }
        Ok(table)
    }

    pub fn get(&self, vital_type: VitalType) -> Option<&VitalTypeProfile> {
        self.profiles.get(&vital_type)
    }

    /// Normal range by type name; zero-width when unknown.
    pub fn normal_range(&self, name: &str) -> Range {
        self.lookup(name).map(|p| p.normal).unwrap_or(Range::ZERO)
    }

    /// Critical range by type name; zero-width when unknown.
    pub fn critical_range(&self, name: &str) -> Range {
        self.lookup(name).map(|p| p.critical).unwrap_or(Range::ZERO)
    }

    fn lookup(&self, name: &str) -> Option<&VitalTypeProfile> {
        VitalType::from_str(name).and_then(|vt| self.get(vt))
    }
}

/// Display name by type name; unknown names are shown as given.
pub fn display_name(name: &str) -> String {
    VitalType::from_str(name)
        .map(|vt| vt.display_name().to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Unit by type name; empty when unknown.
pub fn unit(name: &str) -> &'static str {
    VitalType::from_str(name).map_or("", VitalType::default_unit)
}

/// Chart color by type name; neutral when unknown.
pub fn color(name: &str) -> &'static str {
    VitalType::from_str(name).map_or(NEUTRAL_COLOR, VitalType::color)
}
