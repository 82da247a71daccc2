use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alerts::rules::{default_rules, AlertRule};
use crate::billing::{default_codes, BillingCode};
use crate::models::VitalType;
use crate::vitals::classify::UnknownTypePolicy;
use crate::vitals::profile::VitalTypeProfile;
use crate::vitals::trend::default_noise_threshold;

/// Application-level constants
pub const APP_NAME: &str = "Pulsewatch";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Rule file name inside the application data directory.
pub const RULES_FILE_NAME: &str = "rules.json";

/// Default trend comparison window.
pub const DEFAULT_TREND_WINDOW_DAYS: i64 = 7;

/// Points compared by the short-sequence trend.
pub const DEFAULT_SHORT_SEQUENCE_LEN: usize = 3;

/// Filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "pulsewatch=info,warn"
}

/// Get the application data directory
/// ~/Pulsewatch/ on all platforms; the working directory when no home exists.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Location of the operator-editable rule table.
pub fn rules_path() -> PathBuf {
    app_data_dir().join(RULES_FILE_NAME)
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid profile for {vital_type}: {reason}")]
    InvalidProfile { vital_type: String, reason: String },
}

/// Declarative engine configuration. Every field falls back to the built-in
/// table, so a rule file only needs to list what it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Per-type range overrides, merged over the default profile table.
    pub profiles: BTreeMap<VitalType, VitalTypeProfile>,
    /// Per-type trend noise thresholds.
    pub noise_thresholds: BTreeMap<VitalType, f64>,
    pub alert_rules: Vec<AlertRule>,
    pub billing_codes: Vec<BillingCode>,
    pub unknown_type_policy: UnknownTypePolicy,
    pub trend_window_days: i64,
    pub short_sequence_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            profiles: BTreeMap::new(),
            noise_thresholds: VitalType::ALL
                .iter()
                .map(|vt| (*vt, default_noise_threshold(*vt)))
                .collect(),
            alert_rules: default_rules(),
            billing_codes: default_codes(),
            unknown_type_policy: UnknownTypePolicy::default(),
            trend_window_days: DEFAULT_TREND_WINDOW_DAYS,
            short_sequence_len: DEFAULT_SHORT_SEQUENCE_LEN,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a rule file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json(&raw)?;
        tracing::info!(
            path = %path.display(),
            profile_overrides = config.profiles.len(),
            rules = config.alert_rules.len(),
            "Loaded engine configuration"
        );
        Ok(config)
    }

    /// Read a rule file, or use the built-in tables when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No rule file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Noise threshold for a type; zero when unconfigured.
    pub fn noise_threshold(&self, vital_type: VitalType) -> f64 {
        self.noise_thresholds
            .get(&vital_type)
            .copied()
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with("Pulsewatch"));
    }

    #[test]
    fn rules_path_under_app_data() {
        let rules = rules_path();
        assert!(rules.starts_with(app_data_dir()));
        assert!(rules.ends_with(RULES_FILE_NAME));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn default_config_has_builtin_tables() {
        let config = EngineConfig::default();
        assert!(config.profiles.is_empty());
        assert!(!config.alert_rules.is_empty());
        assert_eq!(config.billing_codes.len(), 5);
        assert_eq!(config.trend_window_days, 7);
        assert_eq!(config.short_sequence_len, 3);
        assert_eq!(config.unknown_type_policy, UnknownTypePolicy::FailOpen);
    }

    #[test]
    fn default_noise_thresholds() {
        let config = EngineConfig::default();
        assert_eq!(config.noise_threshold(VitalType::BloodPressureSystolic), 2.0);
        assert_eq!(config.noise_threshold(VitalType::Temperature), 0.1);
        assert_eq!(config.noise_threshold(VitalType::HeartRate), 0.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(
            r#"{
                "profiles": {
                    "heart_rate": {
                        "normal": {"min": 50, "max": 110},
                        "critical": {"min": 35, "max": 160}
                    }
                },
                "unknown_type_policy": "require_review"
            }"#,
        )
        .unwrap();
        assert_eq!(config.profiles[&VitalType::HeartRate].normal.max, 110.0);
        assert_eq!(config.unknown_type_policy, UnknownTypePolicy::RequireReview);
        assert!(!config.alert_rules.is_empty());
        assert_eq!(config.trend_window_days, 7);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = EngineConfig::from_json("{\"profiles\": 3}").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.trend_window_days, DEFAULT_TREND_WINDOW_DAYS);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(RULES_FILE_NAME);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"trend_window_days": 14, "noise_thresholds": {{"weight": 0.5}}}}"#)
            .unwrap();
        let config = EngineConfig::load_or_default(&path).unwrap();
        assert_eq!(config.trend_window_days, 14);
        assert_eq!(config.noise_threshold(VitalType::Weight), 0.5);
        // Overridden map replaces the default one wholesale.
        assert_eq!(config.noise_threshold(VitalType::Temperature), 0.0);
    }
}
