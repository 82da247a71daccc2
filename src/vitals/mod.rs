//! Vital sign classification: per-type ranges, threshold tiers, trends, and
//! boundary validation of incoming readings.

pub mod classify;
pub mod profile;
pub mod trend;
pub mod validate;

use thiserror::Error;

pub use classify::*;
pub use profile::*;
pub use trend::*;
pub use validate::*;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VitalsError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },
}

impl VitalsError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        VitalsError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
