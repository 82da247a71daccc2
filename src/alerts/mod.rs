//! Alert lifecycle, presentation ordering, and rule-driven creation.

pub mod lifecycle;
pub mod ordering;
pub mod rules;

use thiserror::Error;
use uuid::Uuid;

use crate::models::AlertStatus;

pub use lifecycle::*;
pub use ordering::*;
pub use rules::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlertError {
    #[error("Invalid transition for alert {id}: {from} -> {to}")]
    InvalidTransition {
        id: Uuid,
        from: AlertStatus,
        to: AlertStatus,
    },

    #[error("Alert {id} cannot move to {to} without an actor")]
    MissingActor { id: Uuid, to: AlertStatus },
}
