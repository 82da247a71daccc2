use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Variant declaration order is the `Ord` order.
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(
    /// Classifier output for a single reading. Ordered normal < elevated < critical.
    SeverityTier {
        Normal => "normal",
        Elevated => "elevated",
        Critical => "critical",
    }
);

str_enum!(
    /// Product-facing triage level of a surfaced alert.
    /// Declared in rank order, so `Ord` puts critical first.
    AlertSeverity {
        Critical => "critical",
        Elevated => "elevated",
        Informational => "informational",
    }
);

str_enum!(
    /// Alert lifecycle. Only `Active` is non-terminal.
    AlertStatus {
        Active => "active",
        Acknowledged => "acknowledged",
        Resolved => "resolved",
        Dismissed => "dismissed",
    }
);

str_enum!(
    /// Direction of change between two values or window means.
    TrendDirection {
        Up => "up",
        Down => "down",
        Stable => "stable",
    }
);

impl AlertSeverity {
    /// Presentation rank: critical=1, elevated=2, informational=3.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Critical => 1,
            Self::Elevated => 2,
            Self::Informational => 3,
        }
    }

    /// Map a reading tier onto the alert axis.
    pub fn from_tier(tier: SeverityTier) -> Self {
        match tier {
            SeverityTier::Critical => Self::Critical,
            SeverityTier::Elevated => Self::Elevated,
            SeverityTier::Normal => Self::Informational,
        }
    }
}

impl AlertStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

impl TrendDirection {
    /// Swap up/down, leaving stable fixed.
    pub fn reversed(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Stable => Self::Stable,
        }
    }
}
