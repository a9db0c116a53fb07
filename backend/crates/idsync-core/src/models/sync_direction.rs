use crate::{CoreError, Result as CoreErrorResult};

use std::panic::Location;
use std::str::FromStr;

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// Which store receives writes during a reconciliation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SyncDirection {
    /// Remote provider is read, local store is written
    #[serde(alias = "to-django", alias = "to_local")]
    ToLocal,
    /// Local store is read, remote provider is written
    #[serde(alias = "to-supabase", alias = "to_remote")]
    ToRemote,
    /// `ToLocal` followed by `ToRemote`
    #[default]
    #[serde(alias = "both")]
    Bidirectional,
}

impl SyncDirection {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToLocal => "to-local",
            Self::ToRemote => "to-remote",
            Self::Bidirectional => "bidirectional",
        }
    }

    pub fn includes_local(&self) -> bool {
        matches!(self, Self::ToLocal | Self::Bidirectional)
    }

    pub fn includes_remote(&self) -> bool {
        matches!(self, Self::ToRemote | Self::Bidirectional)
    }
}

impl FromStr for SyncDirection {
    type Err = CoreError;

    #[track_caller]
    fn from_str(s: &str) -> CoreErrorResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "to-local" | "to_local" | "to-django" => Ok(Self::ToLocal),
            "to-remote" | "to_remote" | "to-supabase" => Ok(Self::ToRemote),
            "bidirectional" | "both" => Ok(Self::Bidirectional),
            _ => Err(CoreError::InvalidSyncDirection {
                value: s.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

impl std::fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
