//! Connection status vocabulary.
//!
//! The platform reports its own connectivity in `DARWIN_STATUS` lines.
//! When several announcements arrive together the engine keeps the one with
//! the highest fixed priority:
//!
//! | Status | Priority |
//! |--------|----------|
//! | `CONN_OK` | 3 |
//! | `CONN_UNAVAILABLE` | 1 |
//! | `CONN_ERROR` | 0 |
//! | `UNKNOWN`, `DISCONNECTED` | -1 |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// ConnectionStatus
// ============================================================================

/// Connectivity of the trading platform as seen by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    /// No announcement observed yet.
    #[default]
    Unknown,
    /// Platform connected to the market.
    ConnOk,
    /// Platform up but trading connection unavailable.
    ConnUnavailable,
    /// Platform reports a connection error.
    ConnError,
    /// Session closed locally.
    Disconnected,
}

impl ConnectionStatus {
    /// Lowest priority; a candidate must beat it to be selected.
    pub const UNRANKED: i8 = -1;

    /// Returns the wire spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::ConnOk => "CONN_OK",
            Self::ConnUnavailable => "CONN_UNAVAILABLE",
            Self::ConnError => "CONN_ERROR",
            Self::Disconnected => "DISCONNECTED",
        }
    }

    /// Returns the arbitration priority.
    #[must_use]
    pub const fn priority(&self) -> i8 {
        match self {
            Self::ConnOk => 3,
            Self::ConnUnavailable => 1,
            Self::ConnError => 0,
            Self::Unknown | Self::Disconnected => Self::UNRANKED,
        }
    }

    /// Parses a wire status, returning `None` for unrecognized text.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "UNKNOWN" => Some(Self::Unknown),
            "CONN_OK" => Some(Self::ConnOk),
            "CONN_UNAVAILABLE" => Some(Self::ConnUnavailable),
            "CONN_ERROR" => Some(Self::ConnError),
            "DISCONNECTED" => Some(Self::Disconnected),
            _ => None,
        }
    }

    /// Returns `true` only for [`ConnectionStatus::ConnOk`].
    #[inline]
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::ConnOk)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| Error::invalid_argument(format!("unknown status: {s}")))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        assert!(ConnectionStatus::ConnOk.priority() > ConnectionStatus::ConnUnavailable.priority());
        assert!(
            ConnectionStatus::ConnUnavailable.priority() > ConnectionStatus::ConnError.priority()
        );
        assert!(ConnectionStatus::ConnError.priority() > ConnectionStatus::Unknown.priority());
    }

    #[test]
    fn test_parse_roundtrip_spelling() {
        for status in [
            ConnectionStatus::Unknown,
            ConnectionStatus::ConnOk,
            ConnectionStatus::ConnUnavailable,
            ConnectionStatus::ConnError,
            ConnectionStatus::Disconnected,
        ] {
            assert_eq!(ConnectionStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_parse_unknown_text() {
        assert_eq!(ConnectionStatus::parse("CONN_MAYBE"), None);
        assert!("CONN_MAYBE".parse::<ConnectionStatus>().is_err());
    }

    #[test]
    fn test_serde_spelling() {
        let json = serde_json::to_string(&ConnectionStatus::ConnUnavailable).expect("serialize");
        assert_eq!(json, "\"CONN_UNAVAILABLE\"");
    }
}
