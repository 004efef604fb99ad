//! Darwin status parser.
//!
//! Lenient structured parser for `DARWIN_STATUS;<conn>;<app>;<details>`.
//! The status demultiplexer uses it twice: as a cross-check of its own
//! line extraction, and as the fallback when extraction finds nothing.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::Serialize;

use crate::health::ConnectionMetrics;
use crate::protocol::STATUS_MARKER;

use super::{Parsed, fields};

// ============================================================================
// DarwinStatus
// ============================================================================

/// Structured status announcement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DarwinStatus {
    /// Raw connection status field (e.g. `CONN_OK`).
    pub connection_status: String,
    /// Application status field (e.g. `TRUE`).
    pub application_status: Option<String>,
    /// Free text after the status fields (release, build, URL).
    pub details: Option<String>,
    /// `true` when the connection status is `CONN_OK`.
    pub is_connected: bool,
    /// Live health snapshot, when the caller supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_metrics: Option<ConnectionMetrics>,
    /// `true` when produced by the simulator.
    pub simulation: bool,
}

// ============================================================================
// StatusParser
// ============================================================================

/// Parser for status announcements.
///
/// Implementations must be pure functions of their input.
pub trait StatusParser: fmt::Debug + Send + Sync {
    /// Parses the first status announcement found in `text`.
    ///
    /// `metrics` is attached to the result when present.
    fn parse(&self, text: &str, metrics: Option<&ConnectionMetrics>) -> Parsed<DarwinStatus>;
}

/// Default [`StatusParser`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DarwinStatusParser;

impl StatusParser for DarwinStatusParser {
    fn parse(&self, text: &str, metrics: Option<&ConnectionMetrics>) -> Parsed<DarwinStatus> {
        if let Some(error) = Parsed::platform_error(text) {
            return error;
        }

        let Some(start) = text
            .lines()
            .find_map(|line| line.find(STATUS_MARKER).map(|at| &line[at..]))
        else {
            return Parsed::failure(None, "no DARWIN_STATUS line", text.trim());
        };

        let parts = fields(start);
        let connection_status = match parts.get(1) {
            Some(status) if !status.is_empty() => (*status).to_string(),
            _ => return Parsed::failure(None, "missing connection status", start),
        };

        let application_status = parts
            .get(2)
            .filter(|value| !value.is_empty())
            .map(|value| (*value).to_string());
        let details = (parts.len() > 3)
            .then(|| parts[3..].join(";"))
            .filter(|value| !value.is_empty());

        Parsed::ok(
            DarwinStatus {
                is_connected: connection_status == "CONN_OK",
                connection_status,
                application_status,
                details,
                connection_metrics: metrics.cloned(),
                simulation: false,
            },
            start,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
