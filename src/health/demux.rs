//! Status demultiplexer.
//!
//! Every inbound blob may carry `DARWIN_STATUS` announcements, whatever the
//! command that produced it. The demultiplexer extracts them, keeps the one
//! with the highest fixed priority (first occurrence wins ties) and feeds it
//! to the [`HealthTracker`].
//!
//! Line extraction is authoritative. The structured [`StatusParser`] only
//! cross-checks the winner, and is trusted on its own only when no line
//! matched the extraction pattern.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, warn};

use crate::parser::{DarwinStatusParser, StatusParser};
use crate::protocol::{ConnectionStatus, STATUS_MARKER};

use super::tracker::HealthTracker;

// ============================================================================
// Constants
// ============================================================================

/// `DARWIN_STATUS;<conn>;<app>;` with both fields non-empty.
static STATUS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"DARWIN_STATUS;([^;]+);([^;]+);").expect("status line pattern is valid")
});

// ============================================================================
// StatusCandidate
// ============================================================================

/// A status announcement extracted from one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCandidate<'a> {
    /// Connection status field.
    pub status: ConnectionStatus,
    /// Application status field.
    pub application: &'a str,
    /// Line the announcement was found on.
    pub line: &'a str,
}

// ============================================================================
// StatusDemultiplexer
// ============================================================================

/// Extracts and arbitrates status announcements.
#[derive(Clone)]
pub struct StatusDemultiplexer {
    parser: Arc<dyn StatusParser>,
}

impl fmt::Debug for StatusDemultiplexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusDemultiplexer")
            .field("parser", &self.parser)
            .finish()
    }
}

impl Default for StatusDemultiplexer {
    fn default() -> Self {
        Self::new(Arc::new(DarwinStatusParser))
    }
}

impl StatusDemultiplexer {
    /// Creates a demultiplexer cross-checking with `parser`.
    #[must_use]
    pub fn new(parser: Arc<dyn StatusParser>) -> Self {
        Self { parser }
    }

    /// Returns the structured parser.
    #[inline]
    #[must_use]
    pub fn parser(&self) -> &Arc<dyn StatusParser> {
        &self.parser
    }

    /// Extracts every recognized announcement in `text`, in order.
    ///
    /// Lines whose status field is not a known status are skipped.
    #[must_use]
    pub fn candidates(text: &str) -> Vec<StatusCandidate<'_>> {
        text.lines()
            .filter(|line| line.contains(STATUS_MARKER))
            .filter_map(|line| {
                let captures = STATUS_LINE.captures(line)?;
                let status = ConnectionStatus::parse(captures.get(1)?.as_str())?;
                Some(StatusCandidate {
                    status,
                    application: captures.get(2)?.as_str(),
                    line,
                })
            })
            .collect()
    }

    /// Returns the highest-priority announcement in `text`.
    ///
    /// Announcements ranked at or below [`ConnectionStatus::UNRANKED`] are
    /// never selected.
    #[must_use]
    pub fn resolve(text: &str) -> Option<StatusCandidate<'_>> {
        let mut best: Option<StatusCandidate<'_>> = None;
        let mut best_priority = ConnectionStatus::UNRANKED;

        for candidate in Self::candidates(text) {
            let priority = candidate.status.priority();
            if priority > best_priority {
                best_priority = priority;
                best = Some(candidate);
            }
        }

        best
    }

    /// Feeds the announcements in `text` to `tracker`.
    ///
    /// Returns `None` when `text` holds no status line, otherwise the
    /// tracker status after the update.
    pub fn ingest(&self, text: &str, tracker: &mut HealthTracker) -> Option<ConnectionStatus> {
        if !text.lines().any(|line| line.contains(STATUS_MARKER)) {
            return None;
        }

        match Self::resolve(text) {
            Some(winner) => {
                tracker.set_last_status_line(winner.line.trim());
                tracker.set_status(winner.status);
                debug!(
                    connection = %winner.status,
                    application = winner.application,
                    "Darwin status"
                );
                self.cross_check(&winner);
            }
            None => self.fallback(text, tracker),
        }

        Some(tracker.status())
    }

    /// Compares the parser's reading of the winning line with the extracted one.
    fn cross_check(&self, winner: &StatusCandidate<'_>) {
        let parsed = self.parser.parse(winner.line, None);
        if let Some(data) = parsed.data
            && data.connection_status != winner.status.as_str()
        {
            warn!(
                extracted = %winner.status,
                parsed = %data.connection_status,
                "Connection status mismatch"
            );
        }
    }

    /// Trusts the parser when extraction found nothing.
    ///
    /// Without a usable reading, only an `UNKNOWN` status is downgraded.
    fn fallback(&self, text: &str, tracker: &mut HealthTracker) {
        let parsed = self.parser.parse(text, None);
        let status = parsed
            .data
            .as_ref()
            .and_then(|data| ConnectionStatus::parse(&data.connection_status));

        match status {
            Some(status) => {
                tracker.set_last_status_line(text.trim());
                tracker.set_status(status);
                if let Some(details) = parsed.data.as_ref().and_then(|data| data.details.as_deref()) {
                    debug!(details, "Darwin status details");
                }
            }
            None => {
                if tracker.status() == ConnectionStatus::Unknown {
                    tracker.set_status(ConnectionStatus::ConnError);
                }
                if let Some(error) = parsed.error {
                    warn!(%error, "Darwin status error");
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::ConnectionMetrics;
    use crate::parser::{DarwinStatus, Parsed};
    use proptest::prelude::*;

    /// Parser that always reads the same status.
    #[derive(Debug)]
    struct FixedParser(&'static str);

    impl StatusParser for FixedParser {
        fn parse(&self, text: &str, _metrics: Option<&ConnectionMetrics>) -> Parsed<DarwinStatus> {
            Parsed::ok(
                DarwinStatus {
                    connection_status: self.0.to_string(),
                    application_status: None,
                    details: None,
                    is_connected: self.0 == "CONN_OK",
                    connection_metrics: None,
                    simulation: false,
                },
                text,
            )
        }
    }

    fn line(status: ConnectionStatus) -> String {
        format!("DARWIN_STATUS;{status};TRUE;info")
    }

    #[test]
    fn test_no_status_line_is_noop() {
        let mut tracker = HealthTracker::new();
        let demux = StatusDemultiplexer::default();
        assert_eq!(demux.ingest("ORDER;ENI;x\n", &mut tracker), None);
        assert!(tracker.transitions().is_empty());
    }

    #[test]
    fn test_highest_priority_wins() {
        let mut tracker = HealthTracker::new();
        let demux = StatusDemultiplexer::default();
        let text = "DARWIN_STATUS;CONN_UNAVAILABLE;TRUE;a\nDARWIN_STATUS;CONN_OK;TRUE;b\n";

        assert_eq!(demux.ingest(text, &mut tracker), Some(ConnectionStatus::ConnOk));
        assert!(tracker.is_connected());
        assert_eq!(tracker.last_status_line(), Some("DARWIN_STATUS;CONN_OK;TRUE;b"));
    }

    #[test]
    fn test_tie_keeps_first_occurrence() {
        let text = "DARWIN_STATUS;CONN_ERROR;A;first\nDARWIN_STATUS;CONN_ERROR;B;second\n";
        let winner = StatusDemultiplexer::resolve(text).expect("winner");
        assert_eq!(winner.application, "A");
    }

    #[test]
    fn test_unranked_statuses_ignored() {
        assert!(StatusDemultiplexer::resolve("DARWIN_STATUS;UNKNOWN;TRUE;x\n").is_none());
        assert!(StatusDemultiplexer::resolve("DARWIN_STATUS;WEIRD;TRUE;x\n").is_none());
    }

    #[test]
    fn test_fallback_to_parser() {
        let mut tracker = HealthTracker::new();
        let demux = StatusDemultiplexer::default();

        // no trailing separator: extraction misses, the parser does not
        let status = demux.ingest("DARWIN_STATUS;CONN_UNAVAILABLE", &mut tracker);
        assert_eq!(status, Some(ConnectionStatus::ConnUnavailable));
    }

    #[test]
    fn test_unparsable_downgrades_only_unknown() {
        let demux = StatusDemultiplexer::default();

        let mut fresh = HealthTracker::new();
        demux.ingest("DARWIN_STATUS", &mut fresh);
        assert_eq!(fresh.status(), ConnectionStatus::ConnError);

        let mut known = HealthTracker::new();
        known.set_status(ConnectionStatus::ConnOk);
        demux.ingest("DARWIN_STATUS", &mut known);
        assert_eq!(known.status(), ConnectionStatus::ConnOk);
    }

    #[test]
    fn test_mismatch_does_not_override() {
        let mut tracker = HealthTracker::new();
        let demux = StatusDemultiplexer::new(Arc::new(FixedParser("CONN_ERROR")));
        demux.ingest(&line(ConnectionStatus::ConnOk), &mut tracker);
        assert_eq!(tracker.status(), ConnectionStatus::ConnOk);
    }

    proptest! {
        #[test]
        fn prop_resolves_highest_priority_in_any_order(
            order in Just(vec![
                ConnectionStatus::ConnOk,
                ConnectionStatus::ConnUnavailable,
                ConnectionStatus::ConnError,
            ]).prop_shuffle(),
            take in 1usize..=3,
        ) {
            let statuses = &order[..take];
            let text: String = statuses.iter().map(|s| line(*s) + "\n").collect();
            let expected = statuses.iter().max_by_key(|s| s.priority()).copied();

            let resolved = StatusDemultiplexer::resolve(&text).map(|c| c.status);
            prop_assert_eq!(resolved, expected);
        }
    }
}
