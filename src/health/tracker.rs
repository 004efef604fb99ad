//! Connection health state machine.
//!
//! Status changes append to an ordered transition log. The duration of
//! transition *n* is stamped exactly when transition *n + 1* is appended,
//! so the newest entry is always open-ended. Connect attempts and
//! disconnects append to a separate attempt log. Both logs are append-only
//! for the lifetime of the tracker.

// ============================================================================
// Imports
// ============================================================================

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;

use crate::protocol::ConnectionStatus;

use super::metrics::ConnectionMetrics;

// ============================================================================
// StatusTransition
// ============================================================================

/// One entry of the status transition log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusTransition {
    /// When the new status was observed.
    pub timestamp: DateTime<Local>,
    /// Status before the change.
    pub previous: ConnectionStatus,
    /// Status after the change.
    pub new: ConnectionStatus,
    /// Seconds spent in `new`, set when the next transition is appended.
    pub duration_secs: Option<f64>,
}

impl StatusTransition {
    /// Returns `true` once the transition has been superseded.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.duration_secs.is_some()
    }
}

// ============================================================================
// ConnectionAttemptRecord
// ============================================================================

/// Kind of an attempt log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptKind {
    /// A TCP connect attempt.
    Connect,
    /// A disconnect event.
    Disconnect,
}

/// One entry of the attempt log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionAttemptRecord {
    /// When the entry was recorded.
    pub timestamp: DateTime<Local>,
    /// Attempt ordinal at the time of recording.
    pub attempt: u32,
    /// Connect or disconnect.
    pub kind: AttemptKind,
    /// Outcome of a connect attempt. Always `true` for disconnects.
    pub success: bool,
    /// Error text of a failed attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Free text detail.
    pub details: String,
}

// ============================================================================
// HealthTracker
// ============================================================================

/// Connection health state machine and history.
#[derive(Debug, Clone, Default)]
pub struct HealthTracker {
    status: ConnectionStatus,
    connected: bool,
    transitions: Vec<StatusTransition>,
    attempts: Vec<ConnectionAttemptRecord>,
    attempt_count: u32,
    last_connection_time: Option<DateTime<Local>>,
    last_status_check: Option<DateTime<Local>>,
    last_status_line: Option<String>,
}

// ============================================================================
// HealthTracker - Status
// ============================================================================

impl HealthTracker {
    /// Creates a tracker in the `UNKNOWN` state with empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves to `status`, stamped now.
    ///
    /// Returns `true` if the status changed.
    pub fn set_status(&mut self, status: ConnectionStatus) -> bool {
        self.set_status_at(status, Local::now())
    }

    /// Moves to `status` at the given instant.
    ///
    /// No-op when `status` equals the current status. Otherwise closes the
    /// newest transition and appends an open one.
    pub fn set_status_at(&mut self, status: ConnectionStatus, at: DateTime<Local>) -> bool {
        if status == self.status {
            return false;
        }

        if let Some(last) = self.transitions.last_mut() {
            let elapsed = at.signed_duration_since(last.timestamp);
            last.duration_secs = Some(elapsed.num_microseconds().unwrap_or(0) as f64 / 1e6);
        }

        let previous = self.status;
        self.transitions.push(StatusTransition {
            timestamp: at,
            previous,
            new: status,
            duration_secs: None,
        });

        self.status = status;
        self.connected = status.is_ok();
        info!(from = %previous, to = %status, "Connection status changed");
        true
    }

    /// Current status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// `true` while the status is `CONN_OK`.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Transition log, oldest first.
    #[inline]
    #[must_use]
    pub fn transitions(&self) -> &[StatusTransition] {
        &self.transitions
    }

    /// Last authoritative status line.
    #[inline]
    #[must_use]
    pub fn last_status_line(&self) -> Option<&str> {
        self.last_status_line.as_deref()
    }

    /// Stores the line the current status was resolved from.
    pub fn set_last_status_line(&mut self, line: impl Into<String>) {
        self.last_status_line = Some(line.into());
    }

    /// Stamps the time of an explicit status probe.
    pub fn mark_status_check(&mut self) {
        self.last_status_check = Some(Local::now());
    }
}

// ============================================================================
// HealthTracker - Attempts
// ============================================================================

impl HealthTracker {
    /// Counts a new connect attempt and stamps the connection time.
    ///
    /// Returns the attempt ordinal.
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempt_count += 1;
        self.last_connection_time = Some(Local::now());
        self.attempt_count
    }

    /// Records a successful connect.
    pub fn record_connect(&mut self, details: impl Into<String>) {
        self.attempts.push(ConnectionAttemptRecord {
            timestamp: self.last_connection_time.unwrap_or_else(Local::now),
            attempt: self.attempt_count,
            kind: AttemptKind::Connect,
            success: true,
            error: None,
            details: details.into(),
        });
    }

    /// Records a failed connect.
    pub fn record_connect_failure(&mut self, error: impl Into<String>, details: impl Into<String>) {
        self.attempts.push(ConnectionAttemptRecord {
            timestamp: Local::now(),
            attempt: self.attempt_count,
            kind: AttemptKind::Connect,
            success: false,
            error: Some(error.into()),
            details: details.into(),
        });
    }

    /// Records a disconnect and forces `DISCONNECTED`.
    ///
    /// The attempt record is always appended; the transition only when the
    /// status was not already `DISCONNECTED`.
    pub fn record_disconnect(&mut self) {
        self.attempts.push(ConnectionAttemptRecord {
            timestamp: Local::now(),
            attempt: self.attempt_count,
            kind: AttemptKind::Disconnect,
            success: true,
            error: None,
            details: "Disconnected from API".to_string(),
        });
        self.set_status(ConnectionStatus::Disconnected);
    }

    /// Attempt log, oldest first.
    #[inline]
    #[must_use]
    pub fn attempts(&self) -> &[ConnectionAttemptRecord] {
        &self.attempts
    }

    /// Number of connect attempts so far.
    #[inline]
    #[must_use]
    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    /// Time of the latest connect attempt.
    #[inline]
    #[must_use]
    pub fn last_connection_time(&self) -> Option<DateTime<Local>> {
        self.last_connection_time
    }

    /// Time of the latest explicit status probe.
    #[inline]
    #[must_use]
    pub fn last_status_check(&self) -> Option<DateTime<Local>> {
        self.last_status_check
    }

    /// Computes a metrics snapshot.
    #[must_use]
    pub fn metrics(&self) -> ConnectionMetrics {
        ConnectionMetrics::from_tracker(self)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use proptest::prelude::*;

    fn status_strategy() -> impl Strategy<Value = ConnectionStatus> {
        prop_oneof![
            Just(ConnectionStatus::Unknown),
            Just(ConnectionStatus::ConnOk),
            Just(ConnectionStatus::ConnUnavailable),
            Just(ConnectionStatus::ConnError),
            Just(ConnectionStatus::Disconnected),
        ]
    }

    #[test]
    fn test_initial_state() {
        let tracker = HealthTracker::new();
        assert_eq!(tracker.status(), ConnectionStatus::Unknown);
        assert!(!tracker.is_connected());
        assert!(tracker.transitions().is_empty());
        assert_eq!(tracker.attempt_count(), 0);
    }

    #[test]
    fn test_redundant_status_is_noop() {
        let mut tracker = HealthTracker::new();
        assert!(tracker.set_status(ConnectionStatus::ConnOk));
        assert!(!tracker.set_status(ConnectionStatus::ConnOk));
        assert_eq!(tracker.transitions().len(), 1);
        assert!(tracker.is_connected());
    }

    #[test]
    fn test_duration_stamped_on_next_transition() {
        let mut tracker = HealthTracker::new();
        let start = Local::now();
        tracker.set_status_at(ConnectionStatus::ConnOk, start);
        tracker.set_status_at(ConnectionStatus::ConnError, start + TimeDelta::seconds(30));

        let log = tracker.transitions();
        assert_eq!(log[0].duration_secs, Some(30.0));
        assert_eq!(log[1].duration_secs, None);
        assert_eq!(log[1].previous, ConnectionStatus::ConnOk);
        assert!(!tracker.is_connected());
    }

    #[test]
    fn test_repeated_disconnect_adds_one_transition() {
        let mut tracker = HealthTracker::new();
        tracker.set_status(ConnectionStatus::ConnOk);

        tracker.record_disconnect();
        tracker.record_disconnect();

        assert_eq!(tracker.status(), ConnectionStatus::Disconnected);
        assert_eq!(tracker.transitions().len(), 2);
        let disconnects = tracker
            .attempts()
            .iter()
            .filter(|record| record.kind == AttemptKind::Disconnect)
            .count();
        assert_eq!(disconnects, 2);
    }

    #[test]
    fn test_attempt_log() {
        let mut tracker = HealthTracker::new();
        assert_eq!(tracker.begin_attempt(), 1);
        tracker.record_connect_failure("refused", "Failed to connect to 127.0.0.1:1");
        assert_eq!(tracker.begin_attempt(), 2);
        tracker.record_connect("Connected to 127.0.0.1:10002");
        tracker.record_disconnect();

        let attempts = tracker.attempts();
        assert_eq!(attempts.len(), 3);
        assert!(!attempts[0].success);
        assert_eq!(attempts[1].attempt, 2);
        assert_eq!(attempts[2].kind, AttemptKind::Disconnect);
        assert_eq!(tracker.status(), ConnectionStatus::Disconnected);
    }

    proptest! {
        #[test]
        fn prop_only_newest_transition_is_open(
            statuses in proptest::collection::vec(status_strategy(), 0..40),
            gaps in proptest::collection::vec(0i64..600, 40),
        ) {
            let mut tracker = HealthTracker::new();
            let mut at = Local::now();
            for (status, gap) in statuses.iter().zip(gaps.iter()) {
                at += TimeDelta::seconds(*gap);
                tracker.set_status_at(*status, at);
            }

            let log = tracker.transitions();
            if let Some((last, closed)) = log.split_last() {
                prop_assert!(!last.is_closed());
                prop_assert!(closed.iter().all(StatusTransition::is_closed));
            }
            for pair in log.windows(2) {
                prop_assert_ne!(pair[0].new, pair[1].new);
                prop_assert_eq!(pair[0].new, pair[1].previous);
            }
        }
    }
}
