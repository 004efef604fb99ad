//! Read-only metrics snapshot.

use serde::Serialize;

use crate::protocol::ConnectionStatus;

use super::tracker::{AttemptKind, HealthTracker, StatusTransition};

/// Number of transitions included in a snapshot.
pub const HISTORY_WINDOW: usize = 10;

/// Timestamp format used in snapshots.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A transition as shown in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionSummary {
    /// Formatted timestamp.
    pub timestamp: String,
    /// Status before the change.
    pub from: ConnectionStatus,
    /// Status after the change.
    pub to: ConnectionStatus,
    /// Seconds spent in `to`, once closed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}

/// Derived view of a [`HealthTracker`], computed on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionMetrics {
    /// `true` while the status is `CONN_OK`.
    pub currently_connected: bool,
    /// Current status.
    pub connection_status: ConnectionStatus,
    /// Connect attempts so far.
    pub connection_attempts: u32,
    /// Successful connect attempts.
    pub successful_connections: usize,
    /// Failed connect attempts.
    pub failed_connections: usize,
    /// Share of closed time spent in `CONN_OK`, in percent.
    pub uptime_percentage: Option<f64>,
    /// Formatted time of the latest connect attempt.
    pub last_connection_time: Option<String>,
    /// Formatted time of the latest explicit status probe.
    pub last_status_check: Option<String>,
    /// Newest transitions, oldest first.
    pub connection_history: Vec<TransitionSummary>,
}

impl ConnectionMetrics {
    /// Computes the snapshot of `tracker`.
    #[must_use]
    pub fn from_tracker(tracker: &HealthTracker) -> Self {
        let transitions = tracker.transitions();
        let window = &transitions[transitions.len().saturating_sub(HISTORY_WINDOW)..];

        let connection_history = window
            .iter()
            .map(|transition| TransitionSummary {
                timestamp: transition.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                from: transition.previous,
                to: transition.new,
                duration_seconds: transition.duration_secs,
            })
            .collect();

        let connects = tracker
            .attempts()
            .iter()
            .filter(|record| record.kind == AttemptKind::Connect);
        let successful_connections = connects.clone().filter(|record| record.success).count();
        let failed_connections = connects.filter(|record| !record.success).count();

        Self {
            currently_connected: tracker.is_connected(),
            connection_status: tracker.status(),
            connection_attempts: tracker.attempt_count(),
            successful_connections,
            failed_connections,
            uptime_percentage: uptime_percentage(transitions),
            last_connection_time: tracker
                .last_connection_time()
                .map(|at| at.format(TIMESTAMP_FORMAT).to_string()),
            last_status_check: tracker
                .last_status_check()
                .map(|at| at.format(TIMESTAMP_FORMAT).to_string()),
            connection_history,
        }
    }
}

/// Share of closed transition time spent in `CONN_OK`, in percent.
///
/// `None` when no transition is closed or the closed total is zero.
#[must_use]
pub fn uptime_percentage(transitions: &[StatusTransition]) -> Option<f64> {
    let (up, total) = transitions
        .iter()
        .filter_map(|transition| transition.duration_secs.map(|secs| (transition.new, secs)))
        .fold((0.0, 0.0), |(up, total), (status, secs)| {
            let up = if status == ConnectionStatus::ConnOk { up + secs } else { up };
            (up, total + secs)
        });

    (total > 0.0).then(|| up / total * 100.0)
}
