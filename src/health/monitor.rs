//! Shared read handle over a client's health state.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::protocol::ConnectionStatus;

use super::metrics::ConnectionMetrics;
use super::tracker::{ConnectionAttemptRecord, HealthTracker, StatusTransition};

/// Cloneable, read-only view of a [`HealthTracker`].
///
/// Handles stay valid after the client is dropped and can be read from any
/// task while the client is busy with a command.
#[derive(Debug, Clone)]
pub struct HealthMonitor {
    inner: Arc<Mutex<HealthTracker>>,
}

impl HealthMonitor {
    pub(crate) fn new(inner: Arc<Mutex<HealthTracker>>) -> Self {
        Self { inner }
    }

    /// Current status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.inner.lock().status()
    }

    /// `true` while the status is `CONN_OK`.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.lock().is_connected()
    }

    /// Computes a metrics snapshot.
    #[must_use]
    pub fn metrics(&self) -> ConnectionMetrics {
        self.inner.lock().metrics()
    }

    /// Copy of the transition log.
    #[must_use]
    pub fn transitions(&self) -> Vec<StatusTransition> {
        self.inner.lock().transitions().to_vec()
    }

    /// Copy of the attempt log.
    #[must_use]
    pub fn attempts(&self) -> Vec<ConnectionAttemptRecord> {
        self.inner.lock().attempts().to_vec()
    }

    /// Last authoritative status line.
    #[must_use]
    pub fn last_status_line(&self) -> Option<String> {
        self.inner.lock().last_status_line().map(str::to_string)
    }
}
