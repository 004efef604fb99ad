//! Connection health.
//!
//! The tracker is a state machine over [`ConnectionStatus`] fed by the
//! status demultiplexer and by explicit disconnects. It keeps the
//! transition and attempt logs that the metrics snapshot is computed from.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `demux` | Status line extraction and priority arbitration |
//! | `metrics` | Read-only metrics snapshot |
//! | `monitor` | Cloneable read handle over shared health state |
//! | `tracker` | State machine, transition and attempt logs |
//!
//! [`ConnectionStatus`]: crate::protocol::ConnectionStatus

// ============================================================================
// Submodules
// ============================================================================

/// Status demultiplexer.
pub mod demux;

/// Metrics snapshot.
pub mod metrics;

/// Shared read handle.
pub mod monitor;

/// Health state machine.
pub mod tracker;

// ============================================================================
// Re-exports
// ============================================================================

pub use demux::{StatusCandidate, StatusDemultiplexer};
pub use metrics::{ConnectionMetrics, TransitionSummary, uptime_percentage};
pub use monitor::HealthMonitor;
pub use tracker::{AttemptKind, ConnectionAttemptRecord, HealthTracker, StatusTransition};
