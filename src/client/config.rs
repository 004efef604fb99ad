//! Client configuration.
//!
//! [`ClientConfig`] is immutable once built. Use
//! [`ClientBuilder`](super::ClientBuilder) to create one with validation.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::transport::FrameDeadlines;

// ============================================================================
// Constants
// ============================================================================

/// Default trading API host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default trading API port.
pub const DEFAULT_PORT: u16 = 10002;

/// Default bytes per read.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

// ============================================================================
// Timeouts
// ============================================================================

/// Every deadline the client applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// TCP connect.
    pub connect: Duration,
    /// Wait before draining the greeting.
    pub quiescence: Duration,
    /// Elevated read deadline while draining the greeting.
    pub initial_drain: Duration,
    /// Overall deadline for ordinary commands.
    pub command: Duration,
    /// Overall deadline for the status probe.
    pub status_probe: Duration,
    /// Wait applied to each individual read.
    pub read_poll: Duration,
    /// Wait for trailing bytes after a marker match.
    pub trailing: Duration,
    /// Pause before the single status probe retry.
    pub retry_pause: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            quiescence: Duration::from_millis(200),
            initial_drain: Duration::from_secs(3),
            command: Duration::from_secs(2),
            status_probe: Duration::from_secs(3),
            read_poll: Duration::from_secs(1),
            trailing: Duration::from_millis(200),
            retry_pause: Duration::from_millis(500),
        }
    }
}

impl Timeouts {
    /// Returns the deadlines used by the framer.
    #[inline]
    #[must_use]
    pub const fn frame(&self) -> FrameDeadlines {
        FrameDeadlines {
            command: self.command,
            status_probe: self.status_probe,
            read_poll: self.read_poll,
            trailing: self.trailing,
        }
    }
}

// ============================================================================
// ClientConfig
// ============================================================================

/// Immutable client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Trading API host.
    pub host: String,
    /// Trading API port.
    pub port: u16,
    /// Bytes per read.
    pub buffer_size: usize,
    /// Answer `TRADCONFIRM` with `CONFORD <id>` automatically.
    pub auto_confirm: bool,
    /// Deadlines.
    pub timeouts: Timeouts,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            buffer_size: DEFAULT_BUFFER_SIZE,
            auto_confirm: true,
            timeouts: Timeouts::default(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
