//! Builder pattern for client configuration.
//!
//! Provides a fluent API for configuring and creating [`DirectaClient`]
//! instances.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use directa_session::DirectaClient;
//!
//! # fn example() -> directa_session::Result<()> {
//! let client = DirectaClient::builder()
//!     .port(10002)
//!     .command_timeout(Duration::from_secs(3))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::parser::{DarwinStatusParser, StatusParser};

use super::config::{ClientConfig, Timeouts};
use super::core::DirectaClient;

// ============================================================================
// ClientBuilder
// ============================================================================

/// Builder for configuring a [`DirectaClient`].
///
/// Use [`DirectaClient::builder()`] to create a new builder.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    /// Configuration being built.
    config: ClientConfig,
    /// Parser cross-checking status lines.
    status_parser: Arc<dyn StatusParser>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            config: ClientConfig::default(),
            status_parser: Arc::new(DarwinStatusParser),
        }
    }
}

// ============================================================================
// ClientBuilder Implementation
// ============================================================================

impl ClientBuilder {
    /// Creates a builder with default configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the trading API host.
    #[inline]
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Sets the trading API port.
    #[inline]
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets the maximum bytes per read.
    #[inline]
    #[must_use]
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.config.buffer_size = size;
        self
    }

    /// Enables or disables automatic `CONFORD` on `TRADCONFIRM`.
    #[inline]
    #[must_use]
    pub fn auto_confirm(mut self, enabled: bool) -> Self {
        self.config.auto_confirm = enabled;
        self
    }

    /// Replaces every deadline at once.
    #[inline]
    #[must_use]
    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.config.timeouts = timeouts;
        self
    }

    /// Sets the TCP connect timeout.
    #[inline]
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeouts.connect = timeout;
        self
    }

    /// Sets the overall deadline for ordinary commands.
    #[inline]
    #[must_use]
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeouts.command = timeout;
        self
    }

    /// Sets the overall deadline for the status probe.
    #[inline]
    #[must_use]
    pub fn status_probe_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeouts.status_probe = timeout;
        self
    }

    /// Sets the status parser used to cross-check status lines.
    #[inline]
    #[must_use]
    pub fn status_parser(mut self, parser: Arc<dyn StatusParser>) -> Self {
        self.status_parser = parser;
        self
    }

    /// Builds the client with validation.
    ///
    /// No connection is opened; call [`DirectaClient::connect`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the host is empty, the port or buffer
    /// size is zero, or a command, probe or read deadline is zero.
    pub fn build(self) -> Result<DirectaClient> {
        self.validate()?;
        Ok(DirectaClient::new(self.config, self.status_parser))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ClientBuilder {
    fn validate(&self) -> Result<()> {
        let config = &self.config;

        if config.host.trim().is_empty() {
            return Err(Error::config("Host is required. Use .host() to set it."));
        }
        if config.port == 0 {
            return Err(Error::config("Port must be non-zero."));
        }
        if config.buffer_size == 0 {
            return Err(Error::config("Buffer size must be non-zero."));
        }

        let timeouts = &config.timeouts;
        for (name, value) in [
            ("command", timeouts.command),
            ("status_probe", timeouts.status_probe),
            ("read_poll", timeouts.read_poll),
        ] {
            if value.is_zero() {
                return Err(Error::config(format!("Timeout {name} must be non-zero.")));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
