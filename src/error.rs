//! Error types for the Directa session engine.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use directa_session::{DirectaClient, Result};
//!
//! async fn example(client: &mut DirectaClient) -> Result<()> {
//!     client.connect().await?;
//!     let line = client.send("INFOACCOUNT").await?;
//!     println!("{line}");
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`], [`Error::NotConnected`] |
//! | Exchange | [`Error::NoResponse`], [`Error::InvalidArgument`] |
//! | Platform | [`Error::Platform`], [`Error::OrderNotFound`] |
//! | External | [`Error::Io`] |
//!
//! Status-probe failures and regex/parser status mismatches are not
//! represented here: the engine absorbs them into the health state and logs
//! them, since a status refresh is never the request the caller made.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

use crate::identifiers::OrderId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when client configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// TCP connection failed.
    ///
    /// Returned when the trading platform refuses or drops the connect.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// TCP connect did not complete in time.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// Peer closed the stream before sending any reply byte.
    #[error("Connection closed")]
    ConnectionClosed,

    /// A command was sent without an active session.
    ///
    /// Call [`DirectaClient::connect`](crate::DirectaClient::connect) first.
    #[error("Not connected to Directa Trading API")]
    NotConnected,

    // ========================================================================
    // Exchange Errors
    // ========================================================================
    /// No byte arrived before the command deadline.
    ///
    /// Recoverable: the caller may retry the command.
    #[error("No response received for {command} after {timeout_ms}ms")]
    NoResponse {
        /// Command that went unanswered.
        command: String,
        /// Milliseconds waited before giving up.
        timeout_ms: u64,
    },

    /// Invalid argument for a command.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    // ========================================================================
    // Platform Errors
    // ========================================================================
    /// Error reply from the trading platform.
    #[error("Platform error {code}: {message}")]
    Platform {
        /// Platform error code.
        code: String,
        /// Human readable message for the code.
        message: String,
    },

    /// Order unknown to the simulator.
    #[error("Order not found: {order_id}")]
    OrderNotFound {
        /// The missing order ID.
        order_id: OrderId,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a no-response error.
    #[inline]
    pub fn no_response(command: impl Into<String>, timeout_ms: u64) -> Self {
        Self::NoResponse {
            command: command.into(),
            timeout_ms,
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a platform error.
    #[inline]
    pub fn platform(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Platform {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates an order not found error.
    #[inline]
    pub fn order_not_found(order_id: OrderId) -> Self {
        Self::OrderNotFound { order_id }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::NoResponse { .. }
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionTimeout { .. }
                | Self::ConnectionClosed
                | Self::NotConnected
                | Self::Io(_)
        )
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed on retry.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::NoResponse { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
