//! Directa session client.
//!
//! This module provides the session manager and its high-level commands.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`DirectaClient`] | TCP session, framing, status tracking |
//! | [`ClientBuilder`] | Fluent configuration builder |
//! | [`ClientConfig`] | Immutable configuration |
//! | [`ScopedSession`] | Connect-on-create, disconnect-on-drop guard |
//!
//! # Connect Sequence
//!
//! 1. Count the attempt and open the TCP connection
//! 2. Wait briefly, then drain the greeting with an elevated read deadline
//! 3. Offer the greeting to the status demultiplexer
//! 4. Restore the command read deadline
//! 5. Probe `DARWINSTATUS` if the greeting carried no usable status
//!
//! # Example
//!
//! ```no_run
//! use directa_session::{DirectaClient, OrderRequest, Result, Side};
//!
//! # async fn example() -> Result<()> {
//! let mut client = DirectaClient::builder().port(10002).build()?;
//! let mut session = client.session().await?;
//!
//! let ack = session
//!     .place_order(&OrderRequest::limit("ENI", Side::Buy, 10, 12.5))
//!     .await?
//!     .into_result()?;
//! println!("placed {}", ack.order_id);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for client configuration.
pub mod builder;

/// Client configuration and deadlines.
pub mod config;

/// Core session manager.
pub mod core;

/// Scoped session guard.
pub mod scoped;

/// High-level trading commands.
pub mod trading;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ClientBuilder;
pub use config::{ClientConfig, Timeouts};
pub use core::{DirectaClient, Reprobe};
pub use scoped::ScopedSession;
