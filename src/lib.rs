//! Directa Trading API client - session engine for the Darwin platform.
//!
//! This library talks to the Directa "Darwin" desktop platform over its
//! plain-text TCP protocol: newline-delimited commands out, `;` separated
//! reply lines back.
//!
//! # Architecture
//!
//! The client owns one TCP session and serializes commands on it:
//!
//! - **Framing**: replies have no terminator, so each command knows which
//!   marker line completes it and reading stops on that marker or on idle
//! - **Status demultiplexing**: status lines arrive unsolicited inside any
//!   reply and are resolved by priority before updating the health state
//! - **Health tracking**: every status change and connect attempt is recorded
//!   and summarized as connection metrics
//!
//! Key design principles:
//!
//! - One in-flight command per session (`&mut self` on every exchange)
//! - Every wait is bounded by a deadline from [`Timeouts`]
//! - Transport failures are [`Error`]s, platform errors live in [`Parsed`]
//!
//! # Quick Start
//!
//! ```no_run
//! use directa_session::{DirectaClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut client = DirectaClient::builder()
//!         .host("127.0.0.1")
//!         .port(10002)
//!         .build()?;
//!
//!     client.connect().await?;
//!     println!("status: {}", client.status());
//!
//!     let portfolio = client.portfolio().await?;
//!     for position in portfolio.data.unwrap_or_default() {
//!         println!("{} x {}", position.symbol, position.quantity_portfolio);
//!     }
//!
//!     client.disconnect();
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | [`TradingApi`] trait and [`OrderRequest`] |
//! | [`client`] | Session manager: [`DirectaClient`], [`ClientBuilder`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`health`] | Status tracking, demultiplexing and metrics |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`parser`] | Structured reply parsers |
//! | [`protocol`] | Commands, reply markers and status values |
//! | [`simulation`] | In-memory [`Simulator`] |
//! | [`transport`] | TCP connection and reply framing (internal) |

// ============================================================================
// Modules
// ============================================================================

/// Trading abstraction shared by the live client and the simulator.
pub mod api;

/// Session manager and high-level commands.
///
/// Use [`DirectaClient::builder()`] to create a configured client.
pub mod client;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Connection health: status transitions, attempts and metrics.
pub mod health;

/// Type-safe identifiers.
pub mod identifiers;

/// Reply parsers producing [`Parsed`] envelopes.
pub mod parser;

/// Protocol vocabulary.
///
/// Command verbs, expected reply markers and connection status values.
pub mod protocol;

/// In-memory trading simulator.
pub mod simulation;

/// TCP transport layer.
///
/// Internal module handling the socket and reply accumulation.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{ClientBuilder, ClientConfig, DirectaClient, Reprobe, ScopedSession, Timeouts};

// Trading types
pub use api::{OrderRequest, TradingApi};

// Error types
pub use error::{Error, Result};

// Health types
pub use health::{ConnectionMetrics, HealthMonitor, StatusDemultiplexer, StatusTransition};

// Identifier types
pub use identifiers::OrderId;

// Parser types
pub use parser::{
    AccountInfo, Availability, DarwinStatus, DarwinStatusParser, Order, OrderAck, Parsed,
    ParseStatus, Position, StatusParser,
};

// Protocol types
pub use protocol::{Command, ConnectionStatus, ExpectedReply, OrderType, Side};

// Simulation types
pub use simulation::Simulator;
