//! TCP transport layer.
//!
//! This module owns the raw byte stream to the Darwin platform and the
//! deadline-bounded request/reply cycle built on top of it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐                         ┌─────────────────────┐
//! │  DirectaClient       │                         │  Darwin platform    │
//! │                      │          TCP            │  (trading API)      │
//! │  Framer::exchange    │◄───────────────────────►│                     │
//! │  → Connection        │    127.0.0.1:10002      │  line-oriented text │
//! └──────────────────────┘                         └─────────────────────┘
//! ```
//!
//! # Exchange Lifecycle
//!
//! 1. `Connection::open` - TCP connect with timeout
//! 2. `Connection::drain` - absorb unsolicited greeting bytes
//! 3. `Framer::exchange` - write one command, accumulate its reply
//! 4. Drop the `Connection` to close the socket
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Byte stream with a read deadline |
//! | `framer` | Command write and reply accumulation |

// ============================================================================
// Submodules
// ============================================================================

/// Byte stream with a read deadline.
pub mod connection;

/// Command write and reply accumulation.
pub mod framer;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, ReadOutcome};
pub use framer::{FrameDeadlines, Framer};
