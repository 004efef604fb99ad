//! Trading simulator.
//!
//! An in-memory book that answers the same high-level calls as
//! [`DirectaClient`](crate::DirectaClient) through [`TradingApi`](crate::TradingApi),
//! without any network traffic. Replies are rendered as platform wire lines
//! and parsed by the regular parsers.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `book` | Simulated account, position and order records |
//! | `simulator` | [`Simulator`] state machine |

// ============================================================================
// Submodules
// ============================================================================

/// Simulated records and their wire rendering.
pub mod book;

/// Simulator state machine.
pub mod simulator;

// ============================================================================
// Re-exports
// ============================================================================

pub use book::{SimAccount, SimOrder, SimOrderStatus, SimPosition};
pub use simulator::Simulator;
