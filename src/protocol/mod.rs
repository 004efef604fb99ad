//! Darwin trading API wire vocabulary.
//!
//! The platform speaks newline-terminated, semicolon-separated text. It
//! offers no length prefix and no request IDs, so a reply is recognized by
//! the marker token it carries.
//!
//! # Protocol Overview
//!
//! | Direction | Shape | Example |
//! |-----------|-------|---------|
//! | Local → Platform | `<VERB>[ <args>]\n` | `ACQAZ ORD1,ENI,10,12.5` |
//! | Platform → Local | `<MARKER>;<field>;...\n` | `ORDER;ENI;10:00:01;ORD1;BUY;12.5;0;10;SENT` |
//! | Platform → Local (unsolicited) | `DARWIN_STATUS;<conn>;<app>;<text>` | `DARWIN_STATUS;CONN_OK;TRUE;Release 2.5.1` |
//! | Platform → Local (failure) | `ERR;<context>;<code>` | `ERR;N/A;1019` |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Typed commands and their wire rendering |
//! | `reply` | Expected-reply table, completion predicate, line selection |
//! | `status` | Connection status vocabulary and priority |

// ============================================================================
// Submodules
// ============================================================================

/// Typed commands and their wire rendering.
pub mod command;

/// Expected-reply table and line selection.
pub mod reply;

/// Connection status vocabulary.
pub mod status;

// ============================================================================
// Markers
// ============================================================================

/// Marker carried by every platform status announcement.
pub const STATUS_MARKER: &str = "DARWIN_STATUS";

/// Generic error marker, accepted as the reply to any command.
pub const ERROR_MARKER: &str = "ERR;";

/// Marker shared by `TRADOK`, `TRADCONFIRM` and `TRADERR` order replies.
pub const ORDER_ACK_MARKER: &str = "TRAD";

/// Wire text of the status probe command.
pub const STATUS_PROBE: &str = "DARWINSTATUS";

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{Command, OrderType, Side};
pub use reply::ExpectedReply;
pub use status::ConnectionStatus;
