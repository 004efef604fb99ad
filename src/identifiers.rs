//! Type-safe identifiers.
//!
//! Order IDs are client-chosen strings echoed back by the platform in
//! `TRADOK`/`ORDER` lines. The newtype keeps them from being mixed up with
//! symbols, which share the same wire position in several commands.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// ============================================================================
// OrderId
// ============================================================================

/// Sequence suffix so two orders placed in the same second stay distinct.
static ORDER_SEQUENCE: AtomicU32 = AtomicU32::new(0);

/// Identifier of an order, as sent in `ACQAZ`/`VENAZ` and echoed in replies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Wraps an existing order ID.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh order ID of the form `ORD<unix-seconds><seq>`.
    #[must_use]
    pub fn generate() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let seq = ORDER_SEQUENCE.fetch_add(1, Ordering::Relaxed) % 1000;
        Self(format!("ORD{secs}{seq:03}"))
    }

    /// Returns the ID as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OrderId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ============================================================================
// Tests
// ============================================================================
