//! Platform error lines.
//!
//! Error replies have the shape `ERR;<context>;<code>`. Only the codes the
//! engine produces or reacts to are named; any other code maps to a generic
//! message and is still reported with its numeric value.

use crate::protocol::ERROR_MARKER;

/// Returns the message for a platform error code.
#[must_use]
pub fn error_message(code: &str) -> &'static str {
    match code {
        "1018" => "No positions in portfolio",
        "1019" => "No orders found",
        "1020" => "Order not found",
        _ => "Unknown platform error",
    }
}

/// Parses an `ERR;` line into `(code, message)`.
///
/// Returns `None` when the line is not an error line.
#[must_use]
pub fn parse_error_line(line: &str) -> Option<(String, &'static str)> {
    let line = line.trim();
    if !line.starts_with(ERROR_MARKER) {
        return None;
    }

    let code = line.rsplit(';').next().unwrap_or_default().trim().to_string();
    let message = error_message(&code);
    Some((code, message))
}
