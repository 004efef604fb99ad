//! Structured response parsers.
//!
//! Each parser is a pure function of the selected reply line (or the whole
//! reply for multi-line categories) and returns the uniform [`Parsed`]
//! envelope. The session engine only depends on [`StatusParser`]; the other
//! categories are used by the high-level trading commands.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `account` | `INFOACCOUNT` and `AVAILABILITY` lines |
//! | `errors` | `ERR;` lines and the platform error-code table |
//! | `order` | `TRADOK`/`TRADCONFIRM`/`TRADERR` acks and `ORDER` lists |
//! | `portfolio` | `STOCK` lines |
//! | `status` | `DARWIN_STATUS` lines |

// ============================================================================
// Submodules
// ============================================================================

/// Account and availability parsers.
pub mod account;

/// Platform error lines.
pub mod errors;

/// Order acknowledgement and order list parsers.
pub mod order;

/// Portfolio parser.
pub mod portfolio;

/// Darwin status parser.
pub mod status;

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;

use crate::error::{Error, Result};

// ============================================================================
// Re-exports
// ============================================================================

pub use account::{AccountInfo, Availability, parse_account_info, parse_availability};
pub use errors::{error_message, parse_error_line};
pub use order::{Order, OrderAck, parse_order_ack, parse_orders};
pub use portfolio::{Position, parse_portfolio};
pub use status::{DarwinStatus, DarwinStatusParser, StatusParser};

// ============================================================================
// ParseStatus
// ============================================================================

/// Envelope status discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseStatus {
    /// Data was extracted.
    Success,
    /// The reply was an error or could not be parsed.
    Error,
}

// ============================================================================
// Parsed
// ============================================================================

/// Uniform parser result: `{success, status, data | error_code}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parsed<T> {
    /// `true` when `data` is present.
    pub success: bool,
    /// Status discriminator.
    pub status: ParseStatus,
    /// Extracted data (if success).
    pub data: Option<T>,
    /// Platform error code (if the reply was an error line).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Error description (if not success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Raw text the envelope was built from.
    pub raw: String,
}

impl<T> Parsed<T> {
    /// Creates a success envelope.
    #[must_use]
    pub fn ok(data: T, raw: impl Into<String>) -> Self {
        Self {
            success: true,
            status: ParseStatus::Success,
            data: Some(data),
            error_code: None,
            error: None,
            raw: raw.into(),
        }
    }

    /// Creates an error envelope.
    #[must_use]
    pub fn failure(
        error_code: Option<String>,
        error: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            status: ParseStatus::Error,
            data: None,
            error_code,
            error: Some(error.into()),
            raw: raw.into(),
        }
    }

    /// Builds an error envelope if `text` holds an `ERR;` line.
    #[must_use]
    pub fn platform_error(text: &str) -> Option<Self> {
        let (code, message) = text.lines().find_map(parse_error_line)?;
        Some(Self::failure(Some(code), message, text.trim()))
    }

    /// Maps the data of a success envelope.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Parsed<U> {
        Parsed {
            success: self.success,
            status: self.status,
            data: self.data.map(f),
            error_code: self.error_code,
            error: self.error,
            raw: self.raw,
        }
    }

    /// Converts to a [`Result`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Platform`] for error envelopes.
    pub fn into_result(self) -> Result<T> {
        match self.data {
            Some(data) if self.success => Ok(data),
            _ => {
                let code = self.error_code.unwrap_or_else(|| "PARSE".to_string());
                let message = self.error.unwrap_or_else(|| "unparsable reply".to_string());
                Err(Error::platform(code, message))
            }
        }
    }
}

// ============================================================================
// Field Helpers
// ============================================================================

/// Splits a reply line into its `;` separated fields.
pub(crate) fn fields(line: &str) -> Vec<&str> {
    line.trim().split(';').map(str::trim).collect()
}

/// Returns field `index` or an error naming it.
pub(crate) fn field<'a>(
    fields: &[&'a str],
    index: usize,
    name: &str,
) -> std::result::Result<&'a str, String> {
    fields
        .get(index)
        .copied()
        .ok_or_else(|| format!("missing field {name}"))
}

/// Parses field `index` as a number.
pub(crate) fn number<N: std::str::FromStr>(
    fields: &[&str],
    index: usize,
    name: &str,
) -> std::result::Result<N, String> {
    let text = field(fields, index, name)?;
    text.parse()
        .map_err(|_| format!("field {name} is not a number: {text}"))
}

/// Parses field `index` as a number, `None` when absent or not numeric.
pub(crate) fn optional_number(fields: &[&str], index: usize) -> Option<f64> {
    fields.get(index).and_then(|text| text.parse().ok())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope() {
        let parsed = Parsed::ok(42, "X;42");
        assert!(parsed.success);
        assert_eq!(parsed.status, ParseStatus::Success);
        assert_eq!(parsed.into_result().expect("ok"), 42);
    }

    #[test]
    fn test_platform_error_envelope() {
        let parsed: Parsed<()> = Parsed::platform_error("ERR;N/A;1018\n").expect("error line");
        assert!(!parsed.success);
        assert_eq!(parsed.error_code.as_deref(), Some("1018"));

        let err = parsed.into_result().unwrap_err();
        assert!(matches!(err, Error::Platform { ref code, .. } if code == "1018"));
    }

    #[test]
    fn test_not_an_error_line() {
        assert!(Parsed::<()>::platform_error("STOCK;ENI").is_none());
    }

    #[test]
    fn test_serialize_shape() {
        let parsed: Parsed<u32> = Parsed::failure(Some("1019".into()), "No orders found", "ERR;N/A;1019");
        let json = serde_json::to_value(&parsed).expect("serialize");
        assert_eq!(json["success"], false);
        assert_eq!(json["status"], "error");
        assert_eq!(json["error_code"], "1019");
    }

    #[test]
    fn test_number_helpers() {
        let f = fields("STOCK;ENI;10;x");
        assert_eq!(number::<i64>(&f, 2, "qty"), Ok(10));
        assert!(number::<i64>(&f, 3, "qty").is_err());
        assert!(number::<i64>(&f, 9, "qty").is_err());
        assert_eq!(optional_number(&f, 3), None);
    }
}
