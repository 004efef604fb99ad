//! Portfolio parser.
//!
//! `STOCK;<symbol>;<time>;<qty portfolio>;<qty diary>;<qty negotiating>;<avg price>;<gain>`,
//! one line per position.

use serde::Serialize;

use super::{Parsed, fields, field, number};

/// A position in the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    /// Instrument symbol.
    pub symbol: String,
    /// Platform time of the snapshot (`HH:MM:SS`).
    pub time: String,
    /// Shares held in the portfolio.
    pub quantity_portfolio: i64,
    /// Shares moved today.
    pub quantity_diary: i64,
    /// Shares sold today.
    pub quantity_sell_diary: i64,
    /// Average load price.
    pub avg_price: f64,
    /// Unrealized gain.
    pub gain: f64,
}

/// Parses one `STOCK` line.
fn parse_position(line: &str) -> Result<Position, String> {
    let parts = fields(line);
    Ok(Position {
        symbol: field(&parts, 1, "symbol")?.to_string(),
        time: field(&parts, 2, "time")?.to_string(),
        quantity_portfolio: number(&parts, 3, "quantity_portfolio")?,
        quantity_diary: number(&parts, 4, "quantity_diary")?,
        quantity_sell_diary: number(&parts, 5, "quantity_sell_diary")?,
        avg_price: number(&parts, 6, "avg_price")?,
        gain: number(&parts, 7, "gain")?,
    })
}

/// Parses a portfolio reply (one or more `STOCK` lines).
#[must_use]
pub fn parse_portfolio(text: &str) -> Parsed<Vec<Position>> {
    if let Some(error) = Parsed::platform_error(text) {
        return error;
    }

    let mut positions = Vec::new();
    for line in text.lines().filter(|line| line.trim_start().starts_with("STOCK;")) {
        match parse_position(line) {
            Ok(position) => positions.push(position),
            Err(message) => return Parsed::failure(None, message, line.trim()),
        }
    }

    if positions.is_empty() {
        return Parsed::failure(None, "no STOCK lines", text.trim());
    }

    Parsed::ok(positions, text.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_position() {
        let parsed = parse_portfolio("STOCK;ENI;10:00:00;100;0;0;12.5;3.25");
        let positions = parsed.data.expect("data");
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].symbol, "ENI");
        assert_eq!(positions[0].quantity_portfolio, 100);
        assert_eq!(positions[0].avg_price, 12.5);
    }

    #[test]
    fn test_multiple_positions_skip_chatter() {
        let text = "STOCK;ENI;10:00:00;100;0;0;12.5;3\nDARWIN_STATUS;CONN_OK;TRUE;x\nSTOCK;ENEL;10:00:00;5;0;0;6;0\n";
        let positions = parse_portfolio(text).data.expect("data");
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[1].symbol, "ENEL");
    }

    #[test]
    fn test_empty_portfolio_error() {
        let parsed = parse_portfolio("ERR;N/A;1018");
        assert!(!parsed.success);
        assert_eq!(parsed.error_code.as_deref(), Some("1018"));
    }

    #[test]
    fn test_malformed_line() {
        let parsed = parse_portfolio("STOCK;ENI;10:00:00;many");
        assert!(!parsed.success);
        assert!(parsed.error.expect("error").contains("quantity_portfolio"));
    }
}
