//! Order acknowledgement and order list parsers.
//!
//! Acknowledgements answer every order verb:
//!
//! ```text
//! TRADOK;<sym>;<id>;<status>;<side>;<qty>;<price>;<signal>;<executed>;<remaining>;<ref>;<command>
//! TRADCONFIRM;...same fields...
//! TRADERR;<sym>;<id>;<code>;<description>
//! ```
//!
//! Order lists carry one `ORDER;<sym>;<time>;<id>;<side>;<price>;<signal>;<qty>;<status>`
//! line per order.

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;

use crate::identifiers::OrderId;

use super::{Parsed, error_message, fields, field, number, optional_number};

// ============================================================================
// OrderAck
// ============================================================================

/// Acknowledgement of an order verb.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderAck {
    /// Instrument symbol.
    pub symbol: String,
    /// Order identifier echoed by the platform.
    pub order_id: OrderId,
    /// Platform order state (e.g. `SENT`, `CANCELLED`).
    pub status_code: String,
    /// Side, or the action for cancel acks.
    pub side: String,
    /// Ordered quantity.
    pub quantity: u64,
    /// Limit price (`None` for market orders).
    pub price: Option<f64>,
    /// Signal price.
    pub signal_price: Option<f64>,
    /// Quantity filled so far.
    pub executed_quantity: u64,
    /// Quantity still working.
    pub remaining_quantity: u64,
    /// Platform reference.
    pub reference: String,
    /// Command text the platform is acknowledging.
    pub command: String,
    /// `true` for `TRADCONFIRM`: the order waits for `CONFORD`.
    pub confirmation_required: bool,
}

fn parse_ack_line(line: &str) -> Result<OrderAck, String> {
    let parts = fields(line);
    let count = |index: usize| {
        parts
            .get(index)
            .and_then(|text| text.parse::<u64>().ok())
            .unwrap_or(0)
    };
    let text = |index: usize| parts.get(index).copied().unwrap_or_default().to_string();

    Ok(OrderAck {
        symbol: field(&parts, 1, "symbol")?.to_string(),
        order_id: OrderId::new(field(&parts, 2, "order_id")?),
        status_code: field(&parts, 3, "status")?.to_string(),
        side: text(4),
        quantity: count(5),
        price: optional_number(&parts, 6),
        signal_price: optional_number(&parts, 7),
        executed_quantity: count(8),
        remaining_quantity: count(9),
        reference: text(10),
        command: text(11),
        confirmation_required: parts[0] == "TRADCONFIRM",
    })
}

/// Parses an order acknowledgement.
///
/// `TRADERR` and `ERR;` replies become error envelopes carrying the
/// platform code.
#[must_use]
pub fn parse_order_ack(text: &str) -> Parsed<OrderAck> {
    if let Some(error) = Parsed::platform_error(text) {
        return error;
    }

    let Some(line) = text
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("TRAD"))
    else {
        return Parsed::failure(None, "no order acknowledgement", text.trim());
    };

    if line.starts_with("TRADERR") {
        let parts = fields(line);
        let code = parts.get(3).copied().unwrap_or_default().to_string();
        let message = match parts.get(4) {
            Some(description) if !description.is_empty() => (*description).to_string(),
            _ => error_message(&code).to_string(),
        };
        return Parsed::failure(Some(code), message, line);
    }

    match parse_ack_line(line) {
        Ok(ack) => Parsed::ok(ack, line),
        Err(message) => Parsed::failure(None, message, line),
    }
}

// ============================================================================
// Order
// ============================================================================

/// An entry of an order list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    /// Instrument symbol.
    pub symbol: String,
    /// Platform time the order was entered (`HH:MM:SS`).
    pub time: String,
    /// Order identifier.
    pub order_id: OrderId,
    /// `BUY` or `SELL`.
    pub side: String,
    /// Limit price (`None` for market orders).
    pub price: Option<f64>,
    /// Signal price.
    pub signal_price: Option<f64>,
    /// Ordered quantity.
    pub quantity: u64,
    /// Platform order state.
    pub status: String,
}

fn parse_order_line(line: &str) -> Result<Order, String> {
    let parts = fields(line);
    Ok(Order {
        symbol: field(&parts, 1, "symbol")?.to_string(),
        time: field(&parts, 2, "time")?.to_string(),
        order_id: OrderId::new(field(&parts, 3, "order_id")?),
        side: field(&parts, 4, "side")?.to_string(),
        price: optional_number(&parts, 5),
        signal_price: optional_number(&parts, 6),
        quantity: number(&parts, 7, "quantity")?,
        status: field(&parts, 8, "status")?.to_string(),
    })
}

/// Parses an order list reply (one or more `ORDER` lines).
#[must_use]
pub fn parse_orders(text: &str) -> Parsed<Vec<Order>> {
    if let Some(error) = Parsed::platform_error(text) {
        return error;
    }

    let mut orders = Vec::new();
    for line in text.lines().filter(|line| line.trim_start().starts_with("ORDER;")) {
        match parse_order_line(line) {
            Ok(order) => orders.push(order),
            Err(message) => return Parsed::failure(None, message, line.trim()),
        }
    }

    if orders.is_empty() {
        return Parsed::failure(None, "no ORDER lines", text.trim());
    }

    Parsed::ok(orders, text.trim())
}

// ============================================================================
// Tests
// ============================================================================
