//! Simulated account, positions and orders.
//!
//! Each record knows how to render itself as the wire line the platform
//! would send, so simulated replies go through the same parsers as live
//! ones.

use std::fmt;

use serde::Serialize;

use crate::identifiers::OrderId;
use crate::protocol::{OrderType, Side};

/// Renders an optional price field (empty when absent).
fn price_field(price: Option<f64>) -> String {
    price.map(|price| price.to_string()).unwrap_or_default()
}

// ============================================================================
// SimAccount
// ============================================================================

/// Simulated account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimAccount {
    /// Account code.
    pub account_code: String,
    /// Available liquidity.
    pub liquidity: f64,
    /// Account equity.
    pub equity: f64,
}

impl Default for SimAccount {
    fn default() -> Self {
        Self {
            account_code: "SIM1234".to_string(),
            liquidity: 10_000.0,
            equity: 10_000.0,
        }
    }
}

impl SimAccount {
    /// Renders the `INFOACCOUNT` line.
    #[must_use]
    pub fn wire_line(&self, time: &str) -> String {
        format!(
            "INFOACCOUNT;{time};{};{};0;0.0;{};SIM",
            self.account_code, self.liquidity, self.equity
        )
    }
}

// ============================================================================
// SimPosition
// ============================================================================

/// Simulated portfolio position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimPosition {
    /// Instrument symbol.
    pub symbol: String,
    /// Shares held.
    pub quantity: i64,
    /// Average load price.
    pub avg_price: f64,
    /// Unrealized gain.
    pub gain: f64,
}

impl SimPosition {
    /// Renders the `STOCK` line.
    #[must_use]
    pub fn wire_line(&self, time: &str) -> String {
        format!(
            "STOCK;{};{time};{};0;0;{};{}",
            self.symbol, self.quantity, self.avg_price, self.gain
        )
    }
}

// ============================================================================
// SimOrder
// ============================================================================

/// Lifecycle state of a simulated order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SimOrderStatus {
    /// Working.
    Pending,
    /// Cancelled by the user.
    Cancelled,
    /// Filled.
    Executed,
}

impl SimOrderStatus {
    /// Returns the wire spelling.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Cancelled => "CANCELLED",
            Self::Executed => "EXECUTED",
        }
    }
}

impl fmt::Display for SimOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Simulated order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimOrder {
    /// Order identifier.
    pub order_id: OrderId,
    /// Instrument symbol.
    pub symbol: String,
    /// Buy or sell.
    pub side: Side,
    /// Ordered quantity.
    pub quantity: u64,
    /// Limit price, `None` for market orders.
    pub price: Option<f64>,
    /// Signal price.
    pub signal_price: Option<f64>,
    /// Limit or market.
    pub order_type: OrderType,
    /// Lifecycle state.
    pub status: SimOrderStatus,
    /// Entry time (`HH:MM:SS`).
    pub time: String,
    /// Fill price, once executed.
    pub executed_price: Option<f64>,
    /// Fill quantity, once executed.
    pub executed_quantity: Option<u64>,
}

impl SimOrder {
    /// Renders the `ORDER` list line.
    #[must_use]
    pub fn wire_line(&self) -> String {
        format!(
            "ORDER;{};{};{};{};{};{};{};{}",
            self.symbol,
            self.time,
            self.order_id,
            self.side,
            price_field(self.price),
            self.signal_price.unwrap_or(0.0),
            self.quantity,
            self.status
        )
    }

    /// Renders a `TRADOK` acknowledgement.
    #[must_use]
    pub fn ack_line(&self, state: &str, reference: &str, command: &str) -> String {
        format!(
            "TRADOK;{};{};{state};{};{};{};{};0;{};{reference};{command}",
            self.symbol,
            self.order_id,
            self.side,
            self.quantity,
            price_field(self.price),
            self.signal_price.unwrap_or(0.0),
            self.quantity
        )
    }

    /// Renders the acknowledgement of a cancellation.
    #[must_use]
    pub fn cancel_line(&self) -> String {
        format!(
            "TRADOK;{};{};CANCELLED;CANCEL;0;0;0;0;0;SIMREF002;REVORD {}",
            self.symbol, self.order_id, self.order_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(price: Option<f64>) -> SimOrder {
        SimOrder {
            order_id: OrderId::new("ORD1"),
            symbol: "TEST".into(),
            side: Side::Buy,
            quantity: 100,
            price,
            signal_price: None,
            order_type: OrderType::Limit,
            status: SimOrderStatus::Pending,
            time: "10:00:00".into(),
            executed_price: None,
            executed_quantity: None,
        }
    }

    #[test]
    fn test_account_line() {
        let line = SimAccount::default().wire_line("10:00:00");
        assert_eq!(line, "INFOACCOUNT;10:00:00;SIM1234;10000;0;0.0;10000;SIM");
    }

    #[test]
    fn test_order_lines() {
        let order = order(Some(50.5));
        assert_eq!(order.wire_line(), "ORDER;TEST;10:00:00;ORD1;BUY;50.5;0;100;PENDING");
        assert_eq!(
            order.ack_line("SENT", "SIMREF001", "ACQAZ ORD1,TEST,100,50.5"),
            "TRADOK;TEST;ORD1;SENT;BUY;100;50.5;0;0;100;SIMREF001;ACQAZ ORD1,TEST,100,50.5"
        );
    }

    #[test]
    fn test_market_price_field_empty() {
        assert_eq!(
            order(None).wire_line(),
            "ORDER;TEST;10:00:00;ORD1;BUY;;0;100;PENDING"
        );
    }
}
