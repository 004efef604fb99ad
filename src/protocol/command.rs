//! Command definitions.
//!
//! Each [`Command`] renders to the exact wire text the platform expects
//! (without the line terminator, which the framer appends).

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identifiers::OrderId;

use super::reply::ExpectedReply;

// ============================================================================
// Side / OrderType
// ============================================================================

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order.
    Buy,
    /// Sell order.
    Sell,
}

impl Side {
    /// Returns the side as rendered in replies (`BUY` / `SELL`).
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order pricing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Limit order, requires a price.
    #[default]
    Limit,
    /// Market order, no price.
    Market,
}

// ============================================================================
// Command
// ============================================================================

/// All commands understood by the Darwin trading API.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Platform status probe (`DARWINSTATUS`).
    DarwinStatus,

    /// Account summary (`INFOACCOUNT`).
    InfoAccount,

    /// Portfolio liquidity (`INFOAVAILABILITY`).
    InfoAvailability,

    /// Portfolio positions (`INFOSTOCKS`).
    InfoStocks,

    /// Single position (`GETPOSITION <symbol>`).
    GetPosition {
        /// Instrument symbol.
        symbol: String,
    },

    /// All orders (`ORDERLIST`).
    OrderList,

    /// Pending orders only (`ORDERLISTPENDING`).
    OrderListPending,

    /// Orders for one symbol (`ORDERLIST <symbol>`).
    OrderListFor {
        /// Instrument symbol.
        symbol: String,
    },

    /// New order (`ACQAZ`, `VENAZ`, `ACQMARKET`, `VENMARKET`).
    ///
    /// A `price` of `None` renders the market variant.
    PlaceOrder {
        /// Buy or sell.
        side: Side,
        /// Client order ID.
        order_id: OrderId,
        /// Instrument symbol.
        symbol: String,
        /// Number of shares.
        quantity: u64,
        /// Limit price, `None` for market orders.
        price: Option<f64>,
    },

    /// Cancel one order (`REVORD <id>`).
    CancelOrder {
        /// Order to cancel.
        order_id: OrderId,
    },

    /// Cancel every order on a symbol (`REVALL <symbol>`).
    CancelAll {
        /// Instrument symbol.
        symbol: String,
    },

    /// Change the price of a working order (`MODORD <id>,<price>[,<signal>]`).
    ModifyOrder {
        /// Order to modify.
        order_id: OrderId,
        /// New limit price.
        price: f64,
        /// New signal price for stop orders.
        signal_price: Option<f64>,
    },

    /// Confirm an order the platform asked about (`CONFORD <id>`).
    ConfirmOrder {
        /// Order to confirm.
        order_id: OrderId,
    },
}

impl Command {
    /// Returns the command verb (first wire token).
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::DarwinStatus => "DARWINSTATUS",
            Self::InfoAccount => "INFOACCOUNT",
            Self::InfoAvailability => "INFOAVAILABILITY",
            Self::InfoStocks => "INFOSTOCKS",
            Self::GetPosition { .. } => "GETPOSITION",
            Self::OrderList | Self::OrderListFor { .. } => "ORDERLIST",
            Self::OrderListPending => "ORDERLISTPENDING",
            Self::PlaceOrder { side, price, .. } => match (side, price.is_some()) {
                (Side::Buy, true) => "ACQAZ",
                (Side::Buy, false) => "ACQMARKET",
                (Side::Sell, true) => "VENAZ",
                (Side::Sell, false) => "VENMARKET",
            },
            Self::CancelOrder { .. } => "REVORD",
            Self::CancelAll { .. } => "REVALL",
            Self::ModifyOrder { .. } => "MODORD",
            Self::ConfirmOrder { .. } => "CONFORD",
        }
    }

    /// Returns the reply this command expects.
    #[inline]
    #[must_use]
    pub fn expected_reply(&self) -> ExpectedReply {
        ExpectedReply::for_verb(self.verb())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = self.verb();
        match self {
            Self::GetPosition { symbol }
            | Self::OrderListFor { symbol }
            | Self::CancelAll { symbol } => write!(f, "{verb} {symbol}"),

            Self::PlaceOrder {
                order_id,
                symbol,
                quantity,
                price,
                ..
            } => match price {
                Some(price) => write!(f, "{verb} {order_id},{symbol},{quantity},{price}"),
                None => write!(f, "{verb} {order_id},{symbol},{quantity}"),
            },

            Self::CancelOrder { order_id } | Self::ConfirmOrder { order_id } => {
                write!(f, "{verb} {order_id}")
            }

            Self::ModifyOrder {
                order_id,
                price,
                signal_price,
            } => match signal_price {
                Some(signal) => write!(f, "{verb} {order_id},{price},{signal}"),
                None => write!(f, "{verb} {order_id},{price}"),
            },

            _ => f.write_str(verb),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
