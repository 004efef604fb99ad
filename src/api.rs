//! High-level trading surface.
//!
//! [`TradingApi`] is implemented by both the live
//! [`DirectaClient`](crate::DirectaClient) and the in-memory
//! [`Simulator`](crate::Simulator), so callers can swap one for the other
//! without touching the session engine.
//!
//! Transport failures are `Err`; platform answers, including platform
//! errors such as an empty portfolio, come back as a [`Parsed`] envelope.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::identifiers::OrderId;
use crate::parser::{AccountInfo, DarwinStatus, Order, OrderAck, Parsed, Position};
use crate::protocol::{Command, OrderType, Side};

// ============================================================================
// OrderRequest
// ============================================================================

/// Parameters of a new order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Instrument symbol.
    pub symbol: String,
    /// Buy or sell.
    pub side: Side,
    /// Number of shares.
    pub quantity: u64,
    /// Limit price, required for limit orders.
    pub price: Option<f64>,
    /// Limit or market.
    pub order_type: OrderType,
}

impl OrderRequest {
    /// Creates a limit order request.
    #[must_use]
    pub fn limit(symbol: impl Into<String>, side: Side, quantity: u64, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            price: Some(price),
            order_type: OrderType::Limit,
        }
    }

    /// Creates a market order request.
    #[must_use]
    pub fn market(symbol: impl Into<String>, side: Side, quantity: u64) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            price: None,
            order_type: OrderType::Market,
        }
    }

    /// Returns the price sent on the wire, `None` for market orders.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a limit order without price.
    pub fn wire_price(&self) -> Result<Option<f64>> {
        match (self.order_type, self.price) {
            (OrderType::Limit, None) => Err(Error::invalid_argument(
                "Price must be specified for LIMIT orders",
            )),
            (OrderType::Limit, price) => Ok(price),
            (OrderType::Market, _) => Ok(None),
        }
    }

    /// Builds the placement command under `order_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a limit order without price.
    pub fn to_command(&self, order_id: OrderId) -> Result<Command> {
        Ok(Command::PlaceOrder {
            side: self.side,
            order_id,
            symbol: self.symbol.clone(),
            quantity: self.quantity,
            price: self.wire_price()?,
        })
    }
}

// ============================================================================
// TradingApi
// ============================================================================

/// Commands shared by the live client and the simulator.
#[async_trait]
pub trait TradingApi: Send {
    /// Platform status, with the health snapshot attached.
    async fn darwin_status(&mut self) -> Result<Parsed<DarwinStatus>>;

    /// Portfolio positions.
    async fn portfolio(&mut self) -> Result<Parsed<Vec<Position>>>;

    /// Account summary.
    async fn account_info(&mut self) -> Result<Parsed<AccountInfo>>;

    /// All orders of the day.
    async fn orders(&mut self) -> Result<Parsed<Vec<Order>>>;

    /// Places a new order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a limit order without price.
    async fn place_order(&mut self, request: OrderRequest) -> Result<Parsed<OrderAck>>;

    /// Cancels one order.
    async fn cancel_order(&mut self, order_id: &OrderId) -> Result<Parsed<OrderAck>>;

    /// Changes the price of a working order.
    async fn modify_order(
        &mut self,
        order_id: &OrderId,
        price: f64,
        signal_price: Option<f64>,
    ) -> Result<Parsed<OrderAck>>;
}

// ============================================================================
// Tests
// ============================================================================
