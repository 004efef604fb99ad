//! High-level trading commands.
//!
//! Thin wrappers that send a typed [`Command`] and run the selected reply
//! line through the matching parser. Multi-line categories (positions,
//! orders) are parsed from the whole reply so every line is kept.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use tracing::{Instrument, debug, info};

use crate::api::{OrderRequest, TradingApi};
use crate::error::Result;
use crate::identifiers::OrderId;
use crate::parser::{
    AccountInfo, Availability, DarwinStatus, Order, OrderAck, Parsed, Position,
    parse_account_info, parse_availability, parse_order_ack, parse_orders, parse_portfolio,
};
use crate::protocol::Command;

use super::core::DirectaClient;

// ============================================================================
// DirectaClient - Queries
// ============================================================================

impl DirectaClient {
    /// Sends a typed command and returns the reply line answering it.
    ///
    /// # Errors
    ///
    /// See [`DirectaClient::send`].
    pub async fn execute(&mut self, command: &Command) -> Result<String> {
        self.send(&command.to_string()).await
    }

    /// Sends a typed command and returns the whole reply text.
    ///
    /// # Errors
    ///
    /// See [`DirectaClient::send`].
    pub async fn execute_all(&mut self, command: &Command) -> Result<String> {
        self.exchange(&command.to_string()).await
    }

    /// Portfolio positions (`INFOSTOCKS`).
    ///
    /// # Errors
    ///
    /// See [`DirectaClient::send`].
    pub async fn portfolio(&mut self) -> Result<Parsed<Vec<Position>>> {
        let reply = self.execute_all(&Command::InfoStocks).await?;
        Ok(parse_portfolio(&reply))
    }

    /// Single position (`GETPOSITION <symbol>`).
    ///
    /// # Errors
    ///
    /// See [`DirectaClient::send`].
    pub async fn position(&mut self, symbol: &str) -> Result<Parsed<Vec<Position>>> {
        let command = Command::GetPosition {
            symbol: symbol.to_string(),
        };
        let reply = self.execute_all(&command).await?;
        Ok(parse_portfolio(&reply))
    }

    /// Account summary (`INFOACCOUNT`).
    ///
    /// # Errors
    ///
    /// See [`DirectaClient::send`].
    pub async fn account_info(&mut self) -> Result<Parsed<AccountInfo>> {
        let reply = self.execute(&Command::InfoAccount).await?;
        Ok(parse_account_info(&reply))
    }

    /// Portfolio liquidity (`INFOAVAILABILITY`).
    ///
    /// # Errors
    ///
    /// See [`DirectaClient::send`].
    pub async fn availability(&mut self) -> Result<Parsed<Availability>> {
        let reply = self.execute(&Command::InfoAvailability).await?;
        Ok(parse_availability(&reply))
    }

    /// All orders of the day (`ORDERLIST`).
    ///
    /// # Errors
    ///
    /// See [`DirectaClient::send`].
    pub async fn orders(&mut self) -> Result<Parsed<Vec<Order>>> {
        let reply = self.execute_all(&Command::OrderList).await?;
        Ok(parse_orders(&reply))
    }

    /// Working orders only (`ORDERLISTPENDING`).
    ///
    /// # Errors
    ///
    /// See [`DirectaClient::send`].
    pub async fn pending_orders(&mut self) -> Result<Parsed<Vec<Order>>> {
        let reply = self.execute_all(&Command::OrderListPending).await?;
        Ok(parse_orders(&reply))
    }

    /// Orders on one symbol (`ORDERLIST <symbol>`).
    ///
    /// # Errors
    ///
    /// See [`DirectaClient::send`].
    pub async fn orders_for_symbol(&mut self, symbol: &str) -> Result<Parsed<Vec<Order>>> {
        let command = Command::OrderListFor {
            symbol: symbol.to_string(),
        };
        let reply = self.execute_all(&command).await?;
        Ok(parse_orders(&reply))
    }
}

// ============================================================================
// DirectaClient - Orders
// ============================================================================

impl DirectaClient {
    /// Places a new order under a generated ID.
    ///
    /// When the platform asks for confirmation (`TRADCONFIRM`) and
    /// auto-confirm is enabled, answers with `CONFORD <id>` and returns the
    /// acknowledgement of the confirmation.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`](crate::Error::InvalidArgument) for a limit order without price
    /// - any error of [`DirectaClient::send`]
    pub async fn place_order(&mut self, request: &OrderRequest) -> Result<Parsed<OrderAck>> {
        let command = request.to_command(OrderId::generate())?;
        let span = self.span().clone();

        async move {
            let reply = self.execute(&command).await?;
            let ack = parse_order_ack(&reply);

            let confirm = match &ack.data {
                Some(data) if data.confirmation_required && self.config().auto_confirm => {
                    Some(data.order_id.clone())
                }
                _ => None,
            };

            match confirm {
                Some(order_id) => {
                    info!(order_id = %order_id, "Confirming order");
                    let reply = self.execute(&Command::ConfirmOrder { order_id }).await?;
                    Ok(parse_order_ack(&reply))
                }
                None => Ok(ack),
            }
        }
        .instrument(span)
        .await
    }

    /// Cancels one order (`REVORD <id>`).
    ///
    /// # Errors
    ///
    /// See [`DirectaClient::send`].
    pub async fn cancel_order(&mut self, order_id: &OrderId) -> Result<Parsed<OrderAck>> {
        let command = Command::CancelOrder {
            order_id: order_id.clone(),
        };
        let reply = self.execute(&command).await?;
        Ok(parse_order_ack(&reply))
    }

    /// Cancels every order on a symbol (`REVALL <symbol>`).
    ///
    /// # Errors
    ///
    /// See [`DirectaClient::send`].
    pub async fn cancel_all(&mut self, symbol: &str) -> Result<Parsed<OrderAck>> {
        let command = Command::CancelAll {
            symbol: symbol.to_string(),
        };
        let reply = self.execute(&command).await?;
        Ok(parse_order_ack(&reply))
    }

    /// Changes the price of a working order (`MODORD`).
    ///
    /// # Errors
    ///
    /// See [`DirectaClient::send`].
    pub async fn modify_order(
        &mut self,
        order_id: &OrderId,
        price: f64,
        signal_price: Option<f64>,
    ) -> Result<Parsed<OrderAck>> {
        let command = Command::ModifyOrder {
            order_id: order_id.clone(),
            price,
            signal_price,
        };
        debug!(command = %command, "Modifying order");
        let reply = self.execute(&command).await?;
        Ok(parse_order_ack(&reply))
    }
}

// ============================================================================
// TradingApi
// ============================================================================

#[async_trait]
impl TradingApi for DirectaClient {
    async fn darwin_status(&mut self) -> Result<Parsed<DarwinStatus>> {
        Ok(self.probe_darwin_status(true).await)
    }

    async fn portfolio(&mut self) -> Result<Parsed<Vec<Position>>> {
        DirectaClient::portfolio(self).await
    }

    async fn account_info(&mut self) -> Result<Parsed<AccountInfo>> {
        DirectaClient::account_info(self).await
    }

    async fn orders(&mut self) -> Result<Parsed<Vec<Order>>> {
        DirectaClient::orders(self).await
    }

    async fn place_order(&mut self, request: OrderRequest) -> Result<Parsed<OrderAck>> {
        DirectaClient::place_order(self, &request).await
    }

    async fn cancel_order(&mut self, order_id: &OrderId) -> Result<Parsed<OrderAck>> {
        DirectaClient::cancel_order(self, order_id).await
    }

    async fn modify_order(
        &mut self,
        order_id: &OrderId,
        price: f64,
        signal_price: Option<f64>,
    ) -> Result<Parsed<OrderAck>> {
        DirectaClient::modify_order(self, order_id, price, signal_price).await
    }
}
