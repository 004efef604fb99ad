//! In-memory trading simulator.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use chrono::Local;
use rustc_hash::FxHashMap;
use tracing::{info, warn};

use crate::api::{OrderRequest, TradingApi};
use crate::error::{Error, Result};
use crate::health::HealthTracker;
use crate::identifiers::OrderId;
use crate::parser::{
    AccountInfo, DarwinStatus, DarwinStatusParser, Order, OrderAck, Parsed, Position,
    StatusParser, parse_account_info, parse_order_ack, parse_orders, parse_portfolio,
};
use crate::protocol::{Command, ConnectionStatus, Side};

use super::book::{SimAccount, SimOrder, SimOrderStatus, SimPosition};

// ============================================================================
// Constants
// ============================================================================

/// Status line reported by the simulator.
const SIMULATED_STATUS: &str = "DARWIN_STATUS;CONN_OK;TRUE;Release 2.5.1 build SIMULATION more info at http://app1.directatrading.com/trading-api-directa/index.html";

/// Error line for an empty portfolio.
const NO_POSITIONS: &str = "ERR;N/A;1018";

/// Error line for an empty order list.
const NO_ORDERS: &str = "ERR;N/A;1019";

/// Error line for an unknown order.
const ORDER_NOT_FOUND: &str = "ERR;N/A;1020";

fn now() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

// ============================================================================
// Simulator
// ============================================================================

/// In-memory stand-in for the live client.
///
/// No order is ever sent anywhere. Fills happen only through
/// [`Simulator::execute_order`].
#[derive(Debug)]
pub struct Simulator {
    account: SimAccount,
    positions: Vec<SimPosition>,
    orders: Vec<SimOrder>,
    index: FxHashMap<OrderId, usize>,
    health: HealthTracker,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Simulator - State
// ============================================================================

impl Simulator {
    /// Creates a simulator with the default account and nothing else.
    #[must_use]
    pub fn new() -> Self {
        warn!("SIMULATION MODE ACTIVE - No real trading will occur");

        let mut health = HealthTracker::new();
        health.set_status(ConnectionStatus::ConnOk);

        Self {
            account: SimAccount::default(),
            positions: Vec::new(),
            orders: Vec::new(),
            index: FxHashMap::default(),
            health,
        }
    }

    /// Simulated account.
    #[inline]
    #[must_use]
    pub fn account(&self) -> &SimAccount {
        &self.account
    }

    /// Simulated positions, in insertion order.
    #[inline]
    #[must_use]
    pub fn positions(&self) -> &[SimPosition] {
        &self.positions
    }

    /// Simulated orders, in placement order.
    #[inline]
    #[must_use]
    pub fn orders(&self) -> &[SimOrder] {
        &self.orders
    }

    /// Looks up an order.
    #[must_use]
    pub fn order(&self, order_id: &OrderId) -> Option<&SimOrder> {
        self.index.get(order_id).map(|&at| &self.orders[at])
    }

    fn order_mut(&mut self, order_id: &OrderId) -> Option<&mut SimOrder> {
        let at = *self.index.get(order_id)?;
        self.orders.get_mut(at)
    }

    /// Adds shares to a position, creating it if needed.
    ///
    /// On an existing position the average price is replaced only when
    /// `quantity` is positive; the gain is always replaced.
    pub fn add_position(&mut self, symbol: &str, quantity: i64, avg_price: f64, gain: f64) {
        if let Some(position) = self.positions.iter_mut().find(|p| p.symbol == symbol) {
            position.quantity += quantity;
            if quantity > 0 {
                position.avg_price = avg_price;
            }
            position.gain = gain;
            info!(symbol, quantity = position.quantity, "Updated simulated position");
            return;
        }

        self.positions.push(SimPosition {
            symbol: symbol.to_string(),
            quantity,
            avg_price,
            gain,
        });
        info!(symbol, quantity, "Added simulated position");
    }

    /// Removes a position. Returns `false` if it did not exist.
    pub fn remove_position(&mut self, symbol: &str) -> bool {
        let before = self.positions.len();
        self.positions.retain(|p| p.symbol != symbol);

        if self.positions.len() < before {
            info!(symbol, "Removed simulated position");
            true
        } else {
            warn!(symbol, "Attempted to remove non-existent position");
            false
        }
    }

    /// Overwrites liquidity and/or equity.
    pub fn update_account(&mut self, liquidity: Option<f64>, equity: Option<f64>) {
        if let Some(liquidity) = liquidity {
            self.account.liquidity = liquidity;
        }
        if let Some(equity) = equity {
            self.account.equity = equity;
        }
        info!(
            liquidity = self.account.liquidity,
            equity = self.account.equity,
            "Updated simulated account"
        );
    }

    /// Fills an order.
    ///
    /// `price` and `quantity` default to the order's own. A buy adds to the
    /// position and debits liquidity; a sell reduces the position (removing
    /// it when emptied) and credits liquidity.
    ///
    /// # Errors
    ///
    /// - [`Error::OrderNotFound`] if the order does not exist
    /// - [`Error::InvalidArgument`] if neither the call nor the order has a
    ///   price, or the quantity does not fit a position
    ///
    /// On error the order and the book are left untouched.
    pub fn execute_order(
        &mut self,
        order_id: &OrderId,
        price: Option<f64>,
        quantity: Option<u64>,
    ) -> Result<()> {
        let Some(order) = self.order_mut(order_id) else {
            warn!(order_id = %order_id, "Attempted to execute non-existent order");
            return Err(Error::order_not_found(order_id.clone()));
        };

        let exec_price = price.or(order.price).ok_or_else(|| {
            Error::invalid_argument(format!("no execution price for market order {order_id}"))
        })?;
        let exec_quantity = quantity.unwrap_or(order.quantity);
        let shares = i64::try_from(exec_quantity)
            .map_err(|_| Error::invalid_argument(format!("quantity too large: {exec_quantity}")))?;

        order.status = SimOrderStatus::Executed;
        order.executed_price = Some(exec_price);
        order.executed_quantity = Some(exec_quantity);
        let symbol = order.symbol.clone();
        let side = order.side;

        let amount = exec_price * exec_quantity as f64;

        match side {
            Side::Buy => {
                self.add_position(&symbol, shares, exec_price, 0.0);
                self.update_account(Some(self.account.liquidity - amount), None);
            }
            Side::Sell => {
                self.reduce_position(&symbol, shares);
                self.update_account(Some(self.account.liquidity + amount), None);
            }
        }

        info!(order_id = %order_id, quantity = exec_quantity, price = exec_price, "Simulated execution");
        Ok(())
    }

    fn reduce_position(&mut self, symbol: &str, shares: i64) {
        let Some(position) = self.positions.iter_mut().find(|p| p.symbol == symbol) else {
            warn!(symbol, "Selling shares not in portfolio");
            return;
        };

        if position.quantity < shares {
            warn!(
                symbol,
                selling = shares,
                held = position.quantity,
                "Selling more shares than in portfolio"
            );
            return;
        }

        position.quantity -= shares;
        if position.quantity <= 0 {
            self.remove_position(symbol);
        }
    }
}

// ============================================================================
// Simulator - Commands
// ============================================================================

impl Simulator {
    /// Platform status: always `CONN_OK`, flagged as simulated.
    #[must_use]
    pub fn darwin_status(&self) -> Parsed<DarwinStatus> {
        let metrics = self.health.metrics();
        DarwinStatusParser
            .parse(SIMULATED_STATUS, Some(&metrics))
            .map(|status| DarwinStatus {
                simulation: true,
                ..status
            })
    }

    /// Portfolio positions, `ERR 1018` when empty.
    #[must_use]
    pub fn portfolio(&self) -> Parsed<Vec<Position>> {
        if self.positions.is_empty() {
            return parse_portfolio(NO_POSITIONS);
        }

        let time = now();
        let reply = self
            .positions
            .iter()
            .map(|position| position.wire_line(&time))
            .collect::<Vec<_>>()
            .join("\n");
        parse_portfolio(&reply)
    }

    /// Account summary.
    #[must_use]
    pub fn account_info(&self) -> Parsed<AccountInfo> {
        parse_account_info(&self.account.wire_line(&now()))
    }

    /// All orders, `ERR 1019` when none.
    #[must_use]
    pub fn order_list(&self) -> Parsed<Vec<Order>> {
        if self.orders.is_empty() {
            return parse_orders(NO_ORDERS);
        }

        let reply = self
            .orders
            .iter()
            .map(SimOrder::wire_line)
            .collect::<Vec<_>>()
            .join("\n");
        parse_orders(&reply)
    }

    /// Records a new pending order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a limit order without price.
    pub fn place_order(&mut self, request: &OrderRequest) -> Result<Parsed<OrderAck>> {
        let order_id = OrderId::generate();
        let command = request.to_command(order_id.clone())?;

        let order = SimOrder {
            order_id: order_id.clone(),
            symbol: request.symbol.clone(),
            side: request.side,
            quantity: request.quantity,
            price: request.wire_price()?,
            signal_price: None,
            order_type: request.order_type,
            status: SimOrderStatus::Pending,
            time: now(),
            executed_price: None,
            executed_quantity: None,
        };
        let reply = order.ack_line("SENT", "SIMREF001", &command.to_string());

        self.index.insert(order_id, self.orders.len());
        self.orders.push(order);
        Ok(parse_order_ack(&reply))
    }

    /// Marks an order cancelled, `ERR 1020` when unknown.
    #[must_use]
    pub fn cancel_order(&mut self, order_id: &OrderId) -> Parsed<OrderAck> {
        match self.order_mut(order_id) {
            Some(order) => {
                order.status = SimOrderStatus::Cancelled;
                parse_order_ack(&order.cancel_line())
            }
            None => parse_order_ack(ORDER_NOT_FOUND),
        }
    }

    /// Reprices a pending order, `ERR 1020` when unknown or no longer pending.
    #[must_use]
    pub fn modify_order(
        &mut self,
        order_id: &OrderId,
        price: f64,
        signal_price: Option<f64>,
    ) -> Parsed<OrderAck> {
        let command = Command::ModifyOrder {
            order_id: order_id.clone(),
            price,
            signal_price,
        };

        match self.order_mut(order_id) {
            Some(order) if order.status == SimOrderStatus::Pending => {
                order.price = Some(price);
                order.signal_price = signal_price;
                parse_order_ack(&order.ack_line("MODIFIED", "SIMREF003", &command.to_string()))
            }
            _ => parse_order_ack(ORDER_NOT_FOUND),
        }
    }
}

// ============================================================================
// TradingApi
// ============================================================================

#[async_trait]
impl TradingApi for Simulator {
    async fn darwin_status(&mut self) -> Result<Parsed<DarwinStatus>> {
        Ok(Simulator::darwin_status(self))
    }

    async fn portfolio(&mut self) -> Result<Parsed<Vec<Position>>> {
        Ok(Simulator::portfolio(self))
    }

    async fn account_info(&mut self) -> Result<Parsed<AccountInfo>> {
        Ok(Simulator::account_info(self))
    }

    async fn orders(&mut self) -> Result<Parsed<Vec<Order>>> {
        Ok(self.order_list())
    }

    async fn place_order(&mut self, request: OrderRequest) -> Result<Parsed<OrderAck>> {
        Simulator::place_order(self, &request)
    }

    async fn cancel_order(&mut self, order_id: &OrderId) -> Result<Parsed<OrderAck>> {
        Ok(Simulator::cancel_order(self, order_id))
    }

    async fn modify_order(
        &mut self,
        order_id: &OrderId,
        price: f64,
        signal_price: Option<f64>,
    ) -> Result<Parsed<OrderAck>> {
        Ok(Simulator::modify_order(self, order_id, price, signal_price))
    }
}

// ============================================================================
// Tests
// ============================================================================
