//! Order book facade
//!
//! Composes the two sides, the account index, and the resting-id
//! registry behind the submit/cancel/query API. Every operation is an
//! atomic transaction: validation happens before matching begins, so a
//! rejected submission leaves the book untouched.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use types::errors::BookError;
use types::fill::Fill;
use types::ids::{AccountId, OrderId};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderTraits, Side};

use crate::account::AccountIndex;
use crate::book::OneSidedBook;
use crate::matching;

/// Result of a limit order submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitOrderResult {
    /// Executions in walk order (best maker price first, FIFO within).
    pub fills: Vec<Fill>,
    /// Size left unexecuted after the walk.
    pub residual_size: Quantity,
    /// Whether the residual now rests on the book.
    pub residual_rests: bool,
}

/// Result of a size-bounded market order submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOrderResult {
    pub fills: Vec<Fill>,
    pub unfilled_size: Quantity,
}

/// Result of a funds-bounded market order submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundsOrderResult {
    pub fills: Vec<Fill>,
    pub unfilled_funds: Decimal,
}

/// One price level in a depth snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub price: Price,
    pub volume: Quantity,
    pub num_orders: usize,
}

/// Top-of-book depth snapshot, best levels first on both sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthInfo {
    pub bids: Vec<LevelInfo>,
    pub asks: Vec<LevelInfo>,
}

/// Limit order book for a single instrument.
///
/// Single-threaded by design: callers wanting concurrency serialize
/// mutations through one owning thread or a lock around the whole book.
#[derive(Debug, Clone)]
pub struct OrderBook {
    bids: OneSidedBook,
    asks: OneSidedBook,
    accounts: AccountIndex,
    resting: HashMap<OrderId, Side>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self {
            bids: OneSidedBook::new(Side::BUY),
            asks: OneSidedBook::new(Side::SELL),
            accounts: AccountIndex::new(),
            resting: HashMap::new(),
        }
    }

    /// Submit a limit order.
    ///
    /// The order is matched against the opposite side under price-time
    /// priority; a residual rests on its own side if the traits permit.
    pub fn submit_limit_order(
        &mut self,
        side: Side,
        size: Decimal,
        price: Decimal,
        order_id: OrderId,
        traits: OrderTraits,
        acct_id: Option<AccountId>,
    ) -> Result<LimitOrderResult, BookError> {
        let price = validate_price(price)?;
        let size = validate_size(size)?;
        self.check_new_id(order_id)?;
        debug!(%order_id, %side, %price, %size, "limit order submitted");

        let order = Order::new(order_id, acct_id, side, price, size);
        let Self {
            bids,
            asks,
            accounts,
            resting,
        } = self;
        let (own, opposite) = match side {
            Side::BUY => (bids, asks),
            Side::SELL => (asks, bids),
        };
        let execution = matching::execute_limit(own, opposite, accounts, resting, order, traits)?;
        Ok(LimitOrderResult {
            fills: execution.fills,
            residual_size: execution.remaining,
            residual_rests: execution.rests,
        })
    }

    /// Submit a market order bounded by size. Never rests; any remainder
    /// after the opposite side empties is reported back.
    pub fn submit_market_order(
        &mut self,
        side: Side,
        size: Decimal,
        order_id: OrderId,
        acct_id: Option<AccountId>,
    ) -> Result<MarketOrderResult, BookError> {
        let size = validate_size(size)?;
        self.check_new_id(order_id)?;
        debug!(%order_id, %side, %size, acct = ?acct_id, "market order submitted");

        let Self {
            bids,
            asks,
            accounts,
            resting,
        } = self;
        let opposite = match side {
            Side::BUY => asks,
            Side::SELL => bids,
        };
        let outcome = matching::execute_market(opposite, accounts, resting, order_id, size);
        Ok(MarketOrderResult {
            fills: outcome.fills,
            unfilled_size: outcome.remaining,
        })
    }

    /// Submit a market order bounded by funds: buy (or sell) as much as
    /// the given notional allows, walking the opposite side best-first.
    pub fn submit_market_order_by_funds(
        &mut self,
        side: Side,
        funds: Decimal,
        order_id: OrderId,
        acct_id: Option<AccountId>,
    ) -> Result<FundsOrderResult, BookError> {
        if funds <= Decimal::ZERO {
            return Err(BookError::InvalidSize(funds.to_string()));
        }
        self.check_new_id(order_id)?;
        debug!(%order_id, %side, %funds, acct = ?acct_id, "market order by funds submitted");

        let Self {
            bids,
            asks,
            accounts,
            resting,
        } = self;
        let opposite = match side {
            Side::BUY => asks,
            Side::SELL => bids,
        };
        let outcome =
            matching::execute_market_by_funds(opposite, accounts, resting, order_id, funds);
        Ok(FundsOrderResult {
            fills: outcome.fills,
            unfilled_funds: outcome.unspent,
        })
    }

    /// Cancel a resting order.
    ///
    /// Side and price are required because the book is not globally
    /// indexed by order id. Cancelling an id that was already filled or
    /// cancelled returns `UnknownOrder`.
    pub fn cancel_order(
        &mut self,
        order_id: OrderId,
        side: Side,
        price: Decimal,
        acct_id: Option<AccountId>,
    ) -> Result<Order, BookError> {
        let price = validate_price(price)?;
        match self.resting.get(&order_id) {
            None => return Err(BookError::UnknownOrder { order_id }),
            Some(actual) if *actual != side => {
                return Err(BookError::SideMismatch {
                    order_id,
                    requested: side,
                    actual: *actual,
                });
            }
            Some(_) => {}
        }

        let book = match side {
            Side::BUY => &mut self.bids,
            Side::SELL => &mut self.asks,
        };
        let order = book
            .remove(price, &order_id)
            .ok_or(BookError::UnknownOrder { order_id })?;
        self.resting.remove(&order_id);
        if let Some(acct) = order.acct_id.or(acct_id) {
            self.accounts.unregister(acct, order_id);
        }
        debug!(%order_id, %side, %price, "order cancelled");
        Ok(order)
    }

    /// Remove every resting order, returning them bids first (best
    /// level first, FIFO within), then asks likewise.
    pub fn clear_book(&mut self) -> Vec<Order> {
        let mut orders = self.bids.drain();
        orders.extend(self.asks.drain());
        self.accounts.clear();
        self.resting.clear();
        debug!(removed = orders.len(), "book cleared");
        orders
    }

    /// Best bid and best ask.
    pub fn best_bid_ask(&self) -> (Option<Price>, Option<Price>) {
        (self.bids.best_price(), self.asks.best_price())
    }

    /// Total resting size per side.
    pub fn volume_bid_ask(&self) -> (Quantity, Quantity) {
        (self.bids.total_volume(), self.asks.total_volume())
    }

    /// Total resting notional (price × size) per side.
    pub fn funds_volume_bid_ask(&self) -> (Decimal, Decimal) {
        (self.bids.total_volume_funds(), self.asks.total_volume_funds())
    }

    /// Resting order count per side.
    pub fn n_orders_bid_ask(&self) -> (usize, usize) {
        (self.bids.num_orders(), self.asks.num_orders())
    }

    /// Per-side (price, volume, order count) for the top `levels` price
    /// levels.
    pub fn book_depth_info(&self, levels: usize) -> DepthInfo {
        let to_info = |(price, volume, num_orders): (Price, Quantity, usize)| LevelInfo {
            price,
            volume,
            num_orders,
        };
        DepthInfo {
            bids: self.bids.depth(levels).into_iter().map(to_info).collect(),
            asks: self.asks.depth(levels).into_iter().map(to_info).collect(),
        }
    }

    /// Resting orders for one account, ordered by order id. Sizes
    /// reflect partial fills because the handles resolve against the
    /// live book state.
    pub fn get_account(&self, acct_id: AccountId) -> Vec<Order> {
        self.accounts
            .handles(acct_id)
            .filter_map(|handle| {
                let book = match handle.side {
                    Side::BUY => &self.bids,
                    Side::SELL => &self.asks,
                };
                book.get(handle.price, &handle.order_id).cloned()
            })
            .collect()
    }

    /// All resting orders, bids first (best level first, FIFO within),
    /// then asks likewise.
    pub fn resting_orders(&self) -> impl Iterator<Item = &Order> {
        self.bids
            .iter_from_best()
            .flat_map(|(_, queue)| queue.iter())
            .chain(
                self.asks
                    .iter_from_best()
                    .flat_map(|(_, queue)| queue.iter()),
            )
    }

    /// Number of orders registered in the account index, across all
    /// accounts.
    pub fn n_account_orders(&self) -> usize {
        self.accounts.total_registered()
    }

    fn check_new_id(&self, order_id: OrderId) -> Result<(), BookError> {
        if self.resting.contains_key(&order_id) {
            return Err(BookError::DuplicateOrderId { order_id });
        }
        Ok(())
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_price(price: Decimal) -> Result<Price, BookError> {
    Price::try_new(price).ok_or_else(|| BookError::InvalidPrice(price.to_string()))
}

fn validate_size(size: Decimal) -> Result<Quantity, BookError> {
    if size <= Decimal::ZERO {
        return Err(BookError::InvalidSize(size.to_string()));
    }
    Ok(Quantity::new(size))
}
