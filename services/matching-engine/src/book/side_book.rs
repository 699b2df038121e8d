//! One price-sorted side of the book
//!
//! A BTreeMap from price to [`OrderQueue`] tagged with its side. The best
//! price is the map extremum for that side (maximum for bids, minimum for
//! asks) and is always read from the map, never stored: every operation
//! that can empty a queue erases the level first, so a best-price read
//! never sees a hollow level.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};

use super::order_queue::OrderQueue;

/// Price-indexed map of order queues for a single side.
///
/// Caches the side totals (volume, notional volume, order count); the
/// caches equal the recomputed sums over all queues after every mutation.
#[derive(Debug, Clone)]
pub struct OneSidedBook {
    side: Side,
    levels: BTreeMap<Price, OrderQueue>,
    total_volume: Quantity,
    total_volume_funds: Decimal,
    num_orders: usize,
}

impl OneSidedBook {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
            total_volume: Quantity::ZERO,
            total_volume_funds: Decimal::ZERO,
            num_orders: 0,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Append an order to the queue at its price, creating the level if
    /// absent.
    pub fn insert(&mut self, order: Order) {
        debug_assert_eq!(order.side, self.side);
        self.total_volume += order.size;
        self.total_volume_funds += order.size * order.price;
        self.num_orders += 1;
        self.levels
            .entry(order.price)
            .or_insert_with(OrderQueue::new)
            .push_back(order);
    }

    /// Return a partially consumed order to the head of its level,
    /// recreating the level if the walk just emptied it.
    pub fn push_front(&mut self, order: Order) {
        debug_assert_eq!(order.side, self.side);
        self.total_volume += order.size;
        self.total_volume_funds += order.size * order.price;
        self.num_orders += 1;
        self.levels
            .entry(order.price)
            .or_insert_with(OrderQueue::new)
            .push_front(order);
    }

    /// Remove an order by price and id.
    ///
    /// The level is erased when the removal empties it.
    pub fn remove(&mut self, price: Price, order_id: &OrderId) -> Option<Order> {
        let queue = self.levels.get_mut(&price)?;
        let order = queue.pop_by_id(order_id)?;
        if queue.is_empty() {
            self.levels.remove(&price);
        }
        self.total_volume -= order.size;
        self.total_volume_funds -= order.size * order.price;
        self.num_orders -= 1;
        Some(order)
    }

    /// Best price for this side: highest bid, lowest ask.
    pub fn best_price(&self) -> Option<Price> {
        match self.side {
            Side::BUY => self.levels.keys().next_back().copied(),
            Side::SELL => self.levels.keys().next().copied(),
        }
    }

    /// Head order of the best level.
    pub fn peek_best(&self) -> Option<&Order> {
        let best = self.best_price()?;
        self.levels.get(&best)?.front()
    }

    /// Pop the head order of the best level, erasing the level if that
    /// empties it.
    pub fn pop_best(&mut self) -> Option<Order> {
        let best = self.best_price()?;
        let queue = self.levels.get_mut(&best)?;
        let order = queue.pop_front()?;
        if queue.is_empty() {
            self.levels.remove(&best);
        }
        self.total_volume -= order.size;
        self.total_volume_funds -= order.size * order.price;
        self.num_orders -= 1;
        Some(order)
    }

    pub fn get(&self, price: Price, order_id: &OrderId) -> Option<&Order> {
        self.levels.get(&price)?.get(order_id)
    }

    pub fn contains_level(&self, price: Price) -> bool {
        self.levels.contains_key(&price)
    }

    /// Sum of resting sizes on this side.
    pub fn total_volume(&self) -> Quantity {
        self.total_volume
    }

    /// Sum of price × size over all resting orders.
    pub fn total_volume_funds(&self) -> Decimal {
        self.total_volume_funds
    }

    pub fn num_orders(&self) -> usize {
        self.num_orders
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Iterate levels best-first: descending prices for bids, ascending
    /// for asks.
    pub fn iter_from_best(&self) -> impl Iterator<Item = (&Price, &OrderQueue)> {
        let iter: Box<dyn Iterator<Item = (&Price, &OrderQueue)> + '_> = match self.side {
            Side::BUY => Box::new(self.levels.iter().rev()),
            Side::SELL => Box::new(self.levels.iter()),
        };
        iter
    }

    /// Top `levels` price levels as (price, volume, order count),
    /// best-first.
    pub fn depth(&self, levels: usize) -> Vec<(Price, Quantity, usize)> {
        self.iter_from_best()
            .take(levels)
            .map(|(price, queue)| (*price, queue.total_volume(), queue.len()))
            .collect()
    }

    /// Remove and return every resting order, best level first and FIFO
    /// within each level.
    pub fn drain(&mut self) -> Vec<Order> {
        let mut orders = Vec::with_capacity(self.num_orders);
        let prices: Vec<Price> = match self.side {
            Side::BUY => self.levels.keys().rev().copied().collect(),
            Side::SELL => self.levels.keys().copied().collect(),
        };
        for price in prices {
            if let Some(mut queue) = self.levels.remove(&price) {
                while let Some(order) = queue.pop_front() {
                    orders.push(order);
                }
            }
        }
        self.total_volume = Quantity::ZERO;
        self.total_volume_funds = Decimal::ZERO;
        self.num_orders = 0;
        orders
    }
}
