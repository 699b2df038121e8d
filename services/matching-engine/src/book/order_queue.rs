//! FIFO order queue at a single price
//!
//! All orders resting at one price point, in arrival order. Time priority
//! within a level is exactly queue order: the head trades first.

use std::collections::VecDeque;
use types::ids::OrderId;
use types::numeric::Quantity;
use types::order::Order;

/// FIFO queue of orders at one price, with a cached aggregate size.
///
/// The cached volume equals the recomputed sum after every mutation; the
/// order count is the queue length.
#[derive(Debug, Clone)]
pub struct OrderQueue {
    orders: VecDeque<Order>,
    total_volume: Quantity,
}

impl OrderQueue {
    pub fn new() -> Self {
        Self {
            orders: VecDeque::new(),
            total_volume: Quantity::ZERO,
        }
    }

    /// Append an order at the tail (latest time priority).
    pub fn push_back(&mut self, order: Order) {
        self.total_volume += order.size;
        self.orders.push_back(order);
    }

    /// Return an order to the head of the queue.
    ///
    /// Used to put a partially consumed counterparty back in first
    /// position, preserving its time priority.
    pub fn push_front(&mut self, order: Order) {
        self.total_volume += order.size;
        self.orders.push_front(order);
    }

    /// Pop the order with the best time priority.
    pub fn pop_front(&mut self) -> Option<Order> {
        let order = self.orders.pop_front()?;
        self.total_volume -= order.size;
        Some(order)
    }

    /// Remove an order by id, wherever it sits in the queue. O(len).
    pub fn pop_by_id(&mut self, order_id: &OrderId) -> Option<Order> {
        let position = self.orders.iter().position(|o| &o.order_id == order_id)?;
        let order = self.orders.remove(position)?;
        self.total_volume -= order.size;
        Some(order)
    }

    pub fn get(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| &o.order_id == order_id)
    }

    pub fn front(&self) -> Option<&Order> {
        self.orders.front()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Sum of the sizes of all queued orders.
    pub fn total_volume(&self) -> Quantity {
        self.total_volume
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }
}

impl Default for OrderQueue {
    fn default() -> Self {
        Self::new()
    }
}
