//! Per-account index of resting orders
//!
//! Maps an account to the ids of its resting orders so an individual
//! order can be cancelled without scanning the book. The index stores
//! handles, never order state: the book's sides own the orders, and a
//! handle is resolved against them on access.

use std::collections::BTreeMap;
use types::ids::{AccountId, OrderId};
use types::numeric::Price;
use types::order::Side;

/// Stable reference to a resting order: enough to find it on the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderHandle {
    pub side: Side,
    pub price: Price,
    pub order_id: OrderId,
}

/// Account → (order id → handle) index.
///
/// An order appears here iff it rests on the book and carries an account
/// id; it is removed when cancelled or fully filled.
#[derive(Debug, Clone, Default)]
pub struct AccountIndex {
    accounts: BTreeMap<AccountId, BTreeMap<OrderId, OrderHandle>>,
}

impl AccountIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, acct_id: AccountId, handle: OrderHandle) {
        self.accounts
            .entry(acct_id)
            .or_default()
            .insert(handle.order_id, handle);
    }

    /// Drop one order from an account; the account entry itself is erased
    /// when its last order goes.
    pub fn unregister(&mut self, acct_id: AccountId, order_id: OrderId) -> Option<OrderHandle> {
        let orders = self.accounts.get_mut(&acct_id)?;
        let handle = orders.remove(&order_id);
        if orders.is_empty() {
            self.accounts.remove(&acct_id);
        }
        handle
    }

    /// Handles for one account, ordered by order id.
    pub fn handles(&self, acct_id: AccountId) -> impl Iterator<Item = &OrderHandle> {
        self.accounts
            .get(&acct_id)
            .into_iter()
            .flat_map(|orders| orders.values())
    }

    /// Number of registered orders across all accounts.
    pub fn total_registered(&self) -> usize {
        self.accounts.values().map(|orders| orders.len()).sum()
    }

    pub fn clear(&mut self) {
        self.accounts.clear();
    }
}
