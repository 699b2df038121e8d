//! Priority-ordered sink for orders that did not rest
//!
//! Holds submissions that could not (fully) rest on the book, e.g.
//! immediate-or-cancel remainders. The matching walk never writes here;
//! the caller inserts candidates after a submit returns and drains them
//! with a filtered pop when dispatching "now matchable" notifications.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};
use std::net::IpAddr;
use types::ids::{AccountId, OrderId};
use types::numeric::{Price, Quantity};
use types::order::Side;

/// One queued notification candidate.
///
/// Entries are ranked best price first, then oldest `created_at`, then
/// smallest order id; `ip` and `port` identify the client to notify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Priority {
    pub size: Quantity,
    pub price: Price,
    pub order_id: OrderId,
    pub acct_id: Option<AccountId>,
    /// Unix nanosecond timestamp of the original submission.
    pub created_at: i64,
    pub ip: IpAddr,
    pub port: u16,
}

type BidRank = (Reverse<Price>, i64, OrderId);
type AskRank = (Price, i64, OrderId);

/// Two priority-sorted sets of unmatched orders, one per side, unique by
/// order id.
#[derive(Debug, Clone, Default)]
pub struct UnmatchedOrderBook {
    bids: BTreeMap<BidRank, Priority>,
    asks: BTreeMap<AskRank, Priority>,
    bid_ids: HashSet<OrderId>,
    ask_ids: HashSet<OrderId>,
}

impl UnmatchedOrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an unmatched order. Returns false without modifying the set
    /// when the id is already present on that side.
    pub fn insert_unmatched(&mut self, side: Side, priority: Priority) -> bool {
        match side {
            Side::BUY => {
                if !self.bid_ids.insert(priority.order_id) {
                    return false;
                }
                let rank = (
                    Reverse(priority.price),
                    priority.created_at,
                    priority.order_id,
                );
                self.bids.insert(rank, priority);
                true
            }
            Side::SELL => {
                if !self.ask_ids.insert(priority.order_id) {
                    return false;
                }
                let rank = (priority.price, priority.created_at, priority.order_id);
                self.asks.insert(rank, priority);
                true
            }
        }
    }

    /// Remove and return the highest-priority entry satisfying the
    /// predicate, walking best price first, then oldest, then smallest id.
    pub fn pop_unmatched_with_filter<F>(&mut self, side: Side, mut predicate: F) -> Option<Priority>
    where
        F: FnMut(&Priority) -> bool,
    {
        match side {
            Side::BUY => {
                let rank = self
                    .bids
                    .iter()
                    .find(|(_, p)| predicate(p))
                    .map(|(rank, _)| *rank)?;
                let priority = self.bids.remove(&rank)?;
                self.bid_ids.remove(&priority.order_id);
                Some(priority)
            }
            Side::SELL => {
                let rank = self
                    .asks
                    .iter()
                    .find(|(_, p)| predicate(p))
                    .map(|(rank, _)| *rank)?;
                let priority = self.asks.remove(&rank)?;
                self.ask_ids.remove(&priority.order_id);
                Some(priority)
            }
        }
    }

    pub fn len(&self, side: Side) -> usize {
        match side {
            Side::BUY => self.bids.len(),
            Side::SELL => self.asks.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}
