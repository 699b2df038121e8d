//! Order, side, and execution-trait types

use crate::ids::{AccountId, OrderId};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    BUY,
    /// Sell order (ask)
    SELL,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::BUY => Side::SELL,
            Side::SELL => Side::BUY,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::BUY => write!(f, "BUY"),
            Side::SELL => write!(f, "SELL"),
        }
    }
}

/// Execution traits attached to a submitted order.
///
/// Three independent flags; the common policies are exposed as the
/// [`VANILLA`](Self::VANILLA), [`IOC`](Self::IOC) and [`FOK`](Self::FOK)
/// constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderTraits {
    /// Execute the full size or nothing at all.
    pub all_or_none: bool,
    /// Never rest on the book; unexecuted remainder is discarded.
    pub immediate_or_cancel: bool,
    /// Permit the order to trade against the opposite side. When false the
    /// order is post-only.
    pub allow_cross: bool,
}

impl OrderTraits {
    /// Default policy: may partial-fill, may rest.
    pub const VANILLA: Self = Self {
        all_or_none: false,
        immediate_or_cancel: false,
        allow_cross: true,
    };

    /// Immediate-or-cancel: execute what is possible now, discard the rest.
    pub const IOC: Self = Self {
        all_or_none: false,
        immediate_or_cancel: true,
        allow_cross: true,
    };

    /// Fill-or-kill: execute the entire size atomically or not at all.
    pub const FOK: Self = Self {
        all_or_none: true,
        immediate_or_cancel: true,
        allow_cross: true,
    };

    /// Full size atomically or zero fills.
    pub fn is_fill_or_kill(&self) -> bool {
        self.all_or_none && self.immediate_or_cancel
    }

    /// An unexecuted remainder may rest on the book.
    pub fn may_rest(&self) -> bool {
        !self.immediate_or_cancel
    }

    /// The order may execute for less than its full size.
    pub fn may_partial_fill(&self) -> bool {
        !self.all_or_none
    }
}

impl Default for OrderTraits {
    fn default() -> Self {
        Self::VANILLA
    }
}

/// A limit order, either resting on the book or in flight through the
/// matching walk.
///
/// A resting order always has `size > 0`; the size is decremented only by
/// a match or a cancel, and the order is removed when it reaches zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub acct_id: Option<AccountId>,
    pub side: Side,
    pub price: Price,
    pub size: Quantity,
}

impl Order {
    pub fn new(
        order_id: OrderId,
        acct_id: Option<AccountId>,
        side: Side,
        price: Price,
        size: Quantity,
    ) -> Self {
        Self {
            order_id,
            acct_id,
            side,
            price,
            size,
        }
    }
}
