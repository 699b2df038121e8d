//! Error taxonomy for book operations

use crate::ids::OrderId;
use crate::order::Side;
use thiserror::Error;

/// Errors surfaced by order book operations.
///
/// Submissions never partially apply on error: the input is rejected
/// before any matching begins, or every produced fill is final. A
/// fill-or-kill submission that finds insufficient liquidity is a normal
/// zero-fill return, not an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookError {
    #[error("duplicate order id: {order_id}")]
    DuplicateOrderId { order_id: OrderId },

    #[error("unknown order: {order_id}")]
    UnknownOrder { order_id: OrderId },

    #[error("invalid price: {0}")]
    InvalidPrice(String),

    #[error("invalid size: {0}")]
    InvalidSize(String),

    #[error("order {order_id} rests on the {actual} side, not {requested}")]
    SideMismatch {
        order_id: OrderId,
        requested: Side,
        actual: Side,
    },

    #[error("order traits forbid execution: {0}")]
    TraitViolation(String),
}
