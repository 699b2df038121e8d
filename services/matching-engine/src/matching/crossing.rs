//! Crossing predicates
//!
//! Price eligibility checks between an incoming order and a resting
//! level on the opposite side.

use types::numeric::Price;
use types::order::Side;

/// True when an incoming order at `incoming_price` may trade against a
/// resting level at `resting_price`.
///
/// A buy crosses a sell when bid >= ask; a sell crosses a buy when
/// ask <= bid.
pub fn crosses(incoming_side: Side, incoming_price: Price, resting_price: Price) -> bool {
    match incoming_side {
        Side::BUY => incoming_price >= resting_price,
        Side::SELL => incoming_price <= resting_price,
    }
}

/// True when the resting level's price is strictly better than the
/// incoming limit, from the incoming order's point of view.
///
/// For a buy that means a resting ask below the limit; for a sell, a
/// resting bid above it.
pub fn strictly_better(incoming_side: Side, incoming_price: Price, resting_price: Price) -> bool {
    match incoming_side {
        Side::BUY => resting_price < incoming_price,
        Side::SELL => resting_price > incoming_price,
    }
}
