//! Price-time priority matching
//!
//! Executes an incoming order against the opposite side: best price
//! first, FIFO within a level, execution always at the maker's price.
//! Residual disposition is decided by the order's traits. Fully filled
//! makers are dropped from the account index in the same step, so the
//! secondary indices never lag the book.

pub mod crossing;

use std::collections::HashMap;
use tracing::{debug, trace};
use types::errors::BookError;
use types::fill::Fill;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderTraits, Side};

use crate::account::{AccountIndex, OrderHandle};
use crate::book::OneSidedBook;

/// Resting ids across both sides, used to police duplicates and classify
/// wrong-side cancels.
pub(crate) type RestingIds = HashMap<OrderId, Side>;

/// Outcome of a limit execution.
#[derive(Debug)]
pub(crate) struct LimitExecution {
    pub fills: Vec<Fill>,
    pub remaining: Quantity,
    pub rests: bool,
}

/// Outcome of a size-bounded walk.
#[derive(Debug)]
pub(crate) struct WalkOutcome {
    pub fills: Vec<Fill>,
    pub remaining: Quantity,
}

/// Outcome of a funds-bounded walk.
#[derive(Debug)]
pub(crate) struct FundsWalkOutcome {
    pub fills: Vec<Fill>,
    pub unspent: rust_decimal::Decimal,
}

/// Execute an incoming limit order against the opposite side, resting
/// any residual its traits permit.
pub(crate) fn execute_limit(
    own: &mut OneSidedBook,
    opposite: &mut OneSidedBook,
    accounts: &mut AccountIndex,
    resting: &mut RestingIds,
    order: Order,
    traits: OrderTraits,
) -> Result<LimitExecution, BookError> {
    // Post-only guard: with crossing disallowed and strictly better
    // liquidity opposite, the walk is skipped entirely. The order is
    // rejected when the opposite side also holds the exact limit price,
    // and rests unmatched otherwise.
    if !traits.allow_cross {
        if let Some(best) = opposite.best_price() {
            if crossing::strictly_better(order.side, order.price, best) {
                if opposite.contains_level(order.price) {
                    return Err(BookError::TraitViolation(
                        "post-only order would take liquidity".to_string(),
                    ));
                }
                let remaining = order.size;
                rest(own, accounts, resting, order);
                return Ok(LimitExecution {
                    fills: Vec::new(),
                    remaining,
                    rests: true,
                });
            }
        }
    }

    // All-or-none precheck: without enough eligible liquidity the walk
    // never starts, so the book is untouched.
    if traits.all_or_none {
        let available = available_within(opposite, order.price, order.size);
        if available < order.size {
            if traits.immediate_or_cancel {
                debug!(order_id = %order.order_id, "fill-or-kill killed: insufficient liquidity");
                return Ok(LimitExecution {
                    fills: Vec::new(),
                    remaining: order.size,
                    rests: false,
                });
            }
            let remaining = order.size;
            rest(own, accounts, resting, order);
            return Ok(LimitExecution {
                fills: Vec::new(),
                remaining,
                rests: true,
            });
        }
    }

    let WalkOutcome { fills, remaining } = walk(
        opposite,
        accounts,
        resting,
        order.order_id,
        Some(order.price),
        order.size,
    );

    if remaining.is_zero() {
        return Ok(LimitExecution {
            fills,
            remaining,
            rests: false,
        });
    }

    if traits.may_rest() {
        let residual = Order {
            size: remaining,
            ..order
        };
        rest(own, accounts, resting, residual);
        Ok(LimitExecution {
            fills,
            remaining,
            rests: true,
        })
    } else {
        debug!(order_id = %order.order_id, %remaining, "immediate-or-cancel residual discarded");
        Ok(LimitExecution {
            fills,
            remaining,
            rests: false,
        })
    }
}

/// Execute a market order bounded by size: walk the opposite side
/// best-first with no price bound, never rest.
pub(crate) fn execute_market(
    opposite: &mut OneSidedBook,
    accounts: &mut AccountIndex,
    resting: &mut RestingIds,
    taker_id: OrderId,
    size: Quantity,
) -> WalkOutcome {
    walk(opposite, accounts, resting, taker_id, None, size)
}

/// Execute a market order bounded by funds.
///
/// At each head order the affordable quantity is the funds divided by the
/// level price, floored to the size grid. The walk stops when the best
/// level is no longer affordable or the side is empty.
pub(crate) fn execute_market_by_funds(
    opposite: &mut OneSidedBook,
    accounts: &mut AccountIndex,
    resting: &mut RestingIds,
    taker_id: OrderId,
    mut funds: rust_decimal::Decimal,
) -> FundsWalkOutcome {
    let mut fills = Vec::new();

    loop {
        let Some(best) = opposite.best_price() else {
            break;
        };
        let affordable = Quantity::affordable(funds, best);
        if affordable.is_zero() {
            break;
        }
        let Some(mut maker) = opposite.pop_best() else {
            break;
        };

        let traded = affordable.min(maker.size);
        trace!(taker = %taker_id, maker = %maker.order_id, price = %maker.price, size = %traded, "fill");
        fills.push(Fill::new(taker_id, maker.order_id, maker.price, traded));
        funds -= traded * maker.price;
        maker.size -= traded;

        if maker.size.is_zero() {
            drop_filled_maker(accounts, resting, &maker);
        } else {
            opposite.push_front(maker);
        }
    }

    FundsWalkOutcome {
        fills,
        unspent: funds,
    }
}

/// Eligible opposite-side volume at prices crossing `limit`, accumulated
/// best-first and cut off as soon as `need` is covered.
pub(crate) fn available_within(opposite: &OneSidedBook, limit: Price, need: Quantity) -> Quantity {
    let incoming_side = opposite.side().opposite();
    let mut available = Quantity::ZERO;
    for (price, queue) in opposite.iter_from_best() {
        if !crossing::crosses(incoming_side, limit, *price) {
            break;
        }
        available += queue.total_volume();
        if available >= need {
            break;
        }
    }
    available
}

/// Core walk: consume opposite-side heads best-first until the size is
/// exhausted, the price bound stops crossing, or the side empties.
///
/// A partially consumed maker goes back to the head of its queue so its
/// time priority survives. A fully consumed maker is dropped from the
/// account index and the resting-id registry in the same step.
fn walk(
    opposite: &mut OneSidedBook,
    accounts: &mut AccountIndex,
    resting: &mut RestingIds,
    taker_id: OrderId,
    limit: Option<Price>,
    mut remaining: Quantity,
) -> WalkOutcome {
    let incoming_side = opposite.side().opposite();
    let mut fills = Vec::new();

    while !remaining.is_zero() {
        let Some(best) = opposite.best_price() else {
            break;
        };
        if let Some(limit) = limit {
            if !crossing::crosses(incoming_side, limit, best) {
                break;
            }
        }
        let Some(mut maker) = opposite.pop_best() else {
            break;
        };

        let traded = remaining.min(maker.size);
        trace!(taker = %taker_id, maker = %maker.order_id, price = %maker.price, size = %traded, "fill");
        fills.push(Fill::new(taker_id, maker.order_id, maker.price, traded));
        remaining -= traded;
        maker.size -= traded;

        if maker.size.is_zero() {
            drop_filled_maker(accounts, resting, &maker);
        } else {
            opposite.push_front(maker);
        }
    }

    WalkOutcome { fills, remaining }
}

/// Rest an order on its own side and register it in the secondary
/// indices.
fn rest(own: &mut OneSidedBook, accounts: &mut AccountIndex, resting: &mut RestingIds, order: Order) {
    debug!(order_id = %order.order_id, side = %order.side, price = %order.price, size = %order.size, "order resting");
    resting.insert(order.order_id, order.side);
    if let Some(acct_id) = order.acct_id {
        accounts.register(
            acct_id,
            OrderHandle {
                side: order.side,
                price: order.price,
                order_id: order.order_id,
            },
        );
    }
    own.insert(order);
}

fn drop_filled_maker(accounts: &mut AccountIndex, resting: &mut RestingIds, maker: &Order) {
    resting.remove(&maker.order_id);
    if let Some(acct_id) = maker.acct_id {
        accounts.unregister(acct_id, maker.order_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use types::ids::AccountId;

    fn setup() -> (OneSidedBook, OneSidedBook, AccountIndex, RestingIds) {
        (
            OneSidedBook::new(Side::BUY),
            OneSidedBook::new(Side::SELL),
            AccountIndex::new(),
            RestingIds::new(),
        )
    }

    fn seed(
        side_book: &mut OneSidedBook,
        accounts: &mut AccountIndex,
        resting: &mut RestingIds,
        id: u64,
        price: u64,
        size: u64,
    ) {
        let order = Order::new(
            OrderId::new(id),
            Some(AccountId::new(id)),
            side_book.side(),
            Price::from_u64(price),
            Quantity::from_u64(size),
        );
        rest(side_book, accounts, resting, order);
    }

    fn incoming(id: u64, side: Side, price: u64, size: u64) -> Order {
        Order::new(
            OrderId::new(id),
            None,
            side,
            Price::from_u64(price),
            Quantity::from_u64(size),
        )
    }

    #[test]
    fn test_walk_stops_at_price_bound() {
        let (mut bids, mut asks, mut accounts, mut resting) = setup();
        seed(&mut asks, &mut accounts, &mut resting, 1, 100, 5);
        seed(&mut asks, &mut accounts, &mut resting, 2, 103, 5);

        let outcome = execute_limit(
            &mut bids,
            &mut asks,
            &mut accounts,
            &mut resting,
            incoming(10, Side::BUY, 101, 8),
            OrderTraits::IOC,
        )
        .unwrap();

        assert_eq!(outcome.fills.len(), 1);
        assert_eq!(outcome.fills[0].maker_order_id, OrderId::new(1));
        assert_eq!(outcome.remaining, Quantity::from_u64(3));
        assert!(!outcome.rests);
        // the 103 ask is untouched
        assert_eq!(asks.total_volume(), Quantity::from_u64(5));
    }

    #[test]
    fn test_partial_maker_keeps_time_priority() {
        let (mut bids, mut asks, mut accounts, mut resting) = setup();
        seed(&mut asks, &mut accounts, &mut resting, 1, 100, 10);
        seed(&mut asks, &mut accounts, &mut resting, 2, 100, 10);

        let outcome = execute_limit(
            &mut bids,
            &mut asks,
            &mut accounts,
            &mut resting,
            incoming(10, Side::BUY, 100, 4),
            OrderTraits::VANILLA,
        )
        .unwrap();

        assert_eq!(outcome.fills.len(), 1);
        assert!(outcome.remaining.is_zero());
        // maker 1 partially consumed, still at the head
        let head = asks.peek_best().unwrap();
        assert_eq!(head.order_id, OrderId::new(1));
        assert_eq!(head.size, Quantity::from_u64(6));
        // still registered
        assert!(resting.contains_key(&OrderId::new(1)));
        assert_eq!(accounts.total_registered(), 2);
    }

    #[test]
    fn test_filled_maker_leaves_indices() {
        let (mut bids, mut asks, mut accounts, mut resting) = setup();
        seed(&mut asks, &mut accounts, &mut resting, 1, 100, 5);

        let outcome = execute_limit(
            &mut bids,
            &mut asks,
            &mut accounts,
            &mut resting,
            incoming(10, Side::BUY, 100, 5),
            OrderTraits::VANILLA,
        )
        .unwrap();

        assert_eq!(outcome.fills.len(), 1);
        assert!(asks.is_empty());
        assert!(!resting.contains_key(&OrderId::new(1)));
        assert_eq!(accounts.total_registered(), 0);
    }

    #[test]
    fn test_aon_precheck_rests_without_trading() {
        let (mut bids, mut asks, mut accounts, mut resting) = setup();
        seed(&mut asks, &mut accounts, &mut resting, 1, 100, 5);

        // all-or-none but not IOC: too little liquidity, rest whole order
        let traits = OrderTraits {
            all_or_none: true,
            immediate_or_cancel: false,
            allow_cross: true,
        };
        let outcome = execute_limit(
            &mut bids,
            &mut asks,
            &mut accounts,
            &mut resting,
            incoming(10, Side::BUY, 100, 8),
            traits,
        )
        .unwrap();

        assert!(outcome.fills.is_empty());
        assert!(outcome.rests);
        assert_eq!(bids.total_volume(), Quantity::from_u64(8));
        // the ask side is untouched
        assert_eq!(asks.total_volume(), Quantity::from_u64(5));
    }

    #[test]
    fn test_available_within_early_exit() {
        let (_, mut asks, mut accounts, mut resting) = setup();
        seed(&mut asks, &mut accounts, &mut resting, 1, 100, 5);
        seed(&mut asks, &mut accounts, &mut resting, 2, 101, 5);
        seed(&mut asks, &mut accounts, &mut resting, 3, 102, 5);

        // limit 101: only the first two levels are eligible
        let available = available_within(&asks, Price::from_u64(101), Quantity::from_u64(20));
        assert_eq!(available, Quantity::from_u64(10));

        // need covered by the first level alone
        let available = available_within(&asks, Price::from_u64(102), Quantity::from_u64(4));
        assert_eq!(available, Quantity::from_u64(5));
    }

    #[test]
    fn test_post_only_rejects_on_exact_price_liquidity() {
        let (mut bids, mut asks, mut accounts, mut resting) = setup();
        seed(&mut asks, &mut accounts, &mut resting, 1, 99, 5);
        seed(&mut asks, &mut accounts, &mut resting, 2, 100, 5);

        let traits = OrderTraits {
            allow_cross: false,
            ..OrderTraits::VANILLA
        };
        let result = execute_limit(
            &mut bids,
            &mut asks,
            &mut accounts,
            &mut resting,
            incoming(10, Side::BUY, 100, 5),
            traits,
        );
        assert!(matches!(result, Err(BookError::TraitViolation(_))));
        // nothing traded, nothing rested
        assert_eq!(asks.total_volume(), Quantity::from_u64(10));
        assert!(bids.is_empty());
    }

    #[test]
    fn test_post_only_rests_without_exact_price_liquidity() {
        let (mut bids, mut asks, mut accounts, mut resting) = setup();
        seed(&mut asks, &mut accounts, &mut resting, 1, 99, 5);

        let traits = OrderTraits {
            allow_cross: false,
            ..OrderTraits::VANILLA
        };
        let outcome = execute_limit(
            &mut bids,
            &mut asks,
            &mut accounts,
            &mut resting,
            incoming(10, Side::BUY, 100, 5),
            traits,
        )
        .unwrap();

        assert!(outcome.fills.is_empty());
        assert!(outcome.rests);
        assert_eq!(asks.total_volume(), Quantity::from_u64(5));
        assert_eq!(bids.total_volume(), Quantity::from_u64(5));
    }

    #[test]
    fn test_market_by_funds_floors_to_grid() {
        let (_, mut asks, mut accounts, mut resting) = setup();
        seed(&mut asks, &mut accounts, &mut resting, 1, 3, 100);

        let outcome = execute_market_by_funds(
            &mut asks,
            &mut accounts,
            &mut resting,
            OrderId::new(10),
            Decimal::from(10),
        );

        assert_eq!(outcome.fills.len(), 1);
        // 10 / 3 floored to eight decimal places
        assert_eq!(
            outcome.fills[0].size.as_decimal(),
            Decimal::from_str_exact("3.33333333").unwrap()
        );
        // residual funds below one lot at price 3
        assert!(outcome.unspent < Decimal::from(3) && outcome.unspent > Decimal::ZERO);
    }

    #[test]
    fn test_market_by_funds_walks_levels() {
        let (_, mut asks, mut accounts, mut resting) = setup();
        seed(&mut asks, &mut accounts, &mut resting, 1, 100, 1);
        seed(&mut asks, &mut accounts, &mut resting, 2, 200, 1);

        let outcome = execute_market_by_funds(
            &mut asks,
            &mut accounts,
            &mut resting,
            OrderId::new(10),
            Decimal::from(250),
        );

        // fills the whole 100 level, then 0.75 of the 200 level
        assert_eq!(outcome.fills.len(), 2);
        assert_eq!(outcome.fills[0].size, Quantity::from_u64(1));
        assert_eq!(
            outcome.fills[1].size.as_decimal(),
            Decimal::from_str_exact("0.75").unwrap()
        );
        assert_eq!(outcome.unspent, Decimal::ZERO);
        // maker 2 partially consumed and back at the head
        assert_eq!(
            asks.peek_best().unwrap().size.as_decimal(),
            Decimal::from_str_exact("0.25").unwrap()
        );
    }
}
