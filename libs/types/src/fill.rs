//! Fill records emitted by the matching walk

use crate::ids::OrderId;
use crate::numeric::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One execution between an incoming (taker) order and a resting (maker)
/// order.
///
/// Fills produced by a single submission are ordered by the price-time
/// walk: better maker prices first, FIFO within a price level. The
/// execution price is always the maker's price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub taker_order_id: OrderId,
    pub maker_order_id: OrderId,
    pub price: Price,
    pub size: Quantity,
}

impl Fill {
    pub fn new(taker_order_id: OrderId, maker_order_id: OrderId, price: Price, size: Quantity) -> Self {
        Self {
            taker_order_id,
            maker_order_id,
            price,
            size,
        }
    }

    /// Notional value of the fill (price × size).
    pub fn notional(&self) -> Decimal {
        self.size * self.price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_notional() {
        let fill = Fill::new(
            OrderId::new(2),
            OrderId::new(1),
            Price::from_u64(100),
            Quantity::from_str("0.5").unwrap(),
        );
        assert_eq!(fill.notional(), Decimal::from(50));
    }

    #[test]
    fn test_fill_serialization() {
        let fill = Fill::new(
            OrderId::new(2),
            OrderId::new(1),
            Price::from_str("99.5").unwrap(),
            Quantity::from_u64(4),
        );
        let json = serde_json::to_string(&fill).unwrap();
        let back: Fill = serde_json::from_str(&json).unwrap();
        assert_eq!(fill, back);
    }
}
