//! CSV snapshot of resting orders
//!
//! Serializes every resting order as one line:
//!
//! ```text
//! LMT,<order_id>,OrderSide(Buy|Sell),<size>,<price>,<acct_id>
//! ```
//!
//! A missing account id renders as an empty field. Lines are emitted
//! bids first (best level first, FIFO within), then asks likewise, so a
//! snapshot of the same book state is byte-identical across runs.

use std::io::{self, Write};
use types::order::{Order, Side};

use crate::orderbook::OrderBook;

fn side_label(side: Side) -> &'static str {
    match side {
        Side::BUY => "OrderSide(Buy)",
        Side::SELL => "OrderSide(Sell)",
    }
}

fn order_line(order: &Order) -> String {
    let acct = order
        .acct_id
        .map(|acct| acct.to_string())
        .unwrap_or_default();
    format!(
        "LMT,{},{},{},{},{}",
        order.order_id,
        side_label(order.side),
        order.size,
        order.price,
        acct
    )
}

/// Render the book's resting orders as a CSV string.
pub fn to_csv_string(book: &OrderBook) -> String {
    let mut out = String::new();
    for order in book.resting_orders() {
        out.push_str(&order_line(order));
        out.push('\n');
    }
    out
}

/// Write the book's resting orders as CSV to any writer.
pub fn write_csv<W: Write>(book: &OrderBook, writer: &mut W) -> io::Result<()> {
    for order in book.resting_orders() {
        writeln!(writer, "{}", order_line(order))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use types::ids::{AccountId, OrderId};
    use types::order::OrderTraits;

    #[test]
    fn test_csv_line_format() {
        let mut book = OrderBook::new();
        book.submit_limit_order(
            Side::BUY,
            Decimal::from(10),
            Decimal::from(100),
            OrderId::new(1),
            OrderTraits::VANILLA,
            Some(AccountId::new(7)),
        )
        .unwrap();
        book.submit_limit_order(
            Side::SELL,
            Decimal::from_str_exact("2.5").unwrap(),
            Decimal::from_str_exact("105.25").unwrap(),
            OrderId::new(2),
            OrderTraits::VANILLA,
            None,
        )
        .unwrap();

        let csv = to_csv_string(&book);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "LMT,1,OrderSide(Buy),10,100,7");
        assert_eq!(lines[1], "LMT,2,OrderSide(Sell),2.5,105.25,");
    }

    #[test]
    fn test_csv_orders_bids_best_first() {
        let mut book = OrderBook::new();
        book.submit_limit_order(
            Side::BUY,
            Decimal::from(1),
            Decimal::from(99),
            OrderId::new(1),
            OrderTraits::VANILLA,
            None,
        )
        .unwrap();
        book.submit_limit_order(
            Side::BUY,
            Decimal::from(1),
            Decimal::from(101),
            OrderId::new(2),
            OrderTraits::VANILLA,
            None,
        )
        .unwrap();

        let csv = to_csv_string(&book);
        let lines: Vec<&str> = csv.lines().collect();
        assert!(lines[0].starts_with("LMT,2,"));
        assert!(lines[1].starts_with("LMT,1,"));
    }

    #[test]
    fn test_write_csv_matches_string() {
        let mut book = OrderBook::new();
        book.submit_limit_order(
            Side::SELL,
            Decimal::from(4),
            Decimal::from(100),
            OrderId::new(1),
            OrderTraits::VANILLA,
            None,
        )
        .unwrap();

        let mut buf = Vec::new();
        write_csv(&book, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), to_csv_string(&book));
    }

    #[test]
    fn test_empty_book_renders_empty() {
        let book = OrderBook::new();
        assert!(to_csv_string(&book).is_empty());
    }
}
