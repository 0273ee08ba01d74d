//! The seam between matching and settlement.

use rust_decimal::Decimal;
use tradebook_types::{Order, OrderSide, Result, Transaction};

/// Converts a crossing pair into a settled [`Transaction`].
///
/// Implementations decide the traded quantity, update both orders'
/// pending shares and the investors' positions, and must leave both
/// orders untouched when they return an error.
pub trait Settle {
    fn settle(
        &mut self,
        buying: &mut Order,
        selling: &mut Order,
        price: Decimal,
        taker_side: OrderSide,
    ) -> Result<Transaction>;
}
