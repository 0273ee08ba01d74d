//! The trade record produced when two orders cross.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    AssetId, InvestorId, Order, OrderId, OrderSide, Result, TradebookError, TransactionId,
};

/// A single trade between a buying and a selling order.
///
/// Created by settlement at the moment two orders cross. Apart from the
/// close markers, it is never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub asset_id: AssetId,
    pub buying_order_id: OrderId,
    pub selling_order_id: OrderId,
    pub buying_investor_id: InvestorId,
    pub selling_investor_id: InvestorId,
    /// Traded quantity.
    pub shares: Decimal,
    /// Execution price (the resting order's limit).
    pub price: Decimal,
    /// `shares × price`.
    pub total: Decimal,
    /// Side of the order whose arrival caused the trade.
    pub taker_side: OrderSide,
    pub executed_at: DateTime<Utc>,
    /// Set when this trade left the buying order with nothing pending.
    pub buy_closed_at: Option<DateTime<Utc>>,
    /// Set when this trade left the selling order with nothing pending.
    pub sell_closed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Opens a trade record between `buying` and `selling` at `price`.
    /// Quantity and total are filled in by settlement.
    #[must_use]
    pub fn open(buying: &Order, selling: &Order, price: Decimal, taker_side: OrderSide) -> Self {
        Self {
            id: TransactionId::new(),
            asset_id: buying.asset_id.clone(),
            buying_order_id: buying.id,
            selling_order_id: selling.id,
            buying_investor_id: buying.investor_id,
            selling_investor_id: selling.investor_id,
            shares: Decimal::ZERO,
            price,
            total: Decimal::ZERO,
            taker_side,
            executed_at: Utc::now(),
            buy_closed_at: None,
            sell_closed_at: None,
        }
    }

    /// Record the traded quantity and derive the total value.
    ///
    /// Leaves the record untouched and returns `SettlementInvariant` if
    /// `shares × price` is not representable.
    pub fn calculate_total(&mut self, shares: Decimal) -> Result<()> {
        let total = shares
            .checked_mul(self.price)
            .ok_or_else(|| TradebookError::SettlementInvariant {
                reason: format!("total of {shares} @ {} overflows", self.price),
            })?;
        self.shares = shares;
        self.total = total;
        Ok(())
    }

    pub fn close_buy_side(&mut self, at: DateTime<Utc>) {
        self.buy_closed_at = Some(at);
    }

    pub fn close_sell_side(&mut self, at: DateTime<Utc>) {
        self.sell_closed_at = Some(at);
    }

    /// Returns `true` if the buyer's arrival caused this trade.
    #[must_use]
    pub fn taker_is_buyer(&self) -> bool {
        self.taker_side == OrderSide::Buy
    }
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Transaction[{}] {} {} {} @ {} = {}",
            self.id, self.asset_id, self.taker_side, self.shares, self.price, self.total,
        )
    }
}
