//! Settlement of a crossing pair.
//!
//! For every match the settler:
//! 1. Trades `min(selling.pending, buying.pending)` shares
//! 2. Computes the transaction total at the execution price
//! 3. Moves that quantity from the seller's position to the buyer's
//! 4. Decreases both orders' pending shares
//! 5. Closes whichever order has nothing left pending
//! 6. Appends the transaction to the trade log
//! 7. Signals the completion tracker, if any, exactly once
//!
//! Steps 1 to 3 are the only ones that can fail, and a failure leaves the
//! orders, the ledger and the log as they were.

use chrono::Utc;
use rust_decimal::Decimal;
use tradebook_matchcore::Settle;
use tradebook_types::{Order, OrderSide, Result, TradebookError, Transaction};

use crate::completion::CompletionTracker;
use crate::position_ledger::PositionLedger;
use crate::trade_log::TradeLog;

/// Synchronous settler owned by one matching worker.
#[derive(Debug)]
pub struct Settler {
    ledger: PositionLedger,
    log: TradeLog,
    tracker: Option<CompletionTracker>,
}

impl Settler {
    #[must_use]
    pub fn new(ledger: PositionLedger) -> Self {
        Self {
            ledger,
            log: TradeLog::new(),
            tracker: None,
        }
    }

    #[must_use]
    pub fn with_tracker(mut self, tracker: CompletionTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Settle one crossing pair.
    ///
    /// # Errors
    /// - `SettlementInvariant` if the sides are wrong or the traded
    ///   quantity would not be positive. Neither order is touched.
    pub fn settle_pair(
        &mut self,
        buying: &mut Order,
        selling: &mut Order,
        price: Decimal,
        taker_side: OrderSide,
    ) -> Result<Transaction> {
        let result = self.apply(buying, selling, price, taker_side);
        self.signal();
        result
    }

    fn apply(
        &mut self,
        buying: &mut Order,
        selling: &mut Order,
        price: Decimal,
        taker_side: OrderSide,
    ) -> Result<Transaction> {
        if buying.side != OrderSide::Buy || selling.side != OrderSide::Sell {
            return Err(TradebookError::SettlementInvariant {
                reason: format!(
                    "expected BUY/SELL pair, got {}/{}",
                    buying.side, selling.side
                ),
            });
        }
        if buying.asset_id != selling.asset_id {
            return Err(TradebookError::SettlementInvariant {
                reason: format!(
                    "orders for different assets: {} and {}",
                    buying.asset_id, selling.asset_id
                ),
            });
        }

        let shares = selling.pending_shares.min(buying.pending_shares);
        if shares <= Decimal::ZERO {
            tracing::error!(
                buying = %buying.id,
                selling = %selling.id,
                shares = %shares,
                "Non-positive settlement quantity"
            );
            return Err(TradebookError::SettlementInvariant {
                reason: format!(
                    "non-positive quantity {shares} between {} and {}",
                    buying.id, selling.id
                ),
            });
        }

        let mut transaction = Transaction::open(buying, selling, price, taker_side);
        transaction.calculate_total(shares)?;
        self.ledger
            .transfer(selling.investor_id, buying.investor_id, &buying.asset_id, shares)?;

        // `shares` is positive and within both pending amounts, so neither
        // fill can fail once the ledger has moved.
        selling.fill(shares)?;
        buying.fill(shares)?;

        let now = Utc::now();
        if buying.is_filled() {
            buying.close(now);
            transaction.close_buy_side(now);
        }
        if selling.is_filled() {
            selling.close(now);
            transaction.close_sell_side(now);
        }

        self.log.append(transaction.clone());
        Ok(transaction)
    }

    fn signal(&self) {
        if let Some(tracker) = &self.tracker {
            if let Err(err) = tracker.done() {
                tracing::error!(error = %err, "Completion tracker was not armed for this settlement");
            }
        }
    }

    #[must_use]
    pub fn log(&self) -> &TradeLog {
        &self.log
    }

    #[must_use]
    pub fn into_log(self) -> TradeLog {
        self.log
    }

    #[must_use]
    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }
}

impl Settle for Settler {
    fn settle(
        &mut self,
        buying: &mut Order,
        selling: &mut Order,
        price: Decimal,
        taker_side: OrderSide,
    ) -> Result<Transaction> {
        self.settle_pair(buying, selling, price, taker_side)
    }
}
