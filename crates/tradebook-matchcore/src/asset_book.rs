//! The two-sided book for a single asset and the crossing algorithm.
//!
//! ## Algorithm (per arriving order)
//!
//! 1. While the arrival has pending shares and the opposite queue's best
//!    price crosses its limit, pop that best resting order (the maker)
//! 2. Settle the pair at the maker's price; both orders record the
//!    transaction id
//! 3. Requeue the maker if it still has pending shares
//! 4. Under [`MatchPolicy::SingleMatch`] stop after the first fill
//! 5. Rest whatever is left of the arrival on its own side
//!
//! The arrival is matched before it rests, so a queue never holds an
//! order with nothing pending.

use rust_decimal::Decimal;
use tradebook_types::{
    AssetId, MatchPolicy, Order, OrderSide, Result, TradebookError, Transaction,
};

use crate::price_queue::{AskQueue, BidQueue};
use crate::settle::Settle;

/// One executed match.
#[derive(Debug, Clone)]
pub struct Fill {
    /// The resting order, as it stood right after settlement.
    pub maker: Order,
    /// The arriving order, as it stood right after settlement.
    pub taker: Order,
    pub transaction: Transaction,
}

/// Everything that happened to one arriving order.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    /// Fills in execution order.
    pub fills: Vec<Fill>,
    /// Final state of the arriving order.
    pub order: Order,
    /// Whether the arriving order was left resting in the book.
    pub rested: bool,
}

impl MatchOutcome {
    /// Order notifications in emission order: counter-party, then
    /// initiator, for every fill.
    pub fn notifications(&self) -> impl Iterator<Item = &Order> {
        self.fills
            .iter()
            .flat_map(|fill| [&fill.maker, &fill.taker])
    }

    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.fills.iter().map(|fill| &fill.transaction)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fills.is_empty()
    }
}

/// Bid and ask queues for one asset.
#[derive(Debug)]
pub struct AssetBook {
    asset_id: AssetId,
    bids: BidQueue,
    asks: AskQueue,
}

impl AssetBook {
    #[must_use]
    pub fn new(asset_id: AssetId) -> Self {
        Self {
            asset_id,
            bids: BidQueue::new(),
            asks: AskQueue::new(),
        }
    }

    #[must_use]
    pub fn asset_id(&self) -> &AssetId {
        &self.asset_id
    }

    // =================================================================
    // Matching
    // =================================================================

    /// Match an arriving order against the opposite side and rest the
    /// remainder.
    pub fn submit<S: Settle>(
        &mut self,
        mut order: Order,
        policy: MatchPolicy,
        settler: &mut S,
    ) -> Result<MatchOutcome> {
        if order.asset_id != self.asset_id {
            return Err(TradebookError::AssetMismatch {
                expected: self.asset_id.clone(),
                actual: order.asset_id,
            });
        }
        order.validate()?;

        let mut fills = Vec::new();
        while !order.is_filled() {
            let Some(maker) = self.pop_crossing(&order) else {
                break;
            };
            fills.push(self.execute(&mut order, maker, settler)?);
            if policy == MatchPolicy::SingleMatch {
                break;
            }
        }

        let rested = !order.is_filled();
        if rested {
            self.rest(order.clone())?;
        }

        Ok(MatchOutcome {
            fills,
            order,
            rested,
        })
    }

    /// Pop the opposite side's best order if it crosses `taker`.
    fn pop_crossing(&mut self, taker: &Order) -> Option<Order> {
        match taker.side {
            OrderSide::Buy => {
                let best = self.asks.best_price()?;
                taker.crosses(best).then(|| self.asks.pop()).flatten()
            }
            OrderSide::Sell => {
                let best = self.bids.best_price()?;
                taker.crosses(best).then(|| self.bids.pop()).flatten()
            }
        }
    }

    fn execute<S: Settle>(
        &mut self,
        taker: &mut Order,
        mut maker: Order,
        settler: &mut S,
    ) -> Result<Fill> {
        let price = maker.price;
        let settled = match taker.side {
            OrderSide::Buy => settler.settle(taker, &mut maker, price, OrderSide::Buy),
            OrderSide::Sell => settler.settle(&mut maker, taker, price, OrderSide::Sell),
        };
        let transaction = match settled {
            Ok(transaction) => transaction,
            Err(err) => {
                // Settlement leaves the pair untouched on error; put the
                // maker back where it was.
                self.rest(maker)?;
                return Err(err);
            }
        };

        taker.transactions.push(transaction.id);
        maker.transactions.push(transaction.id);

        tracing::debug!(
            asset = %self.asset_id,
            transaction = %transaction.id,
            maker = %maker.id,
            taker = %taker.id,
            price = %transaction.price,
            shares = %transaction.shares,
            "Orders crossed"
        );

        let fill = Fill {
            maker: maker.clone(),
            taker: taker.clone(),
            transaction,
        };
        if !maker.is_filled() {
            self.rest(maker)?;
        }
        Ok(fill)
    }

    fn rest(&mut self, order: Order) -> Result<()> {
        match order.side {
            OrderSide::Buy => self.bids.push(order),
            OrderSide::Sell => self.asks.push(order),
        }
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Best (highest) bid price, or `None` if no bids.
    #[must_use]
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.best_price()
    }

    /// Best (lowest) ask price, or `None` if no asks.
    #[must_use]
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.best_price()
    }

    /// Spread = best_ask - best_bid. `None` if either side is empty.
    #[must_use]
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    #[must_use]
    pub fn bids(&self) -> &BidQueue {
        &self.bids
    }

    #[must_use]
    pub fn asks(&self) -> &AskQueue {
        &self.asks
    }

    /// Every resting order, bids then asks, in no particular order
    /// within a side.
    pub fn resting_orders(&self) -> impl Iterator<Item = &Order> {
        self.bids.iter().chain(self.asks.iter())
    }

    /// Total number of resting orders on both sides.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.bids.len() + self.asks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order_count() == 0
    }

    /// Remove every resting order, bids first, each side best first.
    pub fn drain_all(&mut self) -> Vec<Order> {
        let mut all = self.bids.drain();
        all.extend(self.asks.drain());
        all
    }
}
