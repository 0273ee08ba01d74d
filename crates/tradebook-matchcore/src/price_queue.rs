//! One side of one asset's book.
//!
//! A [`PriceQueue`] is a binary heap of resting orders whose ordering is
//! injected through the [`Priority`] type parameter:
//! - **Bids**: [`BidPriority`] -- highest price first
//! - **Asks**: [`AskPriority`] -- lowest price first
//!
//! Both break price ties on the arrival `sequence` (lower first), so equal
//! prices are served strictly FIFO.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::marker::PhantomData;

use rust_decimal::Decimal;
use tradebook_types::{Order, OrderSide, Result, TradebookError};

/// Ordering rule for one side of the book.
pub trait Priority {
    /// The only side this queue accepts.
    const SIDE: OrderSide;

    /// `Ordering::Greater` means `a` is served before `b`.
    fn compare(a: &Order, b: &Order) -> Ordering;
}

/// Highest price first, then earliest arrival.
#[derive(Debug, Clone, Copy)]
pub struct BidPriority;

impl Priority for BidPriority {
    const SIDE: OrderSide = OrderSide::Buy;

    fn compare(a: &Order, b: &Order) -> Ordering {
        a.price
            .cmp(&b.price)
            .then_with(|| b.sequence.cmp(&a.sequence))
    }
}

/// Lowest price first, then earliest arrival.
#[derive(Debug, Clone, Copy)]
pub struct AskPriority;

impl Priority for AskPriority {
    const SIDE: OrderSide = OrderSide::Sell;

    fn compare(a: &Order, b: &Order) -> Ordering {
        b.price
            .cmp(&a.price)
            .then_with(|| b.sequence.cmp(&a.sequence))
    }
}

/// Heap entry ordered by `P`.
#[derive(Debug)]
struct Ranked<P> {
    order: Order,
    _priority: PhantomData<fn() -> P>,
}

impl<P: Priority> Ranked<P> {
    fn new(order: Order) -> Self {
        Self {
            order,
            _priority: PhantomData,
        }
    }
}

impl<P: Priority> PartialEq for Ranked<P> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<P: Priority> Eq for Ranked<P> {}

impl<P: Priority> PartialOrd for Ranked<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P: Priority> Ord for Ranked<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        P::compare(&self.order, &other.order)
    }
}

/// Resting orders for one side of one asset, best order on top.
#[derive(Debug)]
pub struct PriceQueue<P: Priority> {
    heap: BinaryHeap<Ranked<P>>,
}

/// Buy side queue.
pub type BidQueue = PriceQueue<BidPriority>;

/// Sell side queue.
pub type AskQueue = PriceQueue<AskPriority>;

impl<P: Priority> PriceQueue<P> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    /// Rest an order. O(log n).
    ///
    /// Orders with nothing pending, or for the other side, are a caller
    /// error and are handed back inside `InvalidOrder`.
    pub fn push(&mut self, order: Order) -> Result<()> {
        if order.side != P::SIDE {
            return Err(TradebookError::InvalidOrder {
                reason: format!("{} order {} pushed onto {} queue", order.side, order.id, P::SIDE),
            });
        }
        if order.pending_shares <= Decimal::ZERO {
            return Err(TradebookError::InvalidOrder {
                reason: format!("order {} has no pending shares", order.id),
            });
        }
        self.heap.push(Ranked::new(order));
        Ok(())
    }

    /// Remove the best order. O(log n). `None` on an empty queue.
    pub fn pop(&mut self) -> Option<Order> {
        self.heap.pop().map(|ranked| ranked.order)
    }

    /// Best order without removing it. O(1).
    #[must_use]
    pub fn peek_best(&self) -> Option<&Order> {
        self.heap.peek().map(|ranked| &ranked.order)
    }

    /// Limit price of the best order.
    #[must_use]
    pub fn best_price(&self) -> Option<Decimal> {
        self.peek_best().map(|order| order.price)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Sum of pending shares across all resting orders.
    #[must_use]
    pub fn total_pending(&self) -> Decimal {
        self.heap.iter().map(|ranked| ranked.order.pending_shares).sum()
    }

    /// Resting orders in heap order (not priority order).
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.heap.iter().map(|ranked| &ranked.order)
    }

    /// Remove every order, best first.
    pub fn drain(&mut self) -> Vec<Order> {
        let mut sorted = std::mem::take(&mut self.heap).into_sorted_vec();
        sorted.reverse();
        sorted.into_iter().map(|ranked| ranked.order).collect()
    }
}

impl<P: Priority> Default for PriceQueue<P> {
    fn default() -> Self {
        Self::new()
    }
}
