//! Order types for the Tradebook matching engine.
//!
//! Orders reach the book already validated and carrying a stable id.
//! The book only ever changes `pending_shares`, `status`, `closed_at`,
//! `sequence` and the transaction history.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AssetId, InvestorId, OrderId, Result, TradebookError, TransactionId};

/// Which side of the book this order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// The side an incoming order of this side matches against.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for OrderSide {
    type Err = TradebookError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Self::Buy),
            "SELL" => Ok(Self::Sell),
            _ => Err(TradebookError::InvalidSide(s.to_string())),
        }
    }
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Open,
    PartiallyFilled,
    Filled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            Self::Filled => write!(f, "FILLED"),
        }
    }
}

/// A limit order for one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub investor_id: InvestorId,
    pub asset_id: AssetId,
    pub side: OrderSide,
    /// Limit price.
    pub price: Decimal,
    /// Original quantity.
    pub shares: Decimal,
    /// Quantity not yet matched. Always within `0..=shares`.
    pub pending_shares: Decimal,
    /// Transactions this order took part in, oldest first.
    pub transactions: Vec<TransactionId>,
    /// Arrival sequence, stamped by the book. Breaks price ties.
    pub sequence: u64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    /// Set once `pending_shares` reaches zero.
    pub closed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Build a fresh, unfilled limit order.
    #[must_use]
    pub fn new(
        investor_id: InvestorId,
        asset_id: AssetId,
        side: OrderSide,
        price: Decimal,
        shares: Decimal,
    ) -> Self {
        Self {
            id: OrderId::new(),
            investor_id,
            asset_id,
            side,
            price,
            shares,
            pending_shares: shares,
            transactions: Vec::new(),
            sequence: 0,
            status: OrderStatus::Open,
            created_at: Utc::now(),
            closed_at: None,
        }
    }

    /// Checks the fields the book relies on.
    pub fn validate(&self) -> Result<()> {
        if self.price <= Decimal::ZERO {
            return Err(TradebookError::InvalidOrder {
                reason: format!("price must be positive, got {}", self.price),
            });
        }
        if self.shares <= Decimal::ZERO {
            return Err(TradebookError::InvalidOrder {
                reason: format!("shares must be positive, got {}", self.shares),
            });
        }
        if self.pending_shares <= Decimal::ZERO || self.pending_shares > self.shares {
            return Err(TradebookError::InvalidOrder {
                reason: format!(
                    "pending shares {} outside (0, {}]",
                    self.pending_shares, self.shares
                ),
            });
        }
        if self.price.checked_mul(self.shares).is_none() {
            return Err(TradebookError::InvalidOrder {
                reason: format!("notional of {} @ {} overflows", self.shares, self.price),
            });
        }
        Ok(())
    }

    /// Whether this order would trade against a resting order at `price`.
    #[must_use]
    pub fn crosses(&self, price: Decimal) -> bool {
        match self.side {
            OrderSide::Buy => self.price >= price,
            OrderSide::Sell => self.price <= price,
        }
    }

    /// Consume `qty` pending shares.
    ///
    /// Leaves the order untouched and returns `Overfill` if `qty` is not
    /// positive or exceeds what is pending.
    pub fn fill(&mut self, qty: Decimal) -> Result<()> {
        if qty <= Decimal::ZERO || qty > self.pending_shares {
            return Err(TradebookError::Overfill {
                order_id: self.id,
                pending: self.pending_shares,
                fill: qty,
            });
        }
        self.pending_shares -= qty;
        self.status = if self.pending_shares.is_zero() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        Ok(())
    }

    /// Mark the order closed. Only meaningful once nothing is pending.
    pub fn close(&mut self, at: DateTime<Utc>) {
        if self.is_filled() && self.closed_at.is_none() {
            self.closed_at = Some(at);
        }
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.pending_shares.is_zero()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    #[must_use]
    pub fn filled_shares(&self) -> Decimal {
        self.shares - self.pending_shares
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    pub fn dummy_limit(side: OrderSide, price: Decimal, shares: Decimal) -> Self {
        Self::new(InvestorId::new(), AssetId::from("PETR4"), side, price, shares)
    }

    pub fn dummy_limit_for(
        investor_id: InvestorId,
        asset: &str,
        side: OrderSide,
        price: Decimal,
        shares: Decimal,
    ) -> Self {
        Self::new(investor_id, AssetId::from(asset), side, price, shares)
    }

    #[must_use]
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }
}
