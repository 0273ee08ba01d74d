//! Append-only record of settled transactions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tradebook_types::{AssetId, OrderId, Result, Transaction};

/// Every transaction a book settled, in settlement order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeLog {
    transactions: Vec<Transaction>,
}

impl TradeLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Transaction] {
        &self.transactions
    }

    #[must_use]
    pub fn last(&self) -> Option<&Transaction> {
        self.transactions.last()
    }

    /// Transactions `order_id` took part in, on either side.
    pub fn for_order(&self, order_id: OrderId) -> impl Iterator<Item = &Transaction> {
        self.transactions
            .iter()
            .filter(move |t| t.buying_order_id == order_id || t.selling_order_id == order_id)
    }

    /// Shares traded in `asset`.
    #[must_use]
    pub fn total_volume(&self, asset: &AssetId) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| &t.asset_id == asset)
            .map(|t| t.shares)
            .sum()
    }

    /// Traded value (Σ shares × price) in `asset`.
    #[must_use]
    pub fn total_value(&self, asset: &AssetId) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| &t.asset_id == asset)
            .map(|t| t.total)
            .sum()
    }

    /// Append another log, e.g. from a per-asset worker.
    pub fn merge(&mut self, other: TradeLog) {
        self.transactions.extend(other.transactions);
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Transaction> {
        self.transactions
    }

    /// Export for audit or replay.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<'a> IntoIterator for &'a TradeLog {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}
