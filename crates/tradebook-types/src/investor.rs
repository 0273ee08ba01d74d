//! Investors and their per-asset positions.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AssetId, InvestorId};

/// An investor holding positions in one or more assets.
///
/// Positions change only through settlement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investor {
    pub id: InvestorId,
    pub positions: HashMap<AssetId, Decimal>,
}

impl Investor {
    #[must_use]
    pub fn new(id: InvestorId) -> Self {
        Self {
            id,
            positions: HashMap::new(),
        }
    }

    /// Builder-style opening position.
    #[must_use]
    pub fn with_position(mut self, asset: AssetId, shares: Decimal) -> Self {
        self.positions.insert(asset, shares);
        self
    }

    /// Add `delta` (possibly negative) to the position in `asset`.
    pub fn update_asset_position(&mut self, asset: &AssetId, delta: Decimal) {
        *self
            .positions
            .entry(asset.clone())
            .or_insert(Decimal::ZERO) += delta;
    }

    /// Current position in `asset`, zero if never held.
    #[must_use]
    pub fn position(&self, asset: &AssetId) -> Decimal {
        self.positions.get(asset).copied().unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_asset_position_is_zero() {
        let investor = Investor::new(InvestorId::new());
        assert_eq!(investor.position(&AssetId::from("VALE3")), Decimal::ZERO);
    }

    #[test]
    fn update_accumulates() {
        let asset = AssetId::from("VALE3");
        let mut investor =
            Investor::new(InvestorId::new()).with_position(asset.clone(), Decimal::new(100, 0));
        investor.update_asset_position(&asset, Decimal::new(-40, 0));
        investor.update_asset_position(&asset, Decimal::new(5, 0));
        assert_eq!(investor.position(&asset), Decimal::new(65, 0));
    }
}
