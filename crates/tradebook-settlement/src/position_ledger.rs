//! Shared investor positions.
//!
//! The ledger stands in for the investor registry: callers register
//! investors (with opening positions) and read them back, while only
//! settlement moves shares. Per-asset workers share one ledger; each
//! transfer holds the lock for both legs so readers never see half a trade.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use tradebook_types::{AssetId, Investor, InvestorId, Result, TradebookError};

/// Cloneable handle to the investor positions.
#[derive(Debug, Clone, Default)]
pub struct PositionLedger {
    investors: Arc<Mutex<HashMap<InvestorId, Investor>>>,
}

impl PositionLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<InvestorId, Investor>> {
        // Positions are plain numbers; a panic elsewhere cannot leave
        // them structurally broken.
        self.investors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Add or replace an investor.
    pub fn register(&self, investor: Investor) {
        self.lock().insert(investor.id, investor);
    }

    /// Snapshot of an investor, if known.
    #[must_use]
    pub fn investor(&self, id: &InvestorId) -> Option<Investor> {
        self.lock().get(id).cloned()
    }

    /// Position of `id` in `asset`; zero for unknown investors.
    #[must_use]
    pub fn position(&self, id: &InvestorId, asset: &AssetId) -> Decimal {
        self.lock()
            .get(id)
            .map_or(Decimal::ZERO, |investor| investor.position(asset))
    }

    /// Add `delta` to one investor's position, registering the investor
    /// on first sight.
    pub fn update_asset_position(&self, id: InvestorId, asset: &AssetId, delta: Decimal) {
        self.lock()
            .entry(id)
            .or_insert_with(|| Investor::new(id))
            .update_asset_position(asset, delta);
    }

    /// Move `shares` of `asset` from `seller` to `buyer` atomically.
    ///
    /// Both new positions are computed before either is written; if one is
    /// not representable nothing changes and `SettlementInvariant` is
    /// returned.
    pub fn transfer(
        &self,
        seller: InvestorId,
        buyer: InvestorId,
        asset: &AssetId,
        shares: Decimal,
    ) -> Result<()> {
        let mut investors = self.lock();
        let held = |id: &InvestorId| {
            investors
                .get(id)
                .map_or(Decimal::ZERO, |investor| investor.position(asset))
        };
        let overflow = |id: InvestorId| TradebookError::SettlementInvariant {
            reason: format!("position of {id} in {asset} overflows moving {shares}"),
        };

        let seller_after = held(&seller)
            .checked_sub(shares)
            .ok_or_else(|| overflow(seller))?;
        // Self-trades net to zero.
        let buyer_after = if buyer == seller {
            seller_after
                .checked_add(shares)
                .ok_or_else(|| overflow(buyer))?
        } else {
            held(&buyer)
                .checked_add(shares)
                .ok_or_else(|| overflow(buyer))?
        };

        for (id, after) in [(seller, seller_after), (buyer, buyer_after)] {
            investors
                .entry(id)
                .or_insert_with(|| Investor::new(id))
                .positions
                .insert(asset.clone(), after);
        }
        Ok(())
    }

    /// Sum of every investor's position in `asset`.
    #[must_use]
    pub fn total_position(&self, asset: &AssetId) -> Decimal {
        self.lock()
            .values()
            .map(|investor| investor.position(asset))
            .sum()
    }

    /// Every asset any investor holds a position in.
    #[must_use]
    pub fn assets(&self) -> Vec<AssetId> {
        let mut assets: Vec<AssetId> = self
            .lock()
            .values()
            .flat_map(|investor| investor.positions.keys().cloned())
            .collect();
        assets.sort();
        assets.dedup();
        assets
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_read_back() {
        let ledger = PositionLedger::new();
        let asset = AssetId::from("PETR4");
        let id = InvestorId::new();
        ledger.register(Investor::new(id).with_position(asset.clone(), Decimal::new(100, 0)));

        assert_eq!(ledger.position(&id, &asset), Decimal::new(100, 0));
        assert_eq!(ledger.investor(&id).unwrap().id, id);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn unknown_investor_has_zero_position() {
        let ledger = PositionLedger::new();
        assert_eq!(
            ledger.position(&InvestorId::new(), &AssetId::from("PETR4")),
            Decimal::ZERO
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn transfer_moves_shares_between_investors() {
        let ledger = PositionLedger::new();
        let asset = AssetId::from("PETR4");
        let seller = InvestorId::new();
        let buyer = InvestorId::new();
        ledger.register(Investor::new(seller).with_position(asset.clone(), Decimal::new(50, 0)));

        ledger.transfer(seller, buyer, &asset, Decimal::new(20, 0)).unwrap();

        assert_eq!(ledger.position(&seller, &asset), Decimal::new(30, 0));
        assert_eq!(ledger.position(&buyer, &asset), Decimal::new(20, 0));
        assert_eq!(ledger.total_position(&asset), Decimal::new(50, 0));
    }

    #[test]
    fn self_transfer_keeps_position() {
        let ledger = PositionLedger::new();
        let asset = AssetId::from("PETR4");
        let id = InvestorId::new();
        ledger.register(Investor::new(id).with_position(asset.clone(), Decimal::new(10, 0)));

        ledger.transfer(id, id, &asset, Decimal::new(4, 0)).unwrap();
        assert_eq!(ledger.position(&id, &asset), Decimal::new(10, 0));
    }

    #[test]
    fn overflowing_transfer_changes_nothing() {
        let ledger = PositionLedger::new();
        let asset = AssetId::from("PETR4");
        let seller = InvestorId::new();
        let buyer = InvestorId::new();
        ledger.register(Investor::new(seller).with_position(asset.clone(), Decimal::new(5, 0)));
        ledger.register(Investor::new(buyer).with_position(asset.clone(), Decimal::MAX));

        let err = ledger.transfer(seller, buyer, &asset, Decimal::ONE).unwrap_err();
        assert!(matches!(err, TradebookError::SettlementInvariant { .. }));
        assert_eq!(ledger.position(&seller, &asset), Decimal::new(5, 0));
        assert_eq!(ledger.position(&buyer, &asset), Decimal::MAX);
    }

    #[test]
    fn clones_share_state() {
        let ledger = PositionLedger::new();
        let other = ledger.clone();
        let id = InvestorId::new();
        let asset = AssetId::from("VALE3");
        other.update_asset_position(id, &asset, Decimal::new(7, 0));
        assert_eq!(ledger.position(&id, &asset), Decimal::new(7, 0));
        assert_eq!(ledger.assets(), vec![asset]);
    }
}
