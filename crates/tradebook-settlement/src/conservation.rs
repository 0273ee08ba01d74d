//! Position conservation invariant checker.
//!
//! Settlement only moves shares between investors:
//! ```text
//! ∀ asset: Σ positions(after) == Σ positions(at capture)
//! ```
//!
//! A violation means shares were created or destroyed somewhere.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tradebook_types::{AssetId, Result, TradebookError};

use crate::position_ledger::PositionLedger;

/// Opening totals per asset, captured from a ledger.
#[derive(Debug, Clone, Default)]
pub struct PositionConservation {
    opening: HashMap<AssetId, Decimal>,
}

impl PositionConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current total of every asset held in `ledger`.
    #[must_use]
    pub fn capture(ledger: &PositionLedger) -> Self {
        let mut conservation = Self::new();
        for asset in ledger.assets() {
            let total = ledger.total_position(&asset);
            conservation.record_opening(asset, total);
        }
        conservation
    }

    /// Record (or add to) the opening total for an asset.
    pub fn record_opening(&mut self, asset: AssetId, amount: Decimal) {
        *self.opening.entry(asset).or_insert(Decimal::ZERO) += amount;
    }

    /// Total an asset must keep. Zero for assets never recorded.
    #[must_use]
    pub fn expected(&self, asset: &AssetId) -> Decimal {
        self.opening.get(asset).copied().unwrap_or(Decimal::ZERO)
    }

    /// Check one asset against an observed total.
    pub fn verify(&self, asset: &AssetId, actual: Decimal) -> Result<()> {
        let expected = self.expected(asset);
        if expected == actual {
            Ok(())
        } else {
            tracing::error!(
                asset = %asset,
                expected = %expected,
                actual = %actual,
                "Position conservation violated"
            );
            Err(TradebookError::ConservationViolation {
                asset: asset.clone(),
                expected,
                actual,
            })
        }
    }

    /// Check every asset the ledger currently knows about.
    pub fn verify_ledger(&self, ledger: &PositionLedger) -> Result<()> {
        let mut assets = ledger.assets();
        assets.extend(self.opening.keys().cloned());
        assets.sort();
        assets.dedup();
        for asset in &assets {
            self.verify(asset, ledger.total_position(asset))?;
        }
        Ok(())
    }
}
