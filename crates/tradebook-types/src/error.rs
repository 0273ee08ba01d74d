//! Error types for the Tradebook matching engine.
//!
//! All errors use the `TB_ERR_` prefix so they are easy to grep in logs.
//! Codes are grouped by subsystem:
//! - 1xx: Order errors
//! - 5xx: Matching errors
//! - 6xx: Settlement errors
//! - 7xx: Coordination errors (channels, workers, completion tracking)
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{AssetId, OrderId};

/// Central error enum for all Tradebook operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TradebookError {
    // =================================================================
    // Order Errors (1xx)
    // =================================================================
    /// Side value was neither BUY nor SELL.
    #[error("TB_ERR_100: Invalid order side: {0:?}")]
    InvalidSide(String),

    /// The order failed validation (non-positive price or shares, etc.).
    #[error("TB_ERR_101: Invalid order: {reason}")]
    InvalidOrder { reason: String },

    /// A fill would take pending shares outside `0..=shares`.
    #[error("TB_ERR_102: Overfill on order {order_id}: pending {pending}, fill {fill}")]
    Overfill {
        order_id: OrderId,
        pending: Decimal,
        fill: Decimal,
    },

    // =================================================================
    // Matching Errors (5xx)
    // =================================================================
    /// An order was routed to the book of a different asset.
    #[error("TB_ERR_500: Order for {actual} routed to book of {expected}")]
    AssetMismatch { expected: AssetId, actual: AssetId },

    // =================================================================
    // Settlement Errors (6xx)
    // =================================================================
    /// Settlement was asked to trade a non-positive quantity.
    #[error("TB_ERR_600: Settlement invariant violated: {reason}")]
    SettlementInvariant { reason: String },

    /// Positions of an asset no longer sum to their opening total.
    #[error("TB_ERR_601: Position conservation violated for {asset}: expected {expected}, got {actual}")]
    ConservationViolation {
        asset: AssetId,
        expected: Decimal,
        actual: Decimal,
    },

    // =================================================================
    // Coordination Errors (7xx)
    // =================================================================
    /// The completion tracker was decremented more times than it was armed.
    #[error("TB_ERR_700: Completion tracker decremented below zero")]
    TrackerUnderflow,

    /// The book's input stream is closed; no more orders are accepted.
    #[error("TB_ERR_701: Book is closed")]
    BookClosed,

    /// The book stopped before reporting on a submitted order.
    #[error("TB_ERR_702: Book dropped the submission for order {0} before reporting")]
    ReplyDropped(OrderId),

    /// A per-asset worker terminated abnormally.
    #[error("TB_ERR_703: Worker for {asset} failed: {reason}")]
    WorkerFailed { asset: AssetId, reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("TB_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("TB_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (bad JSON, zero capacities, ...).
    #[error("TB_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, TradebookError>;

impl From<serde_json::Error> for TradebookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_side_display() {
        let err = TradebookError::InvalidSide("HOLD".into());
        let msg = format!("{err}");
        assert!(msg.starts_with("TB_ERR_100"), "Got: {msg}");
        assert!(msg.contains("HOLD"));
    }

    #[test]
    fn overfill_display_carries_quantities() {
        let err = TradebookError::Overfill {
            order_id: OrderId::new(),
            pending: Decimal::new(10, 0),
            fill: Decimal::new(40, 0),
        };
        let msg = format!("{err}");
        assert!(msg.contains("TB_ERR_102"));
        assert!(msg.contains("10"));
        assert!(msg.contains("40"));
    }

    #[test]
    fn all_errors_have_tb_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(TradebookError::TrackerUnderflow),
            Box::new(TradebookError::BookClosed),
            Box::new(TradebookError::ReplyDropped(OrderId::new())),
            Box::new(TradebookError::Internal("test".into())),
            Box::new(TradebookError::AssetMismatch {
                expected: AssetId::from("A"),
                actual: AssetId::from("B"),
            }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("TB_ERR_"),
                "Error missing TB_ERR_ prefix: {msg}"
            );
        }
    }
}
