//! # tradebook-settlement
//!
//! **Settlement**: turns a crossing pair into position changes, order
//! state updates and a trade log entry.
//!
//! ## Architecture
//!
//! A matching worker hands each crossing pair to its [`Settler`] through the
//! [`tradebook_matchcore::Settle`] seam. The settler:
//! 1. Computes the traded quantity (smaller of the two pending amounts)
//! 2. Moves shares from seller to buyer in the shared [`PositionLedger`]
//! 3. Updates pending shares and closes exhausted orders
//! 4. Appends the transaction to its [`TradeLog`]
//! 5. Signals an optional [`CompletionTracker`]
//!
//! [`PositionConservation`] checks that settlement never creates or
//! destroys shares.

pub mod completion;
pub mod conservation;
pub mod position_ledger;
pub mod settler;
pub mod trade_log;

pub use completion::CompletionTracker;
pub use conservation::PositionConservation;
pub use position_ledger::PositionLedger;
pub use settler::Settler;
pub use trade_log::TradeLog;
