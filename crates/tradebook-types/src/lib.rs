//! # tradebook-types
//!
//! Shared types, errors, and configuration for the **Tradebook** matching engine.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`OrderId`], [`InvestorId`], [`TransactionId`], [`AssetId`]
//! - **Order model**: [`Order`], [`OrderSide`], [`OrderStatus`]
//! - **Trade model**: [`Transaction`]
//! - **Positions**: [`Investor`]
//! - **Configuration**: [`BookConfig`], [`MatchPolicy`]
//! - **Errors**: [`TradebookError`] with `TB_ERR_` prefix codes
//! - **Constants**: channel capacities and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod investor;
pub mod order;
pub mod transaction;

pub use config::*;
pub use error::*;
pub use ids::*;
pub use investor::*;
pub use order::*;
pub use transaction::*;
