//! # tradebook-matchcore
//!
//! **Continuous price-time priority matching for Tradebook.**
//!
//! MatchCore owns the resting orders of each asset and decides which pairs
//! cross. It has:
//!
//! - **No I/O**: no channels, no persistence, no clocks beyond timestamps
//! - **One generic queue**: bids and asks are the same [`PriceQueue`] with
//!   an injected [`Priority`]
//! - **A settlement seam**: crossing pairs are handed to a [`Settle`]
//!   implementation, which owns quantities and positions
//! - **Asset partitioning**: each asset has its own independent [`AssetBook`]

pub mod asset_book;
pub mod price_queue;
pub mod settle;

pub use asset_book::{AssetBook, Fill, MatchOutcome};
pub use price_queue::{AskPriority, AskQueue, BidPriority, BidQueue, PriceQueue, Priority};
pub use settle::Settle;
