//! # tradebook-engine
//!
//! **The Book**: a continuous double-auction matching authority fed by a
//! channel of orders and reporting matched orders on another.
//!
//! ```text
//! submitter --BookHandle--> input --> Book::run --> output --> consumer
//!                                        |
//!                               AssetBook + Settler
//! ```
//!
//! - [`Book`] runs every asset on one task (single consumer, lock-free
//!   matching state).
//! - [`ShardedBook`] runs one `Book` per asset for cross-asset parallelism.
//! - [`BookHandle::submit`] validates boundary input and returns an
//!   [`OrderTicket`] that resolves once the order's settlements are done.
//!
//! Shutdown is closing the input: drop every handle. Resting orders are
//! abandoned.

pub mod book;
pub mod sharded;
pub mod submission;

pub use book::Book;
pub use sharded::ShardedBook;
pub use submission::{
    BookHandle, OrderRequest, OrderTicket, Submission, SubmissionReport, channel,
};
