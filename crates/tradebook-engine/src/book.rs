//! The matching authority for a set of assets.
//!
//! A [`Book`] is a single consumer: one task owns every asset's queues and
//! the trade log, so no locks guard the matching state. For each
//! submission it
//! 1. Stamps the arrival sequence
//! 2. Resolves (or lazily opens) the asset's [`AssetBook`]
//! 3. Matches and settles
//! 4. Emits counter-party then initiator for every fill on the output
//! 5. Resolves the submission's reply
//!
//! ## Backpressure
//!
//! The output channel is bounded and the book awaits capacity before moving
//! on. A slow consumer therefore stalls all further matching (head-of-line
//! blocking). This keeps notifications in match order and is intended.
//!
//! ## Shutdown
//!
//! Closing the input ends the loop. Orders still resting are abandoned:
//! nothing is emitted for them.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tradebook_matchcore::AssetBook;
use tradebook_settlement::{CompletionTracker, PositionLedger, Settler, TradeLog};
use tradebook_types::constants::{ENGINE_NAME, VERSION};
use tradebook_types::{AssetId, BookConfig, Order, Result, TradebookError};

use crate::submission::{Submission, SubmissionReport};

/// Single-consumer matching loop over an input and an output channel.
#[derive(Debug)]
pub struct Book {
    input: mpsc::Receiver<Submission>,
    output: mpsc::Sender<Order>,
    config: BookConfig,
    ledger: PositionLedger,
    tracker: Option<CompletionTracker>,
}

impl Book {
    /// Bind a book to its input and output streams.
    #[must_use]
    pub fn new(input: mpsc::Receiver<Submission>, output: mpsc::Sender<Order>) -> Self {
        Self {
            input,
            output,
            config: BookConfig::default(),
            ledger: PositionLedger::new(),
            tracker: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: BookConfig) -> Self {
        self.config = config;
        self
    }

    /// Positions settlement should update. Defaults to a private ledger.
    #[must_use]
    pub fn with_ledger(mut self, ledger: PositionLedger) -> Self {
        self.ledger = ledger;
        self
    }

    /// Externally armed counter, signalled once per settlement.
    #[must_use]
    pub fn with_tracker(mut self, tracker: CompletionTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Drain the input until it closes, matching and settling every order.
    ///
    /// Returns the trade log. Rejected submissions (invalid orders, wrong
    /// asset) are answered on their reply and do not stop the loop. A
    /// settlement invariant violation is fatal: it is returned and the
    /// book stops.
    pub async fn run(self) -> Result<TradeLog> {
        let Self {
            mut input,
            output,
            config,
            ledger,
            tracker,
        } = self;

        let mut settler = Settler::new(ledger);
        if let Some(tracker) = tracker {
            settler = settler.with_tracker(tracker);
        }
        let mut state = RunState {
            output,
            output_open: true,
            books: HashMap::new(),
            next_sequence: 0,
        };

        tracing::info!(
            engine = ENGINE_NAME,
            version = VERSION,
            policy = ?config.match_policy,
            "Book started"
        );

        while let Some(submission) = input.recv().await {
            state.process(submission, &config, &mut settler).await?;
        }

        let abandoned: usize = state
            .books
            .values_mut()
            .map(|book| book.drain_all().len())
            .sum();
        tracing::info!(
            transactions = settler.log().len(),
            assets = state.books.len(),
            abandoned,
            "Input closed; book stopped"
        );
        Ok(settler.into_log())
    }
}

/// Mutable state of a running book.
struct RunState {
    output: mpsc::Sender<Order>,
    output_open: bool,
    books: HashMap<AssetId, AssetBook>,
    next_sequence: u64,
}

impl RunState {
    async fn process(
        &mut self,
        submission: Submission,
        config: &BookConfig,
        settler: &mut Settler,
    ) -> Result<()> {
        let Submission { mut order, reply } = submission;
        order.sequence = self.next_sequence;
        self.next_sequence += 1;

        let book = self
            .books
            .entry(order.asset_id.clone())
            .or_insert_with_key(|asset| {
                tracing::debug!(asset = %asset, "Opening asset book");
                AssetBook::new(asset.clone())
            });

        let order_id = order.id;
        match book.submit(order, config.match_policy, settler) {
            Ok(outcome) => {
                for notification in outcome.notifications() {
                    self.emit(notification.clone()).await;
                }
                Submission::respond(reply, Ok(SubmissionReport::from(outcome)));
                Ok(())
            }
            Err(err @ (TradebookError::InvalidOrder { .. } | TradebookError::AssetMismatch { .. })) => {
                tracing::warn!(order = %order_id, error = %err, "Rejected submission");
                Submission::respond(reply, Err(err));
                Ok(())
            }
            Err(err) => {
                tracing::error!(order = %order_id, error = %err, "Matching failed; stopping book");
                Submission::respond(reply, Err(err.clone()));
                Err(err)
            }
        }
    }

    /// Send one notification, waiting for capacity.
    async fn emit(&mut self, order: Order) {
        if !self.output_open {
            return;
        }
        if self.output.send(order).await.is_err() {
            tracing::warn!("Output consumer dropped; further notifications are discarded");
            self.output_open = false;
        }
    }
}
