//! One matching worker per asset.
//!
//! [`ShardedBook`] keeps the [`Book`] contract (one input, one output) but
//! routes each submission to a dedicated worker keyed by its asset. Each
//! worker is an ordinary `Book`, so orders of one asset are still matched
//! strictly in arrival order by exactly one task, while different assets
//! match in parallel. Notifications of different assets may interleave on
//! the shared output; those of one asset keep their order.

use std::collections::{HashMap, HashSet};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tradebook_settlement::{CompletionTracker, PositionLedger, TradeLog};
use tradebook_types::constants::{ENGINE_NAME, VERSION};
use tradebook_types::{AssetId, BookConfig, Order, Result, TradebookError};

use crate::book::Book;
use crate::submission::Submission;

struct Shard {
    tx: mpsc::Sender<Submission>,
    handle: JoinHandle<Result<TradeLog>>,
}

/// Router spawning a [`Book`] worker per asset on first sight.
#[derive(Debug)]
pub struct ShardedBook {
    input: mpsc::Receiver<Submission>,
    output: mpsc::Sender<Order>,
    config: BookConfig,
    ledger: PositionLedger,
    tracker: Option<CompletionTracker>,
}

impl ShardedBook {
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

    /// Ledger shared by every worker.
    #[must_use]
    pub fn with_ledger(mut self, ledger: PositionLedger) -> Self {
        self.ledger = ledger;
        self
    }

    /// Counter shared by every worker.
    #[must_use]
    pub fn with_tracker(mut self, tracker: CompletionTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    fn spawn_shard(&self, asset: &AssetId) -> Shard {
        tracing::info!(asset = %asset, "Spawning asset worker");
        let (tx, rx) = mpsc::channel(self.config.shard_capacity);
        let mut book = Book::new(rx, self.output.clone())
            .with_config(self.config.clone())
            .with_ledger(self.ledger.clone());
        if let Some(tracker) = &self.tracker {
            book = book.with_tracker(tracker.clone());
        }
        Shard {
            tx,
            handle: tokio::spawn(book.run()),
        }
    }

    /// Route submissions until the input closes, then close every worker,
    /// wait for them and merge their trade logs in the order the assets
    /// were first seen.
    ///
    /// A worker that stops with an error rejects later submissions for its
    /// asset with `WorkerFailed`, and the first such failure is returned
    /// once the input has closed.
    pub async fn run(mut self) -> Result<TradeLog> {
        let mut shards: HashMap<AssetId, Shard> = HashMap::new();
        // Spawn order; workers are joined and their logs merged in it.
        let mut spawned: Vec<AssetId> = Vec::new();
        let mut failed: HashSet<AssetId> = HashSet::new();

        tracing::info!(
            engine = ENGINE_NAME,
            version = VERSION,
            policy = ?self.config.match_policy,
            "Sharded book started"
        );

        while let Some(submission) = self.input.recv().await {
            let asset = submission.order.asset_id.clone();
            if failed.contains(&asset) {
                Submission::respond(submission.reply, Err(worker_failed(&asset, "worker stopped")));
                continue;
            }

            if !shards.contains_key(&asset) {
                let shard = self.spawn_shard(&asset);
                shards.insert(asset.clone(), shard);
                spawned.push(asset.clone());
            }
            let Some(shard) = shards.get(&asset) else {
                continue;
            };

            if let Err(mpsc::error::SendError(rejected)) = shard.tx.send(submission).await {
                tracing::error!(asset = %asset, "Asset worker stopped; rejecting its submissions");
                failed.insert(asset.clone());
                Submission::respond(rejected.reply, Err(worker_failed(&asset, "worker stopped")));
            }
        }

        let mut log = TradeLog::new();
        let mut first_failure = None;
        for asset in spawned {
            let Some(shard) = shards.remove(&asset) else {
                continue;
            };
            drop(shard.tx);
            let outcome = match shard.handle.await {
                Ok(result) => result,
                Err(join) => Err(TradebookError::Internal(join.to_string())),
            };
            match outcome {
                Ok(worker_log) => log.merge(worker_log),
                Err(err) => {
                    tracing::error!(asset = %asset, error = %err, "Asset worker failed");
                    first_failure.get_or_insert_with(|| worker_failed(&asset, &err.to_string()));
                }
            }
        }

        tracing::info!(transactions = log.len(), "Sharded book stopped");
        match first_failure {
            Some(err) => Err(err),
            None => Ok(log),
        }
    }
}

fn worker_failed(asset: &AssetId, reason: &str) -> TradebookError {
    TradebookError::WorkerFailed {
        asset: asset.clone(),
        reason: reason.to_string(),
    }
}
