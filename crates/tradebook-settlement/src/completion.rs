//! Externally owned settlement counter.
//!
//! The caller arms the tracker once per settlement it expects *before*
//! submitting the orders that trigger them, then awaits [`CompletionTracker::wait`].
//! The settler decrements it exactly once per settlement call.
//!
//! Miscounting is a caller bug. Arming too few would make the counter go
//! negative: instead of panicking, the tracker latches into a misused state
//! and both `done` and `wait` report `TrackerUnderflow`. Arming too many
//! still waits forever, so prefer the per-submission tickets of the engine
//! when only individual orders matter.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use tradebook_types::{Result, TradebookError};

#[derive(Debug, Default)]
struct TrackerState {
    pending: u64,
    underflowed: bool,
}

#[derive(Debug, Default)]
struct Inner {
    state: Mutex<TrackerState>,
    notify: Notify,
}

/// Cloneable countdown of outstanding settlements.
#[derive(Debug, Clone, Default)]
pub struct CompletionTracker {
    inner: Arc<Inner>,
}

impl CompletionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, TrackerState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Expect `n` more settlements.
    pub fn arm(&self, n: u64) {
        self.state().pending += n;
    }

    /// Record one finished settlement.
    pub fn done(&self) -> Result<()> {
        let mut state = self.state();
        if state.pending == 0 {
            state.underflowed = true;
            drop(state);
            self.inner.notify.notify_waiters();
            return Err(TradebookError::TrackerUnderflow);
        }
        state.pending -= 1;
        let reached_zero = state.pending == 0;
        drop(state);
        if reached_zero {
            self.inner.notify.notify_waiters();
        }
        Ok(())
    }

    /// Settlements still expected.
    #[must_use]
    pub fn pending(&self) -> u64 {
        self.state().pending
    }

    /// Whether `done` was ever called with nothing armed.
    #[must_use]
    pub fn is_misused(&self) -> bool {
        self.state().underflowed
    }

    /// Resolve once every armed settlement has completed.
    pub async fn wait(&self) -> Result<()> {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a wake-up between the check and
            // the await is not lost.
            notified.as_mut().enable();
            {
                let state = self.state();
                if state.underflowed {
                    return Err(TradebookError::TrackerUnderflow);
                }
                if state.pending == 0 {
                    return Ok(());
                }
            }
            notified.await;
        }
    }
}
