//! Configuration types for a Tradebook book.

use serde::{Deserialize, Serialize};

use crate::{Result, TradebookError, constants};

/// How many resting orders an arriving order may trade against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// At most one opposing order per arrival, even if more could fill.
    #[default]
    SingleMatch,
    /// Keep crossing until the arrival is exhausted or the spread no
    /// longer crosses.
    Sweep,
}

/// Configuration for a single book (or every worker of a sharded book).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    pub match_policy: MatchPolicy,
    /// Capacity of the submission channel created by `channel()`.
    pub input_capacity: usize,
    /// Capacity of the matched-order output channel.
    pub output_capacity: usize,
    /// Capacity of each per-asset worker's private input.
    pub shard_capacity: usize,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            match_policy: MatchPolicy::default(),
            input_capacity: constants::DEFAULT_INPUT_CAPACITY,
            output_capacity: constants::DEFAULT_OUTPUT_CAPACITY,
            shard_capacity: constants::DEFAULT_SHARD_CAPACITY,
        }
    }
}

impl BookConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TradebookError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Tokio channels panic on zero capacity; reject it up front.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("input_capacity", self.input_capacity),
            ("output_capacity", self.output_capacity),
            ("shard_capacity", self.shard_capacity),
        ] {
            if value == 0 {
                return Err(TradebookError::Configuration(format!(
                    "{name} must be greater than zero"
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn with_match_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = policy;
        self
    }
}
