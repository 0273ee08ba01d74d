//! System-wide constants for the Tradebook matching engine.

/// Default capacity of the order input channel.
pub const DEFAULT_INPUT_CAPACITY: usize = 1024;

/// Default capacity of the matched-order output channel. Once full, the
/// matching worker waits for the consumer.
pub const DEFAULT_OUTPUT_CAPACITY: usize = 1024;

/// Capacity of each per-asset worker's private input when sharding.
pub const DEFAULT_SHARD_CAPACITY: usize = 256;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Tradebook";
