/// Shared value types.
pub mod core;
/// Error taxonomy.
pub mod error;
/// Stopwatch and report timestamps.
pub mod timer;
