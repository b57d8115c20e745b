/// Per-provider performance counters.
///
/// Every attempt the orchestrator makes lands here: totals, a running-mean
/// latency, token and cost accumulation, and a rolling one-minute attempt
/// window backing the optional per-provider request-rate cap.
pub mod registry;

pub use registry::{MetricsRegistry, MetricsSnapshot};
