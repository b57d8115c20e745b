/// Cost ledger, budget alerting and optimization hints.
///
/// Every billed operation is appended to a per-provider ledger with its
/// timestamp, pruned after a 30-day retention window. Budget alerts are a
/// side channel: they never block a request.
pub mod types;
pub mod tracker;

pub use types::{
    AlertLevel, BudgetAlert, CostRecord, CostSummary, OperationBreakdown, Recommendation,
    RecommendationKind, TimeRange,
};
pub use tracker::CostTracker;
