use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use serde_json::Value;

/// One billed operation. Immutable once created; appended to a
/// per-provider ledger.
#[derive(Debug, Clone)]
pub struct CostRecord {
    pub provider: String,
    pub service: String,
    pub operation: String,
    pub cost: f64,
    pub tokens: u64,
    pub model: String,
    pub timestamp: SystemTime,
    pub metadata: HashMap<String, Value>,
}

impl CostRecord {
    pub fn new(
        provider: impl Into<String>,
        service: impl Into<String>,
        operation: impl Into<String>,
        cost: f64,
        tokens: u64,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            service: service.into(),
            operation: operation.into(),
            cost,
            tokens,
            model: model.into(),
            timestamp: SystemTime::now(),
            metadata: HashMap::new(),
        }
    }

    /// Override the record timestamp. Mostly useful for backfilling and
    /// for deterministic tests.
    pub fn at(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Trailing aggregation windows for cost summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    Hour,
    Day,
    Week,
    Month,
}

impl TimeRange {
    pub fn duration(&self) -> Duration {
        match self {
            TimeRange::Hour => Duration::from_secs(60 * 60),
            TimeRange::Day => Duration::from_secs(24 * 60 * 60),
            TimeRange::Week => Duration::from_secs(7 * 24 * 60 * 60),
            TimeRange::Month => Duration::from_secs(30 * 24 * 60 * 60),
        }
    }
}

/// Per-operation slice of a cost summary.
#[derive(Debug, Clone, Default)]
pub struct OperationBreakdown {
    pub count: u64,
    pub total_cost: f64,
    pub total_tokens: u64,
    pub average_cost: f64,
}

/// Aggregated spend for one provider over one time range.
#[derive(Debug, Clone)]
pub struct CostSummary {
    pub provider: String,
    pub range: TimeRange,
    pub total_cost: f64,
    pub total_tokens: u64,
    pub operation_count: u64,
    pub operations: HashMap<String, OperationBreakdown>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlertLevel {
    Warning,
    Critical,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertLevel::Warning => write!(f, "warning"),
            AlertLevel::Critical => write!(f, "critical"),
        }
    }
}

/// At most one active alert exists per provider; a new alert replaces an
/// existing one only when its severity is higher.
#[derive(Debug, Clone)]
pub struct BudgetAlert {
    pub provider: String,
    pub current_spend: f64,
    pub budget: f64,
    pub percentage: f64,
    pub level: AlertLevel,
    pub raised_at: SystemTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationKind {
    ExpensiveOperation,
    CachingCandidate,
    BudgetPressure,
}

/// Heuristic optimization hint. Savings figures are estimates, not
/// guarantees.
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub provider: String,
    pub operation: Option<String>,
    pub message: String,
    pub estimated_savings: f64,
}
