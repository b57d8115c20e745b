use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use log::{info, warn};

use crate::constants::{
    BUDGET_CRITICAL_RATIO, BUDGET_PRESSURE_RATIO, BUDGET_WARNING_RATIO,
    CACHING_CANDIDATE_MAX_AVG_COST, CACHING_CANDIDATE_MIN_CALLS, COST_RETENTION_DAYS,
    DEFAULT_DAILY_BUDGET, EXPENSIVE_OPERATION_AVG_COST,
};
use crate::cost::types::{
    AlertLevel, BudgetAlert, CostRecord, CostSummary, OperationBreakdown, Recommendation,
    RecommendationKind, TimeRange,
};

struct CostState {
    ledgers: HashMap<String, Vec<CostRecord>>,
    budgets: HashMap<String, f64>,
    alerts: HashMap<String, BudgetAlert>,
}

/// Records every billed operation, aggregates spend by trailing time
/// window, raises budget alerts and produces optimization hints.
pub struct CostTracker {
    state: Mutex<CostState>,
    default_daily_budget: f64,
    retention: Duration,
}

impl CostTracker {
    pub fn new() -> Self {
        Self::with_default_budget(DEFAULT_DAILY_BUDGET)
    }

    pub fn with_default_budget(default_daily_budget: f64) -> Self {
        Self {
            state: Mutex::new(CostState {
                ledgers: HashMap::new(),
                budgets: HashMap::new(),
                alerts: HashMap::new(),
            }),
            default_daily_budget,
            retention: Duration::from_secs(COST_RETENTION_DAYS * 24 * 60 * 60),
        }
    }

    /// Append a record to the provider's ledger, prune expired records,
    /// and re-evaluate the provider's daily budget.
    pub fn track(&self, record: CostRecord) {
        let mut state = self.state.lock().unwrap();
        let provider = record.provider.clone();

        let ledger = state.ledgers.entry(provider.clone()).or_default();
        ledger.push(record);

        // Retention is enforced on every write to bound memory.
        let cutoff = SystemTime::now()
            .checked_sub(self.retention)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        ledger.retain(|r| r.timestamp >= cutoff);

        self.evaluate_budget(&mut state, &provider);
    }

    /// Daily spend vs. budget, upgrade-only alert policy: >= 90% raises
    /// critical, >= 75% raises warning, an existing alert is never
    /// downgraded and never duplicated at the same severity.
    fn evaluate_budget(&self, state: &mut CostState, provider: &str) {
        let budget = *state
            .budgets
            .get(provider)
            .unwrap_or(&self.default_daily_budget);
        if budget <= 0.0 {
            return;
        }

        let spend = Self::spend_in(&state.ledgers, provider, TimeRange::Day.duration());
        let ratio = spend / budget;

        let level = if ratio >= BUDGET_CRITICAL_RATIO {
            AlertLevel::Critical
        } else if ratio >= BUDGET_WARNING_RATIO {
            AlertLevel::Warning
        } else {
            return;
        };

        match state.alerts.get_mut(provider) {
            Some(existing) if existing.level >= level => {
                // Same or lower severity: refresh the figures, keep the alert.
                existing.current_spend = spend;
                existing.percentage = ratio * 100.0;
            }
            _ => {
                warn!(
                    "Budget alert for '{}': ${:.4} of ${:.4} ({:.0}%, {})",
                    provider,
                    spend,
                    budget,
                    ratio * 100.0,
                    level
                );
                state.alerts.insert(
                    provider.to_string(),
                    BudgetAlert {
                        provider: provider.to_string(),
                        current_spend: spend,
                        budget,
                        percentage: ratio * 100.0,
                        level,
                        raised_at: SystemTime::now(),
                    },
                );
            }
        }
    }

    fn spend_in(ledgers: &HashMap<String, Vec<CostRecord>>, provider: &str, window: Duration) -> f64 {
        let cutoff = SystemTime::now()
            .checked_sub(window)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        ledgers
            .get(provider)
            .map(|ledger| {
                ledger
                    .iter()
                    .filter(|r| r.timestamp >= cutoff)
                    .map(|r| r.cost)
                    .sum()
            })
            .unwrap_or(0.0)
    }

    /// Spend for one provider within a trailing window. Backs the
    /// per-provider hourly cost cap.
    pub fn spend_within(&self, provider: &str, window: Duration) -> f64 {
        let state = self.state.lock().unwrap();
        Self::spend_in(&state.ledgers, provider, window)
    }

    /// Aggregate spend per provider over a trailing time range. With
    /// `provider` set, only that provider's summary is returned.
    pub fn summary(&self, provider: Option<&str>, range: TimeRange) -> Vec<CostSummary> {
        let state = self.state.lock().unwrap();
        let cutoff = SystemTime::now()
            .checked_sub(range.duration())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let mut summaries: Vec<CostSummary> = state
            .ledgers
            .iter()
            .filter(|(id, _)| provider.map(|p| p == id.as_str()).unwrap_or(true))
            .map(|(id, ledger)| {
                let mut summary = CostSummary {
                    provider: id.clone(),
                    range,
                    total_cost: 0.0,
                    total_tokens: 0,
                    operation_count: 0,
                    operations: HashMap::new(),
                };
                for record in ledger.iter().filter(|r| r.timestamp >= cutoff) {
                    summary.total_cost += record.cost;
                    summary.total_tokens += record.tokens;
                    summary.operation_count += 1;

                    let breakdown = summary
                        .operations
                        .entry(record.operation.clone())
                        .or_default();
                    breakdown.count += 1;
                    breakdown.total_cost += record.cost;
                    breakdown.total_tokens += record.tokens;
                }
                for breakdown in summary.operations.values_mut() {
                    breakdown.average_cost = breakdown.total_cost / breakdown.count as f64;
                }
                summary
            })
            .collect();

        summaries.sort_by(|a, b| a.provider.cmp(&b.provider));
        summaries
    }

    /// Set the daily budget for a provider. Takes effect on the next
    /// tracked cost.
    pub fn set_budget(&self, provider: impl Into<String>, amount: f64) {
        let provider = provider.into();
        info!("Daily budget for '{}' set to ${:.4}", provider, amount);
        let mut state = self.state.lock().unwrap();
        state.budgets.insert(provider, amount);
    }

    /// Currently active budget alerts, at most one per provider.
    pub fn budget_alerts(&self) -> Vec<BudgetAlert> {
        let state = self.state.lock().unwrap();
        let mut alerts: Vec<BudgetAlert> = state.alerts.values().cloned().collect();
        alerts.sort_by(|a, b| a.provider.cmp(&b.provider));
        alerts
    }

    /// Clear a provider's active alert. Alerts are never downgraded
    /// automatically mid-day; this is the explicit escape hatch.
    pub fn clear_alert(&self, provider: &str) {
        let mut state = self.state.lock().unwrap();
        state.alerts.remove(provider);
    }

    /// Heuristic optimization hints over the trailing month: expensive
    /// operations, high-volume low-cost caching candidates, and providers
    /// nearing their daily budget.
    pub fn recommendations(&self) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        for summary in self.summary(None, TimeRange::Month) {
            for (operation, breakdown) in &summary.operations {
                if breakdown.average_cost > EXPENSIVE_OPERATION_AVG_COST {
                    recommendations.push(Recommendation {
                        kind: RecommendationKind::ExpensiveOperation,
                        provider: summary.provider.clone(),
                        operation: Some(operation.clone()),
                        message: format!(
                            "Operation '{}' on '{}' averages ${:.4} per call; consider a cheaper model or shorter prompts",
                            operation, summary.provider, breakdown.average_cost
                        ),
                        // Assume a cheaper configuration lands at the threshold.
                        estimated_savings: (breakdown.average_cost
                            - EXPENSIVE_OPERATION_AVG_COST)
                            * breakdown.count as f64,
                    });
                } else if breakdown.count >= CACHING_CANDIDATE_MIN_CALLS
                    && breakdown.average_cost < CACHING_CANDIDATE_MAX_AVG_COST
                {
                    recommendations.push(Recommendation {
                        kind: RecommendationKind::CachingCandidate,
                        provider: summary.provider.clone(),
                        operation: Some(operation.clone()),
                        message: format!(
                            "Operation '{}' on '{}' ran {} times; caching repeated outputs could absorb much of it",
                            operation, summary.provider, breakdown.count
                        ),
                        // Assume roughly half the volume is cacheable.
                        estimated_savings: breakdown.total_cost * 0.5,
                    });
                }
            }
        }

        let state = self.state.lock().unwrap();
        let providers: Vec<String> = state.ledgers.keys().cloned().collect();
        for provider in providers {
            let budget = *state
                .budgets
                .get(&provider)
                .unwrap_or(&self.default_daily_budget);
            if budget <= 0.0 {
                continue;
            }
            let spend = Self::spend_in(&state.ledgers, &provider, TimeRange::Day.duration());
            if spend / budget >= BUDGET_PRESSURE_RATIO {
                recommendations.push(Recommendation {
                    kind: RecommendationKind::BudgetPressure,
                    provider: provider.clone(),
                    operation: None,
                    message: format!(
                        "Provider '{}' has spent ${:.4} of its ${:.4} daily budget; shift traffic to a cheaper provider",
                        provider, spend, budget
                    ),
                    estimated_savings: spend - budget * BUDGET_PRESSURE_RATIO,
                });
            }
        }

        recommendations
    }
}

impl Default for CostTracker {
    fn default() -> Self {
        Self::new()
    }
}
