use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::debug;
use serde::{Serialize, Deserialize};

use crate::constants::ESTIMATED_CHARS_PER_TOKEN;

/// Load-balancing strategies determining candidate provider order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    RoundRobin,
    Weighted,
    CostOptimized,
    PerformanceBased,
}

impl SelectionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionStrategy::RoundRobin => "round_robin",
            SelectionStrategy::Weighted => "weighted",
            SelectionStrategy::CostOptimized => "cost_optimized",
            SelectionStrategy::PerformanceBased => "performance_based",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "round_robin" => Some(SelectionStrategy::RoundRobin),
            "weighted" => Some(SelectionStrategy::Weighted),
            "cost_optimized" => Some(SelectionStrategy::CostOptimized),
            "performance_based" => Some(SelectionStrategy::PerformanceBased),
            _ => None,
        }
    }
}

/// Metrics slice the performance strategy sorts on.
#[derive(Debug, Clone, Copy)]
pub struct CandidateMetrics {
    pub total_requests: u64,
    pub success_rate: f64,
    pub avg_response_ms: f64,
}

/// One available provider as seen by the selector: enabled, circuit
/// closed (or probing), and under its rate caps. Candidates arrive in
/// declared registration order, which every sort preserves on ties.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: String,
    pub weight: f64,
    pub price_per_1k_tokens: f64,
    pub metrics: Option<CandidateMetrics>,
}

/// Orders candidate providers according to the configured strategy.
pub struct ProviderSelector {
    cursor: AtomicUsize,
}

impl ProviderSelector {
    pub fn new() -> Self {
        Self {
            cursor: AtomicUsize::new(0),
        }
    }

    /// Fixed heuristic: total character length divided by four. Not a
    /// real tokenizer.
    pub fn estimated_tokens(content_chars: u64) -> u64 {
        (content_chars / ESTIMATED_CHARS_PER_TOKEN).max(1)
    }

    /// Estimated cost of a request, billed in 1K-token increments.
    pub fn estimated_cost(tokens: u64, price_per_1k_tokens: f64) -> f64 {
        (tokens as f64 / 1000.0).ceil() * price_per_1k_tokens
    }

    /// Produce the ordered candidate list for one request.
    ///
    /// With no strategy configured, the declared order is kept. The
    /// task-routing preference is applied last as a reordering hint,
    /// moving the designated provider to the front.
    pub fn order(
        &self,
        candidates: &[Candidate],
        strategy: Option<SelectionStrategy>,
        estimated_tokens: u64,
        preferred: Option<&str>,
    ) -> Vec<String> {
        let mut ordered: Vec<&Candidate> = candidates.iter().collect();

        match strategy {
            None => {}
            Some(SelectionStrategy::RoundRobin) => {
                if !ordered.is_empty() {
                    let offset = self.cursor.fetch_add(1, Ordering::Relaxed) % ordered.len();
                    ordered.rotate_left(offset);
                }
            }
            Some(SelectionStrategy::Weighted) => {
                // Stable sort: equal weights keep registration order.
                ordered.sort_by(|a, b| {
                    b.weight
                        .partial_cmp(&a.weight)
                        .unwrap_or(CmpOrdering::Equal)
                });
            }
            Some(SelectionStrategy::CostOptimized) => {
                ordered.sort_by(|a, b| {
                    let cost_a = Self::estimated_cost(estimated_tokens, a.price_per_1k_tokens);
                    let cost_b = Self::estimated_cost(estimated_tokens, b.price_per_1k_tokens);
                    cost_a.partial_cmp(&cost_b).unwrap_or(CmpOrdering::Equal)
                });
            }
            Some(SelectionStrategy::PerformanceBased) => {
                // Providers with no recorded requests sort after those
                // with history.
                ordered.sort_by(|a, b| match (perf_score(a), perf_score(b)) {
                    (Some(sa), Some(sb)) => sb.partial_cmp(&sa).unwrap_or(CmpOrdering::Equal),
                    (Some(_), None) => CmpOrdering::Less,
                    (None, Some(_)) => CmpOrdering::Greater,
                    (None, None) => CmpOrdering::Equal,
                });
            }
        }

        let mut ids: Vec<String> = ordered.iter().map(|c| c.id.clone()).collect();

        if let Some(preferred) = preferred {
            if let Some(pos) = ids.iter().position(|id| id == preferred) {
                let id = ids.remove(pos);
                ids.insert(0, id);
            }
        }

        debug!(
            "Selector ordered {} candidate(s) via {:?}: {:?}",
            ids.len(),
            strategy.map(|s| s.as_str()),
            ids
        );
        ids
    }
}

impl Default for ProviderSelector {
    fn default() -> Self {
        Self::new()
    }
}

fn perf_score(candidate: &Candidate) -> Option<f64> {
    candidate
        .metrics
        .filter(|m| m.total_requests > 0)
        .map(|m| m.success_rate - m.avg_response_ms / 10_000.0)
}
