use std::collections::HashMap;
use std::time::Duration;

use serde::{Serialize, Deserialize};
use serde_json::Value;

use crate::orchestrator::selector::SelectionStrategy;
use crate::orchestrator::tasks::TaskKind;

/// Static configuration for one provider in the candidate pool.
///
/// Immutable during a request; replaceable through
/// `Orchestrator::update_config`.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub id: String,
    pub model: String,
    /// Relative preference for the weighted strategy, 0.0 to 1.0.
    pub weight: f64,
    /// Price per 1K tokens in USD, for the cost-optimized strategy.
    pub price_per_1k_tokens: f64,
    pub enabled: bool,
    pub max_requests_per_minute: Option<u64>,
    pub max_cost_per_hour: Option<f64>,
}

/// User-facing request for plain text generation.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GenerationRequest {
    pub prompt: String,
    pub task: Option<TaskKind>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Overall deadline for the whole fallback chain.
    pub deadline: Option<Duration>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        GenerationRequest {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Sets the target task for this request.
    pub fn task(mut self, task: TaskKind) -> Self {
        self.task = Some(task);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Request for briefing content generation: a task type, an input
/// payload, and output constraints.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContentRequest {
    pub task: TaskKind,
    pub prompt: String,
    /// Free-form input payload, folded into the prompt as context.
    pub inputs: HashMap<String, Value>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub deadline: Option<Duration>,
}

impl ContentRequest {
    pub fn new(task: TaskKind, prompt: impl Into<String>) -> Self {
        Self {
            task,
            prompt: prompt.into(),
            inputs: HashMap::new(),
            max_tokens: None,
            temperature: None,
            deadline: None,
        }
    }

    pub fn input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Heuristic quality estimate of generated content. Length and shape
/// based, not a semantic judgement.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct QualityScores {
    pub completeness: f64,
    pub structure: f64,
}

/// Result of a content generation call, created per call and not
/// persisted by the core.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContentResult {
    pub content: String,
    pub provider: String,
    pub model: String,
    pub tokens: u64,
    pub cost: f64,
    pub generation_time: Duration,
    /// Success-history-derived confidence in the serving provider.
    pub confidence: f64,
    pub quality: QualityScores,
}

/// Partial reconfiguration applied atomically by
/// `Orchestrator::update_config`. Unset fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
    pub strategy: Option<SelectionStrategy>,
    /// When true, clears the strategy back to declared order.
    /// Takes precedence over `strategy`.
    pub use_declared_order: bool,
    pub attempt_timeout: Option<Duration>,
    pub providers: Vec<ProviderUpdate>,
    pub budgets: Vec<(String, f64)>,
    pub route_tasks: Vec<(TaskKind, String)>,
}

#[derive(Debug, Clone)]
pub struct ProviderUpdate {
    pub id: String,
    pub enabled: Option<bool>,
    pub weight: Option<f64>,
}
