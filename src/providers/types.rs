use std::time::Duration;
use serde::{Serialize, Deserialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderRequest {
    pub messages: Vec<Message>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl ProviderRequest {
    /// Build a single-turn user request from a raw prompt.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.into(),
            }],
            model: None,
            max_tokens: None,
            temperature: None,
        }
    }

    /// Total character length of the request content, used by the
    /// cost-optimized strategy's token estimation heuristic.
    pub fn content_len(&self) -> u64 {
        self.messages.iter().map(|m| m.content.len() as u64).sum()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderResponse {
    pub content: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
    /// Billed cost of this call in USD as reported by the adapter.
    pub cost: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Coarse health classification shared by probe reports and the prober's
/// own per-service verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthState::Healthy => write!(f, "healthy"),
            HealthState::Degraded => write!(f, "degraded"),
            HealthState::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Result of a single `ProviderClient::health_check` call.
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub status: HealthState,
    pub response_time: Duration,
    pub details: Option<String>,
}

impl HealthReport {
    pub fn healthy(response_time: Duration) -> Self {
        Self { status: HealthState::Healthy, response_time, details: None }
    }
}
