//! Configuration types for TOML-based configuration.
//!
//! These types map directly to the TOML configuration file structure.

use serde::Deserialize;

use crate::constants::{
    DEFAULT_ATTEMPT_TIMEOUT_SECS, DEFAULT_BREAKER_TIMEOUT_SECS, DEFAULT_DAILY_BUDGET,
    DEFAULT_FAILURE_THRESHOLD, DEFAULT_HALF_OPEN_MAX_CALLS, DEFAULT_MAX_ERROR_RATE,
    DEFAULT_MAX_RESPONSE_TIME_MS, DEFAULT_MIN_UPTIME,
};

/// Root configuration structure.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Global settings for the orchestrator.
    #[serde(default)]
    pub settings: Settings,

    /// Task routing profiles.
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,

    /// Provider pool, in declared (primary-first) order.
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

/// Global settings for the orchestrator.
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Load balancing strategy: "round_robin", "weighted",
    /// "cost_optimized" or "performance_based". Omit to keep the
    /// declared provider order.
    pub strategy: Option<String>,

    /// Per-attempt timeout in milliseconds.
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,

    /// Consecutive failures before a provider's circuit opens.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Seconds an open circuit waits before allowing a probing call.
    #[serde(default = "default_breaker_timeout_secs")]
    pub breaker_timeout_secs: u64,

    /// Calls admitted while half-open.
    #[serde(default = "default_half_open_max_calls")]
    pub half_open_max_calls: u32,

    /// Daily budget in USD for providers without an explicit one.
    #[serde(default = "default_daily_budget")]
    pub default_daily_budget: f64,

    /// Background probe interval in seconds. Omit to disable probing.
    pub probe_interval_secs: Option<u64>,

    #[serde(default = "default_max_response_time_ms")]
    pub max_response_time_ms: u64,

    #[serde(default = "default_max_error_rate")]
    pub max_error_rate: f64,

    #[serde(default = "default_min_uptime")]
    pub min_uptime: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strategy: None,
            attempt_timeout_ms: default_attempt_timeout_ms(),
            failure_threshold: default_failure_threshold(),
            breaker_timeout_secs: default_breaker_timeout_secs(),
            half_open_max_calls: default_half_open_max_calls(),
            default_daily_budget: default_daily_budget(),
            probe_interval_secs: None,
            max_response_time_ms: default_max_response_time_ms(),
            max_error_rate: default_max_error_rate(),
            min_uptime: default_min_uptime(),
        }
    }
}

fn default_attempt_timeout_ms() -> u64 {
    DEFAULT_ATTEMPT_TIMEOUT_SECS * 1000
}

fn default_failure_threshold() -> u32 {
    DEFAULT_FAILURE_THRESHOLD
}

fn default_breaker_timeout_secs() -> u64 {
    DEFAULT_BREAKER_TIMEOUT_SECS
}

fn default_half_open_max_calls() -> u32 {
    DEFAULT_HALF_OPEN_MAX_CALLS
}

fn default_daily_budget() -> f64 {
    DEFAULT_DAILY_BUDGET
}

fn default_max_response_time_ms() -> u64 {
    DEFAULT_MAX_RESPONSE_TIME_MS
}

fn default_max_error_rate() -> f64 {
    DEFAULT_MAX_ERROR_RATE
}

fn default_min_uptime() -> f64 {
    DEFAULT_MIN_UPTIME
}

/// Task routing profile configuration.
#[derive(Debug, Deserialize)]
pub struct TaskConfig {
    /// Task type: "news_summary", "crypto_analysis",
    /// "political_briefing" or "personalized_content".
    pub task: String,

    /// Provider tried first for this task.
    pub preferred_provider: Option<String>,

    /// Maximum tokens for this task.
    pub max_tokens: Option<u32>,

    /// Temperature setting for this task.
    pub temperature: Option<f32>,
}

/// Provider pool entry configuration.
#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
    /// Stable provider identifier, matched against the supplied client.
    pub id: String,

    /// Model identifier (e.g. "gpt-4o-mini", "claude-sonnet-4-5").
    pub model: String,

    /// Relative preference for the weighted strategy, 0.0 to 1.0.
    #[serde(default = "default_weight")]
    pub weight: f64,

    /// Price per 1K tokens in USD.
    #[serde(default)]
    pub price_per_1k_tokens: f64,

    /// Whether this provider is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Optional request-rate cap.
    pub max_requests_per_minute: Option<u64>,

    /// Optional trailing-hour cost cap in USD.
    pub max_cost_per_hour: Option<f64>,

    /// Optional daily budget in USD.
    pub daily_budget: Option<f64>,
}

fn default_weight() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}
