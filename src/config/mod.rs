//! Declarative TOML configuration for the orchestrator.
//!
//! An alternative to the builder pattern for deployments that prefer
//! managing the provider pool, strategy and budgets as a file.
//!
//! # Example Configuration File
//!
//! ```toml
//! [settings]
//! strategy = "cost_optimized"
//! attempt_timeout_ms = 20000
//! default_daily_budget = 5.0
//!
//! [[tasks]]
//! task = "news_summary"
//! preferred_provider = "openai-mini"
//! max_tokens = 500
//!
//! [[providers]]
//! id = "openai-mini"
//! model = "gpt-4o-mini"
//! weight = 0.7
//! price_per_1k_tokens = 0.0006
//!
//! [[providers]]
//! id = "anthropic"
//! model = "claude-sonnet-4-5"
//! weight = 0.3
//! price_per_1k_tokens = 0.009
//! max_cost_per_hour = 2.0
//! ```

mod types;
mod loader;

pub use types::{Config, Settings, TaskConfig, ProviderConfig};
pub use loader::{load_config, parse_config};
