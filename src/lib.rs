//! relayllm turns a content-generation request into a reliable call
//! against one of several interchangeable, unreliable, rate-limited and
//! differently-priced upstream text-generation providers.
//!
//! # Features
//!
//! - **Fallback chains**: sequential, ordered attempts across candidate
//!   providers until one succeeds or all are exhausted
//! - **Selection strategies**: round robin, weighted, cost-optimized and
//!   performance-based candidate ordering, plus per-task routing hints
//! - **Circuit breakers**: per-provider closed/open/half-open gating
//!   driven by consecutive-failure counting
//! - **Health probing**: independent periodic probes classifying each
//!   provider as healthy, degraded or unhealthy
//! - **Cost tracking**: a per-provider spend ledger with budget alerts
//!   and heuristic optimization recommendations
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use relayllm::{Orchestrator, GenerationRequest, SelectionStrategy, TaskKind};
//! # use relayllm::ProviderClient;
//!
//! # async fn example(openai: Arc<dyn ProviderClient + Send + Sync>,
//! #                  anthropic: Arc<dyn ProviderClient + Send + Sync>) {
//! let orchestrator = Orchestrator::builder()
//!     .strategy(SelectionStrategy::CostOptimized)
//!     .add_provider(openai)
//!     .weight(0.7)
//!     .price_per_1k_tokens(0.0006)
//!     .add_provider(anthropic)
//!     .weight(0.3)
//!     .price_per_1k_tokens(0.009)
//!     .route_task(TaskKind::NewsSummary, "openai")
//!     .build()
//!     .expect("Failed to build orchestrator");
//!
//! let request = GenerationRequest::new("Summarize today's market headlines")
//!     .task(TaskKind::NewsSummary)
//!     .max_tokens(500);
//!
//! let response = orchestrator.generate_text(request).await.unwrap();
//! println!("{}", response.content);
//! # }
//! ```

pub mod providers;
pub mod errors;
pub mod constants;
pub mod breaker;
pub mod metrics;
pub mod cost;
pub mod health;
pub mod orchestrator;
pub mod config;

pub use providers::{
    ProviderClient,
    ProviderRequest,
    ProviderResponse,
    Message,
    TokenUsage,
    HealthState,
    HealthReport,
    IntegrationGate,
    AllowAllIntegrations,
};

pub use errors::{ProviderAttempt, RelayError, RelayResult};

pub use breaker::{BreakerConfig, BreakerRegistry, BreakerState};

pub use metrics::{MetricsRegistry, MetricsSnapshot};

pub use cost::{
    AlertLevel, BudgetAlert, CostRecord, CostSummary, CostTracker, Recommendation,
    RecommendationKind, TimeRange,
};

pub use health::{HealthEvent, HealthProber, HealthThresholds, ServiceHealth};

pub use orchestrator::{
    ConfigUpdate, ContentRequest, ContentResult, GenerationRequest, Orchestrator,
    OrchestratorBuilder, ProviderSettings, ProviderUpdate, QualityScores, SelectionStrategy,
    TaskKind, TaskProfile, TaskRouting,
};

/// Initialize the logging system
///
/// This should be called at the start of your application in case
/// you want to activate the library's debug and info logging.
pub fn use_logging() {
    env_logger::init();
}
