//! Tests for the orchestrator: fallback chains, availability filtering,
//! strategies, validation and the operational surface.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::{MockProvider, Outcome};
use relayllm::{
    AlertLevel, BreakerConfig, BreakerState, ConfigUpdate, ContentRequest, GenerationRequest,
    IntegrationGate, Orchestrator, ProviderUpdate, RelayError, SelectionStrategy, TaskKind,
    TimeRange,
};

fn pair() -> (Arc<MockProvider>, Arc<MockProvider>) {
    (
        Arc::new(MockProvider::ok("openai", "gpt-4o-mini")),
        Arc::new(MockProvider::ok("anthropic", "claude-sonnet-4-5")),
    )
}

// ============================================================================
// Fallback chain
// ============================================================================

#[tokio::test]
async fn test_primary_failure_falls_back_to_secondary() {
    let openai = Arc::new(MockProvider::failing("openai", "gpt-4o-mini", "boom"));
    let anthropic = Arc::new(MockProvider::ok("anthropic", "claude-sonnet-4-5"));

    let orchestrator = Orchestrator::builder()
        .add_provider(openai.clone())
        .add_provider(anthropic.clone())
        .build()
        .unwrap();

    let response = orchestrator
        .generate_text(GenerationRequest::new("Summarize the morning headlines"))
        .await
        .unwrap();

    assert_eq!(response.content, "anthropic output");
    assert_eq!(openai.calls.load(Ordering::SeqCst), 1);
    assert_eq!(anthropic.calls.load(Ordering::SeqCst), 1);

    // The failure and the success are both on the books.
    let metrics = orchestrator.get_metrics();
    let openai_metrics = metrics.iter().find(|m| m.provider == "openai").unwrap();
    assert_eq!(openai_metrics.failed_requests, 1);
    assert_eq!(openai_metrics.successful_requests, 0);
    let anthropic_metrics = metrics.iter().find(|m| m.provider == "anthropic").unwrap();
    assert_eq!(anthropic_metrics.successful_requests, 1);

    assert_eq!(orchestrator.breaker_failures("openai"), 1);
    assert_eq!(orchestrator.breaker_failures("anthropic"), 0);
}

#[tokio::test]
async fn test_all_providers_failing_reports_every_attempt() {
    let openai = Arc::new(MockProvider::failing("openai", "gpt-4o-mini", "rate limited"));
    let anthropic = Arc::new(MockProvider::failing("anthropic", "claude-sonnet-4-5", "overloaded"));

    let orchestrator = Orchestrator::builder()
        .add_provider(openai)
        .add_provider(anthropic)
        .build()
        .unwrap();

    let err = orchestrator
        .generate_text(GenerationRequest::new("hello"))
        .await
        .unwrap_err();

    match err {
        RelayError::AllProvidersFailed(attempts) => {
            assert_eq!(attempts.len(), 2);
            assert!(attempts.iter().all(|a| !a.skipped));
            assert_eq!(attempts[0].provider, "openai");
            assert_eq!(attempts[1].provider, "anthropic");
            assert!(attempts[0].reason.contains("rate limited"));
        }
        other => panic!("expected AllProvidersFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_provider_times_out_and_falls_back() {
    let openai = Arc::new(MockProvider::slow(
        "openai",
        "gpt-4o-mini",
        Duration::from_millis(300),
    ));
    let anthropic = Arc::new(MockProvider::ok("anthropic", "claude-sonnet-4-5"));

    let orchestrator = Orchestrator::builder()
        .attempt_timeout(Duration::from_millis(50))
        .add_provider(openai)
        .add_provider(anthropic.clone())
        .build()
        .unwrap();

    let response = orchestrator
        .generate_text(GenerationRequest::new("hello"))
        .await
        .unwrap();

    assert_eq!(response.content, "anthropic output");
    let metrics = orchestrator.get_metrics();
    let openai_metrics = metrics.iter().find(|m| m.provider == "openai").unwrap();
    assert_eq!(openai_metrics.failed_requests, 1);
    assert_eq!(orchestrator.breaker_failures("openai"), 1);
}

#[tokio::test]
async fn test_deadline_cuts_the_chain_short() {
    let openai = Arc::new(MockProvider::slow(
        "openai",
        "gpt-4o-mini",
        Duration::from_millis(400),
    ));
    let anthropic = Arc::new(MockProvider::slow(
        "anthropic",
        "claude-sonnet-4-5",
        Duration::from_millis(400),
    ));

    let orchestrator = Orchestrator::builder()
        .add_provider(openai)
        .add_provider(anthropic.clone())
        .build()
        .unwrap();

    let err = orchestrator
        .generate_text(GenerationRequest::new("hello").deadline(Duration::from_millis(100)))
        .await
        .unwrap_err();

    match err {
        RelayError::DeadlineExceeded(attempts) => {
            // The first attempt consumed the whole deadline; the second
            // provider was never called.
            assert_eq!(attempts.len(), 1);
            assert_eq!(attempts[0].provider, "openai");
        }
        other => panic!("expected DeadlineExceeded, got {:?}", other),
    }
    assert_eq!(anthropic.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_no_providers_configured() {
    let orchestrator = Orchestrator::builder().build().unwrap();

    let err = orchestrator
        .generate_text(GenerationRequest::new("hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::Config(_)));
}

// ============================================================================
// Availability filter
// ============================================================================

#[tokio::test]
async fn test_disabled_provider_is_skipped_not_attempted() {
    let (openai, anthropic) = pair();

    let orchestrator = Orchestrator::builder()
        .add_provider(openai.clone())
        .enabled(false)
        .add_provider(anthropic.clone())
        .build()
        .unwrap();

    let response = orchestrator
        .generate_text(GenerationRequest::new("hello"))
        .await
        .unwrap();

    assert_eq!(response.content, "anthropic output");
    assert_eq!(openai.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_every_provider_skipped_explains_why() {
    let (openai, anthropic) = pair();

    let orchestrator = Orchestrator::builder()
        .add_provider(openai)
        .enabled(false)
        .add_provider(anthropic)
        .enabled(false)
        .build()
        .unwrap();

    let err = orchestrator
        .generate_text(GenerationRequest::new("hello"))
        .await
        .unwrap_err();

    match err {
        RelayError::AllProvidersFailed(attempts) => {
            assert_eq!(attempts.len(), 2);
            assert!(attempts.iter().all(|a| a.skipped));
            assert!(attempts.iter().all(|a| a.reason.contains("disabled")));
        }
        other => panic!("expected AllProvidersFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_open_circuit_skips_provider_without_calling_it() {
    let openai = Arc::new(MockProvider::failing("openai", "gpt-4o-mini", "boom"));
    let anthropic = Arc::new(MockProvider::ok("anthropic", "claude-sonnet-4-5"));

    let orchestrator = Orchestrator::builder()
        .breaker_config(BreakerConfig {
            failure_threshold: 1,
            timeout: Duration::from_secs(60),
            half_open_max_calls: 3,
        })
        .add_provider(openai.clone())
        .add_provider(anthropic.clone())
        .build()
        .unwrap();

    // First request: openai fails once, circuit opens, anthropic serves.
    orchestrator
        .generate_text(GenerationRequest::new("first"))
        .await
        .unwrap();
    assert_eq!(orchestrator.breaker_state("openai"), BreakerState::Open);

    // Second request: openai is not even attempted.
    orchestrator
        .generate_text(GenerationRequest::new("second"))
        .await
        .unwrap();
    assert_eq!(openai.calls.load(Ordering::SeqCst), 1);
    assert_eq!(anthropic.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_circuit_recovers_through_half_open_probe() {
    let openai = Arc::new(MockProvider::ok("openai", "gpt-4o-mini"));
    openai.push(Outcome::Fail("transient".to_string()));
    let anthropic = Arc::new(MockProvider::ok("anthropic", "claude-sonnet-4-5"));

    let orchestrator = Orchestrator::builder()
        .breaker_config(BreakerConfig {
            failure_threshold: 1,
            timeout: Duration::from_millis(50),
            half_open_max_calls: 3,
        })
        .add_provider(openai.clone())
        .add_provider(anthropic)
        .build()
        .unwrap();

    orchestrator
        .generate_text(GenerationRequest::new("first"))
        .await
        .unwrap();
    assert_eq!(orchestrator.breaker_state("openai"), BreakerState::Open);

    tokio::time::sleep(Duration::from_millis(80)).await;

    // The half-open probe succeeds and closes the circuit.
    let response = orchestrator
        .generate_text(GenerationRequest::new("second"))
        .await
        .unwrap();
    assert_eq!(response.content, "openai output");
    assert_eq!(orchestrator.breaker_state("openai"), BreakerState::Closed);
    assert_eq!(orchestrator.breaker_failures("openai"), 0);
}

#[tokio::test]
async fn test_request_rate_cap_diverts_traffic() {
    let (openai, anthropic) = pair();

    let orchestrator = Orchestrator::builder()
        .add_provider(openai.clone())
        .max_requests_per_minute(1)
        .add_provider(anthropic.clone())
        .build()
        .unwrap();

    orchestrator
        .generate_text(GenerationRequest::new("first"))
        .await
        .unwrap();
    orchestrator
        .generate_text(GenerationRequest::new("second"))
        .await
        .unwrap();

    assert_eq!(openai.calls.load(Ordering::SeqCst), 1);
    assert_eq!(anthropic.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_hourly_cost_cap_diverts_traffic() {
    let openai = Arc::new(MockProvider::ok("openai", "gpt-4o-mini").with_cost(0.5));
    let anthropic = Arc::new(MockProvider::ok("anthropic", "claude-sonnet-4-5"));

    let orchestrator = Orchestrator::builder()
        .add_provider(openai.clone())
        .max_cost_per_hour(0.4)
        .add_provider(anthropic.clone())
        .build()
        .unwrap();

    // First call lands on openai and pushes its hourly spend past the cap.
    orchestrator
        .generate_text(GenerationRequest::new("first"))
        .await
        .unwrap();
    orchestrator
        .generate_text(GenerationRequest::new("second"))
        .await
        .unwrap();

    assert_eq!(openai.calls.load(Ordering::SeqCst), 1);
    assert_eq!(anthropic.calls.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Strategies and routing
// ============================================================================

#[tokio::test]
async fn test_weighted_strategy_prefers_heavier_provider() {
    let (openai, anthropic) = pair();

    let orchestrator = Orchestrator::builder()
        .strategy(SelectionStrategy::Weighted)
        .add_provider(openai.clone())
        .weight(0.3)
        .add_provider(anthropic.clone())
        .weight(0.9)
        .build()
        .unwrap();

    let response = orchestrator
        .generate_text(GenerationRequest::new("hello"))
        .await
        .unwrap();
    assert_eq!(response.content, "anthropic output");
    assert_eq!(openai.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cost_optimized_strategy_prefers_cheaper_provider() {
    let (openai, anthropic) = pair();

    let orchestrator = Orchestrator::builder()
        .strategy(SelectionStrategy::CostOptimized)
        .add_provider(openai.clone())
        .price_per_1k_tokens(0.009)
        .add_provider(anthropic.clone())
        .price_per_1k_tokens(0.0006)
        .build()
        .unwrap();

    let response = orchestrator
        .generate_text(GenerationRequest::new("hello"))
        .await
        .unwrap();
    assert_eq!(response.content, "anthropic output");
    assert_eq!(openai.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_round_robin_spreads_requests() {
    let (openai, anthropic) = pair();

    let orchestrator = Orchestrator::builder()
        .strategy(SelectionStrategy::RoundRobin)
        .add_provider(openai.clone())
        .add_provider(anthropic.clone())
        .build()
        .unwrap();

    orchestrator
        .generate_text(GenerationRequest::new("first"))
        .await
        .unwrap();
    orchestrator
        .generate_text(GenerationRequest::new("second"))
        .await
        .unwrap();

    assert_eq!(openai.calls.load(Ordering::SeqCst), 1);
    assert_eq!(anthropic.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_task_routing_overrides_declared_order() {
    let (openai, anthropic) = pair();

    let orchestrator = Orchestrator::builder()
        .add_provider(openai.clone())
        .add_provider(anthropic.clone())
        .route_task(TaskKind::CryptoAnalysis, "anthropic")
        .build()
        .unwrap();

    // Routed task goes to the preferred provider.
    let routed = orchestrator
        .generate_text(GenerationRequest::new("BTC outlook").task(TaskKind::CryptoAnalysis))
        .await
        .unwrap();
    assert_eq!(routed.content, "anthropic output");

    // Untasked requests keep the declared order.
    let untasked = orchestrator
        .generate_text(GenerationRequest::new("hello"))
        .await
        .unwrap();
    assert_eq!(untasked.content, "openai output");
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_blank_prompt_is_rejected_before_any_attempt() {
    let (openai, anthropic) = pair();

    let orchestrator = Orchestrator::builder()
        .add_provider(openai.clone())
        .add_provider(anthropic)
        .build()
        .unwrap();

    let err = orchestrator
        .generate_text(GenerationRequest::new("   \n  "))
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::Validation(_)));
    assert_eq!(openai.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_zero_max_tokens_is_rejected() {
    let (openai, anthropic) = pair();
    let orchestrator = Orchestrator::builder()
        .add_provider(openai)
        .add_provider(anthropic)
        .build()
        .unwrap();

    let err = orchestrator
        .generate_text(GenerationRequest::new("hello").max_tokens(0))
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::Validation(_)));
}

#[tokio::test]
async fn test_out_of_range_temperature_is_rejected() {
    let (openai, anthropic) = pair();
    let orchestrator = Orchestrator::builder()
        .add_provider(openai)
        .add_provider(anthropic)
        .build()
        .unwrap();

    let err = orchestrator
        .generate_text(GenerationRequest::new("hello").temperature(2.5))
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::Validation(_)));
}

// ============================================================================
// Content generation
// ============================================================================

#[tokio::test]
async fn test_generate_content_carries_metadata() {
    let (openai, _) = pair();

    let orchestrator = Orchestrator::builder()
        .add_provider(openai)
        .build()
        .unwrap();

    let request = ContentRequest::new(TaskKind::NewsSummary, "Summarize these stories")
        .input("region", "EU")
        .input("count", 3);
    let result = orchestrator.generate_content(request).await.unwrap();

    assert_eq!(result.content, "openai output");
    assert_eq!(result.provider, "openai");
    assert_eq!(result.model, "gpt-4o-mini");
    assert_eq!(result.tokens, 42);
    // No prior history: fully trusted.
    assert_eq!(result.confidence, 1.0);
    assert!(result.quality.completeness > 0.0);
    assert!(result.quality.structure > 0.0);
}

#[tokio::test]
async fn test_confidence_reflects_prior_success_rate() {
    let openai = Arc::new(MockProvider::ok("openai", "gpt-4o-mini"));
    openai.push(Outcome::Fail("warmup failure".to_string()));

    let orchestrator = Orchestrator::builder()
        .add_provider(openai.clone())
        .build()
        .unwrap();

    // Build up history: one failed chain, then one success.
    orchestrator
        .generate_text(GenerationRequest::new("warmup"))
        .await
        .unwrap_err();
    orchestrator
        .generate_text(GenerationRequest::new("warmup"))
        .await
        .unwrap();

    let result = orchestrator
        .generate_content(ContentRequest::new(TaskKind::NewsSummary, "Summarize"))
        .await
        .unwrap();
    // Two attempts, one success at planning time.
    assert!((result.confidence - 0.5).abs() < 1e-9);
}

// ============================================================================
// Operational surface
// ============================================================================

#[tokio::test]
async fn test_reset_metrics_zeroes_every_provider() {
    let (openai, anthropic) = pair();
    let orchestrator = Orchestrator::builder()
        .add_provider(openai)
        .add_provider(anthropic)
        .build()
        .unwrap();

    orchestrator
        .generate_text(GenerationRequest::new("hello"))
        .await
        .unwrap();
    let before = orchestrator.get_metrics();
    assert!(before.iter().any(|m| m.total_requests > 0));

    tokio::time::sleep(Duration::from_millis(10)).await;
    orchestrator.reset_metrics();

    let after = orchestrator.get_metrics();
    assert_eq!(after.len(), 2);
    for snapshot in &after {
        assert_eq!(snapshot.total_requests, 0);
        assert_eq!(snapshot.total_cost, 0.0);
    }
    let before_reset = before.iter().find(|m| m.provider == "openai").unwrap().last_reset;
    let after_reset = after.iter().find(|m| m.provider == "openai").unwrap().last_reset;
    assert!(after_reset > before_reset);
}

#[tokio::test]
async fn test_cost_flows_into_summaries_and_alerts() {
    let openai = Arc::new(MockProvider::ok("openai", "gpt-4o-mini").with_cost(0.02));

    let orchestrator = Orchestrator::builder()
        .add_provider(openai)
        .daily_budget(0.10)
        .build()
        .unwrap();

    for _ in 0..5 {
        orchestrator
            .generate_text(GenerationRequest::new("hello"))
            .await
            .unwrap();
    }

    let summaries = orchestrator.cost_summary(Some("openai"), TimeRange::Day);
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].operation_count, 5);
    assert!((summaries[0].total_cost - 0.10).abs() < 1e-9);

    let alerts = orchestrator.budget_alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, AlertLevel::Critical);

    // A sixth identical call refreshes the alert instead of duplicating it.
    orchestrator
        .generate_text(GenerationRequest::new("hello"))
        .await
        .unwrap();
    let alerts = orchestrator.budget_alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, AlertLevel::Critical);
}

#[tokio::test]
async fn test_derived_health_tracks_breaker_state() {
    let openai = Arc::new(MockProvider::failing("openai", "gpt-4o-mini", "down"));
    let anthropic = Arc::new(MockProvider::ok("anthropic", "claude-sonnet-4-5"));

    let orchestrator = Orchestrator::builder()
        .breaker_config(BreakerConfig {
            failure_threshold: 1,
            timeout: Duration::from_secs(60),
            half_open_max_calls: 3,
        })
        .add_provider(openai)
        .add_provider(anthropic)
        .build()
        .unwrap();

    orchestrator
        .generate_text(GenerationRequest::new("hello"))
        .await
        .unwrap();

    let health = orchestrator.get_provider_health();
    let openai_health = health.iter().find(|h| h.service == "openai").unwrap();
    assert_eq!(openai_health.status, relayllm::HealthState::Unhealthy);
    assert_eq!(orchestrator.system_health(), relayllm::HealthState::Unhealthy);
    // No prober configured, so there is no event stream.
    assert!(orchestrator.subscribe_health().is_none());
}

// ============================================================================
// Reconfiguration
// ============================================================================

#[tokio::test]
async fn test_update_config_disables_provider() {
    let (openai, anthropic) = pair();
    let orchestrator = Orchestrator::builder()
        .add_provider(openai.clone())
        .add_provider(anthropic)
        .build()
        .unwrap();

    orchestrator
        .update_config(ConfigUpdate {
            providers: vec![ProviderUpdate {
                id: "openai".to_string(),
                enabled: Some(false),
                weight: None,
            }],
            ..Default::default()
        })
        .unwrap();

    let response = orchestrator
        .generate_text(GenerationRequest::new("hello"))
        .await
        .unwrap();
    assert_eq!(response.content, "anthropic output");
    assert_eq!(openai.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_update_config_rejects_unknown_provider_without_side_effects() {
    let (openai, anthropic) = pair();
    let orchestrator = Orchestrator::builder()
        .add_provider(openai.clone())
        .add_provider(anthropic)
        .build()
        .unwrap();

    let err = orchestrator
        .update_config(ConfigUpdate {
            providers: vec![
                ProviderUpdate {
                    id: "openai".to_string(),
                    enabled: Some(false),
                    weight: None,
                },
                ProviderUpdate {
                    id: "ghost".to_string(),
                    enabled: Some(false),
                    weight: None,
                },
            ],
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, RelayError::Config(_)));

    // The valid part of the rejected update was not applied either.
    let response = orchestrator
        .generate_text(GenerationRequest::new("hello"))
        .await
        .unwrap();
    assert_eq!(response.content, "openai output");
}

#[tokio::test]
async fn test_update_config_switches_strategy_and_routes() {
    let (openai, anthropic) = pair();
    let orchestrator = Orchestrator::builder()
        .add_provider(openai.clone())
        .weight(0.2)
        .add_provider(anthropic.clone())
        .weight(0.9)
        .build()
        .unwrap();

    // Declared order first.
    let response = orchestrator
        .generate_text(GenerationRequest::new("one"))
        .await
        .unwrap();
    assert_eq!(response.content, "openai output");

    orchestrator
        .update_config(ConfigUpdate {
            strategy: Some(SelectionStrategy::Weighted),
            route_tasks: vec![(TaskKind::NewsSummary, "openai".to_string())],
            ..Default::default()
        })
        .unwrap();

    let response = orchestrator
        .generate_text(GenerationRequest::new("two"))
        .await
        .unwrap();
    assert_eq!(response.content, "anthropic output");

    // The routing hint still beats the weighted order for its task.
    let response = orchestrator
        .generate_text(GenerationRequest::new("three").task(TaskKind::NewsSummary))
        .await
        .unwrap();
    assert_eq!(response.content, "openai output");
}

// ============================================================================
// Builder validation
// ============================================================================

#[test]
fn test_duplicate_provider_ids_fail_to_build() {
    let first = Arc::new(MockProvider::ok("openai", "gpt-4o-mini"));
    let second = Arc::new(MockProvider::ok("openai", "gpt-4o"));

    let result = Orchestrator::builder()
        .add_provider(first)
        .add_provider(second)
        .build();
    assert!(matches!(result, Err(RelayError::Config(_))));
}

#[test]
fn test_out_of_range_weight_fails_to_build() {
    let openai = Arc::new(MockProvider::ok("openai", "gpt-4o-mini"));
    let result = Orchestrator::builder()
        .add_provider(openai)
        .weight(1.5)
        .build();
    assert!(matches!(result, Err(RelayError::Config(_))));
}

#[test]
fn test_routing_to_unregistered_provider_fails_to_build() {
    let openai = Arc::new(MockProvider::ok("openai", "gpt-4o-mini"));
    let result = Orchestrator::builder()
        .add_provider(openai)
        .route_task(TaskKind::NewsSummary, "ghost")
        .build();
    assert!(matches!(result, Err(RelayError::Config(_))));
}

#[test]
#[should_panic(expected = "add_provider")]
fn test_weight_before_add_provider_panics() {
    let _ = Orchestrator::builder().weight(0.5);
}

struct DenyOpenAI;

impl IntegrationGate for DenyOpenAI {
    fn is_integration_enabled(&self, provider: &str) -> bool {
        provider != "openai"
    }
}

#[tokio::test]
async fn test_integration_gate_drops_provider_at_build() {
    let (openai, anthropic) = pair();

    let orchestrator = Orchestrator::builder()
        .integration_gate(Arc::new(DenyOpenAI))
        .add_provider(openai.clone())
        .add_provider(anthropic)
        .build()
        .unwrap();

    let metrics = orchestrator.get_metrics();
    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0].provider, "anthropic");

    let response = orchestrator
        .generate_text(GenerationRequest::new("hello"))
        .await
        .unwrap();
    assert_eq!(response.content, "anthropic output");
    assert_eq!(openai.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_routing_to_gated_out_provider_fails_to_build() {
    let (openai, anthropic) = pair();

    let result = Orchestrator::builder()
        .integration_gate(Arc::new(DenyOpenAI))
        .add_provider(openai)
        .add_provider(anthropic)
        .route_task(TaskKind::NewsSummary, "openai")
        .build();
    assert!(matches!(result, Err(RelayError::Config(_))));
}
