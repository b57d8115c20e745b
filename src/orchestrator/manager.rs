use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use log::{debug, warn};
use tokio::sync::broadcast;

use crate::breaker::{BreakerRegistry, BreakerState};
use crate::constants::{DEFAULT_MAX_ERROR_RATE, DEFAULT_MAX_TOKENS};
use crate::cost::{BudgetAlert, CostRecord, CostSummary, CostTracker, Recommendation, TimeRange};
use crate::errors::{ProviderAttempt, RelayError, RelayResult};
use crate::health::{HealthEvent, HealthProber, ServiceHealth};
use crate::metrics::{MetricsRegistry, MetricsSnapshot};
use crate::orchestrator::builder::OrchestratorBuilder;
use crate::orchestrator::selector::{Candidate, CandidateMetrics, ProviderSelector, SelectionStrategy};
use crate::orchestrator::tasks::{TaskKind, TaskRouting};
use crate::orchestrator::types::{
    ConfigUpdate, ContentRequest, ContentResult, GenerationRequest, ProviderSettings,
    QualityScores,
};
use crate::providers::{HealthState, ProviderClient, ProviderRequest, ProviderResponse};

pub(crate) struct ProviderEntry {
    pub settings: ProviderSettings,
    pub client: Arc<dyn ProviderClient + Send + Sync>,
}

pub(crate) struct OrchestratorSettings {
    pub strategy: Option<SelectionStrategy>,
    pub attempt_timeout: Duration,
    pub routing: TaskRouting,
}

/// The façade consumed by the rest of the backend.
///
/// Combines the provider selector, circuit breaker registry, metrics
/// registry, cost tracker and (optionally) the health prober to execute
/// generation requests as a sequential fallback chain: one provider in
/// flight per logical request, candidates tried strictly in selector
/// order, only total exhaustion propagating to the caller.
pub struct Orchestrator {
    entries: RwLock<Vec<ProviderEntry>>,
    settings: RwLock<OrchestratorSettings>,
    selector: ProviderSelector,
    breakers: Arc<BreakerRegistry>,
    metrics: Arc<MetricsRegistry>,
    costs: Arc<CostTracker>,
    prober: Option<Arc<HealthProber>>,
}

struct PlannedCandidate {
    settings: ProviderSettings,
    client: Arc<dyn ProviderClient + Send + Sync>,
    prior_success_rate: Option<f64>,
}

struct ExecutionOutcome {
    response: ProviderResponse,
    provider: String,
    elapsed: Duration,
    prior_success_rate: Option<f64>,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    pub(crate) fn from_parts(
        entries: Vec<ProviderEntry>,
        settings: OrchestratorSettings,
        breakers: Arc<BreakerRegistry>,
        metrics: Arc<MetricsRegistry>,
        costs: Arc<CostTracker>,
        prober: Option<Arc<HealthProber>>,
    ) -> Self {
        Self {
            entries: RwLock::new(entries),
            settings: RwLock::new(settings),
            selector: ProviderSelector::new(),
            breakers,
            metrics,
            costs,
            prober,
        }
    }

    /// Generate plain text, falling back across providers until one
    /// succeeds or all are exhausted.
    pub async fn generate_text(&self, request: GenerationRequest) -> RelayResult<ProviderResponse> {
        validate_prompt(&request.prompt)?;
        validate_constraints(request.max_tokens, request.temperature)?;

        let (task_max_tokens, task_temperature) = self.task_defaults(request.task);
        let provider_request = ProviderRequest {
            messages: ProviderRequest::from_prompt(request.prompt.clone()).messages,
            model: request.model.clone(),
            max_tokens: Some(
                request
                    .max_tokens
                    .or(task_max_tokens)
                    .unwrap_or(DEFAULT_MAX_TOKENS),
            ),
            temperature: request.temperature.or(task_temperature),
        };

        let outcome = self
            .execute(request.task, provider_request, request.deadline, "generate_text")
            .await?;
        Ok(outcome.response)
    }

    /// Generate briefing content for a task, returning the content plus
    /// generation metadata and heuristic quality scores.
    pub async fn generate_content(&self, request: ContentRequest) -> RelayResult<ContentResult> {
        validate_prompt(&request.prompt)?;
        validate_constraints(request.max_tokens, request.temperature)?;

        let (task_max_tokens, task_temperature) = self.task_defaults(Some(request.task));
        let prompt = render_prompt(&request);
        let provider_request = ProviderRequest {
            messages: ProviderRequest::from_prompt(prompt).messages,
            model: None,
            max_tokens: Some(
                request
                    .max_tokens
                    .or(task_max_tokens)
                    .unwrap_or(DEFAULT_MAX_TOKENS),
            ),
            temperature: request.temperature.or(task_temperature),
        };

        let outcome = self
            .execute(
                Some(request.task),
                provider_request,
                request.deadline,
                request.task.as_str(),
            )
            .await?;

        let tokens = outcome
            .response
            .usage
            .as_ref()
            .map(|u| u.total_tokens as u64)
            .unwrap_or(0);

        Ok(ContentResult {
            quality: score_quality(&outcome.response.content),
            // Providers with no history count as fully trusted.
            confidence: outcome.prior_success_rate.unwrap_or(1.0).clamp(0.0, 1.0),
            content: outcome.response.content,
            provider: outcome.provider,
            model: outcome.response.model,
            tokens,
            cost: outcome.response.cost,
            generation_time: outcome.elapsed,
        })
    }

    /// The shared fallback chain.
    async fn execute(
        &self,
        task: Option<TaskKind>,
        provider_request: ProviderRequest,
        deadline: Option<Duration>,
        operation: &str,
    ) -> RelayResult<ExecutionOutcome> {
        let started = Instant::now();

        let (attempt_timeout, strategy, preferred) = {
            let settings = self.settings.read().unwrap();
            (
                settings.attempt_timeout,
                settings.strategy,
                task.and_then(|t| settings.routing.route(t).map(str::to_string)),
            )
        };

        let pool: Vec<(ProviderSettings, Arc<dyn ProviderClient + Send + Sync>)> = {
            let entries = self.entries.read().unwrap();
            entries
                .iter()
                .map(|e| (e.settings.clone(), e.client.clone()))
                .collect()
        };
        if pool.is_empty() {
            return Err(RelayError::Config("No providers configured".to_string()));
        }

        // Availability filter. Filtered-out providers are recorded as
        // skipped so the aggregate error can explain them; they never
        // count as attempts.
        let mut attempts: Vec<ProviderAttempt> = Vec::new();
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut planned: HashMap<String, PlannedCandidate> = HashMap::new();

        for (settings, client) in pool {
            let id = settings.id.clone();
            if !settings.enabled {
                attempts.push(ProviderAttempt::skipped(&id, "provider disabled"));
                continue;
            }
            if !self.breakers.is_available(&id) {
                attempts.push(ProviderAttempt::skipped(&id, "circuit open"));
                continue;
            }
            if let Some(cap) = settings.max_requests_per_minute {
                if self.metrics.requests_last_minute(&id) >= cap {
                    attempts.push(ProviderAttempt::skipped(&id, "request rate cap reached"));
                    continue;
                }
            }
            if let Some(cap) = settings.max_cost_per_hour {
                if self.costs.spend_within(&id, TimeRange::Hour.duration()) >= cap {
                    attempts.push(ProviderAttempt::skipped(&id, "hourly cost cap reached"));
                    continue;
                }
            }

            let snapshot = self.metrics.snapshot(&id);
            let prior_success_rate = snapshot
                .as_ref()
                .filter(|m| m.total_requests > 0)
                .map(|m| m.success_rate());
            candidates.push(Candidate {
                id: id.clone(),
                weight: settings.weight,
                price_per_1k_tokens: settings.price_per_1k_tokens,
                metrics: snapshot.map(|m| CandidateMetrics {
                    total_requests: m.total_requests,
                    success_rate: m.success_rate(),
                    avg_response_ms: m.average_response_time.as_millis() as f64,
                }),
            });
            planned.insert(
                id,
                PlannedCandidate {
                    settings,
                    client,
                    prior_success_rate,
                },
            );
        }

        let estimated_tokens = ProviderSelector::estimated_tokens(provider_request.content_len());
        let ordered = self
            .selector
            .order(&candidates, strategy, estimated_tokens, preferred.as_deref());

        for id in ordered {
            let candidate = match planned.get(&id) {
                Some(c) => c,
                None => continue,
            };

            let per_attempt = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_sub(started.elapsed());
                    if remaining.is_zero() {
                        warn!(
                            "Deadline of {:?} exhausted before trying '{}'",
                            deadline, id
                        );
                        return Err(RelayError::DeadlineExceeded(attempts));
                    }
                    attempt_timeout.min(remaining)
                }
                None => attempt_timeout,
            };

            debug!(
                "Attempting provider '{}' for '{}' (timeout {:?})",
                id, operation, per_attempt
            );
            let attempt_start = Instant::now();
            let result =
                tokio::time::timeout(per_attempt, candidate.client.generate(&provider_request))
                    .await;
            let elapsed = attempt_start.elapsed();

            match result {
                Ok(Ok(response)) => {
                    let tokens = response
                        .usage
                        .as_ref()
                        .map(|u| u.total_tokens as u64)
                        .unwrap_or(estimated_tokens);
                    self.metrics
                        .record_success(&id, elapsed, tokens, response.cost);
                    self.breakers.record_success(&id);
                    self.costs.track(CostRecord::new(
                        &id,
                        "llm",
                        operation,
                        response.cost,
                        tokens,
                        &response.model,
                    ));
                    return Ok(ExecutionOutcome {
                        response,
                        provider: id.clone(),
                        elapsed,
                        prior_success_rate: candidate.prior_success_rate,
                    });
                }
                Ok(Err(e)) => {
                    self.metrics.record_failure(&id, elapsed);
                    self.breakers.record_failure(&id);
                    warn!("Provider '{}' failed for '{}': {}", id, operation, e);
                    attempts.push(ProviderAttempt::failed(&id, e.to_string()));
                }
                Err(_) => {
                    self.metrics.record_failure(&id, elapsed);
                    self.breakers.record_failure(&id);
                    let e = RelayError::Timeout {
                        provider: id.clone(),
                        waited: per_attempt,
                    };
                    warn!("Provider '{}' failed for '{}': {}", id, operation, e);
                    attempts.push(ProviderAttempt::failed(&id, e.to_string()));
                }
            }
        }

        Err(RelayError::AllProvidersFailed(attempts))
    }

    fn task_defaults(&self, task: Option<TaskKind>) -> (Option<u32>, Option<f32>) {
        match task {
            Some(task) => {
                let settings = self.settings.read().unwrap();
                match settings.routing.profile(task) {
                    Some(profile) => (profile.max_tokens, profile.temperature),
                    None => (None, None),
                }
            }
            None => (None, None),
        }
    }

    /// Current metrics for every registered provider.
    pub fn get_metrics(&self) -> Vec<MetricsSnapshot> {
        self.metrics.snapshot_all()
    }

    /// Zero every provider's counters and stamp the reset time.
    pub fn reset_metrics(&self) {
        self.metrics.reset_all();
    }

    /// Per-provider health. Served from the prober when probing is
    /// enabled, otherwise derived from breaker state and metrics.
    pub fn get_provider_health(&self) -> Vec<ServiceHealth> {
        if let Some(prober) = &self.prober {
            return prober.snapshot();
        }

        let entries = self.entries.read().unwrap();
        let mut health: Vec<ServiceHealth> = entries
            .iter()
            .map(|e| {
                let id = &e.settings.id;
                let snapshot = self.metrics.snapshot(id);
                let error_rate = snapshot.as_ref().map(|m| m.error_rate).unwrap_or(0.0);
                let status = match self.breakers.state(id) {
                    BreakerState::Open => HealthState::Unhealthy,
                    _ if error_rate > DEFAULT_MAX_ERROR_RATE => HealthState::Degraded,
                    _ => HealthState::Healthy,
                };
                ServiceHealth {
                    service: id.clone(),
                    status,
                    response_time: snapshot
                        .map(|m| m.average_response_time)
                        .unwrap_or(Duration::ZERO),
                    error_rate,
                    uptime: 1.0,
                    last_check: None,
                    details: None,
                }
            })
            .collect();
        health.sort_by(|a, b| a.service.cmp(&b.service));
        health
    }

    /// Worst-of aggregate over per-provider health.
    pub fn system_health(&self) -> HealthState {
        match &self.prober {
            Some(prober) => prober.system_health(),
            None => {
                let mut overall = HealthState::Healthy;
                for health in self.get_provider_health() {
                    match health.status {
                        HealthState::Unhealthy => return HealthState::Unhealthy,
                        HealthState::Degraded => overall = HealthState::Degraded,
                        HealthState::Healthy => {}
                    }
                }
                overall
            }
        }
    }

    /// Health-event stream, when probing is enabled.
    pub fn subscribe_health(&self) -> Option<broadcast::Receiver<HealthEvent>> {
        self.prober.as_ref().map(|p| p.subscribe())
    }

    pub fn cost_summary(&self, provider: Option<&str>, range: TimeRange) -> Vec<CostSummary> {
        self.costs.summary(provider, range)
    }

    pub fn budget_alerts(&self) -> Vec<BudgetAlert> {
        self.costs.budget_alerts()
    }

    pub fn recommendations(&self) -> Vec<Recommendation> {
        self.costs.recommendations()
    }

    pub fn set_budget(&self, provider: impl Into<String>, amount: f64) {
        self.costs.set_budget(provider, amount);
    }

    /// Breaker state for one provider, for reporting.
    pub fn breaker_state(&self, provider: &str) -> BreakerState {
        self.breakers.state(provider)
    }

    /// Consecutive-failure count for one provider's breaker.
    pub fn breaker_failures(&self, provider: &str) -> u32 {
        self.breakers.failures(provider)
    }

    /// Apply a partial reconfiguration. Validates every referenced
    /// provider before mutating anything.
    pub fn update_config(&self, update: ConfigUpdate) -> RelayResult<()> {
        {
            let entries = self.entries.read().unwrap();
            let known = |id: &str| entries.iter().any(|e| e.settings.id == id);

            for provider_update in &update.providers {
                if !known(&provider_update.id) {
                    return Err(RelayError::Config(format!(
                        "Cannot update unknown provider '{}'",
                        provider_update.id
                    )));
                }
                if let Some(weight) = provider_update.weight {
                    if !(0.0..=1.0).contains(&weight) {
                        return Err(RelayError::Config(format!(
                            "Weight {} for provider '{}' is outside 0.0..=1.0",
                            weight, provider_update.id
                        )));
                    }
                }
            }
            for (task, provider) in &update.route_tasks {
                if !known(provider) {
                    return Err(RelayError::Config(format!(
                        "Task '{}' routed to unknown provider '{}'",
                        task, provider
                    )));
                }
            }
        }

        {
            let mut settings = self.settings.write().unwrap();
            if update.use_declared_order {
                settings.strategy = None;
            } else if let Some(strategy) = update.strategy {
                settings.strategy = Some(strategy);
            }
            if let Some(attempt_timeout) = update.attempt_timeout {
                settings.attempt_timeout = attempt_timeout;
            }
            for (task, provider) in update.route_tasks {
                let mut profile = settings
                    .routing
                    .profile(task)
                    .cloned()
                    .unwrap_or_else(|| crate::orchestrator::tasks::TaskProfile::new(task));
                profile.preferred_provider = Some(provider);
                settings.routing.set(profile);
            }
        }

        {
            let mut entries = self.entries.write().unwrap();
            for provider_update in update.providers {
                if let Some(entry) = entries
                    .iter_mut()
                    .find(|e| e.settings.id == provider_update.id)
                {
                    if let Some(enabled) = provider_update.enabled {
                        entry.settings.enabled = enabled;
                    }
                    if let Some(weight) = provider_update.weight {
                        entry.settings.weight = weight;
                    }
                }
            }
        }

        for (provider, amount) in update.budgets {
            self.costs.set_budget(provider, amount);
        }

        Ok(())
    }

    /// Stop background probing. Construct once per process, shut down on
    /// process exit.
    pub fn shutdown(&self) {
        if let Some(prober) = &self.prober {
            prober.stop();
        }
    }
}

fn validate_prompt(prompt: &str) -> RelayResult<()> {
    if prompt.trim().is_empty() {
        return Err(RelayError::Validation("Prompt must not be empty".to_string()));
    }
    Ok(())
}

fn validate_constraints(max_tokens: Option<u32>, temperature: Option<f32>) -> RelayResult<()> {
    if max_tokens == Some(0) {
        return Err(RelayError::Validation(
            "max_tokens must be greater than zero".to_string(),
        ));
    }
    if let Some(temperature) = temperature {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(RelayError::Validation(format!(
                "temperature {} is outside 0.0..=2.0",
                temperature
            )));
        }
    }
    Ok(())
}

fn render_prompt(request: &ContentRequest) -> String {
    if request.inputs.is_empty() {
        return request.prompt.clone();
    }

    let mut keys: Vec<&String> = request.inputs.keys().collect();
    keys.sort();

    let mut prompt = request.prompt.clone();
    prompt.push_str("\n\nContext:\n");
    for key in keys {
        prompt.push_str(&format!("{}: {}\n", key, request.inputs[key]));
    }
    prompt
}

fn score_quality(content: &str) -> QualityScores {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return QualityScores {
            completeness: 0.0,
            structure: 0.0,
        };
    }

    let completeness = (trimmed.len() as f64 / 400.0).min(1.0);

    let mut structure: f64 = 0.4;
    if trimmed.ends_with(['.', '!', '?']) {
        structure += 0.3;
    }
    if trimmed.matches(['.', '!', '?']).count() > 1 || trimmed.contains('\n') {
        structure += 0.3;
    }

    QualityScores {
        completeness,
        structure,
    }
}
