use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use crate::breaker::{BreakerConfig, BreakerRegistry};
use crate::config::Config;
use crate::constants::{DEFAULT_ATTEMPT_TIMEOUT_SECS, DEFAULT_DAILY_BUDGET};
use crate::cost::CostTracker;
use crate::errors::{RelayError, RelayResult};
use crate::health::{HealthProber, HealthThresholds};
use crate::metrics::MetricsRegistry;
use crate::orchestrator::manager::{Orchestrator, OrchestratorSettings, ProviderEntry};
use crate::orchestrator::selector::SelectionStrategy;
use crate::orchestrator::tasks::{TaskKind, TaskProfile, TaskRouting};
use crate::orchestrator::types::ProviderSettings;
use crate::providers::{IntegrationGate, ProviderClient};

/// Orchestrator builder.
///
/// Providers are added with `add_provider`; subsequent calls like
/// `.weight()`, `.price_per_1k_tokens()`, `.enabled()` apply to the last
/// added provider.
pub struct OrchestratorBuilder {
    providers: Vec<(ProviderSettings, Arc<dyn ProviderClient + Send + Sync>)>,
    budgets: Vec<(String, f64)>,
    strategy: Option<SelectionStrategy>,
    attempt_timeout: Duration,
    breaker_config: BreakerConfig,
    default_daily_budget: f64,
    routing: TaskRouting,
    gate: Option<Arc<dyn IntegrationGate>>,
    probe_interval: Option<Duration>,
    health_thresholds: HealthThresholds,
}

impl std::fmt::Debug for OrchestratorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrchestratorBuilder")
            .field(
                "providers",
                &self
                    .providers
                    .iter()
                    .map(|(settings, _)| settings)
                    .collect::<Vec<_>>(),
            )
            .field("budgets", &self.budgets)
            .field("strategy", &self.strategy)
            .field("attempt_timeout", &self.attempt_timeout)
            .field("breaker_config", &self.breaker_config)
            .field("default_daily_budget", &self.default_daily_budget)
            .field("routing", &self.routing)
            .field("probe_interval", &self.probe_interval)
            .field("health_thresholds", &self.health_thresholds)
            .finish()
    }
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            budgets: Vec::new(),
            // No strategy means declared order: primary first, then
            // fallbacks as registered.
            strategy: None,
            attempt_timeout: Duration::from_secs(DEFAULT_ATTEMPT_TIMEOUT_SECS),
            breaker_config: BreakerConfig::default(),
            default_daily_budget: DEFAULT_DAILY_BUDGET,
            routing: TaskRouting::new(),
            gate: None,
            probe_interval: None,
            health_thresholds: HealthThresholds::default(),
        }
    }

    /// Sets the load balancing strategy.
    pub fn strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Per-attempt timeout applied to every provider call.
    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn breaker_config(mut self, config: BreakerConfig) -> Self {
        self.breaker_config = config;
        self
    }

    /// Daily budget applied to providers without an explicit one.
    pub fn default_daily_budget(mut self, budget: f64) -> Self {
        self.default_daily_budget = budget;
        self
    }

    /// Route a task type to a preferred provider.
    pub fn route_task(mut self, task: TaskKind, provider: impl Into<String>) -> Self {
        let mut profile = self
            .routing
            .profile(task)
            .cloned()
            .unwrap_or_else(|| TaskProfile::new(task));
        profile.preferred_provider = Some(provider.into());
        self.routing.set(profile);
        self
    }

    /// Register a full task profile (preference plus output constraints).
    pub fn define_task(mut self, profile: TaskProfile) -> Self {
        self.routing.set(profile);
        self
    }

    /// Begins configuring a new provider. The client's `id()` and
    /// `model()` seed its settings.
    pub fn add_provider(mut self, client: Arc<dyn ProviderClient + Send + Sync>) -> Self {
        let settings = ProviderSettings {
            id: client.id().to_string(),
            model: client.model().to_string(),
            weight: 1.0,
            price_per_1k_tokens: 0.0,
            enabled: true,
            max_requests_per_minute: None,
            max_cost_per_hour: None,
        };
        self.providers.push((settings, client));
        self
    }

    /// Sets the weight for the *last added* provider.
    /// Panics if `add_provider` was not called before this.
    pub fn weight(mut self, weight: f64) -> Self {
        self.last_provider("'.weight()'").weight = weight;
        self
    }

    /// Sets the per-1K-token price for the *last added* provider.
    /// Panics if `add_provider` was not called before this.
    pub fn price_per_1k_tokens(mut self, price: f64) -> Self {
        self.last_provider("'.price_per_1k_tokens()'").price_per_1k_tokens = price;
        self
    }

    /// Sets the enabled status for the *last added* provider.
    /// Panics if `add_provider` was not called before this.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.last_provider("'.enabled()'").enabled = enabled;
        self
    }

    /// Request-rate cap for the *last added* provider.
    /// Panics if `add_provider` was not called before this.
    pub fn max_requests_per_minute(mut self, cap: u64) -> Self {
        self.last_provider("'.max_requests_per_minute()'")
            .max_requests_per_minute = Some(cap);
        self
    }

    /// Hourly cost cap for the *last added* provider.
    /// Panics if `add_provider` was not called before this.
    pub fn max_cost_per_hour(mut self, cap: f64) -> Self {
        self.last_provider("'.max_cost_per_hour()'").max_cost_per_hour = Some(cap);
        self
    }

    /// Daily budget for the *last added* provider.
    /// Panics if `add_provider` was not called before this.
    pub fn daily_budget(mut self, budget: f64) -> Self {
        let id = self.last_provider("'.daily_budget()'").id.clone();
        self.budgets.push((id, budget));
        self
    }

    fn last_provider(&mut self, caller: &str) -> &mut ProviderSettings {
        match self.providers.last_mut() {
            Some((settings, _)) => settings,
            None => panic!("{} called before '.add_provider()'", caller),
        }
    }

    /// Gate deciding which provider integrations exist at all; rejected
    /// providers are dropped at build time.
    pub fn integration_gate(mut self, gate: Arc<dyn IntegrationGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Enable periodic background health probing. Requires a tokio
    /// runtime at build time.
    pub fn health_probing(mut self, interval: Duration) -> Self {
        self.probe_interval = Some(interval);
        self
    }

    pub fn health_thresholds(mut self, thresholds: HealthThresholds) -> Self {
        self.health_thresholds = thresholds;
        self
    }

    /// Seed a builder from a parsed configuration file plus the concrete
    /// clients for each configured provider id.
    pub fn from_config(
        config: &Config,
        mut clients: HashMap<String, Arc<dyn ProviderClient + Send + Sync>>,
    ) -> RelayResult<Self> {
        let mut builder = Self::new()
            .attempt_timeout(Duration::from_millis(config.settings.attempt_timeout_ms))
            .breaker_config(BreakerConfig {
                failure_threshold: config.settings.failure_threshold,
                timeout: Duration::from_secs(config.settings.breaker_timeout_secs),
                half_open_max_calls: config.settings.half_open_max_calls,
            })
            .default_daily_budget(config.settings.default_daily_budget)
            .health_thresholds(HealthThresholds {
                max_response_time: Duration::from_millis(config.settings.max_response_time_ms),
                max_error_rate: config.settings.max_error_rate,
                min_uptime: config.settings.min_uptime,
            });

        if let Some(ref strategy) = config.settings.strategy {
            let strategy = SelectionStrategy::parse(strategy).ok_or_else(|| {
                RelayError::Config(format!("Unknown strategy '{}'", strategy))
            })?;
            builder = builder.strategy(strategy);
        }
        if let Some(secs) = config.settings.probe_interval_secs {
            builder = builder.health_probing(Duration::from_secs(secs));
        }

        for provider in &config.providers {
            let client = clients.remove(&provider.id).ok_or_else(|| {
                RelayError::Config(format!(
                    "No client supplied for configured provider '{}'",
                    provider.id
                ))
            })?;
            builder = builder
                .add_provider(client)
                .weight(provider.weight)
                .price_per_1k_tokens(provider.price_per_1k_tokens)
                .enabled(provider.enabled);
            // The configured model wins over whatever the client reports.
            if let Some((settings, _)) = builder.providers.last_mut() {
                settings.id = provider.id.clone();
                settings.model = provider.model.clone();
                settings.max_requests_per_minute = provider.max_requests_per_minute;
                settings.max_cost_per_hour = provider.max_cost_per_hour;
            }
            if let Some(budget) = provider.daily_budget {
                builder = builder.daily_budget(budget);
            }
        }

        for task_config in &config.tasks {
            let task = TaskKind::parse(&task_config.task).ok_or_else(|| {
                RelayError::Config(format!("Unknown task type '{}'", task_config.task))
            })?;
            let mut profile = TaskProfile::new(task);
            profile.preferred_provider = task_config.preferred_provider.clone();
            profile.max_tokens = task_config.max_tokens;
            profile.temperature = task_config.temperature;
            builder = builder.define_task(profile);
        }

        Ok(builder)
    }

    /// Consumes the builder and constructs the `Orchestrator`.
    pub fn build(self) -> RelayResult<Orchestrator> {
        let mut seen = HashSet::new();
        for (settings, _) in &self.providers {
            if !seen.insert(settings.id.clone()) {
                return Err(RelayError::Config(format!(
                    "Provider '{}' registered more than once",
                    settings.id
                )));
            }
            if !(0.0..=1.0).contains(&settings.weight) {
                return Err(RelayError::Config(format!(
                    "Weight {} for provider '{}' is outside 0.0..=1.0",
                    settings.weight, settings.id
                )));
            }
            if settings.price_per_1k_tokens < 0.0 {
                return Err(RelayError::Config(format!(
                    "Negative price for provider '{}'",
                    settings.id
                )));
            }
        }

        // Drop providers whose integration is switched off entirely.
        let gate = self.gate;
        let mut entries: Vec<ProviderEntry> = Vec::new();
        for (settings, client) in self.providers {
            let admitted = gate
                .as_ref()
                .map(|g| g.is_integration_enabled(&settings.id))
                .unwrap_or(true);
            if !admitted {
                info!("Integration for '{}' is off, dropping provider", settings.id);
                continue;
            }
            entries.push(ProviderEntry { settings, client });
        }

        for profile in self.routing.iter() {
            if let Some(provider) = &profile.preferred_provider {
                if !entries.iter().any(|e| &e.settings.id == provider) {
                    return Err(RelayError::Config(format!(
                        "Task '{}' routed to provider '{}' which is not registered",
                        profile.task, provider
                    )));
                }
            }
        }

        if entries.is_empty() {
            log::warn!("Orchestrator built with no provider instances.");
        }

        let breakers = Arc::new(BreakerRegistry::new(self.breaker_config));
        let metrics = Arc::new(MetricsRegistry::new());
        let costs = Arc::new(CostTracker::with_default_budget(self.default_daily_budget));

        for entry in &entries {
            metrics.register(&entry.settings.id);
        }
        for (provider, budget) in self.budgets {
            costs.set_budget(provider, budget);
        }

        let prober = match self.probe_interval {
            Some(interval) => {
                let prober = Arc::new(
                    HealthProber::new(metrics.clone()).with_breakers(breakers.clone()),
                );
                for entry in &entries {
                    prober.register(
                        entry.settings.id.clone(),
                        entry.client.clone(),
                        self.health_thresholds.clone(),
                        interval,
                    );
                    debug!(
                        "Registered health probing for '{}' every {:?}",
                        entry.settings.id, interval
                    );
                }
                Some(prober)
            }
            None => None,
        };

        Ok(Orchestrator::from_parts(
            entries,
            OrchestratorSettings {
                strategy: self.strategy,
                attempt_timeout: self.attempt_timeout,
                routing: self.routing,
            },
            breakers,
            metrics,
            costs,
            prober,
        ))
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
