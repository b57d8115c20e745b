use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime};

use futures::future::join_all;
use log::{debug, info};
use tokio::sync::{broadcast, watch};
use tokio::time::MissedTickBehavior;

use crate::breaker::BreakerRegistry;
use crate::constants::{
    DEFAULT_MAX_ERROR_RATE, DEFAULT_MAX_RESPONSE_TIME_MS, DEFAULT_MIN_UPTIME,
};
use crate::errors::{RelayError, RelayResult};
use crate::metrics::MetricsRegistry;
use crate::providers::{HealthState, ProviderClient};

/// Classification thresholds applied to every probe of one service.
#[derive(Debug, Clone)]
pub struct HealthThresholds {
    pub max_response_time: Duration,
    pub max_error_rate: f64,
    pub min_uptime: f64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            max_response_time: Duration::from_millis(DEFAULT_MAX_RESPONSE_TIME_MS),
            max_error_rate: DEFAULT_MAX_ERROR_RATE,
            min_uptime: DEFAULT_MIN_UPTIME,
        }
    }
}

/// Latest health verdict for one registered service.
#[derive(Debug, Clone)]
pub struct ServiceHealth {
    pub service: String,
    pub status: HealthState,
    pub response_time: Duration,
    pub error_rate: f64,
    /// Fraction of probes that succeeded since registration.
    pub uptime: f64,
    pub last_check: Option<SystemTime>,
    pub details: Option<String>,
}

/// Observability events published by the prober.
#[derive(Debug, Clone)]
pub enum HealthEvent {
    StatusChanged {
        service: String,
        from: HealthState,
        to: HealthState,
    },
    ProbeCompleted {
        service: String,
        status: HealthState,
        response_time: Duration,
    },
}

struct ServiceEntry {
    client: Arc<dyn ProviderClient + Send + Sync>,
    thresholds: HealthThresholds,
    health: Mutex<ServiceHealth>,
    in_flight: AtomicBool,
    probes_total: AtomicU64,
    probes_failed: AtomicU64,
}

/// Periodic health prober over registered provider clients.
pub struct HealthProber {
    services: Mutex<HashMap<String, Arc<ServiceEntry>>>,
    events: broadcast::Sender<HealthEvent>,
    metrics: Arc<MetricsRegistry>,
    breakers: Option<Arc<BreakerRegistry>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl HealthProber {
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (events, _) = broadcast::channel(64);
        Self {
            services: Mutex::new(HashMap::new()),
            events,
            metrics,
            breakers: None,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Attach a breaker registry so unhealthy transitions trip the
    /// provider's circuit proactively.
    pub fn with_breakers(mut self, breakers: Arc<BreakerRegistry>) -> Self {
        self.breakers = Some(breakers);
        self
    }

    /// Register a service and spawn its periodic probe task.
    ///
    /// Must be called from within a tokio runtime. A tick is skipped when
    /// the previous probe for the same service has not completed.
    pub fn register(
        &self,
        name: impl Into<String>,
        client: Arc<dyn ProviderClient + Send + Sync>,
        thresholds: HealthThresholds,
        interval: Duration,
    ) {
        let name = name.into();
        let entry = Arc::new(ServiceEntry {
            client,
            thresholds,
            health: Mutex::new(ServiceHealth {
                service: name.clone(),
                status: HealthState::Healthy,
                response_time: Duration::ZERO,
                error_rate: 0.0,
                uptime: 1.0,
                last_check: None,
                details: None,
            }),
            in_flight: AtomicBool::new(false),
            probes_total: AtomicU64::new(0),
            probes_failed: AtomicU64::new(0),
        });

        {
            let mut services = self.services.lock().unwrap();
            services.insert(name.clone(), entry.clone());
        }

        let events = self.events.clone();
        let metrics = self.metrics.clone();
        let breakers = self.breakers.clone();
        let mut shutdown = self.shutdown_rx.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; consume it so the
            // first probe lands one interval after registration.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        probe_service(&name, &entry, &events, &metrics, breakers.as_deref()).await;
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("Health probe task for '{}' stopped", name);
        });
    }

    /// Probe one service on demand and return its fresh health. If a
    /// background probe is already in flight, the last known health is
    /// returned instead of starting a second concurrent probe.
    pub async fn check_health(&self, name: &str) -> RelayResult<ServiceHealth> {
        let entry = {
            let services = self.services.lock().unwrap();
            services.get(name).cloned()
        };
        match entry {
            Some(entry) => Ok(probe_service(
                name,
                &entry,
                &self.events,
                &self.metrics,
                self.breakers.as_deref(),
            )
            .await),
            None => Err(RelayError::Config(format!(
                "No service registered under '{}'",
                name
            ))),
        }
    }

    /// Probe every registered service concurrently.
    pub async fn check_all(&self) -> Vec<ServiceHealth> {
        let entries: Vec<(String, Arc<ServiceEntry>)> = {
            let services = self.services.lock().unwrap();
            services
                .iter()
                .map(|(name, entry)| (name.clone(), entry.clone()))
                .collect()
        };

        let probes = entries.iter().map(|(name, entry)| {
            probe_service(
                name,
                entry,
                &self.events,
                &self.metrics,
                self.breakers.as_deref(),
            )
        });
        join_all(probes).await
    }

    /// Last known health for one service without probing.
    pub fn current(&self, name: &str) -> Option<ServiceHealth> {
        let services = self.services.lock().unwrap();
        services.get(name).map(|e| e.health.lock().unwrap().clone())
    }

    /// Last known health for every service, sorted by name.
    pub fn snapshot(&self) -> Vec<ServiceHealth> {
        let services = self.services.lock().unwrap();
        let mut all: Vec<ServiceHealth> = services
            .values()
            .map(|e| e.health.lock().unwrap().clone())
            .collect();
        all.sort_by(|a, b| a.service.cmp(&b.service));
        all
    }

    /// Worst-of aggregation: unhealthy if any service is unhealthy, else
    /// degraded if any is degraded, else healthy.
    pub fn system_health(&self) -> HealthState {
        let services = self.services.lock().unwrap();
        let mut overall = HealthState::Healthy;
        for entry in services.values() {
            match entry.health.lock().unwrap().status {
                HealthState::Unhealthy => return HealthState::Unhealthy,
                HealthState::Degraded => overall = HealthState::Degraded,
                HealthState::Healthy => {}
            }
        }
        overall
    }

    /// Subscribe to status-change and probe events.
    pub fn subscribe(&self) -> broadcast::Receiver<HealthEvent> {
        self.events.subscribe()
    }

    /// Stop every probe task. Idempotent; probing cannot be restarted on
    /// a stopped prober.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

impl Drop for HealthProber {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Releases the `in_flight` flag when a probe finishes or its future is
/// dropped mid-flight, so a cancelled probe cannot wedge the service.
struct InFlightPermit<'a>(&'a AtomicBool);

impl Drop for InFlightPermit<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

async fn probe_service(
    name: &str,
    entry: &Arc<ServiceEntry>,
    events: &broadcast::Sender<HealthEvent>,
    metrics: &MetricsRegistry,
    breakers: Option<&BreakerRegistry>,
) -> ServiceHealth {
    if entry.in_flight.swap(true, Ordering::SeqCst) {
        // Previous probe still running; report what we already know.
        return entry.health.lock().unwrap().clone();
    }
    let _permit = InFlightPermit(&entry.in_flight);

    let started = Instant::now();
    // Hard cap at twice the response-time threshold: between one and two
    // thresholds the service is slow but alive, beyond that the probe is
    // treated as failed.
    let probe_cap = entry.thresholds.max_response_time * 2;
    let outcome = tokio::time::timeout(probe_cap, entry.client.health_check()).await;
    let elapsed = started.elapsed();

    entry.probes_total.fetch_add(1, Ordering::SeqCst);
    let error_rate = metrics
        .snapshot(name)
        .map(|m| m.error_rate)
        .unwrap_or(0.0);

    let (status, details) = match &outcome {
        Err(_) => {
            entry.probes_failed.fetch_add(1, Ordering::SeqCst);
            (
                HealthState::Unhealthy,
                Some(format!("health check timed out after {:?}", probe_cap)),
            )
        }
        Ok(Err(e)) => {
            entry.probes_failed.fetch_add(1, Ordering::SeqCst);
            (HealthState::Unhealthy, Some(e.to_string()))
        }
        Ok(Ok(report)) => {
            let total = entry.probes_total.load(Ordering::SeqCst);
            let failed = entry.probes_failed.load(Ordering::SeqCst);
            let uptime = 1.0 - failed as f64 / total as f64;

            let status = if report.status == HealthState::Unhealthy {
                HealthState::Unhealthy
            } else if elapsed > entry.thresholds.max_response_time
                || error_rate > entry.thresholds.max_error_rate
                || uptime < entry.thresholds.min_uptime
                || report.status == HealthState::Degraded
            {
                HealthState::Degraded
            } else {
                HealthState::Healthy
            };
            (status, report.details.clone())
        }
    };

    let total = entry.probes_total.load(Ordering::SeqCst);
    let failed = entry.probes_failed.load(Ordering::SeqCst);
    let new_health = ServiceHealth {
        service: name.to_string(),
        status,
        response_time: elapsed,
        error_rate,
        uptime: 1.0 - failed as f64 / total as f64,
        last_check: Some(SystemTime::now()),
        details,
    };

    let previous = {
        let mut health = entry.health.lock().unwrap();
        let previous = health.status;
        *health = new_health.clone();
        previous
    };

    if previous != status {
        info!("Service '{}' changed {} -> {}", name, previous, status);
        let _ = events.send(HealthEvent::StatusChanged {
            service: name.to_string(),
            from: previous,
            to: status,
        });
        if let Some(breakers) = breakers {
            match status {
                HealthState::Unhealthy => breakers.trip(name),
                HealthState::Healthy => breakers.record_success(name),
                HealthState::Degraded => {}
            }
        }
    }

    let _ = events.send(HealthEvent::ProbeCompleted {
        service: name.to_string(),
        status,
        response_time: elapsed,
    });

    new_health
}
