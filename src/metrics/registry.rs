use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime};

use log::debug;

/// Point-in-time view of one provider's counters.
///
/// `error_rate` and `success_rate` are always derived from the counters at
/// snapshot time, never stored independently.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub provider: String,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub average_response_time: Duration,
    pub total_tokens: u64,
    pub total_cost: f64,
    pub error_rate: f64,
    pub last_reset: SystemTime,
}

impl MetricsSnapshot {
    pub fn success_rate(&self) -> f64 {
        if self.total_requests > 0 {
            self.successful_requests as f64 / self.total_requests as f64
        } else {
            0.0
        }
    }
}

struct ProviderMetrics {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    average_response_time: Duration,
    total_tokens: u64,
    total_cost: f64,
    last_reset: SystemTime,
    // Attempt timestamps within the last minute, for the rate cap.
    recent_attempts: VecDeque<Instant>,
}

impl ProviderMetrics {
    fn new() -> Self {
        Self {
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            average_response_time: Duration::ZERO,
            total_tokens: 0,
            total_cost: 0.0,
            last_reset: SystemTime::now(),
            recent_attempts: VecDeque::new(),
        }
    }

    fn reset(&mut self) {
        let recent = std::mem::take(&mut self.recent_attempts);
        *self = Self::new();
        // The rate window survives a metrics reset: caps protect the
        // upstream provider, not the report.
        self.recent_attempts = recent;
    }

    fn record_attempt(&mut self, duration: Duration) {
        self.total_requests += 1;
        self.recent_attempts.push_back(Instant::now());
        self.prune_recent();

        // Running mean over all attempts, successful or not.
        let n = self.total_requests as u32;
        let prev_total = self.average_response_time * (n - 1);
        self.average_response_time = (prev_total + duration) / n;
    }

    fn prune_recent(&mut self) {
        let window = Duration::from_secs(60);
        while let Some(front) = self.recent_attempts.front() {
            if front.elapsed() > window {
                self.recent_attempts.pop_front();
            } else {
                break;
            }
        }
    }

    fn error_rate(&self) -> f64 {
        if self.total_requests > 0 {
            self.failed_requests as f64 / self.total_requests as f64
        } else {
            0.0
        }
    }
}

/// Registry of per-provider performance metrics.
///
/// A single mutex guards the map; critical sections are short and never
/// await, so concurrent requests reporting outcomes for the same provider
/// cannot lose updates.
pub struct MetricsRegistry {
    providers: Mutex<HashMap<String, ProviderMetrics>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            providers: Mutex::new(HashMap::new()),
        }
    }

    /// Ensure a provider has an entry, so reports include providers that
    /// have never been attempted.
    pub fn register(&self, provider: &str) {
        let mut providers = self.providers.lock().unwrap();
        providers
            .entry(provider.to_string())
            .or_insert_with(ProviderMetrics::new);
    }

    pub fn record_success(&self, provider: &str, duration: Duration, tokens: u64, cost: f64) {
        let mut providers = self.providers.lock().unwrap();
        let metrics = providers
            .entry(provider.to_string())
            .or_insert_with(ProviderMetrics::new);

        metrics.record_attempt(duration);
        metrics.successful_requests += 1;
        metrics.total_tokens += tokens;
        metrics.total_cost += cost;
        debug!(
            "Provider '{}' succeeded in {:?} ({} tokens, ${:.6})",
            provider, duration, tokens, cost
        );
    }

    pub fn record_failure(&self, provider: &str, duration: Duration) {
        let mut providers = self.providers.lock().unwrap();
        let metrics = providers
            .entry(provider.to_string())
            .or_insert_with(ProviderMetrics::new);

        metrics.record_attempt(duration);
        metrics.failed_requests += 1;
        debug!("Provider '{}' failed after {:?}", provider, duration);
    }

    /// Number of attempts against the provider in the trailing minute.
    pub fn requests_last_minute(&self, provider: &str) -> u64 {
        let mut providers = self.providers.lock().unwrap();
        match providers.get_mut(provider) {
            Some(metrics) => {
                metrics.prune_recent();
                metrics.recent_attempts.len() as u64
            }
            None => 0,
        }
    }

    pub fn snapshot(&self, provider: &str) -> Option<MetricsSnapshot> {
        let providers = self.providers.lock().unwrap();
        providers.get(provider).map(|m| Self::to_snapshot(provider, m))
    }

    /// Snapshots for every registered provider, sorted by provider id for
    /// stable reporting.
    pub fn snapshot_all(&self) -> Vec<MetricsSnapshot> {
        let providers = self.providers.lock().unwrap();
        let mut all: Vec<MetricsSnapshot> = providers
            .iter()
            .map(|(provider, m)| Self::to_snapshot(provider, m))
            .collect();
        all.sort_by(|a, b| a.provider.cmp(&b.provider));
        all
    }

    /// Zero every counter for every registered provider and stamp the
    /// reset time.
    pub fn reset_all(&self) {
        let mut providers = self.providers.lock().unwrap();
        for metrics in providers.values_mut() {
            metrics.reset();
        }
    }

    fn to_snapshot(provider: &str, m: &ProviderMetrics) -> MetricsSnapshot {
        MetricsSnapshot {
            provider: provider.to_string(),
            total_requests: m.total_requests,
            successful_requests: m.successful_requests,
            failed_requests: m.failed_requests,
            average_response_time: m.average_response_time,
            total_tokens: m.total_tokens,
            total_cost: m.total_cost,
            error_rate: m.error_rate(),
            last_reset: m.last_reset,
        }
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
