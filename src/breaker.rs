//! Per-provider circuit breakers gating availability.
//!
//! One registry is shared by the reactive path (request outcomes reported
//! by the orchestrator) and the proactive path (the health prober tripping
//! breakers for services it classifies as unhealthy), so both mechanisms
//! agree on a single availability verdict per provider.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::constants::{
    DEFAULT_BREAKER_TIMEOUT_SECS, DEFAULT_FAILURE_THRESHOLD, DEFAULT_HALF_OPEN_MAX_CALLS,
};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Requests flow normally
    Closed,
    /// Requests are rejected until the timeout elapses
    Open,
    /// A limited number of probing requests are allowed through
    HalfOpen,
}

impl std::fmt::Display for BreakerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BreakerState::Closed => write!(f, "closed"),
            BreakerState::Open => write!(f, "open"),
            BreakerState::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Tunable parameters shared by every breaker in a registry.
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Consecutive failures before the circuit opens
    pub failure_threshold: u32,
    /// How long an open circuit waits before allowing a probing call
    pub timeout: Duration,
    /// Calls admitted while half-open before further calls are rejected
    pub half_open_max_calls: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            timeout: Duration::from_secs(DEFAULT_BREAKER_TIMEOUT_SECS),
            half_open_max_calls: DEFAULT_HALF_OPEN_MAX_CALLS,
        }
    }
}

/// Read-only view of one provider's breaker, for reporting.
#[derive(Debug, Clone)]
pub struct BreakerSnapshot {
    pub provider: String,
    pub state: BreakerState,
    pub failures: u32,
    pub last_failure: Option<Instant>,
}

struct Breaker {
    state: BreakerState,
    failures: u32,
    last_failure: Option<Instant>,
    half_open_calls: u32,
}

impl Breaker {
    fn new() -> Self {
        // A provider that has never attempted a request is closed with
        // zero failures.
        Self {
            state: BreakerState::Closed,
            failures: 0,
            last_failure: None,
            half_open_calls: 0,
        }
    }
}

/// Registry of per-provider circuit breakers.
///
/// All three operations lock a single map for a short, await-free critical
/// section; per-provider updates are therefore serialized and never lost
/// under concurrent success/failure reporting.
pub struct BreakerRegistry {
    config: BreakerConfig,
    breakers: Mutex<HashMap<String, Breaker>>,
}

impl BreakerRegistry {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            breakers: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Whether the provider may be attempted right now.
    ///
    /// An open circuit transitions to half-open lazily here once the
    /// timeout has elapsed since the last failure; that query itself
    /// consumes one of the half-open call permits.
    pub fn is_available(&self, provider: &str) -> bool {
        let mut breakers = self.breakers.lock().unwrap();
        let breaker = breakers
            .entry(provider.to_string())
            .or_insert_with(Breaker::new);

        match breaker.state {
            BreakerState::Closed => true,
            BreakerState::Open => {
                let elapsed_timeout = breaker
                    .last_failure
                    .map(|t| t.elapsed() >= self.config.timeout)
                    .unwrap_or(true);
                if elapsed_timeout {
                    info!("Circuit for '{}' transitioning open -> half-open", provider);
                    breaker.state = BreakerState::HalfOpen;
                    breaker.half_open_calls = 1;
                    true
                } else {
                    false
                }
            }
            BreakerState::HalfOpen => {
                if breaker.half_open_calls < self.config.half_open_max_calls {
                    breaker.half_open_calls += 1;
                    true
                } else {
                    debug!(
                        "Circuit for '{}' is half-open and out of probe permits",
                        provider
                    );
                    false
                }
            }
        }
    }

    /// Record a successful call. Closes the circuit and clears the
    /// consecutive-failure counter.
    pub fn record_success(&self, provider: &str) {
        let mut breakers = self.breakers.lock().unwrap();
        let breaker = breakers
            .entry(provider.to_string())
            .or_insert_with(Breaker::new);

        if breaker.state != BreakerState::Closed {
            info!("Circuit for '{}' closing after success", provider);
        }
        breaker.state = BreakerState::Closed;
        breaker.failures = 0;
        breaker.half_open_calls = 0;
    }

    /// Record a failed call. Opens the circuit on the threshold-th
    /// consecutive failure, and immediately on any half-open failure.
    pub fn record_failure(&self, provider: &str) {
        let mut breakers = self.breakers.lock().unwrap();
        let breaker = breakers
            .entry(provider.to_string())
            .or_insert_with(Breaker::new);

        breaker.failures += 1;
        breaker.last_failure = Some(Instant::now());

        match breaker.state {
            BreakerState::Closed => {
                if breaker.failures >= self.config.failure_threshold {
                    warn!(
                        "Circuit for '{}' opening after {} consecutive failures",
                        provider, breaker.failures
                    );
                    breaker.state = BreakerState::Open;
                }
            }
            BreakerState::HalfOpen => {
                warn!("Circuit for '{}' failed while half-open, reopening", provider);
                breaker.state = BreakerState::Open;
                breaker.half_open_calls = 0;
            }
            BreakerState::Open => {}
        }
    }

    /// Force a provider's circuit open, as if the failure threshold had
    /// just been reached. Used by the health prober when a service turns
    /// unhealthy out-of-band.
    pub fn trip(&self, provider: &str) {
        let mut breakers = self.breakers.lock().unwrap();
        let breaker = breakers
            .entry(provider.to_string())
            .or_insert_with(Breaker::new);

        if breaker.state != BreakerState::Open {
            warn!("Circuit for '{}' tripped open", provider);
        }
        breaker.state = BreakerState::Open;
        breaker.failures = breaker.failures.max(self.config.failure_threshold);
        breaker.last_failure = Some(Instant::now());
        breaker.half_open_calls = 0;
    }

    /// Current state of one provider's breaker without consuming a
    /// half-open permit.
    pub fn state(&self, provider: &str) -> BreakerState {
        let breakers = self.breakers.lock().unwrap();
        breakers
            .get(provider)
            .map(|b| b.state)
            .unwrap_or(BreakerState::Closed)
    }

    /// Consecutive-failure count for one provider.
    pub fn failures(&self, provider: &str) -> u32 {
        let breakers = self.breakers.lock().unwrap();
        breakers.get(provider).map(|b| b.failures).unwrap_or(0)
    }

    /// Snapshot of every tracked breaker.
    pub fn snapshot(&self) -> Vec<BreakerSnapshot> {
        let breakers = self.breakers.lock().unwrap();
        breakers
            .iter()
            .map(|(provider, b)| BreakerSnapshot {
                provider: provider.clone(),
                state: b.state,
                failures: b.failures,
                last_failure: b.last_failure,
            })
            .collect()
    }
}
