#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use relayllm::{
    HealthReport, HealthState, ProviderClient, ProviderRequest, ProviderResponse, RelayError,
    RelayResult, TokenUsage,
};

/// Scripted behavior for a single mock call.
#[derive(Clone)]
pub enum Outcome {
    Succeed(String),
    Fail(String),
    Delay(Duration),
}

/// Scriptable in-memory provider. Outcomes pushed with `push` are
/// consumed one per call; once the queue is empty the fallback outcome
/// repeats forever.
pub struct MockProvider {
    id: String,
    model: String,
    outcomes: Mutex<VecDeque<Outcome>>,
    fallback: Mutex<Outcome>,
    health_outcomes: Mutex<VecDeque<Outcome>>,
    health_fallback: Mutex<Outcome>,
    cost: f64,
    tokens: u32,
    pub calls: AtomicU64,
    pub health_calls: AtomicU64,
}

impl MockProvider {
    pub fn ok(id: &str, model: &str) -> Self {
        Self::with_fallback(id, model, Outcome::Succeed(format!("{} output", id)))
    }

    pub fn failing(id: &str, model: &str, reason: &str) -> Self {
        Self::with_fallback(id, model, Outcome::Fail(reason.to_string()))
    }

    pub fn slow(id: &str, model: &str, delay: Duration) -> Self {
        Self::with_fallback(id, model, Outcome::Delay(delay))
    }

    fn with_fallback(id: &str, model: &str, fallback: Outcome) -> Self {
        Self {
            id: id.to_string(),
            model: model.to_string(),
            outcomes: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(fallback),
            health_outcomes: Mutex::new(VecDeque::new()),
            health_fallback: Mutex::new(Outcome::Succeed(String::new())),
            cost: 0.001,
            tokens: 42,
            calls: AtomicU64::new(0),
            health_calls: AtomicU64::new(0),
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_tokens(mut self, tokens: u32) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_health_fallback(self, outcome: Outcome) -> Self {
        *self.health_fallback.lock().unwrap() = outcome;
        self
    }

    pub fn push(&self, outcome: Outcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn push_health(&self, outcome: Outcome) {
        self.health_outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn set_health_fallback(&self, outcome: Outcome) {
        *self.health_fallback.lock().unwrap() = outcome;
    }

    fn response(&self, content: String) -> ProviderResponse {
        ProviderResponse {
            content,
            model: self.model.clone(),
            usage: Some(TokenUsage {
                prompt_tokens: self.tokens / 2,
                completion_tokens: self.tokens - self.tokens / 2,
                total_tokens: self.tokens,
            }),
            cost: self.cost,
        }
    }
}

#[async_trait]
impl ProviderClient for MockProvider {
    async fn generate(&self, _request: &ProviderRequest) -> RelayResult<ProviderResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = {
            let mut outcomes = self.outcomes.lock().unwrap();
            outcomes
                .pop_front()
                .unwrap_or_else(|| self.fallback.lock().unwrap().clone())
        };
        match outcome {
            Outcome::Succeed(content) => Ok(self.response(content)),
            Outcome::Fail(reason) => Err(RelayError::Api {
                provider: self.id.clone(),
                message: reason,
                retryable: true,
                status: Some(500),
            }),
            Outcome::Delay(delay) => {
                tokio::time::sleep(delay).await;
                Ok(self.response(format!("{} slow output", self.id)))
            }
        }
    }

    async fn health_check(&self) -> RelayResult<HealthReport> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        let outcome = {
            let mut outcomes = self.health_outcomes.lock().unwrap();
            outcomes
                .pop_front()
                .unwrap_or_else(|| self.health_fallback.lock().unwrap().clone())
        };
        match outcome {
            Outcome::Succeed(_) => Ok(HealthReport::healthy(Duration::from_millis(5))),
            Outcome::Fail(reason) => Err(RelayError::Api {
                provider: self.id.clone(),
                message: reason,
                retryable: true,
                status: Some(503),
            }),
            Outcome::Delay(delay) => {
                tokio::time::sleep(delay).await;
                Ok(HealthReport {
                    status: HealthState::Healthy,
                    response_time: delay,
                    details: None,
                })
            }
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn model(&self) -> &str {
        &self.model
    }
}
