// General
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 30;

// Token estimation heuristic (characters per token, not a real tokenizer)
pub const ESTIMATED_CHARS_PER_TOKEN: u64 = 4;

// Circuit breaker
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;
pub const DEFAULT_BREAKER_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_HALF_OPEN_MAX_CALLS: u32 = 3;

// Health probing
pub const DEFAULT_MAX_RESPONSE_TIME_MS: u64 = 5_000;
pub const DEFAULT_MAX_ERROR_RATE: f64 = 0.10;
pub const DEFAULT_MIN_UPTIME: f64 = 0.95;

// Cost tracking
pub const COST_RETENTION_DAYS: u64 = 30;
pub const DEFAULT_DAILY_BUDGET: f64 = 10.0;
pub const BUDGET_WARNING_RATIO: f64 = 0.75;
pub const BUDGET_CRITICAL_RATIO: f64 = 0.90;

// Optimization heuristics
pub const EXPENSIVE_OPERATION_AVG_COST: f64 = 0.10;
pub const CACHING_CANDIDATE_MIN_CALLS: u64 = 100;
pub const CACHING_CANDIDATE_MAX_AVG_COST: f64 = 0.01;
pub const BUDGET_PRESSURE_RATIO: f64 = 0.80;
