use std::error::Error;
use std::fmt;
use std::time::Duration;
use serde_json;

/// One entry in an aggregate failure: what happened to a single candidate
/// provider during a fallback chain.
#[derive(Debug, Clone)]
pub struct ProviderAttempt {
    pub provider: String,
    pub reason: String,
    /// True when the provider was skipped without being called
    /// (disabled, circuit open, rate capped).
    pub skipped: bool,
}

impl ProviderAttempt {
    pub fn failed(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { provider: provider.into(), reason: reason.into(), skipped: false }
    }

    pub fn skipped(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { provider: provider.into(), reason: reason.into(), skipped: true }
    }
}

impl fmt::Display for ProviderAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.skipped {
            write!(f, "{} (skipped: {})", self.provider, self.reason)
        } else {
            write!(f, "{} (failed: {})", self.provider, self.reason)
        }
    }
}

/// Custom error types for orchestration operations
#[derive(Debug)]
pub enum RelayError {
    /// Error from the HTTP client
    RequestError(reqwest::Error),
    /// Error returned by an individual provider call
    Api {
        provider: String,
        message: String,
        retryable: bool,
        status: Option<u16>,
    },
    /// Rate limiting error
    RateLimit(String),
    /// A single provider attempt exceeded its timeout
    Timeout { provider: String, waited: Duration },
    /// Provider is disabled or its circuit is open
    ProviderUnavailable(String),
    /// Every candidate in the fallback chain was skipped or failed
    AllProvidersFailed(Vec<ProviderAttempt>),
    /// The caller-supplied deadline expired before the chain was exhausted
    DeadlineExceeded(Vec<ProviderAttempt>),
    /// Malformed request, rejected before any provider was attempted
    Validation(String),
    /// Configuration error
    Config(String),
    /// Parsing error
    Parse(String),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::RequestError(err) => write!(f, "Request error: {}", err),
            RelayError::Api { provider, message, .. } => {
                write!(f, "API error from '{}': {}", provider, message)
            }
            RelayError::RateLimit(msg) => write!(f, "Rate limit error: {}", msg),
            RelayError::Timeout { provider, waited } => {
                write!(f, "Provider '{}' timed out after {:?}", provider, waited)
            }
            RelayError::ProviderUnavailable(provider) => {
                write!(f, "Provider unavailable: {}", provider)
            }
            RelayError::AllProvidersFailed(attempts) => {
                write!(f, "All providers failed: [")?;
                for (i, attempt) in attempts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", attempt)?;
                }
                write!(f, "]")
            }
            RelayError::DeadlineExceeded(attempts) => {
                write!(f, "Deadline exceeded after {} attempt(s)", attempts.len())
            }
            RelayError::Validation(msg) => write!(f, "Validation error: {}", msg),
            RelayError::Config(msg) => write!(f, "Configuration error: {}", msg),
            RelayError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl Error for RelayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RelayError::RequestError(err) => Some(err),
            _ => None,
        }
    }
}

/// Convert reqwest errors to RelayError
impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        RelayError::RequestError(err)
    }
}

/// Convert serde_json errors to RelayError
impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::Parse(err.to_string())
    }
}

/// Convert std::io::Error to RelayError
impl From<std::io::Error> for RelayError {
    fn from(err: std::io::Error) -> Self {
        RelayError::Config(err.to_string())
    }
}

/// Convert toml parsing errors to RelayError
impl From<toml::de::Error> for RelayError {
    fn from(err: toml::de::Error) -> Self {
        RelayError::Config(err.to_string())
    }
}

/// Result type alias for orchestration operations
pub type RelayResult<T> = Result<T, RelayError>;

impl RelayError {
    /// Whether a future attempt against the same provider could succeed.
    /// Non-retryable failures still count against the circuit breaker.
    pub fn retryable(&self) -> bool {
        match self {
            RelayError::RequestError(_) => true,
            RelayError::Api { retryable, .. } => *retryable,
            RelayError::RateLimit(_) => true,
            RelayError::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Classify an HTTP-level provider failure. Returns RateLimit for 429
    /// status or rate limit keywords, otherwise an Api error whose
    /// retryability follows the status class.
    pub fn from_api_response(status: u16, provider: &str, error_message: String) -> Self {
        if status == 429 {
            return RelayError::RateLimit(error_message);
        }

        // Check error message for rate limit indicators
        let msg_lower = error_message.to_lowercase();
        if msg_lower.contains("rate limit")
            || msg_lower.contains("too many requests")
            || msg_lower.contains("quota exceeded")
            || msg_lower.contains("overloaded")
            || msg_lower.contains("throttle")
        {
            return RelayError::RateLimit(error_message);
        }

        RelayError::Api {
            provider: provider.to_string(),
            message: error_message,
            retryable: status >= 500,
            status: Some(status),
        }
    }
}
