//! Configuration file loading and validation.

use std::fs;
use std::path::Path;

use crate::errors::{RelayError, RelayResult};
use crate::orchestrator::tasks::TaskKind;
use crate::orchestrator::selector::SelectionStrategy;
use super::types::Config;

/// Load and parse a TOML configuration file.
///
/// # Example
/// ```no_run
/// use relayllm::config::load_config;
///
/// let config = load_config("relayllm.toml").unwrap();
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> RelayResult<Config> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|e| {
        RelayError::Config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&content)
}

/// Parse a TOML configuration string.
pub fn parse_config(content: &str) -> RelayResult<Config> {
    let config: Config = toml::from_str(content)
        .map_err(|e| RelayError::Config(format!("Failed to parse TOML: {}", e)))?;

    validate_config(&config)?;

    Ok(config)
}

/// Validate the configuration for consistency.
fn validate_config(config: &Config) -> RelayResult<()> {
    if let Some(ref strategy) = config.settings.strategy {
        if SelectionStrategy::parse(strategy).is_none() {
            return Err(RelayError::Config(format!(
                "Unknown strategy '{}'\n  \
                 → Valid strategies: round_robin, weighted, cost_optimized, performance_based\n  \
                 → Omit the setting to keep the declared provider order",
                strategy
            )));
        }
    }

    let mut seen_ids: Vec<&str> = Vec::new();
    for (idx, provider) in config.providers.iter().enumerate() {
        if seen_ids.contains(&provider.id.as_str()) {
            return Err(RelayError::Config(format!(
                "Provider id '{}' in providers[{}] is declared more than once",
                provider.id, idx
            )));
        }
        seen_ids.push(&provider.id);

        if !(0.0..=1.0).contains(&provider.weight) {
            return Err(RelayError::Config(format!(
                "Weight {} in providers[{}] ('{}') is outside 0.0..=1.0",
                provider.weight, idx, provider.id
            )));
        }
        if provider.price_per_1k_tokens < 0.0 {
            return Err(RelayError::Config(format!(
                "Negative price_per_1k_tokens in providers[{}] ('{}')",
                idx, provider.id
            )));
        }
    }

    for (idx, task) in config.tasks.iter().enumerate() {
        if TaskKind::parse(&task.task).is_none() {
            return Err(RelayError::Config(format!(
                "Unknown task type '{}' in tasks[{}]\n  \
                 → Valid types: news_summary, crypto_analysis, political_briefing, personalized_content",
                task.task, idx
            )));
        }

        if let Some(ref preferred) = task.preferred_provider {
            if !seen_ids.contains(&preferred.as_str()) {
                return Err(RelayError::Config(format!(
                    "Task '{}' prefers provider '{}' which is not declared\n  \
                     → Declare it in a [[providers]] section or remove the preference",
                    task.task, preferred
                )));
            }
        }
    }

    Ok(())
}
