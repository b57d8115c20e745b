use crate::errors::RelayResult;
use crate::providers::types::{ProviderRequest, ProviderResponse, HealthReport};

use async_trait::async_trait;

/// Uniform capability implemented by every provider adapter.
///
/// One instance exists per configured provider. The orchestrator never
/// looks behind this trait: wire formats, authentication and transport
/// are the adapter's concern.
#[async_trait]
pub trait ProviderClient {
    /// Generate a completion for the given request.
    async fn generate(&self, request: &ProviderRequest) -> RelayResult<ProviderResponse>;

    /// Out-of-band liveness probe, independent of request traffic.
    async fn health_check(&self) -> RelayResult<HealthReport>;

    /// Stable provider identifier (e.g. "openai", "anthropic").
    fn id(&self) -> &str;

    /// Display model identifier this adapter is configured for.
    fn model(&self) -> &str;
}

/// Gate deciding whether a provider integration is switched on at all.
///
/// This is the seam to the surrounding application's configuration
/// manager: providers the gate rejects are dropped at build time and
/// never instantiated into the candidate pool.
pub trait IntegrationGate: Send + Sync {
    fn is_integration_enabled(&self, provider: &str) -> bool;
}

/// Default gate that admits every provider.
#[derive(Debug, Default)]
pub struct AllowAllIntegrations;

impl IntegrationGate for AllowAllIntegrations {
    fn is_integration_enabled(&self, _provider: &str) -> bool {
        true
    }
}
