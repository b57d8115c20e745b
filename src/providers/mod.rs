/// Collaborator seam for upstream text-generation providers.
///
/// The orchestration core treats every provider as an opaque capability
/// behind the `ProviderClient` trait: a `generate` call, a `health_check`
/// call, and nothing else. Concrete transport adapters (OpenAI, Anthropic,
/// self-hosted gateways...) live with the consumer of this crate.
pub mod types;
pub mod client;

pub use types::{ProviderRequest, ProviderResponse, Message, TokenUsage, HealthState, HealthReport};
pub use client::{ProviderClient, IntegrationGate, AllowAllIntegrations};
