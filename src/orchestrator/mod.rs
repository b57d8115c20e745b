pub mod types;
pub mod tasks;
pub mod selector;
pub mod manager;
pub mod builder;

pub use manager::Orchestrator;
pub use builder::OrchestratorBuilder;
pub use selector::{Candidate, CandidateMetrics, ProviderSelector, SelectionStrategy};
pub use tasks::{TaskKind, TaskProfile, TaskRouting};
pub use types::{
    ConfigUpdate, ContentRequest, ContentResult, GenerationRequest, ProviderSettings,
    ProviderUpdate, QualityScores,
};
