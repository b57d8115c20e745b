use std::collections::HashMap;

use serde::{Serialize, Deserialize};

/// Content-generation task types the briefing backend produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    NewsSummary,
    CryptoAnalysis,
    PoliticalBriefing,
    PersonalizedContent,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::NewsSummary => "news_summary",
            TaskKind::CryptoAnalysis => "crypto_analysis",
            TaskKind::PoliticalBriefing => "political_briefing",
            TaskKind::PersonalizedContent => "personalized_content",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "news_summary" => Some(TaskKind::NewsSummary),
            "crypto_analysis" => Some(TaskKind::CryptoAnalysis),
            "political_briefing" => Some(TaskKind::PoliticalBriefing),
            "personalized_content" => Some(TaskKind::PersonalizedContent),
            _ => None,
        }
    }

    pub fn all() -> [TaskKind; 4] {
        [
            TaskKind::NewsSummary,
            TaskKind::CryptoAnalysis,
            TaskKind::PoliticalBriefing,
            TaskKind::PersonalizedContent,
        ]
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-task routing preference and output constraints.
///
/// The preference is a reordering hint, not an exclusion: the designated
/// provider is tried first, every other candidate stays in the chain.
#[derive(Debug, Clone)]
pub struct TaskProfile {
    pub task: TaskKind,
    pub preferred_provider: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl TaskProfile {
    pub fn new(task: TaskKind) -> Self {
        Self {
            task,
            preferred_provider: None,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn prefer(mut self, provider: impl Into<String>) -> Self {
        self.preferred_provider = Some(provider.into());
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Task-to-provider routing table.
#[derive(Debug, Clone, Default)]
pub struct TaskRouting {
    profiles: HashMap<TaskKind, TaskProfile>,
}

impl TaskRouting {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, profile: TaskProfile) {
        self.profiles.insert(profile.task, profile);
    }

    pub fn profile(&self, task: TaskKind) -> Option<&TaskProfile> {
        self.profiles.get(&task)
    }

    /// Preferred provider for a task, if one is designated.
    pub fn route(&self, task: TaskKind) -> Option<&str> {
        self.profiles
            .get(&task)
            .and_then(|p| p.preferred_provider.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskProfile> {
        self.profiles.values()
    }
}
