use serde::{Deserialize, Serialize};

use crate::models::RecordId;

/// The three advertorial styles produced by one generation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvertorialVariant {
    Story,
    Value,
    Info,
}

impl AdvertorialVariant {
    pub const ALL: [AdvertorialVariant; 3] = [Self::Story, Self::Value, Self::Info];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Story => "story",
            Self::Value => "value",
            Self::Info => "info",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Story => "Story-based",
            Self::Value => "Value-based",
            Self::Info => "Informational",
        }
    }
}

impl std::fmt::Display for AdvertorialVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transient input of one generation cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub project_id: RecordId,
    pub description: String,
}

impl GenerationRequest {
    pub fn new(project_id: impl Into<RecordId>, description: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            description: description.into(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.project_id.is_empty() {
            return Err("project id must not be empty".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("description must not be empty".to_string());
        }
        Ok(())
    }
}

/// Identifiers returned by the create call, one per variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedIds {
    pub story_based_id: RecordId,
    pub value_based_id: RecordId,
    pub informational_id: RecordId,
}

impl GeneratedIds {
    pub fn id_for(&self, variant: AdvertorialVariant) -> &RecordId {
        match variant {
            AdvertorialVariant::Story => &self.story_based_id,
            AdvertorialVariant::Value => &self.value_based_id,
            AdvertorialVariant::Info => &self.informational_id,
        }
    }
}

/// One generated content variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub content: ArtifactContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactContent {
    #[serde(default)]
    pub content: String,
}

impl Artifact {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            content: ArtifactContent {
                content: text.into(),
            },
        }
    }

    pub fn text(&self) -> &str {
        &self.content.content
    }
}
