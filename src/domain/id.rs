use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::PipelineError;

/// Audit event identifier. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Result<Self, PipelineError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(PipelineError::Validation("event_id must not be empty".into()));
        }
        Ok(Self(id))
    }

    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
