use {
    crate::domain::{audit::AuditRecord, error::PipelineError, id::EventId},
    chrono::{DateTime, Utc},
    mongodb::bson,
    serde::{Deserialize, Serialize},
};

/// Shape of an audit record in the `events` collection. The server adds `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditDocument {
    pub event_id: String,
    pub target_id: String,
    pub timestamp: bson::DateTime,
    pub actor_id: String,
    pub action: String,
    pub resource_type: String,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub details: String,
}

impl From<&AuditRecord> for AuditDocument {
    fn from(record: &AuditRecord) -> Self {
        Self {
            event_id: record.event_id.as_str().to_string(),
            target_id: record.target_id.clone(),
            timestamp: bson::DateTime::from_millis(record.timestamp.timestamp_millis()),
            actor_id: record.actor_id.clone(),
            action: record.action.clone(),
            resource_type: record.resource_type.clone(),
            ip_address: record.ip_address.clone(),
            details: record.details.clone(),
        }
    }
}

impl TryFrom<AuditDocument> for AuditRecord {
    type Error = PipelineError;

    /// A document that fails here was corrupted after it was written, so the
    /// failure is reported as a storage error.
    fn try_from(doc: AuditDocument) -> Result<Self, Self::Error> {
        let millis = doc.timestamp.timestamp_millis();
        let timestamp = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
            PipelineError::Storage(format!("stored timestamp out of range: {millis}"))
        })?;
        let event_id = EventId::new(doc.event_id)
            .map_err(|_| PipelineError::Storage("document without event_id".into()))?;

        Ok(AuditRecord {
            event_id,
            target_id: doc.target_id,
            timestamp,
            actor_id: doc.actor_id,
            action: doc.action,
            resource_type: doc.resource_type,
            ip_address: doc.ip_address,
            details: doc.details,
        })
    }
}
