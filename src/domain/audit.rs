use {
    super::error::PipelineError,
    super::id::EventId,
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

/// A persisted audit-log record. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub event_id: EventId,
    pub target_id: String,
    pub timestamp: DateTime<Utc>,
    pub actor_id: String,
    pub action: String,
    pub resource_type: String,
    pub ip_address: String,
    pub details: String,
}

/// An audit record before persistence: the id and timestamp may still be
/// missing and the target may still be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAuditRecord {
    pub event_id: Option<EventId>,
    pub target_id: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub actor_id: String,
    pub action: String,
    pub resource_type: String,
    pub ip_address: String,
    pub details: String,
}

impl NewAuditRecord {
    pub fn new(actor_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            actor_id: actor_id.into(),
            action: action.into(),
            ..Self::default()
        }
    }

    pub fn with_target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = target_id.into();
        self
    }

    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = resource_type.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_event_id(mut self, event_id: EventId) -> Self {
        self.event_id = Some(event_id);
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    /// Partition key this record will be stored under: the target, or the
    /// actor for self-referential actions such as a login.
    pub fn partition_key(&self) -> &str {
        if self.target_id.is_empty() {
            &self.actor_id
        } else {
            &self.target_id
        }
    }

    /// Fill every default and produce the record that gets stored.
    pub fn finalize(self) -> Result<AuditRecord, PipelineError> {
        let target_id = self.partition_key().to_string();
        if target_id.is_empty() {
            return Err(PipelineError::Validation(
                "audit record needs a target_id or an actor_id".into(),
            ));
        }

        Ok(AuditRecord {
            event_id: self.event_id.unwrap_or_else(EventId::generate),
            target_id,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            actor_id: self.actor_id,
            action: self.action,
            resource_type: self.resource_type,
            ip_address: self.ip_address,
            details: self.details,
        })
    }
}

impl From<AuditRecord> for NewAuditRecord {
    fn from(record: AuditRecord) -> Self {
        Self {
            event_id: Some(record.event_id),
            target_id: record.target_id,
            timestamp: Some(record.timestamp),
            actor_id: record.actor_id,
            action: record.action,
            resource_type: record.resource_type,
            ip_address: record.ip_address,
            details: record.details,
        }
    }
}

/// Newest first, the order every query returns.
pub fn sort_newest_first(records: &mut [AuditRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}
