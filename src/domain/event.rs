use {
    super::audit::NewAuditRecord,
    super::error::PipelineError,
    super::id::EventId,
    chrono::{DateTime, NaiveDateTime, Utc},
    serde::{Deserialize, Deserializer},
};

/// Envelope published on the events topic by the producing services.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamEvent {
    #[serde(default)]
    pub event_id: String,
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub payload: EventPayload,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub actor_id: String,
    #[serde(default)]
    pub target_id: String,
    #[serde(default)]
    pub resource_type: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default, deserialize_with = "details_as_text")]
    pub details: String,
}

// Producers send details either pre-serialized or as a raw JSON value.
fn details_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

impl StreamEvent {
    pub fn decode(body: &[u8]) -> Result<Self, PipelineError> {
        serde_json::from_slice(body).map_err(|e| PipelineError::Decode(e.to_string()))
    }

    /// Map the envelope onto a draft record. Never fails: a missing id or an
    /// unparsable timestamp is filled in at persistence time.
    pub fn into_record(self) -> NewAuditRecord {
        let payload = self.payload;
        let target_id = if payload.target_id.is_empty() {
            payload.actor_id.clone()
        } else {
            payload.target_id
        };

        NewAuditRecord {
            event_id: EventId::new(self.event_id).ok(),
            target_id,
            timestamp: parse_timestamp(&self.timestamp),
            actor_id: payload.actor_id,
            action: payload.action,
            resource_type: payload.resource_type,
            ip_address: payload.ip_address,
            details: payload.details,
        }
    }
}

/// Decode a raw stream message into a draft record.
pub fn normalize(body: &[u8]) -> Result<NewAuditRecord, PipelineError> {
    let event = StreamEvent::decode(body)?;
    tracing::debug!(
        event_id = %event.event_id,
        event_type = %event.event_type,
        action = %event.payload.action,
        "decoded stream event"
    );
    if parse_timestamp(&event.timestamp).is_none() {
        tracing::debug!(
            event_id = %event.event_id,
            raw = %event.timestamp,
            "event timestamp missing or unparsable, using receive time"
        );
    }
    Ok(event.into_record())
}

/// RFC 3339 first, then a naive ISO-8601 datetime read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
