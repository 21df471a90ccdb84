use {
    crate::domain::{audit::AuditRecord, error::PipelineError, id::EventId},
    aws_sdk_dynamodb::types::AttributeValue,
    chrono::{DateTime, SecondsFormat, Utc},
    std::collections::HashMap,
};

pub const PARTITION_KEY: &str = "target_id";
pub const SORT_KEY: &str = "timestamp";

pub type Item = HashMap<String, AttributeValue>;

/// Fixed-width UTC form, so byte order of the sort key is time order.
pub fn sort_key(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn to_item(record: &AuditRecord) -> Item {
    let s = |v: &str| AttributeValue::S(v.to_string());
    HashMap::from([
        (PARTITION_KEY.to_string(), s(&record.target_id)),
        (SORT_KEY.to_string(), AttributeValue::S(sort_key(&record.timestamp))),
        ("event_id".to_string(), s(record.event_id.as_str())),
        ("actor_id".to_string(), s(&record.actor_id)),
        ("action".to_string(), s(&record.action)),
        ("resource_type".to_string(), s(&record.resource_type)),
        ("ip_address".to_string(), s(&record.ip_address)),
        ("details".to_string(), s(&record.details)),
    ])
}

pub fn from_item(item: &Item) -> Result<AuditRecord, PipelineError> {
    let text = |name: &str| {
        item.get(name)
            .and_then(|v| v.as_s().ok())
            .cloned()
            .unwrap_or_default()
    };

    let raw_ts = text(SORT_KEY);
    let timestamp = DateTime::parse_from_rfc3339(&raw_ts)
        .map_err(|e| PipelineError::DynamoDb(format!("malformed sort key {raw_ts:?}: {e}")))?
        .with_timezone(&Utc);
    let event_id = EventId::new(text("event_id"))
        .map_err(|_| PipelineError::DynamoDb("item without event_id".into()))?;

    Ok(AuditRecord {
        event_id,
        target_id: text(PARTITION_KEY),
        timestamp,
        actor_id: text("actor_id"),
        action: text("action"),
        resource_type: text("resource_type"),
        ip_address: text("ip_address"),
        details: text("details"),
    })
}
