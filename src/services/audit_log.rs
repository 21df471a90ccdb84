use {
    crate::domain::{
        audit::{AuditRecord, NewAuditRecord},
        error::PipelineError,
        id::EventId,
        store::AuditStore,
    },
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogEventRequest {
    pub actor_id: String,
    pub action: String,
    #[serde(default)]
    pub target_id: String,
    #[serde(default)]
    pub resource_type: String,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub details: String,
    /// Unix seconds; absent or non-positive means "now".
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEventResponse {
    pub success: bool,
    pub event_id: String,
}

/// Synchronous write: the caller waits for the store and sees its errors.
pub async fn log_event(
    store: &dyn AuditStore,
    req: LogEventRequest,
) -> Result<LogEventResponse, PipelineError> {
    let timestamp = req
        .timestamp
        .filter(|ts| *ts > 0)
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0));

    let draft = NewAuditRecord {
        event_id: Some(EventId::generate()),
        target_id: req.target_id,
        timestamp,
        actor_id: req.actor_id,
        action: req.action,
        resource_type: req.resource_type,
        ip_address: req.ip_address,
        details: req.details,
    };

    let record = store.save_log(draft).await.inspect_err(|e| {
        tracing::error!(error = %e, "failed to save audit log");
    })?;

    tracing::info!(
        event_id = %record.event_id,
        actor_id = %record.actor_id,
        target_id = %record.target_id,
        action = %record.action,
        "audit log saved"
    );

    Ok(LogEventResponse {
        success: true,
        event_id: record.event_id.into_inner(),
    })
}

/// Newest-first history of `target_id`, cut to `limit` when it is positive.
pub async fn get_audit_logs(
    store: &dyn AuditStore,
    target_id: &str,
    limit: Option<i64>,
) -> Result<Vec<AuditRecord>, PipelineError> {
    if target_id.trim().is_empty() {
        return Err(PipelineError::Validation("target_id is required".into()));
    }

    let mut logs = store.get_logs(target_id).await?;
    if let Some(limit) = limit.and_then(|l| usize::try_from(l).ok()).filter(|l| *l > 0) {
        logs.truncate(limit);
    }

    tracing::info!(count = logs.len(), target_id, "audit logs retrieved");
    Ok(logs)
}
