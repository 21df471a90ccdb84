use {
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::audit::AuditRecord,
        services::audit_log::{self, LogEventRequest, LogEventResponse},
    },
    axum::{
        Json, Router,
        extract::{DefaultBodyLimit, Query, State},
        http::StatusCode,
        response::IntoResponse,
        routing::{get, post},
    },
    serde::{Deserialize, Serialize},
    std::time::Duration,
    tower_http::timeout::TimeoutLayer,
};

#[derive(Debug, Deserialize)]
pub struct AuditLogsQuery {
    #[serde(default)]
    pub target_id: String,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuditLogsResponse {
    pub logs: Vec<AuditRecord>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/health", get(health_handler))
        .route("/v1/audit/events", post(log_event_handler))
        .route("/v1/audit/logs", get(audit_logs_handler))
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        .with_state(state)
}

#[tracing::instrument(
    name = "log_event",
    skip_all,
    fields(actor_id = tracing::field::Empty, action = tracing::field::Empty)
)]
pub async fn log_event_handler(
    State(state): State<AppState>,
    Json(req): Json<LogEventRequest>,
) -> Result<Json<LogEventResponse>, ApiError> {
    tracing::Span::current()
        .record("actor_id", tracing::field::display(&req.actor_id))
        .record("action", tracing::field::display(&req.action));

    let response = audit_log::log_event(state.store.as_ref(), req).await?;
    Ok(Json(response))
}

#[tracing::instrument(
    name = "get_audit_logs",
    skip_all,
    fields(target_id = tracing::field::Empty)
)]
pub async fn audit_logs_handler(
    State(state): State<AppState>,
    Query(query): Query<AuditLogsQuery>,
) -> Result<Json<AuditLogsResponse>, ApiError> {
    tracing::Span::current().record("target_id", tracing::field::display(&query.target_id));

    let logs = audit_log::get_audit_logs(state.store.as_ref(), &query.target_id, query.limit).await?;
    Ok(Json(AuditLogsResponse { logs }))
}

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::warn!(backend = %state.store.backend(), error = %e, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "storage unavailable")
        }
    }
}
