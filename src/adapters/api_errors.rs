use crate::domain::error::PipelineError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// HTTP face of `PipelineError`.
pub struct ApiError(pub PipelineError);

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            PipelineError::Validation(_) | PipelineError::Decode(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PipelineError::Conflict(_) => StatusCode::CONFLICT,
            PipelineError::DynamoDb(_)
            | PipelineError::MongoDb(_)
            | PipelineError::Stream(_)
            | PipelineError::Serialization(_)
            | PipelineError::Storage(_)
            | PipelineError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_code, message) = match &self.0 {
            PipelineError::Validation(msg) | PipelineError::Decode(msg) => {
                ("validation_error", msg.clone())
            }
            PipelineError::Conflict(msg) => ("conflict", msg.clone()),
            other => {
                // storage details stay in the logs
                tracing::error!("request failed: {other}");
                ("internal_error", "internal error".to_string())
            }
        };

        let body = serde_json::json!({
            "error_code": error_code,
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}
