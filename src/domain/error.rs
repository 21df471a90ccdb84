use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("validation: {0}")]
    Validation(String),

    #[error("decode: {0}")]
    Decode(String),

    #[error("dynamodb: {0}")]
    DynamoDb(String),

    #[error("mongodb: {0}")]
    MongoDb(#[from] mongodb::error::Error),

    #[error("stream: {0}")]
    Stream(#[from] rdkafka::error::KafkaError),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored data that no longer maps onto an `AuditRecord`.
    #[error("storage: {0}")]
    Storage(String),

    /// A different event already occupies the record's storage key.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("config: {0}")]
    Config(String),
}

impl PipelineError {
    /// Errors that will fail the same way no matter how often they are retried.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Decode(_) | Self::Serialization(_) | Self::Conflict(_)
        )
    }
}
