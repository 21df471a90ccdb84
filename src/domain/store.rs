use {
    super::audit::{AuditRecord, NewAuditRecord},
    super::error::PipelineError,
    derive_more::Display,
    std::{future::Future, pin::Pin, str::FromStr},
};

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PipelineError>> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StorageBackend {
    #[display("dynamodb")]
    DynamoDb,
    #[display("mongodb")]
    MongoDb,
    #[display("memory")]
    Memory,
}

impl FromStr for StorageBackend {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dynamodb" | "dynamo" => Ok(Self::DynamoDb),
            "mongodb" | "mongo" => Ok(Self::MongoDb),
            "memory" => Ok(Self::Memory),
            other => Err(PipelineError::Config(format!(
                "unknown storage backend: {other}"
            ))),
        }
    }
}

/// Append-only audit storage shared by the stream consumer and the HTTP
/// endpoint. Implementations are used concurrently from many tasks.
pub trait AuditStore: Send + Sync {
    /// Fill in the id and timestamp if missing, persist, and return what was
    /// stored.
    fn save_log(&self, record: NewAuditRecord) -> StoreFuture<'_, AuditRecord>;

    /// All records for `target_id`, newest first. An unknown target yields an
    /// empty list.
    fn get_logs<'a>(&'a self, target_id: &'a str) -> StoreFuture<'a, Vec<AuditRecord>>;

    fn ping(&self) -> StoreFuture<'_, ()>;

    /// Release held connections. Called once on graceful shutdown.
    fn close(&self) -> StoreFuture<'_, ()>;

    fn backend(&self) -> StorageBackend;
}
