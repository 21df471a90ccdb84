pub mod dynamo;
pub mod kafka;
pub mod memory;
pub mod mongo;

use {
    crate::{
        config::Config,
        domain::{
            error::PipelineError,
            store::{AuditStore, StorageBackend},
        },
    },
    std::sync::Arc,
};

/// The only place that knows which backend is in use.
pub async fn connect_store(config: &Config) -> Result<Arc<dyn AuditStore>, PipelineError> {
    let store: Arc<dyn AuditStore> = match config.storage {
        StorageBackend::DynamoDb => Arc::new(dynamo::connect(&config.dynamo).await),
        StorageBackend::MongoDb => Arc::new(mongo::connect(&config.mongo).await?),
        StorageBackend::Memory => {
            tracing::warn!("memory storage selected, audit logs will not survive a restart");
            Arc::new(memory::MemoryAuditStore::new())
        }
    };
    tracing::info!(backend = %store.backend(), "audit store ready");
    Ok(store)
}
