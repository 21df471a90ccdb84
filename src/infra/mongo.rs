pub mod audit_store;
pub mod document;

use {
    crate::{config::MongoConfig, domain::error::PipelineError},
    audit_store::MongoAuditStore,
    mongodb::Client,
};

pub async fn connect(config: &MongoConfig) -> Result<MongoAuditStore, PipelineError> {
    let client = Client::with_uri_str(&config.uri).await?;
    let store = MongoAuditStore::new(client, &config.database, &config.collection).await?;
    tracing::info!(database = %config.database, collection = %config.collection, "connected to mongodb");
    Ok(store)
}
