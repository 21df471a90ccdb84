pub mod audit_store;
pub mod item;

use {
    crate::config::DynamoConfig,
    audit_store::DynamoAuditStore,
    aws_config::BehaviorVersion,
    aws_sdk_dynamodb::config::{Credentials, Region},
};

/// Build a client from the ambient AWS configuration. An explicit endpoint
/// means a local emulator, which accepts any static credentials.
pub async fn connect(config: &DynamoConfig) -> DynamoAuditStore {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));
    if let Some(endpoint) = &config.endpoint {
        tracing::info!(endpoint = %endpoint, "using dynamodb endpoint override");
        loader = loader
            .endpoint_url(endpoint)
            .credentials_provider(Credentials::new("local", "local", None, None, "static"));
    }
    let sdk_config = loader.load().await;
    let client = aws_sdk_dynamodb::Client::new(&sdk_config);

    let store = DynamoAuditStore::new(client, &config.table).await;
    tracing::info!(table = %store.table(), region = %config.region, "connected to dynamodb");
    store
}
