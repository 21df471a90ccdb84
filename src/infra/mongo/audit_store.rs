use {
    super::document::AuditDocument,
    crate::domain::{
        audit::{AuditRecord, NewAuditRecord},
        error::PipelineError,
        store::{AuditStore, StorageBackend, StoreFuture},
    },
    futures::TryStreamExt,
    mongodb::{Client, Collection, IndexModel, bson::doc, options::IndexOptions},
};

/// Document backend: loosely-typed documents plus secondary indexes that
/// serve the sorted per-target query.
pub struct MongoAuditStore {
    client: Client,
    collection: Collection<AuditDocument>,
}

impl MongoAuditStore {
    /// Verify the server answers, then create indexes. Index failures are
    /// logged and the store is still usable.
    pub async fn new(client: Client, database: &str, collection: &str) -> Result<Self, PipelineError> {
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 }).await?;

        let store = Self {
            collection: db.collection(collection),
            client,
        };
        if let Err(e) = store.create_indexes().await {
            tracing::warn!(error = %e, "failed to create mongodb indexes");
        }
        Ok(store)
    }

    async fn create_indexes(&self) -> Result<(), PipelineError> {
        let unique = IndexOptions::builder().unique(true).build();
        let indexes = [
            IndexModel::builder()
                .keys(doc! { "event_id": 1 })
                .options(unique)
                .build(),
            IndexModel::builder().keys(doc! { "target_id": 1 }).build(),
            IndexModel::builder()
                .keys(doc! { "target_id": 1, "timestamp": -1 })
                .build(),
            // reserved for actor-centric queries
            IndexModel::builder().keys(doc! { "actor_id": 1 }).build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("mongodb indexes ensured");
        Ok(())
    }

    /// Upsert keyed by `event_id`: a redelivered or retried event replaces
    /// its earlier copy instead of adding a second one.
    async fn insert(&self, record: NewAuditRecord) -> Result<AuditRecord, PipelineError> {
        let document = AuditDocument::from(&record.finalize()?);
        self.collection
            .replace_one(doc! { "event_id": document.event_id.as_str() }, &document)
            .upsert(true)
            .await?;

        // BSON dates keep milliseconds; report what the collection holds.
        let record = AuditRecord::try_from(document)?;

        tracing::debug!(
            event_id = %record.event_id,
            target_id = %record.target_id,
            actor_id = %record.actor_id,
            "audit log written to mongodb"
        );
        Ok(record)
    }

    async fn find(&self, target_id: &str) -> Result<Vec<AuditRecord>, PipelineError> {
        let docs: Vec<AuditDocument> = self
            .collection
            .find(doc! { "target_id": target_id })
            .sort(doc! { "timestamp": -1 })
            .await?
            .try_collect()
            .await?;

        tracing::debug!(count = docs.len(), target_id, "audit logs read from mongodb");
        docs.into_iter().map(AuditRecord::try_from).collect()
    }
}

impl AuditStore for MongoAuditStore {
    fn save_log(&self, record: NewAuditRecord) -> StoreFuture<'_, AuditRecord> {
        Box::pin(self.insert(record))
    }

    fn get_logs<'a>(&'a self, target_id: &'a str) -> StoreFuture<'a, Vec<AuditRecord>> {
        Box::pin(self.find(target_id))
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.client
                .database("admin")
                .run_command(doc! { "ping": 1 })
                .await?;
            Ok(())
        })
    }

    fn close(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.client.clone().shutdown().await;
            Ok(())
        })
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::MongoDb
    }
}
