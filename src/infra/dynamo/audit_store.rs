use {
    super::item::{self, PARTITION_KEY, SORT_KEY},
    crate::domain::{
        audit::{AuditRecord, NewAuditRecord},
        error::PipelineError,
        store::{AuditStore, StorageBackend, StoreFuture},
    },
    aws_sdk_dynamodb::{
        Client,
        error::DisplayErrorContext,
        types::{
            AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType,
            ScalarAttributeType,
        },
    },
};

fn dynamo_err(err: impl std::error::Error) -> PipelineError {
    PipelineError::DynamoDb(DisplayErrorContext(err).to_string())
}

/// Wide-column backend: one table keyed by (`target_id`, `timestamp`).
pub struct DynamoAuditStore {
    client: Client,
    table: String,
}

impl DynamoAuditStore {
    /// Wrap a client and make sure the table exists. A failed create is only
    /// logged: the table may be provisioned out of band.
    pub async fn new(client: Client, table: impl Into<String>) -> Self {
        let store = Self {
            client,
            table: table.into(),
        };
        if let Err(e) = store.ensure_table().await {
            tracing::warn!(table = %store.table, error = %e, "could not ensure dynamodb table");
        }
        store
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    async fn ensure_table(&self) -> Result<(), PipelineError> {
        match self
            .client
            .describe_table()
            .table_name(&self.table)
            .send()
            .await
        {
            Ok(_) => return Ok(()),
            Err(e)
                if e
                    .as_service_error()
                    .is_some_and(|se| se.is_resource_not_found_exception()) => {}
            Err(e) => return Err(dynamo_err(e)),
        }

        tracing::info!(table = %self.table, "creating dynamodb table");

        let attribute = |name: &str| {
            AttributeDefinition::builder()
                .attribute_name(name)
                .attribute_type(ScalarAttributeType::S)
                .build()
                .map_err(dynamo_err)
        };
        let key = |name: &str, key_type: KeyType| {
            KeySchemaElement::builder()
                .attribute_name(name)
                .key_type(key_type)
                .build()
                .map_err(dynamo_err)
        };

        self.client
            .create_table()
            .table_name(&self.table)
            .attribute_definitions(attribute(PARTITION_KEY)?)
            .attribute_definitions(attribute(SORT_KEY)?)
            .key_schema(key(PARTITION_KEY, KeyType::Hash)?)
            .key_schema(key(SORT_KEY, KeyType::Range)?)
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await
            .map_err(dynamo_err)?;

        Ok(())
    }

    async fn put(&self, record: NewAuditRecord) -> Result<AuditRecord, PipelineError> {
        let record = record.finalize()?;

        // Same event again overwrites itself; a different event on the same
        // (target_id, timestamp) key is refused instead of replacing it.
        let written = self
            .client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(item::to_item(&record)))
            .condition_expression("attribute_not_exists(#pk) OR event_id = :eid")
            .expression_attribute_names("#pk", PARTITION_KEY)
            .expression_attribute_values(":eid", AttributeValue::S(record.event_id.to_string()))
            .send()
            .await;

        match written {
            Ok(_) => {}
            Err(e)
                if e
                    .as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception()) =>
            {
                return Err(PipelineError::Conflict(format!(
                    "{} already holds another event at {}",
                    record.target_id,
                    item::sort_key(&record.timestamp)
                )));
            }
            Err(e) => return Err(dynamo_err(e)),
        }

        tracing::debug!(
            event_id = %record.event_id,
            target_id = %record.target_id,
            "audit log written to dynamodb"
        );
        Ok(record)
    }

    async fn query(&self, target_id: &str) -> Result<Vec<AuditRecord>, PipelineError> {
        // Descending over the sort key; the paginator follows LastEvaluatedKey.
        let items: Vec<item::Item> = self
            .client
            .query()
            .table_name(&self.table)
            .key_condition_expression("target_id = :tid")
            .expression_attribute_values(":tid", AttributeValue::S(target_id.to_string()))
            .scan_index_forward(false)
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .map_err(dynamo_err)?;

        items.iter().map(item::from_item).collect()
    }
}

impl AuditStore for DynamoAuditStore {
    fn save_log(&self, record: NewAuditRecord) -> StoreFuture<'_, AuditRecord> {
        Box::pin(self.put(record))
    }

    fn get_logs<'a>(&'a self, target_id: &'a str) -> StoreFuture<'a, Vec<AuditRecord>> {
        Box::pin(self.query(target_id))
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.client
                .describe_table()
                .table_name(&self.table)
                .send()
                .await
                .map_err(dynamo_err)?;
            Ok(())
        })
    }

    fn close(&self) -> StoreFuture<'_, ()> {
        // The SDK client holds no session; dropping it is enough.
        Box::pin(async { Ok(()) })
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::DynamoDb
    }
}
