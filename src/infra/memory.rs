use {
    crate::domain::{
        audit::{AuditRecord, NewAuditRecord, sort_newest_first},
        store::{AuditStore, StorageBackend, StoreFuture},
    },
    std::collections::HashMap,
    tokio::sync::RwLock,
};

/// Process-local store for development and tests. Records are grouped by
/// partition key like the wide-column backend.
#[derive(Default)]
pub struct MemoryAuditStore {
    partitions: RwLock<HashMap<String, Vec<AuditRecord>>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.partitions.read().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl AuditStore for MemoryAuditStore {
    fn save_log(&self, record: NewAuditRecord) -> StoreFuture<'_, AuditRecord> {
        Box::pin(async move {
            let record = record.finalize()?;
            let mut partitions = self.partitions.write().await;
            // one record per event_id, the latest write wins
            for records in partitions.values_mut() {
                records.retain(|r| r.event_id != record.event_id);
            }
            partitions
                .entry(record.target_id.clone())
                .or_default()
                .push(record.clone());
            Ok(record)
        })
    }

    fn get_logs<'a>(&'a self, target_id: &'a str) -> StoreFuture<'a, Vec<AuditRecord>> {
        Box::pin(async move {
            let mut records = self
                .partitions
                .read()
                .await
                .get(target_id)
                .cloned()
                .unwrap_or_default();
            sort_newest_first(&mut records);
            Ok(records)
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }

    fn close(&self) -> StoreFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
