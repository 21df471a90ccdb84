#![allow(dead_code)]

use audit_sync::domain::audit::{AuditRecord, NewAuditRecord};
use audit_sync::domain::error::PipelineError;
use audit_sync::domain::store::{AuditStore, StorageBackend, StoreFuture};
use audit_sync::domain::stream::{DeadLetterSink, EventSource, StreamFuture, StreamMessage};
use audit_sync::infra::memory::MemoryAuditStore;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// One scripted answer to `EventSource::fetch`.
pub enum Fetch {
    Message(StreamMessage),
    Idle,
    TransportError,
}

/// Event source that replays a script, then stays idle forever.
#[derive(Default)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<Fetch>>,
    committed: Mutex<Vec<i64>>,
    fetches: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(script: Vec<Fetch>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    pub fn committed_offsets(&self) -> Vec<i64> {
        self.committed.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl EventSource for ScriptedSource {
    fn fetch(&self, max_wait: Duration) -> StreamFuture<'_, Option<StreamMessage>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        Box::pin(async move {
            match next {
                Some(Fetch::Message(m)) => Ok(Some(m)),
                Some(Fetch::TransportError) => Err(PipelineError::Stream(
                    rdkafka::error::KafkaError::Canceled,
                )),
                Some(Fetch::Idle) | None => {
                    tokio::time::sleep(max_wait).await;
                    Ok(None)
                }
            }
        })
    }

    fn commit<'a>(&'a self, message: &'a StreamMessage) -> StreamFuture<'a, ()> {
        self.committed.lock().unwrap().push(message.offset);
        Box::pin(async { Ok(()) })
    }
}

/// Dead-letter sink that remembers what it was given.
#[derive(Default)]
pub struct RecordingDeadLetters {
    pub published: Mutex<Vec<(i64, String)>>,
    pub fail: bool,
}

impl RecordingDeadLetters {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn offsets(&self) -> Vec<i64> {
        self.published.lock().unwrap().iter().map(|(o, _)| *o).collect()
    }
}

impl DeadLetterSink for RecordingDeadLetters {
    fn publish<'a>(&'a self, message: &'a StreamMessage, reason: &'a str) -> StreamFuture<'a, ()> {
        Box::pin(async move {
            if self.fail {
                return Err(PipelineError::Stream(
                    rdkafka::error::KafkaError::Canceled,
                ));
            }
            self.published
                .lock()
                .unwrap()
                .push((message.offset, reason.to_string()));
            Ok(())
        })
    }
}

fn throttled() -> PipelineError {
    PipelineError::DynamoDb("ProvisionedThroughputExceededException".into())
}

fn key_taken() -> PipelineError {
    PipelineError::Conflict("p1 already holds another event".into())
}

/// Store whose first `failures` writes fail with a backend error; later
/// writes and all reads go to an in-memory store.
pub struct FlakyStore {
    inner: MemoryAuditStore,
    failures: usize,
    error: fn() -> PipelineError,
    pub save_attempts: AtomicUsize,
}

impl FlakyStore {
    pub fn failing_first(failures: usize) -> Self {
        Self {
            inner: MemoryAuditStore::new(),
            failures,
            error: throttled,
            save_attempts: AtomicUsize::new(0),
        }
    }

    pub fn always_failing() -> Self {
        Self::failing_first(usize::MAX)
    }

    /// Every write collides with a different event on the same key.
    pub fn always_conflicting() -> Self {
        Self {
            error: key_taken,
            ..Self::always_failing()
        }
    }

    pub fn attempts(&self) -> usize {
        self.save_attempts.load(Ordering::SeqCst)
    }
}

impl AuditStore for FlakyStore {
    fn save_log(&self, record: NewAuditRecord) -> StoreFuture<'_, AuditRecord> {
        let attempt = self.save_attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            let error = (self.error)();
            return Box::pin(async move { Err(error) });
        }
        self.inner.save_log(record)
    }

    fn get_logs<'a>(&'a self, target_id: &'a str) -> StoreFuture<'a, Vec<AuditRecord>> {
        self.inner.get_logs(target_id)
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async { Err(PipelineError::DynamoDb("connection refused".into())) })
    }

    fn close(&self) -> StoreFuture<'_, ()> {
        self.inner.close()
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::DynamoDb
    }
}

// ── Message builders ───────────────────────────────────────────────────────

pub fn message(offset: i64, payload: impl Into<Vec<u8>>) -> StreamMessage {
    StreamMessage {
        topic: "healthcore.events".into(),
        partition: 0,
        offset,
        key: None,
        payload: payload.into(),
    }
}

pub fn event_json(event_id: &str, actor_id: &str, target_id: &str, timestamp: &str) -> Vec<u8> {
    serde_json::json!({
        "event_id": event_id,
        "type": "events",
        "timestamp": timestamp,
        "payload": {
            "actor_id": actor_id,
            "target_id": target_id,
            "resource_type": "PATIENT",
            "action": "VIEWED",
            "details": "{\"reason\":\"treatment review\"}",
        }
    })
    .to_string()
    .into_bytes()
}

pub fn record_at(target_id: &str, actor_id: &str, unix_secs: i64) -> NewAuditRecord {
    NewAuditRecord::new(actor_id, "VIEWED")
        .with_target(target_id)
        .with_resource_type("PATIENT")
        .with_timestamp(chrono::DateTime::from_timestamp(unix_secs, 0).unwrap())
}
