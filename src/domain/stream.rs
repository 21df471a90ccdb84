use {
    super::error::PipelineError,
    std::{future::Future, pin::Pin, time::Duration},
};

pub type StreamFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PipelineError>> + Send + 'a>>;

/// A message fetched from the event log, detached from the client that read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<Vec<u8>>,
    pub payload: Vec<u8>,
}

impl StreamMessage {
    /// `topic/partition/offset`, used in logs and dead-letter headers.
    pub fn position(&self) -> String {
        format!("{}/{}/{}", self.topic, self.partition, self.offset)
    }
}

/// Consumer-group member reading the events topic.
pub trait EventSource: Send + Sync {
    /// Wait at most `max_wait` for the next message. `Ok(None)` means the wait
    /// elapsed without traffic; `Err` is a transport failure.
    fn fetch(&self, max_wait: Duration) -> StreamFuture<'_, Option<StreamMessage>>;

    /// Acknowledge `message` so the group resumes after it.
    fn commit<'a>(&'a self, message: &'a StreamMessage) -> StreamFuture<'a, ()>;
}

/// Destination for messages that could not be persisted.
pub trait DeadLetterSink: Send + Sync {
    fn publish<'a>(&'a self, message: &'a StreamMessage, reason: &'a str) -> StreamFuture<'a, ()>;
}
