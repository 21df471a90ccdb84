use {
    crate::{
        config::ConsumerSettings,
        domain::{
            audit::{AuditRecord, NewAuditRecord},
            error::PipelineError,
            event,
            id::EventId,
            store::AuditStore,
            stream::{DeadLetterSink, EventSource, StreamMessage},
        },
    },
    std::sync::Arc,
    tokio::sync::watch,
};

/// What happened to a single stream message. Every outcome is followed by a
/// commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Saved(EventId),
    /// Undecodable body; retrying would fail the same way.
    Dropped,
    /// Not persisted, but parked on the dead-letter topic.
    DeadLettered,
    /// Neither persisted nor parked.
    Lost,
}

pub struct EventConsumer {
    source: Arc<dyn EventSource>,
    store: Arc<dyn AuditStore>,
    dead_letters: Option<Arc<dyn DeadLetterSink>>,
    settings: ConsumerSettings,
}

impl EventConsumer {
    pub fn new(
        source: Arc<dyn EventSource>,
        store: Arc<dyn AuditStore>,
        settings: ConsumerSettings,
    ) -> Self {
        Self {
            source,
            store,
            dead_letters: None,
            settings,
        }
    }

    pub fn with_dead_letters(mut self, sink: Arc<dyn DeadLetterSink>) -> Self {
        self.dead_letters = Some(sink);
        self
    }

    /// Fetch, process, commit, one message at a time, until `shutdown` fires.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(backend = %self.store.backend(), "stream consumer started");

        loop {
            let fetched = tokio::select! {
                _ = shutdown.changed() => {
                    tracing::info!("stream consumer shutting down");
                    return;
                }
                fetched = self.source.fetch(self.settings.fetch_timeout) => fetched,
            };

            match fetched {
                Ok(Some(message)) => {
                    let outcome = self.process(&message).await;
                    tracing::debug!(position = %message.position(), ?outcome, "message processed");
                    if let Err(e) = self.source.commit(&message).await {
                        tracing::error!(position = %message.position(), error = %e, "commit failed");
                    }
                }
                Ok(None) => {
                    tracing::info!("consumer heartbeat: no messages yet, still listening");
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        backoff_secs = self.settings.backoff.as_secs_f64(),
                        "stream fetch failed, backing off"
                    );
                    tokio::select! {
                        _ = shutdown.changed() => {
                            tracing::info!("stream consumer shutting down");
                            return;
                        }
                        _ = tokio::time::sleep(self.settings.backoff) => {}
                    }
                }
            }
        }
    }

    /// Normalize and persist one message. Never fails: every error ends in
    /// one of the terminal outcomes so the partition keeps moving.
    pub async fn process(&self, message: &StreamMessage) -> IngestOutcome {
        tracing::debug!(
            position = %message.position(),
            bytes = message.payload.len(),
            "received message"
        );

        let draft = match event::normalize(&message.payload) {
            Ok(draft) => draft,
            Err(e) => {
                tracing::warn!(position = %message.position(), error = %e, "dropping undecodable message");
                return IngestOutcome::Dropped;
            }
        };

        match self.persist(draft).await {
            Ok(record) => {
                tracing::info!(
                    event_id = %record.event_id,
                    target_id = %record.target_id,
                    action = %record.action,
                    "audit log saved from stream"
                );
                IngestOutcome::Saved(record.event_id)
            }
            Err(e) => self.dead_letter(message, &e).await,
        }
    }

    /// Save with bounded retries. The draft is finalized once up front so
    /// every attempt writes the same id and timestamp.
    async fn persist(&self, draft: NewAuditRecord) -> Result<AuditRecord, PipelineError> {
        let record = draft.finalize()?;
        let mut attempt = 1;

        loop {
            match self.store.save_log(record.clone().into()).await {
                Ok(saved) => return Ok(saved),
                Err(e) if e.is_permanent() || attempt >= self.settings.max_save_attempts => {
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.settings.retry_delay * 2u32.saturating_pow(attempt - 1);
                    tracing::warn!(
                        event_id = %record.event_id,
                        attempt,
                        error = %e,
                        "save failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn dead_letter(&self, message: &StreamMessage, cause: &PipelineError) -> IngestOutcome {
        let reason = cause.to_string();
        let Some(sink) = &self.dead_letters else {
            tracing::error!(
                position = %message.position(),
                error = %reason,
                payload = %String::from_utf8_lossy(&message.payload),
                "audit event lost: not persisted and no dead-letter topic"
            );
            return IngestOutcome::Lost;
        };

        match sink.publish(message, &reason).await {
            Ok(()) => {
                tracing::warn!(position = %message.position(), error = %reason, "audit event dead-lettered");
                IngestOutcome::DeadLettered
            }
            Err(e) => {
                tracing::error!(
                    position = %message.position(),
                    error = %reason,
                    dead_letter_error = %e,
                    payload = %String::from_utf8_lossy(&message.payload),
                    "audit event lost: dead-letter publish failed"
                );
                IngestOutcome::Lost
            }
        }
    }
}
