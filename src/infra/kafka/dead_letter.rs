use {
    crate::domain::{
        error::PipelineError,
        stream::{DeadLetterSink, StreamFuture, StreamMessage},
    },
    rdkafka::{
        ClientConfig,
        message::{Header, OwnedHeaders},
        producer::{FutureProducer, FutureRecord},
    },
    std::time::Duration,
};

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Republishes undeliverable events, untouched, on a side topic.
pub struct KafkaDeadLetterSink {
    producer: FutureProducer,
    topic: String,
}

impl KafkaDeadLetterSink {
    pub fn new(brokers: &[String], topic: impl Into<String>) -> Result<Self, PipelineError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers.join(","))
            .set("message.timeout.ms", "10000")
            .create()?;
        Ok(Self {
            producer,
            topic: topic.into(),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl DeadLetterSink for KafkaDeadLetterSink {
    fn publish<'a>(&'a self, message: &'a StreamMessage, reason: &'a str) -> StreamFuture<'a, ()> {
        Box::pin(async move {
            let source = message.position();
            let headers = OwnedHeaders::new()
                .insert(Header {
                    key: "dlq-reason",
                    value: Some(reason),
                })
                .insert(Header {
                    key: "dlq-source",
                    value: Some(source.as_str()),
                });

            let mut record = FutureRecord::<[u8], [u8]>::to(&self.topic)
                .payload(message.payload.as_slice())
                .headers(headers);
            if let Some(key) = message.key.as_deref() {
                record = record.key(key);
            }

            self.producer
                .send(record, DELIVERY_TIMEOUT)
                .await
                .map(|_| ())
                .map_err(|(e, _)| PipelineError::Stream(e))
        })
    }
}
