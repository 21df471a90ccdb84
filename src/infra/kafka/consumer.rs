use {
    crate::{
        config::KafkaConfig,
        domain::{
            error::PipelineError,
            stream::{EventSource, StreamFuture, StreamMessage},
        },
    },
    rdkafka::{
        ClientConfig, Message, Offset, TopicPartitionList,
        consumer::{CommitMode, Consumer, StreamConsumer},
    },
    std::time::Duration,
};

/// Consumer-group member with manual commits: an offset only advances once
/// the pipeline is done with the message.
pub struct KafkaEventSource {
    consumer: StreamConsumer,
}

impl KafkaEventSource {
    pub fn new(config: &KafkaConfig) -> Result<Self, PipelineError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", config.brokers.join(","))
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("socket.timeout.ms", "10000")
            .create()?;
        consumer.subscribe(&[config.topic.as_str()])?;

        tracing::info!(
            brokers = ?config.brokers,
            topic = %config.topic,
            group_id = %config.group_id,
            "kafka consumer subscribed"
        );
        Ok(Self { consumer })
    }
}

impl EventSource for KafkaEventSource {
    fn fetch(&self, max_wait: Duration) -> StreamFuture<'_, Option<StreamMessage>> {
        Box::pin(async move {
            let message = match tokio::time::timeout(max_wait, self.consumer.recv()).await {
                Err(_elapsed) => return Ok(None),
                Ok(received) => received?,
            };

            Ok(Some(StreamMessage {
                topic: message.topic().to_string(),
                partition: message.partition(),
                offset: message.offset(),
                key: message.key().map(<[u8]>::to_vec),
                payload: message.payload().map(<[u8]>::to_vec).unwrap_or_default(),
            }))
        })
    }

    fn commit<'a>(&'a self, message: &'a StreamMessage) -> StreamFuture<'a, ()> {
        Box::pin(async move {
            let mut offsets = TopicPartitionList::new();
            offsets.add_partition_offset(
                &message.topic,
                message.partition,
                Offset::Offset(message.offset + 1),
            )?;
            self.consumer.commit(&offsets, CommitMode::Async)?;
            Ok(())
        })
    }
}
