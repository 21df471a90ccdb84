pub mod consumer;
pub mod dead_letter;

pub use consumer::KafkaEventSource;
pub use dead_letter::KafkaDeadLetterSink;
