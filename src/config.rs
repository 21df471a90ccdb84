use {
    crate::{domain::error::PipelineError, domain::store::StorageBackend, telemetry::LogFormat},
    std::{net::SocketAddr, str::FromStr, time::Duration},
};

#[derive(Debug, Clone)]
pub struct Config {
    pub http_addr: SocketAddr,
    pub storage: StorageBackend,
    pub mongo: MongoConfig,
    pub dynamo: DynamoConfig,
    pub kafka: KafkaConfig,
    pub consumer: ConsumerSettings,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamoConfig {
    /// Local emulator endpoint; `None` uses the regional AWS endpoint.
    pub endpoint: Option<String>,
    pub table: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaConfig {
    pub brokers: Vec<String>,
    pub topic: String,
    pub group_id: String,
    pub dead_letter_topic: Option<String>,
}

/// Timing and retry knobs of the stream consumer loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerSettings {
    pub fetch_timeout: Duration,
    pub backoff: Duration,
    pub max_save_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for ConsumerSettings {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            backoff: Duration::from_secs(5),
            max_save_attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to the local
    /// docker-compose defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PipelineError> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let parse = |key: &str, default: &str| -> Result<u64, PipelineError> {
            let raw = get(key, default);
            raw.trim()
                .parse()
                .map_err(|_| PipelineError::Config(format!("{key} must be an integer, got {raw:?}")))
        };

        let http_addr = get("HTTP_ADDR", "0.0.0.0:50051");
        let http_addr = SocketAddr::from_str(&http_addr)
            .map_err(|e| PipelineError::Config(format!("HTTP_ADDR {http_addr:?}: {e}")))?;

        let brokers = get("KAFKA_BROKERS", "kafka:9092")
            .split(',')
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(String::from)
            .collect::<Vec<_>>();
        if brokers.is_empty() {
            return Err(PipelineError::Config("KAFKA_BROKERS is empty".into()));
        }

        let dead_letter_topic = Some(get("DEAD_LETTER_TOPIC", "healthcore.events.dlq"))
            .filter(|t| !t.trim().is_empty());

        let max_save_attempts = parse("CONSUMER_MAX_SAVE_ATTEMPTS", "3")?;
        if max_save_attempts == 0 {
            return Err(PipelineError::Config(
                "CONSUMER_MAX_SAVE_ATTEMPTS must be at least 1".into(),
            ));
        }

        Ok(Self {
            http_addr,
            storage: get("STORAGE_BACKEND", "mongodb").parse()?,
            mongo: MongoConfig {
                uri: get("MONGODB_URI", "mongodb://mongodb:27017"),
                database: get("MONGODB_DATABASE", "audit_logs"),
                collection: get("MONGODB_COLLECTION", "events"),
            },
            dynamo: DynamoConfig {
                endpoint: lookup("DYNAMODB_ENDPOINT").filter(|e| !e.trim().is_empty()),
                table: get("DYNAMODB_TABLE", "AuditLogs"),
                region: get("AWS_REGION", "us-east-1"),
            },
            kafka: KafkaConfig {
                brokers,
                topic: get("KAFKA_TOPIC", "healthcore.events"),
                group_id: get("KAFKA_GROUP_ID", "audit-service-group"),
                dead_letter_topic,
            },
            consumer: ConsumerSettings {
                fetch_timeout: Duration::from_secs(parse("CONSUMER_FETCH_TIMEOUT_SECS", "30")?),
                backoff: Duration::from_secs(parse("CONSUMER_BACKOFF_SECS", "5")?),
                max_save_attempts: u32::try_from(max_save_attempts).map_err(|_| {
                    PipelineError::Config("CONSUMER_MAX_SAVE_ATTEMPTS is too large".into())
                })?,
                retry_delay: ConsumerSettings::default().retry_delay,
            },
            log_format: get("LOG_FORMAT", "text").parse()?,
        })
    }
}
