use {
    crate::domain::error::PipelineError,
    std::str::FromStr,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One flattened JSON object per line, for log aggregators.
    Json,
    Text,
}

impl FromStr for LogFormat {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "pretty" => Ok(Self::Text),
            other => Err(PipelineError::Config(format!("unknown LOG_FORMAT: {other}"))),
        }
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the `info` default.
/// Call once, before anything logs.
pub fn init_logging(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_target(true)
                    .with_ansi(false),
            )
            .init(),
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).init(),
    }
}
