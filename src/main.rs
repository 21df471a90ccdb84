use {
    audit_sync::{
        AppState,
        adapters::http,
        config::Config,
        domain::stream::DeadLetterSink,
        infra::{
            self,
            kafka::{KafkaDeadLetterSink, KafkaEventSource},
        },
        services::ingest::EventConsumer,
        telemetry,
    },
    std::sync::Arc,
    tokio::{signal, sync::watch},
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("invalid configuration");
    telemetry::init_logging(config.log_format);

    tracing::info!(storage = %config.storage, "starting audit service");

    let store = infra::connect_store(&config)
        .await
        .expect("failed to initialize audit store");

    let source = KafkaEventSource::new(&config.kafka).expect("failed to create kafka consumer");
    let mut consumer = EventConsumer::new(Arc::new(source), store.clone(), config.consumer.clone());
    match &config.kafka.dead_letter_topic {
        Some(topic) => {
            let sink = KafkaDeadLetterSink::new(&config.kafka.brokers, topic)
                .expect("failed to create dead-letter producer");
            tracing::info!(topic = %sink.topic(), "dead-letter topic enabled");
            consumer = consumer.with_dead_letters(Arc::new(sink) as Arc<dyn DeadLetterSink>);
        }
        None => tracing::warn!("no dead-letter topic, unsaved stream events will be dropped"),
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer_task = tokio::spawn(consumer.run(shutdown_rx));

    let app = http::router(AppState {
        store: store.clone(),
    });
    let listener = tokio::net::TcpListener::bind(config.http_addr)
        .await
        .expect("failed to bind http listener");
    tracing::info!(addr = %config.http_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("http server failed");

    shutdown_tx.send(true).ok();
    if let Err(e) = consumer_task.await {
        tracing::error!(error = %e, "stream consumer task failed");
    }
    if let Err(e) = store.close().await {
        tracing::warn!(error = %e, "error closing audit store");
    }
    tracing::info!("audit service stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl+c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
