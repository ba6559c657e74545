use article_analyzer::{
    config::AppConfig,
    services::{analyzer::ArticleAnalyzer, queue::JobQueue, store::StatusStore, worker::Worker},
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const POLL_TIMEOUT: Duration = Duration::from_secs(5);
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting article analysis worker");

    // Load configuration
    let config = AppConfig::from_env().expect("Failed to load configuration");

    // Initialize services
    tracing::info!("Connecting to Redis job queue");
    let queue = JobQueue::new(&config.redis_url, &config.queue_name)
        .expect("Failed to initialize job queue");

    tracing::info!("Connecting to status store");
    let store =
        StatusStore::new(config.status_store_url()).expect("Failed to initialize status store");

    let analyzer = ArticleAnalyzer::new(Duration::from_secs(config.analysis_timeout_secs))
        .expect("Failed to initialize article analyzer");

    let queue = Arc::new(queue);
    let store = Arc::new(store);

    // Reclaim deliveries left in flight by a previous crash before taking
    // new work. Redelivery of finished jobs is idempotent.
    match queue.recover_processing().await {
        Ok(0) => {}
        Ok(n) => tracing::warn!(recovered = n, "Requeued orphaned in-flight deliveries"),
        Err(e) => tracing::error!(error = %e, "Startup recovery failed"),
    }

    let worker = Worker::new(queue, store, analyzer, POLL_TIMEOUT, RETRY_BACKOFF);

    tracing::info!("Worker ready, starting job processing loop");
    worker.run().await;
}
