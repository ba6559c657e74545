mod app_state;
mod config;
mod models;
mod routes;
mod services;

use axum::{routing::get, routing::post, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use app_state::AppState;
use config::AppConfig;
use services::{queue::JobQueue, store::StatusStore};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing article-analyzer server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!(
        "article_jobs_submitted",
        "Total analysis jobs accepted and enqueued"
    );
    metrics::describe_counter!(
        "article_jobs_completed",
        "Total analysis jobs that completed successfully"
    );
    metrics::describe_counter!(
        "article_jobs_failed",
        "Total analysis jobs that ended in a failed terminal state"
    );
    metrics::describe_counter!(
        "article_jobs_poisoned",
        "Total malformed queue messages quarantined"
    );
    metrics::describe_gauge!(
        "article_queue_depth",
        "Current number of pending jobs in the queue"
    );
    metrics::describe_histogram!(
        "article_processing_seconds",
        "Time to analyze one article"
    );

    // Initialize Redis job queue
    tracing::info!("Connecting to Redis job queue");
    let queue = JobQueue::new(&config.redis_url, &config.queue_name)
        .expect("Failed to initialize job queue");

    // Initialize status store
    tracing::info!("Connecting to status store");
    let store =
        StatusStore::new(config.status_store_url()).expect("Failed to initialize status store");

    // Create shared application state
    let state = AppState::new(queue, store);

    // Build API routes
    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/articles", post(routes::articles::submit_article))
        .route("/articles/{job_id}", get(routes::articles::get_analysis_result))
        .with_state(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(16 * 1024)); // 16 KiB limit

    tracing::info!("Starting article-analyzer on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
