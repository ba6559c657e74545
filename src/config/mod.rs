use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000"). Optional for worker processes.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Redis connection string for the job queue
    pub redis_url: String,

    /// Redis connection string for the status store (defaults to redis_url)
    pub status_store_url: Option<String>,

    /// Name of the job queue (also prefixes the processing and poison lists)
    #[serde(default = "default_queue_name")]
    pub queue_name: String,

    /// Request timeout for fetching articles, in seconds
    #[serde(default = "default_analysis_timeout_secs")]
    pub analysis_timeout_secs: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_queue_name() -> String {
    "article_analysis_jobs".to_string()
}

fn default_analysis_timeout_secs() -> u64 {
    10
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Status store connection string, falling back to the queue's.
    pub fn status_store_url(&self) -> &str {
        self.status_store_url.as_deref().unwrap_or(&self.redis_url)
    }
}
