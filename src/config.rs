use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Image similarity service endpoint (multipart POST)
    #[serde(default = "default_similarity_service_url")]
    pub similarity_service_url: String,

    /// Timeout for one image upload round trip, in seconds
    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,

    /// Largest accepted image upload body, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// JSON file holding the product catalog
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Currency symbol prefixed to prices
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Image shown for products without one
    #[serde(default = "default_placeholder_image")]
    pub placeholder_image: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_similarity_service_url() -> String {
    "http://localhost:5001/recommend".to_string()
}

fn default_upload_timeout_secs() -> u64 {
    30
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_catalog_path() -> String {
    "data/catalog.json".to_string()
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_placeholder_image() -> String {
    "/images/placeholder.png".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
