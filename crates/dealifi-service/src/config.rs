//! Service configuration.

use serde::Deserialize;
use std::path::Path;

/// Default listen address.
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:4000";

/// Default gateway for uploaded content.
const DEFAULT_UPLOADER_GATEWAY: &str = "https://gateway.irys.xyz";

/// Link stored as `external_url` in uploaded token metadata.
const DEFAULT_EXTERNAL_URL: &str = "https://dealifi.com";

/// Default maximum request body size. Images arrive inline as data URLs.
const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:4000").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "/data/dealifi").
    pub data_dir: String,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Allow `create-uri` to fetch images from loopback, private and
    /// link-local hosts (default: false).
    pub allow_private_image_hosts: bool,

    /// Base URL of the storage uploader. Uploads are disabled when unset.
    pub uploader_url: Option<String>,

    /// Bearer token for the uploader (optional).
    pub uploader_api_key: Option<String>,

    /// Public gateway that serves uploaded content by id.
    pub uploader_gateway: String,

    /// `external_url` written into token metadata.
    pub external_url: String,
}

/// Uploader secrets file structure.
#[derive(Debug, Deserialize)]
struct UploaderSecrets {
    url: String,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    gateway: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let (uploader_url, uploader_api_key, secrets_gateway) = load_uploader_secrets();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR")
                .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/dealifi".into()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_BODY_BYTES),
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
            allow_private_image_hosts: std::env::var("ALLOW_PRIVATE_IMAGE_HOSTS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            uploader_url,
            uploader_api_key,
            uploader_gateway: secrets_gateway
                .or_else(|| std::env::var("UPLOADER_GATEWAY").ok())
                .unwrap_or_else(|| DEFAULT_UPLOADER_GATEWAY.into()),
            external_url: std::env::var("EXTERNAL_URL")
                .unwrap_or_else(|_| DEFAULT_EXTERNAL_URL.into()),
        }
    }
}

/// Load uploader secrets from file or environment.
fn load_uploader_secrets() -> (Option<String>, Option<String>, Option<String>) {
    let secret_paths = [
        ".secrets/uploader.json",
        "dealifi/.secrets/uploader.json",
        "../.secrets/uploader.json",
    ];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<UploaderSecrets>(path) {
            tracing::info!(path = %path, "Loaded uploader secrets from file");
            return (Some(secrets.url), secrets.api_key, secrets.gateway);
        }
    }

    tracing::debug!("Uploader secrets file not found, using environment variables");
    (
        std::env::var("UPLOADER_URL").ok(),
        std::env::var("UPLOADER_API_KEY").ok(),
        None,
    )
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.into(),
            data_dir: "/data/dealifi".into(),
            cors_origins: vec!["*".into()],
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            request_timeout_seconds: 60,
            allow_private_image_hosts: false,
            uploader_url: None,
            uploader_api_key: None,
            uploader_gateway: DEFAULT_UPLOADER_GATEWAY.into(),
            external_url: DEFAULT_EXTERNAL_URL.into(),
        }
    }
}
