//! Application state.

use std::sync::Arc;
use std::time::Duration;

use dealifi_store::RocksStore;

use crate::config::ServiceConfig;
use crate::handlers::metadata::is_allowed_image_url;
use crate::uploader::{HttpUploader, Uploader};

/// Redirect hops followed when fetching a remote image.
const MAX_IMAGE_REDIRECTS: usize = 5;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<RocksStore>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Metadata uploader (optional).
    pub uploader: Option<Arc<dyn Uploader>>,

    /// Outbound client for fetching remote images.
    pub http: reqwest::Client,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<RocksStore>, config: ServiceConfig) -> Self {
        let uploader = config.uploader_url.as_ref().and_then(|url| {
            match HttpUploader::new(
                url,
                config.uploader_gateway.clone(),
                config.uploader_api_key.clone(),
            ) {
                Ok(client) => {
                    tracing::info!(uploader_url = %url, "Metadata uploader enabled");
                    Some(Arc::new(client) as Arc<dyn Uploader>)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create uploader client");
                    None
                }
            }
        });

        if uploader.is_none() {
            tracing::warn!("Uploader not configured - metadata uploads will be rejected");
        }

        let allow_private = config.allow_private_image_hosts;
        let redirects = reqwest::redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= MAX_IMAGE_REDIRECTS {
                attempt.error("too many redirects")
            } else if is_allowed_image_url(attempt.url(), allow_private) {
                attempt.follow()
            } else {
                attempt.error("redirect to a disallowed host")
            }
        });

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .redirect(redirects)
            .build()
            .unwrap_or_default();

        Self {
            store,
            config,
            uploader,
            http,
        }
    }

    /// Replace the uploader.
    #[must_use]
    pub fn with_uploader(mut self, uploader: Arc<dyn Uploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    /// Check if an uploader is configured.
    #[must_use]
    pub fn has_uploader(&self) -> bool {
        self.uploader.is_some()
    }
}
