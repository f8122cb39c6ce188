//! Common test utilities for dealifi integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use tempfile::TempDir;

use dealifi_core::WalletAddress;
use dealifi_service::{create_router, AppState, ServiceConfig, UploadError, Uploader};
use dealifi_store::RocksStore;

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// Uploader double, when the harness was built with one.
    pub uploader: Option<Arc<FakeUploader>>,
}

impl TestHarness {
    /// Create a new test harness with a fresh database and no uploader.
    pub fn new() -> Self {
        Self::build(None, |_| {})
    }

    /// Create a harness whose uploads go to a [`FakeUploader`].
    pub fn with_uploader() -> Self {
        Self::build(Some(Arc::new(FakeUploader::default())), |_| {})
    }

    /// Like [`TestHarness::with_uploader`], with the config adjusted first.
    pub fn with_uploader_and_config(configure: impl FnOnce(&mut ServiceConfig)) -> Self {
        Self::build(Some(Arc::new(FakeUploader::default())), configure)
    }

    fn build(
        uploader: Option<Arc<FakeUploader>>,
        configure: impl FnOnce(&mut ServiceConfig),
    ) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = RocksStore::open(temp_dir.path()).expect("Failed to open store");

        let mut config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            ..ServiceConfig::default()
        };
        configure(&mut config);

        let mut state = AppState::new(Arc::new(store), config);
        if let Some(uploader) = &uploader {
            state = state.with_uploader(uploader.clone() as Arc<dyn Uploader>);
        }
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            _temp_dir: temp_dir,
            uploader,
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic address for tests.
pub fn address(byte: u8) -> WalletAddress {
    WalletAddress::from_bytes([byte; 32])
}

/// Uploader that keeps everything in memory.
#[derive(Default)]
pub struct FakeUploader {
    counter: AtomicUsize,
    /// Every upload as `(content type, bytes)`, in order.
    pub uploads: Mutex<Vec<(String, Vec<u8>)>>,
}

#[async_trait]
impl Uploader for FakeUploader {
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> Result<String, UploadError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        self.uploads
            .lock()
            .unwrap()
            .push((content_type.to_string(), bytes));
        Ok(format!("https://gateway.test/{n}"))
    }
}
