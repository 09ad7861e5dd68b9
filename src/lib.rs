//! crowdcam: camera capture sessions and a counting-service client for
//! crowd counting workflows
//!
//! This crate drives the capture side of a crowd counting client: pick a
//! camera, preview it, take a mirrored photo or record a video, and upload
//! the finished artifact to the counting service.
//!
//! # Features
//! - Headless capture state machine with deterministic stream teardown
//! - Injectable device providers (synthetic for tests, nokhwa with `native`)
//! - Typed HTTP client for uploads, models, records, archive and insights
//! - Chart-ready shaping of insight aggregates
//!
//! # Usage
//! ```rust,no_run
//! use std::sync::Arc;
//! use crowdcam::{ApiClient, CaptureMode, CaptureSession, CrowdcamConfig};
//! use crowdcam::testing::SyntheticProvider;
//!
//! # async fn run() -> Result<(), crowdcam::CrowdcamError> {
//! let config = CrowdcamConfig::load_or_default();
//! let api = ApiClient::new(&config.api)?;
//! let session = CaptureSession::with_config(Arc::new(SyntheticProvider::new()), config.capture);
//!
//! session.start_capture(CaptureMode::Photo).await?;
//! session.capture_photo()?;
//! let uploaded = session.submit(&api).await?;
//! println!("stored as {} at {}", uploaded.id, uploaded.url);
//! # Ok(())
//! # }
//! ```
pub mod api;
pub mod config;
pub mod device;
pub mod errors;
pub mod insights;
pub mod invariants;
pub mod media;
pub mod photo;
pub mod platform;
pub mod recording;
pub mod session;
pub mod types;

// Testing utilities - synthetic devices for offline testing
pub mod testing;

// Re-exports for convenience
pub use api::{ApiClient, UploadGateway, UploadResult};
pub use config::CrowdcamConfig;
pub use device::{DeviceProvider, MediaStream};
pub use errors::CrowdcamError;
pub use session::CaptureSession;
pub use types::{
    AcquireOutcome, CaptureDevice, CaptureMode, CaptureStatus, MediaArtifact, SessionSnapshot,
    VideoFrame,
};

#[cfg(feature = "native")]
pub use platform::NativeProvider;

/// Initialize logging for crowdcam
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "crowdcam=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
        native_devices: cfg!(feature = "native"),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub native_devices: bool,
}
