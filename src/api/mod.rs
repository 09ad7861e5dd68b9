//! Counting service API
//!
//! The [`UploadGateway`] trait is the only thing a capture session needs from
//! the network. [`ApiClient`] implements it and the rest of the service's
//! HTTP surface (models, records, archive, counting, insights).

mod client;
pub mod naming;
pub mod types;

pub use client::ApiClient;
pub use types::{
    CountRequest, Insights, MediaResponse, Model, ModelInsight, Record, UploadResult,
};

use crate::errors::CrowdcamError;
use crate::types::MediaArtifact;
use async_trait::async_trait;

/// Accepts a finalized artifact and returns a persisted media reference.
#[async_trait]
pub trait UploadGateway: Send + Sync {
    async fn upload(&self, artifact: &MediaArtifact) -> Result<UploadResult, CrowdcamError>;
}
