use super::naming;
use super::types::{CountRequest, ErrorBody, Insights, MediaResponse, Model, Record, UploadResult};
use super::UploadGateway;
use crate::config::ApiConfig;
use crate::errors::CrowdcamError;
use crate::types::MediaArtifact;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Typed client for the counting service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    upload_field: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, CrowdcamError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            upload_field: config.upload_field.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, CrowdcamError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            return Err(CrowdcamError::TransportError(format!(
                "HTTP error! status: {}, message: {}",
                status.as_u16(),
                message
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| CrowdcamError::TransportError(format!("Invalid response body: {}", e)))
    }

    /// Upload raw file bytes under a normalized, unique name.
    pub async fn upload_file(
        &self,
        file_name: &str,
        mime_type: &str,
        data: Bytes,
    ) -> Result<MediaResponse, CrowdcamError> {
        let upload_name = naming::upload_file_name(file_name);
        log::info!("Uploading {} as {} ({} bytes)", file_name, upload_name, data.len());

        let part = Part::bytes(data.to_vec())
            .file_name(upload_name)
            .mime_str(mime_type)?;
        let form = Form::new().part(self.upload_field.clone(), part);

        let response = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await?;
        Self::parse(response).await.inspect_err(|e| {
            log::error!("Failed to upload file: {}", e);
        })
    }

    pub async fn fetch_models(&self) -> Result<Vec<Model>, CrowdcamError> {
        let response = self.client.get(self.url("/models")).send().await?;
        Self::parse(response).await
    }

    pub async fn fetch_record(&self, id: i64) -> Result<Record, CrowdcamError> {
        let response = self.client.get(self.url(&format!("/get/{}", id))).send().await?;
        Self::parse(response).await
    }

    pub async fn fetch_archive(&self) -> Result<Vec<Record>, CrowdcamError> {
        let response = self.client.get(self.url("/archive")).send().await?;
        Self::parse(response).await
    }

    /// Ask the service to count `media_id` with `model_id`.
    pub async fn count(&self, media_id: i64, model_id: i64) -> Result<MediaResponse, CrowdcamError> {
        log::info!("Counting media {} with model {}", media_id, model_id);
        let response = self
            .client
            .put(self.url(&format!("/count/{}", media_id)))
            .json(&CountRequest { model_id })
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn fetch_insights(&self) -> Result<Insights, CrowdcamError> {
        let response = self.client.get(self.url("/insights")).send().await?;
        Self::parse(response).await
    }

    // Degrading variants for shells: failures are logged and rendered as
    // empty content instead of blocking the page.

    pub async fn models_or_empty(&self) -> Vec<Model> {
        self.fetch_models().await.unwrap_or_else(|e| {
            log::error!("Failed to fetch models: {}", e);
            Vec::new()
        })
    }

    pub async fn archive_or_empty(&self) -> Vec<Record> {
        self.fetch_archive().await.unwrap_or_else(|e| {
            log::error!("Failed to fetch archive: {}", e);
            Vec::new()
        })
    }

    pub async fn record_or_none(&self, id: i64) -> Option<Record> {
        self.fetch_record(id)
            .await
            .map_err(|e| log::error!("Failed to fetch record {}: {}", id, e))
            .ok()
    }

    pub async fn insights_or_none(&self) -> Option<Insights> {
        self.fetch_insights()
            .await
            .map_err(|e| log::error!("Failed to fetch insights: {}", e))
            .ok()
    }
}

#[async_trait]
impl UploadGateway for ApiClient {
    async fn upload(&self, artifact: &MediaArtifact) -> Result<UploadResult, CrowdcamError> {
        self.upload_file(&artifact.file_name, &artifact.mime_type, artifact.data.clone())
            .await
    }
}
