use crate::device::{DeviceProvider, MediaStream};
use crate::errors::CrowdcamError;
use crate::types::{CaptureDevice, VideoFrame};
use async_trait::async_trait;
use nokhwa::{
    pixel_format::RgbFormat,
    query,
    utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType},
    CallbackCamera,
};
use uuid::Uuid;

fn camera_index(device_id: &str) -> CameraIndex {
    match device_id.parse::<u32>() {
        Ok(index) => CameraIndex::Index(index),
        Err(_) => CameraIndex::String(device_id.to_string()),
    }
}

/// Device provider for the operating system's cameras.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeProvider;

impl NativeProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DeviceProvider for NativeProvider {
    async fn list_devices(&self) -> Result<Vec<CaptureDevice>, CrowdcamError> {
        let cameras = tokio::task::spawn_blocking(|| query(ApiBackend::Auto))
            .await
            .map_err(|e| CrowdcamError::CaptureUnavailable(format!("Task join error: {}", e)))?
            .map_err(|e| {
                CrowdcamError::CaptureUnavailable(format!("Failed to query cameras: {}", e))
            })?;

        Ok(cameras
            .into_iter()
            .map(|info| CaptureDevice::new(info.index().to_string(), info.human_name()))
            .collect())
    }

    async fn acquire_stream(
        &self,
        device_id: Option<&str>,
    ) -> Result<Box<dyn MediaStream>, CrowdcamError> {
        let device_id = device_id.unwrap_or("0").to_string();
        let index = camera_index(&device_id);
        log::info!("Opening native camera {}", device_id);

        let camera = tokio::task::spawn_blocking(move || {
            let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::None);
            let mut camera = CallbackCamera::new(index, requested, |_| {}).map_err(|e| {
                CrowdcamError::CaptureUnavailable(format!("Failed to initialize camera: {}", e))
            })?;
            camera.open_stream().map_err(|e| {
                CrowdcamError::CaptureUnavailable(format!("Failed to start stream: {}", e))
            })?;
            Ok::<_, CrowdcamError>(camera)
        })
        .await
        .map_err(|e| CrowdcamError::CaptureUnavailable(format!("Task join error: {}", e)))??;

        Ok(Box::new(NativeStream {
            id: Uuid::new_v4().to_string(),
            device_id,
            camera: Some(camera),
        }))
    }
}

/// A live nokhwa camera stream.
pub struct NativeStream {
    id: String,
    device_id: String,
    camera: Option<CallbackCamera>,
}

impl MediaStream for NativeStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn device_id(&self) -> Option<&str> {
        Some(&self.device_id)
    }

    fn grab_frame(&mut self) -> Result<VideoFrame, CrowdcamError> {
        let camera = self
            .camera
            .as_mut()
            .ok_or_else(|| CrowdcamError::EncodingFailed("camera stream is stopped".to_string()))?;

        let buffer = camera
            .poll_frame()
            .map_err(|e| CrowdcamError::EncodingFailed(format!("Failed to capture frame: {}", e)))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CrowdcamError::EncodingFailed(format!("Failed to decode frame: {}", e)))?;

        let (width, height) = (decoded.width(), decoded.height());
        Ok(VideoFrame::new(decoded.into_raw(), width, height))
    }

    fn stop(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop_stream() {
                log::warn!("Failed to stop camera {}: {}", self.device_id, e);
            }
        }
    }
}

impl Drop for NativeStream {
    fn drop(&mut self) {
        self.stop();
    }
}
