//! Device capability provider
//!
//! The session never talks to camera hardware directly. It asks a
//! [`DeviceProvider`] for devices and streams, which lets tests substitute
//! synthetic devices and lets each platform plug in its own backend.

use crate::errors::CrowdcamError;
use crate::types::{CaptureDevice, VideoFrame};
use async_trait::async_trait;

/// A live device stream. Owned by exactly one session at a time.
pub trait MediaStream: Send {
    /// Stable identifier of this stream instance.
    fn id(&self) -> &str;

    /// Device the stream was opened on, if the provider knows it.
    fn device_id(&self) -> Option<&str>;

    /// Sample the frame currently shown by the live preview.
    fn grab_frame(&mut self) -> Result<VideoFrame, CrowdcamError>;

    /// Stop every underlying track. Must be safe to call more than once.
    fn stop(&mut self);
}

/// Environment facility for enumerating and acquiring camera streams.
#[async_trait]
pub trait DeviceProvider: Send + Sync {
    async fn list_devices(&self) -> Result<Vec<CaptureDevice>, CrowdcamError>;

    /// Acquire a video-only stream, constrained to `device_id` when given.
    ///
    /// Failures are reported as [`CrowdcamError::CaptureUnavailable`].
    async fn acquire_stream(
        &self,
        device_id: Option<&str>,
    ) -> Result<Box<dyn MediaStream>, CrowdcamError>;
}

/// Owns a stream and stops it when released or dropped.
pub(crate) struct StreamGuard {
    stream: Option<Box<dyn MediaStream>>,
}

impl StreamGuard {
    pub(crate) fn new(stream: Box<dyn MediaStream>) -> Self {
        Self {
            stream: Some(stream),
        }
    }

    pub(crate) fn stream_mut(&mut self) -> Option<&mut (dyn MediaStream + 'static)> {
        self.stream.as_deref_mut()
    }

    /// Stop all tracks now.
    pub(crate) fn release(mut self) {
        self.stop_inner();
    }

    fn stop_inner(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            log::info!("Releasing stream {}", stream.id());
            stream.stop();
        }
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.stop_inner();
    }
}
