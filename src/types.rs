use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of artifact a capture session produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaptureMode {
    #[default]
    Photo,
    Video,
}

impl CaptureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureMode::Photo => "photo",
            CaptureMode::Video => "video",
        }
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle position of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaptureStatus {
    #[default]
    Idle,
    Acquiring,
    Previewing,
    Recording,
    Finalized,
    /// The artifact has been handed to the upload gateway.
    Uploading,
    Failed,
}

impl CaptureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureStatus::Idle => "idle",
            CaptureStatus::Acquiring => "acquiring",
            CaptureStatus::Previewing => "previewing",
            CaptureStatus::Recording => "recording",
            CaptureStatus::Finalized => "finalized",
            CaptureStatus::Uploading => "uploading",
            CaptureStatus::Failed => "failed",
        }
    }

    /// States in which the session owns a live device stream.
    pub fn holds_stream(&self) -> bool {
        matches!(self, CaptureStatus::Previewing | CaptureStatus::Recording)
    }
}

impl fmt::Display for CaptureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A capture device as enumerated by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureDevice {
    pub id: String,
    pub label: String,
}

impl CaptureDevice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    /// Label to show in a device picker; unlabeled devices fall back to their id.
    pub fn display_name(&self) -> String {
        if self.label.trim().is_empty() {
            format!("Camera {}", self.id)
        } else {
            self.label.clone()
        }
    }
}

/// One sampled frame of a live stream, RGB8 row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl VideoFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Byte length an RGB8 frame of these dimensions must have.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }
}

/// Finalized output of a capture session, ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaArtifact {
    pub data: Bytes,
    pub mime_type: String,
    pub file_name: String,
    pub captured_at: DateTime<Utc>,
}

impl MediaArtifact {
    pub fn new(data: Bytes, mime_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
            file_name: file_name.into(),
            captured_at: Utc::now(),
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

/// How a `start_capture` call ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The stream was adopted and the session is previewing.
    Previewing,
    /// A later transition (cancel, device switch, restart) replaced this
    /// acquisition; its stream, if one arrived, was stopped immediately.
    Superseded,
}

/// Serializable view of a session, for shells that render state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub status: CaptureStatus,
    pub mode: CaptureMode,
    pub selected_device: Option<String>,
    pub has_stream: bool,
    pub buffered_chunks: usize,
    pub artifact_file_name: Option<String>,
}
