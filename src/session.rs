//! Capture session state machine
//!
//! A [`CaptureSession`] governs one photo/video acquisition-to-artifact
//! lifecycle:
//!
//! ```text
//! Idle -> Acquiring -> Previewing -> (Recording) -> Finalized -> Uploading -> Idle
//!            |
//!            +-> Failed -> (acknowledge) -> Idle
//! ```
//!
//! `cancel` returns to `Idle` from anywhere. The session is driven headlessly
//! through its transition methods; shells never touch its state directly.
//! Handles are cheap to clone so a shell can cancel while an acquisition is
//! still awaiting the device provider.

use crate::api::{UploadGateway, UploadResult};
use crate::assert_invariant;
use crate::config::CaptureConfig;
use crate::device::{DeviceProvider, StreamGuard};
use crate::errors::CrowdcamError;
use crate::photo;
use crate::recording::RecordingBuffer;
use crate::types::{
    AcquireOutcome, CaptureDevice, CaptureMode, CaptureStatus, MediaArtifact, SessionSnapshot,
};
use bytes::Bytes;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct SessionState {
    status: CaptureStatus,
    mode: CaptureMode,
    selected_device: Option<String>,
    stream: Option<StreamGuard>,
    recording: Option<RecordingBuffer>,
    artifact: Option<MediaArtifact>,
    // Bumped by every transition that supersedes an in-flight acquisition.
    generation: u64,
    last_error: Option<String>,
}

impl SessionState {
    fn new(selected_device: Option<String>) -> Self {
        Self {
            status: CaptureStatus::Idle,
            mode: CaptureMode::Photo,
            selected_device,
            stream: None,
            recording: None,
            artifact: None,
            generation: 0,
            last_error: None,
        }
    }

    fn release_stream(&mut self) {
        if let Some(guard) = self.stream.take() {
            guard.release();
        }
    }

    /// Start a new acquisition generation, releasing whatever is held.
    fn begin_acquire(&mut self) -> (u64, Option<String>) {
        self.release_stream();
        self.recording = None;
        self.status = CaptureStatus::Acquiring;
        self.generation += 1;
        (self.generation, self.selected_device.clone())
    }

    /// Supersede everything in flight and return to `Idle`.
    fn clear(&mut self) {
        self.generation += 1;
        self.release_stream();
        self.recording = None;
        self.artifact = None;
        self.last_error = None;
        self.status = CaptureStatus::Idle;
    }

    fn check_invariants(&self) {
        assert_invariant!(
            self.stream.is_some() == self.status.holds_stream(),
            "Stream held only while previewing or recording",
            "session"
        );
        assert_invariant!(
            self.recording.is_some() == (self.status == CaptureStatus::Recording),
            "Recording buffer exists only while recording",
            "session"
        );
        assert_invariant!(
            self.artifact.is_some() == (self.status == CaptureStatus::Finalized),
            "Artifact present only when finalized",
            "session"
        );
    }
}

struct Inner {
    provider: Arc<dyn DeviceProvider>,
    settings: CaptureConfig,
    state: Mutex<SessionState>,
}

/// Handle to a capture session. Clones share the same session.
#[derive(Clone)]
pub struct CaptureSession {
    inner: Arc<Inner>,
}

impl CaptureSession {
    pub fn new(provider: Arc<dyn DeviceProvider>) -> Self {
        Self::with_config(provider, CaptureConfig::default())
    }

    pub fn with_config(provider: Arc<dyn DeviceProvider>, settings: CaptureConfig) -> Self {
        let state = SessionState::new(settings.default_device.clone());
        Self {
            inner: Arc::new(Inner {
                provider,
                settings,
                state: Mutex::new(state),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Enumerate devices through the provider.
    pub async fn list_devices(&self) -> Result<Vec<CaptureDevice>, CrowdcamError> {
        self.inner.provider.list_devices().await
    }

    /// Choose the device for subsequent acquisitions.
    ///
    /// While previewing (or acquiring) this hot-swaps: the current stream is
    /// released first and a new one is requested. Returns the outcome of that
    /// re-acquisition, or `None` when only the selector changed.
    pub async fn select_device(
        &self,
        device_id: Option<String>,
    ) -> Result<Option<AcquireOutcome>, CrowdcamError> {
        let restart = {
            let mut state = self.lock();
            match state.status {
                CaptureStatus::Recording => {
                    return Err(CrowdcamError::invalid("select_device", state.status))
                }
                CaptureStatus::Previewing | CaptureStatus::Acquiring
                    if state.selected_device == device_id =>
                {
                    None
                }
                CaptureStatus::Previewing | CaptureStatus::Acquiring => {
                    log::info!("Switching capture device to {:?}", device_id);
                    state.selected_device = device_id;
                    Some(state.begin_acquire())
                }
                _ => {
                    state.selected_device = device_id;
                    None
                }
            }
        };

        match restart {
            Some((generation, device)) => self.acquire(generation, device).await.map(Some),
            None => Ok(None),
        }
    }

    /// Open a live preview for `mode`.
    ///
    /// Any artifact from a previous capture is discarded. On provider failure
    /// the session is left in `Failed` with no stream and
    /// [`CrowdcamError::CaptureUnavailable`] is returned.
    pub async fn start_capture(&self, mode: CaptureMode) -> Result<AcquireOutcome, CrowdcamError> {
        let (generation, device) = {
            let mut state = self.lock();
            match state.status {
                CaptureStatus::Idle | CaptureStatus::Finalized | CaptureStatus::Previewing => {}
                status => return Err(CrowdcamError::invalid("start_capture", status)),
            }
            state.artifact = None;
            state.last_error = None;
            state.mode = mode;
            state.begin_acquire()
        };

        self.acquire(generation, device).await
    }

    async fn acquire(
        &self,
        generation: u64,
        device: Option<String>,
    ) -> Result<AcquireOutcome, CrowdcamError> {
        log::info!("Acquiring stream (device: {:?})", device);
        let result = self.inner.provider.acquire_stream(device.as_deref()).await;

        let mut state = self.lock();
        if state.generation != generation {
            if let Ok(stream) = result {
                log::warn!(
                    "Stream {} arrived for a superseded acquisition, closing it",
                    stream.id()
                );
                StreamGuard::new(stream).release();
            }
            return Ok(AcquireOutcome::Superseded);
        }

        let outcome = match result {
            Ok(stream) => {
                log::info!("Stream {} acquired, previewing", stream.id());
                state.stream = Some(StreamGuard::new(stream));
                state.status = CaptureStatus::Previewing;
                Ok(AcquireOutcome::Previewing)
            }
            Err(error) => {
                let error = match error {
                    CrowdcamError::CaptureUnavailable(msg) => msg,
                    other => other.to_string(),
                };
                log::error!("Error accessing camera: {}", error);
                state.status = CaptureStatus::Failed;
                state.last_error = Some(error.clone());
                Err(CrowdcamError::CaptureUnavailable(error))
            }
        };
        state.check_invariants();
        outcome
    }

    /// Leave `Failed` after the user has seen the error.
    pub fn acknowledge_failure(&self) {
        let mut state = self.lock();
        if state.status == CaptureStatus::Failed {
            state.status = CaptureStatus::Idle;
            state.last_error = None;
        }
        state.check_invariants();
    }

    /// Sample the preview into a mirrored PNG and finalize.
    ///
    /// The stream is torn down whether or not encoding succeeds.
    pub fn capture_photo(&self) -> Result<MediaArtifact, CrowdcamError> {
        let mut state = self.lock();
        if state.status != CaptureStatus::Previewing {
            return Err(CrowdcamError::invalid("capture_photo", state.status));
        }
        if state.mode != CaptureMode::Photo {
            return Err(CrowdcamError::invalid("capture_photo in video mode", state.status));
        }

        let mut guard = match state.stream.take() {
            Some(guard) => guard,
            None => return Err(CrowdcamError::invalid("capture_photo", state.status)),
        };
        let frame = match guard.stream_mut() {
            Some(stream) => stream.grab_frame(),
            None => Err(CrowdcamError::EncodingFailed("stream already stopped".to_string())),
        };
        guard.release();

        let encoded = frame
            .map_err(|e| match e {
                CrowdcamError::EncodingFailed(msg) => CrowdcamError::EncodingFailed(msg),
                other => CrowdcamError::EncodingFailed(other.to_string()),
            })
            .and_then(photo::mirrored_png);

        let outcome = match encoded {
            Ok(data) => {
                let artifact = MediaArtifact::new(
                    data,
                    photo::PHOTO_MIME_TYPE,
                    self.inner.settings.photo_file_name.clone(),
                );
                log::info!(
                    "Captured photo {} ({} bytes)",
                    artifact.file_name,
                    artifact.size_bytes()
                );
                state.artifact = Some(artifact.clone());
                state.status = CaptureStatus::Finalized;
                Ok(artifact)
            }
            Err(error) => {
                log::error!("Photo capture failed: {}", error);
                state.status = CaptureStatus::Idle;
                state.last_error = Some(error.to_string());
                Err(error)
            }
        };
        state.check_invariants();
        outcome
    }

    /// Begin buffering recorded chunks.
    pub fn start_recording(&self) -> Result<(), CrowdcamError> {
        let mut state = self.lock();
        if state.status != CaptureStatus::Previewing {
            return Err(CrowdcamError::invalid("start_recording", state.status));
        }
        if state.mode != CaptureMode::Video {
            return Err(CrowdcamError::invalid("start_recording in photo mode", state.status));
        }
        state.recording = Some(RecordingBuffer::new());
        state.status = CaptureStatus::Recording;
        log::info!("Recording started");
        state.check_invariants();
        Ok(())
    }

    /// Deliver one chunk from the recorder. Zero-length chunks are dropped.
    ///
    /// Returns whether the chunk was kept.
    pub fn push_chunk(&self, chunk: Bytes) -> Result<bool, CrowdcamError> {
        let mut state = self.lock();
        let status = state.status;
        let buffer = match (status, state.recording.as_mut()) {
            (CaptureStatus::Recording, Some(buffer)) => buffer,
            _ => return Err(CrowdcamError::invalid("push_chunk", status)),
        };
        let len = chunk.len();
        let kept = buffer.push(chunk);
        log::debug!("Recorder chunk of {} bytes (kept: {})", len, kept);
        Ok(kept)
    }

    /// Assemble the buffered chunks into the video artifact and finalize.
    ///
    /// A recording that produced no data fails with `EncodingFailed` and
    /// returns the session to `Idle`.
    pub fn stop_recording(&self) -> Result<MediaArtifact, CrowdcamError> {
        let mut state = self.lock();
        if state.status != CaptureStatus::Recording {
            return Err(CrowdcamError::invalid("stop_recording", state.status));
        }

        let buffer = state.recording.take().unwrap_or_default();
        state.release_stream();
        let (data, stats) = buffer.finish();

        let outcome = if data.is_empty() {
            log::error!("Recording stopped without any data");
            state.status = CaptureStatus::Idle;
            let error = CrowdcamError::EncodingFailed("recording produced no data".to_string());
            state.last_error = Some(error.to_string());
            Err(error)
        } else {
            let artifact = MediaArtifact::new(
                data,
                self.inner.settings.video_mime_type.clone(),
                self.inner.settings.video_file_name.clone(),
            );
            log::info!(
                "Recording finished: {} chunks, {} bytes, {:.1}s",
                stats.chunks,
                stats.bytes,
                stats.duration.as_secs_f64()
            );
            state.artifact = Some(artifact.clone());
            state.status = CaptureStatus::Finalized;
            Ok(artifact)
        };
        state.check_invariants();
        outcome
    }

    /// Tear everything down and return to `Idle`. Never fails; safe to repeat.
    ///
    /// An acquisition still awaiting the provider is superseded, so a stream
    /// that arrives afterwards is closed instead of adopted.
    pub fn cancel(&self) {
        let mut state = self.lock();
        if state.status != CaptureStatus::Idle {
            log::info!("Cancelling capture session ({})", state.status);
        }
        state.clear();
        state.check_invariants();
    }

    /// Called once the artifact has been handed to the upload gateway,
    /// whether or not the upload succeeded. Also deselects the device.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.clear();
        state.selected_device = None;
        state.check_invariants();
    }

    /// Hand the finalized artifact to `gateway`, then reset the session
    /// whatever the upload outcome.
    ///
    /// The session is `Uploading` while the gateway runs, so a second submit
    /// or a new capture is rejected. If the session is cancelled meanwhile,
    /// the finished upload leaves the newer state alone.
    pub async fn submit(&self, gateway: &dyn UploadGateway) -> Result<UploadResult, CrowdcamError> {
        let (generation, artifact) = {
            let mut state = self.lock();
            let artifact = match (state.status, state.artifact.take()) {
                (CaptureStatus::Finalized, Some(artifact)) => artifact,
                (status, artifact) => {
                    state.artifact = artifact;
                    return Err(CrowdcamError::invalid("submit", status));
                }
            };
            state.status = CaptureStatus::Uploading;
            state.generation += 1;
            state.check_invariants();
            (state.generation, artifact)
        };

        let result = gateway.upload(&artifact).await;
        if let Err(e) = &result {
            log::error!("Upload of {} failed: {}", artifact.file_name, e);
        }

        let mut state = self.lock();
        if state.generation == generation {
            state.clear();
            state.selected_device = None;
            state.check_invariants();
        } else {
            log::info!(
                "Session changed during upload of {}, leaving it as is",
                artifact.file_name
            );
        }
        result
    }

    pub fn status(&self) -> CaptureStatus {
        self.lock().status
    }

    pub fn mode(&self) -> CaptureMode {
        self.lock().mode
    }

    pub fn selected_device(&self) -> Option<String> {
        self.lock().selected_device.clone()
    }

    pub fn has_active_stream(&self) -> bool {
        self.lock().stream.is_some()
    }

    /// The finalized artifact, if any.
    pub fn artifact(&self) -> Option<MediaArtifact> {
        self.lock().artifact.clone()
    }

    /// Message of the most recent failure, cleared by the next transition.
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock();
        SessionSnapshot {
            status: state.status,
            mode: state.mode,
            selected_device: state.selected_device.clone(),
            has_stream: state.stream.is_some(),
            buffered_chunks: state.recording.as_ref().map_or(0, RecordingBuffer::len),
            artifact_file_name: state.artifact.as_ref().map(|a| a.file_name.clone()),
        }
    }
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}
