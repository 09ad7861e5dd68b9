use crate::device::{DeviceProvider, MediaStream};
use crate::errors::CrowdcamError;
use crate::types::{CaptureDevice, VideoFrame};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Build an RGB8 gradient frame whose content depends on `seed`, so that
/// consecutive frames differ and left/right halves are distinguishable.
pub fn synthetic_frame(seed: u64, width: u32, height: u32) -> VideoFrame {
    let base = (seed % 256) as u8;
    let mut data = Vec::with_capacity(width as usize * height as usize * 3);
    for y in 0..height {
        for x in 0..width {
            data.push(base.wrapping_add((x % 256) as u8));
            data.push(base.wrapping_add((y % 256) as u8));
            data.push(base.wrapping_add(((x + y) % 256) as u8));
        }
    }
    VideoFrame::new(data, width, height)
}

/// Stream bookkeeping shared between a provider and its streams.
#[derive(Debug, Default)]
pub struct StreamCounters {
    open: AtomicUsize,
    peak: AtomicUsize,
    acquired: AtomicUsize,
}

impl StreamCounters {
    /// Streams currently open.
    pub fn open(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously open streams ever observed.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Streams handed out in total.
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    fn opened(&self) {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        let now = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn closed(&self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A stream handed out by [`SyntheticProvider`].
pub struct SyntheticStream {
    id: String,
    device_id: String,
    frame: VideoFrame,
    counters: Arc<StreamCounters>,
    stopped: bool,
}

impl SyntheticStream {
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl MediaStream for SyntheticStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn device_id(&self) -> Option<&str> {
        Some(&self.device_id)
    }

    fn grab_frame(&mut self) -> Result<VideoFrame, CrowdcamError> {
        if self.stopped {
            return Err(CrowdcamError::EncodingFailed(format!(
                "stream {} is stopped",
                self.id
            )));
        }
        Ok(self.frame.clone())
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.counters.closed();
        }
    }
}

impl Drop for SyntheticStream {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Deterministic stand-in for camera hardware.
pub struct SyntheticProvider {
    devices: Vec<CaptureDevice>,
    frame: Mutex<VideoFrame>,
    counters: Arc<StreamCounters>,
    denial: Mutex<Option<String>>,
    gate: Mutex<Option<Arc<Notify>>>,
    acquisitions: Mutex<Vec<Option<String>>>,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticProvider {
    /// Two devices, `cam-0` and `cam-1`, producing 4x2 gradient frames.
    pub fn new() -> Self {
        Self::with_devices(vec![
            CaptureDevice::new("cam-0", "Front Camera"),
            CaptureDevice::new("cam-1", "Rear Camera"),
        ])
    }

    pub fn with_devices(devices: Vec<CaptureDevice>) -> Self {
        Self {
            devices,
            frame: Mutex::new(synthetic_frame(7, 4, 2)),
            counters: Arc::new(StreamCounters::default()),
            denial: Mutex::new(None),
            gate: Mutex::new(None),
            acquisitions: Mutex::new(Vec::new()),
        }
    }

    pub fn counters(&self) -> Arc<StreamCounters> {
        self.counters.clone()
    }

    /// Frame every subsequently acquired stream will show.
    pub fn set_frame(&self, frame: VideoFrame) {
        *self.frame.lock().unwrap_or_else(|e| e.into_inner()) = frame;
    }

    /// Refuse acquisitions with `reason` until [`Self::allow`] is called.
    pub fn deny(&self, reason: impl Into<String>) {
        *self.denial.lock().unwrap_or_else(|e| e.into_inner()) = Some(reason.into());
    }

    pub fn allow(&self) {
        *self.denial.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Make acquisitions wait until the returned handle is notified
    /// (one `notify_one` releases one acquisition).
    pub fn hold_acquisitions(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap_or_else(|e| e.into_inner()) = Some(notify.clone());
        notify
    }

    /// Device selectors seen by `acquire_stream`, in call order.
    pub fn acquisitions(&self) -> Vec<Option<String>> {
        self.acquisitions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl DeviceProvider for SyntheticProvider {
    async fn list_devices(&self) -> Result<Vec<CaptureDevice>, CrowdcamError> {
        Ok(self.devices.clone())
    }

    async fn acquire_stream(
        &self,
        device_id: Option<&str>,
    ) -> Result<Box<dyn MediaStream>, CrowdcamError> {
        self.acquisitions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(device_id.map(str::to_string));

        let gate = self.gate.lock().unwrap_or_else(|e| e.into_inner()).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if let Some(reason) = self.denial.lock().unwrap_or_else(|e| e.into_inner()).clone() {
            return Err(CrowdcamError::CaptureUnavailable(reason));
        }

        let device = match device_id {
            Some(id) => self
                .devices
                .iter()
                .find(|d| d.id == id)
                .ok_or_else(|| CrowdcamError::CaptureUnavailable(format!("device not found: {}", id)))?,
            None => self
                .devices
                .first()
                .ok_or_else(|| CrowdcamError::CaptureUnavailable("no capture device".to_string()))?,
        };

        self.counters.opened();
        let frame = self.frame.lock().unwrap_or_else(|e| e.into_inner()).clone();
        Ok(Box::new(SyntheticStream {
            id: format!("synthetic-{}", self.counters.acquired()),
            device_id: device.id.clone(),
            frame,
            counters: self.counters.clone(),
            stopped: false,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_frame_correct_size() {
        let frame = synthetic_frame(0, 64, 48);
        assert_eq!(frame.width, 64);
        assert_eq!(frame.height, 48);
        assert_eq!(frame.data.len(), 64 * 48 * 3);
    }

    #[test]
    fn test_synthetic_frames_differ() {
        assert_ne!(synthetic_frame(0, 8, 8).data, synthetic_frame(1, 8, 8).data);
    }

    #[tokio::test]
    async fn test_streams_are_counted() {
        let provider = SyntheticProvider::new();
        let counters = provider.counters();

        let mut first = provider.acquire_stream(None).await.unwrap();
        let second = provider.acquire_stream(Some("cam-1")).await.unwrap();
        assert_eq!(counters.open(), 2);
        assert_eq!(second.device_id(), Some("cam-1"));

        first.stop();
        first.stop();
        assert_eq!(counters.open(), 1);
        drop(second);
        assert_eq!(counters.open(), 0);
        assert_eq!(counters.peak(), 2);
    }

    #[tokio::test]
    async fn test_denied_acquisition() {
        let provider = SyntheticProvider::new();
        provider.deny("Permission denied");
        let err = provider.acquire_stream(None).await.err().unwrap();
        assert!(matches!(err, CrowdcamError::CaptureUnavailable(_)));
        assert_eq!(provider.counters().open(), 0);
    }

    #[tokio::test]
    async fn test_unknown_device() {
        let provider = SyntheticProvider::new();
        let err = provider.acquire_stream(Some("cam-9")).await.err().unwrap();
        assert!(err.to_string().contains("device not found: cam-9"));
    }
}
