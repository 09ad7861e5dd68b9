//! Video recording buffer for capture sessions
//!
//! Recorded media arrives as already-encoded chunks (the host recorder's
//! "data available" events). This module keeps them in arrival order and
//! assembles them into one video artifact when recording stops.
//!
//! # Example
//! ```rust
//! use crowdcam::recording::RecordingBuffer;
//!
//! let mut buffer = RecordingBuffer::new();
//! buffer.push(bytes::Bytes::from_static(b"chunk-1"));
//! buffer.push(bytes::Bytes::new()); // discarded
//! buffer.push(bytes::Bytes::from_static(b"chunk-2"));
//!
//! let (video, stats) = buffer.finish();
//! assert_eq!(&video[..], b"chunk-1chunk-2");
//! assert_eq!(stats.chunks, 2);
//! ```

mod buffer;

pub use buffer::{RecordingBuffer, RecordingStats, VIDEO_MIME_TYPE};
