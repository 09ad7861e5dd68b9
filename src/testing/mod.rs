//! Testing utilities for crowdcam
//!
//! A synthetic device provider that needs no camera hardware. It counts open
//! streams so tests can prove the session never leaks or doubles up a
//! stream, and it can refuse or hold acquisitions to exercise the failure and
//! cancellation paths.

mod synthetic;

pub use synthetic::{synthetic_frame, StreamCounters, SyntheticProvider, SyntheticStream};
