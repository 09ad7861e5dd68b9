//! Platform device providers
//!
//! The `native` feature provides [`NativeProvider`], backed by nokhwa, which
//! talks to the operating system's camera stack (V4L2, AVFoundation,
//! MediaFoundation).

#[cfg(feature = "native")]
mod native;

#[cfg(feature = "native")]
pub use native::{NativeProvider, NativeStream};
