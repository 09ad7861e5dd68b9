use crate::types::CaptureStatus;

/// Every failure the crate can report.
///
/// Capture errors are resolved by the session itself (it lands in `Idle` or
/// `Failed` before the error is returned); transport errors come from the
/// counting service client.
#[derive(Debug, thiserror::Error)]
pub enum CrowdcamError {
    /// The device provider could not hand out a stream (permission refused,
    /// no device, device busy).
    #[error("Capture unavailable: {0}")]
    CaptureUnavailable(String),

    /// A session operation was invoked in a state that does not allow it.
    #[error("Invalid state transition: {operation} is not allowed while {status}")]
    InvalidStateTransition {
        operation: &'static str,
        status: CaptureStatus,
    },

    /// A finalized artifact could not be produced from captured data.
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    /// Network or HTTP-level failure talking to the counting service.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Configuration could not be read, parsed or validated.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CrowdcamError {
    pub(crate) fn invalid(operation: &'static str, status: CaptureStatus) -> Self {
        CrowdcamError::InvalidStateTransition { operation, status }
    }

    /// True for errors the user should see (as opposed to programming errors).
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, CrowdcamError::InvalidStateTransition { .. })
    }
}

impl From<reqwest::Error> for CrowdcamError {
    fn from(error: reqwest::Error) -> Self {
        CrowdcamError::TransportError(error.to_string())
    }
}

impl From<image::ImageError> for CrowdcamError {
    fn from(error: image::ImageError) -> Self {
        CrowdcamError::EncodingFailed(error.to_string())
    }
}
