//! Compute failure classification.

use thiserror::Error;

/// Message the engine returns when a computation exceeds its time limit.
pub const TIMEOUT_MESSAGE: &str = "Computation timed out.";

/// Prefix of the engine message for results exceeding the payload limit.
pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Output of image computation is too large";

/// Failure classes of a remote call.
///
/// The class decides the executor's next move: timeouts lead to per-date
/// fallback, oversized payloads to a coarser tile scale, anything else to a
/// backoff and retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComputeError {
    #[error("computation timed out")]
    Timeout,

    #[error("output of image computation is too large")]
    PayloadTooLarge,

    #[error("transient compute error: {0}")]
    Transient(String),
}

impl ComputeError {
    /// Classifies an engine error message.
    pub fn classify(message: &str) -> Self {
        let message = message.trim();
        if message == TIMEOUT_MESSAGE {
            ComputeError::Timeout
        } else if message.starts_with(PAYLOAD_TOO_LARGE_MESSAGE) {
            ComputeError::PayloadTooLarge
        } else {
            ComputeError::Transient(message.to_string())
        }
    }

    /// Short name used in failure records.
    pub fn kind(&self) -> &'static str {
        match self {
            ComputeError::Timeout => "timeout",
            ComputeError::PayloadTooLarge => "payload_too_large",
            ComputeError::Transient(_) => "transient",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_engine_messages() {
        assert_eq!(
            ComputeError::classify("Computation timed out."),
            ComputeError::Timeout
        );
        assert_eq!(
            ComputeError::classify("Output of image computation is too large (12 bands)"),
            ComputeError::PayloadTooLarge
        );
        assert_eq!(
            ComputeError::classify("User memory limit exceeded."),
            ComputeError::Transient("User memory limit exceeded.".to_string())
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ComputeError::Timeout.kind(), "timeout");
        assert_eq!(ComputeError::PayloadTooLarge.kind(), "payload_too_large");
        assert_eq!(ComputeError::Transient(String::new()).kind(), "transient");
    }
}
