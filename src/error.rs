//! Stable machine-readable codes for the crate's error types.

/// Errors that carry a stable code the UI can match on without parsing messages.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    /// Whether the caller can reasonably retry with corrected input.
    fn retryable(&self) -> bool {
        true
    }
}
