//! Error codes shared by every error enum in the crate.

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code and retryable flag for CLI error output.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
