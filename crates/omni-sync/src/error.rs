//! # Sync Error Types
//!
//! Errors are categorized by how the caller must react:
//!
//! - `Unreachable` - the network layer failed (connect, DNS, timeout); the
//!   endpoint may be fine, we just couldn't talk to it.
//! - `Rejected` - the server answered with a non-success status; retrying
//!   the same request will not help.
//! - `InvalidResponse` - the server answered 2xx but the body didn't parse.
//!
//! The distinction matters because the initial-sync-on-startup flow blocks
//! the UI with a loading state and must present "server down" differently
//! from "server said no".

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering all sync failures.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No cloud endpoint is configured in settings.
    #[error("No cloud endpoint configured")]
    NotConfigured,

    /// The configured endpoint URL does not parse.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    /// Network-level failure: could not reach the endpoint at all.
    #[error("Endpoint unreachable: {0}")]
    Unreachable(String),

    /// The server answered with a non-success status.
    #[error("Rejected by server ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The server answered but the body was not what the protocol expects.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Failed to serialize a request payload.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A local store operation failed while applying remote state.
    #[error("Local store error: {0}")]
    Database(#[from] omni_db::DbError),

    /// Internal client construction error.
    #[error("Internal sync error: {0}")]
    Internal(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            SyncError::Unreachable(err.to_string())
        } else if err.is_decode() {
            SyncError::InvalidResponse(err.to_string())
        } else if err.is_builder() {
            SyncError::Internal(err.to_string())
        } else {
            SyncError::Unreachable(err.to_string())
        }
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// True when the endpoint could not be reached at all, as opposed to
    /// answering and refusing.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, SyncError::Unreachable(_))
    }

    /// True when the failure is a configuration problem the user must fix.
    pub fn is_config_error(&self) -> bool {
        matches!(self, SyncError::NotConfigured | SyncError::InvalidUrl(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorization() {
        assert!(SyncError::Unreachable("connection refused".into()).is_unreachable());
        assert!(!SyncError::Rejected {
            status: 401,
            message: "bad token".into()
        }
        .is_unreachable());

        assert!(SyncError::NotConfigured.is_config_error());
        assert!(SyncError::InvalidUrl("not a url".into()).is_config_error());
        assert!(!SyncError::Unreachable("x".into()).is_config_error());
    }

    #[test]
    fn test_display_includes_status() {
        let err = SyncError::Rejected {
            status: 503,
            message: "maintenance".into(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("maintenance"));
    }
}
