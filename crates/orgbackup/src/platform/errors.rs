use thiserror::Error;

/// Errors that can occur when reading from a code platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// API error from the platform.
    #[error("API error: {message}")]
    Api { message: String },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded: {message}")]
    RateLimited { message: String },

    /// Authentication required or failed.
    #[error("Authentication required")]
    AuthRequired,

    /// Resource not found (org, repo, etc.).
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// A record lacked a field the backup core reads directly.
    #[error("Invalid {kind} record: missing field `{field}`")]
    InvalidRecord {
        kind: &'static str,
        field: &'static str,
    },
}

impl PlatformError {
    /// Create an API error.
    #[inline]
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a rate limit error.
    #[inline]
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    /// Create a not found error.
    #[inline]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an invalid record error.
    #[inline]
    pub fn invalid_record(kind: &'static str, field: &'static str) -> Self {
        Self::InvalidRecord { kind, field }
    }
}

/// Extract a short error message suitable for a single log line.
///
/// Takes the first line of an error message, which is useful for errors
/// that include backtraces or multi-line details (git stderr, HTTP bodies).
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
