//! Error types for Pinpoint Core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing user, feedback record or session
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Persistence failure in the backing store
    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error was caused by the caller rather than the system
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::NotFound(_)
                | Error::UnsupportedFormat(_)
                | Error::Unauthorized(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(Error::Validation("x".into()).is_client_error());
        assert!(Error::NotFound("x".into()).is_client_error());
        assert!(Error::UnsupportedFormat("pdf".into()).is_client_error());
        assert!(!Error::Store("disk full".into()).is_client_error());
    }

    #[test]
    fn test_error_display() {
        let err = Error::UnsupportedFormat("pdf".to_string());
        assert_eq!(err.to_string(), "Unsupported format: pdf");
    }
}
