//! Pinpoint command-line client
//!
//! Submits and lists feedback for a persistent anonymous session, fetches
//! session reports and exports them as paginated text documents.

pub mod client;
pub mod screenshot;

pub use client::{ClientConfig, ClientError, FeedbackClient};

use std::path::PathBuf;

/// Where the session identity is kept when no override is given
pub fn default_session_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pinpoint")
        .join("session")
}
