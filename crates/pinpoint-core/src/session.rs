//! Client-side session identity
//!
//! A session is an opaque identifier generated once per client and kept in a
//! small file, the way a browser widget keeps it in local storage. The server
//! never records sessions; they only partition feedback.

use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::Result;

/// Generate a fresh session identifier
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// A session identifier persisted at a file path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    path: PathBuf,
    session_id: String,
}

impl SessionIdentity {
    /// Load the identifier stored at `path`, creating one if the file is
    /// missing or empty
    ///
    /// # Errors
    /// - `Error::Io` if the file cannot be read or written
    pub fn load_or_create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let existing = match std::fs::read_to_string(&path) {
            Ok(contents) => Some(contents.trim().to_string()).filter(|s| !s.is_empty()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        match existing {
            Some(session_id) => Ok(Self { path, session_id }),
            None => {
                let session_id = new_session_id();
                write_session_file(&path, &session_id)?;
                debug!(path = %path.display(), "Created new feedback session");
                Ok(Self { path, session_id })
            }
        }
    }

    /// Replace the stored identifier with a fresh one
    pub fn reset(&mut self) -> Result<&str> {
        let session_id = new_session_id();
        write_session_file(&self.path, &session_id)?;
        self.session_id = session_id;
        Ok(&self.session_id)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn write_session_file(path: &Path, session_id: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, format!("{}\n", session_id))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_identity_persists_across_loads() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("session");

        let first = SessionIdentity::load_or_create(&path).unwrap();
        let second = SessionIdentity::load_or_create(&path).unwrap();
        assert_eq!(first.session_id(), second.session_id());
        assert!(Uuid::parse_str(first.session_id()).is_ok());
    }

    #[test]
    fn test_reset_changes_identity() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session");

        let mut identity = SessionIdentity::load_or_create(&path).unwrap();
        let before = identity.session_id().to_string();
        let after = identity.reset().unwrap().to_string();
        assert_ne!(before, after);

        let reloaded = SessionIdentity::load_or_create(&path).unwrap();
        assert_eq!(reloaded.session_id(), after);
    }

    #[test]
    fn test_empty_file_gets_new_identity() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session");
        std::fs::write(&path, "  \n").unwrap();

        let identity = SessionIdentity::load_or_create(&path).unwrap();
        assert!(!identity.session_id().is_empty());
    }
}
