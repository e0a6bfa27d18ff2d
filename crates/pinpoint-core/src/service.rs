//! Feedback creation and session listing

use std::sync::Arc;
use tracing::debug;

use crate::{
    Error, Result,
    feedback::{Feedback, NewFeedback},
    store::FeedbackStore,
};

/// Create/list operations over a [`FeedbackStore`]
#[derive(Clone)]
pub struct FeedbackService {
    store: Arc<dyn FeedbackStore>,
}

impl FeedbackService {
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        Self { store }
    }

    /// Validate and persist a submission, returning the stored record
    ///
    /// # Arguments
    /// * `new` - Submission as received from the client
    /// * `user_id` - Submitting user when the request was authenticated
    ///
    /// # Errors
    /// - `Error::Validation` if a required field is missing or a value is unknown
    /// - `Error::Store` if the record could not be written
    pub async fn create(&self, new: NewFeedback, user_id: Option<String>) -> Result<Feedback> {
        let feedback = new.into_feedback(user_id)?;
        self.store.insert_feedback(&feedback).await?;
        debug!(
            feedback_id = %feedback.id,
            session_id = %feedback.session_id,
            "Stored feedback"
        );
        Ok(feedback)
    }

    /// List a session's feedback, newest first
    ///
    /// # Errors
    /// - `Error::Validation` if `session_id` is absent or empty
    /// - `Error::Store` for query errors
    pub async fn list_by_session(&self, session_id: Option<&str>) -> Result<Vec<Feedback>> {
        let session_id = require_session_id(session_id)?;
        self.store.list_feedback_by_session(session_id).await
    }
}

/// Blank IDs are rejected; any other value is matched exactly as stored
pub(crate) fn require_session_id(session_id: Option<&str>) -> Result<&str> {
    session_id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| Error::Validation("Session ID is required".to_string()))
}
