//! Feedback store trait
//!
//! The `FeedbackStore` trait provides an abstraction over the relational store
//! holding feedback records, registered users and shares. Each method is an
//! independent transaction; callers get no ordering guarantees across calls
//! beyond what the backing database provides.

use async_trait::async_trait;

use crate::{
    Result,
    feedback::Feedback,
    share::{Share, User},
};

/// Persistence for feedback, users and shares
///
/// Implementations:
/// - `SqliteFeedbackStore`: SQLite via an sqlx connection pool
///
/// # Example
/// ```no_run
/// # use pinpoint_core::{FeedbackStore, NewFeedback};
/// # async fn example(store: &dyn FeedbackStore, new: NewFeedback) -> pinpoint_core::Result<()> {
/// let feedback = new.into_feedback(None)?;
/// store.insert_feedback(&feedback).await?;
/// let items = store.list_feedback_by_session(&feedback.session_id).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Persist a validated feedback record
    ///
    /// # Errors
    /// - `Error::Store` for write errors
    async fn insert_feedback(&self, feedback: &Feedback) -> Result<()>;

    /// List records for a session, newest first
    ///
    /// # Errors
    /// - `Error::Store` for query errors
    async fn list_feedback_by_session(&self, session_id: &str) -> Result<Vec<Feedback>>;

    /// Get a feedback record only if it belongs to `user_id`
    ///
    /// Returns `Ok(None)` both when the record does not exist and when it is
    /// owned by someone else.
    async fn find_owned_feedback(
        &self,
        feedback_id: &str,
        user_id: &str,
    ) -> Result<Option<Feedback>>;

    /// Register a user together with the hash of their API token
    ///
    /// # Errors
    /// - `Error::Validation` if the email is already registered
    /// - `Error::Store` for write errors
    async fn insert_user(&self, user: &User, token_hash: &str) -> Result<()>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_user_by_token_hash(&self, token_hash: &str) -> Result<Option<User>>;

    /// Persist a share grant
    ///
    /// # Errors
    /// - `Error::Store` for write errors
    async fn insert_share(&self, share: &Share) -> Result<()>;

    /// Check that the store is reachable
    async fn ping(&self) -> Result<()> {
        // Default implementation: always reachable
        Ok(())
    }
}
