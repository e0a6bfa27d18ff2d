//! Users and feedback sharing

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::{Error, Result, feedback::now_micros, store::FeedbackStore};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh id
    ///
    /// # Errors
    /// - `Error::Validation` if the email is malformed
    pub fn new(email: &str, name: Option<String>) -> Result<Self> {
        let email = normalize_email(email)?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            email,
            name: name.filter(|n| !n.trim().is_empty()),
            created_at: now_micros(),
        })
    }
}

/// Grant of read (and optionally edit) access to one feedback record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Share {
    pub id: String,
    pub feedback_id: String,
    pub shared_by_id: String,
    pub shared_with_id: String,
    pub can_edit: bool,
    pub created_at: DateTime<Utc>,
}

/// Body of a share request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    pub feedback_id: String,
    pub email: String,
    pub can_edit: bool,
}

#[derive(Clone)]
pub struct SharingService {
    store: Arc<dyn FeedbackStore>,
}

impl SharingService {
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        Self { store }
    }

    /// Share a feedback record owned by `acting_user_id` with the user
    /// registered under `request.email`
    ///
    /// # Errors
    /// - `Error::Validation` if the email is malformed or the feedback id is empty
    /// - `Error::NotFound` if no user has that email, or if the feedback record
    ///   does not exist or is not owned by the acting user
    /// - `Error::Store` for query/write errors
    pub async fn share(&self, request: ShareRequest, acting_user_id: &str) -> Result<Share> {
        let email = normalize_email(&request.email)?;
        if request.feedback_id.trim().is_empty() {
            return Err(Error::Validation("Feedback ID is required".to_string()));
        }

        let target = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        // Ownership is part of the lookup so a foreign record is indistinguishable
        // from a missing one.
        let feedback = self
            .store
            .find_owned_feedback(&request.feedback_id, acting_user_id)
            .await?
            .ok_or_else(|| Error::NotFound("Feedback not found".to_string()))?;

        let share = Share {
            id: Uuid::new_v4().to_string(),
            feedback_id: feedback.id,
            shared_by_id: acting_user_id.to_string(),
            shared_with_id: target.id,
            can_edit: request.can_edit,
            created_at: now_micros(),
        };
        self.store.insert_share(&share).await?;

        info!(
            feedback_id = %share.feedback_id,
            shared_with = %share.shared_with_id,
            can_edit = share.can_edit,
            "Shared feedback"
        );
        Ok(share)
    }
}

/// Trim, lowercase and validate an email address
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_ascii_lowercase();
    if EMAIL_RE.is_match(&email) {
        Ok(email)
    } else {
        Err(Error::Validation(format!("Invalid email: {}", email)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NewFeedback, service::FeedbackService, store::memory::MemoryStore};

    struct Fixture {
        store: Arc<MemoryStore>,
        sharing: SharingService,
        owner: User,
        other: User,
        feedback_id: String,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::default());
        let owner = User::new("owner@example.com", Some("Owner".to_string())).unwrap();
        let other = User::new("other@example.com", None).unwrap();
        store.insert_user(&owner, "hash-owner").await.unwrap();
        store.insert_user(&other, "hash-other").await.unwrap();

        let new = NewFeedback {
            title: Some("Overlapping header".to_string()),
            description: Some("Header overlaps the hero on mobile".to_string()),
            path: Some("/".to_string()),
            kind: Some("bug".to_string()),
            severity: Some("high".to_string()),
            session_id: Some("s1".to_string()),
            ..Default::default()
        };
        let feedback = FeedbackService::new(store.clone())
            .create(new, Some(owner.id.clone()))
            .await
            .unwrap();

        Fixture {
            sharing: SharingService::new(store.clone()),
            store,
            owner,
            other,
            feedback_id: feedback.id,
        }
    }

    #[tokio::test]
    async fn test_owner_can_share() {
        let f = fixture().await;
        let share = f
            .sharing
            .share(
                ShareRequest {
                    feedback_id: f.feedback_id.clone(),
                    email: "Other@Example.com".to_string(),
                    can_edit: true,
                },
                &f.owner.id,
            )
            .await
            .unwrap();

        assert_eq!(share.feedback_id, f.feedback_id);
        assert_eq!(share.shared_by_id, f.owner.id);
        assert_eq!(share.shared_with_id, f.other.id);
        assert!(share.can_edit);
        assert_eq!(f.store.shares.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_non_owner_gets_not_found() {
        let f = fixture().await;
        let result = f
            .sharing
            .share(
                ShareRequest {
                    feedback_id: f.feedback_id.clone(),
                    email: "owner@example.com".to_string(),
                    can_edit: false,
                },
                &f.other.id,
            )
            .await;
        assert!(matches!(result, Err(Error::NotFound(msg)) if msg == "Feedback not found"));
        assert!(f.store.shares.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_target_user() {
        let f = fixture().await;
        let result = f
            .sharing
            .share(
                ShareRequest {
                    feedback_id: f.feedback_id.clone(),
                    email: "nobody@example.com".to_string(),
                    can_edit: false,
                },
                &f.owner.id,
            )
            .await;
        assert!(matches!(result, Err(Error::NotFound(msg)) if msg == "User not found"));
    }

    #[tokio::test]
    async fn test_malformed_email_is_validation_error() {
        let f = fixture().await;
        let result = f
            .sharing
            .share(
                ShareRequest {
                    feedback_id: f.feedback_id.clone(),
                    email: "not-an-email".to_string(),
                    can_edit: false,
                },
                &f.owner.id,
            )
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Dev@Example.COM ").unwrap(),
            "dev@example.com"
        );
        assert!(normalize_email("dev@localhost").is_err());
        assert!(normalize_email("").is_err());
    }
}
