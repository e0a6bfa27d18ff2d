//! Feedback records and submission validation

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::{Error, Result};

/// Category of a feedback record
///
/// Values outside the known set are kept verbatim as `Unrecognized`, so
/// older widgets posting their own categories are still accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FeedbackKind {
    Bug,
    Suggestion,
    Content,
    Improvement,
    Other,
    Unrecognized(String),
}

impl FeedbackKind {
    pub const KNOWN: [FeedbackKind; 5] = [
        FeedbackKind::Bug,
        FeedbackKind::Suggestion,
        FeedbackKind::Content,
        FeedbackKind::Improvement,
        FeedbackKind::Other,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            FeedbackKind::Bug => "bug",
            FeedbackKind::Suggestion => "suggestion",
            FeedbackKind::Content => "content",
            FeedbackKind::Improvement => "improvement",
            FeedbackKind::Other => "other",
            FeedbackKind::Unrecognized(value) => value,
        }
    }

    /// Bounded label for metrics; every unrecognized value shares one label
    pub fn metric_label(&self) -> &'static str {
        match self {
            FeedbackKind::Bug => "bug",
            FeedbackKind::Suggestion => "suggestion",
            FeedbackKind::Content => "content",
            FeedbackKind::Improvement => "improvement",
            FeedbackKind::Other => "other",
            FeedbackKind::Unrecognized(_) => "unrecognized",
        }
    }
}

impl From<String> for FeedbackKind {
    fn from(value: String) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value.trim()))
            .unwrap_or(FeedbackKind::Unrecognized(value))
    }
}

impl From<FeedbackKind> for String {
    fn from(kind: FeedbackKind) -> Self {
        match kind {
            FeedbackKind::Unrecognized(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(Error::Validation("Feedback type is empty".to_string()));
        }
        Ok(Self::from(s.to_string()))
    }
}

/// Severity of a feedback record (defaults to medium)
///
/// Like [`FeedbackKind`], unknown values are kept as `Unrecognized`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
    Unrecognized(String),
}

impl Severity {
    pub const KNOWN: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
            Severity::Unrecognized(value) => value,
        }
    }

    pub fn metric_label(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
            Severity::Unrecognized(_) => "unrecognized",
        }
    }
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|severity| severity.as_str().eq_ignore_ascii_case(value.trim()))
            .unwrap_or(Severity::Unrecognized(value))
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Unrecognized(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(Error::Validation("Severity is empty".to_string()));
        }
        Ok(Self::from(s.to_string()))
    }
}

/// A stored feedback record about a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Page path the feedback refers to
    pub path: String,
    #[serde(rename = "type")]
    pub kind: FeedbackKind,
    pub severity: Severity,
    /// Screenshot as a data URL
    #[serde(default)]
    pub screenshot: Option<String>,
    pub session_id: String,
    /// Submitting user, when the submission was authenticated
    #[serde(default)]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A feedback submission as received from a client.
///
/// Every field is optional so that a missing value is reported as a
/// validation error rather than a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeedback {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl NewFeedback {
    /// Validate the submission and build a record with a fresh id and timestamp.
    ///
    /// # Errors
    /// - `Error::Validation` if title, description, path, type or sessionId is
    ///   missing or empty
    pub fn into_feedback(self, user_id: Option<String>) -> Result<Feedback> {
        let (Some(title), Some(description), Some(path), Some(kind), Some(session_id)) = (
            non_empty(self.title),
            non_empty(self.description),
            non_empty(self.path),
            non_empty(self.kind),
            non_empty(self.session_id),
        ) else {
            return Err(Error::Validation("Missing required fields".to_string()));
        };

        let kind = FeedbackKind::from(kind);
        let severity = non_empty(self.severity)
            .map(Severity::from)
            .unwrap_or_default();

        Ok(Feedback {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            path,
            kind,
            severity,
            screenshot: non_empty(self.screenshot),
            session_id,
            user_id,
            created_at: now_micros(),
        })
    }
}

/// Current time truncated to the precision the store keeps
pub(crate) fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
