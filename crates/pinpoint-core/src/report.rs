//! Session report generation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::{
    Error, Result, feedback::Feedback, service::require_session_id, store::FeedbackStore,
};

/// Output formats the server can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

/// All feedback of one session at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub session_id: String,
    pub generated: DateTime<Utc>,
    /// Always equal to `items.len()`
    pub feedback_count: usize,
    /// Newest first
    pub items: Vec<Feedback>,
}

impl Report {
    pub fn new(session_id: impl Into<String>, items: Vec<Feedback>) -> Self {
        Self {
            session_id: session_id.into(),
            generated: Utc::now(),
            feedback_count: items.len(),
            items,
        }
    }
}

#[derive(Clone)]
pub struct ReportGenerator {
    store: Arc<dyn FeedbackStore>,
}

impl ReportGenerator {
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        Self { store }
    }

    /// Build a report for a session
    ///
    /// `format` defaults to JSON when absent.
    ///
    /// # Errors
    /// - `Error::Validation` if `session_id` is absent or empty
    /// - `Error::UnsupportedFormat` for any format other than `json`
    /// - `Error::Store` for query errors
    pub async fn generate(&self, session_id: Option<&str>, format: Option<&str>) -> Result<Report> {
        let session_id = require_session_id(session_id)?;
        let format = match format.filter(|f| !f.trim().is_empty()) {
            Some(format) => format.parse::<ReportFormat>()?,
            None => ReportFormat::default(),
        };

        match format {
            ReportFormat::Json => {
                let items = self.store.list_feedback_by_session(session_id).await?;
                Ok(Report::new(session_id, items))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NewFeedback, service::FeedbackService, store::memory::MemoryStore};

    async fn seeded_store() -> Arc<dyn FeedbackStore> {
        let store: Arc<dyn FeedbackStore> = Arc::new(MemoryStore::default());
        let service = FeedbackService::new(store.clone());
        for (title, session) in [("a", "s1"), ("b", "s1"), ("c", "s2")] {
            let new = NewFeedback {
                title: Some(title.to_string()),
                description: Some("desc".to_string()),
                path: Some("/docs".to_string()),
                kind: Some("other".to_string()),
                session_id: Some(session.to_string()),
                ..Default::default()
            };
            service.create(new, None).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_json_report_counts_items() {
        let generator = ReportGenerator::new(seeded_store().await);
        let report = generator.generate(Some("s1"), Some("json")).await.unwrap();
        assert_eq!(report.session_id, "s1");
        assert_eq!(report.feedback_count, report.items.len());
        assert_eq!(report.feedback_count, 2);
    }

    #[tokio::test]
    async fn test_format_defaults_to_json() {
        let generator = ReportGenerator::new(seeded_store().await);
        let report = generator.generate(Some("s2"), None).await.unwrap();
        assert_eq!(report.feedback_count, 1);
    }

    #[tokio::test]
    async fn test_unsupported_format_returns_error() {
        let generator = ReportGenerator::new(seeded_store().await);
        let result = generator.generate(Some("s1"), Some("pdf")).await;
        assert!(matches!(result, Err(Error::UnsupportedFormat(f)) if f == "pdf"));
    }

    #[tokio::test]
    async fn test_missing_session_is_validation_error() {
        let generator = ReportGenerator::new(seeded_store().await);
        let result = generator.generate(None, Some("json")).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_report_uses_session_id_verbatim() {
        let store = seeded_store().await;
        let service = FeedbackService::new(store.clone());
        let new = NewFeedback {
            title: Some("padded".to_string()),
            description: Some("desc".to_string()),
            path: Some("/".to_string()),
            kind: Some("bug".to_string()),
            session_id: Some(" s3 ".to_string()),
            ..Default::default()
        };
        service.create(new, None).await.unwrap();

        let report = ReportGenerator::new(store)
            .generate(Some(" s3 "), None)
            .await
            .unwrap();
        assert_eq!(report.session_id, " s3 ");
        assert_eq!(report.feedback_count, 1);
    }

    #[test]
    fn test_report_json_shape() {
        let report = Report::new("s1", Vec::new());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["sessionId"], "s1");
        assert_eq!(json["feedbackCount"], 0);
        assert!(json["items"].as_array().unwrap().is_empty());
        assert!(json["generated"].is_string());
    }

    #[test]
    fn test_format_parsing_is_case_insensitive() {
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert!("csv".parse::<ReportFormat>().is_err());
    }
}
