//! HTTP client for the Pinpoint feedback API

use pinpoint_core::{Feedback, NewFeedback, Report, ReportFormat, Share, ShareRequest};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Non-success response, with the server's `error` message when it sent one
    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("An API token is required; set PINPOINT_TOKEN or pass --token")]
    MissingToken,

    #[error("Unsupported screenshot file: {0}")]
    UnsupportedImage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server root, e.g. `http://localhost:3000`
    pub base_url: String,
    /// Bearer token of a registered user
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout_secs: 30,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }
}

pub struct FeedbackClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl FeedbackClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        // A trailing slash keeps any path prefix when joining endpoints
        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url =
            Url::parse(&base).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base, e)))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("pinpoint-cli/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: config.token,
        })
    }

    /// Submit feedback, attributed to the token's user when a token is set
    pub async fn submit(&self, new: &NewFeedback) -> Result<Feedback> {
        let request = self.http.post(self.endpoint("api/feedback")?).json(new);
        self.send(self.authorize(request)).await
    }

    /// List a session's feedback, newest first
    pub async fn list(&self, session_id: &str) -> Result<Vec<Feedback>> {
        let mut url = self.endpoint("api/feedback")?;
        url.query_pairs_mut().append_pair("sessionId", session_id);
        self.send(self.http.get(url)).await
    }

    pub async fn report(&self, session_id: &str, format: ReportFormat) -> Result<Report> {
        let mut url = self.endpoint("api/reports")?;
        url.query_pairs_mut()
            .append_pair("sessionId", session_id)
            .append_pair("format", format.as_str());
        self.send(self.http.get(url)).await
    }

    /// Share an owned feedback record; requires a token
    pub async fn share(&self, request: &ShareRequest) -> Result<Share> {
        if self.token.is_none() {
            return Err(ClientError::MissingToken);
        }
        let builder = self.http.post(self.endpoint("api/share")?).json(request);
        self.send(self.authorize(builder)).await
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", path, e)))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        debug!(status = %response.status(), url = %response.url(), "Response received");
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                body.trim().to_string()
            }
        });

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let client = FeedbackClient::new(ClientConfig::new("http://localhost:3000/pinpoint")).unwrap();
        assert_eq!(
            client.endpoint("api/feedback").unwrap().as_str(),
            "http://localhost:3000/pinpoint/api/feedback"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            FeedbackClient::new(ClientConfig::new("not a url")),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_blank_token_is_dropped() {
        let config = ClientConfig::new("http://localhost").with_token(Some("  ".to_string()));
        assert!(config.token.is_none());
    }
}
