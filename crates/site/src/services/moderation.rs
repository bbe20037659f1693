//! Text moderation client for review screening.
//!
//! Wraps the hosted moderation endpoint that classifies free-form text
//! into abuse categories. Submitted reviews are sent here once, right
//! after they are stored; the verdict decides whether a review goes
//! straight to the public list or waits for a human.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use clipjoint_core::ReviewStatus;

use crate::config::ModerationConfig;

/// Errors that can occur when calling the moderation API.
#[derive(Debug, Error)]
pub enum ModerationError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Client for the text moderation API.
#[derive(Clone)]
pub struct ModerationClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl ModerationClient {
    /// Create a new moderation API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ModerationConfig) -> Result<Self, ModerationError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|e| ModerationError::Parse(format!("Invalid API key format: {e}")))?,
        );
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        })
    }

    /// Classify a piece of text.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or returns no result.
    pub async fn classify(&self, text: &str) -> Result<ModerationVerdict, ModerationError> {
        let url = format!("{}/v1/moderations", self.base_url);

        let body = serde_json::json!({
            "model": self.model,
            "input": [text],
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ModerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let api_response: ModerationResponse = response
            .json()
            .await
            .map_err(|e| ModerationError::Parse(e.to_string()))?;

        let result = api_response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ModerationError::Parse("empty results array".to_owned()))?;

        Ok(ModerationVerdict::from_categories(result.categories))
    }
}

/// Outcome of classifying one piece of text.
#[derive(Debug, Clone)]
pub struct ModerationVerdict {
    /// Whether any category was flagged.
    pub flagged: bool,
    /// Names of the flagged categories, for logging.
    pub flagged_categories: Vec<String>,
}

impl ModerationVerdict {
    fn from_categories(categories: HashMap<String, bool>) -> Self {
        let mut flagged_categories: Vec<String> = categories
            .into_iter()
            .filter_map(|(name, hit)| hit.then_some(name))
            .collect();
        flagged_categories.sort_unstable();

        Self {
            flagged: !flagged_categories.is_empty(),
            flagged_categories,
        }
    }

    /// The review status this verdict maps to.
    #[must_use]
    pub fn review_status(&self) -> ReviewStatus {
        if self.flagged {
            ReviewStatus::AiRejected
        } else {
            ReviewStatus::AiApproved
        }
    }
}

/// Response from the moderation endpoint.
#[derive(Debug, Deserialize)]
struct ModerationResponse {
    results: Vec<ModerationResult>,
}

/// Per-input classification result.
#[derive(Debug, Deserialize)]
struct ModerationResult {
    categories: HashMap<String, bool>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_clean_text() {
        let raw = r#"{
            "id": "mod-123",
            "model": "test-moderation",
            "results": [{
                "categories": {"hate": false, "violence": false, "pii": false},
                "category_scores": {"hate": 0.01, "violence": 0.0, "pii": 0.02}
            }]
        }"#;
        let response: ModerationResponse = serde_json::from_str(raw).unwrap();
        let result = response.results.into_iter().next().unwrap();
        let verdict = ModerationVerdict::from_categories(result.categories);

        assert!(!verdict.flagged);
        assert!(verdict.flagged_categories.is_empty());
        assert_eq!(verdict.review_status(), ReviewStatus::AiApproved);
    }

    #[test]
    fn test_verdict_flagged_text() {
        let raw = r#"{
            "results": [{
                "categories": {"hate": true, "violence": false, "pii": true}
            }]
        }"#;
        let response: ModerationResponse = serde_json::from_str(raw).unwrap();
        let result = response.results.into_iter().next().unwrap();
        let verdict = ModerationVerdict::from_categories(result.categories);

        assert!(verdict.flagged);
        assert_eq!(verdict.flagged_categories, vec!["hate", "pii"]);
        assert_eq!(verdict.review_status(), ReviewStatus::AiRejected);
    }

    #[test]
    fn test_empty_results_is_parse_error() {
        let raw = r#"{"results": []}"#;
        let response: ModerationResponse = serde_json::from_str(raw).unwrap();
        assert!(response.results.is_empty());
    }
}
