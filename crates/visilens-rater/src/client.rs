//! HTTP client for the OpenRouter chat-completions API.
//!
//! One request per rater: the prompt goes out as a single user message with
//! `response_format: json_object`, and the first choice's content comes back
//! as the opinion JSON.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;
use visilens_core::OpinionPayload;

use crate::error::RaterError;
use crate::normalize::RawOpinion;

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1/";

/// Longest error-body excerpt carried in `UnexpectedStatus`.
const BODY_SNIPPET_LEN: usize = 400;

/// Client for the OpenRouter chat-completions API.
///
/// Manages the HTTP client, API key, and endpoint URL. Use [`RaterClient::new`]
/// for production or [`RaterClient::with_base_url`] to point at a mock server
/// in tests.
pub struct RaterClient {
    client: Client,
    api_key: String,
    endpoint: Url,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

impl RaterClient {
    /// Creates a new client pointed at the production OpenRouter API.
    ///
    /// # Errors
    ///
    /// Returns [`RaterError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, RaterError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`RaterError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`RaterError::InvalidBaseUrl`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, RaterError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("visilens/0.1 (seo-visibility)")
            .build()?;

        // Normalise to exactly one trailing slash so the join below lands on
        // <base>/chat/completions rather than replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join("chat/completions"))
            .map_err(|e| RaterError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint,
        })
    }

    /// Requests one opinion from `model` and coalesces it into a total
    /// [`OpinionPayload`].
    ///
    /// # Errors
    ///
    /// - [`RaterError::Http`] on network failure or timeout.
    /// - [`RaterError::UnexpectedStatus`] for non-2xx responses.
    /// - [`RaterError::Deserialize`] if the completion envelope is malformed.
    /// - [`RaterError::EmptyCompletion`] if the envelope carries no choices.
    /// - [`RaterError::MalformedOpinion`] if the first choice's content is not
    ///   the JSON object the prompt demanded.
    pub async fn query_opinion(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<OpinionPayload, RaterError> {
        let request = json!({
            "model": model,
            "messages": [{ "role": "user", "content": prompt }],
            "response_format": { "type": "json_object" },
        });

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RaterError::UnexpectedStatus {
                model: model.to_string(),
                status: status.as_u16(),
                body: body.chars().take(BODY_SNIPPET_LEN).collect(),
            });
        }

        let body = response.text().await?;
        let completion: ChatCompletion =
            serde_json::from_str(&body).map_err(|e| RaterError::Deserialize {
                context: format!("chat/completions({model})"),
                source: e,
            })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| RaterError::EmptyCompletion {
                model: model.to_string(),
            })?;

        let raw: RawOpinion =
            serde_json::from_str(&content).map_err(|e| RaterError::MalformedOpinion {
                model: model.to_string(),
                source: e,
            })?;

        Ok(raw.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_base_url_strips_trailing_slash() {
        let client = RaterClient::with_base_url("test-key", 30, "https://openrouter.ai/api/v1//")
            .expect("client construction should not fail");
        assert_eq!(
            client.endpoint.as_str(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn with_base_url_rejects_invalid_url() {
        let result = RaterClient::with_base_url("test-key", 30, "not a url");
        assert!(matches!(result, Err(RaterError::InvalidBaseUrl { .. })));
    }
}
