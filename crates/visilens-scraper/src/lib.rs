//! Content source for analysis jobs: fetches a URL and extracts a normalized
//! [`ContentDocument`], or synthesizes one for bare brand-name inputs.

mod error;
mod extract;

pub use error::ScrapeError;

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use visilens_core::ContentDocument;

/// HTTP client for fetching pages to analyze.
///
/// Construction fails only if the underlying client cannot be built; fetch
/// errors are per-call.
pub struct ScrapeClient {
    client: Client,
}

impl ScrapeClient {
    /// Build a client with the given request timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns `ScrapeError::Http` if the HTTP client cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch `url` and extract a [`ContentDocument`] from its HTML. Inputs
    /// without a scheme get `https://` prepended first.
    ///
    /// # Errors
    ///
    /// Returns `ScrapeError::InvalidUrl` for empty input, `ScrapeError::Http`
    /// for transport failures, and `ScrapeError::UnexpectedStatus` for non-2xx
    /// responses. All are fatal to the calling job: without content there is
    /// nothing to analyze.
    pub async fn fetch_url(&self, url: &str) -> Result<ContentDocument, ScrapeError> {
        let url = normalize_url(url)?;

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let html = response.text().await?;
        tracing::info!(url = %url, bytes = html.len(), "scraped page");
        Ok(extract::document_from_html(&url, &html))
    }
}

/// Synthesize the document used for brand-name inputs. No network involved;
/// the raters work from the brand name alone.
#[must_use]
pub fn brand_document(brand_name: &str) -> ContentDocument {
    ContentDocument {
        url: String::new(),
        title: brand_name.to_string(),
        description: format!("Brand analysis for {brand_name}"),
        paragraphs: Vec::new(),
        keywords: Vec::new(),
        meta_tags: BTreeMap::new(),
        links: Vec::new(),
        full_text: format!("{brand_name} brand analysis requested without specific URL."),
    }
}

fn normalize_url(input: &str) -> Result<String, ScrapeError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ScrapeError::InvalidUrl {
            url: input.to_string(),
            reason: "URL is empty".to_string(),
        });
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("https://{trimmed}"))
    }
}
