use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Provider label stamped on every rater opinion.
pub const PROVIDER: &str = "openrouter";

/// How an analysis input should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Url,
    Brand,
}

impl InputType {
    /// Parse the wire name (`"url"` / `"brand"`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "url" => Some(Self::Url),
            "brand" => Some(Self::Brand),
            _ => None,
        }
    }
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputType::Url => write!(f, "url"),
            InputType::Brand => write!(f, "brand"),
        }
    }
}

/// Normalized content for one analysis input, either scraped from a URL or
/// synthesized for a bare brand name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentDocument {
    pub url: String,
    pub title: String,
    pub description: String,
    pub paragraphs: Vec<String>,
    pub keywords: Vec<String>,
    pub meta_tags: BTreeMap<String, String>,
    pub links: Vec<String>,
    pub full_text: String,
}

/// A numeric score paired with the rater's free-text assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreAssessment {
    pub score: f64,
    pub assessment: String,
}

/// Brand mention statistics reported by one rater.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mentions {
    pub count: u32,
    pub contexts: Vec<String>,
}

/// The fully-coalesced opinion from one rater. Every field is total: missing
/// or malformed rater output collapses to the zero value, never to an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpinionPayload {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub keywords: Vec<String>,
    pub content_recommendations: Vec<String>,
    pub technical_issues: Vec<String>,
    pub competitive_insights: String,
    pub sentiment: ScoreAssessment,
    pub visibility: ScoreAssessment,
    pub mentions: Mentions,
}

/// One rater's opinion, keyed by the short rater id the caller requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaterOpinion {
    pub model: String,
    pub provider: String,
    pub payload: OpinionPayload,
}

impl RaterOpinion {
    /// The all-zero opinion substituted when a rater fails. Failed raters
    /// still occupy their slot in the result so downstream aggregates keep
    /// one entry per requested rater.
    #[must_use]
    pub fn degraded(model: &str) -> Self {
        Self {
            model: model.to_string(),
            provider: PROVIDER.to_string(),
            payload: OpinionPayload::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_type_from_name() {
        assert_eq!(InputType::from_name("url"), Some(InputType::Url));
        assert_eq!(InputType::from_name("brand"), Some(InputType::Brand));
        assert_eq!(InputType::from_name("rss"), None);
        assert_eq!(InputType::from_name(""), None);
    }

    #[test]
    fn input_type_display_matches_wire_name() {
        assert_eq!(InputType::Url.to_string(), "url");
        assert_eq!(InputType::Brand.to_string(), "brand");
    }

    #[test]
    fn input_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&InputType::Url).unwrap(), "\"url\"");
        assert_eq!(
            serde_json::to_string(&InputType::Brand).unwrap(),
            "\"brand\""
        );
    }

    #[test]
    fn degraded_opinion_is_all_zero() {
        let opinion = RaterOpinion::degraded("chatgpt-4o");
        assert_eq!(opinion.model, "chatgpt-4o");
        assert_eq!(opinion.provider, PROVIDER);
        assert_eq!(opinion.payload, OpinionPayload::default());
        assert_eq!(opinion.payload.visibility.score, 0.0);
        assert!(opinion.payload.strengths.is_empty());
        assert_eq!(opinion.payload.mentions.count, 0);
    }
}
