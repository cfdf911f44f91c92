//! Defensive coalescing of partially-populated rater output.
//!
//! Raters are instructed to return a fixed JSON object and mostly comply, but
//! fields go missing, nulls appear, and numbers arrive in odd shapes.
//! [`RawOpinion`] accepts any subset of the schema; [`RawOpinion::normalize`]
//! collapses it into a fully-populated payload exactly once, at the fan-out
//! boundary, so downstream code never sees an optional field.

use serde::Deserialize;
use visilens_core::{Mentions, OpinionPayload, ScoreAssessment};

/// Mirror of the demanded opinion schema with every field optional. The wire
/// format uses camelCase keys, as spelled out in the prompt.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawOpinion {
    pub strengths: Option<Vec<String>>,
    pub weaknesses: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub content_recommendations: Option<Vec<String>>,
    pub technical_issues: Option<Vec<String>>,
    pub competitive_insights: Option<String>,
    pub sentiment: Option<RawScore>,
    pub visibility: Option<RawScore>,
    pub mentions: Option<RawMentions>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawScore {
    pub score: Option<f64>,
    pub assessment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawMentions {
    pub count: Option<f64>,
    pub contexts: Option<Vec<String>>,
}

impl RawOpinion {
    /// Collapse every missing sub-field to its zero value.
    #[must_use]
    pub fn normalize(self) -> OpinionPayload {
        OpinionPayload {
            strengths: self.strengths.unwrap_or_default(),
            weaknesses: self.weaknesses.unwrap_or_default(),
            keywords: self.keywords.unwrap_or_default(),
            content_recommendations: self.content_recommendations.unwrap_or_default(),
            technical_issues: self.technical_issues.unwrap_or_default(),
            competitive_insights: self.competitive_insights.unwrap_or_default(),
            sentiment: normalize_score(self.sentiment),
            visibility: normalize_score(self.visibility),
            mentions: normalize_mentions(self.mentions),
        }
    }
}

fn normalize_score(raw: Option<RawScore>) -> ScoreAssessment {
    let raw = raw.unwrap_or_default();
    ScoreAssessment {
        score: raw.score.unwrap_or(0.0),
        assessment: raw.assessment.unwrap_or_default(),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn normalize_mentions(raw: Option<RawMentions>) -> Mentions {
    let raw = raw.unwrap_or_default();
    // Counts arrive as JSON numbers of any shape; clamp to a sane u32.
    let count = raw
        .count
        .filter(|c| c.is_finite())
        .map_or(0, |c| c.clamp(0.0, f64::from(u32::MAX)) as u32);
    Mentions {
        count,
        contexts: raw.contexts.unwrap_or_default(),
    }
}
