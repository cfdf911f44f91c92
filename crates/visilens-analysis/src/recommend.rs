//! Ranked action items derived from a consolidated analysis: content
//! recommendations, fixes for technical issues, and a keyword-coverage
//! nudge, sorted by priority then impact.

use serde::{Deserialize, Serialize};
use visilens_core::Lexicons;

use crate::types::{AnalysisResult, Priority};

const RECOMMENDATION_LIMIT: usize = 15;
const MISSING_KEYWORD_LIMIT: usize = 10;
const KEYWORD_NAME_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationCategory {
    Content,
    Technical,
    Keywords,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: RecommendationCategory,
    pub recommendation: String,
    /// Share of raters backing the item, as a 0..=100 percentage.
    pub impact: u32,
    /// Rough effort estimate on a 0..=100 scale.
    pub difficulty: u32,
    pub models: Vec<String>,
}

/// Build the ranked recommendation list for a consolidated analysis.
///
/// Content recommendations arrive frequency-ranked, so priority is
/// positional: the top three are high, the next four medium, the rest low.
/// Technical fixes inherit the issue's own priority. At most one synthetic
/// keyword recommendation is appended. The result is sorted by priority,
/// then descending impact, and capped at 15.
#[must_use]
pub fn prioritized_recommendations(
    result: &AnalysisResult,
    lexicons: &Lexicons,
) -> Vec<Recommendation> {
    let rater_count = result.model_comparison.len();
    let mut recommendations: Vec<Recommendation> = Vec::new();

    for (rank, item) in result.content_recommendations.iter().enumerate() {
        let priority = match rank {
            0..=2 => Priority::High,
            3..=6 => Priority::Medium,
            _ => Priority::Low,
        };
        recommendations.push(Recommendation {
            priority,
            category: RecommendationCategory::Content,
            recommendation: item.text.clone(),
            impact: impact_score(item.frequency, rater_count),
            difficulty: content_difficulty(&item.text, lexicons),
            models: item.models.clone(),
        });
    }

    for issue in &result.technical_issues {
        recommendations.push(Recommendation {
            priority: issue.priority,
            category: RecommendationCategory::Technical,
            recommendation: format!("Fix: {}", issue.text),
            impact: impact_score(issue.frequency, rater_count),
            difficulty: match issue.priority {
                Priority::High => 70,
                Priority::Medium => 50,
                Priority::Low => 30,
            },
            models: issue.models.clone(),
        });
    }

    let missing = missing_keywords(result);
    if !missing.is_empty() {
        let named: Vec<&str> = missing
            .iter()
            .take(KEYWORD_NAME_LIMIT)
            .map(String::as_str)
            .collect();
        recommendations.push(Recommendation {
            priority: Priority::High,
            category: RecommendationCategory::Keywords,
            recommendation: format!(
                "Optimize content for these keywords: {}",
                named.join(", ")
            ),
            impact: 80,
            difficulty: 40,
            models: result
                .model_comparison
                .iter()
                .map(|c| c.model.clone())
                .collect(),
        });
    }

    recommendations.sort_by(|a, b| a.priority.cmp(&b.priority).then(b.impact.cmp(&a.impact)));
    recommendations.truncate(RECOMMENDATION_LIMIT);
    recommendations
}

/// Content-derived keywords the rater consensus never surfaced,
/// case-insensitively, capped at 10.
#[must_use]
pub fn missing_keywords(result: &AnalysisResult) -> Vec<String> {
    let consensus: Vec<String> = result
        .keywords
        .common
        .iter()
        .map(|k| k.text.to_lowercase())
        .collect();

    result
        .keywords
        .from_content
        .iter()
        .filter(|keyword| !consensus.contains(&keyword.to_lowercase()))
        .take(MISSING_KEYWORD_LIMIT)
        .cloned()
        .collect()
}

/// `min(100, round(frequency / rater_count * 100))`, guarding the
/// zero-rater case.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn impact_score(frequency: u32, rater_count: usize) -> u32 {
    let share = f64::from(frequency) / rater_count.max(1) as f64;
    ((share * 100.0).round() as u32).min(100)
}

/// Effort estimate seeded at 50 and nudged by trigger terms. The easy
/// adjustment applies before the hard one, so text matching both lands back
/// on 50.
fn content_difficulty(text: &str, lexicons: &Lexicons) -> u32 {
    let mut difficulty: u32 = 50;
    if Lexicons::matches_any(text, &lexicons.easy_effort) {
        difficulty = difficulty.saturating_sub(20).max(20);
    }
    if Lexicons::matches_any(text, &lexicons.hard_effort) {
        difficulty = (difficulty + 20).min(90);
    }
    difficulty
}

#[cfg(test)]
#[path = "recommend_test.rs"]
mod tests;
