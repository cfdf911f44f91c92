//! Report assembly: shapes an [`AnalysisResult`] into the document handed
//! back to API clients. Pure transformation, no I/O.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use visilens_core::{InputType, Lexicons};

use crate::recommend::{missing_keywords, prioritized_recommendations, Recommendation};
use crate::types::{
    AnalysisResult, CompetitiveInsights, ConsolidatedItem, ContentGap, MentionsByModel,
    ModelComparison, SentimentByModel, TechnicalIssueItem,
};

const SUMMARY_LIST_CAP: usize = 10;
const AI_KEYWORD_CAP: usize = 20;
const CONTEXT_CAP: usize = 10;
const UNIQUE_CAP: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub input_value: String,
    pub input_type: InputType,
    pub summary: ReportSummary,
    pub ai_visibility: AiVisibility,
    pub brand_mentions: BrandMentions,
    pub sentiment: SentimentBlock,
    pub content_gaps: Vec<ContentGap>,
    pub keywords: KeywordTables,
    pub strengths: Vec<ConsolidatedItem>,
    pub weaknesses: Vec<ConsolidatedItem>,
    pub technical_issues: Vec<TechnicalIssueItem>,
    pub recommendations: Vec<Recommendation>,
    pub competitive_insights: CompetitiveInsights,
    pub model_comparison: ModelComparisonBlock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub visibility_score: i64,
    pub visibility_assessment: String,
    pub sentiment_score: f64,
    pub sentiment_assessment: String,
    pub keyword_count: usize,
    pub brand_mentions: MentionSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionSummary {
    pub average: i64,
    pub max: u32,
    pub min: u32,
    pub by_model: Vec<MentionsByModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiVisibility {
    pub overall_score: i64,
    pub by_model: Vec<VisibilityByModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityByModel {
    pub model: String,
    pub score: i64,
    pub assessment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandMentions {
    pub count: i64,
    pub contexts: Vec<String>,
    pub by_model: Vec<ModelMentionDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMentionDetail {
    pub model: String,
    pub count: u32,
    pub contexts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentBlock {
    pub score: f64,
    pub assessment: String,
    pub by_model: Vec<SentimentByModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordTables {
    pub top: Vec<ConsolidatedItem>,
    pub ai_generated: Vec<ConsolidatedItem>,
    pub content_based: Vec<String>,
    pub missing_keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelComparisonBlock {
    pub model_breakdown: BTreeMap<String, ModelBreakdown>,
}

/// What a single rater contributed that no other rater did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBreakdown {
    pub visibility_score: f64,
    pub sentiment_score: f64,
    pub unique_strengths: Vec<String>,
    pub unique_weaknesses: Vec<String>,
    pub unique_keywords: Vec<String>,
}

/// Shape a consolidated analysis into the final report.
///
/// Scores round to integers except sentiment, which keeps two decimal
/// places. Consolidated lists are sliced to their documented caps; the
/// representative assessments come from the first rater, matching the
/// consolidation step.
#[must_use]
pub fn assemble_report(
    result: &AnalysisResult,
    input_value: &str,
    input_type: InputType,
    lexicons: &Lexicons,
) -> Report {
    tracing::info!(input = input_value, kind = %input_type, "assembling report");

    let recommendations = prioritized_recommendations(result, lexicons);
    let missing = missing_keywords(result);
    let first = result.model_comparison.first();
    let sentiment_assessment = first
        .map(|c| c.sentiment_assessment.clone())
        .unwrap_or_default();
    let sentiment_score = round2(result.sentiment_stats.average_score);

    Report {
        id: generate_report_id(),
        timestamp: Utc::now(),
        input_value: input_value.to_string(),
        input_type,
        summary: ReportSummary {
            visibility_score: round_score(result.overall_visibility.score),
            visibility_assessment: result.overall_visibility.assessment.clone(),
            sentiment_score,
            sentiment_assessment: sentiment_assessment.clone(),
            keyword_count: result.keywords.common.len(),
            brand_mentions: MentionSummary {
                average: round_score(result.mention_stats.average_count),
                max: result.mention_stats.max_count,
                min: result.mention_stats.min_count,
                by_model: result.mention_stats.by_model.clone(),
            },
        },
        ai_visibility: AiVisibility {
            overall_score: round_score(result.overall_visibility.score),
            by_model: result
                .model_comparison
                .iter()
                .map(|c| VisibilityByModel {
                    model: c.model.clone(),
                    score: round_score(c.visibility_score),
                    assessment: c.visibility_assessment.clone(),
                })
                .collect(),
        },
        brand_mentions: mention_block(result),
        sentiment: SentimentBlock {
            score: sentiment_score,
            assessment: sentiment_assessment,
            by_model: result.sentiment_stats.by_model.clone(),
        },
        content_gaps: result.content_gaps.clone(),
        keywords: KeywordTables {
            top: result
                .keywords
                .common
                .iter()
                .take(SUMMARY_LIST_CAP)
                .cloned()
                .collect(),
            ai_generated: result
                .keywords
                .common
                .iter()
                .take(AI_KEYWORD_CAP)
                .cloned()
                .collect(),
            content_based: result.keywords.from_content.clone(),
            missing_keywords: missing,
        },
        strengths: result.strengths.iter().take(SUMMARY_LIST_CAP).cloned().collect(),
        weaknesses: result.weaknesses.iter().take(SUMMARY_LIST_CAP).cloned().collect(),
        technical_issues: result
            .technical_issues
            .iter()
            .take(SUMMARY_LIST_CAP)
            .cloned()
            .collect(),
        recommendations,
        competitive_insights: result.competitive_insights.clone(),
        model_comparison: ModelComparisonBlock {
            model_breakdown: breakdown_map(&result.model_comparison),
        },
    }
}

fn mention_block(result: &AnalysisResult) -> BrandMentions {
    BrandMentions {
        count: round_score(result.mention_stats.average_count),
        contexts: result
            .model_comparison
            .iter()
            .flat_map(|c| c.mention_contexts.iter().cloned())
            .take(CONTEXT_CAP)
            .collect(),
        by_model: result
            .model_comparison
            .iter()
            .map(|c| ModelMentionDetail {
                model: c.model.clone(),
                count: c.mention_count,
                contexts: c.mention_contexts.iter().take(CONTEXT_CAP).cloned().collect(),
            })
            .collect(),
    }
}

fn breakdown_map(comparisons: &[ModelComparison]) -> BTreeMap<String, ModelBreakdown> {
    comparisons
        .iter()
        .map(|c| {
            (
                c.model.clone(),
                ModelBreakdown {
                    visibility_score: c.visibility_score,
                    sentiment_score: c.sentiment_score,
                    unique_strengths: unique_items(comparisons, c, |m| m.strengths.as_slice()),
                    unique_weaknesses: unique_items(comparisons, c, |m| m.weaknesses.as_slice()),
                    unique_keywords: unique_items(comparisons, c, |m| m.keywords.as_slice()),
                },
            )
        })
        .collect()
}

fn generate_report_id() -> String {
    format!(
        "report_{}_{:08x}",
        Utc::now().timestamp_millis(),
        rand::random::<u32>()
    )
}

/// Items in `own`'s field that appear in no other rater's same field.
/// Matching is case-sensitive exact text, capped at 5.
fn unique_items<'a, F>(
    comparisons: &'a [ModelComparison],
    own: &'a ModelComparison,
    field: F,
) -> Vec<String>
where
    F: Fn(&'a ModelComparison) -> &'a [String],
{
    field(own)
        .iter()
        .filter(|item| {
            !comparisons
                .iter()
                .filter(|other| other.model != own.model)
                .any(|other| field(other).contains(*item))
        })
        .take(UNIQUE_CAP)
        .cloned()
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn round_score(score: f64) -> i64 {
    score.round() as i64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
