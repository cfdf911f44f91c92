//! Consolidated analysis types shared by the engine, the recommender, and the
//! report assembler.

use serde::{Deserialize, Serialize};
use visilens_core::ScoreAssessment;

/// Priority bucket for technical issues and recommendations. Ordering follows
/// urgency: `High < Medium < Low`, so an ascending sort puts high first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// One textual finding merged across raters. `frequency` counts the raters
/// contributing an equivalent string; `models` lists them in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedItem {
    pub text: String,
    pub frequency: u32,
    pub models: Vec<String>,
}

/// A technical issue with the priority classified from its first-seen text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalIssueItem {
    pub text: String,
    pub frequency: u32,
    pub models: Vec<String>,
    pub priority: Priority,
}

/// One rater's raw contribution, retained verbatim for per-model breakdowns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelComparison {
    pub model: String,
    pub visibility_score: f64,
    pub visibility_assessment: String,
    pub sentiment_score: f64,
    pub sentiment_assessment: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub keywords: Vec<String>,
    pub technical_issues: Vec<String>,
    pub content_recommendations: Vec<String>,
    pub competitive_insights: String,
    pub mention_count: u32,
    pub mention_contexts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentByModel {
    pub model: String,
    pub score: f64,
    pub assessment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentStats {
    pub average_score: f64,
    pub by_model: Vec<SentimentByModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionsByModel {
    pub model: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionStats {
    pub average_count: f64,
    pub max_count: u32,
    pub min_count: u32,
    pub by_model: Vec<MentionsByModel>,
}

/// Rater-consensus keywords next to the keywords derived from the content
/// itself; the recommender diffs the two.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordSets {
    pub common: Vec<ConsolidatedItem>,
    pub from_content: Vec<String>,
}

/// A content area multiple raters flagged as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentGap {
    pub gap: String,
    pub impact: u32,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInsight {
    pub model: String,
    pub insight: String,
}

/// Competitive insights are kept per model; no cross-rater synthesis is done,
/// so the summary stays empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitiveInsights {
    pub by_model: Vec<ModelInsight>,
    pub summary: String,
}

/// The job-scoped aggregate every downstream stage reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub brand_name: String,
    pub overall_visibility: ScoreAssessment,
    pub sentiment_stats: SentimentStats,
    pub mention_stats: MentionStats,
    pub keywords: KeywordSets,
    pub strengths: Vec<ConsolidatedItem>,
    pub weaknesses: Vec<ConsolidatedItem>,
    pub technical_issues: Vec<TechnicalIssueItem>,
    pub content_recommendations: Vec<ConsolidatedItem>,
    pub content_gaps: Vec<ContentGap>,
    pub competitive_insights: CompetitiveInsights,
    pub model_comparison: Vec<ModelComparison>,
}
