//! Consolidation engine: merges per-rater findings into frequency-ranked
//! consensus lists and cross-rater aggregate statistics.
//!
//! Merging is case-insensitive on trimmed text. The first occurrence of a
//! group wins its casing (and, for issues, its priority); every further
//! occurrence bumps the frequency and unions the contributing models.

use std::collections::HashMap;

use regex::Regex;
use visilens_core::{ContentDocument, Lexicons, OpinionPayload, RaterOpinion, ScoreAssessment};

use crate::types::{
    AnalysisResult, CompetitiveInsights, ConsolidatedItem, ContentGap, KeywordSets, MentionStats,
    MentionsByModel, ModelComparison, ModelInsight, Priority, SentimentByModel, SentimentStats,
    TechnicalIssueItem,
};

const CONTENT_KEYWORD_LIMIT: usize = 30;
const CONTENT_GAP_LIMIT: usize = 15;
const CONTENT_GAP_IMPACT: u32 = 3;
const STOP_WORDS: &[&str] = &["and", "the", "that", "this", "with", "for", "from"];

/// Anything the merge step can group by case-insensitive text.
pub(crate) trait MergeItem {
    fn merge_key(&self) -> String;
    fn frequency(&self) -> u32;
    /// Fold a colliding item into this one.
    fn absorb(&mut self, other: Self);
}

impl MergeItem for ConsolidatedItem {
    fn merge_key(&self) -> String {
        self.text.trim().to_lowercase()
    }

    fn frequency(&self) -> u32 {
        self.frequency
    }

    fn absorb(&mut self, other: Self) {
        self.frequency += 1;
        for model in other.models {
            if !self.models.contains(&model) {
                self.models.push(model);
            }
        }
    }
}

impl MergeItem for TechnicalIssueItem {
    fn merge_key(&self) -> String {
        self.text.trim().to_lowercase()
    }

    fn frequency(&self) -> u32 {
        self.frequency
    }

    // First-seen priority wins; later duplicates only add weight.
    fn absorb(&mut self, other: Self) {
        self.frequency += 1;
        for model in other.models {
            if !self.models.contains(&model) {
                self.models.push(model);
            }
        }
    }
}

/// Merge equivalent items and rank by descending frequency. The sort is
/// stable, so equal frequencies keep first-seen order.
pub(crate) fn merge_items<T: MergeItem>(items: Vec<T>) -> Vec<T> {
    let mut merged: Vec<T> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let key = item.merge_key();
        match index.get(&key) {
            Some(&i) => merged[i].absorb(item),
            None => {
                index.insert(key, merged.len());
                merged.push(item);
            }
        }
    }

    merged.sort_by(|a, b| b.frequency().cmp(&a.frequency()));
    merged
}

/// Consolidate all rater opinions for one job into an [`AnalysisResult`].
///
/// Degraded opinions participate like any other: they contribute empty lists
/// and zero scores, which keeps one comparison entry per requested rater and
/// makes the averages reflect the full fan-out. Zero raters yields an
/// all-zero result rather than an error.
#[must_use]
pub fn consolidate(
    opinions: &[RaterOpinion],
    content: &ContentDocument,
    brand_name: &str,
    lexicons: &Lexicons,
) -> AnalysisResult {
    tracing::info!(raters = opinions.len(), brand = brand_name, "consolidating rater opinions");

    let model_comparison: Vec<ModelComparison> = opinions
        .iter()
        .map(|opinion| ModelComparison {
            model: opinion.model.clone(),
            visibility_score: opinion.payload.visibility.score,
            visibility_assessment: opinion.payload.visibility.assessment.clone(),
            sentiment_score: opinion.payload.sentiment.score,
            sentiment_assessment: opinion.payload.sentiment.assessment.clone(),
            strengths: opinion.payload.strengths.clone(),
            weaknesses: opinion.payload.weaknesses.clone(),
            keywords: opinion.payload.keywords.clone(),
            technical_issues: opinion.payload.technical_issues.clone(),
            content_recommendations: opinion.payload.content_recommendations.clone(),
            competitive_insights: opinion.payload.competitive_insights.clone(),
            mention_count: opinion.payload.mentions.count,
            mention_contexts: opinion.payload.mentions.contexts.clone(),
        })
        .collect();

    let strengths = merge_items(flatten(opinions, |p| p.strengths.as_slice()));
    let weaknesses = merge_items(flatten(opinions, |p| p.weaknesses.as_slice()));
    let common_keywords = merge_items(flatten(opinions, |p| p.keywords.as_slice()));
    let content_recommendations =
        merge_items(flatten(opinions, |p| p.content_recommendations.as_slice()));

    let technical_issues = merge_items(
        opinions
            .iter()
            .flat_map(|opinion| {
                opinion
                    .payload
                    .technical_issues
                    .iter()
                    .map(move |issue| TechnicalIssueItem {
                        text: issue.clone(),
                        frequency: 1,
                        models: vec![opinion.model.clone()],
                        priority: issue_priority(issue, lexicons),
                    })
            })
            .collect(),
    );

    // The representative assessment is the first requested rater's: averaging
    // free text is not meaningful, and request order is caller-controlled.
    let overall_visibility = ScoreAssessment {
        score: mean(model_comparison.iter().map(|c| c.visibility_score)),
        assessment: model_comparison
            .first()
            .map(|c| c.visibility_assessment.clone())
            .unwrap_or_default(),
    };

    let sentiment_stats = SentimentStats {
        average_score: mean(model_comparison.iter().map(|c| c.sentiment_score)),
        by_model: model_comparison
            .iter()
            .map(|c| SentimentByModel {
                model: c.model.clone(),
                score: c.sentiment_score,
                assessment: c.sentiment_assessment.clone(),
            })
            .collect(),
    };

    let mention_stats = MentionStats {
        average_count: mean(model_comparison.iter().map(|c| f64::from(c.mention_count))),
        max_count: model_comparison
            .iter()
            .map(|c| c.mention_count)
            .max()
            .unwrap_or(0),
        min_count: model_comparison
            .iter()
            .map(|c| c.mention_count)
            .min()
            .unwrap_or(0),
        by_model: model_comparison
            .iter()
            .map(|c| MentionsByModel {
                model: c.model.clone(),
                count: c.mention_count,
            })
            .collect(),
    };

    let competitive_insights = CompetitiveInsights {
        by_model: model_comparison
            .iter()
            .filter(|c| !c.competitive_insights.is_empty())
            .map(|c| ModelInsight {
                model: c.model.clone(),
                insight: c.competitive_insights.clone(),
            })
            .collect(),
        summary: String::new(),
    };

    let content_gaps = identify_content_gaps(&weaknesses, &content_recommendations, lexicons);

    AnalysisResult {
        brand_name: brand_name.to_string(),
        overall_visibility,
        sentiment_stats,
        mention_stats,
        keywords: KeywordSets {
            common: common_keywords,
            from_content: extract_content_keywords(content),
        },
        strengths,
        weaknesses,
        technical_issues,
        content_recommendations,
        content_gaps,
        competitive_insights,
        model_comparison,
    }
}

fn flatten<'a, F>(opinions: &'a [RaterOpinion], field: F) -> Vec<ConsolidatedItem>
where
    F: Fn(&'a OpinionPayload) -> &'a [String],
{
    opinions
        .iter()
        .flat_map(|opinion| {
            field(&opinion.payload)
                .iter()
                .map(move |text| ConsolidatedItem {
                    text: text.clone(),
                    frequency: 1,
                    models: vec![opinion.model.clone()],
                })
        })
        .collect()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0_u32), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / f64::from(n)
    }
}

/// Classify an issue by its trigger terms: high beats medium, everything
/// else is low.
fn issue_priority(issue: &str, lexicons: &Lexicons) -> Priority {
    if Lexicons::matches_any(issue, &lexicons.high_priority_issues) {
        Priority::High
    } else if Lexicons::matches_any(issue, &lexicons.medium_priority_issues) {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// The most frequent tokens across title, description, and body text. Tokens
/// of length <= 3 and stop words are dropped; ties keep first-seen order.
fn extract_content_keywords(content: &ContentDocument) -> Vec<String> {
    let text = format!(
        "{} {} {}",
        content.title, content.description, content.full_text
    );
    let cleaned_re = Regex::new(r"[^\w\s]").expect("valid token regex");
    let lowered = text.to_lowercase();
    let cleaned = cleaned_re.replace_all(&lowered, "");

    let mut counts: Vec<(String, u32)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for word in cleaned.split_whitespace() {
        if word.chars().count() <= 3 || STOP_WORDS.contains(&word) {
            continue;
        }
        match index.get(word) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(word.to_string(), counts.len());
                counts.push((word.to_string(), 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(CONTENT_KEYWORD_LIMIT)
        .map(|(word, _)| word)
        .collect()
}

/// Corroborated absences: weaknesses phrased as something missing and
/// recommendations phrased as something to add, both echoed by more than one
/// rater. Single-rater findings stay out so one hallucination cannot mint a
/// gap.
fn identify_content_gaps(
    weaknesses: &[ConsolidatedItem],
    recommendations: &[ConsolidatedItem],
    lexicons: &Lexicons,
) -> Vec<ContentGap> {
    let mut gaps: Vec<String> = Vec::new();

    for item in weaknesses.iter().filter(|w| w.frequency > 1) {
        if Lexicons::matches_any(&item.text, &lexicons.absence_markers)
            && !gaps.contains(&item.text)
        {
            gaps.push(item.text.clone());
        }
    }

    for item in recommendations.iter().filter(|r| r.frequency > 1) {
        if Lexicons::matches_any(&item.text, &lexicons.addition_markers)
            && !gaps.contains(&item.text)
        {
            gaps.push(item.text.clone());
        }
    }

    gaps.truncate(CONTENT_GAP_LIMIT);
    gaps.into_iter()
        .map(|gap| ContentGap {
            recommendation: format!("Consider addressing: {gap}"),
            impact: CONTENT_GAP_IMPACT,
            gap,
        })
        .collect()
}

#[cfg(test)]
#[path = "consolidate_test.rs"]
mod tests;
