//! The fixed instruction template sent to every rater.

use visilens_core::ContentDocument;

/// Render the instruction prompt for one analysis request. The same prompt
/// goes to every selected rater; only the model name differs per call.
///
/// The content is embedded as pretty-printed JSON and the response schema is
/// spelled out verbatim, since the consolidation step depends on these exact
/// field names.
#[must_use]
pub fn build_prompt(content: &ContentDocument, current_date: &str) -> String {
    let content_json = serde_json::to_string_pretty(content).unwrap_or_default();

    format!(
        r#"Current Date: {current_date}

You are an experienced SEO and AI-visibility analyst. Evaluate the following website or brand content and assess how visible and well-regarded this brand is likely to be in AI assistant answers today.

Cover all of these aspects:
1. SEO strengths and weaknesses of the content
2. The keywords most strongly associated with the brand
3. Concrete content recommendations to improve visibility
4. Technical SEO issues
5. Competitive positioning and insights
6. Overall sentiment toward the brand (score between -1 and 1)
7. AI visibility: how likely AI models are to surface this brand (score between 0 and 100)
8. Brand mentions: how often and in which contexts the brand comes up

Content to analyze:
{content_json}

Respond ONLY with a valid JSON object in exactly this format:
{{
  "strengths": ["strength"],
  "weaknesses": ["weakness"],
  "keywords": ["keyword"],
  "contentRecommendations": ["recommendation"],
  "technicalIssues": ["issue"],
  "competitiveInsights": "insights",
  "sentiment": {{ "score": 0.0, "assessment": "brief assessment" }},
  "visibility": {{ "score": 0, "assessment": "brief assessment" }},
  "mentions": {{ "count": 0, "contexts": ["context"] }}
}}

"sentiment.score" is between -1 and 1; "visibility.score" is between 0 and 100.
Be realistic in your scoring, but do not be overly harsh: if common elements such as H1 or H2 tags are absent from the extracted content, treat that as an extraction artifact rather than an issue."#
    )
}
