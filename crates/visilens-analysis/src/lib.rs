//! Turns a set of per-rater opinions into consolidated findings, ranked
//! recommendations, and the final report document.

pub mod consolidate;
pub mod recommend;
pub mod report;
pub mod types;

pub use consolidate::consolidate;
pub use recommend::{
    missing_keywords, prioritized_recommendations, Recommendation, RecommendationCategory,
};
pub use report::{assemble_report, Report};
pub use types::{
    AnalysisResult, ConsolidatedItem, ContentGap, Priority, TechnicalIssueItem,
};
