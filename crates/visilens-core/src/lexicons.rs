use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const HIGH_PRIORITY_ISSUE_TERMS: &[&str] = &[
    "critical", "severe", "urgent", "broken", "error", "404", "security",
];
const MEDIUM_PRIORITY_ISSUE_TERMS: &[&str] = &["improve", "enhance", "missing", "fix", "update"];
const ABSENCE_MARKERS: &[&str] = &["missing", "lack of", "no ", "insufficient"];
const ADDITION_MARKERS: &[&str] = &["add", "include", "create", "develop"];
const EASY_EFFORT_TERMS: &[&str] = &["update", "add", "improve", "enhance", "optimize"];
const HARD_EFFORT_TERMS: &[&str] = &["redesign", "restructure", "overhaul", "rebuild", "complex"];

/// Trigger-term tables for classifying rater findings: issue priority, content
/// gap detection, and implementation-effort scoring.
///
/// Matching is case-insensitive substring containment against lowercase terms,
/// so every configured term must itself be lowercase. Tables omitted from an
/// override file keep their built-in values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicons {
    pub high_priority_issues: Vec<String>,
    pub medium_priority_issues: Vec<String>,
    pub absence_markers: Vec<String>,
    pub addition_markers: Vec<String>,
    pub easy_effort: Vec<String>,
    pub hard_effort: Vec<String>,
}

impl Default for Lexicons {
    fn default() -> Self {
        Self {
            high_priority_issues: owned(HIGH_PRIORITY_ISSUE_TERMS),
            medium_priority_issues: owned(MEDIUM_PRIORITY_ISSUE_TERMS),
            absence_markers: owned(ABSENCE_MARKERS),
            addition_markers: owned(ADDITION_MARKERS),
            easy_effort: owned(EASY_EFFORT_TERMS),
            hard_effort: owned(HARD_EFFORT_TERMS),
        }
    }
}

impl Lexicons {
    /// True if `text` contains any of `terms`, ignoring the text's case.
    #[must_use]
    pub fn matches_any(text: &str, terms: &[String]) -> bool {
        let lower = text.to_lowercase();
        terms.iter().any(|term| lower.contains(term.as_str()))
    }
}

fn owned(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| (*t).to_string()).collect()
}

/// Load and validate lexicon overrides from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_lexicons(path: &Path) -> Result<Lexicons, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LexiconsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let lexicons: Lexicons = serde_yaml::from_str(&content).map_err(ConfigError::LexiconsFileParse)?;

    validate_lexicons(&lexicons)?;

    Ok(lexicons)
}

fn validate_lexicons(lexicons: &Lexicons) -> Result<(), ConfigError> {
    let tables: [(&str, &[String]); 6] = [
        ("high_priority_issues", &lexicons.high_priority_issues),
        ("medium_priority_issues", &lexicons.medium_priority_issues),
        ("absence_markers", &lexicons.absence_markers),
        ("addition_markers", &lexicons.addition_markers),
        ("easy_effort", &lexicons.easy_effort),
        ("hard_effort", &lexicons.hard_effort),
    ];

    for (name, terms) in tables {
        if terms.is_empty() {
            return Err(ConfigError::Validation(format!(
                "lexicon table '{name}' must not be empty"
            )));
        }
        for term in terms {
            if term.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "lexicon table '{name}' contains an empty term"
                )));
            }
            if term.to_lowercase() != *term {
                return Err(ConfigError::Validation(format!(
                    "lexicon table '{name}' contains non-lowercase term '{term}'"
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_lexicons(&Lexicons::default()).is_ok());
    }

    #[test]
    fn matches_any_is_case_insensitive() {
        let lex = Lexicons::default();
        assert!(Lexicons::matches_any(
            "CRITICAL: checkout broken",
            &lex.high_priority_issues
        ));
        assert!(Lexicons::matches_any(
            "Pages return 404 errors",
            &lex.high_priority_issues
        ));
        assert!(!Lexicons::matches_any(
            "slow page load",
            &lex.high_priority_issues
        ));
    }

    #[test]
    fn matches_any_on_multiword_terms() {
        let lex = Lexicons::default();
        assert!(Lexicons::matches_any(
            "Lack of structured data",
            &lex.absence_markers
        ));
        // "no " needs the trailing space: "nothing" alone should not trigger it
        assert!(!Lexicons::matches_any("nothing", &lex.absence_markers));
    }

    #[test]
    fn partial_override_keeps_other_tables() {
        let yaml = "high_priority_issues:\n  - outage\n";
        let lex: Lexicons = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(lex.high_priority_issues, vec!["outage".to_string()]);
        assert_eq!(lex.easy_effort, Lexicons::default().easy_effort);
    }

    #[test]
    fn validate_rejects_empty_table() {
        let mut lex = Lexicons::default();
        lex.addition_markers.clear();
        let err = validate_lexicons(&lex).unwrap_err();
        assert!(err.to_string().contains("addition_markers"));
    }

    #[test]
    fn validate_rejects_empty_term() {
        let mut lex = Lexicons::default();
        lex.hard_effort.push("  ".to_string());
        let err = validate_lexicons(&lex).unwrap_err();
        assert!(err.to_string().contains("empty term"));
    }

    #[test]
    fn validate_rejects_uppercase_term() {
        let mut lex = Lexicons::default();
        lex.medium_priority_issues.push("Improve".to_string());
        let err = validate_lexicons(&lex).unwrap_err();
        assert!(err.to_string().contains("non-lowercase"));
    }

    #[test]
    fn load_lexicons_from_real_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("lexicons.yaml");
        assert!(
            path.exists(),
            "lexicons.yaml missing at {path:?} — required for this test"
        );
        let result = load_lexicons(&path);
        assert!(result.is_ok(), "failed to load lexicons.yaml: {result:?}");
    }
}
