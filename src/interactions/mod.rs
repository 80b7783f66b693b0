//! Drug Interaction Checks
//!
//! Checks a list of drug names for pairwise interactions.
//!
//! ## Checkers
//!
//! - **GeminiChecker**: Asks the Gemini generative-language API for a JSON
//!   interaction report
//! - **StaticChecker**: A small built-in table of well-known pairs, used
//!   when no API key is configured
//!
//! Both sit behind the [`InteractionChecker`] trait. Callers go through
//! [`check_interactions`], which normalizes the list and short-circuits when
//! fewer than two distinct drugs remain.

mod gemini;
mod known;

pub use gemini::{GeminiChecker, GeminiConfig};
pub use known::StaticChecker;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Common trait for interaction checkers
#[async_trait]
pub trait InteractionChecker: Send + Sync {
    /// Short name for logs and health output
    fn name(&self) -> &str;

    /// Check an already-normalized list of at least two drugs
    async fn check(&self, drugs: &[String]) -> Result<InteractionReport, InteractionError>;
}

/// Clinical severity of an interaction
///
/// Parsing is lenient: synonyms like "major" or "minor" are accepted and
/// anything unrecognised becomes `Unknown`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Severity {
    Unknown,
    Low,
    Moderate,
    High,
}

impl From<String> for Severity {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" | "severe" | "major" => Severity::High,
            "moderate" | "medium" => Severity::Moderate,
            "low" | "minor" | "mild" => Severity::Low,
            _ => Severity::Unknown,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::High => write!(f, "High"),
            Severity::Moderate => write!(f, "Moderate"),
            Severity::Low => write!(f, "Low"),
            Severity::Unknown => write!(f, "Unknown"),
        }
    }
}

fn default_severity() -> Severity {
    Severity::Unknown
}

fn default_description() -> String {
    "No description provided.".to_string()
}

/// One interaction between two (or more) drugs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    pub drugs: Vec<String>,
    #[serde(default = "default_severity")]
    pub severity: Severity,
    #[serde(default = "default_description")]
    pub description: String,
}

impl Interaction {
    /// `Drug A and Drug B`
    pub fn drug_pair(&self) -> String {
        if self.drugs.is_empty() {
            "Unknown and Unknown".to_string()
        } else {
            self.drugs.join(" and ")
        }
    }
}

/// Result of an interaction check
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InteractionReport {
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

impl InteractionReport {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// Most severe interaction level in the report
    pub fn highest_severity(&self) -> Option<Severity> {
        self.interactions.iter().map(|i| i.severity).max()
    }

    /// Order interactions from most to least severe
    pub fn sorted(mut self) -> Self {
        self.interactions
            .sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.drugs.cmp(&b.drugs)));
        self
    }
}

/// Errors that can occur while checking interactions
#[derive(Error, Debug)]
pub enum InteractionError {
    #[error("GEMINI_API_KEY environment variable not found.")]
    MissingApiKey,

    #[error("Interaction service unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Rate limited")]
    RateLimited,

    #[error("Failed to get interaction data from the AI model: {0}")]
    InvalidResponse(String),
}

/// Trim names, drop blanks and remove case-insensitive duplicates,
/// keeping the first spelling seen
pub fn normalize_drug_list(drugs: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    drugs
        .iter()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .filter(|d| seen.insert(d.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Normalize `drugs` and run `checker` if at least two distinct drugs remain
pub async fn check_interactions(
    checker: &dyn InteractionChecker,
    drugs: &[String],
) -> Result<InteractionReport, InteractionError> {
    let drugs = normalize_drug_list(drugs);
    if drugs.len() < 2 {
        tracing::debug!(count = drugs.len(), "Not enough drugs to compare");
        return Ok(InteractionReport::empty());
    }

    tracing::info!(checker = checker.name(), count = drugs.len(), "Checking drug interactions");
    let report = checker.check(&drugs).await?.sorted();
    tracing::info!(
        checker = checker.name(),
        interactions = report.interactions.len(),
        "Interaction check complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingChecker {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl InteractionChecker for CountingChecker {
        fn name(&self) -> &str {
            "counting"
        }

        async fn check(&self, drugs: &[String]) -> Result<InteractionReport, InteractionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(InteractionReport {
                interactions: vec![
                    Interaction {
                        drugs: drugs.to_vec(),
                        severity: Severity::Low,
                        description: "low".to_string(),
                    },
                    Interaction {
                        drugs: drugs.to_vec(),
                        severity: Severity::High,
                        description: "high".to_string(),
                    },
                ],
            })
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_drug_list() {
        let drugs = names(&["Tylenol", " tylenol ", "", "Advil", "  "]);
        assert_eq!(normalize_drug_list(&drugs), names(&["Tylenol", "Advil"]));
    }

    #[tokio::test]
    async fn test_fewer_than_two_skips_checker() {
        let checker = CountingChecker {
            calls: AtomicUsize::new(0),
        };
        let report = check_interactions(&checker, &names(&["Advil", "ADVIL"]))
            .await
            .unwrap();
        assert!(report.is_empty());
        assert_eq!(checker.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_report_sorted_by_severity() {
        let checker = CountingChecker {
            calls: AtomicUsize::new(0),
        };
        let report = check_interactions(&checker, &names(&["Advil", "Warfarin"]))
            .await
            .unwrap();
        assert_eq!(report.interactions[0].severity, Severity::High);
        assert_eq!(report.highest_severity(), Some(Severity::High));
        assert_eq!(checker.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_lenient_interaction_parsing() {
        let json = r#"{"interactions": [{"drugs": ["A", "B"], "severity": "catastrophic"}, {"drugs": [], "severity": "Major"}]}"#;
        let report: InteractionReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.interactions[0].severity, Severity::Unknown);
        assert_eq!(report.interactions[1].severity, Severity::High);
        assert_eq!(report.interactions[0].description, "No description provided.");
        assert_eq!(report.interactions[1].drug_pair(), "Unknown and Unknown");
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Moderate.to_string(), "Moderate");
        assert!(Severity::High > Severity::Low);
    }
}
