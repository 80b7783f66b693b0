//! Built-in interaction table
//!
//! A short list of well-documented pairs, keyed by generic name. Common brand
//! names are mapped to their generic first.

use super::{Interaction, InteractionChecker, InteractionError, InteractionReport, Severity};
use async_trait::async_trait;

const BRANDS: &[(&str, &str)] = &[
    ("tylenol", "acetaminophen"),
    ("paracetamol", "acetaminophen"),
    ("advil", "ibuprofen"),
    ("motrin", "ibuprofen"),
    ("aleve", "naproxen"),
    ("zyrtec", "cetirizine"),
    ("benadryl", "diphenhydramine"),
    ("coumadin", "warfarin"),
    ("bayer", "aspirin"),
    ("zoloft", "sertraline"),
    ("ultram", "tramadol"),
    ("zocor", "simvastatin"),
    ("biaxin", "clarithromycin"),
    ("prinivil", "lisinopril"),
    ("zestril", "lisinopril"),
];

const PAIRS: &[(&str, &str, Severity, &str)] = &[
    (
        "warfarin",
        "aspirin",
        Severity::High,
        "Aspirin adds to the anticoagulant effect of warfarin and raises the risk of serious bleeding.",
    ),
    (
        "warfarin",
        "ibuprofen",
        Severity::High,
        "NSAIDs increase bleeding risk with warfarin and can irritate the stomach lining.",
    ),
    (
        "warfarin",
        "naproxen",
        Severity::High,
        "NSAIDs increase bleeding risk with warfarin and can irritate the stomach lining.",
    ),
    (
        "warfarin",
        "acetaminophen",
        Severity::Moderate,
        "Regular acetaminophen use can raise INR in patients taking warfarin.",
    ),
    (
        "sertraline",
        "tramadol",
        Severity::High,
        "Combining these can cause serotonin syndrome and lowers the seizure threshold.",
    ),
    (
        "simvastatin",
        "clarithromycin",
        Severity::High,
        "Clarithromycin blocks simvastatin metabolism, raising the risk of muscle damage.",
    ),
    (
        "ibuprofen",
        "aspirin",
        Severity::Moderate,
        "Ibuprofen can blunt the heart-protective effect of low-dose aspirin and adds GI bleeding risk.",
    ),
    (
        "ibuprofen",
        "naproxen",
        Severity::Moderate,
        "Taking two NSAIDs together increases the risk of stomach bleeding and kidney injury.",
    ),
    (
        "lisinopril",
        "ibuprofen",
        Severity::Moderate,
        "NSAIDs can reduce the blood-pressure effect of ACE inhibitors and strain the kidneys.",
    ),
    (
        "cetirizine",
        "diphenhydramine",
        Severity::Low,
        "Two antihistamines together can increase drowsiness.",
    ),
];

fn generic_name(drug: &str) -> String {
    let lower = drug.trim().to_lowercase();
    BRANDS
        .iter()
        .find(|(brand, _)| *brand == lower)
        .map(|(_, generic)| generic.to_string())
        .unwrap_or(lower)
}

fn lookup(a: &str, b: &str) -> Option<(Severity, &'static str)> {
    PAIRS
        .iter()
        .find(|(x, y, _, _)| (*x == a && *y == b) || (*x == b && *y == a))
        .map(|(_, _, severity, description)| (*severity, *description))
}

/// Offline checker backed by a fixed table
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticChecker;

impl StaticChecker {
    pub fn new() -> Self {
        Self
    }

    /// Pairwise scan of `drugs`, reporting names as given
    pub fn scan(&self, drugs: &[String]) -> InteractionReport {
        let generics: Vec<String> = drugs.iter().map(|d| generic_name(d)).collect();
        let mut interactions = Vec::new();

        for i in 0..drugs.len() {
            for j in (i + 1)..drugs.len() {
                if let Some((severity, description)) = lookup(&generics[i], &generics[j]) {
                    interactions.push(Interaction {
                        drugs: vec![drugs[i].clone(), drugs[j].clone()],
                        severity,
                        description: description.to_string(),
                    });
                }
            }
        }

        InteractionReport { interactions }
    }
}

#[async_trait]
impl InteractionChecker for StaticChecker {
    fn name(&self) -> &str {
        "static-table"
    }

    async fn check(&self, drugs: &[String]) -> Result<InteractionReport, InteractionError> {
        Ok(self.scan(drugs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_brand_names_resolve() {
        assert_eq!(generic_name(" Advil "), "ibuprofen");
        assert_eq!(generic_name("Metformin"), "metformin");
    }

    #[test]
    fn test_scan_finds_pair_in_either_order() {
        let report = StaticChecker::new().scan(&names(&["Aspirin", "Coumadin"]));
        assert_eq!(report.interactions.len(), 1);
        assert_eq!(report.interactions[0].drugs, names(&["Aspirin", "Coumadin"]));
        assert_eq!(report.interactions[0].severity, Severity::High);
    }

    #[test]
    fn test_scan_demo_regimen() {
        // Tylenol, Zyrtec and Advil have no table entry between them
        let report = StaticChecker::new().scan(&names(&["Tylenol", "Zyrtec", "Advil"]));
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_checker_trait() {
        let checker = StaticChecker::new();
        let report = crate::interactions::check_interactions(
            &checker,
            &names(&["Warfarin", "Advil", "Aspirin"]),
        )
        .await
        .unwrap();
        assert_eq!(report.interactions.len(), 3);
        assert_eq!(report.interactions[2].severity, Severity::Moderate);
    }
}
