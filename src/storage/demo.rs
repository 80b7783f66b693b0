//! Demo regimen
//!
//! The three medications new demo accounts start with.

use crate::schedule::{DosageForm, Frequency, MedicationDraft};

/// Drafts for Tylenol, Zyrtec and Advil
pub fn demo_drafts() -> Vec<MedicationDraft> {
    let tylenol = MedicationDraft::new("Tylenol", 650.0, "mg", "2025-01-01")
        .frequency(Frequency::TwiceDaily)
        .time("08:00")
        .time("20:00")
        .end_date("2025-12-31")
        .reason("Back pain")
        .notes("Do not exceed 4 doses per day.");

    let zyrtec = MedicationDraft::new("Zyrtec", 10.0, "mg", "2025-04-15")
        .frequency(Frequency::OnceDaily)
        .time("08:00")
        .end_date("2025-10-15")
        .reason("Allergies")
        .notes("May cause drowsiness.");

    let mut advil = MedicationDraft::new("Advil", 400.0, "mg", "2024-06-24")
        .frequency(Frequency::AsNeeded)
        .reason("Migraines")
        .notes("Take at first sign of migraine.");
    advil.no_end_date = true;

    [tylenol, zyrtec, advil]
        .into_iter()
        .map(|mut d| {
            d.form = Some(DosageForm::Tablet);
            d
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_drafts_validate() {
        let meds: Vec<_> = demo_drafts()
            .into_iter()
            .enumerate()
            .map(|(i, d)| d.validate(i as u64 + 1).unwrap())
            .collect();
        assert_eq!(meds.len(), 3);
        assert_eq!(meds[0].times.len(), 2);
        assert!(meds[2].no_end_date);
    }
}
