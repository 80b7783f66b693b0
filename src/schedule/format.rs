//! Display formatting for medication records

use chrono::NaiveDate;

use super::types::Medication;

/// `650 mg`, `2.5 ml`
pub fn format_dosage(med: &Medication) -> String {
    format!("{} {}", med.dosage_amount, med.dosage_unit)
}

/// Frequency label, weekdays and 12-hour dose times, if any:
/// `Twice daily (8:00 AM + 8:00 PM)`, `Once daily on Mon, Wed, Fri (8:00 AM)`
pub fn format_frequency(med: &Medication) -> String {
    let mut text = med.frequency.label().to_string();
    if !med.days.is_empty() {
        let days: Vec<String> = med.days.iter().map(|d| d.to_string()).collect();
        text.push_str(" on ");
        text.push_str(&days.join(", "));
    }
    if !med.times.is_empty() {
        let times: Vec<String> = med.times.iter().map(|t| t.to_string()).collect();
        text.push_str(&format!(" ({})", times.join(" + ")));
    }
    text
}

/// `Jan 1, 2025`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Start and end of the regimen: `Jan 1, 2025 - Dec 31, 2025`,
/// `Since Jun 24, 2024` when open-ended
pub fn format_date_range(med: &Medication) -> String {
    match med.effective_end() {
        Some(end) => format!("{} - {}", format_date(med.start_date), format_date(end)),
        None => format!("Since {}", format_date(med.start_date)),
    }
}
