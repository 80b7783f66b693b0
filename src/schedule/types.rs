//! Core medication types
//!
//! This module defines the records a user keeps about their regimen:
//! - `Medication`: A stored, validated medication record
//! - `MedicationDraft`: Raw form input that validates into a `Medication`
//! - `Frequency` and `DosageForm`: Classification enums

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::error::{ScheduleError, ScheduleResult};
use super::time::DoseTime;

/// Identifier of a medication, unique within one user's list
pub type MedicationId = u64;

/// How often a medication is taken
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Frequency {
    #[serde(rename = "Once daily", alias = "once_daily")]
    OnceDaily,
    #[serde(rename = "Twice daily", alias = "twice_daily")]
    TwiceDaily,
    #[serde(rename = "Three times daily", alias = "three_times_daily")]
    ThreeTimesDaily,
    #[serde(rename = "Four times daily", alias = "four_times_daily")]
    FourTimesDaily,
    #[serde(rename = "Weekly", alias = "weekly")]
    Weekly,
    #[serde(rename = "As needed", alias = "as_needed")]
    AsNeeded,
}

impl Frequency {
    /// Get all frequencies in form order
    pub fn all() -> &'static [Frequency] {
        &[
            Frequency::OnceDaily,
            Frequency::TwiceDaily,
            Frequency::ThreeTimesDaily,
            Frequency::FourTimesDaily,
            Frequency::Weekly,
            Frequency::AsNeeded,
        ]
    }

    /// Human-readable label, also the serialized form
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::OnceDaily => "Once daily",
            Frequency::TwiceDaily => "Twice daily",
            Frequency::ThreeTimesDaily => "Three times daily",
            Frequency::FourTimesDaily => "Four times daily",
            Frequency::Weekly => "Weekly",
            Frequency::AsNeeded => "As needed",
        }
    }

    /// Number of time-of-day inputs the add form shows for this frequency
    pub fn slots(&self) -> usize {
        match self {
            Frequency::OnceDaily => 1,
            Frequency::TwiceDaily => 2,
            Frequency::ThreeTimesDaily => 3,
            Frequency::FourTimesDaily => 4,
            Frequency::Weekly | Frequency::AsNeeded => 0,
        }
    }

    /// True for the every-day frequencies
    pub fn is_daily(&self) -> bool {
        self.slots() > 0
    }

    /// Parse a label case-insensitively; snake_case names are accepted too
    pub fn parse(s: &str) -> ScheduleResult<Self> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        Frequency::all()
            .iter()
            .copied()
            .find(|f| f.label().to_lowercase() == normalized)
            .ok_or_else(|| ScheduleError::UnknownFrequency(s.to_string()))
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::OnceDaily
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Physical form of a medication
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DosageForm {
    Tablet,
    Capsule,
    Liquid,
    Injection,
    Topical,
    Inhaler,
    Drops,
    /// Free-text form entered by the user
    Other(String),
}

impl DosageForm {
    pub fn as_str(&self) -> &str {
        match self {
            DosageForm::Tablet => "tablet",
            DosageForm::Capsule => "capsule",
            DosageForm::Liquid => "liquid",
            DosageForm::Injection => "injection",
            DosageForm::Topical => "topical",
            DosageForm::Inhaler => "inhaler",
            DosageForm::Drops => "drops",
            DosageForm::Other(s) => s,
        }
    }
}

impl Default for DosageForm {
    fn default() -> Self {
        DosageForm::Tablet
    }
}

impl From<String> for DosageForm {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "tablet" | "tablets" | "pill" => DosageForm::Tablet,
            "capsule" | "capsules" => DosageForm::Capsule,
            "liquid" | "syrup" | "solution" => DosageForm::Liquid,
            "injection" => DosageForm::Injection,
            "topical" | "cream" | "ointment" => DosageForm::Topical,
            "inhaler" => DosageForm::Inhaler,
            "drops" => DosageForm::Drops,
            _ => DosageForm::Other(s.trim().to_string()),
        }
    }
}

impl From<DosageForm> for String {
    fn from(form: DosageForm) -> Self {
        form.as_str().to_string()
    }
}

impl std::fmt::Display for DosageForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored medication record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    /// Unique identifier within the owner's list
    pub id: MedicationId,
    /// Drug name as the user knows it (e.g., "Tylenol")
    pub name: String,
    /// Amount per dose
    pub dosage_amount: f64,
    /// Unit of the amount (e.g., "mg", "ml")
    pub dosage_unit: String,
    #[serde(default)]
    pub form: DosageForm,
    /// Why the medication is taken
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub frequency: Frequency,
    /// Times of day, sorted and unique
    #[serde(default)]
    pub times: Vec<DoseTime>,
    /// Weekdays the medication is taken on, Monday first; empty means
    /// every day the frequency allows
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days: Vec<Weekday>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub no_end_date: bool,
    #[serde(default)]
    pub notes: Option<String>,
    /// When the prescription needs refilling
    #[serde(default)]
    pub refill_date: Option<NaiveDate>,
}

impl Medication {
    /// Last day of the regimen, if it has one
    pub fn effective_end(&self) -> Option<NaiveDate> {
        if self.no_end_date {
            None
        } else {
            self.end_date
        }
    }

    /// Check whether the regimen covers `date`
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        if date < self.start_date {
            return false;
        }
        match self.effective_end() {
            Some(end) => date <= end,
            None => true,
        }
    }

    /// Check whether a dose falls due on `date`
    ///
    /// A weekday list restricts any scheduled frequency to those days.
    /// Without one, daily frequencies are due every active day and weekly
    /// ones on the start date's weekday. As-needed ones are never due.
    pub fn is_scheduled_on(&self, date: NaiveDate) -> bool {
        if !self.is_active_on(date) {
            return false;
        }
        if self.frequency == Frequency::AsNeeded {
            return false;
        }
        if !self.days.is_empty() {
            return self.days.contains(&date.weekday());
        }
        match self.frequency {
            Frequency::Weekly => date.weekday() == self.start_date.weekday(),
            _ => true,
        }
    }

    /// Key identifying one dose of this medication within a day
    pub fn dose_key(&self, time: Option<DoseTime>) -> String {
        match time {
            Some(t) => format!("{}@{}", self.id, t.to_24h()),
            None => self.id.to_string(),
        }
    }
}

/// Unvalidated medication input, as submitted by the add/edit form
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MedicationDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dosage_amount: Option<f64>,
    #[serde(default)]
    pub dosage_unit: String,
    #[serde(default)]
    pub form: Option<DosageForm>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub frequency: Option<Frequency>,
    /// Raw time strings; blanks are ignored
    #[serde(default)]
    pub times: Vec<String>,
    /// Weekday names (`mon`, `Wednesday`, ...)
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub no_end_date: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub refill_date: Option<String>,
}

impl MedicationDraft {
    /// Create a draft with the required fields filled in
    pub fn new(
        name: impl Into<String>,
        dosage_amount: f64,
        dosage_unit: impl Into<String>,
        start_date: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            dosage_amount: Some(dosage_amount),
            dosage_unit: dosage_unit.into(),
            start_date: Some(start_date.into()),
            ..Default::default()
        }
    }

    /// Builder method: set frequency
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    /// Builder method: add a time of day
    pub fn time(mut self, time: impl Into<String>) -> Self {
        self.times.push(time.into());
        self
    }

    /// Builder method: add a weekday
    pub fn day(mut self, day: impl Into<String>) -> Self {
        self.days.push(day.into());
        self
    }

    /// Builder method: set end date
    pub fn end_date(mut self, date: impl Into<String>) -> Self {
        self.end_date = Some(date.into());
        self
    }

    /// Builder method: set notes
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Builder method: set reason
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Builder method: set refill date
    pub fn refill_date(mut self, date: impl Into<String>) -> Self {
        self.refill_date = Some(date.into());
        self
    }

    /// Validate the draft and turn it into a record with the given id
    pub fn validate(self, id: MedicationId) -> ScheduleResult<Medication> {
        let name = self.name.trim().to_string();
        let dosage_unit = self.dosage_unit.trim().to_string();
        let dosage_amount = self
            .dosage_amount
            .filter(|a| a.is_finite() && *a > 0.0);
        let start_raw = self
            .start_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let (dosage_amount, start_raw) = match (dosage_amount, start_raw) {
            (Some(amount), Some(start)) if !name.is_empty() && !dosage_unit.is_empty() => {
                (amount, start)
            }
            _ => {
                return Err(ScheduleError::Validation(
                    "Please fill in all required fields (Name, Dosage, Start Date)".to_string(),
                ))
            }
        };

        let start_date = parse_date(start_raw)?;
        let end_date = if self.no_end_date {
            None
        } else {
            parse_optional_date(self.end_date.as_deref())?
        };

        if let Some(end) = end_date {
            if start_date > end {
                return Err(ScheduleError::Validation(
                    "Please ensure the Start Date is prior to the End Date".to_string(),
                ));
            }
        }

        let frequency = self.frequency.unwrap_or_default();
        let mut times = if frequency == Frequency::AsNeeded {
            Vec::new()
        } else {
            self.times
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(DoseTime::parse)
                .collect::<ScheduleResult<Vec<_>>>()?
        };
        times.sort();
        times.dedup();

        let mut days = if frequency == Frequency::AsNeeded {
            Vec::new()
        } else {
            self.days
                .iter()
                .map(|d| d.trim())
                .filter(|d| !d.is_empty())
                .map(parse_weekday)
                .collect::<ScheduleResult<Vec<_>>>()?
        };
        days.sort_by_key(|d| d.num_days_from_monday());
        days.dedup();

        Ok(Medication {
            id,
            name,
            dosage_amount,
            dosage_unit,
            form: self.form.unwrap_or_default(),
            reason: self.reason.map(|r| r.trim().to_string()).unwrap_or_default(),
            frequency,
            times,
            days,
            start_date,
            end_date,
            no_end_date: self.no_end_date,
            notes: self
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            refill_date: parse_optional_date(self.refill_date.as_deref())?,
        })
    }
}

impl From<&Medication> for MedicationDraft {
    fn from(med: &Medication) -> Self {
        Self {
            name: med.name.clone(),
            dosage_amount: Some(med.dosage_amount),
            dosage_unit: med.dosage_unit.clone(),
            form: Some(med.form.clone()),
            reason: Some(med.reason.clone()),
            frequency: Some(med.frequency),
            times: med.times.iter().map(|t| t.to_24h()).collect(),
            days: med.days.iter().map(|d| d.to_string()).collect(),
            start_date: Some(med.start_date.to_string()),
            end_date: med.end_date.map(|d| d.to_string()),
            no_end_date: med.no_end_date,
            notes: med.notes.clone(),
            refill_date: med.refill_date.map(|d| d.to_string()),
        }
    }
}

/// Parse a weekday name: `mon`, `Monday`, `WED`
pub fn parse_weekday(s: &str) -> ScheduleResult<Weekday> {
    s.trim()
        .parse::<Weekday>()
        .map_err(|_| ScheduleError::UnknownWeekday(s.to_string()))
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> ScheduleResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ScheduleError::InvalidDate(s.to_string()))
}

/// Parse an optional date, treating blank strings as absent
fn parse_optional_date(s: Option<&str>) -> ScheduleResult<Option<NaiveDate>> {
    match s.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_date(raw).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn tylenol() -> Medication {
        MedicationDraft::new("Tylenol", 650.0, "mg", "2025-01-01")
            .frequency(Frequency::TwiceDaily)
            .time("20:00")
            .time("08:00")
            .end_date("2025-12-31")
            .notes("Do not exceed 4 doses per day.")
            .validate(1)
            .unwrap()
    }

    #[test]
    fn test_frequency_parse_and_slots() {
        assert_eq!(Frequency::parse("twice daily").unwrap(), Frequency::TwiceDaily);
        assert_eq!(Frequency::parse("AS_NEEDED").unwrap(), Frequency::AsNeeded);
        assert!(Frequency::parse("hourly").is_err());

        assert_eq!(Frequency::FourTimesDaily.slots(), 4);
        assert_eq!(Frequency::Weekly.slots(), 0);
        assert!(!Frequency::AsNeeded.is_daily());
    }

    #[test]
    fn test_frequency_serializes_as_label() {
        let json = serde_json::to_string(&Frequency::ThreeTimesDaily).unwrap();
        assert_eq!(json, "\"Three times daily\"");
        let back: Frequency = serde_json::from_str("\"as_needed\"").unwrap();
        assert_eq!(back, Frequency::AsNeeded);
    }

    #[test]
    fn test_dosage_form_round_trip_other() {
        let form: DosageForm = serde_json::from_str("\"Patch\"").unwrap();
        assert_eq!(form, DosageForm::Other("Patch".to_string()));
        let form: DosageForm = serde_json::from_str("\"Capsule\"").unwrap();
        assert_eq!(form, DosageForm::Capsule);
        assert_eq!(serde_json::to_string(&form).unwrap(), "\"capsule\"");
    }

    #[test]
    fn test_validate_sorts_and_filters_times() {
        let med = MedicationDraft::new("Metformin", 500.0, "mg", "2025-01-01")
            .frequency(Frequency::ThreeTimesDaily)
            .time("8:00 PM")
            .time("")
            .time("08:00")
            .time("20:00")
            .validate(7)
            .unwrap();

        let times: Vec<String> = med.times.iter().map(|t| t.to_24h()).collect();
        assert_eq!(times, vec!["08:00", "20:00"]);
        assert_eq!(med.id, 7);
        assert_eq!(med.form, DosageForm::Tablet);
    }

    #[test]
    fn test_validate_required_fields() {
        let missing_dose = MedicationDraft {
            name: "Zyrtec".to_string(),
            dosage_unit: "mg".to_string(),
            start_date: Some("2025-04-15".to_string()),
            ..Default::default()
        };
        let err = missing_dose.validate(1).unwrap_err();
        assert!(err.to_string().contains("required fields"));

        let blank_name = MedicationDraft::new("   ", 10.0, "mg", "2025-04-15");
        assert!(blank_name.validate(1).is_err());

        let zero_dose = MedicationDraft::new("Zyrtec", 0.0, "mg", "2025-04-15");
        assert!(zero_dose.validate(1).is_err());
    }

    #[test]
    fn test_validate_date_order() {
        let err = MedicationDraft::new("Zyrtec", 10.0, "mg", "2025-10-15")
            .end_date("2025-04-15")
            .validate(1)
            .unwrap_err();
        assert!(err.to_string().contains("prior to the End Date"));

        // Same-day regimens are fine
        assert!(MedicationDraft::new("Zyrtec", 10.0, "mg", "2025-04-15")
            .end_date("2025-04-15")
            .validate(1)
            .is_ok());
    }

    #[test]
    fn test_no_end_date_clears_end() {
        let mut draft = MedicationDraft::new("Advil", 400.0, "mg", "2024-06-24")
            .frequency(Frequency::AsNeeded)
            .time("09:00")
            .end_date("2024-01-01");
        draft.no_end_date = true;

        let med = draft.validate(3).unwrap();
        assert_eq!(med.end_date, None);
        assert!(med.times.is_empty());
        assert!(med.is_active_on(date("2030-01-01")));
    }

    #[test]
    fn test_is_active_on_bounds() {
        let med = tylenol();
        assert!(!med.is_active_on(date("2024-12-31")));
        assert!(med.is_active_on(date("2025-01-01")));
        assert!(med.is_active_on(date("2025-12-31")));
        assert!(!med.is_active_on(date("2026-01-01")));
    }

    #[test]
    fn test_weekly_schedule_follows_start_weekday() {
        // 2025-01-06 is a Monday
        let med = MedicationDraft::new("Methotrexate", 2.5, "mg", "2025-01-06")
            .frequency(Frequency::Weekly)
            .validate(9)
            .unwrap();

        assert!(med.is_scheduled_on(date("2025-01-13")));
        assert!(!med.is_scheduled_on(date("2025-01-14")));
    }

    #[test]
    fn test_specific_weekdays() {
        // 2025-01-06 is a Monday
        let med = MedicationDraft::new("Prednisone", 5.0, "mg", "2025-01-06")
            .time("08:00")
            .day("fri")
            .day("Monday")
            .day("WED")
            .day("mon")
            .validate(4)
            .unwrap();

        assert_eq!(med.days, vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]);
        assert!(med.is_scheduled_on(date("2025-01-06")));
        assert!(!med.is_scheduled_on(date("2025-01-07")));
        assert!(med.is_scheduled_on(date("2025-01-08")));
        assert!(med.is_scheduled_on(date("2025-01-10")));
        assert!(!med.is_scheduled_on(date("2025-01-11")));

        // A weekday list overrides the start weekday for weekly regimens
        let weekly = MedicationDraft::new("Methotrexate", 2.5, "mg", "2025-01-06")
            .frequency(Frequency::Weekly)
            .day("sat")
            .validate(5)
            .unwrap();
        assert!(!weekly.is_scheduled_on(date("2025-01-13")));
        assert!(weekly.is_scheduled_on(date("2025-01-11")));

        let err = MedicationDraft::new("Prednisone", 5.0, "mg", "2025-01-06")
            .day("someday")
            .validate(6)
            .unwrap_err();
        assert_eq!(err, ScheduleError::UnknownWeekday("someday".to_string()));
    }

    #[test]
    fn test_weekdays_serialize() {
        let med = MedicationDraft::new("Prednisone", 5.0, "mg", "2025-01-06")
            .day("wed")
            .validate(4)
            .unwrap();
        let json = serde_json::to_value(&med).unwrap();
        assert_eq!(json["days"], serde_json::json!(["Wed"]));

        let back: Medication = serde_json::from_value(json).unwrap();
        assert_eq!(back.days, vec![Weekday::Wed]);

        // Records written before weekdays existed still load
        let plain = serde_json::to_value(tylenol()).unwrap();
        assert!(plain.get("days").is_none());
        let back: Medication = serde_json::from_value(plain).unwrap();
        assert!(back.days.is_empty());
    }

    #[test]
    fn test_dose_key() {
        let med = tylenol();
        assert_eq!(med.dose_key(Some(DoseTime::new(8, 0).unwrap())), "1@08:00");
        assert_eq!(med.dose_key(None), "1");
    }

    #[test]
    fn test_draft_from_medication() {
        let med = tylenol();
        let draft = MedicationDraft::from(&med);
        assert_eq!(draft.validate(med.id).unwrap(), med);
    }
}
