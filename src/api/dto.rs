//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::interactions::Interaction;
use crate::schedule::{
    format_date_range, format_dosage, format_frequency, medication_color, CalendarPage,
    DoseSummary, Medication, ScheduledDose,
};
use crate::users::User;

// ============================================
// SERVICE STATUS DTOs
// ============================================

/// Response for `GET /`
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub status: String,
    pub service: String,
}

/// Response for `GET /api/health`
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Name of the configured interaction checker
    pub interaction_checker: String,
    pub active_sessions: usize,
}

// ============================================
// AUTH DTOs
// ============================================

/// Users available on the login screen
#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    /// Demo medications added because the user's list was empty
    pub seeded: usize,
}

/// Logout response
#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub logged_out: bool,
}

// ============================================
// MEDICATION DTOs
// ============================================

/// A medication with its display strings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationView {
    #[serde(flatten)]
    pub medication: Medication,
    /// `650 mg`
    pub dosage_text: String,
    /// `Twice daily (8:00 AM + 8:00 PM)`
    pub frequency_text: String,
    /// `Jan 1, 2025 - Dec 31, 2025`
    pub date_range: String,
    /// Calendar color
    pub color: String,
}

impl From<Medication> for MedicationView {
    fn from(medication: Medication) -> Self {
        Self {
            dosage_text: format_dosage(&medication),
            frequency_text: format_frequency(&medication),
            date_range: format_date_range(&medication),
            color: medication_color(&medication.name).to_string(),
            medication,
        }
    }
}

/// Medication list response
#[derive(Debug, Serialize, Deserialize)]
pub struct MedicationListResponse {
    pub total: usize,
    pub medications: Vec<MedicationView>,
}

impl From<Vec<Medication>> for MedicationListResponse {
    fn from(meds: Vec<Medication>) -> Self {
        let medications: Vec<MedicationView> = meds.into_iter().map(MedicationView::from).collect();
        Self {
            total: medications.len(),
            medications,
        }
    }
}

/// Delete response
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: u64,
    pub name: String,
}

// ============================================
// INTERACTION DTOs
// ============================================

/// `POST /api/check-interactions` body
///
/// `medications` is optional here so its absence can be reported as a 400.
#[derive(Debug, Deserialize)]
pub struct CheckInteractionsRequest {
    pub medications: Option<Vec<String>>,
}

/// Interaction report for the user's own list
#[derive(Debug, Serialize, Deserialize)]
pub struct UserInteractionsResponse {
    pub medications: Vec<String>,
    pub interactions: Vec<Interaction>,
    pub checker: String,
}

// ============================================
// DOSE DTOs
// ============================================

/// `?date=YYYY-MM-DD`, today when absent
#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

/// Doses for one day
#[derive(Debug, Serialize, Deserialize)]
pub struct DoseDayResponse {
    pub date: NaiveDate,
    pub doses: Vec<ScheduledDose>,
    pub summary: DoseSummary,
}

/// Toggle one dose
#[derive(Debug, Deserialize)]
pub struct ToggleDoseRequest {
    #[serde(default)]
    pub date: Option<String>,
    pub key: String,
}

/// New state of a toggled dose
#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleDoseResponse {
    pub date: NaiveDate,
    pub key: String,
    pub taken: bool,
    pub summary: DoseSummary,
}

/// Mark-all / clear request
#[derive(Debug, Default, Deserialize)]
pub struct DayRequest {
    #[serde(default)]
    pub date: Option<String>,
}

// ============================================
// REFILL DTOs
// ============================================

/// `?days=N`
#[derive(Debug, Default, Deserialize)]
pub struct RefillQuery {
    pub days: Option<i64>,
}

/// Medications needing a refill soon
#[derive(Debug, Serialize, Deserialize)]
pub struct RefillResponse {
    pub today: NaiveDate,
    pub window_days: i64,
    pub medications: Vec<MedicationView>,
}

// ============================================
// CALENDAR DTOs
// ============================================

/// `?view=day|week|month&date=YYYY-MM-DD`
#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub view: Option<String>,
    pub date: Option<String>,
}

/// Name/color pair for the calendar legend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegendEntry {
    pub name: String,
    pub color: String,
}

/// A calendar page with its legend
#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarResponse {
    #[serde(flatten)]
    pub page: CalendarPage,
    pub legend: Vec<LegendEntry>,
}

// ============================================
// FHIR DTOs
// ============================================

/// Result of uploading the user's list
#[derive(Debug, Serialize, Deserialize)]
pub struct FhirSyncResponse {
    pub patient_id: String,
    pub uploaded: usize,
    pub status: String,
}

/// A bundle entry that could not be imported
#[derive(Debug, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub name: String,
    pub error: String,
}

/// Result of importing a bundle
#[derive(Debug, Serialize, Deserialize)]
pub struct FhirImportResponse {
    pub imported: Vec<MedicationView>,
    pub skipped: Vec<SkippedEntry>,
}

/// MedicationRequests found on the server
#[derive(Debug, Serialize, Deserialize)]
pub struct FhirMedicationsResponse {
    pub patient_id: String,
    pub names: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{Frequency, MedicationDraft};

    #[test]
    fn test_medication_view_flattens() {
        let med = MedicationDraft::new("Tylenol", 650.0, "mg", "2025-01-01")
            .frequency(Frequency::TwiceDaily)
            .time("08:00")
            .time("20:00")
            .end_date("2025-12-31")
            .validate(1)
            .unwrap();

        let json = serde_json::to_value(MedicationView::from(med)).unwrap();
        assert_eq!(json["name"], "Tylenol");
        assert_eq!(json["dosage_text"], "650 mg");
        assert_eq!(json["frequency_text"], "Twice daily (8:00 AM + 8:00 PM)");
        assert_eq!(json["date_range"], "Jan 1, 2025 - Dec 31, 2025");
    }

    #[test]
    fn test_check_request_missing_key() {
        let req: CheckInteractionsRequest = serde_json::from_str("{}").unwrap();
        assert!(req.medications.is_none());
    }
}
