//! HTTP API Client
//!
//! Functions for communicating with the MedHere REST API. Every call returns
//! the server's error message as the `Err` string.

use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::state::global::{Dose, DoseSummary, Medication, User};

/// Default API base URL
pub const DEFAULT_API_BASE: &str = "http://localhost:8082/api";

/// Get the API base URL from local storage or use default
pub fn get_api_base() -> String {
    let url = web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .and_then(|s| s.get_item("medhere_api_url").ok().flatten())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    // Normalize: remove trailing slash
    url.trim_end_matches('/').to_string()
}

// ============ Response Types ============

#[derive(Debug, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    #[serde(default)]
    pub seeded: usize,
}

#[derive(Debug, Deserialize)]
pub struct MedicationListResponse {
    pub medications: Vec<Medication>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoseDay {
    pub date: String,
    pub doses: Vec<Dose>,
    pub summary: DoseSummary,
}

#[derive(Debug, Deserialize)]
pub struct RefillResponse {
    pub medications: Vec<Medication>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarDay {
    pub date: String,
    pub weekday: String,
    pub is_today: bool,
    pub doses: Vec<Dose>,
    pub summary: DoseSummary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LegendEntry {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarPage {
    pub view: String,
    pub title: String,
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
    pub previous: String,
    pub next: String,
    pub legend: Vec<LegendEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    pub drugs: Vec<String>,
    pub severity: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionResponse {
    pub interactions: Vec<Interaction>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Form input for a new medication
#[derive(Debug, Clone, Default, Serialize)]
pub struct MedicationDraft {
    pub name: String,
    pub dosage_amount: Option<f64>,
    pub dosage_unit: String,
    pub form: String,
    pub reason: String,
    pub frequency: String,
    pub times: Vec<String>,
    pub days: Vec<String>,
    pub start_date: String,
    pub end_date: Option<String>,
    pub no_end_date: bool,
    pub notes: Option<String>,
    pub refill_date: Option<String>,
}

// ============ Helpers ============

fn url(path: &str) -> String {
    format!("{}{}", get_api_base(), path)
}

fn authed(builder: RequestBuilder, token: &str) -> RequestBuilder {
    builder.header("Authorization", &format!("Bearer {}", token))
}

async fn read<T: DeserializeOwned>(response: Response) -> Result<T, String> {
    if !response.ok() {
        let status = response.status();
        return Err(match response.json::<ErrorBody>().await {
            Ok(body) => body.error.message,
            Err(_) => format!("Request failed ({})", status),
        });
    }

    response.json().await.map_err(|e| format!("Parse error: {}", e))
}

async fn get<T: DeserializeOwned>(path: &str, token: &str) -> Result<T, String> {
    let response = authed(Request::get(&url(path)), token)
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;
    read(response).await
}

async fn send_json<T: DeserializeOwned, B: Serialize>(
    builder: RequestBuilder,
    body: &B,
) -> Result<T, String> {
    let response = builder
        .json(body)
        .map_err(|e| format!("Request build error: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;
    read(response).await
}

fn date_query(date: Option<&str>) -> String {
    date.map(|d| format!("?date={}", urlencoding::encode(d)))
        .unwrap_or_default()
}

// ============ API Functions ============

/// Fetch the users shown on the login screen
pub async fn fetch_users() -> Result<Vec<User>, String> {
    let response = Request::get(&url("/users"))
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;
    let result: UserListResponse = read(response).await?;
    Ok(result.users)
}

/// Log in
pub async fn login(user_id: &str, password: &str) -> Result<LoginResponse, String> {
    send_json(
        Request::post(&url("/auth/login")),
        &serde_json::json!({"user_id": user_id, "password": password}),
    )
    .await
}

/// Log out; failures are ignored since the local session is dropped anyway
pub async fn logout(token: &str) {
    let _ = authed(Request::post(&url("/auth/logout")), token).send().await;
}

/// Fetch the user's medications
pub async fn fetch_medications(token: &str) -> Result<Vec<Medication>, String> {
    let result: MedicationListResponse = get("/medications", token).await?;
    Ok(result.medications)
}

/// Add a medication
pub async fn create_medication(token: &str, draft: &MedicationDraft) -> Result<Medication, String> {
    send_json(authed(Request::post(&url("/medications")), token), draft).await
}

/// Delete a medication
pub async fn delete_medication(token: &str, id: u64) -> Result<(), String> {
    let response = authed(Request::delete(&url(&format!("/medications/{}", id))), token)
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;
    read::<serde_json::Value>(response).await.map(|_| ())
}

/// Fetch the doses due on a day (today when `date` is None)
pub async fn fetch_doses(token: &str, date: Option<&str>) -> Result<DoseDay, String> {
    get(&format!("/doses{}", date_query(date)), token).await
}

/// Flip one dose
pub async fn toggle_dose(token: &str, date: &str, key: &str) -> Result<(), String> {
    send_json::<serde_json::Value, _>(
        authed(Request::post(&url("/doses/toggle")), token),
        &serde_json::json!({"date": date, "key": key}),
    )
    .await
    .map(|_| ())
}

/// Mark every scheduled dose of a day taken
pub async fn mark_all(token: &str, date: &str) -> Result<DoseDay, String> {
    send_json(
        authed(Request::post(&url("/doses/mark-all")), token),
        &serde_json::json!({"date": date}),
    )
    .await
}

/// Unmark every dose of a day
pub async fn clear_day(token: &str, date: &str) -> Result<DoseDay, String> {
    send_json(
        authed(Request::post(&url("/doses/clear")), token),
        &serde_json::json!({"date": date}),
    )
    .await
}

/// Medications with a refill coming up
pub async fn fetch_refills(token: &str) -> Result<Vec<Medication>, String> {
    let result: RefillResponse = get("/refills", token).await?;
    Ok(result.medications)
}

/// Fetch a calendar page
pub async fn fetch_calendar(token: &str, view: &str, date: Option<&str>) -> Result<CalendarPage, String> {
    let mut path = format!("/calendar?view={}", urlencoding::encode(view));
    if let Some(d) = date {
        path.push_str(&format!("&date={}", urlencoding::encode(d)));
    }
    get(&path, token).await
}

/// Check the user's own medication list for interactions
pub async fn check_interactions(token: &str) -> Result<Vec<Interaction>, String> {
    let result: InteractionResponse = get("/medications/interactions", token).await?;
    Ok(result.interactions)
}
