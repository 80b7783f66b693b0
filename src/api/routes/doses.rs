//! Dose Routes
//!
//! The dashboard's view of one day.
//!
//! - GET /api/doses?date= - Doses due on a day (today by default)
//! - POST /api/doses/toggle - Flip one dose's taken state
//! - POST /api/doses/mark-all - Mark every scheduled dose of a day taken
//! - POST /api/doses/clear - Unmark every dose of a day
//! - GET /api/refills?days= - Medications with a refill date coming up

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Json,
};
use chrono::NaiveDate;
use std::sync::Arc;

use super::date_or_today;
use crate::api::auth::AuthUser;
use crate::api::dto::{
    DateQuery, DayRequest, DoseDayResponse, MedicationView, RefillQuery, RefillResponse,
    ToggleDoseRequest, ToggleDoseResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::schedule::{
    doses_for_day, refills_due, DoseStatus, DoseSummary, ScheduledDose, REFILL_WINDOW_DAYS,
};

async fn day_doses(
    state: &AppState,
    user_id: &str,
    date: NaiveDate,
) -> ApiResult<Vec<ScheduledDose>> {
    let meds = state.store.list(user_id).await?;
    let log = state.store.checkoffs(user_id).await?;
    Ok(doses_for_day(&meds, date, &log, state.now()))
}

async fn day_response(state: &AppState, user_id: &str, date: NaiveDate) -> ApiResult<DoseDayResponse> {
    let doses = day_doses(state, user_id, date).await?;
    Ok(DoseDayResponse {
        date,
        summary: DoseSummary::from_doses(&doses),
        doses,
    })
}

/// GET /api/doses
pub async fn get_doses(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> ApiResult<Json<DoseDayResponse>> {
    let Query(query) = query?;
    let date = date_or_today(&state, query.date.as_deref())?;
    Ok(Json(day_response(&state, &auth.user.id, date).await?))
}

/// POST /api/doses/toggle
///
/// Only keys of doses actually due on the date are accepted.
pub async fn toggle_dose(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    body: Result<Json<ToggleDoseRequest>, JsonRejection>,
) -> ApiResult<Json<ToggleDoseResponse>> {
    let Json(req) = body?;
    let date = date_or_today(&state, req.date.as_deref())?;

    let doses = day_doses(&state, &auth.user.id, date).await?;
    if !doses.iter().any(|d| d.key == req.key) {
        return Err(ApiError::NotFound(format!(
            "No dose '{}' scheduled on {}",
            req.key, date
        )));
    }

    let taken = state.store.toggle_dose(&auth.user.id, date, &req.key).await?;
    let day = day_response(&state, &auth.user.id, date).await?;

    Ok(Json(ToggleDoseResponse {
        date,
        key: req.key,
        taken,
        summary: day.summary,
    }))
}

/// POST /api/doses/mark-all
///
/// As-needed entries are left alone.
pub async fn mark_all(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    body: Option<Json<DayRequest>>,
) -> ApiResult<Json<DoseDayResponse>> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let date = date_or_today(&state, req.date.as_deref())?;

    let keys: Vec<String> = day_doses(&state, &auth.user.id, date)
        .await?
        .into_iter()
        .filter(|d| d.status != DoseStatus::AsNeeded)
        .map(|d| d.key)
        .collect();

    let updated = state
        .store
        .set_doses(&auth.user.id, date, &keys, true)
        .await?;
    tracing::info!(user_id = %auth.user.id, date = %date, updated, "Marked all doses taken");

    Ok(Json(day_response(&state, &auth.user.id, date).await?))
}

/// POST /api/doses/clear
pub async fn clear_day(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    body: Option<Json<DayRequest>>,
) -> ApiResult<Json<DoseDayResponse>> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let date = date_or_today(&state, req.date.as_deref())?;

    let keys: Vec<String> = day_doses(&state, &auth.user.id, date)
        .await?
        .into_iter()
        .map(|d| d.key)
        .collect();

    let updated = state
        .store
        .set_doses(&auth.user.id, date, &keys, false)
        .await?;
    tracing::info!(user_id = %auth.user.id, date = %date, updated, "Cleared doses");

    Ok(Json(day_response(&state, &auth.user.id, date).await?))
}

/// GET /api/refills
pub async fn get_refills(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    query: Result<Query<RefillQuery>, QueryRejection>,
) -> ApiResult<Json<RefillResponse>> {
    let Query(query) = query?;
    let window_days = query.days.unwrap_or(REFILL_WINDOW_DAYS);
    if !(0..=365).contains(&window_days) {
        return Err(ApiError::Validation(
            "days must be between 0 and 365".to_string(),
        ));
    }

    let today = state.now().date();
    let meds = state.store.list(&auth.user.id).await?;
    let medications = refills_due(&meds, today, window_days)
        .into_iter()
        .cloned()
        .map(MedicationView::from)
        .collect();

    Ok(Json(RefillResponse {
        today,
        window_days,
        medications,
    }))
}
