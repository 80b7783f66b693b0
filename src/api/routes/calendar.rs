//! Calendar Routes
//!
//! - GET /api/calendar?view=day|week|month&date=YYYY-MM-DD

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::date_or_today;
use crate::api::auth::AuthUser;
use crate::api::dto::{CalendarQuery, CalendarResponse, LegendEntry};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::schedule::{build_calendar, medication_color, CalendarView};

/// GET /api/calendar
///
/// Defaults to the month containing today. The legend lists each medication
/// that appears on the page with its color.
pub async fn get_calendar(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    query: Result<Query<CalendarQuery>, QueryRejection>,
) -> ApiResult<Json<CalendarResponse>> {
    let Query(query) = query?;

    let view = match query.view.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.parse::<CalendarView>()?,
        None => CalendarView::default(),
    };
    let anchor = date_or_today(&state, query.date.as_deref())?;

    let meds = state.store.list(&auth.user.id).await?;
    let log = state.store.checkoffs(&auth.user.id).await?;
    let page = build_calendar(&meds, view, anchor, &log, state.now());

    let names: BTreeMap<String, String> = page
        .days
        .iter()
        .flat_map(|day| day.doses.iter())
        .map(|dose| (dose.name.to_lowercase(), dose.name.clone()))
        .collect();

    let legend = names
        .into_values()
        .map(|name| LegendEntry {
            color: medication_color(&name).to_string(),
            name,
        })
        .collect();

    Ok(Json(CalendarResponse { page, legend }))
}
