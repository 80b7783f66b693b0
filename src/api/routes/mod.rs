//! API Routes
//!
//! Route handlers organized by functionality.

pub mod auth;
pub mod calendar;
pub mod doses;
pub mod fhir;
pub mod health;
pub mod interactions;
pub mod medications;

use chrono::NaiveDate;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::schedule::parse_date;

/// Parse an optional `YYYY-MM-DD` parameter, defaulting to today
pub(crate) fn date_or_today(state: &AppState, raw: Option<&str>) -> ApiResult<NaiveDate> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => Ok(parse_date(s)?),
        None => Ok(state.now().date()),
    }
}
