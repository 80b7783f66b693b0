//! Interaction Routes
//!
//! - POST /api/check-interactions - Check a posted list of drug names
//! - GET /api/medications/interactions - Check the logged-in user's list

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

use crate::api::auth::AuthUser;
use crate::api::dto::{CheckInteractionsRequest, UserInteractionsResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::interactions::{check_interactions as run_check, normalize_drug_list, InteractionReport};

/// POST /api/check-interactions
///
/// Body: `{"medications": ["Warfarin", "Aspirin"]}`. Fewer than two distinct
/// names return an empty report without calling the checker.
pub async fn check_interactions(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CheckInteractionsRequest>, JsonRejection>,
) -> ApiResult<Json<InteractionReport>> {
    let Json(req) = body?;
    let medications = req
        .medications
        .ok_or_else(|| ApiError::Validation("Missing 'medications' in request body".to_string()))?;

    let report = run_check(state.checker.as_ref(), &medications).await?;
    Ok(Json(report))
}

/// GET /api/medications/interactions
pub async fn user_interactions(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<UserInteractionsResponse>> {
    let names: Vec<String> = state
        .store
        .list(&auth.user.id)
        .await?
        .into_iter()
        .map(|m| m.name)
        .collect();

    let report = run_check(state.checker.as_ref(), &names).await?;

    Ok(Json(UserInteractionsResponse {
        medications: normalize_drug_list(&names),
        interactions: report.interactions,
        checker: state.checker.name().to_string(),
    }))
}
