//! Medication Routes
//!
//! CRUD endpoints for the logged-in user's medication list.
//!
//! - GET /api/medications - List medications
//! - POST /api/medications - Add a medication
//! - GET /api/medications/:id - Get one medication
//! - PUT /api/medications/:id - Replace a medication
//! - DELETE /api/medications/:id - Delete a medication and its check-offs

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::auth::AuthUser;
use crate::api::dto::{DeleteResponse, MedicationListResponse, MedicationView};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::schedule::MedicationDraft;

/// GET /api/medications
pub async fn list_medications(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<MedicationListResponse>> {
    let meds = state.store.list(&auth.user.id).await?;
    Ok(Json(meds.into()))
}

/// GET /api/medications/:id
pub async fn get_medication(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<u64>,
) -> ApiResult<Json<MedicationView>> {
    let med = state.store.get(&auth.user.id, id).await?;
    Ok(Json(med.into()))
}

/// POST /api/medications
pub async fn create_medication(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    body: Result<Json<MedicationDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MedicationView>)> {
    let Json(draft) = body?;
    let med = state.store.add(&auth.user.id, draft).await?;
    Ok((StatusCode::CREATED, Json(med.into())))
}

/// PUT /api/medications/:id
pub async fn update_medication(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<u64>,
    body: Result<Json<MedicationDraft>, JsonRejection>,
) -> ApiResult<Json<MedicationView>> {
    let Json(draft) = body?;
    let med = state.store.update(&auth.user.id, id, draft).await?;
    Ok(Json(med.into()))
}

/// DELETE /api/medications/:id
pub async fn delete_medication(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<u64>,
) -> ApiResult<Json<DeleteResponse>> {
    let removed = state.store.remove(&auth.user.id, id).await?;
    Ok(Json(DeleteResponse {
        deleted: true,
        id: removed.id,
        name: removed.name,
    }))
}
