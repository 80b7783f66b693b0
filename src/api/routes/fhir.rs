//! FHIR Routes
//!
//! - POST /api/fhir/sync - Replace the shared patient's data with the user's list
//! - POST /api/fhir/import - Add medications from a posted bundle
//! - GET /api/fhir/medications - Medication names stored on the server

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::api::auth::AuthUser;
use crate::api::dto::{
    FhirImportResponse, FhirMedicationsResponse, FhirSyncResponse, MedicationView, SkippedEntry,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::fhir::{demo_bundle, medication_names, medications_from_bundle, FhirError};

/// POST /api/fhir/sync
pub async fn sync_bundle(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<FhirSyncResponse>> {
    let meds = state.store.list(&auth.user.id).await?;
    let patient_id = state.fhir.config().patient_id.clone();

    state.fhir.upload_bundle(&demo_bundle(&patient_id, &meds)).await?;
    tracing::info!(user_id = %auth.user.id, patient_id = %patient_id, count = meds.len(), "Synced medications to FHIR server");

    Ok(Json(FhirSyncResponse {
        patient_id,
        uploaded: meds.len(),
        status: "ok".to_string(),
    }))
}

/// POST /api/fhir/import
///
/// Each MedicationRequest is added on its own; entries that fail validation
/// are reported instead of aborting the import.
pub async fn import_bundle(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<FhirImportResponse>> {
    let Json(bundle) = body?;
    if bundle.get("resourceType").and_then(Value::as_str) != Some("Bundle") {
        return Err(FhirError::InvalidBundle("resourceType must be Bundle".to_string()).into());
    }

    let mut imported: Vec<MedicationView> = Vec::new();
    let mut skipped = Vec::new();

    for draft in medications_from_bundle(&bundle) {
        let name = draft.name.clone();
        match state.store.add(&auth.user.id, draft).await {
            Ok(med) => imported.push(med.into()),
            Err(e) => {
                tracing::warn!(user_id = %auth.user.id, name = %name, error = %e, "Skipped bundle entry");
                skipped.push(SkippedEntry {
                    name,
                    error: e.to_string(),
                });
            }
        }
    }

    if imported.is_empty() && skipped.is_empty() {
        return Err(ApiError::Validation(
            "No medication names found in the bundle".to_string(),
        ));
    }

    Ok(Json(FhirImportResponse { imported, skipped }))
}

/// GET /api/fhir/medications
pub async fn server_medications(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
) -> ApiResult<Json<FhirMedicationsResponse>> {
    let patient_id = state.fhir.config().patient_id.clone();
    let bundle = state.fhir.fetch_medication_requests(&patient_id).await?;

    Ok(Json(FhirMedicationsResponse {
        names: medication_names(&bundle),
        patient_id,
    }))
}
