//! Auth Routes
//!
//! Login is permissive: any listed user with a non-empty password.
//!
//! - GET /api/users - Users shown on the login screen
//! - POST /api/auth/login - Start a session
//! - POST /api/auth/logout - End the current session
//! - GET /api/auth/me - The logged-in user

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

use crate::api::auth::AuthUser;
use crate::api::dto::{LoginRequest, LoginResponse, LogoutResponse, UserListResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::fhir::demo_bundle;
use crate::storage::demo_drafts;
use crate::users::User;

/// GET /api/users
pub async fn list_users(State(state): State<Arc<AppState>>) -> Json<UserListResponse> {
    Json(UserListResponse {
        users: state.sessions.directory().all().to_vec(),
    })
}

/// POST /api/auth/login
///
/// Seeds the demo regimen for users with an empty list, and optionally
/// resets the shared FHIR patient in the background.
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = body?;
    let session = state.sessions.login(&req.user_id, &req.password).await?;
    let user_id = session.user.id.clone();

    let seeded = if state.config.seed_demo_medications {
        state.store.seed_if_empty(&user_id, demo_drafts()).await?
    } else {
        0
    };
    if seeded > 0 {
        tracing::info!(user_id = %user_id, seeded, "Seeded demo medications");
    }

    if state.config.fhir_sync_on_login {
        let meds = state.store.list(&user_id).await?;
        let fhir = Arc::clone(&state.fhir);
        tokio::spawn(async move {
            let patient = fhir.config().patient_id.clone();
            match fhir.upload_bundle(&demo_bundle(&patient, &meds)).await {
                Ok(_) => tracing::info!(patient_id = %patient, "Patient bundle reset"),
                Err(e) => tracing::warn!(error = %e, "Error uploading FHIR bundle"),
            }
        });
    }

    Ok(Json(LoginResponse {
        token: session.token,
        user: session.user,
        seeded,
    }))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Json<LogoutResponse> {
    Json(LogoutResponse {
        logged_out: state.sessions.logout(&auth.token).await,
    })
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Json<User> {
    Json(auth.user)
}
