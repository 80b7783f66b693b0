//! MedHere REST API
//!
//! HTTP API layer for MedHere, built with Axum.
//!
//! # Endpoints
//!
//! Routes marked (auth) need `Authorization: Bearer <token>` from a login.
//!
//! ## Service
//! - `GET /` - Service banner
//! - `GET /api/health` - API status
//! - `GET /health/live`, `GET /health/ready` - Health checks
//!
//! ## Session
//! - `GET /api/users` - Users for the login screen
//! - `POST /api/auth/login` - Log in
//! - `POST /api/auth/logout` - Log out (auth)
//! - `GET /api/auth/me` - Current user (auth)
//!
//! ## Medications (auth)
//! - `GET /api/medications` - List medications
//! - `POST /api/medications` - Add a medication
//! - `GET /api/medications/:id` - Get a medication
//! - `PUT /api/medications/:id` - Replace a medication
//! - `DELETE /api/medications/:id` - Delete a medication
//!
//! ## Dashboard and calendar (auth)
//! - `GET /api/doses?date=` - Doses due on a day
//! - `POST /api/doses/toggle` - Flip one dose
//! - `POST /api/doses/mark-all` - Mark a day's doses taken
//! - `POST /api/doses/clear` - Unmark a day's doses
//! - `GET /api/refills?days=` - Refills coming up
//! - `GET /api/calendar?view=&date=` - Day, week or month page
//!
//! ## Interactions
//! - `POST /api/check-interactions` - Check a posted list of names
//! - `GET /api/medications/interactions` - Check the user's list (auth)
//!
//! ## FHIR (auth)
//! - `POST /api/fhir/sync` - Upload the user's list to the FHIR server
//! - `POST /api/fhir/import` - Add medications from a posted bundle
//! - `GET /api/fhir/medications` - Names stored on the FHIR server
//!
//! ## WebSocket (auth)
//! - `GET /api/ws?token=` - Live medication list
//!
//! # Example
//!
//! ```rust,no_run
//! use medhere::api::{serve, ApiConfig, AppState};
//! use medhere::storage::{MedicationStore, StorageConfig};
//! use medhere::users::{SessionManager, UserDirectory};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MedicationStore::open(StorageConfig::new("./data")).await?);
//!     let sessions = Arc::new(SessionManager::new(UserDirectory::demo(), None));
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(store, sessions, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use auth::AuthUser;
pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState, Clock};

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::websocket::websocket_handler;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    if allowed.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(allowed)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    let api_routes = Router::new()
        // Service status
        .route("/health", get(routes::health::api_health))
        // Session routes
        .route("/users", get(routes::auth::list_users))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/auth/me", get(routes::auth::me))
        // Medication routes
        .route(
            "/medications",
            get(routes::medications::list_medications).post(routes::medications::create_medication),
        )
        .route(
            "/medications/interactions",
            get(routes::interactions::user_interactions),
        )
        .route(
            "/medications/:id",
            get(routes::medications::get_medication)
                .put(routes::medications::update_medication)
                .delete(routes::medications::delete_medication),
        )
        // Dashboard routes
        .route("/doses", get(routes::doses::get_doses))
        .route("/doses/toggle", post(routes::doses::toggle_dose))
        .route("/doses/mark-all", post(routes::doses::mark_all))
        .route("/doses/clear", post(routes::doses::clear_day))
        .route("/refills", get(routes::doses::get_refills))
        // Calendar routes
        .route("/calendar", get(routes::calendar::get_calendar))
        // Interaction routes
        .route(
            "/check-interactions",
            post(routes::interactions::check_interactions),
        )
        // FHIR routes
        .route("/fhir/sync", post(routes::fhir::sync_bundle))
        .route("/fhir/import", post(routes::fhir::import_bundle))
        .route("/fhir/medications", get(routes::fhir::server_medications))
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(TimeoutLayer::new(Duration::from_millis(config.request_timeout_ms)))
        // WebSocket route (outside the timeout)
        .route("/ws", get(websocket_handler));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(routes::health::root))
        .nest("/api", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins))
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("MedHere API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("MedHere API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MedicationStore, StorageConfig};
    use crate::users::{SessionManager, UserDirectory};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use tempfile::tempdir;
    use tower::util::ServiceExt;

    async fn create_test_app() -> (Router, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = Arc::new(MedicationStore::open(StorageConfig::new(dir.path())).await.unwrap());
        let sessions = Arc::new(SessionManager::new(UserDirectory::demo(), None));

        // Saturday 2025-03-01, 09:00
        let now = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();

        let state = AppState::new(store, sessions, ApiConfig::default())
            .with_clock(Arc::new(move || now));
        let router = build_router(state);

        (router, dir)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn login(app: &Router) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"user_id": "1", "password": "pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_service_banners() {
        let (app, _dir) = create_test_app().await;

        let (status, body) = send(&app, "GET", "/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "healthy", "service": "medhere-backend"}));

        let (status, body) = send(&app, "GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["message"], "Backend API is running");
        assert_eq!(body["interaction_checker"], "static-table");

        let (status, _) = send(&app, "GET", "/health/ready", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_check_interactions() {
        let (app, _dir) = create_test_app().await;

        let (status, body) = send(&app, "POST", "/api/check-interactions", None, Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Missing 'medications' in request body");

        let (status, body) = send(
            &app,
            "POST",
            "/api/check-interactions",
            None,
            Some(json!({"medications": ["Advil"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"interactions": []}));

        let (status, body) = send(
            &app,
            "POST",
            "/api/check-interactions",
            None,
            Some(json!({"medications": ["Warfarin", "Aspirin"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["interactions"][0]["severity"], "high");
    }

    #[tokio::test]
    async fn test_check_interactions_invalid_json() {
        let (app, _dir) = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/check-interactions")
                    .header("Content-Type", "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_requires_session() {
        let (app, _dir) = create_test_app().await;

        let (status, body) = send(&app, "GET", "/api/medications", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");

        let (status, _) = send(&app, "GET", "/api/doses", Some("bogus"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_validation() {
        let (app, _dir) = create_test_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"user_id": "1", "password": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Please enter a password");

        let (status, body) = send(&app, "POST", "/api/auth/login", None, Some(json!({"password": "x"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Please select a user");

        let (status, _) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"user_id": "42", "password": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_seeds_and_logout() {
        let (app, _dir) = create_test_app().await;

        let (_, users) = send(&app, "GET", "/api/users", None, None).await;
        assert_eq!(users["users"].as_array().unwrap().len(), 3);

        let token = login(&app).await;

        let (status, me) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["name"], "Alice Johnson");

        let (_, list) = send(&app, "GET", "/api/medications", Some(&token), None).await;
        assert_eq!(list["total"], 3);
        assert_eq!(list["medications"][0]["frequency_text"], "Twice daily (8:00 AM + 8:00 PM)");

        // A second login does not seed again
        let token2 = login(&app).await;
        let (_, list) = send(&app, "GET", "/api/medications", Some(&token2), None).await;
        assert_eq!(list["total"], 3);

        let (status, body) = send(&app, "POST", "/api/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["logged_out"], true);

        let (status, _) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_medication_crud() {
        let (app, _dir) = create_test_app().await;
        let token = login(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/medications",
            Some(&token),
            Some(json!({
                "name": "Lisinopril",
                "dosage_amount": 10,
                "dosage_unit": "mg",
                "frequency": "Once daily",
                "times": ["09:00"],
                "start_date": "2025-03-01",
                "end_date": "2025-02-01"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "Please ensure the Start Date is prior to the End Date"
        );

        let (status, body) = send(
            &app,
            "POST",
            "/api/medications",
            Some(&token),
            Some(json!({"name": "", "dosage_amount": 10, "start_date": "2025-03-01"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "Please fill in all required fields (Name, Dosage, Start Date)"
        );

        let (status, created) = send(
            &app,
            "POST",
            "/api/medications",
            Some(&token),
            Some(json!({
                "name": "Lisinopril",
                "dosage_amount": 10,
                "dosage_unit": "mg",
                "frequency": "Once daily",
                "times": ["9:00 AM"],
                "start_date": "2025-03-01",
                "no_end_date": true
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["times"], json!(["09:00"]));
        let id = created["id"].as_u64().unwrap();

        let (status, fetched) = send(&app, "GET", &format!("/api/medications/{}", id), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["date_range"], "Since Mar 1, 2025");

        let (status, updated) = send(
            &app,
            "PUT",
            &format!("/api/medications/{}", id),
            Some(&token),
            Some(json!({
                "name": "Lisinopril",
                "dosage_amount": 20,
                "dosage_unit": "mg",
                "frequency": "Twice daily",
                "times": ["09:00", "21:00"],
                "start_date": "2025-03-01"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], id);
        assert_eq!(updated["dosage_text"], "20 mg");

        let (status, _) = send(&app, "DELETE", &format!("/api/medications/{}", id), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, "DELETE", &format!("/api/medications/{}", id), Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "MEDICATION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_weekday_medication() {
        let (app, _dir) = create_test_app().await;
        let token = login(&app).await;

        let (status, created) = send(
            &app,
            "POST",
            "/api/medications",
            Some(&token),
            Some(json!({
                "name": "Prednisone",
                "dosage_amount": 5,
                "dosage_unit": "mg",
                "times": ["08:00"],
                "days": ["fri", "mon", "wed"],
                "start_date": "2025-02-01"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["days"], json!(["Mon", "Wed", "Fri"]));
        assert_eq!(created["frequency_text"], "Once daily on Mon, Wed, Fri (8:00 AM)");

        // 2025-03-01 is a Saturday, 2025-03-03 a Monday
        let (_, saturday) = send(&app, "GET", "/api/doses?date=2025-03-01", Some(&token), None).await;
        let has_dose = |day: &Value| {
            day["doses"]
                .as_array()
                .unwrap()
                .iter()
                .any(|d| d["name"] == "Prednisone")
        };
        assert!(!has_dose(&saturday));
        let (_, monday) = send(&app, "GET", "/api/doses?date=2025-03-03", Some(&token), None).await;
        assert!(has_dose(&monday));

        let (status, body) = send(
            &app,
            "POST",
            "/api/medications",
            Some(&token),
            Some(json!({
                "name": "Prednisone",
                "dosage_amount": 5,
                "dosage_unit": "mg",
                "days": ["funday"],
                "start_date": "2025-02-01"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Unknown weekday: funday");
    }

    #[tokio::test]
    async fn test_dashboard_flow() {
        let (app, _dir) = create_test_app().await;
        let token = login(&app).await;

        // Tylenol at 08:00 and 20:00 plus as-needed Advil; Zyrtec starts in April
        let (status, day) = send(&app, "GET", "/api/doses?date=2025-03-01", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(day["summary"]["total"], 3);
        assert_eq!(day["summary"]["missed"], 1);
        assert_eq!(day["summary"]["upcoming"], 1);
        assert_eq!(day["summary"]["as_needed"], 1);
        assert_eq!(day["doses"][0]["status"], "missed");

        let key = day["doses"][0]["key"].as_str().unwrap().to_string();
        let (status, toggled) = send(
            &app,
            "POST",
            "/api/doses/toggle",
            Some(&token),
            Some(json!({"date": "2025-03-01", "key": key})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(toggled["taken"], true);
        assert_eq!(toggled["summary"]["taken"], 1);

        let (_, reread) = send(&app, "GET", "/api/doses?date=2025-03-01", Some(&token), None).await;
        assert_eq!(reread["doses"][0]["taken"], true);
        assert_eq!(reread["summary"]["taken"], 1);

        let (status, _) = send(
            &app,
            "POST",
            "/api/doses/toggle",
            Some(&token),
            Some(json!({"date": "2025-03-01", "key": "999@08:00"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, day) = send(&app, "POST", "/api/doses/mark-all", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(day["summary"]["taken"], 2);
        assert_eq!(day["summary"]["as_needed"], 1);

        let (status, day) = send(
            &app,
            "POST",
            "/api/doses/clear",
            Some(&token),
            Some(json!({"date": "2025-03-01"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(day["summary"]["taken"], 0);
    }

    #[tokio::test]
    async fn test_bad_date_query() {
        let (app, _dir) = create_test_app().await;
        let token = login(&app).await;

        let (status, _) = send(&app, "GET", "/api/doses?date=03/01/2025", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "GET", "/api/calendar?view=year", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_refills_window() {
        let (app, _dir) = create_test_app().await;
        let token = login(&app).await;

        let (status, _) = send(
            &app,
            "POST",
            "/api/medications",
            Some(&token),
            Some(json!({
                "name": "Metformin",
                "dosage_amount": 500,
                "dosage_unit": "mg",
                "times": ["08:00"],
                "start_date": "2025-01-01",
                "refill_date": "2025-03-05"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, refills) = send(&app, "GET", "/api/refills", Some(&token), None).await;
        assert_eq!(refills["window_days"], 7);
        assert_eq!(refills["medications"][0]["name"], "Metformin");

        let (_, refills) = send(&app, "GET", "/api/refills?days=2", Some(&token), None).await;
        assert!(refills["medications"].as_array().unwrap().is_empty());

        let (status, _) = send(&app, "GET", "/api/refills?days=-1", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_calendar_week() {
        let (app, _dir) = create_test_app().await;
        let token = login(&app).await;

        let (status, page) = send(
            &app,
            "GET",
            "/api/calendar?view=week&date=2025-03-05",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["view"], "week");
        assert_eq!(page["start"], "2025-03-02");
        assert_eq!(page["days"].as_array().unwrap().len(), 7);
        assert_eq!(page["previous"], "2025-02-26");

        let legend: Vec<&str> = page["legend"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap())
            .collect();
        assert_eq!(legend, vec!["Advil", "Tylenol"]);
    }

    #[tokio::test]
    async fn test_user_interactions() {
        let (app, _dir) = create_test_app().await;
        let token = login(&app).await;

        let (status, _) = send(
            &app,
            "POST",
            "/api/medications",
            Some(&token),
            Some(json!({
                "name": "Warfarin",
                "dosage_amount": 5,
                "dosage_unit": "mg",
                "times": ["18:00"],
                "start_date": "2025-01-01"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, "GET", "/api/medications/interactions", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checker"], "static-table");
        assert_eq!(body["medications"].as_array().unwrap().len(), 4);

        // Warfarin pairs with both Tylenol (acetaminophen) and Advil (ibuprofen)
        let interactions = body["interactions"].as_array().unwrap();
        assert_eq!(interactions.len(), 2);
        assert_eq!(interactions[0]["severity"], "high");
    }

    #[tokio::test]
    async fn test_fhir_import() {
        let (app, _dir) = create_test_app().await;
        let token = login(&app).await;

        let bundle = json!({
            "resourceType": "Bundle",
            "type": "searchset",
            "entry": [
                {"resource": {
                    "resourceType": "MedicationRequest",
                    "medicationCodeableConcept": {"text": "Sertraline"},
                    "authoredOn": "2025-02-01",
                    "dosageInstruction": [{
                        "timing": {"repeat": {"frequency": 1, "period": 1, "periodUnit": "d", "timeOfDay": ["08:00"]}},
                        "doseAndRate": [{"doseQuantity": {"value": 50, "unit": "mg"}}]
                    }]
                }},
                {"resource": {
                    "resourceType": "MedicationRequest",
                    "medicationCodeableConcept": {"text": "Mystery"}
                }}
            ]
        });

        let (status, body) = send(&app, "POST", "/api/fhir/import", Some(&token), Some(bundle)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["imported"][0]["name"], "Sertraline");
        assert_eq!(body["skipped"][0]["name"], "Mystery");

        let (_, list) = send(&app, "GET", "/api/medications", Some(&token), None).await;
        assert_eq!(list["total"], 4);

        let (status, _) = send(
            &app,
            "POST",
            "/api/fhir/import",
            Some(&token),
            Some(json!({"resourceType": "Patient"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
