//! MedHere API Server
//!
//! Run with: cargo run --bin medhere
//!
//! # Configuration
//!
//! Settings come from the first `config.toml` found in the user config
//! directory, `/etc/medhere` or the working directory, with environment
//! overrides applied on top:
//! - `MEDHERE_API_HOST`, `MEDHERE_API_PORT`: Bind address (default: 0.0.0.0:8082)
//! - `MEDHERE_DATA_DIR`: Data directory
//! - `MEDHERE_USERS_FILE`: JSON user list (default: the demo users)
//! - `GEMINI_API_KEY`: Enables the Gemini interaction checker
//! - `MEDHERE_FHIR_URL`, `MEDHERE_PATIENT_ID`: FHIR server and shared patient
//! - `RUST_LOG`: Log filter (default: medhere=info,tower_http=debug)

use anyhow::Context;
use medhere::api::{serve, ApiConfig, AppState};
use medhere::config::Config;
use medhere::fhir::FhirClient;
use medhere::interactions::{GeminiChecker, InteractionChecker, StaticChecker};
use medhere::logging::init_logging;
use medhere::storage::MedicationStore;
use medhere::users::{SessionManager, UserDirectory};
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    init_logging(&config.logging).context("Failed to initialize logging")?;

    tracing::info!("Starting MedHere API server v{}", env!("CARGO_PKG_VERSION"));

    // Initialize storage
    let store_config = config.storage.to_store_config();
    tracing::info!("Data directory: {:?}", store_config.data_dir);
    let store = Arc::new(
        MedicationStore::open(store_config)
            .await
            .context("Failed to open medication store")?,
    );

    // Users and sessions
    let directory = match &config.users.file {
        Some(path) => UserDirectory::load(Path::new(path)).context("Failed to load user list")?,
        None => UserDirectory::demo(),
    };
    tracing::info!("Loaded {} users", directory.all().len());
    let sessions = Arc::new(SessionManager::new(directory, config.users.session_ttl()));

    // Interaction checker
    let checker: Arc<dyn InteractionChecker> = if config.interactions.use_gemini() {
        let gemini = GeminiChecker::new(config.interactions.gemini_config());
        if !gemini.has_api_key() {
            tracing::warn!("Gemini checker selected but GEMINI_API_KEY is not set; checks will fail");
        }
        tracing::info!("Interaction checker: Gemini ({})", gemini.config().model);
        Arc::new(gemini)
    } else {
        tracing::info!("Interaction checker: built-in table (set GEMINI_API_KEY to use Gemini)");
        Arc::new(StaticChecker::new())
    };

    // FHIR server
    let fhir = Arc::new(FhirClient::new(config.fhir.client_config()));
    tracing::info!(
        "FHIR server: {} (patient {})",
        fhir.config().base_url,
        fhir.config().patient_id
    );

    let api_config = ApiConfig::from_config(&config);
    let state = AppState::new(Arc::clone(&store), sessions, api_config.clone())
        .with_checker(checker)
        .with_fhir(fhir);

    // Run server
    serve(state, &api_config).await.context("API server failed")?;

    let stats = store.stats().await;
    tracing::info!("MedHere API server stopped ({})", stats);

    Ok(())
}
