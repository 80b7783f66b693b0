//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::fhir::{FhirClient, FhirConfig};
use crate::interactions::{InteractionChecker, StaticChecker};
use crate::storage::MedicationStore;
use crate::users::SessionManager;
use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use std::time::Instant;

/// Source of "now" for dose status; tests pin it
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Per-user medication and check-off storage
    pub store: Arc<MedicationStore>,
    /// Logged-in sessions
    pub sessions: Arc<SessionManager>,
    /// Drug interaction checker
    pub checker: Arc<dyn InteractionChecker>,
    /// FHIR server client
    pub fhir: Arc<FhirClient>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    clock: Clock,
}

impl AppState {
    /// Create state with the built-in interaction table and default FHIR server
    pub fn new(store: Arc<MedicationStore>, sessions: Arc<SessionManager>, config: ApiConfig) -> Self {
        Self {
            store,
            sessions,
            checker: Arc::new(StaticChecker::new()),
            fhir: Arc::new(FhirClient::new(FhirConfig::default())),
            config: Arc::new(config),
            start_time: Instant::now(),
            clock: Arc::new(|| Local::now().naive_local()),
        }
    }

    /// Builder method: use a different interaction checker
    pub fn with_checker(mut self, checker: Arc<dyn InteractionChecker>) -> Self {
        self.checker = checker;
        self
    }

    /// Builder method: use a different FHIR client
    pub fn with_fhir(mut self, fhir: Arc<FhirClient>) -> Self {
        self.fhir = fhir;
        self
    }

    /// Builder method: replace the wall clock
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Current local date and time
    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
    /// Seed the demo regimen for users with no medications at login
    pub seed_demo_medications: bool,
    /// Reset the shared FHIR patient at login
    pub fhir_sync_on_login: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8082,
            request_timeout_ms: 30_000,
            max_body_size: 2 * 1024 * 1024, // 2MB
            cors_origins: Vec::new(),
            seed_demo_medications: true,
            fhir_sync_on_login: false,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Build from the file/env configuration
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            host: config.api.host.clone(),
            port: config.api.port,
            request_timeout_ms: config.api.request_timeout_secs * 1000,
            cors_origins: config.api.cors_origins.clone(),
            seed_demo_medications: config.users.seed_demo_medications,
            fhir_sync_on_login: config.fhir.sync_on_login,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
