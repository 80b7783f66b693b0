//! # MedHere
//!
//! Medication reminders - a full-stack Rust application that keeps each
//! user's medication list, works out which doses fall due on which days,
//! tracks the doses they check off, and warns about drug interactions.
//!
//! ## Features
//!
//! - **Schedules**: Daily, weekly and as-needed regimens with dose times
//! - **Dashboard**: Today's doses, missed doses and upcoming refills
//! - **Calendar**: Day, week and month pages with per-medication colors
//! - **Interactions**: Gemini-backed checker with an offline fallback table
//! - **FHIR**: Upload and import MedicationRequest bundles
//! - **Real-time**: WebSocket feed of medication list changes
//!
//! ## Modules
//!
//! - [`schedule`]: Medication records, dose times and schedule logic
//! - [`storage`]: Per-user JSON file store
//! - [`users`]: User directory and login sessions
//! - [`interactions`]: Drug interaction checkers
//! - [`fhir`]: FHIR bundles and server client
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use medhere::schedule::{doses_for_day, Frequency, MedicationDraft};
//! use medhere::storage::{MedicationStore, StorageConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MedicationStore::open(StorageConfig::new("./data")).await?;
//!
//!     store
//!         .add(
//!             "alice",
//!             MedicationDraft::new("Tylenol", 650.0, "mg", "2025-01-01")
//!                 .frequency(Frequency::TwiceDaily)
//!                 .time("8:00 AM")
//!                 .time("8:00 PM"),
//!         )
//!         .await?;
//!
//!     let now = chrono::Local::now().naive_local();
//!     let meds = store.list("alice").await?;
//!     let log = store.checkoffs("alice").await?;
//!
//!     for dose in doses_for_day(&meds, now.date(), &log, now) {
//!         println!("{} {} {:?}", dose.name, dose.key, dose.status);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod fhir;
pub mod interactions;
pub mod logging;
pub mod schedule;
pub mod storage;
pub mod users;
pub mod websocket;

// Re-export top-level types for convenience
pub use schedule::{
    build_calendar, doses_for_day, CalendarPage, CalendarView, DoseStatus, DoseTime, Frequency,
    Medication, MedicationDraft, MedicationId, ScheduleError, ScheduledDose,
};

pub use storage::{MedicationStore, StorageConfig, StorageError, StorageResult};

pub use users::{AuthError, Session, SessionManager, User, UserDirectory};

pub use interactions::{
    check_interactions, GeminiChecker, Interaction, InteractionChecker, InteractionError,
    InteractionReport, Severity, StaticChecker,
};

pub use fhir::{FhirClient, FhirConfig, FhirError};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use websocket::{websocket_handler, ClientMessage, ServerMessage};

pub use config::{
    ApiConfig as ConfigApiConfig, Config, ConfigError, LoggingConfig,
    StorageConfig as ConfigStorageConfig,
};
