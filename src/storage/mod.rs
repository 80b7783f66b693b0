//! MedHere Storage
//!
//! This module persists each user's medications and dose check-offs:
//!
//! - **engine**: The medication store (JSON files + in-memory cache + change feed)
//! - **demo**: Starter regimen for demo accounts
//! - **error**: Error types
//!
//! # Layout
//!
//! ```text
//! <data_dir>/users/<user_id>/medications.json
//! <data_dir>/users/<user_id>/checkoffs.json
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use medhere::schedule::MedicationDraft;
//! use medhere::storage::{MedicationStore, StorageConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MedicationStore::open(StorageConfig::new("./data")).await?;
//!
//!     let med = store
//!         .add("alice", MedicationDraft::new("Zyrtec", 10.0, "mg", "2025-04-15").time("08:00"))
//!         .await?;
//!
//!     println!("Stored {} with id {}", med.name, med.id);
//!     Ok(())
//! }
//! ```

pub mod demo;
pub mod engine;
pub mod error;

pub use demo::demo_drafts;
pub use engine::{
    next_id, validate_user_id, ChangeKind, MedicationChange, MedicationStore, StorageConfig,
    StorageStats,
};
pub use error::{StorageError, StorageResult};
