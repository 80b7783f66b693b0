//! FHIR Interchange
//!
//! Converts between medication records and FHIR R4 resources, and talks to a
//! FHIR server:
//!
//! - **bundle**: MedicationRequest/Patient builders, transaction bundles, and
//!   extraction of names or drafts from bundles
//! - **client**: Upload and search against the server's REST API

mod bundle;
mod client;

pub use bundle::{
    demo_bundle, medication_names, medication_request, medications_from_bundle,
    patient_resource, resource_id,
};
pub use client::{FhirClient, FhirConfig};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from FHIR files and servers
#[derive(Error, Debug)]
pub enum FhirError {
    #[error("Error: The file '{0}' was not found.")]
    FileNotFound(PathBuf),

    #[error("Error: The file '{path}' is not a valid JSON file: {error}")]
    InvalidJson { path: PathBuf, error: String },

    #[error("Invalid FHIR bundle: {0}")]
    InvalidBundle(String),

    #[error("FHIR server unavailable")]
    Unavailable,

    #[error("FHIR request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("FHIR server error {status}: {message}")]
    Server { status: u16, message: String },
}

/// Read a bundle from a JSON file
pub fn read_bundle(path: &Path) -> Result<serde_json::Value, FhirError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => FhirError::FileNotFound(path.to_path_buf()),
        _ => FhirError::InvalidJson {
            path: path.to_path_buf(),
            error: e.to_string(),
        },
    })?;

    serde_json::from_str(&content).map_err(|e| FhirError::InvalidJson {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}
