//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::fhir::FhirConfig;
use crate::interactions::GeminiConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub users: UsersConfig,

    #[serde(default)]
    pub interactions: InteractionsConfig,

    #[serde(default)]
    pub fhir: FhirSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Medication store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Buffered change events per WebSocket subscriber
    #[serde(default = "default_feed_capacity")]
    pub feed_capacity: usize,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("medhere").to_string_lossy().to_string())
        .unwrap_or_else(|| "./medhere_data".to_string())
}

fn default_feed_capacity() -> usize {
    256
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            feed_capacity: default_feed_capacity(),
        }
    }
}

impl StorageConfig {
    /// Settings for [`crate::storage::MedicationStore::open`]
    pub fn to_store_config(&self) -> crate::storage::StorageConfig {
        let mut config = crate::storage::StorageConfig::new(&self.data_dir);
        config.feed_capacity = self.feed_capacity;
        config
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![
                "http://localhost:8084".to_string(),
                "http://127.0.0.1:8084".to_string(),
                "http://localhost:4200".to_string(),
            ],
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// User list and session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UsersConfig {
    /// JSON user list; the demo users are used when unset or missing
    pub file: Option<String>,

    /// Session lifetime in hours; 0 keeps sessions until logout
    #[serde(default = "default_session_ttl")]
    pub session_ttl_hours: i64,

    /// Give users with an empty list the demo regimen on login
    #[serde(default = "default_seed_demo")]
    pub seed_demo_medications: bool,
}

fn default_session_ttl() -> i64 {
    24
}

fn default_seed_demo() -> bool {
    true
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            file: None,
            session_ttl_hours: default_session_ttl(),
            seed_demo_medications: default_seed_demo(),
        }
    }
}

impl UsersConfig {
    pub fn session_ttl(&self) -> Option<chrono::Duration> {
        (self.session_ttl_hours > 0).then(|| chrono::Duration::hours(self.session_ttl_hours))
    }
}

/// Interaction checker configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionsConfig {
    /// "gemini", "static", or "auto" (gemini when an API key is set)
    #[serde(default = "default_provider")]
    pub provider: String,

    pub gemini_api_key: Option<String>,

    #[serde(default = "default_gemini_url")]
    pub gemini_base_url: String,

    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    #[serde(default = "default_interaction_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_provider() -> String {
    "auto".to_string()
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_interaction_timeout() -> u64 {
    30000
}

fn default_max_retries() -> u32 {
    3
}

impl Default for InteractionsConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            gemini_api_key: None,
            gemini_base_url: default_gemini_url(),
            gemini_model: default_gemini_model(),
            request_timeout_ms: default_interaction_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl InteractionsConfig {
    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.gemini_api_key.clone().filter(|k| !k.trim().is_empty()),
            base_url: self.gemini_base_url.clone(),
            model: self.gemini_model.clone(),
            request_timeout_ms: self.request_timeout_ms,
            max_retries: self.max_retries,
        }
    }

    /// Whether the Gemini checker should be used
    pub fn use_gemini(&self) -> bool {
        match self.provider.to_lowercase().as_str() {
            "gemini" => true,
            "static" => false,
            _ => self.gemini_config().api_key.is_some(),
        }
    }
}

/// FHIR server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FhirSettings {
    #[serde(default = "default_fhir_url")]
    pub base_url: String,

    #[serde(default = "default_patient_id")]
    pub patient_id: String,

    #[serde(default = "default_fhir_timeout")]
    pub request_timeout_ms: u64,

    /// Reset the shared patient's data on the server when a user logs in
    #[serde(default)]
    pub sync_on_login: bool,
}

fn default_fhir_url() -> String {
    "https://hapi.fhir.org/baseR4".to_string()
}

fn default_patient_id() -> String {
    "group55-sharedpatient".to_string()
}

fn default_fhir_timeout() -> u64 {
    15000
}

impl Default for FhirSettings {
    fn default() -> Self {
        Self {
            base_url: default_fhir_url(),
            patient_id: default_patient_id(),
            request_timeout_ms: default_fhir_timeout(),
            sync_on_login: false,
        }
    }
}

impl FhirSettings {
    pub fn client_config(&self) -> FhirConfig {
        FhirConfig {
            base_url: self.base_url.clone(),
            patient_id: self.patient_id.clone(),
            request_timeout_ms: self.request_timeout_ms,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("medhere").join("config.toml")),
            Some(PathBuf::from("/etc/medhere/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (the environment in production)
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Storage overrides
        if let Some(data_dir) = var("MEDHERE_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        // API overrides
        if let Some(host) = var("MEDHERE_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("MEDHERE_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // User list
        if let Some(file) = var("MEDHERE_USERS_FILE") {
            self.users.file = Some(file);
        }

        // Interaction checker
        if let Some(key) = var("GEMINI_API_KEY") {
            self.interactions.gemini_api_key = Some(key);
        }

        // FHIR server
        if let Some(url) = var("MEDHERE_FHIR_URL") {
            self.fhir.base_url = url;
        }
        if let Some(patient) = var("MEDHERE_PATIENT_ID") {
            self.fhir.patient_id = patient;
        }

        // Logging overrides
        if let Some(level) = var("MEDHERE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("MEDHERE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# MedHere Configuration
#
# Environment variables override these settings:
# - MEDHERE_DATA_DIR
# - MEDHERE_API_HOST
# - MEDHERE_API_PORT
# - MEDHERE_USERS_FILE
# - MEDHERE_FHIR_URL
# - MEDHERE_PATIENT_ID
# - GEMINI_API_KEY
# - MEDHERE_LOG_LEVEL
# - MEDHERE_LOG_FORMAT

[storage]
# Directory holding users/<id>/medications.json and checkoffs.json
data_dir = "~/.local/share/medhere"

# Buffered medication-change events per subscriber
feed_capacity = 256

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8082

# Allowed CORS origins
cors_origins = ["http://localhost:8084", "http://127.0.0.1:8084", "http://localhost:4200"]

# Request timeout in seconds
request_timeout_secs = 30

[users]
# JSON list of users: [{"id": "1", "name": "Alice Johnson"}, ...]
# Demo users are used when unset
# file = "/etc/medhere/users.json"

# Session lifetime in hours (0 = until logout)
session_ttl_hours = 24

# Seed the demo regimen for users with no medications
seed_demo_medications = true

[interactions]
# Checker: auto (Gemini when a key is set), gemini, or static
provider = "auto"

# Gemini API key (or set GEMINI_API_KEY)
# gemini_api_key = ""

gemini_base_url = "https://generativelanguage.googleapis.com"
gemini_model = "gemini-2.0-flash"

# Request timeout (ms) and attempts
request_timeout_ms = 30000
max_retries = 3

[fhir]
# FHIR R4 server
base_url = "https://hapi.fhir.org/baseR4"

# Shared demo patient
patient_id = "group55-sharedpatient"

request_timeout_ms = 15000

# Reset the patient's MedicationRequests on the server at each login
sync_on_login = false

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/medhere/medhere.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.api.port, 8082);
        assert_eq!(config.fhir.patient_id, "group55-sharedpatient");
        assert_eq!(config.interactions.gemini_model, "gemini-2.0-flash");
        assert!(config.users.file.is_none());
        assert_eq!(config.users.session_ttl(), Some(chrono::Duration::hours(24)));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::parse("[api]\nport = 9000\n").unwrap();
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.storage.feed_capacity, 256);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("MEDHERE_DATA_DIR", "/tmp/medhere"),
            ("MEDHERE_API_PORT", "not-a-port"),
            ("MEDHERE_PATIENT_ID", "patient-7"),
            ("GEMINI_API_KEY", "secret"),
            ("MEDHERE_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.storage.data_dir, "/tmp/medhere");
        assert_eq!(config.api.port, 8082);
        assert_eq!(config.fhir.patient_id, "patient-7");
        assert_eq!(config.logging.format, "json");
        assert!(config.interactions.use_gemini());
    }

    #[test]
    fn test_provider_selection() {
        let mut interactions = InteractionsConfig::default();
        assert!(!interactions.use_gemini());

        interactions.gemini_api_key = Some("  ".to_string());
        assert!(!interactions.use_gemini());

        interactions.provider = "gemini".to_string();
        assert!(interactions.use_gemini());

        interactions.gemini_api_key = Some("key".to_string());
        interactions.provider = "static".to_string();
        assert!(!interactions.use_gemini());
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(matches!(Config::load(&path), Err(ConfigError::Io { .. })));

        std::fs::write(&path, "[api\nport = ").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_store_config_conversion() {
        let mut storage = StorageConfig::default();
        storage.data_dir = "/srv/medhere".to_string();
        storage.feed_capacity = 16;

        let store = storage.to_store_config();
        assert_eq!(store.data_dir, PathBuf::from("/srv/medhere"));
        assert_eq!(store.feed_capacity, 16);
    }
}
