//! FHIR REST client
//!
//! Talks to a FHIR R4 server (the public HAPI test server by default).

use reqwest::Client;
use serde_json::Value;

use super::FhirError;

const FHIR_JSON: &str = "application/fhir+json";

/// Configuration for the FHIR client
#[derive(Debug, Clone)]
pub struct FhirConfig {
    /// Server base URL (e.g., "https://hapi.fhir.org/baseR4")
    pub base_url: String,
    /// Shared patient the demo data is written under
    pub patient_id: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for FhirConfig {
    fn default() -> Self {
        Self {
            base_url: "https://hapi.fhir.org/baseR4".to_string(),
            patient_id: "group55-sharedpatient".to_string(),
            request_timeout_ms: 15000,
        }
    }
}

/// FHIR server client
pub struct FhirClient {
    client: Client,
    config: FhirConfig,
}

impl FhirClient {
    pub fn new(config: FhirConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    pub fn config(&self) -> &FhirConfig {
        &self.config
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn map_send_error(e: reqwest::Error) -> FhirError {
        if e.is_timeout() {
            FhirError::Timeout
        } else if e.is_connect() {
            FhirError::Unavailable
        } else {
            FhirError::Request(e)
        }
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, FhirError> {
        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(FhirError::Request)
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(FhirError::Server {
                status: status.as_u16(),
                message: text,
            })
        }
    }

    /// POST a transaction bundle to the server base, returning the response bundle
    pub async fn upload_bundle(&self, bundle: &Value) -> Result<Value, FhirError> {
        if bundle.get("resourceType").and_then(Value::as_str) != Some("Bundle") {
            return Err(FhirError::InvalidBundle("resourceType must be Bundle".to_string()));
        }

        let entries = bundle
            .get("entry")
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0);
        tracing::info!(base_url = %self.base(), entries, "Uploading FHIR bundle");

        let response = self
            .client
            .post(self.base())
            .header(reqwest::header::CONTENT_TYPE, FHIR_JSON)
            .header(reqwest::header::ACCEPT, FHIR_JSON)
            .body(serde_json::to_vec(bundle).map_err(|e| FhirError::InvalidBundle(e.to_string()))?)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let result = Self::read_json(response).await?;
        tracing::info!(base_url = %self.base(), "FHIR bundle uploaded");
        Ok(result)
    }

    /// Search the server for a patient's MedicationRequests (a searchset bundle)
    pub async fn fetch_medication_requests(&self, patient_id: &str) -> Result<Value, FhirError> {
        let url = format!(
            "{}/MedicationRequest?patient={}&_count=100",
            self.base(),
            urlencoding::encode(patient_id)
        );
        tracing::debug!(url = %url, "Fetching MedicationRequests");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, FHIR_JSON)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        Self::read_json(response).await
    }

    /// Check the server's capability statement
    pub async fn health_check(&self) -> Result<(), FhirError> {
        let url = format!("{}/metadata", self.base());
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, FHIR_JSON)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(FhirError::Unavailable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = FhirConfig::default();
        assert_eq!(config.base_url, "https://hapi.fhir.org/baseR4");
        assert_eq!(config.patient_id, "group55-sharedpatient");
    }

    #[test]
    fn test_base_trims_slash() {
        let client = FhirClient::new(FhirConfig {
            base_url: "http://localhost:8080/fhir/".to_string(),
            ..Default::default()
        });
        assert_eq!(client.base(), "http://localhost:8080/fhir");
    }

    #[tokio::test]
    async fn test_upload_rejects_non_bundle() {
        let client = FhirClient::new(FhirConfig::default());
        let result = client.upload_bundle(&json!({"resourceType": "Patient"})).await;
        assert!(matches!(result, Err(FhirError::InvalidBundle(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let client = FhirClient::new(FhirConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            request_timeout_ms: 500,
            ..Default::default()
        });
        let result = client.fetch_medication_requests("p1").await;
        assert!(matches!(
            result,
            Err(FhirError::Unavailable) | Err(FhirError::Timeout) | Err(FhirError::Request(_))
        ));
    }
}
