//! # Cloud Client
//!
//! HTTP/JSON client for the remote sync endpoint. Paths are relative to a
//! configured base URL:
//!
//! | Path           | Method | Purpose                                   |
//! |----------------|--------|-------------------------------------------|
//! | `/test/health` | GET    | endpoint validation before enabling sync  |
//! | `/sync/push`   | POST   | full-state upload (remote full-replaces)  |
//! | `/sync/pull`   | GET    | full-state download                       |
//! | `/sync/delta`  | POST   | single create/update/delete propagation   |
//!
//! Every request enforces a timeout so the startup sync flow can never
//! hang indefinitely, and carries the bearer token when one is configured.

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::{SyncError, SyncResult};
use omni_core::StoreSettings;
use omni_db::{ChangeEvent, ChangeOp, StoreSnapshot, SyncTable};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// Configuration
// =============================================================================

/// Connection parameters for the remote endpoint.
#[derive(Debug, Clone)]
pub struct CloudConfig {
    /// Base URL, e.g. `https://sync.example.com`.
    pub base_url: String,

    /// Optional bearer token attached to every request.
    pub api_token: Option<String>,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl CloudConfig {
    /// Creates a config for the given base URL with defaults.
    pub fn new(base_url: impl Into<String>) -> Self {
        CloudConfig {
            base_url: base_url.into(),
            api_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the bearer token.
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// =============================================================================
// Wire Types
// =============================================================================

/// Body of `/sync/delta`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeltaPayload<'a> {
    operation: ChangeOp,
    table_name: SyncTable,
    pk_value: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a serde_json::Value>,
}

/// Response of `/sync/push`.
#[derive(Debug, Deserialize)]
struct PushResponse {
    success: bool,
}

// =============================================================================
// Client
// =============================================================================

/// HTTP client for the remote sync endpoint.
#[derive(Debug, Clone)]
pub struct CloudClient {
    http: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl CloudClient {
    /// Creates a client, validating the base URL shape.
    pub fn new(config: CloudConfig) -> SyncResult<Self> {
        // Parse purely for validation; requests use plain concatenation so
        // a base URL with a path prefix keeps it.
        Url::parse(config.base_url.trim())?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SyncError::Internal(e.to_string()))?;

        Ok(CloudClient {
            http,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            api_token: config.api_token,
        })
    }

    /// Builds a client from the settings singleton. Returns `None` when no
    /// endpoint is configured.
    pub fn from_settings(settings: &StoreSettings) -> SyncResult<Option<Self>> {
        let Some(url) = settings.cloud_api_url.as_deref() else {
            return Ok(None);
        };

        let mut config = CloudConfig::new(url);
        if let Some(token) = settings.cloud_api_token.as_deref() {
            config = config.api_token(token);
        }

        Ok(Some(CloudClient::new(config)?))
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.http.request(method, url);
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// GET `/test/health`: validates the configured endpoint. Distinguishes
    /// an unreachable endpoint from one that answered and refused.
    pub async fn health_check(&self) -> SyncResult<()> {
        let response = self
            .request(reqwest::Method::GET, "/test/health")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Rejected {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        debug!("Health check passed");
        Ok(())
    }

    /// POST `/sync/push`: uploads every row of the syncable tables; the
    /// remote performs a full replace.
    pub async fn push(&self, snapshot: &StoreSnapshot) -> SyncResult<()> {
        debug!(rows = snapshot.row_count(), "Pushing full snapshot");

        let response = self
            .request(reqwest::Method::POST, "/sync/push")
            .json(snapshot)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Rejected {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: PushResponse = response
            .json()
            .await
            .map_err(|e| SyncError::InvalidResponse(e.to_string()))?;
        if !body.success {
            return Err(SyncError::InvalidResponse(
                "push acknowledged without success".to_string(),
            ));
        }

        Ok(())
    }

    /// GET `/sync/pull`: downloads the remote's current full snapshot.
    /// Date fields arrive as ISO-8601 strings and deserialize into native
    /// dates.
    pub async fn pull(&self) -> SyncResult<StoreSnapshot> {
        debug!("Pulling full snapshot");

        let response = self.request(reqwest::Method::GET, "/sync/pull").send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Rejected {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let snapshot: StoreSnapshot = response
            .json()
            .await
            .map_err(|e| SyncError::InvalidResponse(e.to_string()))?;

        debug!(rows = snapshot.row_count(), "Pulled snapshot");
        Ok(snapshot)
    }

    /// POST `/sync/delta`: propagates one committed row change. The
    /// response body is ignored; only the status matters.
    pub async fn delta(&self, event: &ChangeEvent) -> SyncResult<()> {
        let payload = DeltaPayload {
            operation: event.op,
            table_name: event.table,
            pk_value: event.pk,
            data: event.payload.as_ref(),
        };

        let response = self
            .request(reqwest::Method::POST, "/sync/delta")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Rejected {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed_base_url() {
        let err = CloudClient::new(CloudConfig::new("not a url")).unwrap_err();
        assert!(matches!(err, SyncError::InvalidUrl(_)));
    }

    #[test]
    fn test_trailing_slash_is_normalized() {
        let client = CloudClient::new(CloudConfig::new("https://sync.example.com/")).unwrap();
        assert_eq!(client.base_url, "https://sync.example.com");
    }

    #[test]
    fn test_from_settings_requires_url() {
        let settings = StoreSettings::default();
        assert!(CloudClient::from_settings(&settings).unwrap().is_none());

        let mut settings = StoreSettings::default();
        settings.cloud_api_url = Some("https://sync.example.com".to_string());
        assert!(CloudClient::from_settings(&settings).unwrap().is_some());
    }

    #[test]
    fn test_delta_payload_wire_shape() {
        let value = serde_json::json!({ "id": 3, "name": "x" });
        let payload = DeltaPayload {
            operation: ChangeOp::Update,
            table_name: SyncTable::Products,
            pk_value: 3,
            data: Some(&value),
        };
        let wire = serde_json::to_value(&payload).unwrap();
        assert_eq!(wire["operation"], "update");
        assert_eq!(wire["tableName"], "products");
        assert_eq!(wire["pkValue"], 3);
        assert_eq!(wire["data"]["name"], "x");

        let delete = DeltaPayload {
            operation: ChangeOp::Delete,
            table_name: SyncTable::Categories,
            pk_value: 9,
            data: None,
        };
        let wire = serde_json::to_value(&delete).unwrap();
        assert!(wire.get("data").is_none());
    }
}
