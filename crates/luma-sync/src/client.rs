//! HTTP client for the journal sync endpoint.
//!
//! # Example
//!
//! ```no_run
//! use luma_sync::{HttpSyncClient, SyncTransport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpSyncClient::new("https://api.luma.example")?;
//! let response = client.sync_batch(&[], None).await?;
//! println!("Accepted {} entries", response.uploaded_ids.len());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use luma_types::JournalEntry;

use crate::error::{Error, Result};
use crate::traits::SyncTransport;

/// Path of the batch sync endpoint, relative to the base URL.
pub const SYNC_ENDPOINT: &str = "/journal/local-sync";

/// Request timeout. A hung request resolves to a failed sweep instead of
/// leaving entries pending forever.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Batch sync request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    /// The full pending set for this sweep.
    pub entries: Vec<JournalEntry>,
    /// Checkpoint of the last successful reconciliation.
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_sync_at: Option<OffsetDateTime>,
}

/// Batch sync success response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    /// IDs the server accepted from this batch.
    pub uploaded_ids: Vec<String>,
    /// Server-originated entries not necessarily known to this device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_entries: Option<Vec<JournalEntry>>,
    /// Server-supplied checkpoint for the next sweep.
    #[serde(with = "time::serde::rfc3339")]
    pub sync_timestamp: OffsetDateTime,
}

/// HTTP transport for the sync endpoint.
#[derive(Debug, Clone)]
pub struct HttpSyncClient {
    client: Client,
    base_url: String,
}

impl HttpSyncClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the sync service (e.g. `https://api.luma.example`)
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::Request)?;
        Self::with_client(base_url, client)
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        // Normalize URL (remove trailing slash)
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {base_url}"
            )));
        }

        Ok(Self { client, base_url })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn handle_response(&self, response: reqwest::Response) -> Result<SyncResponse> {
        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(Error::Request)
        } else {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or_else(|| status.to_string());

            Err(Error::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl SyncTransport for HttpSyncClient {
    async fn sync_batch(
        &self,
        entries: &[JournalEntry],
        last_sync_at: Option<OffsetDateTime>,
    ) -> Result<SyncResponse> {
        let url = format!("{}{SYNC_ENDPOINT}", self.base_url);
        let body = SyncRequest {
            entries: entries.to_vec(),
            last_sync_at,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::NotReachable {
                url: url.clone(),
                source: e,
            })?;

        self.handle_response(response).await
    }
}
