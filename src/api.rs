//! # Remote Sync Service Client
//!
//! Thin HTTP client for the backend synchronization service. The service
//! exposes three operations:
//!
//! - `GET /sync/ready` - can a synchronization be triggered right now
//! - `GET /sync/status` - what the last/current synchronization reported
//! - `GET /sync` - trigger a synchronization run
//!
//! All three share one [`reqwest::Client`]; failures are folded into
//! [`ApiError`] so callers can distinguish "no response at all" from a
//! structured service rejection.

use crate::config::SyncConfig;
use crate::error::ApiError;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `GET /sync/ready` response body.
#[derive(Debug, Deserialize)]
pub struct ReadinessPayload {
    pub ready: bool,
}

/// `GET /sync/status` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusPayload {
    /// Server-reported status code; absent reads as unknown.
    #[serde(default)]
    pub status: Option<String>,
    /// Human-readable progress message, possibly localized.
    #[serde(default)]
    pub message: String,
    #[serde(rename = "lastSync")]
    pub last_sync: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

/// Error body some endpoints attach to non-success responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Client for the remote sync service.
#[derive(Debug, Clone)]
pub struct SyncClient {
    http: Client,
    config: SyncConfig,
}

impl SyncClient {
    pub fn new(config: SyncConfig) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { http, config }
    }

    /// One readiness query. `Ok(false)` is a valid answer; `Err` means the
    /// question could not be asked.
    pub async fn readiness(&self) -> Result<bool, ApiError> {
        let url = self.config.api_url("/sync/ready");
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Self::service_error(response).await);
        }
        let payload: ReadinessPayload = response
            .json()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(payload.ready)
    }

    /// One status query.
    pub async fn status(&self) -> Result<StatusPayload, ApiError> {
        let url = self.config.api_url("/sync/status");
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Self::service_error(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))
    }

    /// Trigger a synchronization run. Any 2xx is success; the body is
    /// ignored.
    pub async fn trigger(&self) -> Result<(), ApiError> {
        let url = self.config.api_url("/sync");
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Self::service_error(response).await);
        }
        Ok(())
    }

    /// Fold a non-success response into a service error, keeping the
    /// structured body message when one is present.
    async fn service_error(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let fallback = status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();
        let message = match response.json::<ErrorBody>().await {
            Ok(ErrorBody { message: Some(m) }) if !m.is_empty() => m,
            _ => fallback,
        };
        ApiError::service(status.as_u16(), message)
    }
}
