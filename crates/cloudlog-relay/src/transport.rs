// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Remote call transport.
//!
//! The relay never retries a failed submission; classification only decides
//! whether forwarding stays enabled. Unauthorized responses are treated as a
//! persistent misconfiguration, anything else as a one-off fault.

use crate::error::RelayError;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::env;
use std::time::Duration;

const API_KEY_HEADER: &str = "X-Api-Key";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome classification for a failed submission
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Missing or invalid credentials; escalated to a process-wide disable
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Network, timeout or generic remote error; the entry is dropped
    #[error("transient: {0}")]
    Transient(String),
}

/// Asynchronous call primitive to the remote logging endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(
        &self,
        endpoint: &str,
        payload: HashMap<String, String>,
    ) -> Result<(), TransportError>;
}

pub struct HttpTransportConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub https_proxy: Option<String>,
}

impl HttpTransportConfig {
    /// Create transport configuration from environment variables
    pub fn from_env() -> Result<Self, RelayError> {
        let base_url = env::var("CLOUDLOG_BASE_URL").map_err(|_| {
            RelayError::InvalidConfig("CLOUDLOG_BASE_URL must be set".to_string())
        })?;
        let api_key = env::var("CLOUDLOG_API_KEY").ok();
        let timeout = env::var("CLOUDLOG_TIMEOUT_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TIMEOUT);
        let https_proxy = env::var("CLOUDLOG_PROXY_HTTPS")
            .or_else(|_| env::var("HTTPS_PROXY"))
            .ok();

        Ok(Self {
            base_url,
            api_key,
            timeout,
            https_proxy,
        })
    }
}

/// HTTP implementation of [`Transport`]: POSTs the payload as JSON to
/// `{base_url}/{endpoint}`.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self, RelayError> {
        if config.base_url.trim().is_empty() {
            return Err(RelayError::InvalidConfig(
                "transport base URL cannot be empty".to_string(),
            ));
        }

        let mut builder = reqwest::Client::builder().timeout(config.timeout);
        if let Some(proxy_url) = &config.https_proxy {
            let proxy = reqwest::Proxy::https(proxy_url.as_str())
                .map_err(|e| RelayError::TransportBuild(e.to_string()))?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| RelayError::TransportBuild(e.to_string()))?;

        Ok(HttpTransport {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(
        &self,
        endpoint: &str,
        payload: HashMap<String, String>,
    ) -> Result<(), TransportError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let mut request = self.client.post(&url).json(&payload);
        if let Some(api_key) = &self.api_key {
            request = request.header(API_KEY_HEADER, api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Transient(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(TransportError::Unauthorized(format!("{status}: {body}")))
            }
            _ => Err(TransportError::Transient(format!("{status}: {body}"))),
        }
    }
}
