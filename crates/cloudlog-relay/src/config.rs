// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::RelayError;
use std::env;
use std::time::Duration;

/// Configuration for the log relay. Fixed at construction, read-only
/// afterward.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Whether the relay captures and forwards anything at all
    pub enabled: bool,
    /// Whether authenticated guests (no resolved profile) may be logged
    pub log_for_guest_users: bool,
    /// Maximum number of buffered entries before drop-oldest eviction
    pub max_queue_size: usize,
    /// How often the identity source is polled
    pub poll_interval: Duration,
    /// Pause between successive submissions while draining
    pub inter_send_delay: Duration,
    /// Remote endpoint name the dispatcher submits to
    pub endpoint: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_for_guest_users: false,
            max_queue_size: 100,
            poll_interval: Duration::from_millis(500),
            inter_send_delay: Duration::from_millis(100),
            endpoint: "gamelogging".to_string(),
        }
    }
}

impl RelayConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, RelayError> {
        let defaults = RelayConfig::default();

        let enabled = env::var("CLOUDLOG_ENABLED")
            .map(|val| val.to_lowercase() != "false")
            .unwrap_or(defaults.enabled);
        let log_for_guest_users = env::var("CLOUDLOG_LOG_FOR_GUESTS")
            .map(|val| val.to_lowercase() == "true")
            .unwrap_or(defaults.log_for_guest_users);
        let max_queue_size = env::var("CLOUDLOG_MAX_QUEUE_SIZE")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(defaults.max_queue_size);
        let poll_interval = env::var("CLOUDLOG_POLL_INTERVAL_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval);
        let inter_send_delay = env::var("CLOUDLOG_INTER_SEND_DELAY_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.inter_send_delay);
        let endpoint = env::var("CLOUDLOG_ENDPOINT").unwrap_or(defaults.endpoint);

        let config = Self {
            enabled,
            log_for_guest_users,
            max_queue_size,
            poll_interval,
            inter_send_delay,
            endpoint,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.max_queue_size == 0 {
            return Err(RelayError::InvalidConfig(
                "max queue size must be greater than 0".to_string(),
            ));
        }

        if self.poll_interval.is_zero() {
            return Err(RelayError::InvalidConfig(
                "poll interval must be greater than 0".to_string(),
            ));
        }

        if self.endpoint.trim().is_empty() {
            return Err(RelayError::InvalidConfig(
                "endpoint name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
