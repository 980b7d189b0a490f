// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors that can occur when constructing or configuring the relay
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to build HTTP transport: {0}")]
    TransportBuild(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = RelayError::InvalidConfig("queue size must be greater than 0".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid configuration: queue size must be greater than 0"
        );
    }

    #[test]
    fn test_error_debug() {
        let error = RelayError::TransportBuild("bad proxy".to_string());
        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("TransportBuild"));
    }
}
