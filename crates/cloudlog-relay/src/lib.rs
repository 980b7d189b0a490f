// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Authentication-gated log buffering and forwarding.
//!
//! Captured log lines are buffered in a bounded drop-oldest queue while the
//! client's identity is unresolved, then drained to a remote logging endpoint
//! at a throttled rate once a releasable identity state is reached. Guests
//! are excluded from logging by default, and an authorization failure from
//! the remote endpoint disables the whole subsystem rather than retrying.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod buffer;
pub mod config;
pub mod dispatcher;
pub mod entry;
pub mod error;
pub mod identity;
pub mod monitor;
pub mod relay;
pub mod transport;

pub use config::RelayConfig;
pub use entry::{LogEntry, LogSeverity};
pub use error::RelayError;
pub use identity::{IdentityError, IdentityProvider, IdentitySnapshot, IdentityState};
pub use relay::{CaptureHandle, CloudLogRelay, RelayHandle, RelayStatus};
pub use transport::{HttpTransport, HttpTransportConfig, Transport, TransportError};
