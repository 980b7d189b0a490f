// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Relay coordinator.
//!
//! Wires the capture feed, buffer, identity monitor and dispatcher together,
//! spawns the background tasks, and hands back a [`RelayHandle`] for capture
//! and read-only introspection. No failure inside the relay ever propagates
//! to a capturing caller.

use crate::buffer::LogBuffer;
use crate::config::RelayConfig;
use crate::dispatcher::{Dispatcher, DispatcherConfig};
use crate::entry::{LogEntry, LogSeverity};
use crate::error::RelayError;
use crate::identity::{IdentityProvider, IdentityState};
use crate::monitor::{IdentityMonitor, IdentityMonitorConfig};
use crate::transport::Transport;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Read-only snapshot of the relay, safe to call at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RelayStatus {
    pub authenticated: bool,
    pub guest: bool,
    pub queue_length: usize,
    pub enabled: bool,
}

/// Cheap-to-clone capture feed. Emitting never blocks and never surfaces an
/// error to the caller; once the relay is stopped, emits become no-ops.
#[derive(Clone)]
pub struct CaptureHandle {
    tx: mpsc::UnboundedSender<LogEntry>,
    enabled: Arc<AtomicBool>,
}

impl CaptureHandle {
    pub fn emit(&self, message: impl Into<String>, severity: LogSeverity) {
        if !self.enabled.load(Ordering::SeqCst) {
            return;
        }
        let _ = self.tx.send(LogEntry::new(message, severity));
    }
}

/// Handle to a running relay.
#[derive(Clone)]
pub struct RelayHandle {
    capture: CaptureHandle,
    buffer: Arc<Mutex<LogBuffer>>,
    enabled: Arc<AtomicBool>,
    state_rx: tokio::sync::watch::Receiver<IdentityState>,
    cancel_token: CancellationToken,
}

impl RelayHandle {
    /// Capture feed for the host process.
    pub fn capture_handle(&self) -> CaptureHandle {
        self.capture.clone()
    }

    /// Convenience capture through the handle itself.
    pub fn capture(&self, message: impl Into<String>, severity: LogSeverity) {
        self.capture.emit(message, severity);
    }

    pub fn queued_count(&self) -> usize {
        #[allow(clippy::expect_used)]
        let buffer = self.buffer.lock().expect("lock poisoned");
        buffer.len()
    }

    pub fn clear_queue(&self) {
        #[allow(clippy::expect_used)]
        let mut buffer = self.buffer.lock().expect("lock poisoned");
        buffer.clear();
    }

    pub fn status(&self) -> RelayStatus {
        let state = *self.state_rx.borrow();
        RelayStatus {
            authenticated: state != IdentityState::Unauthenticated,
            guest: state == IdentityState::AuthenticatedGuest,
            queue_length: self.queued_count(),
            enabled: self.enabled.load(Ordering::SeqCst),
        }
    }

    /// Stop the background tasks. In-flight submissions are not cancelled;
    /// their results are simply discarded.
    pub fn stop(&self) {
        self.cancel_token.cancel();
    }
}

/// The authentication-gated log relay.
pub struct CloudLogRelay {
    config: RelayConfig,
}

impl CloudLogRelay {
    pub fn new(config: RelayConfig) -> Self {
        CloudLogRelay { config }
    }

    /// Validate the configuration, spawn the router and identity monitor,
    /// and return the handle. Must be called from within a tokio runtime.
    pub fn start(
        self,
        provider: Arc<dyn IdentityProvider>,
        transport: Arc<dyn Transport>,
    ) -> Result<RelayHandle, RelayError> {
        self.config.validate()?;
        let config = self.config;

        let buffer = Arc::new(Mutex::new(LogBuffer::new(config.max_queue_size)));
        let enabled = Arc::new(AtomicBool::new(config.enabled));
        let (state_tx, state_rx) = tokio::sync::watch::channel(IdentityState::Unauthenticated);
        let (capture_tx, capture_rx) = mpsc::unbounded_channel();
        let cancel_token = CancellationToken::new();

        let dispatcher = Dispatcher::new(DispatcherConfig {
            buffer: Arc::clone(&buffer),
            transport,
            enabled: Arc::clone(&enabled),
            state_rx: state_rx.clone(),
            endpoint: config.endpoint.clone(),
            inter_send_delay: config.inter_send_delay,
            log_for_guest_users: config.log_for_guest_users,
        });

        let monitor = IdentityMonitor::new(IdentityMonitorConfig {
            provider,
            buffer: Arc::clone(&buffer),
            dispatcher: dispatcher.clone(),
            enabled: Arc::clone(&enabled),
            state_tx,
            poll_interval: config.poll_interval,
            log_for_guest_users: config.log_for_guest_users,
            cancel_token: cancel_token.clone(),
        });
        tokio::spawn(monitor.run());

        tokio::spawn(run_router(RouterConfig {
            rx: capture_rx,
            buffer: Arc::clone(&buffer),
            dispatcher,
            enabled: Arc::clone(&enabled),
            state_rx: state_rx.clone(),
            log_for_guest_users: config.log_for_guest_users,
            cancel_token: cancel_token.clone(),
        }));

        Ok(RelayHandle {
            capture: CaptureHandle {
                tx: capture_tx,
                enabled: Arc::clone(&enabled),
            },
            buffer,
            enabled,
            state_rx,
            cancel_token,
        })
    }
}

struct RouterConfig {
    rx: mpsc::UnboundedReceiver<LogEntry>,
    buffer: Arc<Mutex<LogBuffer>>,
    dispatcher: Dispatcher,
    enabled: Arc<AtomicBool>,
    state_rx: tokio::sync::watch::Receiver<IdentityState>,
    log_for_guest_users: bool,
    cancel_token: CancellationToken,
}

/// Routes captured entries: straight to the dispatcher while releasable,
/// into the buffer otherwise. Ends when every capture handle is dropped or
/// the relay is stopped.
async fn run_router(mut config: RouterConfig) {
    loop {
        tokio::select! {
            _ = config.cancel_token.cancelled() => {
                debug!("Capture router shutting down");
                break;
            }
            received = config.rx.recv() => {
                let Some(entry) = received else {
                    debug!("Capture feed closed");
                    break;
                };
                if !config.enabled.load(Ordering::SeqCst) {
                    continue;
                }
                if config
                    .state_rx
                    .borrow()
                    .is_releasable(config.log_for_guest_users)
                {
                    config.dispatcher.send_live(entry);
                } else {
                    #[allow(clippy::expect_used)]
                    let mut buffer = config.buffer.lock().expect("lock poisoned");
                    buffer.enqueue(entry);
                }
            }
        }
    }
}
