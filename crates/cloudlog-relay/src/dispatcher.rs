// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Rate-limited drain and live forwarding.
//!
//! Submissions are fire-and-dispatch: the drain loop schedules a task per
//! entry and moves on after `inter_send_delay` without awaiting the result,
//! so completion order across the wire is best-effort only. Each task still
//! observes its own outcome and feeds it into failure classification.

use crate::buffer::LogBuffer;
use crate::entry::LogEntry;
use crate::identity::IdentityState;
use crate::transport::{Transport, TransportError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error};

#[derive(Clone)]
pub struct Dispatcher {
    buffer: Arc<Mutex<LogBuffer>>,
    transport: Arc<dyn Transport>,
    enabled: Arc<AtomicBool>,
    state_rx: watch::Receiver<IdentityState>,
    endpoint: String,
    inter_send_delay: Duration,
    log_for_guest_users: bool,
}

pub struct DispatcherConfig {
    pub buffer: Arc<Mutex<LogBuffer>>,
    pub transport: Arc<dyn Transport>,
    pub enabled: Arc<AtomicBool>,
    pub state_rx: watch::Receiver<IdentityState>,
    pub endpoint: String,
    pub inter_send_delay: Duration,
    pub log_for_guest_users: bool,
}

impl Dispatcher {
    pub fn new(config: DispatcherConfig) -> Self {
        Dispatcher {
            buffer: config.buffer,
            transport: config.transport,
            enabled: config.enabled,
            state_rx: config.state_rx,
            endpoint: config.endpoint,
            inter_send_delay: config.inter_send_delay,
            log_for_guest_users: config.log_for_guest_users,
        }
    }

    fn releasable(&self) -> bool {
        self.state_rx
            .borrow()
            .is_releasable(self.log_for_guest_users)
    }

    /// Drain the buffer one entry at a time, pausing `inter_send_delay`
    /// between submissions. Stops as soon as the buffer empties, the state
    /// leaves releasable, or forwarding is disabled.
    pub async fn drain(&self) {
        loop {
            if !self.enabled.load(Ordering::SeqCst) || !self.releasable() {
                break;
            }

            let entry = {
                #[allow(clippy::expect_used)]
                let mut buffer = self.buffer.lock().expect("lock poisoned");
                buffer.dequeue()
            };
            let Some(entry) = entry else {
                break;
            };

            self.submit(entry);
            tokio::time::sleep(self.inter_send_delay).await;
        }
    }

    /// Forward an entry captured while already in a releasable state,
    /// bypassing the buffer. Same fire-and-dispatch discipline as the drain.
    pub fn send_live(&self, entry: LogEntry) {
        if !self.enabled.load(Ordering::SeqCst) {
            return;
        }
        self.submit(entry);
    }

    fn submit(&self, entry: LogEntry) {
        let transport = Arc::clone(&self.transport);
        let enabled = Arc::clone(&self.enabled);
        let endpoint = self.endpoint.clone();

        tokio::spawn(async move {
            let payload = entry.to_payload();
            match transport.call(&endpoint, payload).await {
                Ok(()) => debug!("submitted log entry to {endpoint}"),
                Err(TransportError::Unauthorized(msg)) => {
                    // A repeated authorization failure is a persistent
                    // misconfiguration, not a one-off fault.
                    if enabled.swap(false, Ordering::SeqCst) {
                        error!("remote endpoint rejected credentials, disabling log forwarding: {msg}");
                    }
                }
                Err(TransportError::Transient(msg)) => {
                    debug!("dropping log entry after transient send failure: {msg}");
                }
            }
        });
    }
}
