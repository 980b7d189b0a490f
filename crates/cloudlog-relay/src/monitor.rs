// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Polling identity-state machine.
//!
//! The identity source is an external collaborator whose change notifications
//! are not assumed reliable, so the state is re-derived on every tick;
//! re-derivation is idempotent and self-heals after a missed transition. The
//! poll interval bounds the worst-case latency between an authentication
//! event and the buffer being released or cleared.

use crate::buffer::LogBuffer;
use crate::dispatcher::Dispatcher;
use crate::identity::{IdentityProvider, IdentityState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub struct IdentityMonitor {
    provider: Arc<dyn IdentityProvider>,
    buffer: Arc<Mutex<LogBuffer>>,
    dispatcher: Dispatcher,
    enabled: Arc<AtomicBool>,
    state_tx: watch::Sender<IdentityState>,
    poll_interval: Duration,
    log_for_guest_users: bool,
    cancel_token: CancellationToken,
}

pub struct IdentityMonitorConfig {
    pub provider: Arc<dyn IdentityProvider>,
    pub buffer: Arc<Mutex<LogBuffer>>,
    pub dispatcher: Dispatcher,
    pub enabled: Arc<AtomicBool>,
    pub state_tx: watch::Sender<IdentityState>,
    pub poll_interval: Duration,
    pub log_for_guest_users: bool,
    pub cancel_token: CancellationToken,
}

impl IdentityMonitor {
    pub fn new(config: IdentityMonitorConfig) -> Self {
        IdentityMonitor {
            provider: config.provider,
            buffer: config.buffer,
            dispatcher: config.dispatcher,
            enabled: config.enabled,
            state_tx: config.state_tx,
            poll_interval: config.poll_interval,
            log_for_guest_users: config.log_for_guest_users,
            cancel_token: config.cancel_token,
        }
    }

    /// Poll the identity source until cancelled. Starts from
    /// `Unauthenticated` and acts only on state transitions.
    pub async fn run(self) {
        let mut ticker = interval(self.poll_interval);
        ticker.tick().await; // discard first tick, which is instantaneous

        let mut current = IdentityState::Unauthenticated;
        let mut provider_down = false;

        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    debug!("Identity monitor shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let next = match self.provider.snapshot().await {
                        Ok(snapshot) => {
                            provider_down = false;
                            IdentityState::derive(&snapshot)
                        }
                        Err(e) => {
                            // Report once per outage, then keep polling
                            if !provider_down {
                                warn!("Identity source unavailable, treating session as unauthenticated: {e}");
                                provider_down = true;
                            }
                            IdentityState::Unauthenticated
                        }
                    };

                    if next != current {
                        self.on_transition(current, next);
                        current = next;
                    }
                }
            }
        }
    }

    fn on_transition(&self, from: IdentityState, to: IdentityState) {
        debug!("Identity state changed: {from:?} -> {to:?}");

        // Publish before acting so a spawned drain observes the new state
        let _ = self.state_tx.send(to);

        if to.is_releasable(self.log_for_guest_users) {
            if self.enabled.load(Ordering::SeqCst) {
                let dispatcher = self.dispatcher.clone();
                tokio::spawn(async move {
                    dispatcher.drain().await;
                });
            }
        } else if to == IdentityState::AuthenticatedGuest {
            // Guest logging is disabled: drop whatever was captured so no
            // entry can ever be attributed to this guest
            let cleared = {
                #[allow(clippy::expect_used)]
                let mut buffer = self.buffer.lock().expect("lock poisoned");
                let len = buffer.len();
                buffer.clear();
                len
            };
            debug!("Guest session detected, cleared {cleared} buffered entries");
        }
    }
}
