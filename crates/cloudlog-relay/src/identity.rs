// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;

/// A point-in-time view of the external identity source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentitySnapshot {
    pub signed_in: bool,
    pub player_id: String,
    pub profile: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Identity source unavailable: {0}")]
    Unavailable(String),
}

/// Source of identity state. Injected at construction; the relay only
/// observes it and never writes to it.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn snapshot(&self) -> Result<IdentitySnapshot, IdentityError>;
}

/// Identity state derived from `(signed_in, profile)` on every poll tick.
/// Never stored by consumers; the monitor publishes transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityState {
    Unauthenticated,
    AuthenticatedGuest,
    AuthenticatedUser,
}

impl IdentityState {
    pub fn derive(snapshot: &IdentitySnapshot) -> Self {
        if !snapshot.signed_in {
            return IdentityState::Unauthenticated;
        }
        match snapshot.profile.as_deref() {
            Some(profile) if !profile.is_empty() => IdentityState::AuthenticatedUser,
            _ => IdentityState::AuthenticatedGuest,
        }
    }

    /// Whether forwarding is permitted in this state. Guests are releasable
    /// only when guest logging is explicitly enabled.
    pub fn is_releasable(self, log_for_guest_users: bool) -> bool {
        match self {
            IdentityState::AuthenticatedUser => true,
            IdentityState::AuthenticatedGuest => log_for_guest_users,
            IdentityState::Unauthenticated => false,
        }
    }
}
