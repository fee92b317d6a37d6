//! Handshake progress, as seen from one browser.
//!
//! The server keeps no per-client state between requests, so a
//! [`HandshakeState`] never outlives a single request. It exists to name the
//! steps in logs and to make the legal transitions explicit.

use std::fmt;

/// Where an authorization attempt stands.
///
/// ```text
/// Idle --begin--> AwaitingConsent --callback ok--> AwaitingExchange --token--> Authorized
///                        |                                |
///                        +------ bad state / hmac --------+---- exchange error --> Failed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandshakeState {
    /// No attempt in progress.
    Idle,
    /// Redirected to the consent screen; waiting for the callback.
    AwaitingConsent,
    /// Callback verified; exchanging the code for a token.
    AwaitingExchange,
    /// Token obtained.
    Authorized,
    /// The attempt was rejected. Terminal.
    Failed,
}

impl HandshakeState {
    /// Returns `true` if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Authorized | Self::Failed)
    }

    /// Returns `true` if moving from `self` to `next` is a legal step.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::AwaitingConsent | Self::Failed)
                | (Self::AwaitingConsent, Self::AwaitingExchange | Self::Failed)
                | (Self::AwaitingExchange, Self::Authorized | Self::Failed)
        )
    }

    /// Moves to `next`, logging the step for `shop`.
    pub fn advance(self, next: Self, shop: &str) -> Self {
        debug_assert!(self.can_transition_to(next), "{self} -> {next}");
        if next == Self::Failed {
            tracing::warn!(shop, from = %self, to = %next, "handshake failed");
        } else {
            tracing::info!(shop, from = %self, to = %next, "handshake step");
        }
        next
    }
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::AwaitingConsent => "awaiting_consent",
            Self::AwaitingExchange => "awaiting_exchange",
            Self::Authorized => "authorized",
            Self::Failed => "failed",
        })
    }
}
