//! Anti-forgery state handling for the authorization handshake.
//!
//! # Overview
//!
//! - [`StateParam`]: the random nonce sent to Shopify in the `state` query
//!   parameter and echoed back on the callback.
//! - [`StateCookie`]: the Argon2id hash of that nonce, stored in the `state`
//!   cookie. The server keeps no copy of the nonce; the callback proves it came
//!   from the same browser by presenting both.
//!
//! Argon2 is CPU and memory heavy. Hashing and verification run on tokio's
//! blocking pool, never on a runtime worker.
//!
//! # Example
//!
//! ```rust
//! use shopify_oauth_proxy::auth::oauth::{StateCookie, StateParam};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let state = StateParam::new();
//! let cookie = StateCookie::hash(&state).await.unwrap();
//!
//! assert!(cookie.verify(state.as_ref()).await);
//! assert!(!cookie.verify("some-other-value").await);
//!
//! // Cookie values survive a round-trip through the header encoding
//! let restored = StateCookie::from_cookie_value(&cookie.to_cookie_value()).unwrap();
//! assert!(restored.verify(state.as_ref()).await);
//! # }
//! ```

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fmt;

use crate::auth::oauth::OAuthError;

/// A fresh anti-forgery nonce for one authorization attempt.
///
/// # Thread Safety
///
/// `StateParam` is `Send + Sync`, making it safe to share across threads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateParam {
    value: String,
}

// Verify StateParam is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StateParam>();
};

impl StateParam {
    /// The length of generated nonces.
    pub const NONCE_LENGTH: usize = 15;

    /// Creates a new state parameter with a cryptographically secure random nonce.
    ///
    /// The nonce is a 15-character alphanumeric string drawn from the thread-local
    /// CSPRNG.
    ///
    /// ```rust
    /// use shopify_oauth_proxy::auth::oauth::StateParam;
    ///
    /// let state = StateParam::new();
    /// assert_eq!(state.as_ref().len(), 15);
    /// assert!(state.as_ref().chars().all(|c| c.is_ascii_alphanumeric()));
    /// ```
    #[must_use]
    pub fn new() -> Self {
        let value: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::NONCE_LENGTH)
            .map(char::from)
            .collect();

        Self { value }
    }
}

impl Default for StateParam {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for StateParam {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

/// The hashed form of a [`StateParam`], as carried in the `state` cookie.
///
/// The hash is a PHC string (`$argon2id$v=19$...`). Since PHC strings contain
/// characters that are not valid in a cookie value, [`to_cookie_value`] and
/// [`from_cookie_value`] percent-encode and decode it.
///
/// [`to_cookie_value`]: Self::to_cookie_value
/// [`from_cookie_value`]: Self::from_cookie_value
#[derive(Clone, PartialEq, Eq)]
pub struct StateCookie {
    hash: String,
}

impl StateCookie {
    /// Hashes `state` with Argon2id and a random salt on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::StateHashFailed`] if Argon2 rejects the input or
    /// the blocking task does not complete.
    pub async fn hash(state: &StateParam) -> Result<Self, OAuthError> {
        let nonce = state.value.clone();
        tokio::task::spawn_blocking(move || Self::hash_blocking(&nonce))
            .await
            .map_err(|e| OAuthError::StateHashFailed {
                reason: e.to_string(),
            })?
    }

    fn hash_blocking(nonce: &str) -> Result<Self, OAuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(nonce.as_bytes(), &salt)
            .map_err(|e| OAuthError::StateHashFailed {
                reason: e.to_string(),
            })?
            .to_string();

        Ok(Self { hash })
    }

    /// Restores a hash from a `state` cookie value.
    ///
    /// Returns `None` if the value is not a percent-encoded PHC string.
    #[must_use]
    pub fn from_cookie_value(value: &str) -> Option<Self> {
        let hash = urlencoding::decode(value).ok()?.into_owned();
        PasswordHash::new(&hash).ok()?;
        Some(Self { hash })
    }

    /// Returns the value to place in the `state` cookie.
    #[must_use]
    pub fn to_cookie_value(&self) -> String {
        urlencoding::encode(&self.hash).into_owned()
    }

    /// Returns `true` if `candidate` is the nonce this hash was made from.
    ///
    /// Argon2 compares the derived output in constant time. The work runs on
    /// the blocking pool; a task that fails to complete counts as a mismatch.
    pub async fn verify(&self, candidate: &str) -> bool {
        let hash = self.hash.clone();
        let candidate = candidate.to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(&hash, &candidate))
            .await
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "state verification task failed");
                false
            })
    }
}

fn verify_blocking(hash: &str, candidate: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok()
}

impl fmt::Debug for StateCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StateCookie(*****)")
    }
}
