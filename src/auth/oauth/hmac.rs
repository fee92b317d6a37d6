//! HMAC validation for Shopify OAuth callbacks.
//!
//! # Security
//!
//! All HMAC comparisons use constant-time comparison to prevent timing attacks.
//! Key rotation is supported by falling back to the old secret key if
//! validation with the primary key fails.
//!
//! # Example
//!
//! ```rust
//! use shopify_oauth_proxy::auth::oauth::hmac::compute_signature;
//!
//! let message = "code=abc123&shop=example.myshopify.com&state=xyz";
//! let signature = compute_signature(message, "my-api-secret").unwrap();
//! assert_eq!(signature.len(), 64);
//! assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
//! ```

use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::auth::oauth::CallbackQuery;
use crate::config::ProxyConfig;

type HmacSha256 = Hmac<Sha256>;

/// Computes a lowercase hex HMAC-SHA256 signature of `message`.
///
/// # Errors
///
/// Returns [`InvalidLength`] if the key is rejected. HMAC-SHA256 accepts keys
/// of any length, so in practice this does not fail.
///
/// ```rust
/// use shopify_oauth_proxy::auth::oauth::hmac::compute_signature;
///
/// let sig = compute_signature("message", "key").unwrap();
/// assert_eq!(sig, "6e9ef29b75fffc5b7abae527d58fdadb2fe42e7219011976917343065f58ed4a");
/// ```
pub fn compute_signature(message: &str, secret: &str) -> Result<String, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Performs constant-time comparison of two strings.
///
/// Strings of different lengths compare unequal.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Validates the `hmac` parameter of an OAuth callback.
///
/// The primary secret is tried first; if it fails and an old secret is
/// configured, the old secret is tried too. The received value is compared
/// case-insensitively as hex.
///
/// Returns `false` when the callback carries no `hmac`.
#[must_use]
pub fn validate_hmac(query: &CallbackQuery, config: &ProxyConfig) -> bool {
    let Some(received) = query.hmac() else {
        return false;
    };
    let received = received.to_ascii_lowercase();
    let signable = query.to_signable_string();

    let matches = |secret: &str| {
        compute_signature(&signable, secret)
            .is_ok_and(|computed| constant_time_compare(&computed, &received))
    };

    if matches(config.api_secret_key().as_ref()) {
        return true;
    }

    config
        .old_api_secret_key()
        .is_some_and(|old| matches(old.as_ref()))
}
