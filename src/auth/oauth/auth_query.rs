//! Signed callback parameters.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left unescaped in the signed message: `A-Za-z0-9-_.!~*'()`.
///
/// This is the set Shopify's own query-string encoding leaves alone, so a
/// value such as `it's(ok)!` signs as written.
const SIGNABLE_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Query parameters Shopify attaches to the OAuth callback.
///
/// Every pair is kept, not just the ones the handshake reads, because the
/// signature covers all of them. Pairs are stored in arrival order; the
/// signable form sorts them.
///
/// # Example
///
/// ```rust
/// use shopify_oauth_proxy::auth::oauth::CallbackQuery;
///
/// let query = CallbackQuery::from_pairs(vec![
///     ("shop".to_string(), "my-store.myshopify.com".to_string()),
///     ("code".to_string(), "abc".to_string()),
///     ("hmac".to_string(), "deadbeef".to_string()),
///     ("timestamp".to_string(), "1700000000".to_string()),
/// ]);
///
/// assert_eq!(query.code(), Some("abc"));
/// assert_eq!(
///     query.to_signable_string(),
///     "code=abc&shop=my-store.myshopify.com&timestamp=1700000000"
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackQuery {
    pairs: Vec<(String, String)>,
}

impl CallbackQuery {
    /// Keys excluded from the signed message.
    const UNSIGNED_KEYS: [&'static str; 2] = ["hmac", "signature"];

    /// Creates a query from decoded key/value pairs.
    #[must_use]
    pub const fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// Returns the first value for `key`, if present and non-empty.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    /// Returns the `shop` parameter.
    #[must_use]
    pub fn shop(&self) -> Option<&str> {
        self.get("shop")
    }

    /// Returns the `code` parameter.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.get("code")
    }

    /// Returns the `state` parameter.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.get("state")
    }

    /// Returns the `hmac` parameter.
    #[must_use]
    pub fn hmac(&self) -> Option<&str> {
        self.get("hmac")
    }

    /// Builds the message the `hmac` parameter signs.
    ///
    /// All pairs except `hmac` and `signature`, sorted by key (stable, so
    /// repeated keys keep their arrival order), each key and value
    /// percent-encoded (everything except `A-Za-z0-9-_.!~*'()`), joined as
    /// `k=v&k=v`.
    #[must_use]
    pub fn to_signable_string(&self) -> String {
        let mut pairs: Vec<&(String, String)> = self
            .pairs
            .iter()
            .filter(|(k, _)| !Self::UNSIGNED_KEYS.contains(&k.as_str()))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));

        pairs
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(k, SIGNABLE_ESCAPE),
                    utf8_percent_encode(v, SIGNABLE_ESCAPE)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}
