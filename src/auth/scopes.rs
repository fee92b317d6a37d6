//! OAuth scope list requested during authorization.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// An ordered list of OAuth scopes.
///
/// Scopes keep the order they were declared in and duplicates are dropped.
/// The [`Display`](fmt::Display) form joins them with `,`, which is exactly
/// the value of the `scope` parameter on the authorization URL.
///
/// # Example
///
/// ```rust
/// use shopify_oauth_proxy::AuthScopes;
///
/// let scopes: AuthScopes = "write_orders, read_products,write_orders".parse().unwrap();
/// assert_eq!(scopes.to_string(), "write_orders,read_products");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AuthScopes {
    scopes: Vec<String>,
}

impl AuthScopes {
    /// Creates an empty scope list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a scope list from static names, preserving order.
    #[must_use]
    pub fn from_list(scopes: &[&str]) -> Self {
        let mut list = Self::new();
        for scope in scopes {
            list.push(scope);
        }
        list
    }

    /// Returns `true` if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Returns the number of scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Returns an iterator over the scopes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    fn push(&mut self, scope: &str) {
        let scope = scope.trim();
        if !scope.is_empty() && !self.scopes.iter().any(|s| s == scope) {
            self.scopes.push(scope.to_string());
        }
    }
}

impl FromStr for AuthScopes {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scopes = Self::new();

        for scope in s.split(',') {
            let scope = scope.trim();
            if scope.is_empty() {
                continue;
            }

            // Alphanumeric and underscores only
            if !scope.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ConfigError::InvalidScopes {
                    reason: format!("Invalid characters in scope: '{scope}'"),
                });
            }

            scopes.push(scope);
        }

        if scopes.is_empty() {
            return Err(ConfigError::InvalidScopes {
                reason: "at least one scope is required".to_string(),
            });
        }

        Ok(scopes)
    }
}

impl fmt::Display for AuthScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scopes.join(","))
    }
}
