//! Admin API routes the proxy refuses to forward.
//!
//! These cover billing, app-level credentials, storefront tokens, script
//! injection and webhook registration: resources a browser-side caller must
//! never reach with the shop's token.

/// Blacklisted routes, sorted for binary search.
pub const BLACKLIST: [&str; 9] = [
    "/application_charges",
    "/application_credits",
    "/carrier_services",
    "/fulfillment_services",
    "/oauth",
    "/recurring_application_charges",
    "/script_tags",
    "/storefront_access_token",
    "/webhooks",
];

/// Returns `true` if `route` exactly matches a blacklisted route.
///
/// ```rust
/// use shopify_oauth_proxy::proxy::is_blacklisted;
///
/// assert!(is_blacklisted("/webhooks"));
/// assert!(!is_blacklisted("/orders"));
/// ```
#[must_use]
pub fn is_blacklisted(route: &str) -> bool {
    BLACKLIST.binary_search(&route).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blacklist_is_sorted() {
        let mut sorted = BLACKLIST;
        sorted.sort_unstable();
        assert_eq!(sorted, BLACKLIST);
    }

    #[test]
    fn test_every_entry_is_blacklisted() {
        for route in BLACKLIST {
            assert!(is_blacklisted(route), "{route}");
        }
    }

    #[test]
    fn test_match_is_exact() {
        assert!(!is_blacklisted("/webhook"));
        assert!(!is_blacklisted("/webhooks/count"));
        assert!(!is_blacklisted("webhooks"));
        assert!(!is_blacklisted("/WEBHOOKS"));
        assert!(!is_blacklisted(""));
    }

    #[test]
    fn test_common_routes_are_allowed() {
        for route in ["/shop", "/orders", "/products", "/themes", "/pages"] {
            assert!(!is_blacklisted(route), "{route}");
        }
    }
}
