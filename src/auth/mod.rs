//! Authentication types.
//!
//! # Overview
//!
//! - [`AuthScopes`]: the ordered scope list requested during authorization
//! - [`Session`]: a shop together with its access token
//! - [`AccessToken`]: an opaque token whose `Debug` output is masked
//! - [`oauth`]: the authorization code handshake
//!
//! # Example
//!
//! ```rust
//! use shopify_oauth_proxy::{AccessToken, Session, ShopDomain};
//!
//! let session = Session::from_cookie_values(
//!     Some("my-store.myshopify.com"),
//!     Some("shpat_abc"),
//! )
//! .unwrap();
//!
//! assert_eq!(session.shop, ShopDomain::new("my-store").unwrap());
//! assert_eq!(session.access_token, AccessToken::new("shpat_abc").unwrap());
//! ```

pub mod oauth;
mod scopes;
pub mod session;

pub use scopes::AuthScopes;
pub use session::{AccessToken, AccessTokenResponse, Session};
