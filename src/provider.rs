//! Provider-facing pieces of the auth-provider strategy.
//!
//! `endpoints` derives the namespaced endpoint set, `params` holds the pure request and
//! callback parameter helpers, `identity` models the user-info document and its mappings, and
//! `strategy` ties them to an injected [`OAuth2Client`](crate::oauth::OAuth2Client).

pub mod endpoints;
pub mod identity;
pub mod params;
pub mod strategy;

pub use endpoints::*;
pub use identity::*;
pub use params::*;
pub use strategy::*;
