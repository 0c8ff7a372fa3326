//! Token material produced by the code exchange.

/// Access token type.
pub mod access;
pub mod secret;
