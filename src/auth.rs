//! Access-token models and the credential view surfaced to the host middleware.

pub mod credentials;
pub mod token;

pub use credentials::*;
pub use token::{access::*, secret::*};
