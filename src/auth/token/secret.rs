//! Redacting wrapper for client secrets, access tokens, and refresh tokens.

// self
use crate::_prelude::*;

/// Secret string that never prints its value.
///
/// Serializes as the plain string so credentials can be handed to the host unchanged.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a secret value.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the secret value; keep it out of logs.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Whether the secret is empty, as for public clients without a client secret.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl From<String> for TokenSecret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenSecret(..)")
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("[redacted]")
	}
}
