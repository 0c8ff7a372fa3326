//! Credential view handed to the host middleware after a successful callback.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, TokenSecret},
};

/// Credentials derived from the current [`AccessToken`].
///
/// `token` carries the token exactly as the exchange produced it. The flattened
/// `expires`/`expires_at`/`refresh_token` fields are conveniences for hosts that only
/// persist a few scalars; `refresh_token` is promoted only for expiring tokens.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
	/// Full token as issued.
	pub token: AccessToken,
	/// Indicates whether the token carries an expiry.
	pub expires: bool,
	/// Expiry as Unix seconds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expires_at: Option<i64>,
	/// Refresh secret for expiring tokens.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<TokenSecret>,
}
impl From<&AccessToken> for Credentials {
	fn from(token: &AccessToken) -> Self {
		let expires = token.expires();
		let expires_at = token.expires_at.map(OffsetDateTime::unix_timestamp);
		let refresh_token = if expires { token.refresh_token.clone() } else { None };

		Self { token: token.clone(), expires, expires_at, refresh_token }
	}
}
impl From<AccessToken> for Credentials {
	fn from(token: AccessToken) -> Self {
		Self::from(&token)
	}
}
