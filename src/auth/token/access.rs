// self
use crate::{_prelude::*, auth::TokenSecret};

/// Access token issued by the provider's token endpoint.
///
/// Fields mirror the token response as delivered; the strategy never rewrites them. Extra
/// response members (for example `scope`) land in [`AccessToken::params`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
	/// Bearer secret sent on authenticated requests.
	pub access_token: TokenSecret,
	/// Token type reported by the provider (usually `bearer`).
	pub token_type: String,
	/// Absolute expiry instant, when the provider reported `expires_in`.
	#[serde(default, with = "time::serde::timestamp::option", skip_serializing_if = "Option::is_none")]
	pub expires_at: Option<OffsetDateTime>,
	/// Refresh secret, when issued.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<TokenSecret>,
	/// Additional response parameters.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub params: BTreeMap<String, JsonValue>,
}
impl AccessToken {
	/// Creates a token with no expiry, refresh secret, or extra parameters.
	pub fn new(access_token: impl Into<String>, token_type: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			token_type: token_type.into(),
			expires_at: None,
			refresh_token: None,
			params: BTreeMap::new(),
		}
	}

	/// Sets the absolute expiry instant.
	pub fn with_expires_at(mut self, expires_at: OffsetDateTime) -> Self {
		self.expires_at = Some(expires_at);

		self
	}

	/// Derives the expiry instant from an `expires_in` relative to `issued_at`.
	///
	/// Returns `None` when the instant falls outside the representable range.
	pub fn with_expires_in(self, issued_at: OffsetDateTime, expires_in: Duration) -> Option<Self> {
		let expires_at = issued_at.checked_add(expires_in)?;

		Some(self.with_expires_at(expires_at))
	}

	/// Attaches a refresh secret.
	pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(refresh_token));

		self
	}

	/// Adds an extra response parameter.
	pub fn with_param(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
		self.params.insert(key.into(), value.into());

		self
	}

	/// Returns true when the provider reported an expiry.
	pub fn expires(&self) -> bool {
		self.expires_at.is_some()
	}

	/// Returns true when the token has an expiry at or before `now`.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|at| at <= now)
	}
}
