//! Strategy configuration: tenant namespace, protocol selection, and ambient options.
//!
//! [`StrategyConfig`] deserializes from JSON (or any serde format) with defaults for every
//! optional field, and offers a builder-style API for programmatic construction. Validation
//! happens when the strategy is built, so a config value itself may be incomplete.

// self
use crate::{_prelude::*, error::ConfigError, provider::IdentityVariant};

/// Options accepted by the strategy at construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
	/// Host plus optional path identifying the tenant's provider instance.
	pub namespace: Option<String>,
	/// Selects `https` instead of `http` for every derived endpoint.
	pub secure: bool,
	/// Provider label recorded in the auth hash.
	pub name: String,
	/// Skips callback `state` verification when true.
	pub provider_ignores_state: bool,
	/// Which `info` mapping to apply to the identity document.
	pub identity: IdentityVariant,
	/// Space-delimited scopes forwarded in the authorize request.
	pub scope: Option<String>,
	/// Default redirect URI registered with the OAuth client.
	pub callback_url: Option<Url>,
}
impl StrategyConfig {
	/// Provider label used when none is configured.
	pub const DEFAULT_NAME: &'static str = "auth_provider";

	/// Creates a config for the provided namespace with every other option defaulted.
	pub fn new(namespace: impl Into<String>) -> Self {
		Self { namespace: Some(namespace.into()), ..Default::default() }
	}

	/// Parses a JSON configuration document, reporting the failing path on error.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(&mut de).map_err(|source| ConfigError::Malformed { source })
	}

	/// Toggles `https` endpoints.
	pub fn secure(mut self, secure: bool) -> Self {
		self.secure = secure;

		self
	}

	/// Overrides the provider label.
	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();

		self
	}

	/// Overrides whether callback `state` verification is skipped.
	pub fn provider_ignores_state(mut self, ignores: bool) -> Self {
		self.provider_ignores_state = ignores;

		self
	}

	/// Selects the identity mapping variant.
	pub fn identity(mut self, variant: IdentityVariant) -> Self {
		self.identity = variant;

		self
	}

	/// Sets the requested scopes.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Sets the default redirect URI.
	pub fn callback_url(mut self, url: Url) -> Self {
		self.callback_url = Some(url);

		self
	}

	/// Returns the namespace when it is present and not blank.
	pub fn validated_namespace(&self) -> Result<&str, ConfigError> {
		self.namespace
			.as_deref()
			.filter(|namespace| !namespace.trim().is_empty())
			.ok_or(ConfigError::MissingNamespace)
	}
}
impl Default for StrategyConfig {
	fn default() -> Self {
		Self {
			namespace: None,
			secure: false,
			name: Self::DEFAULT_NAME.into(),
			provider_ignores_state: true,
			identity: IdentityVariant::default(),
			scope: None,
			callback_url: None,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_apply_to_sparse_documents() {
		let config = StrategyConfig::from_json_str(r#"{"namespace":"test.dummy-provider.dev"}"#)
			.expect("Sparse config should deserialize.");

		assert_eq!(config.namespace.as_deref(), Some("test.dummy-provider.dev"));
		assert!(!config.secure);
		assert_eq!(config.name, "auth_provider");
		assert!(config.provider_ignores_state);
		assert_eq!(config.identity, IdentityVariant::Profile);
		assert_eq!(config.scope, None);
		assert_eq!(config.callback_url, None);
	}

	#[test]
	fn malformed_documents_report_the_failing_path() {
		let err = StrategyConfig::from_json_str(r#"{"namespace":"x","secure":"yes"}"#)
			.expect_err("A string `secure` flag must be rejected.");
		let ConfigError::Malformed { source } = err else {
			panic!("Expected a malformed-config error.");
		};

		assert_eq!(source.path().to_string(), "secure");
	}

	#[test]
	fn blank_namespaces_are_rejected() {
		assert!(matches!(
			StrategyConfig::default().validated_namespace(),
			Err(ConfigError::MissingNamespace)
		));
		assert!(matches!(
			StrategyConfig::new("").validated_namespace(),
			Err(ConfigError::MissingNamespace)
		));
		assert!(matches!(
			StrategyConfig::new("   ").validated_namespace(),
			Err(ConfigError::MissingNamespace)
		));
		assert_eq!(
			StrategyConfig::new("tenant.example.com")
				.validated_namespace()
				.expect("Non-blank namespace should validate."),
			"tenant.example.com"
		);
	}

	#[test]
	fn builder_overrides_defaults() {
		let callback =
			Url::parse("https://app.example.com/auth/callback").expect("Callback URL should parse.");
		let config = StrategyConfig::new("tenant.example.com")
			.secure(true)
			.name("tenant_sso")
			.provider_ignores_state(false)
			.identity(IdentityVariant::Contact)
			.scope("public")
			.callback_url(callback.clone());

		assert!(config.secure);
		assert_eq!(config.name, "tenant_sso");
		assert!(!config.provider_ignores_state);
		assert_eq!(config.identity, IdentityVariant::Contact);
		assert_eq!(config.scope.as_deref(), Some("public"));
		assert_eq!(config.callback_url, Some(callback));
	}
}
