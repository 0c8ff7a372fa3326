//! Endpoint set derived from a tenant namespace.

// self
use crate::{_prelude::*, config::StrategyConfig, error::ConfigError};

const AUTHORIZE_PATH: &str = "/oauth/authorize";
const TOKEN_PATH: &str = "/oauth/token";
const USERINFO_PATH: &str = "/userinfo";

/// URL scheme selected by the `secure` option.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
	/// Plain HTTP (the default).
	#[default]
	Http,
	/// HTTP over TLS.
	Https,
}
impl Protocol {
	/// Picks `https` when `secure` is true.
	pub fn from_secure(secure: bool) -> Self {
		if secure { Self::Https } else { Self::Http }
	}

	/// Returns the URL scheme.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Http => "http",
			Self::Https => "https",
		}
	}
}
impl Display for Protocol {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Immutable endpoint set shared by every phase of a login attempt.
///
/// Every endpoint is `{protocol}://{namespace}` followed by a fixed suffix, so all four share
/// protocol and host. The strings are kept exactly as formatted; each one is parsed once at
/// construction so invalid namespaces fail early. Deserialization goes through the same
/// derivation from the serialized `protocol` and `site`; the endpoint URLs are recomputed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SerializedEndpoints")]
pub struct EndpointSet {
	protocol: Protocol,
	site: String,
	authorize_url: String,
	token_url: String,
	userinfo_url: String,
}
impl EndpointSet {
	/// Derives the endpoint set for `namespace`.
	pub fn new(namespace: &str, protocol: Protocol) -> Result<Self, ConfigError> {
		if namespace.trim().is_empty() {
			return Err(ConfigError::MissingNamespace);
		}

		let site = format!("{protocol}://{namespace}");
		let endpoints = Self {
			protocol,
			authorize_url: format!("{site}{AUTHORIZE_PATH}"),
			token_url: format!("{site}{TOKEN_PATH}"),
			userinfo_url: format!("{site}{USERINFO_PATH}"),
			site,
		};

		for raw in [
			&endpoints.site,
			&endpoints.authorize_url,
			&endpoints.token_url,
			&endpoints.userinfo_url,
		] {
			Url::parse(raw).map_err(|source| ConfigError::InvalidNamespace {
				namespace: namespace.to_owned(),
				source,
			})?;
		}

		Ok(endpoints)
	}

	/// Derives the endpoint set from a strategy config.
	pub fn from_config(config: &StrategyConfig) -> Result<Self, ConfigError> {
		Self::new(config.validated_namespace()?, Protocol::from_secure(config.secure))
	}

	/// Protocol shared by all endpoints.
	pub fn protocol(&self) -> Protocol {
		self.protocol
	}

	/// Provider base URL.
	pub fn site(&self) -> &str {
		&self.site
	}

	/// Authorization endpoint.
	pub fn authorize_url(&self) -> &str {
		&self.authorize_url
	}

	/// Token endpoint.
	pub fn token_url(&self) -> &str {
		&self.token_url
	}

	/// User-info endpoint.
	pub fn userinfo_url(&self) -> &str {
		&self.userinfo_url
	}

	/// Parsed user-info endpoint.
	pub fn userinfo(&self) -> Result<Url, ConfigError> {
		Url::parse(&self.userinfo_url).map_err(|source| ConfigError::InvalidNamespace {
			namespace: self.namespace().to_owned(),
			source,
		})
	}

	/// Namespace the endpoints were derived from.
	pub fn namespace(&self) -> &str {
		self.site.split_once("://").map_or(self.site.as_str(), |(_, rest)| rest)
	}
}

impl TryFrom<SerializedEndpoints> for EndpointSet {
	type Error = ConfigError;

	fn try_from(raw: SerializedEndpoints) -> Result<Self, Self::Error> {
		let namespace = raw
			.site
			.strip_prefix(raw.protocol.as_str())
			.and_then(|rest| rest.strip_prefix("://"))
			.ok_or_else(|| ConfigError::SiteProtocolMismatch {
				site: raw.site.clone(),
				protocol: raw.protocol,
			})?;

		Self::new(namespace, raw.protocol)
	}
}

#[derive(Deserialize)]
struct SerializedEndpoints {
	protocol: Protocol,
	site: String,
}
