//! Strategy-level error types shared across configuration, token exchange, and identity mapping.

// self
use crate::{_prelude::*, provider::Protocol};

/// Strategy-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical strategy error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Invalid strategy configuration; fatal to the construction attempt.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The user-info document could not be fetched or parsed.
	#[error(transparent)]
	IdentityFetch(#[from] IdentityFetchError),
	/// Temporary upstream failure during the token exchange.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS) during the token exchange.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Provider rejected the authorization code.
	#[error("Provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Client authentication failed at the token endpoint.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// The provider redirected back with an `error` parameter.
	#[error("Provider denied the authorization request: {error}.")]
	AccessDenied {
		/// OAuth `error` parameter from the callback.
		error: String,
		/// OAuth `error_description` parameter, when supplied.
		description: Option<String>,
	},
	/// The callback `state` does not match the value issued in the request phase.
	#[error("Callback state does not match the issued state.")]
	CsrfDetected,
	/// The callback carries no authorization `code`.
	#[error("Callback is missing the authorization code.")]
	MissingCode,
	/// The identity document has no `uid` field.
	#[error("Identity document is missing the uid field.")]
	MissingUid,
}

/// Configuration and validation failures raised while building a strategy.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Namespace is absent or blank.
	#[error("Namespace is required to derive provider endpoints.")]
	MissingNamespace,
	/// Namespace does not form a valid endpoint URL.
	#[error("Namespace `{namespace}` does not form a valid endpoint URL.")]
	InvalidNamespace {
		/// Namespace as supplied by the caller.
		namespace: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Serialized endpoint site does not use the serialized protocol.
	#[error("Site `{site}` does not use the `{protocol}` scheme.")]
	SiteProtocolMismatch {
		/// Site as serialized.
		site: String,
		/// Protocol as serialized.
		protocol: Protocol,
	},
	/// Configured callback URL cannot be parsed.
	#[error("Callback URL is invalid.")]
	InvalidCallbackUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Configuration document cannot be deserialized.
	#[error("Strategy configuration is malformed.")]
	Malformed {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The default reqwest transport failed to build.
	#[error("Transport for the provider endpoints could not be built.")]
	HttpClientBuild {
		/// Builder failure reported by the transport.
		#[source]
		source: BoxError,
	},
	/// An outgoing request to the provider could not be assembled.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
}
impl ConfigError {
	/// Boxes a transport builder failure.
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures raised while fetching the user-info document.
#[derive(Debug, ThisError)]
pub enum IdentityFetchError {
	/// No access token is available; the code exchange has not happened yet.
	#[error("No access token is available for the user-info request.")]
	MissingAccessToken,
	/// The user-info request could not be built.
	#[error("User-info request could not be built.")]
	Request {
		/// Underlying request builder failure.
		#[source]
		source: oauth2::http::Error,
	},
	/// The user-info endpoint could not be reached.
	#[error("User-info endpoint could not be reached.")]
	Network {
		/// Failure reported by the transport.
		#[source]
		source: BoxError,
	},
	/// The user-info endpoint answered with a non-success status.
	#[error("User-info endpoint returned HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
	},
	/// The user-info body is not a JSON object.
	#[error("User-info endpoint returned a malformed document.")]
	Parse {
		/// Path-aware JSON failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// Upstream status, if the transport recorded one.
		status: Option<u16>,
	},
}
impl IdentityFetchError {
	/// Boxes a transport failure raised while reaching the user-info endpoint.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}

/// Code-exchange failures that may succeed on a later login attempt.
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// The token endpoint answered with something other than a token or a known OAuth error.
	#[error("Code exchange failed: {message}.")]
	TokenEndpoint {
		/// Summary of what the endpoint returned.
		message: String,
		/// Upstream status, if the transport recorded one.
		status: Option<u16>,
	},
	/// The token endpoint body could not be parsed.
	#[error("Token endpoint body could not be parsed.")]
	TokenResponseParse {
		/// Path-aware JSON failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// Upstream status, if the transport recorded one.
		status: Option<u16>,
	},
}

/// The token endpoint could not be reached.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Connection, DNS, or TLS failure reported by the transport.
	#[error("Token endpoint could not be reached.")]
	Network {
		/// Failure reported by the transport.
		#[source]
		source: BoxError,
	},
	/// I/O failure while talking to the token endpoint.
	#[error("I/O failed during the code exchange.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Boxes a transport failure raised during the code exchange.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
