//! OAuth client seam injected into the strategy.
//!
//! [`OAuth2Client`] is the generic OAuth 2.0 capability the strategy composes with: it issues
//! the base authorize parameters (including the anti-forgery `state`), builds the authorize URL,
//! exchanges codes for tokens, remembers the current token, and performs bearer-authenticated
//! `GET`s. [`BasicOAuth2Client`] implements it on top of the `oauth2` crate and any
//! [`HttpTransport`].

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AsyncHttpClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet,
	EndpointSet as Configured, HttpClientError, RedirectUrl, RequestTokenError, TokenResponse,
	TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION},
	},
};
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, TokenSecret},
	error::{ConfigError, IdentityFetchError, TransientError, TransportError},
	http::{HttpTransport, ResponseMetadataSlot},
	provider::{AuthorizeParams, EndpointSet},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

type ConfiguredBasicClient =
	BasicClient<Configured, EndpointNotSet, EndpointNotSet, EndpointNotSet, Configured>;

/// Boxed future returned by [`OAuth2Client`] operations.
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// OAuth client specialized for the crate's default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestOAuth2Client = BasicOAuth2Client<ReqwestHttpClient>;

const STATE_LEN: usize = 48;

/// Everything the strategy hands to the OAuth client it configures.
#[derive(Clone, Debug)]
pub struct ClientSettings {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret; empty for public clients.
	pub client_secret: TokenSecret,
	/// Endpoints derived from the namespace.
	pub endpoints: EndpointSet,
	/// Default redirect URI registered with the provider.
	pub redirect_uri: Option<Url>,
	/// Space-delimited scopes requested during authorization.
	pub scope: Option<String>,
}

/// Body of a successful bearer `GET`, with the status it arrived with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchedBody {
	/// HTTP status code of the response.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}

/// Generic OAuth 2.0 capability composed into the strategy.
///
/// Instances are request-scoped like the strategy itself; the current token lives inside the
/// client once [`exchange_code`](OAuth2Client::exchange_code) succeeds.
pub trait OAuth2Client: Send + Sync {
	/// Returns the base authorize parameters, including a fresh anti-forgery `state`.
	fn authorize_params(&self) -> AuthorizeParams;

	/// Builds the authorize URL carrying `params`.
	fn authorize_url(&self, params: &AuthorizeParams) -> Result<Url>;

	/// Exchanges an authorization code and records the issued token as current.
	///
	/// `redirect_uri` overrides the configured redirect, for flows that forwarded a caller
	/// supplied one during the request phase.
	fn exchange_code<'a>(
		&'a self,
		code: &'a str,
		redirect_uri: Option<&'a str>,
	) -> ClientFuture<'a, AccessToken>;

	/// Returns the token recorded by the last successful exchange.
	fn current_token(&self) -> Option<AccessToken>;

	/// Performs a bearer-authenticated `GET` with the current token.
	///
	/// Non-success statuses and transport failures surface as [`Error::IdentityFetch`].
	fn get<'a>(&'a self, url: &'a Url) -> ClientFuture<'a, FetchedBody>;
}

/// [`OAuth2Client`] backed by the `oauth2` crate.
pub struct BasicOAuth2Client<C>
where
	C: HttpTransport,
{
	settings: ClientSettings,
	oauth_client: ConfiguredBasicClient,
	http_client: Arc<C>,
	current: Mutex<Option<AccessToken>>,
}
impl<C> BasicOAuth2Client<C>
where
	C: HttpTransport,
{
	/// Configures the `oauth2` client from `settings`.
	pub fn from_settings(settings: ClientSettings, http_client: impl Into<Arc<C>>) -> Result<Self> {
		let invalid_namespace = |source| ConfigError::InvalidNamespace {
			namespace: settings.endpoints.namespace().to_owned(),
			source,
		};
		let auth_url = AuthUrl::new(settings.endpoints.authorize_url().to_owned())
			.map_err(invalid_namespace)?;
		let token_url =
			TokenUrl::new(settings.endpoints.token_url().to_owned()).map_err(invalid_namespace)?;
		let mut oauth_client = BasicClient::new(ClientId::new(settings.client_id.clone()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url);

		if !settings.client_secret.is_empty() {
			oauth_client = oauth_client
				.set_client_secret(ClientSecret::new(settings.client_secret.expose().to_owned()));
		}
		if let Some(redirect) = settings.redirect_uri.as_ref() {
			let redirect_url = RedirectUrl::new(redirect.to_string())
				.map_err(|source| ConfigError::InvalidCallbackUrl { source })?;

			oauth_client = oauth_client.set_redirect_uri(redirect_url);
		}

		Ok(Self {
			settings,
			oauth_client,
			http_client: http_client.into(),
			current: Mutex::new(None),
		})
	}

	/// Settings this client was configured with.
	pub fn settings(&self) -> &ClientSettings {
		&self.settings
	}

	/// Seeds the current token, for hosts that restore a token obtained elsewhere.
	pub fn with_token(self, token: AccessToken) -> Self {
		*self.current.lock() = Some(token);

		self
	}
}
#[cfg(feature = "reqwest")]
impl BasicOAuth2Client<ReqwestHttpClient> {
	/// Configures a client on a fresh redirect-free reqwest transport.
	pub fn reqwest(settings: ClientSettings) -> Result<Self> {
		Self::from_settings(settings, ReqwestHttpClient::new()?)
	}
}
impl<C> OAuth2Client for BasicOAuth2Client<C>
where
	C: HttpTransport,
{
	fn authorize_params(&self) -> AuthorizeParams {
		let mut params = AuthorizeParams::new();

		params.insert("response_type".into(), "code".into());
		params.insert("client_id".into(), self.settings.client_id.clone());

		if let Some(redirect) = self.settings.redirect_uri.as_ref() {
			params.insert("redirect_uri".into(), redirect.to_string());
		}
		if let Some(scope) = self.settings.scope.as_ref() {
			params.insert("scope".into(), scope.clone());
		}

		params.insert("state".into(), random_string(STATE_LEN));

		params
	}

	fn authorize_url(&self, params: &AuthorizeParams) -> Result<Url> {
		let mut url = Url::parse(self.settings.endpoints.authorize_url()).map_err(|source| {
			ConfigError::InvalidNamespace {
				namespace: self.settings.endpoints.namespace().to_owned(),
				source,
			}
		})?;
		let mut pairs = url.query_pairs_mut();

		for (key, value) in params {
			pairs.append_pair(key, value);
		}

		drop(pairs);

		Ok(url)
	}

	fn exchange_code<'a>(
		&'a self,
		code: &'a str,
		redirect_uri: Option<&'a str>,
	) -> ClientFuture<'a, AccessToken> {
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let handle = self.http_client.with_metadata(meta.clone());
			let mut request =
				self.oauth_client.exchange_code(AuthorizationCode::new(code.to_owned()));

			if let Some(redirect) = redirect_uri {
				let redirect_url = RedirectUrl::new(redirect.to_owned())
					.map_err(|source| ConfigError::InvalidCallbackUrl { source })?;

				request = request.set_redirect_uri(Cow::Owned(redirect_url));
			}

			let response = request
				.request_async(&handle)
				.await
				.map_err(|err| map_request_error(meta.status(), err))?;
			let token = map_token_response(&response, meta.status())?;

			*self.current.lock() = Some(token.clone());

			Ok(token)
		})
	}

	fn current_token(&self) -> Option<AccessToken> {
		self.current.lock().clone()
	}

	fn get<'a>(&'a self, url: &'a Url) -> ClientFuture<'a, FetchedBody> {
		Box::pin(async move {
			let token = self.current_token().ok_or(IdentityFetchError::MissingAccessToken)?;
			let request = Request::builder()
				.method(Method::GET)
				.uri(url.as_str())
				.header(AUTHORIZATION, format!("Bearer {}", token.access_token.expose()))
				.header(ACCEPT, "application/json")
				.body(Vec::new())
				.map_err(|source| IdentityFetchError::Request { source })?;
			// The status is read straight off the response; the slot only satisfies the transport.
			let handle = self.http_client.with_metadata(ResponseMetadataSlot::default());
			let response = handle.call(request).await.map_err(map_fetch_error)?;
			let status = response.status().as_u16();

			if !response.status().is_success() {
				return Err(IdentityFetchError::Status { status }.into());
			}

			Ok(FetchedBody { status, body: response.into_body() })
		})
	}
}
impl<C> Debug for BasicOAuth2Client<C>
where
	C: HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BasicOAuth2Client")
			.field("client_id", &self.settings.client_id)
			.field("endpoints", &self.settings.endpoints)
			.field("token_set", &self.current.lock().is_some())
			.finish()
	}
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn map_token_response(response: &BasicTokenResponse, status: Option<u16>) -> Result<AccessToken> {
	let mut token = AccessToken::new(
		response.access_token().secret().to_owned(),
		response.token_type().as_ref().to_owned(),
	);

	if let Some(expires_in) = response.expires_in() {
		let out_of_range = || TransientError::TokenEndpoint {
			message: format!("expires_in of {}s exceeds the supported range", expires_in.as_secs()),
			status,
		};
		let secs = i64::try_from(expires_in.as_secs()).map_err(|_| out_of_range())?;

		token = token
			.with_expires_in(OffsetDateTime::now_utc(), Duration::seconds(secs))
			.ok_or_else(out_of_range)?;
	}
	if let Some(refresh) = response.refresh_token() {
		token = token.with_refresh_token(refresh.secret().to_owned());
	}
	if let Some(scopes) = response.scopes() {
		let scope = scopes.iter().map(|scope| scope.as_str()).collect::<Vec<_>>().join(" ");

		token = token.with_param("scope", scope);
	}

	Ok(token)
}

fn map_request_error<E>(
	status: Option<u16>,
	err: BasicRequestTokenError<HttpClientError<E>>,
) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		RequestTokenError::ServerResponse(response) => map_server_response_error(status, response),
		RequestTokenError::Request(error) => map_transport_error(status, error),
		RequestTokenError::Parse(error, _body) =>
			TransientError::TokenResponseParse { source: error, status }.into(),
		RequestTokenError::Other(message) =>
			TransientError::TokenEndpoint { message, status }.into(),
	}
}

fn map_server_response_error(status: Option<u16>, response: BasicErrorResponse) -> Error {
	let code = response.error().as_ref().to_owned();
	let reason = response.error_description().cloned().unwrap_or_else(|| code.clone());

	match code.as_str() {
		"invalid_grant" | "access_denied" => Error::InvalidGrant { reason },
		"invalid_client" | "unauthorized_client" => Error::InvalidClient { reason },
		_ => TransientError::TokenEndpoint {
			message: format!("provider answered `{code}` ({reason})"),
			status,
		}
		.into(),
	}
}

fn map_transport_error<E>(status: Option<u16>, err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TransportError::network(*inner).into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransientError::TokenEndpoint {
			message: format!("transport reported {message}"),
			status,
		}
		.into(),
		_ => TransientError::TokenEndpoint {
			message: "transport failed without details".into(),
			status,
		}
		.into(),
	}
}

fn map_fetch_error<E>(err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => IdentityFetchError::network(*inner),
		HttpClientError::Http(source) => IdentityFetchError::Request { source },
		HttpClientError::Io(inner) => IdentityFetchError::network(inner),
		HttpClientError::Other(message) => IdentityFetchError::network(std::io::Error::other(message)),
		_ => IdentityFetchError::network(std::io::Error::other("unknown HTTP client failure")),
	}
	.into()
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::provider::Protocol;

	fn settings(secret: &str, redirect: Option<&str>) -> ClientSettings {
		ClientSettings {
			client_id: "client_id".into(),
			client_secret: TokenSecret::new(secret),
			endpoints: EndpointSet::new("test.dummy-provider.dev", Protocol::Http)
				.expect("Namespace fixture should derive endpoints."),
			redirect_uri: redirect
				.map(|value| Url::parse(value).expect("Redirect fixture should parse.")),
			scope: Some("public profile".into()),
		}
	}

	fn client(secret: &str, redirect: Option<&str>) -> ReqwestOAuth2Client {
		let transport = ReqwestHttpClient::new().expect("Redirect-free transport should build.");

		BasicOAuth2Client::from_settings(settings(secret, redirect), transport)
			.expect("Client should configure from valid settings.")
	}

	#[test]
	fn base_params_carry_state_and_registration() {
		let client = client("client_secret", Some("https://app.example.com/auth/callback"));
		let params = client.authorize_params();

		assert_eq!(params.get("response_type").map(String::as_str), Some("code"));
		assert_eq!(params.get("client_id").map(String::as_str), Some("client_id"));
		assert_eq!(
			params.get("redirect_uri").map(String::as_str),
			Some("https://app.example.com/auth/callback")
		);
		assert_eq!(params.get("scope").map(String::as_str), Some("public profile"));
		assert_eq!(params.get("state").map(String::len), Some(STATE_LEN));
		assert_ne!(client.authorize_params().get("state"), params.get("state"));
	}

	#[test]
	fn authorize_url_appends_params_to_endpoint() {
		let client = client("", None);
		let mut params = AuthorizeParams::new();

		params.insert("state".into(), "abc".into());
		params.insert("redirect_uri".into(), "https://app.example.com/cb?x=1".into());

		let url = client.authorize_url(&params).expect("Authorize URL should build.");
		let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();

		assert_eq!(url.scheme(), "http");
		assert_eq!(url.host_str(), Some("test.dummy-provider.dev"));
		assert_eq!(url.path(), "/oauth/authorize");
		assert_eq!(pairs.get("state").map(String::as_str), Some("abc"));
		assert_eq!(
			pairs.get("redirect_uri").map(String::as_str),
			Some("https://app.example.com/cb?x=1")
		);
	}

	#[test]
	fn current_token_starts_empty_and_can_be_seeded() {
		let client = client("client_secret", None);

		assert!(client.current_token().is_none());

		let client = client.with_token(AccessToken::new("seeded", "bearer"));

		assert_eq!(
			client.current_token().map(|token| token.access_token.expose().to_owned()),
			Some("seeded".into())
		);
		assert!(format!("{client:?}").contains("token_set: true"));
	}

	#[tokio::test]
	async fn get_without_token_fails_before_dispatch() {
		let client = client("client_secret", None);
		let url = client
			.settings()
			.endpoints
			.userinfo()
			.expect("User-info endpoint should parse.");
		let err = client.get(&url).await.expect_err("GET without a token must fail.");

		assert!(matches!(err, Error::IdentityFetch(IdentityFetchError::MissingAccessToken)));
	}
}
