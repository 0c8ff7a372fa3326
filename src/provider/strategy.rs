//! The auth-provider strategy: endpoint configuration, request-phase parameters, and the
//! callback-phase identity mapping.
//!
//! A [`ProviderStrategy`] is built once per login attempt. It derives the [`EndpointSet`],
//! hands it to the injected [`OAuth2Client`], and afterwards only post-processes what that
//! client produces. The user-info document is fetched on first use and cached in the instance,
//! so `uid`, `info`, and `extra` share one round trip.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Credentials, TokenSecret},
	config::StrategyConfig,
	error::IdentityFetchError,
	oauth::{ClientSettings, OAuth2Client},
	obs::{self, Phase, PhaseSpan},
	provider::{
		AuthorizeParams, EndpointSet, IdentityDocument, IdentityExtra, IdentityInfo,
		IdentityMapper, params,
	},
};
#[cfg(feature = "reqwest")] use crate::oauth::{BasicOAuth2Client, ReqwestOAuth2Client};

/// Strategy specialized for the crate's default reqwest-backed OAuth client.
#[cfg(feature = "reqwest")]
pub type ReqwestProviderStrategy = ProviderStrategy<ReqwestOAuth2Client>;

/// Redirect target produced by [`ProviderStrategy::request_phase`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationRequest {
	/// Authorize URL to send the browser to.
	pub authorize_url: Url,
	/// Anti-forgery state the host must keep for the callback.
	pub state: Option<String>,
	/// Parameters encoded into [`AuthorizationRequest::authorize_url`].
	pub params: AuthorizeParams,
}

/// Identity result handed to the host middleware after a callback.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthHash {
	/// Provider label from [`StrategyConfig::name`].
	pub provider: String,
	/// Unique identifier.
	pub uid: String,
	/// Contact (and optionally display) fields.
	pub info: IdentityInfo,
	/// Credentials for the current token.
	pub credentials: Option<Credentials>,
	/// Raw user-info document.
	pub extra: IdentityExtra,
}

/// OAuth 2.0 strategy for a namespaced auth-provider instance.
///
/// Instances are request-scoped. Operations that may fetch the identity document take
/// `&mut self`, which keeps the cache single-owner without any locking.
pub struct ProviderStrategy<C>
where
	C: OAuth2Client,
{
	config: StrategyConfig,
	endpoints: EndpointSet,
	client: C,
	mapper: Arc<dyn IdentityMapper>,
	raw_info: Option<IdentityDocument>,
}
impl<C> ProviderStrategy<C>
where
	C: OAuth2Client,
{
	/// Builds a strategy around the OAuth client returned by `connect`.
	///
	/// Fails with [`Error::Config`] when the namespace is missing, blank, or does not form a
	/// valid URL; `connect` is never invoked in that case.
	pub fn with_client<F>(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		config: StrategyConfig,
		connect: F,
	) -> Result<Self>
	where
		F: FnOnce(ClientSettings) -> Result<C>,
	{
		let endpoints = EndpointSet::from_config(&config)?;
		let settings = ClientSettings {
			client_id: client_id.into(),
			client_secret: TokenSecret::new(client_secret),
			endpoints: endpoints.clone(),
			redirect_uri: config.callback_url.clone(),
			scope: config.scope.clone(),
		};
		let client = connect(settings)?;
		let mapper = config.identity.mapper();

		Ok(Self { config, endpoints, client, mapper, raw_info: None })
	}

	/// Replaces the identity mapper selected by [`StrategyConfig::identity`].
	pub fn with_identity_mapper(mut self, mapper: Arc<dyn IdentityMapper>) -> Self {
		self.mapper = mapper;

		self
	}

	/// Configuration the strategy was built with.
	pub fn config(&self) -> &StrategyConfig {
		&self.config
	}

	/// Derived endpoint set.
	pub fn endpoints(&self) -> &EndpointSet {
		&self.endpoints
	}

	/// Injected OAuth client.
	pub fn client(&self) -> &C {
		&self.client
	}

	/// Provider label.
	pub fn name(&self) -> &str {
		&self.config.name
	}

	/// Forwards the inbound `redirect_uri`, when present, into `base`.
	pub fn build_authorization_params(
		&self,
		base: AuthorizeParams,
		request_params: &HashMap<String, String>,
	) -> AuthorizeParams {
		params::forward_redirect_uri(base, request_params)
	}

	/// Returns the client's base authorize parameters with the inbound `redirect_uri` applied.
	pub fn authorize_params(&self, request_params: &HashMap<String, String>) -> AuthorizeParams {
		self.build_authorization_params(self.client.authorize_params(), request_params)
	}

	/// Strips `code` and `state` from a callback query string; see
	/// [`sanitized_query_string`](params::sanitized_query_string).
	pub fn sanitized_query_string(&self, raw: &str) -> String {
		params::sanitized_query_string(raw)
	}

	/// Builds the authorize redirect for a "start login" request.
	pub fn request_phase(
		&self,
		request_params: &HashMap<String, String>,
	) -> Result<AuthorizationRequest> {
		obs::observe_sync(Phase::Request, "request_phase", || {
			let params = self.authorize_params(request_params);
			let authorize_url = self.client.authorize_url(&params)?;

			Ok(AuthorizationRequest { authorize_url, state: params.get("state").cloned(), params })
		})
	}

	/// Exchanges an authorization code through the injected client.
	///
	/// A new token invalidates any cached identity document.
	pub async fn exchange_code(
		&mut self,
		code: &str,
		redirect_uri: Option<&str>,
	) -> Result<AccessToken> {
		let span = PhaseSpan::new(Phase::Callback, "exchange_code");
		let token = span.instrument(self.client.exchange_code(code, redirect_uri)).await?;

		self.raw_info = None;

		Ok(token)
	}

	/// Handles the provider callback and returns the resulting [`AuthHash`].
	///
	/// `expected_state` is the state issued during the request phase; it is only checked when
	/// [`StrategyConfig::provider_ignores_state`] is false. `redirect_uri` must match the one
	/// used in the authorize request when it differed from the configured callback URL.
	pub async fn callback_phase(
		&mut self,
		callback_params: &HashMap<String, String>,
		expected_state: Option<&str>,
		redirect_uri: Option<&str>,
	) -> Result<AuthHash> {
		obs::observe(Phase::Callback, "callback_phase", async move {
			if let Some(error) = callback_params.get("error") {
				return Err(Error::AccessDenied {
					error: error.clone(),
					description: callback_params.get("error_description").cloned(),
				});
			}
			if !self.config.provider_ignores_state {
				let returned = callback_params.get("state").map(String::as_str);

				if expected_state.is_none() || returned != expected_state {
					return Err(Error::CsrfDetected);
				}
			}

			let code = callback_params
				.get("code")
				.filter(|code| !code.is_empty())
				.ok_or(Error::MissingCode)?;

			self.exchange_code(code, redirect_uri).await?;

			self.auth_hash().await
		})
		.await
	}

	/// Unique identifier from the identity document.
	pub async fn uid(&mut self) -> Result<String> {
		let mapper = Arc::clone(&self.mapper);

		mapper.uid(self.raw_info().await?)
	}

	/// `info` section from the identity document.
	pub async fn info(&mut self) -> Result<IdentityInfo> {
		let mapper = Arc::clone(&self.mapper);

		Ok(mapper.info(self.raw_info().await?))
	}

	/// `extra` section wrapping the identity document.
	pub async fn extra(&mut self) -> Result<IdentityExtra> {
		let mapper = Arc::clone(&self.mapper);

		Ok(mapper.extra(self.raw_info().await?))
	}

	/// Credentials for the client's current token, if an exchange has happened.
	pub fn credentials(&self) -> Option<Credentials> {
		self.client.current_token().map(Credentials::from)
	}

	/// Assembles the full identity result.
	pub async fn auth_hash(&mut self) -> Result<AuthHash> {
		let uid = self.uid().await?;
		let info = self.info().await?;
		let extra = self.extra().await?;

		Ok(AuthHash {
			provider: self.config.name.clone(),
			uid,
			info,
			credentials: self.credentials(),
			extra,
		})
	}

	/// Returns the identity document, fetching it on first use.
	pub async fn raw_info(&mut self) -> Result<&IdentityDocument> {
		let doc = match self.raw_info.take() {
			Some(doc) => doc,
			None => self.fetch_raw_info().await?,
		};

		Ok(self.raw_info.insert(doc))
	}

	async fn fetch_raw_info(&self) -> Result<IdentityDocument> {
		obs::observe(Phase::UserInfo, "fetch_raw_info", async {
			let url = self.endpoints.userinfo()?;
			let fetched = self.client.get(&url).await?;

			IdentityDocument::from_slice(&fetched.body).map_err(|source| {
				Error::from(IdentityFetchError::Parse { source, status: Some(fetched.status) })
			})
		})
		.await
	}
}
#[cfg(feature = "reqwest")]
impl ProviderStrategy<ReqwestOAuth2Client> {
	/// Builds a strategy backed by the default reqwest OAuth client.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		config: StrategyConfig,
	) -> Result<Self> {
		Self::with_client(client_id, client_secret, config, BasicOAuth2Client::reqwest)
	}
}
impl<C> Debug for ProviderStrategy<C>
where
	C: OAuth2Client,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderStrategy")
			.field("name", &self.config.name)
			.field("endpoints", &self.endpoints)
			.field("identity", &self.config.identity)
			.field("raw_info_cached", &self.raw_info.is_some())
			.finish()
	}
}
