// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
	sync::Arc,
};
// crates.io
use parking_lot::Mutex;
// self
use auth_provider_strategy::{
	config::StrategyConfig,
	error::{ConfigError, Error, IdentityFetchError, TransientError},
	http::{HttpTransport, ResponseMetadata, ResponseMetadataSlot},
	oauth::BasicOAuth2Client,
	oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse, http::StatusCode},
	provider::ProviderStrategy,
};

const NAMESPACE: &str = "tenant.dummy-provider.dev";

#[derive(Debug)]
enum FakeTransportError {
	Unreachable,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Unreachable => write!(f, "Host unreachable."),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone, Copy, Debug)]
enum Reply {
	Json(u16, &'static str),
	Text(u16, &'static str),
	Unreachable,
}

/// Canned transport keyed by request path; records every dispatched request.
#[derive(Clone)]
struct FakeTransport {
	routes: Arc<Vec<(&'static str, Reply)>>,
	requests: Arc<Mutex<Vec<(String, Option<String>)>>>,
}
impl FakeTransport {
	fn new(routes: Vec<(&'static str, Reply)>) -> Self {
		Self { routes: Arc::new(routes), requests: Arc::default() }
	}

	fn recorded(&self) -> Vec<(String, Option<String>)> {
		self.requests.lock().clone()
	}
}
impl HttpTransport for FakeTransport {
	type Handle = FakeHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		FakeHandle { transport: self.clone(), slot }
	}
}

struct FakeHandle {
	transport: FakeTransport,
	slot: ResponseMetadataSlot,
}
impl<'a> AsyncHttpClient<'a> for FakeHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			self.slot.take();

			let path = request.uri().path().to_owned();
			let authorization = request
				.headers()
				.get("authorization")
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned);

			self.transport.requests.lock().push((path.clone(), authorization));

			let reply = self
				.transport
				.routes
				.iter()
				.find(|(route, _)| path.ends_with(route))
				.map(|(_, reply)| *reply)
				.unwrap_or(Reply::Text(404, "not found"));
			let (status, content_type, body) = match reply {
				Reply::Json(status, body) => (status, "application/json", body),
				Reply::Text(status, body) => (status, "text/plain", body),
				Reply::Unreachable =>
					return Err(HttpClientError::Reqwest(Box::new(FakeTransportError::Unreachable))),
			};

			self.slot.store(ResponseMetadata { status: Some(status) });

			let mut response = HttpResponse::new(body.as_bytes().to_vec());

			*response.status_mut() =
				StatusCode::from_u16(status).expect("Fixture status codes should be valid.");
			response.headers_mut().insert(
				"content-type",
				content_type.parse().expect("Fixture content type should be a valid header."),
			);

			Ok(response)
		})
	}
}

const TOKEN_BODY: &str = "{\"access_token\":\"fake-access\",\"token_type\":\"bearer\"}";
const DOCUMENT_BODY: &str = "{\"uid\":42,\"email\":\"user@example.com\",\"client_id\":\"C\"}";

fn build_strategy(
	transport: &FakeTransport,
	config: StrategyConfig,
) -> ProviderStrategy<BasicOAuth2Client<FakeTransport>> {
	let transport = transport.clone();

	ProviderStrategy::with_client("client_id", "", config, move |settings| {
		BasicOAuth2Client::from_settings(settings, transport)
	})
	.expect("Strategy should build over the fake transport.")
}

#[tokio::test]
async fn fake_transport_drives_exchange_and_fetch() {
	let transport = FakeTransport::new(vec![
		("/oauth/token", Reply::Json(200, TOKEN_BODY)),
		("/userinfo", Reply::Json(200, DOCUMENT_BODY)),
	]);
	let mut strategy = build_strategy(&transport, StrategyConfig::new(NAMESPACE));
	let hash = strategy
		.callback_phase(&[("code".to_owned(), "abc".to_owned())].into(), None, None)
		.await
		.expect("Callback should succeed over the fake transport.");

	assert_eq!(hash.uid, "42");
	assert_eq!(hash.info.client_id.as_deref(), Some("C"));
	assert_eq!(hash.info.name(), Some(""));

	let credentials = hash.credentials.expect("Credentials should exist after exchange.");

	assert!(!credentials.expires);
	assert!(credentials.refresh_token.is_none());
	assert_eq!(
		transport.recorded(),
		vec![
			("/oauth/token".to_owned(), None),
			("/userinfo".to_owned(), Some("Bearer fake-access".to_owned())),
		]
	);
}

#[tokio::test]
async fn token_endpoint_outage_reports_upstream_status() {
	let transport =
		FakeTransport::new(vec![("/oauth/token", Reply::Text(503, "service unavailable"))]);
	let mut strategy = build_strategy(&transport, StrategyConfig::new(NAMESPACE));
	let err = strategy
		.exchange_code("abc", None)
		.await
		.expect_err("A 503 token response must fail the exchange.");

	assert!(matches!(
		err,
		Error::Transient(TransientError::TokenResponseParse { status: Some(503), .. })
	));
}

#[tokio::test]
async fn unrepresentable_token_lifetime_fails_the_exchange() {
	let transport = FakeTransport::new(vec![(
		"/oauth/token",
		Reply::Json(
			200,
			"{\"access_token\":\"a\",\"token_type\":\"bearer\",\"expires_in\":9223372036854775807}",
		),
	)]);
	let mut strategy = build_strategy(&transport, StrategyConfig::new(NAMESPACE));
	let err = strategy
		.exchange_code("abc", None)
		.await
		.expect_err("An expiry beyond the representable range must fail the exchange.");

	assert!(matches!(
		err,
		Error::Transient(TransientError::TokenEndpoint { status: Some(200), .. })
	));
	assert!(strategy.credentials().is_none());
}

#[tokio::test]
async fn unparsable_userinfo_body_keeps_its_status() {
	let transport = FakeTransport::new(vec![
		("/oauth/token", Reply::Json(200, TOKEN_BODY)),
		("/userinfo", Reply::Json(203, "[1, 2]")),
	]);
	let mut strategy = build_strategy(&transport, StrategyConfig::new(NAMESPACE));

	strategy.exchange_code("abc", None).await.expect("Exchange should succeed.");

	let err = strategy.uid().await.expect_err("A non-object document must fail.");

	assert!(matches!(
		err,
		Error::IdentityFetch(IdentityFetchError::Parse { status: Some(203), .. })
	));
}

#[tokio::test]
async fn unreachable_userinfo_endpoint_is_a_network_failure() {
	let transport = FakeTransport::new(vec![
		("/oauth/token", Reply::Json(200, TOKEN_BODY)),
		("/userinfo", Reply::Unreachable),
	]);
	let mut strategy = build_strategy(&transport, StrategyConfig::new(NAMESPACE));

	strategy.exchange_code("abc", None).await.expect("Exchange should succeed.");

	let err = strategy.uid().await.expect_err("Unreachable user-info endpoint must fail.");

	assert!(matches!(err, Error::IdentityFetch(IdentityFetchError::Network { .. })));
}

#[test]
fn invalid_namespace_is_rejected_before_the_transport_is_touched() {
	let transport = FakeTransport::new(Vec::new());
	let result = ProviderStrategy::with_client(
		"client_id",
		"client_secret",
		StrategyConfig::new("bad host"),
		|settings| BasicOAuth2Client::from_settings(settings, transport.clone()),
	);

	assert!(matches!(result, Err(Error::Config(ConfigError::InvalidNamespace { .. }))));
	assert!(transport.recorded().is_empty());
}
