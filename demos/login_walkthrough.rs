//! Walks through the request phase of a namespaced auth-provider login and shows how the callback
//! URL is scrubbed before being echoed back to the host application.

// std
use std::collections::HashMap;
// crates.io
use color_eyre::Result;
// self
use auth_provider_strategy::{
	config::StrategyConfig,
	provider::{IdentityVariant, ReqwestProviderStrategy},
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let config = StrategyConfig::from_json_str(
		r#"{
			"namespace": "acme.dummy-provider.dev",
			"secure": true,
			"identity": "profile",
			"callback_url": "https://app.example.com/auth/auth_provider/callback"
		}"#,
	)?;

	assert_eq!(config.identity, IdentityVariant::Profile);

	let strategy = ReqwestProviderStrategy::new("demo-client", "demo-secret", config)?;

	println!("Provider site: {}.", strategy.endpoints().site());
	println!("Token endpoint: {}.", strategy.endpoints().token_url());
	println!("User-info endpoint: {}.", strategy.endpoints().userinfo_url());

	let request_params = HashMap::from([
		("connection".to_owned(), "google-oauth2".to_owned()),
		("redirect_uri".to_owned(), "https://app.example.com/after-login".to_owned()),
	]);
	let request = strategy.request_phase(&request_params)?;

	println!("Send your user to {}.", request.authorize_url);

	if let Some(state) = &request.state {
		println!("Issued state `{state}`; this provider does not echo it back.");
	}

	// Simulate the provider redirecting back with extra host parameters.
	let callback_query = "code=returned-code&state=ignored&tab=settings&tab=profile";

	println!(
		"Callback URL to echo: /auth/auth_provider/callback{}.",
		strategy.sanitized_query_string(callback_query)
	);
	println!("Call ProviderStrategy::callback_phase with the callback parameters to finish.");

	Ok(())
}
