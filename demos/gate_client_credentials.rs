//! Demonstrates guarding a downstream call with the authentication gate: the first request
//! acquires and caches a client-credentials token, the second one reuses it.

// std
use std::sync::Arc;
// crates.io
use color_eyre::{Result, eyre::eyre};
use httpmock::prelude::*;
// self
use oauth2_gate::{
	cache::{CacheGate, MemoryCache},
	client::TokenClient,
	config::AuthOptions,
	ext::{BearerSigner, RequestSigner},
	gate::{AuthGate, GateContext},
	http::ReqwestHttpClient,
	reqwest::Client,
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/v1/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let orders_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/orders").header("authorization", "Bearer demo-access");
			then.status(200).body("[]");
		})
		.await;
	let mut token_endpoint = Url::parse(&server.url("/oauth2/v1/token"))?;

	token_endpoint.set_scheme("https").map_err(|_| eyre!("Mock URL rejected the https scheme."))?;

	let options = AuthOptions::builder()
		.user("demo-client")
		.password("super-secret")
		.token_endpoint(token_endpoint.as_str())
		.cache_key("demo-token")
		.grant_type("client_credentials")
		.scope("orders.read")
		.retries(2)
		.retry_sleep_seconds(1)
		.lifetime_minutes(15)
		.build_shared()?;
	let http = Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()?;
	let token_client =
		TokenClient::with_http_client(options.clone(), ReqwestHttpClient::with_client(http.clone()))?;
	let gate = AuthGate::new(
		Arc::new(token_client),
		CacheGate::new(Arc::new(MemoryCache::default())),
		options,
	)?;
	let mut orders_url = Url::parse(&server.url("/orders"))?;

	orders_url.set_scheme("https").map_err(|_| eyre!("Mock URL rejected the https scheme."))?;

	let (gate, http, orders_url) = (&gate, &http, &orders_url);

	for round in 1..=2 {
		let status = gate
			.intercept(&GateContext::new(), move || async move {
				let token = gate.bearer_token().await?.ok_or_else(|| eyre!("Token missing."))?;
				let response =
					BearerSigner.attach_token(http.get(orders_url.clone()), &token)?.send().await?;

				Ok::<_, color_eyre::Report>(response.status())
			})
			.await??;

		println!("Round {round}: downstream answered {status}.");
	}

	token_mock.assert_calls_async(1).await;
	orders_mock.assert_calls_async(2).await;

	Ok(())
}
