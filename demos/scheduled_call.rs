//! Demonstrates a paced API call through the default reqwest transport: the first call
//! acquires a client-credentials token, the second reuses it.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use ft_api_broker::{
	client::{ApiClient, TOKEN_ENDPOINT},
	config::{ApiConfig, RateLimits},
	http::ReqwestHttpClient,
	reqwest::Client,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_ENDPOINT).query_param("grant_type", "client_credentials");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":7200}");
		})
		.await;
	let campus_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/campus").header("authorization", "Bearer demo-access");
			then.status(200)
				.header("content-type", "application/json")
				.body("[{\"id\":1,\"name\":\"Paris\"}]");
		})
		.await;
	let config = ApiConfig::builder()
		.base_url_str(&server.base_url())?
		.client_id("demo-uid")
		.client_secret("demo-secret")
		.limits(RateLimits { per_second: 4., ..Default::default() })
		.build()?;
	let http_client = ReqwestHttpClient::with_client(Client::builder().build()?);
	let client = <ApiClient<ReqwestHttpClient>>::with_http_client(config, http_client)?;
	let campuses = client.campus().await?;

	println!("Campuses: {campuses}.");

	client.campus().await?;

	println!("Scheduler after two calls: {:?}.", client.scheduler().snapshot());

	token_mock.assert_calls_async(1).await;
	campus_mock.assert_calls_async(2).await;

	Ok(())
}
