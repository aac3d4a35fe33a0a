// crates.io
use httpmock::prelude::*;
// self
use ft_api_broker::{
	_preludet::*,
	client::TOKEN_ENDPOINT,
	error::TransportError,
	http::HttpMethod,
	query::QueryParams,
};

const TOKEN_BODY: &str = "{\"access_token\":\"T1\",\"token_type\":\"bearer\",\"expires_in\":7200}";

async fn mock_token_endpoint(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_ENDPOINT)
				.query_param("grant_type", "client_credentials")
				.query_param("client_id", TEST_CLIENT_ID)
				.query_param("client_secret", TEST_CLIENT_SECRET);
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await
}

#[tokio::test]
async fn first_call_acquires_token_then_sends_bearer() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(&server.base_url());
	let token_mock = mock_token_endpoint(&server).await;
	let campus_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v2/campus")
				.query_param("page[size]", "100")
				.header("authorization", "Bearer T1");
			then.status(200).header("content-type", "application/json").body("[{\"id\":1}]");
		})
		.await;

	assert!(client.is_token_expired());

	let body = client.campus().await.expect("Campus call should succeed after renewal.");

	assert_eq!(body, serde_json::json!([{"id": 1}]));
	assert!(!client.is_token_expired());

	token_mock.assert_calls_async(1).await;
	campus_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn token_is_reused_across_calls() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(&server.base_url());
	let token_mock = mock_token_endpoint(&server).await;
	let user_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/users/42").header("authorization", "Bearer T1");
			then.status(200).header("content-type", "application/json").body("{\"id\":42}");
		})
		.await;

	client.user(42).await.expect("First user call should succeed.");
	client.user(42).await.expect("Second user call should reuse the token.");

	token_mock.assert_calls_async(1).await;
	user_mock.assert_calls_async(2).await;

	assert_eq!(client.store().renewals().attempts(), 1);
	assert_eq!(client.store().renewals().successes(), 1);
}

#[tokio::test]
async fn concurrent_stale_calls_share_one_renewal() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(&server.base_url());
	let token_mock = mock_token_endpoint(&server).await;
	let apps_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/apps").header("authorization", "Bearer T1");
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;
	let (first, second, third) =
		tokio::join!(client.apps(1, 100), client.apps(2, 100), client.apps(3, 100));

	first.expect("First concurrent call should succeed.");
	second.expect("Second concurrent call should succeed.");
	third.expect("Third concurrent call should succeed.");

	token_mock.assert_calls_async(1).await;
	apps_mock.assert_calls_async(3).await;
}

#[tokio::test]
async fn not_found_rejects_with_http_status_naming_the_url() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(&server.base_url());
	let _token_mock = mock_token_endpoint(&server).await;
	let missing_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/users/7");
			then.status(404).body("{\"message\":\"Not Found\"}");
		})
		.await;
	let err = client.user(7).await.expect_err("A 404 should surface to the caller.");

	match err {
		Error::HttpStatus { status, status_text, url } => {
			assert_eq!(status, 404);
			assert_eq!(status_text, "Not Found");
			assert_eq!(url, server.url("/v2/users/7"));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	missing_mock.assert_async().await;
}

#[tokio::test]
async fn error_body_rejects_with_api_body() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(&server.base_url());
	let _token_mock = mock_token_endpoint(&server).await;
	let _locations_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/locations/9");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_token\"}");
		})
		.await;
	let err = client.location(9).await.expect_err("Error bodies should surface to the caller.");

	match err {
		Error::ApiBody { body } => assert_eq!(body, serde_json::json!({"error": "invalid_token"})),
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn token_failure_aborts_the_triggering_call() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(&server.base_url());
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_ENDPOINT);
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\"}");
		})
		.await;
	let resource_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/cursus");
			then.status(200).body("[]");
		})
		.await;
	let err = client.cursus().await.expect_err("Token failures should abort the call.");

	match &err {
		Error::TokenAcquisition { source } => match source.as_ref() {
			Error::HttpStatus { status, url, .. } => {
				assert_eq!(*status, 401);
				// The client secret travels in the query and must not leak into errors.
				assert_eq!(url, &server.url(TOKEN_ENDPOINT));
			},
			other => panic!("Unexpected inner error: {other:?}."),
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	assert!(client.is_token_expired());
	assert_eq!(client.store().renewals().failures(), 1);

	token_mock.assert_calls_async(1).await;
	resource_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn token_payload_without_access_token_is_rejected() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(&server.base_url());
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_ENDPOINT);
			then.status(200).header("content-type", "application/json").body("{\"scope\":\"public\"}");
		})
		.await;
	let err = client
		.scheduled_call("/v2/campus", HttpMethod::Get, None)
		.await
		.expect_err("A token payload without access_token should be rejected.");

	assert!(matches!(
		err,
		Error::TokenAcquisition { ref source } if matches!(**source, Error::TokenResponse { .. })
	));
}

#[tokio::test]
async fn unreachable_api_surfaces_transport_error() {
	let client = build_reqwest_test_client("http://127.0.0.1:1");
	let err = client
		.scheduled_call("/v2/campus", HttpMethod::Get, Some(QueryParams::new().with("page[size]", 1)))
		.await
		.expect_err("Connection failures should surface to the caller.");

	match err {
		Error::TokenAcquisition { source } =>
			assert!(matches!(*source, Error::Transport(TransportError::Network { .. }))),
		other => panic!("Unexpected error variant: {other:?}."),
	}
}
