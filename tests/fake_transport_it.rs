// std
use std::{collections::HashMap, time::Duration};
// crates.io
use tokio::time::Instant;
// self
use ft_api_broker::{
	_preludet::*,
	auth::Credential,
	client::{ApiClient, RequestDescriptor, TOKEN_ENDPOINT},
	config::RateLimits,
	error::TransportError,
	http::{ApiHttpClient, ApiRequest, ApiResponse, HttpFuture, HttpMethod},
	scheduler::Scheduler,
	store::TokenStore,
};

/// Transport that answers from a path-keyed script and records every request it receives.
#[derive(Default)]
struct FakeHttpClient {
	script: HashMap<&'static str, (u16, &'static str)>,
	offline: bool,
	requests: Mutex<Vec<ApiRequest>>,
}
impl FakeHttpClient {
	fn scripted(script: &[(&'static str, u16, &'static str)]) -> Self {
		Self {
			script: script.iter().map(|(path, status, body)| (*path, (*status, *body))).collect(),
			..Default::default()
		}
	}

	fn offline() -> Self {
		Self { offline: true, ..Default::default() }
	}

	fn recorded(&self) -> Vec<ApiRequest> {
		self.requests.lock().clone()
	}
}
impl ApiHttpClient for FakeHttpClient {
	fn execute(&self, request: ApiRequest) -> HttpFuture<'_> {
		Box::pin(async move {
			let path = request.url.path().to_owned();

			self.requests.lock().push(request);

			if self.offline {
				return Err(TransportError::Io(std::io::Error::new(
					std::io::ErrorKind::ConnectionRefused,
					"connection refused",
				)));
			}

			let (status, body) = self.script.get(path.as_str()).copied().unwrap_or((404, "{}"));

			Ok(ApiResponse::new(status, body))
		})
	}
}

fn build_client(transport: FakeHttpClient) -> (ApiClient<FakeHttpClient>, Arc<FakeHttpClient>) {
	let transport = Arc::new(transport);
	let client = <ApiClient<FakeHttpClient>>::with_http_client(
		test_config("https://api.example.com", relaxed_limits()),
		transport.clone(),
	)
	.expect("Fake-backed client should build successfully.");

	(client, transport)
}

#[tokio::test]
async fn renewal_round_trip_sends_bearer_only_on_the_retried_call() {
	let (client, transport) = build_client(FakeHttpClient::scripted(&[
		(TOKEN_ENDPOINT, 200, "{\"access_token\":\"T1\"}"),
		("/v2/campus", 200, "{\"id\":1}"),
	]));
	let body = client
		.scheduled_call("/v2/campus", HttpMethod::Get, None)
		.await
		.expect("Call should succeed after renewal.");

	assert_eq!(body, serde_json::json!({"id": 1}));

	let recorded = transport.recorded();

	assert_eq!(recorded.len(), 2, "Exactly one token call and one resource call are expected.");

	let token = &recorded[0];

	assert_eq!(token.method, HttpMethod::Post);
	assert_eq!(token.url.path(), TOKEN_ENDPOINT);
	assert_eq!(
		token.url.query(),
		Some("grant_type=client_credentials&client_id=test-uid&client_secret=test-secret&")
	);
	assert!(token.bearer.is_none(), "The token call must not carry an Authorization header.");

	let resource = &recorded[1];

	assert_eq!(resource.url.as_str(), "https://api.example.com/v2/campus");
	assert_eq!(resource.bearer.as_ref().map(|token| token.expose()), Some("T1"));
	assert_eq!(resource.timeout, Duration::from_secs(25));
}

#[tokio::test]
async fn fresh_credential_skips_renewal() {
	let (client, transport) =
		build_client(FakeHttpClient::scripted(&[("/v2/users/1", 200, "{\"id\":1}")]));

	client.store().install(Credential::new("seeded", OffsetDateTime::now_utc()));
	client.user(1).await.expect("Call with a fresh credential should succeed.");

	let recorded = transport.recorded();

	assert_eq!(recorded.len(), 1);
	assert_eq!(recorded[0].bearer.as_ref().map(|token| token.expose()), Some("seeded"));
}

#[tokio::test]
async fn stale_credential_is_not_sent_to_the_token_endpoint() {
	let (client, transport) = build_client(FakeHttpClient::scripted(&[
		(TOKEN_ENDPOINT, 200, "{\"access_token\":\"T2\"}"),
		("/v2/cursus", 200, "[]"),
	]));
	let stale_at = OffsetDateTime::now_utc() - Credential::LIFETIME - time::Duration::minutes(1);

	client.store().install(Credential::new("T1", stale_at));
	client.cursus().await.expect("Call should succeed after renewing the stale credential.");

	let recorded = transport.recorded();

	assert!(recorded[0].bearer.is_none());
	assert_eq!(recorded[1].bearer.as_ref().map(|token| token.expose()), Some("T2"));
	assert_eq!(
		recorded[1].url.as_str(),
		"https://api.example.com/v2/cursus?page[size]=100&"
	);
}

#[tokio::test]
async fn renewal_yielding_expired_token_is_not_retried_forever() {
	let (client, transport) = build_client(FakeHttpClient::scripted(&[
		(TOKEN_ENDPOINT, 200, "{\"access_token\":\"T0\",\"created_at\":0}"),
		("/v2/campus", 200, "[]"),
	]));
	let err = client.campus().await.expect_err("An already-expired renewal should abort the call.");

	assert!(matches!(err, Error::RetryExhausted { ref endpoint } if endpoint == "/v2/campus"));
	assert_eq!(transport.recorded().len(), 1, "Only the token call should have been sent.");
}

#[tokio::test]
async fn forced_descriptor_bypasses_the_staleness_check() {
	let (client, transport) =
		build_client(FakeHttpClient::scripted(&[("/v2/public", 200, "{\"ok\":true}")]));
	let body = client
		.call(RequestDescriptor::new("/v2/public", HttpMethod::Get).forced())
		.await
		.expect("Forced calls should not require a token.");

	assert_eq!(body["ok"], true);
	assert!(client.is_token_expired());
	assert_eq!(transport.recorded().len(), 1);
}

#[tokio::test]
async fn transport_failures_propagate_without_retry() {
	let (client, transport) = build_client(FakeHttpClient::offline());

	client.store().install(Credential::new("T1", OffsetDateTime::now_utc()));

	let err = client.user(1).await.expect_err("Transport failures should surface to the caller.");

	assert!(matches!(err, Error::Transport(TransportError::Io(_))));
	assert_eq!(transport.recorded().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn clients_sharing_a_scheduler_and_store_draw_from_one_quota() {
	let transport = Arc::new(FakeHttpClient::scripted(&[
		(TOKEN_ENDPOINT, 200, "{\"access_token\":\"T1\"}"),
		("/v2/campus", 200, "[]"),
	]));
	let limits = RateLimits {
		max_concurrent: 2,
		per_second: 1_000.,
		per_hour: 2,
		refill_interval: Duration::from_secs(3_600),
	};
	let started_at = Instant::now();
	let scheduler =
		Arc::new(Scheduler::new(limits.clone()).expect("Scheduler limits should be valid."));
	let store = Arc::new(TokenStore::new());
	let share = || {
		<ApiClient<FakeHttpClient>>::with_http_client(
			test_config("https://api.example.com", limits.clone()),
			transport.clone(),
		)
		.expect("Fake-backed client should build successfully.")
		.with_scheduler(scheduler.clone())
		.with_store(store.clone())
	};
	let (first, second) = (share(), share());

	first.campus().await.expect("First call should succeed.");
	second.campus().await.expect("Second call should succeed.");

	assert!(started_at.elapsed() < Duration::from_secs(1));
	assert_eq!(scheduler.snapshot().available_quota, 0);

	first.campus().await.expect("Third call should succeed after the refill.");

	assert!(
		started_at.elapsed() >= Duration::from_secs(3_600),
		"The third call must wait for the shared reservoir to refill."
	);

	let token_calls =
		transport.recorded().iter().filter(|request| request.url.path() == TOKEN_ENDPOINT).count();

	assert_eq!(token_calls, 1, "Both clients should reuse the shared credential.");
	assert_eq!(store.renewals().attempts(), 1);
	assert!(!second.is_token_expired());
}
