//! API client wiring the token store, scheduler, and transport together.
//!
//! [`ApiClient`] is the single entry point for outbound calls. Façade methods funnel into
//! [`ApiClient::scheduled_call`], which waits for a [`Scheduler`] slot, makes sure a fresh
//! access token is installed (renewing it at most once per call), and classifies the
//! response. Token acquisition itself bypasses both the scheduler and the staleness check.

mod call;
mod renewal;

pub use call::classify;
pub use renewal::TOKEN_ENDPOINT;

// self
use crate::{
	_prelude::*,
	config::ApiConfig,
	http::{ApiHttpClient, HttpMethod},
	obs::CallKind,
	query::QueryParams,
	scheduler::Scheduler,
	store::TokenStore,
};
#[cfg(feature = "reqwest")] use crate::{error::ConfigError, http::ReqwestHttpClient};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestHttpClient>;

/// Authenticated, rate-limited client for the API.
///
/// Cloning is cheap: clones share the transport, the credential slot, and the scheduler, so
/// every clone draws from the same quota and reuses the same access token.
pub struct ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// HTTP transport used for every outbound request.
	pub http_client: Arc<C>,
	config: Arc<ApiConfig>,
	store: Arc<TokenStore>,
	scheduler: Arc<Scheduler>,
}
impl<C> ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a client around the caller-provided transport.
	///
	/// A fresh [`Scheduler`] is built from `config.limits` and an empty [`TokenStore`] is
	/// attached; use [`ApiClient::with_scheduler`] / [`ApiClient::with_store`] to share them.
	pub fn with_http_client(config: ApiConfig, http_client: impl Into<Arc<C>>) -> Result<Self> {
		let scheduler = Scheduler::new(config.limits.clone())?;

		Ok(Self {
			http_client: http_client.into(),
			config: Arc::new(config),
			store: Default::default(),
			scheduler: Arc::new(scheduler),
		})
	}

	/// Replaces the scheduler, e.g. to share one quota across several clients.
	pub fn with_scheduler(mut self, scheduler: Arc<Scheduler>) -> Self {
		self.scheduler = scheduler;

		self
	}

	/// Replaces the credential store.
	pub fn with_store(mut self, store: Arc<TokenStore>) -> Self {
		self.store = store;

		self
	}

	/// Returns the client configuration.
	pub fn config(&self) -> &ApiConfig {
		&self.config
	}

	/// Returns the credential store.
	pub fn store(&self) -> &Arc<TokenStore> {
		&self.store
	}

	/// Returns the scheduler gating every scheduled call.
	pub fn scheduler(&self) -> &Arc<Scheduler> {
		&self.scheduler
	}

	/// Returns `true` when the next call would have to renew the access token.
	pub fn is_token_expired(&self) -> bool {
		self.store.is_expired()
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestHttpClient> {
	/// Creates a client backed by a default reqwest transport.
	pub fn new(config: ApiConfig) -> Result<Self> {
		let client = ReqwestClient::builder().build().map_err(ConfigError::from)?;

		Self::with_http_client(config, ReqwestHttpClient::with_client(client))
	}
}
impl<C> Clone for ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			config: self.config.clone(),
			store: self.store.clone(),
			scheduler: self.scheduler.clone(),
		}
	}
}
impl<C> Debug for ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("config", &self.config)
			.field("token_expired", &self.is_token_expired())
			.field("scheduler", &self.scheduler)
			.finish()
	}
}

/// Description of one outbound call; built per call and discarded once it settles.
#[derive(Clone, PartialEq)]
pub struct RequestDescriptor {
	/// Endpoint path appended to the base URL (e.g. `/v2/campus`).
	pub endpoint: String,
	/// HTTP method.
	pub method: HttpMethod,
	/// Query parameters; `None` appends no query string at all.
	pub params: Option<QueryParams>,
	/// Skips the token staleness check and the `Authorization` header.
	pub skip_auth_check: bool,
}
impl RequestDescriptor {
	/// Creates a descriptor without query parameters.
	pub fn new(endpoint: impl Into<String>, method: HttpMethod) -> Self {
		Self { endpoint: endpoint.into(), method, params: None, skip_auth_check: false }
	}

	/// Attaches query parameters.
	pub fn with_params(mut self, params: QueryParams) -> Self {
		self.params = Some(params);

		self
	}

	/// Marks the descriptor as an unauthenticated call that must not trigger renewal.
	pub fn forced(mut self) -> Self {
		self.skip_auth_check = true;

		self
	}

	pub(crate) fn kind(&self) -> CallKind {
		if self.skip_auth_check { CallKind::Token } else { CallKind::Resource }
	}
}
impl Debug for RequestDescriptor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let param_keys =
			self.params.as_ref().map(|params| params.iter().map(|(key, _)| key).collect::<Vec<_>>());

		f.debug_struct("RequestDescriptor")
			.field("endpoint", &self.endpoint)
			.field("method", &self.method)
			.field("param_keys", &param_keys)
			.field("skip_auth_check", &self.skip_auth_check)
			.finish()
	}
}
