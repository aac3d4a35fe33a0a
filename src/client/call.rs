//! Call pipeline: token freshness, request construction, dispatch, and classification.

// self
use crate::{
	_prelude::*,
	client::{ApiClient, RequestDescriptor},
	error::ConfigError,
	http::{ApiHttpClient, ApiRequest, ApiResponse, HttpMethod},
	obs::{self, CallKind, CallOutcome, CallSpan},
	query::{self, QueryParams},
};

impl<C> ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Runs one call through the scheduler and returns the parsed JSON body.
	pub async fn scheduled_call(
		&self,
		endpoint: impl Into<String>,
		method: HttpMethod,
		params: Option<QueryParams>,
	) -> Result<Value> {
		let descriptor = RequestDescriptor { params, ..RequestDescriptor::new(endpoint, method) };

		self.scheduler.schedule(|| self.call(descriptor)).await
	}

	/// Performs one round trip immediately, without waiting for a scheduler slot.
	///
	/// Unless the descriptor skips the auth check, a stale token is renewed first; if the
	/// token still looks stale after that single renewal the call fails with
	/// [`Error::RetryExhausted`] instead of looping.
	pub async fn call(&self, descriptor: RequestDescriptor) -> Result<Value> {
		observe(descriptor.kind(), &descriptor.endpoint, async {
			if !descriptor.skip_auth_check {
				self.ensure_fresh_token(&descriptor.endpoint).await?;
			}

			self.dispatch(&descriptor).await
		})
		.await
	}

	/// Resolves the descriptor into a concrete request against the configured base URL.
	pub fn build_request(&self, descriptor: &RequestDescriptor) -> Result<ApiRequest> {
		let raw = format!(
			"{}{}",
			self.config.base(),
			query::append_query(&descriptor.endpoint, descriptor.params.as_ref())
		);
		let url = Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl {
			url: if descriptor.skip_auth_check { descriptor.endpoint.clone() } else { raw },
			source,
		})?;
		let bearer = if descriptor.skip_auth_check {
			None
		} else {
			self.store.current().map(|credential| credential.access_token)
		};

		Ok(ApiRequest { method: descriptor.method, url, bearer, timeout: self.config.request_timeout })
	}

	pub(super) async fn dispatch(&self, descriptor: &RequestDescriptor) -> Result<Value> {
		let request = self.build_request(descriptor)?;
		// Token calls carry the client secret in the query; keep it out of errors and logs.
		let reported_url = if descriptor.skip_auth_check {
			format!("{}{}", self.config.base(), descriptor.endpoint)
		} else {
			request.url.to_string()
		};

		obs::log_dispatch(request.method, &request.url, descriptor.skip_auth_check);

		let response = self.http_client.execute(request).await?;

		classify(&reported_url, response)
	}

	async fn ensure_fresh_token(&self, endpoint: &str) -> Result<()> {
		if !self.store.is_expired() {
			return Ok(());
		}

		self.renew_token().await?;

		if self.store.is_expired() {
			return Err(Error::RetryExhausted { endpoint: endpoint.to_owned() });
		}

		Ok(())
	}
}

/// Classifies a raw response: non-2xx statuses, non-JSON bodies, and bodies with a truthy
/// `error` field are failures; anything else resolves to the parsed body.
pub fn classify(url: &str, response: ApiResponse) -> Result<Value> {
	if !response.is_success() {
		return Err(Error::HttpStatus {
			status: response.status,
			status_text: response.status_text,
			url: url.to_owned(),
		});
	}

	let body: Value = serde_json::from_slice(&response.body)
		.map_err(|source| Error::Decode { url: url.to_owned(), source })?;

	if body.get("error").is_some_and(is_truthy) {
		return Err(Error::ApiBody { body });
	}

	Ok(body)
}

pub(super) async fn observe<F, T>(kind: CallKind, endpoint: &str, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	let span = CallSpan::new(kind, endpoint);

	obs::record_call_outcome(kind, CallOutcome::Attempt);

	let result = span.instrument(fut).await;

	obs::record_call_outcome(kind, CallOutcome::of(&result));

	result
}

fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(flag) => *flag,
		Value::Number(number) => number.as_f64().is_some_and(|n| n != 0. && !n.is_nan()),
		Value::String(text) => !text.is_empty(),
		Value::Array(_) | Value::Object(_) => true,
	}
}
