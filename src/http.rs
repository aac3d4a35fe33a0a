//! Transport primitives for API round trips.
//!
//! The module exposes [`ApiHttpClient`] alongside the transport-neutral [`ApiRequest`] and
//! [`ApiResponse`] so downstream crates can plug in a custom HTTP stack (or a fake one in
//! tests) without touching the call pipeline. Implementations only move bytes; status and
//! body classification stays in [`ApiClient::call`](crate::client::ApiClient::call).

// std
use std::time::Duration;
// crates.io
use http::StatusCode;
// self
use crate::{_prelude::*, auth::TokenSecret, error::TransportError};

/// Boxed future returned by [`ApiHttpClient::execute`].
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing one API round trip.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by every
/// in-flight call, and the returned future must be `Send` so callers can hop executors.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and returns the raw response, or a transport failure.
	///
	/// Non-success statuses are *not* errors at this layer.
	fn execute(&self, request: ApiRequest) -> HttpFuture<'_>;
}

/// HTTP methods used by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `PATCH`
	Patch,
	/// `DELETE`
	Delete,
}
impl HttpMethod {
	/// Returns the method token as sent on the wire.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Get => "GET",
			Self::Post => "POST",
			Self::Put => "PUT",
			Self::Patch => "PATCH",
			Self::Delete => "DELETE",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Fully resolved outbound request.
#[derive(Clone)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: HttpMethod,
	/// Absolute URL including the query string.
	pub url: Url,
	/// Bearer token to attach as `Authorization`, if any.
	pub bearer: Option<TokenSecret>,
	/// Per-request timeout.
	pub timeout: Duration,
}
impl Debug for ApiRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiRequest")
			.field("method", &self.method)
			.field("path", &self.url.path())
			.field("bearer_set", &self.bearer.is_some())
			.field("timeout", &self.timeout)
			.finish()
	}
}

/// Raw response handed back by a transport.
#[derive(Clone, Debug, Default)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Canonical reason phrase (empty if unknown).
	pub status_text: String,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Builds a response with the canonical reason phrase for `status`.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		let status_text = StatusCode::from_u16(status)
			.ok()
			.and_then(|code| code.canonical_reason())
			.unwrap_or_default()
			.into();

		Self { status, status_text, body: body.into() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	fn method(method: HttpMethod) -> reqwest::Method {
		match method {
			HttpMethod::Get => reqwest::Method::GET,
			HttpMethod::Post => reqwest::Method::POST,
			HttpMethod::Put => reqwest::Method::PUT,
			HttpMethod::Patch => reqwest::Method::PATCH,
			HttpMethod::Delete => reqwest::Method::DELETE,
		}
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	fn execute(&self, request: ApiRequest) -> HttpFuture<'_> {
		Box::pin(async move {
			let mut builder = self
				.0
				.request(Self::method(request.method), request.url)
				.timeout(request.timeout);

			if let Some(token) = &request.bearer {
				builder = builder.header(reqwest::header::AUTHORIZATION, token.bearer());
			}

			let response = builder.send().await?;
			let status = response.status();
			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse {
				status: status.as_u16(),
				status_text: status.canonical_reason().unwrap_or_default().into(),
				body,
			})
		})
	}
}
