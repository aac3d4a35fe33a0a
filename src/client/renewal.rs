//! Client-credentials token acquisition with a single-flight renewal guard.
//!
//! [`ApiClient::renew_token`] serializes renewals through the store's async guard: the first
//! caller that observes a stale token hits the token endpoint, later callers wait on the
//! guard and then reuse the credential it installed instead of stampeding the endpoint.

// self
use crate::{
	_prelude::*,
	auth::Credential,
	client::{ApiClient, RequestDescriptor, call},
	http::{ApiHttpClient, HttpMethod},
	obs::{self, CallKind},
	query::QueryParams,
};

/// Token endpoint path, relative to the API base URL.
pub const TOKEN_ENDPOINT: &str = "/oauth/token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
	access_token: String,
	#[serde(default)]
	created_at: Option<i64>,
}

impl<C> ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Renews the access token unless a concurrent caller already installed a fresh one.
	pub async fn renew_token(&self) -> Result<Credential> {
		let _singleflight = self.store.renewal_guard().lock().await;

		if let Some(current) = self.store.current().filter(|credential| !credential.is_expired()) {
			return Ok(current);
		}

		self.acquire_token().await
	}

	/// Unconditionally requests a new token and installs it.
	///
	/// The request bypasses the scheduler and the staleness check and carries no
	/// `Authorization` header. Any failure is wrapped in [`Error::TokenAcquisition`].
	pub async fn acquire_token(&self) -> Result<Credential> {
		let metrics = self.store.renewals();

		metrics.record_attempt();

		match self.request_token().await {
			Ok(credential) => {
				self.store.install(credential.clone());
				metrics.record_success();

				Ok(credential)
			},
			Err(err) => {
				metrics.record_failure();

				Err(Error::token_acquisition(err))
			},
		}
	}

	fn token_descriptor(&self) -> RequestDescriptor {
		let params = QueryParams::new()
			.with("grant_type", "client_credentials")
			.with("client_id", self.config.client_id.as_str())
			.with("client_secret", self.config.client_secret.expose());

		RequestDescriptor::new(TOKEN_ENDPOINT, HttpMethod::Post).with_params(params).forced()
	}

	async fn request_token(&self) -> Result<Credential> {
		let descriptor = self.token_descriptor();
		let body =
			call::observe(CallKind::Token, TOKEN_ENDPOINT, self.dispatch(&descriptor)).await?;

		credential_from_body(body, OffsetDateTime::now_utc())
	}
}

fn credential_from_body(body: Value, received_at: OffsetDateTime) -> Result<Credential> {
	let response: TokenResponse =
		serde_path_to_error::deserialize(body).map_err(|source| Error::TokenResponse { source })?;
	let created_at = match response.created_at {
		Some(secs) => OffsetDateTime::from_unix_timestamp(secs).unwrap_or_else(|err| {
			obs::log_warning("Token created_at is out of range; using receipt time.", &err);

			received_at
		}),
		None => received_at,
	};

	Ok(Credential::new(response.access_token, created_at))
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn created_at_is_read_from_the_response() {
		let received_at = datetime!(2024-05-01 08:00:30 UTC);
		let credential = credential_from_body(
			json!({
				"access_token": "T1",
				"token_type": "bearer",
				"expires_in": 7200,
				"created_at": 1_714_550_400
			}),
			received_at,
		)
		.expect("A complete token response should decode.");

		assert_eq!(credential.access_token.expose(), "T1");
		assert_eq!(credential.created_at, datetime!(2024-05-01 08:00 UTC));
	}

	#[test]
	fn missing_created_at_falls_back_to_receipt_time() {
		let received_at = datetime!(2024-05-01 08:00:30 UTC);
		let credential = credential_from_body(json!({"access_token": "T1"}), received_at)
			.expect("A minimal token response should decode.");

		assert_eq!(credential.created_at, received_at);
	}

	#[test]
	fn missing_access_token_reports_the_path() {
		let err = credential_from_body(json!({"token_type": "bearer"}), OffsetDateTime::now_utc())
			.expect_err("A response without access_token should be rejected.");

		match err {
			Error::TokenResponse { source } => assert!(source.to_string().contains("access_token")),
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}
}
