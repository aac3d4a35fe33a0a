//! Authenticated, rate-limited client for the 42 intranet API: client-credentials token renewal,
//! paced scheduling, and uniform response classification behind a single `scheduled_call`.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod obs;
pub mod query;
pub mod scheduler;
pub mod store;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::ApiClient,
		config::{ApiConfig, RateLimits},
		http::ReqwestHttpClient,
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = ApiClient<ReqwestHttpClient>;

	/// Client identifier used by test configurations.
	pub const TEST_CLIENT_ID: &str = "test-uid";
	/// Client secret used by test configurations.
	pub const TEST_CLIENT_SECRET: &str = "test-secret";

	/// Rate limits loose enough that scheduling never slows integration tests down.
	pub fn relaxed_limits() -> RateLimits {
		RateLimits {
			max_concurrent: 8,
			per_second: 1_000.,
			per_hour: 10_000,
			refill_interval: std::time::Duration::from_secs(3_600),
		}
	}

	/// Builds a configuration pointing at `base_url` with the test credentials.
	pub fn test_config(base_url: &str, limits: RateLimits) -> ApiConfig {
		ApiConfig::builder()
			.base_url(Url::parse(base_url).expect("Mock server URL should parse successfully."))
			.client_id(TEST_CLIENT_ID)
			.client_secret(TEST_CLIENT_SECRET)
			.limits(limits)
			.build()
			.expect("Test configuration should build successfully.")
	}

	/// Constructs a reqwest-backed [`ApiClient`] pointing at `base_url` with relaxed limits.
	pub fn build_reqwest_test_client(base_url: &str) -> ReqwestTestClient {
		ApiClient::new(test_config(base_url, relaxed_limits()))
			.expect("Reqwest test client should build successfully.")
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use serde_json;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
